//! Canned responses for running without live credentials.

use crate::task::{AiTask, CompletionRequest};
use finer_core::document::ChatRole;
use rand::Rng;
use std::time::Duration;

/// Simulated latency bounds in milliseconds, inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemoDelay {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DemoDelay {
    pub const NONE: DemoDelay = DemoDelay {
        min_ms: 0,
        max_ms: 0,
    };

    fn sample(self) -> Duration {
        if self.max_ms <= self.min_ms {
            return Duration::from_millis(self.min_ms);
        }
        Duration::from_millis(rand::thread_rng().gen_range(self.min_ms..=self.max_ms))
    }
}

impl Default for DemoDelay {
    fn default() -> Self {
        Self {
            min_ms: 1200,
            max_ms: 2000,
        }
    }
}

/// Produces deterministic responses per task after a simulated delay.
#[derive(Debug, Clone, Default)]
pub struct DemoResponder {
    delay: DemoDelay,
}

impl DemoResponder {
    pub fn new(delay: DemoDelay) -> Self {
        Self { delay }
    }

    pub async fn respond(&self, request: &CompletionRequest) -> String {
        let delay = self.delay.sample();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        canned_response(request)
    }
}

/// The demo reply for a request, without delay.
pub fn canned_response(request: &CompletionRequest) -> String {
    match request.task {
        AiTask::SeedChat => seed_chat_reply(request),
        AiTask::RefineSeed => REFINED_OUTLINE.to_string(),
        AiTask::DesignSelection => design_reply(&request.user_message),
        AiTask::LiteratureQueries => LITERATURE_QUERIES.to_string(),
        AiTask::LiteratureReview => LITERATURE_BACKGROUND.to_string(),
        AiTask::StatisticsProposal => ANALYSIS_PLAN.to_string(),
        AiTask::ProposalDraft => PROPOSAL_DRAFT.to_string(),
    }
}

/// The advisor's answer depends on how far the conversation has gone.
///
/// An empty history is the opening turn. Otherwise the turn number counts
/// the user messages in the history plus the current one.
fn seed_chat_reply(request: &CompletionRequest) -> String {
    let history = &request.options.history;
    if history.is_empty() {
        return format!(
            "What a promising research seed! \"{}\" goes right to the quality of everyday practice.\n\n\
             To make it more concrete, could you tell me a little more? Answer only what comes easily.\n\n\
             - **Population**: which patients or situations do you have in mind?\n\
             - **Purpose**: what do you ultimately want to find out or improve?\n\
             - **Background**: what is already known, and what is still unclear?\n\
             - **Concerns**: is the theme too broad, or is the method unclear?\n\n\
             Let's sort it out together!",
            request.user_message.trim()
        );
    }

    let user_turns = history.iter().filter(|m| m.role == ChatRole::User).count() + 1;
    match user_turns {
        0..=1 => SEED_TURN_ONE.to_string(),
        2 => SEED_TURN_TWO.to_string(),
        _ => SEED_CONCLUSION.to_string(),
    }
}

/// Picks the first canned design not already named in the prompt, so an
/// alternative request yields a different design.
fn design_reply(user_message: &str) -> String {
    let (design, vision, reason) = DEMO_DESIGNS
        .iter()
        .find(|(design, _, _)| !user_message.contains(design))
        .unwrap_or(&DEMO_DESIGNS[0]);
    format!(
        r#"{{"proposals": [{{"design": "{design}", "vision": "{vision}", "finer": {{"feasible": "Data are routinely recorded on the ward", "interesting": "Directly relevant to discharge planning", "novel": "Few studies combine these elements locally", "ethical": "Minimal risk; standard consent procedures", "relevant": "Readmission is a hospital priority"}}, "reason": "{reason}"}}]}}"#
    )
}

const DEMO_DESIGNS: [(&str, &str, &str); 3] = [
    (
        "Interventional study",
        "Compare 30-day readmission between a standardised multidisciplinary discharge programme and usual care.",
        "An intervention is being introduced, so a controlled comparison answers the question most directly.",
    ),
    (
        "Observational study",
        "Follow a cohort of older inpatients and relate discharge-support components to readmission.",
        "Works with existing practice variation when randomisation is not feasible.",
    ),
    (
        "Quality improvement (QI)",
        "Run PDSA cycles on the discharge process and track readmission on a run chart.",
        "Fits a ward-level improvement effort with rapid feedback.",
    ),
];

const SEED_TURN_ONE: &str = "Thank you! A much clearer picture is emerging.\n\n\
So the direction is to test multidisciplinary discharge support for patients aged 65 and over on an acute ward.\n\n\
Please tell me a bit more:\n\
- **The intervention**: what new practice would you introduce compared with current discharge support?\n\
- **Outcome measures**: how would you measure fewer readmissions (e.g. 30-day readmission rate, patient satisfaction, days at home)?";

const SEED_TURN_TWO: &str = "The outline of the study is taking shape!\n\n\
To summarise:\n\
- **P (population)**: inpatients aged 65+ on an acute ward\n\
- **I (intervention)**: a standardised multidisciplinary discharge programme\n\
- **C (comparison)**: usual discharge support\n\
- **O (outcome)**: lower 30-day readmission\n\n\
This looks feasible and clinically meaningful. One last question:\n\
- **Setting**: do you have a site and support for data collection, and how does ethics review look?";

const SEED_CONCLUSION: &str = "Thank you, that completes the picture. The core of your study is ready.\n\n\
I will now summarise it as a research outline, and in the next step we can choose a concrete study design.";

const REFINED_OUTLINE: &str = r#"{
  "type": "research",
  "theme": "Multidisciplinary discharge support for older acute-care patients",
  "rq": "Does a standardised multidisciplinary discharge programme reduce 30-day readmission among acute-ward patients aged 65 and over?",
  "target": "Inpatients aged 65 and over on an acute ward",
  "goal": "Reduce early readmission and support a safe return home",
  "approaches": [
    {"name": "Standardised discharge conference", "description": "Weekly multidisciplinary review using a shared checklist"},
    {"name": "Post-discharge follow-up call", "description": "Nurse telephone call within 72 hours of discharge"}
  ]
}"#;

const LITERATURE_QUERIES: &str = r#"{
  "keywordsNative": "退院支援, 多職種連携, 再入院, 高齢者",
  "keywordsForeign": "discharge planning, interdisciplinary care, readmission, aged",
  "queryNative": "(退院支援 OR 退院調整) AND 多職種 AND 再入院",
  "queryForeign": "(\"Patient Discharge\"[MeSH] OR \"discharge planning\") AND (interdisciplinary OR multidisciplinary) AND readmission AND aged[MeSH]"
}"#;

const LITERATURE_BACKGROUND: &str = r#"{
  "structure": "1. Readmission among older adults is common and costly.\n2. Discharge support is often fragmented across professions.\n3. Multidisciplinary programmes show promise, but evidence from acute wards is limited.\n4. This study tests a standardised programme in routine practice."
}"#;

const ANALYSIS_PLAN: &str = r#"{
  "primaryAnalysis": {"method": "Chi-square test", "reason": "Compares the proportion readmitted within 30 days between two groups."},
  "secondaryAnalyses": [
    {"method": "Mann-Whitney U test", "reason": "Days at home are likely skewed."}
  ],
  "effectSize": "Risk difference with 95% CI",
  "multivariateNeeded": true,
  "multivariateMethod": "Logistic regression adjusting for age, sex and comorbidity",
  "sampleSizeNote": "Around 150 patients per group detects a 10-point reduction with 80% power."
}"#;

const PROPOSAL_DRAFT: &str = "# Research proposal\n\n\
## Background\n\
Readmission of older adults shortly after discharge remains common. **Multidisciplinary discharge support** may reduce it, but evidence from acute wards is limited.\n\n\
## Research question\n\
Does a standardised multidisciplinary discharge programme reduce 30-day readmission among acute-ward patients aged 65 and over?\n\n\
## Methods\n\
- Design: interventional study\n\
- Participants: inpatients aged 65 and over\n\
- Outcome: 30-day readmission\n\n\
## Analysis\n\
Chi-square test for the primary outcome; logistic regression for adjustment.";

#[cfg(test)]
mod tests {
    use super::*;
    use finer_core::document::ChatMessage;
    use finer_core::normalize::{normalize, parse_refined_result};
    use strum::IntoEnumIterator;

    fn chat(history: Vec<ChatMessage>) -> CompletionRequest {
        CompletionRequest::new(AiTask::SeedChat, "sys", "more detail").with_history(history)
    }

    #[test]
    fn test_every_task_has_a_reply() {
        for task in AiTask::iter() {
            let reply = canned_response(&CompletionRequest::new(task, "s", "u"));
            assert!(!reply.trim().is_empty(), "{task}");
        }
    }

    #[test]
    fn test_seed_chat_turn_counting() {
        let opening = chat(vec![]);
        assert!(canned_response(&opening).contains("more detail"));

        let first = chat(vec![ChatMessage::assistant("opening")]);
        assert_eq!(canned_response(&first), SEED_TURN_ONE);

        let second = chat(vec![
            ChatMessage::assistant("opening"),
            ChatMessage::user("a"),
            ChatMessage::assistant("b"),
        ]);
        assert_eq!(canned_response(&second), SEED_TURN_TWO);

        let third = chat(vec![
            ChatMessage::assistant("opening"),
            ChatMessage::user("a"),
            ChatMessage::assistant("b"),
            ChatMessage::user("c"),
            ChatMessage::assistant("d"),
        ]);
        assert_eq!(canned_response(&third), SEED_CONCLUSION);
    }

    #[test]
    fn test_structured_demo_replies_parse() {
        let outline = canned_response(&CompletionRequest::new(AiTask::RefineSeed, "s", "u"));
        assert!(parse_refined_result(&outline).is_some());

        let design = canned_response(&CompletionRequest::new(AiTask::DesignSelection, "s", "u"));
        let normalized = normalize(&design);
        assert!(!normalized.is_fallback());
        assert_eq!(normalized.primary().design, "Interventional study");
    }

    #[test]
    fn test_alternative_design_skips_named_designs() {
        let request = CompletionRequest::new(
            AiTask::DesignSelection,
            "s",
            "Already proposed: Interventional study",
        );
        assert_eq!(
            normalize(&canned_response(&request)).primary().design,
            "Observational study"
        );
    }

    #[tokio::test]
    async fn test_no_delay_when_disabled() {
        let responder = DemoResponder::new(DemoDelay::NONE);
        let started = std::time::Instant::now();
        responder.respond(&chat(vec![])).await;
        assert!(started.elapsed() < Duration::from_millis(500));
    }
}
