//! Step 1: brainstorm the research seed and distil it into an outline.

use crate::context::WizardContext;
use finer_core::document::{ChatMessage, RefinedResult};
use finer_core::normalize::parse_refined_result;
use finer_core::{FinerError, Result, Slice, StepOutcome};
use finer_interaction::AiTask;
use minijinja::context;

/// Chat length at which the outline is produced without being asked.
pub const AUTO_REFINE_HISTORY_LEN: usize = 6;

/// An advisor reply, plus the outline when it was refined automatically.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatTurn {
    pub reply: ChatMessage,
    pub refined: Option<RefinedResult>,
}

pub struct SeedStep<'a> {
    ctx: &'a WizardContext,
}

impl<'a> SeedStep<'a> {
    pub(crate) fn new(ctx: &'a WizardContext) -> Self {
        Self { ctx }
    }

    /// Starts a new conversation from `question`.
    ///
    /// Earlier chat and outline are discarded; the advisor's opening turn is
    /// appended once it arrives.
    pub async fn start_chat(&self, question: &str) -> Result<StepOutcome<ChatMessage>> {
        let question = question.trim();
        if question.is_empty() {
            return Err(FinerError::invalid_value(
                "seed.question",
                "the research seed is empty",
            ));
        }

        self.ctx.store().mutate("seed", |doc| {
            doc.seed.question = question.to_string();
            doc.seed.chat_history.clear();
            doc.seed.refined_result = None;
            doc.seed.rq_confirmed = false;
        })?;

        let ticket = self.ctx.sequencer().issue(Slice::SeedChat);
        let request = self.ctx.request(AiTask::SeedChat, question.to_string());
        let Some(reply) = self.ctx.complete(&ticket, request).await? else {
            return Ok(StepOutcome::Discarded);
        };

        let message = ChatMessage::assistant(reply);
        self.append(message.clone())?;
        Ok(StepOutcome::Applied(message))
    }

    /// Sends a user turn and appends the advisor's reply.
    ///
    /// If the call fails the user turn is taken back out, so a retry does
    /// not duplicate it. Once the chat is long enough and no outline
    /// exists, refinement runs before returning.
    pub async fn send_message(&self, text: &str) -> Result<StepOutcome<ChatTurn>> {
        let text = text.trim();
        if text.is_empty() {
            return Err(FinerError::invalid_value(
                "seed.chatHistory",
                "message is empty",
            ));
        }

        let history = self.ctx.store().read(|doc| doc.seed.chat_history.clone());
        let user_turn = ChatMessage::user(text);
        self.append(user_turn.clone())?;

        let ticket = self.ctx.sequencer().issue(Slice::SeedChat);
        let request = self
            .ctx
            .request(AiTask::SeedChat, text.to_string())
            .with_history(history);
        let reply = match self.ctx.complete(&ticket, request).await {
            Ok(Some(reply)) => reply,
            Ok(None) => return Ok(StepOutcome::Discarded),
            Err(e) => {
                self.take_back(&user_turn);
                return Err(e);
            }
        };
        drop(ticket);

        let message = ChatMessage::assistant(reply);
        self.append(message.clone())?;

        let due = self.ctx.store().read(|doc| {
            doc.seed.chat_history.len() >= AUTO_REFINE_HISTORY_LEN
                && doc.seed.refined_result.is_none()
        });
        let refined = if due {
            match self.refine().await {
                Ok(outcome) => outcome.applied().flatten(),
                Err(e) => {
                    tracing::warn!("[Seed] Automatic refinement failed: {}", e);
                    None
                }
            }
        } else {
            None
        };

        Ok(StepOutcome::Applied(ChatTurn {
            reply: message,
            refined,
        }))
    }

    /// Distils the chat into a research outline.
    ///
    /// A reply without any outline field yields `Applied(None)` and writes
    /// nothing.
    pub async fn refine(&self) -> Result<StepOutcome<Option<RefinedResult>>> {
        let (question, history) = self
            .ctx
            .store()
            .read(|doc| (doc.seed.question.clone(), doc.seed.chat_history.clone()));
        let message = self.ctx.prompts().render(
            "refine",
            context! { question => question, history => history },
        )?;

        let ticket = self.ctx.sequencer().issue(Slice::SeedRefine);
        let request = self.ctx.request(AiTask::RefineSeed, message);
        let Some(reply) = self.ctx.complete(&ticket, request).await? else {
            return Ok(StepOutcome::Discarded);
        };

        let Some(result) = parse_refined_result(&reply) else {
            tracing::warn!("[Seed] Refinement reply had no usable outline");
            return Ok(StepOutcome::Applied(None));
        };

        let stored = result.clone();
        self.ctx.store().mutate("seed.refinedResult", |doc| {
            doc.seed.refined_result = Some(stored);
            doc.seed.rq_confirmed = false;
        })?;
        tracing::info!("[Seed] Outline ready: {}", result.display_theme());
        Ok(StepOutcome::Applied(Some(result)))
    }

    /// Confirms the outline, optionally replacing its research question.
    pub fn confirm_rq(&self, edited_rq: Option<&str>) -> Result<()> {
        let edited = match edited_rq.map(str::trim) {
            Some("") => {
                return Err(FinerError::invalid_value(
                    "seed.refinedResult.rq",
                    "research question is empty",
                ));
            }
            other => other.map(str::to_string),
        };

        self.ctx.store().mutate("seed.rqConfirmed", |doc| {
            if let (Some(result), Some(rq)) = (doc.seed.refined_result.as_mut(), edited) {
                result.rq = rq;
            }
            doc.seed.rq_confirmed = true;
        })
    }

    fn append(&self, message: ChatMessage) -> Result<()> {
        self.ctx
            .store()
            .mutate("seed.chatHistory", |doc| doc.seed.chat_history.push(message))
    }

    fn take_back(&self, user_turn: &ChatMessage) {
        let result = self.ctx.store().mutate("seed.chatHistory", |doc| {
            let history = &mut doc.seed.chat_history;
            if let Some(pos) = history.iter().rposition(|m| m == user_turn) {
                history.remove(pos);
            }
        });
        if let Err(e) = result {
            tracing::warn!("[Seed] Could not roll back user turn: {}", e);
        }
    }
}
