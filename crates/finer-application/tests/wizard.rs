//! Step controllers driven end to end against scripted and demo AI.

mod common;

use common::{ScriptedAi, demo_context, design_json, scripted_context, with_outline};
use finer_application::{PersistentStore, WizardContext};
use finer_core::document::{ChatRole, Grouping};
use finer_core::{FinerError, Slice, WizardStep};
use finer_infrastructure::MemoryStorage;
use finer_interaction::{AiGateway, AiTask, DemoDelay, GatewayConfig};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn demo_chat_refines_after_three_answers() {
    let ctx = demo_context(MemoryStorage::new());
    let seed = ctx.seed();

    seed.start_chat("Older patients keep coming back after discharge")
        .await
        .unwrap();
    let first = seed.send_message("Patients over 65").await.unwrap();
    assert_eq!(first.applied().unwrap().refined, None);
    let second = seed.send_message("We want fewer readmissions").await.unwrap();
    assert_eq!(second.applied().unwrap().refined, None);

    let third = seed
        .send_message("Discharge conferences are inconsistent")
        .await
        .unwrap()
        .applied()
        .unwrap();
    let refined = third.refined.expect("outline after the sixth turn");
    assert!(!refined.rq.is_empty());
    assert!(!refined.target.is_empty());
    assert!(!refined.goal.is_empty());

    ctx.store().read(|doc| {
        assert_eq!(doc.seed.chat_history.len(), 7);
        assert_eq!(doc.seed.chat_history[0].role, ChatRole::Assistant);
        assert!(!doc.seed.rq_confirmed);
    });
}

#[tokio::test]
async fn failed_message_is_taken_back() {
    let (ctx, ai) = scripted_context();
    ai.push(Duration::ZERO, "Tell me more.");
    ai.push_error(Duration::ZERO, FinerError::ai_request(Some(503), "overloaded"));

    ctx.seed().start_chat("Pressure ulcers").await.unwrap();
    let err = ctx.seed().send_message("In the ICU").await.unwrap_err();
    assert!(err.is_ai_failure());

    ctx.store().read(|doc| assert_eq!(doc.seed.chat_history.len(), 1));
    assert!(!ctx.is_busy(Slice::SeedChat));
}

#[tokio::test]
async fn history_is_sent_without_current_message() {
    let (ctx, ai) = scripted_context();
    ai.push(Duration::ZERO, "Opening");
    ai.push(Duration::ZERO, "Follow-up");

    ctx.seed().start_chat("Hand hygiene").await.unwrap();
    ctx.seed().send_message("On surgical wards").await.unwrap();

    let requests = ai.requests();
    assert_eq!(requests[0].options.history.len(), 0);
    assert_eq!(requests[1].options.history.len(), 1);
    assert_eq!(requests[1].user_message, "On surgical wards");
}

#[tokio::test]
async fn blank_seed_is_rejected() {
    let (ctx, ai) = scripted_context();
    assert!(ctx.seed().start_chat("   ").await.is_err());
    assert!(ai.requests().is_empty());
}

#[tokio::test]
async fn confirm_requires_outline() {
    let (ctx, _) = scripted_context();
    let err = ctx.seed().confirm_rq(None).unwrap_err();
    assert!(err.is_rejected_write());

    with_outline(&ctx);
    ctx.seed().confirm_rq(Some("Edited question?")).unwrap();
    ctx.store().read(|doc| {
        assert!(doc.seed.rq_confirmed);
        assert_eq!(
            doc.seed.refined_result.as_ref().unwrap().rq,
            "Edited question?"
        );
    });
}

#[tokio::test(start_paused = true)]
async fn slower_design_reply_is_discarded() {
    let (ctx, ai) = scripted_context();
    with_outline(&ctx);
    ai.push(Duration::from_millis(500), design_json("Observational study"));
    ai.push(Duration::from_millis(10), design_json("Interventional study"));

    let design = ctx.design();
    let (first, second) = tokio::join!(design.generate(false), design.generate(false));

    assert!(first.unwrap().is_discarded());
    let applied = second.unwrap().applied().unwrap();
    assert_eq!(applied.proposal.design, "Interventional study");
    assert!(!applied.from_fallback);

    ctx.store().read(|doc| {
        let state = &doc.design_proposal;
        assert_eq!(state.current.as_ref().unwrap().design, "Interventional study");
        assert!(state.history.is_empty());
    });
    assert!(!ctx.is_busy(Slice::Design));
}

#[tokio::test(start_paused = true)]
async fn slower_failing_design_reply_is_discarded() {
    let (ctx, ai) = scripted_context();
    with_outline(&ctx);
    ai.push_error(
        Duration::from_millis(500),
        FinerError::ai_request(Some(500), "backend error"),
    );
    ai.push(Duration::from_millis(10), design_json("Qualitative study"));

    let design = ctx.design();
    let (first, second) = tokio::join!(design.generate(false), design.generate(false));

    assert!(first.unwrap().is_discarded());
    let applied = second.unwrap().applied().unwrap();
    assert_eq!(applied.proposal.design, "Qualitative study");
    assert!(!ctx.is_busy(Slice::Design));
}

#[tokio::test(start_paused = true)]
async fn superseded_chat_failure_is_discarded() {
    let (ctx, ai) = scripted_context();
    ai.push(Duration::ZERO, "Opening");
    ai.push_error(Duration::from_millis(300), FinerError::Timeout { seconds: 120 });
    ai.push(Duration::from_millis(10), "Second answer");

    ctx.seed().start_chat("Fatigue in night nurses").await.unwrap();
    let seed = ctx.seed();
    let (first, second) = tokio::join!(
        seed.send_message("Only ICU nurses"),
        seed.send_message("All wards")
    );

    assert!(first.unwrap().is_discarded());
    assert_eq!(second.unwrap().applied().unwrap().reply.content, "Second answer");
}

#[tokio::test]
async fn design_needs_outline() {
    let (ctx, ai) = scripted_context();
    let err = ctx.design().generate(false).await.unwrap_err();
    assert!(matches!(err, FinerError::Invariant(_)));
    assert!(ai.requests().is_empty());
}

#[tokio::test]
async fn alternative_design_lists_earlier_ones() {
    let ctx = demo_context(MemoryStorage::new());
    with_outline(&ctx);

    let first = ctx.design().generate(false).await.unwrap().applied().unwrap();
    assert_eq!(first.proposal.design, "Interventional study");
    ctx.design().select("Interventional study").unwrap();

    let second = ctx.design().generate(true).await.unwrap().applied().unwrap();
    assert_eq!(second.proposal.design, "Observational study");

    ctx.store().read(|doc| {
        let state = &doc.design_proposal;
        assert_eq!(state.history.len(), 1);
        assert_eq!(state.history[0].design, "Interventional study");
        assert_eq!(state.selected_design, None);
        assert_eq!(doc.guideline.selected, None);
    });

    // Earlier proposals stay selectable.
    assert_eq!(
        ctx.design().select("Interventional study").unwrap().as_deref(),
        Some("Interventional study")
    );
    assert_eq!(ctx.guideline().current().unwrap().name, "CONSORT");
    assert_eq!(ctx.design().select("Interventional study").unwrap(), None);
    assert!(ctx.guideline().current().is_none());
}

#[tokio::test]
async fn unstructured_design_reply_falls_back_to_text() {
    let (ctx, ai) = scripted_context();
    with_outline(&ctx);
    ai.push(Duration::ZERO, "I would suggest a pragmatic trial.");

    let generated = ctx.design().generate(false).await.unwrap().applied().unwrap();
    assert!(generated.from_fallback);
    assert_eq!(generated.proposal.vision, "I would suggest a pragmatic trial.");
}

#[tokio::test]
async fn task_model_override_applies_to_its_task_only() {
    let (ctx, ai) = scripted_context();
    let ctx = ctx.with_task_model(AiTask::ProposalDraft, "gemini-2.5-pro");
    ai.push(Duration::ZERO, "# Draft");
    ai.push(Duration::ZERO, "Use a t-test.");

    ctx.proposal().generate().await.unwrap();
    ctx.analysis().propose().await.unwrap();

    let requests = ai.requests();
    assert_eq!(requests[0].options.model.as_deref(), Some("gemini-2.5-pro"));
    assert_eq!(requests[1].options.model, None);
}

#[tokio::test]
async fn guideline_checklist_and_notes() {
    let (ctx, _) = scripted_context();
    let guideline = ctx.guideline();
    assert!(guideline.toggle_checklist_item(0).is_err());

    guideline.choose_design_type("Qualitative study").unwrap();
    assert_eq!(guideline.current().unwrap().name, "COREQ");
    assert!(guideline.toggle_checklist_item(1).unwrap());
    guideline.set_note(1, "Interviewer was a ward nurse").unwrap();
    assert_eq!(guideline.progress().map(|(done, _)| done), Some(1));

    assert!(!guideline.toggle_checklist_item(1).unwrap());
    let total = guideline.progress().unwrap().1;
    assert!(guideline.toggle_checklist_item(total).is_err());
    assert!(guideline.choose_design_type("Made-up design").is_err());
}

#[tokio::test]
async fn unstructured_analysis_kept_as_reason() {
    let (ctx, ai) = scripted_context();
    ctx.data_collection().set_types(["vitals", "labs"]).unwrap();
    ctx.data_collection().set_grouping(Grouping::TwoGroups).unwrap();
    ai.push(Duration::ZERO, "Use a t-test if the data look normal.");

    let result = ctx.analysis().propose().await.unwrap().applied().unwrap();
    assert_eq!(result.primary_analysis.reason, "Use a t-test if the data look normal.");

    let prompt = &ai.requests()[0];
    assert_eq!(prompt.task, AiTask::StatisticsProposal);
    assert!(prompt.user_message.contains("2groups"));
    assert!(ctx.store().read(|doc| WizardStep::Analysis.is_complete(doc)));
}

#[tokio::test(start_paused = true)]
async fn timeout_surfaces_and_clears_busy() {
    let gateway = AiGateway::new(GatewayConfig {
        timeout: Duration::from_secs(1),
        demo_delay: DemoDelay {
            min_ms: 5_000,
            max_ms: 5_000,
        },
        ..Default::default()
    });
    let store = PersistentStore::open(Arc::new(MemoryStorage::new()));
    let ctx = WizardContext::new(store, Arc::new(gateway)).unwrap();

    let err = ctx.seed().start_chat("Sleep on night shifts").await.unwrap_err();
    assert!(err.is_timeout());
    assert!(!ctx.is_busy(Slice::SeedChat));
    ctx.store().read(|doc| assert!(doc.seed.chat_history.is_empty()));
}

#[tokio::test]
async fn demo_run_reaches_a_draft() {
    let ctx = demo_context(MemoryStorage::new());
    with_outline(&ctx);
    ctx.seed().confirm_rq(None).unwrap();

    ctx.design().generate(false).await.unwrap();
    ctx.design().select("Interventional study").unwrap();
    ctx.literature().set_keywords("discharge, readmission").unwrap();
    let queries = ctx.literature().suggest_queries().await.unwrap().applied();
    assert!(queries.flatten().is_some());
    ctx.literature().build_background().await.unwrap();
    ctx.data_collection().set_types(["attributes", "questionnaire"]).unwrap();
    ctx.data_collection().set_grouping(Grouping::TwoGroups).unwrap();
    ctx.analysis().propose().await.unwrap();
    let draft = ctx.proposal().generate().await.unwrap().applied().unwrap();
    assert!(draft.starts_with("# "));
    assert!(ctx.proposal().render_html().contains("<h2>"));

    let checklist = ctx.navigation().checklist();
    assert!(checklist.iter().all(|(_, done)| *done), "{checklist:?}");

    let summary = ctx.summary();
    assert_eq!(summary.guideline.as_deref(), Some("CONSORT"));
    assert!(summary.has_draft);
}

#[tokio::test]
async fn navigation_moves_within_bounds() {
    let (ctx, _) = scripted_context();
    let nav = ctx.navigation();
    assert!(!nav.previous().unwrap());
    assert!(!nav.go_to_step(0).unwrap());
    assert!(!nav.go_to_step(8).unwrap());

    assert_eq!(nav.complete_current_step().unwrap(), WizardStep::Design);
    assert!(nav.go_to_step(7).unwrap());
    assert_eq!(nav.complete_current_step().unwrap(), WizardStep::Proposal);
    ctx.store().read(|doc| {
        assert_eq!(doc.navigation.current_step, 7);
        assert!(doc.navigation.completed_steps.contains(&1));
        assert!(doc.navigation.completed_steps.contains(&7));
    });
}

#[test]
fn scripted_ai_is_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ScriptedAi>();
}
