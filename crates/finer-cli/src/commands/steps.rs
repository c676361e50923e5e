use super::output;
use crate::{
    AnalysisAction, DataAction, DesignAction, DraftAction, GuidelineAction, LiteratureAction,
    SeedAction,
};
use anyhow::Result;
use colored::Colorize;
use finer_application::WizardContext;
use finer_core::data_collection::grouping_label;
use finer_core::document::FinerNote;

pub async fn seed(ctx: &WizardContext, action: SeedAction) -> Result<()> {
    let step = ctx.seed();
    match action {
        SeedAction::Start { question } => {
            if let Some(message) = output::applied(step.start_chat(&question).await?) {
                output::reply(&message.content);
            }
        }
        SeedAction::Say { message } => {
            if let Some(turn) = output::applied(step.send_message(&message).await?) {
                output::reply(&turn.reply.content);
                if let Some(refined) = turn.refined {
                    println!();
                    output::heading("Research outline");
                    println!("  {}", refined.rq);
                    output::note("Run `finer seed confirm` to accept it.");
                }
            }
        }
        SeedAction::Refine => match output::applied(step.refine().await?) {
            Some(Some(refined)) => {
                output::heading("Research outline");
                println!("  Theme:    {}", refined.display_theme());
                println!("  Question: {}", refined.rq);
                println!("  Target:   {}", refined.target);
                println!("  Goal:     {}", refined.goal);
                for approach in &refined.approaches {
                    println!("  - {}: {}", approach.name.bold(), approach.description);
                }
            }
            Some(None) => output::note("The reply held no outline. Try again."),
            None => {}
        },
        SeedAction::Confirm { rq } => {
            step.confirm_rq(rq.as_deref())?;
            output::success("Research question confirmed.");
        }
    }
    Ok(())
}

pub async fn design(ctx: &WizardContext, action: DesignAction) -> Result<()> {
    let step = ctx.design();
    match action {
        DesignAction::Propose { alternative } => {
            if let Some(generated) = output::applied(step.generate(alternative).await?) {
                let proposal = generated.proposal;
                output::heading(&proposal.design);
                output::reply(&proposal.vision);
                for (criterion, note) in &proposal.finer {
                    let note = match note {
                        FinerNote::Text(text) => text.clone(),
                        FinerNote::Flag(flag) => if *flag { "yes" } else { "no" }.to_string(),
                    };
                    println!("  {:<12} {}", criterion.to_string().bold(), note);
                }
                if !proposal.reason.is_empty() {
                    output::note(&proposal.reason);
                }
                if generated.from_fallback {
                    output::note("The reply was not structured; showing it as text.");
                }
            }
        }
        DesignAction::Select { design } => match step.select(&design)? {
            Some(selected) => {
                let guideline = ctx.guideline().current().map(|g| g.name).unwrap_or("-");
                output::success(&format!("Selected '{}' (guideline: {})", selected, guideline));
            }
            None => output::note("Selection cleared."),
        },
        DesignAction::List => {
            for label in step.selectable() {
                println!("  {}", label);
            }
        }
    }
    Ok(())
}

pub fn guideline(ctx: &WizardContext, action: GuidelineAction) -> Result<()> {
    let step = ctx.guideline();
    match action {
        GuidelineAction::Show => {
            let Some(guideline) = step.current() else {
                output::note("No design selected yet. Recommended design types:");
                for design in step.recommendations() {
                    println!("  {} ({})", design.label, design.guideline.name);
                }
                return Ok(());
            };
            output::heading(&format!("{} - {}", guideline.name, guideline.full_name));
            println!("{}", guideline.description);
            let (checked, notes) = ctx
                .store()
                .read(|doc| (doc.guideline.checklist.clone(), doc.guideline.notes.clone()));
            for (i, item) in guideline.checklist.iter().enumerate() {
                let mark = if checked.contains(&i) { "[x]".green() } else { "[ ]".normal() };
                println!("  {} {:>2}. {}", mark, i, item);
                if let Some(note) = notes.get(&i) {
                    output::note(&format!("         {}", note));
                }
            }
        }
        GuidelineAction::Choose { label } => {
            let guideline = step.choose_design_type(&label)?;
            output::success(&format!("Using {}", guideline.name));
        }
        GuidelineAction::Check { index } => {
            let checked = step.toggle_checklist_item(index)?;
            let state = if checked { "checked" } else { "unchecked" };
            output::success(&format!("Item {} {}", index, state));
            if let Some((done, total)) = step.progress() {
                output::note(&format!("{}/{} items", done, total));
            }
        }
        GuidelineAction::Note { index, text } => {
            step.set_note(index, &text)?;
            output::success(&format!("Note saved for item {}", index));
        }
    }
    Ok(())
}

pub async fn literature(ctx: &WizardContext, action: LiteratureAction) -> Result<()> {
    let step = ctx.literature();
    match action {
        LiteratureAction::Set {
            keywords,
            years,
            language,
            database,
        } => {
            if let Some(keywords) = keywords {
                step.set_keywords(&keywords)?;
            }
            if let Some(years) = years {
                step.set_years(&years)?;
            }
            if let Some(language) = language {
                step.set_language(&language)?;
            }
            if let Some(database) = database {
                step.set_database(&database)?;
            }
            output::success("Search conditions updated.");
        }
        LiteratureAction::Prompt => println!("{}", step.prompt()?),
        LiteratureAction::Queries => match output::applied(step.suggest_queries().await?) {
            Some(Some(queries)) => {
                output::heading("Keywords");
                println!("  {}", queries.keywords_native);
                println!("  {}", queries.keywords_foreign);
                output::heading("Queries");
                println!("  {}", queries.query_native);
                println!("  {}", queries.query_foreign);
            }
            Some(None) => output::note("The reply held no queries. Try again."),
            None => {}
        },
        LiteratureAction::Background => {
            if let Some(review) = output::applied(step.build_background().await?) {
                output::reply(&review.structure);
            }
        }
    }
    Ok(())
}

pub fn data(ctx: &WizardContext, action: DataAction) -> Result<()> {
    let step = ctx.data_collection();
    match action {
        DataAction::Types { ids } => {
            step.set_types(&ids)?;
            output::success(&format!("{} data type(s) selected", ids.len()));
        }
        DataAction::Grouping { grouping, other } => {
            step.set_grouping(grouping)?;
            if let Some(text) = other {
                step.set_grouping_other_text(&text)?;
            }
            output::success(&format!("Grouping: {}", grouping_label(grouping)));
        }
        DataAction::Sample { size } => {
            step.set_sample_size(&size)?;
            output::success(&format!("Sample size: {}", size));
        }
    }
    if !step.is_valid() {
        output::note("Pick at least one data type and a grouping to finish this step.");
    }
    Ok(())
}

pub async fn analysis(ctx: &WizardContext, action: AnalysisAction) -> Result<()> {
    let step = ctx.analysis();
    match action {
        AnalysisAction::Suggest => {
            let rule = step.rule();
            output::heading("Rule of thumb");
            println!("  Continuous, normal:     {}", rule.continuous_normal);
            println!("  Continuous, non-normal: {}", rule.continuous_non_normal);
            println!("  Categorical:            {}", rule.categorical);
            let hints = step.suggestions();
            if !hints.is_empty() {
                output::heading("For your data");
                for hint in hints {
                    println!("  - {}", hint);
                }
            }
        }
        AnalysisAction::Propose => {
            if let Some(result) = output::applied(step.propose().await?) {
                output::heading(&result.primary_analysis.method);
                output::reply(&result.primary_analysis.reason);
                for secondary in &result.secondary_analyses {
                    println!("  - {}: {}", secondary.method.bold(), secondary.reason);
                }
                if !result.effect_size.is_empty() {
                    println!("  Effect size: {}", result.effect_size);
                }
            }
        }
    }
    Ok(())
}

pub async fn draft(ctx: &WizardContext, action: DraftAction) -> Result<()> {
    let step = ctx.proposal();
    match action {
        DraftAction::Generate => {
            if let Some(draft) = output::applied(step.generate().await?) {
                println!("{}", draft);
            }
        }
        DraftAction::Show { html } => {
            if html {
                println!("{}", step.render_html());
            } else {
                let draft = step.draft();
                if draft.trim().is_empty() {
                    output::note("No draft yet. Run `finer draft generate`.");
                } else {
                    println!("{}", draft);
                }
            }
        }
    }
    Ok(())
}
