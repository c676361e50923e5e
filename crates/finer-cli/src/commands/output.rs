use colored::Colorize;
use finer_application::SessionSummary;
use finer_core::{StepOutcome, WizardStep};

pub fn heading(text: &str) {
    println!("{}", text.bright_yellow().bold());
}

pub fn success(text: &str) {
    println!("{}", format!("✓ {}", text).green());
}

pub fn note(text: &str) {
    println!("{}", text.bright_black());
}

/// Prints an advisor or model reply line by line.
pub fn reply(text: &str) {
    for line in text.lines() {
        println!("{}", line.bright_blue());
    }
}

/// Unwraps an applied outcome, or says that a newer request won.
pub fn applied<T>(outcome: StepOutcome<T>) -> Option<T> {
    let value = outcome.applied();
    if value.is_none() {
        note("A newer request replaced this one; nothing was changed.");
    }
    value
}

pub fn summary(summary: &SessionSummary) {
    heading("Session");
    let current = summary.current_step;
    for n in 1..=7u8 {
        let marker = if summary.completed_steps.contains(&n) {
            "✓".green()
        } else {
            "·".bright_black()
        };
        let label = WizardStep::from_number(n)
            .map(|step| step.to_string())
            .unwrap_or_default();
        if n == current {
            println!("  {} {}. {}", marker, n, label.bold());
        } else {
            println!("  {} {}. {}", marker, n, label);
        }
    }
    println!();

    let field = |name: &str, value: Option<&str>| {
        println!(
            "  {:<12} {}",
            format!("{}:", name),
            value.unwrap_or("-")
        );
    };
    field("Theme", summary.theme.as_deref());
    field("Question", summary.rq.as_deref());
    field(
        "Confirmed",
        Some(if summary.rq_confirmed { "yes" } else { "no" }),
    );
    field("Design", summary.design.as_deref());
    field("Guideline", summary.guideline.as_deref());
    field("Analysis", summary.primary_analysis.as_deref());
    let data_types = summary.data_type_count.to_string();
    field("Data types", Some(&data_types));
    field("Draft", Some(if summary.has_draft { "yes" } else { "no" }));
}
