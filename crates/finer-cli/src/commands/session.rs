use super::output;
use anyhow::{Context, Result};
use colored::Colorize;
use finer_application::{SettingUpdate, WizardContext};
use finer_core::document::ApiProvider;
use std::fs;
use std::path::{Path, PathBuf};

pub fn status(ctx: &WizardContext) {
    output::summary(&ctx.summary());
}

pub fn resume(ctx: &WizardContext) {
    if ctx.store().has_saved_data() {
        output::success("Saved session found and loaded.");
        output::summary(&ctx.summary());
    } else {
        output::note("No saved session. Start with `finer seed start \"<question>\"`.");
    }
}

pub fn reset(ctx: &WizardContext) {
    ctx.store().reset();
    output::success("Session cleared. Settings were kept.");
}

pub fn settings(
    ctx: &WizardContext,
    api_key: Option<String>,
    provider: Option<ApiProvider>,
    demo: Option<bool>,
) -> Result<()> {
    let updates = api_key
        .map(SettingUpdate::ApiKey)
        .into_iter()
        .chain(provider.map(SettingUpdate::ApiProvider))
        .chain(demo.map(SettingUpdate::DemoMode));
    for update in updates {
        let path = update.path();
        ctx.store().save_setting(update)?;
        output::success(&format!("Updated {}", path));
    }

    let settings = ctx.store().settings();
    output::heading("Settings");
    let key = if settings.api_key.is_empty() {
        "not set".bright_black().to_string()
    } else {
        "set".green().to_string()
    };
    println!("  API key:   {}", key);
    println!("  Provider:  {}", settings.api_provider);
    println!("  Demo mode: {}", settings.demo_mode);
    if settings.uses_demo() {
        output::note("AI calls use canned demo responses.");
    }
    Ok(())
}

pub fn export(ctx: &WizardContext, dir: Option<PathBuf>) -> Result<()> {
    let file = ctx.store().export_to_json()?;
    let dir = dir.unwrap_or_else(|| PathBuf::from("."));
    let path = dir.join(&file.filename);
    fs::write(&path, file.content)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    output::success(&format!("Exported to {}", path.display()));
    Ok(())
}

pub fn import(ctx: &WizardContext, file: &Path) -> Result<()> {
    let content = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let restored = ctx.store().import_from_json(&content)?;
    let names: Vec<&str> = restored.iter().map(|s| s.key()).collect();
    output::success(&format!("Imported sections: {}", names.join(", ")));
    Ok(())
}
