use super::output;
use anyhow::Result;
use finer_application::WizardContext;

pub fn go_to(ctx: &WizardContext, number: u8) -> Result<()> {
    if ctx.navigation().go_to_step(number)? {
        output::success(&format!("Now on step {}", ctx.navigation().current()));
    } else {
        output::note(&format!("Staying on step {}", ctx.navigation().current()));
    }
    Ok(())
}

pub fn next(ctx: &WizardContext) -> Result<()> {
    let nav = ctx.navigation();
    let from = nav.current();
    let to = nav.complete_current_step()?;
    if from == to {
        output::success(&format!("Finished the last step: {}", to));
    } else {
        output::success(&format!("{} done. Now on: {}", from, to));
    }
    Ok(())
}

pub fn back(ctx: &WizardContext) -> Result<()> {
    if ctx.navigation().previous()? {
        output::success(&format!("Now on step {}", ctx.navigation().current()));
    } else {
        output::note("Already on the first step.");
    }
    Ok(())
}
