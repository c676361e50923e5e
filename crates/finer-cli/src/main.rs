use anyhow::Result;
use clap::{Parser, Subcommand};
use finer_application::WizardContext;
use finer_core::document::{ApiProvider, Grouping};
use finer_infrastructure::AppConfig;
use std::path::PathBuf;
use std::str::FromStr;

mod commands;

#[derive(Parser)]
#[command(name = "finer")]
#[command(about = "FINER - Guided research question and proposal wizard", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show where the current session stands
    Status,
    /// Report whether a saved session can be resumed
    Resume,
    /// Discard the session. Settings are kept
    Reset,
    /// Show or change global settings
    Settings {
        #[arg(long)]
        api_key: Option<String>,
        /// gemini or openai
        #[arg(long, value_parser = parse_provider)]
        provider: Option<ApiProvider>,
        #[arg(long)]
        demo: Option<bool>,
    },
    /// Write the session to a JSON file
    Export {
        /// Target directory, defaults to the current one
        dir: Option<PathBuf>,
    },
    /// Load sections from an exported JSON file
    Import { file: PathBuf },
    /// Step 1: research seed
    Seed {
        #[command(subcommand)]
        action: SeedAction,
    },
    /// Step 2: study design
    Design {
        #[command(subcommand)]
        action: DesignAction,
    },
    /// Step 3: reporting guideline
    Guideline {
        #[command(subcommand)]
        action: GuidelineAction,
    },
    /// Step 4: literature background
    Literature {
        #[command(subcommand)]
        action: LiteratureAction,
    },
    /// Step 5: data collection
    Data {
        #[command(subcommand)]
        action: DataAction,
    },
    /// Step 6: analysis plan
    Analysis {
        #[command(subcommand)]
        action: AnalysisAction,
    },
    /// Step 7: proposal draft
    Draft {
        #[command(subcommand)]
        action: DraftAction,
    },
    /// Jump to step N (1-7)
    Step { number: u8 },
    /// Mark the current step done and move on
    Next,
    /// Go back one step
    Back,
}

#[derive(Subcommand)]
pub enum SeedAction {
    /// Start a new brainstorming chat
    Start { question: String },
    /// Answer the advisor
    Say { message: String },
    /// Distil the chat into an outline
    Refine,
    /// Confirm the outline, optionally with an edited question
    Confirm {
        #[arg(long)]
        rq: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum DesignAction {
    /// Ask for a design proposal
    Propose {
        /// Steer away from designs proposed so far
        #[arg(long)]
        alternative: bool,
    },
    /// Select (or deselect) a design
    Select { design: String },
    /// List selectable designs
    List,
}

#[derive(Subcommand)]
pub enum GuidelineAction {
    /// Show the guideline and its checklist
    Show,
    /// Pick a design type from the manual table
    Choose { label: String },
    /// Toggle a checklist item
    Check { index: usize },
    /// Attach a note to a checklist item
    Note { index: usize, text: String },
}

#[derive(Subcommand)]
pub enum LiteratureAction {
    /// Update search conditions
    Set {
        #[arg(long)]
        keywords: Option<String>,
        #[arg(long)]
        years: Option<String>,
        #[arg(long)]
        language: Option<String>,
        #[arg(long)]
        database: Option<String>,
    },
    /// Print the search prompt for an external tool
    Prompt,
    /// Ask for search queries
    Queries,
    /// Ask for a background structure
    Background,
}

#[derive(Subcommand)]
pub enum DataAction {
    /// Replace the selected data types
    Types { ids: Vec<String> },
    /// Set the grouping (none, 2groups, 3groups, prepost, other)
    Grouping {
        #[arg(value_parser = parse_grouping)]
        grouping: Grouping,
        #[arg(long)]
        other: Option<String>,
    },
    /// Set the planned sample size
    Sample { size: String },
}

#[derive(Subcommand)]
pub enum AnalysisAction {
    /// Show rule-based suggestions
    Suggest,
    /// Ask for an analysis plan
    Propose,
}

#[derive(Subcommand)]
pub enum DraftAction {
    /// Generate the proposal draft
    Generate,
    /// Print the draft
    Show {
        #[arg(long)]
        html: bool,
    },
}

fn parse_provider(s: &str) -> Result<ApiProvider, String> {
    ApiProvider::from_str(&s.to_lowercase()).map_err(|_| format!("unknown provider '{}'", s))
}

fn parse_grouping(s: &str) -> Result<Grouping, String> {
    Grouping::from_str(s).map_err(|_| format!("unknown grouping '{}'", s))
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = AppConfig::load()?;
    let ctx = WizardContext::from_config(&config)?;
    ctx.store().load_full_state();

    match cli.command {
        Commands::Status => commands::session::status(&ctx),
        Commands::Resume => commands::session::resume(&ctx),
        Commands::Reset => commands::session::reset(&ctx),
        Commands::Settings {
            api_key,
            provider,
            demo,
        } => commands::session::settings(&ctx, api_key, provider, demo)?,
        Commands::Export { dir } => commands::session::export(&ctx, dir)?,
        Commands::Import { file } => commands::session::import(&ctx, &file)?,
        Commands::Seed { action } => commands::steps::seed(&ctx, action).await?,
        Commands::Design { action } => commands::steps::design(&ctx, action).await?,
        Commands::Guideline { action } => commands::steps::guideline(&ctx, action)?,
        Commands::Literature { action } => commands::steps::literature(&ctx, action).await?,
        Commands::Data { action } => commands::steps::data(&ctx, action)?,
        Commands::Analysis { action } => commands::steps::analysis(&ctx, action).await?,
        Commands::Draft { action } => commands::steps::draft(&ctx, action).await?,
        Commands::Step { number } => commands::navigation::go_to(&ctx, number)?,
        Commands::Next => commands::navigation::next(&ctx)?,
        Commands::Back => commands::navigation::back(&ctx)?,
    }

    Ok(())
}
