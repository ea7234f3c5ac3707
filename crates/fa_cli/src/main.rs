use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use fa_core::{Result, ScrapeWindow, TextProcessor};
use fa_inference::{analyze_recent_news, create_model, BasicTextProcessor};
use fa_scrappers::cli::{handle_command, resolve_company, run_scrape, ScrapeArgs, ScraperCommands};
use fa_scrappers::init_logging;
use fa_storage::{create_storage, StorageKind};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about = "Brazilian financial news collector and analyst", long_about = None)]
pub struct Cli {
    /// Storage backend: memory or sqlite
    #[arg(long, env = "FA_STORAGE", default_value = "memory")]
    storage: StorageKind,
    /// SQLite database file
    #[arg(long, env = "FA_DB_PATH")]
    db: Option<PathBuf>,
    /// Debug logging (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    verbose: bool,
    /// Base URL of an OpenAI-compatible API
    #[arg(long, env = "FA_LLM_URL")]
    model_url: Option<String>,
    #[arg(long, env = "FA_LLM_MODEL")]
    model: Option<String>,
    #[arg(long, env = "FA_LLM_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    /// Language of the analysis report
    #[arg(long, default_value = "English")]
    language: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(flatten)]
    Scraper(ScraperCommands),
    /// Collect news, then ask the LLM for a fundamental analysis
    Analyze(AnalyzeArgs),
}

#[derive(Args, Debug)]
struct AnalyzeArgs {
    #[command(flatten)]
    scrape: ScrapeArgs,
    /// Analyze what is already stored without collecting first
    #[arg(long)]
    skip_scrape: bool,
}

async fn analyze(cli: &Cli, args: &AnalyzeArgs, store: Arc<dyn fa_core::NewsStore>, nlp: Arc<dyn TextProcessor>) -> Result<()> {
    let ScrapeArgs { ticker, months, .. } = &args.scrape;
    let company = resolve_company(&args.scrape, store.as_ref()).await?;

    if !args.skip_scrape {
        for run in run_scrape(&args.scrape, store.clone(), nlp).await? {
            if !run.success {
                warn!(source = %run.source, ticker = %ticker, "⚠️ Source failed, analyzing what was collected");
            }
        }
    }

    let analyst = create_model(Some(fa_inference::Config {
        api_key: cli.api_key.clone(),
        model_name: cli.model.clone(),
        base_url: cli.model_url.clone(),
    }))?;
    info!("🧠 Inference model initialized successfully (using {})", analyst.name());

    let since = ScrapeWindow::new(ticker, &company, *months).cutoff_timestamp;
    match analyze_recent_news(store.as_ref(), analyst.as_ref(), ticker, &company, since, &cli.language).await? {
        Some(report) => println!("{}", report),
        None => println!("No news stored for {} since {}", ticker, since.format("%Y-%m-%d")),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let store = create_storage(cli.storage, cli.db.clone()).await?;
    info!("🏦 Storage backend initialized successfully (using {})", cli.storage);
    let nlp: Arc<dyn TextProcessor> = Arc::new(BasicTextProcessor::new());

    match &cli.command {
        Commands::Scraper(command) => handle_command(command.clone(), store, nlp).await,
        Commands::Analyze(args) => analyze(&cli, args, store, nlp).await,
    }
}
