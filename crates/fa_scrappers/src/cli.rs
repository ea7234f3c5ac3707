use std::sync::Arc;

use clap::{Args, Subcommand};
use fa_core::{NewsStore, Result, TextProcessor, MAX_PAGES};

use crate::manager::{ScraperManager, SourceRun};
use crate::scrapers::{self, SourceProfile};

#[derive(Args, Debug, Clone)]
pub struct ScrapeArgs {
    /// Ticker symbol, e.g. PETR4
    #[arg(long, short, env = "FA_TICKER")]
    pub ticker: String,

    /// Company name as the news sites spell it, e.g. "Banco do Brasil".
    /// May be omitted for a ticker that is already stored.
    #[arg(long, short, env = "FA_COMPANY")]
    pub company: Option<String>,

    /// How many months back to collect (1 month = 30 days)
    #[arg(long, short, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..))]
    pub months: u32,

    /// Only run this source (see `sources`)
    #[arg(long)]
    pub source: Option<String>,

    /// Listing pages / load-more clicks per source, at most 50
    #[arg(long, default_value_t = MAX_PAGES)]
    pub max_pages: u32,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ScraperCommands {
    /// Collect recent news for a ticker into storage
    Scrape(ScrapeArgs),
    /// List available sources
    Sources,
}

pub async fn handle_command(
    command: ScraperCommands,
    store: Arc<dyn NewsStore>,
    nlp: Arc<dyn TextProcessor>,
) -> Result<()> {
    match command {
        ScraperCommands::Scrape(args) => {
            let runs = run_scrape(&args, store, nlp).await?;
            for run in &runs {
                let emoji = if run.success { "✅" } else { "❌" };
                println!("{} {} {}", emoji, run.source, args.ticker);
            }
            if runs.iter().all(|run| !run.success) {
                return Err(fa_core::Error::Scraping(format!(
                    "every source failed for {}",
                    args.ticker
                )));
            }
        }
        ScraperCommands::Sources => {
            println!("Available sources:");
            for line in list_sources() {
                println!("  {}", line);
            }
        }
    }
    Ok(())
}

pub async fn run_scrape(
    args: &ScrapeArgs,
    store: Arc<dyn NewsStore>,
    nlp: Arc<dyn TextProcessor>,
) -> Result<Vec<SourceRun>> {
    let profiles = select_profiles(args.source.as_deref())?;
    let manager = ScraperManager::new(store.clone(), nlp)?
        .with_profiles(profiles)
        .with_max_pages(args.max_pages);
    scrape_with(&manager, args, store.as_ref()).await
}

async fn scrape_with(manager: &ScraperManager, args: &ScrapeArgs, store: &dyn NewsStore) -> Result<Vec<SourceRun>> {
    let company = resolve_company(args, store).await?;
    manager.scrape_ticker(&args.ticker, &company, args.months).await
}

/// `--company` when given, otherwise the name stored with the ticker.
pub async fn resolve_company(args: &ScrapeArgs, store: &dyn NewsStore) -> Result<String> {
    if let Some(company) = &args.company {
        return Ok(company.clone());
    }
    store.company_name(&args.ticker).await?.ok_or_else(|| {
        fa_core::Error::Config(format!(
            "Unknown ticker {}: pass --company the first time it is scraped",
            args.ticker
        ))
    })
}

/// All sources, or the one named by `source`.
pub fn select_profiles(source: Option<&str>) -> Result<Vec<SourceProfile>> {
    match source {
        None => Ok(scrapers::get_scrapers()),
        Some(name) => scrapers::find_source(name)
            .map(|profile| vec![profile])
            .ok_or_else(|| fa_core::Error::Config(format!("Unknown source: {}", name))),
    }
}

pub fn list_sources() -> Vec<String> {
    scrapers::get_scrapers()
        .into_iter()
        .map(|profile| {
            let mode = if profile.is_interactive() { "load-more" } else { "paginated" };
            format!(
                "{} {} ({}, {}) {}",
                profile.emoji,
                profile.cli_name,
                profile.source_type,
                mode,
                profile.listing_url("{empresa}")
            )
        })
        .collect()
}
