use std::sync::Arc;

use fa_core::{
    ArticleRecord, CollectedSet, NewArticle, NewsStore, ScrapeWindow, SourceType, TextProcessor,
    TextSections, TokenizedSections, MAX_PAGES,
};
use url::Url;

use crate::error::{CollectError, DriverError, WalkError};
use crate::extractor::ArticleExtractor;
use crate::fetch::HttpFetcher;
use crate::listing::{
    drain, BrowserLauncher, InteractiveOptions, InteractiveWalker, ListingWalker, PaginatedWalker,
    StopReason,
};
use crate::logging::Logger;
use crate::scrapers::{ListingMode, SourceProfile};
use crate::slug::slugify;

/// Counters for one collection run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectSummary {
    pub source: SourceType,
    pub ticker: String,
    pub candidates: usize,
    pub extracted: usize,
    /// Articles whose page could not be fetched.
    pub skipped: usize,
    /// Articles dropped by the article-level date check.
    pub too_old: usize,
    pub saved_new: usize,
    pub already_known: usize,
    pub save_failures: usize,
    pub stop: StopReason,
}

/// Runs one source for one ticker: walk the listing, extract every
/// candidate, re-check dates, and hand the survivors to the store.
pub struct Collector {
    profile: SourceProfile,
    store: Arc<dyn NewsStore>,
    nlp: Arc<dyn TextProcessor>,
    fetcher: HttpFetcher,
    launcher: Option<Arc<dyn BrowserLauncher>>,
    interactive: InteractiveOptions,
    max_pages: u32,
}

impl Collector {
    pub fn new(
        profile: SourceProfile,
        store: Arc<dyn NewsStore>,
        nlp: Arc<dyn TextProcessor>,
        fetcher: HttpFetcher,
    ) -> Self {
        Self {
            profile,
            store,
            nlp,
            fetcher,
            launcher: None,
            interactive: InteractiveOptions::default(),
            max_pages: MAX_PAGES,
        }
    }

    /// Required for interactive sources.
    pub fn with_launcher(mut self, launcher: Arc<dyn BrowserLauncher>) -> Self {
        self.launcher = Some(launcher);
        self
    }

    pub fn with_interactive_options(mut self, options: InteractiveOptions) -> Self {
        self.interactive = options;
        self
    }

    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// True unless the run hit a setup-level failure. Finding nothing is success.
    pub async fn collect(&self, ticker: &str, ticker_id: i64, company_name: &str, months_ago: u32) -> bool {
        match self.run(ticker, ticker_id, company_name, months_ago).await {
            Ok(_) => true,
            Err(e) => {
                self.logger(ticker).error(&format!("❌ Collection failed: {}", e));
                false
            }
        }
    }

    pub async fn run(
        &self,
        ticker: &str,
        ticker_id: i64,
        company_name: &str,
        months_ago: u32,
    ) -> Result<CollectSummary, CollectError> {
        let window = ScrapeWindow::new(ticker, company_name, months_ago).with_max_pages(self.max_pages);
        self.run_window(&window, ticker_id).await
    }

    /// Same as [`Collector::run`] with an explicit window.
    pub async fn run_window(&self, window: &ScrapeWindow, ticker_id: i64) -> Result<CollectSummary, CollectError> {
        let logger = self.logger(&window.ticker_symbol);
        let slug = slugify(&window.company_display_name);
        let listing_url = self.profile.listing_url(&slug);
        logger.info(&format!(
            "{} Collecting since {} from {}",
            self.profile.emoji,
            window.cutoff_timestamp.format("%Y-%m-%d"),
            listing_url
        ));

        let mut walker = self.walker(&listing_url, window).await?;
        let outcome = drain(walker.as_mut()).await?;
        let candidates = outcome.links.len();
        logger.info(&format!("🔗 {} candidate links ({})", candidates, outcome.stop));

        let extractor = ArticleExtractor::new(
            self.fetcher.clone(),
            self.profile.article.clone(),
            self.profile.utc_offset(),
        );
        let mut records: CollectedSet<ArticleRecord> = CollectedSet::new();
        let mut skipped = 0;
        let mut too_old = 0;
        for link in outcome.links.iter() {
            let record = match extractor.extract(&link.url, window.started_at).await {
                Ok(record) => record,
                Err(e) => {
                    skipped += 1;
                    logger.warn(&format!("⏭️ Skipping {}: {}", link.url, e));
                    continue;
                }
            };
            if record.is_older_than(window.cutoff_timestamp) {
                too_old += 1;
                logger.debug(&format!("🕰️ Older than cutoff: {}", record.url));
                continue;
            }
            records.insert(record);
        }
        let extracted = records.len();

        let mut saved_new = 0;
        let mut already_known = 0;
        let mut save_failures = 0;
        for record in records.into_vec() {
            let article = self.to_new_article(ticker_id, record);
            match self.store.save_article(&article).await {
                Ok(saved) if saved.is_new => {
                    saved_new += 1;
                    logger.debug(&format!("💾 Saved #{} {}", saved.article_id, article.url));
                }
                Ok(_) => already_known += 1,
                Err(e) => {
                    save_failures += 1;
                    logger.error(&format!("💥 Could not save {}: {}", article.url, e));
                }
            }
        }

        logger.info(&format!(
            "✅ {} new, {} already known, {} skipped, {} too old",
            saved_new, already_known, skipped, too_old
        ));

        Ok(CollectSummary {
            source: self.profile.source_type,
            ticker: window.ticker_symbol.clone(),
            candidates,
            extracted,
            skipped,
            too_old,
            saved_new,
            already_known,
            save_failures,
            stop: outcome.stop,
        })
    }

    async fn walker(&self, listing_url: &str, window: &ScrapeWindow) -> Result<Box<dyn ListingWalker>, CollectError> {
        Url::parse(listing_url).map_err(|e| WalkError::InvalidUrl {
            url: listing_url.to_string(),
            reason: e.to_string(),
        })?;

        match &self.profile.listing {
            ListingMode::Paginated { page_template } => Ok(Box::new(PaginatedWalker::new(
                self.fetcher.clone(),
                listing_url,
                *page_template,
                self.profile.cards.clone(),
                window,
                self.profile.utc_offset(),
            )?)),
            ListingMode::Interactive { load_more_label } => {
                let launcher = self.launcher.as_ref().ok_or_else(|| {
                    DriverError::Launch("no browser launcher configured".to_string())
                })?;
                let driver = launcher.launch().await?;
                Ok(Box::new(InteractiveWalker::new(
                    driver,
                    listing_url,
                    *load_more_label,
                    self.profile.cards.clone(),
                    window,
                    self.profile.utc_offset(),
                    self.interactive,
                )?))
            }
        }
    }

    fn to_new_article(&self, ticker_id: i64, record: ArticleRecord) -> NewArticle {
        let sections = TextSections {
            title: record.title,
            subheadline: record.subheadline.unwrap_or_default(),
            body: record.body_text,
        };
        let tokens = TokenizedSections {
            title: self.nlp.process(&sections.title),
            subheadline: self.nlp.process(&sections.subheadline),
            body: self.nlp.process(&sections.body),
        };
        NewArticle {
            ticker_id,
            url: record.url,
            published_at: record.published_at,
            author: record.author,
            source_type: self.profile.source_type,
            sections,
            tokens,
        }
    }

    fn logger(&self, ticker: &str) -> Logger {
        Logger::new()
            .with_prefix(format!("[{}]", self.profile.source_type))
            .with_prefix(format!("[{}]", ticker))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::interactive::fake::{FakeDriver, FakeLauncher};
    use crate::listing::ClickOutcome;
    use crate::scrapers::brazil::{exame, infomoney};
    use chrono::{Duration, TimeZone, Utc};
    use fa_core::Timestamp;
    use fa_inference::BasicTextProcessor;
    use fa_storage::MemoryStorage;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2025, 10, 1, 12, 0, 0).unwrap()
    }

    fn exame_card(slug: &str, when: &str) -> String {
        format!(
            r#"<div><h3><a class="touch-area" href="/mercados/{slug}/">{slug}</a></h3><div><p class="title-small">{when}</p></div></div>"#
        )
    }

    fn article(title: &str, date: &str, body: &str) -> String {
        format!(
            r#"<html><body><div id="news-component"><h1>{title}</h1><div><p>{date}</p></div></div>
               <div id="news-body"><p>{body}</p></div></body></html>"#
        )
    }

    async fn mount(server: &MockServer, at: &str, status: u16, body: String) {
        Mock::given(method("GET"))
            .and(path(at))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(server)
            .await;
    }

    fn build_collector(profile: SourceProfile, store: Arc<MemoryStorage>) -> Collector {
        Collector::new(
            profile,
            store,
            Arc::new(BasicTextProcessor::new()),
            HttpFetcher::new().unwrap(),
        )
    }

    #[tokio::test]
    async fn test_exame_run_filters_skips_and_dedups() {
        let server = MockServer::start().await;
        mount(
            &server,
            "/noticias-sobre/banco-do-brasil/",
            200,
            format!(
                "<html><body>{}{}{}{}</body></html>",
                exame_card("recente", "há 2 dias"),
                exame_card("revisada", "há 10 dias"),
                exame_card("sumiu", "há 11 dias"),
                exame_card("sem-data", "Patrocinado"),
            ),
        )
        .await;
        mount(
            &server,
            "/noticias-sobre/banco-do-brasil/2/",
            200,
            format!("<html><body>{}</body></html>", exame_card("antiga", "há 95 dias")),
        )
        .await;
        mount(&server, "/mercados/recente/", 200, article("Banco do Brasil lucra", "há 2 dias", "Lucro cresce.")).await;
        mount(
            &server,
            "/mercados/revisada/",
            200,
            article("Notícia antiga", "10 de maio de 2025", "Republicada."),
        )
        .await;
        mount(&server, "/mercados/sumiu/", 404, String::new()).await;
        mount(&server, "/mercados/sem-data/", 200, article("Sem data", "", "Corpo.")).await;

        let store = Arc::new(MemoryStorage::new());
        let ticker_id = store.upsert_ticker("BBAS3", "Banco do Brasil").await.unwrap();
        let collector = build_collector(exame::profile().with_base_url(server.uri()), store.clone());
        let window = ScrapeWindow::starting_at("BBAS3", "Banco do Brasil", 3, now());

        let summary = collector.run_window(&window, ticker_id).await.unwrap();
        assert_eq!(summary.stop, StopReason::CrossedCutoff);
        assert_eq!(summary.candidates, 4);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.too_old, 1);
        assert_eq!(summary.saved_new, 2);

        let texts = store.recent_texts("BBAS3", window.cutoff_timestamp).await.unwrap();
        assert!(texts.iter().any(|t| t.contains("Lucro cresce.")));
        assert!(texts.iter().any(|t| t.contains("Corpo.")));
        assert!(!texts.iter().any(|t| t.contains("Republicada.")));

        let again = collector.run_window(&window, ticker_id).await.unwrap();
        assert_eq!(again.saved_new, 0);
        assert_eq!(again.already_known, 2);
    }

    #[tokio::test]
    async fn test_collect_reports_unreachable_listing_as_failure() {
        let server = MockServer::start().await;
        mount(&server, "/noticias-sobre/petrobras/", 500, String::new()).await;

        let store = Arc::new(MemoryStorage::new());
        let collector = build_collector(exame::profile().with_base_url(server.uri()), store);
        assert!(!collector.collect("PETR4", 1, "Petrobras", 3).await);
    }

    #[tokio::test]
    async fn test_collect_with_nothing_recent_is_success() {
        let server = MockServer::start().await;
        mount(&server, "/noticias-sobre/petrobras/", 200, "<html><body></body></html>".to_string()).await;

        let store = Arc::new(MemoryStorage::new());
        let collector = build_collector(exame::profile().with_base_url(server.uri()), store);
        assert!(collector.collect("PETR4", 1, "Petrobras", 3).await);
    }

    #[tokio::test]
    async fn test_interactive_source_without_browser_fails() {
        let store = Arc::new(MemoryStorage::new());
        let collector = build_collector(infomoney::profile(), store.clone())
            .with_launcher(Arc::new(FakeLauncher::broken()));
        assert!(!collector.collect("PETR4", 1, "Petrobras", 3).await);

        let collector = build_collector(infomoney::profile(), store);
        let err = collector.run("PETR4", 1, "Petrobras", 3).await.unwrap_err();
        assert!(matches!(err, CollectError::Browser(DriverError::Launch(_))));
    }

    #[tokio::test]
    async fn test_interactive_run_saves_tagged_articles() {
        let server = MockServer::start().await;
        let listing = r#"<html><body>
                <div data-ds-component="card-sm"><a href="/mercados/vale-sobe/"><h2>Vale sobe</h2></a><time>há 3 horas</time></div>
                <div data-ds-component="card-sm"><a href="/mercados/vale-2019/"><h2>Vale 2019</h2></a><time>há 2 anos</time></div>
            </body></html>"#
            .to_string();
        let info_article = r#"<html><body>
            <div data-ds-component="article-title"><h1>Vale sobe</h1><div>Minério em alta</div></div>
            <time datetime="2025-10-01T06:00:00-03:00">01/10/2025 06h00</time>
            <article data-ds-component="article"><p>Ações da Vale sobem.</p></article>
        </body></html>"#;
        mount(&server, "/mercados/vale-sobe/", 200, info_article.to_string()).await;

        let driver = FakeDriver::new(vec![listing], vec![Ok(ClickOutcome::Clicked)]);
        let closed = driver.closed.clone();
        let store = Arc::new(MemoryStorage::new());
        let ticker_id = store.upsert_ticker("VALE3", "Vale").await.unwrap();
        let collector = build_collector(infomoney::profile().with_base_url(server.uri()), store.clone())
            .with_launcher(Arc::new(FakeLauncher::new(driver)))
            .with_interactive_options(InteractiveOptions {
                wait_timeout: std::time::Duration::ZERO,
                render_pause: std::time::Duration::ZERO,
            });

        let window = ScrapeWindow::starting_at("VALE3", "Vale", 1, now());
        let summary = collector.run_window(&window, ticker_id).await.unwrap();
        assert_eq!(summary.source, SourceType::InfoMoney);
        assert_eq!(summary.stop, StopReason::CrossedCutoff);
        assert_eq!(summary.saved_new, 1);
        assert!(closed.load(std::sync::atomic::Ordering::SeqCst));

        let texts = store.recent_texts("VALE3", now() - Duration::days(1)).await.unwrap();
        assert_eq!(texts.len(), 3);
        assert_eq!(texts[1], "Minério em alta");
    }
}
