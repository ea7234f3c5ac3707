use async_trait::async_trait;
use chrono::FixedOffset;
use fa_core::{ArticleLink, ScrapeWindow, Timestamp};
use tracing::{info, warn};
use url::Url;

use super::{parse_cards, ListingWalker, StopReason};
use crate::error::WalkError;
use crate::fetch::HttpFetcher;
use crate::scrapers::CardProfile;

/// One parsed listing page after cutoff filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingPage {
    /// Cards that are recent or undated.
    pub accepted: Vec<ArticleLink>,
    pub card_count: usize,
    /// Some card on the page was dated before the cutoff.
    pub crossed_cutoff: bool,
}

impl ListingPage {
    /// The continue signal: more pages are worth fetching.
    pub fn has_more(&self) -> bool {
        self.card_count > 0 && !self.crossed_cutoff
    }
}

/// Parses one page and applies the listing-level cutoff. Undated cards are kept.
pub fn parse_listing_page(
    html: &str,
    page_url: &Url,
    cards: &CardProfile,
    cutoff: Timestamp,
    now: Timestamp,
    offset: FixedOffset,
) -> ListingPage {
    let links = parse_cards(html, page_url, cards, now, offset);
    let card_count = links.len();
    let (old, accepted): (Vec<_>, Vec<_>) = links
        .into_iter()
        .partition(|link| matches!(link.approximate_published_at, Some(at) if at < cutoff));

    ListingPage {
        accepted,
        card_count,
        crossed_cutoff: !old.is_empty(),
    }
}

/// Walks `/{listing}/`, `/{listing}/2/`, ... until the content gets too old,
/// runs dry, or the page ceiling is hit.
pub struct PaginatedWalker {
    fetcher: HttpFetcher,
    listing_url: String,
    page_template: &'static str,
    cards: CardProfile,
    cutoff: Timestamp,
    now: Timestamp,
    offset: FixedOffset,
    max_pages: u32,
    next_page: u32,
    stop: Option<StopReason>,
}

impl PaginatedWalker {
    pub fn new(
        fetcher: HttpFetcher,
        listing_url: &str,
        page_template: &'static str,
        cards: CardProfile,
        window: &ScrapeWindow,
        offset: FixedOffset,
    ) -> Result<Self, WalkError> {
        Url::parse(listing_url).map_err(|e| WalkError::InvalidUrl {
            url: listing_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            fetcher,
            listing_url: listing_url.to_string(),
            page_template,
            cards,
            cutoff: window.cutoff_timestamp,
            now: window.started_at,
            offset,
            max_pages: window.max_pages_or_iterations,
            next_page: 1,
            stop: None,
        })
    }

    pub fn page_url(&self, page: u32) -> String {
        if page <= 1 {
            self.listing_url.clone()
        } else {
            format!(
                "{}{}",
                self.listing_url,
                self.page_template.replace("{page}", &page.to_string())
            )
        }
    }

    /// Pages fetched so far.
    pub fn pages_fetched(&self) -> u32 {
        self.next_page - 1
    }
}

#[async_trait]
impl ListingWalker for PaginatedWalker {
    async fn next_batch(&mut self) -> Result<Vec<ArticleLink>, WalkError> {
        if self.stop.is_some() {
            return Ok(Vec::new());
        }
        if self.next_page > self.max_pages {
            self.stop = Some(StopReason::PageCeiling);
            return Ok(Vec::new());
        }

        let page = self.next_page;
        let url = self.page_url(page);
        info!(page, url = %url, "📄 Fetching listing page");

        let html = match self.fetcher.get_html(&url).await {
            Ok(html) => html,
            Err(source) if page == 1 => {
                self.stop = Some(StopReason::FetchFailed(source.to_string()));
                return Err(WalkError::Unreachable { url, source });
            }
            Err(e) => {
                warn!(page, url = %url, error = %e, "⚠️ Listing page failed, stopping pagination");
                self.stop = Some(StopReason::FetchFailed(e.to_string()));
                return Ok(Vec::new());
            }
        };
        self.next_page += 1;

        let page_url = Url::parse(&url).map_err(|e| WalkError::InvalidUrl {
            url: url.clone(),
            reason: e.to_string(),
        })?;
        let listing = parse_listing_page(&html, &page_url, &self.cards, self.cutoff, self.now, self.offset);
        info!(
            page,
            cards = listing.card_count,
            accepted = listing.accepted.len(),
            "🔗 Listing page parsed"
        );

        if listing.card_count == 0 {
            self.stop = Some(StopReason::NoCards);
        } else if listing.crossed_cutoff {
            self.stop = Some(StopReason::CrossedCutoff);
        } else if self.next_page > self.max_pages {
            self.stop = Some(StopReason::PageCeiling);
        }
        Ok(listing.accepted)
    }

    fn has_more(&self) -> bool {
        self.stop.is_none()
    }

    fn stop_reason(&self) -> Option<&StopReason> {
        self.stop.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::drain;
    use crate::scrapers::brazil::exame;
    use crate::scrapers::ListingMode;
    use chrono::{TimeZone, Utc};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2025, 10, 1, 12, 0, 0).unwrap()
    }

    fn card(slug: &str, when: &str) -> String {
        format!(
            r#"<div><h3><a class="touch-area" href="/mercados/{slug}/">{slug}</a></h3><div><p class="title-small">{when}</p></div></div>"#
        )
    }

    fn page(cards: &[String]) -> String {
        format!("<html><body>{}</body></html>", cards.concat())
    }

    fn walker_for(server: &MockServer, window: &ScrapeWindow) -> PaginatedWalker {
        let profile = exame::profile().with_base_url(server.uri());
        let ListingMode::Paginated { page_template } = profile.listing else {
            panic!("exame is paginated");
        };
        PaginatedWalker::new(
            HttpFetcher::new().unwrap(),
            &profile.listing_url("petrobras"),
            page_template,
            profile.cards.clone(),
            window,
            profile.utc_offset(),
        )
        .unwrap()
    }

    #[test]
    fn test_listing_page_cutoff_scenario() {
        let window = ScrapeWindow::starting_at("PETR4", "Petrobras", 3, now());
        let html = page(&[
            card("a", "há 10 dias"),
            card("b", "há 20 dias"),
            card("c", "há 45 dias"),
            card("d", "há 95 dias"),
            card("e", "há 120 dias"),
        ]);
        let profile = exame::profile();
        let url = Url::parse(&profile.listing_url("petrobras")).unwrap();
        let listing = parse_listing_page(
            &html,
            &url,
            &profile.cards,
            window.cutoff_timestamp,
            now(),
            profile.utc_offset(),
        );

        assert_eq!(listing.card_count, 5);
        assert_eq!(listing.accepted.len(), 3);
        assert!(listing.crossed_cutoff);
        assert!(!listing.has_more());
    }

    #[test]
    fn test_listing_page_keeps_undated_cards() {
        let window = ScrapeWindow::starting_at("PETR4", "Petrobras", 1, now());
        let html = page(&[card("a", "Patrocinado"), card("b", "há 2 horas")]);
        let profile = exame::profile();
        let url = Url::parse(&profile.listing_url("petrobras")).unwrap();
        let listing = parse_listing_page(&html, &url, &profile.cards, window.cutoff_timestamp, now(), profile.utc_offset());

        assert_eq!(listing.accepted.len(), 2);
        assert_eq!(listing.accepted[0].approximate_published_at, None);
        assert!(listing.has_more());
    }

    #[test]
    fn test_page_urls() {
        let window = ScrapeWindow::starting_at("VALE3", "Vale", 1, now());
        let profile = exame::profile();
        let walker = PaginatedWalker::new(
            HttpFetcher::new().unwrap(),
            &profile.listing_url("vale"),
            "{page}/",
            profile.cards.clone(),
            &window,
            profile.utc_offset(),
        )
        .unwrap();
        assert_eq!(walker.page_url(1), "https://exame.com/noticias-sobre/vale/");
        assert_eq!(walker.page_url(3), "https://exame.com/noticias-sobre/vale/3/");
    }

    #[tokio::test]
    async fn test_walk_stops_after_crossing_cutoff() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/noticias-sobre/petrobras/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(page(&[
                card("a", "há 1 dia"),
                card("b", "há 5 dias"),
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/noticias-sobre/petrobras/2/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(page(&[
                card("c", "há 20 dias"),
                card("d", "há 2 meses"),
            ])))
            .mount(&server)
            .await;

        let window = ScrapeWindow::starting_at("PETR4", "Petrobras", 1, now());
        let mut walker = walker_for(&server, &window);
        let outcome = drain(&mut walker).await.unwrap();

        assert_eq!(outcome.stop, StopReason::CrossedCutoff);
        assert_eq!(outcome.links.len(), 3);
        assert_eq!(walker.pages_fetched(), 2);
    }

    #[tokio::test]
    async fn test_walk_stops_on_empty_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/noticias-sobre/petrobras/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(page(&[card("a", "há 1 dia")])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/noticias-sobre/petrobras/2/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(page(&[])))
            .mount(&server)
            .await;

        let window = ScrapeWindow::starting_at("PETR4", "Petrobras", 1, now());
        let mut walker = walker_for(&server, &window);
        let outcome = drain(&mut walker).await.unwrap();

        assert_eq!(outcome.stop, StopReason::NoCards);
        assert_eq!(outcome.links.len(), 1);
    }

    #[tokio::test]
    async fn test_walk_respects_page_ceiling_with_always_fresh_pages() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(page(&[card("sempre", "há 1 hora")])))
            .mount(&server)
            .await;

        let window = ScrapeWindow::starting_at("PETR4", "Petrobras", 1, now());
        let mut walker = walker_for(&server, &window);
        let outcome = drain(&mut walker).await.unwrap();

        assert_eq!(outcome.stop, StopReason::PageCeiling);
        assert_eq!(walker.pages_fetched(), fa_core::MAX_PAGES);
        assert_eq!(
            server.received_requests().await.unwrap().len(),
            fa_core::MAX_PAGES as usize
        );
    }

    #[tokio::test]
    async fn test_first_page_failure_is_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let window = ScrapeWindow::starting_at("PETR4", "Petrobras", 1, now());
        let mut walker = walker_for(&server, &window);
        let err = drain(&mut walker).await.unwrap_err();
        assert!(matches!(err, WalkError::Unreachable { .. }));
    }

    #[tokio::test]
    async fn test_later_page_failure_keeps_partial_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/noticias-sobre/petrobras/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(page(&[card("a", "há 1 dia")])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/noticias-sobre/petrobras/2/"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let window = ScrapeWindow::starting_at("PETR4", "Petrobras", 1, now())
            .with_max_pages(5);
        let mut walker = walker_for(&server, &window);
        let outcome = drain(&mut walker).await.unwrap();

        assert!(outcome.is_partial());
        assert_eq!(outcome.links.len(), 1);
    }
}
