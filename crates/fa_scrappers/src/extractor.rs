use chrono::FixedOffset;
use fa_core::{ArticleRecord, Timestamp};
use scraper::{ElementRef, Html};
use tracing::debug;
use url::Url;

use crate::dates::resolve_timestamp;
use crate::error::ExtractError;
use crate::fetch::HttpFetcher;
use crate::scrapers::ArticleProfile;
use crate::selectors::{element_text, first_match, parse_selector, Strategy};

/// Title used when no title strategy matches.
pub const NO_TITLE: &str = "Sem título";

/// Fetches one article page and turns it into an [`ArticleRecord`].
#[derive(Debug, Clone)]
pub struct ArticleExtractor {
    fetcher: HttpFetcher,
    profile: ArticleProfile,
    offset: FixedOffset,
}

impl ArticleExtractor {
    pub fn new(fetcher: HttpFetcher, profile: ArticleProfile, offset: FixedOffset) -> Self {
        Self {
            fetcher,
            profile,
            offset,
        }
    }

    /// Relative dates on the page are resolved against `now`.
    pub async fn extract(&self, url: &str, now: Timestamp) -> Result<ArticleRecord, ExtractError> {
        Url::parse(url).map_err(|e| ExtractError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let html = self.fetcher.get_html(url).await?;
        let record = parse_article(url, &html, &self.profile, now, self.offset);
        debug!(
            url,
            title = %record.title,
            published_at = ?record.published_at,
            body_chars = record.body_text.len(),
            "🧾 Extracted article"
        );
        Ok(record)
    }
}

/// Pure extraction from already-fetched HTML. Missing fields never fail.
pub fn parse_article(
    url: &str,
    html: &str,
    profile: &ArticleProfile,
    now: Timestamp,
    offset: FixedOffset,
) -> ArticleRecord {
    let mut document = Html::parse_document(html);

    let found_title = first_match(&document, profile.title);
    let subheadline = first_match(&document, profile.subheadline).or_else(|| {
        if profile.subheadline_falls_back_to_title {
            found_title.clone()
        } else {
            None
        }
    });
    let title = found_title.unwrap_or_else(|| NO_TITLE.to_string());
    let author = first_match(&document, profile.author);
    let published_at = resolve_published_at(&document, profile.published_at, now, offset);
    let body_text = extract_body(&mut document, profile);

    ArticleRecord {
        url: url.to_string(),
        title,
        subheadline,
        author,
        published_at,
        body_text,
    }
}

fn resolve_published_at(
    document: &Html,
    strategies: &[Strategy],
    now: Timestamp,
    offset: FixedOffset,
) -> Option<Timestamp> {
    strategies
        .iter()
        .filter_map(|strategy| strategy.apply(document))
        .find_map(|text| resolve_timestamp(&text, now, offset))
}

fn extract_body(document: &mut Html, profile: &ArticleProfile) -> String {
    let Some(container_id) = profile.body.iter().find_map(|css| {
        let selector = parse_selector(css)?;
        document.select(&selector).next().map(|el| el.id())
    }) else {
        return String::new();
    };

    let noise = match document.tree.get(container_id).and_then(ElementRef::wrap) {
        Some(container) => profile
            .noise
            .iter()
            .filter_map(|css| parse_selector(css))
            .flat_map(|selector| container.select(&selector).map(|el| el.id()).collect::<Vec<_>>())
            .collect::<Vec<_>>(),
        None => Vec::new(),
    };
    for id in noise {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }

    let (Some(container), Some(paragraph)) = (
        document.tree.get(container_id).and_then(ElementRef::wrap),
        parse_selector("p"),
    ) else {
        return String::new();
    };

    container
        .select(&paragraph)
        .map(element_text)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::brazil::{exame, infomoney};
    use chrono::{TimeZone, Utc};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const EXAME_ARTICLE: &str = r#"
        <html><body>
          <div id="news-component">
            <h1>Petrobras aprova dividendos bilionários</h1>
            <div><p>Publicado em 10 de setembro de 2025 às10h55</p></div>
          </div>
          <a href="/autor/ana-souza">Ana Souza</a>
          <div id="news-body">
            <p>A estatal anunciou   nesta quarta.</p>
            <div id="ads_top"><p>Assine já!</p></div>
            <table><tr><td><p>Tabela de proventos</p></td></tr></table>
            <p>O pagamento sai em dezembro.</p>
            <div id="banner_meio"><p>Publicidade</p></div>
            <p></p>
          </div>
        </body></html>
    "#;

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2025, 10, 1, 12, 0, 0).unwrap()
    }

    fn brasilia() -> FixedOffset {
        exame::profile().utc_offset()
    }

    #[test]
    fn test_parse_exame_article() {
        let profile = exame::profile().article;
        let record = parse_article("https://exame.com/a", EXAME_ARTICLE, &profile, now(), brasilia());

        assert_eq!(record.title, "Petrobras aprova dividendos bilionários");
        assert_eq!(record.subheadline.as_deref(), Some(record.title.as_str()));
        assert_eq!(record.author.as_deref(), Some("Ana Souza"));
        assert_eq!(
            record.published_at,
            Some(Utc.with_ymd_and_hms(2025, 9, 10, 13, 55, 0).unwrap())
        );
        assert_eq!(
            record.body_text,
            "A estatal anunciou nesta quarta. O pagamento sai em dezembro."
        );
    }

    #[test]
    fn test_parse_tolerates_missing_fields() {
        let profile = infomoney::profile().article;
        let record = parse_article("https://www.infomoney.com.br/x", "<html><body></body></html>", &profile, now(), brasilia());

        assert_eq!(record.title, NO_TITLE);
        assert_eq!(record.subheadline, None);
        assert_eq!(record.author, None);
        assert_eq!(record.published_at, None);
        assert_eq!(record.body_text, "");
    }

    #[test]
    fn test_parse_infomoney_article_with_jsonld_author_and_relative_date() {
        let html = r#"
            <html><head>
              <script type="application/ld+json">{"author": {"name": "Carla Dias"}}</script>
            </head><body>
              <div data-ds-component="article-title">
                <h1>Vale sobe na bolsa</h1>
                <div>Minério puxa alta</div>
              </div>
              <time>há 3 horas</time>
              <article data-ds-component="article"><p>Texto da matéria.</p></article>
            </body></html>
        "#;
        let profile = infomoney::profile().article;
        let record = parse_article("https://www.infomoney.com.br/v", html, &profile, now(), brasilia());

        assert_eq!(record.title, "Vale sobe na bolsa");
        assert_eq!(record.subheadline.as_deref(), Some("Minério puxa alta"));
        assert_eq!(record.author.as_deref(), Some("Carla Dias"));
        assert_eq!(record.published_at, Some(now() - chrono::Duration::hours(3)));
        assert_eq!(record.body_text, "Texto da matéria.");
    }

    #[test]
    fn test_structured_datetime_attribute_wins() {
        let html = r#"<time datetime="2025-09-12T08:00:00-03:00">12/09/2025 09h00</time>"#;
        let profile = infomoney::profile().article;
        let record = parse_article("https://www.infomoney.com.br/v", html, &profile, now(), brasilia());
        assert_eq!(
            record.published_at,
            Some(Utc.with_ymd_and_hms(2025, 9, 12, 11, 0, 0).unwrap())
        );
    }

    #[tokio::test]
    async fn test_extract_fetches_and_parses() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/mercados/petrobras-dividendos"))
            .respond_with(ResponseTemplate::new(200).set_body_string(EXAME_ARTICLE))
            .mount(&server)
            .await;

        let extractor = ArticleExtractor::new(HttpFetcher::new().unwrap(), exame::profile().article, brasilia());
        let record = extractor
            .extract(&format!("{}/mercados/petrobras-dividendos", server.uri()), now())
            .await
            .unwrap();
        assert_eq!(record.author.as_deref(), Some("Ana Souza"));
    }

    #[tokio::test]
    async fn test_extract_reports_http_404() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let extractor = ArticleExtractor::new(HttpFetcher::new().unwrap(), exame::profile().article, brasilia());
        let err = extractor
            .extract(&format!("{}/sumiu", server.uri()), now())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ExtractError::Fetch(crate::error::FetchError::Status { status: 404, .. })
        ));
    }

    #[tokio::test]
    async fn test_extract_rejects_invalid_url() {
        let extractor = ArticleExtractor::new(HttpFetcher::new().unwrap(), exame::profile().article, brasilia());
        let err = extractor.extract("not a url", now()).await.unwrap_err();
        assert!(matches!(err, ExtractError::InvalidUrl { .. }));
    }
}
