//! Ordered field-lookup strategies. A field is described as a list of
//! strategies; the first one yielding non-empty text wins.

use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Whitespace-normalized text of the first matching element with any text.
    Text(&'static str),
    /// Attribute value of the first matching element that carries it.
    Attr(&'static str, &'static str),
    /// Author names from `application/ld+json` metadata.
    JsonLdAuthor,
}

impl Strategy {
    pub fn apply(&self, document: &Html) -> Option<String> {
        match self {
            Strategy::Text(css) => {
                let selector = parse_selector(css)?;
                document
                    .select(&selector)
                    .map(element_text)
                    .find(|text| !text.is_empty())
            }
            Strategy::Attr(css, attr) => {
                let selector = parse_selector(css)?;
                document
                    .select(&selector)
                    .filter_map(|el| el.value().attr(attr))
                    .map(normalize_whitespace)
                    .find(|value| !value.is_empty())
            }
            Strategy::JsonLdAuthor => {
                let authors = extract_jsonld_authors(document);
                (!authors.is_empty()).then(|| authors.join(", "))
            }
        }
    }

    /// Same as [`Strategy::apply`] but restricted to the subtree of `scope`.
    /// Document-level strategies yield nothing here.
    pub fn apply_within(&self, scope: ElementRef<'_>) -> Option<String> {
        match self {
            Strategy::Text(css) => {
                let selector = parse_selector(css)?;
                scope
                    .select(&selector)
                    .map(element_text)
                    .find(|text| !text.is_empty())
            }
            Strategy::Attr(css, attr) => {
                let selector = parse_selector(css)?;
                scope
                    .select(&selector)
                    .filter_map(|el| el.value().attr(attr))
                    .map(normalize_whitespace)
                    .find(|value| !value.is_empty())
            }
            Strategy::JsonLdAuthor => None,
        }
    }
}

/// Runs the cascade over a whole document.
pub fn first_match(document: &Html, strategies: &[Strategy]) -> Option<String> {
    strategies.iter().find_map(|strategy| strategy.apply(document))
}

/// Runs the cascade inside one element, e.g. a listing card.
pub fn first_match_within(scope: ElementRef<'_>, strategies: &[Strategy]) -> Option<String> {
    strategies.iter().find_map(|strategy| strategy.apply_within(scope))
}

/// Every candidate value of the cascade, in order. Used when a value has
/// to be validated (e.g. a date must parse) before it counts as a match.
pub fn all_matches_within(scope: ElementRef<'_>, strategies: &[Strategy]) -> Vec<String> {
    let mut values = Vec::new();
    for strategy in strategies {
        let (css, attr) = match strategy {
            Strategy::Text(css) => (*css, None),
            Strategy::Attr(css, attr) => (*css, Some(*attr)),
            Strategy::JsonLdAuthor => continue,
        };
        let Some(selector) = parse_selector(css) else {
            continue;
        };
        for el in scope.select(&selector) {
            let value = match attr {
                Some(attr) => el.value().attr(attr).map(normalize_whitespace),
                None => Some(element_text(el)),
            };
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                values.push(value);
            }
        }
    }
    values
}

pub fn parse_selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            warn!(selector = css, "⚠️ Invalid CSS selector: {:?}", e);
            None
        }
    }
}

pub fn element_text(el: ElementRef<'_>) -> String {
    el.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ")
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extracts author names from JSON-LD metadata in the document.
pub fn extract_jsonld_authors(document: &Html) -> Vec<String> {
    let mut authors = Vec::new();
    let Some(script_selector) = parse_selector("script[type='application/ld+json']") else {
        return authors;
    };

    for script in document.select(&script_selector) {
        let raw = script.text().collect::<String>();
        let Ok(json) = serde_json::from_str::<Value>(raw.trim()) else {
            continue;
        };
        let nodes = match &json {
            Value::Array(items) => items.iter().collect::<Vec<_>>(),
            Value::Object(obj) => match obj.get("@graph") {
                Some(Value::Array(graph)) => graph.iter().chain(std::iter::once(&json)).collect(),
                _ => vec![&json],
            },
            _ => continue,
        };
        for node in nodes {
            if let Some(author) = node.get("author") {
                collect_author_names(author, &mut authors);
            }
        }
    }

    authors.dedup();
    authors
}

fn collect_author_names(author: &Value, authors: &mut Vec<String>) {
    match author {
        Value::Array(items) => {
            for item in items {
                collect_author_names(item, authors);
            }
        }
        Value::Object(obj) => {
            if let Some(name) = obj.get("name").and_then(Value::as_str) {
                push_name(name, authors);
            }
        }
        Value::String(name) => push_name(name, authors),
        _ => {}
    }
}

fn push_name(name: &str, authors: &mut Vec<String>) {
    let name = normalize_whitespace(name);
    if !name.is_empty() {
        authors.push(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><head>
          <script type="application/ld+json">
            {"@type": "NewsArticle", "author": [{"name": " Ana Souza "}, {"name": "Bruno Lima"}]}
          </script>
        </head><body>
          <h1>   </h1>
          <header><h1>Petrobras  anuncia
            dividendos</h1></header>
          <time datetime="2025-09-12T08:00:00-03:00">12 set 2025</time>
          <p class="empty"></p>
        </body></html>
    "#;

    #[test]
    fn test_text_strategy_skips_empty_matches() {
        let document = Html::parse_document(PAGE);
        assert_eq!(
            Strategy::Text("h1").apply(&document).as_deref(),
            Some("Petrobras anuncia dividendos")
        );
        assert_eq!(Strategy::Text("p.empty").apply(&document), None);
    }

    #[test]
    fn test_cascade_first_non_empty_wins() {
        let document = Html::parse_document(PAGE);
        let strategies = [
            Strategy::Text("h2.missing"),
            Strategy::Attr("time", "datetime"),
            Strategy::Text("time"),
        ];
        assert_eq!(
            first_match(&document, &strategies).as_deref(),
            Some("2025-09-12T08:00:00-03:00")
        );
        assert_eq!(first_match(&document, &[Strategy::Text("nav")]), None);
    }

    #[test]
    fn test_jsonld_author_strategy() {
        let document = Html::parse_document(PAGE);
        assert_eq!(
            Strategy::JsonLdAuthor.apply(&document).as_deref(),
            Some("Ana Souza, Bruno Lima")
        );
    }

    #[test]
    fn test_jsonld_graph_and_plain_string_authors() {
        let html = r#"
            <script type="application/ld+json">
              {"@graph": [{"@type": "WebPage"}, {"@type": "NewsArticle", "author": "Redação"}]}
            </script>
            <script type="application/ld+json">not json</script>
        "#;
        let document = Html::parse_document(html);
        assert_eq!(extract_jsonld_authors(&document), vec!["Redação".to_string()]);
    }

    #[test]
    fn test_invalid_selector_yields_nothing() {
        let document = Html::parse_document(PAGE);
        assert_eq!(Strategy::Text("h1[").apply(&document), None);
    }

    #[test]
    fn test_all_matches_within_scope() {
        let html = r#"<div class="card"><time>há 2 dias</time><div class="inline-flex">Mercados</div></div>"#;
        let document = Html::parse_fragment(html);
        let card = document
            .select(&Selector::parse("div.card").unwrap())
            .next()
            .unwrap();
        let values = all_matches_within(card, &[Strategy::Text("time"), Strategy::Text("div.inline-flex")]);
        assert_eq!(values, vec!["há 2 dias".to_string(), "Mercados".to_string()]);
    }
}
