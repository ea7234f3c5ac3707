use fa_core::SourceType;

use super::{BODY_NOISE, BRASILIA_UTC_OFFSET_SECS};
use crate::scrapers::{
    ArticleProfile, CardLink, CardProfile, ListingMode, SourceProfile, TimestampScope,
};
use crate::selectors::Strategy;

pub const BASE_URL: &str = "https://www.infomoney.com.br";

/// InfoMoney: a single client-rendered topic page with a "Carregar mais" button.
pub fn profile() -> SourceProfile {
    SourceProfile {
        source_type: SourceType::InfoMoney,
        name: "InfoMoney",
        emoji: "💹",
        cli_name: "infomoney",
        base_url: BASE_URL.to_string(),
        listing_path: "/tudo-sobre/{slug}",
        listing: ListingMode::Interactive {
            load_more_label: "Carregar mais",
        },
        cards: CardProfile {
            card: "div[data-ds-component=\"card-sm\"], div[data-ds-component=\"card-default\"]",
            link: CardLink::Descendant("a[href]"),
            title: &[
                Strategy::Text("h2"),
                Strategy::Text("h3"),
                Strategy::Attr("a[title]", "title"),
            ],
            timestamp_scope: TimestampScope::Card,
            timestamp: &[Strategy::Text("time"), Strategy::Text("div.inline-flex")],
        },
        article: ArticleProfile {
            title: &[Strategy::Text("div[data-ds-component=\"article-title\"] h1")],
            subheadline: &[Strategy::Text("div[data-ds-component=\"article-title\"] > div")],
            subheadline_falls_back_to_title: false,
            author: &[
                Strategy::Text("div[data-ds-component=\"author-small\"] a"),
                Strategy::JsonLdAuthor,
            ],
            published_at: &[Strategy::Attr("time[datetime]", "datetime"), Strategy::Text("time")],
            body: &["article[data-ds-component=\"article\"]"],
            noise: BODY_NOISE,
        },
        utc_offset_secs: BRASILIA_UTC_OFFSET_SECS,
    }
}
