use fa_core::SourceType;

use super::{BODY_NOISE, BRASILIA_UTC_OFFSET_SECS};
use crate::scrapers::{
    ArticleProfile, CardLink, CardProfile, ListingMode, SourceProfile, TimestampScope,
};
use crate::selectors::Strategy;

pub const BASE_URL: &str = "https://exame.com";

/// Exame: server-rendered topic pages, `/noticias-sobre/{slug}/{page}/`.
pub fn profile() -> SourceProfile {
    SourceProfile {
        source_type: SourceType::Exame,
        name: "Exame",
        emoji: "📰",
        cli_name: "exame",
        base_url: BASE_URL.to_string(),
        listing_path: "/noticias-sobre/{slug}/",
        listing: ListingMode::Paginated {
            page_template: "{page}/",
        },
        cards: CardProfile {
            card: "h3 a.touch-area[href]",
            link: CardLink::SelfAnchor,
            title: &[],
            timestamp_scope: TimestampScope::NearestAncestor("div"),
            timestamp: &[Strategy::Text("div p.title-small")],
        },
        article: ArticleProfile {
            title: &[Strategy::Text("h1"), Strategy::Text("header h1")],
            subheadline: &[Strategy::Text("h2.title-medium")],
            subheadline_falls_back_to_title: true,
            author: &[
                Strategy::Text("a[href^=\"/autor/\"]"),
                Strategy::JsonLdAuthor,
            ],
            published_at: &[
                Strategy::Attr("time[datetime]", "datetime"),
                Strategy::Text("#news-component > div:nth-child(2) > p"),
                Strategy::Text("p[class*=\"meta-post-date\"]"),
            ],
            body: &["div#news-body"],
            noise: BODY_NOISE,
        },
        utc_offset_secs: BRASILIA_UTC_OFFSET_SECS,
    }
}
