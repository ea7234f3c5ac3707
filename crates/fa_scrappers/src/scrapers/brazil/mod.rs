use super::SourceProfile;

pub mod exame;
pub mod infomoney;

/// Brasília time; neither site observes daylight saving any more.
pub const BRASILIA_UTC_OFFSET_SECS: i32 = -3 * 3600;

/// Removed from every article body before paragraphs are read.
pub(crate) const BODY_NOISE: &[&str] = &["[id^=\"ads_\"]", "[id^=\"banner_\"]", "table"];

pub fn get_scrapers() -> Vec<SourceProfile> {
    vec![exame::profile(), infomoney::profile()]
}
