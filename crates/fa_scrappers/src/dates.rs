//! Normalizes the date expressions found on Brazilian news sites.
//!
//! Listing cards and article headers use relative phrases ("há 2 dias",
//! "5 horas atrás") and localized calendar dates ("10 de setembro de 2025
//! às 10h55", "12/09/2025 10h55", "12 set 2025"). Everything resolves into
//! a [`Timestamp`]; anything unrecognized resolves to `None`.
//!
//! Month and year units are approximations (30 and 365 days).

use std::collections::HashMap;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use fa_core::Timestamp;
use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    static ref RELATIVE_HA: Regex =
        Regex::new(r"\bh[aá]\s+(\d+|uma?)\s+(\p{L}+)").unwrap();
    static ref RELATIVE_ATRAS: Regex =
        Regex::new(r"\b(\d+|uma?)\s*(\p{L}+)\s+atr[aá]s\b").unwrap();
    static ref LONG_FORM: Regex = Regex::new(
        r"\b(\d{1,2})[ºo°]?\s+de\s+(\p{L}+)\s+de\s+(\d{4})(?:\s*,?\s*(?:[aà]s\s*)?(\d{1,2})[h:](\d{2}))?"
    )
    .unwrap();
    static ref NUMERIC_FORM: Regex = Regex::new(
        r"\b(\d{1,2})/(\d{1,2})/(\d{4})(?:\s*,?\s*(?:[aà]s\s*)?(\d{1,2})[h:](\d{2}))?"
    )
    .unwrap();
    static ref SHORT_FORM: Regex = Regex::new(
        r"\b(\d{1,2})\s+(\p{L}{3,})\.?\s+(\d{4})(?:\s*,?\s*(?:[aà]s\s*)?(\d{1,2})[h:](\d{2}))?"
    )
    .unwrap();
    static ref LEADING_LABEL: Regex = Regex::new(r"^(publicado|atualizado)\s+em\s*").unwrap();
    static ref GLUED_AT: Regex = Regex::new(r"([aà]s)(\d)").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref MONTHS: HashMap<&'static str, u32> = {
        let mut months = HashMap::new();
        for (number, (full, short)) in [
            ("janeiro", "jan"),
            ("fevereiro", "fev"),
            ("março", "mar"),
            ("abril", "abr"),
            ("maio", "mai"),
            ("junho", "jun"),
            ("julho", "jul"),
            ("agosto", "ago"),
            ("setembro", "set"),
            ("outubro", "out"),
            ("novembro", "nov"),
            ("dezembro", "dez"),
        ]
        .into_iter()
        .enumerate()
        {
            let number = number as u32 + 1;
            months.insert(full, number);
            months.insert(short, number);
        }
        months.insert("marco", 3);
        months
    };
}

/// Parses "há N unidade(s)" / "N unidade(s) atrás" into the elapsed duration.
pub fn parse_relative(text: &str) -> Option<Duration> {
    let text = text.trim().to_lowercase();
    let caps = RELATIVE_HA
        .captures(&text)
        .or_else(|| RELATIVE_ATRAS.captures(&text))?;

    let quantity = match &caps[1] {
        "um" | "uma" => 1,
        digits => digits.parse::<i64>().ok()?,
    };
    unit_duration(&caps[2], quantity)
}

fn unit_duration(unit: &str, quantity: i64) -> Option<Duration> {
    if unit.starts_with("min") {
        Duration::try_minutes(quantity)
    } else if unit.starts_with("hora") {
        Duration::try_hours(quantity)
    } else if unit.starts_with("dia") {
        Duration::try_days(quantity)
    } else if unit.starts_with("semana") {
        Duration::try_weeks(quantity)
    } else if unit.starts_with("mês") || unit.starts_with("mes") {
        Duration::try_days(quantity.checked_mul(30)?)
    } else if unit.starts_with("ano") {
        Duration::try_days(quantity.checked_mul(365)?)
    } else {
        None
    }
}

/// Parses a localized calendar date. A missing time of day means midnight.
pub fn parse_absolute_localized(text: &str) -> Option<NaiveDateTime> {
    let text = normalize_absolute(text);
    if text.is_empty() {
        return None;
    }

    for form in [&*LONG_FORM, &*NUMERIC_FORM, &*SHORT_FORM] {
        if let Some(parsed) = form.captures_iter(&text).find_map(|caps| build_datetime(&caps)) {
            return Some(parsed);
        }
    }
    None
}

fn normalize_absolute(text: &str) -> String {
    let text = text.trim().to_lowercase();
    let text = LEADING_LABEL.replace(&text, "");
    let text = GLUED_AT.replace_all(&text, "$1 $2");
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

fn build_datetime(caps: &Captures<'_>) -> Option<NaiveDateTime> {
    let day = caps[1].parse::<u32>().ok()?;
    let month = month_number(&caps[2])?;
    let year = caps[3].parse::<i32>().ok()?;
    let hour = caps.get(4).map_or(Some(0), |m| m.as_str().parse::<u32>().ok())?;
    let minute = caps.get(5).map_or(Some(0), |m| m.as_str().parse::<u32>().ok())?;

    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, 0)
}

fn month_number(token: &str) -> Option<u32> {
    if let Ok(number) = token.parse::<u32>() {
        return (1..=12).contains(&number).then_some(number);
    }
    if let Some(number) = MONTHS.get(token) {
        return Some(*number);
    }
    let prefix: String = token.chars().take(3).collect();
    MONTHS.get(prefix.as_str()).copied()
}

/// Resolves any supported date text against `now`.
///
/// Tries, in order: an RFC 3339 timestamp, a localized calendar date
/// (interpreted at `offset`), then a relative phrase.
pub fn resolve_timestamp(text: &str, now: Timestamp, offset: FixedOffset) -> Option<Timestamp> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }

    if let Some(naive) = parse_absolute_localized(text) {
        return offset
            .from_local_datetime(&naive)
            .single()
            .map(|local| local.with_timezone(&Utc));
    }

    parse_relative(text).and_then(|elapsed| now.checked_sub_signed(elapsed))
}

/// Fixed offset for a number of seconds east of UTC, falling back to UTC.
pub fn offset_from_secs(secs: i32) -> FixedOffset {
    FixedOffset::east_opt(secs).unwrap_or_else(|| Utc.fix())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn brasilia() -> FixedOffset {
        offset_from_secs(-3 * 3600)
    }

    #[test]
    fn test_relative_units() {
        assert_eq!(parse_relative("há 5 minutos"), Some(Duration::minutes(5)));
        assert_eq!(parse_relative("há 3 horas"), Some(Duration::hours(3)));
        assert_eq!(parse_relative("há 2 dias"), Some(Duration::days(2)));
        assert_eq!(parse_relative("há 4 semanas"), Some(Duration::weeks(4)));
        assert_eq!(parse_relative("há 2 meses"), Some(Duration::days(60)));
        assert_eq!(parse_relative("há 2 anos"), Some(Duration::days(730)));
    }

    #[test]
    fn test_relative_spelled_out_one() {
        assert_eq!(parse_relative("há um mês"), parse_relative("há 1 mês"));
        assert_eq!(parse_relative("Há uma semana"), Some(Duration::weeks(1)));
        assert_eq!(parse_relative("há um dia"), Some(Duration::days(1)));
    }

    #[test]
    fn test_relative_trailing_form() {
        assert_eq!(parse_relative("5 dias atrás"), Some(Duration::days(5)));
        assert_eq!(parse_relative("Atualizado 12 horas atrás"), Some(Duration::hours(12)));
        assert_eq!(parse_relative("1 mes atrás"), Some(Duration::days(30)));
    }

    #[test]
    fn test_relative_unrecognized() {
        assert_eq!(parse_relative(""), None);
        assert_eq!(parse_relative("ontem"), None);
        assert_eq!(parse_relative("há 3 séculos"), None);
        assert_eq!(parse_relative("algum dia atrás"), None);
        assert_eq!(parse_relative("há 99999999999999 anos"), None);
    }

    #[test]
    fn test_absolute_long_form_with_time() {
        let parsed = parse_absolute_localized("Publicado em 10 de setembro de 2025 às 10h55").unwrap();
        assert_eq!((parsed.year(), parsed.month(), parsed.day()), (2025, 9, 10));
        assert_eq!((parsed.hour(), parsed.minute()), (10, 55));
    }

    #[test]
    fn test_absolute_long_form_glued_time() {
        let parsed = parse_absolute_localized("Atualizado em 3 de março de 2024 às9h05").unwrap();
        assert_eq!((parsed.year(), parsed.month(), parsed.day()), (2024, 3, 3));
        assert_eq!((parsed.hour(), parsed.minute()), (9, 5));
    }

    #[test]
    fn test_absolute_without_time_defaults_to_midnight() {
        let parsed = parse_absolute_localized("1 de Janeiro de 2025").unwrap();
        assert_eq!((parsed.year(), parsed.month(), parsed.day()), (2025, 1, 1));
        assert_eq!((parsed.hour(), parsed.minute()), (0, 0));
    }

    #[test]
    fn test_absolute_ordinal_first_day() {
        let parsed = parse_absolute_localized("1º de outubro de 2025 às 8h15").unwrap();
        assert_eq!((parsed.date().month(), parsed.date().day()), (10, 1));
        assert_eq!((parsed.hour(), parsed.minute()), (8, 15));
        let parsed = parse_absolute_localized("Publicado em 1o de julho de 2024").unwrap();
        assert_eq!(parsed.date(), NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
    }

    #[test]
    fn test_absolute_numeric_form() {
        let parsed = parse_absolute_localized("12/09/2025 14h30").unwrap();
        assert_eq!((parsed.year(), parsed.month(), parsed.day()), (2025, 9, 12));
        assert_eq!((parsed.hour(), parsed.minute()), (14, 30));

        let parsed = parse_absolute_localized("05/11/2024").unwrap();
        assert_eq!((parsed.month(), parsed.day(), parsed.hour()), (11, 5, 0));
    }

    #[test]
    fn test_absolute_abbreviated_month() {
        let parsed = parse_absolute_localized("12 set 2025").unwrap();
        assert_eq!((parsed.year(), parsed.month(), parsed.day()), (2025, 9, 12));
    }

    #[test]
    fn test_absolute_rejects_garbage() {
        assert_eq!(parse_absolute_localized(""), None);
        assert_eq!(parse_absolute_localized("Sem data"), None);
        assert_eq!(parse_absolute_localized("31 de fevereiro de 2025"), None);
        assert_eq!(parse_absolute_localized("10 de brumário de 2025"), None);
        assert_eq!(parse_absolute_localized("32/01/2025"), None);
        assert_eq!(parse_absolute_localized("há 2 dias"), None);
    }

    #[test]
    fn test_resolve_prefers_absolute_then_relative() {
        let now = Utc.with_ymd_and_hms(2025, 10, 1, 12, 0, 0).unwrap();

        let absolute = resolve_timestamp("10 de setembro de 2025 às 10h55", now, brasilia()).unwrap();
        assert_eq!(absolute, Utc.with_ymd_and_hms(2025, 9, 10, 13, 55, 0).unwrap());

        let relative = resolve_timestamp("há 2 dias", now, brasilia()).unwrap();
        assert_eq!(relative, now - Duration::days(2));

        let iso = resolve_timestamp("2025-09-12T08:00:00-03:00", now, brasilia()).unwrap();
        assert_eq!(iso, Utc.with_ymd_and_hms(2025, 9, 12, 11, 0, 0).unwrap());

        assert_eq!(resolve_timestamp("   ", now, brasilia()), None);
        assert_eq!(resolve_timestamp("Compartilhe", now, brasilia()), None);
    }
}
