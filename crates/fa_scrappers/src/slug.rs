use deunicode::deunicode;

/// Turns a company name into the URL slug used by topic listing pages.
///
/// Diacritics are transliterated ("Petrobrás" -> "petrobras"), whitespace
/// runs collapse into a single hyphen, and anything outside `[a-z0-9-]`
/// is dropped.
pub fn slugify(name: &str) -> String {
    deunicode(name)
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_examples() {
        assert_eq!(slugify("Petrobras"), "petrobras");
        assert_eq!(slugify("Banco do Brasil"), "banco-do-brasil");
        assert_eq!(slugify("Itaú Unibanco"), "itau-unibanco");
        assert_eq!(slugify("  Vale   S.A. "), "vale-sa");
        assert_eq!(slugify("Magazine Luiza (Magalu)"), "magazine-luiza-magalu");
    }

    #[test]
    fn test_slugify_charset_and_idempotence() {
        for name in ["Ambev S/A", "Eletrobrás", "B3 — Brasil Bolsa Balcão", ""] {
            let slug = slugify(name);
            assert!(slug
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
            assert_eq!(slugify(&slug), slug);
        }
    }
}
