/// Plural endings and their singular replacement, longest first.
const PLURAL_RULES: &[(&str, &str)] = &[
    ("ões", "ão"),
    ("ães", "ão"),
    ("ais", "al"),
    ("éis", "el"),
    ("eis", "el"),
    ("óis", "ol"),
    ("res", "r"),
    ("zes", "z"),
    ("ns", "m"),
    ("s", ""),
];

/// Derivational and inflectional endings, longest first.
const SUFFIXES: &[&str] = &[
    "amentos", "imentos", "amento", "imento", "idades", "mente", "idade", "ância", "ência",
    "adora", "ações", "ação", "ador", "ável", "ível", "ismo", "ista", "aram", "eram", "iram",
    "ando", "endo", "indo", "izar", "ado", "ada", "ido", "ida", "eza", "ção", "ar", "er", "ir",
    "ou", "am", "em", "a", "o", "e",
];

const MIN_STEM_CHARS: usize = 3;

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Plural to singular, e.g. `ações` → `ação`, `valores` → `valor`.
pub fn singularize(word: &str) -> String {
    if char_len(word) <= 3 || word.ends_with("ss") || word.ends_with("us") {
        return word.to_string();
    }
    for (suffix, replacement) in PLURAL_RULES {
        if let Some(base) = word.strip_suffix(suffix) {
            if char_len(base) + char_len(replacement) >= MIN_STEM_CHARS {
                return format!("{}{}", base, replacement);
            }
        }
    }
    word.to_string()
}

pub fn stem(word: &str) -> String {
    let singular = singularize(word);
    for suffix in SUFFIXES {
        if let Some(base) = singular.strip_suffix(suffix) {
            if char_len(base) >= MIN_STEM_CHARS {
                return base.to_string();
            }
        }
    }
    singular
}
