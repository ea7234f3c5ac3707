//! Portuguese text normalisation for the saved text sections.
//!
//! Tokens are lowercased words made only of Portuguese letters, without
//! stopwords and shorter than three characters. Stems come from a light
//! suffix stripper; lemmas are the singular form of each token.

use std::collections::HashSet;

use fa_core::{TextProcessor, TokenizedText};
use lazy_static::lazy_static;

mod stemmer;

pub use stemmer::{singularize, stem};

const STOPWORDS: &[&str] = &[
    "a", "ao", "aos", "aquela", "aquelas", "aquele", "aqueles", "aquilo", "as", "até", "com",
    "como", "da", "das", "de", "dela", "delas", "dele", "deles", "depois", "do", "dos", "e", "ela",
    "elas", "ele", "eles", "em", "entre", "era", "eram", "essa", "essas", "esse", "esses", "esta",
    "estas", "este", "estes", "está", "estão", "eu", "foi", "foram", "há", "isso", "isto", "já",
    "lhe", "lhes", "mais", "mas", "mesmo", "meu", "minha", "muito", "na", "nas", "nem", "no",
    "nos", "nossa", "nosso", "num", "numa", "não", "nós", "o", "os", "ou", "para", "pela",
    "pelas", "pelo", "pelos", "por", "qual", "quando", "que", "quem", "se", "seja", "sem", "ser",
    "será", "seu", "seus", "sua", "suas", "são", "também", "te", "tem", "têm", "ter", "teve",
    "tinha", "um", "uma", "umas", "uns", "você", "vocês", "à", "às", "é", "sobre", "ainda",
    "após", "cada", "onde", "pode", "podem", "segundo", "disse", "afirmou", "estava", "estavam",
    "sido", "tenha", "tinham", "todos", "todas", "todo", "toda", "outro", "outra", "outros",
    "outras", "ano", "anos",
];

lazy_static! {
    static ref STOPWORD_SET: HashSet<&'static str> = STOPWORDS.iter().copied().collect();
}

const PORTUGUESE_LETTERS: &str = "áéíóúâêîôûãõç";

fn is_portuguese_letter(c: char) -> bool {
    c.is_ascii_lowercase() || PORTUGUESE_LETTERS.contains(c)
}

/// Lowercases, drops ASCII punctuation, then splits on anything that is not
/// a Portuguese letter.
pub fn tokenize(text: &str) -> Vec<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_ascii_punctuation())
        .map(|c| if is_portuguese_letter(c) { c } else { ' ' })
        .collect();

    cleaned
        .split_whitespace()
        .filter(|token| !STOPWORD_SET.contains(token))
        .filter(|token| token.chars().count() > 2)
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BasicTextProcessor;

impl BasicTextProcessor {
    pub fn new() -> Self {
        Self
    }
}

impl TextProcessor for BasicTextProcessor {
    fn process(&self, text: &str) -> TokenizedText {
        let tokens = tokenize(text);
        let stems = tokens.iter().map(|t| stem(t)).collect();
        let lemmas = tokens.iter().map(|t| singularize(t)).collect();
        TokenizedText { tokens, stems, lemmas }
    }
}
