use serde::Serialize;
use std::fmt;

/// A language the extractor can reduce words for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Language {
    Russian,
    English,
}

impl Language {
    /// Every supported language, in extraction order
    pub const ALL: [Language; 2] = [Language::Russian, Language::English];

    /// Returns true if the lowercase character belongs to this language's script
    pub fn is_letter(&self, c: char) -> bool {
        match self {
            Self::Russian => ('а'..='я').contains(&c) || c == 'ё',
            Self::English => c.is_ascii_lowercase(),
        }
    }

    /// Returns the language whose script contains the lowercase character
    pub fn of_letter(c: char) -> Option<Language> {
        Self::ALL.into_iter().find(|lang| lang.is_letter(c))
    }

    /// Splits text into lowercase runs of this language's letters
    ///
    /// Everything outside the script acts as a separator. Cyrillic `ё` is
    /// folded to `е`.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let mut tokens = Vec::new();
        let mut current = String::new();

        for c in text.chars().flat_map(char::to_lowercase) {
            if self.is_letter(c) {
                current.push(if c == 'ё' { 'е' } else { c });
            } else if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
        }
        if !current.is_empty() {
            tokens.push(current);
        }

        tokens
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Russian => f.write_str("russian"),
            Self::English => f.write_str("english"),
        }
    }
}
