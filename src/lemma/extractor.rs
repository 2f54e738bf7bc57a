use crate::lemma::morphology::{Morphology, SnowballMorphology};
use crate::lemma::Language;
use scraper::{Html, Node};
use std::collections::HashMap;

/// Turns text into lemma counts
///
/// Holds one morphology per supported language. Construction loads the
/// stemmers once; the extractor is then shared read-only between tasks.
pub struct LemmaExtractor {
    morphologies: Vec<Box<dyn Morphology>>,
}

impl LemmaExtractor {
    /// Creates an extractor for every supported language
    pub fn new() -> Self {
        Self {
            morphologies: Language::ALL
                .into_iter()
                .map(|lang| Box::new(SnowballMorphology::new(lang)) as Box<dyn Morphology>)
                .collect(),
        }
    }

    fn morphology(&self, language: Language) -> Option<&dyn Morphology> {
        self.morphologies
            .iter()
            .find(|m| m.language() == language)
            .map(|m| m.as_ref())
    }

    /// Counts the lemmas of `text` in one language
    ///
    /// Tokens outside the language's script are ignored, as are
    /// single-letter tokens and function words.
    ///
    /// # Arguments
    ///
    /// * `text` - Plain text to analyze
    /// * `language` - Which script and morphology to apply
    ///
    /// # Returns
    ///
    /// A map from lemma to its occurrence count
    pub fn extract(&self, text: &str, language: Language) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        let Some(morphology) = self.morphology(language) else {
            return counts;
        };

        for token in language.tokenize(text) {
            if token.chars().count() < 2 || morphology.is_function_word(&token) {
                continue;
            }
            let lemma = morphology.normal_form(&token);
            if lemma.is_empty() {
                continue;
            }
            *counts.entry(lemma).or_insert(0) += 1;
        }

        counts
    }

    /// Counts the lemmas of `text` across every supported language
    pub fn extract_all(&self, text: &str) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for language in Language::ALL {
            for (lemma, count) in self.extract(text, language) {
                *counts.entry(lemma).or_insert(0) += count;
            }
        }
        counts
    }

    /// Counts the lemmas of the visible text of an HTML document
    pub fn extract_from_html(&self, html: &str) -> HashMap<String, usize> {
        self.extract_all(&strip_markup(html))
    }

    /// Returns true if the token is a function word in the language of its script
    ///
    /// Tokens that mix scripts or contain no letters are not function words.
    pub fn is_function_word(&self, token: &str) -> bool {
        let token = token.to_lowercase().replace('ё', "е");
        let Some(language) = token.chars().next().and_then(Language::of_letter) else {
            return false;
        };
        if !token.chars().all(|c| language.is_letter(c)) {
            return false;
        }
        self.morphology(language)
            .map(|m| m.is_function_word(&token))
            .unwrap_or(false)
    }

    /// Splits a query into the words worth highlighting, in query order
    ///
    /// A word is a lowercase run of letters from a single script. Words
    /// shorter than two letters and function words are dropped.
    pub fn query_words(&self, query: &str) -> Vec<String> {
        let mut words: Vec<String> = Vec::new();
        let mut current = String::new();
        let mut current_lang: Option<Language> = None;

        for c in query.chars().flat_map(char::to_lowercase) {
            let lang = Language::of_letter(c);
            if lang.is_some() && lang == current_lang {
                current.push(c);
                continue;
            }
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            current_lang = lang;
            if lang.is_some() {
                current.push(c);
            }
        }
        if !current.is_empty() {
            words.push(current);
        }

        let mut seen = Vec::new();
        for word in words {
            if word.chars().count() >= 2 && !self.is_function_word(&word) && !seen.contains(&word) {
                seen.push(word);
            }
        }
        seen
    }

    /// Removes markup from an HTML document and lowercases the text
    pub fn strip_markup(&self, html: &str) -> String {
        strip_markup(html)
    }
}

impl Default for LemmaExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Extracts the lowercase visible text of an HTML document
///
/// Text inside `script` and `style` elements is skipped and runs of
/// whitespace collapse to a single space.
pub fn strip_markup(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut text = String::new();

    for node in document.tree.root().descendants() {
        let Node::Text(chunk) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| match ancestor.value() {
            Node::Element(el) => matches!(el.name(), "script" | "style" | "noscript"),
            _ => false,
        });
        if !hidden {
            text.push_str(chunk);
            text.push(' ');
        }
    }

    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
