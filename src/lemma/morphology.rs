//! Per-language morphology: function-word filtering and normal forms

use crate::lemma::Language;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;

/// Word analysis for a single language
pub trait Morphology: Send + Sync {
    /// The language this morphology analyzes
    fn language(&self) -> Language;

    /// Returns true if the lowercase token is an interjection, conjunction,
    /// preposition, particle, or article
    fn is_function_word(&self, token: &str) -> bool;

    /// Reduces a lowercase token to its normal form
    fn normal_form(&self, token: &str) -> String;
}

const RUSSIAN_FUNCTION_WORDS: &[&str] = &[
    // prepositions
    "без", "безо", "близ", "в", "во", "вместо", "вне", "для", "до", "за", "из", "изо", "около",
    "к", "ко", "кроме", "между", "меж", "на", "над", "надо", "о", "об", "обо", "от",
    "ото", "перед", "передо", "пред", "по", "под", "подо", "при", "про", "ради", "с", "со",
    "сквозь", "среди", "у", "через", "чрез", "возле", "вокруг", "после", "против",
    // conjunctions
    "и", "а", "но", "или", "либо", "да", "зато", "однако", "что", "чтобы", "если", "когда",
    "хотя", "хоть", "будто", "словно", "как", "так", "тоже", "также", "потому", "поэтому",
    "пока", "едва", "ибо", "причем", "притом", "раз", "коли", "нежели", "чем",
    // particles
    "не", "ни", "же", "ли", "ль", "бы", "б", "вот", "вон", "ведь", "даже", "уже", "лишь",
    "только", "разве", "неужели", "именно", "почти", "ка", "то", "таки", "дескать", "мол",
    // interjections
    "ах", "ох", "эх", "ой", "ай", "ух", "эй", "ну", "увы", "ура", "ого", "ага", "фу", "тьфу",
    "батюшки",
];

const ENGLISH_FUNCTION_WORDS: &[&str] = &[
    // articles
    "a", "an", "the",
    // prepositions
    "about", "above", "across", "after", "against", "along", "among", "around", "at", "before",
    "behind", "below", "beneath", "beside", "between", "beyond", "by", "despite", "down",
    "during", "except", "for", "from", "in", "inside", "into", "near", "of", "off", "on", "onto",
    "out", "outside", "over", "past", "since", "through", "throughout", "till", "to", "toward",
    "towards", "under", "underneath", "until", "up", "upon", "via", "with", "within", "without",
    // conjunctions
    "and", "or", "but", "nor", "so", "yet", "if", "because", "although", "though", "while",
    "whereas", "unless", "whether", "than", "as", "once", "lest",
    // particles
    "not", "no",
    // interjections
    "oh", "ah", "wow", "hey", "oops", "ouch", "hmm", "alas", "hooray", "ugh", "uh", "um", "yeah",
];

/// Morphology backed by a Snowball stemmer and a closed-class word list
pub struct SnowballMorphology {
    language: Language,
    stemmer: Stemmer,
    function_words: HashSet<&'static str>,
}

impl SnowballMorphology {
    /// Loads the stemmer and word list for a language
    pub fn new(language: Language) -> Self {
        let (algorithm, words) = match language {
            Language::Russian => (Algorithm::Russian, RUSSIAN_FUNCTION_WORDS),
            Language::English => (Algorithm::English, ENGLISH_FUNCTION_WORDS),
        };

        Self {
            language,
            stemmer: Stemmer::create(algorithm),
            function_words: words.iter().copied().collect(),
        }
    }
}

impl Morphology for SnowballMorphology {
    fn language(&self) -> Language {
        self.language
    }

    fn is_function_word(&self, token: &str) -> bool {
        self.function_words.contains(token)
    }

    fn normal_form(&self, token: &str) -> String {
        self.stemmer.stem(token).into_owned()
    }
}
