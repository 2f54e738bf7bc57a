//! Lemma extraction module
//!
//! Reduces text to normalized word forms (lemmas) with occurrence counts.
//! Tokens are split per script (Cyrillic for Russian, Latin for English),
//! function words and single letters are dropped, and the remaining words
//! are stemmed to a shared normal form.

mod extractor;
mod language;
mod morphology;

pub use extractor::{strip_markup, LemmaExtractor};
pub use language::Language;
pub use morphology::{Morphology, SnowballMorphology};
