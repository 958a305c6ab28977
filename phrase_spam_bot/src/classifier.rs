use std::sync::Arc;

use crate::{language::LanguageDetector, phrases::PhraseCatalog, types::Classification};

/// Decides whether a message is spam: detects its language, then looks for
/// any of that language's phrases inside it.
#[derive(Debug)]
pub struct SpamClassifier {
    detector: LanguageDetector,
    catalog: Arc<PhraseCatalog>,
}

impl SpamClassifier {
    pub fn new(detector: LanguageDetector, catalog: Arc<PhraseCatalog>) -> Self {
        Self { detector, catalog }
    }

    pub fn detector(&self) -> &LanguageDetector {
        &self.detector
    }

    pub fn catalog(&self) -> &Arc<PhraseCatalog> {
        &self.catalog
    }

    /// Matching is plain case-insensitive substring containment, with no word boundaries:
    /// a phrase "sign" matches "assignment". Only phrases of the detected language count.
    pub fn classify(&self, text: &str) -> Classification {
        let language = self.detector.detect(text).to_string();
        let matched_phrase = self.catalog.find_match(&language, &text.to_lowercase());

        Classification {
            is_spam: matched_phrase.is_some(),
            language,
            matched_phrase,
        }
    }
}
