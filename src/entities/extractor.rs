//! Entity extractor seam.

use crate::entities::{EntityLabel, EntityMap};
use crate::error::{Result, HelplineError};

/// Trait for span extraction over transcript text.
///
/// This trait allows swapping implementations (real model vs mock).
/// Implementations load their model once at construction — extraction calls
/// never reload anything.
pub trait EntityExtractor: Send + Sync {
    /// Extract spans for the three fixed labels.
    ///
    /// Empty input must yield an [`EntityMap`] with three empty lists, not
    /// an error.
    fn extract(&self, text: &str) -> Result<EntityMap>;

    /// Get the name of the loaded model
    fn model_name(&self) -> &str;
}

/// Mock entity extractor for testing
#[derive(Debug, Clone)]
pub struct MockEntityExtractor {
    model_name: String,
    spans: Vec<(EntityLabel, String)>,
    should_fail: bool,
}

impl MockEntityExtractor {
    /// Create a mock that extracts nothing
    pub fn new() -> Self {
        Self {
            model_name: "mock-extractor".to_string(),
            spans: Vec::new(),
            should_fail: false,
        }
    }

    /// Add a span the mock will report, in call order
    pub fn with_span(mut self, label: EntityLabel, span: &str) -> Self {
        self.spans.push((label, span.to_string()));
        self
    }

    /// Configure the mock to fail on extract
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl Default for MockEntityExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityExtractor for MockEntityExtractor {
    fn extract(&self, text: &str) -> Result<EntityMap> {
        if self.should_fail {
            return Err(HelplineError::EntityExtraction {
                message: "mock extraction failure".to_string(),
            });
        }
        let mut map = EntityMap::new();
        if text.trim().is_empty() {
            return Ok(map);
        }
        for (label, span) in &self.spans {
            map.push(*label, span.clone());
        }
        Ok(map)
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_extracts_configured_spans_in_order() {
        let extractor = MockEntityExtractor::new()
            .with_span(EntityLabel::Name, "John Smith")
            .with_span(EntityLabel::Location, "Springfield")
            .with_span(EntityLabel::Emergency, "heart attack");

        let map = extractor.extract("some transcript").unwrap();

        assert_eq!(map.get(EntityLabel::Name), &["John Smith"]);
        assert_eq!(map.get(EntityLabel::Location), &["Springfield"]);
        assert_eq!(map.get(EntityLabel::Emergency), &["heart attack"]);
    }

    #[test]
    fn mock_empty_text_yields_three_empty_lists() {
        let extractor = MockEntityExtractor::new().with_span(EntityLabel::Name, "ignored");

        let map = extractor.extract("").unwrap();

        for label in EntityLabel::ALL {
            assert!(map.get(label).is_empty());
        }
    }

    #[test]
    fn mock_whitespace_text_counts_as_empty() {
        let extractor = MockEntityExtractor::new().with_span(EntityLabel::Location, "x");
        let map = extractor.extract("   \n  ").unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn mock_failure_returns_error() {
        let extractor = MockEntityExtractor::new().with_failure();
        assert!(extractor.extract("text").is_err());
    }

    #[test]
    fn extractor_trait_is_object_safe() {
        let extractor: Box<dyn EntityExtractor> = Box::new(MockEntityExtractor::new());
        assert_eq!(extractor.model_name(), "mock-extractor");
        assert!(extractor.extract("hello").unwrap().is_empty());
    }
}
