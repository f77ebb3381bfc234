//! Emotion and priority types, and the classifier seam.

use std::fmt;

/// The closed set of caller emotions the classifier can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Emotion {
    Happy,
    Neutral,
    Sad,
    Angry,
    Fearful,
}

impl Emotion {
    /// All known emotions, in classifier label order.
    pub const ALL: [Emotion; 5] = [
        Emotion::Happy,
        Emotion::Neutral,
        Emotion::Sad,
        Emotion::Angry,
        Emotion::Fearful,
    ];

    /// Parse a classifier label. Returns None for anything outside the
    /// closed set.
    pub fn from_label(label: &str) -> Option<Emotion> {
        match label {
            "Happy" => Some(Emotion::Happy),
            "Neutral" => Some(Emotion::Neutral),
            "Sad" => Some(Emotion::Sad),
            "Angry" => Some(Emotion::Angry),
            "Fearful" => Some(Emotion::Fearful),
            _ => None,
        }
    }

    /// The triage priority tier for this emotion.
    ///
    /// This mapping is a fixed total order: calmer states rank lower.
    pub fn priority(&self) -> Priority {
        match self {
            Emotion::Happy => Priority::Low,
            Emotion::Neutral => Priority::Moderate,
            Emotion::Sad => Priority::High,
            Emotion::Angry => Priority::Serious,
            Emotion::Fearful => Priority::Critical,
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Emotion::Happy => "Happy",
            Emotion::Neutral => "Neutral",
            Emotion::Sad => "Sad",
            Emotion::Angry => "Angry",
            Emotion::Fearful => "Fearful",
        };
        f.write_str(s)
    }
}

/// Triage priority tier, derived solely from detected emotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Priority {
    Low,
    Moderate,
    High,
    Serious,
    Critical,
    /// Label outside the known set, or classification failed.
    Unknown,
}

impl Priority {
    /// Priority for an arbitrary label string.
    ///
    /// Labels outside the five known emotions map to `Unknown` rather than
    /// failing.
    pub fn for_label(label: &str) -> Priority {
        Emotion::from_label(label)
            .map(|e| e.priority())
            .unwrap_or(Priority::Unknown)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Priority::Low => "Low",
            Priority::Moderate => "Moderate",
            Priority::High => "High",
            Priority::Serious => "Serious",
            Priority::Critical => "Critical",
            Priority::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

/// Outcome of one emotion classification.
///
/// Failure is an explicit variant rather than an error path: the classifier
/// never raises to its caller, and the surface always has a displayable
/// label/priority pair.
#[derive(Debug, Clone, PartialEq)]
pub enum EmotionReading {
    /// The model reported one of the five known emotions.
    Detected(Emotion),
    /// The model reported a label outside the known set.
    Unrecognized(String),
    /// Classification failed (unreadable audio, inference error).
    Failed,
}

impl EmotionReading {
    /// Displayable label: the emotion name, the raw unrecognized label, or
    /// "Error" for failures.
    pub fn label(&self) -> String {
        match self {
            EmotionReading::Detected(emotion) => emotion.to_string(),
            EmotionReading::Unrecognized(label) => label.clone(),
            EmotionReading::Failed => "Error".to_string(),
        }
    }

    /// Priority tier for this reading. Unrecognized labels and failures are
    /// both `Unknown`.
    pub fn priority(&self) -> Priority {
        match self {
            EmotionReading::Detected(emotion) => emotion.priority(),
            EmotionReading::Unrecognized(_) | EmotionReading::Failed => Priority::Unknown,
        }
    }
}

/// Trait for emotion classification over canonical-rate samples.
///
/// This trait allows swapping implementations (real model vs mock).
/// Implementations must never return an error from `detect`; failures are
/// reported through [`EmotionReading::Failed`].
pub trait EmotionClassifier: Send + Sync {
    /// Classify mono 16kHz samples.
    fn detect(&self, samples: &[f32]) -> EmotionReading;

    /// Get the name of the loaded model
    fn model_name(&self) -> &str;
}

/// Mock emotion classifier for testing
#[derive(Debug, Clone)]
pub struct MockEmotionClassifier {
    model_name: String,
    reading: EmotionReading,
}

impl MockEmotionClassifier {
    /// Create a mock that reports Neutral by default
    pub fn new() -> Self {
        Self {
            model_name: "mock-emotion".to_string(),
            reading: EmotionReading::Detected(Emotion::Neutral),
        }
    }

    /// Configure the mock to report a specific emotion
    pub fn with_emotion(mut self, emotion: Emotion) -> Self {
        self.reading = EmotionReading::Detected(emotion);
        self
    }

    /// Configure the mock to report a classification failure
    pub fn with_failure(mut self) -> Self {
        self.reading = EmotionReading::Failed;
        self
    }

    /// Configure the mock to report an out-of-set label
    pub fn with_unrecognized(mut self, label: &str) -> Self {
        self.reading = EmotionReading::Unrecognized(label.to_string());
        self
    }
}

impl Default for MockEmotionClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl EmotionClassifier for MockEmotionClassifier {
    fn detect(&self, _samples: &[f32]) -> EmotionReading {
        self.reading.clone()
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_mapping_is_the_fixed_table() {
        assert_eq!(Emotion::Happy.priority(), Priority::Low);
        assert_eq!(Emotion::Neutral.priority(), Priority::Moderate);
        assert_eq!(Emotion::Sad.priority(), Priority::High);
        assert_eq!(Emotion::Angry.priority(), Priority::Serious);
        assert_eq!(Emotion::Fearful.priority(), Priority::Critical);
    }

    #[test]
    fn priority_for_label_matches_table_for_all_five() {
        for emotion in Emotion::ALL {
            assert_eq!(Priority::for_label(&emotion.to_string()), emotion.priority());
        }
    }

    #[test]
    fn priority_for_unknown_labels_is_unknown() {
        assert_eq!(Priority::for_label("Surprised"), Priority::Unknown);
        assert_eq!(Priority::for_label("LABEL_7"), Priority::Unknown);
        assert_eq!(Priority::for_label(""), Priority::Unknown);
        assert_eq!(Priority::for_label("happy"), Priority::Unknown); // case-sensitive
    }

    #[test]
    fn from_label_roundtrips_display() {
        for emotion in Emotion::ALL {
            assert_eq!(Emotion::from_label(&emotion.to_string()), Some(emotion));
        }
        assert_eq!(Emotion::from_label("Bored"), None);
    }

    #[test]
    fn failed_reading_renders_error_unknown() {
        let reading = EmotionReading::Failed;
        assert_eq!(reading.label(), "Error");
        assert_eq!(reading.priority(), Priority::Unknown);
    }

    #[test]
    fn unrecognized_reading_keeps_raw_label() {
        let reading = EmotionReading::Unrecognized("LABEL_9".to_string());
        assert_eq!(reading.label(), "LABEL_9");
        assert_eq!(reading.priority(), Priority::Unknown);
    }

    #[test]
    fn priority_display_names() {
        assert_eq!(Priority::Low.to_string(), "Low");
        assert_eq!(Priority::Moderate.to_string(), "Moderate");
        assert_eq!(Priority::High.to_string(), "High");
        assert_eq!(Priority::Serious.to_string(), "Serious");
        assert_eq!(Priority::Critical.to_string(), "Critical");
        assert_eq!(Priority::Unknown.to_string(), "Unknown");
    }

    #[test]
    fn priority_orders_by_urgency() {
        assert!(Priority::Low < Priority::Moderate);
        assert!(Priority::Moderate < Priority::High);
        assert!(Priority::High < Priority::Serious);
        assert!(Priority::Serious < Priority::Critical);
    }

    #[test]
    fn mock_classifier_reports_configured_reading() {
        let classifier = MockEmotionClassifier::new().with_emotion(Emotion::Angry);
        let reading = classifier.detect(&[0.0; 160]);
        assert_eq!(reading, EmotionReading::Detected(Emotion::Angry));
        assert_eq!(reading.priority(), Priority::Serious);
    }

    #[test]
    fn mock_classifier_failure_never_errors() {
        let classifier = MockEmotionClassifier::new().with_failure();
        let reading = classifier.detect(&[]);
        assert_eq!(reading, EmotionReading::Failed);
    }

    #[test]
    fn classifier_trait_is_object_safe() {
        let classifier: Box<dyn EmotionClassifier> =
            Box::new(MockEmotionClassifier::new().with_unrecognized("Tense"));
        assert_eq!(classifier.detect(&[0.0]).label(), "Tense");
        assert_eq!(classifier.model_name(), "mock-emotion");
    }
}
