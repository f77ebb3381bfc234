//! Named entity extraction from call transcripts.

pub mod extractor;
pub mod span_model;

pub use extractor::{EntityExtractor, MockEntityExtractor};
pub use span_model::BertSpanExtractor;

use std::fmt;

/// The fixed label set entities are extracted against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityLabel {
    Name,
    Location,
    Emergency,
}

impl EntityLabel {
    /// All target labels, in display order.
    pub const ALL: [EntityLabel; 3] = [
        EntityLabel::Name,
        EntityLabel::Location,
        EntityLabel::Emergency,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityLabel::Name => "Name",
            EntityLabel::Location => "Location",
            EntityLabel::Emergency => "Emergency",
        }
    }
}

impl fmt::Display for EntityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extracted spans grouped by label.
///
/// All three labels are always present — by construction, not by convention.
/// Lists preserve extraction order and keep duplicates.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EntityMap {
    names: Vec<String>,
    locations: Vec<String>,
    emergencies: Vec<String>,
}

impl EntityMap {
    /// An entity map with all three labels mapped to empty lists.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a span under its label, preserving insertion order.
    pub fn push(&mut self, label: EntityLabel, span: String) {
        match label {
            EntityLabel::Name => self.names.push(span),
            EntityLabel::Location => self.locations.push(span),
            EntityLabel::Emergency => self.emergencies.push(span),
        }
    }

    /// Spans for one label, in extraction order.
    pub fn get(&self, label: EntityLabel) -> &[String] {
        match label {
            EntityLabel::Name => &self.names,
            EntityLabel::Location => &self.locations,
            EntityLabel::Emergency => &self.emergencies,
        }
    }

    /// Extracted location spans.
    pub fn locations(&self) -> &[String] {
        &self.locations
    }

    /// True when every label maps to an empty list.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty() && self.locations.is_empty() && self.emergencies.is_empty()
    }
}

impl fmt::Display for EntityMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, label) in EntityLabel::ALL.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}: [{}]", label, self.get(*label).join(", "))?;
        }
        Ok(())
    }
}
