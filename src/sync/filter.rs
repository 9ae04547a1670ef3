use regex::{Regex, RegexBuilder};

use crate::model::flight::{Flight, FlightField};

/// The predicate of the search projection: the search text, matched
/// literally and case-insensitively against a set of payload fields.
#[derive(Debug, Clone)]
pub struct SearchFilter {
    text: String,
    re: Regex,
    fields: Vec<FlightField>,
}

impl SearchFilter {
    /// Build a filter for `text`. Blank text means no search is in effect,
    /// which is `Ok(None)`.
    pub fn new(text: &str, fields: &[FlightField]) -> Result<Option<Self>, regex::Error> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        let re = RegexBuilder::new(&regex::escape(trimmed))
            .case_insensitive(true)
            .build()?;
        Ok(Some(SearchFilter {
            text: trimmed.to_string(),
            re,
            fields: fields.to_vec(),
        }))
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn matches(&self, flight: &Flight) -> bool {
        self.fields
            .iter()
            .any(|field| self.re.is_match(flight.field(*field)))
    }
}
