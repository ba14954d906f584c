//! Styleguide parser seam.
//!
//! Comment-block parsing lives outside this workspace. A [`StyleguideParser`]
//! turns combined source text into a [`Styleguide`]; [`JsonStyleguideParser`]
//! reads section records that an upstream comment parser has already
//! produced.

use std::collections::HashSet;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::record::SectionRecord;
use crate::reference;
use crate::styleguide::Styleguide;

/// Options forwarded opaquely to a parser.
pub type ParserOptions = Map<String, Value>;

/// Error returned when parsing fails.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Input is not valid JSON or does not match the record schema.
    #[error("JSON error in document {document}: {source}")]
    Json {
        /// Zero-based index of the offending document.
        document: usize,
        /// Underlying decoder error.
        #[source]
        source: serde_json::Error,
    },
    /// Two records share a reference.
    #[error("Duplicate section reference: {0}")]
    DuplicateReference(String),
    /// Parser-specific failure.
    #[error("{0}")]
    Other(String),
}

/// Turns combined source text into a style guide.
pub trait StyleguideParser {
    /// Parse the combined text of every input document.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if the source cannot be parsed.
    fn parse(&self, source: &str, options: &ParserOptions) -> Result<Styleguide, ParseError>;
}

/// One JSON document: a bare record list or an object wrapping one.
#[derive(Deserialize)]
#[serde(untagged)]
enum Document {
    List(Vec<SectionRecord>),
    Wrapped { sections: Vec<SectionRecord> },
}

/// Parser for pre-parsed section records in JSON.
///
/// Accepts any number of whitespace-separated JSON documents, each an array
/// of records or an object with a `sections` array.
///
/// Recognized options:
/// - `infer_depth` (bool, default `true`): replace a zero `depth` with the
///   number of reference segments.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonStyleguideParser;

impl StyleguideParser for JsonStyleguideParser {
    fn parse(&self, source: &str, options: &ParserOptions) -> Result<Styleguide, ParseError> {
        let infer_depth = options
            .get("infer_depth")
            .and_then(Value::as_bool)
            .unwrap_or(true);

        let mut sections = Vec::new();
        let stream = serde_json::Deserializer::from_str(source).into_iter::<Document>();
        for (document, item) in stream.enumerate() {
            let records = match item.map_err(|source| ParseError::Json { document, source })? {
                Document::List(records) | Document::Wrapped { sections: records } => records,
            };
            sections.extend(records);
        }

        let mut seen = HashSet::new();
        for section in &mut sections {
            if !seen.insert(section.reference.clone()) {
                return Err(ParseError::DuplicateReference(section.reference.clone()));
            }
            if infer_depth && section.depth == 0 {
                section.depth = reference::depth(&section.reference);
            }
        }

        tracing::debug!(sections = sections.len(), "Parsed styleguide");
        Ok(Styleguide::new(sections))
    }
}
