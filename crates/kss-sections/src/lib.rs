//! Section reference types and styleguide records for KSS.
//!
//! This crate provides:
//! - [`reference`]: dotted reference utilities (roots, dashed ids, ordering)
//! - [`SectionRecord`] / [`ModifierRecord`]: parsed documentation records
//! - [`Styleguide`]: the parsed collection with lookup and glob queries
//! - [`StyleguideParser`]: the parser seam, with a JSON implementation

mod parser;
mod record;
pub mod reference;
mod styleguide;

pub use parser::{JsonStyleguideParser, ParseError, ParserOptions, StyleguideParser};
pub use record::{ModifierRecord, SectionRecord};
pub use reference::RootOrder;
pub use styleguide::Styleguide;
