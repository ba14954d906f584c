//! Section tree grouping and multi-page style guide rendering for KSS.
//!
//! This crate provides:
//! - [`collect_roots`] / [`SectionTree`]: hierarchy rebuilt from dotted references
//! - [`Projector`]: grouped sections projected into template data
//! - [`JinjaTemplates`] / [`PageEmitter`]: page rendering
//! - [`Pipeline`]: input buffering, parsing and the master → section →
//!   subsection emission pass
//!
//! # Quick Start
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::path::Path;
//! use kss_config::Config;
//! use kss_sections::JsonStyleguideParser;
//! use kss_site::{DirectorySink, InputItem, JinjaTemplates, Pipeline, PipelineSettings};
//!
//! let config = Config::load(None, None)?;
//! let templates = JinjaTemplates::load(&config.require_templates()?, "")?;
//! let mut pipeline = Pipeline::new(&JsonStyleguideParser, &templates, PipelineSettings::default());
//!
//! pipeline.push(InputItem::from_path(Path::new("styles/sections.json"))?)?;
//! let summary = pipeline.finish(&mut DirectorySink::new())?;
//! # Ok(())
//! # }
//! ```

mod group;
mod page;
mod pipeline;
mod project;
mod roots;
mod sink;
mod template;

pub use group::{SectionNode, SectionTree, group_root};
pub use page::{MASTER_FILENAME, OutputPage, PageContext, PageEmitter, section_filename};
pub use pipeline::{
    BuildSummary, InputError, InputItem, Pipeline, PipelineError, PipelineSettings, PipelineState,
};
pub use project::{GroupedSection, ProjectedModifier, Projector, section_url};
pub use roots::collect_roots;
pub use sink::{DirectorySink, PageSink, SinkError};
pub use template::{JinjaTemplates, PageKind, PageTemplates, TemplateError, TemplateSources};
