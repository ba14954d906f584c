//! Build pipeline.
//!
//! A [`Pipeline`] moves through a fixed sequence of states:
//!
//! 1. `Collecting`: input documents are buffered by [`Pipeline::push`]
//! 2. `Parsed`: [`Pipeline::finish`] parses the combined buffer once
//! 3. `Grouped`: roots are collected and sections grouped and projected
//! 4. `Emitting`: the master page, then each section page followed by its
//!    subsection pages, are rendered and handed to the sink
//! 5. `Done` (or `Failed`)
//!
//! A parse error stops the pipeline before any page is emitted. Two
//! sections whose references dash to the same id (`"1.1"` and `"1-1"`)
//! would share a page path; the run fails instead of overwriting one.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use kss_sections::{ParseError, ParserOptions, RootOrder, StyleguideParser};

use crate::group::SectionTree;
use crate::page::{MASTER_FILENAME, PageContext, PageEmitter, section_filename};
use crate::project::{GroupedSection, Projector};
use crate::sink::{PageSink, SinkError};
use crate::template::{PageKind, PageTemplates, TemplateError};

/// One input document as delivered by the input source.
#[derive(Debug)]
pub enum InputItem {
    /// Nothing to read (e.g., a directory). Ignored.
    Empty,
    /// Fully materialized content.
    Contents {
        /// Source path.
        path: PathBuf,
        /// Raw bytes (must be UTF-8).
        contents: Vec<u8>,
    },
    /// An open stream. Not supported.
    Stream {
        /// Source path.
        path: PathBuf,
    },
}

impl InputItem {
    /// Classify and read a filesystem path.
    ///
    /// Directories are [`InputItem::Empty`], regular files are read into
    /// [`InputItem::Contents`], and anything else (pipes, devices) is a
    /// [`InputItem::Stream`].
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the path cannot be inspected or read.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let metadata = std::fs::metadata(path)?;
        if metadata.is_dir() {
            Ok(Self::Empty)
        } else if metadata.is_file() {
            Ok(Self::Contents {
                path: path.to_path_buf(),
                contents: std::fs::read(path)?,
            })
        } else {
            Ok(Self::Stream {
                path: path.to_path_buf(),
            })
        }
    }
}

/// Error returned for an unusable input item.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    /// The item arrived as an open stream.
    #[error("Streaming not supported: {}", path.display())]
    StreamingNotSupported {
        /// Source path.
        path: PathBuf,
    },
    /// The content is not UTF-8.
    #[error("Input is not valid UTF-8: {}", path.display())]
    InvalidUtf8 {
        /// Source path.
        path: PathBuf,
        /// Decoder error.
        #[source]
        source: std::string::FromUtf8Error,
    },
}

/// Buffer of input documents, owned by one pipeline.
#[derive(Debug, Default)]
struct Accumulator {
    documents: Vec<String>,
    base_dir: Option<PathBuf>,
}

impl Accumulator {
    fn push(&mut self, item: InputItem) -> Result<(), InputError> {
        match item {
            InputItem::Empty => Ok(()),
            InputItem::Stream { path } => Err(InputError::StreamingNotSupported { path }),
            InputItem::Contents { path, contents } => {
                let text = String::from_utf8(contents).map_err(|source| {
                    InputError::InvalidUtf8 {
                        path: path.clone(),
                        source,
                    }
                })?;
                if self.base_dir.is_none() {
                    self.base_dir = Some(path.parent().map(Path::to_path_buf).unwrap_or_default());
                }
                self.documents.push(text);
                Ok(())
            }
        }
    }

    fn combined(&self) -> String {
        self.documents.join("\n")
    }
}

/// Pipeline state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineState {
    /// Accepting input documents.
    Collecting,
    /// Combined input parsed.
    Parsed,
    /// Sections grouped and projected.
    Grouped,
    /// Rendering pages.
    Emitting,
    /// Every page emitted.
    Done,
    /// Stopped by an error.
    Failed,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Collecting => "collecting",
            Self::Parsed => "parsed",
            Self::Grouped => "grouped",
            Self::Emitting => "emitting",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Error returned by the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Unusable input item.
    #[error("Input error: {0}")]
    Input(#[from] InputError),
    /// The parser rejected the combined input.
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    /// Template rendering failed.
    #[error(transparent)]
    Template(#[from] TemplateError),
    /// The sink rejected a page.
    #[error("Output error: {0}")]
    Sink(#[from] SinkError),
    /// Two pages would be written to the same file.
    #[error("Duplicate page path {filename} (from section {reference})")]
    DuplicatePath {
        /// Colliding file name.
        filename: String,
        /// Reference of the section emitted second.
        reference: String,
    },
    /// The pipeline is past the collecting state.
    #[error("Pipeline is {0}; it no longer accepts input")]
    NotCollecting(PipelineState),
}

/// Settings for one pipeline run.
#[derive(Clone, Debug, Default)]
pub struct PipelineSettings {
    /// Output directory. Falls back to the first input's directory.
    pub output_dir: Option<PathBuf>,
    /// Prefix for section links.
    pub base_url: String,
    /// Ordering of roots and siblings.
    pub root_order: RootOrder,
    /// Options forwarded to the parser.
    pub parser_options: ParserOptions,
}

/// Counts from a finished run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuildSummary {
    /// Parsed sections.
    pub sections: usize,
    /// Distinct roots.
    pub roots: usize,
    /// Emitted pages.
    pub pages: usize,
}

/// Turns input documents into style guide pages.
pub struct Pipeline<'p, P: StyleguideParser + ?Sized, T: PageTemplates + ?Sized> {
    parser: &'p P,
    templates: &'p T,
    settings: PipelineSettings,
    accumulator: Accumulator,
    state: PipelineState,
}

impl<'p, P: StyleguideParser + ?Sized, T: PageTemplates + ?Sized> Pipeline<'p, P, T> {
    /// Create a pipeline in the collecting state.
    pub fn new(parser: &'p P, templates: &'p T, settings: PipelineSettings) -> Self {
        Self {
            parser,
            templates,
            settings,
            accumulator: Accumulator::default(),
            state: PipelineState::Collecting,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Buffer one input item.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Input`] for streams or non-UTF-8 content, and
    /// [`PipelineError::NotCollecting`] once [`Pipeline::finish`] has run.
    pub fn push(&mut self, item: InputItem) -> Result<(), PipelineError> {
        if self.state != PipelineState::Collecting {
            return Err(PipelineError::NotCollecting(self.state));
        }
        self.accumulator.push(item)?;
        Ok(())
    }

    /// Parse the buffered input and emit every page to `sink`.
    ///
    /// Runs at most once. On error the pipeline ends in
    /// [`PipelineState::Failed`] and no further pages are emitted.
    ///
    /// # Errors
    ///
    /// Returns the first parse, template or sink error.
    pub fn finish(&mut self, sink: &mut dyn PageSink) -> Result<BuildSummary, PipelineError> {
        if self.state != PipelineState::Collecting {
            return Err(PipelineError::NotCollecting(self.state));
        }
        let result = self.run(sink);
        match &result {
            Ok(summary) => {
                self.transition(PipelineState::Done);
                tracing::info!(
                    pages = summary.pages,
                    roots = summary.roots,
                    sections = summary.sections,
                    "Style guide built"
                );
            }
            Err(e) => {
                self.transition(PipelineState::Failed);
                tracing::error!(error = %e, "Style guide build failed");
            }
        }
        result
    }

    fn transition(&mut self, next: PipelineState) {
        tracing::debug!(from = %self.state, to = %next, "Pipeline transition");
        self.state = next;
    }

    fn run(&mut self, sink: &mut dyn PageSink) -> Result<BuildSummary, PipelineError> {
        let accumulator = std::mem::take(&mut self.accumulator);
        let styleguide = self
            .parser
            .parse(&accumulator.combined(), &self.settings.parser_options)?;
        self.transition(PipelineState::Parsed);

        let tree = SectionTree::build(styleguide.sections(), self.settings.root_order);
        let projector = Projector::new(self.settings.base_url.as_str());
        let groups: Vec<GroupedSection> =
            tree.groups().iter().map(|g| projector.project(g)).collect();
        self.transition(PipelineState::Grouped);

        let base_dir = self
            .settings
            .output_dir
            .clone()
            .or(accumulator.base_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        tracing::info!(
            output = %base_dir.display(),
            roots = tree.roots().len(),
            "Emitting style guide pages"
        );
        self.transition(PipelineState::Emitting);

        let emitter = PageEmitter::new(self.templates, base_dir);
        let mut pages = 0;
        let mut filenames: HashSet<String> = HashSet::new();
        let mut emit = |kind: PageKind,
                        sections: &[GroupedSection],
                        filename: &str|
         -> Result<(), PipelineError> {
            if !filenames.insert(filename.to_owned()) {
                return Err(PipelineError::DuplicatePath {
                    filename: filename.to_owned(),
                    reference: sections
                        .first()
                        .map(|s| s.reference.clone())
                        .unwrap_or_default(),
                });
            }
            let context = PageContext {
                styleguide: &styleguide,
                sections,
                is_master: kind == PageKind::Master,
                section_roots: tree.roots(),
            };
            sink.accept(emitter.emit(kind, &context, filename)?)?;
            pages += 1;
            Ok(())
        };

        emit(PageKind::Master, &groups, MASTER_FILENAME)?;
        for group in &groups {
            emit(
                PageKind::Section,
                std::slice::from_ref(group),
                &section_filename(&group.reference),
            )?;
            for subsection in group.descendants() {
                emit(
                    PageKind::Subsection,
                    std::slice::from_ref(subsection),
                    &section_filename(&subsection.reference),
                )?;
            }
        }

        Ok(BuildSummary {
            sections: styleguide.len(),
            roots: tree.roots().len(),
            pages,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use kss_sections::{JsonStyleguideParser, Styleguide};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::page::OutputPage;

    /// Renders "kind|reference,reference|roots" for each page.
    struct ListingTemplates;

    impl PageTemplates for ListingTemplates {
        fn render(
            &self,
            kind: PageKind,
            context: &PageContext<'_>,
        ) -> Result<String, TemplateError> {
            let refs: Vec<&str> = context
                .sections
                .iter()
                .map(|s| s.reference.as_str())
                .collect();
            Ok(format!(
                "{}|{}|{}",
                kind.template_name(),
                refs.join(","),
                context.section_roots.join(",")
            ))
        }
    }

    /// Rejects every input.
    struct FailingParser;

    impl StyleguideParser for FailingParser {
        fn parse(&self, _: &str, _: &ParserOptions) -> Result<Styleguide, ParseError> {
            Err(ParseError::Other("unterminated comment block".to_owned()))
        }
    }

    fn json_input(path: &str, json: &str) -> InputItem {
        InputItem::Contents {
            path: PathBuf::from(path),
            contents: json.as_bytes().to_vec(),
        }
    }

    fn sections_json(refs: &[&str]) -> String {
        let items: Vec<String> = refs
            .iter()
            .map(|r| format!(r#"{{"reference": "{r}", "header": "H{r}"}}"#))
            .collect();
        format!("[{}]", items.join(","))
    }

    fn build(refs: &[&str], settings: PipelineSettings) -> Vec<OutputPage> {
        let mut pipeline = Pipeline::new(&JsonStyleguideParser, &ListingTemplates, settings);
        pipeline
            .push(json_input("/src/styles/main.json", &sections_json(refs)))
            .unwrap();
        let mut pages: Vec<OutputPage> = Vec::new();
        pipeline.finish(&mut pages).unwrap();
        assert_eq!(pipeline.state(), PipelineState::Done);
        pages
    }

    fn filenames(pages: &[OutputPage]) -> Vec<String> {
        pages
            .iter()
            .map(|p| p.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_three_sections_emit_four_pages() {
        let pages = build(&["1", "1.1", "2"], PipelineSettings::default());

        assert_eq!(
            filenames(&pages),
            vec!["index.html", "section-1.html", "section-1-1.html", "section-2.html"]
        );
        assert_eq!(pages[0].contents, "main|1,2|1,2");
        assert_eq!(pages[1].contents, "section|1|1,2");
        assert_eq!(pages[2].contents, "subsection|1.1|1,2");
        assert_eq!(pages[3].contents, "section|2|1,2");
    }

    #[test]
    fn test_orphan_subsection_builds_path() {
        let pages = build(&["3.2.1"], PipelineSettings::default());

        assert_eq!(
            filenames(&pages),
            vec![
                "index.html",
                "section-3.html",
                "section-3-2.html",
                "section-3-2-1.html"
            ]
        );
    }

    #[test]
    fn test_lexical_root_order() {
        let pages = build(&["1", "2", "10"], PipelineSettings::default());
        assert_eq!(
            filenames(&pages),
            vec!["index.html", "section-1.html", "section-10.html", "section-2.html"]
        );
    }

    #[test]
    fn test_numeric_root_order() {
        let settings = PipelineSettings {
            root_order: RootOrder::Numeric,
            ..PipelineSettings::default()
        };
        let pages = build(&["1", "2", "10"], settings);
        assert_eq!(
            filenames(&pages),
            vec!["index.html", "section-1.html", "section-2.html", "section-10.html"]
        );
    }

    #[test]
    fn test_paths_are_unique() {
        let pages = build(
            &["1", "1.1", "1.1.1", "1.2", "2.3.4", "10", "10.1", "ui.button"],
            PipelineSettings::default(),
        );
        let unique: HashSet<_> = pages.iter().map(|p| &p.path).collect();
        assert_eq!(unique.len(), pages.len());
    }

    #[test]
    fn test_colliding_page_paths_fail() {
        let mut pipeline = Pipeline::new(
            &JsonStyleguideParser,
            &ListingTemplates,
            PipelineSettings::default(),
        );
        pipeline
            .push(json_input("/src/main.json", &sections_json(&["1", "1.1", "1-1"])))
            .unwrap();

        let mut pages: Vec<OutputPage> = Vec::new();
        let err = pipeline.finish(&mut pages).unwrap_err();

        let (filename, reference) = match err {
            PipelineError::DuplicatePath {
                filename,
                reference,
            } => (filename, reference),
            other => panic!("expected duplicate path, got {other}"),
        };
        assert_eq!(filename, "section-1-1.html");
        assert_eq!(reference, "1.1");
        assert_eq!(
            filenames(&pages),
            vec!["index.html", "section-1.html", "section-1-1.html"]
        );
        assert_eq!(pipeline.state(), PipelineState::Failed);
    }

    #[test]
    fn test_section_pages_precede_their_subsections() {
        let pages = build(&["2.1", "1.1", "2", "1"], PipelineSettings::default());
        assert_eq!(
            filenames(&pages),
            vec![
                "index.html",
                "section-1.html",
                "section-1-1.html",
                "section-2.html",
                "section-2-1.html"
            ]
        );
    }

    #[test]
    fn test_output_dir_defaults_to_first_input_dir() {
        let pages = build(&["1"], PipelineSettings::default());
        assert_eq!(pages[0].path, PathBuf::from("/src/styles/index.html"));
    }

    #[test]
    fn test_output_dir_setting_wins() {
        let settings = PipelineSettings {
            output_dir: Some(PathBuf::from("/public/guide")),
            ..PipelineSettings::default()
        };
        let pages = build(&["1"], settings);
        assert_eq!(pages[1].path, PathBuf::from("/public/guide/section-1.html"));
    }

    #[test]
    fn test_inputs_are_combined() {
        let mut pipeline = Pipeline::new(
            &JsonStyleguideParser,
            &ListingTemplates,
            PipelineSettings::default(),
        );
        pipeline.push(json_input("a/one.json", &sections_json(&["1"]))).unwrap();
        pipeline.push(InputItem::Empty).unwrap();
        pipeline.push(json_input("b/two.json", &sections_json(&["2"]))).unwrap();

        let mut pages: Vec<OutputPage> = Vec::new();
        let summary = pipeline.finish(&mut pages).unwrap();

        assert_eq!(
            summary,
            BuildSummary {
                sections: 2,
                roots: 2,
                pages: 3
            }
        );
        assert_eq!(pages[0].path, PathBuf::from("a/index.html"));
    }

    #[test]
    fn test_parse_error_emits_nothing() {
        let mut pipeline =
            Pipeline::new(&FailingParser, &ListingTemplates, PipelineSettings::default());
        pipeline.push(json_input("a.json", "[]")).unwrap();

        let mut pages: Vec<OutputPage> = Vec::new();
        let err = pipeline.finish(&mut pages).unwrap_err();

        assert!(matches!(err, PipelineError::Parse(_)));
        assert!(pages.is_empty());
        assert_eq!(pipeline.state(), PipelineState::Failed);
    }

    #[test]
    fn test_stream_input_rejected() {
        let mut pipeline = Pipeline::new(
            &JsonStyleguideParser,
            &ListingTemplates,
            PipelineSettings::default(),
        );
        let err = pipeline
            .push(InputItem::Stream {
                path: PathBuf::from("/dev/stdin"),
            })
            .unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Input(InputError::StreamingNotSupported { .. })
        ));
        assert!(err.to_string().contains("Streaming not supported"));
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        let mut pipeline = Pipeline::new(
            &JsonStyleguideParser,
            &ListingTemplates,
            PipelineSettings::default(),
        );
        let err = pipeline
            .push(InputItem::Contents {
                path: PathBuf::from("bad.json"),
                contents: vec![0xff, 0xfe],
            })
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Input(InputError::InvalidUtf8 { .. })
        ));
    }

    #[test]
    fn test_finish_runs_once() {
        let mut pipeline = Pipeline::new(
            &JsonStyleguideParser,
            &ListingTemplates,
            PipelineSettings::default(),
        );
        let mut pages: Vec<OutputPage> = Vec::new();
        pipeline.finish(&mut pages).unwrap();

        assert!(matches!(
            pipeline.finish(&mut pages),
            Err(PipelineError::NotCollecting(PipelineState::Done))
        ));
        assert!(matches!(
            pipeline.push(InputItem::Empty),
            Err(PipelineError::NotCollecting(PipelineState::Done))
        ));
    }

    #[test]
    fn test_pipelines_do_not_share_buffers() {
        let mut first = Pipeline::new(
            &JsonStyleguideParser,
            &ListingTemplates,
            PipelineSettings::default(),
        );
        let mut second = Pipeline::new(
            &JsonStyleguideParser,
            &ListingTemplates,
            PipelineSettings::default(),
        );
        first.push(json_input("x/a.json", &sections_json(&["1"]))).unwrap();
        second.push(json_input("y/b.json", &sections_json(&["7"]))).unwrap();

        let mut first_pages: Vec<OutputPage> = Vec::new();
        let mut second_pages: Vec<OutputPage> = Vec::new();
        first.finish(&mut first_pages).unwrap();
        second.finish(&mut second_pages).unwrap();

        assert_eq!(first_pages[0].contents, "main|1|1");
        assert_eq!(second_pages[0].contents, "main|7|7");
    }
}
