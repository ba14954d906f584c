//! `kss build` command implementation.

use std::path::PathBuf;

use clap::Args;
use kss_config::{CliSettings, Config};
use kss_sections::{JsonStyleguideParser, RootOrder};
use kss_site::{DirectorySink, InputItem, JinjaTemplates, Pipeline, PipelineSettings};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Section dump files (JSON). Directories are skipped.
    inputs: Vec<PathBuf>,

    /// Path to configuration file (default: auto-discover kss.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory (default: directory of the first input).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Master page template (overrides config).
    #[arg(long)]
    main_template: Option<PathBuf>,

    /// Section page template (overrides config).
    #[arg(long)]
    section_template: Option<PathBuf>,

    /// Subsection page template (overrides config).
    #[arg(long)]
    subsection_template: Option<PathBuf>,

    /// Prefix for generated page links (overrides config).
    #[arg(long, env = "KSS_BASE_URL")]
    base_url: Option<String>,

    /// Root section ordering: lexical or numeric (overrides config).
    #[arg(long)]
    root_order: Option<RootOrder>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl BuildArgs {
    /// Execute the build command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration, template loading or the build fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            output_dir: self.output_dir,
            main_template: self.main_template,
            section_template: self.section_template,
            subsection_template: self.subsection_template,
            base_url: self.base_url,
            root_order: self.root_order,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        if self.inputs.is_empty() {
            return Err(CliError::Validation("no input files given".to_owned()));
        }

        let templates =
            JinjaTemplates::load(&config.require_templates()?, &config.output_resolved.base_url)?;
        let settings = PipelineSettings {
            output_dir: config.output_resolved.dir.clone(),
            base_url: config.output_resolved.base_url.clone(),
            root_order: config.output_resolved.root_order,
            parser_options: config.parser_options()?,
        };

        let parser = JsonStyleguideParser;
        let mut pipeline = Pipeline::new(&parser, &templates, settings);
        for input in &self.inputs {
            output.info(&format!("Reading {}", input.display()));
            pipeline.push(InputItem::from_path(input)?)?;
        }

        let mut sink = DirectorySink::new();
        let summary = pipeline.finish(&mut sink)?;

        output.success(&format!(
            "Built {} pages for {} sections under {} roots",
            summary.pages, summary.sections, summary.roots
        ));
        if let Some(dir) = sink.written().first().and_then(|p| p.parent()) {
            output.info(&format!("Output: {}", dir.display()));
        }

        Ok(())
    }
}
