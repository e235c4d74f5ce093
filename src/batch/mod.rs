//! Batch orchestration: style every source fragment and write the results.
//!
//! Pipeline phases:
//! - **Load** - read the input workbook, validate both columns
//! - **Style** - transform each fragment in order (fail-fast)
//! - **Write** - two-column result workbook under `output/<date>/`
//! - **Format** - merge the results into a copy of the input workbook
//!
//! Rows are processed strictly one after another. Two runs on the same date
//! share `temp/<date>/` and must not execute concurrently.

mod scratch;

pub use scratch::{RunLayout, ScratchFile};

use crate::{
    config::Settings,
    debug,
    html::Transformer,
    log,
    logger::ProgressLine,
    sheet::{self, SourceRow, TemplateFormatter, TransformedRow, XlsxTemplate},
};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Lifecycle of a batch; no intermediate checkpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Running,
    Done,
}

/// Outcome of a completed batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub state: BatchState,
    pub rows: usize,
    pub output: PathBuf,
}

/// One run over the input workbook.
///
/// [`Batch::run`] consumes the batch, so a finished batch cannot be resumed.
pub struct Batch<'a, F = XlsxTemplate> {
    settings: &'a Settings,
    layout: &'a RunLayout,
    transformer: Transformer,
    formatter: F,
    state: BatchState,
}

impl<'a> Batch<'a> {
    pub fn new(settings: &'a Settings, layout: &'a RunLayout) -> Self {
        Self::with_formatter(settings, layout, XlsxTemplate)
    }
}

impl<'a, F: TemplateFormatter> Batch<'a, F> {
    pub fn with_formatter(settings: &'a Settings, layout: &'a RunLayout, formatter: F) -> Self {
        let transformer = Transformer::new(
            settings.selector.clone(),
            &settings.style,
            settings.serialization,
        );
        Self {
            settings,
            layout,
            transformer,
            formatter,
            state: BatchState::Running,
        }
    }

    /// Run every phase; the first error aborts the batch.
    pub fn run(mut self) -> Result<BatchReport> {
        self.layout.prepare(self.settings.scratch)?;

        let sources = self.load()?;
        let rows = self.style(&sources)?;
        let output = self.write(&rows)?;
        self.format(&output)?;

        self.state = BatchState::Done;
        log!("done"; "file saved to {}", output.display());
        Ok(BatchReport {
            state: self.state,
            rows: rows.len(),
            output,
        })
    }

    fn load(&self) -> Result<Vec<SourceRow>> {
        let input = &self.settings.input_file;
        log!("read"; "reading {} ...", input.display());
        let sources = sheet::load_sources(
            input,
            &self.settings.html_source_column,
            &self.settings.html_source_modified_column,
        )?;
        debug!("read"; "{} row(s) in column {:?}", sources.len(), self.settings.html_source_column);
        Ok(sources)
    }

    fn style(&self, sources: &[SourceRow]) -> Result<Vec<TransformedRow>> {
        log!("style"; "generating HTML styling (it will take some time) ...");
        debug!("style"; "declaration: {}", self.transformer.declaration());

        let progress = ProgressLine::new(&[("rows", sources.len())]);
        let mut rows = Vec::with_capacity(sources.len());
        for (index, source) in sources.iter().enumerate() {
            let row = index + 1;
            let styled = self.style_row(row, &source.raw_html).with_context(|| {
                format!(
                    "row {row} of {}: failed to apply selector `{}`",
                    self.settings.input_file.display(),
                    self.transformer.selector()
                )
            })?;
            rows.push(TransformedRow {
                raw_html: source.raw_html.clone(),
                styled_html: styled,
            });
            progress.inc("rows");
        }
        progress.finish();
        Ok(rows)
    }

    /// Style one fragment, round-tripping through its scratch file if enabled.
    fn style_row(&self, row: usize, html: &str) -> Result<String> {
        if !self.settings.scratch {
            return Ok(self.transformer.apply(html)?);
        }

        let scratch = ScratchFile::new(self.layout, row);
        let staged = scratch.stage(html)?;
        let styled = self.transformer.apply(&staged)?;
        scratch.store(&styled)?;
        debug!("style"; "row {row} -> {}", scratch.path().display());
        Ok(styled)
    }

    fn write(&self, rows: &[TransformedRow]) -> Result<PathBuf> {
        let output = self.layout.output_file(&self.settings.output_file);
        sheet::write_results(
            &output,
            &self.settings.html_source_column,
            &self.settings.html_source_modified_column,
            rows,
        )?;
        Ok(output)
    }

    fn format(&self, output: &Path) -> Result<()> {
        log!("format"; "formatting {} ...", output.display());
        let template = &self.settings.input_file;
        let mapping = sheet::column_mapping(template, output)?;
        debug!("format"; "column mapping: {:?}", mapping);
        self.formatter.format(output, template, &mapping)?;
        Ok(())
    }
}
