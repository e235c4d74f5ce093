//! Spreadsheet input and output.
//!
//! ```text
//! sheet/
//! ├── source.rs    # read the input workbook, validate columns
//! ├── writer.rs    # write the two-column result workbook
//! └── template.rs  # copy results into a formatted copy of the input
//! ```

mod source;
mod template;
mod writer;

pub use source::{SourceTable, load_sources, read_table};
pub use template::{ColumnMapping, TemplateFormatter, XlsxTemplate, column_mapping};
pub use writer::write_results;

use std::path::{Path, PathBuf};
use thiserror::Error;

/// One input row: the fragment to style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRow {
    pub raw_html: String,
}

/// One output row: the source fragment and its styled version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformedRow {
    pub raw_html: String,
    pub styled_html: String,
}

/// Spreadsheet errors.
#[derive(Debug, Error)]
pub enum SheetError {
    #[error("\"{column}\" column is not present in file \"{file}\"")]
    MissingColumn { column: String, file: String },

    #[error("failed to open spreadsheet `{0}`")]
    Open(PathBuf, #[source] calamine::Error),

    #[error("spreadsheet `{0}` contains no sheet")]
    NoSheet(PathBuf),

    #[error("failed to read sheet `{sheet}` of `{path}`")]
    Read {
        path: PathBuf,
        sheet: String,
        #[source]
        source: calamine::Error,
    },

    #[error("failed to write spreadsheet `{0}`")]
    Write(PathBuf, #[source] rust_xlsxwriter::XlsxError),

    #[error("failed to remove existing file `{0}`")]
    Remove(PathBuf, #[source] std::io::Error),
}

impl SheetError {
    pub(crate) fn missing_column(column: &str, path: &Path) -> Self {
        let file = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::MissingColumn {
            column: column.to_string(),
            file,
        }
    }
}
