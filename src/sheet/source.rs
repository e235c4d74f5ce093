//! Input workbook loading.

use std::path::Path;

use calamine::{Data, Range, Reader, open_workbook_auto};

use super::{SheetError, SourceRow};

/// First sheet of a workbook with every cell rendered as text.
#[derive(Debug, Clone, Default)]
pub struct SourceTable {
    pub sheet: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SourceTable {
    /// Index of the header named exactly `name`.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cell text; short rows read as empty.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map_or("", String::as_str)
    }
}

/// Open the first sheet of a workbook (xlsx, xls, xlsb, ods).
pub(super) fn open_first_sheet(path: &Path) -> Result<(String, Range<Data>), SheetError> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| SheetError::Open(path.to_path_buf(), e))?;

    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| SheetError::NoSheet(path.to_path_buf()))?;

    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|source| SheetError::Read {
            path: path.to_path_buf(),
            sheet: sheet.clone(),
            source,
        })?;

    Ok((sheet, range))
}

/// Read the first sheet; the first row is the header.
pub fn read_table(path: &Path) -> Result<SourceTable, SheetError> {
    let (sheet, range) = open_first_sheet(path)?;
    let mut rows = range.rows();

    let headers: Vec<String> = rows
        .next()
        .map(|row| row.iter().map(cell_to_string).collect())
        .unwrap_or_default();
    let rows: Vec<Vec<String>> = rows
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();

    Ok(SourceTable {
        sheet,
        headers,
        rows,
    })
}

/// Load the fragments of `source_column`.
///
/// Both columns must exist in the header; this is checked before any data
/// row is looked at.
pub fn load_sources(
    path: &Path,
    source_column: &str,
    destination_column: &str,
) -> Result<Vec<SourceRow>, SheetError> {
    let table = read_table(path)?;

    let mut indices = [0; 2];
    for (index, column) in indices.iter_mut().zip([source_column, destination_column]) {
        *index = table
            .column(column)
            .ok_or_else(|| SheetError::missing_column(column, path))?;
    }
    let col = indices[0];

    Ok((0..table.rows.len())
        .map(|row| SourceRow {
            raw_html: table.cell(row, col).to_string(),
        })
        .collect())
}

/// Render a cell as text; integral floats drop their fraction.
pub(super) fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Float(n) => {
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                format!("{n}")
            }
        }
        Data::Int(n) => n.to_string(),
        Data::Bool(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
        Data::DateTime(dt) => format!("{}", dt.as_f64()),
        Data::Error(e) => format!("#{e:?}"),
    }
}
