//! Template formatting: copy result columns into a formatted copy of the
//! input workbook.
//!
//! The result workbook only holds the two HTML columns. The delivered file is
//! the input workbook's first sheet with those columns filled in, a bold
//! header, and wrapped text cells.

use std::path::Path;

use calamine::Data;
use rust_xlsxwriter::{Format, FormatBorder, Workbook, Worksheet, XlsxError};

use super::SheetError;
use super::source::{cell_to_string, open_first_sheet, read_table};

/// Output header -> template column index.
pub type ColumnMapping = Vec<(String, u16)>;

/// Width of columns receiving HTML.
const HTML_COLUMN_WIDTH: f64 = 60.0;
/// Width of every other column.
const DEFAULT_COLUMN_WIDTH: f64 = 18.0;

/// Copies finished cell values into a styled copy of the input workbook.
pub trait TemplateFormatter {
    /// Merge `output` into a copy of `template` and store it at `output`.
    fn format(
        &self,
        output: &Path,
        template: &Path,
        mapping: &ColumnMapping,
    ) -> Result<(), SheetError>;
}

/// Map every header of `output` onto the same-named column of `template`.
///
/// Headers unknown to the template are appended after its last column.
pub fn column_mapping(template: &Path, output: &Path) -> Result<ColumnMapping, SheetError> {
    let template = read_table(template)?;
    let output = read_table(output)?;

    let mut next = template.headers.len();
    let mut mapping = Vec::with_capacity(output.headers.len());
    for header in output.headers {
        let col = template.column(&header).unwrap_or_else(|| {
            next += 1;
            next - 1
        });
        mapping.push((header, u16::try_from(col).unwrap_or(u16::MAX)));
    }
    Ok(mapping)
}

/// [`TemplateFormatter`] producing an xlsx file.
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxTemplate;

impl TemplateFormatter for XlsxTemplate {
    fn format(
        &self,
        output: &Path,
        template: &Path,
        mapping: &ColumnMapping,
    ) -> Result<(), SheetError> {
        let (sheet_name, cells) = open_first_sheet(template)?;
        let results = read_table(output)?;

        let write_err = |e: XlsxError| SheetError::Write(output.to_path_buf(), e);

        let header = Format::new()
            .set_bold()
            .set_border_bottom(FormatBorder::Thin)
            .set_text_wrap();
        let text = Format::new().set_text_wrap();
        let date = Format::new().set_num_format("yyyy-mm-dd hh:mm");

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name(&sheet_name).map_err(write_err)?;

        let is_mapped = |col: u16| mapping.iter().any(|(_, c)| *c == col);

        // Template cells; mapped data cells are filled from the results below
        for (r, row) in cells.rows().enumerate() {
            let r = u32::try_from(r).unwrap_or(u32::MAX);
            for (c, cell) in row.iter().enumerate() {
                let c = u16::try_from(c).unwrap_or(u16::MAX);
                if r == 0 {
                    sheet
                        .write_string_with_format(r, c, cell_to_string(cell), &header)
                        .map_err(write_err)?;
                } else if !is_mapped(c) {
                    write_cell(sheet, r, c, cell, &text, &date).map_err(write_err)?;
                }
            }
        }

        for (i, (name, col)) in mapping.iter().enumerate() {
            sheet
                .write_string_with_format(0, *col, name, &header)
                .map_err(write_err)?;
            for r in 0..results.rows.len() {
                let value = results.cell(r, i);
                if value.is_empty() {
                    continue;
                }
                let row = u32::try_from(r + 1).unwrap_or(u32::MAX);
                sheet
                    .write_string_with_format(row, *col, value, &text)
                    .map_err(write_err)?;
            }
        }

        let width = cells
            .width()
            .max(mapping.iter().map(|(_, c)| usize::from(*c) + 1).max().unwrap_or(0));
        for c in 0..width {
            let c = u16::try_from(c).unwrap_or(u16::MAX);
            let w = if is_mapped(c) {
                HTML_COLUMN_WIDTH
            } else {
                DEFAULT_COLUMN_WIDTH
            };
            sheet.set_column_width(c, w).map_err(write_err)?;
        }

        workbook.save(output).map_err(write_err)
    }
}

/// Copy one template cell, keeping numbers numeric.
fn write_cell(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &Data,
    text: &Format,
    date: &Format,
) -> Result<(), XlsxError> {
    match cell {
        Data::Empty => {}
        Data::Float(n) => {
            sheet.write_number(row, col, *n)?;
        }
        #[allow(clippy::cast_precision_loss)]
        Data::Int(n) => {
            sheet.write_number(row, col, *n as f64)?;
        }
        Data::Bool(b) => {
            sheet.write_boolean(row, col, *b)?;
        }
        Data::DateTime(dt) => {
            sheet.write_number_with_format(row, col, dt.as_f64(), date)?;
        }
        other => {
            sheet.write_string_with_format(row, col, cell_to_string(other), text)?;
        }
    }
    Ok(())
}
