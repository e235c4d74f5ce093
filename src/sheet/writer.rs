//! Result workbook output.

use std::fs;
use std::path::Path;

use rust_xlsxwriter::Workbook;

use super::{SheetError, TransformedRow};

/// Write `rows` as a two-column workbook, replacing any existing file.
pub fn write_results(
    path: &Path,
    source_column: &str,
    destination_column: &str,
    rows: &[TransformedRow],
) -> Result<(), SheetError> {
    if path.exists() {
        fs::remove_file(path).map_err(|e| SheetError::Remove(path.to_path_buf(), e))?;
    }

    let write_err = |e| SheetError::Write(path.to_path_buf(), e);

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, source_column).map_err(write_err)?;
    sheet.write_string(0, 1, destination_column).map_err(write_err)?;

    for (i, row) in rows.iter().enumerate() {
        let r = u32::try_from(i + 1).unwrap_or(u32::MAX);
        sheet.write_string(r, 0, &row.raw_html).map_err(write_err)?;
        sheet.write_string(r, 1, &row.styled_html).map_err(write_err)?;
    }

    workbook.save(path).map_err(write_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::read_table;
    use tempfile::TempDir;

    fn rows() -> Vec<TransformedRow> {
        vec![
            TransformedRow {
                raw_html: "<p>a</p>".to_string(),
                styled_html: r#"<p style="x">a</p>"#.to_string(),
            },
            TransformedRow {
                raw_html: "<p>b</p>".to_string(),
                styled_html: r#"<p style="x">b</p>"#.to_string(),
            },
        ]
    }

    #[test]
    fn test_write_results_two_columns() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.xlsx");
        write_results(&path, "HTML", "Styled", &rows()).unwrap();

        let table = read_table(&path).unwrap();
        assert_eq!(table.headers, ["HTML", "Styled"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.cell(1, 0), "<p>b</p>");
        assert_eq!(table.cell(1, 1), r#"<p style="x">b</p>"#);
    }

    #[test]
    fn test_write_results_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.xlsx");
        fs::write(&path, "stale").unwrap();

        write_results(&path, "HTML", "Styled", &rows()[..1]).unwrap();
        let table = read_table(&path).unwrap();
        assert_eq!(table.rows.len(), 1);
    }
}
