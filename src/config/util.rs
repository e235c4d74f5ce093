//! Configuration utility functions.

use std::fs;
use std::path::{Path, PathBuf};

/// Prefix of input workbooks picked up when no input file is given.
const DEFAULT_INPUT_PREFIX: &str = "INPUT_";
const DEFAULT_INPUT_EXTENSION: &str = "xlsx";

/// Find the default input workbook in `dir`
///
/// Returns the first `INPUT_*.xlsx` file by name, if any.
///
/// # Example
/// ```text
/// ./INPUT_march.xlsx   ← found!
/// ./INPUT_may.xlsx
/// ./notes.xlsx
/// ```
pub fn find_default_input(dir: &Path) -> Option<PathBuf> {
    let mut candidates: Vec<PathBuf> = fs::read_dir(dir)
        .ok()?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(DEFAULT_INPUT_PREFIX))
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(DEFAULT_INPUT_EXTENSION))
        })
        .collect();
    candidates.sort();
    candidates.into_iter().next()
}

/// Turn the two-character sequence `\n` into a line break.
///
/// Spreadsheet headers often span lines, which is awkward to type in a shell.
pub fn unescape_newlines(s: &str) -> String {
    s.replace("\\n", "\n")
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_find_default_input_first_by_name() {
        let dir = TempDir::new().unwrap();
        for name in ["notes.xlsx", "INPUT_may.xlsx", "INPUT_march.xlsx", "INPUT_a.csv"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        let found = find_default_input(dir.path()).unwrap();
        assert_eq!(found.file_name().unwrap(), "INPUT_march.xlsx");
    }

    #[test]
    fn test_find_default_input_none() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("input.xlsx"), "").unwrap();
        assert!(find_default_input(dir.path()).is_none());
    }

    #[test]
    fn test_unescape_newlines() {
        assert_eq!(unescape_newlines("HTML\\nSource"), "HTML\nSource");
        assert_eq!(unescape_newlines("plain"), "plain");
    }
}
