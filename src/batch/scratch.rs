//! Run-date directory layout and per-row scratch files.
//!
//! ```text
//! <root>/
//! ├── output/<YYYYMMDD>/<output_file>
//! ├── temp/<YYYYMMDD>/html_<i>.html
//! └── logs/<YYYYMMDD>.log
//! ```

use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};

const OUTPUT_DIR: &str = "output";
const SCRATCH_DIR: &str = "temp";
const LOG_DIR: &str = "logs";

/// Directories of one run, keyed by the local run date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLayout {
    root: PathBuf,
    date: String,
}

impl RunLayout {
    /// Layout rooted at `root` for today's local date.
    pub fn today(root: &Path) -> Self {
        let date = chrono::Local::now().format("%Y%m%d").to_string();
        Self::with_date(root, date)
    }

    pub fn with_date(root: &Path, date: impl Into<String>) -> Self {
        Self {
            root: root.to_path_buf(),
            date: date.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.join(OUTPUT_DIR).join(&self.date)
    }

    pub fn output_file(&self, name: &str) -> PathBuf {
        self.output_dir().join(name)
    }

    pub fn scratch_dir(&self) -> PathBuf {
        self.root.join(SCRATCH_DIR).join(&self.date)
    }

    /// Scratch file of the `index`-th data row (1-based, header excluded).
    pub fn scratch_file(&self, index: usize) -> PathBuf {
        self.scratch_dir().join(format!("html_{index}.html"))
    }

    pub fn default_log_file(&self) -> PathBuf {
        self.root.join(LOG_DIR).join(format!("{}.log", self.date))
    }

    /// Create output and (optionally) scratch directories.
    pub fn prepare(&self, scratch: bool) -> Result<()> {
        let output = self.output_dir();
        fs::create_dir_all(&output)
            .with_context(|| format!("failed to create {}", output.display()))?;
        if scratch {
            let dir = self.scratch_dir();
            fs::create_dir_all(&dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }
        Ok(())
    }
}

/// Round-trip a fragment through its scratch file.
///
/// Writes the source, reads it back for transformation. The caller
/// overwrites the file with the styled result via [`ScratchFile::store`].
pub struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    pub fn new(layout: &RunLayout, index: usize) -> Self {
        Self {
            path: layout.scratch_file(index),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `html` and read it back.
    pub fn stage(&self, html: &str) -> Result<String> {
        self.store(html)?;
        fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))
    }

    pub fn store(&self, html: &str) -> Result<()> {
        fs::write(&self.path, html)
            .with_context(|| format!("failed to write {}", self.path.display()))
    }
}
