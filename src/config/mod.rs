//! Run configuration from `enhancer.toml` and command-line flags.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── error.rs   # ConfigError
//! ├── util.rs    # default input discovery, column name unescaping
//! └── mod.rs     # Options (raw, layered) -> Settings (validated)
//! ```
//!
//! # Precedence
//!
//! | Source             | Notes                                        |
//! |--------------------|----------------------------------------------|
//! | command-line flags | highest; `--input-file` or `--input_file`    |
//! | `enhancer.toml`    | optional; unknown keys are rejected          |
//!
//! Every recognized key of the file mirrors a flag:
//!
//! ```toml
//! input_file = "INPUT_march.xlsx"
//! output_file = "styled.xlsx"
//! selector = "div.card"
//! font = "Nanum Gothic"
//! font_size = "24px"          # or 24
//! font_color = "rgb(0,0,0)"
//! background_image = "https://example.com/bg.png"
//! html_source_column = "HTML"
//! html_source_modified_column = "HTML\nStyled"
//! serialization = "pretty"    # or "compact"
//! scratch = true
//! test_mode = false
//! log_file = "logs/custom.log"
//! ```

mod error;
mod util;

pub use error::ConfigError;
pub use util::{find_default_input, unescape_newlines};

use crate::batch::RunLayout;
use crate::cli::{Cli, EnhanceArgs, StyleArgs};
use crate::html::SerializeMode;
use crate::style::{DigitCache, StyleSpec};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "enhancer.toml";

// ============================================================================
// raw options
// ============================================================================

/// Font size as written in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FontSize {
    Number(u32),
    Text(String),
}

impl FontSize {
    fn into_text(self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s,
        }
    }
}

/// Layered options before validation; every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Options {
    pub input_file: Option<PathBuf>,
    pub output_file: Option<String>,
    pub selector: Option<String>,
    pub font: Option<String>,
    pub font_size: Option<FontSize>,
    pub font_color: Option<String>,
    pub background_image: Option<String>,
    pub html_source_column: Option<String>,
    pub html_source_modified_column: Option<String>,
    pub serialization: Option<SerializeMode>,
    pub scratch: Option<bool>,
    pub test_mode: Option<bool>,
    pub log_file: Option<PathBuf>,
}

impl Options {
    /// Load the config file selected by `cli`.
    ///
    /// The default file may be absent; an explicitly given one may not.
    pub fn load(cli: &Cli, root: &Path) -> Result<Self, ConfigError> {
        match &cli.config {
            Some(path) if !path.exists() => Err(ConfigError::NotFound(path.clone())),
            Some(path) => Self::from_path(path),
            None => {
                let path = root.join(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_path(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load options from a TOML file, rejecting unknown keys.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        let (options, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            return Err(ConfigError::UnknownFields {
                path: path.to_path_buf(),
                fields: ignored,
            });
        }
        Ok(options)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let options = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((options, ignored))
    }

    /// Override with global flags.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if cli.test_mode {
            self.test_mode = Some(true);
        }
        override_with(&mut self.log_file, cli.log_file.clone());
    }

    /// Override with style flags.
    pub fn apply_style_args(&mut self, args: &StyleArgs) {
        override_with(&mut self.font, args.font.clone());
        override_with(
            &mut self.font_size,
            args.font_size.clone().map(FontSize::Text),
        );
        override_with(&mut self.font_color, args.font_color.clone());
        override_with(&mut self.background_image, args.background_image.clone());
    }

    /// Override with `enhance` flags.
    pub fn apply_enhance_args(&mut self, args: &EnhanceArgs) {
        override_with(&mut self.input_file, args.input_file.clone());
        override_with(&mut self.output_file, args.output_file.clone());
        override_with(&mut self.selector, args.selector.clone());
        override_with(&mut self.html_source_column, args.html_source_column.clone());
        override_with(
            &mut self.html_source_modified_column,
            args.html_source_modified_column.clone(),
        );
        override_with(&mut self.serialization, args.serialization);
        override_with(&mut self.scratch, args.scratch);
        self.apply_style_args(&args.style);
    }

    pub fn test_mode(&self) -> bool {
        self.test_mode.unwrap_or(false)
    }

    /// Log file path, `logs/<date>.log` unless overridden.
    pub fn log_file(&self, layout: &RunLayout) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| layout.default_log_file())
    }

    /// Validate the style fields alone (used by `preview`).
    pub fn style(&self, digits: &mut DigitCache) -> Result<StyleSpec, ConfigError> {
        let mut missing = Missing::default();
        let style = self.collect_style(&mut missing);
        missing.into_result()?;
        let (font_family, font_size, font_color, background_image_url) =
            style.ok_or(ConfigError::Missing(Vec::new()))?;
        Self::build_style(font_family, font_size, font_color, background_image_url, digits)
    }

    fn collect_style(
        &self,
        missing: &mut Missing,
    ) -> Option<(String, FontSize, String, String)> {
        let font = missing.require("font", self.font.clone());
        let size = missing.require("font_size", self.font_size.clone());
        let color = missing.require("font_color", self.font_color.clone());
        let image = missing.require("background_image", self.background_image.clone());
        Some((font?, size?, color?, image?))
    }

    fn build_style(
        font_family: String,
        font_size: FontSize,
        font_color: String,
        background_image_url: String,
        digits: &mut DigitCache,
    ) -> Result<StyleSpec, ConfigError> {
        let font_size_px = digits.parse(&font_size.into_text())?;
        if font_size_px == 0 {
            return Err(ConfigError::Validation(
                "font_size must be greater than 0".to_string(),
            ));
        }
        Ok(StyleSpec {
            font_family,
            font_size_px,
            font_color,
            background_image_url,
        })
    }

    /// Validate everything an `enhance` run needs.
    ///
    /// All missing options are reported at once.
    pub fn into_settings(
        self,
        layout: &RunLayout,
        digits: &mut DigitCache,
    ) -> Result<Settings, ConfigError> {
        let mut missing = Missing::default();
        let style = self.collect_style(&mut missing);
        let output_file = missing.require("output_file", self.output_file.clone());
        let selector = missing.require("selector", self.selector.clone());
        let source_column = missing.require("html_source_column", self.html_source_column.clone());
        let destination_column = missing.require(
            "html_source_modified_column",
            self.html_source_modified_column.clone(),
        );
        missing.into_result()?;

        let (
            Some((font_family, font_size, font_color, background_image_url)),
            Some(output_file),
            Some(selector),
            Some(source_column),
            Some(destination_column),
        ) = (style, output_file, selector, source_column, destination_column)
        else {
            return Err(ConfigError::Missing(Vec::new()));
        };

        let style = Self::build_style(
            font_family,
            font_size,
            font_color,
            background_image_url,
            digits,
        )?;

        if selector.trim().is_empty() {
            return Err(ConfigError::Validation("selector must not be empty".to_string()));
        }
        if output_file.trim().is_empty() {
            return Err(ConfigError::Validation(
                "output_file must not be empty".to_string(),
            ));
        }

        let input_file = match self.input_file.clone() {
            Some(path) => path,
            None => find_default_input(layout.root())
                .ok_or_else(|| ConfigError::NoInput(layout.root().to_path_buf()))?,
        };

        Ok(Settings {
            test_mode: self.test_mode(),
            log_file: self.log_file(layout),
            input_file,
            output_file,
            selector,
            style,
            html_source_column: unescape_newlines(&source_column),
            html_source_modified_column: unescape_newlines(&destination_column),
            serialization: self.serialization.unwrap_or_default(),
            scratch: self.scratch.unwrap_or(true),
        })
    }
}

fn override_with<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

/// Collects names of absent required options.
#[derive(Debug, Default)]
struct Missing(Vec<&'static str>);

impl Missing {
    fn require<T>(&mut self, name: &'static str, value: Option<T>) -> Option<T> {
        if value.is_none() {
            self.0.push(name);
        }
        value
    }

    fn into_result(self) -> Result<(), ConfigError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Missing(self.0))
        }
    }
}

// ============================================================================
// validated settings
// ============================================================================

/// Immutable, validated settings of one `enhance` run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub test_mode: bool,
    pub log_file: PathBuf,
    pub input_file: PathBuf,
    /// File name of the result, placed under `output/<date>/`.
    pub output_file: String,
    pub selector: String,
    pub style: StyleSpec,
    pub html_source_column: String,
    pub html_source_modified_column: String,
    pub serialization: SerializeMode,
    pub scratch: bool,
}
