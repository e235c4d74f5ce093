//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

use crate::html::SerializeMode;

/// Batch-apply inline CSS styling to HTML fragments stored in a spreadsheet
#[derive(Parser, Debug, Clone)]
#[command(name = "hse", version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: enhancer.toml, skipped when absent)
    #[arg(short = 'C', long, global = true, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Run with verbose logging output
    #[arg(short = 'T', long, alias = "test_mode", global = true)]
    pub test_mode: bool,

    /// Log file path which will override the default path (logs/<date>.log)
    #[arg(long, alias = "log_file", global = true, value_hint = clap::ValueHint::FilePath)]
    pub log_file: Option<PathBuf>,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Style every fragment of the input file and write the output workbook
    #[command(visible_alias = "e")]
    Enhance {
        #[command(flatten)]
        args: EnhanceArgs,
    },

    /// Print the generated styling without touching any file
    #[command(visible_alias = "p")]
    Preview {
        #[command(flatten)]
        style: StyleArgs,
    },
}

/// Style options shared by `enhance` and `preview`.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct StyleArgs {
    /// Font name
    #[arg(long)]
    pub font: Option<String>,

    /// Font size; digits are extracted, so `24px` works
    #[arg(long, alias = "font_size")]
    pub font_size: Option<String>,

    /// Font color (any CSS color, e.g. `rgb(0,0,0)`)
    #[arg(long, alias = "font_color")]
    pub font_color: Option<String>,

    /// Background image URL
    #[arg(long, alias = "background_image", value_hint = clap::ValueHint::Url)]
    pub background_image: Option<String>,
}

/// `enhance` command arguments.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct EnhanceArgs {
    /// Input workbook (default: first INPUT_*.xlsx in the current directory)
    #[arg(short, long, alias = "input_file", value_hint = clap::ValueHint::FilePath)]
    pub input_file: Option<PathBuf>,

    /// Output file name, written under output/<date>/
    #[arg(short, long, alias = "output_file")]
    pub output_file: Option<String>,

    /// CSS selector of the element to apply styles to
    #[arg(short, long)]
    pub selector: Option<String>,

    /// Column holding the source HTML (`\n` is read as a line break)
    #[arg(long, alias = "html_source_column")]
    pub html_source_column: Option<String>,

    /// Column receiving the styled HTML (`\n` is read as a line break)
    #[arg(long, alias = "html_source_modified_column")]
    pub html_source_modified_column: Option<String>,

    /// Serialization of styled fragments (compact, pretty)
    #[arg(long)]
    pub serialization: Option<SerializeMode>,

    /// Keep per-row scratch files under temp/<date>/
    #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub scratch: Option<bool>,

    #[command(flatten)]
    pub style: StyleArgs,
}
