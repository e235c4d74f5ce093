//! `preview` command: print the generated styling.

use crate::{cli::StyleArgs, config::Options, style::DigitCache};
use anyhow::Result;

/// Render the preview element for the configured style.
pub fn render(mut options: Options, args: &StyleArgs) -> Result<String> {
    options.apply_style_args(args);
    let style = options.style(&mut DigitCache::new())?;
    Ok(style.preview())
}
