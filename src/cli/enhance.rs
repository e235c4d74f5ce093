//! `enhance` command: style the input workbook.

use crate::{
    batch::{Batch, BatchReport, RunLayout},
    cli::EnhanceArgs,
    config::Options,
    debug,
    style::DigitCache,
};
use anyhow::Result;

/// Resolve the run settings and execute the batch.
pub fn enhance(mut options: Options, args: &EnhanceArgs, layout: &RunLayout) -> Result<BatchReport> {
    options.apply_enhance_args(args);
    let settings = options.into_settings(layout, &mut DigitCache::new())?;
    debug!("config"; "{:?}", settings);

    Batch::new(&settings, layout).run()
}
