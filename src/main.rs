//! hse - batch-apply inline CSS styling to HTML fragments stored in a spreadsheet.

mod batch;
mod cli;
mod config;
mod html;
mod logger;
mod sheet;
mod style;
mod utils;

use anyhow::{Context, Result};
use batch::RunLayout;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::Options;

fn main() {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    if let Err(e) = run(&cli) {
        log!("error"; "{e:#}");
        std::process::exit(1);
    }
    log!("done"; "program has been run successfully");
}

fn run(cli: &Cli) -> Result<()> {
    let root = std::env::current_dir().context("failed to resolve working directory")?;
    let layout = RunLayout::today(&root);

    let mut options = Options::load(cli, &root)?;
    options.apply_cli(cli);

    let log_file = options.log_file(&layout);
    logger::init(options.test_mode(), &log_file)
        .with_context(|| format!("failed to open log file {}", log_file.display()))?;
    debug!("config"; "run date {}, root {}", layout.date(), root.display());

    match &cli.command {
        Commands::Enhance { args } => {
            let report = cli::enhance::enhance(options, args, &layout)?;
            debug!("done"; "{} row(s) written to {}", report.rows, report.output.display());
        }
        Commands::Preview { style } => {
            println!("{}", cli::preview::render(options, style)?);
        }
    }
    Ok(())
}
