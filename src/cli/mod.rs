//! Command-line interface module.

mod args;
pub mod enhance;
pub mod preview;

pub use args::{Cli, Commands, EnhanceArgs, StyleArgs};
