//! HTML fragment handling: parsing, styling, and serialization.

mod dom;
mod selector;
mod serialize;
mod transform;

pub use dom::Fragment;
pub use serialize::SerializeMode;
pub use transform::Transformer;

use thiserror::Error;

/// Failure while styling a single fragment.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("element not found in html using selector: {0}")]
    ElementNotFound(String),

    #[error("invalid css selector: {0}")]
    InvalidSelector(String),

    #[error("failed to parse html fragment: {0}")]
    Parse(String),
}
