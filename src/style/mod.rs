//! Style generation: the CSS declaration builder and font-size coercion.

mod numeric;
mod rule;

pub use numeric::{DigitCache, NumericParseError};
pub use rule::StyleSpec;
