//! Category and OEM classification. Both are independent of year logic.

pub mod category;
pub mod oem;

pub use category::{AircraftCategory, CategoryClassifier};
pub use oem::{Oem, OemNormalizer};
