//! Entry-year normalization, estimation and resolution.

pub mod estimate;
pub mod normalize;
pub mod resolve;

pub use estimate::YearEstimator;
pub use normalize::YearBounds;
pub use resolve::{ResolvedYear, YearResolver};
