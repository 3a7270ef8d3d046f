//! Fleet aggregation and modernity scoring.
//!
//! This module groups resolved records into report views, computes
//! per-group year statistics and modern-share percentages, and scores
//! airlines from the airline view.

pub mod aggregate;
pub mod analyzer;
pub mod score;
pub mod types;
pub mod utility;
