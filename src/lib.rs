pub mod analyzers;
pub mod classify;
pub mod config;
pub mod error;
pub mod output;
pub mod parser;
pub mod record;
pub mod rules;
pub mod stats;
pub mod year;
