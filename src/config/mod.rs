//! Configuration module for Prospect-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every table except `[fetcher]` is optional and falls back to built-in defaults.
//!
//! # Example
//!
//! ```no_run
//! use prospect_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Concurrency: {}", config.pipeline.max_concurrency);
//! ```

pub mod defaults;
mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    AddressConfig, Config, ExtractorConfig, FetcherConfig, LabelRule, OutputConfig,
    PipelineConfig, TargetEntry,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::{validate, validate_max_concurrency, MAX_CONCURRENCY_LIMIT};
