// src/config/mod.rs

//! Configuration loading and validation for releasedag.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate references, action fields and acyclicity (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{DEFAULT_CONFIG_FILE, load_and_validate, load_from_path, parse_str};
pub use model::{
    ConfigFile, ConfigSection, PipelineConfig, RawConfigFile, ReleaseConfig, StepConfig,
    TaskConfig, WatchRule,
};
pub use validate::validate_raw_config;
