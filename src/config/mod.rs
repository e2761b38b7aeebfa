// src/config/mod.rs

//! Configuration loading and validation for bootgate.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate invariants like job graph correctness (`validate.rs`).
//! - Parse duration strings such as `"10s"` (`duration.rs`).

pub mod duration;
pub mod loader;
pub mod model;
pub mod validate;

pub use duration::parse_duration;
pub use loader::{load_and_validate, load_from_path};
pub use model::{
    ConfigFile, ExecutorConfig, ExecutorSection, JobConfig, JobSpec, RawConfigFile,
};
