// src/config/mod.rs

//! Configuration loading and validation for diagwatch.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk and read the environment (`loader.rs`).
//! - Validate durations, patterns and engine settings (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{
    TOLERATE_ERRORS_ENV, load_and_validate, load_from_path, load_or_default,
    parse_tolerate_override, tolerate_override_from_env,
};
pub use model::{
    ConfigFile, EngineSection, PatternSection, RawConfigFile, RawSupervisorSection,
    SupervisorSection,
};
pub use validate::parse_duration;
