//! Configuration model for sprintctl.
//!
//! This module defines the Config struct that represents `.sprintctl/config.yaml`.
//! It supports forward-compatible YAML parsing (unknown fields are preserved),
//! defaults for every field, and validation of config values.

mod model;
mod operations;

#[cfg(test)]
mod tests;

pub use model::Config;
