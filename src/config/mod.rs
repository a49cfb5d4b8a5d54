//! Configuration model for fsprims.
//!
//! This module defines the `Config` struct, usually kept in a YAML file next
//! to the data it governs. It supports forward-compatible YAML parsing
//! (unknown fields are ignored), defaults for every field, and validation.

mod model;
mod operations;
pub mod types;


pub use model::{Config, RemoveSettings};
