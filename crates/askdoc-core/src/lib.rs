//! # AskDoc Core
//!
//! Shared foundation for the askdoc workspace: environment-backed
//! configuration, the workspace error type, document and chat types, and
//! the traits the model backends implement.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::ConfigStore;
pub use error::{AskdocError, Result};
