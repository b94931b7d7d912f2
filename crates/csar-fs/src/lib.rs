//! Filesystem helpers for the CSAR references resolver
//!
//! Provides workspace-relative path handling, atomic writes and
//! format-agnostic configuration loading.

pub mod config;
pub mod constants;
pub mod error;
pub mod io;
pub mod path;

pub use config::ConfigStore;
pub use constants::CsarPath;
pub use error::{Error, Result};
pub use path::NormalizedPath;
