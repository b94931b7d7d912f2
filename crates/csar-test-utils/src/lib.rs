//! Shared test utilities for the csar-resolver workspace.
//!
//! Dev-dependency only. Provides [`TestCsar`], a builder for small but
//! realistic CSAR archives, and helpers for reading archives back.

pub mod csar;
pub mod fixtures;

pub use csar::{TestCsar, read_entries, read_entry};
