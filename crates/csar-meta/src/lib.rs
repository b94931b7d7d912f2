//! Metadata and settings management for CSAR workspaces.
//!
//! - [`manifest`]: the `TOSCA-Metadata/TOSCA.meta` registry of files and
//!   media types
//! - [`config`]: architecture and resolution policy values
//! - [`prompt`]: the capability used to ask for missing values
//! - [`store`]: persistence of the two resolver settings

pub mod config;
pub mod error;
pub mod manifest;
pub mod prompt;
pub mod store;

pub use config::{Architecture, PersistedPolicy, ResolutionPolicy, StoreConfig};
pub use error::{Error, Result};
pub use manifest::{DEFINITIONS_MEDIA_TYPE, Manifest, ManifestAudit, ManifestEntry};
pub use prompt::{FailFast, FixedValues, PromptRequest, Slot, ValueProvider};
pub use store::ResolutionStore;
