//! Archive-level orchestration for the CSAR references resolver
//!
//! `csar-core` ties the layer 0 crates together behind [`Archive`]:
//!
//! ```text
//!                    csar-cli
//!                        |
//!                    csar-core
//!                        |
//!     +-----------+------+------+-----------+
//!     |           |             |           |
//! csar-fs   csar-archive   csar-meta   csar-tosca
//! ```
//!
//! # Example
//!
//! ```no_run
//! use csar_core::{Archive, Result};
//! use csar_meta::FixedValues;
//!
//! fn example() -> Result<()> {
//!     let mut archive = Archive::open("app.csar", &mut FixedValues::new())?;
//!     archive.add_script_dependency("install.sh", "nginx")?;
//!     archive.pack("app2.csar")?;
//!     archive.discard()
//! }
//! ```

pub mod archive;
pub mod error;
pub mod fetch;

pub use archive::{Archive, ArchiveOptions, ArchiveSummary};
pub use error::{Error, Result};
pub use fetch::{DirectoryFetcher, FetchError, FetchedPackage, PackageFetcher};
