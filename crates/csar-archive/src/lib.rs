//! CSAR archive workspaces.
//!
//! An [`ArchiveWorkspace`] is the exploded form of a CSAR: the archive is
//! unpacked into a private directory, mutated in place by the other
//! crates, and packed back into a new archive.

pub mod error;
pub mod workspace;

pub use error::{Error, Result};
pub use workspace::{ArchiveWorkspace, WORKSPACE_SUFFIX};
