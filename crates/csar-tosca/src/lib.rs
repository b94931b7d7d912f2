//! TOSCA documents inside a CSAR workspace.
//!
//! - [`template`]: the service template and its `RR_DependsOn` edges
//! - [`mutator`]: adds edges according to the active resolution policy
//! - [`descriptor`]: the relationship type declaration the edges refer to

pub mod descriptor;
pub mod error;
pub mod mutator;
pub mod template;

/// The TOSCA 1.0 XML namespace.
pub const TOSCA_NAMESPACE: &str = "http://docs.oasis-open.org/tosca/ns/2011/12";

/// Namespace the `RR_DependsOn` relationship type is declared in.
pub const RR_NAMESPACE: &str = "http://docs.oasis-open.org/tosca/ns/2011/12/ToscaBaseTypes";

/// Name of the dependency relationship type.
pub const DEPENDS_ON: &str = "RR_DependsOn";

pub use error::{Error, Result};
pub use mutator::DependencyMutator;
pub use template::{DependencyEdge, ServiceTemplate};
