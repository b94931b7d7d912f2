//! Resolver settings: architecture, resolution policy and store layout.

use std::fmt;

use csar_fs::{CsarPath, NormalizedPath};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Target architecture of the packages added to an archive.
///
/// Holds the stored form: `""` for `noarch`, the bare default (`i386`)
/// for a blank answer, and `:<name>` for anything else. Only the
/// `:`-prefixed form contributes a package-name suffix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Architecture(String);

impl Architecture {
    /// Wrap a value exactly as read from the backing file.
    pub fn from_stored(stored: impl Into<String>) -> Self {
        Self(stored.into())
    }

    /// Interpret a user answer.
    pub fn from_input(input: &str, config: &StoreConfig) -> Self {
        let value = input.trim();
        if value.is_empty() {
            Self(config.default_architecture.clone())
        } else if value == config.noarch_keyword {
            Self(String::new())
        } else {
            Self(format!(":{}", value.trim_start_matches(':')))
        }
    }

    pub fn as_stored(&self) -> &str {
        &self.0
    }

    pub fn is_noarch(&self) -> bool {
        self.0.is_empty()
    }

    /// Suffix appended to package names, `:` rewritten to `_`.
    pub fn package_suffix(&self) -> String {
        if self.0.starts_with(':') {
            self.0.replace(':', "_")
        } else {
            String::new()
        }
    }

    /// Qualify a package name with this architecture.
    pub fn qualify(&self, package: &str) -> String {
        format!("{}{}", package, self.package_suffix())
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_noarch() {
            write!(f, "noarch")
        } else {
            write!(f, "{}", self.0.trim_start_matches(':'))
        }
    }
}

/// A requested resolution policy.
///
/// `Undefined` is what unparsable requests turn into; it can be asked
/// for but never stored, see [`PersistedPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolutionPolicy {
    /// Replace the target of an existing edge from the same source.
    Expanding,
    /// Always append a new edge.
    Addition,
    Undefined,
}

impl ResolutionPolicy {
    /// Map a numeric menu selection.
    pub fn from_selection(selection: i64) -> Self {
        match selection {
            1 => Self::Expanding,
            2 => Self::Addition,
            _ => Self::Undefined,
        }
    }

    /// Numeric menu selection, if this policy has one.
    pub fn selection(&self) -> Option<i64> {
        match self {
            Self::Expanding => Some(1),
            Self::Addition => Some(2),
            Self::Undefined => None,
        }
    }

    /// Parse a policy name or numeric selection; anything else is `Undefined`.
    pub fn parse(s: &str) -> Self {
        let value = s.trim();
        if let Ok(selection) = value.parse::<i64>() {
            return Self::from_selection(selection);
        }
        match value.to_lowercase().as_str() {
            "expanding" | "replacement" | "replace" => Self::Expanding,
            "addition" | "add" => Self::Addition,
            _ => Self::Undefined,
        }
    }
}

impl fmt::Display for ResolutionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expanding => write!(f, "EXPANDING"),
            Self::Addition => write!(f, "ADDITION"),
            Self::Undefined => write!(f, "UNDEFINED"),
        }
    }
}

/// A resolution policy that can be stored and acted upon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PersistedPolicy {
    Expanding,
    #[default]
    Addition,
}

impl PersistedPolicy {
    /// Parse the canonical stored form (case-insensitive).
    pub fn from_stored(stored: &str) -> Option<Self> {
        Self::try_from(ResolutionPolicy::parse(stored)).ok()
    }
}

impl TryFrom<ResolutionPolicy> for PersistedPolicy {
    type Error = Error;

    fn try_from(policy: ResolutionPolicy) -> Result<Self, Self::Error> {
        match policy {
            ResolutionPolicy::Expanding => Ok(Self::Expanding),
            ResolutionPolicy::Addition => Ok(Self::Addition),
            ResolutionPolicy::Undefined => Err(Error::InvalidPolicySelection {
                policy: policy.to_string(),
            }),
        }
    }
}

impl From<PersistedPolicy> for ResolutionPolicy {
    fn from(policy: PersistedPolicy) -> Self {
        match policy {
            PersistedPolicy::Expanding => Self::Expanding,
            PersistedPolicy::Addition => Self::Addition,
        }
    }
}

impl fmt::Display for PersistedPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&ResolutionPolicy::from(*self), f)
    }
}

/// Layout and defaults of the resolver settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Workspace-relative folder holding the settings files
    pub resolver_dir: String,
    pub architecture_file: String,
    pub policy_file: String,
    /// Stored when the architecture prompt is answered blank
    pub default_architecture: String,
    /// Answer that selects "no architecture suffix"
    pub noarch_keyword: String,
    /// Media type the settings files are registered with
    pub media_type: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            resolver_dir: CsarPath::ResolverDir.as_str().to_string(),
            architecture_file: "arch".to_string(),
            policy_file: "resolv".to_string(),
            default_architecture: "i386".to_string(),
            noarch_keyword: "noarch".to_string(),
            media_type: "text/txt".to_string(),
        }
    }
}

impl StoreConfig {
    pub fn resolver_dir(&self) -> NormalizedPath {
        NormalizedPath::new(&self.resolver_dir)
    }

    pub fn architecture_path(&self) -> NormalizedPath {
        self.resolver_dir().join(&self.architecture_file)
    }

    pub fn policy_path(&self) -> NormalizedPath {
        self.resolver_dir().join(&self.policy_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "i386")]
    #[case("   ", "i386")]
    #[case("noarch", "")]
    #[case("amd64", ":amd64")]
    #[case("i386", ":i386")]
    #[case(":arm", ":arm")]
    fn test_architecture_from_input(#[case] input: &str, #[case] stored: &str) {
        let arch = Architecture::from_input(input, &StoreConfig::default());
        assert_eq!(arch.as_stored(), stored);
    }

    #[rstest]
    #[case("", "")]
    #[case("i386", "")]
    #[case(":amd64", "_amd64")]
    fn test_package_suffix(#[case] stored: &str, #[case] suffix: &str) {
        assert_eq!(Architecture::from_stored(stored).package_suffix(), suffix);
    }

    #[test]
    fn test_qualify() {
        let arch = Architecture::from_stored(":amd64");
        assert_eq!(arch.qualify("nginx"), "nginx_amd64");
        assert_eq!(Architecture::from_stored("i386").qualify("nginx"), "nginx");
    }

    #[test]
    fn test_architecture_display() {
        assert_eq!(Architecture::from_stored("").to_string(), "noarch");
        assert_eq!(Architecture::from_stored(":arm").to_string(), "arm");
        assert_eq!(Architecture::from_stored("i386").to_string(), "i386");
    }

    #[rstest]
    #[case("1", ResolutionPolicy::Expanding)]
    #[case("2", ResolutionPolicy::Addition)]
    #[case("3", ResolutionPolicy::Undefined)]
    #[case("EXPANDING", ResolutionPolicy::Expanding)]
    #[case("addition", ResolutionPolicy::Addition)]
    #[case("Replacement", ResolutionPolicy::Expanding)]
    #[case("UNDEFINED", ResolutionPolicy::Undefined)]
    #[case("", ResolutionPolicy::Undefined)]
    fn test_policy_parse(#[case] input: &str, #[case] expected: ResolutionPolicy) {
        assert_eq!(ResolutionPolicy::parse(input), expected);
    }

    #[test]
    fn test_policy_display_is_canonical() {
        assert_eq!(PersistedPolicy::Expanding.to_string(), "EXPANDING");
        assert_eq!(PersistedPolicy::Addition.to_string(), "ADDITION");
        assert_eq!(
            PersistedPolicy::from_stored("EXPANDING"),
            Some(PersistedPolicy::Expanding)
        );
        assert_eq!(PersistedPolicy::from_stored("UNDEFINED"), None);
    }

    #[test]
    fn test_undefined_is_not_persistable() {
        let result = PersistedPolicy::try_from(ResolutionPolicy::Undefined);
        assert!(matches!(result, Err(Error::InvalidPolicySelection { .. })));
    }

    #[test]
    fn test_selection_roundtrip() {
        for policy in [ResolutionPolicy::Expanding, ResolutionPolicy::Addition] {
            let selection = policy.selection().unwrap();
            assert_eq!(ResolutionPolicy::from_selection(selection), policy);
        }
        assert_eq!(ResolutionPolicy::Undefined.selection(), None);
    }

    #[test]
    fn test_store_config_paths() {
        let config = StoreConfig::default();
        assert_eq!(config.architecture_path().as_str(), "References_Resolver/arch");
        assert_eq!(config.policy_path().as_str(), "References_Resolver/resolv");
    }
}
