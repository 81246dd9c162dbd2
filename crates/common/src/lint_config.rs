//! Lint configuration loading from YAML files
//!
//! Structural errors from the error taxonomy are always reported as errors.
//! The checks listed in [`Lint`] flag questionable but legal IR, and their
//! severity can be tuned per project with a small YAML file:
//!
//! ```yaml
//! version: 1
//! lints:
//!   nested_optional: deny
//!   deprecated_reference: warn
//! ```

use crate::{Result, SpecError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// How a lint finding is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LintLevel {
    /// Not reported
    Allow,
    /// Reported, does not fail validation
    Warn,
    /// Reported as an error
    Deny,
}

/// Checks whose level is configurable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lint {
    /// An optional type directly wrapping another optional type
    NestedOptional,
    /// A union with fewer than two members
    DegenerateUnion,
    /// A reference to a definition marked deprecated
    DeprecatedReference,
}

impl fmt::Display for Lint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Lint::NestedOptional => "nested_optional",
            Lint::DegenerateUnion => "degenerate_union",
            Lint::DeprecatedReference => "deprecated_reference",
        };
        f.write_str(name)
    }
}

/// Root structure for lint configuration YAML files
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LintConfig {
    /// Configuration format version
    #[serde(default = "default_config_version")]
    pub version: u32,
    /// Per-lint levels
    #[serde(default)]
    pub lints: LintLevels,
}

/// Level of each configurable lint
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LintLevels {
    #[serde(default = "warn")]
    pub nested_optional: LintLevel,
    #[serde(default = "deny")]
    pub degenerate_union: LintLevel,
    #[serde(default = "allow")]
    pub deprecated_reference: LintLevel,
}

impl Default for LintLevels {
    fn default() -> Self {
        Self {
            nested_optional: LintLevel::Warn,
            degenerate_union: LintLevel::Deny,
            deprecated_reference: LintLevel::Allow,
        }
    }
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            version: default_config_version(),
            lints: LintLevels::default(),
        }
    }
}

impl LintConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            SpecError::Parse(format!("Failed to read lint config {:?}: {}", path, e))
        })?;

        Self::from_yaml(&content).map_err(|e| {
            SpecError::Parse(format!("Failed to parse lint config {:?}: {}", path, e))
        })
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: LintConfig = serde_yaml::from_str(content)?;
        if config.version != 1 {
            return Err(SpecError::Parse(format!(
                "unsupported lint config version {}",
                config.version
            )));
        }
        Ok(config)
    }

    pub fn level(&self, lint: Lint) -> LintLevel {
        match lint {
            Lint::NestedOptional => self.lints.nested_optional,
            Lint::DegenerateUnion => self.lints.degenerate_union,
            Lint::DeprecatedReference => self.lints.deprecated_reference,
        }
    }

    /// Override the level of one lint
    pub fn set(&mut self, lint: Lint, level: LintLevel) {
        match lint {
            Lint::NestedOptional => self.lints.nested_optional = level,
            Lint::DegenerateUnion => self.lints.degenerate_union = level,
            Lint::DeprecatedReference => self.lints.deprecated_reference = level,
        }
    }
}

fn default_config_version() -> u32 {
    1
}

fn allow() -> LintLevel {
    LintLevel::Allow
}

fn warn() -> LintLevel {
    LintLevel::Warn
}

fn deny() -> LintLevel {
    LintLevel::Deny
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = LintConfig::default();
        assert_eq!(config.level(Lint::NestedOptional), LintLevel::Warn);
        assert_eq!(config.level(Lint::DegenerateUnion), LintLevel::Deny);
        assert_eq!(config.level(Lint::DeprecatedReference), LintLevel::Allow);
    }

    #[test]
    fn test_partial_yaml_keeps_other_defaults() {
        let config = LintConfig::from_yaml("version: 1\nlints:\n  nested_optional: deny\n").unwrap();
        assert_eq!(config.level(Lint::NestedOptional), LintLevel::Deny);
        assert_eq!(config.level(Lint::DegenerateUnion), LintLevel::Deny);
    }

    #[test]
    fn test_unknown_lint_is_rejected() {
        assert!(LintConfig::from_yaml("lints:\n  shouting: deny\n").is_err());
    }

    #[test]
    fn test_unsupported_version() {
        let err = LintConfig::from_yaml("version: 2\n").unwrap_err();
        assert!(err.to_string().contains("version 2"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "version: 1\nlints:\n  deprecated_reference: warn").unwrap();

        let config = LintConfig::load(file.path()).unwrap();
        assert_eq!(config.level(Lint::DeprecatedReference), LintLevel::Warn);
    }

    #[test]
    fn test_set_overrides_level() {
        let mut config = LintConfig::default();
        config.set(Lint::DegenerateUnion, LintLevel::Allow);
        assert_eq!(config.level(Lint::DegenerateUnion), LintLevel::Allow);
    }
}
