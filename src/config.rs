//! Configuration file parsing (`vendr.toml`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path};
use thiserror::Error;

pub const CONFIG_FILE: &str = "vendr.toml";
pub const LOCK_FILE: &str = "vendr.lock";
pub const DEFAULT_VENDOR_DIR: &str = "vendor";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid dependency name '{0}': must be a relative import path")]
    InvalidName(String),

    #[error("dependency '{0}' has no git URL")]
    MissingSource(String),
}

#[derive(Deserialize, Serialize, Debug, Default, Clone)]
pub struct VendrConfig {
    pub package: PackageConfig,
    #[serde(default)]
    pub vendor: VendorConfig,
    #[serde(default)]
    pub dependencies: BTreeMap<String, Dependency>,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone)]
pub struct PackageConfig {
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct VendorConfig {
    #[serde(default = "default_vendor_dir")]
    pub dir: String,
}

impl Default for VendorConfig {
    fn default() -> Self {
        Self {
            dir: default_vendor_dir(),
        }
    }
}

/// A dependency source: either a bare git URL or a table with pins.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum Dependency {
    Simple(String),
    Complex {
        git: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        tag: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        branch: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        rev: Option<String>,
    },
}

impl Dependency {
    pub fn git_url(&self) -> Option<&str> {
        match self {
            Dependency::Simple(url) => Some(url),
            Dependency::Complex { git, .. } => git.as_deref(),
        }
    }

    pub fn tag(&self) -> Option<&str> {
        match self {
            Dependency::Complex { tag, .. } => tag.as_deref(),
            Dependency::Simple(_) => None,
        }
    }

    pub fn branch(&self) -> Option<&str> {
        match self {
            Dependency::Complex { branch, .. } => branch.as_deref(),
            Dependency::Simple(_) => None,
        }
    }

    pub fn rev(&self) -> Option<&str> {
        match self {
            Dependency::Complex { rev, .. } => rev.as_deref(),
            Dependency::Simple(_) => None,
        }
    }

    pub fn is_pinned(&self) -> bool {
        self.tag().is_some() || self.branch().is_some() || self.rev().is_some()
    }
}

impl VendrConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&content, path)
    }

    pub fn parse(content: &str, origin: &Path) -> Result<Self, ConfigError> {
        let config: VendrConfig =
            toml::from_str(content).map_err(|source| ConfigError::Parse {
                path: origin.display().to_string(),
                source,
            })?;
        for (name, dep) in &config.dependencies {
            validate_dependency_name(name)?;
            // Setup may clear a vendored copy; it has to be fetchable again
            if dep.git_url().is_none() {
                return Err(ConfigError::MissingSource(name.clone()));
            }
        }
        Ok(config)
    }
}

/// Rejects names that would escape the vendor root once joined onto it.
pub fn validate_dependency_name(name: &str) -> Result<(), ConfigError> {
    let trimmed = name.trim_matches('/');
    if trimmed.is_empty() || name.starts_with('/') || name.contains('\\') {
        return Err(ConfigError::InvalidName(name.to_string()));
    }
    for part in trimmed.split('/') {
        let ok = matches!(Path::new(part).components().next(), Some(Component::Normal(_)))
            && Path::new(part).components().count() == 1;
        if part.is_empty() || !ok {
            return Err(ConfigError::InvalidName(name.to_string()));
        }
    }
    Ok(())
}

fn default_version() -> String {
    "0.1.0".to_string()
}

fn default_vendor_dir() -> String {
    DEFAULT_VENDOR_DIR.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[package]
name = "app"

[dependencies]
"github.com/acme/widget" = "https://github.com/acme/widget.git"
"github.com/acme/gadget" = { git = "https://github.com/acme/gadget.git", tag = "v1.2.0" }
"#;

    #[test]
    fn test_parse_defaults() {
        let config = VendrConfig::parse(SAMPLE, Path::new(CONFIG_FILE)).unwrap();
        assert_eq!(config.package.name, "app");
        assert_eq!(config.package.version, "0.1.0");
        assert_eq!(config.vendor.dir, "vendor");
        assert_eq!(config.dependencies.len(), 2);
    }

    #[test]
    fn test_parse_dependency_shapes() {
        let config = VendrConfig::parse(SAMPLE, Path::new(CONFIG_FILE)).unwrap();

        let widget = &config.dependencies["github.com/acme/widget"];
        assert_eq!(widget.git_url(), Some("https://github.com/acme/widget.git"));
        assert!(!widget.is_pinned());

        let gadget = &config.dependencies["github.com/acme/gadget"];
        assert_eq!(gadget.tag(), Some("v1.2.0"));
        assert!(gadget.is_pinned());
    }

    #[test]
    fn test_custom_vendor_dir() {
        let toml_str = r#"
[package]
name = "app"

[vendor]
dir = "third_party"
"#;
        let config = VendrConfig::parse(toml_str, Path::new(CONFIG_FILE)).unwrap();
        assert_eq!(config.vendor.dir, "third_party");
        assert!(config.dependencies.is_empty());
    }

    #[test]
    fn test_rejects_escaping_names() {
        for bad in ["", "/abs/path", "../outside", "a/../b", "a//b", "./a", "a\\b"] {
            assert!(
                validate_dependency_name(bad).is_err(),
                "expected '{}' to be rejected",
                bad
            );
        }
        assert!(validate_dependency_name("github.com/acme/widget").is_ok());
        assert!(validate_dependency_name("zlib").is_ok());
    }

    #[test]
    fn test_rejects_dependency_without_git_url() {
        let toml_str = r#"
[package]
name = "app"

[dependencies]
lib = { tag = "v1" }
"#;
        let err = VendrConfig::parse(toml_str, Path::new(CONFIG_FILE)).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSource(ref name) if name == "lib"));
    }

    #[test]
    fn test_parse_error_names_file() {
        let err = VendrConfig::parse("[package", Path::new("vendr.toml")).unwrap_err();
        assert!(err.to_string().contains("vendr.toml"));
    }
}
