//! Lockfile (`vendr.lock`) management.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct LockFile {
    #[serde(rename = "package", default)]
    pub packages: BTreeMap<String, PackageLock>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PackageLock {
    pub git: String,
    pub rev: String,
}

impl LockFile {
    /// Missing lockfile reads as empty.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&PackageLock> {
        self.packages.get(name)
    }

    pub fn insert(&mut self, name: String, git: String, rev: String) {
        self.packages.insert(name, PackageLock { git, rev });
    }

    /// Drop entries whose dependency is no longer configured.
    pub fn retain_names<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) {
        let keep: std::collections::HashSet<&str> = names.into_iter().collect();
        self.packages.retain(|name, _| keep.contains(name.as_str()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lockfile_insert_and_get() {
        let mut lock = LockFile::default();
        lock.insert(
            "github.com/acme/widget".to_string(),
            "https://github.com/acme/widget.git".to_string(),
            "abc123".to_string(),
        );
        let entry = lock.get("github.com/acme/widget").unwrap();
        assert_eq!(entry.git, "https://github.com/acme/widget.git");
        assert_eq!(entry.rev, "abc123");
        assert!(lock.get("nonexistent").is_none());
    }

    #[test]
    fn test_lockfile_parse() {
        let toml_str = r#"
[package]
"github.com/acme/widget" = { git = "https://github.com/acme/widget.git", rev = "abc123" }
"#;
        let lock: LockFile = toml::from_str(toml_str).unwrap();
        assert_eq!(lock.get("github.com/acme/widget").unwrap().rev, "abc123");
    }

    #[test]
    fn test_missing_lockfile_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let lock = LockFile::load(&tmp.path().join("vendr.lock")).unwrap();
        assert!(lock.packages.is_empty());
    }

    #[test]
    fn test_save_and_reload() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("vendr.lock");
        let mut lock = LockFile::default();
        lock.insert("a".into(), "https://a.git".into(), "111".into());
        lock.insert("b".into(), "https://b.git".into(), "222".into());
        lock.retain_names(["b"]);
        lock.save(&path).unwrap();

        let reloaded = LockFile::load(&path).unwrap();
        assert_eq!(reloaded, lock);
        assert!(reloaded.get("a").is_none());
    }
}
