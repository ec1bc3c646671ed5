use super::VendorError;
use crate::config::{Dependency, VendrConfig};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// One configured dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyRecord {
    pub name: String,
    pub source: Dependency,
}

impl DependencyRecord {
    pub fn new(name: impl Into<String>, source: Dependency) -> Self {
        Self {
            name: name.into(),
            source,
        }
    }

    /// `root` joined with each `/`-separated segment of the name.
    pub fn vendor_path(&self, root: &Path) -> PathBuf {
        self.name
            .split('/')
            .filter(|part| !part.is_empty())
            .fold(root.to_path_buf(), |acc, part| acc.join(part))
    }
}

/// Ordered dependencies, unique by name.
#[derive(Debug, Clone, Default)]
pub struct DependencySet {
    records: Vec<DependencyRecord>,
}

impl DependencySet {
    pub fn new(records: Vec<DependencyRecord>) -> Result<Self, VendorError> {
        let mut seen = HashSet::new();
        for record in &records {
            if !seen.insert(record.name.as_str()) {
                return Err(VendorError::DuplicateDependency(record.name.clone()));
            }
        }
        Ok(Self { records })
    }

    pub fn from_config(config: &VendrConfig) -> Self {
        // BTreeMap keys are already unique and sorted
        let records = config
            .dependencies
            .iter()
            .map(|(name, dep)| DependencyRecord::new(name.clone(), dep.clone()))
            .collect();
        Self { records }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DependencyRecord> {
        self.records.iter()
    }

    pub fn get(&self, name: &str) -> Option<&DependencyRecord> {
        self.records.iter().find(|r| r.name == name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.name.as_str())
    }
}

impl<'a> IntoIterator for &'a DependencySet {
    type Item = &'a DependencyRecord;
    type IntoIter = std::slice::Iter<'a, DependencyRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str) -> DependencyRecord {
        DependencyRecord::new(name, Dependency::Simple(format!("https://{}.git", name)))
    }

    #[test]
    fn test_vendor_path_joins_segments() {
        let rec = record("github.com/acme/widget");
        let path = rec.vendor_path(Path::new("vendor"));
        assert_eq!(
            path,
            Path::new("vendor")
                .join("github.com")
                .join("acme")
                .join("widget")
        );
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let result = DependencySet::new(vec![record("a"), record("b"), record("a")]);
        assert!(matches!(result, Err(VendorError::DuplicateDependency(n)) if n == "a"));
    }

    #[test]
    fn test_set_keeps_order() {
        let set = DependencySet::new(vec![record("z"), record("a")]).unwrap();
        assert_eq!(set.names().collect::<Vec<_>>(), vec!["z", "a"]);
        assert!(set.get("a").is_some());
        assert!(set.get("q").is_none());
    }

    #[test]
    fn test_from_config_sorted_by_name() {
        let toml_str = r#"
[package]
name = "app"

[dependencies]
zeta = "https://example.com/zeta.git"
alpha = "https://example.com/alpha.git"
"#;
        let config = VendrConfig::parse(toml_str, Path::new("vendr.toml")).unwrap();
        let set = DependencySet::from_config(&config);
        assert_eq!(set.names().collect::<Vec<_>>(), vec!["alpha", "zeta"]);
    }
}
