//! Vendor directory status (`vendr list`).
//!
//! ```text
//!   ┌────────────────────────┬──────────┬───────┬─────────┐
//!   │ Dependency             │ State    │ Files │ Rev     │
//!   ├────────────────────────┼──────────┼───────┼─────────┤
//!   │ github.com/acme/widget │ vendored │ 12    │ -       │
//!   │ github.com/acme/gadget │ git      │ 40    │ 3f2a9c1 │
//!   └────────────────────────┴──────────┴───────┴─────────┘
//! ```

use crate::deps::DependencySet;
use crate::fsutil;
use crate::project::Project;
use crate::ui;
use crate::vcs::{self, Detection, VcsType};
use anyhow::Result;
use colored::*;
use serde::Serialize;
use std::path::Path;
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryState {
    Missing,
    Empty,
    /// Plain copy with no VCS metadata.
    Vendored,
    Managed(String),
    Unreadable(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct EntryStatus {
    pub name: String,
    pub path: String,
    pub state: EntryState,
    pub files: usize,
    pub rev: Option<String>,
}

pub fn collect_status(project: &Project) -> Result<Vec<EntryStatus>> {
    let vendor_root = project.vendor_root()?;
    let deps = DependencySet::from_config(&project.config);

    Ok(deps
        .iter()
        .map(|dep| {
            let path = dep.vendor_path(&vendor_root);
            let state = entry_state(&path);
            let rev = match state {
                EntryState::Managed(_) => vcs::open_repository(&path)
                    .ok()
                    .and_then(|repo| repo.head_commit()),
                _ => None,
            };
            EntryStatus {
                name: dep.name.clone(),
                path: path.display().to_string(),
                files: count_files(&path),
                state,
                rev,
            }
        })
        .collect())
}

fn entry_state(path: &Path) -> EntryState {
    if !path.exists() {
        return EntryState::Missing;
    }
    match fsutil::is_directory_empty(path) {
        Ok(true) => return EntryState::Empty,
        Ok(false) => {}
        Err(e) => return EntryState::Unreadable(e.to_string()),
    }
    match vcs::detect_vcs(path) {
        Detection::Detected(vcs) => EntryState::Managed(vcs.tag().to_string()),
        Detection::NotDetected => EntryState::Vendored,
        Detection::Failed(e) => EntryState::Unreadable(e.to_string()),
    }
}

/// Files under `path`, not counting anything inside VCS metadata.
fn count_files(path: &Path) -> usize {
    let metadata_names: Vec<String> = VcsType::ALL
        .iter()
        .map(|vcs| vcs.metadata_dir_name())
        .collect();

    WalkDir::new(path)
        .min_depth(1)
        .into_iter()
        .filter_entry(|entry| {
            let name = entry.file_name().to_string_lossy();
            !metadata_names.iter().any(|m| *m == name)
        })
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .count()
}

pub fn print_status(project: &Project, json: bool) -> Result<()> {
    let entries = collect_status(project)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("{} No dependencies in vendr.toml", "!".yellow());
        return Ok(());
    }

    let mut table = ui::Table::new(&["Dependency", "State", "Files", "Rev"]);
    for entry in &entries {
        let state = match &entry.state {
            EntryState::Missing => "missing".red().to_string(),
            EntryState::Empty => "empty".yellow().to_string(),
            EntryState::Vendored => "vendored".cyan().to_string(),
            EntryState::Managed(tag) => tag.green().to_string(),
            EntryState::Unreadable(_) => "unreadable".red().to_string(),
        };
        table.add_row(vec![
            entry.name.bold().to_string(),
            state,
            entry.files.to_string(),
            entry.rev.clone().unwrap_or_else(|| "-".dimmed().to_string()),
        ]);
    }
    table.print();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CONFIG_FILE;
    use std::fs;

    #[test]
    fn test_collect_status_states() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            r#"
[package]
name = "app"

[dependencies]
absent = "https://example.com/absent.git"
plain = "https://example.com/plain.git"
tracked = "https://example.com/tracked.git"
"#,
        )
        .unwrap();
        let vendor = tmp.path().join("vendor");
        fs::create_dir_all(vendor.join("plain").join("src")).unwrap();
        fs::write(vendor.join("plain").join("src").join("a.c"), "").unwrap();
        fs::write(vendor.join("plain").join("b.c"), "").unwrap();
        fs::create_dir_all(vendor.join("tracked").join(".hg").join("store")).unwrap();
        fs::write(vendor.join("tracked").join(".hg").join("store").join("x"), "").unwrap();
        fs::write(vendor.join("tracked").join("c.py"), "").unwrap();

        let project = Project::load(tmp.path()).unwrap();
        let entries = collect_status(&project).unwrap();
        let by_name = |n: &str| entries.iter().find(|e| e.name == n).unwrap().clone();

        assert_eq!(by_name("absent").state, EntryState::Missing);
        assert_eq!(by_name("plain").state, EntryState::Vendored);
        assert_eq!(by_name("plain").files, 2);
        assert_eq!(by_name("tracked").state, EntryState::Managed("hg".into()));
        assert_eq!(by_name("tracked").files, 1);
        assert_eq!(by_name("tracked").rev, None);
    }

    #[test]
    fn test_state_serializes_kebab_case() {
        let json = serde_json::to_string(&EntryState::Vendored).unwrap();
        assert_eq!(json, "\"vendored\"");
        let json = serde_json::to_string(&EntryState::Managed("git".into())).unwrap();
        assert_eq!(json, "{\"managed\":\"git\"}");
    }
}
