//! Vendored-package handling around an update fetch.
//!
//! A dependency that sits in the vendor directory as a plain copy (no VCS
//! metadata) cannot be updated in place. Two phases bracket the fetch:
//!
//! 1. [`vendored_setup`] clears such copies so the fetch can check out a fresh
//!    working copy, and records their names in [`VendoredMarkers`].
//! 2. [`vendored_cleanup`] strips the `.<vcs>` metadata directory back out of
//!    every marked dependency, restoring the plain-copy shape.
//!
//! Both phases are no-ops unless the run is an update run. Only vendor-root
//! resolution is fatal; everything else is recorded per dependency.

use super::{DependencySet, PhaseError, VendorError};
use crate::fsutil::{self, ClearOutcome};
use crate::project::{PathError, Project};
use crate::vcs::{self, Detection, RepositoryHandle, VcsError, VcsType};
use colored::*;
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Filesystem and VCS operations the phases depend on.
///
/// Everything but [`VendorBackend::vendor_root`] defaults to the real
/// implementation, so a test double only overrides what it needs to break.
pub trait VendorBackend {
    fn vendor_root(&self) -> Result<PathBuf, PathError>;

    fn is_dir_empty(&self, path: &Path) -> io::Result<bool> {
        fsutil::is_directory_empty(path)
    }

    fn detect_vcs(&self, path: &Path) -> Detection {
        vcs::detect_vcs(path)
    }

    fn clear_dir(&self, path: &Path) -> io::Result<ClearOutcome> {
        fsutil::clear_directory(path)
    }

    fn open_repository(&self, path: &Path) -> Result<RepositoryHandle, VcsError> {
        vcs::open_repository(path)
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir_all(path)
    }
}

/// Backend rooted at a discovered project.
pub struct LocalBackend<'a> {
    project: &'a Project,
}

impl<'a> LocalBackend<'a> {
    pub fn new(project: &'a Project) -> Self {
        Self { project }
    }
}

impl VendorBackend for LocalBackend<'_> {
    fn vendor_root(&self) -> Result<PathBuf, PathError> {
        self.project.vendor_root()
    }
}

/// Names of dependencies found vendored without VCS and cleared by setup.
///
/// Lives for one run only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VendoredMarkers {
    names: BTreeSet<String>,
}

impl VendoredMarkers {
    pub fn was_vendored_without_vcs(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    fn mark(&mut self, name: &str) {
        self.names.insert(name.to_string());
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[derive(Debug)]
pub enum SetupSkip {
    /// Path absent or without entries.
    Empty,
    /// Already a working copy; the fetch handles it.
    Managed(VcsType),
    /// Detection could not decide; treated like a working copy.
    DetectionFailed(io::Error),
}

#[derive(Debug)]
pub enum SetupOutcome {
    Cleared { leftover: Option<PathBuf> },
    Skipped(SetupSkip),
    Failed(PhaseError),
}

#[derive(Debug)]
pub enum CleanupOutcome {
    Stripped { metadata_dir: PathBuf },
    NotMarked,
    Failed(PhaseError),
}

#[derive(Debug)]
pub struct ItemOutcome<T> {
    pub name: String,
    pub outcome: T,
}

#[derive(Debug, Default)]
pub struct SetupReport {
    /// False when the run was not an update run and nothing was inspected.
    pub ran: bool,
    pub markers: VendoredMarkers,
    pub outcomes: Vec<ItemOutcome<SetupOutcome>>,
}

impl SetupReport {
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn outcome(&self, name: &str) -> Option<&SetupOutcome> {
        self.outcomes
            .iter()
            .find(|item| item.name == name)
            .map(|item| &item.outcome)
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &PhaseError)> {
        self.outcomes.iter().filter_map(|item| match &item.outcome {
            SetupOutcome::Failed(e) => Some((item.name.as_str(), e)),
            _ => None,
        })
    }
}

#[derive(Debug, Default)]
pub struct CleanupReport {
    /// True once the phase walked every dependency, even if some failed.
    /// False only when the run was not an update run.
    pub completed: bool,
    pub outcomes: Vec<ItemOutcome<CleanupOutcome>>,
}

impl CleanupReport {
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn outcome(&self, name: &str) -> Option<&CleanupOutcome> {
        self.outcomes
            .iter()
            .find(|item| item.name == name)
            .map(|item| &item.outcome)
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &PhaseError)> {
        self.outcomes.iter().filter_map(|item| match &item.outcome {
            CleanupOutcome::Failed(e) => Some((item.name.as_str(), e)),
            _ => None,
        })
    }
}

/// Clear plain vendored copies ahead of an update fetch.
pub fn vendored_setup<B: VendorBackend>(
    backend: &B,
    update: bool,
    deps: &DependencySet,
) -> Result<SetupReport, VendorError> {
    if !update {
        return Ok(SetupReport::disabled());
    }

    let vendor_root = backend.vendor_root()?;
    let mut report = SetupReport {
        ran: true,
        ..SetupReport::default()
    };

    for dep in deps {
        let path = dep.vendor_path(&vendor_root);
        let outcome = setup_one(backend, &dep.name, &path);
        if matches!(outcome, SetupOutcome::Cleared { .. }) {
            report.markers.mark(&dep.name);
        }
        report.outcomes.push(ItemOutcome {
            name: dep.name.clone(),
            outcome,
        });
    }

    Ok(report)
}

fn setup_one<B: VendorBackend>(backend: &B, name: &str, path: &Path) -> SetupOutcome {
    let empty = match backend.is_dir_empty(path) {
        Ok(empty) => empty,
        Err(source) => {
            eprintln!("{} Error with the directory {}: {}", "x".red(), path.display(), source);
            tracing::error!(dep = name, error = %source, "emptiness check failed");
            return SetupOutcome::Failed(PhaseError::Inspect {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    if empty {
        tracing::debug!(dep = name, "vendor path empty, nothing to clear");
        return SetupOutcome::Skipped(SetupSkip::Empty);
    }

    match backend.detect_vcs(path) {
        Detection::Detected(vcs) => {
            tracing::debug!(dep = name, %vcs, "already a working copy");
            SetupOutcome::Skipped(SetupSkip::Managed(vcs))
        }
        Detection::Failed(e) => {
            tracing::debug!(dep = name, error = %e, "VCS detection failed, leaving as is");
            SetupOutcome::Skipped(SetupSkip::DetectionFailed(e))
        }
        Detection::NotDetected => match backend.clear_dir(path) {
            Ok(ClearOutcome { leftover }) => {
                println!("   {} Updating vendored package {}", "⚡".yellow(), name.bold());
                if let Some(stale) = &leftover {
                    eprintln!(
                        "   {} Old copy of {} left at {}",
                        "!".yellow(),
                        name,
                        stale.display()
                    );
                }
                SetupOutcome::Cleared { leftover }
            }
            Err(source) => {
                eprintln!(
                    "{} Unable to update vendored dependency {}: {}",
                    "x".red(),
                    name,
                    source
                );
                tracing::error!(dep = name, error = %source, "clearing vendored copy failed");
                SetupOutcome::Failed(PhaseError::Remove {
                    path: path.to_path_buf(),
                    source,
                })
            }
        },
    }
}

/// Strip VCS metadata from dependencies that setup cleared.
pub fn vendored_cleanup<B: VendorBackend>(
    backend: &B,
    update: bool,
    deps: &DependencySet,
    markers: &VendoredMarkers,
) -> Result<CleanupReport, VendorError> {
    if !update {
        return Ok(CleanupReport::disabled());
    }

    let vendor_root = backend.vendor_root()?;
    let mut report = CleanupReport {
        completed: true,
        outcomes: Vec::with_capacity(deps.len()),
    };

    for dep in deps {
        let outcome = if markers.was_vendored_without_vcs(&dep.name) {
            cleanup_one(backend, &dep.name, &dep.vendor_path(&vendor_root))
        } else {
            CleanupOutcome::NotMarked
        };
        report.outcomes.push(ItemOutcome {
            name: dep.name.clone(),
            outcome,
        });
    }

    Ok(report)
}

fn cleanup_one<B: VendorBackend>(backend: &B, name: &str, path: &Path) -> CleanupOutcome {
    let repo = match backend.open_repository(path) {
        Ok(repo) => repo,
        Err(source) => {
            eprintln!("{} Error cleaning up {}: {}", "x".red(), name, source);
            tracing::error!(dep = name, error = %source, "cannot open working copy");
            return CleanupOutcome::Failed(PhaseError::Open {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let metadata_dir = path.join(format!(".{}", repo.vcs_type().tag()));
    match backend.remove_dir_all(&metadata_dir) {
        Ok(()) => {
            println!("   {} Cleaning up vendored package {}", "🧹".yellow(), name.bold());
            tracing::debug!(dep = name, dir = %metadata_dir.display(), "removed VCS metadata");
            CleanupOutcome::Stripped { metadata_dir }
        }
        Err(source) => {
            eprintln!("{} Error cleaning up VCS dir for {}: {}", "x".red(), name, source);
            tracing::error!(dep = name, error = %source, "cannot remove VCS metadata");
            CleanupOutcome::Failed(PhaseError::Remove {
                path: metadata_dir,
                source,
            })
        }
    }
}
