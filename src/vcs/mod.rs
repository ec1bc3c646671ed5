//! Version-control detection for vendor entries.
//!
//! Only the metadata-directory convention matters here: a working copy of a
//! VCS named `tag` carries a `.tag` entry at its root.
//!
//! - [`detect_vcs`] - three-way detection on a directory
//! - [`open_repository`] - handle over an existing working copy

mod detect;
mod repo;

pub use detect::{Detection, detect_vcs};
pub use repo::{RepositoryHandle, open_repository};

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors opening or inspecting a working copy.
#[derive(Debug, Error)]
pub enum VcsError {
    #[error("no working copy found at {0}")]
    RepositoryNotFound(String),

    #[error("{vcs} metadata at {path} is not a directory")]
    InvalidMetadata { vcs: VcsType, path: String },

    #[error("git: {0}")]
    Git(#[from] git2::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl VcsError {
    pub fn repo_not_found(path: &Path) -> Self {
        Self::RepositoryNotFound(path.display().to_string())
    }
}

/// Version control systems the detector knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VcsType {
    Git,
    Svn,
    Hg,
    Bzr,
}

impl VcsType {
    /// Probe order used by detection.
    pub const ALL: [VcsType; 4] = [VcsType::Git, VcsType::Svn, VcsType::Hg, VcsType::Bzr];

    /// Short identifier, also the suffix of the metadata directory name.
    pub fn tag(self) -> &'static str {
        match self {
            VcsType::Git => "git",
            VcsType::Svn => "svn",
            VcsType::Hg => "hg",
            VcsType::Bzr => "bzr",
        }
    }

    pub fn metadata_dir_name(self) -> String {
        format!(".{}", self.tag())
    }
}

impl fmt::Display for VcsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for VcsType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "git" => Ok(VcsType::Git),
            "svn" => Ok(VcsType::Svn),
            "hg" | "mercurial" => Ok(VcsType::Hg),
            "bzr" | "bazaar" => Ok(VcsType::Bzr),
            other => Err(format!("unknown VCS type '{}'", other)),
        }
    }
}
