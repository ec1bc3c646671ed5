use super::{Detection, VcsError, VcsType, detect_vcs};
use std::path::{Path, PathBuf};

/// An existing working copy at a known path.
#[derive(Debug, Clone)]
pub struct RepositoryHandle {
    path: PathBuf,
    vcs: VcsType,
}

impl RepositoryHandle {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn vcs_type(&self) -> VcsType {
        self.vcs
    }

    /// `<path>/.<tag>`, built with `Path::join`.
    pub fn metadata_dir(&self) -> PathBuf {
        self.path.join(self.vcs.metadata_dir_name())
    }

    /// Short commit id of HEAD, for git working copies only.
    pub fn head_commit(&self) -> Option<String> {
        if self.vcs != VcsType::Git {
            return None;
        }
        let repo = git2::Repository::open(&self.path).ok()?;
        let commit = repo.head().ok()?.peel_to_commit().ok()?;
        let id = commit.id().to_string();
        Some(id.chars().take(7).collect())
    }
}

/// Open the working copy rooted at `path`.
///
/// Git working copies are validated through libgit2; for the other systems
/// the metadata directory must exist and be a directory.
pub fn open_repository(path: &Path) -> Result<RepositoryHandle, VcsError> {
    let vcs = match detect_vcs(path) {
        Detection::Detected(vcs) => vcs,
        Detection::NotDetected => return Err(VcsError::repo_not_found(path)),
        Detection::Failed(e) => return Err(VcsError::Io(e)),
    };

    match vcs {
        VcsType::Git => {
            git2::Repository::open(path)?;
        }
        _ => {
            let meta = path.join(vcs.metadata_dir_name());
            if !meta.is_dir() {
                return Err(VcsError::InvalidMetadata {
                    vcs,
                    path: meta.display().to_string(),
                });
            }
        }
    }

    Ok(RepositoryHandle {
        path: path.to_path_buf(),
        vcs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_open_git_repository() {
        let tmp = tempfile::tempdir().unwrap();
        git2::Repository::init(tmp.path()).unwrap();

        let handle = open_repository(tmp.path()).unwrap();
        assert_eq!(handle.vcs_type(), VcsType::Git);
        assert_eq!(handle.vcs_type().tag(), "git");
        assert_eq!(handle.metadata_dir(), tmp.path().join(".git"));
        // unborn HEAD has no commit
        assert!(handle.head_commit().is_none());
    }

    #[test]
    fn test_open_hg_by_metadata_dir() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir(tmp.path().join(".hg")).unwrap();

        let handle = open_repository(tmp.path()).unwrap();
        assert_eq!(handle.vcs_type(), VcsType::Hg);
        assert_eq!(handle.metadata_dir(), tmp.path().join(".hg"));
    }

    #[test]
    fn test_open_plain_directory_fails() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("README"), "hi").unwrap();
        assert!(matches!(
            open_repository(tmp.path()),
            Err(VcsError::RepositoryNotFound(_))
        ));
    }

    #[test]
    fn test_open_broken_git_dir_fails() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir(tmp.path().join(".git")).unwrap();
        assert!(matches!(open_repository(tmp.path()), Err(VcsError::Git(_))));
    }

    #[test]
    fn test_svn_metadata_file_is_invalid() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join(".svn"), "").unwrap();
        assert!(matches!(
            open_repository(tmp.path()),
            Err(VcsError::InvalidMetadata { vcs: VcsType::Svn, .. })
        ));
    }
}
