use super::VcsType;
use std::fs;
use std::io;
use std::path::Path;

/// Result of probing a directory for VCS metadata.
#[derive(Debug)]
pub enum Detection {
    /// A metadata entry for this VCS sits at the directory root.
    Detected(VcsType),
    /// No known metadata entry exists.
    NotDetected,
    /// Probing failed for some other reason (permissions, broken mount).
    Failed(io::Error),
}

impl Detection {
    pub fn vcs(&self) -> Option<VcsType> {
        match self {
            Detection::Detected(vcs) => Some(*vcs),
            _ => None,
        }
    }
}

/// Look for `.git`, `.svn`, `.hg` and `.bzr` directly under `path`.
///
/// The first entry found wins. Any stat error other than "not found" stops
/// the probe and is reported as [`Detection::Failed`].
pub fn detect_vcs(path: &Path) -> Detection {
    for vcs in VcsType::ALL {
        let candidate = path.join(vcs.metadata_dir_name());
        match fs::metadata(&candidate) {
            Ok(_) => return Detection::Detected(vcs),
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => return Detection::Failed(e),
        }
    }
    Detection::NotDetected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_each_metadata_dir() {
        for vcs in VcsType::ALL {
            let tmp = tempfile::tempdir().unwrap();
            fs::create_dir(tmp.path().join(vcs.metadata_dir_name())).unwrap();
            assert_eq!(detect_vcs(tmp.path()).vcs(), Some(vcs));
        }
    }

    #[test]
    fn test_plain_directory_not_detected() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("lib.go"), "package lib").unwrap();
        fs::create_dir(tmp.path().join("gitstuff")).unwrap();
        assert!(matches!(detect_vcs(tmp.path()), Detection::NotDetected));
    }

    #[test]
    fn test_git_file_counts_as_metadata() {
        // linked worktrees and submodules use a `.git` file
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join(".git"), "gitdir: ../elsewhere").unwrap();
        assert_eq!(detect_vcs(tmp.path()).vcs(), Some(VcsType::Git));
    }

    #[test]
    fn test_missing_directory_not_detected() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(matches!(
            detect_vcs(&tmp.path().join("absent")),
            Detection::NotDetected
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_probe_error_is_failed() {
        // a regular file in place of the directory makes stat fail with ENOTDIR
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("plain");
        fs::write(&file, "x").unwrap();
        assert!(matches!(detect_vcs(&file), Detection::Failed(_)));
    }
}
