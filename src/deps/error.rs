use crate::project::PathError;
use crate::vcs::VcsError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop a whole phase.
#[derive(Debug, Error)]
pub enum VendorError {
    #[error("could not resolve vendor directory: {0}")]
    Path(#[from] PathError),

    #[error("dependency '{0}' is listed more than once")]
    DuplicateDependency(String),
}

/// A failure confined to one dependency. The phase logs it and moves on.
#[derive(Debug, Error)]
pub enum PhaseError {
    #[error("cannot inspect {}: {source}", .path.display())]
    Inspect {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot remove {}: {source}", .path.display())]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot open working copy at {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: VcsError,
    },
}
