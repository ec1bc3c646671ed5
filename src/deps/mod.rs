//! Dependency fetching and vendor-directory management.
//!
//! - **Records**: the configured dependency set and each entry's vendor path
//! - **Vendored phases**: turn hand-copied entries into fetched ones on update
//! - **Fetching**: clone or refresh git working copies under the vendor root
//! - **Pipeline**: setup, fetch and cleanup for `vendr install` / `vendr update`

mod error;
mod fetch;
mod record;
mod update;
mod vendored;

pub use error::{PhaseError, VendorError};
pub use fetch::{
    FetchOptions, FetchOutcome, FetchReport, fetch_dependencies, fetch_with_lock,
};
pub use record::{DependencyRecord, DependencySet};
pub use update::{PipelineReport, install_dependencies, run_pipeline, update_dependencies};
pub use vendored::{
    CleanupOutcome, CleanupReport, ItemOutcome, LocalBackend, SetupOutcome, SetupReport,
    SetupSkip, VendorBackend, VendoredMarkers, vendored_cleanup, vendored_setup,
};
