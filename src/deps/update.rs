//! The install/update pipeline: setup, fetch, cleanup.

use super::fetch::{FetchOptions, FetchReport, fetch_with_lock};
use super::vendored::{
    CleanupReport, LocalBackend, SetupReport, vendored_cleanup, vendored_setup,
};
use super::DependencySet;
use crate::lock::LockFile;
use crate::project::Project;
use anyhow::{Context, Result};
use colored::*;

#[derive(Debug)]
pub struct PipelineReport {
    pub setup: SetupReport,
    pub fetch: FetchReport,
    pub cleanup: CleanupReport,
}

impl PipelineReport {
    /// Per-dependency failures across all three steps.
    pub fn failure_count(&self) -> usize {
        self.setup.failures().count()
            + self.fetch.failures().count()
            + self.cleanup.failures().count()
    }
}

/// Run one install (`update == false`) or update (`update == true`) pass.
///
/// The vendored phases only act on update runs; install runs just fill in
/// what is missing, honoring the lockfile. Everything that can fail for the
/// run as a whole is checked before setup clears anything, and the lockfile
/// is only written once cleanup has run.
pub fn run_pipeline(project: &Project, update: bool) -> Result<PipelineReport> {
    let deps = DependencySet::from_config(&project.config);
    let backend = LocalBackend::new(project);

    let vendor_root = project.vendor_root()?;
    let lock_path = project.lock_path();
    let mut lockfile = LockFile::load(&lock_path)
        .context("Refusing to touch the vendor directory with an unreadable lockfile")?;

    let setup = vendored_setup(&backend, update, &deps)?;
    if !setup.markers.is_empty() {
        tracing::info!(count = setup.markers.len(), "cleared vendored packages");
    }

    let options = if update {
        FetchOptions::update()
    } else {
        FetchOptions::install()
    };
    let fetch = fetch_with_lock(&vendor_root, &deps, options, &mut lockfile);

    let cleanup = vendored_cleanup(&backend, update, &deps, &setup.markers)?;

    lockfile.retain_names(deps.names());
    lockfile.save(&lock_path)?;

    Ok(PipelineReport {
        setup,
        fetch,
        cleanup,
    })
}

pub fn install_dependencies(project: &Project) -> Result<()> {
    let report = run_pipeline(project, false)?;
    finish(&report, "Dependencies installed.")
}

pub fn update_dependencies(project: &Project) -> Result<()> {
    println!("{} Checking for updates...", "📦".blue());
    let report = run_pipeline(project, true)?;
    finish(&report, "Dependencies updated.")
}

fn finish(report: &PipelineReport, done: &str) -> Result<()> {
    let failures = report.failure_count();
    if failures == 0 {
        println!("{} {}", "✓".green(), done);
        return Ok(());
    }
    Err(anyhow::anyhow!(
        "{} dependenc{} could not be processed; see messages above",
        failures,
        if failures == 1 { "y" } else { "ies" }
    ))
}
