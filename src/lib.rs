//! # vendr - vendor-directory dependency manager
//!
//! vendr keeps one directory per dependency under `vendor/`, fetched from git
//! and pinned through `vendr.lock`. Entries that were copied in by hand (no
//! VCS metadata) are respected on `install` and swapped for a fresh checkout
//! on `update`, after which the `.git` directory is stripped again so the
//! entry stays a plain vendored copy.
//!
//! ## Module Organization
//!
//! - [`config`] - `vendr.toml` parsing
//! - [`project`] - project discovery and vendor-root resolution
//! - [`vcs`] - VCS detection and working-copy handles
//! - [`deps`] - setup/cleanup phases, fetching, and the update pipeline

/// Configuration file parsing (`vendr.toml`).
pub mod config;

/// Dependency fetching and vendored-package handling.
pub mod deps;

/// Filesystem helpers for vendor entries.
pub mod fsutil;

/// Lockfile (`vendr.lock`) management.
pub mod lock;

/// Tracing subscriber setup.
pub mod logging;

/// Project discovery and the vendor path.
pub mod project;

/// Vendor directory status report.
pub mod status;

/// Terminal UI utilities (tables).
pub mod ui;

/// Version-control detection.
pub mod vcs;

#[cfg(test)]
mod test_support;
