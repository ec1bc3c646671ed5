//! Fetching dependencies into the vendor directory.
//!
//! Every dependency with a git URL ends up as a git working copy under the
//! vendor root, checked out at its pin (rev, tag, branch) or, failing that, at
//! the locked commit. Plain vendored copies are left alone unless setup
//! cleared them first.

use super::{DependencyRecord, DependencySet, ItemOutcome};
use crate::config::Dependency;
use crate::fsutil;
use crate::lock::LockFile;
use crate::project::Project;
use crate::vcs::{self, Detection, VcsType};
use anyhow::{Context, Result, bail};
use colored::*;
use git2::Repository;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::Path;

#[derive(Clone, Copy, Debug)]
pub struct FetchOptions {
    /// Pull new commits for existing working copies.
    pub update: bool,
    /// Check out the locked commit when no pin is configured.
    pub enforce_lock: bool,
}

impl FetchOptions {
    pub fn install() -> Self {
        Self {
            update: false,
            enforce_lock: true,
        }
    }

    pub fn update() -> Self {
        Self {
            update: true,
            enforce_lock: false,
        }
    }
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self::install()
    }
}

#[derive(Debug)]
pub enum FetchOutcome {
    Cloned { rev: Option<String> },
    Refreshed { rev: Option<String> },
    /// Plain copy without VCS metadata, left as is.
    KeptVendored,
    /// Working copy of a system other than git.
    Unsupported(VcsType),
    Failed(anyhow::Error),
}

#[derive(Debug, Default)]
pub struct FetchReport {
    pub outcomes: Vec<ItemOutcome<FetchOutcome>>,
}

impl FetchReport {
    pub fn outcome(&self, name: &str) -> Option<&FetchOutcome> {
        self.outcomes
            .iter()
            .find(|item| item.name == name)
            .map(|item| &item.outcome)
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &anyhow::Error)> {
        self.outcomes.iter().filter_map(|item| match &item.outcome {
            FetchOutcome::Failed(e) => Some((item.name.as_str(), e)),
            _ => None,
        })
    }
}

/// Bring every dependency's vendor entry up to date and save the lockfile.
///
/// Per-dependency failures are reported, not propagated, so one broken
/// source does not stop the others.
pub fn fetch_dependencies(
    project: &Project,
    deps: &DependencySet,
    options: FetchOptions,
) -> Result<FetchReport> {
    let vendor_root = project.vendor_root()?;
    let lock_path = project.lock_path();
    let mut lockfile = LockFile::load(&lock_path)?;

    let report = fetch_with_lock(&vendor_root, deps, options, &mut lockfile);

    lockfile.retain_names(deps.names());
    lockfile.save(&lock_path)?;
    Ok(report)
}

/// Fetch every dependency under `vendor_root`, reading pins from and
/// recording revisions into an already loaded `lockfile`.
///
/// Nothing here fails as a whole; the caller owns loading and saving the lock.
pub fn fetch_with_lock(
    vendor_root: &Path,
    deps: &DependencySet,
    options: FetchOptions,
    lockfile: &mut LockFile,
) -> FetchReport {
    let mut report = FetchReport::default();

    if !deps.is_empty() {
        println!("{} Checking {} dependencies...", "📦".blue(), deps.len());
    }

    for dep in deps {
        let path = dep.vendor_path(vendor_root);
        let outcome = match fetch_one(dep, &path, options, lockfile) {
            Ok(outcome) => outcome,
            Err(e) => {
                eprintln!("{} Failed to fetch {}: {:#}", "x".red(), dep.name, e);
                tracing::error!(dep = %dep.name, error = %e, "fetch failed");
                FetchOutcome::Failed(e)
            }
        };
        report.outcomes.push(ItemOutcome {
            name: dep.name.clone(),
            outcome,
        });
    }

    report
}

fn fetch_one(
    dep: &DependencyRecord,
    path: &Path,
    options: FetchOptions,
    lockfile: &mut LockFile,
) -> Result<FetchOutcome> {
    let name = dep.name.as_str();
    let Some(url) = dep.source.git_url() else {
        bail!("no git URL configured for '{}'", name);
    };

    let empty = fsutil::is_directory_empty(path)
        .with_context(|| format!("Failed to inspect {}", path.display()))?;

    let (repo, fresh) = if empty {
        (clone_repo(name, url, path)?, true)
    } else {
        match vcs::detect_vcs(path) {
            Detection::Detected(VcsType::Git) => {
                let repo = Repository::open(path)
                    .with_context(|| format!("Failed to open vendored dependency '{}'", name))?;
                if options.update {
                    fetch_origin(&repo, name)?;
                } else {
                    println!("   {} Using vendor: {}", "⚡".green(), name);
                }
                (repo, false)
            }
            Detection::Detected(other) => {
                println!(
                    "   {} Skipping {}: {} working copies are not fetched",
                    "!".yellow(),
                    name,
                    other
                );
                return Ok(FetchOutcome::Unsupported(other));
            }
            Detection::NotDetected => {
                println!("   {} Using vendored copy: {}", "📦".blue(), name);
                return Ok(FetchOutcome::KeptVendored);
            }
            Detection::Failed(e) => {
                return Err(e).with_context(|| format!("Failed to probe {}", path.display()));
            }
        }
    };

    if let Some(tag) = dep.source.tag() {
        ensure_tag(&repo, tag)?;
    }

    let locked_commit = locked_commit_for(lockfile, name, url, options.enforce_lock);
    if let Some((oid, checkout_msg)) =
        select_checkout_target(&repo, &dep.source, locked_commit.as_deref())
    {
        checkout_repo_target(&repo, oid, &checkout_msg)?;
    } else {
        if dep.source.is_pinned() {
            println!(
                "   {} Pin for {} not found, staying on current HEAD",
                "!".yellow(),
                name
            );
        }
        if options.update && !fresh {
            fast_forward_to_upstream(&repo)?;
        }
    }

    let rev = refresh_lockfile_entry(&repo, lockfile, name, url);
    if fresh {
        Ok(FetchOutcome::Cloned { rev })
    } else {
        Ok(FetchOutcome::Refreshed { rev })
    }
}

fn clone_repo(name: &str, url: &str, path: &Path) -> Result<Repository> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⣾⣽⣻⢿⡿⣟⣯⣷"),
    );
    pb.set_message(format!("Downloading {}...", name));
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    match Repository::clone(url, path) {
        Ok(repo) => {
            pb.finish_with_message(format!("{} Downloaded {}", "✓".green(), name));
            Ok(repo)
        }
        Err(err) => {
            pb.finish_with_message(format!("{} Failed {}", "x".red(), name));
            Err(anyhow::anyhow!(
                "Failed to clone dependency '{}': {}",
                name,
                err
            ))
        }
    }
}

fn fetch_origin(repo: &Repository, name: &str) -> Result<()> {
    println!("   {} Updating {}", "⚡".yellow(), name);
    let mut remote = repo
        .find_remote("origin")
        .with_context(|| format!("'{}' has no origin remote", name))?;
    remote
        .fetch(
            &[
                "+refs/heads/*:refs/remotes/origin/*",
                "+refs/tags/*:refs/tags/*",
            ],
            None,
            None,
        )
        .with_context(|| format!("Failed to fetch origin for '{}'", name))?;
    Ok(())
}

/// Tags are only auto-followed on clone; fetch them explicitly when a pinned
/// one is missing.
fn ensure_tag(repo: &Repository, tag: &str) -> Result<()> {
    if repo.find_reference(&format!("refs/tags/{}", tag)).is_ok() {
        return Ok(());
    }
    if let Ok(mut remote) = repo.find_remote("origin") {
        remote.fetch(&["+refs/tags/*:refs/tags/*"], None, None)?;
    }
    Ok(())
}

/// Move the checked-out branch to its `origin/` counterpart.
fn fast_forward_to_upstream(repo: &Repository) -> Result<()> {
    let head = repo.head()?;
    if !head.is_branch() {
        return Ok(());
    }
    let (Some(refname), Some(branch)) = (head.name(), head.shorthand()) else {
        return Ok(());
    };
    let Some(target) = find_remote_branch_commit(repo, branch) else {
        return Ok(());
    };
    if head.target() == Some(target) {
        return Ok(());
    }

    let refname = refname.to_string();
    let commit = repo.find_commit(target)?;
    let mut checkout_opts = git2::build::CheckoutBuilder::new();
    checkout_opts.force();
    repo.checkout_tree(commit.as_object(), Some(&mut checkout_opts))?;
    repo.reference(&refname, target, true, "vendr: fast-forward to upstream")?;
    repo.set_head(&refname)?;
    println!("   {} Moved {} to {}", "📌".blue(), branch, short_hash(&target.to_string()));
    Ok(())
}

fn locked_commit_for(
    lockfile: &LockFile,
    name: &str,
    url: &str,
    enforce_lock: bool,
) -> Option<String> {
    if !enforce_lock {
        return None;
    }
    lockfile
        .get(name)
        .filter(|entry| entry.git == url)
        .map(|entry| entry.rev.clone())
}

fn select_checkout_target(
    repo: &Repository,
    dep: &Dependency,
    locked_commit: Option<&str>,
) -> Option<(git2::Oid, String)> {
    if let Some(rev) = dep.rev()
        && let Ok(oid) = git2::Oid::from_str(rev)
        && repo.find_object(oid, None).is_ok()
    {
        return Some((oid, format!("commit {}", short_hash(rev))));
    }

    if let Some(tag) = dep.tag() {
        let refname = format!("refs/tags/{}", tag);
        if let Ok(reference) = repo.find_reference(&refname)
            && let Ok(commit) = reference.peel_to_commit()
        {
            return Some((commit.id(), format!("tag {}", tag)));
        }
    }

    if let Some(branch) = dep.branch() {
        if let Some(oid) = find_remote_branch_commit(repo, branch) {
            return Some((oid, format!("branch {}", branch)));
        }
        if let Ok(reference) = repo.find_branch(branch, git2::BranchType::Local)
            && let Ok(commit) = reference.get().peel_to_commit()
        {
            return Some((commit.id(), format!("branch {}", branch)));
        }
    }

    if let Some(rev) = locked_commit
        && let Ok(oid) = git2::Oid::from_str(rev)
        && repo.find_object(oid, None).is_ok()
    {
        return Some((oid, format!("locked {}", short_hash(rev))));
    }

    None
}

fn find_remote_branch_commit(repo: &Repository, branch: &str) -> Option<git2::Oid> {
    let remote_ref = format!("origin/{}", branch);
    let reference = repo
        .find_branch(&remote_ref, git2::BranchType::Remote)
        .ok()?;
    let commit = reference.get().peel_to_commit().ok()?;
    Some(commit.id())
}

fn short_hash(rev: &str) -> &str {
    if rev.len() > 7 { &rev[..7] } else { rev }
}

fn checkout_repo_target(repo: &Repository, oid: git2::Oid, checkout_msg: &str) -> Result<()> {
    // Check out before moving HEAD so files absent from the target are removed
    let obj = repo.find_object(oid, None)?;
    let mut checkout_opts = git2::build::CheckoutBuilder::new();
    checkout_opts.force();
    repo.checkout_tree(&obj, Some(&mut checkout_opts))
        .with_context(|| format!("Failed to checkout {}", checkout_msg))?;
    repo.set_head_detached(oid)?;
    println!("   {} Locked to {}", "📌".blue(), checkout_msg);
    Ok(())
}

fn refresh_lockfile_entry(
    repo: &Repository,
    lockfile: &mut LockFile,
    name: &str,
    url: &str,
) -> Option<String> {
    let head = repo.head().ok()?;
    let commit = head.peel_to_commit().ok()?;
    let rev = commit.id().to_string();
    lockfile.insert(name.to_string(), url.to_string(), rev.clone());
    Some(rev)
}
