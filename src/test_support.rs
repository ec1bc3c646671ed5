//! Git fixtures shared by unit tests.

use git2::{Repository, Signature};
use std::fs;
use std::path::Path;

/// Write `file` into the working tree of `repo` and commit it on HEAD.
/// Returns the new commit id.
pub fn commit_file(repo: &Repository, file: &str, content: &str, message: &str) -> String {
    let workdir = repo.workdir().expect("non-bare repository");
    fs::write(workdir.join(file), content).unwrap();

    let mut index = repo.index().unwrap();
    index.add_path(Path::new(file)).unwrap();
    index.write().unwrap();
    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
    let sig = Signature::now("vendr", "vendr@example.com").unwrap();

    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&git2::Commit> = parent.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .unwrap()
        .to_string()
}

/// A fresh repository at `dir` with one commit. Returns its clone URL and
/// the commit id.
pub fn upstream_repo(dir: &Path) -> (String, String) {
    fs::create_dir_all(dir).unwrap();
    let repo = Repository::init(dir).unwrap();
    let head = commit_file(&repo, "README.md", "# upstream\n", "initial");
    (dir.display().to_string(), head)
}
