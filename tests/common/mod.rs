// Shared test fixtures for integration tests
// Functions here are used across different test files
#![allow(dead_code)]

use git2::{Oid, Repository, Signature};
use reposurvey::config::{Options, RefSelection};
use reposurvey::report::SurveyReport;
use reposurvey::survey::Surveyor;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Create a temporary git repository
pub fn create_test_repo() -> (TempDir, PathBuf, Repository) {
    let dir = TempDir::new().unwrap();
    let repo_path = dir.path().to_path_buf();
    let repo = Repository::init(&repo_path).unwrap();

    // Configure git user for commits
    let mut config = repo.config().unwrap();
    config.set_str("user.name", "Test User").unwrap();
    config.set_str("user.email", "test@example.com").unwrap();

    (dir, repo_path, repo)
}

fn signature() -> Signature<'static> {
    Signature::now("Test User", "test@example.com").unwrap()
}

/// Add files to the repository and create a commit on HEAD
pub fn add_commit(repo: &Repository, files: &[(&str, &[u8])], message: &str) -> Oid {
    let sig = signature();

    let mut index = repo.index().unwrap();

    for (path, content) in files {
        let full_path = repo.workdir().unwrap().join(path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&full_path, content).unwrap();

        index.add_path(Path::new(path)).unwrap();
    }

    index.write().unwrap();
    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();

    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());

    match parent {
        Some(parent) => repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &[&parent])
            .unwrap(),
        None => repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &[])
            .unwrap(),
    }
}

/// Create a commit with an empty tree and no files
pub fn empty_commit(repo: &Repository, message: &str) -> Oid {
    let sig = signature();
    let tree_id = repo.index().unwrap().write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();
    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());

    match parent {
        Some(parent) => repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &[&parent])
            .unwrap(),
        None => repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &[])
            .unwrap(),
    }
}

/// Merge the given commits into a single commit with many parents,
/// advancing HEAD
pub fn merge_commit(repo: &Repository, parents: &[Oid], message: &str) -> Oid {
    let sig = signature();
    let parent_commits: Vec<git2::Commit> = parents
        .iter()
        .map(|oid| repo.find_commit(*oid).unwrap())
        .collect();
    let parent_refs: Vec<&git2::Commit> = parent_commits.iter().collect();
    let tree = parent_commits[0].tree().unwrap();

    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)
        .unwrap()
}

/// Create a branch at the given commit without switching to it
pub fn branch_at(repo: &Repository, name: &str, target: Oid) {
    let commit = repo.find_commit(target).unwrap();
    repo.branch(name, &commit, false).unwrap();
}

/// Create a lightweight tag
pub fn lightweight_tag(repo: &Repository, name: &str, target: Oid) {
    let object = repo.find_object(target, None).unwrap();
    repo.tag_lightweight(name, &object, false).unwrap();
}

/// Create an annotated tag
pub fn annotated_tag(repo: &Repository, name: &str, target: Oid) -> Oid {
    let sig = signature();
    let object = repo.find_object(target, None).unwrap();
    repo.tag(name, &object, &sig, &format!("tag {}", name), false)
        .unwrap()
}

/// Detach HEAD at the given commit
pub fn detach_head(repo: &Repository, target: Oid) {
    repo.set_head_detached(target).unwrap()
}

/// Engine options suitable for hermetic tests: no progress, no
/// name-rev subprocess
pub fn test_options() -> Options {
    Options {
        name_rev: false,
        ..Options::default()
    }
}

/// Run the survey engine over the repository at `path`
pub fn run_survey(path: &Path, opts: Options) -> SurveyReport {
    let repo = gix::open(path).unwrap();
    Surveyor::new(opts).run(&repo).unwrap()
}

/// Run with defaults (branches, tags, remotes)
pub fn run_survey_default(path: &Path) -> SurveyReport {
    run_survey(path, test_options())
}

/// Run with `--all-refs` semantics
pub fn run_survey_all_refs(path: &Path) -> SurveyReport {
    let selection = RefSelection {
        all: Some(true),
        ..RefSelection::default()
    };
    run_survey(
        path,
        Options {
            refs: selection.resolve(),
            ..test_options()
        },
    )
}
