// Ref discovery and classification integration tests

mod common;

use common::*;
use reposurvey::config::{Options, RefSelection};
use reposurvey::survey::progress::NoopProgress;
use reposurvey::survey::refs::{discover, RefKind};

fn wanted_all() -> reposurvey::config::RefsWanted {
    RefSelection {
        all: Some(true),
        ..RefSelection::default()
    }
    .resolve()
}

#[test]
fn test_discovery_classifies_kinds() {
    let (_dir, repo_path, repo) = create_test_repo();
    let head = add_commit(&repo, &[("a.txt", b"content")], "c1");
    branch_at(&repo, "feature", head);
    lightweight_tag(&repo, "v1", head);
    repo.reference(
        "refs/remotes/origin/main",
        head,
        false,
        "remote tracking",
    )
    .unwrap();
    repo.reference("refs/notes/commits", head, false, "notes").unwrap();

    let gix_repo = gix::open(&repo_path).unwrap();
    let records = discover(&gix_repo, &wanted_all(), &NoopProgress).unwrap();

    let kind_of = |name: &str| {
        records
            .iter()
            .find(|r| r.name == name)
            .map(|r| r.kind)
            .unwrap()
    };
    assert_eq!(kind_of("refs/heads/feature"), RefKind::Branch);
    assert_eq!(kind_of("refs/tags/v1"), RefKind::Tag);
    assert_eq!(kind_of("refs/remotes/origin/main"), RefKind::Remote);
    assert_eq!(kind_of("refs/notes/commits"), RefKind::Other);
    assert_eq!(kind_of("HEAD"), RefKind::AttachedHead);
}

#[test]
fn test_discovery_is_sorted_by_target_oid() {
    let (_dir, repo_path, repo) = create_test_repo();
    let c1 = add_commit(&repo, &[("a.txt", b"one")], "c1");
    let c2 = add_commit(&repo, &[("a.txt", b"two")], "c2");
    branch_at(&repo, "zzz", c1);
    branch_at(&repo, "aaa", c2);

    let gix_repo = gix::open(&repo_path).unwrap();
    let records = discover(&gix_repo, &wanted_all(), &NoopProgress).unwrap();

    let mut sorted = records.clone();
    sorted.sort_by(|a, b| a.target.cmp(&b.target).then_with(|| a.name.cmp(&b.name)));
    let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
    let sorted_names: Vec<&str> = sorted.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, sorted_names);
}

#[test]
fn test_annotated_tag_carries_peeled_target() {
    let (_dir, repo_path, repo) = create_test_repo();
    let head = add_commit(&repo, &[("a.txt", b"content")], "c1");
    annotated_tag(&repo, "release", head);

    let gix_repo = gix::open(&repo_path).unwrap();
    let records = discover(&gix_repo, &wanted_all(), &NoopProgress).unwrap();

    let tag = records
        .iter()
        .find(|r| r.name == "refs/tags/release")
        .unwrap();
    assert_eq!(tag.kind, RefKind::Tag);
    let peeled = tag.peeled.expect("annotated tag must peel");
    assert_eq!(peeled.to_string(), head.to_string());
    // The ref's own target is the tag object, not the commit.
    assert_ne!(tag.target.to_string(), head.to_string());
}

#[test]
fn test_lightweight_tag_has_no_peeled_target() {
    let (_dir, repo_path, repo) = create_test_repo();
    let head = add_commit(&repo, &[("a.txt", b"content")], "c1");
    lightweight_tag(&repo, "light", head);

    let gix_repo = gix::open(&repo_path).unwrap();
    let records = discover(&gix_repo, &wanted_all(), &NoopProgress).unwrap();

    let tag = records.iter().find(|r| r.name == "refs/tags/light").unwrap();
    assert!(tag.peeled.is_none());
    assert_eq!(tag.target.to_string(), head.to_string());
}

#[test]
fn test_fresh_repo_refs_are_loose() {
    let (_dir, repo_path, repo) = create_test_repo();
    let head = add_commit(&repo, &[("a.txt", b"content")], "c1");
    lightweight_tag(&repo, "v1", head);

    let report = run_survey_default(&repo_path);
    let refs = &report.stats.refs;

    // Nothing has run pack-refs in this repository.
    assert_eq!(refs.packed, 0);
    assert_eq!(refs.loose, refs.total);
}

#[test]
fn test_remote_refs_group_by_remote_in_class_map() {
    let (_dir, repo_path, repo) = create_test_repo();
    let head = add_commit(&repo, &[("a.txt", b"content")], "c1");
    repo.reference("refs/remotes/origin/main", head, false, "r1").unwrap();
    repo.reference("refs/remotes/origin/dev", head, false, "r2").unwrap();
    repo.reference("refs/remotes/upstream/main", head, false, "r3").unwrap();

    let report = run_survey_default(&repo_path);
    let by_class = &report.stats.refs.by_class;

    assert_eq!(by_class.get("refs/remotes/origin/"), Some(&2));
    assert_eq!(by_class.get("refs/remotes/upstream/"), Some(&1));
}

#[test]
fn test_refname_lengths_split_local_and_remote() {
    let (_dir, repo_path, repo) = create_test_repo();
    let head = add_commit(&repo, &[("a.txt", b"content")], "c1");
    repo.reference("refs/remotes/origin/main", head, false, "r1").unwrap();

    let report = run_survey_default(&repo_path);
    let refs = &report.stats.refs;

    assert_eq!(refs.len_sum_remote_refnames, "refs/remotes/origin/main".len());
    assert_eq!(refs.len_max_remote_refname, "refs/remotes/origin/main".len());
    // The branch created by the initial commit is local.
    assert!(refs.len_sum_local_refnames > 0);
    assert!(refs.len_max_local_refname >= "refs/heads/".len());
}

#[test]
fn test_other_refs_only_via_selection_or_all() {
    let (_dir, repo_path, repo) = create_test_repo();
    let head = add_commit(&repo, &[("a.txt", b"content")], "c1");
    repo.reference("refs/notes/commits", head, false, "notes").unwrap();

    // Default selection skips notes.
    let report = run_survey_default(&repo_path);
    assert_eq!(report.stats.refs.other, 0);

    let selection = RefSelection {
        other: Some(true),
        ..RefSelection::default()
    };
    let report = run_survey(
        &repo_path,
        Options {
            refs: selection.resolve(),
            ..test_options()
        },
    );
    assert_eq!(report.stats.refs.other, 1);
    assert_eq!(report.stats.refs.by_class.get("refs/notes/"), Some(&1));
}
