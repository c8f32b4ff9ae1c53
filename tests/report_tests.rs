// Report output integration tests
// Verifies the structured and tabular projections of the statistics
// record, and the cross-cutting invariants from the engine contract.

mod common;

use common::*;
use reposurvey::config::Options;
use reposurvey::report::{json, pretty};
use reposurvey::stats::BaseStats;

fn populated_repo() -> (tempfile::TempDir, std::path::PathBuf) {
    let (dir, repo_path, repo) = create_test_repo();
    add_commit(&repo, &[("a.txt", b"alpha".as_slice())], "c1");
    add_commit(
        &repo,
        &[("b.txt", b"beta".as_slice()), ("sub/c.txt", b"gamma".as_slice())],
        "c2",
    );
    let head = repo.head().unwrap().peel_to_commit().unwrap().id();
    lightweight_tag(&repo, "v1", head);
    (dir, repo_path)
}

fn assert_base_invariants(base: &BaseStats) {
    let hist_total: u32 = base.size_hbin.iter().map(|b| b.count).sum();
    assert_eq!(hist_total, base.seen - base.missing);
    assert_eq!(base.missing + base.count_by_whence_total(), base.seen);
}

#[test]
fn test_base_invariants_hold_for_all_classes() {
    let (_dir, repo_path) = populated_repo();
    let report = run_survey_default(&repo_path);

    assert_base_invariants(&report.stats.commits.base);
    assert_base_invariants(&report.stats.trees.base);
    assert_base_invariants(&report.stats.blobs.base);

    let pbin_total: u32 = report.stats.commits.parent_cnt_pbin.iter().sum();
    assert_eq!(pbin_total, report.stats.commits.base.seen);
}

#[test]
fn test_large_vectors_are_sorted_descending() {
    let (_dir, repo_path) = populated_repo();
    let report = run_survey_default(&repo_path);

    for vec in report.stats.large_vecs() {
        let mags: Vec<u64> = vec.items().iter().map(|it| it.magnitude).collect();
        let mut sorted = mags.clone();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        assert_eq!(mags, sorted);
    }
}

#[test]
fn test_json_sections_and_keys() {
    let (_dir, repo_path) = populated_repo();
    let report = run_survey_default(&repo_path);
    let value = json::render(&report);

    for section in ["refs", "commits", "trees", "blobs"] {
        assert!(value.get(section).is_some(), "missing section {section}");
    }

    let commits = &value["commits"];
    assert_eq!(
        commits["count"].as_u64().unwrap(),
        report.stats.commits.base.seen as u64
    );
    assert!(commits["count_by_nr_parents"]["P00"].as_u64().unwrap() >= 1);
    assert!(commits["dist_by_size"].is_object());
    assert!(commits["largest_commits_by_size_bytes"].is_array());

    let refs = &value["refs"];
    assert_eq!(
        refs["count"].as_u64().unwrap(),
        report.stats.refs.total as u64
    );
    assert_eq!(
        refs["requested"],
        serde_json::json!(["refs/heads/", "refs/tags/", "refs/remotes/"])
    );

    let trees = &value["trees"];
    assert!(trees["sum_entries"].as_u64().unwrap() > 0);
    assert!(trees["dist_by_nr_entries"].is_object());
}

#[test]
fn test_json_omits_zero_bins() {
    let (_dir, repo_path) = populated_repo();
    let report = run_survey_default(&repo_path);
    let value = json::render(&report);

    let dist = value["blobs"]["dist_by_size"].as_object().unwrap();
    for bin in dist.values() {
        assert!(bin["count"].as_u64().unwrap() > 0);
    }
}

#[test]
fn test_disabled_dimension_absent_from_json() {
    let (_dir, repo_path) = populated_repo();
    let opts = Options {
        show_blob_sizes: 0,
        ..test_options()
    };
    let report = run_survey(&repo_path, opts);
    let value = json::render(&report);

    assert!(value["blobs"].get("largest_blobs_by_size_bytes").is_none());
    assert!(value["commits"].get("largest_commits_by_size_bytes").is_some());
}

#[test]
fn test_runs_are_idempotent() {
    let (_dir, repo_path) = populated_repo();

    let first = json::render(&run_survey_default(&repo_path)).to_string();
    let second = json::render(&run_survey_default(&repo_path)).to_string();
    assert_eq!(first, second);
}

#[test]
fn test_pretty_report_sections() {
    let (_dir, repo_path) = populated_repo();
    let report = run_survey_default(&repo_path);

    let mut out = Vec::new();
    pretty::write_report(&report, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    for section in ["OVERVIEW", "REFS", "COMMITS", "TREES", "BLOBS"] {
        assert!(text.contains(section), "missing section {section}");
    }
    assert!(text.contains("Total Number of Refs"));
    assert!(text.contains("Histogram by Size in Bytes"));
    assert!(text.contains("Largest Blobs by Size in Bytes"));
}

#[test]
fn test_pretty_report_on_empty_repo() {
    let (_dir, repo_path, _repo) = create_test_repo();
    let report = run_survey_default(&repo_path);

    let mut out = Vec::new();
    pretty::write_report(&report, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    for section in ["OVERVIEW", "REFS", "COMMITS", "TREES", "BLOBS"] {
        assert!(text.contains(section), "missing section {section}");
    }
}

#[test]
fn test_tabular_numbers_derive_from_json() {
    let (_dir, repo_path) = populated_repo();
    let report = run_survey_default(&repo_path);
    let value = json::render(&report);

    let mut out = Vec::new();
    pretty::write_report(&report, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    // Spot-check that both sinks encode the same record.
    let blob_count = value["blobs"]["count"].as_u64().unwrap();
    let line = text
        .lines()
        .skip_while(|l| !l.contains("BLOBS"))
        .find(|l| l.contains("Total Count"))
        .unwrap();
    assert!(line.ends_with(&format!("{:>14}", blob_count)));
}
