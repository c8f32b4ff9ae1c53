//! Name-rev enrichment
//!
//! After the walk, the containing-commit OIDs held by the largest-n
//! vectors are batched through `git name-rev` to get a human-readable
//! label for each. This is nice to have but not essential, so every
//! failure mode leaves the fields unset and the report falls back to
//! raw OIDs.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::{bail, Context, Result};
use gix::ObjectId;
use rustc_hash::{FxHashMap, FxHashSet};

use super::progress::ProgressReporter;
use crate::stats::SurveyStats;

/// Resolve symbolic names for every containing commit referenced by the
/// largest-n vectors. Returns whether the enrichment ran to completion;
/// failure is not an error.
pub fn enrich(stats: &mut SurveyStats, git_dir: &Path, progress: &dyn ProgressReporter) -> bool {
    let batch = collect_batch(stats);
    if batch.is_empty() {
        return true;
    }

    let pb = progress.start("Resolving name-revs", batch.len() as u64);
    let names = match run_name_rev(git_dir, &batch) {
        Ok(names) => names,
        Err(_) => {
            pb.finish();
            return false;
        }
    };

    // Truncated output resolves only the entries that did arrive.
    let resolved: FxHashMap<ObjectId, String> = batch
        .iter()
        .copied()
        .zip(names.into_iter())
        .collect();

    for vec in stats.large_vecs_mut() {
        for item in vec.items_mut() {
            let Some(commit) = item.containing_commit else {
                continue;
            };
            if let Some(name) = resolved.get(&commit) {
                item.name_rev = Some(name.clone());
                pb.inc(1);
            }
        }
    }
    pb.finish();
    true
}

/// Distinct containing-commit OIDs across all vectors, first-seen order
/// preserved so output lines can be matched back by position.
fn collect_batch(stats: &SurveyStats) -> Vec<ObjectId> {
    let mut seen = FxHashSet::default();
    let mut batch = Vec::new();
    for vec in stats.large_vecs() {
        for item in vec.items() {
            if let Some(commit) = item.containing_commit {
                if seen.insert(commit) {
                    batch.push(commit);
                }
            }
        }
    }
    batch
}

/// One `git name-rev` invocation: stdin is written in full before
/// stdout is read, so there is no streaming interleave to deadlock on.
fn run_name_rev(git_dir: &Path, batch: &[ObjectId]) -> Result<Vec<String>> {
    let mut child = Command::new("git")
        .arg("--git-dir")
        .arg(git_dir)
        .args(["name-rev", "--name-only", "--annotate-stdin"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .context("failed to spawn git name-rev")?;

    let mut input = String::with_capacity(batch.len() * 41);
    for oid in batch {
        input.push_str(&oid.to_string());
        input.push('\n');
    }

    {
        let mut stdin = child.stdin.take().context("no stdin pipe")?;
        stdin.write_all(input.as_bytes())?;
    }

    let output = child.wait_with_output()?;
    if !output.status.success() {
        bail!("git name-rev exited with {}", output.status);
    }

    let text = String::from_utf8_lossy(&output.stdout);
    Ok(text.lines().map(|line| line.to_string()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{LargeVecCaps, ObjectMeta, SurveyStats, Whence};

    fn oid(byte: u8) -> ObjectId {
        let hex = format!("{:02x}{}", byte, "0".repeat(38));
        ObjectId::from_hex(hex.as_bytes()).unwrap()
    }

    #[test]
    fn test_collect_batch_dedups_in_first_seen_order() {
        let caps = LargeVecCaps {
            commit_parents: 10,
            commit_sizes: 10,
            tree_entries: 10,
            tree_sizes: 10,
            blob_sizes: 10,
        };
        let mut stats = SurveyStats::new(&caps);
        let meta = ObjectMeta {
            size: 10,
            disk_size: 5,
            whence: Whence::Packed,
        };
        stats.record_commit(oid(1), 2, Some(&meta));
        stats.record_commit(oid(2), 1, Some(&meta));
        stats.record_blob(oid(3), b"f".into(), Some(&meta), Some(oid(1)));

        // Both commit heaps and the blob heap reference oid(1); it must
        // appear once, before oid(2)'s first appearance is irrelevant to
        // dedup correctness.
        let batch = collect_batch(&stats);
        assert_eq!(batch.iter().filter(|o| **o == oid(1)).count(), 1);
        assert!(batch.contains(&oid(2)));
    }
}
