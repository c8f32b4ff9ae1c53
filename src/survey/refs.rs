//! Ref discovery and classification
//!
//! Enumerates the refs the user selected, classifies each by refname,
//! detects annotated tags by peeling, and notes how each ref is stored.
//! The resulting array, sorted by target OID, seeds the object walk and
//! feeds the ref statistics.

use anyhow::{Context, Result};
use gix::object::Kind;
use gix::objs::TagRefIter;
use gix::prelude::Find;
use gix::ObjectId;
use rustc_hash::FxHashSet;

use super::progress::ProgressReporter;
use crate::config::RefsWanted;
use crate::stats::RefStats;

/// Symref chains longer than this are abandoned as unresolvable.
const MAX_SYMREF_DEPTH: usize = 5;

/// Classification of a ref, derived from its refname. `AttachedHead` is
/// the symbolic `HEAD` pointing at a branch: it counts toward the total
/// and the symref counter but belongs to no class of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    Branch,
    Tag,
    Remote,
    DetachedHead,
    AttachedHead,
    Other,
}

/// One discovered ref.
#[derive(Debug, Clone)]
pub struct RefRecord {
    pub name: String,
    /// Resolved target, symref chains followed.
    pub target: ObjectId,
    pub kind: RefKind,
    /// For annotated tags, the terminal object of the tag chain.
    pub peeled: Option<ObjectId>,
    pub is_symbolic: bool,
    pub is_packed: bool,
}

impl RefRecord {
    /// The class-prefix bucket this ref aggregates under: remotes group
    /// per remote, everything else per top-level namespace, HEAD by its
    /// own name.
    pub fn class_prefix(&self) -> String {
        match self.kind {
            RefKind::Branch => "refs/heads/".to_string(),
            RefKind::Tag => "refs/tags/".to_string(),
            RefKind::Remote => leading_components(&self.name, 3),
            RefKind::Other => leading_components(&self.name, 2),
            RefKind::DetachedHead | RefKind::AttachedHead => self.name.clone(),
        }
    }
}

/// The patterns handed to the ref store, in the form they are echoed in
/// the report.
pub fn requested_patterns(wanted: &RefsWanted) -> Vec<String> {
    let mut patterns = Vec::new();
    if wanted.detached {
        patterns.push("HEAD".to_string());
    }
    if wanted.all {
        patterns.push("refs/".to_string());
    } else {
        if wanted.branches {
            patterns.push("refs/heads/".to_string());
        }
        if wanted.tags {
            patterns.push("refs/tags/".to_string());
        }
        if wanted.remotes {
            patterns.push("refs/remotes/".to_string());
        }
        if wanted.other {
            patterns.push("refs/notes/".to_string());
            patterns.push("refs/stash/".to_string());
        }
    }
    patterns
}

/// Enumerate and classify all selected refs, sorted by (target OID,
/// refname) so downstream phases see a reproducible order.
pub fn discover(
    repo: &gix::Repository,
    wanted: &RefsWanted,
    progress: &dyn ProgressReporter,
) -> Result<Vec<RefRecord>> {
    let pb = progress.start_counter("Scanning refs");
    let odb = repo.objects.clone();
    let mut buf = Vec::new();
    let mut records = Vec::new();

    let platform = repo.references().context("failed to open ref database")?;
    for pattern in requested_patterns(wanted) {
        if pattern == "HEAD" {
            continue;
        }
        let prefix = pattern.trim_end_matches('/');
        let iter = platform
            .prefixed(prefix)
            .with_context(|| format!("invalid ref pattern: {pattern}"))?;
        for reference in iter.filter_map(|r| r.ok()) {
            if let Some(record) = classify_ref(repo, &odb, &mut buf, &reference) {
                pb.inc(1);
                records.push(record);
            }
        }
    }

    if wanted.detached {
        if let Some(record) = head_record(repo) {
            pb.inc(1);
            records.push(record);
        }
    }

    records.sort_by(|a, b| a.target.cmp(&b.target).then_with(|| a.name.cmp(&b.name)));
    pb.finish();
    Ok(records)
}

/// Seed OIDs for the object walk: annotated tags contribute their
/// peeled target, everything else its direct target. Duplicates are
/// dropped, first occurrence wins.
pub fn walk_seeds(records: &[RefRecord]) -> Vec<ObjectId> {
    let mut seen = FxHashSet::default();
    records
        .iter()
        .map(|r| r.peeled.unwrap_or(r.target))
        .filter(|id| seen.insert(*id))
        .collect()
}

/// Accumulate ref statistics over the classified array.
pub fn calc_ref_stats(
    records: &[RefRecord],
    stats: &mut RefStats,
    progress: &dyn ProgressReporter,
) {
    let pb = progress.start("Calculating ref stats", records.len() as u64);
    for r in records {
        stats.total += 1;

        match r.kind {
            RefKind::Branch => stats.branches += 1,
            RefKind::Tag => {
                if r.peeled.is_some() {
                    stats.annotated_tags += 1;
                } else {
                    stats.lightweight_tags += 1;
                }
            }
            RefKind::Remote => stats.remotes += 1,
            RefKind::DetachedHead => stats.detached += 1,
            RefKind::Other => stats.other += 1,
            RefKind::AttachedHead => {}
        }

        *stats.by_class.entry(r.class_prefix()).or_insert(0) += 1;

        // Symrefs cut across the classification (detached "HEAD" vs
        // "refs/remotes/origin/HEAD"), so the class counts above
        // already include them.
        if r.is_symbolic {
            stats.symrefs += 1;
        }

        if r.is_packed {
            stats.packed += 1;
        } else {
            stats.loose += 1;
        }

        let len = r.name.len();
        if r.kind == RefKind::Remote {
            stats.len_sum_remote_refnames += len;
            stats.len_max_remote_refname = stats.len_max_remote_refname.max(len);
        } else {
            stats.len_sum_local_refnames += len;
            stats.len_max_local_refname = stats.len_max_local_refname.max(len);
        }

        pb.inc(1);
    }
    pb.finish();
}

fn classify_ref(
    repo: &gix::Repository,
    odb: &impl Find,
    buf: &mut Vec<u8>,
    reference: &gix::Reference<'_>,
) -> Option<RefRecord> {
    let name = reference.name().as_bstr().to_string();
    let is_symbolic = reference.target().try_id().is_none();
    let target = resolve_target(reference)?;
    let kind = classify_name(&name);
    let peeled = match kind {
        RefKind::Tag => peel_annotated(odb, target, buf),
        _ => None,
    };
    let is_packed = !loose_ref_exists(repo, &name);

    Some(RefRecord {
        name,
        target,
        kind,
        peeled,
        is_symbolic,
        is_packed,
    })
}

fn classify_name(name: &str) -> RefKind {
    if name.starts_with("refs/heads/") {
        RefKind::Branch
    } else if name.starts_with("refs/tags/") {
        RefKind::Tag
    } else if name.starts_with("refs/remotes/") {
        RefKind::Remote
    } else {
        // notes, stashes, and custom namespaces like refs/prefetch/
        RefKind::Other
    }
}

fn resolve_target(reference: &gix::Reference<'_>) -> Option<ObjectId> {
    if let Some(id) = reference.target().try_id() {
        return Some(id.to_owned());
    }
    let mut current = reference.follow()?.ok()?;
    for _ in 0..MAX_SYMREF_DEPTH {
        if let Some(id) = current.target().try_id() {
            return Some(id.to_owned());
        }
        current = current.follow()?.ok()?;
    }
    None
}

/// Follow a tag chain. Returns the terminal object when `id` names a
/// tag object, `None` when the target is no tag (a lightweight tag) or
/// cannot be read.
fn peel_annotated(odb: &impl Find, id: ObjectId, buf: &mut Vec<u8>) -> Option<ObjectId> {
    let mut current = id;
    let mut peeled = None;
    loop {
        let data = odb.try_find(&current, buf).ok().flatten()?;
        if data.kind != Kind::Tag {
            break;
        }
        let next = TagRefIter::from_bytes(data.data).target_id().ok()?;
        peeled = Some(next);
        current = next;
    }
    peeled
}

fn head_record(repo: &gix::Repository) -> Option<RefRecord> {
    let head = repo.head().ok()?;
    if head.is_detached() {
        let target = head.id()?.detach();
        Some(RefRecord {
            name: "HEAD".to_string(),
            target,
            kind: RefKind::DetachedHead,
            peeled: None,
            is_symbolic: false,
            is_packed: false,
        })
    } else {
        // Attached (symbolic) HEAD; skipped entirely on unborn branches.
        let target = repo.head_id().ok()?.detach();
        Some(RefRecord {
            name: "HEAD".to_string(),
            target,
            kind: RefKind::AttachedHead,
            peeled: None,
            is_symbolic: true,
            is_packed: false,
        })
    }
}

fn loose_ref_exists(repo: &gix::Repository, name: &str) -> bool {
    repo.common_dir().join(name).is_file()
}

/// Keep the refname through its n-th path separator; names with fewer
/// components are kept whole.
fn leading_components(name: &str, n: usize) -> String {
    let mut slashes = 0;
    for (i, b) in name.bytes().enumerate() {
        if b == b'/' {
            slashes += 1;
            if slashes == n {
                return name[..=i].to_string();
            }
        }
    }
    name.to_string()
}
