//! Survey statistics record
//!
//! The single output container the walk phases accumulate into. Created
//! once at engine start, mutated during the survey phases, then handed
//! to the report layer read-only.
//!
//! # Architecture
//!
//! - **hist**: log-scale histogram bucketing
//! - **large**: bounded largest-n item vectors
//! - this module: per-class stats and the accumulation entry points

pub mod hist;
pub mod large;

use std::collections::BTreeMap;

use gix::bstr::BStr;
use gix::object::Kind;
use gix::ObjectId;

use hist::{hbin, qbin, SizeBin, HBIN_LEN, PBIN_LEN, QBIN_LEN};
use large::{DimensionLabels, LargeItemVec};

/// Where the object store found an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Whence {
    Cached,
    Loose,
    Packed,
    DbCached,
}

/// Result of probing one object: its logical size, its on-disk
/// footprint, and where it was stored. A missing object (supported in
/// partial clones) has no metadata at all.
#[derive(Debug, Clone, Copy)]
pub struct ObjectMeta {
    pub size: u64,
    pub disk_size: u64,
    pub whence: Whence,
}

/// Per-dimension capacities for the largest-n vectors. Zero disables a
/// dimension.
#[derive(Debug, Clone, Copy)]
pub struct LargeVecCaps {
    pub commit_parents: usize,
    pub commit_sizes: usize,
    pub tree_entries: usize,
    pub tree_sizes: usize,
    pub blob_sizes: usize,
}

/// Counts and size sums common to every object class.
#[derive(Debug, Default)]
pub struct BaseStats {
    pub seen: u32,
    /// Objects the store could not produce (partial clone).
    pub missing: u32,

    pub cached: u32,
    pub loose: u32,
    pub packed: u32,
    pub dbcached: u32,

    pub sum_size: u64,
    pub sum_disk_size: u64,

    /// Object count/size grouped by logical size, base-16 buckets.
    pub size_hbin: [SizeBin; HBIN_LEN],
}

impl BaseStats {
    /// Fold one probed object in. Missing objects only bump `seen` and
    /// `missing`; they contribute nothing to sums or histograms.
    pub fn record(&mut self, meta: Option<&ObjectMeta>) {
        self.seen += 1;
        let Some(meta) = meta else {
            self.missing += 1;
            return;
        };

        match meta.whence {
            Whence::Cached => self.cached += 1,
            Whence::Loose => self.loose += 1,
            Whence::Packed => self.packed += 1,
            Whence::DbCached => self.dbcached += 1,
        }

        self.sum_size += meta.size;
        self.sum_disk_size += meta.disk_size;
        self.size_hbin[hbin(meta.size)].add(meta.size, meta.disk_size);
    }

    pub fn count_by_whence_total(&self) -> u32 {
        self.cached + self.loose + self.packed + self.dbcached
    }
}

/// Stats on the set of refs that were examined.
#[derive(Debug, Default)]
pub struct RefStats {
    pub total: u32,
    pub branches: u32,
    pub lightweight_tags: u32,
    pub annotated_tags: u32,
    pub remotes: u32,
    pub detached: u32,
    pub other: u32,

    pub symrefs: u32,

    pub packed: u32,
    pub loose: u32,

    /// Refname lengths hint at platform limits and at the size of a
    /// haves/wants exchange. Remote-tracking refs are kept apart from
    /// everything else.
    pub len_max_local_refname: usize,
    pub len_sum_local_refnames: usize,
    pub len_max_remote_refname: usize,
    pub len_sum_remote_refnames: usize,

    /// Ref count per class prefix, e.g. `refs/remotes/origin/` -> 17.
    /// Sorted so report output is deterministic.
    pub by_class: BTreeMap<String, u32>,
}

/// Stats for reachable commits.
#[derive(Debug)]
pub struct CommitStats {
    pub base: BaseStats,

    /// Count of commits with k parents; 16+ share the last bucket.
    pub parent_cnt_pbin: [u32; PBIN_LEN],

    pub largest_by_nr_parents: LargeItemVec,
    pub largest_by_size_bytes: LargeItemVec,
}

/// Stats for reachable trees.
#[derive(Debug)]
pub struct TreeStats {
    pub base: BaseStats,

    /// Sum of entry counts across all trees.
    pub sum_entries: u64,

    /// Tree count/size grouped by entry count, base-4 buckets. Wide
    /// trees show up here even when their byte size is unremarkable.
    pub entry_qbin: [SizeBin; QBIN_LEN],

    pub largest_by_nr_entries: LargeItemVec,
    pub largest_by_size_bytes: LargeItemVec,
}

/// Stats for reachable blobs.
#[derive(Debug)]
pub struct BlobStats {
    pub base: BaseStats,

    pub largest_by_size_bytes: LargeItemVec,
}

/// The aggregate statistics record.
#[derive(Debug)]
pub struct SurveyStats {
    pub refs: RefStats,
    pub commits: CommitStats,
    pub trees: TreeStats,
    pub blobs: BlobStats,
}

impl SurveyStats {
    pub fn new(caps: &LargeVecCaps) -> Self {
        Self {
            refs: RefStats::default(),
            commits: CommitStats {
                base: BaseStats::default(),
                parent_cnt_pbin: [0; PBIN_LEN],
                largest_by_nr_parents: LargeItemVec::new(
                    DimensionLabels {
                        json_dimension: "largest_commits_by_nr_parents",
                        json_item: "nr_parents",
                        pretty_dimension: "Largest Commits by Number of Parents",
                        pretty_item: "Parents",
                    },
                    Kind::Commit,
                    caps.commit_parents,
                ),
                largest_by_size_bytes: LargeItemVec::new(
                    DimensionLabels {
                        json_dimension: "largest_commits_by_size_bytes",
                        json_item: "size",
                        pretty_dimension: "Largest Commits by Size in Bytes",
                        pretty_item: "Size",
                    },
                    Kind::Commit,
                    caps.commit_sizes,
                ),
            },
            trees: TreeStats {
                base: BaseStats::default(),
                sum_entries: 0,
                entry_qbin: [SizeBin::default(); QBIN_LEN],
                largest_by_nr_entries: LargeItemVec::new(
                    DimensionLabels {
                        json_dimension: "largest_trees_by_nr_entries",
                        json_item: "nr_entries",
                        pretty_dimension: "Largest Trees by Number of Entries",
                        pretty_item: "Entries",
                    },
                    Kind::Tree,
                    caps.tree_entries,
                ),
                largest_by_size_bytes: LargeItemVec::new(
                    DimensionLabels {
                        json_dimension: "largest_trees_by_size_bytes",
                        json_item: "size",
                        pretty_dimension: "Largest Trees by Size in Bytes",
                        pretty_item: "Size",
                    },
                    Kind::Tree,
                    caps.tree_sizes,
                ),
            },
            blobs: BlobStats {
                base: BaseStats::default(),
                largest_by_size_bytes: LargeItemVec::new(
                    DimensionLabels {
                        json_dimension: "largest_blobs_by_size_bytes",
                        json_item: "size",
                        pretty_dimension: "Largest Blobs by Size in Bytes",
                        pretty_item: "Size",
                    },
                    Kind::Blob,
                    caps.blob_sizes,
                ),
            },
        }
    }

    /// Fold in one walked commit. The parent count comes from the walk
    /// itself, so the parent histogram and parents vector see every
    /// commit even when the object store cannot produce its bytes.
    pub fn record_commit(&mut self, oid: ObjectId, nr_parents: usize, meta: Option<&ObjectMeta>) {
        let c = &mut self.commits;
        c.base.record(meta);

        // The commit is its own containing commit, which keeps name-rev
        // enrichment uniform across all five dimensions.
        c.largest_by_nr_parents
            .offer(nr_parents as u64, oid, None, Some(oid));
        if let Some(meta) = meta {
            c.largest_by_size_bytes.offer(meta.size, oid, None, Some(oid));
        }

        c.parent_cnt_pbin[nr_parents.min(PBIN_LEN - 1)] += 1;
    }

    /// Fold in one walked tree. `nr_entries` is present iff the tree
    /// body could be read.
    pub fn record_tree(
        &mut self,
        oid: ObjectId,
        name: &BStr,
        meta: Option<&ObjectMeta>,
        nr_entries: Option<u64>,
        containing_commit: Option<ObjectId>,
    ) {
        let t = &mut self.trees;
        t.base.record(meta);

        let (Some(meta), Some(nr_entries)) = (meta, nr_entries) else {
            return;
        };

        t.sum_entries += nr_entries;
        t.largest_by_nr_entries
            .offer(nr_entries, oid, Some(name), containing_commit);
        t.largest_by_size_bytes
            .offer(meta.size, oid, Some(name), containing_commit);
        t.entry_qbin[qbin(nr_entries)].add(meta.size, meta.disk_size);
    }

    /// Fold in one walked blob.
    pub fn record_blob(
        &mut self,
        oid: ObjectId,
        name: &BStr,
        meta: Option<&ObjectMeta>,
        containing_commit: Option<ObjectId>,
    ) {
        let b = &mut self.blobs;
        b.base.record(meta);

        if let Some(meta) = meta {
            b.largest_by_size_bytes
                .offer(meta.size, oid, Some(name), containing_commit);
        }
    }

    /// All five largest-n vectors, in report order.
    pub fn large_vecs(&self) -> [&LargeItemVec; 5] {
        [
            &self.commits.largest_by_nr_parents,
            &self.commits.largest_by_size_bytes,
            &self.trees.largest_by_nr_entries,
            &self.trees.largest_by_size_bytes,
            &self.blobs.largest_by_size_bytes,
        ]
    }

    pub fn large_vecs_mut(&mut self) -> [&mut LargeItemVec; 5] {
        [
            &mut self.commits.largest_by_nr_parents,
            &mut self.commits.largest_by_size_bytes,
            &mut self.trees.largest_by_nr_entries,
            &mut self.trees.largest_by_size_bytes,
            &mut self.blobs.largest_by_size_bytes,
        ]
    }
}
