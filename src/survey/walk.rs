//! Reachable-object walker
//!
//! Visits every commit reachable from the seed set, and inside each
//! commit's frame every tree and blob that commit introduces. Global
//! seen-sets guarantee each object is reported exactly once, which also
//! means the commit that first reaches an object in walk order is the
//! one recorded as containing it.

use gix::bstr::ByteSlice;
use gix::object::Kind;
use gix::objs::{CommitRefIter, TreeRefIter};
use gix::prelude::Find;
use gix::ObjectId;
use rustc_hash::FxHashSet;

use super::probe::{probe_object, DiskSizeIndex};
use super::progress::ProgressHandle;
use crate::stats::SurveyStats;

/// Buffer pool for reusing decode buffers across tree recursion
#[derive(Default)]
pub struct BufferPool {
    buffers: Vec<Vec<u8>>,
}

impl BufferPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a buffer from the pool (or allocate a new one)
    pub fn take(&mut self) -> Vec<u8> {
        self.buffers
            .pop()
            .unwrap_or_else(|| Vec::with_capacity(8 * 1024))
    }

    /// Return a buffer to the pool
    pub fn give(&mut self, mut buf: Vec<u8>) {
        buf.clear();
        self.buffers.push(buf);
    }
}

/// Walk state: the object database, the disk-size index, the stats
/// record being filled, and the seen-sets that enforce at-most-once
/// visits.
pub struct ObjectWalker<'a, S: Find> {
    odb: &'a S,
    disk: &'a DiskSizeIndex,
    stats: &'a mut SurveyStats,

    buf_pool: BufferPool,
    seen_trees: FxHashSet<ObjectId>,
    seen_blobs: FxHashSet<ObjectId>,

    /// The commit whose frame the treewalk is currently inside. Set on
    /// commit entry, cleared when the walk finishes.
    current_commit: Option<ObjectId>,

    visited: u64,
    progress: Box<dyn ProgressHandle>,
}

impl<'a, S: Find> ObjectWalker<'a, S> {
    pub fn new(
        odb: &'a S,
        disk: &'a DiskSizeIndex,
        stats: &'a mut SurveyStats,
        progress: Box<dyn ProgressHandle>,
    ) -> Self {
        Self {
            odb,
            disk,
            stats,
            buf_pool: BufferPool::new(),
            seen_trees: FxHashSet::default(),
            seen_blobs: FxHashSet::default(),
            current_commit: None,
            visited: 0,
            progress,
        }
    }

    /// Visit one commit and everything its tree introduces. The parent
    /// count comes from the revision walk, not from re-parsing.
    pub fn visit_commit(&mut self, oid: ObjectId, nr_parents: usize) {
        self.current_commit = Some(oid);
        self.tick();

        let mut buf = self.buf_pool.take();
        let root_tree = match probe_object(self.odb, self.disk, &oid, Kind::Commit, &mut buf) {
            Some((meta, data)) => {
                let tree_id = CommitRefIter::from_bytes(data).tree_id().ok();
                self.stats.record_commit(oid, nr_parents, Some(&meta));
                tree_id
            }
            None => {
                self.stats.record_commit(oid, nr_parents, None);
                None
            }
        };
        self.buf_pool.give(buf);

        if let Some(tree_id) = root_tree {
            let mut path = Vec::with_capacity(256);
            self.walk_tree(tree_id, &mut path);
        }
    }

    /// Visit a non-commit object that a ref points at directly (an
    /// annotated tag peeling to a tree or blob). There is no containing
    /// commit in that case.
    pub fn visit_detached_object(&mut self, oid: ObjectId, kind: Kind) {
        self.current_commit = None;
        match kind {
            Kind::Tree => {
                let mut path = Vec::new();
                self.walk_tree(oid, &mut path);
            }
            Kind::Blob => self.visit_blob(oid, b""),
            Kind::Commit | Kind::Tag => {}
        }
    }

    /// Recursive treewalk, depth-first, path maintained in place.
    fn walk_tree(&mut self, oid: ObjectId, path: &mut Vec<u8>) {
        if !self.seen_trees.insert(oid) {
            return;
        }
        self.tick();

        let mut buf = self.buf_pool.take();
        match probe_object(self.odb, self.disk, &oid, Kind::Tree, &mut buf) {
            None => {
                self.stats
                    .record_tree(oid, path.as_bstr(), None, None, self.current_commit);
            }
            Some((meta, data)) => {
                let nr_entries =
                    TreeRefIter::from_bytes(data).filter_map(Result::ok).count() as u64;
                self.stats.record_tree(
                    oid,
                    path.as_bstr(),
                    Some(&meta),
                    Some(nr_entries),
                    self.current_commit,
                );

                let base_len = path.len();
                for entry in TreeRefIter::from_bytes(data).filter_map(Result::ok) {
                    if !path.is_empty() {
                        path.push(b'/');
                    }
                    path.extend_from_slice(entry.filename);

                    let entry_oid = entry.oid.to_owned();
                    if entry.mode.is_tree() {
                        self.walk_tree(entry_oid, path);
                    } else if entry.mode.is_blob() || entry.mode.is_link() {
                        self.visit_blob(entry_oid, path);
                    }
                    // Submodule (gitlink) entries point outside this
                    // repository and are skipped.

                    path.truncate(base_len);
                }
            }
        }
        self.buf_pool.give(buf);
    }

    fn visit_blob(&mut self, oid: ObjectId, path: &[u8]) {
        if !self.seen_blobs.insert(oid) {
            return;
        }
        self.tick();

        let mut buf = self.buf_pool.take();
        let meta = probe_object(self.odb, self.disk, &oid, Kind::Blob, &mut buf)
            .map(|(meta, _)| meta);
        self.stats
            .record_blob(oid, path.as_bstr(), meta.as_ref(), self.current_commit);
        self.buf_pool.give(buf);
    }

    /// Clear the ambient commit and publish the final count.
    pub fn finish(mut self) -> u64 {
        self.current_commit = None;
        self.progress.finish();
        self.visited
    }

    fn tick(&mut self) {
        self.visited += 1;
        if self.visited % 1000 == 0 {
            self.progress.inc(1000);
        }
    }
}
