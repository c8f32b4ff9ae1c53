//! Per-object metadata probe
//!
//! Answers "how big is this object, on disk and decoded, and where does
//! it live" for every object the walk surfaces. On-disk sizes come from
//! an index built up front over all pack files plus a loose-object
//! fallback; logical sizes come from the object database itself.

use anyhow::Result;
use gix::hash::Kind as HashKind;
use gix::object::Kind;
use gix::prelude::Find;
use gix::ObjectId;
use gix_pack::{data, index};
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};

use crate::stats::{ObjectMeta, Whence};

/// Index of on-disk (compressed) sizes for every object in the
/// repository's pack files, with loose-object fallback.
pub struct DiskSizeIndex {
    /// Sizes from pack files (oid -> byte span inside the pack)
    packed: FxHashMap<ObjectId, u64>,
    /// Objects directory for loose object lookups
    objects_dir: PathBuf,
    hash_kind: HashKind,
}

impl DiskSizeIndex {
    /// Scan every `.idx`/`.pack` pair under the repository's objects
    /// directory.
    ///
    /// Uses the Repository to resolve the objects directory, which
    /// handles bare repos, worktrees, and repos where .git is a file.
    pub fn load(repo: &gix::Repository) -> Self {
        let objects_dir = repo.objects.store_ref().path().to_path_buf();
        let hash_kind = repo.object_hash();
        let packed = load_all_pack_sizes(&objects_dir, hash_kind);
        Self {
            packed,
            objects_dir,
            hash_kind,
        }
    }

    #[cfg(test)]
    pub fn empty() -> Self {
        Self {
            packed: FxHashMap::default(),
            objects_dir: PathBuf::new(),
            hash_kind: HashKind::Sha1,
        }
    }

    /// On-disk footprint and storage location for an object. Objects
    /// that are neither in a local pack nor loose (an alternate, or an
    /// in-memory source) report a zero footprint from the cache bucket.
    pub fn lookup(&self, oid: &ObjectId) -> (u64, Whence) {
        if let Some(&size) = self.packed.get(oid) {
            return (size, Whence::Packed);
        }
        if let Some(size) = loose_object_size(&self.objects_dir, oid) {
            return (size, Whence::Loose);
        }
        (0, Whence::Cached)
    }

    /// Number of objects covered by pack indexes.
    pub fn len(&self) -> usize {
        self.packed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packed.is_empty()
    }

    pub fn hash_kind(&self) -> HashKind {
        self.hash_kind
    }
}

/// Look up one object: decode it, verify the expected type, and attach
/// its disk footprint. Returns the metadata and the decoded bytes, or
/// `None` when the object is missing or of the wrong type (both are
/// expected under partial clones and count as missing).
pub fn probe_object<'a, S: Find>(
    odb: &S,
    disk: &DiskSizeIndex,
    oid: &ObjectId,
    expected: Kind,
    buf: &'a mut Vec<u8>,
) -> Option<(ObjectMeta, &'a [u8])> {
    let data = odb.try_find(oid, buf).ok().flatten()?;
    if data.kind != expected {
        return None;
    }
    let (disk_size, whence) = disk.lookup(oid);
    Some((
        ObjectMeta {
            size: data.data.len() as u64,
            disk_size,
            whence,
        },
        data.data,
    ))
}

/// The object's type, if the store can produce it at all.
pub fn object_kind<S: Find>(odb: &S, oid: &ObjectId, buf: &mut Vec<u8>) -> Option<Kind> {
    odb.try_find(oid, buf).ok().flatten().map(|data| data.kind)
}

/// On-disk sizes for all objects in one pack file. The idx records
/// offsets, not lengths, so entries are sorted by offset and each
/// object's size is the distance to its successor (or to the end of
/// the pack).
fn load_pack_sizes(
    idx_path: &Path,
    pack_path: &Path,
    hash_kind: HashKind,
) -> Result<FxHashMap<ObjectId, u64>> {
    let idx = index::File::at(idx_path, hash_kind)?;
    let pack = data::File::at(pack_path, hash_kind)?;

    let mut entries: Vec<_> = idx.iter().collect();
    entries.sort_by_key(|e| e.pack_offset);

    let pack_end = pack.pack_end() as u64;
    let mut sizes = FxHashMap::default();
    sizes.reserve(entries.len());

    for (i, entry) in entries.iter().enumerate() {
        let entry_end = entries
            .get(i + 1)
            .map(|next| next.pack_offset)
            .unwrap_or(pack_end);

        sizes.insert(entry.oid, entry_end - entry.pack_offset);
    }

    Ok(sizes)
}

/// Merge the size maps of every pack under `objects/pack/`.
fn load_all_pack_sizes(objects_dir: &Path, hash_kind: HashKind) -> FxHashMap<ObjectId, u64> {
    let mut all_sizes = FxHashMap::default();
    let pack_dir = objects_dir.join("pack");

    if let Ok(entries) = std::fs::read_dir(&pack_dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|e| e == "idx") {
                let pack_path = path.with_extension("pack");
                if pack_path.exists() {
                    match load_pack_sizes(&path, &pack_path, hash_kind) {
                        Ok(sizes) => {
                            all_sizes.extend(sizes);
                        }
                        Err(e) => {
                            eprintln!("Warning: Failed to read pack {:?}: {}", path, e);
                        }
                    }
                }
            }
        }
    }

    all_sizes
}

/// On-disk size of a loose object, by file length.
fn loose_object_size(objects_dir: &Path, oid: &ObjectId) -> Option<u64> {
    let hex = oid.to_hex().to_string();
    let path = objects_dir.join(&hex[..2]).join(&hex[2..]);
    std::fs::metadata(&path).ok().map(|m| m.len())
}
