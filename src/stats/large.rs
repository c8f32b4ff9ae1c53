//! Bounded "largest n" item tracking
//!
//! Each scaling dimension (commit parents, commit size, tree entries,
//! tree size, blob size) keeps the n largest objects it has seen. n is
//! tiny (default 10), so a sorted vector with linear insertion beats a
//! binary heap and keeps the tie-break simple: earlier insertion wins.

use gix::bstr::{BStr, BString};
use gix::object::Kind;
use gix::ObjectId;

/// Labels used when rendering one dimension, JSON key and table caption.
#[derive(Debug, Clone, Copy)]
pub struct DimensionLabels {
    pub json_dimension: &'static str,
    pub json_item: &'static str,
    pub pretty_dimension: &'static str,
    pub pretty_item: &'static str,
}

/// One of the largest items observed for a dimension.
#[derive(Debug, Clone)]
pub struct LargeItem {
    pub magnitude: u64,
    pub oid: ObjectId,
    /// Pathname as reported by the treewalk; root trees get a
    /// synthesized `<commit>^{tree}` name. Unused for commits.
    pub name: Option<BString>,
    /// The commit whose treewalk first surfaced this object.
    pub containing_commit: Option<ObjectId>,
    /// Symbolic label for the containing commit, filled in after the
    /// walk by the name-rev enrichment pass.
    pub name_rev: Option<String>,
}

/// Fixed-capacity vector of the largest items, sorted by descending
/// magnitude. Capacity zero disables the dimension entirely.
#[derive(Debug)]
pub struct LargeItemVec {
    pub labels: DimensionLabels,
    kind: Kind,
    capacity: usize,
    items: Vec<LargeItem>,
}

impl LargeItemVec {
    pub fn new(labels: DimensionLabels, kind: Kind, capacity: usize) -> Self {
        Self {
            labels,
            kind,
            capacity,
            items: Vec::with_capacity(capacity),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.capacity > 0
    }

    pub fn items(&self) -> &[LargeItem] {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut [LargeItem] {
        &mut self.items
    }

    pub fn object_kind(&self) -> Kind {
        self.kind
    }

    /// Offer a candidate. Inserts it in descending-magnitude order if it
    /// ranks among the largest seen so far, evicting the current minimum
    /// when full. A candidate equal to the minimum of a full vector is
    /// rejected, and insertion lands after existing equal magnitudes, so
    /// earlier candidates always outrank later ones.
    pub fn offer(
        &mut self,
        magnitude: u64,
        oid: ObjectId,
        name: Option<&BStr>,
        containing_commit: Option<ObjectId>,
    ) {
        if self.capacity == 0 {
            return;
        }
        let full = self.items.len() == self.capacity;
        if full && magnitude <= self.items[self.capacity - 1].magnitude {
            return;
        }

        let pos = self
            .items
            .iter()
            .position(|it| it.magnitude < magnitude)
            .unwrap_or(self.items.len());
        if full {
            self.items.pop();
        }

        let name = match name {
            Some(n) if !n.is_empty() => Some(n.to_owned()),
            // Root trees arrive from the treewalk without a pathname.
            _ if self.kind == Kind::Tree => containing_commit
                .map(|commit| BString::from(format!("{}^{{tree}}", commit))),
            _ => None,
        };

        self.items.insert(
            pos,
            LargeItem {
                magnitude,
                oid,
                name,
                containing_commit,
                name_rev: None,
            },
        );
    }
}
