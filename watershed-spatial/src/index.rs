//! R-tree over polygon envelopes.
//!
//! The tree holds one axis-aligned envelope per record, keyed by the record's
//! slot in the boundary set. It only prunes; exact containment is decided by
//! the caller.

use crate::geometry::BBox;
use rstar::{RTree, RTreeObject, AABB};

/// A record envelope in `[lon, lat]` space.
#[derive(Debug, Clone)]
pub struct IndexedEnvelope {
    /// Position of the record in the boundary set.
    pub slot: usize,
    envelope: AABB<[f64; 2]>,
}

impl IndexedEnvelope {
    pub fn new(slot: usize, bbox: &BBox) -> Self {
        Self {
            slot,
            envelope: AABB::from_corners([bbox.min_lng, bbox.min_lat], [bbox.max_lng, bbox.max_lat]),
        }
    }
}

impl RTreeObject for IndexedEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Bulk-loaded envelope index. Immutable after construction.
pub struct EnvelopeIndex {
    tree: RTree<IndexedEnvelope>,
}

impl std::fmt::Debug for EnvelopeIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvelopeIndex")
            .field("envelopes", &self.tree.size())
            .finish()
    }
}

impl EnvelopeIndex {
    pub fn bulk_load(envelopes: Vec<IndexedEnvelope>) -> Self {
        Self {
            tree: RTree::bulk_load(envelopes),
        }
    }

    /// Slots whose envelope contains the point (edges inclusive), in
    /// ascending slot order.
    pub fn candidates_at(&self, lon: f64, lat: f64) -> Vec<usize> {
        let point_box = AABB::from_point([lon, lat]);
        let mut slots: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&point_box)
            .map(|e| e.slot)
            .collect();
        slots.sort_unstable();
        slots
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}
