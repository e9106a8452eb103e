//! Containment query seam.
//!
//! The orchestrator depends on this trait rather than on [`BoundarySet`]
//! directly, so alternative indexes (or instrumented wrappers) can be
//! injected.

use crate::boundary_set::BoundarySet;
use crate::error::Result;
use std::sync::Arc;
use watershed_core::{Coordinate, NameTable, WatershedRecord};

/// Resolves a coordinate to its containing watershed.
///
/// Implementations must be pure: no I/O, no mutation visible to callers.
pub trait ContainmentQuery: Send + Sync {
    /// The containing record, or `None` outside every polygon.
    fn locate(&self, coordinate: Coordinate) -> Result<Option<&WatershedRecord>>;

    /// Name-by-code table used to label ancestor levels.
    fn names(&self) -> &NameTable;
}

impl ContainmentQuery for BoundarySet {
    fn locate(&self, coordinate: Coordinate) -> Result<Option<&WatershedRecord>> {
        self.containing(coordinate)
    }

    fn names(&self) -> &NameTable {
        BoundarySet::names(self)
    }
}

impl<T: ContainmentQuery + ?Sized> ContainmentQuery for Arc<T> {
    fn locate(&self, coordinate: Coordinate) -> Result<Option<&WatershedRecord>> {
        (**self).locate(coordinate)
    }

    fn names(&self) -> &NameTable {
        (**self).names()
    }
}
