//! Hierarchy derivation.
//!
//! Ancestry is never stored: it is computed from the record's native code by
//! truncation, within that code's own scheme. Levels are ordered finest to
//! coarsest. A level whose name is missing from the name table is kept with
//! `name: None` so the level count always reflects the code.

use serde::Serialize;
use watershed_core::{
    CaCode, FwaCode, HucCode, HydroCode, NameTable, SdacCode, WatershedRecord,
};

/// One ancestor (or the record itself) in a hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HierarchyLevel {
    /// Level name within the scheme, e.g. `huc8` or `fwa_principal_drainage`.
    pub level: &'static str,
    /// Code at this level; always a prefix of the record's native code.
    pub code: String,
    pub name: Option<String>,
}

/// Ordered finest→coarsest lineage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct HierarchyResult {
    levels: Vec<HierarchyLevel>,
}

impl HierarchyResult {
    pub fn levels(&self) -> &[HierarchyLevel] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// The record's own level.
    pub fn finest(&self) -> Option<&HierarchyLevel> {
        self.levels.first()
    }

    /// Top-level drainage (HUC region, FWA principal drainage, SDAC MDA).
    pub fn coarsest(&self) -> Option<&HierarchyLevel> {
        self.levels.last()
    }

    /// Level by name, e.g. `huc8`.
    pub fn level(&self, level: &str) -> Option<&HierarchyLevel> {
        self.levels.iter().find(|l| l.level == level)
    }
}

fn huc_level_name(width: usize) -> &'static str {
    match width {
        12 => "huc12",
        10 => "huc10",
        8 => "huc8",
        6 => "huc6",
        4 => "huc4",
        _ => "huc2",
    }
}

fn sdac_level_name(width: usize) -> &'static str {
    match width {
        4 => "ssda",
        3 => "sda",
        _ => "mda",
    }
}

/// Computes hierarchies against a dataset's name table.
#[derive(Debug, Clone, Copy)]
pub struct HierarchyDeriver<'a> {
    names: &'a NameTable,
}

impl<'a> HierarchyDeriver<'a> {
    pub fn new(names: &'a NameTable) -> Self {
        Self { names }
    }

    pub fn derive(&self, record: &WatershedRecord) -> HierarchyResult {
        let mut levels = match record.code() {
            HydroCode::Us(huc) => self.huc_levels(huc),
            HydroCode::Ca(CaCode::Fwa(fwa)) => self.fwa_levels(fwa),
            HydroCode::Ca(CaCode::Sdac(sdac)) => self.sdac_levels(sdac),
        };
        // The finest level is the record itself.
        if let Some(first) = levels.first_mut() {
            if !record.name().trim().is_empty() {
                first.name = Some(record.name().to_string());
            }
        }
        HierarchyResult { levels }
    }

    fn level(&self, level: &'static str, code: &str) -> HierarchyLevel {
        HierarchyLevel {
            level,
            code: code.to_string(),
            name: self.names.get(code).map(str::to_string),
        }
    }

    fn huc_levels(&self, huc: &HucCode) -> Vec<HierarchyLevel> {
        watershed_core::HUC_LEVEL_WIDTHS
            .iter()
            .filter_map(|&w| huc.truncate(w).map(|code| self.level(huc_level_name(w), code)))
            .collect()
    }

    fn fwa_levels(&self, fwa: &FwaCode) -> Vec<HierarchyLevel> {
        let positions = fwa.tributary_positions();
        let mut levels = Vec::with_capacity(positions.len() + 1);

        // A code with no non-zero tributary segment is the principal
        // drainage itself.
        if let Some((_, earlier)) = positions.split_last() {
            levels.push(self.level("fwa_watershed", fwa.as_str()));
            for &index in earlier.iter().rev() {
                if let Some(code) = fwa.truncate_after(index) {
                    levels.push(self.level("fwa_tributary", code));
                }
            }
        }
        levels.push(self.level("fwa_principal_drainage", fwa.principal_drainage()));
        levels
    }

    fn sdac_levels(&self, sdac: &SdacCode) -> Vec<HierarchyLevel> {
        watershed_core::SDAC_LEVEL_WIDTHS
            .iter()
            .filter_map(|&w| sdac.truncate(w).map(|code| self.level(sdac_level_name(w), code)))
            .collect()
    }
}
