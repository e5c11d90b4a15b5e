use serde::{Deserialize, Serialize};

use crate::map::LevelId;

/// A granularity tier of the geo index (e.g. counties, tracts, blocks).
///
/// Levels are totally ordered by `rank`: lower ranks are coarser. Exactly one
/// level, the finest, is the base level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoLevel {
    pub id: LevelId,
    pub name: String,
    pub rank: u32,
}

impl GeoLevel {
    pub fn new(id: LevelId, name: impl Into<String>, rank: u32) -> Self {
        Self { id, name: name.into(), rank }
    }
}
