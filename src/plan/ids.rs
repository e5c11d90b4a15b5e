use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Identifier of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlanId(pub u32);

impl fmt::Display for PlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PlanId({})", self.0)
    }
}

/// Identifier of a district within its plan, stable across versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DistrictId(pub u32);

impl DistrictId {
    /// The reserved pool of units not assigned to any district.
    pub const UNASSIGNED: DistrictId = DistrictId(0);

    #[inline] pub fn is_unassigned(self) -> bool { self == Self::UNASSIGNED }
}

impl fmt::Display for DistrictId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DistrictId({})", self.0)
    }
}

/// Identity of one district snapshot. Every snapshot gets a fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SnapshotId(u64);

static NEXT_SNAPSHOT: AtomicU64 = AtomicU64::new(1);

impl SnapshotId {
    pub(super) fn fresh() -> Self {
        SnapshotId(NEXT_SNAPSHOT.fetch_add(1, Ordering::Relaxed))
    }

    #[inline] pub fn get(self) -> u64 { self.0 }
}
