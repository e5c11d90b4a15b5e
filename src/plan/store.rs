use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Included};

use crate::plan::{District, DistrictId, PlanId};

/// Append-only store of every district snapshot of one plan, keyed by
/// `(district_id, version)`.
///
/// "Current" is a pure function of the stored snapshots and a version; there
/// is no mutable pointer to the latest snapshot.
#[derive(Debug, Clone)]
pub struct DistrictStore {
    plan: PlanId,
    snapshots: BTreeMap<(DistrictId, u32), District>,
}

impl DistrictStore {
    pub fn new(plan: PlanId) -> Self {
        Self { plan, snapshots: BTreeMap::new() }
    }

    #[inline] pub fn plan(&self) -> PlanId { self.plan }

    /// Get the number of stored snapshots, across all districts and versions.
    #[inline] pub fn len(&self) -> usize { self.snapshots.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.snapshots.is_empty() }

    /// Iterate over every stored snapshot, by district id then version.
    #[inline] pub fn snapshots(&self) -> impl Iterator<Item = &District> + '_ { self.snapshots.values() }

    /// Add a snapshot to the store. A snapshot already stored for the same
    /// district and version is replaced, so each version holds at most one.
    pub(super) fn insert(&mut self, mut district: District) {
        district.plan = Some(self.plan);
        self.snapshots.insert((district.district_id, district.version), district);
    }

    /// The districts as of `version`: per district id, the snapshot with the
    /// highest version not above `version`. Districts with no such snapshot
    /// are left out. Ordered by district id, independent of insertion order.
    pub fn current_districts(&self, version: u32) -> Vec<&District> {
        let mut current = BTreeMap::<DistrictId, &District>::new();
        // Keys are ordered, so a later entry for the same id has a higher version.
        for district in self.snapshots.values().filter(|s| s.version <= version) {
            current.insert(district.district_id, district);
        }
        current.into_values().collect()
    }

    /// The snapshot of one district current at `version`.
    pub fn district_at(&self, district_id: DistrictId, version: u32) -> Option<&District> {
        self.snapshots.range((district_id, 0)..=(district_id, version))
            .next_back()
            .map(|(_, district)| district)
    }

    /// Every snapshot of one district, oldest first.
    pub fn history(&self, district_id: DistrictId) -> Vec<&District> {
        self.snapshots.range((district_id, 0)..=(district_id, u32::MAX))
            .map(|(_, district)| district)
            .collect()
    }

    /// Check that no snapshot of the same district has a higher version.
    /// A district not attached to this store's plan is vacuously latest.
    pub fn is_latest_version(&self, district: &District) -> bool {
        if district.plan != Some(self.plan) {
            return true;
        }
        let id = district.district_id;
        self.snapshots.range((Excluded((id, district.version)), Included((id, u32::MAX))))
            .next()
            .is_none()
    }

    /// The id a new district receives: one past the highest id in use, or 1
    /// for an empty store.
    pub fn next_district_id(&self) -> DistrictId {
        self.snapshots.keys()
            .next_back()
            .map_or(DistrictId(1), |&(id, _)| DistrictId(id.0 + 1))
    }
}
