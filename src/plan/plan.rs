use std::collections::BTreeMap;

use tracing::info;

use crate::config::EngineConfig;
use crate::error::EditError;
use crate::map::Map;
use crate::plan::{District, DistrictId, DistrictStore, PlanId, UserId};

/// A districting plan: a named, versioned container of districts.
///
/// `version` counts successful edits. Every district snapshot lives in the
/// plan's append-only `DistrictStore`; the districts "as of" a version are
/// resolved from it on demand.
#[derive(Debug, Clone)]
pub struct Plan {
    pub(super) id: PlanId,
    pub(super) name: String,
    pub(super) owner: UserId,
    pub(super) is_template: bool,
    pub(super) is_shared: bool,
    pub(super) version: u32,
    pub(super) epsg: u32,
    pub(super) store: DistrictStore,
}

impl Plan {
    /// Name of the reserved district holding unassigned units.
    pub const UNASSIGNED_NAME: &'static str = "Unassigned";

    /// Create a plan at version 0 with its (empty) unassigned district.
    pub fn new(id: PlanId, name: impl Into<String>, owner: UserId, epsg: u32) -> Self {
        let mut store = DistrictStore::new(id);
        store.insert(District::new(Some(id), DistrictId::UNASSIGNED, Self::UNASSIGNED_NAME, 0, epsg));
        Self {
            id,
            name: name.into(),
            owner,
            is_template: false,
            is_shared: false,
            version: 0,
            epsg,
            store,
        }
    }

    /// Create a plan whose unassigned district holds every base unit of the
    /// map: its boundary is the union of all base geometry and its
    /// statistics are the map totals.
    pub fn covering(id: PlanId, name: impl Into<String>, owner: UserId, map: &Map) -> Result<Self, EditError> {
        let mut plan = Self::new(id, name, owner, map.epsg());
        let base = map.base_layer().unit_ids();

        let mut unassigned = District::new(Some(id), DistrictId::UNASSIGNED, Self::UNASSIGNED_NAME, 0, map.epsg());
        unassigned.set_geom(map.boundary_union(base)?, map.simplify_tolerance());
        unassigned.stats = map.subjects().iter()
            .filter_map(|subject| map.sum_characteristic(base, subject.id).map(|sum| (subject.id, sum)))
            .collect::<BTreeMap<_, _>>();
        plan.store.insert(unassigned);

        info!(plan = %id, units = base.len(), "created covering plan");
        Ok(plan)
    }

    #[inline] pub fn id(&self) -> PlanId { self.id }

    #[inline] pub fn name(&self) -> &str { &self.name }

    #[inline] pub fn owner(&self) -> UserId { self.owner }

    /// Get the current plan version (number of committed edits).
    #[inline] pub fn version(&self) -> u32 { self.version }

    #[inline] pub fn epsg(&self) -> u32 { self.epsg }

    #[inline] pub fn is_template(&self) -> bool { self.is_template }

    #[inline] pub fn is_shared(&self) -> bool { self.is_shared }

    #[inline] pub fn set_template(&mut self, is_template: bool) { self.is_template = is_template }

    #[inline] pub fn set_shared(&mut self, is_shared: bool) { self.is_shared = is_shared }

    /// Get the snapshot store.
    #[inline] pub fn store(&self) -> &DistrictStore { &self.store }

    /// The districts as of `version`, ordered by district id.
    #[inline]
    pub fn current_districts(&self, version: u32) -> Vec<&District> {
        self.store.current_districts(version)
    }

    /// The districts as of the plan's current version.
    #[inline]
    pub fn districts(&self) -> Vec<&District> {
        self.store.current_districts(self.version)
    }

    /// The snapshot of one district current at `version`.
    #[inline]
    pub fn district(&self, district_id: DistrictId, version: u32) -> Option<&District> {
        self.store.district_at(district_id, version)
    }

    /// Check that no later snapshot of the district exists in this plan.
    #[inline]
    pub fn is_latest_version(&self, district: &District) -> bool {
        self.store.is_latest_version(district)
    }

    /// Add an empty district. It takes the next free id and is stamped with
    /// the current plan version, which does not change.
    ///
    /// Fails with `Capacity` before touching the plan if the id would exceed
    /// `config.max_districts`; the unassigned district is not counted.
    pub fn create_district(&mut self, name: impl Into<String>, config: &EngineConfig) -> Result<DistrictId, EditError> {
        let district_id = self.store.next_district_id();
        if district_id.0 > config.max_districts {
            return Err(EditError::Capacity { max: config.max_districts });
        }

        let district = District::new(Some(self.id), district_id, name, self.version, self.epsg);
        info!(plan = %self.id, district = %district_id, name = %district.name, version = self.version, "created district");
        self.store.insert(district);
        Ok(district_id)
    }

    /// Copy the districts current at this plan's version into a new plan at
    /// version 0, e.g. to instantiate a template.
    pub fn copy_as(&self, id: PlanId, name: impl Into<String>, owner: UserId) -> Plan {
        let mut store = DistrictStore::new(id);
        for district in self.districts() {
            let mut copy = district.snapshot(0);
            copy.plan = Some(id);
            store.insert(copy);
        }

        info!(plan = %id, from = %self.id, districts = store.len(), "copied plan");
        Plan {
            id,
            name: name.into(),
            owner,
            is_template: false,
            is_shared: false,
            version: 0,
            epsg: self.epsg,
            store,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::DEFAULT_EPSG;

    fn config(max_districts: u32) -> EngineConfig {
        EngineConfig { max_districts, ..EngineConfig::default() }
    }

    #[test]
    fn new_plan_has_empty_unassigned_district() {
        let plan = Plan::new(PlanId(1), "Plan", UserId(1), DEFAULT_EPSG);
        let districts = plan.districts();

        assert_eq!(plan.version(), 0);
        assert_eq!(districts.len(), 1);
        assert_eq!(districts[0].district_id(), DistrictId::UNASSIGNED);
        assert_eq!(districts[0].name(), "Unassigned");
        assert!(districts[0].geom().is_none());
    }

    #[test]
    fn districts_get_sequential_ids() {
        let mut plan = Plan::new(PlanId(1), "Plan", UserId(1), DEFAULT_EPSG);
        assert_eq!(plan.create_district("District 1", &config(3)).unwrap(), DistrictId(1));
        assert_eq!(plan.create_district("District 2", &config(3)).unwrap(), DistrictId(2));
        assert_eq!(plan.version(), 0);
        assert_eq!(plan.districts().len(), 3);
    }

    #[test]
    fn capacity_is_enforced_without_side_effects() {
        let mut plan = Plan::new(PlanId(1), "Plan", UserId(1), DEFAULT_EPSG);
        plan.create_district("District 1", &config(1)).unwrap();

        let err = plan.create_district("District 2", &config(1)).unwrap_err();
        assert_eq!(err, EditError::Capacity { max: 1 });
        assert_eq!(plan.store().len(), 2);
        assert_eq!(plan.version(), 0);
    }

    #[test]
    fn copy_starts_a_new_history() {
        let mut template = Plan::new(PlanId(1), "Template", UserId(1), DEFAULT_EPSG);
        template.create_district("District 1", &config(3)).unwrap();
        template.set_template(true);

        let copy = template.copy_as(PlanId(2), "Mine", UserId(9));
        assert_eq!(copy.id(), PlanId(2));
        assert_eq!(copy.owner(), UserId(9));
        assert!(!copy.is_template());
        assert_eq!(copy.version(), 0);

        let districts = copy.districts();
        assert_eq!(districts.len(), 2);
        assert!(districts.iter().all(|d| d.plan() == Some(PlanId(2)) && d.version() == 0));
        assert_ne!(districts[1].snapshot_id(), template.districts()[1].snapshot_id());
    }
}
