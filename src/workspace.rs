//! Registry of plans sharing one geo index.
//!
//! Each plan sits behind its own lock. An edit is computed under the plan's
//! read lock and committed under its write lock, so edits to one plan
//! serialise at the commit point while readers and edits to other plans
//! proceed independently.

use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::error::EditError;
use crate::map::{LevelId, Map, SubjectId, UnitId};
use crate::plan::{DistrictFeature, DistrictId, Plan, PlanId, UserId};

/// Shared geo index, engine settings, and the plans edited against them.
#[derive(Debug)]
pub struct Workspace {
    map: Arc<Map>,
    config: EngineConfig,
    plans: RwLock<AHashMap<PlanId, Arc<RwLock<Plan>>>>,
}

impl Workspace {
    pub fn new(map: impl Into<Arc<Map>>, config: EngineConfig) -> Self {
        Self { map: map.into(), config, plans: RwLock::new(AHashMap::new()) }
    }

    #[inline] pub fn map(&self) -> &Map { &self.map }

    #[inline] pub fn config(&self) -> &EngineConfig { &self.config }

    /// Get the number of registered plans.
    #[inline] pub fn num_plans(&self) -> usize { self.plans.read().len() }

    /// Register a plan, replacing any plan with the same id.
    pub fn insert(&self, plan: Plan) -> Arc<RwLock<Plan>> {
        let id = plan.id();
        let plan = Arc::new(RwLock::new(plan));
        self.plans.write().insert(id, Arc::clone(&plan));
        debug!(plan = %id, "registered plan");
        plan
    }

    /// Create and register a plan whose unassigned district covers the map.
    pub fn create_plan(&self, id: PlanId, name: impl Into<String>, owner: UserId) -> Result<Arc<RwLock<Plan>>, EditError> {
        let plan = Plan::covering(id, name, owner, &self.map)?;
        Ok(self.insert(plan))
    }

    /// Get a handle on a registered plan.
    pub fn plan(&self, id: PlanId) -> Result<Arc<RwLock<Plan>>, EditError> {
        self.plans.read().get(&id).cloned().ok_or(EditError::UnknownPlan(id))
    }

    /// Unregister a plan, returning it if it was registered.
    pub fn remove(&self, id: PlanId) -> Option<Arc<RwLock<Plan>>> {
        self.plans.write().remove(&id)
    }

    /// Add a district to a plan.
    pub fn create_district(&self, plan: PlanId, name: impl Into<String>) -> Result<DistrictId, EditError> {
        self.plan(plan)?.write().create_district(name, &self.config)
    }

    /// Move units into a district of a plan (see `Plan::add_units`).
    ///
    /// The edit is prepared under a read lock; a concurrent edit committed in
    /// the meantime makes this one fail with `Conflict`.
    pub fn add_units(
        &self,
        plan: PlanId,
        target: DistrictId,
        unit_ids: &[UnitId],
        level: LevelId,
        at_version: u32,
    ) -> Result<usize, EditError> {
        let handle = self.plan(plan)?;
        let staged = handle.read().prepare_edit(&self.map, target, unit_ids, level, at_version)?;
        let affected = handle.write().commit(staged)?;
        info!(plan = %plan, district = %target, units = unit_ids.len(), affected, "added units");
        Ok(affected)
    }

    /// The district feed of a plan at `version`.
    pub fn district_feed(&self, plan: PlanId, version: u32, subject: SubjectId) -> Result<Vec<DistrictFeature>, EditError> {
        Ok(self.plan(plan)?.read().district_feed(version, subject))
    }
}
