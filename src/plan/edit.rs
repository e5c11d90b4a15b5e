use rayon::prelude::*;
use tracing::{debug, info};

use crate::error::EditError;
use crate::map::{LevelId, Map, UnitId, UnitRef};
use crate::plan::{District, DistrictId, Plan, PlanId};

/// The outcome of a prepared edit, not yet visible in the plan.
///
/// Holds every new snapshot the edit produces. Committing appends them all
/// and bumps the plan version, or does nothing.
#[derive(Debug, Clone)]
pub struct StagedEdit {
    plan: PlanId,
    base_version: u32,
    snapshots: Vec<District>,
    affected: usize,
}

impl StagedEdit {
    /// Plan version the edit was computed against.
    #[inline] pub fn base_version(&self) -> u32 { self.base_version }

    /// Version the plan will have once the edit is committed.
    #[inline] pub fn version(&self) -> u32 { self.base_version + 1 }

    /// New snapshots, ordered by district id.
    #[inline] pub fn snapshots(&self) -> &[District] { &self.snapshots }

    /// Number of districts whose geometry or statistics change.
    #[inline] pub fn affected(&self) -> usize { self.affected }
}

/// What an edit does to one district.
enum Change {
    Untouched,
    Changed(District, bool),
}

impl Plan {
    /// Move the units `unit_ids` (at `level`) into `target`, taking them from
    /// whichever districts hold them. `at_version` must be the plan's current
    /// version.
    ///
    /// Returns the number of districts whose geometry or statistics changed.
    pub fn add_units(
        &mut self,
        map: &Map,
        target: DistrictId,
        unit_ids: &[UnitId],
        level: LevelId,
        at_version: u32,
    ) -> Result<usize, EditError> {
        let staged = self.prepare_edit(map, target, unit_ids, level, at_version)?;
        self.commit(staged)
    }

    /// Compute an edit without changing the plan.
    ///
    /// Every district overlapping the added territory loses it and the target
    /// gains it; other districts keep their latest snapshot. The units entering
    /// or leaving a district are found against its boundary before the
    /// boundary changes, then folded into its statistics. Districts are
    /// processed in parallel.
    ///
    /// An `at_version` behind the plan is a stale edit and fails with
    /// `Conflict`; one ahead of it fails with `FutureVersion`.
    pub fn prepare_edit(
        &self,
        map: &Map,
        target: DistrictId,
        unit_ids: &[UnitId],
        level: LevelId,
        at_version: u32,
    ) -> Result<StagedEdit, EditError> {
        if at_version > self.version {
            return Err(EditError::FutureVersion { requested: at_version, current: self.version });
        }
        if at_version < self.version {
            return Err(EditError::Conflict { expected: at_version, found: self.version });
        }

        let incremental = map.boundary_union(unit_ids)?;
        let districts = self.store.current_districts(at_version);
        if !districts.iter().any(|d| d.district_id == target) {
            return Err(EditError::UnknownDistrict(target));
        }

        let version = self.version + 1;
        let tolerance = map.simplify_tolerance();
        let changes = districts.par_iter()
            .map(|district| -> Result<Change, EditError> {
                if district.district_id == target {
                    let gained = map.find_units(unit_ids, level, Some(district.shape()), false)?;
                    let mut snapshot = district.snapshot(version);
                    snapshot.set_geom(district.shape().union(&incremental), tolerance);
                    let changed = snapshot.delta_stats(&ids(&gained), true, map);
                    let counted = changed && !snapshot.shape().is_empty();
                    Ok(Change::Changed(snapshot, counted))
                } else if district.shape().overlaps_or_contains(&incremental) {
                    let lost = map.find_units(unit_ids, level, Some(district.shape()), true)?;
                    let mut snapshot = district.snapshot(version);
                    snapshot.set_geom(district.shape().difference(&incremental), tolerance);
                    snapshot.delta_stats(&ids(&lost), false, map);
                    Ok(Change::Changed(snapshot, true))
                } else {
                    Ok(Change::Untouched)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut affected = 0;
        let mut snapshots = Vec::with_capacity(changes.len());
        for change in changes {
            match change {
                Change::Untouched => {}
                Change::Changed(snapshot, counted) => {
                    debug!(district = %snapshot.district_id, version, counted, empty = snapshot.shape().is_empty(), "updated boundary");
                    affected += counted as usize;
                    snapshots.push(snapshot);
                }
            }
        }

        Ok(StagedEdit { plan: self.id, base_version: self.version, snapshots, affected })
    }

    /// Apply a staged edit: append its snapshots and advance the version by
    /// one. Fails with `Conflict`, leaving the plan untouched, if the plan has
    /// moved on since the edit was prepared.
    pub fn commit(&mut self, staged: StagedEdit) -> Result<usize, EditError> {
        if staged.plan != self.id {
            return Err(EditError::UnknownPlan(staged.plan));
        }
        if staged.base_version != self.version {
            return Err(EditError::Conflict { expected: staged.base_version, found: self.version });
        }

        let StagedEdit { snapshots, affected, .. } = staged;
        let count = snapshots.len();
        for snapshot in snapshots {
            self.store.insert(snapshot);
        }
        self.version += 1;

        info!(plan = %self.id, version = self.version, snapshots = count, affected, "committed edit");
        Ok(affected)
    }
}

fn ids(units: &[UnitRef<'_>]) -> Vec<UnitId> {
    units.iter().map(|unit| unit.id).collect()
}
