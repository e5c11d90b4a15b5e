//! Error types for boundary edits.

use thiserror::Error;

use crate::map::{LevelId, UnitId};
use crate::plan::{DistrictId, PlanId};

/// Errors that can occur while creating districts or editing a plan.
///
/// Geometry-engine failures are not represented here: they are recovered
/// locally as empty geometry and never abort an edit.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EditError {
    /// Creating another district would exceed the configured maximum.
    #[error("Too many districts already: reached the maximum of {max}")]
    Capacity { max: u32 },

    /// The plan moved on while the edit was being computed.
    #[error("Version conflict: edit was computed against version {expected} but the plan is at version {found}")]
    Conflict { expected: u32, found: u32 },

    /// The edit was submitted against a version the plan has not reached.
    #[error("Version {requested} does not exist yet (plan is at version {current})")]
    FutureVersion { requested: u32, current: u32 },

    /// The target district has no snapshot at the requested version.
    #[error("Unknown district {0} at the requested version")]
    UnknownDistrict(DistrictId),

    /// A unit id is not part of the geo index (or not at the requested level).
    #[error("Unknown unit {0}")]
    UnknownUnit(UnitId),

    /// The level id is not part of the geo index.
    #[error("Unknown geo level {0}")]
    UnknownLevel(LevelId),

    /// The plan id is not registered with the workspace.
    #[error("Unknown plan {0}")]
    UnknownPlan(PlanId),
}

impl EditError {
    /// Check if this error is a user-visible validation failure (as opposed
    /// to a malformed request from the calling layer).
    pub fn is_user_visible(&self) -> bool {
        matches!(self, EditError::Capacity { .. } | EditError::Conflict { .. } | EditError::FutureVersion { .. })
    }
}
