use std::fmt;

use serde::{Deserialize, Serialize};

use crate::plan::Plan;

/// Identifier of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u32);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserId({})", self.0)
    }
}

/// The caller of an operation, as far as plan permissions are concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub is_staff: bool,
}

impl Plan {
    /// Owners and staff may edit a plan. Templates are never edited, only copied.
    pub fn can_edit(&self, user: &User) -> bool {
        (self.owner == user.id || user.is_staff) && !self.is_template
    }

    /// Any user may view a shared plan that is not a template.
    pub fn can_view(&self, _user: &User) -> bool {
        self.is_shared && !self.is_template
    }

    /// Anyone may copy a template; owners and staff may copy any plan.
    pub fn can_copy(&self, user: &User) -> bool {
        self.is_template || self.owner == user.id || user.is_staff
    }
}
