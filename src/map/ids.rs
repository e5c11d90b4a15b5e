use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies a single geo unit (county, tract, block, ...) across all levels.
///
/// Ids are assigned by the reference-data loader and are unique across the
/// whole index, not just within a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(pub u32);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UnitId({})", self.0)
    }
}

/// Identifies a geo level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelId(pub u32);

impl fmt::Display for LevelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LevelId({})", self.0)
    }
}

/// Identifies a subject (a measurable attribute such as total population).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(pub u32);

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubjectId({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(UnitId(42).to_string(), "UnitId(42)");
        assert_eq!(LevelId(1).to_string(), "LevelId(1)");
        assert_eq!(SubjectId(3).to_string(), "SubjectId(3)");
    }

    #[test]
    fn ordering() {
        assert!(UnitId(0) < UnitId(1));
        assert!(LevelId(1) < LevelId(2));
    }

    #[test]
    fn serializes_as_plain_number() {
        assert_eq!(serde_json::to_string(&UnitId(7)).unwrap(), "7");
        assert_eq!(serde_json::from_str::<LevelId>("2").unwrap(), LevelId(2));
    }
}
