use ahash::AHashMap;
use geo::Point;

use crate::geom::Shape;
use crate::map::{LevelId, SubjectId, UnitId};

/// A discrete areal unit at one geo level. Immutable once the index is built.
#[derive(Debug, Clone)]
pub struct GeoUnit {
    pub(super) id: UnitId,
    pub(super) level: LevelId,
    pub(super) name: String,
    pub(super) simple: Shape,  // Simplified boundary, tolerance-bounded
    pub(super) point: Point<f64>,  // Representative point, inside the boundary
    pub(super) characteristics: AHashMap<SubjectId, f64>,  // Summed over base units for coarse levels
    pub(super) base_units: Vec<UnitId>,  // Base units under this unit (empty at the base level)
}

impl GeoUnit {
    #[inline] pub fn id(&self) -> UnitId { self.id }

    #[inline] pub fn level(&self) -> LevelId { self.level }

    #[inline] pub fn name(&self) -> &str { &self.name }

    /// Get the simplified boundary geometry.
    #[inline] pub fn simple(&self) -> &Shape { &self.simple }

    /// Get the representative point (always inside the full boundary).
    #[inline] pub fn point(&self) -> Point<f64> { self.point }

    /// Get the characteristic value for a subject, if any.
    #[inline]
    pub fn characteristic(&self, subject: SubjectId) -> Option<f64> {
        self.characteristics.get(&subject).copied()
    }

    /// Base units whose representative point lies inside this unit.
    /// Empty for base units themselves.
    #[inline] pub fn base_units(&self) -> &[UnitId] { &self.base_units }
}

/// A unit reference returned by spatial searches: id and full geometry only.
#[derive(Debug, Clone, Copy)]
pub struct UnitRef<'a> {
    pub id: UnitId,
    pub geom: &'a Shape,
}
