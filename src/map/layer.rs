use ahash::AHashMap;

use crate::geom::{Geometries, Shape};
use crate::map::{GeoLevel, GeoUnit, UnitId, UnitRef};

/// A single level of the geo index, containing its units and their geometry.
#[derive(Debug)]
pub struct MapLayer {
    pub(super) level: GeoLevel,
    pub(super) is_base: bool,
    pub(super) index: AHashMap<UnitId, u32>, // Map between unit ids and per-level contiguous indices.
    pub(super) ids: Vec<UnitId>,             // Ordered by unit id.
    pub(super) entities: Vec<GeoUnit>,

    // Full-detail geometry store, indexed like `entities`.
    pub(super) geoms: Geometries,
}

impl MapLayer {
    /// Assemble a layer from units sorted by id and their full geometry.
    pub(super) fn new(level: GeoLevel, is_base: bool, entities: Vec<GeoUnit>, geoms: Geometries) -> Self {
        debug_assert_eq!(entities.len(), geoms.len(), "one geometry per unit");
        Self {
            index: entities.iter().enumerate().map(|(i, unit)| (unit.id, i as u32)).collect(),
            ids: entities.iter().map(|unit| unit.id).collect(),
            level,
            is_base,
            entities,
            geoms,
        }
    }

    #[inline] pub fn level(&self) -> &GeoLevel { &self.level }

    /// Check if this is the finest (base) level.
    #[inline] pub fn is_base(&self) -> bool { self.is_base }

    /// Get the number of units in this layer.
    #[inline] pub fn len(&self) -> usize { self.entities.len() }

    /// Check if the layer has no units.
    #[inline] pub fn is_empty(&self) -> bool { self.geoms.is_empty() }

    /// Unit ids of this layer, in ascending order.
    #[inline] pub fn unit_ids(&self) -> &[UnitId] { &self.ids }

    /// Iterate over the units of this layer, in ascending id order.
    #[inline] pub fn units(&self) -> impl Iterator<Item = &GeoUnit> + '_ { self.entities.iter() }

    /// Get the per-level index of a unit.
    #[inline] pub(super) fn position(&self, id: UnitId) -> Option<usize> { self.index.get(&id).map(|&i| i as usize) }

    #[inline] pub(super) fn entity(&self, idx: usize) -> &GeoUnit { &self.entities[idx] }

    /// Get the full-detail geometry of the unit at `idx`.
    #[inline] pub(super) fn geom(&self, idx: usize) -> &Shape { self.geoms.get(idx) }

    #[inline]
    pub(super) fn unit_ref(&self, idx: usize) -> UnitRef<'_> {
        UnitRef { id: self.entities[idx].id, geom: self.geoms.get(idx) }
    }

    /// Test one unit against a boundary. Base units are tested by their
    /// representative point; coarser units by full polygon containment
    /// (`inside`) or disjointness (`!inside`).
    pub(super) fn matches(&self, idx: usize, boundary: &Shape, inside: bool) -> bool {
        if self.is_base {
            boundary.intersects_point(&self.entities[idx].point) == inside
        } else if inside {
            boundary.contains_shape(self.geom(idx))
        } else {
            !boundary.intersects_shape(self.geom(idx))
        }
    }

    /// Units lying inside `region`: by representative point at the base
    /// level, by polygon containment above it. Returned in ascending id order.
    pub(super) fn units_inside(&self, region: &Shape) -> Vec<usize> {
        let Some(rect) = region.bounding_rect() else { return Vec::new() };
        let mut found = self.geoms.query_rect(&rect)
            .filter(|&idx| self.matches(idx, region, true))
            .collect::<Vec<_>>();
        found.sort_unstable();
        found
    }
}
