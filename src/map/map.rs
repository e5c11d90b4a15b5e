use std::collections::{BTreeMap, BTreeSet};

use ahash::AHashMap;
use geo::{Point, Rect};

use crate::error::EditError;
use crate::geom::Shape;
use crate::map::{GeoLevel, GeoUnit, LevelId, MapLayer, Subject, SubjectId, UnitId};

/// The hierarchical geo index: levels ordered from coarsest to base, their
/// units, and the subjects measured on base units.
///
/// Read-only once built (see `MapBuilder`); shared between plans.
#[derive(Debug)]
pub struct Map {
    pub(super) epsg: u32,
    pub(super) simplify_tolerance: f64,
    pub(super) layers: Vec<MapLayer>,      // Coarsest first; the last layer is the base level.
    pub(super) subjects: Vec<Subject>,     // Ordered by sort key.
    pub(super) levels: AHashMap<LevelId, usize>,
    pub(super) lookup: AHashMap<UnitId, (u32, u32)>, // unit -> (layer, entity)
}

impl Map {
    /// Get the EPSG code of all reference geometry.
    #[inline] pub fn epsg(&self) -> u32 { self.epsg }

    /// Get the simplification tolerance used for searches and simplified geometry.
    #[inline] pub fn simplify_tolerance(&self) -> f64 { self.simplify_tolerance }

    /// Iterate over the levels, coarsest first.
    #[inline]
    pub fn levels(&self) -> impl Iterator<Item = &GeoLevel> + '_ {
        self.layers.iter().map(|layer| layer.level())
    }

    /// Get the base (finest) level.
    #[inline] pub fn base_level(&self) -> &GeoLevel { self.base_layer().level() }

    /// Get a level by id.
    #[inline] pub fn level(&self, id: LevelId) -> Option<&GeoLevel> { self.layer(id).map(|layer| layer.level()) }

    /// Get the layer for a level by id.
    #[inline]
    pub fn layer(&self, id: LevelId) -> Option<&MapLayer> {
        self.levels.get(&id).map(|&i| &self.layers[i])
    }

    /// Get the base layer.
    #[inline]
    pub fn base_layer(&self) -> &MapLayer {
        // MapBuilder guarantees at least one layer, with the base level last.
        &self.layers[self.layers.len() - 1]
    }

    /// Position of a level in coarse-to-fine order.
    #[inline]
    pub(super) fn level_index(&self, id: LevelId) -> Result<usize, EditError> {
        self.levels.get(&id).copied().ok_or(EditError::UnknownLevel(id))
    }

    /// Get the subjects, ordered by sort key.
    #[inline] pub fn subjects(&self) -> &[Subject] { &self.subjects }

    /// Get a subject by id.
    #[inline]
    pub fn subject(&self, id: SubjectId) -> Option<&Subject> {
        self.subjects.iter().find(|subject| subject.id == id)
    }

    /// Get a subject by name (e.g. "POPTOT").
    #[inline]
    pub fn subject_by_name(&self, name: &str) -> Option<&Subject> {
        self.subjects.iter().find(|subject| subject.name == name)
    }

    /// Get the total number of units across all levels.
    #[inline] pub fn num_units(&self) -> usize { self.lookup.len() }

    /// Get a unit by id.
    #[inline]
    pub fn unit(&self, id: UnitId) -> Option<&GeoUnit> {
        self.lookup.get(&id).map(|&(layer, idx)| self.layers[layer as usize].entity(idx as usize))
    }

    /// Get the full-detail geometry of a unit.
    #[inline]
    pub fn unit_geom(&self, id: UnitId) -> Option<&Shape> {
        self.lookup.get(&id).map(|&(layer, idx)| self.layers[layer as usize].geom(idx as usize))
    }

    /// Get the representative point of a unit.
    #[inline]
    pub fn representative_point(&self, id: UnitId) -> Option<Point<f64>> {
        self.unit(id).map(|unit| unit.point())
    }

    /// Unit ids at a level, in ascending order.
    pub fn units_of_level(&self, level: LevelId) -> Result<&[UnitId], EditError> {
        Ok(self.layers[self.level_index(level)?].unit_ids())
    }

    /// Aggregate union of the listed units' full-detail geometry.
    ///
    /// Invariant under reordering and duplication of ids.
    pub fn boundary_union(&self, ids: &[UnitId]) -> Result<Shape, EditError> {
        let ids = ids.iter().copied().collect::<BTreeSet<_>>();
        let geoms = ids.iter()
            .map(|&id| self.unit_geom(id).ok_or(EditError::UnknownUnit(id)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Shape::union_all(geoms, self.epsg))
    }

    /// Base units lying under the listed units (a base unit lies under itself).
    /// Returned sorted and without duplicates.
    pub fn base_units_under(&self, ids: &[UnitId]) -> Result<Vec<UnitId>, EditError> {
        let base = self.base_level().id;
        let mut out = BTreeSet::new();
        for &id in ids {
            let unit = self.unit(id).ok_or(EditError::UnknownUnit(id))?;
            if unit.level() == base {
                out.insert(id);
            } else {
                out.extend(unit.base_units().iter().copied());
            }
        }
        Ok(out.into_iter().collect())
    }

    /// Base units whose representative point lies inside `shape`.
    pub fn base_units_within(&self, shape: &Shape) -> Vec<UnitId> {
        let layer = self.base_layer();
        layer.units_inside(shape).into_iter()
            .map(|idx| layer.entity(idx).id())
            .collect()
    }

    /// Characteristic value of a unit for a subject. For coarse units this is
    /// the sum over the base units under them.
    #[inline]
    pub fn characteristic(&self, unit: UnitId, subject: SubjectId) -> Option<f64> {
        self.unit(unit).and_then(|unit| unit.characteristic(subject))
    }

    /// Sum of a subject over the given units; `None` if no unit has a value.
    pub fn sum_characteristic(&self, units: &[UnitId], subject: SubjectId) -> Option<f64> {
        units.iter()
            .filter_map(|&unit| self.characteristic(unit, subject))
            .fold(None, |acc, value| Some(acc.unwrap_or(0.0) + value))
    }

    /// Full (non-incremental) aggregation of every subject over the base
    /// units inside `shape`. Subjects without any value are omitted.
    pub fn stats_within(&self, shape: &Shape) -> BTreeMap<SubjectId, f64> {
        let units = self.base_units_within(shape);
        self.subjects.iter()
            .filter_map(|subject| self.sum_characteristic(&units, subject.id).map(|sum| (subject.id, sum)))
            .collect()
    }

    /// Compute the bounding rectangle of all base geometry.
    #[inline] pub fn bounds(&self) -> Option<Rect<f64>> { self.base_layer().geoms.bounds() }
}
