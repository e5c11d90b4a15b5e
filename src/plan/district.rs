use std::collections::BTreeMap;

use crate::geom::Shape;
use crate::map::{Map, SubjectId, UnitId};
use crate::plan::{DistrictId, PlanId, SnapshotId};

/// One immutable, version-stamped snapshot of a district: its boundary and
/// the computed characteristics (per-subject aggregates) of that boundary.
///
/// A snapshot is never changed once its store holds a later version of the
/// same district; edits produce new snapshots instead (see `snapshot`).
#[derive(Debug, Clone)]
pub struct District {
    pub(super) snapshot: SnapshotId,
    pub(super) plan: Option<PlanId>,
    pub(super) district_id: DistrictId,
    pub(super) name: String,
    pub(super) version: u32,
    pub(crate) geom: Shape,   // Canonical empty when the district holds nothing.
    pub(crate) simple: Shape,
    pub(crate) stats: BTreeMap<SubjectId, f64>,
}

impl District {
    /// A district with no geometry and no statistics. A district without a
    /// plan is detached.
    pub fn new(plan: Option<PlanId>, district_id: DistrictId, name: impl Into<String>, version: u32, epsg: u32) -> Self {
        Self {
            snapshot: SnapshotId::fresh(),
            plan,
            district_id,
            name: name.into(),
            version,
            geom: Shape::empty(epsg),
            simple: Shape::empty(epsg),
            stats: BTreeMap::new(),
        }
    }

    #[inline] pub fn snapshot_id(&self) -> SnapshotId { self.snapshot }

    #[inline] pub fn plan(&self) -> Option<PlanId> { self.plan }

    #[inline] pub fn district_id(&self) -> DistrictId { self.district_id }

    #[inline] pub fn name(&self) -> &str { &self.name }

    /// Plan version at which this snapshot was created.
    #[inline] pub fn version(&self) -> u32 { self.version }

    /// Full-detail boundary, or `None` if the district holds no territory.
    #[inline]
    pub fn geom(&self) -> Option<&Shape> {
        (!self.geom.is_empty()).then_some(&self.geom)
    }

    /// Simplified boundary, or `None` if the district holds no territory.
    #[inline]
    pub fn simple(&self) -> Option<&Shape> {
        (!self.simple.is_empty()).then_some(&self.simple)
    }

    /// Full-detail boundary, empty when the district holds no territory.
    #[inline] pub fn shape(&self) -> &Shape { &self.geom }

    /// Computed characteristics, by subject.
    #[inline] pub fn stats(&self) -> &BTreeMap<SubjectId, f64> { &self.stats }

    /// Computed characteristic for one subject, if any unit contributed to it.
    #[inline]
    pub fn computed(&self, subject: SubjectId) -> Option<f64> {
        self.stats.get(&subject).copied()
    }

    /// Copy-on-write: a new snapshot of this district at `version`, with a
    /// fresh identity and its own copy of every computed characteristic.
    pub fn snapshot(&self, version: u32) -> District {
        District { snapshot: SnapshotId::fresh(), version, ..self.clone() }
    }

    /// Replace the boundary and re-derive the simplified boundary.
    pub(crate) fn set_geom(&mut self, geom: Shape, tolerance: f64) {
        self.simple = geom.simplify(tolerance);
        self.geom = geom;
    }

    /// Check if the district is a single polygon. A district with several
    /// polygons meeting only at points is reported as not contiguous.
    #[inline] pub fn is_contiguous(&self) -> bool { self.geom.polygon_count() == 1 }

    /// Key sorting numbered districts ("District 7", "12") first, by number.
    pub fn sort_key(&self) -> String {
        let name = match self.name.strip_prefix("District ") {
            Some(_) => self.name.rsplit(' ').next().unwrap_or(&self.name),
            None => &self.name,
        };
        match name.parse::<u32>() {
            Ok(number) if name.bytes().all(|b| b.is_ascii_digit()) => format!("{number:03}"),
            _ => name.to_string(),
        }
    }

    /// Base units whose representative point lies inside the simplified boundary.
    pub fn base_units(&self, map: &Map) -> Vec<UnitId> {
        match self.simple() {
            Some(simple) => map.base_units_within(simple),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use geo::polygon;

    use super::*;
    use crate::geom::DEFAULT_EPSG;

    fn square(x: f64) -> Shape {
        Shape::from_polygon(polygon![
            (x: x, y: 0.0), (x: x + 1.0, y: 0.0), (x: x + 1.0, y: 1.0), (x: x, y: 1.0), (x: x, y: 0.0),
        ], DEFAULT_EPSG)
    }

    fn district(name: &str) -> District {
        District::new(Some(PlanId(1)), DistrictId(1), name, 0, DEFAULT_EPSG)
    }

    #[test]
    fn new_district_has_no_geometry() {
        let district = district("District 1");
        assert!(district.geom().is_none());
        assert!(district.simple().is_none());
        assert!(district.shape().is_empty());
        assert!(!district.is_contiguous());
    }

    #[test]
    fn snapshot_copies_stats_with_fresh_identity() {
        let mut original = district("District 1");
        original.stats.insert(SubjectId(1), 250.0);
        original.set_geom(square(0.0), 0.0);

        let mut copy = original.snapshot(3);
        copy.stats.insert(SubjectId(1), 10.0);

        assert_ne!(copy.snapshot_id(), original.snapshot_id());
        assert_eq!(copy.version(), 3);
        assert_eq!(copy.district_id(), original.district_id());
        assert_eq!(original.computed(SubjectId(1)), Some(250.0));
        assert_eq!(copy.geom(), original.geom());
    }

    #[test]
    fn contiguity_counts_polygons() {
        let mut district = district("District 1");
        district.set_geom(square(0.0), 0.0);
        assert!(district.is_contiguous());
        district.set_geom(square(0.0).union(&square(5.0)), 0.0);
        assert!(!district.is_contiguous());
    }

    #[test]
    fn numbered_districts_sort_first() {
        let mut names = ["Zeta", "District 10", "District 2", "7", "Alpha"]
            .map(|name| district(name));
        names.sort_by_key(|district| district.sort_key());
        let names = names.iter().map(|district| district.name()).collect::<Vec<_>>();
        assert_eq!(names, vec!["District 2", "7", "District 10", "Alpha", "Zeta"]);
    }
}
