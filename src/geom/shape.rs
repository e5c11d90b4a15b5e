use std::panic::{catch_unwind, AssertUnwindSafe};

use geo::{
    Area, BooleanOps, BoundingRect, CoordsIter, Geometry, InteriorPoint, Intersects,
    MultiPolygon, Point, Polygon, Rect, Relate, SimplifyVwPreserve,
};
use serde::Serialize;
use tracing::warn;

/// Spatial reference used by the reference loader (spherical mercator, metres).
pub const DEFAULT_EPSG: u32 = 3785;

/// A planar multi-region geometry tagged with its spatial reference.
///
/// Every boundary stored by the engine is a `Shape`. "Nothing" is the
/// canonical empty shape (no polygons) carrying the spatial reference of
/// whatever produced it, never a missing value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Shape {
    epsg: u32,
    polygons: MultiPolygon<f64>,
}

impl Shape {
    /// The canonical empty geometry for a spatial reference.
    pub fn empty(epsg: u32) -> Self {
        Self { epsg, polygons: MultiPolygon::new(vec![]) }
    }

    /// Wrap a multipolygon, dropping degenerate (zero-area) members.
    /// Geometries with non-finite coordinates collapse to empty.
    pub fn new(polygons: MultiPolygon<f64>, epsg: u32) -> Self {
        if !is_finite(&polygons) {
            warn!(epsg, "non-finite coordinates in geometry; using empty geometry");
            return Self::empty(epsg);
        }
        Self { epsg, polygons: clean(polygons) }
    }

    /// Wrap a single polygon as a multi-region.
    pub fn from_polygon(polygon: Polygon<f64>, epsg: u32) -> Self {
        Self::new(MultiPolygon::new(vec![polygon]), epsg)
    }

    /// Normalize any geometry to the canonical multi-region type.
    ///
    /// Polygonal geometries are wrapped, collections keep only their polygonal
    /// members, and everything else (points, lines) becomes empty.
    pub fn to_multi_region(geometry: Geometry<f64>, epsg: u32) -> Self {
        let mut polygons = Vec::new();
        collect_polygons(geometry, &mut polygons);
        Self::new(MultiPolygon::new(polygons), epsg)
    }

    /// Get the EPSG code of this geometry's spatial reference.
    #[inline] pub fn epsg(&self) -> u32 { self.epsg }

    /// Get a reference to the underlying multipolygon.
    #[inline] pub fn polygons(&self) -> &MultiPolygon<f64> { &self.polygons }

    /// Consume the shape, returning the underlying multipolygon.
    #[inline] pub fn into_polygons(self) -> MultiPolygon<f64> { self.polygons }

    /// Check if this is the canonical empty geometry.
    #[inline] pub fn is_empty(&self) -> bool { self.polygons.0.is_empty() }

    /// Number of disjoint polygons.
    #[inline] pub fn polygon_count(&self) -> usize { self.polygons.0.len() }

    /// Planar area.
    #[inline] pub fn area(&self) -> f64 { self.polygons.unsigned_area() }

    /// Total ring length, including holes.
    pub fn perimeter(&self) -> f64 {
        self.polygons.iter()
            .flat_map(|polygon| std::iter::once(polygon.exterior()).chain(polygon.interiors().iter()))
            .flat_map(|ring| ring.lines())
            .map(|line| line.dx().hypot(line.dy()))
            .sum()
    }

    /// Bounding rectangle, or `None` when empty.
    #[inline] pub fn bounding_rect(&self) -> Option<Rect<f64>> { self.polygons.bounding_rect() }

    /// A point guaranteed to lie inside the geometry, or `None` when empty.
    pub fn representative_point(&self) -> Option<Point<f64>> {
        guarded(|| self.polygons.interior_point()).flatten()
    }

    /// Union of two geometries. Failures yield the canonical empty geometry.
    pub fn union(&self, other: &Shape) -> Shape {
        if self.is_empty() && self.epsg == other.epsg { return other.clone() }
        if other.is_empty() && self.epsg == other.epsg { return self.clone() }
        self.boolean(other, "union", |a, b| a.union(b))
    }

    /// Part of `self` not covered by `other`. Failures yield the canonical empty geometry.
    pub fn difference(&self, other: &Shape) -> Shape {
        if self.is_empty() { return Self::empty(self.epsg) }
        if other.is_empty() && self.epsg == other.epsg { return self.clone() }
        self.boolean(other, "difference", |a, b| a.difference(b))
    }

    /// Part of `self` also covered by `other`. Failures yield the canonical empty geometry.
    pub fn intersection(&self, other: &Shape) -> Shape {
        if self.is_empty() || other.is_empty() { return Self::empty(self.epsg) }
        self.boolean(other, "intersection", |a, b| a.intersection(b))
    }

    /// Union of many geometries. Order and duplicates do not affect the result.
    pub fn union_all<'a>(shapes: impl IntoIterator<Item = &'a Shape>, epsg: u32) -> Shape {
        shapes.into_iter().fold(Self::empty(epsg), |acc, shape| acc.union(shape))
    }

    /// Topology-preserving simplification (Visvalingam-Whyatt).
    ///
    /// `tolerance` is a planar distance; vertices whose effective triangle
    /// is smaller than `tolerance²` are dropped. A tolerance of zero is the
    /// identity.
    pub fn simplify(&self, tolerance: f64) -> Shape {
        if self.is_empty() || !(tolerance > 0.0) { return self.clone() }
        let epsilon = tolerance * tolerance;
        match guarded(|| self.polygons.simplify_vw_preserve(&epsilon)) {
            Some(simple) if is_finite(&simple) => Self::new(simple, self.epsg),
            _ => {
                warn!(epsg = self.epsg, tolerance, "simplification failed; keeping full geometry");
                self.clone()
            }
        }
    }

    /// Check if a point lies inside or on the boundary of this geometry.
    pub fn intersects_point(&self, point: &Point<f64>) -> bool {
        !self.is_empty() && self.polygons.intersects(point)
    }

    /// Check if `other` lies entirely within this geometry (DE-9IM contains).
    pub fn contains_shape(&self, other: &Shape) -> bool {
        if self.is_empty() || other.is_empty() { return false }
        guarded(|| self.polygons.relate(&other.polygons).is_contains()).unwrap_or(false)
    }

    /// Check if the two geometries share any point, including boundary touches.
    pub fn intersects_shape(&self, other: &Shape) -> bool {
        if self.is_empty() || other.is_empty() { return false }
        guarded(|| self.polygons.intersects(&other.polygons)).unwrap_or(false)
    }

    /// Check if the geometries overlap in area, or one contains the other.
    /// Pure boundary touches (edge or point) are NOT considered overlaps.
    pub fn overlaps_or_contains(&self, other: &Shape) -> bool {
        if self.is_empty() || other.is_empty() { return false }
        guarded(|| {
            let im = self.polygons.relate(&other.polygons);
            im.is_intersects() && !im.is_touches()
        }).unwrap_or(false)
    }

    /// Run a boolean operation, recovering engine failures as empty geometry.
    fn boolean(
        &self,
        other: &Shape,
        op: &'static str,
        f: impl FnOnce(&MultiPolygon<f64>, &MultiPolygon<f64>) -> MultiPolygon<f64>,
    ) -> Shape {
        if self.epsg != other.epsg {
            warn!(op, left = self.epsg, right = other.epsg, "spatial reference mismatch; using empty geometry");
            return Self::empty(self.epsg);
        }
        match guarded(|| f(&self.polygons, &other.polygons)) {
            Some(result) if is_finite(&result) => Self { epsg: self.epsg, polygons: clean(result) },
            _ => {
                warn!(op, epsg = self.epsg, "geometry operation failed; using empty geometry");
                Self::empty(self.epsg)
            }
        }
    }
}

/// Run a geometry-engine call, turning a panic into `None`.
fn guarded<T>(f: impl FnOnce() -> T) -> Option<T> {
    catch_unwind(AssertUnwindSafe(f)).ok()
}

fn is_finite(polygons: &MultiPolygon<f64>) -> bool {
    polygons.coords_iter().all(|c| c.x.is_finite() && c.y.is_finite())
}

/// Drop rings that cannot bound any area.
fn clean(polygons: MultiPolygon<f64>) -> MultiPolygon<f64> {
    MultiPolygon::new(
        polygons.0.into_iter()
            .filter(|polygon| polygon.exterior().0.len() >= 4 && polygon.unsigned_area() > 0.0)
            .collect()
    )
}

fn collect_polygons(geometry: Geometry<f64>, out: &mut Vec<Polygon<f64>>) {
    match geometry {
        Geometry::Polygon(polygon) => out.push(polygon),
        Geometry::MultiPolygon(polygons) => out.extend(polygons.0),
        Geometry::Rect(rect) => out.push(rect.to_polygon()),
        Geometry::Triangle(triangle) => out.push(triangle.to_polygon()),
        Geometry::GeometryCollection(collection) => {
            collection.0.into_iter().for_each(|member| collect_polygons(member, out))
        }
        Geometry::Point(_) | Geometry::Line(_) | Geometry::LineString(_)
        | Geometry::MultiPoint(_) | Geometry::MultiLineString(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use geo::{line_string, point, polygon, Geometry, GeometryCollection, LineString};

    use super::*;

    fn square(x: f64, y: f64, size: f64) -> Shape {
        Shape::from_polygon(polygon![
            (x: x, y: y),
            (x: x + size, y: y),
            (x: x + size, y: y + size),
            (x: x, y: y + size),
            (x: x, y: y),
        ], DEFAULT_EPSG)
    }

    #[test]
    fn empty_carries_spatial_reference() {
        let empty = Shape::empty(4269);
        assert!(empty.is_empty());
        assert_eq!(empty.epsg(), 4269);
        assert_eq!(empty.area(), 0.0);
        assert!(empty.representative_point().is_none());
    }

    #[test]
    fn to_multi_region_wraps_polygon() {
        let polygon = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 0.0)];
        let shape = Shape::to_multi_region(Geometry::Polygon(polygon), DEFAULT_EPSG);
        assert_eq!(shape.polygon_count(), 1);
        assert!((shape.area() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn to_multi_region_rejects_non_polygonal() {
        let line: LineString<f64> = line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0)];
        let shape = Shape::to_multi_region(Geometry::LineString(line), 3857);
        assert!(shape.is_empty());
        assert_eq!(shape.epsg(), 3857);

        let shape = Shape::to_multi_region(Geometry::Point(point!(x: 1.0, y: 1.0)), 3857);
        assert!(shape.is_empty());
    }

    #[test]
    fn to_multi_region_filters_collection_members() {
        let collection = GeometryCollection::new_from(vec![
            Geometry::Point(point!(x: 5.0, y: 5.0)),
            Geometry::MultiPolygon(square(0.0, 0.0, 1.0).into_polygons()),
            Geometry::LineString(line_string![(x: 0.0, y: 0.0), (x: 3.0, y: 3.0)]),
            Geometry::MultiPolygon(square(2.0, 0.0, 1.0).into_polygons()),
        ]);
        let shape = Shape::to_multi_region(Geometry::GeometryCollection(collection), DEFAULT_EPSG);
        assert_eq!(shape.polygon_count(), 2);
        assert!((shape.area() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_polygons_are_dropped() {
        let sliver = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 2.0, y: 0.0), (x: 0.0, y: 0.0)];
        assert!(Shape::from_polygon(sliver, DEFAULT_EPSG).is_empty());
    }

    #[test]
    fn non_finite_coordinates_collapse_to_empty() {
        let bad = polygon![(x: 0.0, y: 0.0), (x: f64::NAN, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 0.0)];
        assert!(Shape::from_polygon(bad, DEFAULT_EPSG).is_empty());
    }

    #[test]
    fn union_and_difference_of_adjacent_squares() {
        let a = square(0.0, 0.0, 1.0);
        let b = square(1.0, 0.0, 1.0);

        let union = a.union(&b);
        assert!((union.area() - 2.0).abs() < 1e-9);

        let back = union.difference(&b);
        assert!((back.area() - 1.0).abs() < 1e-9);
        assert!(back.intersects_point(&point!(x: 0.5, y: 0.5)));
        assert!(!back.intersects_point(&point!(x: 1.5, y: 0.5)));
    }

    #[test]
    fn difference_to_nothing_is_canonical_empty() {
        let a = square(0.0, 0.0, 1.0);
        let rest = a.difference(&square(-1.0, -1.0, 3.0));
        assert!(rest.is_empty());
        assert_eq!(rest, Shape::empty(DEFAULT_EPSG));
    }

    #[test]
    fn intersection_of_touching_squares_is_empty() {
        let a = square(0.0, 0.0, 1.0);
        let b = square(1.0, 0.0, 1.0);
        assert!(a.intersection(&b).is_empty());
        assert!(a.intersects_shape(&b));
        assert!(!a.overlaps_or_contains(&b));
    }

    #[test]
    fn mismatched_spatial_references_fail_to_empty() {
        let a = square(0.0, 0.0, 1.0);
        let b = Shape::new(square(0.5, 0.0, 1.0).into_polygons(), 4269);
        let union = a.union(&b);
        assert!(union.is_empty());
        assert_eq!(union.epsg(), DEFAULT_EPSG);
    }

    #[test]
    fn union_all_ignores_order_and_duplicates() {
        let a = square(0.0, 0.0, 1.0);
        let b = square(1.0, 0.0, 1.0);
        let c = square(0.0, 1.0, 1.0);

        let forward = Shape::union_all([&a, &b, &c], DEFAULT_EPSG);
        let reverse = Shape::union_all([&c, &b, &a, &b], DEFAULT_EPSG);
        assert!((forward.area() - 3.0).abs() < 1e-9);
        assert!((forward.area() - reverse.area()).abs() < 1e-9);
        assert!(forward.difference(&reverse).is_empty());
    }

    #[test]
    fn containment_predicates() {
        let big = square(0.0, 0.0, 4.0);
        let small = square(1.0, 1.0, 1.0);
        assert!(big.contains_shape(&small));
        assert!(!small.contains_shape(&big));
        assert!(big.overlaps_or_contains(&small));
        assert!(small.overlaps_or_contains(&big));
        assert!(!big.contains_shape(&Shape::empty(DEFAULT_EPSG)));
    }

    #[test]
    fn simplify_zero_tolerance_is_identity() {
        let a = square(0.0, 0.0, 1.0);
        assert_eq!(a.simplify(0.0), a);
    }

    #[test]
    fn simplify_is_deterministic_and_never_adds_vertices() {
        let wobbly = Shape::from_polygon(polygon![
            (x: 0.0, y: 0.0),
            (x: 5.0, y: 0.01),
            (x: 10.0, y: 0.0),
            (x: 10.0, y: 10.0),
            (x: 5.0, y: 9.99),
            (x: 0.0, y: 10.0),
            (x: 0.0, y: 0.0),
        ], DEFAULT_EPSG);

        let once = wobbly.simplify(0.5);
        let twice = wobbly.simplify(0.5);
        assert_eq!(once, twice);
        assert!(once.polygons().coords_count() <= wobbly.polygons().coords_count());
        assert!(!once.is_empty());
    }

    #[test]
    fn perimeter_of_unit_square() {
        assert!((square(0.0, 0.0, 1.0).perimeter() - 4.0).abs() < 1e-12);
    }
}
