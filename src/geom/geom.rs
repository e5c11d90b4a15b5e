use geo::{Coord, Point, Rect};
use rstar::{RTree, RTreeObject, AABB};

use crate::geom::Shape;

/// R-tree entry: the envelope of one shape, tagged with its index.
#[derive(Debug, Clone)]
struct Entry {
    idx: usize,
    aabb: AABB<[f64; 2]>,
}

impl Entry {
    fn of(idx: usize, shape: &Shape) -> Option<Self> {
        let rect = shape.bounding_rect()?;
        Some(Self { idx, aabb: AABB::from_corners(rect.min().into(), rect.max().into()) })
    }
}

impl RTreeObject for Entry {
    type Envelope = AABB<[f64; 2]>;

    #[inline] fn envelope(&self) -> Self::Envelope { self.aabb }
}

/// Geometries represents a collection of non-overlapping shapes indexed by an R-tree.
#[derive(Debug, Clone)]
pub(crate) struct Geometries {
    shapes: Vec<Shape>,
    rtree: RTree<Entry>,
}

impl Geometries {
    /// Construct a Geometries object from a vector of shapes.
    /// Empty shapes are kept (so indices line up) but never returned by queries.
    pub(crate) fn new(shapes: Vec<Shape>) -> Self {
        Self {
            rtree: RTree::bulk_load(
                shapes.iter().enumerate()
                    .filter_map(|(i, shape)| Entry::of(i, shape))
                    .collect()
            ),
            shapes,
        }
    }

    /// Get the number of shapes.
    #[inline] pub(crate) fn len(&self) -> usize { self.shapes.len() }

    /// Check if there are no shapes.
    #[inline] pub(crate) fn is_empty(&self) -> bool { self.shapes.is_empty() }

    /// Get a reference to a single shape.
    #[inline] pub(crate) fn get(&self, idx: usize) -> &Shape { &self.shapes[idx] }

    /// Indices of shapes whose bounding box intersects `rect`.
    pub(crate) fn query_rect(&self, rect: &Rect<f64>) -> impl Iterator<Item = usize> + '_ {
        let envelope = AABB::from_corners(rect.min().into(), rect.max().into());
        self.rtree.locate_in_envelope_intersecting(&envelope).map(|entry| entry.idx)
    }

    /// Indices of shapes whose bounding box contains `point`.
    pub(crate) fn query_point(&self, point: &Point<f64>) -> impl Iterator<Item = usize> + '_ {
        let envelope = AABB::from_point([point.x(), point.y()]);
        self.rtree.locate_in_envelope_intersecting(&envelope).map(|entry| entry.idx)
    }

    /// Compute the bounding rectangle of all shapes.
    pub(crate) fn bounds(&self) -> Option<Rect<f64>> {
        self.shapes.iter()
            .filter_map(|shape| shape.bounding_rect())
            .reduce(|a, b| Rect::new(
                Coord {
                    x: a.min().x.min(b.min().x),
                    y: a.min().y.min(b.min().y),
                },
                Coord {
                    x: a.max().x.max(b.max().x),
                    y: a.max().y.max(b.max().y),
                }
            ))
    }
}

#[cfg(test)]
mod tests {
    use geo::{point, polygon};

    use super::*;
    use crate::geom::DEFAULT_EPSG;

    fn square(x: f64, y: f64) -> Shape {
        Shape::from_polygon(polygon![
            (x: x, y: y), (x: x + 1.0, y: y), (x: x + 1.0, y: y + 1.0), (x: x, y: y + 1.0), (x: x, y: y),
        ], DEFAULT_EPSG)
    }

    #[test]
    fn query_point_finds_covering_boxes() {
        let geoms = Geometries::new(vec![square(0.0, 0.0), square(1.0, 0.0), square(5.0, 5.0)]);
        assert_eq!(geoms.len(), 3);

        let mut hits = geoms.query_point(&point!(x: 0.5, y: 0.5)).collect::<Vec<_>>();
        hits.sort_unstable();
        assert_eq!(hits, vec![0]);

        let mut hits = geoms.query_rect(&Rect::new(Coord { x: 0.5, y: 0.2 }, Coord { x: 1.5, y: 0.8 })).collect::<Vec<_>>();
        hits.sort_unstable();
        assert_eq!(hits, vec![0, 1]);
    }

    #[test]
    fn empty_shapes_keep_indices_but_are_not_indexed() {
        let geoms = Geometries::new(vec![Shape::empty(DEFAULT_EPSG), square(0.0, 0.0)]);
        assert_eq!(geoms.len(), 2);
        assert!(geoms.get(0).is_empty());
        assert_eq!(geoms.query_point(&point!(x: 0.5, y: 0.5)).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn bounds_cover_every_shape() {
        let geoms = Geometries::new(vec![square(0.0, 0.0), square(1.0, 0.0), square(5.0, 5.0)]);
        let bounds = geoms.bounds().unwrap();
        assert_eq!(bounds.min(), Coord { x: 0.0, y: 0.0 });
        assert_eq!(bounds.max(), Coord { x: 6.0, y: 6.0 });
    }
}
