mod geom;
mod shape;

pub(crate) use geom::Geometries;
pub use shape::{Shape, DEFAULT_EPSG};
