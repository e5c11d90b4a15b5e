mod build;
mod ids;
mod layer;
mod level;
mod map;
mod search;
mod subject;
mod unit;

pub use build::MapBuilder;
pub use ids::{LevelId, SubjectId, UnitId};
pub use layer::MapLayer;
pub use level::GeoLevel;
pub use map::Map;
pub use subject::Subject;
pub use unit::{GeoUnit, UnitRef};
