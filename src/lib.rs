#![doc = "OpenMander boundary editing: versioned district plans over a hierarchical geo index"]
mod config;
mod error;
mod geom;
mod io;
mod map;
mod objective;
mod plan;
mod workspace;

#[doc(inline)]
pub use config::EngineConfig;

#[doc(inline)]
pub use error::EditError;

#[doc(inline)]
pub use geom::{Shape, DEFAULT_EPSG};

#[doc(inline)]
pub use io::{read_characteristics_csv, read_characteristics_csv_str, read_units_geojson, read_units_geojson_bytes, UnitRecord, UNIT_ID_COLUMN};

#[doc(inline)]
pub use map::{GeoLevel, GeoUnit, LevelId, Map, MapBuilder, MapLayer, Subject, SubjectId, UnitId, UnitRef};

#[doc(inline)]
pub use objective::{Argument, Calculator, Score, Scope};

#[doc(inline)]
pub use plan::{District, DistrictFeature, DistrictId, DistrictStore, Plan, PlanId, SnapshotId, StagedEdit, User, UserId};

#[doc(inline)]
pub use workspace::Workspace;
