//! Reference-data ingest, organized by format.
//!
//! - `geojson` - unit boundaries and level assignments
//! - `csv` - per-unit characteristic tables

pub(crate) mod csv;
pub(crate) mod geojson;

pub use csv::{read_characteristics_csv, read_characteristics_csv_str, UNIT_ID_COLUMN};
pub use geojson::{read_units_geojson, read_units_geojson_bytes, UnitRecord};
