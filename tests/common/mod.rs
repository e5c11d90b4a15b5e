#![allow(dead_code)]

use geo::polygon;
use openmander_edit::{
    EngineConfig, LevelId, Map, MapBuilder, Plan, PlanId, Shape, Subject, SubjectId, UnitId, UserId, DEFAULT_EPSG,
};

pub const COUNTY: LevelId = LevelId(1);
pub const BLOCK: LevelId = LevelId(2);
pub const POPTOT: SubjectId = SubjectId(1);

pub const PLAN: PlanId = PlanId(1);
pub const OWNER: UserId = UserId(1);

pub fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Shape {
    Shape::from_polygon(polygon![
        (x: x0, y: y0), (x: x1, y: y0), (x: x1, y: y1), (x: x0, y: y1), (x: x0, y: y0),
    ], DEFAULT_EPSG)
}

pub fn config() -> EngineConfig {
    EngineConfig { base_level: BLOCK, max_districts: 3, simplify_tolerance: 0.0, ..EngineConfig::default() }
}

/// Three unit blocks in a row with populations 100, 150 and 200.
///
/// ```text
///   +----+----+----+
///   | 1  | 2  | 3  |    blocks
///   +----+----+----+
///   |   10    | 11 |    counties
///   +---------+----+
/// ```
pub fn map() -> Map {
    let mut builder = MapBuilder::new();
    builder
        .add_level(COUNTY, "county", 0)
        .add_level(BLOCK, "block", 1)
        .add_subject(Subject::new(POPTOT, "POPTOT", 0))
        .add_unit(UnitId(10), COUNTY, "West", rect(0.0, 0.0, 2.0, 1.0))
        .add_unit(UnitId(11), COUNTY, "East", rect(2.0, 0.0, 3.0, 1.0));
    for (i, pop) in [100.0, 150.0, 200.0].into_iter().enumerate() {
        let id = UnitId(i as u32 + 1);
        let x = i as f64;
        builder
            .add_unit(id, BLOCK, format!("Block {}", id.0), rect(x, 0.0, x + 1.0, 1.0))
            .set_characteristic(id, POPTOT, pop);
    }
    builder.build(&config()).unwrap()
}

/// A plan whose unassigned district holds all three blocks.
pub fn plan(map: &Map) -> Plan {
    Plan::covering(PLAN, "Test plan", OWNER, map).unwrap()
}

pub fn area(shape: Option<&Shape>) -> f64 {
    shape.map_or(0.0, Shape::area)
}

pub fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}
