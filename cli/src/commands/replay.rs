use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use openmander_edit::{
    read_characteristics_csv, read_units_geojson, DistrictId, EngineConfig, GeoLevel, LevelId, Map, MapBuilder, Plan,
    PlanId, Subject, SubjectId, UnitId, UnitRecord, UserId,
};
use serde::Deserialize;
use tracing::{debug, info};

const REPLAY_PLAN: PlanId = PlanId(1);
const REPLAY_OWNER: UserId = UserId(0);

/// An edit script: the geo levels of the unit file, the districts to create
/// (in id order, starting at 1) and the edits to apply.
#[derive(Debug, Deserialize)]
pub struct Script {
    pub levels: Vec<GeoLevel>,
    #[serde(default)]
    pub districts: Vec<String>,
    #[serde(default)]
    pub edits: Vec<ScriptEdit>,
}

#[derive(Debug, Deserialize)]
pub struct ScriptEdit {
    pub district: DistrictId,
    pub units: Vec<UnitId>,
    pub level: LevelId,
    /// Version to edit against; the plan's current version when absent.
    pub version: Option<u32>,
}

impl Script {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("[commands::replay] Failed to parse edit script")
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("[commands::replay] Failed to read edit script: {}", path.display()))?;
        Self::from_json_str(&json)
    }
}

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::ReplayArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    };
    let script = Script::from_json_file(&args.script)?;

    info!(path = %args.units.display(), "loading units");
    let units = read_units_geojson(&args.units, config.epsg)?;
    info!(path = %args.stats.display(), "loading characteristics");
    let characteristics = read_characteristics_csv(&args.stats)?;
    let map = build_map(units, characteristics, &script.levels, &config)?;

    let plan = replay(&map, &config, &script)?;
    let Some(subject) = map.subject_by_name(&args.subject) else {
        bail!("[commands::replay] Unknown subject '{}'", args.subject);
    };

    let feed = plan.district_feed(plan.version(), subject.id);
    let json = serde_json::to_string_pretty(&feed).context("[commands::replay] Failed to serialize district feed")?;
    match &args.output {
        Some(path) => {
            info!(path = %path.display(), districts = feed.len(), "writing feed");
            fs::write(path, json)
                .with_context(|| format!("[commands::replay] Failed to write feed to {}", path.display()))?;
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// Assemble the geo index. Subjects are the characteristic columns, numbered
/// from 1 in column order.
pub fn build_map(
    units: Vec<UnitRecord>,
    characteristics: Vec<(UnitId, String, f64)>,
    levels: &[GeoLevel],
    config: &EngineConfig,
) -> Result<Map> {
    let mut names = Vec::<&str>::new();
    for (_, name, _) in &characteristics {
        if !names.contains(&name.as_str()) {
            names.push(name);
        }
    }

    let mut builder = MapBuilder::new();
    for level in levels {
        builder.add_level(level.id, level.name.clone(), level.rank);
    }
    for (i, name) in names.iter().enumerate() {
        builder.add_subject(Subject::new(SubjectId(i as u32 + 1), *name, i as u32));
    }
    builder.add_unit_records(units);
    builder.add_characteristics(characteristics.iter().cloned())?;
    builder.build(config)
}

/// Create a plan covering the map and apply the script to it.
pub fn replay(map: &Map, config: &EngineConfig, script: &Script) -> Result<Plan> {
    let mut plan = Plan::covering(REPLAY_PLAN, "Replay", REPLAY_OWNER, map)?;
    for name in &script.districts {
        let id = plan.create_district(name.clone(), config)
            .with_context(|| format!("[commands::replay] Failed to create district '{name}'"))?;
        debug!(district = %id, name = %name, "created district");
    }

    for (i, edit) in script.edits.iter().enumerate() {
        let version = edit.version.unwrap_or(plan.version());
        let affected = plan.add_units(map, edit.district, &edit.units, edit.level, version)
            .with_context(|| format!("[commands::replay] Edit {} failed", i + 1))?;
        info!(edit = i + 1, district = %edit.district, version = plan.version(), affected, "applied edit");
    }
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use openmander_edit::read_units_geojson_bytes;

    use super::*;

    const UNITS: &str = r#"{"type": "FeatureCollection", "features": [
        {"type": "Feature", "properties": {"id": 10, "level": 1},
         "geometry": {"type": "Polygon", "coordinates": [[[0,0],[2,0],[2,1],[0,1],[0,0]]]}},
        {"type": "Feature", "properties": {"id": 1, "level": 2},
         "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,1],[0,0]]]}},
        {"type": "Feature", "properties": {"id": 2, "level": 2},
         "geometry": {"type": "Polygon", "coordinates": [[[1,0],[2,0],[2,1],[1,1],[1,0]]]}}
    ]}"#;

    const SCRIPT: &str = r#"{
        "levels": [{"id": 1, "name": "county", "rank": 0}, {"id": 2, "name": "block", "rank": 1}],
        "districts": ["North", "South"],
        "edits": [
            {"district": 1, "units": [10], "level": 1, "version": 0},
            {"district": 2, "units": [2], "level": 2}
        ]
    }"#;

    fn fixture() -> (Map, EngineConfig, Script) {
        let config = EngineConfig::from_json_str(r#"{"base_level": 2, "simplify_tolerance": 0.0}"#).unwrap();
        let units = read_units_geojson_bytes(UNITS.as_bytes(), config.epsg).unwrap();
        let characteristics = vec![
            (UnitId(1), "POPTOT".to_string(), 10.0),
            (UnitId(2), "POPTOT".to_string(), 20.0),
            (UnitId(2), "VAP".to_string(), 15.0),
        ];
        let script = Script::from_json_str(SCRIPT).unwrap();
        let map = build_map(units, characteristics, &script.levels, &config).unwrap();
        (map, config, script)
    }

    #[test]
    fn subjects_follow_column_order() {
        let (map, _, _) = fixture();
        let names = map.subjects().iter().map(|s| (s.id, s.name.as_str())).collect::<Vec<_>>();
        assert_eq!(names, vec![(SubjectId(1), "POPTOT"), (SubjectId(2), "VAP")]);
    }

    #[test]
    fn replays_edits_in_order() {
        let (map, config, script) = fixture();
        let plan = replay(&map, &config, &script).unwrap();
        assert_eq!(plan.version(), 2);

        let feed = plan.district_feed(2, SubjectId(1));
        let rows = feed.iter().map(|f| (f.district_id, f.number)).collect::<Vec<_>>();
        assert_eq!(rows, vec![(DistrictId::UNASSIGNED, 0.0), (DistrictId(1), 10.0), (DistrictId(2), 20.0)]);
    }

    #[test]
    fn failing_edit_names_its_position() {
        let (map, config, _) = fixture();
        let script = Script::from_json_str(r#"{"levels": [], "districts": ["A"],
            "edits": [{"district": 1, "units": [1], "level": 2, "version": 4}]}"#).unwrap();
        let err = replay(&map, &config, &script).unwrap_err();
        assert!(err.to_string().contains("Edit 1"));
    }
}
