use ahash::{AHashMap, AHashSet};
use anyhow::{anyhow, bail, ensure, Result};
use tracing::info;

use crate::config::EngineConfig;
use crate::geom::{Geometries, Shape};
use crate::io::UnitRecord;
use crate::map::{GeoLevel, GeoUnit, LevelId, Map, MapLayer, Subject, SubjectId, UnitId};

/// Collects reference data (levels, subjects, units, characteristics) and
/// builds the read-only `Map`.
#[derive(Debug, Default)]
pub struct MapBuilder {
    levels: Vec<GeoLevel>,
    subjects: Vec<Subject>,
    units: Vec<(UnitId, LevelId, String, Shape)>,
    characteristics: Vec<(UnitId, SubjectId, f64)>,
}

impl MapBuilder {
    pub fn new() -> Self { Self::default() }

    /// Register a geo level. Lower ranks are coarser.
    pub fn add_level(&mut self, id: LevelId, name: impl Into<String>, rank: u32) -> &mut Self {
        self.levels.push(GeoLevel::new(id, name, rank));
        self
    }

    /// Register a subject.
    pub fn add_subject(&mut self, subject: Subject) -> &mut Self {
        self.subjects.push(subject);
        self
    }

    /// Register a unit with its full-detail geometry.
    pub fn add_unit(&mut self, id: UnitId, level: LevelId, name: impl Into<String>, geom: Shape) -> &mut Self {
        self.units.push((id, level, name.into(), geom));
        self
    }

    /// Register units read by `read_units_geojson`.
    pub fn add_unit_records(&mut self, records: impl IntoIterator<Item = UnitRecord>) -> &mut Self {
        for UnitRecord { id, level, name, geom } in records {
            self.units.push((id, level, name, geom));
        }
        self
    }

    /// Set the value of a subject for a base unit.
    pub fn set_characteristic(&mut self, unit: UnitId, subject: SubjectId, value: f64) -> &mut Self {
        self.characteristics.push((unit, subject, value));
        self
    }

    /// Set characteristics from `(unit, subject name, value)` records, as
    /// produced by `read_characteristics_csv`.
    pub fn add_characteristics(&mut self, records: impl IntoIterator<Item = (UnitId, String, f64)>) -> Result<&mut Self> {
        for (unit, name, value) in records {
            let subject = self.subjects.iter()
                .find(|subject| subject.name == name)
                .map(|subject| subject.id)
                .ok_or_else(|| anyhow!("[map::build] Unknown subject '{name}' for {unit}"))?;
            self.characteristics.push((unit, subject, value));
        }
        Ok(self)
    }

    /// Validate the reference data and build the index.
    pub fn build(self, config: &EngineConfig) -> Result<Map> {
        config.validate()?;
        let Self { mut levels, mut subjects, units, characteristics } = self;

        // Levels: unique ids and ranks, base level is the finest.
        ensure!(!levels.is_empty(), "[map::build] At least one geo level is required");
        levels.sort_by_key(|level| level.rank);
        for pair in levels.windows(2) {
            ensure!(pair[0].rank != pair[1].rank, "[map::build] Levels {} and {} share rank {}", pair[0].id, pair[1].id, pair[0].rank);
        }
        let mut level_ids = AHashSet::new();
        for level in &levels {
            ensure!(level_ids.insert(level.id), "[map::build] Duplicate level {}", level.id);
        }
        let base = levels.last().map(|level| level.id).ok_or_else(|| anyhow!("[map::build] No levels"))?;
        ensure!(
            base == config.base_level,
            "[map::build] Configured base level {} is not the finest level (finest is {})", config.base_level, base
        );

        // Subjects: unique ids, ordered by sort key.
        let mut subject_ids = AHashSet::new();
        for subject in &subjects {
            ensure!(subject_ids.insert(subject.id), "[map::build] Duplicate subject {}", subject.id);
        }
        subjects.sort_by_key(|subject| (subject.sort_key, subject.id));

        // Units: unique ids, known level, matching spatial reference, usable geometry.
        let level_pos = levels.iter().enumerate().map(|(i, level)| (level.id, i)).collect::<AHashMap<_, _>>();
        let mut per_level: Vec<Vec<(UnitId, String, Shape)>> = vec![Vec::new(); levels.len()];
        let mut unit_ids = AHashSet::new();
        for (id, level, name, geom) in units {
            ensure!(unit_ids.insert(id), "[map::build] Duplicate unit {id}");
            let &pos = level_pos.get(&level)
                .ok_or_else(|| anyhow!("[map::build] Unit {id} references unknown level {level}"))?;
            ensure!(geom.epsg() == config.epsg, "[map::build] Unit {id} has EPSG {} but the index uses {}", geom.epsg(), config.epsg);
            ensure!(!geom.is_empty(), "[map::build] Unit {id} has no polygonal geometry");
            per_level[pos].push((id, name, geom));
        }

        // Characteristics: base units only, known subjects.
        let base_pos = levels.len() - 1;
        let base_ids = per_level[base_pos].iter().map(|(id, _, _)| *id).collect::<AHashSet<_>>();
        let mut values: AHashMap<UnitId, AHashMap<SubjectId, f64>> = AHashMap::new();
        for (unit, subject, value) in characteristics {
            ensure!(base_ids.contains(&unit), "[map::build] Characteristic for {unit}, which is not a base unit");
            ensure!(subject_ids.contains(&subject), "[map::build] Characteristic references unknown subject {subject}");
            ensure!(value.is_finite(), "[map::build] Characteristic {subject} of {unit} is not finite");
            values.entry(unit).or_default().insert(subject, value);
        }

        // Derive simplified geometry and representative points, level by level.
        let mut layers = Vec::with_capacity(levels.len());
        for (pos, (level, mut units)) in levels.into_iter().zip(per_level).enumerate() {
            units.sort_by_key(|(id, _, _)| *id);
            let mut entities = Vec::with_capacity(units.len());
            let mut geoms = Vec::with_capacity(units.len());
            for (id, name, geom) in units {
                let Some(point) = geom.representative_point() else {
                    bail!("[map::build] Unit {id} has no interior point (degenerate geometry)");
                };
                entities.push(GeoUnit {
                    id,
                    level: level.id,
                    name,
                    simple: geom.simplify(config.simplify_tolerance),
                    point,
                    characteristics: if pos == base_pos { values.remove(&id).unwrap_or_default() } else { AHashMap::new() },
                    base_units: Vec::new(),
                });
                geoms.push(geom);
            }
            layers.push(MapLayer::new(level, pos == base_pos, entities, Geometries::new(geoms)));
        }

        // Place every base unit under the coarse unit containing its representative point.
        let (coarse, base) = layers.split_at_mut(base_pos);
        let base = &base[0];
        for layer in coarse.iter_mut() {
            for base_unit in base.units() {
                let parent = layer.geoms.query_point(&base_unit.point)
                    .find(|&idx| layer.geoms.get(idx).intersects_point(&base_unit.point));
                let Some(parent) = parent else { continue };
                let entity = &mut layer.entities[parent];
                entity.base_units.push(base_unit.id);
                for (&subject, &value) in &base_unit.characteristics {
                    *entity.characteristics.entry(subject).or_insert(0.0) += value;
                }
            }
        }

        let lookup = layers.iter().enumerate()
            .flat_map(|(l, layer)| layer.unit_ids().iter().enumerate().map(move |(i, &id)| (id, (l as u32, i as u32))))
            .collect::<AHashMap<_, _>>();
        let level_index = layers.iter().enumerate()
            .map(|(i, layer)| (layer.level().id, i))
            .collect::<AHashMap<_, _>>();

        info!(levels = layers.len(), units = lookup.len(), subjects = subjects.len(), "built geo index");

        Ok(Map {
            epsg: config.epsg,
            simplify_tolerance: config.simplify_tolerance,
            layers,
            subjects,
            levels: level_index,
            lookup,
        })
    }
}
