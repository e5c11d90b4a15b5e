use std::{fs, path::Path};

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

use crate::geom::DEFAULT_EPSG;
use crate::map::LevelId;

/// Settings consumed by the geo index and the edit engine.
///
/// Every field has a default, so `{}` is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// The finest geo level; exact membership tests use representative points here.
    pub base_level: LevelId,
    /// Maximum number of districts per plan, not counting the unassigned pool.
    pub max_districts: u32,
    /// Simplification tolerance in planar units. Zero disables simplification.
    pub simplify_tolerance: f64,
    /// Spatial reference of all reference geometry.
    pub epsg: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_level: LevelId(1),
            max_districts: 18,
            simplify_tolerance: 100.0,
            epsg: DEFAULT_EPSG,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .context("[config] Failed to parse engine configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a configuration file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("[config] Failed to read configuration file: {}", path.display()))?;
        Self::from_json_str(&json)
    }

    /// Check that the settings are usable.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.max_districts >= 1, "[config] max_districts must be at least 1");
        ensure!(
            self.simplify_tolerance.is_finite() && self.simplify_tolerance >= 0.0,
            "[config] simplify_tolerance must be a finite non-negative number, got {}", self.simplify_tolerance
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn empty_object_uses_defaults() {
        let config = EngineConfig::from_json_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.epsg, 3785);
    }

    #[test]
    fn partial_object_overrides_fields() {
        let config = EngineConfig::from_json_str(r#"{"base_level": 3, "max_districts": 5}"#).unwrap();
        assert_eq!(config.base_level, LevelId(3));
        assert_eq!(config.max_districts, 5);
        assert_eq!(config.simplify_tolerance, 100.0);
    }

    #[test]
    fn rejects_zero_districts() {
        let err = EngineConfig::from_json_str(r#"{"max_districts": 0}"#).unwrap_err();
        assert!(err.to_string().contains("max_districts"));
    }

    #[test]
    fn rejects_negative_tolerance() {
        assert!(EngineConfig::from_json_str(r#"{"simplify_tolerance": -1.0}"#).is_err());
    }

    #[test]
    fn reads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"simplify_tolerance": 0.0, "epsg": 4269}}"#).unwrap();

        let config = EngineConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.simplify_tolerance, 0.0);
        assert_eq!(config.epsg, 4269);
    }
}
