use std::{fs, path::Path};

use anyhow::{anyhow, bail, Context, Result};
use geo::{Coord, Geometry, GeometryCollection, LineString, MultiPolygon, Polygon};
use serde_json::Value;

use crate::geom::Shape;
use crate::map::{LevelId, UnitId};

/// A unit read from a GeoJSON feature: `properties.id`, `properties.level`,
/// optional `properties.name`, and a polygonal geometry.
#[derive(Debug, Clone)]
pub struct UnitRecord {
    pub id: UnitId,
    pub level: LevelId,
    pub name: String,
    pub geom: Shape,
}

/// Read unit boundaries from a GeoJSON FeatureCollection file.
pub fn read_units_geojson(path: &Path, epsg: u32) -> Result<Vec<UnitRecord>> {
    let bytes = fs::read(path)
        .with_context(|| format!("[io::geojson::read] Failed to read GeoJSON file: {}", path.display()))?;
    read_units_geojson_bytes(&bytes, epsg)
        .with_context(|| format!("[io::geojson::read] Invalid GeoJSON in {}", path.display()))
}

/// Read unit boundaries from GeoJSON bytes.
pub fn read_units_geojson_bytes(bytes: &[u8], epsg: u32) -> Result<Vec<UnitRecord>> {
    let value: Value = serde_json::from_slice(bytes).context("[io::geojson::read] Failed to parse GeoJSON bytes")?;
    let features = value["features"].as_array()
        .ok_or_else(|| anyhow!("[io::geojson::read] Expected a FeatureCollection with a 'features' array"))?;

    features.iter().enumerate()
        .map(|(i, feature)| parse_unit(feature).with_context(|| format!("[io::geojson::read] Feature {i}")))
        .map(|unit| unit.map(|(id, level, name, geometry)| UnitRecord { id, level, name, geom: Shape::to_multi_region(geometry, epsg) }))
        .collect()
}

fn parse_unit(feature: &Value) -> Result<(UnitId, LevelId, String, Geometry<f64>)> {
    let properties = &feature["properties"];
    let id = UnitId(parse_u32(&properties["id"]).ok_or_else(|| anyhow!("missing or invalid 'id' property"))?);
    let level = LevelId(parse_u32(&properties["level"]).ok_or_else(|| anyhow!("missing or invalid 'level' property"))?);
    let name = properties["name"].as_str().map(str::to_string).unwrap_or_else(|| id.0.to_string());
    let geometry = parse_geometry(&feature["geometry"])?;
    Ok((id, level, name, geometry))
}

/// Accept ids written either as numbers or as numeric strings.
fn parse_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Parse a GeoJSON geometry object. Non-polygonal members of collections are
/// kept here and dropped when the shape is normalized.
fn parse_geometry(geometry: &Value) -> Result<Geometry<f64>> {
    let coords = &geometry["coordinates"];
    Ok(match geometry["type"].as_str() {
        Some("Polygon") => Geometry::Polygon(parse_polygon(coords)?),
        Some("MultiPolygon") => Geometry::MultiPolygon(MultiPolygon(
            as_array(coords)?.iter().map(parse_polygon).collect::<Result<_>>()?
        )),
        Some("GeometryCollection") => Geometry::GeometryCollection(GeometryCollection(
            as_array(&geometry["geometries"])?.iter().map(parse_geometry).collect::<Result<_>>()?
        )),
        Some("Point" | "MultiPoint" | "LineString" | "MultiLineString") => {
            Geometry::GeometryCollection(GeometryCollection(Vec::new()))
        }
        Some(other) => bail!("unsupported geometry type '{other}'"),
        None => bail!("missing geometry type"),
    })
}

/// Polygon coordinates: `[exterior, hole, hole, ...]`.
fn parse_polygon(coords: &Value) -> Result<Polygon<f64>> {
    let mut rings = as_array(coords)?.iter().map(parse_ring);
    let exterior = rings.next().ok_or_else(|| anyhow!("polygon without exterior ring"))??;
    let interiors = rings.collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(exterior, interiors))
}

/// Ring coordinates: `[[x, y], [x, y], ...]`. Open rings are closed.
fn parse_ring(coords: &Value) -> Result<LineString<f64>> {
    let mut points = as_array(coords)?.iter()
        .map(|pair| {
            let x = pair[0].as_f64().ok_or_else(|| anyhow!("coordinate x must be a number"))?;
            let y = pair[1].as_f64().ok_or_else(|| anyhow!("coordinate y must be a number"))?;
            Ok(Coord { x, y })
        })
        .collect::<Result<Vec<_>>>()?;

    if let (Some(&first), Some(&last)) = (points.first(), points.last()) {
        if first != last {
            points.push(first);
        }
    }
    Ok(LineString(points))
}

fn as_array(value: &Value) -> Result<&Vec<Value>> {
    value.as_array().ok_or_else(|| anyhow!("expected a coordinate array"))
}
