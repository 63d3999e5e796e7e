//! GeoJSON reading/writing for barrier polygons and path lines
//!
//! Parsing and serialization go through the `geojson` crate; geometries
//! are converted to `geo_types`. The CRS is taken from the legacy `crs`
//! member when present (`EPSG:xxxx` or `urn:ogc:def:crs:EPSG::xxxx`),
//! otherwise WGS84 as RFC 7946 requires.

use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::vector::{AttributeValue, Feature, FeatureCollection};
use geo_types::Geometry;
use geojson::feature::Id;
use geojson::{GeoJson, JsonObject};
use serde_json::{json, Value};
use std::fs;
use std::path::Path;

/// Read a GeoJSON FeatureCollection from a file
pub fn read_geojson<P: AsRef<Path>>(path: P) -> Result<FeatureCollection> {
    let text = fs::read_to_string(path.as_ref())?;
    read_geojson_str(&text)
}

/// Parse a GeoJSON FeatureCollection (or a single Feature)
pub fn read_geojson_str(text: &str) -> Result<FeatureCollection> {
    let (features, foreign) = match text.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(fc) => (fc.features, fc.foreign_members),
        GeoJson::Feature(mut f) => {
            let foreign = f.foreign_members.take();
            (vec![f], foreign)
        }
        GeoJson::Geometry(_) => {
            return Err(Error::UnsupportedDataType(
                "bare GeoJSON geometry; expected a Feature or FeatureCollection".into(),
            ))
        }
    };

    let crs = foreign.as_ref().and_then(parse_crs).unwrap_or_else(CRS::wgs84);
    let mut collection = FeatureCollection::with_crs(crs);
    for f in features {
        collection.push(from_geojson(f)?);
    }
    Ok(collection)
}

/// Write a FeatureCollection to a GeoJSON file
pub fn write_geojson<P: AsRef<Path>>(collection: &FeatureCollection, path: P) -> Result<()> {
    fs::write(path.as_ref(), write_geojson_string(collection)?)?;
    Ok(())
}

/// Serialize a FeatureCollection as GeoJSON text
pub fn write_geojson_string(collection: &FeatureCollection) -> Result<String> {
    let features = collection.iter().map(to_geojson).collect::<Result<Vec<_>>>()?;

    let foreign_members = collection
        .crs
        .as_ref()
        .and_then(|c| c.epsg())
        .filter(|&code| code != 4326)
        .map(|code| {
            let mut members = JsonObject::new();
            members.insert(
                "crs".into(),
                json!({
                    "type": "name",
                    "properties": { "name": format!("urn:ogc:def:crs:EPSG::{}", code) },
                }),
            );
            members
        });

    let fc = geojson::FeatureCollection {
        bbox: None,
        features,
        foreign_members,
    };
    Ok(serde_json::to_string_pretty(&fc)?)
}

/// EPSG code from the legacy `crs` member
fn parse_crs(members: &JsonObject) -> Option<CRS> {
    let name = members.get("crs")?.pointer("/properties/name")?.as_str()?;
    let code = name.rsplit(':').next()?.parse::<u32>().ok()?;
    Some(CRS::from_epsg(code))
}

fn from_geojson(feature: geojson::Feature) -> Result<Feature> {
    let geometry = feature.geometry.map(Geometry::<f64>::try_from).transpose()?;

    let properties = feature
        .properties
        .unwrap_or_default()
        .into_iter()
        .map(|(k, v)| (k, serde_json::from_value(v).unwrap_or(AttributeValue::Null)))
        .collect();

    let id = feature.id.map(|id| match id {
        Id::String(s) => s,
        Id::Number(n) => n.to_string(),
    });

    Ok(Feature {
        geometry,
        properties,
        id,
    })
}

fn to_geojson(feature: &Feature) -> Result<geojson::Feature> {
    let geometry = feature
        .geometry
        .as_ref()
        .map(|g| geojson::Geometry::new(geojson::Value::from(g)));

    let properties = feature
        .properties
        .iter()
        .map(|(k, v)| -> Result<(String, Value)> { Ok((k.clone(), serde_json::to_value(v)?)) })
        .collect::<Result<JsonObject>>()?;

    Ok(geojson::Feature {
        bbox: None,
        geometry,
        id: feature.id.clone().map(Id::String),
        properties: Some(properties),
        foreign_members: None,
    })
}
