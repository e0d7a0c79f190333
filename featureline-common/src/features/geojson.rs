/*
This code is part of the FeatureLine Tools geospatial analysis library.
Authors: FeatureLine Tools contributors
Created: 08/09/2026
Last Modified: 29/09/2026
License: MIT
*/

use super::{Attributes, FeatureStore, FieldData, LineFeature, LineLayer, OutputLayer};
use crate::structures::{Point2D, Polyline};
use serde_json::{json, Map, Value};
use std::fs;
use std::io::{Error, ErrorKind};
use std::path::Path;

/// Reads and writes GeoJSON `FeatureCollection`s of `LineString` features.
///
/// A feature's id is its integer `id` member when present, otherwise its
/// 1-based position in the collection. Features whose geometry is missing,
/// is not a line, or is a multi-part line are skipped and counted.
#[derive(Default, Debug, Clone, Copy)]
pub struct GeoJsonStore;

impl GeoJsonStore {
    pub fn new() -> GeoJsonStore {
        GeoJsonStore
    }

    pub fn parse_lines(&self, contents: &str) -> Result<LineLayer, Error> {
        let doc: Value = serde_json::from_str(contents)
            .map_err(|e| Error::new(ErrorKind::InvalidData, e.to_string()))?;
        let features = match doc.get("features").and_then(|f| f.as_array()) {
            Some(features) => features,
            None => {
                return Err(Error::new(
                    ErrorKind::InvalidData,
                    "The input is not a GeoJSON FeatureCollection.",
                ))
            }
        };

        let mut layer = LineLayer::default();
        for (record_num, feature) in features.iter().enumerate() {
            let vertices = match feature.get("geometry").and_then(parse_line_string) {
                Some(vertices) => vertices,
                None => {
                    layer.skipped_records += 1;
                    continue;
                }
            };
            let fid = feature
                .get("id")
                .and_then(|id| id.as_i64())
                .unwrap_or(record_num as i64 + 1);
            let mut attributes = Attributes::new();
            if let Some(properties) = feature.get("properties").and_then(|p| p.as_object()) {
                for (name, value) in properties {
                    attributes.insert(name.clone(), FieldData::from_json(value));
                }
            }
            let index = layer.features.len();
            layer.features.push(LineFeature {
                fid,
                geometry: Polyline::new(&vertices, index),
                attributes,
            });
        }
        Ok(layer)
    }

    pub fn to_geojson(&self, layer: &OutputLayer) -> Value {
        let features: Vec<Value> = layer
            .features
            .iter()
            .enumerate()
            .map(|(i, feature)| {
                let mut properties = Map::new();
                for field in &layer.fields {
                    let value = feature
                        .attributes
                        .get(&field.name)
                        .map(|v| v.to_json())
                        .unwrap_or(Value::Null);
                    properties.insert(field.name.clone(), value);
                }
                let coordinates: Vec<Value> = feature
                    .geometry
                    .vertices
                    .iter()
                    .map(|p| json!([p.x, p.y]))
                    .collect();
                json!({
                    "type": "Feature",
                    "id": i + 1,
                    "geometry": { "type": "LineString", "coordinates": coordinates },
                    "properties": Value::Object(properties),
                })
            })
            .collect();
        json!({ "type": "FeatureCollection", "features": features })
    }
}

impl FeatureStore for GeoJsonStore {
    fn read_lines(&self, file_name: &str) -> Result<LineLayer, Error> {
        let contents = fs::read_to_string(file_name)?;
        self.parse_lines(&contents)
    }

    fn write_layer(
        &self,
        file_name: &str,
        layer: &OutputLayer,
        overwrite: bool,
    ) -> Result<(), Error> {
        if !overwrite && Path::new(file_name).exists() {
            return Err(Error::new(
                ErrorKind::AlreadyExists,
                format!(
                    "The output file {} already exists and overwriting is disabled.",
                    file_name
                ),
            ));
        }
        let contents = serde_json::to_string_pretty(&self.to_geojson(layer))
            .map_err(|e| Error::new(ErrorKind::InvalidData, e.to_string()))?;
        fs::write(file_name, contents)
    }
}

fn parse_line_string(geometry: &Value) -> Option<Vec<Point2D>> {
    let coordinates = match geometry.get("type")?.as_str()? {
        "LineString" => geometry.get("coordinates")?.as_array()?,
        "MultiLineString" => {
            let parts = geometry.get("coordinates")?.as_array()?;
            if parts.len() != 1 {
                return None;
            }
            parts[0].as_array()?
        }
        _ => return None,
    };
    let mut vertices = Vec::with_capacity(coordinates.len());
    for c in coordinates {
        let c = c.as_array()?;
        if c.len() < 2 {
            return None;
        }
        vertices.push(Point2D::new(c[0].as_f64()?, c[1].as_f64()?));
    }
    if vertices.is_empty() {
        return None;
    }
    Some(vertices)
}
