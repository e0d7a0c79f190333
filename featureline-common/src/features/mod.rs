/*
This code is part of the FeatureLine Tools geospatial analysis library.
Authors: FeatureLine Tools contributors
Created: 08/09/2026
Last Modified: 29/09/2026
License: MIT
*/

//! Line features as they are handed to, and returned from, the algorithms,
//! together with the `FeatureStore` seam used to load and persist them.

mod geojson;

pub use self::geojson::GeoJsonStore;

use crate::structures::Polyline;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::io::Error;

/// Named attribute values of a single feature.
pub type Attributes = BTreeMap<String, FieldData>;

#[derive(Debug, Clone, PartialEq)]
pub enum FieldData {
    Int(i64),
    Real(f64),
    Text(String),
    Bool(bool),
    Null,
}

impl FieldData {
    pub fn data_type(&self) -> Option<FieldDataType> {
        match self {
            FieldData::Int(_) => Some(FieldDataType::Int),
            FieldData::Real(_) => Some(FieldDataType::Real),
            FieldData::Text(_) => Some(FieldDataType::Text),
            FieldData::Bool(_) => Some(FieldDataType::Bool),
            FieldData::Null => None,
        }
    }

    pub fn from_json(value: &Value) -> FieldData {
        match value {
            Value::Null => FieldData::Null,
            Value::Bool(b) => FieldData::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => FieldData::Int(i),
                None => FieldData::Real(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => FieldData::Text(s.clone()),
            // nested values are kept verbatim as text
            other => FieldData::Text(other.to_string()),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            FieldData::Int(i) => Value::from(*i),
            // serde_json maps non-finite floats to null
            FieldData::Real(r) => Value::from(*r),
            FieldData::Text(s) => Value::from(s.clone()),
            FieldData::Bool(b) => Value::from(*b),
            FieldData::Null => Value::Null,
        }
    }
}

impl From<Option<f64>> for FieldData {
    fn from(value: Option<f64>) -> FieldData {
        match value {
            Some(v) => FieldData::Real(v),
            None => FieldData::Null,
        }
    }
}

impl fmt::Display for FieldData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FieldData::Int(i) => write!(f, "{}", i),
            FieldData::Real(r) => write!(f, "{}", r),
            FieldData::Text(s) => write!(f, "{}", s),
            FieldData::Bool(b) => write!(f, "{}", b),
            FieldData::Null => write!(f, "null"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldDataType {
    Int,
    Real,
    Text,
    Bool,
}

/// One column of an output schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeField {
    pub name: String,
    pub field_type: FieldDataType,
}

impl AttributeField {
    pub fn new(name: &str, field_type: FieldDataType) -> AttributeField {
        AttributeField {
            name: name.to_string(),
            field_type,
        }
    }
}

/// An input line: a stable feature id, its geometry and its attributes.
#[derive(Debug, Clone, Default)]
pub struct LineFeature {
    pub fid: i64,
    pub geometry: Polyline,
    pub attributes: Attributes,
}

impl LineFeature {
    pub fn new(fid: i64, geometry: Polyline) -> LineFeature {
        LineFeature {
            fid,
            geometry,
            attributes: Attributes::new(),
        }
    }

    pub fn with_attribute(mut self, name: &str, value: FieldData) -> LineFeature {
        self.attributes.insert(name.to_string(), value);
        self
    }

    /// The value of a numeric attribute; text holding a number also counts.
    pub fn numeric_attribute(&self, name: &str) -> Option<f64> {
        match self.attributes.get(name)? {
            FieldData::Int(i) => Some(*i as f64),
            FieldData::Real(r) if r.is_finite() => Some(*r),
            FieldData::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            _ => None,
        }
    }
}

/// The lines read from a dataset, along with the number of records that
/// could not be interpreted as lines.
#[derive(Debug, Clone, Default)]
pub struct LineLayer {
    pub features: Vec<LineFeature>,
    pub skipped_records: usize,
}

impl LineLayer {
    /// Names of every attribute found on the layer's features, in sorted order.
    pub fn field_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .features
            .iter()
            .flat_map(|f| f.attributes.keys().cloned())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// The schema of the layer's attributes. A field's type is taken from its
    /// first non-null value; fields that are only ever null become text.
    pub fn fields(&self) -> Vec<AttributeField> {
        self.field_names()
            .iter()
            .map(|name| AttributeField::new(name, self.field_type(name)))
            .collect()
    }

    pub fn field_type(&self, name: &str) -> FieldDataType {
        self.features
            .iter()
            .filter_map(|f| f.attributes.get(name).and_then(|v| v.data_type()))
            .next()
            .unwrap_or(FieldDataType::Text)
    }
}

#[derive(Debug, Clone, Default)]
pub struct OutputFeature {
    pub geometry: Polyline,
    pub attributes: Attributes,
}

/// Output records plus the schema they are written with.
#[derive(Debug, Clone, Default)]
pub struct OutputLayer {
    pub fields: Vec<AttributeField>,
    pub features: Vec<OutputFeature>,
}

/// Loads line datasets and persists output layers.
pub trait FeatureStore {
    fn read_lines(&self, file_name: &str) -> Result<LineLayer, Error>;

    /// Writes `layer`, replacing any existing dataset of the same name only
    /// when `overwrite` is set.
    fn write_layer(&self, file_name: &str, layer: &OutputLayer, overwrite: bool)
        -> Result<(), Error>;
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_data_from_json() {
        assert_eq!(FieldData::from_json(&json!(7)), FieldData::Int(7));
        assert_eq!(FieldData::from_json(&json!(2.5)), FieldData::Real(2.5));
        assert_eq!(
            FieldData::from_json(&json!("Main St")),
            FieldData::Text("Main St".to_string())
        );
        assert_eq!(FieldData::from_json(&json!(null)), FieldData::Null);
        assert_eq!(FieldData::from_json(&json!(true)), FieldData::Bool(true));
    }

    #[test]
    fn test_numeric_attribute() {
        let feature = LineFeature::new(1, Polyline::new_empty(0))
            .with_attribute("WIDTH", FieldData::Int(4))
            .with_attribute("PULL", FieldData::Text(" 2.5".to_string()))
            .with_attribute("NAME", FieldData::Text("Oak".to_string()));
        assert_eq!(feature.numeric_attribute("WIDTH"), Some(4.0));
        assert_eq!(feature.numeric_attribute("PULL"), Some(2.5));
        assert_eq!(feature.numeric_attribute("NAME"), None);
        assert_eq!(feature.numeric_attribute("MISSING"), None);
    }

    #[test]
    fn test_layer_fields() {
        let layer = LineLayer {
            features: vec![
                LineFeature::new(1, Polyline::new_empty(0))
                    .with_attribute("NAME", FieldData::Null)
                    .with_attribute("LANES", FieldData::Int(2)),
                LineFeature::new(2, Polyline::new_empty(1))
                    .with_attribute("NAME", FieldData::Text("Oak".to_string())),
            ],
            skipped_records: 0,
        };
        assert_eq!(
            layer.fields(),
            vec![
                AttributeField::new("LANES", FieldDataType::Int),
                AttributeField::new("NAME", FieldDataType::Text),
            ]
        );
    }
}
