//! Aggregations, legacy facets, and script fields.
//!
//! The same [`Aggregation`] request renders in two dialects: the
//! `aggregations` block of current engines and the `facets` block of older
//! ones. Which one a query uses is chosen by calling `aggregate` or `facet`.

use serde_json::{json, Map, Value};

use crate::geo::GeoPoint;

/// A named bucket or metric request.
#[derive(Debug, Clone, PartialEq)]
pub enum Aggregation {
    /// Most frequent values of a field.
    Terms {
        /// Field name.
        field: String,
        /// Number of buckets, engine default when unset.
        size: Option<u32>,
    },
    /// Count/min/max/avg/sum of a numeric field.
    Stats {
        /// Field name.
        field: String,
    },
    /// Fixed-width buckets over a numeric field.
    Histogram {
        /// Field name.
        field: String,
        /// Bucket width.
        interval: f64,
    },
    /// Passed through unchanged.
    Raw(Value),
}

impl Aggregation {
    /// Terms buckets on `field`.
    pub fn terms(field: impl Into<String>) -> Self {
        Aggregation::Terms {
            field: field.into(),
            size: None,
        }
    }

    /// Stats on `field`.
    pub fn stats(field: impl Into<String>) -> Self {
        Aggregation::Stats {
            field: field.into(),
        }
    }

    /// Histogram on `field`.
    pub fn histogram(field: impl Into<String>, interval: f64) -> Self {
        Aggregation::Histogram {
            field: field.into(),
            interval,
        }
    }

    /// Limit the number of buckets of a terms request.
    pub fn with_size(self, size: u32) -> Self {
        match self {
            Aggregation::Terms { field, .. } => Aggregation::Terms {
                field,
                size: Some(size),
            },
            other => other,
        }
    }

    /// Render for the `aggregations` block.
    pub fn to_aggregation_json(&self) -> Value {
        match self {
            Aggregation::Terms { field, size } => json!({ "terms": terms_body(field, *size) }),
            Aggregation::Stats { field } => json!({ "stats": { "field": field } }),
            Aggregation::Histogram { field, interval } => {
                json!({ "histogram": { "field": field, "interval": interval } })
            }
            Aggregation::Raw(value) => value.clone(),
        }
    }

    /// Render for the legacy `facets` block.
    pub fn to_facet_json(&self) -> Value {
        match self {
            Aggregation::Terms { field, size } => json!({ "terms": terms_body(field, *size) }),
            Aggregation::Stats { field } => json!({ "statistical": { "field": field } }),
            Aggregation::Histogram { field, interval } => {
                json!({ "histogram": { "field": field, "interval": interval } })
            }
            Aggregation::Raw(value) => value.clone(),
        }
    }
}

fn terms_body(field: &str, size: Option<u32>) -> Value {
    let mut body = Map::new();
    body.insert("field".to_string(), json!(field));
    if let Some(size) = size {
        body.insert("size".to_string(), json!(size));
    }
    Value::Object(body)
}

/// A computed field returned alongside each hit.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptField {
    /// Script source.
    pub script: String,
    /// Script parameters.
    pub params: Map<String, Value>,
    /// Script language, engine default when unset.
    pub lang: Option<String>,
}

impl ScriptField {
    /// Script without parameters.
    pub fn new(script: impl Into<String>) -> Self {
        Self {
            script: script.into(),
            params: Map::new(),
            lang: None,
        }
    }

    /// Add a parameter.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Set the script language.
    pub fn lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    /// Arc distance in miles between `geo_field` and `origin`.
    pub fn arc_distance(geo_field: &str, origin: GeoPoint) -> Self {
        Self::new(format!(
            "doc['{geo_field}'].arcDistanceInMiles(lat, lon)"
        ))
        .param("lat", origin.lat)
        .param("lon", origin.lon)
    }

    /// Render for the `script_fields` block.
    pub fn to_json(&self) -> Value {
        let mut body = Map::new();
        body.insert("script".to_string(), json!(self.script));
        if !self.params.is_empty() {
            body.insert("params".to_string(), Value::Object(self.params.clone()));
        }
        if let Some(lang) = &self.lang {
            body.insert("lang".to_string(), json!(lang));
        }
        Value::Object(body)
    }
}
