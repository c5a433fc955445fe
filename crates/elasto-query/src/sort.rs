//! Sort keys.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::geo::{GeoPoint, DISTANCE_UNIT};

/// Sort key that resolves to a geo-distance sort.
pub const DISTANCE_KEY: &str = "distance";

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending.
    #[default]
    Asc,
    /// Descending.
    Desc,
}

impl SortOrder {
    /// Direction as the engine spells it.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// One resolved sort key.
#[derive(Debug, Clone, PartialEq)]
pub enum SortSpec {
    /// Field plus direction.
    FieldOrder {
        /// Field name.
        field: String,
        /// Direction.
        order: SortOrder,
    },
    /// Distance from an origin.
    GeoDistanceOrder {
        /// Geo-point field name.
        field: String,
        /// Origin.
        origin: GeoPoint,
        /// Distance unit.
        unit: String,
        /// Direction.
        order: SortOrder,
    },
    /// A raw sort token such as `_score`.
    Bare {
        /// Token.
        name: String,
    },
}

impl SortSpec {
    /// Render as one entry of the DSL `sort` array.
    pub fn to_json(&self) -> Value {
        match self {
            SortSpec::FieldOrder { field, order } => {
                let mut map = Map::new();
                map.insert(field.clone(), json!({ "order": order.as_str() }));
                Value::Object(map)
            }
            SortSpec::GeoDistanceOrder {
                field,
                origin,
                unit,
                order,
            } => {
                let mut body = Map::new();
                body.insert(field.clone(), origin.to_json());
                body.insert("order".to_string(), json!(order.as_str()));
                body.insert("unit".to_string(), json!(unit));
                json!({ "_geo_distance": body })
            }
            SortSpec::Bare { name } => json!(name),
        }
    }

    pub(crate) fn geo(field: &str, origin: GeoPoint, order: SortOrder) -> Self {
        SortSpec::GeoDistanceOrder {
            field: field.to_string(),
            origin,
            unit: DISTANCE_UNIT.to_string(),
            order,
        }
    }
}

/// Input to `sort`, before coordinates are resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum SortInput {
    /// A bare key; `"distance"` means distance from the stored location.
    Key(String),
    /// Field plus direction.
    Field(String, SortOrder),
    /// Distance, from an inline origin or the stored location.
    Distance {
        /// Inline origin; `None` uses the location set by `near`.
        origin: Option<GeoPoint>,
        /// Direction.
        order: SortOrder,
    },
}

impl From<&str> for SortInput {
    fn from(key: &str) -> Self {
        SortInput::from(key.to_string())
    }
}

impl From<String> for SortInput {
    fn from(key: String) -> Self {
        if key == DISTANCE_KEY {
            SortInput::Distance {
                origin: None,
                order: SortOrder::Asc,
            }
        } else {
            SortInput::Key(key)
        }
    }
}

impl<K: Into<String>> From<(K, SortOrder)> for SortInput {
    fn from((key, order): (K, SortOrder)) -> Self {
        let key = key.into();
        if key == DISTANCE_KEY {
            SortInput::Distance {
                origin: None,
                order,
            }
        } else {
            SortInput::Field(key, order)
        }
    }
}
