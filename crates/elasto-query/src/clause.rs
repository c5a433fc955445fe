//! Filter clauses and their DSL rendering.

use serde_json::{json, Map, Value};

use crate::geo::{format_miles, GeoPoint};

/// One atomic filter predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    /// Exact match on one field.
    Term {
        /// Field name.
        field: String,
        /// Value the field must equal.
        value: Value,
    },
    /// Membership: the field equals any of the values.
    Terms {
        /// Field name.
        field: String,
        /// Accepted values.
        values: Vec<Value>,
    },
    /// Inclusive range on one field.
    Range {
        /// Field name.
        field: String,
        /// Lower bound (inclusive).
        gte: Value,
        /// Upper bound (inclusive).
        lte: Value,
    },
    /// Within a radius of an origin.
    GeoDistance {
        /// Geo-point field name.
        field: String,
        /// Origin.
        origin: GeoPoint,
        /// Radius in miles.
        radius_miles: f64,
    },
    /// Within a ring around an origin.
    GeoDistanceRange {
        /// Geo-point field name.
        field: String,
        /// Origin.
        origin: GeoPoint,
        /// Inner radius in miles.
        from_miles: f64,
        /// Outer radius in miles.
        to_miles: f64,
    },
}

impl Clause {
    /// `Terms` when `value` is an array, `Term` otherwise.
    pub fn matching(field: impl Into<String>, value: Value) -> Self {
        let field = field.into();
        match value {
            Value::Array(values) => Clause::Terms { field, values },
            value => Clause::Term { field, value },
        }
    }

    /// Field the clause constrains.
    pub fn field(&self) -> &str {
        match self {
            Clause::Term { field, .. }
            | Clause::Terms { field, .. }
            | Clause::Range { field, .. }
            | Clause::GeoDistance { field, .. }
            | Clause::GeoDistanceRange { field, .. } => field,
        }
    }

    /// Render as a query-DSL filter object.
    pub fn to_json(&self) -> Value {
        match self {
            Clause::Term { field, value } => json!({ "term": single(field, value.clone()) }),
            Clause::Terms { field, values } => {
                json!({ "terms": single(field, Value::Array(values.clone())) })
            }
            Clause::Range { field, gte, lte } => {
                json!({ "range": single(field, json!({ "gte": gte, "lte": lte })) })
            }
            Clause::GeoDistance {
                field,
                origin,
                radius_miles,
            } => {
                let mut body = single(field, origin.to_json());
                body.insert("distance".to_string(), json!(format_miles(*radius_miles)));
                json!({ "geo_distance": body })
            }
            Clause::GeoDistanceRange {
                field,
                origin,
                from_miles,
                to_miles,
            } => {
                let mut body = single(field, origin.to_json());
                body.insert("from".to_string(), json!(format_miles(*from_miles)));
                body.insert("to".to_string(), json!(format_miles(*to_miles)));
                json!({ "geo_distance_range": body })
            }
        }
    }
}

fn single(key: &str, value: Value) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert(key.to_string(), value);
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    fn london() -> GeoPoint {
        GeoPoint::new(51.5, -0.15).unwrap()
    }

    #[test]
    fn test_matching_dispatch() {
        assert!(matches!(
            Clause::matching("tag", json!("a")),
            Clause::Term { .. }
        ));
        assert!(matches!(
            Clause::matching("tag", json!(["a", "b"])),
            Clause::Terms { .. }
        ));
    }

    #[test]
    fn test_term_json() {
        let clause = Clause::matching("name", json!("hat"));
        assert_eq!(clause.to_json(), json!({"term": {"name": "hat"}}));
        assert_eq!(clause.field(), "name");
    }

    #[test]
    fn test_terms_json() {
        let clause = Clause::matching("tag", json!(["a", "b"]));
        assert_eq!(clause.to_json(), json!({"terms": {"tag": ["a", "b"]}}));
    }

    #[test]
    fn test_range_json() {
        let clause = Clause::Range {
            field: "price".to_string(),
            gte: json!(100),
            lte: json!(200),
        };
        assert_eq!(
            clause.to_json(),
            json!({"range": {"price": {"gte": 100, "lte": 200}}})
        );
    }

    #[test]
    fn test_geo_distance_json() {
        let clause = Clause::GeoDistance {
            field: "location".to_string(),
            origin: london(),
            radius_miles: 5.0,
        };
        assert_eq!(
            clause.to_json(),
            json!({"geo_distance": {
                "distance": "5mi",
                "location": {"lat": 51.5, "lon": -0.15}
            }})
        );
    }

    #[test]
    fn test_geo_distance_range_json() {
        let clause = Clause::GeoDistanceRange {
            field: "location".to_string(),
            origin: london(),
            from_miles: 0.0,
            to_miles: 100.0,
        };
        assert_eq!(
            clause.to_json(),
            json!({"geo_distance_range": {
                "from": "0mi",
                "to": "100mi",
                "location": {"lat": 51.5, "lon": -0.15}
            }})
        );
    }
}
