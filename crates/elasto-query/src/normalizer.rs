//! Response normalization.
//!
//! Engine responses come back as `{"hits": {"total": .., "hits": [..]}}`
//! for searches and `{"count": ..}` for counts. This module turns them into
//! plain documents, separating aggregation results from the document list.

use elasto_core::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A returned document: the hit's source or projected fields.
pub type Document = Map<String, Value>;

/// Normalized search response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    /// Total matching documents reported by the engine.
    pub total: u64,

    /// Documents in hit order.
    pub documents: Vec<Document>,

    /// Aggregation or facet results, when the query requested any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregations: Option<Map<String, Value>>,
}

impl SearchResults {
    /// Number of returned documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether no documents were returned.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Aggregation (or facet) result by name.
    pub fn aggregation(&self, name: &str) -> Option<&Value> {
        self.aggregations.as_ref()?.get(name)
    }
}

/// Normalize a search response.
///
/// With `projected`, each document is the hit's `fields` object. Without
/// it, the document is `_source`, with any `fields` entries (script fields)
/// merged in. A hit's `sort` values and `highlight` fragments are attached
/// under those keys.
///
/// # Errors
///
/// Returns [`Error::Parse`] when `hits.hits` is missing or not an array.
pub fn normalize_search(body: &Value, projected: bool) -> Result<SearchResults> {
    let hits = body
        .get("hits")
        .and_then(|h| h.get("hits"))
        .and_then(Value::as_array)
        .ok_or_else(|| Error::parse("response has no hits.hits array"))?;

    let documents: Vec<Document> = hits.iter().map(|hit| document(hit, projected)).collect();
    let total = body
        .get("hits")
        .and_then(|h| h.get("total"))
        .and_then(total_value)
        .unwrap_or(documents.len() as u64);

    let aggregations = ["aggregations", "facets"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_object))
        .cloned();

    Ok(SearchResults {
        total,
        documents,
        aggregations,
    })
}

// Engines report `total` as a number or as `{"value": n, "relation": ..}`.
fn total_value(total: &Value) -> Option<u64> {
    total
        .as_u64()
        .or_else(|| total.get("value").and_then(Value::as_u64))
}

fn document(hit: &Value, projected: bool) -> Document {
    let fields = hit.get("fields").and_then(Value::as_object);
    let mut doc = if projected {
        fields.cloned().unwrap_or_default()
    } else {
        let mut doc = hit
            .get("_source")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        if let Some(fields) = fields {
            doc.extend(fields.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        doc
    };

    for key in ["sort", "highlight"] {
        if let Some(value) = hit.get(key) {
            doc.insert(key.to_string(), value.clone());
        }
    }
    doc
}

/// Read the `count` of a count response.
pub fn normalize_count(body: &Value) -> Result<u64> {
    body.get("count")
        .and_then(Value::as_u64)
        .ok_or_else(|| Error::parse("response has no numeric count"))
}

/// Read the `_source` of a get-by-id response.
pub fn normalize_document(body: &Value) -> Result<Document> {
    body.get("_source")
        .and_then(Value::as_object)
        .cloned()
        .ok_or_else(|| Error::parse("response has no _source object"))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(hits: Value) -> Value {
        json!({"took": 1, "hits": {"total": 2, "hits": hits}})
    }

    #[test]
    fn test_source_documents() {
        let body = response(json!([
            {"_id": "1", "_source": {"name": "a", "characters": 10}},
            {"_id": "2", "_source": {"name": "b", "characters": 20}}
        ]));
        let results = normalize_search(&body, false).unwrap();
        assert_eq!(results.total, 2);
        assert_eq!(results.len(), 2);
        assert_eq!(results.documents[1]["name"], "b");
        assert!(results.aggregations.is_none());
    }

    #[test]
    fn test_projected_reads_fields() {
        let body = response(json!([
            {"_id": "1", "_source": {"name": "a", "id": 1, "extra": true},
             "fields": {"name": "a", "id": 1}}
        ]));
        let results = normalize_search(&body, true).unwrap();
        let mut keys: Vec<_> = results.documents[0].keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, vec!["id", "name"]);
    }

    #[test]
    fn test_script_fields_merged_into_source() {
        let body = response(json!([
            {"_source": {"name": "a"}, "fields": {"distance": [1.5]}}
        ]));
        let doc = &normalize_search(&body, false).unwrap().documents[0];
        assert_eq!(doc["name"], "a");
        assert_eq!(doc["distance"], json!([1.5]));
    }

    #[test]
    fn test_sort_and_highlight_attached() {
        let body = response(json!([
            {"_source": {"name": "hat"}, "sort": [2.4],
             "highlight": {"name": ["<strong>ha</strong>t"]}}
        ]));
        let doc = &normalize_search(&body, false).unwrap().documents[0];
        assert_eq!(doc["sort"], json!([2.4]));
        assert_eq!(doc["highlight"]["name"][0], "<strong>ha</strong>t");
    }

    #[test]
    fn test_aggregations_accompany_documents() {
        let mut body = response(json!([{"_source": {"name": "a"}}]));
        body["aggregations"] = json!({"by_category": {"buckets": []}});
        let results = normalize_search(&body, false).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(
            results.aggregation("by_category"),
            Some(&json!({"buckets": []}))
        );
    }

    #[test]
    fn test_legacy_facets() {
        let mut body = response(json!([]));
        body["facets"] = json!({"chars": {"_type": "statistical", "count": 30}});
        let results = normalize_search(&body, false).unwrap();
        assert!(results.is_empty());
        assert_eq!(results.aggregation("chars").unwrap()["count"], 30);
    }

    #[test]
    fn test_total_object_form() {
        let body = json!({"hits": {"total": {"value": 7, "relation": "eq"}, "hits": []}});
        assert_eq!(normalize_search(&body, false).unwrap().total, 7);
    }

    #[test]
    fn test_missing_hits_is_parse_error() {
        let err = normalize_search(&json!({"acknowledged": true}), false).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn test_count() {
        assert_eq!(normalize_count(&json!({"count": 31})).unwrap(), 31);
        assert!(normalize_count(&json!({"count": "many"})).is_err());
    }

    #[test]
    fn test_document() {
        let body = json!({"_id": "abc", "found": true, "_source": {"name": "hat"}});
        assert_eq!(normalize_document(&body).unwrap()["name"], "hat");
        assert!(normalize_document(&json!({"found": false})).is_err());
    }
}
