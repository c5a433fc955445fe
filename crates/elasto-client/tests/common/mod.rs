//! Shared harness for client integration tests.
//!
//! [`FakeEngine`] is an in-memory [`Transport`] that stores documents and
//! evaluates the subset of the query DSL the builder emits, so tests can
//! check behavior end to end rather than the shape of compiled bodies.

#![allow(dead_code)]

use std::cmp::Ordering;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use elasto_client::Elasto;
use elasto_core::{ElastoConfig, Method, Request, Response, Result, Transport};
use serde_json::{json, Map, Value};

const EARTH_RADIUS_MILES: f64 = 3958.8;
const DEFAULT_WINDOW: usize = 10;

#[derive(Debug, Clone)]
struct Stored {
    index: String,
    doc_type: String,
    id: String,
    version: u64,
    source: Map<String, Value>,
}

/// In-memory engine evaluating compiled query documents.
#[derive(Debug, Default)]
pub struct FakeEngine {
    docs: Mutex<Vec<Stored>>,
    requests: Mutex<Vec<Request>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a document directly, bypassing the client.
    pub fn insert(&self, index: &str, doc_type: &str, id: &str, source: Value) {
        let source = source.as_object().cloned().unwrap_or_default();
        self.docs.lock().unwrap().push(Stored {
            index: index.to_string(),
            doc_type: doc_type.to_string(),
            id: id.to_string(),
            version: 1,
            source,
        });
    }

    pub fn len(&self) -> usize {
        self.docs.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    fn handle(&self, request: &Request) -> (u16, Value) {
        let path = request.path.split('?').next().unwrap_or("");
        let segments: Vec<&str> = path.split('/').collect();
        let body = request.body.clone().unwrap_or(Value::Null);

        match (request.method, segments.as_slice()) {
            (Method::Post, [index, rest @ .., "_search"]) => {
                (200, self.search(index, rest.first().copied(), &body))
            }
            (Method::Post, [index, rest @ .., "_count"]) => {
                let count = self.matching(index, rest.first().copied(), &body["query"]).len();
                (200, json!({ "count": count }))
            }
            (Method::Delete, [index, rest @ .., "_query"]) => {
                (200, self.delete_by_query(index, rest.first().copied(), &body["query"]))
            }
            (Method::Get, [index, doc_type, id]) => self.get(index, Some(*doc_type), id),
            (Method::Get, [index, id]) => self.get(index, None, id),
            (Method::Put, [index, doc_type, id]) => self.put(index, doc_type, id, body),
            (Method::Put, [index, id]) => self.put(index, "_doc", id, body),
            _ => (400, json!({ "error": format!("unsupported request {request}") })),
        }
    }

    fn scoped(&self, index: &str, doc_type: Option<&str>) -> Vec<Stored> {
        self.docs
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.index == index && doc_type.is_none_or(|t| d.doc_type == t))
            .cloned()
            .collect()
    }

    fn matching(&self, index: &str, doc_type: Option<&str>, query: &Value) -> Vec<Stored> {
        self.scoped(index, doc_type)
            .into_iter()
            .filter(|d| matches_query(query, &d.source))
            .collect()
    }

    fn search(&self, index: &str, doc_type: Option<&str>, body: &Value) -> Value {
        let matched = self.matching(index, doc_type, &body["query"]);
        let total = matched.len();
        let sort = body["sort"].as_array().cloned().unwrap_or_default();

        let mut hits: Vec<(Vec<Value>, Stored)> = matched
            .into_iter()
            .map(|d| (sort.iter().map(|s| sort_value(s, &d.source)).collect(), d))
            .collect();
        if !sort.is_empty() {
            hits.sort_by(|(a, _), (b, _)| compare_sort_values(&sort, a, b));
        }

        let from = body["from"].as_u64().unwrap_or(0) as usize;
        let size = body["size"].as_u64().map_or(DEFAULT_WINDOW, |s| s as usize);
        let projected = body["fields"].as_array();

        let hits: Vec<Value> = hits
            .into_iter()
            .skip(from)
            .take(size)
            .map(|(sort_values, d)| {
                let mut hit = json!({ "_index": d.index, "_type": d.doc_type, "_id": d.id });
                match projected {
                    Some(fields) => {
                        let picked: Map<String, Value> = fields
                            .iter()
                            .filter_map(Value::as_str)
                            .filter_map(|f| d.source.get(f).map(|v| (f.to_string(), v.clone())))
                            .collect();
                        hit["fields"] = Value::Object(picked);
                    }
                    None => hit["_source"] = Value::Object(d.source.clone()),
                }
                if !sort.is_empty() {
                    hit["sort"] = Value::Array(sort_values);
                }
                hit
            })
            .collect();

        json!({ "took": 1, "timed_out": false, "hits": { "total": total, "hits": hits } })
    }

    fn delete_by_query(&self, index: &str, doc_type: Option<&str>, query: &Value) -> Value {
        let mut docs = self.docs.lock().unwrap();
        docs.retain(|d| {
            let in_scope = d.index == index && doc_type.is_none_or(|t| d.doc_type == t);
            !(in_scope && matches_query(query, &d.source))
        });
        json!({
            "ok": true,
            "_indices": { index: { "_shards": { "total": 1, "successful": 1, "failed": 0 } } }
        })
    }

    fn get(&self, index: &str, doc_type: Option<&str>, id: &str) -> (u16, Value) {
        match self.scoped(index, doc_type).into_iter().find(|d| d.id == id) {
            Some(d) => (
                200,
                json!({ "_index": d.index, "_type": d.doc_type, "_id": d.id,
                        "_version": d.version, "found": true, "_source": d.source }),
            ),
            None => (404, json!({ "_index": index, "_id": id, "found": false })),
        }
    }

    fn put(&self, index: &str, doc_type: &str, id: &str, body: Value) -> (u16, Value) {
        let source = body.as_object().cloned().unwrap_or_default();
        let mut docs = self.docs.lock().unwrap();
        let existing = docs
            .iter()
            .position(|d| d.index == index && d.doc_type == doc_type && d.id == id);
        let (version, created) = match existing {
            Some(pos) => {
                let d = &mut docs[pos];
                d.version += 1;
                d.source = source;
                (d.version, false)
            }
            None => {
                docs.push(Stored {
                    index: index.to_string(),
                    doc_type: doc_type.to_string(),
                    id: id.to_string(),
                    version: 1,
                    source,
                });
                (1, true)
            }
        };
        let status = if created { 201 } else { 200 };
        (
            status,
            json!({
                "_index": index,
                "_type": doc_type,
                "_id": id,
                "_version": version,
                "created": created
            }),
        )
    }
}

#[async_trait]
impl Transport for FakeEngine {
    async fn execute(&self, request: Request) -> Result<Response> {
        self.requests.lock().unwrap().push(request.clone());
        let (status, body) = self.handle(&request);
        Ok(Response::new(status, body.to_string()))
    }

    fn name(&self) -> &str {
        "fake"
    }
}

// ============================================================================
// DSL evaluation
// ============================================================================

fn entry(object: &Value) -> Option<(&String, &Value)> {
    object.as_object()?.iter().next()
}

fn matches_query(query: &Value, doc: &Map<String, Value>) -> bool {
    let Some((kind, body)) = entry(query) else {
        return true;
    };
    match kind.as_str() {
        "match_all" => true,
        "query_string" => {
            let needle = body["query"].as_str().unwrap_or("").to_lowercase();
            doc.values().any(|v| v.as_str().is_some_and(|s| s.to_lowercase().contains(&needle)))
        }
        "match" => entry(body).is_some_and(|(field, text)| {
            let text = text.as_str().unwrap_or("").to_lowercase();
            doc.get(field)
                .and_then(Value::as_str)
                .is_some_and(|s| s.to_lowercase().contains(&text))
        }),
        "filtered" => matches_query(&body["query"], doc) && matches_filter(&body["filter"], doc),
        _ => matches_filter(query, doc),
    }
}

fn matches_filter(filter: &Value, doc: &Map<String, Value>) -> bool {
    let Some((kind, body)) = entry(filter) else {
        return true;
    };
    match kind.as_str() {
        "term" => entry(body).is_some_and(|(field, value)| doc.get(field) == Some(value)),
        "terms" => entry(body).is_some_and(|(field, values)| {
            values
                .as_array()
                .is_some_and(|values| doc.get(field).is_some_and(|v| values.contains(v)))
        }),
        "range" => entry(body).is_some_and(|(field, bounds)| {
            doc.get(field).is_some_and(|v| {
                let above = bounds
                    .get("gte")
                    .is_none_or(|lo| compare_values(v, lo) != Ordering::Less);
                let below = bounds
                    .get("lte")
                    .is_none_or(|hi| compare_values(v, hi) != Ordering::Greater);
                above && below
            })
        }),
        "bool" => {
            let clauses = |key: &str| body[key].as_array().cloned().unwrap_or_default();
            let must = clauses("must");
            let must_not = clauses("must_not");
            let should = clauses("should");
            must.iter().all(|c| matches_filter(c, doc))
                && !must_not.iter().any(|c| matches_filter(c, doc))
                && (should.is_empty() || should.iter().any(|c| matches_filter(c, doc)))
        }
        "geo_distance" => geo_body(body, doc).is_some_and(|(distance, body)| {
            distance <= miles(&body["distance"])
        }),
        "geo_distance_range" => geo_body(body, doc).is_some_and(|(distance, body)| {
            distance >= miles(&body["from"]) && distance <= miles(&body["to"])
        }),
        _ => false,
    }
}

// Distance between the document and the origin named by the first
// non-parameter member of a geo filter body.
fn geo_body<'a>(body: &'a Value, doc: &Map<String, Value>) -> Option<(f64, &'a Value)> {
    let (field, origin) = body
        .as_object()?
        .iter()
        .find(|(k, _)| {
            !matches!(
                k.as_str(),
                "distance" | "from" | "to" | "order" | "unit" | "distance_type"
            )
        })?;
    Some((distance_miles(doc.get(field)?, origin)?, body))
}

fn miles(value: &Value) -> f64 {
    value
        .as_str()
        .and_then(|s| s.trim_end_matches("mi").parse().ok())
        .unwrap_or(f64::NAN)
}

/// Haversine distance in miles between two `{lat, lon}` objects.
pub fn distance_miles(a: &Value, b: &Value) -> Option<f64> {
    let (lat1, lon1) = (a["lat"].as_f64()?, a["lon"].as_f64()?);
    let (lat2, lon2) = (b["lat"].as_f64()?, b["lon"].as_f64()?);
    let (dlat, dlon) = ((lat2 - lat1).to_radians(), (lon2 - lon1).to_radians());
    let h = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    Some(2.0 * EARTH_RADIUS_MILES * h.sqrt().asin())
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => match (a.as_str(), b.as_str()) {
            (Some(x), Some(y)) => x.cmp(y),
            _ => Ordering::Equal,
        },
    }
}

fn sort_value(spec: &Value, doc: &Map<String, Value>) -> Value {
    match spec {
        Value::String(field) => doc.get(field).cloned().unwrap_or(Value::Null),
        _ => match entry(spec) {
            Some((key, body)) if key == "_geo_distance" => geo_body(body, doc)
                .map(|(d, _)| json!(d))
                .unwrap_or(json!(f64::MAX)),
            Some((field, _)) => doc.get(field).cloned().unwrap_or(Value::Null),
            None => Value::Null,
        },
    }
}

fn descending(spec: &Value) -> bool {
    entry(spec).is_some_and(|(_, body)| body["order"] == "desc")
}

fn compare_sort_values(specs: &[Value], a: &[Value], b: &[Value]) -> Ordering {
    for ((spec, x), y) in specs.iter().zip(a).zip(b) {
        let ordering = compare_values(x, y);
        let ordering = if descending(spec) { ordering.reverse() } else { ordering };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

// ============================================================================
// Fixtures
// ============================================================================

pub const INDEX: &str = "testing";
pub const TYPE: &str = "tweets";

/// Client over a fake engine seeded with the tweet fixtures.
pub fn seeded() -> (Arc<FakeEngine>, Elasto) {
    let engine = Arc::new(FakeEngine::new());
    for (id, doc) in tweets() {
        engine.insert(INDEX, TYPE, id, doc);
    }
    let elasto = Elasto::with_transport(ElastoConfig::default(), engine.clone());
    (engine, elasto)
}

/// Tweets around London, at increasing distance from Regent's Park.
pub fn tweets() -> Vec<(&'static str, Value)> {
    vec![
        ("1", json!({ "id": 1, "name": "hat", "characters": 10, "published": true,
                      "tag": "a", "location": { "lat": 51.5313, "lon": -0.1570 } })),
        ("2", json!({ "id": 2, "name": "hatstand", "characters": 20, "published": true,
                      "tag": "b", "location": { "lat": 51.5033, "lon": -0.1195 } })),
        ("3", json!({ "id": 3, "name": "coat", "characters": 30, "published": false,
                      "tag": "a", "location": { "lat": 51.4545, "lon": -0.0200 } })),
        ("4", json!({ "id": 4, "name": "scarf", "characters": 40, "published": true,
                      "tag": "c", "location": { "lat": 51.7520, "lon": -1.2577 } })),
    ]
}

/// Regent's Park, London.
pub fn regents_park() -> Value {
    json!({ "lat": 51.5313, "lon": -0.1570 })
}
