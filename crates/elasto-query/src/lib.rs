//! Fluent query builder for Elasto.
//!
//! This crate turns chained calls into the engine's query DSL and turns
//! engine responses back into plain documents.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      elasto-query                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Query (builder + terminal operations)                      │
//! │  ├── QueryState (filters, excludes, alternatives, ...)      │
//! │  ├── compiler   (state → DSL: search/count/remove/suggest)  │
//! │  └── normalizer (response → documents/counts/aggregations)  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Clause / Condition / SortSpec / Aggregation / ScriptField  │
//! │  GeoPoint / Near (geo origin + radius resolution)           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  elasto_core::Transport (one request, one response)         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use elasto_core::MockTransport;
//! use elasto_query::{Near, Query};
//! use serde_json::json;
//!
//! let transport = MockTransport::new();
//! let body = Query::new(&transport, ("testing", "tweets"))
//!     .filter(("published", true))
//!     .near(Near::new(51.5, -0.15).radius(5.0))
//!     .sort("distance")
//!     .size(10)
//!     .raw()
//!     .unwrap();
//!
//! assert_eq!(body["size"], json!(10));
//! assert_eq!(body["sort"][0]["_geo_distance"]["unit"], json!("mi"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod aggregation;
pub mod clause;
pub mod compiler;
pub mod condition;
pub mod geo;
pub mod normalizer;
pub mod query;
pub mod sort;
pub mod state;

mod proptests;

// Re-exports
pub use aggregation::{Aggregation, ScriptField};
pub use clause::Clause;
pub use compiler::CompileMode;
pub use condition::Condition;
pub use geo::{GeoPoint, Near};
pub use normalizer::{Document, SearchResults};
pub use query::Query;
pub use sort::{SortInput, SortOrder, SortSpec};
pub use state::QueryState;
