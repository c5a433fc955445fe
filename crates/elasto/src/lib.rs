//! Elasto umbrella crate: fluent query builder and thin client.
//!
//! This crate re-exports the Elasto components for convenience. The HTTP
//! client sits behind the `client` feature (on by default); without it,
//! queries can still be compiled and run over any custom transport.

#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]

pub use elasto_core as core;
pub use elasto_query as query;

#[cfg(feature = "client")]
pub use elasto_client as client;

pub use elasto_core::{ElastoConfig, Error, ResourceHandle, Result, Transport};
pub use elasto_query::{Document, Query, SearchResults};

#[cfg(feature = "client")]
pub use elasto_client::{DocumentVersion, Elasto, HttpTransport, SavedDocument, VersionType};

/// Commonly used types.
pub mod prelude {
    pub use elasto_core::{ElastoConfig, Error, MockTransport, ResourceHandle, Result, Transport};
    pub use elasto_query::{
        Aggregation, Document, GeoPoint, Near, Query, ScriptField, SearchResults, SortOrder,
    };

    #[cfg(feature = "client")]
    pub use elasto_client::{DocumentVersion, Elasto, SavedDocument};
}
