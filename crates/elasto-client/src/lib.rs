//! HTTP client for Elasto.
//!
//! [`Elasto`] is the entry point: it owns an [`ElastoConfig`] and a
//! transport, and hands out [`Query`] builders bound to a resource.
//! [`HttpTransport`] is the reqwest-backed transport used by
//! [`Elasto::connect`]; any other [`Transport`] can be supplied with
//! [`Elasto::with_transport`].
//!
//! [`ElastoConfig`]: elasto_core::ElastoConfig
//! [`Query`]: elasto_query::Query
//! [`Transport`]: elasto_core::Transport

#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod http;

pub use client::{DocumentVersion, Elasto, SavedDocument, VersionType};
pub use http::HttpTransport;
