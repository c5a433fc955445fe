//! Elasto Core: shared types, errors, configuration, and the transport seam.
//!
//! This crate has no internal Elasto dependencies. The query builder
//! (`elasto-query`) and the HTTP client (`elasto-client`) both build on it.
//!
//! # Modules
//!
//! - [`error`]: Error taxonomy and Result alias
//! - [`config`]: Per-client configuration (TOML + environment)
//! - [`resource`]: Index/type handle a query is bound to
//! - [`transport`]: `Transport` trait, requests, responses, response guard
//! - [`mock`]: Recording transport for tests

#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod mock;
pub mod resource;
pub mod transport;

// Re-export key types at crate root for convenience
pub use config::ElastoConfig;
pub use error::{Error, Result};
pub use mock::MockTransport;
pub use resource::ResourceHandle;
pub use transport::{Method, Request, Response, Transport};
