//! Command-line arguments and their conversion into query inputs.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use elasto_client::{DocumentVersion, VersionType};
use elasto_core::ResourceHandle;
use elasto_query::{Near, SortInput, SortOrder};
use serde_json::Value;

/// Elasto - query a search engine from the command line
#[derive(Parser, Debug)]
#[command(name = "elasto", author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Engine host, overriding configuration and environment
    #[arg(long)]
    pub host: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search and print matching documents
    Search {
        /// Index, or index/type
        resource: String,

        #[command(flatten)]
        query: QueryArgs,

        /// Field to return (repeatable); documents then contain only these
        #[arg(long = "field")]
        fields: Vec<String>,

        /// Sort key: `field`, `field:desc`, `distance`, or `_score` (repeatable)
        #[arg(long)]
        sort: Vec<String>,

        /// Maximum number of documents
        #[arg(long)]
        size: Option<u64>,

        /// Number of documents to skip
        #[arg(long)]
        from: Option<u64>,

        /// Print the compiled query instead of running it
        #[arg(long)]
        dry_run: bool,

        /// Print the engine response unmodified
        #[arg(long, conflicts_with = "dry_run")]
        raw: bool,
    },

    /// Count matching documents
    Count {
        /// Index, or index/type
        resource: String,

        #[command(flatten)]
        query: QueryArgs,
    },

    /// Fetch one document by id
    Get {
        /// Index, or index/type
        resource: String,
        /// Document id
        id: String,
    },

    /// Store a JSON document under an id
    Save {
        /// Index, or index/type
        resource: String,
        /// Document id
        id: String,
        /// Document body as a JSON object
        document: String,
        /// Expected version
        #[arg(long)]
        version: Option<u64>,
        /// Version comparison: internal, external, or external_gte
        #[arg(long, default_value = "internal", requires = "version")]
        version_type: String,
    },

    /// Delete documents matching exact `--filter` terms
    Remove {
        /// Index, or index/type
        resource: String,

        /// Exact match `field=value` (repeatable, at least one required)
        #[arg(long = "filter", required = true)]
        filters: Vec<String>,
    },

    /// Suggest documents whose name matches the text
    Suggest {
        /// Index, or index/type
        resource: String,
        /// Text typed so far
        text: String,
    },
}

/// Conditions shared by `search` and `count`.
#[derive(ClapArgs, Debug, Default)]
pub struct QueryArgs {
    /// Required match `field=value`; JSON arrays match any element (repeatable)
    #[arg(long = "filter")]
    pub filters: Vec<String>,

    /// Rejected match `field=value` (repeatable)
    #[arg(long = "exclude")]
    pub excludes: Vec<String>,

    /// Alternative match `field=value`; at least one must hold (repeatable)
    #[arg(long = "or")]
    pub alternatives: Vec<String>,

    /// Inclusive range `field=lo..hi` (repeatable)
    #[arg(long = "range")]
    pub ranges: Vec<String>,

    /// Full-text query string
    #[arg(long)]
    pub term: Option<String>,

    /// Origin `lat,lon` or `lat,lon,radius_miles`
    #[arg(long)]
    pub near: Option<String>,
}

/// Parse `index` or `index/type`.
pub fn parse_resource(input: &str) -> Result<ResourceHandle> {
    let (index, doc_type) = match input.split_once('/') {
        Some((index, doc_type)) => (index, Some(doc_type)),
        None => (input, None),
    };
    if index.trim().is_empty() {
        bail!("resource {input:?} has no index");
    }
    let handle = ResourceHandle::new(index);
    Ok(match doc_type {
        Some(t) if !t.is_empty() => handle.with_type(t),
        _ => handle,
    })
}

/// Parse `field=value`; the value is read as JSON when it parses, else as a string.
pub fn parse_pair(input: &str) -> Result<(String, Value)> {
    let (field, raw) = input
        .split_once('=')
        .ok_or_else(|| anyhow!("expected field=value, got {input:?}"))?;
    if field.is_empty() {
        bail!("missing field name in {input:?}");
    }
    Ok((field.to_string(), parse_value(raw)))
}

fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Parse `field=lo..hi`.
pub fn parse_range(input: &str) -> Result<(String, Value, Value)> {
    let (field, bounds) = input
        .split_once('=')
        .ok_or_else(|| anyhow!("expected field=lo..hi, got {input:?}"))?;
    let (lo, hi) = bounds
        .split_once("..")
        .ok_or_else(|| anyhow!("expected lo..hi bounds, got {bounds:?}"))?;
    Ok((field.to_string(), parse_value(lo), parse_value(hi)))
}

/// Parse `lat,lon` or `lat,lon,radius`.
pub fn parse_near(input: &str) -> Result<Near> {
    let parts = input
        .split(',')
        .map(|p| {
            p.trim()
                .parse::<f64>()
                .map_err(|e| anyhow!("invalid coordinate {p:?}: {e}"))
        })
        .collect::<Result<Vec<_>>>()?;
    match parts.as_slice() {
        [lat, lon] => Ok(Near::new(*lat, *lon)),
        [lat, lon, radius] => Ok(Near::new(*lat, *lon).radius(*radius)),
        _ => bail!("expected lat,lon or lat,lon,radius, got {input:?}"),
    }
}

/// Parse `key` or `key:asc|desc`.
pub fn parse_sort(input: &str) -> Result<SortInput> {
    match input.rsplit_once(':') {
        Some((key, "asc")) => Ok((key, SortOrder::Asc).into()),
        Some((key, "desc")) => Ok((key, SortOrder::Desc).into()),
        Some((_, order)) => bail!("unknown sort order {order:?}"),
        None => Ok(input.into()),
    }
}

/// Build the optional version argument of `save`.
pub fn parse_version(number: Option<u64>, kind: &str) -> Result<Option<DocumentVersion>> {
    let kind = match kind {
        "internal" => VersionType::Internal,
        "external" => VersionType::External,
        "external_gte" => VersionType::ExternalGte,
        other => bail!("unknown version type {other:?}"),
    };
    Ok(number.map(|number| DocumentVersion { number, kind }))
}

// ============================================================================
// Tests
// ============================================================================
