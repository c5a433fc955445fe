//! Command execution.
//!
//! Every command produces one JSON value, which `main` prints.

use anyhow::{Context, Result};
use elasto_client::Elasto;
use elasto_query::Query;
use serde_json::{json, Value};

use crate::args::{self, Command, QueryArgs};

/// Run `command` against `elasto`.
pub async fn run(elasto: &Elasto, command: Command) -> Result<Value> {
    match command {
        Command::Search {
            resource,
            query,
            fields,
            sort,
            size,
            from,
            dry_run,
            raw,
        } => {
            let mut q = apply_conditions(elasto.query(args::parse_resource(&resource)?), &query)?;
            if !fields.is_empty() {
                q = q.fields(fields);
            }
            for key in &sort {
                q = q.sort(args::parse_sort(key)?);
            }
            if let Some(size) = size {
                q = q.size(size);
            }
            if let Some(from) = from {
                q = q.from(from);
            }

            if dry_run {
                return Ok(q.raw()?);
            }
            if raw {
                return Ok(q.exec().await?);
            }
            let results = q.search().await?;
            Ok(serde_json::to_value(results)?)
        }

        Command::Count { resource, query } => {
            let q = apply_conditions(elasto.query(args::parse_resource(&resource)?), &query)?;
            Ok(json!({ "count": q.count().await? }))
        }

        Command::Get { resource, id } => {
            let doc = elasto.get(args::parse_resource(&resource)?, &id).await?;
            Ok(doc.map(Value::Object).unwrap_or(Value::Null))
        }

        Command::Save {
            resource,
            id,
            document,
            version,
            version_type,
        } => {
            let document: Value =
                serde_json::from_str(&document).context("document is not valid JSON")?;
            let version = args::parse_version(version, &version_type)?;
            let saved = elasto
                .save(args::parse_resource(&resource)?, &id, &document, version)
                .await?;
            Ok(serde_json::to_value(saved)?)
        }

        Command::Remove { resource, filters } => {
            let mut q = elasto.query(args::parse_resource(&resource)?);
            for filter in &filters {
                q = q.filter(args::parse_pair(filter)?);
            }
            Ok(q.remove().await?)
        }

        Command::Suggest { resource, text } => {
            let results = elasto
                .query(args::parse_resource(&resource)?)
                .autocomplete(&text)
                .await?;
            Ok(serde_json::to_value(results)?)
        }
    }
}

fn apply_conditions<'t>(mut q: Query<'t>, conditions: &QueryArgs) -> Result<Query<'t>> {
    if let Some(near) = &conditions.near {
        q = q.near(args::parse_near(near)?);
    }
    for filter in &conditions.filters {
        q = q.filter(args::parse_pair(filter)?);
    }
    for exclude in &conditions.excludes {
        let (field, value) = args::parse_pair(exclude)?;
        q = q.exclude(field, value);
    }
    for alternative in &conditions.alternatives {
        q = q.or(args::parse_pair(alternative)?);
    }
    for range in &conditions.ranges {
        let (field, lo, hi) = args::parse_range(range)?;
        q = q.range(field, lo, hi);
    }
    if let Some(term) = &conditions.term {
        q = q.term(term.clone());
    }
    Ok(q)
}

// ============================================================================
// Tests
// ============================================================================
