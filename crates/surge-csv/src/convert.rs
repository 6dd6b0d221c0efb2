//! JSON rows to CSV lines, rendered through the elastic pool.
//!
//! The header list is derived up front as the union of all row keys in
//! first-seen document order, with no bound on the number of distinct
//! fields. Each row is then rendered against that fixed header list by
//! whichever pool worker picks it up; the pool's ordered fan-in guarantees
//! the body lines come back in document order.

use indexmap::IndexSet;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use surge::{ElasticPool, PoolConfig, ScaleConfig};

/// One flat JSON row, keys in document order.
pub type Row = Map<String, Value>;

/// The expected input document shape: `{ "rows": [ ... ] }`.
#[derive(Debug, Deserialize)]
pub struct RowDocument {
    pub rows: Vec<Row>,
}

/// Pool sizing for one conversion run.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub workers: usize,
    pub queue_capacity: usize,
}

/// Union of all row keys, ordered by first appearance across the document.
pub fn collect_headers(rows: &[Row]) -> Vec<String> {
    let mut headers: IndexSet<String> = IndexSet::new();
    for row in rows {
        for key in row.keys() {
            if !headers.contains(key) {
                headers.insert(key.clone());
            }
        }
    }
    headers.into_iter().collect()
}

/// Renders one row against the global header list.
///
/// Strings are written bare, other values in their JSON form; a field the
/// row does not carry (or carries as `null`) renders as an empty cell.
pub fn render_row(headers: &[String], row: &Row) -> String {
    let mut cells = Vec::with_capacity(headers.len());
    for header in headers {
        cells.push(match row.get(header) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        });
    }
    cells.join(",")
}

/// Converts the rows into the complete CSV text: header line plus one body
/// line per row, joined with newlines, body order matching row order.
pub async fn convert_rows(rows: Vec<Row>, options: &ConvertOptions) -> anyhow::Result<String> {
    let headers = Arc::new(collect_headers(&rows));
    let row_count = rows.len();

    let config = PoolConfig {
        queue_capacity: options.queue_capacity,
        initial_workers: options.workers,
        expected_jobs: Some(row_count),
        scale: ScaleConfig::default(),
    };
    let render_headers = Arc::clone(&headers);
    let mut pool = ElasticPool::new(config, move |row: Row| {
        let headers = Arc::clone(&render_headers);
        async move { Ok(render_row(&headers, &row)) }
    })?;

    for row in rows {
        pool.submit(row).await?;
    }
    pool.finish();
    pool.wait().await?;
    let lines = pool.into_results()?;

    let mut out = Vec::with_capacity(row_count + 1);
    out.push(headers.join(","));
    out.extend(lines);
    Ok(out.join("\n"))
}
