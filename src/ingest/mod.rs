//! Row-by-row ingestion into the curated table.
//!
//! Every row is coerced, inserted and committed on its own. A failing row is
//! rolled back, counted and logged; the run carries on with the next one.

mod postgres;

pub use postgres::{build_insert_sql, PgRowSink};

use async_trait::async_trait;
use tracing::{error, info, trace};

use crate::catalog::TableDescriptor;
use crate::coerce::{cast_value, SqlValue};
use crate::datafetch::{PageSource, Pages, Row};
use crate::error::{IngestError, Result};

/// Running counters for one ingestion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestionResult {
    pub total: u64,
    pub inserted: u64,
    pub failed: u64,
}

/// Destination for single-row inserts.
#[async_trait]
pub trait RowSink: Send {
    /// Insert and commit one row. `row` is the 1-based sequence number in the
    /// run.
    ///
    /// A row-level failure that has already been rolled back is reported as
    /// [`IngestError::RowInsert`]. Any other error ends the run.
    async fn insert_row(&mut self, row: u64, params: &[SqlValue]) -> Result<()>;
}

/// Column binding for a destination table.
#[derive(Debug, Clone)]
pub struct Ingestor {
    /// `(name, catalog type)` of each insertable column, in table order.
    columns: Vec<(String, String)>,
}

impl Ingestor {
    pub fn new(table: &TableDescriptor) -> Self {
        let columns = table
            .insertable_columns()
            .into_iter()
            .map(|c| (c.to_string(), table.column_type(c).to_string()))
            .collect();
        Self { columns }
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Parameters for `row`, one per insertable column. Missing fields are
    /// `NULL`.
    pub fn row_params(&self, row: &Row) -> Vec<SqlValue> {
        self.columns
            .iter()
            .map(|(name, data_type)| {
                let cast = cast_value(row.get(name), data_type);
                if cast.is_fallback() {
                    trace!(column = %name, data_type = %data_type, "value left as raw text");
                }
                cast.into_value()
            })
            .collect()
    }

    /// Insert every row of `batch`, updating `result` as it goes.
    pub async fn ingest_batch<K: RowSink>(
        &self,
        sink: &mut K,
        batch: &[Row],
        result: &mut IngestionResult,
    ) -> Result<()> {
        for row in batch {
            result.total += 1;
            let params = self.row_params(row);

            match sink.insert_row(result.total, &params).await {
                Ok(()) => result.inserted += 1,
                Err(IngestError::RowInsert { row, message }) => {
                    result.failed += 1;
                    error!("row {}: {}", row, message);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Drain `pages` into `sink` and return the final counters.
    pub async fn run<S: PageSource, K: RowSink>(
        &self,
        pages: &mut Pages<S>,
        sink: &mut K,
    ) -> Result<IngestionResult> {
        let mut result = IngestionResult::default();

        while let Some(batch) = pages.next_batch().await? {
            self.ingest_batch(sink, &batch, &mut result).await?;
            info!(
                "Inserted so far: {} | Failed: {} | Processed: {}",
                result.inserted, result.failed, result.total
            );
        }

        Ok(result)
    }
}
