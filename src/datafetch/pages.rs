use serde_json::Value;
use tracing::debug;

use super::{PageSource, Row};
use crate::error::{IngestError, Result};

/// Cursor over the pages of a [`PageSource`].
///
/// Pages are requested from 1 upwards with no gaps. The first empty list ends
/// the sequence; after that `next_batch` keeps returning `None` without
/// touching the source.
#[derive(Debug)]
pub struct Pages<S> {
    source: S,
    page_size: u32,
    next_page: u32,
    done: bool,
}

impl<S: PageSource> Pages<S> {
    pub fn new(source: S, page_size: u32) -> Self {
        Self {
            source,
            page_size,
            next_page: 1,
            done: false,
        }
    }

    pub async fn next_batch(&mut self) -> Result<Option<Vec<Row>>> {
        if self.done {
            return Ok(None);
        }

        let page = self.next_page;
        let body = self.source.fetch_page(page, self.page_size).await?;

        let Value::Array(items) = body else {
            self.done = true;
            return Err(IngestError::TransportFormat { page });
        };

        if items.is_empty() {
            debug!(page, "empty page, no more data");
            self.done = true;
            return Ok(None);
        }

        let mut rows = Vec::with_capacity(items.len());
        for item in items {
            match item {
                Value::Object(row) => rows.push(row),
                _ => {
                    self.done = true;
                    return Err(IngestError::TransportFormat { page });
                }
            }
        }

        debug!(page, rows = rows.len(), "fetched page");
        self.next_page += 1;
        Ok(Some(rows))
    }
}
