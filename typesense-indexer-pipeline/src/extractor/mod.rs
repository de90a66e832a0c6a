//! Batched extraction of item rows from the relational store.
//!
//! Each row describes one public item: its id plus parallel lists of
//! property terms and values, joined with the ASCII unit separator. Batches are requested with
//! `LIMIT batch_size OFFSET consumed_so_far`, and a batch with fewer rows
//! than the batch size ends the stream.

mod mysql;

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, Stream};
use tracing::{debug, warn};

use crate::errors::ExtractError;

pub use mysql::MySqlRowSource;

/// Number of items per extraction batch.
pub const BATCH_SIZE: usize = 1000;

/// Separator of the grouped field and value lists (`CHAR(31)`).
///
/// Property values are free text and may contain `|` or `,`; the unit
/// separator does not occur in catalogued text.
pub const LIST_SEPARATOR: char = '\u{1f}';

/// One item's flattened property/value data as read from the store.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct RawItemRow {
    pub resource_id: i64,
    /// Joined property terms, parallel to `values`.
    pub fields: Option<String>,
    /// Joined values, parallel to `fields`.
    pub values: Option<String>,
}

impl RawItemRow {
    /// Create a row from already joined lists.
    pub fn new(resource_id: i64, fields: impl Into<String>, values: impl Into<String>) -> Self {
        Self {
            resource_id,
            fields: Some(fields.into()),
            values: Some(values.into()),
        }
    }

    /// Create a row by joining `(term, value)` pairs.
    pub fn from_pairs<'a, I>(resource_id: i64, pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let (fields, values): (Vec<&str>, Vec<&str>) = pairs.into_iter().unzip();
        let separator = LIST_SEPARATOR.to_string();
        Self::new(resource_id, fields.join(&separator), values.join(&separator))
    }

    fn split(list: &Option<String>) -> Vec<&str> {
        match list.as_deref() {
            Some("") | None => Vec::new(),
            Some(list) => list.split(LIST_SEPARATOR).collect(),
        }
    }

    /// Un-join the parallel lists into `(term, value)` pairs.
    ///
    /// Lists of different lengths cannot be aligned, so such a row yields
    /// no pairs at all rather than values under the wrong property.
    pub fn pairs(&self) -> Vec<(&str, &str)> {
        let fields = Self::split(&self.fields);
        let values = Self::split(&self.values);
        if fields.len() != values.len() {
            warn!(
                resource_id = self.resource_id,
                fields = fields.len(),
                values = values.len(),
                "Field and value lists differ in length, dropping the item's values"
            );
            return Vec::new();
        }
        fields.into_iter().zip(values).collect()
    }
}

/// A source of item rows that can be read by offset and limit.
#[async_trait]
pub trait RowSource: Send + Sync {
    /// Fetch at most `limit` item rows starting at `offset`, in a stable order.
    async fn fetch_rows(&self, offset: usize, limit: usize)
        -> Result<Vec<RawItemRow>, ExtractError>;
}

/// One batch of item rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemBatch {
    /// Offset the batch was requested at.
    pub offset: usize,
    pub rows: Vec<RawItemRow>,
}

impl ItemBatch {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Pages through a `RowSource`, one batch at a time.
///
/// The extractor is lazy: nothing is read until `next_batch` is called. It
/// can be resumed from any offset with `starting_at`.
pub struct BatchExtractor {
    source: Arc<dyn RowSource>,
    batch_size: usize,
    offset: usize,
    finished: bool,
}

impl BatchExtractor {
    /// Create an extractor reading `BATCH_SIZE` items per batch from offset 0.
    pub fn new(source: Arc<dyn RowSource>) -> Self {
        Self {
            source,
            batch_size: BATCH_SIZE,
            offset: 0,
            finished: false,
        }
    }

    /// Override the batch size. A size of zero is treated as one.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Resume from a given offset.
    pub fn starting_at(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Number of items consumed so far (the offset of the next batch).
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Fetch the next batch, or `None` once a short batch has been returned.
    pub async fn next_batch(&mut self) -> Result<Option<ItemBatch>, ExtractError> {
        if self.finished {
            return Ok(None);
        }

        let rows = self.source.fetch_rows(self.offset, self.batch_size).await?;
        let batch = ItemBatch {
            offset: self.offset,
            rows,
        };

        self.offset += batch.len();
        if batch.len() < self.batch_size {
            self.finished = true;
        }

        debug!(
            offset = batch.offset,
            count = batch.len(),
            last = self.finished,
            "Fetched item batch"
        );
        Ok(Some(batch))
    }

    /// Turn the extractor into a stream of batches. The stream ends after
    /// the short batch or after the first error.
    pub fn into_stream(self) -> impl Stream<Item = Result<ItemBatch, ExtractError>> {
        stream::unfold(Some(self), |state| async move {
            let Some(mut extractor) = state else {
                return None;
            };
            match extractor.next_batch().await {
                Ok(Some(batch)) => Some((Ok(batch), Some(extractor))),
                Ok(None) => None,
                Err(e) => Some((Err(e), None)),
            }
        })
    }
}
