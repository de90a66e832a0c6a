//! # Typesense Indexer Pipeline
//!
//! This crate keeps a Typesense collection in step with the items of a
//! content repository and turns search hits back into display results.
//!
//! ## Architecture
//!
//! 1. **Extractor**: pages through the relational store in fixed-size batches
//! 2. **Processor**: maps an item's property/value rows to a document
//! 3. **Lifecycle**: creates, deletes and fully rebuilds collections
//! 4. **Sync**: applies single-item create/update/delete events
//! 5. **Search**: plans weighted queries and formats hits for display
//! 6. **Jobs**: the job model, a dispatcher and index administration

pub mod errors;
pub mod extractor;
pub mod jobs;
pub mod lifecycle;
pub mod processor;
pub mod search;
pub mod settings;
pub mod sync;

#[cfg(test)]
mod mock;

pub use errors::{ConfigError, DispatchError, ExtractError, LifecycleError, PipelineError};
pub use extractor::{BatchExtractor, ItemBatch, MySqlRowSource, RawItemRow, RowSource, BATCH_SIZE};
pub use jobs::{
    AdminMessage, IndexAdmin, IndexJob, JobDispatcher, JobId, JobOutcome, JobRunner,
    TokioJobDispatcher,
};
pub use lifecycle::{DeleteOutcome, IndexLifecycleManager, JobState, ReindexReport};
pub use processor::{DocumentMapper, PropertyValue};
pub use search::{
    DisplayResult, ItemLinkBuilder, LinkBuilder, QueryPlanner, ResultFormatter, SearchPayload,
    SearchService,
};
pub use settings::{InMemorySettings, SearchSettings, SettingsStore, DEFAULT_REQUEST_TIMEOUT};
pub use sync::{EntityEvent, EntityOperation, IncrementalSyncHandler, SyncOutcome};
