//! Incremental synchronization of single items.
//!
//! The host notifies the handler after an item is created, updated or
//! deleted. Remote failures are logged and reported as an outcome; they
//! never block or undo the triggering mutation.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

use crate::processor::{DocumentMapper, PropertyValue};
use typesense_indexer_repository::{SearchEngineClient, SearchError};
use typesense_indexer_shared::{IndexedProperty, RESOURCE_ID_FIELD};

/// Kind of content mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityOperation {
    Create,
    Update,
    Delete,
}

/// A content mutation as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityEvent {
    pub operation: EntityOperation,
    pub resource_id: String,
    pub is_public: bool,
    /// Property values after the mutation. Empty for deletes.
    #[serde(default)]
    pub values: Vec<PropertyValue>,
}

impl EntityEvent {
    /// Create a create event.
    pub fn created(resource_id: impl Into<String>, is_public: bool, values: Vec<PropertyValue>) -> Self {
        Self {
            operation: EntityOperation::Create,
            resource_id: resource_id.into(),
            is_public,
            values,
        }
    }

    /// Create an update event.
    pub fn updated(resource_id: impl Into<String>, is_public: bool, values: Vec<PropertyValue>) -> Self {
        Self {
            operation: EntityOperation::Update,
            resource_id: resource_id.into(),
            is_public,
            values,
        }
    }

    /// Create a delete event.
    pub fn deleted(resource_id: impl Into<String>) -> Self {
        Self {
            operation: EntityOperation::Delete,
            resource_id: resource_id.into(),
            is_public: false,
            values: Vec::new(),
        }
    }
}

/// What the handler did with an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The document was created or replaced.
    Upserted,
    /// A delete-by-filter was issued; carries the engine's deleted count.
    Deleted(u64),
    /// Nothing was sent (private item).
    Skipped,
    /// The remote call failed; the error has been logged.
    Failed(SearchError),
}

/// Applies single-item mutations to the current collection.
pub struct IncrementalSyncHandler {
    client: Arc<dyn SearchEngineClient>,
    collection: String,
    mapper: DocumentMapper,
    retract_private: bool,
}

impl IncrementalSyncHandler {
    /// Create a handler writing to `collection`.
    pub fn new(
        client: Arc<dyn SearchEngineClient>,
        collection: impl Into<String>,
        properties: &[IndexedProperty],
    ) -> Self {
        Self {
            client,
            collection: collection.into(),
            mapper: DocumentMapper::new(properties),
            retract_private: false,
        }
    }

    /// Delete the document of an item that is now private instead of
    /// leaving it in the index.
    pub fn with_retract_private(mut self, retract_private: bool) -> Self {
        self.retract_private = retract_private;
        self
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// React to a content mutation.
    #[instrument(skip(self, event), fields(
        index_name = %self.collection,
        resource_id = %event.resource_id,
        operation = ?event.operation
    ))]
    pub async fn on_entity_changed(&self, event: &EntityEvent) -> SyncOutcome {
        match event.operation {
            EntityOperation::Delete => self.on_delete(&event.resource_id).await,
            EntityOperation::Create | EntityOperation::Update => {
                self.on_create_or_update(&event.resource_id, event.is_public, &event.values)
                    .await
            }
        }
    }

    /// Upsert the document of a created or updated item.
    ///
    /// Private items are skipped, or retracted when `retract_private` is set.
    pub async fn on_create_or_update(
        &self,
        resource_id: &str,
        is_public: bool,
        values: &[PropertyValue],
    ) -> SyncOutcome {
        if is_public {
            return self.upsert(resource_id, values).await;
        }
        if self.retract_private {
            self.delete(resource_id).await
        } else {
            debug!(resource_id = %resource_id, "Skipping private item");
            SyncOutcome::Skipped
        }
    }

    /// Remove the document of a deleted item, filtering on `resource_id`.
    pub async fn on_delete(&self, resource_id: &str) -> SyncOutcome {
        self.delete(resource_id).await
    }

    async fn upsert(&self, resource_id: &str, values: &[PropertyValue]) -> SyncOutcome {
        let document = self.mapper.map_values(resource_id, values);
        match self.client.upsert_document(&self.collection, &document).await {
            Ok(()) => {
                debug!(resource_id = %resource_id, "Upserted document");
                SyncOutcome::Upserted
            }
            Err(e) => {
                error!(error = %e, resource_id = %resource_id, "Error upserting document");
                SyncOutcome::Failed(e)
            }
        }
    }

    async fn delete(&self, resource_id: &str) -> SyncOutcome {
        let filter_by = format!("{}:{}", RESOURCE_ID_FIELD, resource_id);
        match self.client.delete_documents(&self.collection, &filter_by).await {
            Ok(deleted) => {
                info!(resource_id = %resource_id, deleted, "Deleted document");
                SyncOutcome::Deleted(deleted)
            }
            Err(e) => {
                error!(error = %e, resource_id = %resource_id, "Error deleting document");
                SyncOutcome::Failed(e)
            }
        }
    }
}
