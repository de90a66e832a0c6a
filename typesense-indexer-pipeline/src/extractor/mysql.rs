use async_trait::async_trait;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use sqlx::Executor;
use tracing::{debug, info};

use super::{RawItemRow, RowSource};
use crate::errors::ExtractError;

/// Entity type whose rows are indexed.
pub const ITEM_RESOURCE_TYPE: &str = "Omeka\\Entity\\Item";

/// Grouped field and value lists easily exceed the server default of 1024 bytes.
const GROUP_CONCAT_MAX_LEN: u32 = 16 * 1024 * 1024;

const ITEM_ROWS_QUERY: &str = r#"
SELECT
    CAST(`resource`.`id` AS SIGNED) AS `resource_id`,
    CAST(GROUP_CONCAT(
        CONCAT(`vocabulary`.`prefix`, ':', `property`.`local_name`)
        ORDER BY `value`.`id` SEPARATOR 0x1F
    ) AS CHAR) AS `fields`,
    CAST(GROUP_CONCAT(
        `value`.`value`
        ORDER BY `value`.`id` SEPARATOR 0x1F
    ) AS CHAR) AS `values`
FROM `value`
    INNER JOIN `resource` ON `resource`.`id` = `value`.`resource_id`
    INNER JOIN `property` ON `property`.`id` = `value`.`property_id`
    INNER JOIN `vocabulary` ON `vocabulary`.`id` = `property`.`vocabulary_id`
WHERE
    `resource`.`resource_type` = ?
    AND `resource`.`is_public` = 1
    AND `value`.`value` IS NOT NULL
GROUP BY `resource`.`id`
ORDER BY `resource`.`id`
LIMIT ? OFFSET ?
"#;

/// Reads public items and their property values from an Omeka S database.
pub struct MySqlRowSource {
    pool: MySqlPool,
    resource_type: String,
}

impl MySqlRowSource {
    /// Open a lazily connected pool for the given `mysql://` URL.
    ///
    /// Every new connection raises `group_concat_max_len` so that grouped
    /// value lists are not truncated.
    pub fn connect(database_url: &str) -> Result<Self, ExtractError> {
        let statement = format!("SET SESSION group_concat_max_len = {}", GROUP_CONCAT_MAX_LEN);
        let pool = MySqlPoolOptions::new()
            .after_connect(move |conn, _meta| {
                let statement = statement.clone();
                Box::pin(async move {
                    conn.execute(statement.as_str()).await?;
                    Ok(())
                })
            })
            .connect_lazy(database_url)?;

        info!("Created MySQL item source");
        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: MySqlPool) -> Self {
        Self {
            pool,
            resource_type: ITEM_RESOURCE_TYPE.to_string(),
        }
    }

    /// Index a different resource type (e.g. item sets).
    pub fn with_resource_type(mut self, resource_type: impl Into<String>) -> Self {
        self.resource_type = resource_type.into();
        self
    }
}

#[async_trait]
impl RowSource for MySqlRowSource {
    async fn fetch_rows(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<RawItemRow>, ExtractError> {
        let rows = sqlx::query_as::<_, RawItemRow>(ITEM_ROWS_QUERY)
            .bind(self.resource_type.as_str())
            .bind(limit as u64)
            .bind(offset as u64)
            .fetch_all(&self.pool)
            .await?;

        debug!(offset, limit, count = rows.len(), "Fetched item rows");
        Ok(rows)
    }
}
