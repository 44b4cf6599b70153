use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::Row;

use crate::error::{StoreError, StoreResult};
use crate::raw::RawMessage;
use crate::table::{quoted_partition_table, OFFSETS_TABLE};

/// A thin adapter over a SQLite connection pool: ensures tables, runs
/// atomic multi-row inserts, and serves ordered reads. Producers and
/// consumers build their semantics on top of this; the store itself knows
/// nothing about batching, groups, or codecs.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|error| StoreError::ConnectionError { error })?;

        Ok(Self { pool })
    }

    /// Wrap an already-open pool. Primarily useful for tests that share one
    /// in-memory database across a Store, a Producer, and a Consumer.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Idempotently create the partition table for (topic, partition).
    pub async fn ensure_partition_table(&self, topic: &str, partition: i32) -> StoreResult<()> {
        let table = quoted_partition_table(topic, partition)?;
        let stmt = format!(
            r#"
CREATE TABLE IF NOT EXISTS {table} (
    id      INTEGER PRIMARY KEY AUTOINCREMENT,
    data    BLOB NOT NULL,
    created DATETIME DEFAULT CURRENT_TIMESTAMP
)
            "#
        );

        sqlx::query(&stmt)
            .execute(&self.pool)
            .await
            .map_err(|error| StoreError::query("CREATE TABLE", error))?;

        Ok(())
    }

    /// Insert `payloads` as one atomic multi-row insert. Returns the offset
    /// assigned to the first row and the number of rows written; the i-th
    /// payload received offset `first_offset + i`.
    pub async fn insert_batch(
        &self,
        topic: &str,
        partition: i32,
        payloads: &[Vec<u8>],
    ) -> StoreResult<(i64, usize)> {
        let table = quoted_partition_table(topic, partition)?;
        let stmt = format!("INSERT INTO {table} (data) VALUES (?)");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|error| StoreError::query("BEGIN", error))?;

        for payload in payloads {
            sqlx::query(&stmt)
                .bind(payload.as_slice())
                .execute(&mut *tx)
                .await
                .map_err(|error| StoreError::query("INSERT", error))?;
        }

        let last_id: i64 = sqlx::query_scalar("SELECT last_insert_rowid()")
            .fetch_one(&mut *tx)
            .await
            .map_err(|error| StoreError::query("SELECT last_insert_rowid", error))?;

        tx.commit()
            .await
            .map_err(|error| StoreError::query("COMMIT", error))?;

        let count = payloads.len();
        let first_offset = last_id - count as i64 + 1;

        Ok((first_offset, count))
    }

    /// Read rows strictly after `after_offset`, ascending, capped at
    /// `limit`. A missing partition table (no messages ever produced for
    /// this topic) is reported as [`StoreError::is_no_such_table`], which
    /// callers are expected to translate into an empty result.
    pub async fn fetch_after(
        &self,
        topic: &str,
        partition: i32,
        after_offset: i64,
        limit: i64,
    ) -> StoreResult<Vec<RawMessage>> {
        let table = quoted_partition_table(topic, partition)?;
        let stmt =
            format!("SELECT id, data, created FROM {table} WHERE id > ? ORDER BY id ASC LIMIT ?");

        let rows = sqlx::query(&stmt)
            .bind(after_offset)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|error| StoreError::query("SELECT", error))?;

        rows.into_iter()
            .map(|row| {
                Ok(RawMessage {
                    offset: row.try_get("id").map_err(|error| StoreError::query("SELECT", error))?,
                    data: row.try_get("data").map_err(|error| StoreError::query("SELECT", error))?,
                    created: row
                        .try_get("created")
                        .map_err(|error| StoreError::query("SELECT", error))?,
                })
            })
            .collect()
    }

    /// Idempotently create the shared consumer offsets table.
    pub async fn ensure_offsets_table(&self) -> StoreResult<()> {
        let stmt = format!(
            r#"
CREATE TABLE IF NOT EXISTS {OFFSETS_TABLE} (
    consumer_group VARCHAR NOT NULL,
    topic          VARCHAR NOT NULL,
    partition      INTEGER NOT NULL,
    commit_offset  INTEGER NOT NULL,
    updated_at     DATETIME DEFAULT CURRENT_TIMESTAMP,
    PRIMARY KEY (consumer_group, topic, partition)
)
            "#
        );

        sqlx::query(&stmt)
            .execute(&self.pool)
            .await
            .map_err(|error| StoreError::query("CREATE TABLE", error))?;

        Ok(())
    }

    pub async fn get_commit_offset(
        &self,
        group: &str,
        topic: &str,
        partition: i32,
    ) -> StoreResult<Option<i64>> {
        let stmt = format!(
            "SELECT commit_offset FROM {OFFSETS_TABLE} \
             WHERE consumer_group = ? AND topic = ? AND partition = ?"
        );

        let row: Option<(i64,)> = sqlx::query_as(&stmt)
            .bind(group)
            .bind(topic)
            .bind(partition)
            .fetch_optional(&self.pool)
            .await
            .map_err(|error| StoreError::query("SELECT", error))?;

        Ok(row.map(|(offset,)| offset))
    }

    /// Insert a fresh offset row. Fails with a unique-constraint violation
    /// (see [`StoreError::is_unique_violation`]) if a concurrent commit won
    /// the race to create the row first; callers should fall back to
    /// [`Store::update_commit_offset`] in that case.
    pub async fn insert_commit_offset(
        &self,
        group: &str,
        topic: &str,
        partition: i32,
        offset: i64,
    ) -> StoreResult<()> {
        let stmt = format!(
            "INSERT INTO {OFFSETS_TABLE} (consumer_group, topic, partition, commit_offset) \
             VALUES (?, ?, ?, ?)"
        );

        sqlx::query(&stmt)
            .bind(group)
            .bind(topic)
            .bind(partition)
            .bind(offset)
            .execute(&self.pool)
            .await
            .map_err(|error| StoreError::query("INSERT", error))?;

        Ok(())
    }

    /// Update an existing offset row, clamping to be monotonically
    /// non-decreasing: `commit_offset = MAX(commit_offset, offset)`.
    pub async fn update_commit_offset(
        &self,
        group: &str,
        topic: &str,
        partition: i32,
        offset: i64,
    ) -> StoreResult<()> {
        let stmt = format!(
            "UPDATE {OFFSETS_TABLE} \
             SET commit_offset = MAX(commit_offset, ?), updated_at = CURRENT_TIMESTAMP \
             WHERE consumer_group = ? AND topic = ? AND partition = ?"
        );

        sqlx::query(&stmt)
            .bind(offset)
            .bind(group)
            .bind(topic)
            .bind(partition)
            .execute(&self.pool)
            .await
            .map_err(|error| StoreError::query("UPDATE", error))?;

        Ok(())
    }
}
