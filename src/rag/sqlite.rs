//! SQLite-backed memory store.
//!
//! In-process vector store using SQLite for passages and
//! brute-force cosine similarity for search.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};

use super::store::{ScoredPassage, StoreError, VectorStoreBackend};

/// A passage persisted in the local memory store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredChunk {
    pub chunk_id: String,
    pub content: String,
    /// Source identifier (filename, URL, ...).
    pub source: String,
    pub metadata: Option<Value>,
}

pub struct SqliteMemoryStore {
    pool: SqlitePool,
}

impl SqliteMemoryStore {
    pub async fn open(db_path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Unavailable(format!("cannot create {}: {}", parent.display(), e))
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(4)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS memory_chunks (
                chunk_id TEXT PRIMARY KEY,
                content TEXT NOT NULL,
                source TEXT NOT NULL DEFAULT '',
                metadata TEXT DEFAULT '{}',
                embedding BLOB,
                created_at TEXT NOT NULL DEFAULT (STRFTIME('%Y-%m-%dT%H:%M:%fZ', 'now'))
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS memory_meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (STRFTIME('%Y-%m-%dT%H:%M:%fZ', 'now'))
            )",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    fn serialize_embedding(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    fn deserialize_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect()
    }

    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() || a.is_empty() {
            return 0.0;
        }

        let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
        let denom = norm_a * norm_b;

        if denom <= f32::EPSILON {
            0.0
        } else {
            dot / denom
        }
    }

    /// Adds or replaces a passage. Used to populate the store; the
    /// chat path only reads.
    pub async fn insert(&self, chunk: StoredChunk, embedding: Vec<f32>) -> Result<(), StoreError> {
        self.insert_batch(vec![(chunk, embedding)]).await
    }

    pub async fn insert_batch(
        &self,
        items: Vec<(StoredChunk, Vec<f32>)>,
    ) -> Result<(), StoreError> {
        if items.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;

        for (chunk, embedding) in &items {
            let blob = Self::serialize_embedding(embedding);
            let metadata_str = chunk
                .metadata
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| "{}".to_string());

            sqlx::query(
                "INSERT OR REPLACE INTO memory_chunks (chunk_id, content, source, metadata, embedding)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .bind(&chunk.chunk_id)
            .bind(&chunk.content)
            .bind(&chunk.source)
            .bind(&metadata_str)
            .bind(&blob)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    #[cfg(test)]
    async fn count(&self) -> Result<usize, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM memory_chunks")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as usize)
    }

    /// Embedding model the stored vectors were produced with, if recorded.
    pub async fn embedding_model(&self) -> Result<Option<String>, StoreError> {
        let model: Option<String> =
            sqlx::query_scalar("SELECT value FROM memory_meta WHERE key = 'embedding_model'")
                .fetch_optional(&self.pool)
                .await?;
        Ok(model)
    }

    pub async fn set_embedding_model(&self, embedding_model: &str) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT OR REPLACE INTO memory_meta (key, value, updated_at)
             VALUES ('embedding_model', ?1, STRFTIME('%Y-%m-%dT%H:%M:%fZ', 'now'))",
        )
        .bind(embedding_model)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl VectorStoreBackend for SqliteMemoryStore {
    fn name(&self) -> &str {
        "local"
    }

    async fn similarity_search(
        &self,
        query_embedding: &[f32],
        k: usize,
    ) -> Result<Vec<ScoredPassage>, StoreError> {
        let rows = sqlx::query(
            "SELECT content, source, embedding
             FROM memory_chunks
             WHERE embedding IS NOT NULL",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut scored = Vec::with_capacity(rows.len());
        for row in &rows {
            let embedding_bytes: Vec<u8> = row.get("embedding");
            if embedding_bytes.is_empty() {
                continue;
            }
            let stored_emb = Self::deserialize_embedding(&embedding_bytes);
            if stored_emb.len() != query_embedding.len() {
                return Err(StoreError::DimensionMismatch {
                    stored: stored_emb.len(),
                    query: query_embedding.len(),
                });
            }

            let source: String = row.get("source");
            scored.push(ScoredPassage {
                text: row.get("content"),
                score: Self::cosine_similarity(query_embedding, &stored_emb),
                source: (!source.is_empty()).then_some(source),
            });
        }

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(k);

        Ok(scored)
    }

    async fn dimension(&self) -> Result<Option<usize>, StoreError> {
        let blob: Option<Vec<u8>> = sqlx::query_scalar(
            "SELECT embedding FROM memory_chunks
             WHERE embedding IS NOT NULL AND LENGTH(embedding) > 0
             LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(blob.map(|bytes| bytes.len() / 4))
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(true)
    }
}
