//! SQLite-backed vector store.
//!
//! One table per collection, embeddings stored as little-endian f32 BLOBs,
//! timestamps as RFC 3339 text. Similarity search is a full scan with exact
//! cosine ranking, which keeps the descending-score ordering contract precise
//! within a scope; collections that outgrow a scan should move to a store
//! with a native vector index behind the same trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::Mutex;

use crate::config::{is_valid_identifier, StorageConfig};
use crate::error::{Error, Result};
use crate::memory::types::Memory;
use crate::similarity::cosine_similarity;
use crate::storage::{DeleteAllOptions, GetAllOptions, SearchOptions, VectorStore};

/// Bundled [`VectorStore`] implementation on rusqlite.
pub struct SqliteStore {
    conn: Mutex<Option<Connection>>,
    collection: String,
    dimensions: usize,
}

impl SqliteStore {
    /// Open (or create) a database file and initialize the collection table.
    pub fn open(config: &StorageConfig, dimensions: usize) -> Result<Self> {
        let conn = Connection::open(&config.db_path)
            .map_err(|e| Error::ConnectionFailed(format!("{}: {e}", config.db_path)))?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(Error::storage)?;
        Self::with_connection(conn, &config.collection, dimensions)
    }

    /// Open an in-memory database, used by tests and throwaway sessions.
    pub fn open_in_memory(collection: &str, dimensions: usize) -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::ConnectionFailed(e.to_string()))?;
        Self::with_connection(conn, collection, dimensions)
    }

    fn with_connection(conn: Connection, collection: &str, dimensions: usize) -> Result<Self> {
        if !is_valid_identifier(collection) {
            return Err(Error::InvalidConfig(format!(
                "collection {collection:?} is not a valid table name"
            )));
        }
        if dimensions == 0 {
            return Err(Error::InvalidConfig("embedding dimensions must be > 0".into()));
        }

        let store = Self {
            conn: Mutex::new(Some(conn)),
            collection: collection.to_string(),
            dimensions,
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Idempotent DDL for the collection table and its scope index.
    fn init_schema(&self) -> Result<()> {
        let ddl = format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                agent_id TEXT,
                content TEXT NOT NULL,
                embedding BLOB NOT NULL,
                sparse_embedding TEXT,
                metadata TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                retention_strength REAL NOT NULL DEFAULT 1.0
                    CHECK(retention_strength >= 0.0 AND retention_strength <= 1.0),
                last_accessed_at TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_{table}_scope ON {table}(user_id, agent_id);",
            table = self.collection
        );
        self.with_conn(|conn| conn.execute_batch(&ddl).map_err(Error::storage))
    }

    /// Run `f` against the live connection, failing if the store is closed.
    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let guard = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        match guard.as_ref() {
            Some(conn) => f(conn),
            None => Err(Error::ConnectionFailed("store is closed".into())),
        }
    }

    fn check_dimensions(&self, embedding: &[f32]) -> Result<()> {
        if embedding.len() != self.dimensions {
            return Err(Error::InvalidInput(format!(
                "embedding has {} dimensions, collection expects {}",
                embedding.len(),
                self.dimensions
            )));
        }
        Ok(())
    }

    /// Persist a recomputed retention strength, typically from a forgetting-
    /// curve sweep or an on-access reinforcement.
    pub fn set_retention(
        &self,
        id: &str,
        strength: f64,
        last_accessed_at: Option<DateTime<Utc>>,
    ) -> Result<()> {
        if !(0.0..=1.0).contains(&strength) {
            return Err(Error::InvalidInput(format!(
                "retention strength must be in [0, 1], got {strength}"
            )));
        }
        self.with_conn(|conn| {
            let rows = conn
                .execute(
                    &format!(
                        "UPDATE {} SET retention_strength = ?1, last_accessed_at = ?2 WHERE id = ?3",
                        self.collection
                    ),
                    params![strength, last_accessed_at.map(|t| t.to_rfc3339()), id],
                )
                .map_err(Error::storage)?;
            if rows == 0 {
                return Err(Error::NotFound { id: id.to_string() });
            }
            Ok(())
        })
    }

    const COLUMNS: &'static str = "id, user_id, agent_id, content, embedding, sparse_embedding, \
         metadata, created_at, updated_at, retention_strength, last_accessed_at";

    fn scan_memory(row: &Row<'_>) -> rusqlite::Result<Memory> {
        let embedding_bytes: Vec<u8> = row.get(4)?;
        let sparse_str: Option<String> = row.get(5)?;
        let metadata_str: Option<String> = row.get(6)?;
        let created_at: String = row.get(7)?;
        let updated_at: String = row.get(8)?;
        let last_accessed_at: Option<String> = row.get(10)?;

        Ok(Memory {
            id: row.get(0)?,
            user_id: row.get(1)?,
            agent_id: row.get(2)?,
            content: row.get(3)?,
            embedding: bytes_to_embedding(&embedding_bytes),
            sparse_embedding: sparse_str.and_then(|s| serde_json::from_str(&s).ok()),
            metadata: metadata_str.and_then(|s| serde_json::from_str(&s).ok()),
            created_at: parse_timestamp(7, &created_at)?,
            updated_at: parse_timestamp(8, &updated_at)?,
            retention_strength: row.get(9)?,
            last_accessed_at: match last_accessed_at {
                Some(s) => Some(parse_timestamp(10, &s)?),
                None => None,
            },
            score: None,
        })
    }
}

#[async_trait]
impl VectorStore for SqliteStore {
    async fn insert(&self, memory: &Memory) -> Result<()> {
        self.check_dimensions(&memory.embedding)?;
        let sparse_json = memory
            .sparse_embedding
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| Error::InvalidInput(format!("sparse embedding: {e}")))?;
        let metadata_json = memory
            .metadata
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| Error::InvalidInput(format!("metadata: {e}")))?;

        self.with_conn(|conn| {
            conn.execute(
                &format!(
                    "INSERT INTO {} ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                    self.collection,
                    Self::COLUMNS
                ),
                params![
                    memory.id,
                    memory.user_id,
                    memory.agent_id,
                    memory.content,
                    embedding_to_bytes(&memory.embedding),
                    sparse_json,
                    metadata_json,
                    memory.created_at.to_rfc3339(),
                    memory.updated_at.to_rfc3339(),
                    memory.retention_strength,
                    memory.last_accessed_at.map(|t| t.to_rfc3339()),
                ],
            )
            .map_err(Error::storage)?;
            Ok(())
        })
    }

    async fn get(&self, id: &str) -> Result<Memory> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!(
                    "SELECT {} FROM {} WHERE id = ?1",
                    Self::COLUMNS,
                    self.collection
                ),
                params![id],
                Self::scan_memory,
            )
            .optional()
            .map_err(Error::storage)?
            .ok_or_else(|| Error::NotFound { id: id.to_string() })
        })
    }

    async fn update(&self, id: &str, content: &str, embedding: &[f32]) -> Result<Memory> {
        self.check_dimensions(embedding)?;
        self.with_conn(|conn| {
            let rows = conn
                .execute(
                    &format!(
                        "UPDATE {} SET content = ?1, embedding = ?2, updated_at = ?3 WHERE id = ?4",
                        self.collection
                    ),
                    params![
                        content,
                        embedding_to_bytes(embedding),
                        Utc::now().to_rfc3339(),
                        id
                    ],
                )
                .map_err(Error::storage)?;
            if rows == 0 {
                return Err(Error::NotFound { id: id.to_string() });
            }
            Ok(())
        })?;
        self.get(id).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.with_conn(|conn| {
            let rows = conn
                .execute(
                    &format!("DELETE FROM {} WHERE id = ?1", self.collection),
                    params![id],
                )
                .map_err(Error::storage)?;
            if rows == 0 {
                return Err(Error::NotFound { id: id.to_string() });
            }
            Ok(())
        })
    }

    async fn search(&self, embedding: &[f32], opts: &SearchOptions) -> Result<Vec<Memory>> {
        self.check_dimensions(embedding)?;
        let (where_clause, scope_params) = build_where_clause(&opts.user_id, opts.agent_id.as_deref());

        let mut scored: Vec<Memory> = self.with_conn(|conn| {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {} FROM {} {}",
                    Self::COLUMNS,
                    self.collection,
                    where_clause
                ))
                .map_err(Error::storage)?;
            let params: Vec<&dyn rusqlite::types::ToSql> = scope_params
                .iter()
                .map(|p| p as &dyn rusqlite::types::ToSql)
                .collect();
            let rows = stmt
                .query_map(params.as_slice(), Self::scan_memory)
                .map_err(Error::storage)?
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(Error::storage)?;
            Ok(rows)
        })?;

        scored.retain(|memory| metadata_matches(memory, &opts.filters));
        for memory in &mut scored {
            memory.score = Some(cosine_similarity(embedding, &memory.embedding));
        }
        scored.retain(|m| m.score.unwrap_or(0.0) >= opts.min_score);

        // Descending by score; ties keep scan order
        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        if opts.limit > 0 && scored.len() > opts.limit {
            scored.truncate(opts.limit);
        }

        Ok(scored)
    }

    async fn get_all(&self, opts: &GetAllOptions) -> Result<Vec<Memory>> {
        let (where_clause, scope_params) = build_where_clause(&opts.user_id, opts.agent_id.as_deref());
        // limit 0 means unlimited; SQLite treats a negative LIMIT the same way
        let limit = if opts.limit == 0 { -1 } else { opts.limit as i64 };
        let offset = opts.offset as i64;

        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {} FROM {} {} ORDER BY created_at DESC LIMIT ? OFFSET ?",
                    Self::COLUMNS,
                    self.collection,
                    where_clause
                ))
                .map_err(Error::storage)?;
            let mut params: Vec<&dyn rusqlite::types::ToSql> = scope_params
                .iter()
                .map(|p| p as &dyn rusqlite::types::ToSql)
                .collect();
            params.push(&limit);
            params.push(&offset);
            let rows = stmt
                .query_map(params.as_slice(), Self::scan_memory)
                .map_err(Error::storage)?
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(Error::storage)?;
            Ok(rows)
        })
    }

    async fn delete_all(&self, opts: &DeleteAllOptions) -> Result<()> {
        let (where_clause, scope_params) = build_where_clause(&opts.user_id, opts.agent_id.as_deref());
        self.with_conn(|conn| {
            let params: Vec<&dyn rusqlite::types::ToSql> = scope_params
                .iter()
                .map(|p| p as &dyn rusqlite::types::ToSql)
                .collect();
            conn.execute(
                &format!("DELETE FROM {} {}", self.collection, where_clause),
                params.as_slice(),
            )
            .map_err(Error::storage)?;
            Ok(())
        })
    }

    async fn close(&self) -> Result<()> {
        let conn = {
            let mut guard = self.conn.lock().unwrap_or_else(|e| e.into_inner());
            guard.take()
        };
        if let Some(conn) = conn {
            conn.close().map_err(|(_, e)| Error::storage(e))?;
        }
        Ok(())
    }
}

/// Scope conditions for search/list/bulk-delete. Empty `user_id` matches all
/// users; `None` agent matches any agent.
fn build_where_clause(user_id: &str, agent_id: Option<&str>) -> (String, Vec<String>) {
    let mut conditions = Vec::new();
    let mut params = Vec::new();

    if !user_id.is_empty() {
        conditions.push(format!("user_id = ?{}", params.len() + 1));
        params.push(user_id.to_string());
    }
    if let Some(agent) = agent_id {
        conditions.push(format!("agent_id = ?{}", params.len() + 1));
        params.push(agent.to_string());
    }

    if conditions.is_empty() {
        (String::new(), params)
    } else {
        (format!("WHERE {}", conditions.join(" AND ")), params)
    }
}

/// Equality match of every filter key against top-level metadata entries.
fn metadata_matches(
    memory: &Memory,
    filters: &std::collections::HashMap<String, serde_json::Value>,
) -> bool {
    if filters.is_empty() {
        return true;
    }
    let Some(metadata) = memory.metadata.as_ref().and_then(|m| m.as_object()) else {
        return false;
    };
    filters
        .iter()
        .all(|(key, expected)| metadata.get(key) == Some(expected))
}

/// Serialize an embedding as little-endian f32 bytes.
fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|x| x.to_le_bytes()).collect()
}

/// Deserialize little-endian f32 bytes back to an embedding.
fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

fn parse_timestamp(column: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                column,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::collections::HashMap;

    const DIMS: usize = 8;

    fn test_store() -> SqliteStore {
        SqliteStore::open_in_memory("memories", DIMS).unwrap()
    }

    /// Unit vector with a spike at `seed`.
    fn embedding(seed: usize) -> Vec<f32> {
        let mut v = vec![0.0f32; DIMS];
        v[seed % DIMS] = 1.0;
        v
    }

    fn memory(id: &str, user: &str, agent: Option<&str>, content: &str, emb: Vec<f32>) -> Memory {
        let now = Utc::now();
        Memory {
            id: id.into(),
            user_id: user.into(),
            agent_id: agent.map(Into::into),
            content: content.into(),
            embedding: emb,
            sparse_embedding: None,
            metadata: None,
            created_at: now,
            updated_at: now,
            retention_strength: 1.0,
            last_accessed_at: None,
            score: None,
        }
    }

    #[tokio::test]
    async fn insert_and_get_round_trip() {
        let store = test_store();
        let mut mem = memory("m1", "u1", Some("a1"), "Rust is a systems language", embedding(0));
        mem.metadata = Some(serde_json::json!({"topic": "rust"}));
        mem.sparse_embedding = Some(HashMap::from([(2, 0.5f32)]));
        store.insert(&mem).await.unwrap();

        let got = store.get("m1").await.unwrap();
        assert_eq!(got.user_id, "u1");
        assert_eq!(got.agent_id.as_deref(), Some("a1"));
        assert_eq!(got.content, "Rust is a systems language");
        assert_eq!(got.embedding, mem.embedding);
        assert_eq!(got.sparse_embedding.unwrap()[&2], 0.5);
        assert_eq!(got.metadata.unwrap()["topic"], "rust");
        assert_eq!(got.retention_strength, 1.0);
        assert!(got.score.is_none());
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let store = test_store();
        let err = store.get("nope").await.unwrap_err();
        assert!(matches!(err, Error::NotFound { id } if id == "nope"));
    }

    #[tokio::test]
    async fn update_replaces_content_and_refreshes_updated_at() {
        let store = test_store();
        let mem = memory("m1", "u1", None, "old", embedding(0));
        store.insert(&mem).await.unwrap();

        let updated = store.update("m1", "new", &embedding(1)).await.unwrap();
        assert_eq!(updated.content, "new");
        assert_eq!(updated.embedding, embedding(1));
        assert!(updated.updated_at >= mem.updated_at);
        assert_eq!(updated.created_at.timestamp(), mem.created_at.timestamp());
    }

    #[tokio::test]
    async fn update_missing_is_not_found() {
        let store = test_store();
        let err = store.update("ghost", "x", &embedding(0)).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[tokio::test]
    async fn delete_removes_record() {
        let store = test_store();
        store
            .insert(&memory("m1", "u1", None, "bye", embedding(0)))
            .await
            .unwrap();
        store.delete("m1").await.unwrap();
        assert!(matches!(
            store.get("m1").await.unwrap_err(),
            Error::NotFound { .. }
        ));
        assert!(matches!(
            store.delete("m1").await.unwrap_err(),
            Error::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn search_orders_by_descending_score() {
        let store = test_store();
        store
            .insert(&memory("far", "u1", None, "unrelated", embedding(5)))
            .await
            .unwrap();
        store
            .insert(&memory("near", "u1", None, "close match", embedding(0)))
            .await
            .unwrap();
        let mut tilted = embedding(0);
        tilted[1] = 0.4;
        store
            .insert(&memory("mid", "u1", None, "partial match", tilted))
            .await
            .unwrap();

        let results = store
            .search(
                &embedding(0),
                &SearchOptions {
                    user_id: "u1".into(),
                    limit: 10,
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let ids: Vec<&str> = results.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["near", "mid", "far"]);
        let scores: Vec<f64> = results.iter().map(|m| m.score.unwrap()).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
        assert!((scores[0] - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn search_respects_min_score_and_limit() {
        let store = test_store();
        for i in 0..5 {
            store
                .insert(&memory(
                    &format!("m{i}"),
                    "u1",
                    None,
                    "fact",
                    embedding(i),
                ))
                .await
                .unwrap();
        }

        let opts = SearchOptions {
            user_id: "u1".into(),
            limit: 2,
            min_score: 0.0,
            ..Default::default()
        };
        let results = store.search(&embedding(0), &opts).await.unwrap();
        assert!(results.len() <= 2);

        let opts = SearchOptions {
            user_id: "u1".into(),
            limit: 10,
            min_score: 0.9,
            ..Default::default()
        };
        let results = store.search(&embedding(0), &opts).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "m0");
        assert!(results.iter().all(|m| m.score.unwrap() >= 0.9));
    }

    #[tokio::test]
    async fn search_is_scoped_to_user_and_agent() {
        let store = test_store();
        store
            .insert(&memory("u1-none", "u1", None, "a", embedding(0)))
            .await
            .unwrap();
        store
            .insert(&memory("u1-a1", "u1", Some("a1"), "b", embedding(0)))
            .await
            .unwrap();
        store
            .insert(&memory("u2-none", "u2", None, "c", embedding(0)))
            .await
            .unwrap();

        let by_user = store
            .search(
                &embedding(0),
                &SearchOptions {
                    user_id: "u1".into(),
                    limit: 10,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let ids: Vec<&str> = by_user.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&"u1-none") && ids.contains(&"u1-a1"));

        let by_agent = store
            .search(
                &embedding(0),
                &SearchOptions {
                    user_id: "u1".into(),
                    agent_id: Some("a1".into()),
                    limit: 10,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(by_agent.len(), 1);
        assert_eq!(by_agent[0].id, "u1-a1");

        // Empty user_id matches everything
        let all = store
            .search(
                &embedding(0),
                &SearchOptions {
                    limit: 10,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn search_applies_metadata_filters() {
        let store = test_store();
        let mut tagged = memory("tagged", "u1", None, "coffee fact", embedding(0));
        tagged.metadata = Some(serde_json::json!({"topic": "beverages", "lang": "en"}));
        store.insert(&tagged).await.unwrap();
        store
            .insert(&memory("untagged", "u1", None, "other fact", embedding(0)))
            .await
            .unwrap();

        let mut filters = HashMap::new();
        filters.insert("topic".to_string(), serde_json::json!("beverages"));
        let results = store
            .search(
                &embedding(0),
                &SearchOptions {
                    user_id: "u1".into(),
                    limit: 10,
                    filters,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "tagged");

        let mut filters = HashMap::new();
        filters.insert("topic".to_string(), serde_json::json!("databases"));
        let results = store
            .search(
                &embedding(0),
                &SearchOptions {
                    user_id: "u1".into(),
                    limit: 10,
                    filters,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn get_all_orders_newest_first_with_pagination() {
        let store = test_store();
        let base = Utc::now();
        for i in 0..4 {
            let mut mem = memory(&format!("m{i}"), "u1", None, "fact", embedding(i));
            mem.created_at = base - Duration::hours(4 - i as i64);
            mem.updated_at = mem.created_at;
            store.insert(&mem).await.unwrap();
        }

        let all = store
            .get_all(&GetAllOptions {
                user_id: "u1".into(),
                limit: 10,
                ..Default::default()
            })
            .await
            .unwrap();
        let ids: Vec<&str> = all.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["m3", "m2", "m1", "m0"]);

        let page = store
            .get_all(&GetAllOptions {
                user_id: "u1".into(),
                limit: 2,
                offset: 1,
                ..Default::default()
            })
            .await
            .unwrap();
        let ids: Vec<&str> = page.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["m2", "m1"]);
    }

    #[tokio::test]
    async fn delete_all_is_scoped() {
        let store = test_store();
        store
            .insert(&memory("u1-a", "u1", None, "a", embedding(0)))
            .await
            .unwrap();
        store
            .insert(&memory("u1-b", "u1", None, "b", embedding(1)))
            .await
            .unwrap();
        store
            .insert(&memory("u2-a", "u2", None, "c", embedding(2)))
            .await
            .unwrap();

        store
            .delete_all(&DeleteAllOptions {
                user_id: "u1".into(),
                ..Default::default()
            })
            .await
            .unwrap();

        let remaining = store.get_all(&GetAllOptions::default()).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, "u2-a");
    }

    #[tokio::test]
    async fn dimension_mismatch_is_invalid_input() {
        let store = test_store();
        let short = memory("m1", "u1", None, "bad", vec![1.0, 0.0]);
        assert!(matches!(
            store.insert(&short).await.unwrap_err(),
            Error::InvalidInput(_)
        ));
        assert!(matches!(
            store.search(&[1.0, 0.0], &SearchOptions::default()).await.unwrap_err(),
            Error::InvalidInput(_)
        ));
    }

    #[tokio::test]
    async fn set_retention_persists_and_bounds() {
        let store = test_store();
        store
            .insert(&memory("m1", "u1", None, "fact", embedding(0)))
            .await
            .unwrap();

        let accessed = Utc::now();
        store.set_retention("m1", 0.42, Some(accessed)).unwrap();
        let got = store.get("m1").await.unwrap();
        assert!((got.retention_strength - 0.42).abs() < 1e-9);
        assert_eq!(
            got.last_accessed_at.unwrap().timestamp(),
            accessed.timestamp()
        );

        assert!(matches!(
            store.set_retention("m1", 1.5, None).unwrap_err(),
            Error::InvalidInput(_)
        ));
        assert!(matches!(
            store.set_retention("ghost", 0.5, None).unwrap_err(),
            Error::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn close_then_use_fails() {
        let store = test_store();
        store.close().await.unwrap();
        let err = store.get("m1").await.unwrap_err();
        assert!(matches!(err, Error::ConnectionFailed(_)));
        // close is idempotent
        store.close().await.unwrap();
    }

    #[tokio::test]
    async fn persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            db_path: dir.path().join("memoir.db").to_string_lossy().into_owned(),
            collection: "memories".into(),
        };

        let store = SqliteStore::open(&config, DIMS).unwrap();
        store
            .insert(&memory("m1", "u1", None, "durable fact", embedding(0)))
            .await
            .unwrap();
        store.close().await.unwrap();

        let reopened = SqliteStore::open(&config, DIMS).unwrap();
        let got = reopened.get("m1").await.unwrap();
        assert_eq!(got.content, "durable fact");
    }
}
