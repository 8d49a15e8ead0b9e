//! SQLite-backed store for documents and their chunks
//!
//! Owns the `documents` and `chunks` tables. Chunks cascade-delete with
//! their document; `embedding_key` carries a corpus-wide UNIQUE constraint
//! and `(document_id, chunk_index)` a per-document one, so re-ingesting a
//! document surfaces as a constraint violation instead of silent duplicates.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::types::document::{ChunkRecord, DocumentRef, FileType};

/// SQLite-backed chunk store
pub struct ChunkStore {
    conn: Arc<Mutex<Connection>>,
}

impl ChunkStore {
    /// Create or open the store at the given path
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Storage(format!("failed to create storage dir: {}", e)))?;
        }

        let conn = Connection::open(path)
            .map_err(|e| Error::Storage(format!("failed to open database: {}", e)))?;

        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.migrate()?;
        Ok(store)
    }

    /// Create an in-memory store (for tests and ephemeral corpora)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::Storage(format!("failed to open in-memory database: {}", e)))?;

        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
            PRAGMA foreign_keys=ON;
        "#,
        )
        .map_err(|e| Error::Storage(format!("failed to set pragmas: {}", e)))?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                filename TEXT NOT NULL,
                file_type TEXT NOT NULL,
                page_count INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS chunks (
                id TEXT PRIMARY KEY,
                document_id TEXT NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
                content TEXT NOT NULL,
                page_number INTEGER,
                chunk_index INTEGER NOT NULL,
                embedding_key TEXT NOT NULL UNIQUE,
                created_at TEXT NOT NULL,
                UNIQUE(document_id, chunk_index)
            );

            CREATE INDEX IF NOT EXISTS idx_chunks_document_id ON chunks(document_id);
        "#,
        )
        .map_err(|e| Error::Storage(format!("failed to run migrations: {}", e)))?;

        tracing::debug!("chunk store migrations complete");
        Ok(())
    }

    /// Insert a document record. A document that is already present is left
    /// untouched so the chunk-level uniqueness constraints decide what
    /// happens on re-ingestion.
    pub fn insert_document(&self, doc: &DocumentRef) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute(
            r#"
            INSERT OR IGNORE INTO documents (
                id, title, filename, file_type, page_count, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                doc.id.to_string(),
                doc.title,
                doc.filename,
                file_type_to_str(&doc.file_type),
                doc.page_count as i64,
                doc.created_at.to_rfc3339(),
                doc.updated_at.to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    /// Get a document by ID
    pub fn get_document(&self, id: &Uuid) -> Result<Option<DocumentRef>> {
        let conn = self.conn.lock();

        let doc = conn
            .query_row(
                "SELECT id, title, filename, file_type, page_count, created_at, updated_at
                 FROM documents WHERE id = ?1",
                params![id.to_string()],
                row_to_document,
            )
            .optional()?;

        Ok(doc)
    }

    /// List all documents in creation order
    pub fn list_documents(&self) -> Result<Vec<DocumentRef>> {
        let conn = self.conn.lock();

        let mut stmt = conn.prepare(
            "SELECT id, title, filename, file_type, page_count, created_at, updated_at
             FROM documents ORDER BY created_at, id",
        )?;

        let docs = stmt
            .query_map([], row_to_document)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(docs)
    }

    /// Persist a batch of chunks in one transaction.
    ///
    /// A uniqueness violation (duplicate embedding key or chunk index) rolls
    /// the whole batch back and is reported as a storage error.
    pub fn insert_chunks(&self, chunks: &[ChunkRecord]) -> Result<()> {
        if chunks.is_empty() {
            return Ok(());
        }

        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO chunks (
                    id, document_id, content, page_number, chunk_index, embedding_key, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )?;

            for chunk in chunks {
                stmt.execute(params![
                    chunk.id.to_string(),
                    chunk.document_id.to_string(),
                    chunk.content,
                    chunk.page_number.map(|p| p as i64),
                    chunk.chunk_index as i64,
                    chunk.embedding_key,
                    chunk.created_at.to_rfc3339(),
                ])
                .map_err(|e| {
                    if let rusqlite::Error::SqliteFailure(inner, _) = &e {
                        if inner.code == rusqlite::ErrorCode::ConstraintViolation {
                            return Error::Storage(format!(
                                "chunk uniqueness violated for embedding key {}: {}",
                                chunk.embedding_key, e
                            ));
                        }
                    }
                    Error::from(e)
                })?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    /// Load every persisted chunk in creation order.
    ///
    /// The order is stable across restarts (SQLite rowid, i.e. insertion
    /// order) so index positions line up 1:1 with the loaded sequence.
    pub fn load_all_chunks(&self) -> Result<Vec<ChunkRecord>> {
        let conn = self.conn.lock();

        let mut stmt = conn.prepare(
            "SELECT id, document_id, content, page_number, chunk_index, embedding_key, created_at
             FROM chunks ORDER BY rowid",
        )?;

        let chunks = stmt
            .query_map([], row_to_chunk)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(chunks)
    }

    /// Total number of persisted chunks
    pub fn count_chunks(&self) -> Result<usize> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Delete a document and, via cascade, all of its chunks.
    ///
    /// Returns the number of chunks that were removed.
    pub fn delete_document(&self, id: &Uuid) -> Result<usize> {
        let conn = self.conn.lock();

        let chunk_count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM chunks WHERE document_id = ?1",
            params![id.to_string()],
            |row| row.get(0),
        )?;

        conn.execute(
            "DELETE FROM documents WHERE id = ?1",
            params![id.to_string()],
        )?;

        Ok(chunk_count as usize)
    }
}

fn file_type_to_str(file_type: &FileType) -> &'static str {
    match file_type {
        FileType::Txt => "txt",
        FileType::Pdf => "pdf",
        FileType::Docx => "docx",
        FileType::Unknown => "unknown",
    }
}

fn str_to_file_type(s: &str) -> FileType {
    match s {
        "txt" => FileType::Txt,
        "pdf" => FileType::Pdf,
        "docx" => FileType::Docx,
        _ => FileType::Unknown,
    }
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn row_to_document(row: &rusqlite::Row) -> rusqlite::Result<DocumentRef> {
    let id: String = row.get(0)?;
    let title: String = row.get(1)?;
    let filename: String = row.get(2)?;
    let file_type: String = row.get(3)?;
    let page_count: i64 = row.get(4)?;
    let created_at: String = row.get(5)?;
    let updated_at: String = row.get(6)?;

    Ok(DocumentRef {
        id: Uuid::parse_str(&id).unwrap_or_else(|_| Uuid::nil()),
        title,
        filename,
        file_type: str_to_file_type(&file_type),
        page_count: page_count as u32,
        created_at: parse_timestamp(&created_at),
        updated_at: parse_timestamp(&updated_at),
    })
}

fn row_to_chunk(row: &rusqlite::Row) -> rusqlite::Result<ChunkRecord> {
    let id: String = row.get(0)?;
    let document_id: String = row.get(1)?;
    let content: String = row.get(2)?;
    let page_number: Option<i64> = row.get(3)?;
    let chunk_index: i64 = row.get(4)?;
    let embedding_key: String = row.get(5)?;
    let created_at: String = row.get(6)?;

    Ok(ChunkRecord {
        id: Uuid::parse_str(&id).unwrap_or_else(|_| Uuid::nil()),
        document_id: Uuid::parse_str(&document_id).unwrap_or_else(|_| Uuid::nil()),
        content,
        page_number: page_number.map(|p| p as u32),
        chunk_index: chunk_index as u32,
        embedding_key,
        created_at: parse_timestamp(&created_at),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_document(title: &str) -> DocumentRef {
        DocumentRef::new(
            title.to_string(),
            format!("{}.txt", title),
            FileType::Txt,
            1,
        )
    }

    fn chunks_for(doc: &DocumentRef, texts: &[&str]) -> Vec<ChunkRecord> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| ChunkRecord::new(doc.id, t.to_string(), i as u32))
            .collect()
    }

    #[test]
    fn document_roundtrip() {
        let store = ChunkStore::in_memory().unwrap();
        let doc = sample_document("handbook");
        store.insert_document(&doc).unwrap();

        let loaded = store.get_document(&doc.id).unwrap().unwrap();
        assert_eq!(loaded.title, "handbook");
        assert_eq!(loaded.file_type, FileType::Txt);
        assert_eq!(loaded.page_count, 1);
    }

    #[test]
    fn chunks_load_in_creation_order() {
        let store = ChunkStore::in_memory().unwrap();
        let doc_a = sample_document("a");
        let doc_b = sample_document("b");
        store.insert_document(&doc_a).unwrap();
        store.insert_document(&doc_b).unwrap();

        store
            .insert_chunks(&chunks_for(&doc_a, &["a0", "a1"]))
            .unwrap();
        store.insert_chunks(&chunks_for(&doc_b, &["b0"])).unwrap();

        let loaded = store.load_all_chunks().unwrap();
        let contents: Vec<&str> = loaded.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, vec!["a0", "a1", "b0"]);
        assert_eq!(loaded[0].chunk_index, 0);
        assert_eq!(loaded[1].chunk_index, 1);
    }

    #[test]
    fn duplicate_embedding_key_rejected() {
        let store = ChunkStore::in_memory().unwrap();
        let doc = sample_document("dup");
        store.insert_document(&doc).unwrap();

        store
            .insert_chunks(&chunks_for(&doc, &["first pass"]))
            .unwrap();

        // Re-ingesting the same document derives the same embedding keys.
        let err = store
            .insert_chunks(&chunks_for(&doc, &["second pass"]))
            .unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
        assert!(err.to_string().contains("embedding key"));

        // The failed batch must not leave partial rows behind.
        assert_eq!(store.count_chunks().unwrap(), 1);
    }

    #[test]
    fn explicit_key_collision_across_documents_rejected() {
        let store = ChunkStore::in_memory().unwrap();
        let doc_a = sample_document("a");
        let doc_b = sample_document("b");
        store.insert_document(&doc_a).unwrap();
        store.insert_document(&doc_b).unwrap();

        let first = ChunkRecord::new(doc_a.id, "one".to_string(), 0)
            .with_embedding_key("shared".to_string());
        let second = ChunkRecord::new(doc_b.id, "two".to_string(), 0)
            .with_embedding_key("shared".to_string());

        store.insert_chunks(&[first]).unwrap();
        assert!(store.insert_chunks(&[second]).is_err());
    }

    #[test]
    fn delete_document_cascades_to_chunks() {
        let store = ChunkStore::in_memory().unwrap();
        let doc = sample_document("gone");
        let kept = sample_document("kept");
        store.insert_document(&doc).unwrap();
        store.insert_document(&kept).unwrap();
        store
            .insert_chunks(&chunks_for(&doc, &["x", "y", "z"]))
            .unwrap();
        store.insert_chunks(&chunks_for(&kept, &["keep"])).unwrap();

        let deleted = store.delete_document(&doc.id).unwrap();
        assert_eq!(deleted, 3);
        assert_eq!(store.count_chunks().unwrap(), 1);
        assert!(store.get_document(&doc.id).unwrap().is_none());
        assert!(store.get_document(&kept.id).unwrap().is_some());
    }

    #[test]
    fn list_documents_in_creation_order() {
        let store = ChunkStore::in_memory().unwrap();
        let first = sample_document("first");
        let second = sample_document("second");
        store.insert_document(&first).unwrap();
        store.insert_document(&second).unwrap();

        let docs = store.list_documents().unwrap();
        assert_eq!(docs.len(), 2);
    }

    #[test]
    fn reopening_preserves_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chunks.db");

        let doc = sample_document("persist");
        {
            let store = ChunkStore::new(&path).unwrap();
            store.insert_document(&doc).unwrap();
            store
                .insert_chunks(&chunks_for(&doc, &["alpha", "beta"]))
                .unwrap();
        }

        let reopened = ChunkStore::new(&path).unwrap();
        let chunks = reopened.load_all_chunks().unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].content, "alpha");
        assert_eq!(chunks[0].document_id, doc.id);
    }
}
