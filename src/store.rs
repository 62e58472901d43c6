use anyhow::{Context, Result};
use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::chunker::Chunk;
use crate::normalize::ArchivalRecord;
use crate::pipeline::ProcessedRecord;

/// A stored chunk row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredChunk {
    pub identifier: String,
    pub seq: u32,
    pub chunk_text: String,
    pub token_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub record_count: u32,
    pub chunk_count: u32,
    pub total_tokens: u64,
}

/// SQLite store of records and their chunks
pub struct ChunkStore {
    conn: Connection,
}

impl ChunkStore {
    /// Create a new in-memory database
    pub fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to create in-memory database")?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Open an existing database file, creating it if needed
    pub fn open(path: &str) -> Result<Self> {
        let conn =
            Connection::open(path).context(format!("Failed to open database at {}", path))?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn
            .execute_batch(
                r#"
            CREATE TABLE IF NOT EXISTS records (
                identifier TEXT PRIMARY KEY,
                ident TEXT,
                date TEXT,
                series TEXT NOT NULL,
                link TEXT,
                title TEXT,
                path TEXT NOT NULL,
                filename TEXT NOT NULL,
                text_hash TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS chunks (
                identifier TEXT NOT NULL,
                seq INTEGER NOT NULL,
                chunk_text TEXT NOT NULL,
                token_count INTEGER NOT NULL,
                PRIMARY KEY (identifier, seq),
                FOREIGN KEY (identifier) REFERENCES records(identifier)
            );

            CREATE INDEX IF NOT EXISTS idx_records_series ON records(series);
            "#,
            )
            .context("Failed to initialize database schema")?;
        Ok(())
    }

    /// Insert or replace a record row
    pub fn insert_record(&self, record: &ArchivalRecord) -> Result<()> {
        let text_hash = hash_text(record.text.as_deref().unwrap_or(""));
        let date = record.date.map(|d| d.to_string());

        self.conn
            .execute(
                "INSERT OR REPLACE INTO records \
                 (identifier, ident, date, series, link, title, path, filename, text_hash) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    record.identifier,
                    record.ident,
                    date,
                    record.series,
                    record.link,
                    record.title,
                    record.path,
                    record.filename,
                    text_hash
                ],
            )
            .context(format!("Failed to insert record: {}", record.identifier))?;
        Ok(())
    }

    /// Replace the chunks of one record, numbered from zero in order
    pub fn insert_chunks(&mut self, identifier: &str, chunks: &[Chunk]) -> Result<()> {
        let tx = self.conn.transaction().context("Failed to begin transaction")?;

        tx.execute("DELETE FROM chunks WHERE identifier = ?1", params![identifier])
            .context(format!("Failed to clear chunks of {}", identifier))?;

        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO chunks (identifier, seq, chunk_text, token_count) \
                     VALUES (?1, ?2, ?3, ?4)",
                )
                .context("Failed to prepare statement")?;

            for (seq, chunk) in chunks.iter().enumerate() {
                stmt.execute(params![
                    identifier,
                    seq as u32,
                    chunk.chunk_text,
                    chunk.metadata.token_count as u32
                ])
                .context(format!("Failed to insert chunk {} of {}", seq, identifier))?;
            }
        }

        tx.commit().context("Failed to commit chunks")?;
        Ok(())
    }

    /// Store a processed record with all its chunks
    pub fn insert_processed(&mut self, processed: &ProcessedRecord) -> Result<()> {
        self.insert_record(&processed.record)?;
        self.insert_chunks(&processed.record.identifier, &processed.chunks)
    }

    /// Get the chunks of one record in order
    pub fn get_chunks(&self, identifier: &str) -> Result<Vec<StoredChunk>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT identifier, seq, chunk_text, token_count FROM chunks \
                 WHERE identifier = ?1 ORDER BY seq",
            )
            .context("Failed to prepare statement")?;

        let chunks = stmt
            .query_map(params![identifier], |row| {
                Ok(StoredChunk {
                    identifier: row.get(0)?,
                    seq: row.get(1)?,
                    chunk_text: row.get(2)?,
                    token_count: row.get(3)?,
                })
            })
            .context("Failed to query chunks")?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to collect chunks")?;

        Ok(chunks)
    }

    /// Get the stored text hash of a record
    pub fn get_text_hash(&self, identifier: &str) -> Result<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT text_hash FROM records WHERE identifier = ?1")
            .context("Failed to prepare statement")?;

        let mut rows = stmt
            .query(params![identifier])
            .context("Failed to query record")?;

        match rows.next().context("Failed to get next row")? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    /// Get statistics
    pub fn get_stats(&self) -> Result<StoreStats> {
        let record_count: u32 = self
            .conn
            .query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))
            .context("Failed to count records")?;

        let chunk_count: u32 = self
            .conn
            .query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get(0))
            .context("Failed to count chunks")?;

        let total_tokens: i64 = self
            .conn
            .query_row("SELECT COALESCE(SUM(token_count), 0) FROM chunks", [], |row| {
                row.get(0)
            })
            .context("Failed to sum tokens")?;

        Ok(StoreStats {
            record_count,
            chunk_count,
            total_tokens: total_tokens.max(0) as u64,
        })
    }

    /// Save database to file
    pub fn save_to_file(&self, path: &str) -> Result<()> {
        // VACUUM INTO refuses to overwrite an existing file
        let _ = std::fs::remove_file(path);
        let safe_path = path.replace('\'', "''");
        let sql = format!("VACUUM INTO '{}'", safe_path);
        self.conn
            .execute_batch(&sql)
            .context(format!("Failed to save database to {}", path))?;

        Ok(())
    }
}

/// SHA-256 of the cleaned record text, hex encoded
pub fn hash_text(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunker::ChunkMetadata;
    use chrono::NaiveDate;

    fn record(identifier: &str, text: &str) -> ArchivalRecord {
        ArchivalRecord {
            identifier: identifier.to_string(),
            ident: Some("MM 1.1 RRB 1803/0001".to_string()),
            date: NaiveDate::from_ymd_opt(1803, 5, 12),
            date_text: None,
            series: "rrb".to_string(),
            link: None,
            title: Some("Strassenbau".to_string()),
            path: format!("kr/{}.xml", identifier),
            filename: format!("{}.xml", identifier),
            text: Some(text.to_string()),
        }
    }

    fn chunk(identifier: &str, text: &str, tokens: usize) -> Chunk {
        Chunk {
            identifier: identifier.to_string(),
            chunk_text: text.to_string(),
            metadata: ChunkMetadata {
                token_count: tokens,
                first_sentence: 0,
                sentence_count: 1,
            },
        }
    }

    #[test]
    fn test_hash_text() {
        assert_eq!(
            hash_text("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_insert_and_get_chunks() {
        let mut store = ChunkStore::new_in_memory().unwrap();
        store.insert_record(&record("a", "Eins. Zwei.")).unwrap();
        store
            .insert_chunks("a", &[chunk("a", "Eins.", 1), chunk("a", "Zwei.", 1)])
            .unwrap();

        let chunks = store.get_chunks("a").unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].seq, 0);
        assert_eq!(chunks[1].chunk_text, "Zwei.");
        assert!(store.get_chunks("b").unwrap().is_empty());
    }

    #[test]
    fn test_insert_chunks_replaces_previous() {
        let mut store = ChunkStore::new_in_memory().unwrap();
        store.insert_record(&record("a", "Eins.")).unwrap();
        store
            .insert_chunks("a", &[chunk("a", "Alt.", 1), chunk("a", "Alt.", 1)])
            .unwrap();
        store.insert_chunks("a", &[chunk("a", "Neu.", 1)]).unwrap();

        let chunks = store.get_chunks("a").unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].chunk_text, "Neu.");
    }

    #[test]
    fn test_text_hash_stored() {
        let store = ChunkStore::new_in_memory().unwrap();
        store.insert_record(&record("a", "Text.")).unwrap();

        assert_eq!(store.get_text_hash("a").unwrap(), Some(hash_text("Text.")));
        assert_eq!(store.get_text_hash("missing").unwrap(), None);
    }

    #[test]
    fn test_stats() {
        let mut store = ChunkStore::new_in_memory().unwrap();
        assert_eq!(
            store.get_stats().unwrap(),
            StoreStats {
                record_count: 0,
                chunk_count: 0,
                total_tokens: 0
            }
        );

        let processed = ProcessedRecord {
            record: record("a", "Eins. Zwei."),
            chunks: vec![chunk("a", "Eins.", 3), chunk("a", "Zwei.", 4)],
        };
        store.insert_processed(&processed).unwrap();

        let stats = store.get_stats().unwrap();
        assert_eq!(stats.record_count, 1);
        assert_eq!(stats.chunk_count, 2);
        assert_eq!(stats.total_tokens, 7);
    }

    #[test]
    fn test_save_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chunks.sqlite");
        let path = path.to_str().unwrap();

        let mut store = ChunkStore::new_in_memory().unwrap();
        store
            .insert_processed(&ProcessedRecord {
                record: record("a", "Eins."),
                chunks: vec![chunk("a", "Eins.", 1)],
            })
            .unwrap();
        store.save_to_file(path).unwrap();
        // Saving twice overwrites
        store.save_to_file(path).unwrap();

        let reopened = ChunkStore::open(path).unwrap();
        assert_eq!(reopened.get_stats().unwrap().chunk_count, 1);
        assert_eq!(reopened.get_chunks("a").unwrap()[0].chunk_text, "Eins.");
    }
}
