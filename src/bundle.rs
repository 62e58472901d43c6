use anyhow::{Context, Result};
use chrono::{Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use tracing::info;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::chunker::ChunkerConfig;
use crate::pipeline::{IndexRecord, PipelineOutput};
use crate::store::ChunkStore;

pub const DATABASE_ENTRY: &str = "chunks.sqlite";
pub const JSONL_ENTRY: &str = "chunks.jsonl";
pub const MANIFEST_ENTRY: &str = "manifest.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub version: String,
    pub created_at: String,
    pub generator: String,
    pub series: String,
    pub chunker: ChunkerConfig,
    pub stats: ManifestStats,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestStats {
    pub file_count: usize,
    pub record_count: usize,
    pub chunk_count: usize,
    pub failure_count: usize,
}

/// Collects a pipeline run and writes it as a single ZIP bundle
pub struct BundleWriter {
    store: ChunkStore,
    rows: Vec<IndexRecord>,
    manifest: Manifest,
}

impl BundleWriter {
    pub fn new(series: impl Into<String>, chunker: ChunkerConfig) -> Result<Self> {
        let store = ChunkStore::new_in_memory().context("Failed to create in-memory database")?;

        let manifest = Manifest {
            version: "1.0.0".to_string(),
            created_at: Utc::now().to_rfc3339(),
            generator: format!("archive-chunker v{}", env!("CARGO_PKG_VERSION")),
            series: series.into(),
            chunker,
            stats: ManifestStats {
                file_count: 0,
                record_count: 0,
                chunk_count: 0,
                failure_count: 0,
            },
        };

        Ok(Self {
            store,
            rows: Vec::new(),
            manifest,
        })
    }

    /// Add every record of a pipeline run
    pub fn add_output(&mut self, output: &PipelineOutput) -> Result<()> {
        for processed in &output.records {
            self.store
                .insert_processed(processed)
                .context(format!("Failed to store {}", processed.record.identifier))?;
            self.rows.extend(processed.index_records());
        }

        let stats = &mut self.manifest.stats;
        stats.file_count += output.report.files_seen;
        stats.record_count += output.records.len();
        stats.chunk_count += output.report.chunk_count;
        stats.failure_count += output.report.failures.len();
        Ok(())
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Write the bundle to a ZIP file
    pub fn write_to_file(&self, output_path: &str) -> Result<()> {
        info!(path = %output_path, "writing bundle");

        let temp_db_path = format!("{}.tmp.db", output_path);
        self.store
            .save_to_file(&temp_db_path)
            .context("Failed to save database to temporary file")?;

        let mut db_contents = Vec::new();
        File::open(&temp_db_path)
            .context("Failed to open temporary database file")?
            .read_to_end(&mut db_contents)
            .context("Failed to read database contents")?;
        std::fs::remove_file(&temp_db_path)
            .context("Failed to remove temporary database file")?;

        let file = File::create(output_path)
            .context(format!("Failed to create output file: {}", output_path))?;
        let mut zip = ZipWriter::new(file);

        let now = chrono::Local::now();
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(0o644)
            .last_modified_time(
                zip::DateTime::from_date_and_time(
                    now.year() as u16,
                    now.month() as u8,
                    now.day() as u8,
                    now.hour() as u8,
                    now.minute() as u8,
                    now.second() as u8,
                )
                .unwrap_or_default(),
            );

        zip.start_file(DATABASE_ENTRY, options)
            .context("Failed to start database file in ZIP")?;
        zip.write_all(&db_contents)
            .context("Failed to write database to ZIP")?;

        zip.start_file(JSONL_ENTRY, options)
            .context("Failed to start JSONL file in ZIP")?;
        write_jsonl(&mut zip, &self.rows)?;

        zip.start_file(MANIFEST_ENTRY, options)
            .context("Failed to start manifest file in ZIP")?;
        let manifest_json =
            serde_json::to_string_pretty(&self.manifest).context("Failed to serialize manifest")?;
        zip.write_all(manifest_json.as_bytes())
            .context("Failed to write manifest to ZIP")?;

        zip.finish().context("Failed to finalize ZIP file")?;

        info!(
            path = %output_path,
            records = self.manifest.stats.record_count,
            chunks = self.manifest.stats.chunk_count,
            "bundle written"
        );
        Ok(())
    }
}

/// Write index rows as JSON Lines, one object per line
pub fn write_jsonl<W: Write>(writer: &mut W, rows: &[IndexRecord]) -> Result<()> {
    for row in rows {
        serde_json::to_writer(&mut *writer, row).context("Failed to serialize index record")?;
        writer.write_all(b"\n").context("Failed to write JSONL")?;
    }
    Ok(())
}

/// Write index rows as a JSON Lines file
pub fn write_jsonl_file(path: &Path, rows: &[IndexRecord]) -> Result<()> {
    let file = File::create(path).context(format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_jsonl(&mut writer, rows)?;
    writer.flush().context("Failed to flush JSONL")?;
    Ok(())
}

/// Read the manifest of an existing bundle
pub fn read_manifest(bundle_path: &str) -> Result<Manifest> {
    let file =
        File::open(bundle_path).context(format!("Failed to open bundle: {}", bundle_path))?;
    let mut archive = ZipArchive::new(file).context("Failed to read ZIP archive")?;

    let mut manifest_file = archive
        .by_name(MANIFEST_ENTRY)
        .context("manifest.json not found in bundle")?;
    let mut contents = String::new();
    manifest_file
        .read_to_string(&mut contents)
        .context("Failed to read manifest")?;

    serde_json::from_str(&contents).context("Failed to parse manifest.json")
}
