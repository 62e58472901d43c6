//! Corpus → parse → normalize → clean → chunk
//!
//! Every stage is per record except normalization, which sees the whole
//! collection of a series. Bad records are reported and skipped; one broken
//! file never aborts a batch.

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::chunker::{Chunk, Chunker, Document};
use crate::clean::TextCleaner;
use crate::corpus::Corpus;
use crate::normalize::{ArchivalRecord, normalize};
use crate::parser::{ParserRegistry, RawRecord};

/// One row of the vector index: a chunk with its record's metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRecord {
    pub identifier: String,
    pub stazh_ident: Option<String>,
    pub date: Option<NaiveDate>,
    pub series: String,
    pub link: Option<String>,
    pub title: Option<String>,
    pub chunk_text: String,
}

/// A record after cleaning, together with its chunks
#[derive(Debug, Clone)]
pub struct ProcessedRecord {
    pub record: ArchivalRecord,
    pub chunks: Vec<Chunk>,
}

impl ProcessedRecord {
    /// Index rows for this record, in chunk order
    pub fn index_records(&self) -> impl Iterator<Item = IndexRecord> + '_ {
        self.chunks.iter().map(|chunk| IndexRecord {
            identifier: chunk.identifier.clone(),
            stazh_ident: self.record.ident.clone(),
            date: self.record.date,
            series: self.record.series.clone(),
            link: self.record.link.clone(),
            title: self.record.title.clone(),
            chunk_text: chunk.chunk_text.clone(),
        })
    }
}

/// A file or record that was dropped, and why
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub path: String,
    pub reason: String,
}

/// Counts and failures of one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineReport {
    pub files_seen: usize,
    pub records_parsed: usize,
    pub documents_chunked: usize,
    pub chunk_count: usize,
    pub failures: Vec<Failure>,
}

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub records: Vec<ProcessedRecord>,
    pub report: PipelineReport,
}

impl PipelineOutput {
    /// All index rows, grouped by record in corpus order
    pub fn index_records(&self) -> Vec<IndexRecord> {
        self.records.iter().flat_map(|r| r.index_records()).collect()
    }
}

pub struct Pipeline {
    registry: ParserRegistry,
    cleaner: TextCleaner,
    chunker: Chunker,
    series: String,
}

impl Pipeline {
    pub fn new(chunker: Chunker, series: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            registry: ParserRegistry::with_defaults(),
            cleaner: TextCleaner::new()?,
            chunker,
            series: series.into(),
        })
    }

    /// Replace the default parser registry
    pub fn with_registry(mut self, registry: ParserRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn series(&self) -> &str {
        &self.series
    }

    pub fn run(&self, corpus: &Corpus) -> PipelineOutput {
        let mut report = PipelineReport {
            files_seen: corpus.file_count() + corpus.skipped().len(),
            failures: corpus
                .skipped()
                .iter()
                .map(|skipped| Failure {
                    path: skipped.path.clone(),
                    reason: skipped.reason.clone(),
                })
                .collect(),
            ..Default::default()
        };

        let raw = self.parse_all(corpus, &mut report);
        report.records_parsed = raw.len();

        let records: Vec<ArchivalRecord> = normalize(raw, &self.series)
            .into_iter()
            .map(|mut record| {
                record.text = record.text.map(|t| self.cleaner.clean(&t));
                record
            })
            .collect();

        let mut seen = HashSet::new();
        let mut accepted = Vec::with_capacity(records.len());
        for record in records {
            if !seen.insert(record.identifier.clone()) {
                warn!(path = %record.path, identifier = %record.identifier, "duplicate identifier");
                report.failures.push(Failure {
                    path: record.path.clone(),
                    reason: format!("Duplicate identifier {}", record.identifier),
                });
                continue;
            }

            match Document::try_new(record.identifier.clone(), record.text.clone()) {
                Ok(document) => accepted.push((record, document)),
                Err(err) => {
                    warn!(
                        path = %record.path,
                        identifier = %record.identifier,
                        "record has no text"
                    );
                    report.failures.push(Failure {
                        path: record.path.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        let processed: Vec<ProcessedRecord> = accepted
            .into_par_iter()
            .map(|(record, document)| {
                let chunks = self.chunker.chunk(&document);
                debug!(
                    identifier = %document.identifier,
                    chunks = chunks.len(),
                    "chunked record"
                );
                ProcessedRecord { record, chunks }
            })
            .collect();

        report.documents_chunked = processed.len();
        report.chunk_count = processed.iter().map(|r| r.chunks.len()).sum();

        info!(
            files = report.files_seen,
            records = report.records_parsed,
            chunks = report.chunk_count,
            failures = report.failures.len(),
            "pipeline finished"
        );

        PipelineOutput {
            records: processed,
            report,
        }
    }

    fn parse_all(&self, corpus: &Corpus, report: &mut PipelineReport) -> Vec<RawRecord> {
        let entries: Vec<_> = corpus.list().collect();

        let results: Vec<_> = entries
            .into_par_iter()
            .map(|entry| {
                let path = entry.virtual_path.as_str();
                let bytes = corpus.get(path).unwrap_or_default();
                (path, self.registry.parse(path, bytes))
            })
            .collect();

        let mut records = Vec::with_capacity(results.len());
        for (path, result) in results {
            match result {
                Ok(record) => records.push(record),
                Err(err) => {
                    warn!(path = %path, error = %err, "failed to parse record");
                    report.failures.push(Failure {
                        path: path.to_string(),
                        reason: err.to_string(),
                    });
                }
            }
        }
        records
    }
}
