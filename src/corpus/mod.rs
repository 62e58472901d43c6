mod entry;
mod error;

#[cfg(test)]
mod tests;

pub use entry::{FileEntry, SkippedFile};
pub use error::CorpusError;

use crate::security::PathSanitizer;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Path fragment marking member lists, which hold no record text
pub const MEMBERLIST_MARKER: &str = "mitgliederliste";

/// Which files of a directory or archive become part of the corpus
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Accepted extensions without dot, matched case-insensitively; empty accepts all
    pub extensions: Vec<String>,
    /// Skip files whose path mentions a member list
    pub remove_memberlists: bool,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            extensions: vec!["xml".to_string()],
            remove_memberlists: false,
        }
    }
}

impl IngestOptions {
    /// Check whether a virtual path should be ingested
    pub fn accepts(&self, virtual_path: &str) -> bool {
        if PathSanitizer::is_hidden(virtual_path) {
            return false;
        }

        if self.remove_memberlists && virtual_path.to_lowercase().contains(MEMBERLIST_MARKER) {
            return false;
        }

        if self.extensions.is_empty() {
            return true;
        }

        let ext = Path::new(virtual_path)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }
}

/// Immutable corpus with arena-backed file storage
pub struct Corpus {
    /// Single contiguous blob containing all file data
    arena: Vec<u8>,
    /// Index mapping virtual paths to arena slices, in path order
    index: BTreeMap<String, FileEntry>,
    /// Files that could not be ingested
    skipped: Vec<SkippedFile>,
}

/// Mutable builder for constructing a corpus
pub struct CorpusBuilder {
    arena: Vec<u8>,
    index: BTreeMap<String, FileEntry>,
    skipped: Vec<SkippedFile>,
    max_file_size: u64,
    max_total_size: u64,
}

impl CorpusBuilder {
    /// Create a new builder with default limits
    pub fn new() -> Self {
        Self {
            arena: Vec::new(),
            index: BTreeMap::new(),
            skipped: Vec::new(),
            max_file_size: 50 * 1024 * 1024,       // 50 MB per file
            max_total_size: 4 * 1024 * 1024 * 1024, // 4 GB total
        }
    }

    /// Set maximum individual file size
    pub fn max_file_size(mut self, size: u64) -> Self {
        self.max_file_size = size;
        self
    }

    /// Set maximum total arena size
    pub fn max_total_size(mut self, size: u64) -> Self {
        self.max_total_size = size;
        self
    }

    /// Add a file to the corpus arena
    pub fn add_file(&mut self, raw_path: &str, data: &[u8]) -> Result<(), CorpusError> {
        let virtual_path = PathSanitizer::sanitize(raw_path)?;

        if data.len() as u64 > self.max_file_size {
            return Err(CorpusError::FileTooLarge {
                size: data.len() as u64,
                max: self.max_file_size,
            });
        }

        let new_total = self.arena.len() as u64 + data.len() as u64;
        if new_total > self.max_total_size {
            return Err(CorpusError::FileTooLarge {
                size: new_total,
                max: self.max_total_size,
            });
        }

        let offset = self.arena.len();
        self.arena.extend_from_slice(data);

        self.index.insert(
            virtual_path.clone(),
            FileEntry {
                offset,
                length: data.len(),
                virtual_path,
            },
        );

        Ok(())
    }

    /// Record a file that could not be ingested and carry on
    fn skip(&mut self, path: &str, reason: String) {
        warn!(path = %path, reason = %reason, "skipping file");
        self.skipped.push(SkippedFile {
            path: path.to_string(),
            reason,
        });
    }

    /// Ingest every accepted file below a directory, recursively
    ///
    /// Unreadable and oversized files are skipped and recorded; only a
    /// missing root fails the whole ingestion.
    pub fn ingest_dir(mut self, root: &Path, options: &IngestOptions) -> Result<Self, CorpusError> {
        if !root.is_dir() {
            return Err(CorpusError::ReadFailed(format!(
                "Not a directory: {}",
                root.display()
            )));
        }
        let before = self.index.len();

        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().map(|p| p.display().to_string()).unwrap_or_default();
                    self.skip(&path, e.to_string());
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = entry
                .path()
                .strip_prefix(root)
                .map_err(|e| CorpusError::InvalidPath(e.to_string()))?;
            let raw_path = relative.to_string_lossy();

            if !options.accepts(&raw_path) {
                debug!(path = %raw_path, "skipping file");
                continue;
            }

            let result = fs::read(entry.path())
                .map_err(|e| CorpusError::ReadFailed(e.to_string()))
                .and_then(|contents| self.add_file(&raw_path, &contents));
            if let Err(e) = result {
                self.skip(&raw_path, e.to_string());
            }
        }

        info!(
            root = %root.display(),
            files = self.index.len() - before,
            skipped = self.skipped.len(),
            "ingested directory"
        );
        Ok(self)
    }

    /// Ingest every accepted file of a ZIP archive
    ///
    /// Entries that cannot be read or exceed the limits are skipped and
    /// recorded; an unreadable archive fails the whole ingestion.
    pub fn ingest_zip(mut self, path: &Path, options: &IngestOptions) -> Result<Self, CorpusError> {
        let before = self.index.len();

        let file = File::open(path)
            .map_err(|e| CorpusError::ReadFailed(format!("{}: {}", path.display(), e)))?;
        let mut archive =
            zip::ZipArchive::new(file).map_err(|e| CorpusError::ZipParseFailed(e.to_string()))?;

        for i in 0..archive.len() {
            let mut file = match archive.by_index(i) {
                Ok(file) => file,
                Err(e) => {
                    self.skip(&format!("#{}", i), e.to_string());
                    continue;
                }
            };

            if file.is_dir() {
                continue;
            }

            let raw_path = file.name().to_string();
            if !options.accepts(&raw_path.replace('\\', "/")) {
                debug!(path = %raw_path, "skipping archive entry");
                continue;
            }

            let mut contents = Vec::new();
            let result = file
                .read_to_end(&mut contents)
                .map_err(|e| CorpusError::ZipParseFailed(e.to_string()));
            drop(file);

            if let Err(e) = result.and_then(|_| self.add_file(&raw_path, &contents)) {
                self.skip(&raw_path, e.to_string());
            }
        }

        info!(
            archive = %path.display(),
            files = self.index.len() - before,
            skipped = self.skipped.len(),
            "ingested archive"
        );
        Ok(self)
    }

    /// Build the immutable corpus
    pub fn build(self) -> Corpus {
        Corpus {
            arena: self.arena,
            index: self.index,
            skipped: self.skipped,
        }
    }
}

impl Default for CorpusBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Corpus {
    /// Get a file's contents as a byte slice (zero-copy)
    pub fn get(&self, virtual_path: &str) -> Option<&[u8]> {
        self.index
            .get(virtual_path)
            .map(|entry| &self.arena[entry.offset..entry.offset + entry.length])
    }

    /// List all files in path order
    pub fn list(&self) -> impl Iterator<Item = &FileEntry> {
        self.index.values()
    }

    /// Get metadata for a file without reading contents
    pub fn get_entry(&self, virtual_path: &str) -> Option<&FileEntry> {
        self.index.get(virtual_path)
    }

    /// Get the total number of files
    pub fn file_count(&self) -> usize {
        self.index.len()
    }

    /// Files left out during ingestion, in discovery order
    pub fn skipped(&self) -> &[SkippedFile] {
        &self.skipped
    }

    /// Get the total arena size in bytes
    pub fn total_size(&self) -> usize {
        self.arena.len()
    }
}
