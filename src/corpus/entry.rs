/// Metadata for a single file in the corpus arena
#[derive(Debug, Clone)]
pub struct FileEntry {
    /// Byte offset into the arena
    pub offset: usize,
    /// Length in bytes
    pub length: usize,
    /// Sanitized virtual path (e.g., "1803/MM_1_01_RRB_1803_0001.xml")
    pub virtual_path: String,
}

/// A file left out of the corpus during ingestion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    /// Path as found in the directory or archive
    pub path: String,
    pub reason: String,
}
