use crate::corpus::CorpusError;
use std::path::{Component, Path};

/// Archive tooling leftovers that never hold records
const METADATA_DIRS: &[&str] = &["__MACOSX"];

pub struct PathSanitizer;

impl PathSanitizer {
    /// Turn a path from a ZIP entry or directory walk into a virtual path
    ///
    /// Rejects empty paths, absolute paths and parent traversal (zip slip),
    /// drops `.` components and joins the rest with forward slashes.
    /// Backslash separators from archives packed on Windows are accepted.
    pub fn sanitize(raw_path: &str) -> Result<String, CorpusError> {
        if raw_path.is_empty() {
            return Err(CorpusError::InvalidPath("Empty path".to_string()));
        }

        let unified = raw_path.replace('\\', "/");
        let mut components = Vec::new();

        for component in Path::new(&unified).components() {
            match component {
                Component::Prefix(_) | Component::RootDir => {
                    return Err(CorpusError::InvalidPath(format!(
                        "Absolute path not allowed: {}",
                        raw_path
                    )));
                }
                Component::ParentDir => {
                    return Err(CorpusError::InvalidPath(format!(
                        "Parent directory traversal not allowed: {}",
                        raw_path
                    )));
                }
                Component::CurDir => continue,
                Component::Normal(part) => {
                    let part = part.to_str().ok_or_else(|| {
                        CorpusError::InvalidPath(format!("Invalid UTF-8 in path: {:?}", part))
                    })?;
                    components.push(part);
                }
            }
        }

        if components.is_empty() {
            return Err(CorpusError::InvalidPath(format!(
                "No valid components: {}",
                raw_path
            )));
        }

        Ok(components.join("/"))
    }

    /// Whether a virtual path points into hidden or archive metadata folders
    pub fn is_hidden(virtual_path: &str) -> bool {
        virtual_path
            .split('/')
            .any(|part| part.starts_with('.') || METADATA_DIRS.contains(&part))
    }
}
