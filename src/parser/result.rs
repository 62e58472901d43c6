/// Fields extracted from one archival record, before any normalization
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    /// Virtual path from the corpus
    pub path: String,
    /// Last path component (e.g., "MM_1_01_RRB_1803_0001.xml")
    pub filename: String,
    /// `when` attribute of the source date
    pub date_when: Option<String>,
    /// `from` attribute of the source date
    pub date_from: Option<String>,
    /// `to` attribute of the source date
    pub date_to: Option<String>,
    /// Human-readable date as written in the source
    pub date_text: Option<String>,
    /// Archive signature, possibly spread over several lines
    pub ident: Option<String>,
    /// Link to the record in the archive's search portal
    pub reference: Option<String>,
    /// Record title
    pub title: Option<String>,
    /// Body text; `None` when the record has no text element
    pub text: Option<String>,
}

impl RawRecord {
    /// Create an empty record for a path
    pub fn for_path(path: &str) -> Self {
        Self {
            path: path.to_string(),
            filename: path.rsplit('/').next().unwrap_or(path).to_string(),
            ..Default::default()
        }
    }
}
