use std::collections::{BTreeSet, HashMap};

/// Base link to decisions of the government council in the archive portal
pub const BASE_DOC_LINK_RRB: &str = "https://archives-quickaccess.ch/stazh/rrb/ref/";

/// Remove line breaks and redundant whitespace from an archive signature
pub fn clean_identifier(ident: &str) -> String {
    ident
        .replace('\n', "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parts of a decision file name such as `MM_1_01_RRB_1803_0001a.xml`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RrbFilename {
    /// Volume, e.g. `1.01`
    pub band: String,
    pub year: String,
    /// Decision number with any document suffix, e.g. `0001a`
    pub doc_no: String,
}

impl RrbFilename {
    pub fn parse(filename: &str) -> Option<Self> {
        let parts: Vec<&str> = filename.split('_').collect();
        if parts.len() < 6 {
            return None;
        }

        let doc_no = parts[5].trim_end_matches(".xml");
        if parts[1..3].iter().any(|p| p.is_empty()) || parts[4].is_empty() || doc_no.is_empty() {
            return None;
        }

        Some(Self {
            band: parts[1..3].join("."),
            year: parts[4].to_string(),
            doc_no: doc_no.to_string(),
        })
    }

    /// Link to the online version of the decision
    pub fn link(&self) -> String {
        format!(
            "{}MM+{}+RRB+{}/{}",
            BASE_DOC_LINK_RRB, self.band, self.year, self.doc_no
        )
    }

    /// Decision id in the raw `year_number` form
    pub fn raw_id(&self) -> String {
        format!("{}_{}", self.year, self.doc_no)
    }
}

/// A raw decision id `1803_0001a` split into year, number and suffix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RrbId {
    pub year: String,
    /// First four characters of the decision number
    pub number: String,
    /// Remaining characters marking additional documents of one decision
    pub suffix: String,
}

impl RrbId {
    pub fn parse(raw: &str) -> Option<Self> {
        let (year, no) = raw.split_once('_')?;
        let no = no.split('_').next().unwrap_or(no);
        let split = no.char_indices().nth(4).map(|(i, _)| i).unwrap_or(no.len());

        Some(Self {
            year: year.to_string(),
            number: no[..split].to_string(),
            suffix: no[split..].to_string(),
        })
    }
}

/// Reformat decision ids to `year-number-document`
///
/// Several decisions consist of more than one document, marked by a suffix
/// after the four-digit number. The document number is the 1-based rank of
/// the suffix among all distinct suffixes of the collection, so the plain
/// number (empty suffix) becomes `-1`.
pub fn reformat_rrb_ids(ids: &[RrbId]) -> Vec<String> {
    let suffixes: BTreeSet<&str> = ids.iter().map(|id| id.suffix.as_str()).collect();
    let ranks: HashMap<&str, usize> = suffixes
        .into_iter()
        .enumerate()
        .map(|(i, suffix)| (suffix, i + 1))
        .collect();

    ids.iter()
        .map(|id| {
            let rank = ranks.get(id.suffix.as_str()).copied().unwrap_or(1);
            format!("{}-{}-{}", id.year, id.number, rank)
        })
        .collect()
}
