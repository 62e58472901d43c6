//! Metadata cleanup for extracted records
//!
//! Dates are backfilled from the start of their range, padded to full
//! calendar dates and parsed; archive signatures lose their line breaks; and
//! decision ids of the `rrb` series are rebuilt from file names, which needs
//! the whole collection at once. Records without such an id are named by
//! their corpus path.

mod dates;
mod ident;


pub use dates::{DATE_FORMAT, complete_partial_date, fill_missing_date, parse_date, resolve_date};
pub use ident::{BASE_DOC_LINK_RRB, RrbFilename, RrbId, clean_identifier, reformat_rrb_ids};

use chrono::NaiveDate;
use serde::Serialize;
use std::path::Path;

use crate::parser::RawRecord;

/// Series whose file names encode decision ids
pub const RRB_SERIES: &str = "rrb";

/// A record with normalized metadata, ready for text cleaning and chunking
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchivalRecord {
    /// Document identifier carried by every chunk
    pub identifier: String,
    /// Cleaned archive signature
    pub ident: Option<String>,
    pub date: Option<NaiveDate>,
    pub date_text: Option<String>,
    pub series: String,
    pub link: Option<String>,
    pub title: Option<String>,
    /// Virtual path in the corpus
    pub path: String,
    pub filename: String,
    pub text: Option<String>,
}

/// Normalize the metadata of a collection of records from one series
pub fn normalize(records: Vec<RawRecord>, series: &str) -> Vec<ArchivalRecord> {
    let rrb_names: Vec<Option<RrbFilename>> = records
        .iter()
        .map(|r| {
            if series == RRB_SERIES {
                RrbFilename::parse(&r.filename)
            } else {
                None
            }
        })
        .collect();

    let ids: Vec<RrbId> = rrb_names
        .iter()
        .flatten()
        .filter_map(|name| RrbId::parse(&name.raw_id()))
        .collect();
    let mut formatted = reformat_rrb_ids(&ids).into_iter();

    records
        .into_iter()
        .zip(rrb_names)
        .map(|(record, rrb)| {
            let rrb_id = rrb
                .as_ref()
                .and_then(|name| RrbId::parse(&name.raw_id()))
                .and_then(|_| formatted.next());

            let identifier = rrb_id.unwrap_or_else(|| path_identifier(&record.path));
            let link = rrb.map(|name| name.link()).or(record.reference);

            ArchivalRecord {
                identifier,
                ident: record.ident.as_deref().map(clean_identifier),
                date: resolve_date(record.date_when.as_deref(), record.date_from.as_deref()),
                date_text: record.date_text.map(|t| t.trim().to_string()),
                series: series.to_string(),
                link,
                title: record.title.map(|t| t.trim().to_string()),
                path: record.path,
                filename: record.filename,
                text: record.text,
            }
        })
        .collect()
}

/// Virtual path without its extension, unique within a corpus
fn path_identifier(path: &str) -> String {
    match Path::new(path).extension().and_then(|e| e.to_str()) {
        Some(ext) => path[..path.len() - ext.len() - 1].to_string(),
        None => path.to_string(),
    }
}
