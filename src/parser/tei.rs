use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::{ParseError, RawRecord, RecordParser};

/// Parser for TEI-encoded archival records
///
/// Metadata comes from the first `sourceDesc` element: its first `date`
/// (`when`/`from`/`to` attributes and text), `ident`, `ref@target` and
/// `title`. The body is the first `text` element, taken one direct child at
/// a time; direct-child tables contribute each non-empty cell separately.
/// Tag names are matched case-insensitively.
pub struct TeiParser;

/// Metadata field currently collecting character data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Date,
    Ident,
    Title,
}

/// Parse state of the `text` element
#[derive(Debug, Default)]
struct Body {
    /// Stack depth of the `text` element once entered
    depth: Option<usize>,
    done: bool,
    pieces: Vec<String>,
    /// Text of the direct child being read
    piece: String,
    /// Whether the current direct child is a table
    in_table: bool,
    /// Stack depth of the open table cell
    cell_depth: Option<usize>,
    cell: String,
}

#[derive(Debug, Default)]
struct Extraction {
    stack: Vec<String>,
    /// Stack depth of the first `sourceDesc` while inside it
    source_desc: Option<usize>,
    source_desc_seen: bool,
    date_seen: bool,
    ident_seen: bool,
    ref_seen: bool,
    title_seen: bool,
    /// Open metadata captures and the depth they close at
    captures: Vec<(Field, usize, String)>,
    body: Body,
}

impl RecordParser for TeiParser {
    fn parse(&self, path: &str, bytes: &[u8]) -> Result<RawRecord, ParseError> {
        if bytes.iter().all(|b| b.is_ascii_whitespace()) {
            return Err(ParseError::Empty(path.to_string()));
        }

        let xml_error = |message: String| ParseError::Xml {
            path: path.to_string(),
            message,
        };

        let mut reader = Reader::from_reader(bytes);
        let mut record = RawRecord::for_path(path);
        let mut state = Extraction::default();

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    let name = tag_name(&e);
                    state.stack.push(name);
                    state.open(&e, &mut record, false).map_err(xml_error)?;
                }
                Ok(Event::Empty(e)) => {
                    let name = tag_name(&e);
                    state.stack.push(name);
                    state.open(&e, &mut record, true).map_err(xml_error)?;
                    state.close(&mut record);
                }
                Ok(Event::End(_)) => state.close(&mut record),
                Ok(Event::Text(e)) => {
                    let text = match e.unescape() {
                        Ok(text) => text.into_owned(),
                        Err(_) => String::from_utf8_lossy(&e).into_owned(),
                    };
                    state.text(&text);
                }
                Ok(Event::CData(e)) => state.text(&String::from_utf8_lossy(&e)),
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => return Err(xml_error(e.to_string())),
            }
        }

        if !state.source_desc_seen {
            return Err(ParseError::MissingSourceDesc(path.to_string()));
        }

        if state.body.depth.is_some() || state.body.done {
            record.text = Some(state.body.pieces.join(" "));
        }

        Ok(record)
    }
}

impl Extraction {
    /// Handle an opened element, already pushed on the stack
    fn open(
        &mut self,
        e: &BytesStart<'_>,
        record: &mut RawRecord,
        empty: bool,
    ) -> Result<(), String> {
        let depth = self.stack.len();
        let name = self.stack[depth - 1].as_str();

        if self.source_desc.is_none() && !self.source_desc_seen && name == "sourcedesc" {
            self.source_desc = Some(depth);
            self.source_desc_seen = true;
        } else if self.source_desc.is_some() {
            match name {
                "date" if !self.date_seen => {
                    self.date_seen = true;
                    record.date_when = attribute(e, "when")?;
                    record.date_from = attribute(e, "from")?;
                    record.date_to = attribute(e, "to")?;
                    record.date_text = Some(String::new());
                    if !empty {
                        self.captures.push((Field::Date, depth, String::new()));
                    }
                }
                "ident" if !self.ident_seen => {
                    self.ident_seen = true;
                    record.ident = Some(String::new());
                    if !empty {
                        self.captures.push((Field::Ident, depth, String::new()));
                    }
                }
                "ref" if !self.ref_seen => {
                    self.ref_seen = true;
                    record.reference = attribute(e, "target")?.filter(|t| t != "leer");
                }
                "title" if !self.title_seen => {
                    self.title_seen = true;
                    record.title = Some(String::new());
                    if !empty {
                        self.captures.push((Field::Title, depth, String::new()));
                    }
                }
                _ => {}
            }
        }

        let body = &mut self.body;
        match body.depth {
            None if !body.done && name == "text" => body.depth = Some(depth),
            Some(text_depth) if depth == text_depth + 1 => {
                body.piece.clear();
                body.in_table = name == "table";
            }
            Some(_) if body.in_table && name == "cell" && body.cell_depth.is_none() => {
                body.cell_depth = Some(depth);
                body.cell.clear();
            }
            _ => {}
        }

        Ok(())
    }

    /// Handle the end of the element on top of the stack
    fn close(&mut self, record: &mut RawRecord) {
        let depth = self.stack.len();

        while let Some((field, at, _)) = self.captures.last() {
            if *at != depth {
                break;
            }
            let field = *field;
            if let Some((_, _, value)) = self.captures.pop() {
                match field {
                    Field::Date => record.date_text = Some(value),
                    Field::Ident => record.ident = Some(value),
                    Field::Title => record.title = Some(value),
                }
            }
        }

        if self.source_desc == Some(depth) {
            self.source_desc = None;
        }

        let body = &mut self.body;
        if let Some(text_depth) = body.depth {
            if body.cell_depth == Some(depth) {
                body.cell_depth = None;
                if !body.cell.is_empty() {
                    body.pieces.push(std::mem::take(&mut body.cell));
                }
            }
            if depth == text_depth + 1 {
                if !body.in_table && !body.piece.is_empty() {
                    body.pieces.push(std::mem::take(&mut body.piece));
                }
                body.in_table = false;
            } else if depth == text_depth {
                body.depth = None;
                body.done = true;
            }
        }

        self.stack.pop();
    }

    /// Route character data to every open capture
    fn text(&mut self, text: &str) {
        for (_, _, value) in self.captures.iter_mut() {
            value.push_str(text);
        }

        let body = &mut self.body;
        if let Some(text_depth) = body.depth {
            if self.stack.len() > text_depth {
                if body.cell_depth.is_some() {
                    body.cell.push_str(text);
                } else if !body.in_table {
                    body.piece.push_str(text);
                }
            }
        }
    }
}

fn tag_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).to_lowercase()
}

fn attribute(e: &BytesStart<'_>, key: &str) -> Result<Option<String>, String> {
    for attr in e.attributes() {
        let attr = attr.map_err(|err| err.to_string())?;
        if attr.key.local_name().as_ref().eq_ignore_ascii_case(key.as_bytes()) {
            let value = attr.unescape_value().map_err(|err| err.to_string())?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}
