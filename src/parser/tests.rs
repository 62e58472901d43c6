use super::*;

const RECORD: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<TEI xmlns="http://www.tei-c.org/ns/1.0">
  <teiHeader>
    <fileDesc>
      <titleStmt><title>Header title</title></titleStmt>
      <sourceDesc>
        <bibl>
          <title>Strassenbau im Bezirk Horgen</title>
          <date when="1803-05-12">12. Mai 1803</date>
          <ident>MM 1.1
            RRB 1803/0001</ident>
          <ref target="https://suche.staatsarchiv.djiktzh.ch/detail.aspx?ID=123"/>
        </bibl>
      </sourceDesc>
    </fileDesc>
  </teiHeader>
  <text>
    <p>Der Rat beschliesst.</p>
    <table>
      <row><cell>Posten</cell><cell>Betrag</cell></row>
      <row><cell>Kies</cell><cell></cell></row>
    </table>
    <p>Mitteilung an die <hi>Gemeinde</hi> Horgen.</p>
  </text>
</TEI>"#;

// ========================================================================
// TEI parser
// ========================================================================

#[test]
fn test_tei_extracts_metadata() {
    let record = TeiParser
        .parse("1803/MM_1_01_RRB_1803_0001.xml", RECORD.as_bytes())
        .unwrap();

    assert_eq!(record.path, "1803/MM_1_01_RRB_1803_0001.xml");
    assert_eq!(record.filename, "MM_1_01_RRB_1803_0001.xml");
    assert_eq!(record.date_when.as_deref(), Some("1803-05-12"));
    assert_eq!(record.date_from, None);
    assert_eq!(record.date_to, None);
    assert_eq!(record.date_text.as_deref(), Some("12. Mai 1803"));
    assert_eq!(record.ident.as_deref(), Some("MM 1.1\n            RRB 1803/0001"));
    assert_eq!(
        record.reference.as_deref(),
        Some("https://suche.staatsarchiv.djiktzh.ch/detail.aspx?ID=123")
    );
    // The header title outside sourceDesc is ignored
    assert_eq!(record.title.as_deref(), Some("Strassenbau im Bezirk Horgen"));
}

#[test]
fn test_tei_extracts_body_with_table_cells() {
    let record = TeiParser.parse("a.xml", RECORD.as_bytes()).unwrap();

    assert_eq!(
        record.text.as_deref(),
        Some("Der Rat beschliesst. Posten Betrag Kies Mitteilung an die Gemeinde Horgen.")
    );
}

#[test]
fn test_tei_date_range_without_when() {
    let xml = concat!(
        r#"<TEI><sourceDesc><date from="1803-05" to="1803-06">Mai 1803</date>"#,
        r#"<title>T</title></sourceDesc>"#,
        r#"<text><p>x</p></text></TEI>"#,
    );
    let record = TeiParser.parse("b.xml", xml.as_bytes()).unwrap();

    assert_eq!(record.date_when, None);
    assert_eq!(record.date_from.as_deref(), Some("1803-05"));
    assert_eq!(record.date_to.as_deref(), Some("1803-06"));
}

#[test]
fn test_tei_empty_reference_placeholder() {
    let xml = concat!(
        r#"<TEI><sourceDesc><ref target="leer"/><title>T</title></sourceDesc>"#,
        r#"<text><p>x</p></text></TEI>"#,
    );
    let record = TeiParser.parse("c.xml", xml.as_bytes()).unwrap();

    assert_eq!(record.reference, None);
    assert_eq!(record.date_when, None);
    assert_eq!(record.date_text, None);
    assert_eq!(record.ident, None);
}

#[test]
fn test_tei_case_insensitive_tags() {
    let xml = concat!(
        r#"<tei><SOURCEDESC><IDENT>X 1</IDENT><Title>T</Title></SOURCEDESC>"#,
        r#"<TEXT><P>Hallo.</P></TEXT></tei>"#,
    );
    let record = TeiParser.parse("d.xml", xml.as_bytes()).unwrap();

    assert_eq!(record.ident.as_deref(), Some("X 1"));
    assert_eq!(record.text.as_deref(), Some("Hallo."));
}

#[test]
fn test_tei_missing_text_element() {
    let xml = r#"<TEI><sourceDesc><title>T</title></sourceDesc></TEI>"#;
    let record = TeiParser.parse("e.xml", xml.as_bytes()).unwrap();

    assert_eq!(record.text, None);
}

#[test]
fn test_tei_empty_text_element() {
    let xml = r#"<TEI><sourceDesc><title>T</title></sourceDesc><text/></TEI>"#;
    let record = TeiParser.parse("f.xml", xml.as_bytes()).unwrap();

    assert_eq!(record.text.as_deref(), Some(""));
}

#[test]
fn test_tei_unescapes_entities() {
    let xml = concat!(
        r#"<TEI><sourceDesc><title>A &amp; B</title></sourceDesc>"#,
        r#"<text><p>1 &lt; 2</p></text></TEI>"#,
    );
    let record = TeiParser.parse("g.xml", xml.as_bytes()).unwrap();

    assert_eq!(record.title.as_deref(), Some("A & B"));
    assert_eq!(record.text.as_deref(), Some("1 < 2"));
}

#[test]
fn test_tei_empty_input() {
    let result = TeiParser.parse("empty.xml", b"  \n");
    assert_eq!(result.unwrap_err(), ParseError::Empty("empty.xml".to_string()));
}

#[test]
fn test_tei_missing_source_desc() {
    let result = TeiParser.parse("h.xml", b"<TEI><text><p>x</p></text></TEI>");
    assert_eq!(
        result.unwrap_err(),
        ParseError::MissingSourceDesc("h.xml".to_string())
    );
}

#[test]
fn test_tei_malformed_xml() {
    let result = TeiParser.parse("i.xml", b"<TEI><sourceDesc></TEI>");
    assert!(matches!(result, Err(ParseError::Xml { .. })));
}

// ========================================================================
// Plain text parser
// ========================================================================

#[test]
fn test_plain_text_record() {
    let record = PlainTextParser
        .parse("notes/protokoll.txt", "Ein Satz. Noch einer.".as_bytes())
        .unwrap();

    assert_eq!(record.filename, "protokoll.txt");
    assert_eq!(record.text.as_deref(), Some("Ein Satz. Noch einer."));
    assert_eq!(record.title, None);
}

#[test]
fn test_plain_text_binary_extracts_printable() {
    let record = PlainTextParser
        .parse("blob.bin", &[0xFF, b'a', b'b', 0x00, b' ', b'c'])
        .unwrap();
    assert_eq!(record.text.as_deref(), Some("ab c"));
}

#[test]
fn test_plain_text_empty() {
    assert!(matches!(
        PlainTextParser.parse("blank.txt", b"   "),
        Err(ParseError::Empty(_))
    ));
}

// ========================================================================
// Registry
// ========================================================================

#[test]
fn test_registry_fallback_to_plain_text() {
    let registry = ParserRegistry::new();
    let parser = registry.select("notes.txt");

    let record = parser.parse("notes.txt", b"<p>not xml</p>").unwrap();
    assert_eq!(record.text.as_deref(), Some("<p>not xml</p>"));
}

#[test]
fn test_registry_defaults_select_tei() {
    let registry = ParserRegistry::with_defaults();
    assert_eq!(registry.extensions(), vec!["xml".to_string()]);

    let record = registry.parse("RECORD.XML", RECORD.as_bytes()).unwrap();
    assert!(record.title.is_some());
}

#[test]
fn test_registry_custom_parser() {
    struct FixedParser;

    impl RecordParser for FixedParser {
        fn parse(&self, path: &str, _bytes: &[u8]) -> Result<RawRecord, ParseError> {
            let mut record = RawRecord::for_path(path);
            record.text = Some("fixed".to_string());
            Ok(record)
        }
    }

    let mut registry = ParserRegistry::new();
    registry.register("Fix", FixedParser);
    assert_eq!(registry.extensions(), vec!["fix".to_string()]);

    let record = registry.select("a/b.fix").parse("a/b.fix", b"").unwrap();
    assert_eq!(record.text.as_deref(), Some("fixed"));
}
