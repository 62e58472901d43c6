use super::*;
use std::io::Write;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

fn write_tree(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (path, contents) in files {
        let full = dir.path().join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, contents).unwrap();
    }
    dir
}

fn write_zip(dir: &TempDir, files: &[(&str, &str)]) -> std::path::PathBuf {
    let path = dir.path().join("corpus.zip");
    let mut writer = zip::ZipWriter::new(File::create(&path).unwrap());
    for (name, contents) in files {
        writer
            .start_file(name.to_string(), SimpleFileOptions::default())
            .unwrap();
        writer.write_all(contents.as_bytes()).unwrap();
    }
    writer.finish().unwrap();
    path
}

// ========================================================================
// Arena
// ========================================================================

#[test]
fn test_builder_new_is_empty() {
    let builder = CorpusBuilder::new();
    assert_eq!(builder.arena.len(), 0);
    assert_eq!(builder.index.len(), 0);
}

#[test]
fn test_arena_concatenation() {
    let mut builder = CorpusBuilder::new();
    builder.add_file("a.xml", b"AAA").unwrap();
    builder.add_file("b.xml", b"BBB").unwrap();

    let corpus = builder.build();
    assert_eq!(corpus.get("a.xml").unwrap(), b"AAA");
    assert_eq!(corpus.get("b.xml").unwrap(), b"BBB");
    assert_eq!(corpus.total_size(), 6);
    assert_eq!(corpus.file_count(), 2);
}

#[test]
fn test_get_nonexistent_file() {
    let corpus = CorpusBuilder::new().build();
    assert!(corpus.get("missing.xml").is_none());
    assert!(corpus.get_entry("missing.xml").is_none());
}

#[test]
fn test_file_entry_metadata() {
    let mut builder = CorpusBuilder::new();
    builder.add_file("x.xml", b"12").unwrap();
    builder.add_file("./rrb/y.xml", b"hello").unwrap();
    let corpus = builder.build();

    let entry = corpus.get_entry("rrb/y.xml").unwrap();
    assert_eq!(entry.offset, 2);
    assert_eq!(entry.length, 5);
    assert_eq!(entry.virtual_path, "rrb/y.xml");
}

#[test]
fn test_list_is_path_ordered() {
    let mut builder = CorpusBuilder::new();
    builder.add_file("c.xml", b"c").unwrap();
    builder.add_file("a.xml", b"a").unwrap();
    builder.add_file("b/a.xml", b"b").unwrap();
    let corpus = builder.build();

    let paths: Vec<&str> = corpus.list().map(|e| e.virtual_path.as_str()).collect();
    assert_eq!(paths, vec!["a.xml", "b/a.xml", "c.xml"]);
}

#[test]
fn test_file_too_large() {
    let mut builder = CorpusBuilder::new().max_file_size(4);
    let result = builder.add_file("big.xml", b"12345");
    assert!(matches!(
        result,
        Err(CorpusError::FileTooLarge { size: 5, max: 4 })
    ));
}

#[test]
fn test_total_size_limit() {
    let mut builder = CorpusBuilder::new().max_total_size(6);
    builder.add_file("a.xml", b"1234").unwrap();
    let result = builder.add_file("b.xml", b"567");
    assert!(matches!(
        result,
        Err(CorpusError::FileTooLarge { size: 7, max: 6 })
    ));
}

#[test]
fn test_add_file_rejects_traversal() {
    let mut builder = CorpusBuilder::new();
    let result = builder.add_file("../outside.xml", b"x");
    assert!(matches!(result, Err(CorpusError::InvalidPath(_))));
}

// ========================================================================
// Ingest options
// ========================================================================

#[test]
fn test_options_filter_extension() {
    let options = IngestOptions::default();
    assert!(options.accepts("rrb/a.xml"));
    assert!(options.accepts("rrb/A.XML"));
    assert!(!options.accepts("rrb/readme.txt"));
    assert!(!options.accepts("rrb/.hidden.xml"));
}

#[test]
fn test_options_memberlists() {
    let keep = IngestOptions::default();
    assert!(keep.accepts("kr/Mitgliederliste_1850.xml"));

    let remove = IngestOptions {
        remove_memberlists: true,
        ..Default::default()
    };
    assert!(!remove.accepts("kr/Mitgliederliste_1850.xml"));
    assert!(!remove.accepts("kr/mitgliederliste/1850.xml"));
    assert!(remove.accepts("kr/protokoll_1850.xml"));
}

#[test]
fn test_options_accept_all_extensions() {
    let options = IngestOptions {
        extensions: vec![],
        remove_memberlists: false,
    };
    assert!(options.accepts("notes/protokoll.txt"));
    assert!(options.accepts("Makefile"));
}

// ========================================================================
// Directory and archive ingestion
// ========================================================================

#[test]
fn test_ingest_dir_recursive() {
    let dir = write_tree(&[
        ("1803/a.xml", "<a/>"),
        ("1804/nested/b.xml", "<b/>"),
        ("1804/notes.txt", "skip"),
        ("kr/mitgliederliste_1850.xml", "<m/>"),
    ]);
    let options = IngestOptions {
        remove_memberlists: true,
        ..Default::default()
    };

    let corpus = CorpusBuilder::new()
        .ingest_dir(dir.path(), &options)
        .unwrap()
        .build();

    let paths: Vec<&str> = corpus.list().map(|e| e.virtual_path.as_str()).collect();
    assert_eq!(paths, vec!["1803/a.xml", "1804/nested/b.xml"]);
    assert_eq!(corpus.get("1804/nested/b.xml").unwrap(), b"<b/>");
}

#[test]
fn test_ingest_missing_dir() {
    let dir = tempfile::tempdir().unwrap();
    let result =
        CorpusBuilder::new().ingest_dir(&dir.path().join("missing"), &IngestOptions::default());
    assert!(matches!(result, Err(CorpusError::ReadFailed(_))));
}

#[test]
fn test_ingest_zip() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_zip(
        &dir,
        &[
            ("rrb/a.xml", "<a/>"),
            ("__MACOSX/rrb/._a.xml", "junk"),
            ("rrb/readme.md", "skip"),
            ("rrb/1803/b.xml", "<b/>"),
        ],
    );

    let corpus = CorpusBuilder::new()
        .ingest_zip(&path, &IngestOptions::default())
        .unwrap()
        .build();

    assert_eq!(corpus.file_count(), 2);
    assert_eq!(corpus.get("rrb/a.xml").unwrap(), b"<a/>");
    assert_eq!(corpus.get("rrb/1803/b.xml").unwrap(), b"<b/>");
}

#[test]
fn test_ingest_invalid_zip() {
    let dir = write_tree(&[("broken.zip", "not a zip")]);
    let result =
        CorpusBuilder::new().ingest_zip(&dir.path().join("broken.zip"), &IngestOptions::default());
    assert!(matches!(result, Err(CorpusError::ZipParseFailed(_))));
}

#[test]
fn test_ingest_dir_skips_oversized_file() {
    let big = "x".repeat(64);
    let dir = write_tree(&[("a.xml", "<a/>"), ("b.xml", big.as_str()), ("c.xml", "<c/>")]);

    let corpus = CorpusBuilder::new()
        .max_file_size(16)
        .ingest_dir(dir.path(), &IngestOptions::default())
        .unwrap()
        .build();

    assert_eq!(corpus.file_count(), 2);
    assert!(corpus.get("c.xml").is_some());
    assert_eq!(corpus.skipped().len(), 1);
    assert_eq!(corpus.skipped()[0].path, "b.xml");
    assert!(corpus.skipped()[0].reason.contains("64 bytes"));
}

#[test]
fn test_ingest_zip_skips_entries_over_total_limit() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_zip(&dir, &[("a.xml", "12345678"), ("b.xml", "12345678"), ("c.xml", "12")]);

    let corpus = CorpusBuilder::new()
        .max_total_size(10)
        .ingest_zip(&path, &IngestOptions::default())
        .unwrap()
        .build();

    let paths: Vec<&str> = corpus.list().map(|e| e.virtual_path.as_str()).collect();
    assert_eq!(paths, vec!["a.xml", "c.xml"]);
    assert_eq!(corpus.skipped().len(), 1);
    assert_eq!(corpus.skipped()[0].path, "b.xml");
}

#[test]
fn test_builder_without_ingestion_skips_nothing() {
    let corpus = CorpusBuilder::new().build();
    assert!(corpus.skipped().is_empty());
}
