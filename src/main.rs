use anyhow::{Context, Result, bail};
use archive_chunker::bundle::write_jsonl_file;
use archive_chunker::segment::DEFAULT_HF_TOKENIZER;
use archive_chunker::{
    BundleWriter, CharRatioTokenCounter, ChunkStore, Chunker, ChunkerConfig, CorpusBuilder,
    DEFAULT_MAX_TOKENS, DEFAULT_OVERLAP_TOKENS, HfTokenCounter, IngestOptions, ParserRegistry,
    Pipeline, RuleSentenceSplitter, WordTokenCounter, write_jsonl,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "archive-chunker",
    version,
    about = "Chunk archival TEI records for vector search"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse, clean and chunk a directory or ZIP archive of records
    Run(RunArgs),
    /// Print statistics of a chunk database
    Stats {
        /// Path to a chunks.sqlite file
        #[arg(value_name = "DB")]
        db: PathBuf,
    },
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Directory or .zip archive with the records of one series
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Series name; `rrb` rebuilds decision ids from file names
    #[arg(short, long, default_value = "rrb")]
    series: String,

    /// Token ceiling per chunk
    #[arg(long, env = "ARCHIVE_CHUNKER_MAX_TOKENS", default_value_t = DEFAULT_MAX_TOKENS)]
    max_tokens: usize,

    /// Tokens carried over into the next chunk
    #[arg(
        long,
        env = "ARCHIVE_CHUNKER_OVERLAP_TOKENS",
        default_value_t = DEFAULT_OVERLAP_TOKENS
    )]
    overlap_tokens: usize,

    /// How sentence tokens are counted
    #[arg(short, long, value_enum, default_value = "words")]
    tokenizer: Tokenizer,

    /// tokenizer.json for `--tokenizer hf` (default: fetch --tokenizer-model)
    #[arg(long, value_name = "FILE")]
    tokenizer_file: Option<PathBuf>,

    /// Hugging Face model whose tokenizer `--tokenizer hf` fetches
    #[arg(long, value_name = "NAME", default_value = DEFAULT_HF_TOKENIZER)]
    tokenizer_model: String,

    /// Skip member lists
    #[arg(long)]
    remove_memberlists: bool,

    /// Write chunks to a SQLite database
    #[arg(long, value_name = "FILE")]
    db: Option<PathBuf>,

    /// Write index rows as JSON Lines (default: stdout when no other output is given)
    #[arg(long, value_name = "FILE")]
    jsonl: Option<PathBuf>,

    /// Write a ZIP bundle with database, JSON Lines and manifest
    #[arg(long, value_name = "FILE")]
    bundle: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Tokenizer {
    /// One token per whitespace-separated word
    Words,
    /// One token per four characters
    Chars,
    /// The embedding model's own subword tokenizer
    Hf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run(args) => run(args),
        Command::Stats { db } => stats(&db),
    }
}

fn run(args: RunArgs) -> Result<()> {
    let start_time = Instant::now();

    // Step 1: Build corpus
    let step_start = Instant::now();
    let registry = ParserRegistry::with_defaults();
    let options = IngestOptions {
        extensions: registry.extensions(),
        remove_memberlists: args.remove_memberlists,
    };
    let builder = CorpusBuilder::new();
    let builder = if is_zip(&args.input) {
        builder.ingest_zip(&args.input, &options)
    } else {
        builder.ingest_dir(&args.input, &options)
    }
    .context(format!("Failed to ingest {}", args.input.display()))?;
    let corpus = builder.build();
    info!(
        files = corpus.file_count(),
        bytes = corpus.total_size(),
        secs = step_start.elapsed().as_secs_f64(),
        "corpus loaded"
    );

    // Step 2: Chunk
    let step_start = Instant::now();
    let config = ChunkerConfig::new(args.max_tokens, args.overlap_tokens);
    let splitter = RuleSentenceSplitter::new();
    let chunker = match args.tokenizer {
        Tokenizer::Words => Chunker::new(splitter, WordTokenCounter, config),
        Tokenizer::Chars => Chunker::new(splitter, CharRatioTokenCounter::default(), config),
        Tokenizer::Hf => {
            let counter = match &args.tokenizer_file {
                Some(path) => HfTokenCounter::from_file(path)?,
                None => HfTokenCounter::from_pretrained(&args.tokenizer_model)?,
            };
            Chunker::new(splitter, counter, config)
        }
    }
    .context("Invalid chunker configuration")?;
    let pipeline = Pipeline::new(chunker, args.series.clone())
        .context("Failed to build text cleaner")?
        .with_registry(registry);
    let output = pipeline.run(&corpus);
    info!(
        records = output.records.len(),
        chunks = output.report.chunk_count,
        failures = output.report.failures.len(),
        secs = step_start.elapsed().as_secs_f64(),
        "chunking complete"
    );

    // Step 3: Write outputs
    let rows = output.index_records();

    if let Some(db_path) = &args.db {
        let mut store = ChunkStore::open(path_str(db_path)?)?;
        for processed in &output.records {
            store.insert_processed(processed)?;
        }
        info!(path = %db_path.display(), "database written");
    }

    if let Some(jsonl_path) = &args.jsonl {
        write_jsonl_file(jsonl_path, &rows)?;
        info!(path = %jsonl_path.display(), rows = rows.len(), "JSON Lines written");
    }

    if let Some(bundle_path) = &args.bundle {
        let mut writer = BundleWriter::new(pipeline.series(), config)?;
        writer.add_output(&output)?;
        writer.write_to_file(path_str(bundle_path)?)?;
        eprintln!(
            "Bundle:           {} ({} records, {} chunks)",
            bundle_path.display(),
            writer.manifest().stats.record_count,
            writer.manifest().stats.chunk_count
        );
    }

    if args.db.is_none() && args.jsonl.is_none() && args.bundle.is_none() {
        let stdout = std::io::stdout();
        write_jsonl(&mut stdout.lock(), &rows)?;
    }

    for failure in &output.report.failures {
        eprintln!("  ✗ {}: {}", failure.path, failure.reason);
    }
    eprintln!("=== Run Statistics ===");
    eprintln!("Files:            {}", output.report.files_seen);
    eprintln!("Records parsed:   {}", output.report.records_parsed);
    eprintln!("Records chunked:  {}", output.report.documents_chunked);
    eprintln!("Chunks:           {}", output.report.chunk_count);
    eprintln!("Failures:         {}", output.report.failures.len());
    eprintln!("Total time:       {:.2}s", start_time.elapsed().as_secs_f64());

    Ok(())
}

fn stats(db: &Path) -> Result<()> {
    if !db.is_file() {
        bail!("Database not found: {}", db.display());
    }
    let store = ChunkStore::open(path_str(db)?)?;
    let stats = store.get_stats()?;

    println!("Records:  {}", stats.record_count);
    println!("Chunks:   {}", stats.chunk_count);
    println!("Tokens:   {}", stats.total_tokens);
    Ok(())
}

fn is_zip(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("zip"))
}

fn path_str(path: &Path) -> Result<&str> {
    path.to_str()
        .context(format!("Path is not valid UTF-8: {}", path.display()))
}
