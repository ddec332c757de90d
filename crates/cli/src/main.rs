use anyhow::{bail, Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand};
use codedoc_cli::{group_by_language, IngestReport};
use codedoc_ingest::{Collection, IngestConfig, IngestError, Origin, SourceCollector, UploadedFile};
use codedoc_symbols::SymbolExtractor;
use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "codedoc")]
#[command(about = "Collect a source tree, outline its symbols, render model output as HTML", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for output)
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect files and print them with their outlines as JSON
    Ingest(IngestArgs),

    /// Convert markdown-ish text to HTML
    Render(RenderArgs),
}

#[derive(Args)]
struct IngestArgs {
    /// Repository URL, a .zip archive, a directory, or individual files
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Skip symbol extraction
    #[arg(long)]
    no_analysis: bool,

    /// Pretty-print JSON
    #[arg(long)]
    pretty: bool,

    /// Ingestion settings file, JSON or TOML (defaults to $CODEDOC_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args)]
struct RenderArgs {
    /// Input file (reads stdin when omitted or `-`)
    file: Option<PathBuf>,
}

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    match cli.command {
        Commands::Ingest(args) => run_ingest(args).await,
        Commands::Render(args) => run_render(&args),
    }
}

async fn run_ingest(args: IngestArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let collector = SourceCollector::new(&config)?;

    let collection = collect(&collector, &args.inputs).await?;

    let extractor = SymbolExtractor::new();
    let report = IngestReport::build(&collection, (!args.no_analysis).then_some(&extractor));

    for (language, files) in group_by_language(&report.files) {
        log::info!("{language}: {} file(s)", files.len());
    }
    log::info!(
        "{} files, {} lines, {} functions, {} classes",
        report.metrics.files_processed,
        report.metrics.total_lines,
        report.metrics.total_functions,
        report.metrics.total_classes
    );

    let json = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    print_stdout(&json)
}

fn run_render(args: &RenderArgs) -> Result<()> {
    let text = match args.file.as_deref() {
        Some(path) if path != Path::new("-") => fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        _ => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };
    print_stdout(&codedoc_markup::render(&text))
}

fn load_config(flag: Option<&Path>) -> Result<IngestConfig> {
    let path = flag
        .map(Path::to_path_buf)
        .or_else(|| env::var_os("CODEDOC_CONFIG").map(PathBuf::from));

    match path {
        Some(path) => {
            log::debug!("Loading ingest config from {}", path.display());
            IngestConfig::from_file(&path)
                .with_context(|| format!("Failed to load config {}", path.display()))
        }
        None => Ok(IngestConfig::default()),
    }
}

fn is_repository_url(input: &str) -> bool {
    input.contains("://") || input.starts_with("git@")
}

async fn collect(collector: &SourceCollector, inputs: &[String]) -> Result<Collection> {
    if let [single] = inputs {
        if is_repository_url(single) {
            return Ok(collector.collect(Origin::Repository(single.clone())).await?);
        }

        let path = Path::new(single);
        if path.is_dir() {
            let collection = collector.collect_directory(path)?;
            if collection.is_empty() {
                return Err(IngestError::NoEligibleFiles.into());
            }
            return Ok(collection);
        }
        if single.to_lowercase().ends_with(".zip") {
            let bytes = fs::read(path).with_context(|| format!("Failed to read {single}"))?;
            return Ok(collector.collect(Origin::Archive(bytes)).await?);
        }
    }

    let mut uploads = Vec::with_capacity(inputs.len());
    for input in inputs {
        if is_repository_url(input) {
            bail!("A repository URL must be the only input");
        }
        let path = Path::new(input);
        if path.is_dir() {
            bail!("{input} is a directory; pass it as the only input");
        }
        let bytes = fs::read(path).with_context(|| format!("Failed to read {input}"))?;
        uploads.push(UploadedFile::new(upload_name(path), bytes));
    }

    Ok(collector.collect(Origin::Uploads(uploads)).await?)
}

/// Relative paths keep their directories; absolute paths keep only the file name
fn upload_name(path: &Path) -> String {
    if path.is_absolute() {
        path.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    } else {
        path.to_string_lossy().into_owned()
    }
}
