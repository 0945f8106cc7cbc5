use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use policylens_core::config_file::{self, ConfigFile};
use policylens_core::PolicyAnalyzer;
use policylens_ingest::{
    BatchOptions, BatchProgress, ExtractError, PdfTextExtractor, load_text, process_batch,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

mod output;

use output::ColorMode;

/// Privacy policy analyzer - summarize policies and flag risky data practices
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Output format (default: text)
    #[arg(long, global = true, value_enum)]
    format: Option<OutputFormat>,

    /// Path to output file (default: stdout)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Config file to use instead of the platform/.policylens.toml cascade
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Abort PDF extraction after this many seconds
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarize a policy and flag the risk terms it contains
    Analyze {
        /// PDF or text file to analyze
        #[arg(required_unless_present = "text", conflicts_with = "text")]
        file: Option<PathBuf>,

        /// Analyze this text instead of a file
        #[arg(long)]
        text: Option<String>,

        /// Analyze extracted PDF text without cleaning it first
        #[arg(long)]
        raw: bool,
    },

    /// Compare the risks of two policies
    Compare {
        /// Policy files (PDF or text), first then second; --text-a/--text-b
        /// take the place of a file
        #[arg(num_args = 0..=2)]
        files: Vec<PathBuf>,

        /// Text of the first policy
        #[arg(long)]
        text_a: Option<String>,

        /// Text of the second policy
        #[arg(long)]
        text_b: Option<String>,

        /// Analyze extracted PDF text without cleaning it first
        #[arg(long)]
        raw: bool,
    },

    /// Print the text extracted from a PDF
    Extract {
        /// PDF file
        file: PathBuf,

        /// Skip text cleaning
        #[arg(long)]
        raw: bool,
    },

    /// Print a PDF's embedded metadata
    Metadata {
        /// PDF file
        file: PathBuf,
    },

    /// Extract and analyze many files, reporting per-file success or failure
    Batch {
        /// PDF or text files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Analyze extracted PDF text without cleaning it first
        #[arg(long)]
        raw: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    fn parse(s: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(s, true).ok()
    }
}

/// Options resolved from CLI flags > env vars > config file > defaults.
struct Settings {
    format: OutputFormat,
    color: ColorMode,
    clean: bool,
    timeout_secs: Option<u64>,
    analyzer: PolicyAnalyzer,
    extractor: PdfTextExtractor,
}

impl Settings {
    fn resolve(cli: &Cli, config: &ConfigFile, extractor: PdfTextExtractor) -> Self {
        let format = cli
            .format
            .or_else(|| {
                std::env::var("POLICYLENS_FORMAT")
                    .ok()
                    .and_then(|v| OutputFormat::parse(&v))
            })
            .or_else(|| config.format().and_then(OutputFormat::parse))
            .unwrap_or(OutputFormat::Text);

        let use_color = !cli.no_color
            && cli.output.is_none()
            && std::env::var_os("NO_COLOR").is_none()
            && config.color().unwrap_or(true);

        let timeout_secs = cli.timeout_secs.or_else(|| {
            std::env::var("POLICYLENS_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .or_else(|| config.timeout_secs())
        });

        let vocabulary = config.risk_vocabulary();
        tracing::debug!(terms = vocabulary.len(), "risk vocabulary loaded");

        Self {
            format,
            color: ColorMode(use_color),
            clean: config.clean_extracted_text(),
            timeout_secs,
            analyzer: PolicyAnalyzer::new(Arc::new(vocabulary)),
            extractor,
        }
    }

    fn clean(&self, raw: bool) -> bool {
        self.clean && !raw
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => config_file::load_from_path(path)
            .ok_or_else(|| anyhow::anyhow!("Could not load config file {}", path.display()))?,
        None => config_file::load_config(),
    };
    let settings = Settings::resolve(&cli, &config, PdfTextExtractor::default());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(run(cli, settings));
    // A timed-out extraction may still be running on the blocking pool;
    // do not wait for it.
    runtime.shutdown_background();
    result
}

async fn run(cli: Cli, settings: Settings) -> anyhow::Result<()> {
    // Rendered in memory so a failed command never truncates `--output`.
    let mut report: Vec<u8> = Vec::new();
    let writer: &mut dyn Write = &mut report;

    match cli.command {
        Command::Analyze { file, text, raw } => {
            let (name, text) = match (file, text) {
                (_, Some(text)) => ("input text".to_string(), text),
                (Some(path), None) => {
                    let text = read_document(&path, &settings, raw).await?;
                    (display_name(&path), text)
                }
                (None, None) => anyhow::bail!("Provide a file or --text"),
            };
            let result = settings.analyzer.analyze(&text);
            match settings.format {
                OutputFormat::Json => output::write_json(&mut *writer, &result)?,
                OutputFormat::Text => {
                    output::print_analysis(&mut *writer, &name, &result, settings.color)?
                }
            }
        }
        Command::Compare {
            files,
            text_a,
            text_b,
            raw,
        } => {
            let mut files = files.into_iter();
            let input_a = text_a.map(Input::Text).or_else(|| files.next().map(Input::File));
            let input_b = text_b.map(Input::Text).or_else(|| files.next().map(Input::File));
            if files.next().is_some() {
                anyhow::bail!("Too many inputs: give two policies in total");
            }
            let (name_a, text_a) = resolve_input(input_a, "first", &settings, raw).await?;
            let (name_b, text_b) = resolve_input(input_b, "second", &settings, raw).await?;
            let comparison = settings.analyzer.compare(&text_a, &text_b);
            match settings.format {
                OutputFormat::Json => output::write_json(&mut *writer, &comparison)?,
                OutputFormat::Text => output::print_comparison(
                    &mut *writer,
                    &name_a,
                    &name_b,
                    &comparison,
                    settings.color,
                )?,
            }
        }
        Command::Extract { file, raw } => {
            let text = read_document(&file, &settings, raw).await?;
            match settings.format {
                OutputFormat::Json => output::write_json(
                    &mut *writer,
                    &serde_json::json!({
                        "path": file.display().to_string(),
                        "characters": text.chars().count(),
                        "text": text,
                    }),
                )?,
                OutputFormat::Text => writeln!(writer, "{}", text)?,
            }
        }
        Command::Metadata { file } => {
            ensure_exists(&file)?;
            let metadata = settings.extractor.try_get_metadata(&file)?;
            match settings.format {
                OutputFormat::Json => output::write_json(&mut *writer, &metadata)?,
                OutputFormat::Text => output::print_metadata(
                    &mut *writer,
                    &display_name(&file),
                    &metadata,
                    settings.color,
                )?,
            }
        }
        Command::Batch { files, raw } => batch(files, &settings, raw, &mut *writer).await?,
    }

    match cli.output {
        Some(ref output_path) => std::fs::write(output_path, &report)?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&report)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

/// One side of a comparison.
enum Input {
    File(PathBuf),
    Text(String),
}

async fn resolve_input(
    input: Option<Input>,
    which: &str,
    settings: &Settings,
    raw: bool,
) -> anyhow::Result<(String, String)> {
    match input {
        Some(Input::Text(text)) => Ok((format!("{} text", which), text)),
        Some(Input::File(path)) => {
            let text = read_document(&path, settings, raw).await?;
            Ok((display_name(&path), text))
        }
        None => anyhow::bail!("Provide the {} policy as a file or text", which),
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn ensure_exists(path: &Path) -> anyhow::Result<()> {
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }
    Ok(())
}

/// Load a document's text on the blocking pool, bounded by the configured
/// timeout. A document with no text is an error, not an empty policy.
async fn read_document(path: &Path, settings: &Settings, raw: bool) -> anyhow::Result<String> {
    ensure_exists(path)?;

    let extractor = settings.extractor.clone();
    let clean = settings.clean(raw);
    let owned = path.to_path_buf();
    let task = tokio::task::spawn_blocking(move || load_text(&owned, &extractor, clean));

    let joined = match settings.timeout_secs {
        Some(secs) => tokio::time::timeout(Duration::from_secs(secs), task)
            .await
            .map_err(|_| ExtractError::Timeout {
                path: path.to_path_buf(),
                secs,
            })?,
        None => task.await,
    };
    let loaded = joined??;
    let kind = loaded.kind;
    let text = loaded.into_non_empty(path)?;
    tracing::info!(
        path = %path.display(),
        kind = ?kind,
        chars = text.len(),
        "loaded document"
    );
    Ok(text)
}

async fn batch(
    files: Vec<PathBuf>,
    settings: &Settings,
    raw: bool,
    writer: &mut dyn Write,
) -> anyhow::Result<()> {
    use indicatif::{ProgressBar, ProgressStyle};

    let total = files.len();
    let bar = ProgressBar::new(total as u64);
    bar.set_style(
        ProgressStyle::with_template("{spinner:.green} [{bar:40.green/dim}] {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );

    let cancel = CancellationToken::new();

    // Set up Ctrl+C handler
    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel_clone.cancel();
        }
    });

    let extractor = settings.extractor.clone();
    let analyzer = settings.analyzer.clone();
    let options = BatchOptions {
        clean: settings.clean(raw),
    };
    let progress_bar = bar.clone();
    let items = tokio::task::spawn_blocking(move || {
        process_batch(
            &files,
            &extractor,
            &analyzer,
            options,
            |event| match event {
                BatchProgress::Processing { path, .. } => {
                    progress_bar.set_message(display_name(path));
                }
                BatchProgress::Done { .. } => progress_bar.inc(1),
            },
            &cancel,
        )
    })
    .await?;
    bar.finish_and_clear();

    match settings.format {
        OutputFormat::Json => output::write_json(writer, &items)?,
        OutputFormat::Text => {
            for (index, item) in items.iter().enumerate() {
                output::print_batch_item(writer, index, total, item, settings.color)?;
            }
            output::print_batch_summary(writer, &items, total, settings.color)?;
        }
    }
    Ok(())
}
