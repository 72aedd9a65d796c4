//! CLI binary for pdf2txt.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `BatchConfig` and prints results.
//!
//! Exit codes: 0 when every PDF converted, 1 when at least one file failed,
//! 2 when the batch could not run at all.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use pdf2txt::pipeline::scan::{check_output_dir, scan_input_dir};
use pdf2txt::pipeline::write::write_atomic;
use pdf2txt::{
    convert_all, extract_file, BatchConfig, BatchProgressCallback, BatchReport, PageBreak,
    PageSelection, Pdf2TxtError, ProgressCallback,
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a bar over the files of the batch plus one
/// log line per file.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Start time of the file currently being converted.
    current: Mutex<Option<Instant>>,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_batch_start
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);
        bar.set_style(spinner_style);
        bar.set_prefix("Scanning");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            current: Mutex::new(None),
            errors: AtomicUsize::new(0),
        })
    }

    fn elapsed_secs(&self) -> f64 {
        self.current
            .lock()
            .ok()
            .and_then(|mut g| g.take())
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl BatchProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_files: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} files  \
             ⏱ {elapsed_precise}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total_files as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Converting");
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Converting {total_files} PDF files…"))
        ));
    }

    fn on_file_start(&self, _index: usize, _total: usize, path: &Path) {
        if let Ok(mut g) = self.current.lock() {
            *g = Some(Instant::now());
        }
        self.bar.set_message(display_name(path));
    }

    fn on_file_complete(&self, index: usize, total: usize, path: &Path, chars: usize) {
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {:<32}  {}  {}",
            green("✓"),
            index,
            total,
            display_name(path),
            dim(&format!("{chars:>7} chars")),
            dim(&format!("{:.1}s", self.elapsed_secs())),
        ));
        self.bar.inc(1);
    }

    fn on_file_error(&self, index: usize, total: usize, path: &Path, error: &str) {
        self.errors.fetch_add(1, Ordering::SeqCst);

        // Keep the line on one terminal row.
        let first_line = error.lines().next().unwrap_or(error);
        let msg: String = if first_line.chars().count() > 80 {
            let cut: String = first_line.chars().take(79).collect();
            format!("{cut}\u{2026}")
        } else {
            first_line.to_string()
        };

        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {:<32}  {}  {}",
            red("✗"),
            index,
            total,
            display_name(path),
            red(&msg),
            dim(&format!("{:.1}s", self.elapsed_secs())),
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, _attempted: usize, _succeeded: usize) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert every PDF in ./pdfs into ./text (one <name>.pdf.txt per PDF)
  pdf2txt convert --input pdfs --output text

  # Keep the historical .doc naming for downstream consumers
  pdf2txt convert -i pdfs -o text --suffix .doc

  # First two pages of each PDF, pages separated by a newline
  pdf2txt convert -i pdfs -o text --pages 1-2 --page-break newline

  # Stop at the first file that fails
  pdf2txt convert -i pdfs -o text --fail-fast

  # Machine-readable report
  pdf2txt convert -i pdfs -o text --json > report.json

  # Single file to stdout
  pdf2txt extract paper.pdf --pages 1,3

EXIT CODES:
  0  every PDF was converted
  1  at least one PDF failed (the others were still converted)
  2  nothing could be done (missing directory, bad option, no PDF engine)

ENVIRONMENT VARIABLES:
  PDF2TXT_INPUT           Input directory for `convert`
  PDF2TXT_OUTPUT          Output directory for `convert`
  PDFIUM_LIB_PATH         Path to an existing libpdfium — skips auto-download
  PDFIUM_AUTO_CACHE_DIR   Override the default pdfium cache directory
  RUST_LOG                Log filter (e.g. pdf2txt=debug)

SETUP:
  PDFium (~30 MB) is downloaded automatically on first run and cached in
  ~/.cache/pdf2txt/pdfium-<VERSION>/. No manual library setup is required.
"#;

/// Batch-convert PDF files to plain text.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2txt",
    version,
    about = "Batch-convert a directory of PDF files to plain-text files",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "PDF2TXT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "PDF2TXT_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert every *.pdf in a directory into a text file per PDF.
    Convert(ConvertArgs),
    /// Extract the text of one PDF to stdout or a file.
    Extract(ExtractArgs),
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// Directory containing the PDFs (default: current directory).
    #[arg(short, long, env = "PDF2TXT_INPUT")]
    input: Option<PathBuf>,

    /// Directory receiving the text files. Must already exist.
    #[arg(short, long, env = "PDF2TXT_OUTPUT")]
    output: PathBuf,

    /// Appended to each PDF file name to name its text file.
    #[arg(long, env = "PDF2TXT_SUFFIX", default_value = pdf2txt::DEFAULT_SUFFIX)]
    suffix: String,

    #[command(flatten)]
    text: TextArgs,

    /// Stop at the first failing file instead of continuing.
    #[arg(long, env = "PDF2TXT_FAIL_FAST")]
    fail_fast: bool,

    /// Print the batch report as JSON on stdout.
    #[arg(long, env = "PDF2TXT_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDF2TXT_NO_PROGRESS")]
    no_progress: bool,
}

#[derive(Args, Debug)]
struct ExtractArgs {
    /// The PDF to read.
    input: PathBuf,

    /// Write the text to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    text: TextArgs,
}

#[derive(Args, Debug)]
struct TextArgs {
    /// Page selection: all, 5, 3-15, or 1,3,5,7.
    #[arg(long, env = "PDF2TXT_PAGES", default_value = "all")]
    pages: String,

    /// Written after each page: formfeed, newline, none, or a custom string.
    #[arg(long, env = "PDF2TXT_PAGE_BREAK", default_value = "formfeed")]
    page_break: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", red("error:"), e);
            ExitCode::from(error_exit_status(&e))
        }
    }
}

/// 1 when a single file failed, 2 when nothing could run.
fn error_exit_status(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<Pdf2TxtError>() {
        Some(Pdf2TxtError::File(_)) => 1,
        _ => 2,
    }
}

/// 0 when every discovered PDF converted, 1 otherwise.
fn batch_exit_status(report: &BatchReport) -> u8 {
    if report.is_complete_success() {
        0
    } else {
        1
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = match &cli.command {
        Command::Convert(args) => !cli.quiet && !args.no_progress && !args.json,
        Command::Extract(_) => false,
    };
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Convert(args) => run_convert(args, cli.quiet, show_progress).await,
        Command::Extract(args) => {
            ensure_engine(cli.quiet)?;
            run_extract(args).await
        }
    }
}

/// Make sure the PDFium library is on disk, showing a download bar on the
/// very first run (~30 MB from bblanchon/pdfium-binaries).
fn ensure_engine(quiet: bool) -> Result<()> {
    if pdfium_auto::is_pdfium_cached() {
        return Ok(());
    }

    if quiet {
        tokio::task::block_in_place(|| pdfium_auto::ensure_pdfium_library(None))
            .context("Failed to download PDFium engine")?;
        return Ok(());
    }

    let dl_bar = ProgressBar::new(0);
    dl_bar.set_style(
        ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {bytes}/{total_bytes}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS),
    );
    dl_bar.set_prefix("PDF engine");
    dl_bar.enable_steady_tick(Duration::from_millis(80));

    let bar = dl_bar.clone();
    tokio::task::block_in_place(|| {
        pdfium_auto::ensure_pdfium_library(Some(&|downloaded, total| {
            if let Some(t) = total {
                if bar.length().unwrap_or(0) != t {
                    bar.set_length(t);
                }
            }
            bar.set_position(downloaded);
        }))
    })
    .context("Failed to download PDFium engine")?;

    dl_bar.finish_with_message("ready ✓");
    Ok(())
}

async fn run_convert(args: ConvertArgs, quiet: bool, show_progress: bool) -> Result<ExitCode> {
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn BatchProgressCallback>)
    } else {
        None
    };

    let config = build_config(&args, progress_cb)?;
    let output_dir = config.output_dir.clone();

    // Directory problems are reported before any download is attempted.
    let scan = scan_input_dir(&config.effective_input_dir()).await?;
    check_output_dir(&output_dir).await?;
    if !scan.pdfs.is_empty() {
        ensure_engine(quiet || args.json)?;
    }

    let report = convert_all(&config).await.context("Conversion failed")?;

    if args.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialise report")?;
        println!("{json}");
    }

    if !quiet {
        print_summary(&report, &output_dir);
    }

    Ok(ExitCode::from(batch_exit_status(&report)))
}

fn print_summary(report: &BatchReport, output_dir: &Path) {
    let s = &report.stats;
    if s.discovered == 0 {
        eprintln!("{} no PDF files found ({} other entries ignored)", cyan("⚠"), s.ignored);
        return;
    }

    eprintln!(
        "{}  {}/{} files converted  {}ms  →  {}",
        if s.failed == 0 && s.skipped == 0 {
            green("✔")
        } else if s.succeeded == 0 {
            red("✘")
        } else {
            cyan("⚠")
        },
        bold(&s.succeeded.to_string()),
        s.attempted,
        s.total_duration_ms,
        bold(&output_dir.display().to_string()),
    );

    if s.failed > 0 {
        eprintln!("   {} failed:", red(&s.failed.to_string()));
        for f in report.failures() {
            if let Some(ref e) = f.error {
                eprintln!("     {} {}", red("✗"), e);
            }
        }
    }
    if s.skipped > 0 {
        eprintln!("   {} skipped after the first failure (--fail-fast)", s.skipped);
    }
}

async fn run_extract(args: ExtractArgs) -> Result<ExitCode> {
    let pages = parse_pages(&args.text.pages)?;
    let page_break = parse_page_break(&args.text.page_break);

    let text = extract_file(&args.input, &pages, &page_break, None).await?;

    if let Some(path) = args.output {
        write_text_file(path, text).await?;
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(text.as_bytes())
            .context("Failed to write to stdout")?;
    }

    Ok(ExitCode::SUCCESS)
}

/// Place `text` at `path` the same way batch outputs are placed.
async fn write_text_file(path: PathBuf, text: String) -> Result<()> {
    let display = path.display().to_string();
    tokio::task::spawn_blocking(move || write_atomic(&path, &text))
        .await
        .context("Write task panicked")?
        .map_err(Pdf2TxtError::from)
        .with_context(|| format!("Failed to write {display}"))
}

/// Map CLI args to `BatchConfig`.
fn build_config(args: &ConvertArgs, progress: Option<ProgressCallback>) -> Result<BatchConfig> {
    let pages = parse_pages(&args.text.pages)?;
    let page_break = parse_page_break(&args.text.page_break);

    let mut builder = BatchConfig::builder()
        .output_dir(&args.output)
        .suffix(args.suffix.clone())
        .pages(pages)
        .page_break(page_break)
        .fail_fast(args.fail_fast);

    if let Some(ref input) = args.input {
        builder = builder.input_dir(input);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Parse `--pages` string into `PageSelection`.
fn parse_pages(s: &str) -> Result<PageSelection> {
    let s = s.trim().to_lowercase();

    if s == "all" {
        return Ok(PageSelection::All);
    }

    // Range: "3-15"
    if let Some((start, end)) = s.split_once('-') {
        let start: usize = start
            .trim()
            .parse()
            .context("Invalid start page in range")?;
        let end: usize = end.trim().parse().context("Invalid end page in range")?;

        if start < 1 {
            anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", start);
        }
        if start > end {
            anyhow::bail!(
                "Invalid page range '{}-{}': start must be <= end",
                start,
                end
            );
        }

        return Ok(PageSelection::Range(start, end));
    }

    // Set: "1,3,5,7"
    if s.contains(',') {
        let pages: Vec<usize> = s
            .split(',')
            .map(|p| {
                p.trim()
                    .parse::<usize>()
                    .with_context(|| format!("Invalid page number: '{}'", p.trim()))
            })
            .collect::<Result<Vec<_>>>()?;

        if let Some(&p) = pages.iter().find(|&&p| p < 1) {
            anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", p);
        }

        return Ok(PageSelection::Set(pages));
    }

    // Single page: "5"
    let page: usize = s.parse().context("Invalid page number")?;
    if page < 1 {
        anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", page);
    }

    Ok(PageSelection::Single(page))
}

/// Parse `--page-break` string into `PageBreak`. `\n` and `\f` escapes are
/// honoured in custom strings.
fn parse_page_break(s: &str) -> PageBreak {
    match s.to_lowercase().as_str() {
        "formfeed" | "ff" => PageBreak::FormFeed,
        "newline" | "nl" => PageBreak::Newline,
        "none" => PageBreak::None,
        _ => PageBreak::Custom(s.replace("\\n", "\n").replace("\\f", "\x0c")),
    }
}
