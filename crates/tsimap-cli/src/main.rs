use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tsimap_core::{
    BlobSource, CONTROLLER_ENTRY_NAME, DecodeError, MappingDecoder, RawBlobSource, Report,
    SourceError, TsiFileSource, decode_source, walk_events,
};

mod input;
mod render;

use input::{ensure_distinct_output, resolve_input_path, validate_input_file};

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("TSIMAP_BUILD_COMMIT"),
    " ",
    env!("TSIMAP_BUILD_DATE"),
    ")"
);
const DEFAULT_LOG_FILTER: &str = "tsimap=warn";
const VERBOSE_LOG_FILTER: &str = "tsimap=debug";
const LOG_JSON_ENV: &str = "TSIMAP_LOG_JSON";

const EXAMPLES: &str = "Examples:\n  tsimap tsi dump Traktor.tsi -o mappings.json\n  tsimap tsi dump Traktor.tsi --stdout --pretty\n  tsimap tsi dump Traktor.tsi -o mappings.json --csv mappings.csv\n  tsimap tsi frames controller.bin --raw --show-skipped";

#[derive(Parser, Debug)]
#[command(name = "tsimap")]
#[command(version = VERSION)]
#[command(
    about = "Decoder for Traktor controller mappings stored in .tsi settings files.",
    long_about = None,
    after_help = EXAMPLES
)]
struct Cli {
    /// Log decoder diagnostics at debug level (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Operations on Traktor settings files.
    Tsi {
        #[command(subcommand)]
        command: TsiCommands,
    },
}

#[derive(Subcommand, Debug)]
enum TsiCommands {
    /// Decode controller mappings into a versioned JSON report.
    #[command(alias = "decode")]
    #[command(after_help = EXAMPLES)]
    Dump(DumpArgs),
    /// Print the raw frame tree of the mapping blob.
    #[command(alias = "walk")]
    Frames(FramesArgs),
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// Path to a .tsi file (or a blob with --raw); glob patterns must match one file
    input: PathBuf,

    /// Treat the input as an already extracted binary blob
    #[arg(long)]
    raw: bool,

    /// Settings entry holding the base64 blob
    #[arg(long, default_value = CONTROLLER_ENTRY_NAME, conflicts_with = "raw")]
    entry_name: String,
}

#[derive(Args, Debug)]
struct DumpArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Output report path (JSON); stdout when omitted
    #[arg(short = 'o', long)]
    report: Option<PathBuf>,

    /// Write the JSON report to stdout
    #[arg(long, conflicts_with = "report")]
    stdout: bool,

    /// Also write one CSV row per mapping to this path
    #[arg(long, value_name = "PATH")]
    csv: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long, conflicts_with = "compact")]
    pretty: bool,

    /// Compact JSON output (default)
    #[arg(long)]
    compact: bool,

    /// Suppress non-error output
    #[arg(long)]
    quiet: bool,

    /// Exit with a non-zero code if error or warning issues are present
    #[arg(long)]
    strict: bool,

    /// List check issues on stderr after decoding
    #[arg(long)]
    list_issues: bool,
}

#[derive(Args, Debug)]
struct FramesArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Also print regions stepped over during resync
    #[arg(long)]
    show_skipped: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Tsi { command } => match command {
            TsiCommands::Dump(args) => cmd_tsi_dump(args),
            TsiCommands::Frames(args) => cmd_tsi_frames(args),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

fn init_tracing(verbose: bool) {
    let env_filter = if verbose {
        EnvFilter::new(VERBOSE_LOG_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    };
    let json_logging = std::env::var(LOG_JSON_ENV)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(false);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr);
    if json_logging {
        builder.json().with_target(true).init();
    } else {
        builder.with_target(false).compact().init();
    }
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{err:#}"), None)
    }
}

impl From<DecodeError> for CliError {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::Source(SourceError::EntryMissing { name }) => CliError::new(
                format!("settings file has no '{name}' entry"),
                Some("check --entry-name, or pass --raw for an extracted blob".to_string()),
            ),
            DecodeError::Source(SourceError::Xml(message)) => CliError::new(
                format!("settings file is not valid XML: {message}"),
                Some("pass --raw if the input is an extracted blob".to_string()),
            ),
            other => CliError::new(format!("decoding failed: {other}"), None),
        }
    }
}

fn cmd_tsi_dump(args: DumpArgs) -> Result<(), CliError> {
    let input = prepare_input(&args.source)?;
    for (path, flag) in [(&args.report, "report"), (&args.csv, "csv")] {
        if let Some(path) = path {
            ensure_distinct_output(&input, path, flag)?;
        }
    }
    let json_to_stdout = args.stdout || args.report.is_none();

    let report = decode_input(&input, &args.source)?;
    let json = render::serialize_report(&report, args.pretty, args.compact)?;

    if json_to_stdout {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{json}").context("Failed to write report to stdout")?;
    }
    if let Some(report_path) = &args.report {
        write_output(report_path, &json)?;
        if !args.quiet {
            eprintln!("OK: report written -> {}", report_path.display());
        }
    }
    if let Some(csv_path) = &args.csv {
        let csv = render::records_to_csv(&report.mappings)?;
        write_output(csv_path, &csv)?;
        if !args.quiet {
            eprintln!("OK: csv written -> {}", csv_path.display());
        }
    }

    if args.list_issues && !args.quiet && !report.issues.is_empty() {
        eprint!("{}", render::format_issues(&report.issues));
    }
    if args.strict && has_blocking_issues(&report) {
        return Err(CliError::new(
            "mapping issues detected",
            Some("use --list-issues to inspect".to_string()),
        ));
    }
    Ok(())
}

fn cmd_tsi_frames(args: FramesArgs) -> Result<(), CliError> {
    let input = prepare_input(&args.source)?;
    let blob = read_blob(&input, &args.source)?;

    debug!(bytes = blob.len(), "walking mapping blob");
    let tree = render::format_frame_tree(walk_events(&blob), args.show_skipped);
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(tree.as_bytes())
        .context("Failed to write frame tree to stdout")?;
    Ok(())
}

fn prepare_input(source: &SourceArgs) -> Result<PathBuf, CliError> {
    let resolved = resolve_input_path(&source.input)?;
    validate_input_file(&resolved, source.raw)?;
    Ok(resolved)
}

fn read_blob(path: &Path, source: &SourceArgs) -> Result<Vec<u8>, DecodeError> {
    let blob = if source.raw {
        RawBlobSource::open(path)?.mapping_blob()?
    } else {
        TsiFileSource::open(path, &source.entry_name)?.mapping_blob()?
    };
    Ok(blob)
}

fn decode_input(path: &Path, source: &SourceArgs) -> Result<Report, DecodeError> {
    let decoder = MappingDecoder::new();
    if source.raw {
        decode_source(path, RawBlobSource::open(path)?, &decoder)
    } else {
        decode_source(path, TsiFileSource::open(path, &source.entry_name)?, &decoder)
    }
}

fn write_output(path: &Path, contents: &str) -> Result<(), CliError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }
    fs::write(path, contents)
        .with_context(|| format!("Failed to write output: {}", path.display()))?;
    Ok(())
}

fn has_blocking_issues(report: &Report) -> bool {
    report.issues.iter().any(|issue| issue.is_blocking())
}
