use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use glob::glob;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("DROIDSTATE_BUILD_COMMIT"),
    " ",
    env!("DROIDSTATE_BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "droidstate")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Decoder for droid large state telemetry packets.",
    long_about = None,
    after_help = "Examples:\n  droidstate decode telemetry.bin -o report.json\n  droidstate decode telemetry.bin --stdout --pretty\n  droidstate layout --json"
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode a recorded capture of back-to-back packets into a JSON report.
    #[command(
        after_help = "Examples:\n  droidstate decode telemetry.bin -o report.json\n  droidstate decode 'captures/*.bin' --stdout"
    )]
    Decode {
        /// Path to a capture file (a glob matching exactly one file is accepted)
        input: PathBuf,

        /// Output report path (JSON)
        #[arg(short = 'o', long, required_unless_present = "stdout")]
        report: Option<PathBuf>,

        /// Write JSON report to stdout
        #[arg(long, conflicts_with = "report")]
        stdout: bool,

        /// Pretty-print JSON output
        #[arg(long, conflicts_with = "compact")]
        pretty: bool,

        /// Compact JSON output (default)
        #[arg(long)]
        compact: bool,

        /// Suppress non-error output
        #[arg(long)]
        quiet: bool,

        /// Exit with a non-zero code if any frame was rejected
        #[arg(long)]
        strict: bool,

        /// List rejected frames after decoding
        #[arg(long)]
        list_rejected: bool,
    },
    /// Print the packet layout descriptor and section table.
    Layout {
        /// Print the layout as JSON
        #[arg(long)]
        json: bool,
    },
}

struct DecodeArgs {
    input: PathBuf,
    report: Option<PathBuf>,
    stdout: bool,
    pretty: bool,
    compact: bool,
    quiet: bool,
    strict: bool,
    list_rejected: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Decode {
            input,
            report,
            stdout,
            pretty,
            compact,
            quiet,
            strict,
            list_rejected,
        } => cmd_decode(DecodeArgs {
            input,
            report,
            stdout,
            pretty,
            compact,
            quiet,
            strict,
            list_rejected,
        }),
        Commands::Layout { json } => cmd_layout(json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::debug!("command failed: {}", err);
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
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
        CliError::new(format!("{:#}", err), None)
    }
}

fn cmd_decode(args: DecodeArgs) -> Result<(), CliError> {
    let resolved_input = resolve_input_path(&args.input)?;
    validate_input_file(&resolved_input)?;
    let input_abs = fs::canonicalize(&resolved_input)
        .with_context(|| format!("Failed to resolve input path: {}", resolved_input.display()))?;

    let report = if args.stdout {
        None
    } else {
        Some(args.report.clone().ok_or_else(|| {
            CliError::new(
                "missing output path",
                Some("use -o/--report or --stdout".to_string()),
            )
        })?)
    };

    if let Some(report_path) = report.as_ref() {
        if resolve_report_target(report_path)?.as_ref() == Some(&input_abs) {
            return Err(CliError::new(
                format!(
                    "report path must differ from input: {}",
                    report_path.display()
                ),
                Some("choose a different output path".to_string()),
            ));
        }
    }

    log::debug!("decoding {}", resolved_input.display());
    let rep = droidstate_core::decode_capture_file(&resolved_input).map_err(|err| {
        let hint = match &err {
            droidstate_core::AnalysisError::Decode(_) => {
                Some("the decoder's schemas and layout disagree; this is a bug".to_string())
            }
            droidstate_core::AnalysisError::Source(_) => None,
        };
        CliError::new(format!("capture decoding failed: {}", err), hint)
    })?;
    let json = serialize_report(&rep, args.pretty, args.compact)?;

    match report {
        None => print!("{}", json),
        Some(report) => {
            if let Some(parent) = report.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create output directory: {}", parent.display())
                    })?;
                }
            }
            fs::write(&report, json)
                .with_context(|| format!("Failed to write report: {}", report.display()))?;
            if !args.quiet {
                eprintln!(
                    "OK: {} packet(s) decoded, report written -> {}",
                    rep.packets.len(),
                    report.display()
                );
            }
        }
    }

    if args.list_rejected && !args.quiet {
        print_rejected(&rep);
    }
    if args.strict && !rep.rejected.is_empty() {
        return Err(CliError::new(
            format!("{} frame(s) rejected", rep.rejected.len()),
            Some("use --list-rejected to inspect".to_string()),
        ));
    }
    Ok(())
}

/// Absolute path the report would be written to, or `None` when its directory
/// does not exist yet (a missing directory cannot hold the input).
fn resolve_report_target(report_path: &Path) -> Result<Option<PathBuf>, CliError> {
    let parent = match report_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if !parent.exists() {
        return Ok(None);
    }
    let file_name = report_path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Invalid report path: {}", report_path.display()))?;
    let report_dir = fs::canonicalize(parent)
        .with_context(|| format!("Failed to resolve output path: {}", report_path.display()))?;
    Ok(Some(report_dir.join(file_name)))
}

fn cmd_layout(json: bool) -> Result<(), CliError> {
    let info = droidstate_core::LayoutInfo::current();
    if json {
        let out = serde_json::to_string_pretty(&info).context("JSON serialization failed")?;
        println!("{}", out);
        return Ok(());
    }

    println!("descriptor: {}", info.descriptor);
    println!("packet bytes: {}", info.packet_bytes);
    println!("values: {}", info.value_count);
    for section in &info.sections {
        println!(
            "  {:<10} x{:<3} {} bytes each",
            section.name,
            section.count,
            section.size() / section.count.max(1)
        );
    }
    Ok(())
}

fn serialize_report(
    rep: &droidstate_core::DecodeReport,
    pretty: bool,
    compact: bool,
) -> Result<String, CliError> {
    if pretty && compact {
        return Err(CliError::new(
            "cannot use --pretty and --compact together",
            Some("choose one output format".to_string()),
        ));
    }
    if pretty {
        serde_json::to_string_pretty(rep)
            .context("JSON serialization failed")
            .map_err(Into::into)
    } else {
        serde_json::to_string(rep)
            .context("JSON serialization failed")
            .map_err(Into::into)
    }
}

fn print_rejected(rep: &droidstate_core::DecodeReport) {
    eprintln!("Rejected frames:");
    for frame in &rep.rejected {
        eprintln!(
            "  #{} @ {} ({} bytes): {}",
            frame.index, frame.offset, frame.bytes, frame.message
        );
    }
}

fn validate_input_file(input: &PathBuf) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("pass a recorded telemetry capture".to_string()),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("pass a recorded telemetry capture".to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &PathBuf) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.clone());
    }

    let mut matches = Vec::new();
    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    if matches.is_empty() {
        return Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern".to_string()),
        ));
    }
    if matches.len() > 1 {
        let listed = matches
            .iter()
            .take(3)
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let more = if matches.len() > 3 { ", ..." } else { "" };
        return Err(CliError::new(
            format!(
                "multiple files match pattern '{}' ({} matches); matches: {}{}",
                pattern,
                matches.len(),
                listed,
                more
            ),
            Some("pass a single capture file, or run once per file".to_string()),
        ));
    }

    Ok(matches.remove(0))
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
