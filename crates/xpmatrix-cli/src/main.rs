use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glob::glob;
use xpmatrix_core::{
    DecodeOptions, Report, decode_xpm_file, make_report, with_default_extension,
};

#[derive(Parser, Debug)]
#[command(name = "xpmatrix")]
#[command(version)]
#[command(
    about = "Decode GROMACS XPM matrix files into typed JSON matrices.",
    long_about = None,
    after_help = "Examples:\n  xpmatrix xpm decode hbmap.xpm -o hbmap.json\n  xpmatrix xpm decode ss.xpm --stdout --pretty\n  xpmatrix xpm read hbmap.xpm --stdout --row-means"
)]
struct Cli {
    /// Log decoding details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Operations on XPM matrix files.
    Xpm {
        #[command(subcommand)]
        command: XpmCommands,
    },
}

#[derive(Subcommand, Debug)]
enum XpmCommands {
    /// Decode an XPM file and write the matrix as a JSON report.
    #[command(alias = "read")]
    #[command(
        after_help = "Examples:\n  xpmatrix xpm decode hbmap.xpm -o hbmap.json\n  xpmatrix xpm decode 'runs/*/ss.xpm' --stdout"
    )]
    Decode {
        /// Path (or glob matching exactly one file) to an .xpm file; a
        /// path without extension gets `.xpm` appended
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

        /// Keep legend values as strings instead of inferring their type
        #[arg(long)]
        no_autoconvert: bool,

        /// Include the mean over columns of every data row
        #[arg(long)]
        row_means: bool,

        /// List the decoded palette after decoding
        #[arg(long)]
        list_palette: bool,

        /// Suppress non-error output
        #[arg(long)]
        quiet: bool,
    },
}

struct DecodeArgs {
    input: PathBuf,
    report: Option<PathBuf>,
    stdout: bool,
    pretty: bool,
    no_autoconvert: bool,
    row_means: bool,
    list_palette: bool,
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Xpm { command } => match command {
            XpmCommands::Decode {
                input,
                report,
                stdout,
                pretty,
                compact: _,
                no_autoconvert,
                row_means,
                list_palette,
                quiet,
            } => {
                setup_logging(cli.verbose, quiet);
                cmd_xpm_decode(DecodeArgs {
                    input,
                    report,
                    stdout,
                    pretty,
                    no_autoconvert,
                    row_means,
                    list_palette,
                    quiet,
                })
            }
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

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };

    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .format_target(false)
        .init();
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

fn cmd_xpm_decode(args: DecodeArgs) -> Result<(), CliError> {
    let input = resolve_input(&args.input)?;
    let input_abs = fs::canonicalize(&input)
        .with_context(|| format!("Failed to resolve input path: {}", input.display()))?;
    let input_bytes = fs::metadata(&input)
        .with_context(|| format!("Failed to read input file: {}", input.display()))?
        .len();

    let report_path = match (args.stdout, args.report) {
        (true, _) => None,
        (false, Some(path)) => {
            ensure_distinct_output(&path, &input_abs)?;
            Some(path)
        }
        (false, None) => {
            return Err(CliError::new(
                "missing output path",
                Some("use -o/--report or --stdout".to_string()),
            ));
        }
    };

    let options = DecodeOptions {
        autoconvert: !args.no_autoconvert,
    };
    let image = decode_xpm_file(&input, &options).map_err(|err| {
        CliError::new(
            format!("XPM decoding failed: {err}"),
            Some("check that the file is a GROMACS XPM matrix".to_string()),
        )
    })?;
    log::info!(
        "decoded {} as {} matrix of shape {:?}",
        input.display(),
        image.matrix.dtype(),
        image.matrix.shape()
    );

    let rep = make_report(
        &input.display().to_string(),
        input_bytes,
        &image,
        args.row_means,
    );
    let json = render_report(&rep, args.pretty)?;

    match report_path {
        None => println!("{json}"),
        Some(report) => {
            write_report(&report, &json)?;
            if !args.quiet {
                eprintln!("OK: report written -> {}", report.display());
            }
        }
    }

    if args.list_palette && !args.quiet {
        print_palette(&rep);
    }
    Ok(())
}

fn write_report(report: &Path, json: &str) -> Result<(), CliError> {
    if let Some(parent) = report.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| {
            format!("Failed to create output directory: {}", parent.display())
        })?;
    }
    fs::write(report, json)
        .with_context(|| format!("Failed to write report: {}", report.display()))?;
    Ok(())
}

fn ensure_distinct_output(report_path: &Path, input_abs: &Path) -> Result<(), CliError> {
    let report_dir = match report_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::canonicalize(parent),
        _ => fs::canonicalize("."),
    };
    // a missing output directory is created later and cannot hold the input
    let Ok(report_dir) = report_dir else {
        return Ok(());
    };
    let file_name = report_path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Invalid report path: {}", report_path.display()))?;
    if report_dir.join(file_name) == input_abs {
        return Err(CliError::new(
            format!(
                "report path must differ from input: {}",
                report_path.display()
            ),
            Some("choose a different output path".to_string()),
        ));
    }
    Ok(())
}

/// Compact JSON unless `pretty`; clap rejects `--pretty` with `--compact`.
fn render_report(rep: &Report, pretty: bool) -> Result<String, CliError> {
    let json = if pretty {
        serde_json::to_string_pretty(rep)
    } else {
        serde_json::to_string(rep)
    };
    Ok(json.context("JSON serialization failed")?)
}

fn print_palette(rep: &Report) {
    eprintln!("Palette ({}):", rep.dtype);
    for entry in &rep.palette {
        eprintln!(
            "  {:?} {} {:?} -> {}",
            entry.symbol, entry.color, entry.raw, entry.value
        );
    }
}

/// Turn the input argument into one existing `.xpm` file.
///
/// Globs must match exactly one file. Plain paths without extension get
/// `.xpm` appended, as the decoder's container does.
fn resolve_input(input: &Path) -> Result<PathBuf, CliError> {
    let path = if is_glob_pattern(&input.to_string_lossy()) {
        single_glob_match(input)?
    } else {
        with_default_extension(input)
    };

    if !path.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", path.display()),
            Some("use an .xpm file".to_string()),
        ));
    }
    let is_xpm = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xpm"));
    if !is_xpm {
        return Err(CliError::new(
            format!("unsupported input format '{}'", path.display()),
            Some("expected an .xpm file".to_string()),
        ));
    }
    if !path.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", path.display()),
            Some("use an .xpm file".to_string()),
        ));
    }
    Ok(path)
}

fn single_glob_match(input: &Path) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    let bad_pattern = |detail: String| {
        CliError::new(
            format!("invalid input pattern '{pattern}'"),
            Some(format!("pattern error: {detail}")),
        )
    };

    let mut matches = Vec::new();
    for entry in glob(&pattern).map_err(|err| bad_pattern(err.msg.to_string()))? {
        let path = entry.map_err(|err| bad_pattern(err.to_string()))?;
        if path.is_file() {
            matches.push(path);
        }
    }

    match matches.len() {
        0 => Err(CliError::new(
            format!("no files match pattern '{pattern}'"),
            Some("check the path or quote the pattern; expected an .xpm file".to_string()),
        )),
        1 => Ok(matches.remove(0)),
        count => {
            let mut listed: Vec<String> = matches
                .iter()
                .take(3)
                .map(|p| p.display().to_string())
                .collect();
            if count > 3 {
                listed.push("...".to_string());
            }
            Err(CliError::new(
                format!(
                    "multiple files match pattern '{pattern}' ({count} matches); matches: {}",
                    listed.join(", ")
                ),
                Some("pass a single XPM file, or run once per file".to_string()),
            ))
        }
    }
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains(['*', '?', '['])
}
