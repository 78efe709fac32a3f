//! Purpose: `arkpack` CLI entry point.
//! Role: Binary crate root; parses args, installs logging, runs commands, emits JSON on stdout.
//! Invariants: Successful commands emit one JSON document on stdout.
//! Invariants: Errors go to stderr (text on a TTY, JSON otherwise); logs go to stderr.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
#![allow(clippy::result_large_err)]
use std::ffi::OsString;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum, error::ErrorKind as ClapErrorKind};
use clap_complete::aot::Shell;
use serde_json::{Map, Value, json};
use std::error::Error as StdError;
use tracing_subscriber::EnvFilter;

mod command_dispatch;
mod library_manifest;
mod report_json;

use arkpack::api::{BootstrapOrigin, Error, ErrorKind, to_exit_code};

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }
}

fn main() {
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err((err, color_mode)) => {
            emit_error(&err, color_mode);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, (Error, ColorMode)> {
    let cli = match Cli::try_parse_from(std::env::args_os().collect::<Vec<OsString>>()) {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    (
                        Error::new(ErrorKind::Internal)
                            .with_message("failed to write help")
                            .with_source(io_err),
                        ColorMode::Auto,
                    )
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome { exit_code });
            }
            _ => {
                return Err((
                    Error::new(ErrorKind::Usage)
                        .with_message(clap_error_summary(&err))
                        .with_hint("Try `arkpack --help`."),
                    ColorMode::Auto,
                ));
            }
        },
    };

    init_tracing(cli.verbose);
    let color_mode = cli.color;

    command_dispatch::dispatch_command(cli.command)
        .map_err(add_kind_hint)
        .map_err(|err| (err, color_mode))
}

#[derive(Parser)]
#[command(
    name = "arkpack",
    version,
    about = "Repackage a jar with its container and plugin archives into one executable jar",
    long_about = None,
    after_help = r#"EXAMPLES
  $ arkpack inspect --libraries target/libraries.json
  $ arkpack repackage --source target/app.jar --libraries target/libraries.json \
      --output-dir target --final-name app-executable

LIBRARIES
  --library takes name=path[:scope]; scope is provided|compile|runtime (default runtime).
  Container and plugin roles come from archive markers and cannot be declared.
  --libraries takes a JSON array of {"name", "file", "scope"?} objects."#,
    arg_required_else_help = true
)]
struct Cli {
    #[arg(
        short,
        long,
        global = true,
        action = clap::ArgAction::Count,
        help = "Raise log verbosity on stderr (-v info, -vv debug); RUST_LOG overrides"
    )]
    verbose: u8,
    #[arg(
        long,
        global = true,
        default_value = "auto",
        value_enum,
        help = "Colorize human-readable error output"
    )]
    color: ColorMode,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Classify libraries and write the self-executing archive.
    Repackage(RepackageArgs),
    /// Classify libraries only and print the result.
    Inspect(LibraryArgs),
    /// Print shell completions.
    Completion {
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Print version information.
    Version,
}

#[derive(Args)]
struct LibraryArgs {
    #[arg(long = "library", value_name = "NAME=PATH[:SCOPE]")]
    libraries: Vec<String>,
    #[arg(long = "libraries", value_name = "MANIFEST", value_hint = clap::ValueHint::FilePath)]
    manifest: Option<PathBuf>,
}

#[derive(Args)]
struct RepackageArgs {
    #[arg(long, value_hint = clap::ValueHint::FilePath, help = "Primary archive to repackage")]
    source: PathBuf,
    #[command(flatten)]
    libraries: LibraryArgs,
    #[arg(long, value_hint = clap::ValueHint::DirPath)]
    output_dir: PathBuf,
    #[arg(long)]
    final_name: String,
    #[arg(long, default_value = "jar")]
    extension: String,
    #[arg(
        long,
        default_value = "jar",
        help = "Project packaging type; pom and war are skipped"
    )]
    packaging: String,
    #[arg(
        long = "bootstrap-from",
        default_value = "source",
        value_parser = parse_bootstrap_origin,
        help = "Archive providing the bootstrap entries (source|container)"
    )]
    bootstrap_origin: BootstrapOrigin,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

fn parse_bootstrap_origin(value: &str) -> Result<BootstrapOrigin, String> {
    value.parse().map_err(|err: Error| {
        err.message()
            .unwrap_or("invalid bootstrap origin")
            .to_string()
    })
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn emit_json(value: Value) {
    let json = if io::stdout().is_terminal() {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    }
    .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string());
    println!("{json}");
}

fn now_rfc3339() -> Option<String> {
    use time::format_description::well_known::Rfc3339;
    let duration = SystemTime::now().duration_since(UNIX_EPOCH).ok()?;
    let ts = time::OffsetDateTime::from_unix_timestamp_nanos(duration.as_nanos() as i128).ok()?;
    ts.format(&Rfc3339).ok()
}

#[derive(Copy, Clone)]
enum AnsiColor {
    Red,
    Yellow,
}

fn colorize_label(label: &str, enabled: bool, color: AnsiColor) -> String {
    if !enabled {
        return label.to_string();
    }
    let code = match color {
        AnsiColor::Red => "31",
        AnsiColor::Yellow => "33",
    };
    format!("\u{1b}[{code}m{label}\u{1b}[0m")
}

fn emit_error(err: &Error, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("{}", error_text(err, color_mode.use_color(is_tty)));
        return;
    }

    let value = error_json(err);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Internal => "internal error".to_string(),
        ErrorKind::Usage => "usage error".to_string(),
        ErrorKind::Input => "input error".to_string(),
        ErrorKind::ClassificationConflict => "classification conflict".to_string(),
        ErrorKind::Configuration => "configuration error".to_string(),
        ErrorKind::LayoutConflict => "layout conflict".to_string(),
        ErrorKind::Write => "write failure".to_string(),
    }
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = err.source();
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(path) = err.path() {
        inner.insert("path".to_string(), json!(path.display().to_string()));
    }
    if let Some(library) = err.library() {
        inner.insert("library".to_string(), json!(library));
    }
    if let Some(destination) = err.destination() {
        inner.insert("destination".to_string(), json!(destination));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_text(err: &Error, use_color: bool) -> String {
    let mut lines = vec![format!(
        "{} {}",
        colorize_label("error:", use_color, AnsiColor::Red),
        error_message(err)
    )];

    let fields = [
        ("hint:", err.hint().map(str::to_string)),
        ("path:", err.path().map(|path| path.display().to_string())),
        ("library:", err.library().map(str::to_string)),
        ("destination:", err.destination().map(str::to_string)),
        ("caused by:", error_causes(err).into_iter().next()),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            lines.push(format!(
                "{} {value}",
                colorize_label(label, use_color, AnsiColor::Yellow)
            ));
        }
    }

    lines.join("\n")
}

fn clap_error_summary(err: &clap::Error) -> String {
    for line in err.to_string().lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("error:") {
            return rest.trim().to_string();
        }
        return trimmed.to_string();
    }
    "invalid arguments".to_string()
}

fn add_kind_hint(err: Error) -> Error {
    if err.hint().is_some() {
        return err;
    }
    match err.kind() {
        ErrorKind::Input => {
            err.with_hint("Check that the path exists, is readable, and is a valid archive.")
        }
        ErrorKind::Write => {
            err.with_hint("Check the output directory permissions and free disk space.")
        }
        ErrorKind::Internal => err.with_hint(
            "Unexpected internal failure. Retry with RUST_BACKTRACE=1 and -vv and share the output.",
        ),
        _ => err,
    }
}
