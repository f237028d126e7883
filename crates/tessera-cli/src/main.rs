// crates/tessera-cli/src/main.rs
// ============================================================================
// Module: Tessera CLI Entry Point
// Description: Command dispatcher for config validation, secret updates, diffs.
// Purpose: Run the config pipeline over files from the command line.
// Dependencies: clap, tessera-config, tessera-schema, tracing-subscriber.
// ============================================================================

//! ## Overview
//! `tessera` validates app and secret documents, applies secret update
//! instructions, diffs snapshots, and prints the assembled schemas. Inputs
//! are untrusted: every file is read with a hard size limit and secret values
//! are masked before anything derived from them is printed.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use serde_json::Value;
use tessera_cli::t;
use tessera_config::Config;
use tessera_config::ConfigDiff;
use tessera_config::ConfigDiffer;
use tessera_config::ConfigError;
use tessera_config::SecretConfig;
use tessera_config::UpdateInstructionApplier;
use tessera_config::UpdateInstructionContext;
use tessera_config::app_config_schema;
use tessera_config::parse_app_config;
use tessera_config::parse_secret_config;
use tessera_config::parse_update_instruction;
use tessera_config::secret_config_schema;
use tessera_schema::SchemaRegistry;
use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::FmtSubscriber;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of any input document.
const MAX_INPUT_BYTES: usize = 1024 * 1024;
/// Environment variable holding the tracing filter.
const LOG_ENV: &str = "TESSERA_LOG";
/// Filter used when [`LOG_ENV`] is unset or invalid.
const DEFAULT_LOG_FILTER: &str = "warn";
/// Exit code for `diff` when the snapshots differ.
const EXIT_CHANGED: u8 = 1;
/// Exit code for every failure.
const EXIT_ERROR: u8 = 2;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "tessera", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate an app config, optionally against its secrets.
    Validate(ValidateCommand),
    /// Secret snapshot utilities.
    Secrets {
        /// Selected secrets subcommand.
        #[command(subcommand)]
        command: SecretsCommand,
    },
    /// Diff two snapshots; exits 1 when they differ.
    Diff(DiffCommand),
    /// Print the assembled schema document or one fragment.
    Schema(SchemaCommand),
}

/// Arguments for `tessera validate`.
#[derive(Args, Debug)]
struct ValidateCommand {
    /// App config YAML file.
    #[arg(long, value_name = "FILE")]
    app: PathBuf,
    /// Secret config YAML file.
    #[arg(long, value_name = "FILE")]
    secrets: Option<PathBuf>,
}

/// Secrets subcommands.
#[derive(Subcommand, Debug)]
enum SecretsCommand {
    /// Apply an update instruction to a secret snapshot.
    Apply(SecretsApplyCommand),
}

/// Arguments for `tessera secrets apply`.
#[derive(Args, Debug)]
struct SecretsApplyCommand {
    /// Current secret config YAML file.
    #[arg(long, value_name = "FILE")]
    secrets: PathBuf,
    /// Update instruction YAML file.
    #[arg(long, value_name = "FILE")]
    instruction: PathBuf,
    /// Output file; stdout when omitted.
    #[arg(long, value_name = "FILE")]
    out: Option<PathBuf>,
}

/// Arguments for `tessera diff`.
#[derive(Args, Debug)]
struct DiffCommand {
    /// Original snapshot file.
    #[arg(long, value_name = "FILE")]
    original: PathBuf,
    /// Updated snapshot file.
    #[arg(long, value_name = "FILE")]
    updated: PathBuf,
    /// Document kind of both files.
    #[arg(long, value_enum, default_value_t = DocumentKind::App)]
    kind: DocumentKind,
}

/// Arguments for `tessera schema`.
#[derive(Args, Debug)]
struct SchemaCommand {
    /// Which schema to print.
    #[arg(long, value_enum, default_value_t = DocumentKind::App)]
    kind: DocumentKind,
    /// Fragment name to print instead of the whole document.
    #[arg(long, value_name = "NAME")]
    part: Option<String>,
}

/// Document kinds understood by the CLI.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum DocumentKind {
    /// Application configuration.
    App,
    /// Secret configuration.
    Secrets,
}

impl DocumentKind {
    /// Returns the input label used in read errors.
    fn label(self) -> String {
        match self {
            Self::App => t!("input.kind.app"),
            Self::Secrets => t!("input.kind.secrets"),
        }
    }

    /// Returns the schema registry of this kind.
    fn registry(self) -> Result<&'static SchemaRegistry, ConfigError> {
        match self {
            Self::App => app_config_schema(),
            Self::Secrets => secret_config_schema(),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error carrying a rendered message.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a rendered message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    init_tracing();
    match run(Cli::parse()) {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Installs the stderr subscriber filtered by `TESSERA_LOG`.
fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).with_writer(std::io::stderr).finish();
    // A subscriber may already be installed by an embedding test harness.
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Executes the CLI command dispatcher.
fn run(cli: Cli) -> CliResult<ExitCode> {
    if cli.show_version {
        write_stdout_line(&t!("main.version", version = env!("CARGO_PKG_VERSION")))?;
        return Ok(ExitCode::SUCCESS);
    }
    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };
    match command {
        Commands::Validate(command) => command_validate(&command),
        Commands::Secrets {
            command,
        } => match command {
            SecretsCommand::Apply(command) => command_secrets_apply(&command),
        },
        Commands::Diff(command) => command_diff(&command),
        Commands::Schema(command) => command_schema(&command),
    }
}

/// Prints help for the top-level command.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| output_error("stdout", &err))?;
    write_stdout_line("")
}

// ============================================================================
// SECTION: Validate Command
// ============================================================================

/// Executes `tessera validate`.
fn command_validate(command: &ValidateCommand) -> CliResult<ExitCode> {
    let app_text = read_text(&command.app, &DocumentKind::App.label())?;
    let app = parse_app_config(&app_text).map_err(|err| load_error(&command.app, &err))?;
    let Some(secrets_path) = &command.secrets else {
        write_stdout_line(&t!("validate.ok"))?;
        return Ok(ExitCode::SUCCESS);
    };
    let secret_text = read_text(secrets_path, &DocumentKind::Secrets.label())?;
    let secrets = parse_secret_config(&secret_text).map_err(|err| load_error(secrets_path, &err))?;
    let config = Config::from_parts(app, secrets).map_err(|err| load_error(secrets_path, &err))?;
    write_stdout_line(&t!("validate.ok_with_secrets", count = config.secrets.len()))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Secrets Commands
// ============================================================================

/// Executes `tessera secrets apply`.
fn command_secrets_apply(command: &SecretsApplyCommand) -> CliResult<ExitCode> {
    let secret_text = read_text(&command.secrets, &DocumentKind::Secrets.label())?;
    let current = parse_secret_config(&secret_text).map_err(|err| load_error(&command.secrets, &err))?;
    let instruction_text = read_text(&command.instruction, &t!("input.kind.instruction"))?;
    let instruction =
        parse_update_instruction(&instruction_text).map_err(|err| load_error(&command.instruction, &err))?;

    let applier = UpdateInstructionApplier::new(UpdateInstructionContext::system());
    let updated = applier
        .apply(&instruction, &current)
        .and_then(|snapshot| snapshot.reparse())
        .map_err(|err| CliError::new(t!("secrets.apply_failed", error = current.mask_patterns().mask(&err.to_string()))))?;

    let diff = masked_secret_diff(&current, &updated)?;
    if diff.has_changes {
        write_stderr_text(&diff.text)?;
    } else {
        write_stderr_line(&t!("secrets.apply.unchanged"))?;
    }

    let yaml = serde_yaml::to_string(&updated)
        .map_err(|err| CliError::new(t!("secrets.serialize_failed", error = err)))?;
    match &command.out {
        Some(path) => {
            write_file_atomic(path, &yaml)?;
            write_stderr_line(&t!("secrets.apply.written", path = path.display()))?;
        }
        None => write_stdout_text(&yaml)?,
    }
    Ok(ExitCode::SUCCESS)
}

/// Diffs two secret snapshots with the values of both masked.
fn masked_secret_diff(original: &SecretConfig, updated: &SecretConfig) -> CliResult<ConfigDiff> {
    let mut patterns = original.mask_patterns();
    patterns.extend(&updated.mask_patterns());
    ConfigDiffer::diff_masked(original, updated, &patterns)
        .map_err(|err| CliError::new(t!("diff.failed", error = err)))
}

// ============================================================================
// SECTION: Diff Command
// ============================================================================

/// Executes `tessera diff`.
fn command_diff(command: &DiffCommand) -> CliResult<ExitCode> {
    let label = command.kind.label();
    let original_text = read_text(&command.original, &label)?;
    let updated_text = read_text(&command.updated, &label)?;
    let diff = match command.kind {
        DocumentKind::App => {
            let original = parse_app_config(&original_text).map_err(|err| load_error(&command.original, &err))?;
            let updated = parse_app_config(&updated_text).map_err(|err| load_error(&command.updated, &err))?;
            ConfigDiffer::diff(&original, &updated).map_err(|err| CliError::new(t!("diff.failed", error = err)))?
        }
        DocumentKind::Secrets => {
            let original =
                parse_secret_config(&original_text).map_err(|err| load_error(&command.original, &err))?;
            let updated = parse_secret_config(&updated_text).map_err(|err| load_error(&command.updated, &err))?;
            masked_secret_diff(&original, &updated)?
        }
    };
    if !diff.has_changes {
        return Ok(ExitCode::SUCCESS);
    }
    write_stdout_text(&diff.text)?;
    Ok(ExitCode::from(EXIT_CHANGED))
}

// ============================================================================
// SECTION: Schema Command
// ============================================================================

/// Executes `tessera schema`.
fn command_schema(command: &SchemaCommand) -> CliResult<ExitCode> {
    let registry = command.kind.registry().map_err(|err| CliError::new(t!("schema.load_failed", error = err)))?;
    let value = match &command.part {
        Some(part) => registry.fragment(part).ok_or_else(|| {
            let known: Vec<&str> = registry.fragment_names().collect();
            CliError::new(t!("schema.unknown_part", part = part, known = known.join(", ")))
        })?,
        None => registry.document(),
    };
    write_json_value(value)?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Input Helpers
// ============================================================================

/// Errors returned by bounded file reads.
#[derive(Debug)]
enum ReadLimitError {
    /// File I/O failure.
    Io(std::io::Error),
    /// File size exceeds the configured limit.
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
}

/// Reads a file from disk while enforcing a hard size limit.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path).map_err(ReadLimitError::Io)?;
    let size = file.metadata().map_err(ReadLimitError::Io)?.len();
    let limit = u64::try_from(max_bytes).unwrap_or(u64::MAX);
    if size > limit {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }
    let mut bytes = Vec::new();
    file.take(limit.saturating_add(1)).read_to_end(&mut bytes).map_err(ReadLimitError::Io)?;
    if bytes.len() > max_bytes {
        return Err(ReadLimitError::TooLarge {
            size: u64::try_from(bytes.len()).unwrap_or(u64::MAX),
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

/// Reads a UTF-8 document of the given kind.
fn read_text(path: &Path, kind: &str) -> CliResult<String> {
    let bytes = read_bytes_with_limit(path, MAX_INPUT_BYTES).map_err(|err| match err {
        ReadLimitError::Io(err) => {
            CliError::new(t!("input.read_failed", kind = kind, path = path.display(), error = err))
        }
        ReadLimitError::TooLarge {
            size,
            limit,
        } => CliError::new(t!("input.read_too_large", kind = kind, path = path.display(), size = size, limit = limit)),
    })?;
    String::from_utf8(bytes).map_err(|_| CliError::new(t!("input.not_utf8", kind = kind, path = path.display())))
}

/// Wraps a pipeline error with the file it came from.
fn load_error(path: &Path, error: &ConfigError) -> CliError {
    CliError::new(t!("validate.failed", path = path.display(), error = error))
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes `contents` to `path` through a temporary sibling file.
fn write_file_atomic(path: &Path, contents: &str) -> CliResult<()> {
    let write_error = |err: std::io::Error| CliError::new(t!("secrets.write_failed", path = path.display(), error = err));
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_error)?;
    }
    let temp_path = path.with_extension("tmp");
    let mut file = fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(write_error)?;
    file.write_all(contents.as_bytes()).map_err(write_error)?;
    file.sync_all().map_err(write_error)?;
    fs::rename(&temp_path, path).map_err(write_error)
}

/// Writes canonical JSON followed by a newline to stdout.
fn write_json_value(value: &Value) -> CliResult<()> {
    let mut bytes =
        serde_jcs::to_vec(value).map_err(|err| CliError::new(t!("schema.serialize_failed", error = err)))?;
    bytes.push(b'\n');
    std::io::stdout().write_all(&bytes).map_err(|err| output_error("stdout", &err))
}

/// Writes a line to stdout.
fn write_stdout_line(message: &str) -> CliResult<()> {
    writeln!(std::io::stdout(), "{message}").map_err(|err| output_error("stdout", &err))
}

/// Writes text to stdout as is.
fn write_stdout_text(text: &str) -> CliResult<()> {
    std::io::stdout().write_all(text.as_bytes()).map_err(|err| output_error("stdout", &err))
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> CliResult<()> {
    writeln!(std::io::stderr(), "{message}").map_err(|err| output_error("stderr", &err))
}

/// Writes text to stderr as is.
fn write_stderr_text(text: &str) -> CliResult<()> {
    std::io::stderr().write_all(text.as_bytes()).map_err(|err| output_error("stderr", &err))
}

/// Builds the error for a failed stream write.
fn output_error(stream: &str, error: &std::io::Error) -> CliError {
    CliError::new(t!("output.write_failed", stream = stream, error = error))
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::from(EXIT_ERROR)
}
