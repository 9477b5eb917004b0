#![forbid(unsafe_code)]

mod catalog_validation;
mod commands;
mod helpers;

use clap::{error::ErrorKind, ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Generator, Shell};
use commands::{SyncArgs, ValidateCommand};
use mcp_catalog_core::{
    env_bool, resolve_harvester_program, ExitCode, MachineError, SystemClock, ENV_LOG_JSON,
    ENV_LOG_LEVEL,
};
use mcp_catalog_sync::{sync_catalog, CommandHarvester, SyncError, SyncOptions};
use serde_json::json;
use std::process::ExitCode as ProcessExitCode;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const CATALOG_HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{about-with-newline}
Usage: {usage}

Options:
{options}

Commands:
{subcommands}
{after-help}";

#[derive(Parser)]
#[command(name = "mcp-catalog")]
#[command(version)]
#[command(about = "MCP server catalog sync and validation")]
#[command(help_template = CATALOG_HELP_TEMPLATE)]
#[command(
    after_help = "Environment:\n  MCP_CATALOG_LOG_LEVEL   Log filter when RUST_LOG is unset\n  MCP_CATALOG_LOG_JSON    Emit logs as JSON lines\n  MCP_CATALOG_HARVESTER   Harvester executable"
)]
struct Cli {
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    #[arg(long, global = true, default_value_t = false)]
    quiet: bool,
    #[arg(long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[arg(long, global = true, default_value_t = false)]
    trace: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    Completion {
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Harvest a source repository and reconcile it into the catalog.
    Sync(SyncArgs),
    /// Run one of the catalog validators.
    Validate {
        #[command(subcommand)]
        command: ValidateCommand,
    },
}

pub fn main_entry() -> ProcessExitCode {
    let wants_json = std::env::args().any(|arg| arg == "--json");
    match run() {
        Ok(()) => ProcessExitCode::from(ExitCode::Success as u8),
        Err(err) => {
            emit_error(&err, wants_json);
            ProcessExitCode::from(err.exit_code as u8)
        }
    }
}

fn run() -> Result<(), CliError> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                print!("{err}");
                return Ok(());
            }
            _ => {
                return Err(CliError::usage(
                    "invalid command line arguments",
                    Some(err.to_string()),
                ));
            }
        },
    };
    let output_mode = OutputMode { json: cli.json };

    let command = cli
        .command
        .ok_or_else(|| CliError::usage("missing command; see --help", None))?;
    init_tracing(LogFlags {
        quiet: cli.quiet,
        verbose: cli.verbose,
        trace: cli.trace,
    });

    match command {
        Commands::Completion { shell } => {
            print_completion(shell);
            Ok(())
        }
        Commands::Sync(args) => run_sync(args, output_mode),
        Commands::Validate { command } => run_validate(command, output_mode),
    }
}

#[derive(Clone, Copy)]
struct LogFlags {
    quiet: bool,
    verbose: u8,
    trace: bool,
}

#[derive(Clone, Copy)]
struct OutputMode {
    json: bool,
}

impl LogFlags {
    fn level(self) -> &'static str {
        if self.trace || self.verbose > 1 {
            "trace"
        } else if self.verbose > 0 {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "info"
        }
    }
}

/// `RUST_LOG` wins, then `MCP_CATALOG_LOG_LEVEL`, then the verbosity flags.
fn log_filter(log_flags: LogFlags) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_from_env(ENV_LOG_LEVEL))
        .unwrap_or_else(|_| EnvFilter::new(log_flags.level()))
}

fn init_tracing(log_flags: LogFlags) {
    let filter = log_filter(log_flags);
    let registry = tracing_subscriber::registry().with(filter);
    // A second initialisation in the same process is a no-op.
    let _ = if env_bool(ENV_LOG_JSON, false) {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
    };
}

fn run_sync(args: SyncArgs, output_mode: OutputMode) -> Result<(), CliError> {
    let harvester = CommandHarvester::new(resolve_harvester_program(args.harvester.as_deref()));
    let opts = SyncOptions {
        source_repo: args.source_repo,
        catalog_root: args.catalog_root,
        servers_dir: args.servers_dir,
        index_file: args.index_file,
        max_parallel: args.max_parallel,
        harvester_label: harvester.label(),
    };
    let result = sync_catalog(&opts, &harvester, &SystemClock).map_err(CliError::from)?;
    helpers::emit_ok(
        output_mode,
        json!({
            "command": "sync",
            "status": "ok",
            "index": result.index_path,
            "written": result.written,
            "reactivated": result.reactivated,
            "deprecated_added": result.index.counts.deprecated_added_this_run,
            "active_manifests": result.index.counts.active_manifests,
            "total_items": result.index.counts.total_items,
            "unresolved": result.unresolved,
            "manifests_sha256": result.manifests_sha256,
        }),
    )
    .map_err(CliError::internal)
}

fn run_validate(command: ValidateCommand, output_mode: OutputMode) -> Result<(), CliError> {
    let (name, report) = match command {
        ValidateCommand::Index {
            catalog_root,
            index_file,
        } => (
            "validate index",
            catalog_validation::validate_index(&catalog_root, &index_file),
        ),
        ValidateCommand::Structure {
            catalog_root,
            index_file,
            servers_dir,
        } => (
            "validate structure",
            catalog_validation::validate_structure(&catalog_root, &index_file, &servers_dir),
        ),
        ValidateCommand::Schema {
            catalog_root,
            servers_dir,
            schema,
        } => (
            "validate schema",
            catalog_validation::validate_schema(&catalog_root, &servers_dir, &schema),
        ),
    };
    let report = report.map_err(|message| CliError::validation("validation_aborted", &message))?;
    catalog_validation::emit_report(name, &report, output_mode).map_err(CliError::internal)?;
    if report.passed() {
        Ok(())
    } else {
        Err(CliError::validation(
            "validation_failed",
            &format!("{name} failed with {} error(s)", report.errors.len()),
        )
        .with_detail("errors", &report.errors.len().to_string()))
    }
}

fn print_completion<G: Generator>(generator: G) {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    generate(generator, &mut command, name, &mut std::io::stdout());
}

#[derive(Debug)]
struct CliError {
    exit_code: ExitCode,
    machine: MachineError,
}

impl CliError {
    fn internal(message: String) -> Self {
        Self {
            exit_code: ExitCode::Internal,
            machine: MachineError::new("internal_error", &message),
        }
    }

    fn usage(message: &str, error: Option<String>) -> Self {
        let machine = MachineError::new("usage_error", message);
        Self {
            exit_code: ExitCode::Usage,
            machine: match error {
                Some(error) => machine.with_detail("error", &error),
                None => machine,
            },
        }
    }

    fn validation(code: &str, message: &str) -> Self {
        Self {
            exit_code: ExitCode::Validation,
            machine: MachineError::new(code, message),
        }
    }

    fn dependency(code: &str, message: &str) -> Self {
        Self {
            exit_code: ExitCode::DependencyFailure,
            machine: MachineError::new(code, message),
        }
    }

    fn with_detail(mut self, key: &str, value: &str) -> Self {
        self.machine = self.machine.with_detail(key, value);
        self
    }
}

impl From<SyncError> for CliError {
    fn from(err: SyncError) -> Self {
        let message = err.to_string();
        match err {
            SyncError::InvalidOptions(_) => Self {
                exit_code: ExitCode::Usage,
                machine: MachineError::new("invalid_options", &message),
            },
            SyncError::HarvestFailed(_) => Self::dependency("harvest_failed", &message),
            SyncError::MissingHarvestIndex { path } => {
                Self::dependency("harvest_index_missing", &message)
                    .with_detail("path", &path.display().to_string())
            }
            SyncError::MalformedHarvestIndex { path, .. } => {
                Self::dependency("harvest_index_malformed", &message)
                    .with_detail("path", &path.display().to_string())
            }
            SyncError::EmptyManifestList { path } => Self::dependency("harvest_index_empty", &message)
                .with_detail("path", &path.display().to_string()),
            SyncError::MissingManifestId { key } => {
                Self::validation("manifest_id_missing", &message).with_detail("key", &key.to_string())
            }
            SyncError::IdCollision { id, first, second } => {
                Self::validation("manifest_id_collision", &message)
                    .with_detail("id", &id)
                    .with_detail("first", &first.to_string())
                    .with_detail("second", &second.to_string())
            }
            SyncError::ManifestParse { path, .. } => {
                Self::validation("manifest_parse_error", &message)
                    .with_detail("path", &path.display().to_string())
            }
            _ => Self::internal(message),
        }
    }
}

fn emit_error(error: &CliError, machine_json: bool) {
    if machine_json {
        match serde_json::to_string(&error.machine) {
            Ok(payload) => eprintln!("{payload}"),
            Err(_) => eprintln!(
                "{{\"code\":\"internal_error\",\"message\":\"failed to encode structured error\",\"details\":{{}}}}"
            ),
        }
    } else {
        eprintln!("{}", error.machine.message);
    }
}
