//! Binary entry point for the typefinder CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Generate C# units for every finder in a registry
//! typefinder generate --registry finders.json --out-dir Generated
//!
//! # Inspect the plan and rendered method for one finder
//! typefinder plan --registry finders.json --finder DateTimeFinder.Find
//!
//! # Run one finder against a JSON instance
//! typefinder exec --registry finders.json --finder DateTimeFinder.Find --input parent.json
//! ```

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use typefinder::backend::SourceBackend;
use typefinder::config::CyclePolicy;
use typefinder::csharp::{marker_unit, CSharpBackend};
use typefinder::error::{OutputErrorCode, TypeFinderError};
use typefinder::exec::execute;
use typefinder::generate::{CancellationToken, Generator, PlannedFinder};
use typefinder::output::{
    emit_response, write_units, ErrorResponse, ExecResponse, GenerateResponse, PlanResponse,
};
use typefinder::registry::Registry;

// ============================================================================
// CLI Structure
// ============================================================================

/// Generate deep object-graph finder procedures from type metadata.
///
/// All output is JSON on stdout; logs go to stderr.
#[derive(Parser, Debug)]
#[command(name = "typefinder", version, about = "Generate deep object-graph finders")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

/// Global arguments shared by all subcommands.
#[derive(Parser, Debug)]
struct GlobalArgs {
    /// Log level for tracing output.
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,

    /// Format of log lines written to stderr.
    #[arg(long, global = true, value_enum, default_value = "text")]
    log_format: LogFormat,

    /// Registry file declaring types and finders.
    #[arg(long, global = true)]
    registry: Option<PathBuf>,

    /// Override the registry's cycle policy.
    #[arg(long, global = true, value_enum)]
    cycle_policy: Option<CyclePolicyArg>,
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Format of tracing output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per event.
    Json,
}

/// What to do when a type reappears on the traversal path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum CyclePolicyArg {
    /// Reject the finder with a diagnostic.
    Reject,
    /// Drop the cyclic branch.
    Prune,
}

impl From<CyclePolicyArg> for CyclePolicy {
    fn from(arg: CyclePolicyArg) -> Self {
        match arg {
            CyclePolicyArg::Reject => CyclePolicy::Reject,
            CyclePolicyArg::Prune => CyclePolicy::Prune,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate one source unit per finder container.
    Generate {
        /// Write units here instead of inlining them in the response.
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Report methods that do not have the finder shape as warnings.
        #[arg(long)]
        report_shape_mismatch: bool,

        /// Also emit the marker attribute unit.
        #[arg(long)]
        with_marker: bool,
    },

    /// Show the traversal plan and rendered method for one finder.
    Plan {
        /// Finder label: `Container.Method`.
        #[arg(long)]
        finder: String,
    },

    /// Run one finder against a JSON instance graph.
    Exec {
        /// Finder label: `Container.Method`.
        #[arg(long)]
        finder: String,

        /// JSON file holding the root instance.
        #[arg(long)]
        input: PathBuf,
    },
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.global.log_level, cli.global.log_format);

    match execute_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let error_code = OutputErrorCode::from(&err);
            let response = ErrorResponse::from_error(&err);

            // Errors go to stdout as JSON, like every other response
            let _ = emit_response(&response, &mut io::stdout());
            let _ = io::stdout().flush();

            ExitCode::from(error_code.code())
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel, format: LogFormat) {
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(io::stderr);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn execute_command(cli: Cli) -> Result<(), TypeFinderError> {
    let mut registry = load_registry(&cli.global)?;
    match cli.command {
        Command::Generate {
            out_dir,
            report_shape_mismatch,
            with_marker,
        } => {
            if report_shape_mismatch {
                registry.config.report_shape_mismatch = true;
            }
            execute_generate(&registry, out_dir.as_deref(), with_marker)
        }
        Command::Plan { finder } => execute_plan(&registry, &finder),
        Command::Exec { finder, input } => execute_exec(&registry, &finder, &input),
    }
}

fn load_registry(global: &GlobalArgs) -> Result<Registry, TypeFinderError> {
    let path = global
        .registry
        .as_deref()
        .ok_or_else(|| TypeFinderError::invalid_args("--registry is required"))?;
    let mut registry = Registry::load(path)?;
    if let Some(policy) = global.cycle_policy {
        registry.config.cycle_policy = policy.into();
    }
    Ok(registry)
}

// ============================================================================
// Command Executors
// ============================================================================

fn execute_generate(
    registry: &Registry,
    out_dir: Option<&Path>,
    with_marker: bool,
) -> Result<(), TypeFinderError> {
    let backend = CSharpBackend::new(registry.csharp.clone());
    let generator = Generator::new(&registry.types, &backend, &registry.config);
    let mut output = generator.run(&registry.finders, &CancellationToken::new());

    if with_marker {
        output.units.insert(0, marker_unit(backend.config()));
    }
    if let Some(dir) = out_dir {
        write_units(dir, &output.units)?;
    }

    emit(&GenerateResponse::new(&output, out_dir))
}

fn execute_plan(registry: &Registry, label: &str) -> Result<(), TypeFinderError> {
    let backend = CSharpBackend::new(registry.csharp.clone());
    let planned = plan_finder(registry, label)?;
    let source = backend.render_method(&planned.spec, &planned.body);
    emit(&PlanResponse::new(
        planned.spec,
        planned.plan,
        planned.body,
        source,
    ))
}

fn execute_exec(registry: &Registry, label: &str, input: &Path) -> Result<(), TypeFinderError> {
    let planned = plan_finder(registry, label)?;
    let text = fs::read_to_string(input).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => TypeFinderError::file_not_found(input.display().to_string()),
        _ => TypeFinderError::internal(format!("failed to read {}: {}", input.display(), e)),
    })?;
    let root: serde_json::Value = serde_json::from_str(&text)
        .map_err(|e| TypeFinderError::invalid_args(format!("malformed input: {}", e)))?;

    let matches = execute(&planned.body, &root)?
        .into_iter()
        .cloned()
        .collect();
    emit(&ExecResponse::new(planned.spec.label(), matches))
}

fn plan_finder(registry: &Registry, label: &str) -> Result<PlannedFinder, TypeFinderError> {
    let method = registry
        .finder(label)
        .ok_or_else(|| TypeFinderError::finder_not_found(label))?;
    let backend = CSharpBackend::new(registry.csharp.clone());
    let generator = Generator::new(&registry.types, &backend, &registry.config);
    Ok(generator.plan_one(method)?)
}

fn emit<T: serde::Serialize>(response: &T) -> Result<(), TypeFinderError> {
    emit_response(response, &mut io::stdout()).map_err(|e| TypeFinderError::internal(e.to_string()))?;
    let _ = io::stdout().flush();
    Ok(())
}
