// crates/jobcheck-cli/src/main.rs
// ============================================================================
// Module: Jobcheck CLI Entry Point
// Description: Command-line conformance runner for job-queue implementations.
// Purpose: Load suites, drive the engine, and render the conformance report.
// Dependencies: clap, jobcheck-config, jobcheck-core, jobcheck-transport
// ============================================================================

//! ## Overview
//! The CLI loads declarative test suites from disk, filters them, runs them
//! sequentially against an HTTP target through the engine, and renders the
//! report as a table or JSON. Exit codes: 0 when every selected test
//! passed, 1 when any failed or errored, 2 on configuration errors (no
//! matching tests, malformed test files, invalid flags or config).

// ============================================================================
// SECTION: Modules
// ============================================================================

pub(crate) mod loader;
pub(crate) mod output;

#[cfg(test)]
mod loader_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use clap::ValueEnum;
use jobcheck_config::OutputFormat;
use jobcheck_config::RunnerConfig;
use jobcheck_core::EngineConfig;
use jobcheck_core::Executor;
use jobcheck_core::ResetHook;
use jobcheck_core::TestResult;
use jobcheck_core::build_report;
use jobcheck_core::timing::DEFAULT_MAX_WAIT_MS;
use jobcheck_core::timing::DEFAULT_MIN_TOLERANCE_MS;
use jobcheck_core::timing::TimingConfig;
use jobcheck_transport::HttpAdapter;
use jobcheck_transport::HttpAdapterConfig;
use jobcheck_transport::HttpResetHook;

// ============================================================================
// SECTION: Arguments
// ============================================================================

/// Report output format flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormatArg {
    /// Human-readable table.
    Table,
    /// Machine-readable JSON report.
    Json,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(value: OutputFormatArg) -> Self {
        match value {
            OutputFormatArg::Table => Self::Table,
            OutputFormatArg::Json => Self::Json,
        }
    }
}

/// Conformance test runner for job-queue implementations.
#[derive(Debug, Parser)]
#[command(name = "jobcheck", version, about)]
struct CliArgs {
    /// Base URL of the target implementation.
    #[arg(long)]
    url: Option<String>,
    /// Path to the test suite directory.
    #[arg(long)]
    suites: Option<String>,
    /// Filter by conformance level (0-4).
    #[arg(long)]
    level: Option<u8>,
    /// Filter by category (e.g. envelope, retry).
    #[arg(long)]
    category: Option<String>,
    /// Run a single test by id (e.g. L0-ENV-001).
    #[arg(long = "test")]
    test_id: Option<String>,
    /// Output format.
    #[arg(long, value_enum)]
    output: Option<OutputFormatArg>,
    /// Show expected/actual detail for failures.
    #[arg(long)]
    verbose: bool,
    /// Timing tolerance percentage for approximate assertions.
    #[arg(long)]
    tolerance: Option<f64>,
    /// Transport timeout in seconds.
    #[arg(long)]
    timeout: Option<u64>,
    /// Reset endpoint invoked before each test.
    #[arg(long)]
    reset_url: Option<String>,
    /// Optional TOML config file; flags override file values.
    #[arg(long)]
    config: Option<PathBuf>,
}

impl CliArgs {
    /// Merges the config file (when given) with flag overrides.
    fn resolve_config(self) -> CliResult<RunnerConfig> {
        let mut config = match &self.config {
            Some(path) => RunnerConfig::load(path).map_err(CliError::new)?,
            None => RunnerConfig::default(),
        };

        if let Some(url) = self.url {
            config.target_url = url;
        }
        if let Some(suites) = self.suites {
            config.suites_dir = suites;
        }
        if self.level.is_some() {
            config.level = self.level;
        }
        if self.category.is_some() {
            config.category = self.category;
        }
        if self.test_id.is_some() {
            config.test_id = self.test_id;
        }
        if let Some(output) = self.output {
            config.output = output.into();
        }
        if self.verbose {
            config.verbose = true;
        }
        if let Some(tolerance) = self.tolerance {
            config.tolerance_pct = tolerance;
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
        if self.reset_url.is_some() {
            config.reset_url = self.reset_url;
        }

        config.validate().map_err(CliError::new)?;
        Ok(config)
    }
}

// ============================================================================
// SECTION: CLI Errors
// ============================================================================

/// Configuration-level CLI error; always maps to exit code 2.
#[derive(Debug)]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Creates a CLI error from any displayable source.
    fn new(source: impl fmt::Display) -> Self {
        Self {
            message: source.to_string(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.message.fmt(f)
    }
}

type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            let _ = write_stderr_line(&format!("error: {err}"));
            ExitCode::from(2)
        }
    }
}

/// Parses arguments, runs the selected tests, and renders the report.
fn run() -> CliResult<ExitCode> {
    let args = CliArgs::parse();
    let config = args.resolve_config()?;

    let tests = loader::load_tests(Path::new(&config.suites_dir)).map_err(CliError::new)?;
    let tests = loader::filter_tests(
        tests,
        config.level,
        config.category.as_deref(),
        config.test_id.as_deref(),
    );
    if tests.is_empty() {
        return Err(CliError::new("no tests match the specified filters"));
    }

    let timeout_ms = config.timeout_secs * 1_000;
    let adapter = HttpAdapter::new(HttpAdapterConfig {
        base_url: config.target_url.clone(),
        timeout_ms,
        ..HttpAdapterConfig::default()
    })
    .map_err(CliError::new)?;

    let reset_hook = match &config.reset_url {
        Some(url) => Some(HttpResetHook::new(url.clone(), timeout_ms).map_err(CliError::new)?),
        None => None,
    };

    let engine_config = EngineConfig {
        timing: TimingConfig {
            tolerance_pct: config.tolerance_pct,
            min_tolerance_ms: DEFAULT_MIN_TOLERANCE_MS,
            max_wait_ms: DEFAULT_MAX_WAIT_MS,
        },
    };
    let executor = Executor::new(&adapter, engine_config);

    let suite_start = Instant::now();
    let mut results: Vec<TestResult> = Vec::new();
    for test in &tests {
        // The reset must complete before the test's first step.
        if let Some(hook) = &reset_hook {
            hook.reset().map_err(CliError::new)?;
        }
        results.push(executor.run_test(test));
    }
    let duration_ms = u64::try_from(suite_start.elapsed().as_millis()).unwrap_or(u64::MAX);

    let requested_level = config.level.map_or(-1, |level| i8::try_from(level).unwrap_or(-1));
    let report = build_report(results.clone(), &config.target_url, requested_level, duration_ms);

    match config.output {
        OutputFormat::Json => {
            output::write_json(&report, &mut std::io::stdout())
                .map_err(|err| CliError::new(format!("writing report: {err}")))?;
        }
        OutputFormat::Table => {
            output::write_table(&report, &results, config.verbose, &mut std::io::stdout())
                .map_err(|err| CliError::new(format!("writing report: {err}")))?;
        }
    }

    if report.conformant {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(1))
    }
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes one line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}
