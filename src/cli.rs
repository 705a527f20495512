//! CLI definition and dispatch.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::adapters::csv_adapter::CsvOperationAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::log_report_adapter::LogReportAdapter;
use crate::adapters::tinkoff_adapter::TinkoffApiAdapter;
use crate::domain::account::resolve_account;
use crate::domain::aggregator::summarize;
use crate::domain::config_validation::{
    ConfigOverrides, DEFAULT_LOG_LEVEL, ReportConfig, build_report_config_with, log_level,
};
use crate::domain::error::{ReporterError, SummaryError};
use crate::ports::config_port::ConfigPort;
use crate::ports::operation_port::OperationPort;
use crate::ports::report_port::ReportPort;

const EXIT_STATUS_HELP: &str = "\
Exit status:
  0  every closed instrument was reported
  1  file or report output error
  2  invalid configuration or missing token
  3  API or transport failure
  4  no account of the requested type
  5  malformed operation data
  6  some closed instruments were skipped; an instrument with no purchases in
     the window (dividends or fees only) has nothing invested and lands here";

#[derive(Parser, Debug)]
#[command(
    name = "tinvest-reporter",
    about = "Realized profitability of closed positions in a Tinkoff brokerage account",
    after_help = EXIT_STATUS_HELP
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug)]
pub struct ReportArgs {
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Start of the operation window (RFC 3339 or YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<String>,
    /// End of the operation window (RFC 3339 or YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<String>,
    #[arg(long)]
    pub account_type: Option<String>,
    /// Write summaries as CSV instead of logging them
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl ReportArgs {
    fn overrides(&self, sandbox: bool) -> ConfigOverrides<'_> {
        ConfigOverrides {
            start_date: self.from.as_deref(),
            end_date: self.to.as_deref(),
            account_type: self.account_type.as_deref(),
            sandbox,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch operations from the Tinkoff OpenAPI and report closed positions
    Report {
        /// API token
        #[arg(env = "TINVEST_TOKEN", hide_env_values = true)]
        token: Option<String>,
        #[arg(long)]
        sandbox: bool,
        #[command(flatten)]
        args: ReportArgs,
    },
    /// Report closed positions from a CSV operations export
    Import {
        #[arg(long)]
        operations: PathBuf,
        #[command(flatten)]
        args: ReportArgs,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

impl Command {
    fn config_path(&self) -> Option<&PathBuf> {
        match self {
            Command::Report { args, .. } | Command::Import { args, .. } => args.config.as_ref(),
            Command::Validate { config } => Some(config),
        }
    }
}

/// Counts from one pass over the operations of an account.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportOutcome {
    pub operations: usize,
    pub reported: usize,
    pub skipped: Vec<SummaryError>,
}

impl ReportOutcome {
    /// Any closed instrument that could not be summarized makes the run incomplete.
    pub fn into_result(self) -> Result<Self, ReporterError> {
        if self.skipped.is_empty() {
            Ok(self)
        } else {
            Err(ReporterError::Incomplete {
                closed: self.reported + self.skipped.len(),
                skipped: self.skipped.len(),
            })
        }
    }
}

pub fn run(cli: Cli) -> ExitCode {
    let settings = load_settings(cli.command.config_path());
    // An invalid level is reported by the config build below, after tracing is up.
    let level = settings
        .as_ref()
        .ok()
        .and_then(|s| log_level(s).ok())
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());
    init_tracing(&level);

    let result = settings.and_then(|settings| match cli.command {
        Command::Report {
            token,
            sandbox,
            args,
        } => run_report(&settings, token, sandbox, &args),
        Command::Import { operations, args } => run_import(&settings, operations, &args),
        Command::Validate { .. } => run_validate(&settings),
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            (&e).into()
        }
    }
}

/// `RUST_LOG` wins over the configured level.
pub fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

pub fn load_settings(path: Option<&PathBuf>) -> Result<FileConfigAdapter, ReporterError> {
    match path {
        None => Ok(FileConfigAdapter::empty()),
        Some(path) => {
            FileConfigAdapter::from_file(path).map_err(|e| ReporterError::ConfigParse {
                file: path.display().to_string(),
                reason: e.to_string(),
            })
        }
    }
}

pub fn resolve_token(token: Option<String>) -> Result<String, ReporterError> {
    token
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or(ReporterError::MissingToken)
}

fn run_report(
    settings: &dyn ConfigPort,
    token: Option<String>,
    sandbox: bool,
    args: &ReportArgs,
) -> Result<(), ReporterError> {
    let token = resolve_token(token)?;
    let config = build_report_config_with(settings, &args.overrides(sandbox))?;
    tracing::info!(endpoint = config.api.endpoint(), "using Tinkoff OpenAPI");
    let source = TinkoffApiAdapter::new(&token, &config.api)?;
    report_to_sink(&source, &config, args.output.as_ref())
}

fn run_import(
    settings: &dyn ConfigPort,
    operations: PathBuf,
    args: &ReportArgs,
) -> Result<(), ReporterError> {
    let config = build_report_config_with(settings, &args.overrides(false))?;
    tracing::info!(file = %operations.display(), "reading operations export");
    let source = CsvOperationAdapter::new(operations);
    report_to_sink(&source, &config, args.output.as_ref())
}

fn run_validate(settings: &dyn ConfigPort) -> Result<(), ReporterError> {
    let config = build_report_config_with(settings, &ConfigOverrides::default())?;
    tracing::info!(
        start = %config.start_date.to_rfc3339(),
        end = %config.end_date.to_rfc3339(),
        account_type = %config.account_type,
        endpoint = config.api.endpoint(),
        timeout_secs = config.api.timeout_secs,
        "configuration is valid"
    );
    Ok(())
}

/// Route summaries to a CSV file when one is given, otherwise to the log.
pub fn report_to_sink(
    source: &dyn OperationPort,
    config: &ReportConfig,
    output: Option<&PathBuf>,
) -> Result<(), ReporterError> {
    let outcome = match output {
        Some(path) => {
            let mut reporter = CsvReportAdapter::create(path)?;
            let outcome = run_report_pipeline(source, &mut reporter, config)?;
            tracing::info!(path = %path.display(), "report written");
            outcome
        }
        None => {
            let mut reporter = LogReportAdapter::new();
            run_report_pipeline(source, &mut reporter, config)?
        }
    };
    outcome.into_result().map(|_| ())
}

/// Resolve the account, fetch its operations, and feed every closed
/// instrument to the reporter.
pub fn run_report_pipeline(
    source: &dyn OperationPort,
    reporter: &mut dyn ReportPort,
    config: &ReportConfig,
) -> Result<ReportOutcome, ReporterError> {
    // Stage 1: Resolve account
    let accounts = source.list_accounts()?;
    let account = resolve_account(&accounts, &config.account_type)?;
    tracing::info!(
        account = %account.id,
        account_type = %account.account_type,
        "account resolved"
    );

    // Stage 2: Fetch operations
    let operations = source.fetch_operations(&account.id, config.start_date, config.end_date)?;
    tracing::info!(
        count = operations.len(),
        from = %config.start_date.to_rfc3339(),
        to = %config.end_date.to_rfc3339(),
        "operations fetched"
    );

    // Stage 3: Summarize and report
    let mut outcome = ReportOutcome {
        operations: operations.len(),
        ..ReportOutcome::default()
    };
    for result in summarize(&operations) {
        match result {
            Ok(summary) => {
                reporter.emit(&summary)?;
                outcome.reported += 1;
            }
            Err(e) => {
                reporter.skipped(&e)?;
                outcome.skipped.push(e);
            }
        }
    }
    reporter.finish()?;

    Ok(outcome)
}
