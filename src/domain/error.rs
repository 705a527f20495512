//! Domain error types.

/// Failure to summarize a single closed instrument group.
///
/// These never abort a run: the offending group is reported as skipped and the
/// remaining groups are still summarized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SummaryError {
    #[error("{figi}: invested amount is zero, income percentage is undefined")]
    ZeroInvested { figi: String },

    #[error("{figi}: holding period is zero days, yearly income is undefined")]
    ZeroPeriod { figi: String },

    #[error("{figi}: decimal overflow while computing {quantity}")]
    Overflow { figi: String, quantity: &'static str },
}

impl SummaryError {
    pub fn figi(&self) -> &str {
        match self {
            SummaryError::ZeroInvested { figi }
            | SummaryError::ZeroPeriod { figi }
            | SummaryError::Overflow { figi, .. } => figi,
        }
    }
}

/// Top-level error type for tinvest-reporter.
#[derive(Debug, thiserror::Error)]
pub enum ReporterError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("missing API token (pass it as an argument or set TINVEST_TOKEN)")]
    MissingToken,

    #[error("API request {endpoint} failed: {reason}")]
    Api { endpoint: String, reason: String },

    #[error("no broker account of type {account_type}")]
    AccountNotFound { account_type: String },

    #[error("malformed operation data in {source_name}: {reason}")]
    SourceData { source_name: String, reason: String },

    #[error("failed to write report: {reason}")]
    ReportOutput { reason: String },

    #[error("report incomplete: {skipped} of {closed} closed instruments could not be summarized")]
    Incomplete { closed: usize, skipped: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ReporterError {
    /// Process exit status for this failure category.
    pub fn exit_status(&self) -> u8 {
        match self {
            ReporterError::Io(_) | ReporterError::ReportOutput { .. } => 1,
            ReporterError::ConfigParse { .. }
            | ReporterError::ConfigMissing { .. }
            | ReporterError::ConfigInvalid { .. }
            | ReporterError::MissingToken => 2,
            ReporterError::Api { .. } => 3,
            ReporterError::AccountNotFound { .. } => 4,
            ReporterError::SourceData { .. } => 5,
            ReporterError::Incomplete { .. } => 6,
        }
    }
}

impl From<&ReporterError> for std::process::ExitCode {
    fn from(err: &ReporterError) -> Self {
        std::process::ExitCode::from(err.exit_status())
    }
}
