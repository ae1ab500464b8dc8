//! Domain error types.
//!
//! Two layers: [`InstrumentIssue`] describes problems scoped to a single
//! instrument and never aborts a batch; [`AlgotraderError`] covers
//! process-level failures (config, I/O, reporting) surfaced by the CLI.

/// A problem found while preparing or running one instrument's pipeline.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InstrumentIssue {
    #[error("dropped {rows} rows with missing or non-numeric close")]
    DataQuality { rows: usize },

    #[error("only {bars} usable rows, longest window needs {required}")]
    InsufficientHistory { bars: usize, required: usize },

    #[error("missing column {column}")]
    MissingColumn { column: String },

    #[error("no usable rows")]
    NoUsableRows,
}

/// Top-level error type for algotrader.
#[derive(Debug, thiserror::Error)]
pub enum AlgotraderError {
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

    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error("no backtest possible: {skipped} instruments skipped, none usable")]
    NoResult { skipped: usize },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AlgotraderError {
    /// Process exit status for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            AlgotraderError::Io(_) => 1,
            AlgotraderError::ConfigParse { .. }
            | AlgotraderError::ConfigMissing { .. }
            | AlgotraderError::ConfigInvalid { .. } => 2,
            AlgotraderError::DataSource { .. } | AlgotraderError::Csv(_) => 3,
            AlgotraderError::NoResult { .. } => 5,
            AlgotraderError::Report { .. } => 6,
        }
    }
}

impl From<&AlgotraderError> for std::process::ExitCode {
    fn from(err: &AlgotraderError) -> Self {
        std::process::ExitCode::from(err.exit_code())
    }
}
