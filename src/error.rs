use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum ExplorerError {
    #[error("invalid target id: {0}")]
    InvalidTargetId(String),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("invalid config value: {0}")]
    InvalidConfig(String),

    #[error("ChEMBL request failed: {0}")]
    ChemblHttp(String),

    #[error("ChEMBL returned status {status}: {message}")]
    ChemblStatus { status: u16, message: String },

    #[error("unexpected ChEMBL response: {0}")]
    ChemblDecode(String),

    #[error("{record} record is missing required field `{field}`")]
    MissingField {
        record: &'static str,
        field: &'static str,
    },

    #[error("csv export failed: {0}")]
    Csv(String),

    #[error("terminal error: {0}")]
    Terminal(String),
}

impl ExplorerError {
    /// Transport, timeout and HTTP status failures talking to ChEMBL.
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            ExplorerError::ChemblHttp(_) | ExplorerError::ChemblStatus { .. }
        )
    }
}
