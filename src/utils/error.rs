use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarksError {
    #[error("{message}")]
    ValidationError { message: String },

    #[error("{message}")]
    BadRequest { message: String },

    #[error("Not found")]
    NotFound,

    #[error("Export failed: {message}")]
    ExportError { message: String },

    #[error("Spreadsheet error: {0}")]
    SpreadsheetError(#[from] rust_xlsxwriter::XlsxError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

/// Coarse grouping used when deciding what a caller is allowed to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Client,
    NotFound,
    Export,
    Internal,
}

impl MarksError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn export(message: impl Into<String>) -> Self {
        Self::ExportError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ValidationError { .. } | Self::BadRequest { .. } => ErrorCategory::Client,
            Self::NotFound => ErrorCategory::NotFound,
            Self::ExportError { .. }
            | Self::SpreadsheetError(_)
            | Self::CsvError(_)
            | Self::IoError(_) => ErrorCategory::Export,
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorCategory::Internal,
        }
    }

    /// Message that is safe to hand back over HTTP. Only client errors carry
    /// their own text; everything else is replaced by a fixed string.
    pub fn public_message(&self) -> String {
        match self.category() {
            ErrorCategory::Client | ErrorCategory::NotFound => self.to_string(),
            ErrorCategory::Export => "Failed to generate export file".to_string(),
            ErrorCategory::Internal => "Internal server error".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MarksError>;
