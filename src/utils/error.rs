use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// 表單欄位錯誤 (field name -> message)，保持欄位順序穩定
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        // 同一欄位只保留第一個錯誤
        self.0
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV export error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid configuration value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Service unreachable: {message}")]
    Unreachable { message: String },

    #[error("Unexpected HTTP status {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Malformed payload: {message}")]
    MalformedPayload { message: String },

    #[error("Validation failed: {0}")]
    ValidationError(FieldErrors),

    #[error("Booking was not accepted: {message}")]
    SubmissionError { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Sign-in required before booking")]
    IdentityRequired,

    #[error("Operation not allowed while {state}: {action}")]
    InvalidState { state: String, action: String },

    #[error("Unknown service: {id}")]
    UnknownService { id: String },

    #[error("Operation cancelled")]
    Cancelled,
}

/// 錯誤分類，對應使用者可見的行為
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// 目錄資料無法取得，由內建資料吸收
    DataUnavailable,
    Validation,
    Submission,
    NotFound,
    Configuration,
    Cancelled,
    Internal,
}

impl EngineError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EngineError::ApiError(_)
            | EngineError::Unreachable { .. }
            | EngineError::HttpStatus { .. }
            | EngineError::MalformedPayload { .. } => ErrorCategory::DataUnavailable,
            EngineError::ValidationError(_) => ErrorCategory::Validation,
            EngineError::SubmissionError { .. } => ErrorCategory::Submission,
            EngineError::NotFound { .. } | EngineError::UnknownService { .. } => {
                ErrorCategory::NotFound
            }
            EngineError::ConfigError { .. } | EngineError::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            EngineError::Cancelled => ErrorCategory::Cancelled,
            EngineError::IoError(_)
            | EngineError::SerializationError(_)
            | EngineError::CsvError(_)
            | EngineError::IdentityRequired
            | EngineError::InvalidState { .. } => ErrorCategory::Internal,
        }
    }

    /// 連線層級的失敗 (連不上、逾時)，可用離線模式或重試處理
    pub fn is_transport(&self) -> bool {
        match self {
            EngineError::Unreachable { .. } => true,
            EngineError::ApiError(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            _ => false,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EngineError::ValidationError(errors) => {
                format!("Please correct the highlighted fields ({})", errors)
            }
            EngineError::SubmissionError { message } => message.clone(),
            EngineError::NotFound { message } => message.clone(),
            EngineError::UnknownService { id } => format!("Service '{}' is not in the catalog", id),
            EngineError::IdentityRequired => "Please sign in to continue booking".to_string(),
            EngineError::ConfigError { message } => format!("Configuration problem: {}", message),
            EngineError::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration value '{}' is invalid: {}", field, reason)
            }
            EngineError::Cancelled => "Request cancelled".to_string(),
            e if e.is_transport() => {
                "We could not reach the server. Please check your connection and try again."
                    .to_string()
            }
            _ => "Something went wrong. Please try again.".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
