//! Error types for the paint_scan library

use thiserror::Error;

/// Result type alias for paint_scan operations
pub type Result<T> = std::result::Result<T, ScanError>;

/// Failures that abort a scan or a reference-data load
#[derive(Error, Debug)]
pub enum ScanError {
    /// Image bytes are empty, in an unsupported format, or carry no usable pixels
    #[error("Failed to decode image: {message}")]
    Decode {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The reference paint table holds no paints for any brand
    #[error("Paint database is empty: no paints available for matching")]
    EmptyDatabase,

    /// The scan was superseded by a newer request
    #[error("Scan cancelled")]
    Cancelled,

    /// Invalid scan configuration value
    #[error("Invalid parameter: {parameter} = {value}")]
    InvalidParameter { parameter: String, value: String },

    /// A paint table entry could not be loaded
    #[error("Invalid paint record '{name}': {reason}")]
    InvalidPaintRecord { name: String, reason: String },

    /// Configuration or reference data file could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl ScanError {
    /// Create a decode error with its underlying cause
    pub fn decode<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Decode {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a decode error without an underlying cause
    pub fn decode_msg(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with its underlying cause
    pub fn config<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn invalid_parameter(parameter: impl Into<String>, value: impl ToString) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            value: value.to_string(),
        }
    }

    /// Whether re-invoking the pipeline with different input may succeed.
    ///
    /// Database and configuration problems will fail again no matter which
    /// image is supplied.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ScanError::Decode { .. } | ScanError::Cancelled)
    }

    /// Cancelled scans are dropped silently by callers
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, ScanError::Cancelled)
    }

    /// Get user-friendly error description for application display
    pub fn user_message(&self) -> String {
        match self {
            ScanError::Decode { .. } => {
                "Could not read the image. Please try a JPEG or PNG photo.".to_string()
            }
            ScanError::EmptyDatabase => {
                "No paints are available to match against. Please check the paint catalog."
                    .to_string()
            }
            ScanError::Cancelled => "Scan was replaced by a newer one.".to_string(),
            ScanError::InvalidParameter { parameter, value } => {
                format!("Scan setting '{}' has an unsupported value ({}).", parameter, value)
            }
            _ => "Color scan failed. Please try again.".to_string(),
        }
    }
}

/// Non-fatal conditions that reduce result quality
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScanWarning {
    /// Background removal kept too little of the image; the full frame was used instead
    #[error("Foreground covers {foreground_percent:.1}% of the image (minimum {minimum_percent:.1}%), using full image")]
    LowForeground {
        foreground_percent: f32,
        minimum_percent: f32,
    },
}
