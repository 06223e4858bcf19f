//! Centralized error handling for the marquee pipeline.
//!
//! Every table operation returns [`Result`], whose error is the
//! [`PipelineError`] enum. Variants fall into two groups:
//!
//! - **Misuse of the pipeline** (`Schema`, `MissingField`, `DivisionByZero`,
//!   `DegenerateRange`, `Overflow`). These are fatal: they mean a stage was
//!   configured wrongly or an earlier stage was skipped.
//! - **Environment failures** (`Io`, `DataProcessing`, `Config`).
//!
//! Dirty input data is never an error. Malformed nested fields degrade to an
//! empty list inside the parser, and an aggregation with nothing to count
//! carries a `NoDataWarning` value instead of failing.
//!
//! ## Stage context
//!
//! The executor wraps failures with the stage that produced them so the
//! message read by the user names both the stage and the broken precondition:
//!
//! ```
//! use marquee::error::PipelineError;
//!
//! let err = PipelineError::DegenerateRange {
//!     field: "popularity".to_owned(),
//!     value: 7.0,
//! }
//! .in_stage("6 (rescale popularity)");
//! assert_eq!(
//!     err.to_string(),
//!     "Stage 6 (rescale popularity) failed: Cannot rescale 'popularity': every value is 7"
//! );
//! ```

use std::fmt;

/// Main error type for marquee operations.
#[derive(Debug)]
pub enum PipelineError {
    /// I/O errors (checkpoint files, inputs)
    Io(std::io::Error),

    /// Errors raised by polars while reading, joining or writing tables
    DataProcessing(String),

    /// A join key is absent from one side or does not identify rows uniquely
    Schema(String),

    /// A requested field is not part of the table
    MissingField(String),

    /// A derived field would divide by zero on a surviving row
    DivisionByZero { field: String, row: usize },

    /// Min-max rescaling over a column whose min equals its max
    DegenerateRange { field: String, value: f64 },

    /// A value does not fit the narrower integer representation
    Overflow {
        field: String,
        row: usize,
        value: f64,
        target: &'static str,
    },

    /// Configuration errors
    Config(String),

    /// An error annotated with the pipeline stage it aborted
    Stage {
        stage: String,
        source: Box<PipelineError>,
    },

    /// Generic error with context
    Other(String),
}

impl PipelineError {
    /// Attach the stage that was running when this error occurred.
    pub fn in_stage(self, stage: impl Into<String>) -> Self {
        Self::Stage {
            stage: stage.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, skipping any stage annotations.
    pub fn root(&self) -> &Self {
        match self {
            Self::Stage { source, .. } => source.root(),
            other => other,
        }
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::DataProcessing(msg) => write!(f, "Data processing error: {msg}"),
            Self::Schema(msg) => write!(f, "Schema error: {msg}"),
            Self::MissingField(name) => write!(f, "Missing field: '{name}'"),
            Self::DivisionByZero { field, row } => {
                write!(f, "Division by zero: '{field}' is 0 at row {row}")
            }
            Self::DegenerateRange { field, value } => {
                write!(f, "Cannot rescale '{field}': every value is {value}")
            }
            Self::Overflow {
                field,
                row,
                value,
                target,
            } => write!(
                f,
                "Overflow: '{field}' value {value} at row {row} does not fit in {target}"
            ),
            Self::Config(msg) => write!(f, "Configuration error: {msg}"),
            Self::Stage { stage, source } => write!(f, "Stage {stage} failed: {source}"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Stage { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<anyhow::Error> for PipelineError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(format!("JSON error: {err}"))
    }
}

impl From<polars::error::PolarsError> for PipelineError {
    fn from(err: polars::error::PolarsError) -> Self {
        Self::DataProcessing(err.to_string())
    }
}

/// Result type alias for marquee operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Extension trait to add context to results.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, msg: impl Into<String>) -> Result<T>;

    /// Add context using a closure (lazy evaluation).
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<PipelineError>,
{
    fn context(self, msg: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err: PipelineError = e.into();
            PipelineError::Other(format!("{}: {}", msg.into(), err))
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err: PipelineError = e.into();
            PipelineError::Other(format!("{}: {}", f(), err))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PipelineError::MissingField("budget".to_owned());
        assert_eq!(err.to_string(), "Missing field: 'budget'");
    }

    #[test]
    fn test_stage_wrapping_keeps_root() {
        let err = PipelineError::Overflow {
            field: "popularity".to_owned(),
            row: 3,
            value: 40_000.0,
            target: "i16",
        }
        .in_stage("7");

        assert!(err.to_string().starts_with("Stage 7 failed: Overflow"));
        assert!(matches!(err.root(), PipelineError::Overflow { row: 3, .. }));
    }

    #[test]
    fn test_result_context() {
        let result: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "movies.csv",
        ));

        let result: Result<()> = result.context("Failed to read movies");
        assert!(
            result
                .expect_err("context keeps the error")
                .to_string()
                .contains("Failed to read movies")
        );
    }
}
