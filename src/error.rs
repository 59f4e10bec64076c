//! Structured error types for the report engine.
//!
//! Only a few things can actually go wrong: the report input can't be read
//! or doesn't match the report schema, the configuration is unusable, or the
//! output sink fails to write. Everything else (missing sections, out-of-range percentages) is
//! absorbed during layout and never reaches the caller.

use thiserror::Error;

/// The unified error type returned by all public API functions.
#[derive(Debug, Error)]
pub enum ReportError {
    /// JSON input failed to parse as a valid report model.
    #[error("Failed to parse report model: {}{}", .source, format_hint(.hint))]
    Parse {
        #[source]
        source: serde_json::Error,
        hint: String,
    },

    /// The report input (file or stdin) could not be read.
    #[error("Cannot read report input: {context}")]
    Input {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Page geometry or configuration file is unusable.
    #[error("Config error: {0}")]
    Config(String),

    /// The output sink could not serialize or write the document.
    #[error("Output sink failed: {context}")]
    OutputSink {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

fn format_hint(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl ReportError {
    pub fn input(context: impl Into<String>, source: std::io::Error) -> Self {
        ReportError::Input {
            context: context.into(),
            source,
        }
    }

    pub fn sink(context: impl Into<String>, source: std::io::Error) -> Self {
        ReportError::OutputSink {
            context: context.into(),
            source,
        }
    }
}

impl From<serde_json::Error> for ReportError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "The report is not well-formed JSON. Look near the reported line for a stray comma or quote.".to_string()
            }
            serde_json::error::Category::Data => {
                "A report needs `patient` (age, genderCode, hemoglobin, bmi) and `classification`; \
                 percentages are numbers and statuses are low/normal/high."
                    .to_string()
            }
            serde_json::error::Category::Eof => {
                "The report ends early. Was the service response cut off?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        ReportError::Parse { source: e, hint }
    }
}
