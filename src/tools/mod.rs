use crate::mcp::errors;
use crate::raster::RasterError;
use serde_json::json;
use std::path::PathBuf;
use thiserror::Error;

pub mod convert;
pub mod envelope;
pub mod page_count;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("ImageMagick is not available: {0}")]
    Unavailable(#[source] RasterError),
    #[error("PDF file does not exist: {}", .0.display())]
    NotFound(PathBuf),
    #[error("PDF path is not a file: {}", .0.display())]
    NotAFile(PathBuf),
    #[error("{0}")]
    ConversionFailed(#[source] RasterError),
    #[error("no images were generated from the PDF")]
    NoOutputProduced,
    #[error("failed to parse page count from {output:?}: {reason}")]
    MalformedOutput { output: String, reason: String },
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

impl ToolError {
    pub fn io(context: &'static str) -> impl FnOnce(std::io::Error) -> Self {
        move |source| ToolError::Io { context, source }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::InvalidInput(_) => errors::INVALID_INPUT,
            ToolError::Unavailable(_) => errors::UNAVAILABLE,
            ToolError::NotFound(_) | ToolError::NotAFile(_) => errors::NOT_FOUND,
            ToolError::ConversionFailed(_) => errors::CONVERSION_FAILED,
            ToolError::NoOutputProduced => errors::NO_OUTPUT_PRODUCED,
            ToolError::MalformedOutput { .. } => errors::MALFORMED_OUTPUT,
            ToolError::Io { .. } => errors::INTERNAL_ERROR,
        }
    }

    pub fn into_result(self, source: Option<&str>) -> serde_json::Value {
        error_result(self.kind(), self.to_string(), source)
    }
}

pub fn error_result(
    kind: &'static str,
    message: impl Into<String>,
    source: Option<&str>,
) -> serde_json::Value {
    let message = message.into();
    let mut error = json!({
        "kind": kind,
        "message": message,
    });

    if let Some(source) = source
        && let Some(obj) = error.as_object_mut()
    {
        obj.insert("source".to_string(), json!(source));
    }

    json!({
        "content": [{"type": "text", "text": format!("Error: {message}")}],
        "structuredContent": {"error": error},
        "isError": true
    })
}
