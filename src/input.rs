use crate::mcp::contracts::{DEFAULT_DENSITY, DEFAULT_QUALITY, MAX_QUALITY};
use crate::tools::ToolError;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

pub const ARG_PDF_PATH: &str = "pdfPath";
pub const ARG_DENSITY: &str = "density";
pub const ARG_QUALITY: &str = "quality";
pub const ARG_PAGE: &str = "page";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    pub pdf_path: PathBuf,
    pub density: u32,
    pub quality: u32,
    /// 0 selects every page, otherwise a 1-based page number.
    pub page: u32,
}

impl ConversionRequest {
    pub fn from_args(args: &Value) -> Result<Self, ToolError> {
        let obj = arguments_object(args)?;
        let pdf_path = parse_pdf_path(obj)?;

        let density = parse_u32(obj, ARG_DENSITY)?.unwrap_or(0);
        let quality = parse_u32(obj, ARG_QUALITY)?.unwrap_or(0);
        if quality > MAX_QUALITY {
            return Err(ToolError::InvalidInput(format!(
                "quality must be between 0 and {MAX_QUALITY}"
            )));
        }
        let page = parse_u32(obj, ARG_PAGE)?.unwrap_or(0);

        Ok(Self {
            pdf_path,
            density,
            quality,
            page,
        })
    }

    /// Zero means "unset" for both density and quality.
    pub fn with_defaults(mut self) -> Self {
        if self.density == 0 {
            self.density = DEFAULT_DENSITY;
        }
        if self.quality == 0 {
            self.quality = DEFAULT_QUALITY;
        }
        self
    }

    /// 0-based index understood by the rasterizer, or `None` for all pages.
    pub fn page_index(&self) -> Option<u32> {
        self.page.checked_sub(1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCountRequest {
    pub pdf_path: PathBuf,
}

impl PageCountRequest {
    pub fn from_args(args: &Value) -> Result<Self, ToolError> {
        let obj = arguments_object(args)?;
        Ok(Self {
            pdf_path: parse_pdf_path(obj)?,
        })
    }
}

pub fn ensure_document(path: &Path) -> Result<(), ToolError> {
    let metadata = fs::metadata(path).map_err(|_| ToolError::NotFound(path.to_path_buf()))?;
    if !metadata.is_file() {
        return Err(ToolError::NotAFile(path.to_path_buf()));
    }
    Ok(())
}

fn arguments_object(args: &Value) -> Result<&Map<String, Value>, ToolError> {
    args.as_object()
        .ok_or_else(|| ToolError::InvalidInput("arguments must be an object".to_string()))
}

fn parse_pdf_path(obj: &Map<String, Value>) -> Result<PathBuf, ToolError> {
    let Some(value) = obj.get(ARG_PDF_PATH) else {
        return Err(ToolError::InvalidInput(format!("{ARG_PDF_PATH} is required")));
    };
    let Some(path) = value.as_str() else {
        return Err(ToolError::InvalidInput(format!(
            "{ARG_PDF_PATH} must be a string"
        )));
    };
    if path.trim().is_empty() {
        return Err(ToolError::InvalidInput(format!(
            "{ARG_PDF_PATH} must not be empty"
        )));
    }
    Ok(PathBuf::from(path))
}

fn parse_u32(obj: &Map<String, Value>, name: &str) -> Result<Option<u32>, ToolError> {
    let Some(value) = obj.get(name) else {
        return Ok(None);
    };
    if value.is_null() {
        return Ok(None);
    }
    let number = value.as_u64().ok_or_else(|| {
        ToolError::InvalidInput(format!("{name} must be a non-negative integer"))
    })?;
    u32::try_from(number)
        .map(Some)
        .map_err(|_| ToolError::InvalidInput(format!("{name} is out of range")))
}
