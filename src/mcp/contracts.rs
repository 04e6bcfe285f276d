use serde_json::json;

pub const TOOL_CONVERT_PDF_TO_IMAGES: &str = "convert_pdf_to_images";
pub const TOOL_GET_PDF_PAGE_COUNT: &str = "get_pdf_page_count";

pub const PROTOCOL_VERSION: &str = "2025-11-25";

pub const DEFAULT_DENSITY: u32 = 300;
pub const DEFAULT_QUALITY: u32 = 100;
pub const MAX_QUALITY: u32 = 100;

pub const IMAGE_MIME_TYPE: &str = "image/png";

pub fn convert_pdf_to_images_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "pdfPath": {
                "type": "string",
                "description": "Path to the PDF file"
            },
            "density": {
                "type": "integer",
                "minimum": 0,
                "description": "Resolution in DPI (default 300)"
            },
            "quality": {
                "type": "integer",
                "minimum": 0,
                "maximum": MAX_QUALITY,
                "description": "Output quality 0-100 (default 100)"
            },
            "page": {
                "type": "integer",
                "minimum": 0,
                "description": "1-based page to convert; 0 or omitted converts all pages"
            }
        },
        "required": ["pdfPath"],
        "additionalProperties": false
    })
}

pub fn get_pdf_page_count_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "pdfPath": {
                "type": "string",
                "description": "Path to the PDF file"
            }
        },
        "required": ["pdfPath"],
        "additionalProperties": false
    })
}
