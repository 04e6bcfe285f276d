use serde_json::json;

pub mod contracts;
pub mod errors;

pub fn tool_definitions() -> Vec<serde_json::Value> {
    vec![
        json!({
            "name": contracts::TOOL_CONVERT_PDF_TO_IMAGES,
            "description": "Convert a PDF file to PNG images encoded as base64. Use 'page' parameter to convert specific page (1-based index)",
            "inputSchema": contracts::convert_pdf_to_images_schema()
        }),
        json!({
            "name": contracts::TOOL_GET_PDF_PAGE_COUNT,
            "description": "Get the total number of pages in a PDF file",
            "inputSchema": contracts::get_pdf_page_count_schema()
        }),
    ]
}
