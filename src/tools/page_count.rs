use crate::input::{PageCountRequest, ensure_document};
use crate::raster::Rasterizer;
use crate::tools::ToolError;
use crate::tools::envelope::ResultEnvelope;
use serde_json::{Value, json};

pub fn call(args: &Value, rasterizer: &dyn Rasterizer) -> Value {
    let request = match PageCountRequest::from_args(args) {
        Ok(request) => request,
        Err(err) => return err.into_result(None),
    };
    let source = format!("path:{}", request.pdf_path.display());

    match run(&request, rasterizer) {
        Ok(envelope) => envelope.into_result(),
        Err(err) => {
            tracing::warn!(kind = err.kind(), error = %err, "page count failed");
            err.into_result(Some(source.as_str()))
        }
    }
}

pub fn run(
    request: &PageCountRequest,
    rasterizer: &dyn Rasterizer,
) -> Result<ResultEnvelope, ToolError> {
    rasterizer.probe().map_err(ToolError::Unavailable)?;
    ensure_document(&request.pdf_path)?;

    let output = rasterizer
        .count_pages(&request.pdf_path)
        .map_err(ToolError::ConversionFailed)?;
    let pages = parse_page_count(&output)?;
    tracing::info!(pdf = %request.pdf_path.display(), pages, "counted pages");

    Ok(ResultEnvelope::new(format!("Total pages: {pages}")).with_structured(json!({
        "pages": pages
    })))
}

/// `identify -format "%n\n"` prints the frame count once per frame; only the
/// first line matters.
fn parse_page_count(output: &str) -> Result<u64, ToolError> {
    let first = output.trim().lines().next().unwrap_or("").trim();
    if first.is_empty() {
        return Err(ToolError::MalformedOutput {
            output: output.to_string(),
            reason: "no output from page count command".to_string(),
        });
    }
    first.parse::<u64>().map_err(|err| ToolError::MalformedOutput {
        output: output.to_string(),
        reason: err.to_string(),
    })
}
