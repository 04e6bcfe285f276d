use crate::input::{ConversionRequest, ensure_document};
use crate::mcp::contracts::IMAGE_MIME_TYPE;
use crate::raster::{RasterJob, Rasterizer};
use crate::tools::ToolError;
use crate::tools::envelope::ResultEnvelope;
use crate::workspace::{RasterPage, ScopedWorkspace};
use image::{ImageFormat, ImageReader};
use serde_json::{Value, json};
use std::io::Cursor;

pub fn call(args: &Value, rasterizer: &dyn Rasterizer) -> Value {
    let request = match ConversionRequest::from_args(args) {
        Ok(request) => request,
        Err(err) => return err.into_result(None),
    };
    let source = format!("path:{}", request.pdf_path.display());

    match run(request, rasterizer) {
        Ok(envelope) => envelope.into_result(),
        Err(err) => {
            tracing::warn!(kind = err.kind(), error = %err, "conversion failed");
            err.into_result(Some(source.as_str()))
        }
    }
}

pub fn run(
    request: ConversionRequest,
    rasterizer: &dyn Rasterizer,
) -> Result<ResultEnvelope, ToolError> {
    rasterizer.probe().map_err(ToolError::Unavailable)?;

    let request = request.with_defaults();
    ensure_document(&request.pdf_path)?;

    let workspace =
        ScopedWorkspace::acquire().map_err(ToolError::io("failed to create temp directory"))?;
    // Any early return below drops `workspace`, which removes the directory.
    let envelope = rasterize_into(&request, &workspace, rasterizer)?;
    tracing::debug!(images = envelope.image_count(), "envelope assembled");

    if let Err(err) = workspace.release() {
        tracing::warn!(error = %err, "failed to remove workspace");
    }
    Ok(envelope)
}

fn rasterize_into(
    request: &ConversionRequest,
    workspace: &ScopedWorkspace,
    rasterizer: &dyn Rasterizer,
) -> Result<ResultEnvelope, ToolError> {
    let job = RasterJob {
        density: request.density,
        quality: request.quality,
        source: request.pdf_path.clone(),
        page_index: request.page_index(),
        output_template: workspace.output_template(),
    };
    rasterizer
        .rasterize(&job)
        .map_err(ToolError::ConversionFailed)?;

    let pages = workspace
        .collect_pages()
        .map_err(ToolError::io("failed to read generated images"))?;
    if pages.is_empty() {
        return Err(ToolError::NoOutputProduced);
    }
    tracing::info!(
        pdf = %request.pdf_path.display(),
        pages = pages.len(),
        density = request.density,
        quality = request.quality,
        "rasterized document"
    );

    Ok(assemble(request, pages))
}

fn assemble(request: &ConversionRequest, pages: Vec<RasterPage>) -> ResultEnvelope {
    let mut envelope = ResultEnvelope::new(format!(
        "Successfully converted {} page(s) from PDF to PNG",
        pages.len()
    ));
    let page_count = pages.len();
    let mut summaries = Vec::with_capacity(page_count);

    for page in pages {
        let bytes_len = page.bytes.len();
        match decode_png(&page.bytes) {
            Ok((width, height)) => {
                summaries.push(json!({
                    "page": page.page_number,
                    "bytes_len": bytes_len,
                    "width": width,
                    "height": height
                }));
                envelope.push_image(page.bytes, IMAGE_MIME_TYPE);
            }
            Err(err) => {
                tracing::warn!(page = page.page_number, error = %err, "page failed to decode");
                summaries.push(json!({
                    "page": page.page_number,
                    "error": err.to_string()
                }));
                envelope.push_text(format!(
                    "Page {}: Failed to decode image data",
                    page.page_number
                ));
            }
        }
    }

    envelope.with_structured(json!({
        "page_count": page_count,
        "density": request.density,
        "quality": request.quality,
        "page": request.page,
        "pages": summaries
    }))
}

/// Full decode, so a truncated or corrupt body fails here and not on the client.
fn decode_png(bytes: &[u8]) -> image::ImageResult<(u32, u32)> {
    let image = ImageReader::with_format(Cursor::new(bytes), ImageFormat::Png).decode()?;
    Ok((image.width(), image.height()))
}
