use crate::mcp::{self, contracts, errors};
use crate::raster::Rasterizer;
use crate::tools;
use anyhow::{Context, Result};
use serde_json::{Value, json};
use std::io::{BufRead, Write};

/// Newline-delimited JSON-RPC loop. Returns when the reader hits EOF.
pub fn serve<R: BufRead, W: Write>(
    mut reader: R,
    mut writer: W,
    rasterizer: &dyn Rasterizer,
) -> Result<()> {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .context("failed to read stdin")?;
        if read == 0 {
            break;
        }

        let Ok(line) = std::str::from_utf8(&buf) else {
            tracing::warn!("skipping message that is not valid UTF-8");
            continue;
        };
        if line.trim().is_empty() {
            continue;
        }

        let request: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(error = %err, "skipping unparsable message");
                continue;
            }
        };

        if let Some(response) = handle_message(&request, rasterizer) {
            let serialized =
                serde_json::to_string(&response).context("failed to serialize response")?;
            writeln!(writer, "{serialized}").context("failed to write response")?;
            writer.flush().context("failed to flush response")?;
        }
    }

    tracing::info!("stdin closed, shutting down");
    Ok(())
}

pub fn handle_message(request: &Value, rasterizer: &dyn Rasterizer) -> Option<Value> {
    let method = request.get("method").and_then(|value| value.as_str());
    // Notifications carry no id and never get a response.
    let id = request.get("id").cloned()?;
    tracing::debug!(?method, %id, "request");

    let result = match method {
        Some("initialize") => json!({
            "protocolVersion": contracts::PROTOCOL_VERSION,
            "capabilities": {
                "tools": {}
            },
            "serverInfo": {
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION")
            }
        }),
        Some("ping") => json!({}),
        Some("tools/list") => json!({
            "tools": mcp::tool_definitions()
        }),
        Some("tools/call") => handle_tool_call(request, rasterizer),
        _ => {
            return Some(json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": {
                    "code": errors::METHOD_NOT_FOUND,
                    "message": format!("method not found: {}", method.unwrap_or(""))
                }
            }));
        }
    };

    Some(json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result
    }))
}

fn handle_tool_call(request: &Value, rasterizer: &dyn Rasterizer) -> Value {
    let params = request.get("params");
    let Some(params) = params.and_then(|value| value.as_object()) else {
        return tools::error_result(errors::INVALID_INPUT, "params must be an object", None);
    };

    let name = params.get("name").and_then(|value| value.as_str());
    let Some(name) = name else {
        return tools::error_result(
            errors::INVALID_INPUT,
            "params.name must be a string",
            None,
        );
    };

    let args = params
        .get("arguments")
        .cloned()
        .unwrap_or_else(|| json!({}));

    tracing::info!(tool = name, "tool call");
    match name {
        contracts::TOOL_CONVERT_PDF_TO_IMAGES => tools::convert::call(&args, rasterizer),
        contracts::TOOL_GET_PDF_PAGE_COUNT => tools::page_count::call(&args, rasterizer),
        _ => tools::error_result(
            errors::INVALID_INPUT,
            format!("tool not implemented: {name}"),
            Some(name),
        ),
    }
}
