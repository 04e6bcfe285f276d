use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use clap::{Args, Parser, Subcommand};
use serde_json::{Map, Value, json};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

mod input;
mod mcp;
mod raster;
mod server;
mod tools;
mod workspace;

use raster::ImageMagick;
use raster::imagemagick::{DEFAULT_CONVERT_BIN, DEFAULT_IDENTIFY_BIN};

#[derive(Parser)]
#[command(name = "mcp-pdf-image")]
#[command(version, about = "PDF to PNG conversion over MCP, backed by ImageMagick")]
struct Cli {
    #[command(flatten)]
    backend: BackendArgs,
    /// Log filter (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, global = true, env = "PDF_IMAGE_LOG", default_value = "warn")]
    log_level: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct BackendArgs {
    /// ImageMagick convert binary
    #[arg(
        long,
        global = true,
        env = "PDF_IMAGE_CONVERT_BIN",
        default_value = DEFAULT_CONVERT_BIN
    )]
    convert_bin: PathBuf,
    /// ImageMagick identify binary
    #[arg(
        long,
        global = true,
        env = "PDF_IMAGE_IDENTIFY_BIN",
        default_value = DEFAULT_IDENTIFY_BIN
    )]
    identify_bin: PathBuf,
}

#[derive(Args, Clone)]
struct PageCountArgs {
    /// Path to the PDF file
    #[arg(long)]
    path: String,
    /// Output JSON structuredContent
    #[arg(long)]
    json: bool,
}

#[derive(Args, Clone)]
struct ConvertArgs {
    /// Path to the PDF file
    #[arg(long)]
    path: String,
    /// Resolution in DPI
    #[arg(long)]
    density: Option<u32>,
    /// Output quality (0-100)
    #[arg(long)]
    quality: Option<u32>,
    /// 1-based page to convert; omit for all pages
    #[arg(long)]
    page: Option<u32>,
    /// Directory to write the converted PNG files into
    #[arg(long)]
    out_dir: Option<PathBuf>,
    /// Output JSON structuredContent
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start MCP stdio server
    Serve {
        /// Serve MCP over stdio (NDJSON)
        #[arg(long)]
        stdio: bool,
    },
    /// Print the number of pages in a PDF
    PageCount(PageCountArgs),
    /// Convert PDF pages to PNG images
    Convert(ConvertArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let rasterizer = ImageMagick::new(cli.backend.convert_bin, cli.backend.identify_bin);

    match cli.command {
        Commands::Serve { stdio } => {
            if stdio {
                tracing::info!(?rasterizer, "starting stdio server");
                server::serve(io::stdin().lock(), io::stdout().lock(), &rasterizer)
            } else {
                anyhow::bail!("only --stdio transport is supported")
            }
        }
        Commands::PageCount(args) => run_page_count(args, &rasterizer),
        Commands::Convert(args) => run_convert(args, &rasterizer),
    }
}

// stdout carries protocol traffic, so logs go to stderr.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run_page_count(args: PageCountArgs, rasterizer: &ImageMagick) -> Result<()> {
    let mut map = Map::new();
    map.insert(input::ARG_PDF_PATH.to_string(), json!(args.path));
    let result = tools::page_count::call(&Value::Object(map), rasterizer);
    print_tool_result(&result, args.json)
}

fn run_convert(args: ConvertArgs, rasterizer: &ImageMagick) -> Result<()> {
    let mut map = Map::new();
    map.insert(input::ARG_PDF_PATH.to_string(), json!(args.path));
    if let Some(density) = args.density {
        map.insert(input::ARG_DENSITY.to_string(), json!(density));
    }
    if let Some(quality) = args.quality {
        map.insert(input::ARG_QUALITY.to_string(), json!(quality));
    }
    if let Some(page) = args.page {
        map.insert(input::ARG_PAGE.to_string(), json!(page));
    }
    let result = tools::convert::call(&Value::Object(map), rasterizer);

    if let Some(out_dir) = &args.out_dir
        && tool_error_message(&result).is_none()
    {
        let written = export_images(&result, out_dir)?;
        eprintln!("wrote {written} image(s) to {}", out_dir.display());
    }
    print_tool_result(&result, args.json)
}

/// Writes each image part as `page-NNN.png`. Every part after the summary
/// stands for one page, so decode-failure notes still advance the number.
fn export_images(result: &Value, out_dir: &Path) -> Result<usize> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    let parts = result
        .get("content")
        .and_then(|value| value.as_array())
        .map(|parts| parts.iter().skip(1))
        .into_iter()
        .flatten();

    let mut written = 0;
    for (index, part) in parts.enumerate() {
        if part.get("type").and_then(|value| value.as_str()) != Some("image") {
            continue;
        }
        let data = part
            .get("data")
            .and_then(|value| value.as_str())
            .context("image part without data")?;
        let bytes = STANDARD
            .decode(data.as_bytes())
            .context("image part is not valid base64")?;
        let path = out_dir.join(format!("page-{:03}.png", index + 1));
        fs::write(&path, bytes).with_context(|| format!("failed to write {}", path.display()))?;
        written += 1;
    }
    Ok(written)
}

fn tool_error_message(result: &Value) -> Option<&str> {
    let is_error = result
        .get("isError")
        .and_then(|value| value.as_bool())
        .unwrap_or(false);
    if !is_error {
        return None;
    }
    Some(
        result
            .get("structuredContent")
            .and_then(|value| value.get("error"))
            .and_then(|value| value.get("message"))
            .and_then(|value| value.as_str())
            .unwrap_or("tool error"),
    )
}

fn print_tool_result(result: &Value, json_output: bool) -> Result<()> {
    if let Some(message) = tool_error_message(result) {
        eprintln!("{message}");
        process::exit(1);
    }

    if json_output {
        let structured = result
            .get("structuredContent")
            .cloned()
            .unwrap_or_else(|| json!({}));
        let output = serde_json::to_string_pretty(&structured)?;
        println!("{output}");
        return Ok(());
    }

    let text = result
        .get("content")
        .and_then(|value| value.as_array())
        .and_then(|arr| arr.first())
        .and_then(|value| value.get("text"))
        .and_then(|value| value.as_str())
        .unwrap_or("");
    println!("{text}");
    Ok(())
}
