use std::ffi::OsString;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod imagemagick;

#[cfg(test)]
pub mod fake;

pub use imagemagick::ImageMagick;

/// Backend that turns a paged document into one raster image per page.
pub trait Rasterizer {
    /// Cheap introspection call used to check the backend is reachable.
    fn probe(&self) -> Result<(), RasterError>;

    /// Writes the selected pages into files generated from `job.output_template`.
    fn rasterize(&self, job: &RasterJob) -> Result<(), RasterError>;

    /// Returns the raw textual output of the page-count operation.
    fn count_pages(&self, document: &Path) -> Result<String, RasterError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterJob {
    pub density: u32,
    pub quality: u32,
    pub source: PathBuf,
    /// 0-based page selector; `None` rasterizes the whole document.
    pub page_index: Option<u32>,
    pub output_template: PathBuf,
}

impl RasterJob {
    /// Source reference with the page selector suffix, e.g. `doc.pdf[1]`.
    pub fn target(&self) -> OsString {
        let mut target = self.source.as_os_str().to_owned();
        if let Some(index) = self.page_index {
            target.push(format!("[{index}]"));
        }
        target
    }
}

#[derive(Debug, Error)]
pub enum RasterError {
    #[error("{program} is not installed or not in PATH: {source}")]
    Missing {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} failed: {status}, output: {output}")]
    Failed {
        program: String,
        status: String,
        output: String,
    },
}
