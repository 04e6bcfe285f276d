use super::{RasterError, RasterJob, Rasterizer};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

pub const DEFAULT_CONVERT_BIN: &str = "convert";
pub const DEFAULT_IDENTIFY_BIN: &str = "identify";

/// Process-backed rasterizer driving ImageMagick's `convert` and `identify`.
#[derive(Debug, Clone)]
pub struct ImageMagick {
    convert: PathBuf,
    identify: PathBuf,
}

impl ImageMagick {
    pub fn new(convert: impl Into<PathBuf>, identify: impl Into<PathBuf>) -> Self {
        Self {
            convert: convert.into(),
            identify: identify.into(),
        }
    }
}

impl Rasterizer for ImageMagick {
    fn probe(&self) -> Result<(), RasterError> {
        run(&self.convert, [OsStr::new("-version")]).map(|_| ())
    }

    fn rasterize(&self, job: &RasterJob) -> Result<(), RasterError> {
        let density = job.density.to_string();
        let quality = job.quality.to_string();
        let target = job.target();
        let args = [
            OsStr::new("-density"),
            OsStr::new(&density),
            OsStr::new("-quality"),
            OsStr::new(&quality),
            target.as_os_str(),
            job.output_template.as_os_str(),
        ];
        tracing::debug!(program = %self.convert.display(), ?args, "invoking rasterizer");
        run(&self.convert, args).map(|_| ())
    }

    fn count_pages(&self, document: &Path) -> Result<String, RasterError> {
        let args = [
            OsStr::new("-format"),
            OsStr::new("%n\n"),
            document.as_os_str(),
        ];
        let output = run(&self.identify, args)?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

fn run<'a>(
    program: &Path,
    args: impl IntoIterator<Item = &'a OsStr>,
) -> Result<Output, RasterError> {
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|source| RasterError::Missing {
            program: program.display().to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(RasterError::Failed {
            program: program.display().to_string(),
            status: output.status.to_string(),
            output: combined_output(&output),
        });
    }
    Ok(output)
}

fn combined_output(output: &Output) -> String {
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    text.trim().to_string()
}
