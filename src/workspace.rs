use std::cmp::Ordering;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const WORKSPACE_PREFIX: &str = "pdf-to-png-";
pub const OUTPUT_PREFIX: &str = "page-";
pub const OUTPUT_SUFFIX: &str = ".png";
pub const PAGE_NUMBER_WIDTH: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterPage {
    pub page_number: u32,
    pub bytes: Vec<u8>,
}

/// Per-call temporary directory. Dropping it removes the directory and
/// everything the rasterizer wrote into it.
#[derive(Debug)]
pub struct ScopedWorkspace {
    dir: TempDir,
}

impl ScopedWorkspace {
    pub fn acquire() -> io::Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(WORKSPACE_PREFIX)
            .tempdir()?;
        tracing::debug!(path = %dir.path().display(), "workspace acquired");
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// printf-style template, e.g. `<dir>/page-%03d.png`.
    pub fn output_template(&self) -> PathBuf {
        self.path().join(format!(
            "{OUTPUT_PREFIX}%0{PAGE_NUMBER_WIDTH}d{OUTPUT_SUFFIX}"
        ))
    }

    /// Reads every generated page file. Page numbers come from the position
    /// in the ordered listing, never from the number inside the file name.
    pub fn collect_pages(&self) -> io::Result<Vec<RasterPage>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(self.path())? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if is_output_file(&name) {
                names.push(name);
            }
        }
        names.sort_by(|a, b| output_order(a, b));

        let mut pages = Vec::with_capacity(names.len());
        for (position, name) in names.iter().enumerate() {
            let bytes = fs::read(self.path().join(name))?;
            let page_number = u32::try_from(position + 1)
                .map_err(|_| io::Error::other("too many output pages"))?;
            pages.push(RasterPage { page_number, bytes });
        }
        Ok(pages)
    }

    /// Removes the directory now. `TempDir::close` gives up drop-time cleanup,
    /// so a failed close gets one more removal attempt before reporting.
    pub fn release(self) -> io::Result<()> {
        let path = self.path().to_path_buf();
        if let Err(err) = self.dir.close() {
            tracing::debug!(path = %path.display(), error = %err, "retrying workspace removal");
            match fs::remove_dir_all(&path) {
                Ok(()) => {}
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => return Err(err),
            }
        }
        tracing::debug!(path = %path.display(), "workspace released");
        Ok(())
    }
}

fn is_output_file(name: &str) -> bool {
    name.starts_with(OUTPUT_PREFIX) && name.ends_with(OUTPUT_SUFFIX)
}

// Names share a fixed-width zero-padded number, so lexicographic order is page
// order. Past the padding width the number grows a digit; shorter names first
// keeps that order without parsing.
fn output_order(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}
