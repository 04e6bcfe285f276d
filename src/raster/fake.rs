use super::{RasterError, RasterJob, Rasterizer};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy)]
pub enum FakePage {
    /// A valid PNG; the width encodes which source page it came from.
    Png { width: u32, height: u32 },
    Garbage,
}

/// In-process rasterizer that writes files the way ImageMagick names them.
#[derive(Debug)]
pub struct FakeRasterizer {
    pub available: bool,
    pub pages: Vec<FakePage>,
    pub failure: Option<String>,
    pub count_output: String,
    pub count_failure: Option<String>,
    pub jobs: RefCell<Vec<RasterJob>>,
    pub probes: RefCell<usize>,
}

impl FakeRasterizer {
    /// Document whose page `n` renders as an `n`x`1` image.
    pub fn with_pages(count: u32) -> Self {
        let pages = (1..=count)
            .map(|n| FakePage::Png {
                width: n,
                height: 1,
            })
            .collect();
        Self {
            available: true,
            pages,
            failure: None,
            count_output: format!("{count}\n"),
            count_failure: None,
            jobs: RefCell::new(Vec::new()),
            probes: RefCell::new(0),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::with_pages(1)
        }
    }

    pub fn last_template(&self) -> Option<PathBuf> {
        self.jobs
            .borrow()
            .last()
            .map(|job| job.output_template.clone())
    }
}

impl Rasterizer for FakeRasterizer {
    fn probe(&self) -> Result<(), RasterError> {
        *self.probes.borrow_mut() += 1;
        if self.available {
            Ok(())
        } else {
            Err(RasterError::Missing {
                program: "convert".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
            })
        }
    }

    fn rasterize(&self, job: &RasterJob) -> Result<(), RasterError> {
        self.jobs.borrow_mut().push(job.clone());
        if let Some(output) = &self.failure {
            return Err(RasterError::Failed {
                program: "convert".to_string(),
                status: "exit status: 1".to_string(),
                output: output.clone(),
            });
        }

        let selected: Vec<FakePage> = match job.page_index {
            Some(index) => self.pages.get(index as usize).copied().into_iter().collect(),
            None => self.pages.clone(),
        };

        let template = job.output_template.to_string_lossy().into_owned();
        for (scene, page) in selected.into_iter().enumerate() {
            let path = template.replace("%03d", &format!("{scene:03}"));
            write_page(Path::new(&path), page);
        }
        Ok(())
    }

    fn count_pages(&self, _document: &Path) -> Result<String, RasterError> {
        if let Some(output) = &self.count_failure {
            return Err(RasterError::Failed {
                program: "identify".to_string(),
                status: "exit status: 1".to_string(),
                output: output.clone(),
            });
        }
        Ok(self.count_output.clone())
    }
}

fn write_page(path: &Path, page: FakePage) {
    match page {
        FakePage::Png { width, height } => image::RgbImage::new(width, height)
            .save(path)
            .expect("write fake png"),
        FakePage::Garbage => fs::write(path, b"not a png").expect("write fake page"),
    }
}
