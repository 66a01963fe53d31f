// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page rasterizer: renders one PDF page at a time to a raster image via
// poppler's `pdftoppm`.

use std::path::{Path, PathBuf};
use std::process::Command;

use image::DynamicImage;
use kurdocx_core::error::{ConvertError, Result};
use tracing::{debug, instrument};

use crate::process::run_captured;

/// One rendered source page. Dropped as soon as its text is extracted.
#[derive(Debug, Clone)]
pub struct PageRender {
    /// 0-based position in the conversion.
    pub page_index: usize,
    pub image: DynamicImage,
}

/// Renders PDF pages to images.
pub trait PageRasterizer {
    /// Render `page_number` (1-indexed) of `pdf_path` at `dpi`. Scratch files
    /// go in `work_dir`.
    fn render_page(
        &self,
        pdf_path: &Path,
        page_number: u32,
        dpi: u32,
        work_dir: &Path,
    ) -> Result<PageRender>;
}

/// [`PageRasterizer`] backed by the `pdftoppm` command.
#[derive(Debug, Clone)]
pub struct Pdftoppm {
    command: String,
}

impl Pdftoppm {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// Output prefix for a page; `-singlefile` appends `.png`.
    fn output_prefix(work_dir: &Path, page_number: u32) -> PathBuf {
        work_dir.join(format!("page_{:04}", page_number))
    }
}

impl PageRasterizer for Pdftoppm {
    #[instrument(skip(self, work_dir), fields(pdf = %pdf_path.display()))]
    fn render_page(
        &self,
        pdf_path: &Path,
        page_number: u32,
        dpi: u32,
        work_dir: &Path,
    ) -> Result<PageRender> {
        let prefix = Self::output_prefix(work_dir, page_number);

        let mut command = Command::new(&self.command);
        command
            .arg("-png")
            .arg("-r")
            .arg(dpi.to_string())
            .arg("-f")
            .arg(page_number.to_string())
            .arg("-l")
            .arg(page_number.to_string())
            .arg("-singlefile")
            .arg(pdf_path)
            .arg(&prefix);

        run_captured("pdftoppm", &mut command, None)
            .and_then(|run| run.into_success("pdftoppm"))
            .map_err(|err| ConvertError::Rasterize(format!("page {page_number}: {err}")))?;

        let png_path = prefix.with_extension("png");
        if !png_path.exists() {
            return Err(ConvertError::Rasterize(format!(
                "expected rendered image not found: {}",
                png_path.display()
            )));
        }

        let image = image::open(&png_path).map_err(|err| {
            ConvertError::Image(format!("failed to decode {}: {}", png_path.display(), err))
        })?;
        std::fs::remove_file(&png_path)?;

        debug!(
            page_number,
            width = image.width(),
            height = image.height(),
            "Page rendered"
        );
        Ok(PageRender {
            page_index: page_number.saturating_sub(1) as usize,
            image,
        })
    }
}
