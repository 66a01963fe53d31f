// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Direct conversion: PDF to .docx without OCR, for PDFs that already carry a
// text layer.
//
// Two back ends: the external `pdf2docx` converter, which keeps layout, and a
// built-in converter that reads the embedded text with lopdf and emits one
// paragraph per text line.

use std::path::Path;
use std::process::Command;
use std::time::Duration;

use kurdocx_core::error::{ConvertError, Result};
use kurdocx_core::types::TextDirection;
use tracing::{info, instrument};

use super::assembler::DocumentAssembler;
use crate::pdf::PdfReader;
use crate::process::run_captured;

/// What a direct conversion can say about the file it wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectSummary {
    pub pages: usize,
    /// `None` when the back end does not report structure.
    pub paragraphs: Option<usize>,
    pub page_breaks: Option<usize>,
}

/// Structural PDF to .docx conversion.
pub trait DirectConverter {
    /// Short name for logs and `doctor` output.
    fn name(&self) -> &str;

    /// Convert `pdf` into a .docx at `output`, stopping after `page_limit`
    /// pages when set.
    fn convert(&self, pdf: &Path, output: &Path, page_limit: Option<u32>) -> Result<DirectSummary>;
}

/// [`DirectConverter`] backed by the `pdf2docx` command-line tool.
#[derive(Debug, Clone)]
pub struct Pdf2DocxCli {
    command: String,
    timeout: Option<Duration>,
}

impl Pdf2DocxCli {
    pub fn new(command: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            command: command.into(),
            timeout,
        }
    }
}

impl DirectConverter for Pdf2DocxCli {
    fn name(&self) -> &str {
        "pdf2docx"
    }

    #[instrument(skip(self), fields(pdf = %pdf.display()))]
    fn convert(&self, pdf: &Path, output: &Path, page_limit: Option<u32>) -> Result<DirectSummary> {
        let dir = match output.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        // The tool writes straight to its target, so give it a staging file.
        let staged = tempfile::Builder::new()
            .prefix(".kurdocx-")
            .suffix(".docx")
            .tempfile_in(dir)?;

        let mut command = Command::new(&self.command);
        command.arg("convert").arg(pdf).arg(staged.path());
        if let Some(limit) = page_limit {
            command.arg(format!("--end={limit}"));
        }

        run_captured("pdf2docx", &mut command, self.timeout)
            .and_then(|run| run.into_success("pdf2docx"))
            .map_err(|err| ConvertError::DirectConversion(err.to_string()))?;

        let written = staged.as_file().metadata()?.len();
        if written == 0 {
            return Err(ConvertError::DirectConversion(
                "pdf2docx exited cleanly but wrote an empty document".into(),
            ));
        }
        staged
            .persist(output)
            .map_err(|err| ConvertError::Io(err.error))?;

        let pages = PdfReader::open(pdf)
            .map(|reader| reader.page_numbers(page_limit).len())
            .unwrap_or_default();
        info!(bytes = written, pages, "Direct conversion complete");
        Ok(DirectSummary {
            pages,
            paragraphs: None,
            page_breaks: None,
        })
    }
}

/// [`DirectConverter`] that copies the embedded text layer line by line.
#[derive(Debug, Clone, Copy)]
pub struct TextLayerConverter {
    direction: TextDirection,
}

impl TextLayerConverter {
    pub fn new(direction: TextDirection) -> Self {
        Self { direction }
    }

    /// Non-blank lines of one page, trimmed.
    fn page_lines(text: &str) -> Vec<String> {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl DirectConverter for TextLayerConverter {
    fn name(&self) -> &str {
        "text-layer"
    }

    #[instrument(skip(self), fields(pdf = %pdf.display()))]
    fn convert(&self, pdf: &Path, output: &Path, page_limit: Option<u32>) -> Result<DirectSummary> {
        let reader =
            PdfReader::open(pdf).map_err(|err| ConvertError::DirectConversion(err.to_string()))?;
        let pages = reader
            .extract_pages(page_limit)
            .map_err(|err| ConvertError::DirectConversion(err.to_string()))?;

        let mut assembler = DocumentAssembler::new(self.direction);
        for text in &pages {
            assembler.push_page(Self::page_lines(text));
        }
        assembler.save(output)?;

        info!(
            pages = pages.len(),
            paragraphs = assembler.paragraph_count(),
            "Text layer copied"
        );
        Ok(DirectSummary {
            pages: pages.len(),
            paragraphs: Some(assembler.paragraph_count()),
            page_breaks: Some(assembler.page_break_count()),
        })
    }
}
