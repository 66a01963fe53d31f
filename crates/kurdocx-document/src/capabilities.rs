// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Capability probe: which external collaborators this machine can run.
//
// Probed once per process and threaded through mode selection, so the
// pipeline never re-checks the PATH mid-run.

use std::fmt;

use kurdocx_core::config::ConversionConfig;
use tracing::{info, instrument};

use crate::process::command_available;

// Version flags each tool accepts. Poppler only knows `-v`, and pdf2docx
// has no version flag, so it is started with `--help`.
const TESSERACT_ARGS: &[&str] = &["--version"];
const PDFTOPPM_ARGS: &[&str] = &["-v"];
const OCRMYPDF_ARGS: &[&str] = &["--version"];
const PDF2DOCX_ARGS: &[&str] = &["--help"];

/// Which direct converter a conversion would use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectBackend {
    /// External `pdf2docx`, layout preserving.
    Pdf2Docx,
    /// Built-in text-layer copy.
    TextLayer,
    /// Turned off by configuration.
    Disabled,
}

impl fmt::Display for DirectBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pdf2Docx => "pdf2docx",
            Self::TextLayer => "built-in text layer",
            Self::Disabled => "disabled",
        })
    }
}

/// Availability of every external program the pipeline can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub tesseract: bool,
    pub pdftoppm: bool,
    pub ocrmypdf: bool,
    pub pdf2docx: bool,
    /// Direct conversion permitted by configuration.
    pub direct_allowed: bool,
}

impl Capabilities {
    /// Check that each configured executable can be started.
    #[instrument(skip(config))]
    pub fn probe(config: &ConversionConfig) -> Self {
        let tools = &config.tools;
        let capabilities = Self {
            tesseract: command_available(&tools.tesseract, TESSERACT_ARGS),
            pdftoppm: command_available(&tools.pdftoppm, PDFTOPPM_ARGS),
            ocrmypdf: command_available(&tools.ocrmypdf, OCRMYPDF_ARGS),
            pdf2docx: config.allow_direct && command_available(&tools.pdf2docx, PDF2DOCX_ARGS),
            direct_allowed: config.allow_direct,
        };
        info!(
            tesseract = capabilities.tesseract,
            pdftoppm = capabilities.pdftoppm,
            ocrmypdf = capabilities.ocrmypdf,
            direct = %capabilities.direct_backend(),
            "Capabilities probed"
        );
        capabilities
    }

    /// pdf2docx when installed, otherwise the built-in converter.
    pub fn direct_backend(&self) -> DirectBackend {
        match (self.direct_allowed, self.pdf2docx) {
            (false, _) => DirectBackend::Disabled,
            (true, true) => DirectBackend::Pdf2Docx,
            (true, false) => DirectBackend::TextLayer,
        }
    }

    pub fn direct_available(&self) -> bool {
        self.direct_backend() != DirectBackend::Disabled
    }

    /// Programs the fallback OCR pipeline needs but cannot find.
    pub fn missing_for_ocr(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !self.pdftoppm {
            missing.push("pdftoppm");
        }
        if !self.tesseract {
            missing.push("tesseract");
        }
        missing
    }
}
