// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Searchable-PDF tool: runs OCRmyPDF to add a text layer to scanned PDFs.

use std::ffi::OsString;
use std::path::Path;
use std::process::Command;
use std::time::Duration;

use kurdocx_core::error::Result;
use kurdocx_core::types::LanguageSet;
use tracing::{info, instrument, warn};

use crate::process::{CapturedRun, run_captured};

/// Produces a copy of a PDF with a recognised text layer.
pub trait SearchablePdfTool {
    /// Write the searchable copy of `input` to `output`.
    ///
    /// A non-zero exit or a timeout is reported through the returned run, not
    /// as an error, so the caller can fall back with the log in hand.
    fn make_searchable(
        &self,
        input: &Path,
        output: &Path,
        languages: LanguageSet,
    ) -> Result<CapturedRun>;
}

/// [`SearchablePdfTool`] backed by the `ocrmypdf` command.
#[derive(Debug, Clone)]
pub struct OcrMyPdf {
    command: String,
    timeout: Option<Duration>,
}

impl OcrMyPdf {
    pub fn new(command: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            command: command.into(),
            timeout,
        }
    }

    /// Arguments for one run, in the order OCRmyPDF documents them.
    fn args(input: &Path, output: &Path, languages: LanguageSet) -> Vec<OsString> {
        let mut args: Vec<OsString> = [
            "--skip-text",
            "-l",
            languages.codes(),
            "--rotate-pages",
            "--deskew",
            "--clean",
            "--optimize",
            "1",
        ]
        .into_iter()
        .map(OsString::from)
        .collect();
        args.push(input.into());
        args.push(output.into());
        args
    }
}

impl SearchablePdfTool for OcrMyPdf {
    #[instrument(skip(self), fields(input = %input.display()))]
    fn make_searchable(
        &self,
        input: &Path,
        output: &Path,
        languages: LanguageSet,
    ) -> Result<CapturedRun> {
        let mut command = Command::new(&self.command);
        command.args(Self::args(input, output, languages));

        let run = run_captured("ocrmypdf", &mut command, self.timeout)?;
        if run.succeeded() {
            info!("Searchable PDF written");
        } else {
            warn!(outcome = ?run.outcome, "OCRmyPDF did not succeed");
        }
        Ok(run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arguments_skip_existing_text_and_end_with_paths() {
        let args = OcrMyPdf::args(
            Path::new("in.pdf"),
            Path::new("out.pdf"),
            LanguageSet::SoraniArabicEnglish,
        );
        let args: Vec<String> = args
            .iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();
        assert_eq!(args[0], "--skip-text");
        assert_eq!(args[1..3], ["-l", "ckb+ara+eng"]);
        assert!(args.contains(&"--deskew".to_string()));
        assert_eq!(args[args.len() - 2..], ["in.pdf", "out.pdf"]);
    }

    #[cfg(unix)]
    #[test]
    fn failing_tool_is_reported_through_the_run() {
        // `false` ignores its arguments and exits 1.
        let tool = OcrMyPdf::new("false", None);
        let run = tool
            .make_searchable(Path::new("in.pdf"), Path::new("out.pdf"), LanguageSet::Sorani)
            .unwrap();
        assert!(!run.succeeded());
        assert_eq!(run.exit_code(), Some(1));
    }
}
