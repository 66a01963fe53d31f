// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// OCR engine: drives the Tesseract CLI for per-word TSV tables and plain text.
//
// Tesseract is used instead of an embedded engine because it ships trained
// data for Sorani and Kurmanji. Output is written to files in a scratch
// directory so diagnostic chatter on stderr never mixes with the data.

use std::path::Path;
use std::process::Command;

use kurdocx_core::config::ConversionConfig;
use kurdocx_core::error::{ConvertError, Result};
use kurdocx_core::types::{EngineMode, LanguageSet, PageSegMode};
use tracing::{debug, instrument};

use crate::process::run_captured;

/// Keeps Tesseract from collapsing the spacing between Arabic-script words.
const ARABIC_SCRIPT_TUNING: &str = "preserve_interword_spaces=1";

/// Per-run OCR settings, derived once from the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OcrParams {
    pub languages: LanguageSet,
    pub page_seg_mode: PageSegMode,
    pub engine_mode: EngineMode,
}

impl OcrParams {
    pub fn from_config(config: &ConversionConfig) -> Self {
        Self {
            languages: config.languages,
            page_seg_mode: config.page_seg_mode,
            engine_mode: config.engine_mode,
        }
    }

    /// Engine options in the order Tesseract documents them.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "-l".to_string(),
            self.languages.codes().to_string(),
            "--psm".to_string(),
            self.page_seg_mode.value().to_string(),
            "--oem".to_string(),
            self.engine_mode.value().to_string(),
        ];
        if self.languages.needs_arabic_script_tuning() {
            args.push("-c".to_string());
            args.push(ARABIC_SCRIPT_TUNING.to_string());
        }
        args
    }

    /// Human-readable summary for logs and reports.
    pub fn config_string(&self) -> String {
        let mut summary = format!(
            "--psm {} --oem {}",
            self.page_seg_mode.value(),
            self.engine_mode.value()
        );
        if self.languages.needs_arabic_script_tuning() {
            summary.push_str(" -c ");
            summary.push_str(ARABIC_SCRIPT_TUNING);
        }
        summary
    }
}

impl Default for OcrParams {
    fn default() -> Self {
        Self::from_config(&ConversionConfig::default())
    }
}

/// Text recognition over a prepared page image.
pub trait OcrEngine {
    /// Per-word table in Tesseract's TSV layout, header row included.
    fn word_table(&self, image: &Path, params: &OcrParams) -> Result<String>;

    /// Unstructured text for the whole page.
    fn plain_text(&self, image: &Path, params: &OcrParams) -> Result<String>;
}

/// [`OcrEngine`] backed by the `tesseract` command.
#[derive(Debug, Clone)]
pub struct Tesseract {
    command: String,
}

impl Tesseract {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// Run once, writing `<base>.<extension>` next to a fresh base name, and
    /// return that file's contents.
    fn run(
        &self,
        image: &Path,
        params: &OcrParams,
        output_config: Option<&str>,
        extension: &str,
    ) -> Result<String> {
        let scratch = tempfile::tempdir()?;
        let base = scratch.path().join("ocr");

        let mut command = Command::new(&self.command);
        command.arg(image).arg(&base).args(params.args());
        if let Some(config) = output_config {
            command.arg(config);
        }

        run_captured("tesseract", &mut command, None)
            .and_then(|run| run.into_success("tesseract"))
            .map_err(|err| ConvertError::Ocr(err.to_string()))?;

        let output = base.with_extension(extension);
        std::fs::read_to_string(&output).map_err(|err| {
            ConvertError::Ocr(format!(
                "tesseract produced no readable {}: {}",
                output.display(),
                err
            ))
        })
    }
}

impl OcrEngine for Tesseract {
    #[instrument(skip(self), fields(image = %image.display()))]
    fn word_table(&self, image: &Path, params: &OcrParams) -> Result<String> {
        let table = self.run(image, params, Some("tsv"), "tsv")?;
        debug!(rows = table.lines().count(), "Word table read");
        Ok(table)
    }

    #[instrument(skip(self), fields(image = %image.display()))]
    fn plain_text(&self, image: &Path, params: &OcrParams) -> Result<String> {
        let text = self.run(image, params, None, "txt")?;
        debug!(chars = text.chars().count(), "Plain text read");
        Ok(text)
    }
}
