// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Conversion configuration. Built once per run, validated, then passed by
// reference through the whole pipeline.

use std::ops::RangeInclusive;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, Result};
use crate::types::{EngineMode, LanguageSet, PageSegMode};

/// Accepted rasterization resolutions.
pub const DPI_RANGE: RangeInclusive<u32> = 100..=600;
/// Accepted contrast multipliers.
pub const CONTRAST_RANGE: RangeInclusive<f32> = 0.5..=3.0;
/// Accepted sharpness multipliers.
pub const SHARPNESS_RANGE: RangeInclusive<f32> = 0.5..=3.0;

/// Executable names (or absolute paths) of the external collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolCommands {
    pub tesseract: String,
    pub pdftoppm: String,
    pub ocrmypdf: String,
    pub pdf2docx: String,
}

impl Default for ToolCommands {
    fn default() -> Self {
        Self {
            tesseract: "tesseract".into(),
            pdftoppm: "pdftoppm".into(),
            ocrmypdf: "ocrmypdf".into(),
            pdf2docx: "pdf2docx".into(),
        }
    }
}

/// Every user-adjustable setting for one conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// OCR language combination.
    pub languages: LanguageSet,
    /// Tesseract `--psm`.
    pub page_seg_mode: PageSegMode,
    /// Tesseract `--oem`.
    pub engine_mode: EngineMode,
    /// Try OCRmyPDF before the built-in OCR pipeline.
    pub prefer_ocr_tool: bool,
    /// Allow the direct-conversion collaborator to be used at all.
    pub allow_direct: bool,
    /// Rasterization resolution.
    pub dpi: u32,
    /// Contrast multiplier applied before OCR (1.0 = unchanged).
    pub contrast: f32,
    /// Sharpness multiplier applied before OCR (1.0 = unchanged).
    pub sharpness: f32,
    /// Maximum pages to convert; 0 means the whole document.
    pub max_pages: u32,
    /// Upper bound on the OCRmyPDF run in seconds; 0 disables the bound.
    pub tool_timeout_secs: u64,
    pub tools: ToolCommands,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            languages: LanguageSet::default(),
            page_seg_mode: PageSegMode::default(),
            engine_mode: EngineMode::default(),
            prefer_ocr_tool: true,
            allow_direct: true,
            dpi: 300,
            contrast: 1.5,
            sharpness: 1.5,
            max_pages: 0,
            tool_timeout_secs: 900,
            tools: ToolCommands::default(),
        }
    }
}

impl ConversionConfig {
    /// Load a config from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data)?;
        Ok(config)
    }

    /// Write this config as pretty-printed JSON.
    pub fn persist(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Reject values outside the ranges the pipeline was tuned for.
    pub fn validate(&self) -> Result<()> {
        if !DPI_RANGE.contains(&self.dpi) {
            return Err(ConvertError::InvalidConfig(format!(
                "dpi {} outside {}..={}",
                self.dpi,
                DPI_RANGE.start(),
                DPI_RANGE.end()
            )));
        }
        if !CONTRAST_RANGE.contains(&self.contrast) {
            return Err(ConvertError::InvalidConfig(format!(
                "contrast {} outside {}..={}",
                self.contrast,
                CONTRAST_RANGE.start(),
                CONTRAST_RANGE.end()
            )));
        }
        if !SHARPNESS_RANGE.contains(&self.sharpness) {
            return Err(ConvertError::InvalidConfig(format!(
                "sharpness {} outside {}..={}",
                self.sharpness,
                SHARPNESS_RANGE.start(),
                SHARPNESS_RANGE.end()
            )));
        }
        let tools = [
            ("tesseract", &self.tools.tesseract),
            ("pdftoppm", &self.tools.pdftoppm),
            ("ocrmypdf", &self.tools.ocrmypdf),
            ("pdf2docx", &self.tools.pdf2docx),
        ];
        for (name, command) in tools {
            if command.trim().is_empty() {
                return Err(ConvertError::InvalidConfig(format!(
                    "command for {name} must not be empty"
                )));
            }
        }
        Ok(())
    }

    /// Page cap as an `Option`, `None` meaning unlimited.
    pub fn page_limit(&self) -> Option<u32> {
        (self.max_pages > 0).then_some(self.max_pages)
    }

    /// Deadline for the searchable-PDF tool, `None` meaning unbounded.
    pub fn tool_timeout(&self) -> Option<Duration> {
        (self.tool_timeout_secs > 0).then(|| Duration::from_secs(self.tool_timeout_secs))
    }
}
