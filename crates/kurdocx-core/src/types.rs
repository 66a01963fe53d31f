// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Kurdocx converter.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tesseract code for Sorani Kurdish (Arabic script).
pub const SORANI: &str = "ckb";
/// Tesseract code for Kurmanji Kurdish (Latin script).
pub const KURMANJI: &str = "kmr";
/// Tesseract code for Arabic.
pub const ARABIC: &str = "ara";
/// Tesseract code for English.
pub const ENGLISH: &str = "eng";

// -- Language selection -------------------------------------------------------

/// The fixed set of OCR language combinations offered to the user.
///
/// Serialised as the `+`-joined code string Tesseract and OCRmyPDF accept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LanguageSet {
    #[serde(rename = "ckb")]
    Sorani,
    #[serde(rename = "kmr")]
    Kurmanji,
    #[serde(rename = "ara")]
    Arabic,
    #[serde(rename = "eng")]
    English,
    #[serde(rename = "ckb+ara")]
    SoraniArabic,
    #[serde(rename = "ckb+eng")]
    SoraniEnglish,
    #[serde(rename = "kmr+eng")]
    KurmanjiEnglish,
    #[default]
    #[serde(rename = "ckb+ara+eng")]
    SoraniArabicEnglish,
    #[serde(rename = "ckb+kmr+eng")]
    SoraniKurmanjiEnglish,
    #[serde(rename = "kmr+ckb+ara+eng")]
    AllKurdish,
}

impl LanguageSet {
    /// Every selectable combination, in menu order.
    pub const ALL: [LanguageSet; 10] = [
        Self::Sorani,
        Self::Kurmanji,
        Self::Arabic,
        Self::English,
        Self::SoraniArabic,
        Self::SoraniEnglish,
        Self::KurmanjiEnglish,
        Self::SoraniArabicEnglish,
        Self::SoraniKurmanjiEnglish,
        Self::AllKurdish,
    ];

    /// The `+`-joined language code string (e.g. `ckb+ara+eng`).
    pub fn codes(&self) -> &'static str {
        match self {
            Self::Sorani => "ckb",
            Self::Kurmanji => "kmr",
            Self::Arabic => "ara",
            Self::English => "eng",
            Self::SoraniArabic => "ckb+ara",
            Self::SoraniEnglish => "ckb+eng",
            Self::KurmanjiEnglish => "kmr+eng",
            Self::SoraniArabicEnglish => "ckb+ara+eng",
            Self::SoraniKurmanjiEnglish => "ckb+kmr+eng",
            Self::AllKurdish => "kmr+ckb+ara+eng",
        }
    }

    /// Human label shown in `--help` and the `languages` listing.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Sorani => "Sorani (Arabic script)",
            Self::Kurmanji => "Kurmanji (Latin script)",
            Self::Arabic => "Arabic",
            Self::English => "English",
            Self::SoraniArabic => "Sorani + Arabic",
            Self::SoraniEnglish => "Sorani + English",
            Self::KurmanjiEnglish => "Kurmanji + English",
            Self::SoraniArabicEnglish => "Sorani + Arabic + English (mixed documents)",
            Self::SoraniKurmanjiEnglish => "Sorani + Kurmanji + English",
            Self::AllKurdish => "Kurmanji + Sorani + Arabic + English",
        }
    }

    /// Whether an individual code (e.g. `ckb`) is part of this selection.
    pub fn contains(&self, code: &str) -> bool {
        self.codes().split('+').any(|c| c == code)
    }

    /// Paragraphs are emitted right-to-left when Sorani is selected.
    pub fn is_right_to_left(&self) -> bool {
        self.contains(SORANI)
    }

    /// Sorani and Arabic together get the Arabic-script tuning flag.
    pub fn needs_arabic_script_tuning(&self) -> bool {
        self.contains(SORANI) && self.contains(ARABIC)
    }

    /// Paragraph direction implied by this selection.
    pub fn direction(&self) -> TextDirection {
        if self.is_right_to_left() {
            TextDirection::RightToLeft
        } else {
            TextDirection::LeftToRight
        }
    }
}

impl fmt::Display for LanguageSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.codes())
    }
}

impl FromStr for LanguageSet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|set| set.codes() == wanted)
            .ok_or_else(|| {
                let options: Vec<&str> = Self::ALL.iter().map(|set| set.codes()).collect();
                format!(
                    "unknown language combination `{wanted}` (expected one of: {})",
                    options.join(", ")
                )
            })
    }
}

// -- OCR engine parameters ----------------------------------------------------

/// Tesseract page segmentation modes exposed to the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PageSegMode {
    /// 3: fully automatic page segmentation.
    #[default]
    Auto,
    /// 4: a single column of text of variable sizes.
    SingleColumn,
    /// 6: a single uniform block of text.
    SingleBlock,
    /// 11: sparse text, as much as possible in no particular order.
    SparseText,
    /// 12: sparse text with orientation and script detection.
    SparseTextOsd,
}

impl PageSegMode {
    pub const ALL: [PageSegMode; 5] = [
        Self::Auto,
        Self::SingleColumn,
        Self::SingleBlock,
        Self::SparseText,
        Self::SparseTextOsd,
    ];

    /// Numeric value passed as `--psm`.
    pub fn value(&self) -> u8 {
        match self {
            Self::Auto => 3,
            Self::SingleColumn => 4,
            Self::SingleBlock => 6,
            Self::SparseText => 11,
            Self::SparseTextOsd => 12,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Auto => "Fully automatic",
            Self::SingleColumn => "Single column of variable sizes",
            Self::SingleBlock => "Single uniform block of text",
            Self::SparseText => "Sparse text",
            Self::SparseTextOsd => "Sparse text with orientation detection",
        }
    }
}

impl TryFrom<u8> for PageSegMode {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.value() == value)
            .ok_or_else(|| format!("unsupported page segmentation mode {value} (expected 3, 4, 6, 11 or 12)"))
    }
}

impl From<PageSegMode> for u8 {
    fn from(mode: PageSegMode) -> Self {
        mode.value()
    }
}

impl FromStr for PageSegMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u8 = s
            .trim()
            .parse()
            .map_err(|_| format!("page segmentation mode must be a number, got `{s}`"))?;
        Self::try_from(value)
    }
}

impl fmt::Display for PageSegMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.value(), self.label())
    }
}

/// Tesseract OCR engine modes exposed to the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum EngineMode {
    /// 0: legacy engine only.
    Legacy,
    /// 1: neural net LSTM engine only.
    #[default]
    Lstm,
    /// 3: whatever the installed engine considers the default.
    Default,
}

impl EngineMode {
    pub const ALL: [EngineMode; 3] = [Self::Legacy, Self::Lstm, Self::Default];

    /// Numeric value passed as `--oem`.
    pub fn value(&self) -> u8 {
        match self {
            Self::Legacy => 0,
            Self::Lstm => 1,
            Self::Default => 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Legacy => "Legacy engine",
            Self::Lstm => "LSTM neural engine",
            Self::Default => "Engine default",
        }
    }
}

impl TryFrom<u8> for EngineMode {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.value() == value)
            .ok_or_else(|| format!("unsupported engine mode {value} (expected 0, 1 or 3)"))
    }
}

impl From<EngineMode> for u8 {
    fn from(mode: EngineMode) -> Self {
        mode.value()
    }
}

impl FromStr for EngineMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u8 = s
            .trim()
            .parse()
            .map_err(|_| format!("engine mode must be a number, got `{s}`"))?;
        Self::try_from(value)
    }
}

impl fmt::Display for EngineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.value(), self.label())
    }
}

// -- Conversion modes ---------------------------------------------------------

/// How a single input document is converted. Chosen once per document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConversionMode {
    /// Structural conversion of an existing text layer.
    Direct,
    /// OCRmyPDF adds a text layer, then structural conversion runs on it.
    OcrToolThenDirect,
    /// Rasterize, recognise and reconstruct lines ourselves.
    FallbackOcr,
}

impl fmt::Display for ConversionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Direct => "direct",
            Self::OcrToolThenDirect => "ocr-tool-then-direct",
            Self::FallbackOcr => "fallback-ocr",
        })
    }
}

/// Which PDF the fallback OCR pipeline rasterizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RasterSource {
    /// The user's input file.
    Original,
    /// The searchable PDF produced by the external OCR tool.
    ToolOutput,
}

/// Paragraph directionality in the output document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextDirection {
    LeftToRight,
    RightToLeft,
}

// -- OCR word model -----------------------------------------------------------

/// One word recognised by the OCR engine, with its position and grouping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizedWord {
    pub text: String,
    pub confidence: f32,
    pub left: i32,
    pub top: i32,
    pub block_id: u32,
    /// Line number as reported by the engine, unique within its block.
    pub line_id: u32,
}

/// Per-page accounting of the OCR word table.
///
/// Every data row lands in exactly one counter, so
/// `accepted + short_rows + empty_text + negative_confidence + malformed == data_rows`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableStats {
    pub data_rows: usize,
    pub accepted: usize,
    pub short_rows: usize,
    pub empty_text: usize,
    pub negative_confidence: usize,
    pub malformed: usize,
}

impl TableStats {
    /// Rows that were seen but did not become words.
    pub fn dropped(&self) -> usize {
        self.data_rows - self.accepted
    }

    /// Accumulate another page's counters into this one.
    pub fn merge(&mut self, other: &TableStats) {
        self.data_rows += other.data_rows;
        self.accepted += other.accepted;
        self.short_rows += other.short_rows;
        self.empty_text += other.empty_text;
        self.negative_confidence += other.negative_confidence;
        self.malformed += other.malformed;
    }
}

// -- Reporting ----------------------------------------------------------------

/// Summary of one finished conversion, printed by the CLI and optionally
/// written as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub mode: ConversionMode,
    /// Set only when the fallback OCR pipeline ran.
    pub raster_source: Option<RasterSource>,
    pub pages: usize,
    /// Paragraphs written. `None` when an external converter built the file.
    pub paragraphs: Option<usize>,
    pub page_breaks: Option<usize>,
    pub table: TableStats,
    /// Unstructured-text fallbacks taken (pages without a usable word table).
    pub text_fallback_pages: usize,
    /// User-visible notices (missing collaborators, fallbacks taken).
    pub notices: Vec<String>,
    /// Captured output of the searchable-PDF tool when it failed.
    pub tool_log: Option<String>,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
}
