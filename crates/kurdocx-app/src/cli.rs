// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line surface. Every conversion setting is a flag that overrides the
// loaded (or default) configuration for one run.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use kurdocx_core::config::ConversionConfig;
use kurdocx_core::types::{EngineMode, LanguageSet, PageSegMode};

#[derive(Parser, Debug)]
#[command(name = "kurdocx")]
#[command(
    version,
    about = "Convert PDFs (including scans) to Word documents with Kurdish-aware OCR",
    long_about = None
)]
pub struct Cli {
    /// Debug-level logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert one PDF to .docx
    Convert(ConvertArgs),

    /// Show which external tools are installed
    Doctor {
        /// Config file naming the tool executables
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the default configuration, or write it to a file
    Config {
        /// Write the defaults here instead of printing them
        #[arg(long)]
        write: Option<PathBuf>,
    },

    /// List OCR language combinations and engine settings
    Languages,
}

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Input PDF file
    pub input: PathBuf,

    /// Output .docx (default: <input stem>_converted.docx next to the input)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// JSON configuration file; flags override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// OCR languages, e.g. ckb+ara+eng (see `kurdocx languages`)
    #[arg(short, long)]
    pub languages: Option<LanguageSet>,

    /// Tesseract page segmentation mode (3, 4, 6, 11, 12)
    #[arg(long)]
    pub psm: Option<PageSegMode>,

    /// Tesseract engine mode (0, 1, 3)
    #[arg(long)]
    pub oem: Option<EngineMode>,

    /// Skip the OCRmyPDF pre-pass
    #[arg(long)]
    pub no_ocr_tool: bool,

    /// Never use direct conversion, always OCR
    #[arg(long)]
    pub no_direct: bool,

    /// Rasterization resolution (100-600)
    #[arg(long)]
    pub dpi: Option<u32>,

    /// Contrast multiplier before OCR (0.5-3.0)
    #[arg(long)]
    pub contrast: Option<f32>,

    /// Sharpness multiplier before OCR (0.5-3.0)
    #[arg(long)]
    pub sharpness: Option<f32>,

    /// Convert at most this many pages (0 = all)
    #[arg(long)]
    pub max_pages: Option<u32>,

    /// Seconds before an external tool is stopped (0 = no limit)
    #[arg(long)]
    pub tool_timeout: Option<u64>,

    /// Write the conversion report as JSON
    #[arg(long)]
    pub report: Option<PathBuf>,
}

impl ConvertArgs {
    /// Apply every flag that was given on top of `config`.
    pub fn apply(&self, config: &mut ConversionConfig) {
        if let Some(languages) = self.languages {
            config.languages = languages;
        }
        if let Some(psm) = self.psm {
            config.page_seg_mode = psm;
        }
        if let Some(oem) = self.oem {
            config.engine_mode = oem;
        }
        if self.no_ocr_tool {
            config.prefer_ocr_tool = false;
        }
        if self.no_direct {
            config.allow_direct = false;
        }
        if let Some(dpi) = self.dpi {
            config.dpi = dpi;
        }
        if let Some(contrast) = self.contrast {
            config.contrast = contrast;
        }
        if let Some(sharpness) = self.sharpness {
            config.sharpness = sharpness;
        }
        if let Some(max_pages) = self.max_pages {
            config.max_pages = max_pages;
        }
        if let Some(timeout) = self.tool_timeout {
            config.tool_timeout_secs = timeout;
        }
    }
}
