// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Kurdocx.

use std::time::Duration;

use thiserror::Error;

/// Top-level error type for all Kurdocx operations.
#[derive(Debug, Error)]
pub enum ConvertError {
    // -- Input errors --
    #[error("PDF operation failed: {0}")]
    Pdf(String),

    #[error("image processing failed: {0}")]
    Image(String),

    // -- Pipeline collaborators --
    #[error("page rasterization failed: {0}")]
    Rasterize(String),

    #[error("OCR failed: {0}")]
    Ocr(String),

    #[error("external tool `{tool}` failed: {detail}")]
    ExternalTool { tool: String, detail: String },

    #[error("external tool `{tool}` timed out after {}s", .after.as_secs())]
    ToolTimeout { tool: String, after: Duration },

    #[error("direct conversion failed: {0}")]
    DirectConversion(String),

    // -- Output --
    #[error("Word document assembly failed: {0}")]
    Docx(String),

    // -- Configuration --
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // -- Storage --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ConvertError>;
