// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the final "conversion failed" report.
//
// Every technical error is mapped to a plain-language message with a concrete
// suggestion. Severity drives how the CLI presents it.

use crate::error::ConvertError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// User must do something (install a tool, fix a setting, pick a file).
    ActionRequired,
    /// The input itself cannot be converted as-is.
    Permanent,
    /// Worth another attempt, possibly with different settings.
    Transient,
}

/// A human-readable error with plain message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Severity level.
    pub severity: Severity,
}

/// Convert a `ConvertError` into a `HumanError`.
pub fn humanize_error(err: &ConvertError) -> HumanError {
    match err {
        ConvertError::Pdf(_) => HumanError {
            message: "This PDF file could not be read.".into(),
            suggestion: "The file may be damaged or password protected. Open it in a PDF viewer to check, then try again.".into(),
            severity: Severity::Permanent,
        },

        ConvertError::Image(_) => HumanError {
            message: "A page image could not be processed.".into(),
            suggestion: "Try a lower DPI, or set contrast and sharpness back to 1.0.".into(),
            severity: Severity::Transient,
        },

        ConvertError::Rasterize(detail) => {
            if detail.contains("not found") || detail.contains("failed to start") {
                HumanError {
                    message: "The page renderer is not installed.".into(),
                    suggestion: "Install poppler-utils (it provides `pdftoppm`) and try again.".into(),
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "The PDF pages could not be rendered for text recognition.".into(),
                    suggestion: format!("Try a lower DPI or a page limit. (Detail: {detail})"),
                    severity: Severity::Transient,
                }
            }
        }

        ConvertError::Ocr(detail) => humanize_ocr_error(detail),

        ConvertError::ExternalTool { tool, .. } => HumanError {
            message: format!("`{tool}` did not finish successfully."),
            suggestion: "See the tool log above for details. Disabling the tool falls back to the built-in pipeline.".into(),
            severity: Severity::Transient,
        },

        ConvertError::ToolTimeout { tool, after } => HumanError {
            message: format!("`{tool}` took longer than {}s.", after.as_secs()),
            suggestion: "Raise the tool timeout in the configuration, or convert fewer pages at a time.".into(),
            severity: Severity::Transient,
        },

        ConvertError::DirectConversion(_) => HumanError {
            message: "The PDF text could not be converted directly.".into(),
            suggestion: "Run again with direct conversion disabled (`--no-direct`) to force text recognition.".into(),
            severity: Severity::Transient,
        },

        ConvertError::Docx(_) => HumanError {
            message: "The Word document could not be written.".into(),
            suggestion: "Check that the output folder exists and is writable, then try again.".into(),
            severity: Severity::ActionRequired,
        },

        ConvertError::InvalidConfig(detail) => HumanError {
            message: "One of the settings is not valid.".into(),
            suggestion: format!("Fix the setting and run again. ({detail})"),
            severity: Severity::ActionRequired,
        },

        ConvertError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "The file couldn't be found.".into(),
                    suggestion: "Check the path and try again.".into(),
                    severity: Severity::ActionRequired,
                }
            } else if io_err.kind() == std::io::ErrorKind::PermissionDenied {
                HumanError {
                    message: "Permission denied while reading or writing a file.".into(),
                    suggestion: "Check the file permissions, or choose a different output location.".into(),
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "There was a problem reading or writing a file.".into(),
                    suggestion: "Try again. If this keeps happening, the disk may be full.".into(),
                    severity: Severity::Transient,
                }
            }
        }

        ConvertError::Serialization(_) => HumanError {
            message: "The configuration or report file is not valid JSON.".into(),
            suggestion: "Regenerate it with `kurdocx config --write <path>` and edit from there.".into(),
            severity: Severity::ActionRequired,
        },
    }
}

/// Tesseract failures are mostly missing language data.
fn humanize_ocr_error(detail: &str) -> HumanError {
    let lower = detail.to_ascii_lowercase();

    if lower.contains("failed loading language") || lower.contains("couldn't load any languages") {
        HumanError {
            message: "The OCR language data is missing.".into(),
            suggestion: "Install the Tesseract traineddata for the selected languages (for example `ckb.traineddata` and `kmr.traineddata`).".into(),
            severity: Severity::ActionRequired,
        }
    } else if lower.contains("failed to start") || lower.contains("no such file") {
        HumanError {
            message: "Tesseract is not installed.".into(),
            suggestion: "Install tesseract-ocr and try again.".into(),
            severity: Severity::ActionRequired,
        }
    } else {
        HumanError {
            message: "Text recognition failed on a page.".into(),
            suggestion: format!("Try another page segmentation mode or a higher DPI. (Detail: {detail})"),
            severity: Severity::Transient,
        }
    }
}
