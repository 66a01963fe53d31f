// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// kurdocx-document: PDF to Word conversion for the Kurdocx converter.
//
// Provides PDF inspection (page count, text-layer probe), page rasterization,
// OCR image preprocessing, Tesseract word-table recognition and line
// reconstruction, Word document assembly, the direct and searchable-PDF
// collaborators, and the mode selector and pipeline that tie them together.

pub mod capabilities;
pub mod convert;
pub mod docx;
pub mod image;
pub mod pdf;
pub mod pipeline;
pub mod process;
pub mod scan;

// Re-export the primary structs so callers can use `kurdocx_document::Converter` etc.
pub use crate::capabilities::Capabilities;
pub use crate::convert::{ModeDecision, ModeSignals, select_mode};
pub use crate::docx::assembler::DocumentAssembler;
pub use crate::image::preprocess::PagePreprocessor;
pub use crate::pdf::reader::PdfReader;
pub use crate::pipeline::{Collaborators, Converter};
pub use crate::scan::reconstruct::{parse_word_table, reconstruct_lines};
