// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Word document output: the assembler for OCR results and the direct
// converters for PDFs with a text layer.

pub mod assembler;
pub mod direct;

pub use assembler::{Block, DocumentAssembler, OutputParagraph};
pub use direct::{DirectConverter, DirectSummary, Pdf2DocxCli, TextLayerConverter};
