// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanned-page pipeline: rasterization, OCR, line reconstruction, and the
// searchable-PDF pre-pass.

pub mod ocr;
pub mod raster;
pub mod reconstruct;
pub mod searchable;

pub use ocr::{OcrEngine, OcrParams, Tesseract};
pub use raster::{PageRasterizer, PageRender, Pdftoppm};
pub use reconstruct::{PageText, WordTable, recognize_page};
pub use searchable::{OcrMyPdf, SearchablePdfTool};
