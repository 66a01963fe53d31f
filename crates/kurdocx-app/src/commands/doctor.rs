// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `kurdocx doctor`: report which external tools this machine can run and
// what that means for conversions.

use std::path::Path;

use anyhow::Result;
use kurdocx_document::Capabilities;
use kurdocx_document::capabilities::DirectBackend;

use super::convert::load_config;

pub fn run(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let caps = Capabilities::probe(&config);

    println!("Kurdocx doctor");
    println!();
    let tools = [
        ("tesseract", &config.tools.tesseract, caps.tesseract, "OCR engine"),
        ("pdftoppm", &config.tools.pdftoppm, caps.pdftoppm, "page renderer"),
        ("ocrmypdf", &config.tools.ocrmypdf, caps.ocrmypdf, "searchable-PDF pre-pass"),
        ("pdf2docx", &config.tools.pdf2docx, caps.pdf2docx, "layout-preserving direct converter"),
    ];
    for (name, command, found, role) in tools {
        let status = if found { "found" } else { "missing" };
        println!("  {name:<10} {status:<8} {role} (`{command}`)");
    }
    println!();
    println!("Direct conversion: {}", caps.direct_backend());

    let missing = caps.missing_for_ocr();
    if missing.is_empty() {
        println!("OCR pipeline: ready");
    } else {
        println!("OCR pipeline: unavailable, install {}", missing.join(" and "));
    }
    if caps.direct_backend() == DirectBackend::TextLayer {
        println!("Tip: install pdf2docx to keep page layout for PDFs with a text layer.");
    }
    Ok(())
}
