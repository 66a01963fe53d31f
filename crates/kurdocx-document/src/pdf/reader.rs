// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader: open existing PDF documents with `lopdf`, count pages, probe
// for an embedded text layer, and extract per-page text for direct conversion.

use std::path::Path;

use kurdocx_core::error::ConvertError;
use lopdf::Document;
use tracing::{info, instrument, warn};

/// Pages examined when deciding whether a document has a text layer.
pub const TEXT_PROBE_PAGES: u32 = 3;

/// Result of sampling the first pages for extractable text.
///
/// Pages whose content streams `lopdf` cannot decode are counted separately
/// instead of being silently treated as empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextLayerProbe {
    pub sampled_pages: usize,
    pub pages_with_text: usize,
    pub unreadable_pages: usize,
}

impl TextLayerProbe {
    /// At least one sampled page carries extractable text.
    pub fn has_text_layer(&self) -> bool {
        self.pages_with_text > 0
    }
}

/// A loaded PDF and the few queries the converter runs against it.
pub struct PdfReader {
    document: Document,
}

impl PdfReader {
    // -- Construction ---------------------------------------------------------

    /// Load `path`. Unreadable or malformed files are a `Pdf` error.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ConvertError> {
        let path = path.as_ref();
        let document = Document::load(path)
            .map_err(|err| ConvertError::Pdf(format!("cannot read {}: {err}", path.display())))?;
        info!(pages = document.get_pages().len(), "PDF opened");
        Ok(Self { document })
    }

    // -- Inspection -----------------------------------------------------------

    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// 1-indexed page numbers in document order, capped at `limit` pages.
    pub fn page_numbers(&self, limit: Option<u32>) -> Vec<u32> {
        let mut numbers: Vec<u32> = self.document.get_pages().keys().copied().collect();
        numbers.sort_unstable();
        if let Some(limit) = limit {
            numbers.truncate(limit as usize);
        }
        numbers
    }

    // -- Text layer -----------------------------------------------------------

    /// Text of a single page (1-indexed).
    pub fn page_text(&self, page_number: u32) -> Result<String, ConvertError> {
        self.document.extract_text(&[page_number]).map_err(|err| {
            ConvertError::Pdf(format!(
                "failed to extract text from page {}: {}",
                page_number, err
            ))
        })
    }

    /// Sample the first pages (at most `sample`) for extractable text.
    #[instrument(skip(self))]
    pub fn probe_text_layer(&self, sample: u32) -> TextLayerProbe {
        let mut probe = TextLayerProbe::default();

        for page_number in self.page_numbers(Some(sample)) {
            probe.sampled_pages += 1;
            match self.page_text(page_number) {
                Ok(text) if non_whitespace_chars(&text) > 0 => probe.pages_with_text += 1,
                Ok(_) => {}
                Err(err) => {
                    warn!(page_number, %err, "Page text unreadable during probe");
                    probe.unreadable_pages += 1;
                }
            }
        }

        info!(
            sampled = probe.sampled_pages,
            with_text = probe.pages_with_text,
            unreadable = probe.unreadable_pages,
            "Text layer probe complete"
        );
        probe
    }

    /// Per-page text for every page up to `limit`, in document order.
    #[instrument(skip(self))]
    pub fn extract_pages(&self, limit: Option<u32>) -> Result<Vec<String>, ConvertError> {
        self.page_numbers(limit)
            .into_iter()
            .map(|page_number| self.page_text(page_number))
            .collect()
    }
}

fn non_whitespace_chars(text: &str) -> usize {
    text.chars().filter(|c| !c.is_whitespace()).count()
}
