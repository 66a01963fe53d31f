// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document assembler: collects per-page paragraphs into an output document
// model and serialises it to `.docx` with `docx-rs`.

use std::path::Path;

use docx_rs::{AlignmentType, BreakType, Docx, Paragraph, Run, RunFonts};
use kurdocx_core::error::{ConvertError, Result};
use kurdocx_core::types::TextDirection;
use tracing::{debug, info, instrument};

/// Arabic-script-capable font used for right-to-left documents.
pub const RTL_FONT: &str = "Noto Naskh Arabic";
/// Latin font used for left-to-right documents.
pub const LTR_FONT: &str = "Calibri";
/// Base font size in points.
pub const BASE_FONT_SIZE_PT: usize = 12;

/// One paragraph of output text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputParagraph {
    pub text: String,
    pub direction: TextDirection,
}

/// An element of the output document, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Paragraph(OutputParagraph),
    PageBreak,
}

/// Builds the output document page by page.
///
/// Every paragraph takes the assembler's direction; a page break is placed
/// before the content of every page after the first, including empty pages.
#[derive(Debug, Clone)]
pub struct DocumentAssembler {
    direction: TextDirection,
    blocks: Vec<Block>,
    pages: usize,
}

impl DocumentAssembler {
    pub fn new(direction: TextDirection) -> Self {
        Self {
            direction,
            blocks: Vec::new(),
            pages: 0,
        }
    }

    /// Append one page's paragraphs.
    pub fn push_page<I, S>(&mut self, paragraphs: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.pages > 0 {
            self.blocks.push(Block::PageBreak);
        }
        let direction = self.direction;
        let before = self.blocks.len();
        self.blocks.extend(paragraphs.into_iter().map(|text| {
            Block::Paragraph(OutputParagraph {
                text: text.into(),
                direction,
            })
        }));
        debug!(
            page_index = self.pages,
            paragraphs = self.blocks.len() - before,
            "Page appended"
        );
        self.pages += 1;
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn page_count(&self) -> usize {
        self.pages
    }

    pub fn paragraph_count(&self) -> usize {
        self.blocks
            .iter()
            .filter(|b| matches!(b, Block::Paragraph(_)))
            .count()
    }

    pub fn page_break_count(&self) -> usize {
        self.blocks
            .iter()
            .filter(|b| matches!(b, Block::PageBreak))
            .count()
    }

    /// Build the `docx-rs` document.
    pub fn to_docx(&self) -> Docx {
        self.blocks
            .iter()
            .fold(Docx::new(), |docx, block| match block {
                Block::Paragraph(paragraph) => docx.add_paragraph(render_paragraph(paragraph)),
                Block::PageBreak => docx.add_paragraph(
                    Paragraph::new().add_run(Run::new().add_break(BreakType::Page)),
                ),
            })
    }

    /// Write the document to `path`.
    ///
    /// The file is packed into a temporary sibling and renamed into place, so
    /// a failed write never leaves a partial document behind.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub fn save(&self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut staged = tempfile::Builder::new()
            .prefix(".kurdocx-")
            .suffix(".docx")
            .tempfile_in(dir)?;

        self.to_docx()
            .build()
            .pack(staged.as_file_mut())
            .map_err(|err| ConvertError::Docx(format!("failed to pack document: {err}")))?;
        staged
            .persist(path)
            .map_err(|err| ConvertError::Io(err.error))?;

        info!(
            paragraphs = self.paragraph_count(),
            page_breaks = self.page_break_count(),
            "Document written"
        );
        Ok(())
    }
}

fn fonts_for(direction: TextDirection) -> RunFonts {
    let family = match direction {
        TextDirection::RightToLeft => RTL_FONT,
        TextDirection::LeftToRight => LTR_FONT,
    };
    RunFonts::new()
        .ascii(family)
        .hi_ansi(family)
        .cs(family)
        .east_asia(family)
}

// docx-rs sizes are in half-points.
fn render_paragraph(paragraph: &OutputParagraph) -> Paragraph {
    let mut run = Run::new()
        .fonts(fonts_for(paragraph.direction))
        .size(BASE_FONT_SIZE_PT * 2);
    for (index, line) in paragraph.text.split('\n').enumerate() {
        if index > 0 {
            run = run.add_break(BreakType::TextWrapping);
        }
        run = run.add_text(line.trim_end_matches('\r'));
    }

    let mut rendered = Paragraph::new().add_run(run);
    match paragraph.direction {
        TextDirection::RightToLeft => {
            rendered.property = rendered.property.bidi(true);
            rendered.align(AlignmentType::Right)
        }
        TextDirection::LeftToRight => rendered,
    }
}
