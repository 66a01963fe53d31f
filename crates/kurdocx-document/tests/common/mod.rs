// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Shared helpers for the end-to-end scenarios: in-memory PDFs and fake
// collaborators that record how they were called.

use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use image::{DynamicImage, GrayImage, Luma};
use kurdocx_core::error::Result;
use kurdocx_core::types::LanguageSet;
use kurdocx_document::Collaborators;
use kurdocx_document::docx::{DirectConverter, TextLayerConverter};
use kurdocx_document::process::{CapturedRun, RunOutcome};
use kurdocx_document::scan::{
    OcrEngine, OcrParams, PageRasterizer, PageRender, SearchablePdfTool,
};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

pub const TSV_HEADER: &str =
    "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext";

/// Write a PDF with one page per entry to `dir/name`. `Some` pages carry a
/// text layer; `None` pages are blank, like an image-only scan.
pub fn write_pdf(dir: &Path, name: &str, pages: &[Option<&str>]) -> PathBuf {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids = Vec::new();
    for text in pages {
        let operations = match text {
            Some(text) => vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 14.into()]),
                Operation::new("Td", vec![100.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
            None => vec![],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            Content { operations }.encode().unwrap(),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let path = dir.join(name);
    doc.save(&path).unwrap();
    path
}

/// Call counts shared between a test and its fakes.
#[derive(Default)]
pub struct Counters {
    pub renders: Cell<usize>,
    pub word_tables: Cell<usize>,
    pub plain_texts: Cell<usize>,
    pub tool_runs: Cell<usize>,
}

impl Counters {
    pub fn ocr_calls(&self) -> usize {
        self.word_tables.get() + self.plain_texts.get()
    }
}

fn bump(cell: &Cell<usize>) {
    cell.set(cell.get() + 1);
}

pub struct FakeRasterizer(pub Rc<Counters>);

impl PageRasterizer for FakeRasterizer {
    fn render_page(&self, _pdf: &Path, page: u32, _dpi: u32, _work: &Path) -> Result<PageRender> {
        bump(&self.0.renders);
        Ok(PageRender {
            page_index: page as usize - 1,
            image: DynamicImage::ImageLuma8(GrayImage::from_pixel(32, 32, Luma([230]))),
        })
    }
}

/// Returns the same word table for every page.
pub struct FakeOcr {
    pub counters: Rc<Counters>,
    pub table: String,
}

impl OcrEngine for FakeOcr {
    fn word_table(&self, _image: &Path, _params: &OcrParams) -> Result<String> {
        bump(&self.counters.word_tables);
        Ok(self.table.clone())
    }

    fn plain_text(&self, _image: &Path, _params: &OcrParams) -> Result<String> {
        bump(&self.counters.plain_texts);
        Ok(String::new())
    }
}

/// Exits with a fixed code and log; copies the input on success.
pub struct FakeSearchableTool {
    pub counters: Rc<Counters>,
    pub exit: i32,
    pub log: String,
}

impl SearchablePdfTool for FakeSearchableTool {
    fn make_searchable(
        &self,
        input: &Path,
        output: &Path,
        _languages: LanguageSet,
    ) -> Result<CapturedRun> {
        bump(&self.counters.tool_runs);
        if self.exit == 0 {
            std::fs::copy(input, output)?;
        }
        Ok(CapturedRun {
            outcome: RunOutcome::Exited(Some(self.exit)),
            log: self.log.clone(),
        })
    }
}

/// Fake rasterizer and OCR, the real built-in direct converter, and an
/// optional searchable-PDF tool.
pub fn collaborators(
    counters: &Rc<Counters>,
    table: &str,
    tool: Option<FakeSearchableTool>,
    direct: bool,
) -> Collaborators {
    Collaborators {
        rasterizer: Box::new(FakeRasterizer(counters.clone())),
        ocr: Box::new(FakeOcr {
            counters: counters.clone(),
            table: table.to_string(),
        }),
        searchable: tool.map(|t| Box::new(t) as Box<dyn SearchablePdfTool>),
        direct: direct.then(|| {
            Box::new(TextLayerConverter::new(LanguageSet::Kurmanji.direction()))
                as Box<dyn DirectConverter>
        }),
    }
}
