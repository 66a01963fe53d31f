// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Conversion pipeline: one PDF in, one .docx out.
//
// The configuration is frozen when the converter is built. Collaborator
// availability is decided once, by which collaborators are present, and the
// mode is chosen once per document. Scratch files live in a temporary
// directory removed on every exit path.

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Utc;
use kurdocx_core::config::ConversionConfig;
use kurdocx_core::error::{ConvertError, Result};
use kurdocx_core::types::{ConversionMode, ConversionReport, RasterSource, TableStats};
use tracing::{debug, info, instrument, warn};

use crate::capabilities::{Capabilities, DirectBackend};
use crate::convert::{ModeSignals, select_mode};
use crate::docx::{DirectConverter, DocumentAssembler, Pdf2DocxCli, TextLayerConverter};
use crate::image::{EnhanceFactors, PagePreprocessor};
use crate::pdf::reader::{PdfReader, TEXT_PROBE_PAGES};
use crate::process::RunOutcome;
use crate::scan::{
    OcrEngine, OcrMyPdf, OcrParams, PageRasterizer, Pdftoppm, SearchablePdfTool, Tesseract,
    recognize_page,
};

/// Suffix appended to the input stem for the default output name.
pub const OUTPUT_SUFFIX: &str = "_converted.docx";

/// `<stem>_converted.docx` next to `input`.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".into());
    input.with_file_name(format!("{stem}{OUTPUT_SUFFIX}"))
}

/// The external pieces a conversion calls out to.
///
/// `None` for an optional collaborator means it is unavailable on this
/// machine or disabled by configuration.
pub struct Collaborators {
    pub rasterizer: Box<dyn PageRasterizer>,
    pub ocr: Box<dyn OcrEngine>,
    pub searchable: Option<Box<dyn SearchablePdfTool>>,
    pub direct: Option<Box<dyn DirectConverter>>,
}

impl Collaborators {
    /// Production collaborators for the probed machine.
    pub fn from_config(config: &ConversionConfig, capabilities: &Capabilities) -> Self {
        let tools = &config.tools;
        let timeout = config.tool_timeout();

        let direct: Option<Box<dyn DirectConverter>> = match capabilities.direct_backend() {
            DirectBackend::Pdf2Docx => Some(Box::new(Pdf2DocxCli::new(&tools.pdf2docx, timeout))),
            DirectBackend::TextLayer => {
                Some(Box::new(TextLayerConverter::new(config.languages.direction())))
            }
            DirectBackend::Disabled => None,
        };
        let searchable: Option<Box<dyn SearchablePdfTool>> = if capabilities.ocrmypdf {
            Some(Box::new(OcrMyPdf::new(&tools.ocrmypdf, timeout)))
        } else {
            None
        };

        Self {
            rasterizer: Box::new(Pdftoppm::new(&tools.pdftoppm)),
            ocr: Box::new(Tesseract::new(&tools.tesseract)),
            searchable,
            direct,
        }
    }
}

/// Runs conversions with one frozen configuration.
pub struct Converter {
    config: ConversionConfig,
    collaborators: Collaborators,
}

impl Converter {
    /// Validate `config`, probe the machine, and wire up production
    /// collaborators.
    pub fn from_config(config: ConversionConfig) -> Result<Self> {
        config.validate()?;
        let capabilities = Capabilities::probe(&config);
        let collaborators = Collaborators::from_config(&config, &capabilities);
        Ok(Self {
            config,
            collaborators,
        })
    }

    /// Use explicit collaborators instead of probing.
    pub fn with_collaborators(
        config: ConversionConfig,
        collaborators: Collaborators,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            collaborators,
        })
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    /// Convert `input` to a .docx at `output`.
    ///
    /// Any error aborts the run; the output file only appears once the whole
    /// document has been written.
    #[instrument(skip(self), fields(input = %input.display(), output = %output.display()))]
    pub fn convert(&self, input: &Path, output: &Path) -> Result<ConversionReport> {
        let started_at = Utc::now();
        let clock = Instant::now();
        let page_limit = self.config.page_limit();
        let mut notices = Vec::new();

        let reader = PdfReader::open(input)?;
        let sample = page_limit.map_or(TEXT_PROBE_PAGES, |limit| limit.min(TEXT_PROBE_PAGES));
        let probe = reader.probe_text_layer(sample);
        drop(reader);

        let work_dir = tempfile::Builder::new().prefix("kurdocx-").tempdir()?;
        let searchable_path = work_dir.path().join("searchable.pdf");

        if self.collaborators.direct.is_none() {
            notices.push(
                "Direct conversion is unavailable; text will be recovered with OCR.".to_string(),
            );
        }

        let mut signals = ModeSignals {
            text_layer: probe.has_text_layer(),
            direct_available: self.collaborators.direct.is_some(),
            tool_enabled: self.config.prefer_ocr_tool,
            tool_available: self.collaborators.searchable.is_some(),
            tool_exit: None,
        };

        let mut tool_log = None;
        if let (true, Some(tool)) = (
            signals.wants_tool(),
            self.collaborators.searchable.as_deref(),
        ) {
            let (exit, log) = self.run_searchable_tool(tool, input, &searchable_path, &mut notices);
            signals.tool_exit = exit;
            tool_log = log;
        }

        let decision = select_mode(&signals);
        match decision.mode {
            ConversionMode::FallbackOcr => {
                warn!(mode = %decision.mode, reason = decision.reason, "Using fallback OCR")
            }
            _ => info!(mode = %decision.mode, reason = decision.reason, "Conversion mode selected"),
        }

        let outcome = match (decision.mode, decision.raster_source) {
            (ConversionMode::Direct, _) => self.convert_direct(input, output, page_limit)?,
            (ConversionMode::OcrToolThenDirect, _) => {
                self.convert_direct(&searchable_path, output, page_limit)?
            }
            (ConversionMode::FallbackOcr, source) => {
                let source_pdf = match source {
                    Some(RasterSource::ToolOutput) => searchable_path.as_path(),
                    _ => input,
                };
                self.convert_with_ocr(source_pdf, output, work_dir.path(), page_limit)?
            }
        };

        let report = ConversionReport {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            mode: decision.mode,
            raster_source: decision.raster_source,
            pages: outcome.pages,
            paragraphs: outcome.paragraphs,
            page_breaks: outcome.page_breaks,
            table: outcome.table,
            text_fallback_pages: outcome.text_fallback_pages,
            notices,
            tool_log,
            started_at,
            elapsed_ms: clock.elapsed().as_millis() as u64,
        };
        info!(
            mode = %report.mode,
            pages = report.pages,
            elapsed_ms = report.elapsed_ms,
            "Conversion finished"
        );
        Ok(report)
    }

    /// Run the searchable-PDF tool once. Returns its exit code (`None` when it
    /// timed out or could not start) and its log when it did not succeed.
    fn run_searchable_tool(
        &self,
        tool: &dyn SearchablePdfTool,
        input: &Path,
        output: &Path,
        notices: &mut Vec<String>,
    ) -> (Option<i32>, Option<String>) {
        match tool.make_searchable(input, output, self.config.languages) {
            Ok(run) if run.succeeded() => (Some(0), None),
            Ok(run) => {
                let exit = run.exit_code();
                match run.outcome {
                    RunOutcome::TimedOut(after) => notices.push(format!(
                        "The searchable-PDF tool timed out after {}s; using the built-in OCR pipeline.",
                        after.as_secs()
                    )),
                    RunOutcome::Exited(code) => notices.push(format!(
                        "The searchable-PDF tool failed (exit status {}); using the built-in OCR pipeline.",
                        code.map_or_else(|| "signal".to_string(), |c| c.to_string())
                    )),
                }
                warn!(exit = ?exit, "Searchable-PDF tool did not succeed");
                (exit, Some(run.log))
            }
            Err(err) => {
                warn!(%err, "Searchable-PDF tool could not run");
                notices.push(
                    "The searchable-PDF tool could not run; using the built-in OCR pipeline."
                        .to_string(),
                );
                (None, Some(err.to_string()))
            }
        }
    }

    fn convert_direct(
        &self,
        pdf: &Path,
        output: &Path,
        page_limit: Option<u32>,
    ) -> Result<PathOutcome> {
        let direct = self.collaborators.direct.as_deref().ok_or_else(|| {
            ConvertError::DirectConversion("no direct converter is available".into())
        })?;
        info!(converter = direct.name(), "Converting directly");
        let summary = direct.convert(pdf, output, page_limit)?;
        Ok(PathOutcome {
            pages: summary.pages,
            paragraphs: summary.paragraphs,
            page_breaks: summary.page_breaks,
            ..PathOutcome::default()
        })
    }

    /// Rasterize, preprocess, recognize and assemble one page at a time.
    fn convert_with_ocr(
        &self,
        pdf: &Path,
        output: &Path,
        work_dir: &Path,
        page_limit: Option<u32>,
    ) -> Result<PathOutcome> {
        let page_numbers = PdfReader::open(pdf)?.page_numbers(page_limit);
        let params = OcrParams::from_config(&self.config);
        let factors = EnhanceFactors {
            contrast: self.config.contrast,
            sharpness: self.config.sharpness,
        };
        info!(
            pages = page_numbers.len(),
            dpi = self.config.dpi,
            ocr = %params.config_string(),
            "Running OCR pipeline"
        );

        let mut assembler = DocumentAssembler::new(self.config.languages.direction());
        let mut table = TableStats::default();
        let mut text_fallback_pages = 0;

        for page_number in &page_numbers {
            let render = self.collaborators.rasterizer.render_page(
                pdf,
                *page_number,
                self.config.dpi,
                work_dir,
            )?;
            let prepared = PagePreprocessor::prepare_for_ocr(render.image, factors);
            let image_path = work_dir.join(format!("page_{:04}_ocr.png", page_number));
            prepared.save(&image_path)?;
            drop(prepared);

            let page = recognize_page(self.collaborators.ocr.as_ref(), &image_path, &params)?;
            std::fs::remove_file(&image_path)?;

            debug!(
                page_index = render.page_index,
                paragraphs = page.paragraphs.len(),
                dropped_rows = page.stats.dropped(),
                "Page recognized"
            );
            table.merge(&page.stats);
            if page.used_text_fallback {
                text_fallback_pages += 1;
            }
            assembler.push_page(page.paragraphs);
        }

        assembler.save(output)?;
        Ok(PathOutcome {
            pages: page_numbers.len(),
            paragraphs: Some(assembler.paragraph_count()),
            page_breaks: Some(assembler.page_break_count()),
            table,
            text_fallback_pages,
        })
    }
}

/// What the chosen path produced.
#[derive(Debug, Default)]
struct PathOutcome {
    pages: usize,
    paragraphs: Option<usize>,
    page_breaks: Option<usize>,
    table: TableStats,
    text_fallback_pages: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use std::time::Duration;

    use image::{DynamicImage, GrayImage, Luma};
    use kurdocx_core::types::LanguageSet;

    use crate::docx::DirectSummary;
    use crate::pdf::fixtures;
    use crate::process::CapturedRun;
    use crate::scan::PageRender;

    const HEADER: &str =
        "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext";

    #[derive(Default)]
    struct Calls {
        rendered: Cell<usize>,
        recognized: Cell<usize>,
        tool: Cell<usize>,
        direct_inputs: RefCell<Vec<PathBuf>>,
        rendered_from: RefCell<Vec<PathBuf>>,
    }

    struct FakeRasterizer(Rc<Calls>);

    impl PageRasterizer for FakeRasterizer {
        fn render_page(&self, pdf: &Path, page: u32, _dpi: u32, _work: &Path) -> Result<PageRender> {
            self.0.rendered.set(self.0.rendered.get() + 1);
            self.0.rendered_from.borrow_mut().push(pdf.to_path_buf());
            Ok(PageRender {
                page_index: page as usize - 1,
                image: DynamicImage::ImageLuma8(GrayImage::from_pixel(16, 16, Luma([200]))),
            })
        }
    }

    struct FakeOcr(Rc<Calls>);

    impl OcrEngine for FakeOcr {
        fn word_table(&self, _image: &Path, _params: &OcrParams) -> Result<String> {
            let n = self.0.recognized.get() + 1;
            self.0.recognized.set(n);
            Ok(format!("{HEADER}\n5\t1\t0\t0\t0\t1\t10\t10\t40\t20\t91\tpage{n}"))
        }

        fn plain_text(&self, _image: &Path, _params: &OcrParams) -> Result<String> {
            Ok(String::new())
        }
    }

    #[derive(Clone, Copy)]
    enum ToolBehaviour {
        Exit(i32),
        TimeOut,
        FailToStart,
    }

    struct FakeTool {
        calls: Rc<Calls>,
        behaviour: ToolBehaviour,
    }

    impl SearchablePdfTool for FakeTool {
        fn make_searchable(
            &self,
            input: &Path,
            output: &Path,
            _languages: LanguageSet,
        ) -> Result<CapturedRun> {
            self.calls.tool.set(self.calls.tool.get() + 1);
            match self.behaviour {
                ToolBehaviour::Exit(exit) => {
                    if exit == 0 {
                        std::fs::copy(input, output)?;
                    }
                    Ok(CapturedRun {
                        outcome: RunOutcome::Exited(Some(exit)),
                        log: format!("fake tool exit {exit}"),
                    })
                }
                ToolBehaviour::TimeOut => Ok(CapturedRun {
                    outcome: RunOutcome::TimedOut(Duration::from_secs(7)),
                    log: "deskewing page 1".into(),
                }),
                ToolBehaviour::FailToStart => Err(ConvertError::ExternalTool {
                    tool: "ocrmypdf".into(),
                    detail: "failed to start: permission denied".into(),
                }),
            }
        }
    }

    struct FakeDirect(Rc<Calls>);

    impl DirectConverter for FakeDirect {
        fn name(&self) -> &str {
            "fake"
        }

        fn convert(&self, pdf: &Path, output: &Path, _limit: Option<u32>) -> Result<DirectSummary> {
            self.0.direct_inputs.borrow_mut().push(pdf.to_path_buf());
            std::fs::write(output, b"docx")?;
            Ok(DirectSummary {
                pages: 1,
                paragraphs: None,
                page_breaks: None,
            })
        }
    }

    fn collaborators(calls: &Rc<Calls>, tool_exit: Option<i32>, direct: bool) -> Collaborators {
        with_tool(calls, tool_exit.map(ToolBehaviour::Exit), direct)
    }

    fn with_tool(calls: &Rc<Calls>, tool: Option<ToolBehaviour>, direct: bool) -> Collaborators {
        Collaborators {
            rasterizer: Box::new(FakeRasterizer(calls.clone())),
            ocr: Box::new(FakeOcr(calls.clone())),
            searchable: tool.map(|behaviour| {
                Box::new(FakeTool {
                    calls: calls.clone(),
                    behaviour,
                }) as Box<dyn SearchablePdfTool>
            }),
            direct: direct.then(|| Box::new(FakeDirect(calls.clone())) as Box<dyn DirectConverter>),
        }
    }

    fn scanned_pdf(dir: &Path, pages: usize) -> PathBuf {
        let path = dir.join("scan.pdf");
        std::fs::write(&path, fixtures::pdf_with_pages(&vec![None; pages])).unwrap();
        path
    }

    #[test]
    fn default_output_name_appends_suffix() {
        assert_eq!(
            default_output_path(Path::new("/books/diwan.pdf")),
            PathBuf::from("/books/diwan_converted.docx")
        );
        assert_eq!(
            default_output_path(Path::new("scan")),
            PathBuf::from("scan_converted.docx")
        );
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let calls = Rc::new(Calls::default());
        let config = ConversionConfig {
            dpi: 5,
            ..ConversionConfig::default()
        };
        assert!(matches!(
            Converter::with_collaborators(config, collaborators(&calls, None, true)),
            Err(ConvertError::InvalidConfig(_))
        ));
    }

    #[test]
    fn successful_tool_feeds_the_direct_converter() {
        let dir = tempfile::tempdir().unwrap();
        let input = scanned_pdf(dir.path(), 1);
        let output = dir.path().join("out.docx");
        let calls = Rc::new(Calls::default());

        let converter = Converter::with_collaborators(
            ConversionConfig::default(),
            collaborators(&calls, Some(0), true),
        )
        .unwrap();
        let report = converter.convert(&input, &output).unwrap();

        assert_eq!(report.mode, ConversionMode::OcrToolThenDirect);
        assert_eq!(calls.tool.get(), 1);
        assert_eq!(calls.recognized.get(), 0);
        let direct_inputs = calls.direct_inputs.borrow();
        assert_eq!(direct_inputs.len(), 1);
        assert_ne!(direct_inputs[0], input);
        assert!(report.tool_log.is_none());
    }

    #[test]
    fn successful_tool_without_direct_rasterizes_the_tool_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = scanned_pdf(dir.path(), 2);
        let output = dir.path().join("out.docx");
        let calls = Rc::new(Calls::default());

        let converter = Converter::with_collaborators(
            ConversionConfig::default(),
            collaborators(&calls, Some(0), false),
        )
        .unwrap();
        let report = converter.convert(&input, &output).unwrap();

        assert_eq!(report.mode, ConversionMode::FallbackOcr);
        assert_eq!(report.raster_source, Some(RasterSource::ToolOutput));
        assert!(calls.rendered_from.borrow().iter().all(|p| p != &input));
        assert!(report.notices.iter().any(|n| n.contains("Direct conversion is unavailable")));
        assert_eq!(report.paragraphs, Some(2));
        assert!(output.exists());
    }

    #[test]
    fn page_limit_caps_rasterization() {
        let dir = tempfile::tempdir().unwrap();
        let input = scanned_pdf(dir.path(), 3);
        let output = dir.path().join("out.docx");
        let calls = Rc::new(Calls::default());
        let config = ConversionConfig {
            prefer_ocr_tool: false,
            max_pages: 2,
            ..ConversionConfig::default()
        };

        let converter =
            Converter::with_collaborators(config, collaborators(&calls, None, true)).unwrap();
        let report = converter.convert(&input, &output).unwrap();

        assert_eq!(report.pages, 2);
        assert_eq!(calls.rendered.get(), 2);
        assert_eq!(report.page_breaks, Some(1));
        assert_eq!(report.table.accepted, 2);
    }

    #[test]
    fn timed_out_tool_falls_back_once_with_its_log() {
        let dir = tempfile::tempdir().unwrap();
        let input = scanned_pdf(dir.path(), 1);
        let output = dir.path().join("out.docx");
        let calls = Rc::new(Calls::default());

        let converter = Converter::with_collaborators(
            ConversionConfig::default(),
            with_tool(&calls, Some(ToolBehaviour::TimeOut), true),
        )
        .unwrap();
        let report = converter.convert(&input, &output).unwrap();

        assert_eq!(calls.tool.get(), 1);
        assert_eq!(report.mode, ConversionMode::FallbackOcr);
        assert_eq!(report.raster_source, Some(RasterSource::Original));
        assert_eq!(calls.rendered_from.borrow().as_slice(), &[input.clone()]);
        assert!(calls.direct_inputs.borrow().is_empty());
        assert_eq!(report.tool_log.as_deref(), Some("deskewing page 1"));
        assert!(report.notices.iter().any(|n| n.contains("timed out after 7s")));
        assert!(output.exists());
    }

    #[test]
    fn tool_that_cannot_start_falls_back_with_the_error_as_log() {
        let dir = tempfile::tempdir().unwrap();
        let input = scanned_pdf(dir.path(), 1);
        let output = dir.path().join("out.docx");
        let calls = Rc::new(Calls::default());

        let converter = Converter::with_collaborators(
            ConversionConfig::default(),
            with_tool(&calls, Some(ToolBehaviour::FailToStart), true),
        )
        .unwrap();
        let report = converter.convert(&input, &output).unwrap();

        assert_eq!(calls.tool.get(), 1);
        assert_eq!(report.mode, ConversionMode::FallbackOcr);
        assert_eq!(report.raster_source, Some(RasterSource::Original));
        let log = report.tool_log.unwrap();
        assert!(log.contains("ocrmypdf"));
        assert!(log.contains("permission denied"));
        assert!(report.notices.iter().any(|n| n.contains("could not run")));
        assert_eq!(calls.recognized.get(), 1);
    }

    #[test]
    fn disabled_tool_is_never_invoked() {
        let dir = tempfile::tempdir().unwrap();
        let input = scanned_pdf(dir.path(), 1);
        let calls = Rc::new(Calls::default());
        let config = ConversionConfig {
            prefer_ocr_tool: false,
            ..ConversionConfig::default()
        };

        let converter =
            Converter::with_collaborators(config, collaborators(&calls, Some(0), true)).unwrap();
        converter
            .convert(&input, &dir.path().join("out.docx"))
            .unwrap();
        assert_eq!(calls.tool.get(), 0);
    }

    #[test]
    fn unreadable_input_aborts_without_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("broken.pdf");
        std::fs::write(&input, b"not a pdf at all").unwrap();
        let output = dir.path().join("out.docx");
        let calls = Rc::new(Calls::default());

        let converter = Converter::with_collaborators(
            ConversionConfig::default(),
            collaborators(&calls, None, true),
        )
        .unwrap();
        assert!(matches!(converter.convert(&input, &output), Err(ConvertError::Pdf(_))));
        assert!(!output.exists());
    }
}
