// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Line reconstruction: turns the OCR engine's per-word table into ordered
// text lines.
//
// Words are grouped by (block, line), ordered left-to-right by horizontal
// position inside a line, and lines are ordered top-to-bottom by their
// highest word. When no word survives, the engine's unstructured text is used
// as a single paragraph instead.

use std::collections::BTreeMap;
use std::path::Path;

use kurdocx_core::error::Result;
use kurdocx_core::types::{RecognizedWord, TableStats};
use tracing::{debug, instrument};

use super::ocr::{OcrEngine, OcrParams};

/// Columns a data row must carry (the text is the twelfth).
pub const MIN_COLUMNS: usize = 12;

// Tesseract TSV column positions.
const COL_BLOCK: usize = 2;
const COL_LINE: usize = 4;
const COL_LEFT: usize = 6;
const COL_TOP: usize = 7;
const COL_CONF: usize = 10;
const COL_TEXT: usize = 11;

/// Why a data row did not become a word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Fewer than [`MIN_COLUMNS`] columns.
    ShortRow,
    /// Text column empty after trimming.
    EmptyText,
    /// A numeric column did not parse.
    Malformed,
    /// Confidence below zero; structural rows carry -1.
    NegativeConfidence,
}

/// The classification of one line of the word table.
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Header,
    Word(RecognizedWord),
    Skipped(SkipReason),
}

/// Accepted words plus per-outcome counters for one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WordTable {
    pub words: Vec<RecognizedWord>,
    pub stats: TableStats,
}

/// Classify a single TSV line.
pub fn parse_row(row: &str) -> RowOutcome {
    let columns: Vec<&str> = row.splitn(MIN_COLUMNS, '\t').collect();
    if columns.first().is_some_and(|first| first.trim() == "level") {
        return RowOutcome::Header;
    }
    if columns.len() < MIN_COLUMNS {
        return RowOutcome::Skipped(SkipReason::ShortRow);
    }

    let text = columns[COL_TEXT].trim();
    if text.is_empty() {
        return RowOutcome::Skipped(SkipReason::EmptyText);
    }

    let Some((confidence, block_id, line_id, left, top)) = numeric_fields(&columns)
    else {
        return RowOutcome::Skipped(SkipReason::Malformed);
    };
    if confidence.is_nan() {
        return RowOutcome::Skipped(SkipReason::Malformed);
    }
    if confidence < 0.0 {
        return RowOutcome::Skipped(SkipReason::NegativeConfidence);
    }

    RowOutcome::Word(RecognizedWord {
        text: text.to_string(),
        confidence,
        left,
        top,
        block_id,
        line_id,
    })
}

fn numeric_fields(columns: &[&str]) -> Option<(f32, u32, u32, i32, i32)> {
    Some((
        columns[COL_CONF].trim().parse().ok()?,
        columns[COL_BLOCK].trim().parse().ok()?,
        columns[COL_LINE].trim().parse().ok()?,
        columns[COL_LEFT].trim().parse().ok()?,
        columns[COL_TOP].trim().parse().ok()?,
    ))
}

/// Parse a whole word table, counting every row into [`TableStats`].
#[instrument(skip_all, fields(bytes = tsv.len()))]
pub fn parse_word_table(tsv: &str) -> WordTable {
    let mut table = WordTable::default();

    for row in tsv.lines() {
        let outcome = parse_row(row);
        if matches!(outcome, RowOutcome::Header) {
            continue;
        }
        table.stats.data_rows += 1;
        match outcome {
            RowOutcome::Word(word) => {
                table.stats.accepted += 1;
                table.words.push(word);
            }
            RowOutcome::Skipped(reason) => {
                let counter = match reason {
                    SkipReason::ShortRow => &mut table.stats.short_rows,
                    SkipReason::EmptyText => &mut table.stats.empty_text,
                    SkipReason::Malformed => &mut table.stats.malformed,
                    SkipReason::NegativeConfidence => &mut table.stats.negative_confidence,
                };
                *counter += 1;
            }
            RowOutcome::Header => {}
        }
    }

    debug!(
        rows = table.stats.data_rows,
        accepted = table.stats.accepted,
        dropped = table.stats.dropped(),
        "Word table parsed"
    );
    table
}

/// Words that share a block and line, in reading order.
#[derive(Debug, Clone, PartialEq)]
pub struct LineGroup {
    pub block_id: u32,
    pub line_id: u32,
    pub words: Vec<RecognizedWord>,
}

impl LineGroup {
    /// Smallest `top` of any word in the group.
    pub fn min_top(&self) -> i32 {
        self.words.iter().map(|w| w.top).min().unwrap_or(i32::MAX)
    }

    /// Words joined by single spaces.
    pub fn text(&self) -> String {
        self.words
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn is_usable(word: &RecognizedWord) -> bool {
    !word.text.trim().is_empty() && word.confidence >= 0.0
}

/// Group usable words by (block, line) and order groups top-to-bottom.
///
/// Within a group words are sorted by `left`; equal positions keep their
/// original order. Groups with the same `min_top` are ordered by key, so the
/// result depends only on the input.
pub fn group_lines(words: impl IntoIterator<Item = RecognizedWord>) -> Vec<LineGroup> {
    let mut buckets: BTreeMap<(u32, u32), Vec<RecognizedWord>> = BTreeMap::new();
    for word in words.into_iter().filter(is_usable) {
        buckets
            .entry((word.block_id, word.line_id))
            .or_default()
            .push(word);
    }

    let mut groups: Vec<LineGroup> = buckets
        .into_iter()
        .map(|((block_id, line_id), mut words)| {
            words.sort_by_key(|w| w.left);
            LineGroup {
                block_id,
                line_id,
                words,
            }
        })
        .collect();

    groups.sort_by_key(|g| (g.min_top(), g.block_id, g.line_id));
    groups
}

/// Reading-order text lines, one per (block, line) group.
pub fn reconstruct_lines(words: impl IntoIterator<Item = RecognizedWord>) -> Vec<String> {
    group_lines(words).iter().map(LineGroup::text).collect()
}

/// Paragraphs recovered from one page image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageText {
    pub paragraphs: Vec<String>,
    pub stats: TableStats,
    /// The unstructured text was used because no word survived.
    pub used_text_fallback: bool,
}

/// The whole unstructured text as one paragraph, or nothing if it is blank.
pub fn unstructured_paragraphs(text: &str) -> Vec<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Vec::new()
    } else {
        vec![trimmed.to_string()]
    }
}

/// OCR one prepared page image and rebuild its lines.
#[instrument(skip(engine, params), fields(image = %image.display()))]
pub fn recognize_page(
    engine: &dyn OcrEngine,
    image: &Path,
    params: &OcrParams,
) -> Result<PageText> {
    let table = parse_word_table(&engine.word_table(image, params)?);
    let paragraphs = reconstruct_lines(table.words);

    if !paragraphs.is_empty() {
        return Ok(PageText {
            paragraphs,
            stats: table.stats,
            used_text_fallback: false,
        });
    }

    debug!("No usable words, falling back to unstructured text");
    let text = engine.plain_text(image, params)?;
    Ok(PageText {
        paragraphs: unstructured_paragraphs(&text),
        stats: table.stats,
        used_text_fallback: true,
    })
}
