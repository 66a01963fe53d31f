// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Conversion mode selection.
//
// Preference order: direct conversion of an existing text layer, then the
// searchable-PDF tool followed by direct conversion, then the built-in OCR
// pipeline. Direct conversion preserves the most fidelity; the OCR pipeline
// is the last resort, not the default.

use kurdocx_core::types::{ConversionMode, RasterSource};

/// Everything the choice depends on, gathered before deciding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ModeSignals {
    /// The source PDF has an extractable text layer.
    pub text_layer: bool,
    /// A direct converter is available and allowed.
    pub direct_available: bool,
    /// The user wants the searchable-PDF tool tried.
    pub tool_enabled: bool,
    /// The searchable-PDF tool is installed.
    pub tool_available: bool,
    /// Exit code of the tool run; `None` when it did not run, was killed, or
    /// timed out.
    pub tool_exit: Option<i32>,
}

impl ModeSignals {
    /// Whether the searchable-PDF tool should be run before deciding.
    ///
    /// Only true when the direct branch is not already taken.
    pub fn wants_tool(&self) -> bool {
        !(self.text_layer && self.direct_available) && self.tool_enabled && self.tool_available
    }
}

/// The chosen mode and why.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeDecision {
    pub mode: ConversionMode,
    /// Which PDF the OCR pipeline rasterizes; `None` when it does not run.
    pub raster_source: Option<RasterSource>,
    pub reason: &'static str,
}

/// Pick exactly one conversion mode.
///
/// Pure: the same signals always give the same decision. A failed or
/// timed-out tool run leads to one fallback, never a retry.
pub fn select_mode(signals: &ModeSignals) -> ModeDecision {
    if signals.text_layer && signals.direct_available {
        return ModeDecision {
            mode: ConversionMode::Direct,
            raster_source: None,
            reason: "text layer present and direct converter available",
        };
    }

    if signals.wants_tool() && signals.tool_exit == Some(0) {
        return if signals.direct_available {
            ModeDecision {
                mode: ConversionMode::OcrToolThenDirect,
                raster_source: None,
                reason: "searchable-PDF tool succeeded; converting its output directly",
            }
        } else {
            ModeDecision {
                mode: ConversionMode::FallbackOcr,
                raster_source: Some(RasterSource::ToolOutput),
                reason: "searchable-PDF tool succeeded but no direct converter; OCR on its output",
            }
        };
    }

    let reason = if !signals.tool_enabled {
        "searchable-PDF tool disabled"
    } else if !signals.tool_available {
        "searchable-PDF tool not installed"
    } else {
        "searchable-PDF tool failed"
    };
    ModeDecision {
        mode: ConversionMode::FallbackOcr,
        raster_source: Some(RasterSource::Original),
        reason,
    }
}
