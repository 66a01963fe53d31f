// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module: open documents and probe their embedded text layer.

pub mod reader;

#[cfg(test)]
pub(crate) mod fixtures;

pub use reader::{PdfReader, TextLayerProbe};
