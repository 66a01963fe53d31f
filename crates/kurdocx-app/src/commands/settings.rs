// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `kurdocx config` and `kurdocx languages`.

use std::path::Path;

use anyhow::{Context, Result};
use kurdocx_core::config::{CONTRAST_RANGE, ConversionConfig, DPI_RANGE, SHARPNESS_RANGE};
use kurdocx_core::types::{EngineMode, LanguageSet, PageSegMode};

/// Print the default configuration as JSON, or write it to `write`.
pub fn config(write: Option<&Path>) -> Result<()> {
    let defaults = ConversionConfig::default();
    match write {
        Some(path) => {
            defaults
                .persist(path)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Wrote default configuration to {}", path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&defaults)?),
    }
    Ok(())
}

pub fn languages() -> Result<()> {
    let defaults = ConversionConfig::default();

    println!("Language combinations (--languages):");
    for set in LanguageSet::ALL {
        let marker = if set == defaults.languages { " (default)" } else { "" };
        println!("  {:<16} {}{marker}", set.codes(), set.label());
    }

    println!();
    println!("Page segmentation modes (--psm):");
    for mode in PageSegMode::ALL {
        let marker = if mode == defaults.page_seg_mode { " (default)" } else { "" };
        println!("  {:<3} {}{marker}", mode.value(), mode.label());
    }

    println!();
    println!("Engine modes (--oem):");
    for mode in EngineMode::ALL {
        let marker = if mode == defaults.engine_mode { " (default)" } else { "" };
        println!("  {:<3} {}{marker}", mode.value(), mode.label());
    }

    println!();
    println!(
        "Ranges: --dpi {}-{}, --contrast {}-{}, --sharpness {}-{}",
        DPI_RANGE.start(),
        DPI_RANGE.end(),
        CONTRAST_RANGE.start(),
        CONTRAST_RANGE.end(),
        SHARPNESS_RANGE.start(),
        SHARPNESS_RANGE.end()
    );
    Ok(())
}
