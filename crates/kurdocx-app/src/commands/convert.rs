// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

use std::path::Path;

use anyhow::{Context, Result, bail};
use kurdocx_core::config::ConversionConfig;
use kurdocx_core::types::ConversionReport;
use kurdocx_document::Converter;
use kurdocx_document::pipeline::default_output_path;
use tracing::info;

use crate::cli::ConvertArgs;

/// Load the config file if one was given, otherwise the defaults.
pub fn load_config(path: Option<&Path>) -> Result<ConversionConfig> {
    match path {
        Some(path) => ConversionConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(ConversionConfig::default()),
    }
}

pub fn run(args: ConvertArgs) -> Result<()> {
    if !args.input.is_file() {
        bail!("Input file does not exist: {}", args.input.display());
    }

    let mut config = load_config(args.config.as_deref())?;
    args.apply(&mut config);

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.input));
    info!(
        input = %args.input.display(),
        output = %output.display(),
        languages = %config.languages,
        "Starting conversion"
    );

    let converter = Converter::from_config(config)?;
    let report = converter.convert(&args.input, &output)?;

    print_diagnostics(&report);
    if let Some(report_path) = &args.report {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(report_path, json)
            .with_context(|| format!("failed to write report {}", report_path.display()))?;
    }

    println!(
        "Converted {} -> {} ({}, {} page(s), {:.1}s)",
        args.input.display(),
        output.display(),
        report.mode,
        report.pages,
        report.elapsed_ms as f64 / 1000.0
    );
    Ok(())
}

/// Notices and the searchable-PDF tool log always go to stderr.
fn print_diagnostics(report: &ConversionReport) {
    for notice in &report.notices {
        eprintln!("note: {notice}");
    }
    if let Some(log) = &report.tool_log {
        eprintln!("--- searchable-PDF tool output ---");
        eprintln!("{}", log.trim_end());
        eprintln!("----------------------------------");
    }
    if report.table.dropped() > 0 {
        eprintln!(
            "note: {} of {} OCR rows were skipped (empty text {}, negative confidence {}, short {}, malformed {})",
            report.table.dropped(),
            report.table.data_rows,
            report.table.empty_text,
            report.table.negative_confidence,
            report.table.short_rows,
            report.table.malformed
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_path_uses_defaults() {
        assert_eq!(load_config(None).unwrap(), ConversionConfig::default());
    }

    #[test]
    fn config_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kurdocx.json");
        std::fs::write(&path, r#"{ "dpi": 200, "languages": "kmr+eng" }"#).unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.dpi, 200);
        assert_eq!(config.languages.codes(), "kmr+eng");
    }

    #[test]
    fn unreadable_config_names_the_file() {
        let err = load_config(Some(Path::new("/nonexistent/kurdocx.json"))).unwrap_err();
        assert!(err.to_string().contains("kurdocx.json"));
    }
}
