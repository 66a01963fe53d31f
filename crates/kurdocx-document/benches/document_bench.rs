// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the kurdocx-document crate: word-table parsing
// and line reconstruction, and the OCR image preprocessing chain.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{DynamicImage, GrayImage, Luma};

use kurdocx_document::image::EnhanceFactors;
use kurdocx_document::{PagePreprocessor, parse_word_table, reconstruct_lines};

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// A dense page: 40 lines of 12 words, emitted right-to-left so every line
/// needs sorting.
fn synthetic_word_table() -> String {
    let mut tsv = String::from(
        "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext\n",
    );
    for line in 0..40u32 {
        tsv.push_str(&format!("4\t1\t1\t1\t{line}\t0\t0\t{}\t2000\t30\t-1\t\n", line * 40));
        for word in (0..12u32).rev() {
            tsv.push_str(&format!(
                "5\t1\t1\t1\t{line}\t{word}\t{}\t{}\t80\t30\t91.5\twisha{word}\n",
                word * 90,
                line * 40 + (word % 3)
            ));
        }
    }
    tsv
}

fn bench_line_reconstruction(c: &mut Criterion) {
    let tsv = synthetic_word_table();

    c.bench_function("parse_and_reconstruct (40x12 words)", |b| {
        b.iter(|| {
            let table = parse_word_table(black_box(&tsv));
            black_box(reconstruct_lines(table.words));
        });
    });
}

/// Full OCR preprocessing on a 200x200 synthetic page: light background with
/// dark horizontal bars standing in for text lines.
fn bench_preprocess(c: &mut Criterion) {
    let (width, height) = (200u32, 200u32);
    let img = GrayImage::from_fn(width, height, |_, y| {
        if (y / 10) % 2 == 0 { Luma([225u8]) } else { Luma([40u8]) }
    });
    let dynamic = DynamicImage::ImageLuma8(img);
    let factors = EnhanceFactors {
        contrast: 1.5,
        sharpness: 1.5,
    };

    c.bench_function("prepare_for_ocr (200x200)", |b| {
        b.iter(|| {
            let prepared = PagePreprocessor::prepare_for_ocr(black_box(dynamic.clone()), factors);
            black_box(prepared.into_gray());
        });
    });
}

criterion_group!(benches, bench_line_reconstruction, bench_preprocess);
criterion_main!(benches);
