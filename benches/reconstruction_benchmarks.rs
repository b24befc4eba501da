//! Formula reconstruction benchmarks
//!
//! Measures line grouping and script classification on synthetic pages of
//! reaction equations, and the full pipeline over a small document.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use exam_chemtext::document::{DocumentDump, PageDump};
use exam_chemtext::extractors::{ArrowExtractor, LineSegment};
use exam_chemtext::layout::{PageBaseline, TextChar};
use exam_chemtext::noise::RegexNoiseFilter;
use exam_chemtext::pipeline::{ExtractionPipeline, PipelineConfig};
use exam_chemtext::reconstruct::FormulaReconstructor;

/// One "CO2 -> H2O" equation per line.
fn reaction_page(lines: usize) -> (Vec<TextChar>, Vec<LineSegment>) {
    let mut chars = Vec::with_capacity(lines * 7);
    let mut segments = Vec::with_capacity(lines);
    for i in 0..lines {
        let top = 100.0 + i as f32 * 14.0;
        chars.push(TextChar::new("C", 100.0, top, 107.0, top + 10.0, 10.0));
        chars.push(TextChar::new("O", 107.0, top, 114.0, top + 10.0, 10.0));
        chars.push(TextChar::new("2", 114.0, top + 3.0, 118.0, top + 10.0, 7.0));
        chars.push(TextChar::new(" ", 118.0, top, 140.0, top + 10.0, 10.0));
        chars.push(TextChar::new("H", 140.0, top, 147.0, top + 10.0, 10.0));
        chars.push(TextChar::new("2", 147.0, top + 3.0, 151.0, top + 10.0, 7.0));
        chars.push(TextChar::new("O", 151.0, top, 158.0, top + 10.0, 10.0));
        segments.push(LineSegment::new(120.0, top + 5.0, 135.0, top + 5.0));
    }
    (chars, segments)
}

fn bench_reconstruct(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconstruct");
    let reconstructor = FormulaReconstructor::new();
    let extractor = ArrowExtractor::new();

    for lines in [10, 50] {
        let (chars, segments) = reaction_page(lines);
        let baseline = PageBaseline::from_chars(&chars);
        let arrows = extractor.extract(&segments, 842.0);

        group.bench_with_input(BenchmarkId::from_parameter(format!("{lines}_lines")), &chars, |b, chars| {
            b.iter(|| black_box(reconstructor.reconstruct(black_box(chars), &baseline, &arrows)))
        });
    }

    group.finish();
}

fn bench_regex_filter(c: &mut Criterion) {
    let filter = RegexNoiseFilter::default();
    let text = "* 0000800000002 *\nCO_{2} -> H_{2}O\n\n\n12\n© UCLES 2023 9701/42/M/J/23\n"
        .repeat(50);

    c.bench_function("regex_filter_text", |b| b.iter(|| black_box(filter.filter_text(black_box(&text)))));
}

fn bench_pipeline(c: &mut Criterion) {
    let pages: Vec<PageDump> = (0..10)
        .map(|_| {
            let (chars, lines) = reaction_page(40);
            PageDump {
                width: 595.0,
                height: 842.0,
                chars,
                lines,
            }
        })
        .collect();
    let doc = DocumentDump::new(pages);
    let pipeline = ExtractionPipeline::new(PipelineConfig::default());

    let mut group = c.benchmark_group("pipeline");
    group.sample_size(20);
    group.bench_function("10_pages", |b| b.iter(|| black_box(pipeline.process(&doc, &[]))));
    group.finish();
}

criterion_group!(benches, bench_reconstruct, bench_regex_filter, bench_pipeline);
criterion_main!(benches);
