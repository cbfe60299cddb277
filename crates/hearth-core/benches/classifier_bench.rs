//! Benchmarks for the understanding pipeline.
//!
//! Run with: cargo bench -p hearth-core

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use hearth_core::pipeline::classifier::PatternClassifier;
use hearth_core::pipeline::entities::EntityExtractor;
use hearth_core::pipeline::planner::ActionPlanner;
use hearth_core::pipeline::traits::UtteranceClassifier;
use hearth_types::classification::Category;
use hearth_types::context::ContextSnapshot;

const UTTERANCES: &[(&str, &str)] = &[
    ("music", "play some jazz in the living room"),
    ("lighting", "set the bedroom lights to 40%"),
    ("calendar", "schedule a team sync for tomorrow at 3pm"),
    ("emotional", "I feel really anxious about work today"),
    ("question", "why is the sky blue?"),
    ("unmatched", "purple monkey dishwasher"),
];

fn bench_classify(c: &mut Criterion) {
    let classifier = PatternClassifier::default();
    let mut group = c.benchmark_group("classify");

    for (label, text) in UTTERANCES {
        group.bench_with_input(BenchmarkId::new("cold", label), text, |b, text| {
            b.iter(|| black_box(classifier.classify(black_box(text), None)));
        });
    }

    let warm = ContextSnapshot {
        message_count: 12,
        recent_categories: vec![Category::MusicControl, Category::LightingControl],
        preferred_categories: vec![Category::MusicControl],
        ..Default::default()
    };
    group.bench_function("with_context", |b| {
        b.iter(|| black_box(classifier.classify(black_box("play something upbeat"), Some(&warm))));
    });

    group.finish();
}

fn bench_extract(c: &mut Criterion) {
    let extractor = EntityExtractor::new();
    c.bench_function("extract_entities", |b| {
        b.iter(|| {
            black_box(extractor.extract(black_box(
                "Remind Sarah at 3:30 pm tomorrow to turn on the kitchen lights in Boston",
            )))
        });
    });
}

fn bench_plan(c: &mut Criterion) {
    let classifier = PatternClassifier::default();
    let planner = ActionPlanner::new();
    let snapshot = ContextSnapshot::default();
    let classified = classifier.classify("turn off the kitchen light", None);
    c.bench_function("plan_lighting", |b| {
        b.iter(|| black_box(planner.plan(black_box(&classified), &snapshot)));
    });
}

criterion_group!(benches, bench_classify, bench_extract, bench_plan);
criterion_main!(benches);
