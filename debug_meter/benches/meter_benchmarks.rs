use criterion::{Criterion, black_box, criterion_group, criterion_main};

use tasking_debug_meter::{LabelId, MeterColor, MeterConfig, OverlayBatch, OverlayLayout, Profiler};

fn bench_profiler() -> Profiler {
    Profiler::new(MeterConfig::default().with_report_interval(None))
        .expect("default meter config is valid")
}

// ---------------------------------------------------------------------------
// Recording
// ---------------------------------------------------------------------------

fn bench_begin_end_pair(c: &mut Criterion) {
    let profiler = bench_profiler();
    let ctx = profiler.acquire_context().unwrap();
    let label = profiler.label("bench");
    c.bench_function("begin_end_pair", |b| {
        b.iter(|| {
            let token = profiler.begin_region(black_box(ctx), MeterColor::DEFAULT, label);
            profiler.end_region(ctx, token);
        });
    });
}

fn bench_begin_end_disabled(c: &mut Criterion) {
    let profiler = bench_profiler();
    let ctx = profiler.acquire_context().unwrap();
    profiler.set_enabled(false);
    c.bench_function("begin_end_pair_disabled", |b| {
        b.iter(|| {
            let token = profiler.begin_region(
                black_box(ctx),
                MeterColor::DEFAULT,
                LabelId::UNNAMED,
            );
            profiler.end_region(ctx, token);
        });
    });
}

// ---------------------------------------------------------------------------
// Rotation and reduction
// ---------------------------------------------------------------------------

fn fill_frame(profiler: &Profiler, regions_per_context: usize) {
    let contexts = profiler.acquire_all_contexts();
    for &ctx in &contexts {
        for _ in 0..regions_per_context {
            let token = profiler.begin_region(ctx, MeterColor::DEFAULT, LabelId::UNNAMED);
            profiler.end_region(ctx, token);
        }
    }
}

fn bench_reset_frame(c: &mut Criterion) {
    let profiler = bench_profiler();
    let contexts = profiler.acquire_all_contexts();
    c.bench_function("reset_frame_256_per_context", |b| {
        b.iter(|| {
            for &ctx in &contexts {
                for _ in 0..256 {
                    let token =
                        profiler.begin_region(ctx, MeterColor::DEFAULT, LabelId::UNNAMED);
                    profiler.end_region(ctx, token);
                }
            }
            profiler.reset_frame();
        });
    });
}

fn bench_reduce_and_build(c: &mut Criterion) {
    let profiler = bench_profiler();
    profiler.reset_frame();
    fill_frame(&profiler, 1024);
    profiler.reset_frame();

    let mut batch = OverlayBatch::new(OverlayLayout::default(), 4 * 1024);
    c.bench_function("reduce_and_build_4x1024", |b| {
        b.iter(|| {
            let timeline = profiler.reduce();
            batch.rebuild(black_box(&timeline));
            black_box(batch.draw_vertex_count());
        });
    });
}

criterion_group!(
    benches,
    bench_begin_end_pair,
    bench_begin_end_disabled,
    bench_reset_frame,
    bench_reduce_and_build,
);
criterion_main!(benches);
