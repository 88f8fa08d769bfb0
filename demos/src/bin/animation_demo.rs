//! Animates a crowd of skinned models across worker threads and meters
//! every frame.
//!
//! Run with `RUST_LOG=debug` to see per-frame timeline summaries.

use std::time::Instant;

use clap::Parser;

use tasking_debug_meter::{MeterConfig, OverlayBatch, OverlayLayout, Profiler};
use tasking_demos::animation::{
    AnimationMeters, DEFAULT_BONE_COUNT, FrameLanes, move_frame, spawn_models,
};

/// Debug meter animation demo.
#[derive(Parser, Debug)]
#[command(name = "animation_demo", version = tasking_demos::VERSION)]
struct Args {
    /// Number of frames to simulate
    #[arg(long, default_value_t = 600)]
    frames: u64,

    /// Worker lanes (at least one); the main thread records on an extra lane
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..))]
    workers: u32,

    /// Number of animated models
    #[arg(long, default_value_t = 64)]
    models: usize,

    /// Bones per model
    #[arg(long, default_value_t = DEFAULT_BONE_COUNT)]
    bones: usize,

    /// Intervals per context per frame (power of two)
    #[arg(long, default_value_t = tasking_debug_meter::DEFAULT_CAPACITY)]
    capacity: usize,

    /// Frames between label total reports (0 disables)
    #[arg(long, default_value_t = tasking_debug_meter::DEFAULT_REPORT_INTERVAL)]
    report_interval: u64,

    /// Log a timeline summary every N frames
    #[arg(long, default_value_t = 60)]
    summary_every: u64,

    /// Start with metering disabled
    #[arg(long)]
    disabled: bool,

    /// Animate on the main thread only
    #[arg(long)]
    no_tasking: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    log::info!("Animation demo v{}", tasking_demos::VERSION);

    let config = MeterConfig::new()
        .with_contexts(args.workers as usize + 1)
        .with_capacity(args.capacity)
        .with_report_interval(Some(args.report_interval));
    let profiler = Profiler::new(config)?;
    profiler.set_enabled(!args.disabled);

    let contexts = profiler.acquire_all_contexts();
    let lanes = FrameLanes::split(&contexts).ok_or("profiler has no worker lanes")?;
    let meters = AnimationMeters::register(&profiler);

    let mut models = spawn_models(args.models, args.bones);
    let initial_quads = args.models + profiler.context_count();
    let mut batch = OverlayBatch::new(OverlayLayout::default(), initial_quads);

    log::info!(
        "Animating {} models with {} bones on {} workers (tasking {})",
        args.models,
        args.bones,
        lanes.workers().len(),
        if args.no_tasking { "off" } else { "on" }
    );

    let start = Instant::now();
    for frame in 0..args.frames {
        profiler.reset_frame();

        let time = start.elapsed().as_secs_f32();
        move_frame(&mut models, time, &profiler, &lanes, &meters, !args.no_tasking);

        let timeline = {
            let _overlay =
                profiler.scope(lanes.main(), AnimationMeters::OVERLAY_COLOR, meters.overlay);
            let timeline = profiler.reduce();
            batch.rebuild(&timeline);
            timeline
        };

        if args.summary_every > 0 && frame % args.summary_every == 0 {
            log::debug!(
                "Frame {}: {:.3} ms metered, {} intervals, {} quads ({} bytes)",
                frame,
                timeline.span_millis(profiler.clock()),
                timeline.interval_count(),
                batch.quad_count(),
                batch.as_bytes().len()
            );
        }
    }

    let elapsed = start.elapsed();
    log::info!(
        "{} frames in {:.2?} ({:.1} fps), {} intervals overwritten",
        args.frames,
        elapsed,
        args.frames as f64 / elapsed.as_secs_f64().max(f64::EPSILON),
        profiler.overflow_count()
    );

    profiler.shutdown();
    for total in profiler.label_totals() {
        log::info!(
            "{:>16}: {:10.2} ms over {} regions",
            total.name,
            total.millis,
            total.count
        );
    }

    Ok(())
}
