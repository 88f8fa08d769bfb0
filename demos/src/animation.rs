//! Skinned model animation, fanned out across worker lanes.
//!
//! Each frame the models are split into one contiguous chunk per worker lane
//! and animated on scoped threads. Joining the scope is the frame barrier
//! that makes rotating the profiler safe.
//!
//! The frame region lives on the main lane and model regions only on worker
//! lanes, so no context ever holds two open regions.

use glam::{Mat4, Quat, Vec3};

use tasking_debug_meter::{Clock, ContextId, LabelId, MeterColor, Profiler};

/// Bones per model.
pub const DEFAULT_BONE_COUNT: usize = 32;

/// A bone chain with its current skinning palette.
#[derive(Debug, Clone)]
pub struct AnimatedModel {
    /// Phase offset so the models do not move in lockstep.
    pub time_offset: f32,
    inverse_bind: Vec<Mat4>,
    /// Skinning matrices from the last [`animate`](Self::animate) call.
    pub palette: Vec<Mat4>,
}

impl AnimatedModel {
    pub fn new(bone_count: usize, time_offset: f32) -> Self {
        let inverse_bind = (0..bone_count)
            .map(|bone| Mat4::from_translation(Vec3::new(0.0, -(bone as f32), 0.0)))
            .collect();
        Self {
            time_offset,
            inverse_bind,
            palette: vec![Mat4::IDENTITY; bone_count],
        }
    }

    pub fn bone_count(&self) -> usize {
        self.palette.len()
    }

    /// Pose the bone chain at `time` and rebuild the palette.
    pub fn animate(&mut self, time: f32) {
        let t = time + self.time_offset;
        let mut parent = Mat4::IDENTITY;
        for (bone, (skin, inverse_bind)) in self
            .palette
            .iter_mut()
            .zip(&self.inverse_bind)
            .enumerate()
        {
            let swing = (t * 2.0 + bone as f32 * 0.3).sin() * 0.25;
            let offset = if bone == 0 { Vec3::ZERO } else { Vec3::Y };
            let local = Mat4::from_rotation_translation(Quat::from_rotation_z(swing), offset);
            parent *= local;
            *skin = parent * *inverse_bind;
        }
    }
}

/// Colors and labels of the regions the demo records.
#[derive(Debug, Clone, Copy)]
pub struct AnimationMeters {
    pub animate: LabelId,
    pub move_frame: LabelId,
    pub overlay: LabelId,
}

impl AnimationMeters {
    pub const ANIMATE_COLOR: MeterColor = MeterColor::from_rgba(0x20, 0xC0, 0x40, 0xC0);
    pub const FRAME_COLOR: MeterColor = MeterColor::from_rgba(0xE0, 0x80, 0x20, 0xC0);
    pub const OVERLAY_COLOR: MeterColor = MeterColor::from_rgba(0x30, 0x60, 0xF0, 0xC0);

    pub fn register<C: Clock>(profiler: &Profiler<C>) -> Self {
        Self {
            animate: profiler.label("Animate Models"),
            move_frame: profiler.label("MoveFrame"),
            overlay: profiler.label("Render Overlay"),
        }
    }
}

/// Animate every model, one chunk per worker lane.
///
/// Returns once every worker has finished.
pub fn animate_parallel<C: Clock>(
    models: &mut [AnimatedModel],
    time: f32,
    profiler: &Profiler<C>,
    lanes: &[ContextId],
    meters: &AnimationMeters,
) {
    if lanes.is_empty() || models.is_empty() {
        return;
    }
    let chunk_size = models.len().div_ceil(lanes.len());

    std::thread::scope(|s| {
        for (chunk, &lane) in models.chunks_mut(chunk_size).zip(lanes) {
            s.spawn(move || {
                for model in chunk {
                    let _scope =
                        profiler.scope(lane, AnimationMeters::ANIMATE_COLOR, meters.animate);
                    model.animate(time);
                }
            });
        }
    });
}

/// Animate every model on the calling thread, recording on `lane`.
pub fn animate_serial<C: Clock>(
    models: &mut [AnimatedModel],
    time: f32,
    profiler: &Profiler<C>,
    lane: ContextId,
    meters: &AnimationMeters,
) {
    for model in models {
        let _scope = profiler.scope(lane, AnimationMeters::ANIMATE_COLOR, meters.animate);
        model.animate(time);
    }
}

/// Meter lanes used by one frame.
#[derive(Debug, Clone)]
pub struct FrameLanes {
    main: ContextId,
    workers: Vec<ContextId>,
}

impl FrameLanes {
    /// Split acquired contexts into the main lane and worker lanes.
    ///
    /// Returns `None` unless there is at least one worker lane.
    pub fn split(contexts: &[ContextId]) -> Option<Self> {
        let (&main, workers) = contexts.split_first()?;
        if workers.is_empty() {
            return None;
        }
        Some(Self {
            main,
            workers: workers.to_vec(),
        })
    }

    /// Lane of the thread driving the frame.
    pub fn main(&self) -> ContextId {
        self.main
    }

    /// One lane per worker thread, never empty.
    pub fn workers(&self) -> &[ContextId] {
        &self.workers
    }

    /// Lane the serial path records model regions on.
    pub fn serial(&self) -> ContextId {
        self.workers[0]
    }
}

/// Animate one frame inside a "MoveFrame" region on the main lane.
///
/// With `tasking` off the models are animated on the calling thread, still
/// recording on a worker lane.
pub fn move_frame<C: Clock>(
    models: &mut [AnimatedModel],
    time: f32,
    profiler: &Profiler<C>,
    lanes: &FrameLanes,
    meters: &AnimationMeters,
    tasking: bool,
) {
    let _frame = profiler.scope(lanes.main, AnimationMeters::FRAME_COLOR, meters.move_frame);
    if tasking {
        animate_parallel(models, time, profiler, &lanes.workers, meters);
    } else {
        animate_serial(models, time, profiler, lanes.serial(), meters);
    }
}

/// Build `count` models with staggered phases.
pub fn spawn_models(count: usize, bone_count: usize) -> Vec<AnimatedModel> {
    (0..count)
        .map(|i| AnimatedModel::new(bone_count, i as f32 * 0.37))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, Ordering};

    use super::*;
    use tasking_debug_meter::MeterConfig;

    /// Advances ten ticks on every read.
    #[derive(Default)]
    struct SteppingClock(AtomicU64);

    impl Clock for SteppingClock {
        fn now(&self) -> u64 {
            self.0.fetch_add(10, Ordering::Relaxed) + 10
        }

        fn frequency(&self) -> u64 {
            1_000
        }
    }

    fn assert_frame_encloses_models(tasking: bool) {
        let config = MeterConfig::new()
            .with_contexts(3)
            .with_report_interval(None);
        let profiler = Profiler::with_clock(config, SteppingClock::default()).unwrap();
        let lanes = FrameLanes::split(&profiler.acquire_all_contexts()).unwrap();
        let meters = AnimationMeters::register(&profiler);
        let mut models = spawn_models(3, 2);

        profiler.reset_frame();
        move_frame(&mut models, 0.5, &profiler, &lanes, &meters, tasking);
        profiler.reset_frame();

        let main = profiler.completed_intervals(lanes.main());
        assert!(main.iter().all(|i| i.label != meters.animate));
        let frame: Vec<_> = main
            .iter()
            .filter(|i| i.label == meters.move_frame)
            .collect();
        assert_eq!(frame.len(), 1);

        let animated: Vec<_> = lanes
            .workers()
            .iter()
            .flat_map(|&lane| profiler.completed_intervals(lane))
            .filter(|i| i.label == meters.animate)
            .collect();
        assert_eq!(animated.len(), 3);
        for interval in &animated {
            assert!(interval.start < interval.end, "{interval:?}");
            assert!(
                frame[0].start < interval.start && interval.end < frame[0].end,
                "{:?} does not enclose {:?}",
                frame[0],
                interval
            );
        }
    }

    #[test]
    fn test_serial_frame_encloses_model_regions() {
        assert_frame_encloses_models(false);
    }

    #[test]
    fn test_parallel_frame_encloses_model_regions() {
        assert_frame_encloses_models(true);
    }

    #[test]
    fn test_frame_lanes_need_a_worker() {
        let profiler =
            Profiler::new(MeterConfig::new().with_contexts(2).with_report_interval(None)).unwrap();
        let contexts = profiler.acquire_all_contexts();
        assert!(FrameLanes::split(&contexts[..1]).is_none());

        let lanes = FrameLanes::split(&contexts).unwrap();
        assert_eq!(lanes.main(), contexts[0]);
        assert_eq!(lanes.serial(), contexts[1]);
    }

    #[test]
    fn test_root_bone_at_rest() {
        let mut model = AnimatedModel::new(4, 0.0);
        model.animate(0.0);
        assert_eq!(model.bone_count(), 4);
        let root = model.palette[0];
        assert!(root.abs_diff_eq(Mat4::IDENTITY, 1e-5));
    }

    #[test]
    fn test_palette_changes_over_time() {
        let mut model = AnimatedModel::new(8, 0.0);
        model.animate(0.0);
        let before = model.palette.clone();
        model.animate(0.5);
        assert!(
            before
                .iter()
                .zip(&model.palette)
                .any(|(a, b)| !a.abs_diff_eq(*b, 1e-6))
        );
    }

    #[test]
    fn test_parallel_matches_serial() {
        let profiler =
            Profiler::new(MeterConfig::new().with_contexts(4).with_report_interval(None)).unwrap();
        let lanes = profiler.acquire_all_contexts();
        let meters = AnimationMeters::register(&profiler);

        let mut parallel = spawn_models(10, 6);
        let mut serial = spawn_models(10, 6);
        profiler.reset_frame();
        animate_parallel(&mut parallel, 1.25, &profiler, &lanes[1..], &meters);
        animate_serial(&mut serial, 1.25, &profiler, lanes[0], &meters);
        profiler.reset_frame();

        for (a, b) in parallel.iter().zip(&serial) {
            assert_eq!(a.palette, b.palette);
        }

        let timeline = profiler.reduce();
        let animated: usize = timeline
            .lanes
            .iter()
            .map(|lane| {
                lane.intervals
                    .iter()
                    .filter(|i| i.label == meters.animate)
                    .count()
            })
            .sum();
        assert_eq!(animated, 20);
    }
}
