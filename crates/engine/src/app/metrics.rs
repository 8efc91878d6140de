use std::time::{Duration, Instant};

use crate::render::RenderStats;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoopMetricsSnapshot {
    pub fps: f32,
    pub frame_time_ms: f32,
    pub avg_chunks_drawn: f32,
    /// Frames in the interval that showed at least one placeholder chunk.
    pub frames_with_pending: u32,
}

#[derive(Debug)]
pub(crate) struct MetricsAccumulator {
    interval_start: Instant,
    interval: Duration,
    frames: u32,
    frame_time_sum: Duration,
    chunks_drawn_sum: u64,
    frames_with_pending: u32,
}

impl MetricsAccumulator {
    pub(crate) fn new(interval: Duration) -> Self {
        Self {
            interval_start: Instant::now(),
            interval,
            frames: 0,
            frame_time_sum: Duration::ZERO,
            chunks_drawn_sum: 0,
            frames_with_pending: 0,
        }
    }

    pub(crate) fn record_frame(&mut self, frame_dt: Duration, render: RenderStats) {
        self.frames = self.frames.saturating_add(1);
        self.frame_time_sum = self.frame_time_sum.saturating_add(frame_dt);
        self.chunks_drawn_sum = self
            .chunks_drawn_sum
            .saturating_add(render.chunks_drawn as u64);
        if render.chunks_pending > 0 {
            self.frames_with_pending = self.frames_with_pending.saturating_add(1);
        }
    }

    pub(crate) fn maybe_snapshot(&mut self, now: Instant) -> Option<LoopMetricsSnapshot> {
        let elapsed = now.saturating_duration_since(self.interval_start);
        if elapsed < self.interval {
            return None;
        }

        let elapsed_seconds = elapsed.as_secs_f32().max(f32::EPSILON);
        let (frame_time_ms, avg_chunks_drawn) = if self.frames == 0 {
            (0.0, 0.0)
        } else {
            (
                (self.frame_time_sum.as_secs_f32() / self.frames as f32) * 1000.0,
                self.chunks_drawn_sum as f32 / self.frames as f32,
            )
        };

        let snapshot = LoopMetricsSnapshot {
            fps: self.frames as f32 / elapsed_seconds,
            frame_time_ms,
            avg_chunks_drawn,
            frames_with_pending: self.frames_with_pending,
        };

        self.interval_start = now;
        self.frames = 0;
        self.frame_time_sum = Duration::ZERO;
        self.chunks_drawn_sum = 0;
        self.frames_with_pending = 0;

        Some(snapshot)
    }
}
