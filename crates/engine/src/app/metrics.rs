use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoopMetricsSnapshot {
    pub fps: f32,
    pub tps: f32,
    pub work_time_ms: f32,
    pub overrun_ticks: u32,
}

/// Collects per-interval loop counters. A tick "overruns" when its update and
/// render together took longer than the tick budget; such ticks are not
/// dropped, only counted.
#[derive(Debug)]
pub(crate) struct MetricsAccumulator {
    interval_start: Instant,
    interval: Duration,
    frames: u32,
    ticks: u32,
    overrun_ticks: u32,
    work_time_sum: Duration,
}

impl MetricsAccumulator {
    pub(crate) fn new(interval: Duration) -> Self {
        Self::starting_at(Instant::now(), interval)
    }

    pub(crate) fn starting_at(start: Instant, interval: Duration) -> Self {
        Self {
            interval_start: start,
            interval,
            frames: 0,
            ticks: 0,
            overrun_ticks: 0,
            work_time_sum: Duration::ZERO,
        }
    }

    pub(crate) fn record_frame(&mut self) {
        self.frames = self.frames.saturating_add(1);
    }

    pub(crate) fn record_tick(&mut self, work_time: Duration, budget: Duration) {
        self.ticks = self.ticks.saturating_add(1);
        self.work_time_sum = self.work_time_sum.saturating_add(work_time);
        if work_time > budget {
            self.overrun_ticks = self.overrun_ticks.saturating_add(1);
        }
    }

    pub(crate) fn maybe_snapshot(&mut self, now: Instant) -> Option<LoopMetricsSnapshot> {
        let elapsed = now.saturating_duration_since(self.interval_start);
        if elapsed < self.interval {
            return None;
        }

        let elapsed_seconds = elapsed.as_secs_f32().max(f32::EPSILON);
        let work_time_ms = if self.ticks == 0 {
            0.0
        } else {
            (self.work_time_sum.as_secs_f32() / self.ticks as f32) * 1000.0
        };

        let snapshot = LoopMetricsSnapshot {
            fps: self.frames as f32 / elapsed_seconds,
            tps: self.ticks as f32 / elapsed_seconds,
            work_time_ms,
            overrun_ticks: self.overrun_ticks,
        };

        self.interval_start = now;
        self.frames = 0;
        self.ticks = 0;
        self.overrun_ticks = 0;
        self.work_time_sum = Duration::ZERO;

        Some(snapshot)
    }
}
