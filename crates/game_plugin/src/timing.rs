// crates/game_plugin/src/timing.rs

use std::time::{Duration, Instant};

use crate::config::FRAME_LIMIT_HZ;

/// Longest frame the simulation will integrate in one step. Anything longer
/// (breakpoints, window drags, a module swap) is treated as this long so
/// entities cannot tunnel through platforms.
pub const MAX_FRAME_SECS: f64 = 0.25;

/// Wall-clock bookkeeping between frames. Not persisted across reloads; the
/// first frame after a swap simply measures zero.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last_frame: Option<Instant>,
    fps_timer: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTimes {
    pub delta: f64,
    pub delta_unscaled: f64,
}

/// Scale and pause applied to a raw frame duration.
pub fn scaled_delta(delta_unscaled: f64, time_scale: f64, paused: bool) -> f64 {
    if paused {
        0.0
    } else {
        delta_unscaled * time_scale
    }
}

impl FrameClock {
    /// Measure the frame that just ended. With `frame_limit` on, first sleeps
    /// out whatever remains of the fixed budget since the previous frame.
    pub fn tick(&mut self, time_scale: f64, paused: bool, frame_limit: bool) -> FrameTimes {
        if frame_limit {
            if let Some(remaining) = self.last_frame.and_then(|last| frame_budget_remaining(last.elapsed())) {
                std::thread::sleep(remaining);
            }
        }

        let now = Instant::now();
        let delta_unscaled = self
            .last_frame
            .map(|last| now.duration_since(last).as_secs_f64())
            .unwrap_or(0.0)
            .min(MAX_FRAME_SECS);
        self.last_frame = Some(now);

        FrameTimes {
            delta: scaled_delta(delta_unscaled, time_scale, paused),
            delta_unscaled,
        }
    }

    /// Accumulate real time; returns an fps title roughly once per second.
    pub fn fps_report(&mut self, delta_unscaled: f64) -> Option<String> {
        self.fps_timer += delta_unscaled;
        if self.fps_timer < 1.0 || delta_unscaled <= 0.0 {
            return None;
        }
        self.fps_timer = 0.0;
        Some(format!("King Donkey ({:.1} fps)", 1.0 / delta_unscaled))
    }
}

/// Time left in the frame budget after `elapsed`, if any.
pub fn frame_budget_remaining(elapsed: Duration) -> Option<Duration> {
    let target = Duration::from_secs_f64(1.0 / FRAME_LIMIT_HZ as f64);
    target.checked_sub(elapsed).filter(|d| !d.is_zero())
}
