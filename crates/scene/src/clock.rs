//! Frame timing
//!
//! Hosts report a monotonic timestamp with each frame. The clock turns those
//! into a per-frame delta and a scene-elapsed time that does not advance
//! while the scene is paused.

use std::time::Duration;

/// Largest delta reported for one frame, in seconds
///
/// Long gaps (a backgrounded tab, a debugger pause) would otherwise make
/// particles jump across the whole volume.
pub const MAX_FRAME_DELTA: f32 = 0.1;

/// Timing for one frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameTime {
    /// Seconds since the previous frame (clamped to [`MAX_FRAME_DELTA`])
    pub delta: f32,
    /// Running seconds, excluding paused intervals
    pub elapsed: f32,
}

/// Converts host timestamps into [`FrameTime`]s
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last: Option<Duration>,
    elapsed: f32,
    frames: u64,
}

impl FrameClock {
    /// Create a clock at zero elapsed time
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance to `now` and return this frame's timing
    ///
    /// The first frame after creation or [`pause`](Self::pause) has zero delta.
    pub fn tick(&mut self, now: Duration) -> FrameTime {
        let delta = match self.last {
            Some(last) => now.saturating_sub(last).as_secs_f32().min(MAX_FRAME_DELTA),
            None => 0.0,
        };
        self.last = Some(now);
        self.elapsed += delta;
        self.frames += 1;

        FrameTime {
            delta,
            elapsed: self.elapsed,
        }
    }

    /// Forget the last timestamp so the paused interval is not counted
    pub fn pause(&mut self) {
        self.last = None;
    }

    /// Running seconds so far
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Number of frames ticked
    pub fn frames(&self) -> u64 {
        self.frames
    }
}
