use std::time::Instant;

use crate::particles::FrameTime;

/// Source of logical animation time
///
/// Preview follows the wall clock; recording advances a fixed step per frame
/// so the exported video does not depend on how fast frames are rendered.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameClock {
    Wall {
        /// Set by the first tick
        origin: Option<Instant>,
        duration_ms: f64,
    },
    Fixed {
        frame: u64,
        fps: u32,
        duration_ms: f64,
    },
}

impl FrameClock {
    pub fn wall(duration_ms: f64) -> Self {
        FrameClock::Wall {
            origin: None,
            duration_ms,
        }
    }

    pub fn fixed(fps: u32, duration_ms: f64) -> Self {
        FrameClock::Fixed {
            frame: 0,
            fps,
            duration_ms,
        }
    }

    /// Time of the next frame. `now` is ignored by the fixed clock.
    pub fn tick(&mut self, now: Instant) -> FrameTime {
        let (elapsed_ms, duration_ms) = match self {
            FrameClock::Wall {
                origin,
                duration_ms,
            } => {
                let origin = *origin.get_or_insert(now);
                let elapsed = now.saturating_duration_since(origin).as_secs_f64() * 1000.0;
                (elapsed, *duration_ms)
            }
            FrameClock::Fixed {
                frame,
                fps,
                duration_ms,
            } => {
                // Multiply first so frame boundaries land exactly on whole milliseconds
                let elapsed = *frame as f64 * 1000.0 / *fps as f64;
                *frame += 1;
                (elapsed, *duration_ms)
            }
        };

        FrameTime {
            progress: (elapsed_ms / duration_ms).min(1.0) as f32,
            time_ms: elapsed_ms,
        }
    }

    pub fn duration_ms(&self) -> f64 {
        match self {
            FrameClock::Wall { duration_ms, .. } | FrameClock::Fixed { duration_ms, .. } => *duration_ms,
        }
    }
}
