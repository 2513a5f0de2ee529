//! Time → scene lookup and per-element state.

use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::math::{clamp01, lerp};
use crate::timeline::scene::{AnimationKind, Scene, SceneElement, total_duration};

/// Seconds of linear fade at each end of a scene.
pub const FADE_SECS: f64 = 0.5;

/// Scenes laid back to back on one clock.
#[derive(Clone, Debug)]
pub struct SceneClock<'a> {
    scenes: &'a [Scene],
    starts: Vec<f64>,
    total: f64,
}

/// Where a timestamp lands.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScenePoint {
    pub scene: usize,
    /// Seconds since the scene started, within `[0, duration]`.
    pub elapsed: f64,
}

impl<'a> SceneClock<'a> {
    pub fn new(scenes: &'a [Scene]) -> Self {
        let mut starts = Vec::with_capacity(scenes.len());
        let mut t = 0.0;
        for s in scenes {
            starts.push(t);
            t += s.duration.max(0.0);
        }
        Self {
            scenes,
            starts,
            total: t,
        }
    }

    pub fn total_secs(&self) -> f64 {
        self.total
    }

    pub fn scenes(&self) -> &'a [Scene] {
        self.scenes
    }

    /// Scene whose `[start, end)` contains `t`; past the end, the last scene at its end.
    pub fn locate(&self, t: f64) -> Option<ScenePoint> {
        let last = self.scenes.len().checked_sub(1)?;
        // Walk back over scenes starting at or before `t`; zero-length scenes never match.
        let starting = self.starts.partition_point(|s| *s <= t);
        for i in (0..starting).rev() {
            let dur = self.scenes[i].duration.max(0.0);
            if dur <= 0.0 {
                continue;
            }
            let elapsed = t - self.starts[i];
            if elapsed < dur {
                return Some(ScenePoint { scene: i, elapsed });
            }
            break;
        }
        Some(ScenePoint {
            scene: last,
            elapsed: self.scenes[last].duration.max(0.0),
        })
    }
}

/// Frame count for a timeline: `ceil(total × fps)`.
pub fn frame_count(scenes: &[Scene], fps: Fps, total_duration_override: Option<f64>) -> u64 {
    let total = total_duration_override.unwrap_or_else(|| total_duration(scenes));
    fps.secs_to_frames_ceil(total)
}

pub fn frame_timestamp(fps: Fps, index: FrameIndex) -> f64 {
    fps.frames_to_secs(index.0)
}

/// Fade-in/fade-out ramp. Short scenes take the minimum of both ramps.
pub fn scene_opacity(elapsed: f64, duration: f64) -> f64 {
    let fade_in = elapsed / FADE_SECS;
    let fade_out = (duration - elapsed) / FADE_SECS;
    clamp01(fade_in.min(fade_out).min(1.0))
}

/// Resolved drawing state of one element at one instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ElementState {
    pub x: f64,
    pub opacity: f64,
}

pub fn element_state(el: &SceneElement, elapsed: f64, duration: f64) -> ElementState {
    let opacity = scene_opacity(elapsed, duration) * clamp01(el.style.opacity);
    let x = match el.animation.kind {
        AnimationKind::Slide => {
            let progress = if duration > 0.0 {
                clamp01(elapsed / duration)
            } else {
                1.0
            };
            let from = el.animation.start_x.unwrap_or(el.x);
            let to = el.animation.end_x.unwrap_or(el.x);
            lerp(from, to, progress)
        }
        AnimationKind::None | AnimationKind::Fade => el.x,
    };
    ElementState { x, opacity }
}

#[cfg(test)]
#[path = "../../tests/unit/synth/timing.rs"]
mod tests;
