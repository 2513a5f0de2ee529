//! Timeline → rasterized frames.
//!
//! Every frame is a pure function of `(scenes, fps, canvas, index)`, so frames render
//! independently and in parallel.

pub mod color;
pub mod fonts;
pub mod raster;
pub mod synthesizer;
pub mod timing;

pub use color::{Rgba8, parse_color};
pub use synthesizer::{Frame, SynthOptions, synthesize, synthesize_frame};
pub use timing::{FADE_SECS, SceneClock, ScenePoint, frame_count, scene_opacity};
