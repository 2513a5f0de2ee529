use std::collections::BTreeSet;

use rayon::prelude::*;

use crate::foundation::core::{Canvas, Fps, FrameIndex};
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::progress::ProgressTracker;
use crate::foundation::threading::{WorkerPool, normalized_chunk_size};
use crate::synth::color::parse_color;
use crate::synth::fonts::svg_options;
use crate::synth::raster::{ImageCache, encode_png, render_scene};
use crate::synth::timing::{SceneClock, frame_count, frame_timestamp};
use crate::timeline::scene::{Scene, validate_scenes};

/// One rasterized frame.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub index: u64,
    pub timestamp_seconds: f64,
    /// PNG-encoded, opaque RGBA.
    pub image_bytes: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SynthOptions {
    pub parallel: bool,
    /// Frames per chunk; progress is reported once per chunk.
    pub chunk_size: usize,
    /// Dedicated worker count; `None` uses the global rayon pool.
    pub threads: Option<usize>,
}

impl Default for SynthOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            chunk_size: 32,
            threads: None,
        }
    }
}

/// Warn once per distinct color string the rasterizer will have to replace.
fn report_unparsable_colors(scenes: &[Scene]) -> usize {
    let colors = scenes.iter().flat_map(|scene| {
        std::iter::once(scene.background.as_str()).chain(scene.elements.iter().flat_map(|el| {
            std::iter::once(el.style.color.as_str()).chain(el.style.background_color.as_deref())
        }))
    });
    let bad: BTreeSet<&str> = colors.filter(|c| parse_color(c).is_err()).collect();
    for color in &bad {
        tracing::warn!(color, "unparsable color; a fallback will be drawn");
    }
    bad.len()
}

fn render_index(
    clock: &SceneClock<'_>,
    fps: Fps,
    canvas: Canvas,
    images: &ImageCache<'_>,
    svg_opts: &usvg::Options<'_>,
    index: u64,
) -> ReelResult<Frame> {
    let t = frame_timestamp(fps, FrameIndex(index));
    let at = clock
        .locate(t)
        .map(|p| (&clock.scenes()[p.scene], p.elapsed));
    let pixmap = render_scene(at, canvas, images, svg_opts)?;
    Ok(Frame {
        index,
        timestamp_seconds: t,
        image_bytes: encode_png(&pixmap)?,
    })
}

/// Rasterize the whole timeline: `ceil(total × fps)` frames, where `total` defaults to the sum
/// of scene durations.
#[tracing::instrument(skip(scenes, options, on_progress), fields(scenes = scenes.len()))]
pub fn synthesize(
    scenes: &[Scene],
    fps: Fps,
    canvas: Canvas,
    total_duration: Option<f64>,
    options: &SynthOptions,
    on_progress: Option<&mut dyn FnMut(f64)>,
) -> ReelResult<Vec<Frame>> {
    validate_scenes(scenes)?;
    if let Some(d) = total_duration
        && !(d.is_finite() && d >= 0.0)
    {
        return Err(ReelError::validation("total duration must be finite and >= 0"));
    }

    let mut progress = ProgressTracker::new(on_progress);
    let count = usize::try_from(frame_count(scenes, fps, total_duration))
        .map_err(|_| ReelError::validation("frame count does not fit in memory"))?;
    report_unparsable_colors(scenes);
    let clock = SceneClock::new(scenes);
    let images = ImageCache::build(scenes, &svg_options());
    let pool = WorkerPool::new(options.threads)?;
    let chunk = normalized_chunk_size(options.chunk_size);
    tracing::debug!(frames = count, images = images.len(), "synthesis planned");

    let mut frames = Vec::with_capacity(count);
    let mut start = 0usize;
    while start < count {
        let end = (start + chunk).min(count);
        let batch: ReelResult<Vec<Frame>> = if options.parallel {
            pool.install(|| {
                (start..end)
                    .into_par_iter()
                    .map_init(svg_options, |opts, i| {
                        render_index(&clock, fps, canvas, &images, opts, i as u64)
                    })
                    .collect()
            })
        } else {
            let opts = svg_options();
            (start..end)
                .map(|i| render_index(&clock, fps, canvas, &images, &opts, i as u64))
                .collect()
        };
        frames.extend(batch?);
        progress.report(frames.len() as f64 / count as f64 * 100.0);
        start = end;
    }

    progress.report(100.0);
    tracing::info!(frames = frames.len(), "timeline synthesized");
    Ok(frames)
}

/// Rasterize frame `index` alone; identical to the same frame from [`synthesize`].
pub fn synthesize_frame(
    scenes: &[Scene],
    fps: Fps,
    canvas: Canvas,
    index: FrameIndex,
) -> ReelResult<Frame> {
    validate_scenes(scenes)?;
    let clock = SceneClock::new(scenes);
    let opts = svg_options();
    let scene = clock
        .locate(frame_timestamp(fps, index))
        .map(|p| &scenes[p.scene]);
    let images = ImageCache::build(scene, &opts);
    render_index(&clock, fps, canvas, &images, &opts, index.0)
}

#[cfg(test)]
#[path = "../../tests/unit/synth/synthesizer.rs"]
mod tests;
