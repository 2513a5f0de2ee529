//! The narrow seam between the adapter and whatever actually encodes.

use crate::encode::preset::{AudioCodec, ContainerFormat, PresetSpec, VideoCodec};
use crate::foundation::core::Fps;
use crate::foundation::error::ReelResult;

/// Input pattern for staged frames, numbered from zero.
pub const FRAME_PATTERN: &str = "frame_%06d.png";
pub const AUDIO_INPUT: &str = "audio.input";

pub fn frame_input_name(position: usize) -> String {
    format!("frame_{position:06}.png")
}

/// An encoding engine with one staging area for named inputs and outputs.
pub trait EncodeEngine {
    /// Make the engine usable. Called once before the first render.
    fn init(&mut self) -> ReelResult<()>;

    fn write_input(&mut self, name: &str, bytes: &[u8]) -> ReelResult<()>;

    /// Run `job` to completion. `on_progress` receives the encoded fraction in `[0, 1]`.
    fn run(&mut self, job: &EncodeJob, on_progress: &mut dyn FnMut(f64)) -> ReelResult<()>;

    fn read_output(&mut self, name: &str) -> ReelResult<Vec<u8>>;

    /// Remove staged inputs and outputs.
    fn cleanup(&mut self) -> ReelResult<()>;
}

/// A fully resolved encode command, relative to the engine's staging area.
#[derive(Clone, Debug, PartialEq)]
pub struct EncodeJob {
    pub args: Vec<String>,
    pub output: String,
    pub expected_frames: u64,
}

/// Everything needed to build an [`EncodeJob`].
#[derive(Clone, Debug, PartialEq)]
pub struct JobPlan {
    pub preset: PresetSpec,
    pub codec: VideoCodec,
    pub format: ContainerFormat,
    /// `None` when no audio is staged.
    pub audio: Option<AudioCodec>,
    pub input_fps: Fps,
    pub frame_count: u64,
    /// Source frame size, when known; scaled to the preset size if it differs.
    pub frame_size: Option<(u32, u32)>,
    pub duration_secs: Option<f64>,
}

impl EncodeJob {
    pub fn from_plan(plan: &JobPlan) -> Self {
        let p = plan.preset;
        let mut args: Vec<String> = Vec::new();
        let mut push = |items: &[&str]| args.extend(items.iter().map(|s| (*s).to_owned()));

        let in_rate = format!("{}/{}", plan.input_fps.num, plan.input_fps.den);
        push(&["-framerate", &in_rate, "-start_number", "0", "-i", FRAME_PATTERN]);
        if plan.audio.is_some() {
            push(&["-i", AUDIO_INPUT]);
        }

        push(plan.codec.encoder_args());
        let video_rate = format!("{}k", p.video_kbps);
        let out_rate = p.fps.to_string();
        push(&["-b:v", &video_rate, "-r", &out_rate]);
        if plan.frame_size != Some((p.width, p.height)) {
            let scale = format!("scale={}:{}", p.width, p.height);
            push(&["-vf", &scale]);
        }

        match plan.audio {
            Some(codec) => {
                let audio_rate = format!("{}k", p.audio_kbps);
                push(&["-c:a", codec.encoder(), "-b:a", &audio_rate, "-shortest"]);
            }
            None => push(&["-an"]),
        }
        if let Some(d) = plan.duration_secs.filter(|d| d.is_finite() && *d > 0.0) {
            let d = format!("{d:.3}");
            push(&["-t", &d]);
        }
        if plan.format.faststart() {
            push(&["-movflags", "+faststart"]);
        }

        let output = format!("output.{}", plan.format.extension());
        push(&["-f", plan.format.muxer(), &output]);

        Self {
            args,
            output,
            expected_frames: plan.frame_count,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/engine.rs"]
mod tests;
