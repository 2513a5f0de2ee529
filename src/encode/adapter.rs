//! Frames + optional audio → container bytes through one [`EncodeEngine`].
//!
//! Progress phases: preparing (staging inputs) 0..50, rendering (engine run) 50..90,
//! finalizing (output + thumbnail) 90..100.

use std::io::Cursor;

use crate::encode::engine::{AUDIO_INPUT, EncodeEngine, EncodeJob, JobPlan, frame_input_name};
use crate::encode::preset::{
    AudioCodec, ContainerFormat, QualityPreset, VideoCodec, check_compatibility,
};
use crate::encode::thumbnail::make_thumbnail;
use crate::foundation::core::Fps;
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::progress::ProgressTracker;
use crate::synth::Frame;

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodeState {
    Idle,
    Preparing,
    Rendering,
    Finalizing,
    Done,
    Failed,
}

impl EncodeState {
    /// Whether `self → next` is a legal step.
    pub fn can_transition(self, next: EncodeState) -> bool {
        matches!(
            (self, next),
            (_, Self::Failed)
                | (Self::Idle | Self::Done | Self::Failed, Self::Preparing)
                | (Self::Preparing, Self::Rendering)
                | (Self::Rendering, Self::Finalizing)
                | (Self::Finalizing, Self::Done)
        )
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderRequest {
    pub preset: QualityPreset,
    pub codec: VideoCodec,
    pub format: ContainerFormat,
    pub audio_codec: AudioCodec,
    /// Rate the frames were synthesized at; the preset rate when `None`.
    pub input_fps: Option<u32>,
    /// Output length in seconds; frame count over input rate when `None`.
    pub duration_secs: Option<f64>,
}

impl Default for RenderRequest {
    fn default() -> Self {
        Self {
            preset: QualityPreset::Medium,
            codec: VideoCodec::H264,
            format: ContainerFormat::Mp4,
            audio_codec: AudioCodec::Aac,
            input_fps: None,
            duration_secs: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RenderedVideo {
    pub bytes: Vec<u8>,
    /// JPEG still of the middle frame.
    pub thumbnail: Vec<u8>,
    pub format: ContainerFormat,
    pub codec: VideoCodec,
    pub duration_secs: f64,
    pub frame_count: usize,
}

pub struct EncoderAdapter<E: EncodeEngine> {
    engine: E,
    initialized: bool,
    state: EncodeState,
}

fn frame_dimensions(frame: &Frame) -> Option<(u32, u32)> {
    image::ImageReader::new(Cursor::new(&frame.image_bytes))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}

impl<E: EncodeEngine> EncoderAdapter<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            initialized: false,
            state: EncodeState::Idle,
        }
    }

    pub fn state(&self) -> EncodeState {
        self.state
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Initialize the engine; later calls are no-ops.
    pub fn init(&mut self) -> ReelResult<()> {
        if self.initialized {
            return Ok(());
        }
        self.engine.init()?;
        self.initialized = true;
        tracing::debug!("encode engine initialized");
        Ok(())
    }

    fn enter(&mut self, next: EncodeState) {
        debug_assert!(
            self.state.can_transition(next),
            "illegal encode transition {:?} -> {next:?}",
            self.state
        );
        tracing::debug!(from = ?self.state, to = ?next, "encode state");
        self.state = next;
    }

    /// Encode `frames` (and `audio`, if any) per `request`.
    ///
    /// Staged inputs are cleaned up whether or not the encode succeeds. Any failure moves the
    /// adapter to [`EncodeState::Failed`] and surfaces as [`ReelError::Encode`].
    #[tracing::instrument(skip(self, frames, audio, on_progress), fields(frames = frames.len()))]
    pub fn render(
        &mut self,
        frames: &[Frame],
        audio: Option<&[u8]>,
        request: &RenderRequest,
        on_progress: Option<&mut dyn FnMut(f64)>,
    ) -> ReelResult<RenderedVideo> {
        let mut progress = ProgressTracker::new(on_progress);
        self.enter(EncodeState::Preparing);

        let result = self.render_phases(frames, audio, request, &mut progress);
        if let Err(err) = self.engine.cleanup() {
            tracing::warn!(error = %err, "staged encode inputs were not fully removed");
        }

        match result {
            Ok(video) => {
                self.enter(EncodeState::Done);
                progress.report(100.0);
                tracing::info!(
                    bytes = video.bytes.len(),
                    format = %video.format,
                    "video encoded"
                );
                Ok(video)
            }
            Err(err) => {
                self.enter(EncodeState::Failed);
                tracing::error!(error = %err, "encode failed");
                Err(err.into_encode())
            }
        }
    }

    fn render_phases(
        &mut self,
        frames: &[Frame],
        audio: Option<&[u8]>,
        request: &RenderRequest,
        progress: &mut ProgressTracker<'_>,
    ) -> ReelResult<RenderedVideo> {
        if frames.is_empty() {
            return Err(ReelError::validation("cannot encode zero frames"));
        }
        let audio = audio.filter(|a| !a.is_empty());
        let audio_codec = audio.map(|_| request.audio_codec);
        check_compatibility(request.format, request.codec, audio_codec)?;
        let preset = request.preset.spec();
        if !preset.width.is_multiple_of(2) || !preset.height.is_multiple_of(2) {
            return Err(ReelError::validation("output width/height must be even"));
        }
        let input_fps = Fps::integer(request.input_fps.unwrap_or(preset.fps))?;
        let duration_secs = request
            .duration_secs
            .unwrap_or_else(|| input_fps.frames_to_secs(frames.len() as u64));

        self.init()?;

        progress.report(0.0);
        let total = frames.len() + usize::from(audio.is_some());
        for (i, frame) in frames.iter().enumerate() {
            self.engine.write_input(&frame_input_name(i), &frame.image_bytes)?;
            progress.report_within(0.0, 50.0, (i + 1) as f64 / total as f64);
        }
        if let Some(bytes) = audio {
            self.engine.write_input(AUDIO_INPUT, bytes)?;
        }
        progress.report(50.0);

        self.enter(EncodeState::Rendering);
        let job = EncodeJob::from_plan(&JobPlan {
            preset,
            codec: request.codec,
            format: request.format,
            audio: audio_codec,
            input_fps,
            frame_count: frames.len() as u64,
            frame_size: frame_dimensions(&frames[0]),
            duration_secs: request.duration_secs,
        });
        self.engine
            .run(&job, &mut |f: f64| progress.report_within(50.0, 90.0, f))?;
        progress.report(90.0);

        self.enter(EncodeState::Finalizing);
        let bytes = self.engine.read_output(&job.output)?;
        if bytes.is_empty() {
            return Err(ReelError::engine("encoder produced an empty output"));
        }
        progress.report(95.0);
        let thumbnail = make_thumbnail(frames)?;

        Ok(RenderedVideo {
            bytes,
            thumbnail,
            format: request.format,
            codec: request.codec,
            duration_secs,
            frame_count: frames.len(),
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/adapter.rs"]
mod tests;
