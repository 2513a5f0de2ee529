//! Frames → encoded video through a pluggable engine.

pub mod adapter;
pub mod engine;
pub mod ffmpeg;
pub mod preset;
pub mod thumbnail;

pub use adapter::{EncodeState, EncoderAdapter, RenderRequest, RenderedVideo};
pub use engine::{EncodeEngine, EncodeJob, JobPlan};
pub use ffmpeg::{FfmpegEngine, is_ffmpeg_available};
pub use preset::{
    AudioCodec, ContainerFormat, PresetSpec, QualityPreset, VideoCodec, check_compatibility,
};
pub use thumbnail::make_thumbnail;
