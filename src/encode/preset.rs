//! Quality presets, codecs, containers and which combinations mux together.

use std::fmt;
use std::str::FromStr;

use crate::foundation::error::{ReelError, ReelResult};

/// Output geometry and bitrates for one quality level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PresetSpec {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub video_kbps: u32,
    pub audio_kbps: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
    Ultra,
    #[serde(rename = "4k")]
    Uhd4k,
    #[serde(rename = "8k")]
    Uhd8k,
}

impl QualityPreset {
    pub const ALL: [QualityPreset; 6] = [
        Self::Low,
        Self::Medium,
        Self::High,
        Self::Ultra,
        Self::Uhd4k,
        Self::Uhd8k,
    ];

    pub fn spec(self) -> PresetSpec {
        let (width, height, fps, video_kbps, audio_kbps) = match self {
            Self::Low => (854, 480, 30, 1_000, 96),
            Self::Medium => (1280, 720, 30, 2_500, 128),
            Self::High => (1920, 1080, 30, 5_000, 192),
            Self::Ultra => (1920, 1080, 60, 8_000, 256),
            Self::Uhd4k => (3840, 2160, 30, 20_000, 320),
            Self::Uhd8k => (7680, 4320, 30, 50_000, 320),
        };
        PresetSpec {
            width,
            height,
            fps,
            video_kbps,
            audio_kbps,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Ultra => "ultra",
            Self::Uhd4k => "4k",
            Self::Uhd8k => "8k",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoCodec {
    #[default]
    H264,
    H265,
    Vp9,
    Prores,
}

impl VideoCodec {
    /// Encoder selection and pixel format, as engine arguments.
    pub fn encoder_args(self) -> &'static [&'static str] {
        match self {
            Self::H264 => &["-c:v", "libx264", "-preset", "medium", "-pix_fmt", "yuv420p"],
            Self::H265 => &["-c:v", "libx265", "-tag:v", "hvc1", "-pix_fmt", "yuv420p"],
            Self::Vp9 => &["-c:v", "libvpx-vp9", "-row-mt", "1", "-pix_fmt", "yuv420p"],
            Self::Prores => &[
                "-c:v",
                "prores_ks",
                "-profile:v",
                "3",
                "-pix_fmt",
                "yuv422p10le",
            ],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::H264 => "h264",
            Self::H265 => "h265",
            Self::Vp9 => "vp9",
            Self::Prores => "prores",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioCodec {
    #[default]
    Aac,
    Mp3,
    Opus,
}

impl AudioCodec {
    pub fn encoder(self) -> &'static str {
        match self {
            Self::Aac => "aac",
            Self::Mp3 => "libmp3lame",
            Self::Opus => "libopus",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Aac => "aac",
            Self::Mp3 => "mp3",
            Self::Opus => "opus",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerFormat {
    #[default]
    Mp4,
    Webm,
    Avi,
    Mov,
}

impl ContainerFormat {
    pub fn extension(self) -> &'static str {
        self.as_str()
    }

    /// Muxer name passed to `-f`.
    pub fn muxer(self) -> &'static str {
        self.as_str()
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Mp4 => "video/mp4",
            Self::Webm => "video/webm",
            Self::Avi => "video/x-msvideo",
            Self::Mov => "video/quicktime",
        }
    }

    /// Moves the index to the front for progressive playback.
    pub fn faststart(self) -> bool {
        matches!(self, Self::Mp4 | Self::Mov)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Webm => "webm",
            Self::Avi => "avi",
            Self::Mov => "mov",
        }
    }
}

macro_rules! display_from_str {
    ($ty:ty, $what:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = ReelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                serde_json::from_value(serde_json::Value::String(s.to_ascii_lowercase()))
                    .map_err(|_| ReelError::validation(format!("unknown {} '{s}'", $what)))
            }
        }
    };
}

display_from_str!(QualityPreset, "quality preset");
display_from_str!(VideoCodec, "video codec");
display_from_str!(AudioCodec, "audio codec");
display_from_str!(ContainerFormat, "container format");

/// Reject codec/container pairs the muxers cannot carry.
pub fn check_compatibility(
    format: ContainerFormat,
    codec: VideoCodec,
    audio: Option<AudioCodec>,
) -> ReelResult<()> {
    let incompatible =
        |why: &str| ReelError::validation(format!("{codec} in {format}: {why}"));
    if format == ContainerFormat::Webm {
        if codec != VideoCodec::Vp9 {
            return Err(incompatible("webm requires vp9 video"));
        }
        if let Some(a) = audio
            && a != AudioCodec::Opus
        {
            return Err(incompatible("webm requires opus audio"));
        }
    }
    if codec == VideoCodec::Prores && format != ContainerFormat::Mov {
        return Err(incompatible("prores requires a mov container"));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/preset.rs"]
mod tests;
