use anyhow::Context;
use image::ImageEncoder;

use crate::foundation::error::{ReelError, ReelResult};
use crate::synth::Frame;

pub const THUMBNAIL_MAX_WIDTH: u32 = 320;
pub const THUMBNAIL_MAX_HEIGHT: u32 = 180;
const JPEG_QUALITY: u8 = 80;

/// JPEG still of the middle frame, downsized to fit 320×180 with its aspect ratio kept.
pub fn make_thumbnail(frames: &[Frame]) -> ReelResult<Vec<u8>> {
    let frame = frames
        .get(frames.len() / 2)
        .ok_or_else(|| ReelError::validation("cannot build a thumbnail from zero frames"))?;
    let img = image::load_from_memory(&frame.image_bytes).context("decode thumbnail frame")?;
    let small = if img.width() > THUMBNAIL_MAX_WIDTH || img.height() > THUMBNAIL_MAX_HEIGHT {
        img.thumbnail(THUMBNAIL_MAX_WIDTH, THUMBNAIL_MAX_HEIGHT)
    } else {
        img
    };
    let rgb = small.to_rgb8();

    let mut out = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY)
        .write_image(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            image::ExtendedColorType::Rgb8,
        )
        .context("encode thumbnail jpeg")?;
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/thumbnail.rs"]
mod tests;
