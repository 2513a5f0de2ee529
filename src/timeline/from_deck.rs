//! Default timeline for a parsed [`Document`]: one scene per slide.

use base64::Engine as _;

use crate::deck::model::{Document, Element, ElementKind, Slide};
use crate::foundation::core::Canvas;
use crate::package::archive::Archive;
use crate::timeline::scene::{
    Animation, Scene, SceneAudio, SceneElement, SceneElementKind, SceneStyle, Transition,
};
use crate::validate::media::sniff_image;

const POINTS_PER_INCH: f64 = 72.0;
const DEFAULT_FONT_PT: f64 = 18.0;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TimelineOptions {
    /// Seconds each slide stays on screen.
    pub scene_duration: f64,
    pub transition: Transition,
    /// Embed slide pictures as `data:` URIs when the archive is available.
    pub embed_images: bool,
}

impl Default for TimelineOptions {
    fn default() -> Self {
        Self {
            scene_duration: 5.0,
            transition: Transition::default(),
            embed_images: true,
        }
    }
}

/// Inches → output pixels for one slide size.
#[derive(Clone, Copy, Debug, PartialEq)]
struct PixelScale {
    x: f64,
    y: f64,
}

impl PixelScale {
    fn new(doc: &Document, canvas: Canvas) -> Self {
        let size = doc.settings.slide_size;
        let per_axis = |px: u32, inches: f64| {
            if inches > 0.0 && inches.is_finite() {
                f64::from(px) / inches
            } else {
                f64::from(px) / 10.0
            }
        };
        Self {
            x: per_axis(canvas.width, size.width),
            y: per_axis(canvas.height, size.height),
        }
    }
}

fn mime_for(format: &str) -> Option<&'static str> {
    Some(match format {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => return None,
    })
}

/// `data:` URI for an archive part, or `None` when it is missing or not drawable.
pub fn data_uri_for(archive: &Archive, path: &str) -> Option<String> {
    if path.is_empty() {
        return None;
    }
    let bytes = match archive.read_binary(path) {
        Ok(b) => b,
        Err(err) => {
            tracing::warn!(part = path, error = %err, "media part unreadable; image dropped");
            return None;
        }
    };
    let Some(mime) = sniff_image(&bytes).and_then(mime_for) else {
        tracing::debug!(part = path, "media part is not a drawable image");
        return None;
    };
    let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
    Some(format!("data:{mime};base64,{encoded}"))
}

fn scene_element(
    el: &Element,
    archive: Option<&Archive>,
    scale: PixelScale,
    text_color: &str,
    options: &TimelineOptions,
) -> SceneElement {
    let kind = match el.kind {
        ElementKind::Text => SceneElementKind::Text,
        ElementKind::Image => SceneElementKind::Image,
        ElementKind::Chart => SceneElementKind::Chart,
        ElementKind::Shape => SceneElementKind::Shape,
    };
    let src = match (el.content.as_media(), archive) {
        (Some(media), Some(archive)) if options.embed_images => data_uri_for(archive, &media.url),
        _ => None,
    };
    let font_pt = el.style.font_size.unwrap_or(DEFAULT_FONT_PT);

    SceneElement {
        id: el.id.clone(),
        kind,
        content: el.content.as_text().unwrap_or_default().to_owned(),
        x: el.position.x * scale.x,
        y: el.position.y * scale.y,
        width: el.position.w * scale.x,
        height: el.position.h * scale.y,
        style: SceneStyle {
            font_size: font_pt / POINTS_PER_INCH * scale.y,
            color: text_color.to_owned(),
            background_color: None,
            bold: el.style.bold.unwrap_or(false),
            italic: el.style.italic.unwrap_or(false),
            opacity: 1.0,
        },
        src,
        animation: Animation::default(),
    }
}

fn scene_for_slide(
    slide: &Slide,
    archive: Option<&Archive>,
    scale: PixelScale,
    colors: (&str, &str),
    options: &TimelineOptions,
) -> Scene {
    let (background, text_color) = colors;
    Scene {
        id: format!("scene-{}", slide.slide_number),
        title: slide
            .title
            .clone()
            .unwrap_or_else(|| format!("Slide {}", slide.slide_number)),
        content: slide.plain_text(),
        duration: options.scene_duration,
        transition: options.transition.clone(),
        background: background.to_owned(),
        elements: slide
            .content
            .iter()
            .map(|el| scene_element(el, archive, scale, text_color, options))
            .collect(),
        audio: SceneAudio::default(),
    }
}

/// Derive scenes from `doc`, scaled to `canvas`.
///
/// Pass the source `archive` to embed pictures; without it image elements carry no `src` and
/// draw as placeholders.
pub fn scenes_from_document(
    doc: &Document,
    archive: Option<&Archive>,
    canvas: Canvas,
    options: &TimelineOptions,
) -> Vec<Scene> {
    let scale = PixelScale::new(doc, canvas);
    let scheme = doc
        .themes
        .first()
        .map(|t| t.color_scheme.clone())
        .unwrap_or_default();
    let colors = (scheme.background1.as_str(), scheme.text1.as_str());

    doc.slides
        .iter()
        .map(|slide| scene_for_slide(slide, archive, scale, colors, options))
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/from_deck.rs"]
mod tests;
