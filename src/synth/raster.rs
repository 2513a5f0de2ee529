//! One frame: background fill, element SVG through resvg, decoded images composited with
//! tiny-skia, then flattened and PNG-encoded.

use std::collections::HashMap;
use std::fmt::Write as _;

use anyhow::Context;
use base64::Engine as _;
use image::ImageEncoder;
use quick_xml::escape::escape;
use rayon::prelude::*;
use resvg::tiny_skia::{FilterQuality, IntSize, Pixmap, PixmapPaint, Transform};

use crate::foundation::core::Canvas;
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::mul_div255_u16;
use crate::synth::color::{Rgba8, color_or};
use crate::synth::timing::{ElementState, element_state};
use crate::timeline::scene::{Scene, SceneElement, SceneElementKind};

const TEXT_PADDING: f64 = 5.0;
const LINE_HEIGHT: f64 = 1.2;
/// Average glyph advance as a fraction of the font size, for wrapping.
const CHAR_WIDTH_EM: f64 = 0.55;
const SHAPE_FILL: &str = "#3b82f6";
const PLACEHOLDER_FILL: &str = "#f0f0f0";
const PLACEHOLDER_STROKE: &str = "#cccccc";
const PLACEHOLDER_TEXT: &str = "#666666";
const MAX_IMAGE_DIM: u32 = 16_384;

/// Decoded `src` images keyed by their URI; `None` marks sources that failed to decode.
#[derive(Default)]
pub struct ImageCache<'a> {
    images: HashMap<&'a str, Option<Pixmap>>,
}

impl<'a> ImageCache<'a> {
    /// Decode every distinct image source once, in parallel.
    pub fn build(scenes: impl IntoIterator<Item = &'a Scene>, svg_opts: &usvg::Options<'_>) -> Self {
        let mut sources: Vec<&'a str> = scenes
            .into_iter()
            .flat_map(|s| s.elements.iter())
            .filter(|e| e.kind == SceneElementKind::Image)
            .filter_map(|e| e.src.as_deref())
            .collect();
        sources.sort_unstable();
        sources.dedup();

        let images = sources
            .into_par_iter()
            .map(|src| {
                let decoded = decode_data_uri(src, svg_opts)
                    .map_err(|err| tracing::warn!(error = %err, "image source skipped"))
                    .ok();
                (src, decoded)
            })
            .collect();
        Self { images }
    }

    pub fn get(&self, src: &str) -> Option<&Pixmap> {
        self.images.get(src).and_then(Option::as_ref)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 {
            px[..3].fill(0);
            continue;
        }
        for c in &mut px[..3] {
            *c = mul_div255_u16(u16::from(*c), a) as u8;
        }
    }
}

/// `data:<mime>;base64,<payload>` → premultiplied pixmap. SVG payloads are rasterized at their
/// intrinsic size.
pub fn decode_data_uri(src: &str, svg_opts: &usvg::Options<'_>) -> ReelResult<Pixmap> {
    let rest = src
        .strip_prefix("data:")
        .ok_or_else(|| ReelError::render("image src is not a data URI"))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| ReelError::render("data URI has no payload"))?;
    let mime = meta
        .strip_suffix(";base64")
        .ok_or_else(|| ReelError::render("only base64 data URIs are supported"))?;
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .context("decode data URI payload")?;

    if mime.eq_ignore_ascii_case("image/svg+xml") {
        let tree = usvg::Tree::from_data(&bytes, svg_opts).context("parse svg image")?;
        let size = tree.size().to_int_size();
        let mut pixmap = Pixmap::new(size.width(), size.height())
            .ok_or_else(|| ReelError::render("failed to allocate svg image pixmap"))?;
        resvg::render(&tree, Transform::identity(), &mut pixmap.as_mut());
        return Ok(pixmap);
    }

    let rgba = image::load_from_memory(&bytes)
        .context("decode image from memory")?
        .to_rgba8();
    let (width, height) = rgba.dimensions();
    if width > MAX_IMAGE_DIM || height > MAX_IMAGE_DIM {
        return Err(ReelError::render(format!(
            "image too large: {width}x{height} (max {MAX_IMAGE_DIM})"
        )));
    }
    let mut data = rgba.into_raw();
    premultiply_rgba8_in_place(&mut data);
    let size = IntSize::from_wh(width, height)
        .ok_or_else(|| ReelError::render("image has zero size"))?;
    Pixmap::from_vec(data, size).ok_or_else(|| ReelError::render("image buffer size mismatch"))
}

/// Greedy word wrap to at most `max_chars` per line; explicit newlines are kept.
pub fn wrap_lines(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    for para in text.lines() {
        let mut line = String::new();
        let mut line_len = 0usize;
        for word in para.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > max_chars {
                if line_len > 0 {
                    lines.push(std::mem::take(&mut line));
                    line_len = 0;
                }
                lines.push(word.drain(..max_chars).collect());
            }
            let wlen = word.len();
            if wlen == 0 {
                continue;
            }
            if line_len > 0 && line_len + 1 + wlen > max_chars {
                lines.push(std::mem::take(&mut line));
                line_len = 0;
            }
            if line_len > 0 {
                line.push(' ');
                line_len += 1;
            }
            line.extend(word);
            line_len += wlen;
        }
        lines.push(line);
    }
    lines
}

fn push_text_block(
    svg: &mut String,
    el: &SceneElement,
    x: f64,
    text: &str,
    fill: &str,
    anchor_middle: bool,
) {
    let size = el.style.font_size.max(1.0);
    let inner_w = (el.width - 2.0 * TEXT_PADDING).max(size);
    let max_chars = (inner_w / (size * CHAR_WIDTH_EM)).floor() as usize;
    let line_h = size * LINE_HEIGHT;
    let lines = wrap_lines(text, max_chars);
    let max_lines = (((el.height - 2.0 * TEXT_PADDING) / line_h).floor() as usize).max(1);

    let weight = if el.style.bold { "bold" } else { "normal" };
    let style = if el.style.italic { "italic" } else { "normal" };
    let (tx, anchor) = if anchor_middle {
        (x + el.width / 2.0, "middle")
    } else {
        (x + TEXT_PADDING, "start")
    };
    let shown = lines.len().min(max_lines);
    let first_baseline = if anchor_middle {
        el.y + (el.height - shown as f64 * line_h) / 2.0 + size
    } else {
        el.y + TEXT_PADDING + size
    };

    let _ = write!(
        svg,
        r#"<text font-family="Arial, Helvetica, sans-serif" font-size="{size}" font-weight="{weight}" font-style="{style}" fill="{fill}" text-anchor="{anchor}">"#
    );
    for (i, line) in lines.iter().take(shown).enumerate() {
        let _ = write!(
            svg,
            r#"<tspan x="{tx}" y="{}">{}</tspan>"#,
            first_baseline + i as f64 * line_h,
            escape(line.as_str())
        );
    }
    svg.push_str("</text>");
}

fn push_placeholder(svg: &mut String, el: &SceneElement, x: f64, label: &str) {
    let _ = write!(
        svg,
        r#"<rect x="{x}" y="{}" width="{}" height="{}" fill="{PLACEHOLDER_FILL}" stroke="{PLACEHOLDER_STROKE}" stroke-width="1"/>"#,
        el.y, el.width, el.height
    );
    push_text_block(svg, el, x, label, PLACEHOLDER_TEXT, true);
}

/// SVG markup for one non-raster element at its resolved state.
pub fn element_svg(el: &SceneElement, state: ElementState) -> String {
    let mut svg = String::new();
    if state.opacity <= 0.0 || el.width <= 0.0 || el.height <= 0.0 {
        return svg;
    }
    let x = state.x;
    let _ = write!(svg, r#"<g opacity="{}">"#, state.opacity);
    let text_fill = color_or(&el.style.color, Rgba8::BLACK).svg_hex();

    match el.kind {
        SceneElementKind::Text => {
            if let Some(bg) = &el.style.background_color {
                let c = color_or(bg, Rgba8::WHITE);
                let _ = write!(
                    svg,
                    r#"<rect x="{x}" y="{}" width="{}" height="{}" fill="{}" fill-opacity="{}"/>"#,
                    el.y,
                    el.width,
                    el.height,
                    c.svg_hex(),
                    c.alpha_f64()
                );
            }
            push_text_block(&mut svg, el, x, &el.content, &text_fill, false);
        }
        SceneElementKind::Shape => {
            let fill = el.style.background_color.as_deref().unwrap_or(SHAPE_FILL);
            let c = color_or(fill, Rgba8::opaque(0x3b, 0x82, 0xf6));
            let _ = write!(
                svg,
                r#"<rect x="{x}" y="{}" width="{}" height="{}" fill="{}" fill-opacity="{}"/>"#,
                el.y,
                el.width,
                el.height,
                c.svg_hex(),
                c.alpha_f64()
            );
            if !el.content.trim().is_empty() {
                push_text_block(&mut svg, el, x, &el.content, &text_fill, true);
            }
        }
        SceneElementKind::Chart => {
            let label = if el.content.trim().is_empty() {
                "Chart"
            } else {
                el.content.as_str()
            };
            push_placeholder(&mut svg, el, x, label);
        }
        SceneElementKind::Image => push_placeholder(&mut svg, el, x, "Image"),
    }
    svg.push_str("</g>");
    svg
}

fn draw_svg_fragment(
    pixmap: &mut Pixmap,
    canvas: Canvas,
    body: &str,
    svg_opts: &usvg::Options<'_>,
) -> ReelResult<()> {
    if body.is_empty() {
        return Ok(());
    }
    let (w, h) = (canvas.width, canvas.height);
    let doc = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">{body}</svg>"#
    );
    let tree = usvg::Tree::from_str(&doc, svg_opts).context("parse scene svg")?;
    resvg::render(&tree, Transform::identity(), &mut pixmap.as_mut());
    Ok(())
}

fn draw_image(pixmap: &mut Pixmap, el: &SceneElement, state: ElementState, img: &Pixmap) {
    if state.opacity <= 0.0 || el.width <= 0.0 || el.height <= 0.0 {
        return;
    }
    let sx = (el.width / f64::from(img.width())) as f32;
    let sy = (el.height / f64::from(img.height())) as f32;
    let paint = PixmapPaint {
        opacity: state.opacity as f32,
        quality: FilterQuality::Bilinear,
        ..PixmapPaint::default()
    };
    let xform = Transform::from_row(sx, 0.0, 0.0, sy, state.x as f32, el.y as f32);
    pixmap.draw_pixmap(0, 0, img.as_ref(), &paint, xform, None);
}

/// Rasterize `scene` at `elapsed` seconds; `None` draws an empty white frame.
pub fn render_scene(
    scene: Option<(&Scene, f64)>,
    canvas: Canvas,
    images: &ImageCache<'_>,
    svg_opts: &usvg::Options<'_>,
) -> ReelResult<Pixmap> {
    let mut pixmap = Pixmap::new(canvas.width, canvas.height)
        .ok_or_else(|| ReelError::render("failed to allocate frame pixmap"))?;
    let Some((scene, elapsed)) = scene else {
        pixmap.fill(Rgba8::WHITE.to_skia());
        return Ok(pixmap);
    };
    pixmap.fill(color_or(&scene.background, Rgba8::WHITE).to_skia());

    // Consecutive vector elements share one SVG document; images break the run to keep paint
    // order.
    let mut run = String::new();
    for el in &scene.elements {
        let state = element_state(el, elapsed, scene.duration);
        let decoded = match (el.kind, el.src.as_deref()) {
            (SceneElementKind::Image, Some(src)) => images.get(src),
            _ => None,
        };
        match decoded {
            Some(img) => {
                draw_svg_fragment(&mut pixmap, canvas, &run, svg_opts)?;
                run.clear();
                draw_image(&mut pixmap, el, state, img);
            }
            None => run.push_str(&element_svg(el, state)),
        }
    }
    draw_svg_fragment(&mut pixmap, canvas, &run, svg_opts)?;
    Ok(pixmap)
}

fn flatten_premul_over_bg_to_opaque_rgba8(
    dst: &mut [u8],
    src_premul: &[u8],
    bg: Rgba8,
) -> ReelResult<()> {
    if dst.len() != src_premul.len() || !dst.len().is_multiple_of(4) {
        return Err(ReelError::render(
            "flatten expects equal-length rgba8 buffers",
        ));
    }
    let (bg_r, bg_g, bg_b) = (u16::from(bg.r), u16::from(bg.g), u16::from(bg.b));
    for (d, s) in dst.chunks_exact_mut(4).zip(src_premul.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }
        let inv = 255 - a;
        d[0] = (u16::from(s[0]) + mul_div255_u16(bg_r, inv)).min(255) as u8;
        d[1] = (u16::from(s[1]) + mul_div255_u16(bg_g, inv)).min(255) as u8;
        d[2] = (u16::from(s[2]) + mul_div255_u16(bg_b, inv)).min(255) as u8;
        d[3] = 255;
    }
    Ok(())
}

/// Flatten over white and PNG-encode.
pub fn encode_png(pixmap: &Pixmap) -> ReelResult<Vec<u8>> {
    let mut rgba = vec![0u8; pixmap.data().len()];
    flatten_premul_over_bg_to_opaque_rgba8(&mut rgba, pixmap.data(), Rgba8::WHITE)?;
    let mut out = Vec::new();
    image::codecs::png::PngEncoder::new(&mut out)
        .write_image(
            &rgba,
            pixmap.width(),
            pixmap.height(),
            image::ExtendedColorType::Rgba8,
        )
        .context("encode frame png")?;
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/synth/raster.rs"]
mod tests;
