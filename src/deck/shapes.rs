//! Slide shape tree → positioned [`Element`]s.

use crate::deck::context::ParseContext;
use crate::deck::model::{
    Element, ElementContent, ElementKind, ElementStyle, MediaRef, Position, Slide, SlideLayout,
    SlideMetadata,
};
use crate::foundation::core::emu_to_inches;
use crate::foundation::error::{ReelError, ReelResult};
use crate::package::rels::RelScope;
use crate::package::xml::{XmlNode, parse_xml};

const DEFAULT_IMAGE_NAME: &str = "image.png";
const MAX_TITLE_CHARS: usize = 150;

/// The four shape kinds found in a slide's `p:spTree`.
#[derive(Clone, Copy, Debug)]
pub enum ShapeNode<'a> {
    Shape(&'a XmlNode),
    Picture(&'a XmlNode),
    Group(&'a XmlNode),
    GraphicFrame(&'a XmlNode),
}

impl<'a> ShapeNode<'a> {
    /// Classify a `p:spTree` child; non-shape children (`p:nvGrpSpPr`, connectors, ...) yield `None`.
    pub fn classify(node: &'a XmlNode) -> Option<Self> {
        match node.name.as_str() {
            "p:sp" => Some(Self::Shape(node)),
            "p:pic" => Some(Self::Picture(node)),
            "p:grpSp" => Some(Self::Group(node)),
            "p:graphicFrame" => Some(Self::GraphicFrame(node)),
            _ => None,
        }
    }

    pub fn kind(self) -> ElementKind {
        match self {
            Self::Shape(_) => ElementKind::Text,
            Self::Picture(_) => ElementKind::Image,
            Self::GraphicFrame(_) => ElementKind::Chart,
            Self::Group(_) => ElementKind::Shape,
        }
    }

    fn xfrm(self) -> Option<&'a XmlNode> {
        match self {
            Self::Shape(n) | Self::Picture(n) => n.path(&["p:spPr", "a:xfrm"]),
            Self::Group(n) => n.path(&["p:grpSpPr", "a:xfrm"]),
            Self::GraphicFrame(n) => n.child("p:xfrm"),
        }
    }
}

/// How a slide came out of [`parse_slide`].
#[derive(Clone, Debug)]
pub enum SlideOutcome {
    Parsed(Slide),
    /// Parsed, but some shapes needed a fallback value; `issues` says which.
    Degraded { slide: Slide, issues: Vec<String> },
}

impl SlideOutcome {
    pub fn into_slide(self) -> Slide {
        match self {
            Self::Parsed(slide) | Self::Degraded { slide, .. } => slide,
        }
    }
}

/// Text of a `p:sp`: runs concatenated, one newline per paragraph, then trimmed.
pub fn shape_text(shape: &XmlNode) -> String {
    let Some(body) = shape.child("p:txBody") else {
        return String::new();
    };
    let mut out = String::new();
    for para in body.children_named("a:p") {
        for run in para.children_named("a:r") {
            if let Some(t) = run.child("a:t") {
                out.push_str(&t.text);
            }
        }
        out.push('\n');
    }
    out.trim().to_owned()
}

fn ooxml_bool(v: &str) -> bool {
    matches!(v, "1" | "true" | "on")
}

/// Style of the first run of the first paragraph.
pub fn shape_style(shape: &XmlNode) -> ElementStyle {
    let Some(rpr) = shape.path(&["p:txBody", "a:p", "a:r", "a:rPr"]) else {
        return ElementStyle::default();
    };
    ElementStyle {
        font_size: rpr.attr_i64("sz").map(|sz| sz as f64 / 100.0),
        bold: rpr.attr("b").map(ooxml_bool),
        italic: rpr.attr("i").map(ooxml_bool),
    }
}

/// Offset/extent in EMU → inches. `Ok(None)` when there is no transform at all.
pub fn transform_position(xfrm: Option<&XmlNode>) -> ReelResult<Option<Position>> {
    let Some(xfrm) = xfrm else {
        return Ok(None);
    };
    let off = xfrm.child("a:off");
    let ext = xfrm.child("a:ext");
    let read = |node: Option<&XmlNode>, attr: &str| {
        node.and_then(|n| n.attr_i64(attr))
            .ok_or_else(|| ReelError::xml(format!("transform is missing a numeric '{attr}'")))
    };
    Ok(Some(Position {
        x: emu_to_inches(read(off, "x")?),
        y: emu_to_inches(read(off, "y")?),
        w: emu_to_inches(read(ext, "cx")?),
        h: emu_to_inches(read(ext, "cy")?),
    }))
}

fn picture_media(ctx: &ParseContext, scope: RelScope, pic: &XmlNode, id: String) -> MediaRef {
    let mut media = MediaRef {
        id,
        kind: "image".to_owned(),
        url: String::new(),
        filename: DEFAULT_IMAGE_NAME.to_owned(),
        size: 0,
    };
    let embed = pic
        .path(&["p:blipFill", "a:blip"])
        .and_then(|b| b.attr("r:embed"));
    if let Some(path) = embed.and_then(|rid| ctx.rels.target(scope, rid)) {
        media.url = path.to_owned();
        media.filename = path
            .rsplit('/')
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_IMAGE_NAME)
            .to_owned();
        media.size = ctx.archive.entry_size(path).unwrap_or(0);
    }
    media
}

fn group_text(group: &XmlNode) -> String {
    group
        .descendants("p:sp")
        .into_iter()
        .map(shape_text)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn extract_element(
    ctx: &ParseContext,
    scope: RelScope,
    shape: ShapeNode<'_>,
    id: String,
    issues: &mut Vec<String>,
) -> Element {
    let position = match transform_position(shape.xfrm()) {
        Ok(Some(p)) => p,
        Ok(None) => Position::FALLBACK,
        Err(err) => {
            issues.push(format!("{id}: {err}"));
            Position::FALLBACK
        }
    };
    let (content, style) = match shape {
        ShapeNode::Shape(n) => (ElementContent::Text(shape_text(n)), shape_style(n)),
        ShapeNode::Picture(n) => {
            let media = picture_media(ctx, scope, n, format!("{id}-media"));
            (ElementContent::Media(media), ElementStyle::default())
        }
        ShapeNode::Group(n) => (ElementContent::Text(group_text(n)), ElementStyle::default()),
        ShapeNode::GraphicFrame(_) => (ElementContent::Text(String::new()), ElementStyle::default()),
    };
    Element {
        id,
        kind: shape.kind(),
        content,
        position,
        style,
    }
}

/// First text element whose trimmed text is non-empty and under 150 chars; its first line.
pub fn slide_title(elements: &[Element]) -> Option<String> {
    elements
        .iter()
        .filter(|e| e.kind == ElementKind::Text)
        .filter_map(|e| e.content.as_text())
        .map(str::trim)
        .find(|t| !t.is_empty() && t.chars().count() < MAX_TITLE_CHARS)
        .and_then(|t| t.lines().next())
        .map(str::to_owned)
}

pub fn slide_id(slide_number: u32) -> String {
    format!("slide-{slide_number}")
}

/// Parse one slide part. Errors are slide-local; the caller decides on substitution.
pub fn parse_slide(
    ctx: &ParseContext,
    slide_number: u32,
    part_path: &str,
    xml: &str,
) -> ReelResult<SlideOutcome> {
    let root = parse_xml(xml)?;
    if !root.is("p:sld") {
        return Err(ReelError::xml(format!(
            "expected <p:sld> root, found <{}>",
            root.name
        )));
    }

    let sid = slide_id(slide_number);
    // Relationships are keyed by the part's own number, not the renumbered slide.
    let scope = RelScope::Slide(crate::package::slide_number(part_path).unwrap_or(slide_number));
    let mut issues = Vec::new();
    let mut content = Vec::new();
    if let Some(tree) = root.path(&["p:cSld", "p:spTree"]) {
        for shape in tree.children.iter().filter_map(ShapeNode::classify) {
            let id = format!("{sid}-el-{}", content.len());
            content.push(extract_element(ctx, scope, shape, id, &mut issues));
        }
    }

    let layout = SlideLayout {
        name: root
            .child("p:cSld")
            .and_then(|c| c.attr("name"))
            .filter(|n| !n.is_empty())
            .unwrap_or("Default")
            .to_owned(),
        ..SlideLayout::default()
    };

    let slide = Slide {
        id: sid,
        slide_number,
        title: slide_title(&content),
        content,
        layout,
        metadata: SlideMetadata {
            source_part: part_path.to_owned(),
            degraded: false,
        },
    };

    Ok(if issues.is_empty() {
        SlideOutcome::Parsed(slide)
    } else {
        SlideOutcome::Degraded { slide, issues }
    })
}

/// The single-element stand-in used when a slide cannot be parsed.
pub fn fallback_slide(slide_number: u32, part_path: &str) -> Slide {
    let sid = slide_id(slide_number);
    Slide {
        id: sid.clone(),
        slide_number,
        title: Some(format!("Slide {slide_number}")),
        content: vec![Element {
            id: format!("{sid}-el-0"),
            kind: ElementKind::Text,
            content: ElementContent::Text(format!("Slide {slide_number} could not be parsed")),
            position: Position {
                x: 1.0,
                y: 1.0,
                w: 8.0,
                h: 1.0,
            },
            style: ElementStyle {
                font_size: Some(24.0),
                ..ElementStyle::default()
            },
        }],
        layout: SlideLayout {
            name: "Fallback".to_owned(),
            ..SlideLayout::default()
        },
        metadata: SlideMetadata {
            source_part: part_path.to_owned(),
            degraded: true,
        },
    }
}

/// Plain text of a slide part without building elements: every `p:sp` text, space-joined.
pub fn slide_plain_text(xml: &str) -> ReelResult<String> {
    let root = parse_xml(xml)?;
    let Some(tree) = root.path(&["p:cSld", "p:spTree"]) else {
        return Ok(String::new());
    };
    let texts: Vec<String> = tree
        .descendants("p:sp")
        .into_iter()
        .map(shape_text)
        .filter(|t| !t.is_empty())
        .collect();
    Ok(texts.join(" "))
}

#[cfg(test)]
#[path = "../../tests/unit/deck/shapes.rs"]
mod tests;
