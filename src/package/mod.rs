//! OPC container access: archive entries, XML parts, relationships and themes.

use std::sync::LazyLock;

use regex::Regex;

pub mod archive;
pub mod rels;
pub mod theme;
pub mod xml;

pub use archive::Archive;
pub use rels::{RelScope, Relationship, RelationshipMap};
pub use theme::{ColorScheme, FontScheme, Theme};
pub use xml::{XmlNode, parse_xml};

pub const PRESENTATION_XML: &str = "ppt/presentation.xml";
pub const PRESENTATION_RELS: &str = "ppt/_rels/presentation.xml.rels";
pub const CONTENT_TYPES: &str = "[Content_Types].xml";
pub const CORE_PROPS: &str = "docProps/core.xml";
pub const APP_PROPS: &str = "docProps/app.xml";

static SLIDE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ppt/slides/slide(\d+)\.xml$").expect("static regex"));
static SLIDE_RELS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ppt/slides/_rels/slide(\d+)\.xml\.rels$").expect("static regex")
});
static THEME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ppt/theme/theme\d+\.xml$").expect("static regex"));
static SLIDE_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"slide(\d+)\.xml").expect("static regex"));
static TRAILING_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\D*$").expect("static regex"));

/// Slide parts, `ppt/slides/slideN.xml`.
pub fn slide_pattern() -> &'static Regex {
    &SLIDE_RE
}

/// Per-slide relationship parts, `ppt/slides/_rels/slideN.xml.rels`.
pub fn slide_rels_pattern() -> &'static Regex {
    &SLIDE_RELS_RE
}

pub fn theme_pattern() -> &'static Regex {
    &THEME_RE
}

/// Slide number embedded in a slide or slide-rels path.
pub fn slide_number(path: &str) -> Option<u32> {
    SLIDE_NUMBER_RE
        .captures(path)?
        .get(1)?
        .as_str()
        .parse()
        .ok()
}

/// Last run of digits in `path`, used to order numbered parts (`theme10` after `theme2`).
pub(crate) fn trailing_number(path: &str) -> u64 {
    TRAILING_NUMBER_RE
        .captures(path)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// Slide part paths in part-number order, paired with their 1-based slide number.
///
/// Slide numbers run `1..=N` whatever the part names are (`slide0`, gaps). `slide01.xml` and
/// `slide1.xml` share a part number; the lexically first path wins.
pub fn sorted_slide_paths(archive: &Archive) -> Vec<(u32, String)> {
    let mut parts: Vec<(u32, String)> = archive
        .list_entries(slide_pattern())
        .into_iter()
        .filter_map(|p| slide_number(&p).map(|n| (n, p)))
        .collect();
    parts.sort();
    parts.dedup_by_key(|(n, _)| *n);
    (1u32..).zip(parts.into_iter().map(|(_, path)| path)).collect()
}

#[cfg(test)]
#[path = "../../tests/unit/package/mod.rs"]
mod tests;
