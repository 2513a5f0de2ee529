//! Immutable Document Model produced by the assembler.
//!
//! Every type serializes with camelCase keys so parsed documents can be handed to other tools
//! as JSON.

use chrono::{DateTime, Utc};

pub use crate::package::theme::{ColorScheme, FontScheme, Theme};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Text,
    Image,
    Chart,
    Shape,
}

/// Reference to a media part inside the archive.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaRef {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Archive-relative path; empty when the relationship could not be resolved.
    pub url: String,
    pub filename: String,
    pub size: u64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum ElementContent {
    Text(String),
    Media(MediaRef),
}

impl ElementContent {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Media(_) => None,
        }
    }

    pub fn as_media(&self) -> Option<&MediaRef> {
        match self {
            Self::Media(m) => Some(m),
            Self::Text(_) => None,
        }
    }
}

/// Rectangle in inches.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Position {
    /// Used when a shape has no usable transform.
    pub const FALLBACK: Position = Position {
        x: 0.0,
        y: 0.0,
        w: 1.0,
        h: 1.0,
    };
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    pub content: ElementContent,
    pub position: Position,
    pub style: ElementStyle,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideLayout {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl Default for SlideLayout {
    fn default() -> Self {
        Self {
            name: "Default".to_owned(),
            kind: "content".to_owned(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideMetadata {
    /// Archive path of the slide part.
    pub source_part: String,
    /// True when the slide could not be parsed and holds the fallback element.
    pub degraded: bool,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    pub id: String,
    pub slide_number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub content: Vec<Element>,
    pub layout: SlideLayout,
    pub metadata: SlideMetadata,
}

impl Slide {
    /// Text of every text element, one per line.
    pub fn plain_text(&self) -> String {
        self.content
            .iter()
            .filter(|e| e.kind == ElementKind::Text)
            .filter_map(|e| e.content.as_text())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterSlide {
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub slide_count: usize,
    pub file_size: u64,
    /// SHA-256 of the archive bytes, lowercase hex.
    pub checksum: String,
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_version: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SlideSize {
    pub width: f64,
    pub height: f64,
    pub units: SizeUnits,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeUnits {
    Inches,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Landscape,
    Portrait,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSettings {
    pub slide_size: SlideSize,
    pub orientation: Orientation,
    pub start_slide: u32,
    pub show_slide_numbers: bool,
    pub show_notes: bool,
    pub read_only: bool,
}

impl Default for DocumentSettings {
    fn default() -> Self {
        Self {
            slide_size: SlideSize {
                width: 10.0,
                height: 7.5,
                units: SizeUnits::Inches,
            },
            orientation: Orientation::Landscape,
            start_slide: 1,
            show_slide_numbers: false,
            show_notes: false,
            read_only: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub filename: String,
    pub title: String,
    pub author: String,
    /// Sorted strictly ascending by `slide_number`.
    pub slides: Vec<Slide>,
    pub master_slides: Vec<MasterSlide>,
    pub themes: Vec<Theme>,
    pub metadata: DocumentMetadata,
    pub settings: DocumentSettings,
}

impl Document {
    pub fn slide(&self, number: u32) -> Option<&Slide> {
        self.slides
            .binary_search_by_key(&number, |s| s.slide_number)
            .ok()
            .map(|i| &self.slides[i])
    }
}

/// Result of the lightweight preview entry point.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickPreview {
    pub slide_count: usize,
    pub title: String,
    pub thumbnail_refs: Vec<String>,
}

#[cfg(test)]
#[path = "../../tests/unit/deck/model.rs"]
mod tests;
