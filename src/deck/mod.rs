//! Slide-deck parsing: the Document Model and everything that builds it.

pub mod assembler;
pub mod context;
pub mod model;
pub mod props;
pub mod shapes;

pub use assembler::{
    ParseOptions, extract_all_text, parse_file, parse_file_with, quick_preview, sha256_hex,
};
pub use context::ParseContext;
pub use model::{
    Document, DocumentMetadata, DocumentSettings, Element, ElementContent, ElementKind,
    ElementStyle, MasterSlide, MediaRef, Orientation, Position, QuickPreview, Slide, SlideLayout,
    SlideMetadata, SlideSize,
};
pub use shapes::{ShapeNode, SlideOutcome};
