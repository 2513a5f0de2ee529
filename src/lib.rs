#![forbid(unsafe_code)]
//! slidereel: slide-deck (PPTX) ingestion and timeline-to-video rendering.
//!
//! - [`deck`] turns archive bytes into an immutable [`Document`].
//! - [`validate`] runs structural pre-flight checks over the same bytes.
//! - [`timeline`] holds the [`Scene`] model and derives scenes from a document.
//! - [`synth`] rasterizes scenes into PNG [`Frame`]s.
//! - [`encode`] muxes frames and audio into a container through an [`EncodeEngine`].

pub mod deck;
pub mod encode;
pub mod foundation;
pub mod package;
pub mod store;
pub mod synth;
pub mod timeline;
pub mod validate;

pub use deck::{
    Document, Element, ElementContent, ElementKind, ParseOptions, QuickPreview, Slide,
    extract_all_text, parse_file, parse_file_with, quick_preview,
};
pub use encode::{
    AudioCodec, ContainerFormat, EncodeEngine, EncodeState, EncoderAdapter, FfmpegEngine,
    QualityPreset, RenderRequest, RenderedVideo, VideoCodec, make_thumbnail,
};
pub use foundation::core::{Canvas, Fps, FrameIndex};
pub use foundation::error::{ReelError, ReelResult};
pub use store::{DirStore, MemoryStore, ObjectStore, PublishedRender, publish_render};
pub use synth::{Frame, SynthOptions, synthesize, synthesize_frame};
pub use timeline::{Scene, SceneElement, TimelineOptions, scenes_from_document, scenes_from_json};
pub use validate::{ValidationOptions, ValidationReport, validate};
