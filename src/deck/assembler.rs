//! Archive bytes → [`Document`].
//!
//! `parse_file` walks fixed stages and reports progress after each one:
//!
//! | stage                              | progress |
//! |------------------------------------|----------|
//! | start                              | 10       |
//! | archive opened                     | 20       |
//! | relationships + themes             | 40       |
//! | properties + settings + masters    | 60       |
//! | slides, per chunk                  | 60..95   |
//! | document assembled                 | 100      |
//!
//! Slides are parsed in chunks (optionally in parallel); progress is reported on the calling
//! thread between chunks. One slide failing never fails the document.

use rayon::prelude::*;
use sha2::Digest;

use crate::deck::context::ParseContext;
use crate::deck::model::{Document, DocumentMetadata, QuickPreview, Slide};
use crate::deck::props::{
    load_app_properties, load_core_properties, load_master_slides, load_settings,
    title_from_filename,
};
use crate::deck::shapes::{SlideOutcome, fallback_slide, parse_slide, slide_plain_text};
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::progress::ProgressTracker;
use crate::foundation::threading::{WorkerPool, normalized_chunk_size};
use crate::package::archive::Archive;
use crate::package::rels::RelationshipMap;
use crate::package::theme::load_themes;
use crate::package::{PRESENTATION_XML, sorted_slide_paths};

const DEFAULT_AUTHOR: &str = "Unknown";
const DEFAULT_LANGUAGE: &str = "en-US";
const PREVIEW_TITLE: &str = "Presentation";
const PREVIEW_SLIDE_REFS: usize = 3;

/// Slide-parsing parallelism.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    pub parallel: bool,
    /// Slides per chunk; progress is reported once per chunk.
    pub chunk_size: usize,
    /// Dedicated worker count; `None` uses the global rayon pool.
    pub threads: Option<usize>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            chunk_size: 16,
            threads: None,
        }
    }
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        out.push_str(&format!("{:02x}", b));
    }
    out
}

/// Parse a full document with default options.
pub fn parse_file(
    bytes: &[u8],
    filename: &str,
    on_progress: Option<&mut dyn FnMut(f64)>,
) -> ReelResult<Document> {
    parse_file_with(bytes, filename, &ParseOptions::default(), on_progress)
}

#[tracing::instrument(skip(bytes, options, on_progress), fields(bytes = bytes.len()))]
pub fn parse_file_with(
    bytes: &[u8],
    filename: &str,
    options: &ParseOptions,
    on_progress: Option<&mut dyn FnMut(f64)>,
) -> ReelResult<Document> {
    let mut progress = ProgressTracker::new(on_progress);
    let doc = assemble(bytes, filename, options, &mut progress).map_err(|err| {
        tracing::error!(error = %err, "document parse failed");
        err.into_parse()
    })?;
    tracing::info!(slides = doc.slides.len(), "document parsed");
    Ok(doc)
}

fn open_for_parse(bytes: &[u8]) -> ReelResult<Archive> {
    let archive = Archive::open(bytes.to_vec())?;
    if !archive.contains(PRESENTATION_XML) {
        return Err(ReelError::archive(format!(
            "required part '{PRESENTATION_XML}' is missing"
        )));
    }
    Ok(archive)
}

fn assemble(
    bytes: &[u8],
    filename: &str,
    options: &ParseOptions,
    progress: &mut ProgressTracker<'_>,
) -> ReelResult<Document> {
    progress.report(10.0);
    let archive = open_for_parse(bytes)?;
    tracing::debug!(entries = archive.entry_count(), "archive opened");
    progress.report(20.0);

    let (rels, themes) = rayon::join(
        || RelationshipMap::load(&archive),
        || load_themes(&archive),
    );
    progress.report(40.0);

    let ((core, app), (settings, master_slides)) = rayon::join(
        || (load_core_properties(&archive), load_app_properties(&archive)),
        || (load_settings(&archive), load_master_slides(&archive)),
    );
    let checksum = sha256_hex(bytes);
    progress.report(60.0);

    let ctx = ParseContext::new(archive, rels, themes);
    let slides = extract_slides(&ctx, options, progress)?;
    progress.report(95.0);

    let created_at = core.created.unwrap_or_else(chrono::Utc::now);
    let title = core
        .title
        .clone()
        .or_else(|| core.subject.clone())
        .unwrap_or_else(|| title_from_filename(filename));

    let doc = Document {
        id: uuid::Uuid::new_v4().to_string(),
        filename: filename.to_owned(),
        title,
        author: core.creator.unwrap_or_else(|| DEFAULT_AUTHOR.to_owned()),
        master_slides,
        themes: ctx.themes.clone(),
        metadata: DocumentMetadata {
            created_at,
            updated_at: core.modified.unwrap_or(created_at),
            slide_count: slides.len(),
            file_size: bytes.len() as u64,
            checksum,
            language: core.language.unwrap_or_else(|| DEFAULT_LANGUAGE.to_owned()),
            subject: core.subject,
            description: core.description,
            app_version: app.app_version,
        },
        settings,
        slides,
    };
    progress.report(100.0);
    Ok(doc)
}

fn parse_one(ctx: &ParseContext, slide_number: u32, path: &str) -> Slide {
    let outcome = ctx
        .archive
        .read_text(path)
        .and_then(|xml| parse_slide(ctx, slide_number, path, &xml));
    match outcome {
        Ok(SlideOutcome::Parsed(slide)) => slide,
        Ok(SlideOutcome::Degraded { slide, issues }) => {
            tracing::debug!(slide = slide_number, ?issues, "slide parsed with fallbacks");
            slide
        }
        Err(err) => {
            tracing::warn!(slide = slide_number, error = %err, "slide replaced with fallback");
            fallback_slide(slide_number, path)
        }
    }
}

fn extract_slides(
    ctx: &ParseContext,
    options: &ParseOptions,
    progress: &mut ProgressTracker<'_>,
) -> ReelResult<Vec<Slide>> {
    let paths = sorted_slide_paths(&ctx.archive);
    let total = paths.len();
    let chunk = normalized_chunk_size(options.chunk_size);
    let pool = WorkerPool::new(options.threads)?;

    let mut slides = Vec::with_capacity(total);
    for batch in paths.chunks(chunk) {
        let parsed: Vec<Slide> = if options.parallel {
            pool.install(|| {
                batch
                    .par_iter()
                    .map(|(n, path)| parse_one(ctx, *n, path))
                    .collect()
            })
        } else {
            batch
                .iter()
                .map(|(n, path)| parse_one(ctx, *n, path))
                .collect()
        };
        slides.extend(parsed);
        progress.report_within(60.0, 95.0, slides.len() as f64 / total as f64);
    }

    slides.sort_by_key(|s| s.slide_number);
    Ok(slides)
}

/// Slide count, title and thumbnail candidates without parsing any slide.
#[tracing::instrument(skip(bytes), fields(bytes = bytes.len()))]
pub fn quick_preview(bytes: &[u8]) -> ReelResult<QuickPreview> {
    let archive = Archive::open(bytes.to_vec()).map_err(ReelError::into_parse)?;
    let slides = sorted_slide_paths(&archive);

    let core = load_core_properties(&archive);
    let title = core
        .title
        .or(core.subject)
        .unwrap_or_else(|| PREVIEW_TITLE.to_owned());

    let mut thumbnail_refs: Vec<String> = archive
        .names()
        .iter()
        .filter(|n| n.starts_with("docProps/thumbnail."))
        .cloned()
        .collect();
    thumbnail_refs.extend(
        slides
            .iter()
            .take(PREVIEW_SLIDE_REFS)
            .map(|(_, path)| path.clone()),
    );

    Ok(QuickPreview {
        slide_count: slides.len(),
        title,
        thumbnail_refs,
    })
}

/// Plain text of every slide, in slide order. Unreadable slides yield an empty string.
#[tracing::instrument(skip(bytes), fields(bytes = bytes.len()))]
pub fn extract_all_text(bytes: &[u8]) -> ReelResult<Vec<String>> {
    let archive = Archive::open(bytes.to_vec()).map_err(ReelError::into_parse)?;
    let out = sorted_slide_paths(&archive)
        .into_par_iter()
        .map(|(n, path)| {
            archive
                .read_text(&path)
                .and_then(|xml| slide_plain_text(&xml))
                .unwrap_or_else(|err| {
                    tracing::warn!(slide = n, error = %err, "slide text unavailable");
                    String::new()
                })
        })
        .collect();
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/deck/assembler.rs"]
mod tests;
