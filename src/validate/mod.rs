//! Structural pre-flight checks over deck archive bytes.
//!
//! Independent of the assembler: every check runs and contributes to one
//! [`ValidationReport`]; nothing short-circuits on the first failure. Only checks that need an
//! open archive are skipped when the archive cannot be opened.

use std::panic::{AssertUnwindSafe, catch_unwind};

use rayon::prelude::*;
use serde_json::json;

use crate::package::archive::Archive;
use crate::package::xml::check_well_formed;
use crate::package::{CONTENT_TYPES, PRESENTATION_RELS, PRESENTATION_XML, sorted_slide_paths};

pub mod media;
pub mod report;

pub use report::{Issue, IssueCode, ValidationReport};

const SMALL_IMAGE_BYTES: usize = 100;

/// Entries that must exist; directory entries match any path beneath them.
const REQUIRED_ENTRIES: &[&str] = &[
    PRESENTATION_XML,
    PRESENTATION_RELS,
    "ppt/slides/",
    "ppt/slides/_rels/",
    CONTENT_TYPES,
];

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ValidationOptions {
    pub max_file_size: u64,
    pub max_slides: usize,
    /// Lowercase extensions, without the dot.
    pub allowed_image_extensions: Vec<String>,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            max_file_size: 50 * 1024 * 1024,
            max_slides: 100,
            allowed_image_extensions: ["png", "jpg", "jpeg", "gif", "bmp", "svg", "webp"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
        }
    }
}

#[derive(Default)]
struct Findings {
    errors: Vec<Issue>,
    warnings: Vec<Issue>,
}

impl Findings {
    fn merge(&mut self, other: Findings) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}

/// Run `inspect` for one entry; a panic inside it becomes a `VALIDATION_ERROR`.
fn guarded(path: &str, inspect: impl FnOnce() -> Findings) -> Findings {
    catch_unwind(AssertUnwindSafe(inspect)).unwrap_or_else(|_| Findings {
        errors: vec![
            Issue::new(
                IssueCode::ValidationError,
                format!("unexpected failure while inspecting '{path}'"),
            )
            .with_details(json!({ "entry": path })),
        ],
        warnings: Vec::new(),
    })
}

fn check_size(len: usize, options: &ValidationOptions, out: &mut Findings) {
    if len as u64 > options.max_file_size {
        out.errors.push(
            Issue::new(
                IssueCode::FileTooLarge,
                format!(
                    "file is {len} bytes; the limit is {} bytes",
                    options.max_file_size
                ),
            )
            .with_details(json!({ "size": len, "maxSize": options.max_file_size })),
        );
    }
}

fn check_required(archive: &Archive, out: &mut Findings) {
    for entry in REQUIRED_ENTRIES {
        let present = if entry.ends_with('/') {
            archive.has_prefix(entry)
        } else {
            archive.contains(entry)
        };
        if !present {
            out.errors.push(
                Issue::new(
                    IssueCode::MissingRequiredFile,
                    format!("required entry '{entry}' is missing"),
                )
                .with_details(json!({ "entry": entry })),
            );
        }
    }
}

fn check_xml_entry(archive: &Archive, path: &str) -> Findings {
    let mut out = Findings::default();
    match archive.read_text(path) {
        Err(err) => out.errors.push(
            Issue::new(
                IssueCode::XmlReadError,
                format!("cannot read '{path}': {err}"),
            )
            .with_details(json!({ "entry": path })),
        ),
        Ok(text) => {
            if let Err(err) = check_well_formed(&text) {
                out.errors.push(
                    Issue::new(
                        IssueCode::InvalidXml,
                        format!("'{path}' is not well-formed: {err}"),
                    )
                    .with_details(json!({ "entry": path })),
                );
            }
        }
    }
    out
}

fn check_media_entry(archive: &Archive, path: &str, ext: &str, options: &ValidationOptions) -> Findings {
    let mut out = Findings::default();
    if !options.allowed_image_extensions.iter().any(|a| a == ext) {
        out.errors.push(
            Issue::new(
                IssueCode::InvalidImageType,
                if ext.is_empty() {
                    format!("'{path}' has no file extension")
                } else {
                    format!("'{path}' has disallowed image type '{ext}'")
                },
            )
            .with_details(json!({ "entry": path, "extension": ext })),
        );
        return out;
    }

    let bytes = match archive.read_binary(path) {
        Ok(b) => b,
        Err(err) => {
            out.errors.push(
                Issue::new(
                    IssueCode::ImageReadError,
                    format!("cannot read '{path}': {err}"),
                )
                .with_details(json!({ "entry": path })),
            );
            return out;
        }
    };

    if bytes.len() < SMALL_IMAGE_BYTES {
        out.warnings.push(
            Issue::new(
                IssueCode::SmallImage,
                format!("'{path}' is only {} bytes", bytes.len()),
            )
            .with_details(json!({ "entry": path, "size": bytes.len() })),
        );
    }
    if media::sniff_image(&bytes).is_none() {
        out.errors.push(
            Issue::new(
                IssueCode::CorruptImage,
                format!("'{path}' does not start with a known image signature"),
            )
            .with_details(json!({ "entry": path })),
        );
    }
    out
}

fn is_xml_part(path: &str) -> bool {
    path.ends_with(".xml") || path.ends_with(".rels")
}

fn check_entries(archive: &Archive, options: &ValidationOptions) -> Findings {
    let per_entry: Vec<Findings> = archive
        .names()
        .par_iter()
        .filter(|p| !p.ends_with('/'))
        .filter_map(|path| {
            if is_xml_part(path) {
                return Some(guarded(path, || check_xml_entry(archive, path)));
            }
            if !path.starts_with("ppt/media/") {
                return None;
            }
            let ext = media::extension_of(path).unwrap_or_default();
            (!media::is_av_extension(&ext))
                .then(|| guarded(path, || check_media_entry(archive, path, &ext, options)))
        })
        .collect();

    let mut out = Findings::default();
    for f in per_entry {
        out.merge(f);
    }
    out
}

fn check_slide_count(archive: &Archive, options: &ValidationOptions, out: &mut Findings) {
    let count = sorted_slide_paths(archive).len();
    if count > options.max_slides {
        out.errors.push(
            Issue::new(
                IssueCode::TooManySlides,
                format!("deck has {count} slides; the limit is {}", options.max_slides),
            )
            .with_details(json!({ "slideCount": count, "maxSlides": options.max_slides })),
        );
    }
}

/// Validate archive bytes against `options`.
#[tracing::instrument(skip(bytes, options), fields(bytes = bytes.len()))]
pub fn validate(bytes: &[u8], options: &ValidationOptions) -> ValidationReport {
    let mut out = Findings::default();
    check_size(bytes.len(), options, &mut out);

    match Archive::open(bytes.to_vec()) {
        Err(err) => out.errors.push(Issue::new(
            IssueCode::InvalidZip,
            format!("not a readable zip container: {err}"),
        )),
        Ok(archive) => {
            check_required(&archive, &mut out);
            out.merge(check_entries(&archive, options));
            check_slide_count(&archive, options, &mut out);
        }
    }

    let report = ValidationReport::from_issues(out.errors, out.warnings);
    tracing::debug!(
        valid = report.is_valid,
        errors = report.errors.len(),
        warnings = report.warnings.len(),
        "validation finished"
    );
    report
}

#[cfg(test)]
#[path = "../../tests/unit/validate/mod.rs"]
mod tests;
