//! Document properties (`docProps/*.xml`) and presentation-level settings.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::deck::model::{DocumentSettings, MasterSlide, Orientation, SizeUnits, SlideSize};
use crate::foundation::core::emu_to_inches;
use crate::foundation::error::ReelResult;
use crate::package::archive::Archive;
use crate::package::xml::{XmlNode, parse_xml};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CoreProperties {
    pub title: Option<String>,
    pub creator: Option<String>,
    pub subject: Option<String>,
    pub description: Option<String>,
    pub language: Option<String>,
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppProperties {
    pub slides: Option<u32>,
    pub app_version: Option<String>,
}

fn child_text(node: &XmlNode, name: &str) -> Option<String> {
    let text = node.child(name)?.text.trim();
    (!text.is_empty()).then(|| text.to_owned())
}

/// Parse W3CDTF timestamps as written by authoring tools; offsets are normalized to UTC.
pub fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.fZ", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc))
}

pub fn parse_core_properties(xml: &str) -> ReelResult<CoreProperties> {
    let root = parse_xml(xml)?;
    Ok(CoreProperties {
        title: child_text(&root, "dc:title"),
        creator: child_text(&root, "dc:creator"),
        subject: child_text(&root, "dc:subject"),
        description: child_text(&root, "dc:description"),
        language: child_text(&root, "dc:language"),
        created: child_text(&root, "dcterms:created").and_then(|s| parse_datetime(&s)),
        modified: child_text(&root, "dcterms:modified").and_then(|s| parse_datetime(&s)),
    })
}

pub fn parse_app_properties(xml: &str) -> ReelResult<AppProperties> {
    let root = parse_xml(xml)?;
    Ok(AppProperties {
        slides: child_text(&root, "Slides").and_then(|s| s.parse().ok()),
        app_version: child_text(&root, "AppVersion"),
    })
}

/// Slide size, orientation and start number from `ppt/presentation.xml`.
pub fn parse_presentation_settings(xml: &str) -> ReelResult<DocumentSettings> {
    let root = parse_xml(xml)?;
    let mut settings = DocumentSettings::default();

    if let Some(sz) = root.child("p:sldSz") {
        let (Some(cx), Some(cy)) = (sz.attr_i64("cx"), sz.attr_i64("cy")) else {
            return Ok(settings);
        };
        if cx > 0 && cy > 0 {
            settings.slide_size = SlideSize {
                width: emu_to_inches(cx),
                height: emu_to_inches(cy),
                units: SizeUnits::Inches,
            };
            settings.orientation = if cy > cx {
                Orientation::Portrait
            } else {
                Orientation::Landscape
            };
        }
    }
    if let Some(first) = root
        .attr_i64("firstSlideNum")
        .and_then(|n| u32::try_from(n).ok())
        .filter(|n| *n > 0)
    {
        settings.start_slide = first;
    }
    Ok(settings)
}

/// `"Quarterly_review-2024.pptx"` → `"Quarterly review 2024"`.
pub fn title_from_filename(filename: &str) -> String {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let stem = match base.len().checked_sub(5) {
        Some(cut) if base.is_char_boundary(cut) && base[cut..].eq_ignore_ascii_case(".pptx") => {
            &base[..cut]
        }
        _ => base,
    };
    stem.replace(['-', '_'], " ")
}

fn load_part<T>(
    archive: &Archive,
    path: &str,
    parse: impl FnOnce(&str) -> ReelResult<T>,
) -> Option<T> {
    if !archive.contains(path) {
        return None;
    }
    match archive.read_text(path).and_then(|xml| parse(&xml)) {
        Ok(v) => Some(v),
        Err(err) => {
            tracing::warn!(part = path, error = %err, "ignoring unreadable properties part");
            None
        }
    }
}

pub fn load_core_properties(archive: &Archive) -> CoreProperties {
    load_part(archive, crate::package::CORE_PROPS, parse_core_properties).unwrap_or_default()
}

pub fn load_app_properties(archive: &Archive) -> AppProperties {
    load_part(archive, crate::package::APP_PROPS, parse_app_properties).unwrap_or_default()
}

/// Settings from the presentation part; defaults when it cannot be read.
pub fn load_settings(archive: &Archive) -> DocumentSettings {
    load_part(
        archive,
        crate::package::PRESENTATION_XML,
        parse_presentation_settings,
    )
    .unwrap_or_default()
}

/// Slide masters in number order, named from `p:cSld@name`.
pub fn load_master_slides(archive: &Archive) -> Vec<MasterSlide> {
    let mut paths: Vec<String> = archive
        .names()
        .iter()
        .filter(|n| {
            n.starts_with("ppt/slideMasters/slideMaster") && n.ends_with(".xml")
        })
        .cloned()
        .collect();
    paths.sort_by_key(|p| crate::package::trailing_number(p));

    paths
        .into_iter()
        .filter_map(|path| {
            let n = crate::package::trailing_number(&path);
            let name = load_part(archive, &path, |xml| {
                let root = parse_xml(xml)?;
                Ok(root
                    .child("p:cSld")
                    .and_then(|c| c.attr("name"))
                    .unwrap_or_default()
                    .to_owned())
            })?;
            Some(MasterSlide {
                id: format!("master-{n}"),
                name: if name.is_empty() {
                    format!("Master {n}")
                } else {
                    name
                },
            })
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/deck/props.rs"]
mod tests;
