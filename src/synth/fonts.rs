//! Font database and resolver shared by every SVG raster.

use std::path::Path;
use std::sync::{Arc, OnceLock};

/// Extra directory scanned for `.ttf`/`.otf`/`.ttc` files on first use.
pub const FONT_DIR_ENV: &str = "SLIDEREEL_FONT_DIR";

static FONTDB: OnceLock<Arc<usvg::fontdb::Database>> = OnceLock::new();

/// System fonts plus [`FONT_DIR_ENV`], loaded once per process.
pub fn shared_fontdb() -> Arc<usvg::fontdb::Database> {
    FONTDB
        .get_or_init(|| {
            let mut db = usvg::fontdb::Database::new();
            db.load_system_fonts();
            if let Some(dir) = std::env::var_os(FONT_DIR_ENV) {
                load_fonts_from_dir(&mut db, Path::new(&dir));
            }
            tracing::debug!(faces = db.len(), "font database loaded");
            Arc::new(db)
        })
        .clone()
}

fn load_fonts_from_dir(db: &mut usvg::fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        tracing::warn!(dir = %dir.display(), "font directory unreadable");
        return;
    };
    for entry in rd.flatten() {
        let path = entry.path();
        let is_font = path
            .extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| matches!(ext.to_ascii_lowercase().as_str(), "ttf" | "otf" | "ttc"));
        if is_font && path.is_file() {
            let _ = db.load_font_file(&path);
        }
    }
}

/// Resolver that always lands on some face: requested families, then generic families, then the
/// first face in the database. Slide fonts are often missing on render hosts.
pub fn font_resolver() -> usvg::FontResolver<'static> {
    use usvg::FontResolver;
    use usvg::fontdb::{Family, Query, Stretch, Style, Weight};

    FontResolver {
        select_font: Box::new(|font, fontdb| {
            let mut families: Vec<Family<'_>> = font
                .families()
                .iter()
                .map(|family| match family {
                    usvg::FontFamily::Serif => Family::Serif,
                    usvg::FontFamily::SansSerif => Family::SansSerif,
                    usvg::FontFamily::Cursive => Family::Cursive,
                    usvg::FontFamily::Fantasy => Family::Fantasy,
                    usvg::FontFamily::Monospace => Family::Monospace,
                    usvg::FontFamily::Named(s) => Family::Name(s),
                })
                .collect();
            families.extend([Family::SansSerif, Family::Serif, Family::Monospace]);

            let stretch = match font.stretch() {
                usvg::FontStretch::UltraCondensed => Stretch::UltraCondensed,
                usvg::FontStretch::ExtraCondensed => Stretch::ExtraCondensed,
                usvg::FontStretch::Condensed => Stretch::Condensed,
                usvg::FontStretch::SemiCondensed => Stretch::SemiCondensed,
                usvg::FontStretch::Normal => Stretch::Normal,
                usvg::FontStretch::SemiExpanded => Stretch::SemiExpanded,
                usvg::FontStretch::Expanded => Stretch::Expanded,
                usvg::FontStretch::ExtraExpanded => Stretch::ExtraExpanded,
                usvg::FontStretch::UltraExpanded => Stretch::UltraExpanded,
            };
            let style = match font.style() {
                usvg::FontStyle::Normal => Style::Normal,
                usvg::FontStyle::Italic => Style::Italic,
                usvg::FontStyle::Oblique => Style::Oblique,
            };

            let query = Query {
                families: &families,
                weight: Weight(font.weight()),
                stretch,
                style,
            };
            fontdb
                .query(&query)
                .or_else(|| fontdb.faces().next().map(|f| f.id))
        }),
        select_fallback: FontResolver::default_fallback_selector(),
    }
}

/// Parse options for scene SVG; one per worker, reused across frames.
pub fn svg_options() -> usvg::Options<'static> {
    usvg::Options {
        fontdb: shared_fontdb(),
        font_resolver: font_resolver(),
        font_family: "Arial".to_owned(),
        ..Default::default()
    }
}
