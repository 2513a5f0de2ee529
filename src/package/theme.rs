use crate::foundation::error::{ReelError, ReelResult};
use crate::package::archive::Archive;
use crate::package::xml::{XmlNode, parse_xml};

/// The twelve named color slots of a theme, as `#RRGGBB`.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorScheme {
    pub background1: String,
    pub background2: String,
    pub text1: String,
    pub text2: String,
    pub accent1: String,
    pub accent2: String,
    pub accent3: String,
    pub accent4: String,
    pub accent5: String,
    pub accent6: String,
    pub hyperlink: String,
    pub followed_hyperlink: String,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            background1: "#FFFFFF".to_owned(),
            background2: "#F2F2F2".to_owned(),
            text1: "#000000".to_owned(),
            text2: "#333333".to_owned(),
            accent1: "#4472C4".to_owned(),
            accent2: "#E7E6E6".to_owned(),
            accent3: "#A5A5A5".to_owned(),
            accent4: "#FFC000".to_owned(),
            accent5: "#5B9BD5".to_owned(),
            accent6: "#70AD47".to_owned(),
            hyperlink: "#0563C1".to_owned(),
            followed_hyperlink: "#954F72".to_owned(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontScheme {
    pub major_font: String,
    pub minor_font: String,
}

impl Default for FontScheme {
    fn default() -> Self {
        Self {
            major_font: "Arial".to_owned(),
            minor_font: "Arial".to_owned(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub name: String,
    pub color_scheme: ColorScheme,
    pub font_scheme: FontScheme,
}

const DEFAULT_THEME_NAME: &str = "Default Theme";

impl Default for Theme {
    fn default() -> Self {
        Self {
            name: DEFAULT_THEME_NAME.to_owned(),
            color_scheme: ColorScheme::default(),
            font_scheme: FontScheme::default(),
        }
    }
}

fn slot_color(slot: &XmlNode) -> Option<String> {
    let hex = if let Some(c) = slot.child("a:srgbClr") {
        c.attr("val")?
    } else {
        slot.child("a:sysClr")?.attr("lastClr")?
    };
    let hex = hex.trim();
    (hex.len() == 6 && hex.bytes().all(|b| b.is_ascii_hexdigit()))
        .then(|| format!("#{}", hex.to_ascii_uppercase()))
}

fn apply_color_scheme(scheme: &XmlNode, colors: &mut ColorScheme) {
    for slot in &scheme.children {
        let Some(hex) = slot_color(slot) else {
            continue;
        };
        let field = match slot.local_name() {
            "dk1" => &mut colors.text1,
            "lt1" => &mut colors.background1,
            "dk2" => &mut colors.text2,
            "lt2" => &mut colors.background2,
            "accent1" => &mut colors.accent1,
            "accent2" => &mut colors.accent2,
            "accent3" => &mut colors.accent3,
            "accent4" => &mut colors.accent4,
            "accent5" => &mut colors.accent5,
            "accent6" => &mut colors.accent6,
            "hlink" => &mut colors.hyperlink,
            "folHlink" => &mut colors.followed_hyperlink,
            _ => continue,
        };
        *field = hex;
    }
}

fn typeface(font: Option<&XmlNode>) -> Option<String> {
    let face = font?.child("a:latin")?.attr("typeface")?.trim();
    (!face.is_empty()).then(|| face.to_owned())
}

/// Parse one `ppt/theme/themeN.xml` part.
pub fn parse_theme(xml: &str) -> ReelResult<Theme> {
    let root = parse_xml(xml)?;
    if !root.is("theme") {
        return Err(ReelError::xml(format!(
            "expected <a:theme> root, found <{}>",
            root.name
        )));
    }

    let mut theme = Theme {
        name: root
            .attr("name")
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(DEFAULT_THEME_NAME)
            .to_owned(),
        color_scheme: ColorScheme::default(),
        font_scheme: FontScheme::default(),
    };

    let elements = root.child("a:themeElements");
    if let Some(scheme) = elements.and_then(|e| e.child("a:clrScheme")) {
        apply_color_scheme(scheme, &mut theme.color_scheme);
    }
    if let Some(fonts) = elements.and_then(|e| e.child("a:fontScheme")) {
        if let Some(major) = typeface(fonts.child("a:majorFont")) {
            theme.font_scheme.major_font = major;
        }
        if let Some(minor) = typeface(fonts.child("a:minorFont")) {
            theme.font_scheme.minor_font = minor;
        }
    }
    Ok(theme)
}

/// Every theme part in the package, ordered by theme number. Unparseable themes are skipped.
pub fn load_themes(archive: &Archive) -> Vec<Theme> {
    let mut paths = archive.list_entries(super::theme_pattern());
    paths.sort_by_key(|p| super::trailing_number(p));

    let mut out = Vec::with_capacity(paths.len());
    for path in paths {
        match archive.read_text(&path).and_then(|xml| parse_theme(&xml)) {
            Ok(theme) => out.push(theme),
            Err(err) => tracing::warn!(part = %path, error = %err, "skipping theme"),
        }
    }
    tracing::debug!(themes = out.len(), "themes loaded");
    out
}

#[cfg(test)]
#[path = "../../tests/unit/package/theme.rs"]
mod tests;
