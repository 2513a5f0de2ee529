//! Leading-byte signatures for the image kinds a deck may embed.

/// Audio and video extensions. Media entries with these are exempt from the image checks;
/// every other entry under `ppt/media/`, extensionless ones included, is held to them.
pub const AV_EXTENSIONS: &[&str] = &[
    "mp3", "mp4", "m4a", "m4v", "wav", "wma", "wmv", "aac", "aif", "aiff", "flac", "ogg", "oga",
    "ogv", "opus", "mov", "avi", "mpg", "mpeg", "mkv", "webm", "mid", "midi",
];

pub fn extension_of(path: &str) -> Option<String> {
    let name = path.rsplit('/').next()?;
    let (_, ext) = name.rsplit_once('.')?;
    (!ext.is_empty()).then(|| ext.to_ascii_lowercase())
}

pub fn is_av_extension(ext: &str) -> bool {
    AV_EXTENSIONS.contains(&ext)
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(512)];
    let text = String::from_utf8_lossy(head);
    let text = text.trim_start_matches('\u{feff}').trim_start();
    text.starts_with("<svg") || (text.starts_with("<?xml") && text.contains("<svg"))
}

fn looks_like_emf(bytes: &[u8]) -> bool {
    bytes.len() >= 44 && bytes[0..4] == [1, 0, 0, 0] && &bytes[40..44] == b" EMF"
}

fn looks_like_wmf(bytes: &[u8]) -> bool {
    bytes.starts_with(&[0xD7, 0xCD, 0xC6, 0x9A])
        || bytes.starts_with(&[0x01, 0x00, 0x09, 0x00])
        || bytes.starts_with(&[0x02, 0x00, 0x09, 0x00])
}

/// Short name of the detected format, or `None` if no known signature matches.
pub fn sniff_image(bytes: &[u8]) -> Option<&'static str> {
    if let Ok(format) = image::guess_format(bytes) {
        return format.extensions_str().first().copied();
    }
    if looks_like_emf(bytes) {
        Some("emf")
    } else if looks_like_wmf(bytes) {
        Some("wmf")
    } else if looks_like_svg(bytes) {
        Some("svg")
    } else {
        None
    }
}

#[cfg(test)]
#[path = "../../tests/unit/validate/media.rs"]
mod tests;
