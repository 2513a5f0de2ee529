use crate::foundation::error::{ReelError, ReelResult};

/// Straight (non-premultiplied) 8-bit color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const WHITE: Rgba8 = Rgba8::opaque(255, 255, 255);
    pub const BLACK: Rgba8 = Rgba8::opaque(0, 0, 0);

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// `#RRGGBB`, alpha dropped.
    pub fn svg_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn alpha_f64(self) -> f64 {
        f64::from(self.a) / 255.0
    }

    pub fn to_skia(self) -> resvg::tiny_skia::Color {
        resvg::tiny_skia::Color::from_rgba8(self.r, self.g, self.b, self.a)
    }
}

fn hex_nibble(c: u8) -> Option<u8> {
    (c as char).to_digit(16).map(|d| d as u8)
}

fn hex_byte(hi: u8, lo: u8) -> Option<u8> {
    Some((hex_nibble(hi)? << 4) | hex_nibble(lo)?)
}

/// Parse `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`, or one of a few named colors.
pub fn parse_color(s: &str) -> ReelResult<Rgba8> {
    let t = s.trim();
    let named = match t.to_ascii_lowercase().as_str() {
        "white" => Some(Rgba8::WHITE),
        "black" => Some(Rgba8::BLACK),
        "transparent" => Some(Rgba8 { a: 0, ..Rgba8::BLACK }),
        "red" => Some(Rgba8::opaque(255, 0, 0)),
        "green" => Some(Rgba8::opaque(0, 128, 0)),
        "blue" => Some(Rgba8::opaque(0, 0, 255)),
        "gray" | "grey" => Some(Rgba8::opaque(128, 128, 128)),
        _ => None,
    };
    if let Some(c) = named {
        return Ok(c);
    }

    let bad = || ReelError::validation(format!("unsupported color '{s}'"));
    let hex = t.strip_prefix('#').ok_or_else(bad)?.as_bytes();
    let expand = |c: u8| hex_byte(c, c);
    let rgba = match hex.len() {
        3 | 4 => (
            expand(hex[0]),
            expand(hex[1]),
            expand(hex[2]),
            hex.get(3).map_or(Some(255), |c| expand(*c)),
        ),
        6 | 8 => (
            hex_byte(hex[0], hex[1]),
            hex_byte(hex[2], hex[3]),
            hex_byte(hex[4], hex[5]),
            if hex.len() == 8 {
                hex_byte(hex[6], hex[7])
            } else {
                Some(255)
            },
        ),
        _ => return Err(bad()),
    };
    match rgba {
        (Some(r), Some(g), Some(b), Some(a)) => Ok(Rgba8 { r, g, b, a }),
        _ => Err(bad()),
    }
}

/// Like [`parse_color`], substituting `fallback` on failure.
///
/// Runs once per element per frame, so failures only log at debug; callers that see a timeline
/// once should report bad colors themselves.
pub fn color_or(s: &str, fallback: Rgba8) -> Rgba8 {
    parse_color(s).unwrap_or_else(|err| {
        tracing::debug!(error = %err, "using fallback color");
        fallback
    })
}

#[cfg(test)]
#[path = "../../tests/unit/synth/color.rs"]
mod tests;
