//! Resolution of user-supplied color tokens.
//!
//! A token is either a CSS color name (`lightblue`) or a 3/6 digit hex
//! code, optionally prefixed with `#` (`fff`, `#00ff00`). Names are looked up
//! in palette's static CSS table, which is built at compile time.

use std::fmt;
use std::str::FromStr;

use palette::Srgb;

use crate::error::{ColorRole, SheetError};

/// A resolved sRGB color together with the token it was parsed from.
#[derive(Debug, Clone, PartialEq)]
pub struct Color {
    rgb: Srgb<u8>,
    token: String,
}

impl Color {
    /// Resolves a color token given for `role`.
    ///
    /// Names win over hex, so a token like `add` is tried as a name first and
    /// only then read as shorthand for `#aadddd`.
    pub fn resolve(token: &str, role: ColorRole) -> Result<Self, SheetError> {
        let trimmed = token.trim();
        let bare = trimmed.strip_prefix('#').unwrap_or(trimmed);

        let named = palette::named::from_str(&bare.to_ascii_lowercase());
        let rgb = match named {
            Some(rgb) => Some(rgb),
            None => parse_hex(bare),
        };

        rgb.map(|rgb| Self {
            rgb,
            token: token.to_string(),
        })
        .ok_or_else(|| SheetError::InvalidColor {
            token: token.to_string(),
            role,
        })
    }

    /// Creates a color from 8-bit components.
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        let rgb = Srgb::new(r, g, b);
        Self {
            token: hex_string(rgb),
            rgb,
        }
    }

    /// The token this color was resolved from.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The 8-bit components.
    pub fn rgb8(&self) -> (u8, u8, u8) {
        (self.rgb.red, self.rgb.green, self.rgb.blue)
    }

    /// The components normalized to `0.0..=1.0`.
    pub fn to_rgb_f32(&self) -> (f32, f32, f32) {
        let rgb: Srgb<f32> = self.rgb.into_format();
        (rgb.red, rgb.green, rgb.blue)
    }

    /// Lowercase `#rrggbb` representation.
    pub fn to_hex(&self) -> String {
        hex_string(self.rgb)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

fn parse_hex(digits: &str) -> Option<Srgb<u8>> {
    if !matches!(digits.len(), 3 | 6) || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    Srgb::<u8>::from_str(digits).ok()
}

fn hex_string(rgb: Srgb<u8>) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb.red, rgb.green, rgb.blue)
}
