/// RGB colors in CSS notation
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SceneError;

/// 24-bit RGB color, written as `#rrggbb`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);
    pub const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);
    pub const RED: Color = Color::rgb(0xff, 0x00, 0x00);
    pub const GREEN: Color = Color::rgb(0x00, 0x80, 0x00);
    pub const BLUE: Color = Color::rgb(0x00, 0x00, 0xff);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channels as floats in `0.0..=1.0`
    pub fn to_linear(self) -> [f32; 3] {
        [self.r, self.g, self.b].map(|c| c as f32 / 255.0)
    }

    pub fn scaled(self, factor: f32) -> Self {
        let scale = |c: u8| (c as f32 * factor).round().clamp(0.0, 255.0) as u8;
        Self::rgb(scale(self.r), scale(self.g), scale(self.b))
    }

    fn named(name: &str) -> Option<Self> {
        let color = match name {
            "white" => Self::WHITE,
            "black" => Self::BLACK,
            "red" => Self::RED,
            "green" => Self::GREEN,
            "blue" => Self::BLUE,
            "yellow" => Self::rgb(0xff, 0xff, 0x00),
            "gray" | "grey" => Self::rgb(0x80, 0x80, 0x80),
            "orange" => Self::rgb(0xff, 0xa5, 0x00),
            _ => return None,
        };
        Some(color)
    }
}

impl FromStr for Color {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SceneError::InvalidColor(s.to_string());
        let trimmed = s.trim().to_ascii_lowercase();

        let Some(hex) = trimmed.strip_prefix('#') else {
            return Self::named(&trimmed).ok_or_else(invalid);
        };
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| invalid());
        match hex.len() {
            6 => Ok(Self::rgb(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            // #rgb shorthand doubles each digit
            3 => Ok(Self::rgb(
                channel(&hex[0..1])? * 0x11,
                channel(&hex[1..2])? * 0x11,
                channel(&hex[2..3])? * 0x11,
            )),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = SceneError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        let color: Color = "#ebcc34".parse().unwrap();
        assert_eq!(color, Color::rgb(0xeb, 0xcc, 0x34));
        assert_eq!(color.to_string(), "#ebcc34");
    }

    #[test]
    fn test_parse_short_hex_and_names() {
        assert_eq!("#777".parse::<Color>().unwrap(), Color::rgb(0x77, 0x77, 0x77));
        assert_eq!("Blue".parse::<Color>().unwrap(), Color::BLUE);
        assert_eq!(" white ".parse::<Color>().unwrap(), Color::WHITE);
    }

    #[test]
    fn test_reject_invalid() {
        for input in ["", "#12345", "#ggg", "chartreuse-ish", "#+12345"] {
            assert_eq!(
                input.parse::<Color>(),
                Err(SceneError::InvalidColor(input.to_string())),
                "{input}"
            );
        }
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&Color::RED).unwrap();
        assert_eq!(json, "\"#ff0000\"");
        let back: Color = serde_json::from_str("\"#00f\"").unwrap();
        assert_eq!(back, Color::BLUE);
        assert!(serde_json::from_str::<Color>("\"nope\"").is_err());
    }
}
