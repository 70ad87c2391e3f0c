// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! RGB color type with hex parsing and HSL/HSB conversion.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::convert;
use crate::error::ValueError;

use super::{HsbColor, HslColor};

/// RGB color with 8-bit channels and an alpha channel (0-255).
///
/// Equality and hashing only consider the red, green and blue channels: two
/// colors that differ only in alpha compare equal. Lights have no notion of
/// transparency, so alpha is carried through conversions but never reaches a
/// device.
///
/// # Examples
///
/// ```
/// use lightgrid::types::RgbColor;
///
/// let color = RgbColor::new(255, 128, 0);
/// assert_eq!(color.red(), 255);
/// assert_eq!(color.alpha(), 255);
///
/// let red = RgbColor::from_hex("#FF0000").unwrap();
/// assert_eq!(red.to_hex_with_hash(), "#FF0000");
///
/// // Alpha is ignored by equality
/// assert_eq!(red, red.with_alpha(10));
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RgbColor {
    #[serde(alias = "R")]
    red: u8,
    #[serde(alias = "G")]
    green: u8,
    #[serde(alias = "B")]
    blue: u8,
    #[serde(default = "opaque", alias = "A")]
    alpha: u8,
}

const fn opaque() -> u8 {
    u8::MAX
}

impl RgbColor {
    /// Creates a new opaque RGB color.
    #[must_use]
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha: u8::MAX,
        }
    }

    /// Creates a new RGB color with an explicit alpha channel.
    #[must_use]
    pub const fn with_rgba(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Returns a copy of this color with a different alpha channel.
    #[must_use]
    pub const fn with_alpha(self, alpha: u8) -> Self {
        Self { alpha, ..self }
    }

    /// Parses an RGB color from a hex string.
    ///
    /// Accepts formats: `#RRGGBB`, `RRGGBB`, `#RGB`, `RGB`. The result is
    /// always opaque.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidHexColor` if the hex string is invalid.
    pub fn from_hex(hex: &str) -> Result<Self, ValueError> {
        let hex = hex.trim_start_matches('#');

        if !hex.is_ascii() {
            return Err(ValueError::InvalidHexColor(hex.to_string()));
        }

        match hex.len() {
            3 => {
                let digits = hex
                    .chars()
                    .map(parse_hex_char)
                    .collect::<Result<Vec<u8>, _>>()?;
                // 0-F expands to 0-255
                Ok(Self::new(digits[0] * 17, digits[1] * 17, digits[2] * 17))
            }
            6 => {
                let r = parse_hex_pair(&hex[0..2])?;
                let g = parse_hex_pair(&hex[2..4])?;
                let b = parse_hex_pair(&hex[4..6])?;
                Ok(Self::new(r, g, b))
            }
            _ => Err(ValueError::InvalidHexColor(hex.to_string())),
        }
    }

    /// Returns the red component.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Returns the green component.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Returns the blue component.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }

    /// Returns the alpha component.
    #[must_use]
    pub const fn alpha(&self) -> u8 {
        self.alpha
    }

    /// Returns the color as a hex string without the hash prefix.
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.red, self.green, self.blue)
    }

    /// Returns the color as a hex string with the hash prefix.
    #[must_use]
    pub fn to_hex_with_hash(&self) -> String {
        format!("#{}", self.to_hex())
    }

    /// Converts this color to HSL.
    #[must_use]
    pub fn to_hsl(&self) -> HslColor {
        convert::rgb_to_hsl(*self)
    }

    /// Converts this color to HSB.
    #[must_use]
    pub fn to_hsb(&self) -> HsbColor {
        convert::rgb_to_hsb(*self)
    }

    /// Creates an RGB color from an HSL color.
    #[must_use]
    pub fn from_hsl(hsl: &HslColor) -> Self {
        convert::hsl_to_rgb(*hsl)
    }

    /// Creates an RGB color from an HSB color.
    #[must_use]
    pub fn from_hsb(hsb: &HsbColor) -> Self {
        convert::hsb_to_rgb(*hsb)
    }

    /// Creates a white color.
    #[must_use]
    pub const fn white() -> Self {
        Self::new(255, 255, 255)
    }

    /// Creates a black color.
    #[must_use]
    pub const fn black() -> Self {
        Self::new(0, 0, 0)
    }
}

impl PartialEq for RgbColor {
    fn eq(&self, other: &Self) -> bool {
        self.red == other.red && self.green == other.green && self.blue == other.blue
    }
}

impl Eq for RgbColor {}

impl Hash for RgbColor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (self.red, self.green, self.blue).hash(state);
    }
}

impl Default for RgbColor {
    fn default() -> Self {
        Self::white()
    }
}

impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.alpha < u8::MAX {
            write!(
                f,
                "rgba({}, {}, {}, {:.2})",
                self.red,
                self.green,
                self.blue,
                f32::from(self.alpha) / 255.0
            )
        } else {
            write!(f, "rgb({}, {}, {})", self.red, self.green, self.blue)
        }
    }
}

impl FromStr for RgbColor {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<(u8, u8, u8)> for RgbColor {
    fn from((red, green, blue): (u8, u8, u8)) -> Self {
        Self::new(red, green, blue)
    }
}

fn parse_hex_char(c: char) -> Result<u8, ValueError> {
    c.to_digit(16)
        .and_then(|d| u8::try_from(d).ok())
        .ok_or_else(|| ValueError::InvalidHexColor(c.to_string()))
}

fn parse_hex_pair(s: &str) -> Result<u8, ValueError> {
    u8::from_str_radix(s, 16).map_err(|_| ValueError::InvalidHexColor(s.to_string()))
}
