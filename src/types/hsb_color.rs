// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HSB color type (Hue, Saturation, Brightness).

use std::fmt;

use crate::convert;

use super::{HslColor, RgbColor};

const CHANNEL_EPSILON: f64 = 1e-3;

/// HSB (a.k.a. HSV) color representation with real-valued channels.
///
/// Same shape as [`HslColor`] with brightness in place of light.
///
/// # Examples
///
/// ```
/// use lightgrid::types::{HsbColor, RgbColor};
///
/// let red = HsbColor::new(0.0, 100.0, 100.0, 255);
/// assert_eq!(red.to_rgb(), RgbColor::new(255, 0, 0));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct HsbColor {
    hue: f64,
    saturation: f64,
    brightness: f64,
    alpha: u8,
}

impl HsbColor {
    /// Creates a new HSB color, wrapping the hue into `[0, 360)`.
    #[must_use]
    pub fn new(hue: f64, saturation: f64, brightness: f64, alpha: u8) -> Self {
        Self {
            hue: convert::normalize_hue(hue),
            saturation,
            brightness,
            alpha,
        }
    }

    /// Returns the hue truncated to whole degrees.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn hue(&self) -> i32 {
        self.hue as i32
    }

    /// Returns the precise hue in degrees, in `[0, 360)`.
    #[must_use]
    pub fn precise_hue(&self) -> f64 {
        self.hue
    }

    /// Returns the saturation truncated to a whole percentage.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn saturation(&self) -> i32 {
        self.saturation as i32
    }

    /// Returns the precise saturation percentage.
    #[must_use]
    pub fn precise_saturation(&self) -> f64 {
        self.saturation
    }

    /// Returns the brightness truncated to a whole percentage.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn brightness(&self) -> i32 {
        self.brightness as i32
    }

    /// Returns the precise brightness percentage.
    #[must_use]
    pub fn precise_brightness(&self) -> f64 {
        self.brightness
    }

    /// Returns the alpha channel.
    #[must_use]
    pub fn alpha(&self) -> u8 {
        self.alpha
    }

    /// Converts this color to RGB.
    #[must_use]
    pub fn to_rgb(&self) -> RgbColor {
        convert::hsb_to_rgb(*self)
    }

    /// Converts this color to HSL by way of RGB.
    #[must_use]
    pub fn to_hsl(&self) -> HslColor {
        convert::rgb_to_hsl(self.to_rgb())
    }
}

impl PartialEq for HsbColor {
    fn eq(&self, other: &Self) -> bool {
        (self.hue - other.hue).abs() < CHANNEL_EPSILON
            && (self.saturation - other.saturation).abs() < CHANNEL_EPSILON
            && (self.brightness - other.brightness).abs() < CHANNEL_EPSILON
    }
}

impl fmt::Display for HsbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HSB({}, {}%, {}%)",
            self.hue(),
            self.saturation(),
            self.brightness()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors() {
        let color = HsbColor::new(180.25, 50.5, 75.75, 255);
        assert_eq!(color.hue(), 180);
        assert_eq!(color.saturation(), 50);
        assert_eq!(color.brightness(), 75);
        assert!((color.precise_brightness() - 75.75).abs() < 1e-9);
    }

    #[test]
    fn hue_wraps_on_construction() {
        let color = HsbColor::new(-120.0, 100.0, 100.0, 255);
        assert_eq!(color.hue(), 240);
    }

    #[test]
    fn display_format() {
        let color = HsbColor::new(120.0, 100.0, 75.0, 255);
        assert_eq!(color.to_string(), "HSB(120, 100%, 75%)");
    }
}
