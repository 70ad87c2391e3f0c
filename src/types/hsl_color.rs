// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HSL color type (Hue, Saturation, Light).

use std::fmt;

use crate::convert;

use super::{HsbColor, RgbColor};

/// Tolerance used when comparing real-valued channels.
const CHANNEL_EPSILON: f64 = 1e-3;

/// HSL color representation with real-valued channels.
///
/// The hue is normalized into `[0, 360)` at construction, so hue arithmetic
/// such as `hue - 10` on a red color lands on the other side of the wheel.
/// Saturation and light are percentages (0-100) and are stored as given;
/// callers keep them in range.
///
/// Each channel has a precise `f64` accessor and an integer view that
/// truncates toward zero.
///
/// # Examples
///
/// ```
/// use lightgrid::types::HslColor;
///
/// let color = HslColor::new(-10.0, 100.0, 50.0, 255);
/// assert_eq!(color.hue(), 350);
/// assert!((color.precise_hue() - 350.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct HslColor {
    hue: f64,
    saturation: f64,
    light: f64,
    alpha: u8,
}

impl HslColor {
    /// Creates a new HSL color, wrapping the hue into `[0, 360)`.
    #[must_use]
    pub fn new(hue: f64, saturation: f64, light: f64, alpha: u8) -> Self {
        Self {
            hue: convert::normalize_hue(hue),
            saturation,
            light,
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

    /// Returns the light truncated to a whole percentage.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn light(&self) -> i32 {
        self.light as i32
    }

    /// Returns the precise light percentage.
    #[must_use]
    pub fn precise_light(&self) -> f64 {
        self.light
    }

    /// Returns the alpha channel.
    #[must_use]
    pub fn alpha(&self) -> u8 {
        self.alpha
    }

    /// Returns a sibling color with the hue shifted by `degrees`.
    #[must_use]
    pub fn shifted(&self, degrees: f64) -> Self {
        Self::new(self.hue + degrees, self.saturation, self.light, self.alpha)
    }

    /// Converts this color to RGB.
    #[must_use]
    pub fn to_rgb(&self) -> RgbColor {
        convert::hsl_to_rgb(*self)
    }

    /// Converts this color to HSB by way of RGB.
    #[must_use]
    pub fn to_hsb(&self) -> HsbColor {
        convert::rgb_to_hsb(self.to_rgb())
    }
}

impl PartialEq for HslColor {
    fn eq(&self, other: &Self) -> bool {
        (self.hue - other.hue).abs() < CHANNEL_EPSILON
            && (self.saturation - other.saturation).abs() < CHANNEL_EPSILON
            && (self.light - other.light).abs() < CHANNEL_EPSILON
    }
}

impl fmt::Display for HslColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.alpha < u8::MAX {
            write!(
                f,
                "hsla({}, {}%, {}%, {:.2})",
                self.hue(),
                self.saturation(),
                self.light(),
                f32::from(self.alpha) / 255.0
            )
        } else {
            write!(
                f,
                "hsl({}, {}%, {}%)",
                self.hue(),
                self.saturation(),
                self.light()
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hue_wraps_on_construction() {
        assert!((HslColor::new(370.0, 0.0, 0.0, 255).precise_hue() - 10.0).abs() < 1e-9);
        assert!((HslColor::new(-5.0, 0.0, 0.0, 255).precise_hue() - 355.0).abs() < 1e-9);
        assert!(HslColor::new(360.0, 0.0, 0.0, 255).precise_hue().abs() < 1e-9);
    }

    #[test]
    fn integer_views_truncate() {
        let color = HslColor::new(359.9, 49.99, 0.5, 255);
        assert_eq!(color.hue(), 359);
        assert_eq!(color.saturation(), 49);
        assert_eq!(color.light(), 0);
    }

    #[test]
    fn equality_uses_precise_channels_and_ignores_alpha() {
        let a = HslColor::new(120.0, 50.0, 50.0, 255);
        let b = HslColor::new(120.0004, 50.0, 50.0, 0);
        let c = HslColor::new(120.5, 50.0, 50.0, 255);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn shifted_keeps_other_channels() {
        let base = HslColor::new(5.0, 80.0, 40.0, 7);
        let shifted = base.shifted(-10.0);
        assert!((shifted.precise_hue() - 355.0).abs() < 1e-9);
        assert!((shifted.precise_saturation() - 80.0).abs() < 1e-9);
        assert!((shifted.precise_light() - 40.0).abs() < 1e-9);
        assert_eq!(shifted.alpha(), 7);
    }

    #[test]
    fn display_format() {
        assert_eq!(
            HslColor::new(120.7, 100.0, 50.0, 255).to_string(),
            "hsl(120, 100%, 50%)"
        );
    }
}
