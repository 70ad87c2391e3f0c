// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Color-space conversion between RGB, HSL and HSB.
//!
//! All functions here are pure and total: inputs are always well-formed
//! numeric ranges and there is no failure path. Calculations run in `f64`
//! and only the final integer channels are rounded (half away from zero), so
//! an `A -> B -> A` round trip is exact to within one integer unit.
//!
//! Floating-point channel comparisons (gray detection, picking the dominant
//! channel) use a tolerance of `1e-4` instead of exact equality.
//!
//! # Examples
//!
//! ```
//! use lightgrid::convert::{gradient_from_color, rgb_to_hsl, hsl_to_rgb};
//! use lightgrid::types::RgbColor;
//!
//! let orange = RgbColor::new(255, 128, 0);
//! let hsl = rgb_to_hsl(orange);
//! assert_eq!(hsl.hue(), 30);
//! assert_eq!(hsl_to_rgb(hsl), orange);
//!
//! // Five hue-shifted siblings, from -10 to +10 degrees
//! let sweep = gradient_from_color(orange);
//! assert_eq!(sweep[2], orange);
//! ```

use crate::types::{HsbColor, HslColor, RgbColor};

/// Tolerance for floating-point channel comparisons.
const EPSILON: f64 = 1e-4;

/// Hue offsets, in degrees, of the colors produced by [`gradient_from_color`].
///
/// Ascending order gives a smooth sweep across the base hue.
pub const GRADIENT_OFFSETS: [f64; 5] = [-10.0, -5.0, 0.0, 5.0, 10.0];

/// Wraps any real hue into `[0, 360)`.
#[must_use]
pub fn normalize_hue(hue: f64) -> f64 {
    let wrapped = hue.rem_euclid(360.0);
    // rem_euclid of a tiny negative value rounds up to exactly 360.0
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Converts an RGB color to HSL.
#[must_use]
#[allow(clippy::many_single_char_names)]
pub fn rgb_to_hsl(rgb: RgbColor) -> HslColor {
    let (r, g, b) = unit_channels(rgb);

    let min = r.min(g).min(b);
    let max = r.max(g).max(b);
    let delta = max - min;

    let light = (max + min) / 2.0;

    let (hue, saturation) = if delta.abs() < EPSILON {
        // achromatic
        (0.0, 0.0)
    } else {
        let saturation = if light < 0.5 {
            delta / (max + min)
        } else {
            delta / (2.0 - max - min)
        };

        let del_r = (((max - r) / 6.0) + (delta / 2.0)) / delta;
        let del_g = (((max - g) / 6.0) + (delta / 2.0)) / delta;
        let del_b = (((max - b) / 6.0) + (delta / 2.0)) / delta;

        let mut hue = if (r - max).abs() < EPSILON {
            del_b - del_g
        } else if (g - max).abs() < EPSILON {
            (1.0 / 3.0) + del_r - del_b
        } else if (b - max).abs() < EPSILON {
            (2.0 / 3.0) + del_g - del_r
        } else {
            0.0
        };

        if hue < 0.0 {
            hue += 1.0;
        }
        if hue >= 1.0 {
            hue -= 1.0;
        }

        (hue, saturation)
    };

    HslColor::new(hue * 360.0, saturation * 100.0, light * 100.0, rgb.alpha())
}

/// Converts an HSL color to RGB.
#[must_use]
#[allow(clippy::many_single_char_names)]
pub fn hsl_to_rgb(hsl: HslColor) -> RgbColor {
    let h = hsl.precise_hue() / 360.0;
    let s = hsl.precise_saturation() / 100.0;
    let l = hsl.precise_light() / 100.0;

    let (r, g, b) = if s.abs() < EPSILON {
        (l, l, l)
    } else {
        let v2 = if l < 0.5 {
            l * (1.0 + s)
        } else {
            (l + s) - (s * l)
        };
        let v1 = 2.0 * l - v2;

        (
            hue_to_rgb(v1, v2, h + (1.0 / 3.0)),
            hue_to_rgb(v1, v2, h),
            hue_to_rgb(v1, v2, h - (1.0 / 3.0)),
        )
    };

    RgbColor::with_rgba(to_channel(r), to_channel(g), to_channel(b), hsl.alpha())
}

/// Computes one RGB channel from the HSL intermediates `v1`, `v2` and the
/// phase-shifted hue `vh` (in turns).
///
/// `vh` is wrapped into `[0, 1]` with a single correction, which is enough
/// for the `+1/3`, `0`, `-1/3` offsets used by [`hsl_to_rgb`].
#[must_use]
pub fn hue_to_rgb(v1: f64, v2: f64, vh: f64) -> f64 {
    let mut vh = vh;
    if vh < 0.0 {
        vh += 1.0;
    }
    if vh > 1.0 {
        vh -= 1.0;
    }

    if 6.0 * vh < 1.0 {
        return v1 + (v2 - v1) * 6.0 * vh;
    }
    if 2.0 * vh < 1.0 {
        return v2;
    }
    if 3.0 * vh < 2.0 {
        return v1 + (v2 - v1) * ((2.0 / 3.0) - vh) * 6.0;
    }

    v1
}

/// Converts an RGB color to HSB.
#[must_use]
#[allow(clippy::many_single_char_names)]
pub fn rgb_to_hsb(rgb: RgbColor) -> HsbColor {
    let (r, g, b) = unit_channels(rgb);

    let min = r.min(g).min(b);
    let max = r.max(g).max(b);
    let delta = max - min;

    let brightness = max * 100.0;

    let (mut hue, saturation) = if max.abs() < EPSILON || delta.abs() < EPSILON {
        (0.0, 0.0)
    } else {
        let hue = if (r - max).abs() < EPSILON {
            (g - b) / delta
        } else if (g - max).abs() < EPSILON {
            2.0 + (b - r) / delta
        } else {
            4.0 + (r - g) / delta
        };
        (hue, (delta / max) * 100.0)
    };

    hue *= 60.0;
    if hue < 0.0 {
        hue += 360.0;
    }

    HsbColor::new(hue, saturation, brightness, rgb.alpha())
}

/// Converts an HSB color to RGB using the six-sector color wheel.
#[must_use]
#[allow(clippy::many_single_char_names, clippy::cast_possible_truncation)]
pub fn hsb_to_rgb(hsb: HsbColor) -> RgbColor {
    let h = hsb.precise_hue();
    let s = hsb.precise_saturation() / 100.0;
    let b = hsb.precise_brightness() / 100.0;

    let (red, green, blue) = if s.abs() < EPSILON {
        (b, b, b)
    } else {
        let sector_position = h / 60.0;
        let sector_floor = sector_position.floor();
        let fractional = sector_position - sector_floor;
        let sector = (sector_floor as i64).rem_euclid(6);

        let p = b * (1.0 - s);
        let q = b * (1.0 - (s * fractional));
        let t = b * (1.0 - (s * (1.0 - fractional)));

        match sector {
            0 => (b, t, p),
            1 => (q, b, p),
            2 => (p, b, t),
            3 => (p, q, b),
            4 => (t, p, b),
            _ => (b, p, q),
        }
    };

    RgbColor::with_rgba(
        to_channel(red),
        to_channel(green),
        to_channel(blue),
        hsb.alpha(),
    )
}

/// Returns the HSL siblings of `color` at each of [`GRADIENT_OFFSETS`].
///
/// Saturation, light and alpha are shared with the color's HSL projection.
#[must_use]
pub fn gradient_hsl(color: RgbColor) -> [HslColor; 5] {
    let base = rgb_to_hsl(color);
    GRADIENT_OFFSETS.map(|offset| base.shifted(offset))
}

/// Returns five hue-shifted variants of `color`, ordered by ascending offset
/// from -10 to +10 degrees.
#[must_use]
pub fn gradient_from_color(color: RgbColor) -> [RgbColor; 5] {
    gradient_hsl(color).map(hsl_to_rgb)
}

/// Scales the HSL saturation of `color` by `percent` (100 = unchanged),
/// saturating at 100%.
#[must_use]
pub fn modulate_saturation(color: RgbColor, percent: f64) -> RgbColor {
    let hsl = rgb_to_hsl(color);
    let saturation = (hsl.precise_saturation() * percent / 100.0).clamp(0.0, 100.0);
    hsl_to_rgb(HslColor::new(
        hsl.precise_hue(),
        saturation,
        hsl.precise_light(),
        hsl.alpha(),
    ))
}

fn unit_channels(rgb: RgbColor) -> (f64, f64, f64) {
    (
        f64::from(rgb.red()) / 255.0,
        f64::from(rgb.green()) / 255.0,
        f64::from(rgb.blue()) / 255.0,
    )
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_channel(unit: f64) -> u8 {
    // f64::round rounds half away from zero
    (unit * 255.0).round().clamp(0.0, 255.0) as u8
}
