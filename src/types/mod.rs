// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for light control.
//!
//! # Types
//!
//! - [`RgbColor`] - 8-bit RGB with alpha (equality ignores alpha)
//! - [`HslColor`] - Hue 0-360, Saturation 0-100, Light 0-100
//! - [`HsbColor`] - Hue 0-360, Saturation 0-100, Brightness 0-100
//! - [`ColorTemperature`] - White temperature in Kelvin (1700-6500)
//! - [`Brightness`] - Output level (1-100%)
//!
//! The three color types are immutable; every conversion produces a new
//! value. See [`convert`](crate::convert) for the conversion math.

mod brightness;
mod color_temperature;
mod hsb_color;
mod hsl_color;
mod rgb_color;

pub use brightness::Brightness;
pub use color_temperature::ColorTemperature;
pub use hsb_color::HsbColor;
pub use hsl_color::HslColor;
pub use rgb_color::RgbColor;
