// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Color temperature type for white-light control.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// White color temperature in Kelvin (1700-6500).
///
/// Lower values are warmer (orange/yellow), higher values are cooler (blue).
///
/// # Examples
///
/// ```
/// use lightgrid::types::ColorTemperature;
///
/// let ct = ColorTemperature::new(4000).unwrap();
/// assert_eq!(ct.kelvin(), 4000);
///
/// assert_eq!(ColorTemperature::default(), ColorTemperature::WARM_WHITE);
/// assert!(ColorTemperature::new(10_000).is_err());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "u16", into = "u16")]
pub struct ColorTemperature(u16);

impl ColorTemperature {
    /// Warmest supported temperature.
    pub const MIN: u16 = 1700;

    /// Coolest supported temperature.
    pub const MAX: u16 = 6500;

    /// Candlelight (~1700K).
    pub const CANDLE: Self = Self(1700);

    /// Warm white (2700K), the everyday default.
    pub const WARM_WHITE: Self = Self(2700);

    /// Neutral white (4000K).
    pub const NEUTRAL: Self = Self(4000);

    /// Cool daylight (6500K).
    pub const DAYLIGHT: Self = Self(6500);

    /// Creates a new color temperature.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if `kelvin` is outside [1700, 6500].
    pub fn new(kelvin: u16) -> Result<Self, ValueError> {
        if !(Self::MIN..=Self::MAX).contains(&kelvin) {
            return Err(ValueError::OutOfRange {
                min: Self::MIN,
                max: Self::MAX,
                actual: kelvin,
            });
        }
        Ok(Self(kelvin))
    }

    /// Creates a color temperature, clamping to the valid range.
    #[must_use]
    pub const fn clamped(kelvin: u16) -> Self {
        if kelvin < Self::MIN {
            Self(Self::MIN)
        } else if kelvin > Self::MAX {
            Self(Self::MAX)
        } else {
            Self(kelvin)
        }
    }

    /// Returns the temperature in Kelvin.
    #[must_use]
    pub const fn kelvin(&self) -> u16 {
        self.0
    }

    /// Returns the approximate temperature in mireds.
    #[must_use]
    pub fn to_mireds(&self) -> u16 {
        #[allow(clippy::cast_possible_truncation)]
        let mireds = (1_000_000 / u32::from(self.0)) as u16;
        mireds
    }
}

impl Default for ColorTemperature {
    fn default() -> Self {
        Self::WARM_WHITE
    }
}

impl TryFrom<u16> for ColorTemperature {
    type Error = ValueError;

    fn try_from(kelvin: u16) -> Result<Self, Self::Error> {
        Self::new(kelvin)
    }
}

impl From<ColorTemperature> for u16 {
    fn from(ct: ColorTemperature) -> Self {
        ct.0
    }
}

impl fmt::Display for ColorTemperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}K", self.0)
    }
}
