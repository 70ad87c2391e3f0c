// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Brightness type for light output level.

use std::fmt;

use crate::error::ValueError;

/// Light output level as a percentage (1-100).
///
/// Zero is not a brightness: lights are switched off with
/// [`toggle`](crate::device::DeviceGroup::toggle), not dimmed to nothing.
///
/// # Examples
///
/// ```
/// use lightgrid::types::Brightness;
///
/// let level = Brightness::new(75).unwrap();
/// assert_eq!(level.value(), 75);
/// assert_eq!(Brightness::FULL.value(), 100);
/// assert!(Brightness::new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Brightness(u8);

impl Brightness {
    /// Dimmest level (1%).
    pub const MIN: Self = Self(1);

    /// Full output (100%).
    pub const FULL: Self = Self(100);

    /// Creates a new brightness level.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if value is outside [1, 100].
    pub fn new(value: u8) -> Result<Self, ValueError> {
        if !(1..=100).contains(&value) {
            return Err(ValueError::OutOfRange {
                min: 1,
                max: 100,
                actual: u16::from(value),
            });
        }
        Ok(Self(value))
    }

    /// Creates a brightness level, clamping to the valid range.
    #[must_use]
    pub const fn clamped(value: u8) -> Self {
        if value == 0 {
            Self(1)
        } else if value > 100 {
            Self(100)
        } else {
            Self(value)
        }
    }

    /// Returns the percentage value.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }
}

impl Default for Brightness {
    fn default() -> Self {
        Self::FULL
    }
}

impl fmt::Display for Brightness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}
