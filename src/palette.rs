// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ready-made colors: the palette grid and the rainbow flow.

use std::time::Duration;

use rand::Rng;

use crate::error::ValueError;
use crate::flow::{ColorFlow, FlowEndAction};
use crate::types::{HslColor, RgbColor};

/// Number of colors in the palette grid (5 x 5).
pub const GRID_SIZE: usize = 25;

/// Colors of the rainbow flow, in play order.
pub const RAINBOW: [RgbColor; 5] = [
    RgbColor::new(255, 0, 0),
    RgbColor::new(0, 255, 0),
    RgbColor::new(0, 255, 255),
    RgbColor::new(0, 0, 255),
    RgbColor::new(255, 0, 255),
];

/// One cell of the palette grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteEntry {
    /// Cell color.
    pub color: RgbColor,
    /// Whether the color comes from the user's favorites.
    pub favorite: bool,
}

/// Returns a random fully lit color: any hue, saturation 50-99%, light 50%.
pub fn random_vivid_color<R: Rng + ?Sized>(rng: &mut R) -> RgbColor {
    let hue = f64::from(rng.gen_range(0u16..360));
    let saturation = f64::from(rng.gen_range(50u8..100));
    HslColor::new(hue, saturation, 50.0, u8::MAX).to_rgb()
}

/// Builds a grid of `size` colors: `favorites` first, in order, then random
/// vivid colors.
///
/// Favorites beyond `size` are left out.
///
/// # Examples
///
/// ```
/// use lightgrid::palette::{color_grid, GRID_SIZE};
/// use lightgrid::types::RgbColor;
///
/// let favorites = [RgbColor::new(255, 128, 0)];
/// let grid = color_grid(&favorites, GRID_SIZE, &mut rand::thread_rng());
///
/// assert_eq!(grid.len(), 25);
/// assert!(grid[0].favorite);
/// assert_eq!(grid[0].color, favorites[0]);
/// assert!(!grid[1].favorite);
/// ```
pub fn color_grid<R: Rng + ?Sized>(
    favorites: &[RgbColor],
    size: usize,
    rng: &mut R,
) -> Vec<PaletteEntry> {
    let pinned = favorites.iter().take(size).map(|&color| PaletteEntry {
        color,
        favorite: true,
    });

    let mut grid: Vec<PaletteEntry> = pinned.collect();
    while grid.len() < size {
        grid.push(PaletteEntry {
            color: random_vivid_color(rng),
            favorite: false,
        });
    }
    grid
}

/// Returns the rainbow flow: red, green, aqua, blue, magenta, `step` each,
/// holding magenta at the end.
///
/// # Errors
///
/// Returns `ValueError::ZeroDuration` if `step` is zero.
pub fn rainbow_flow(step: Duration) -> Result<ColorFlow, ValueError> {
    ColorFlow::builder()
        .colors(RAINBOW, step)
        .end_action(FlowEndAction::Keep)
        .build()
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn vivid_colors_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..500 {
            let hsl = random_vivid_color(&mut rng).to_hsl();
            // rounding to 8-bit channels moves saturation slightly
            assert!(hsl.precise_saturation() > 48.0, "{hsl}");
            assert!((hsl.precise_light() - 50.0).abs() < 1.0, "{hsl}");
        }
    }

    #[test]
    fn grid_favorites_come_first() {
        let mut rng = StdRng::seed_from_u64(3);
        let favorites = [RgbColor::new(1, 2, 3), RgbColor::new(4, 5, 6)];
        let grid = color_grid(&favorites, GRID_SIZE, &mut rng);

        assert_eq!(grid.len(), GRID_SIZE);
        assert_eq!(grid.iter().filter(|e| e.favorite).count(), 2);
        assert_eq!(grid[1].color, RgbColor::new(4, 5, 6));
    }

    #[test]
    fn grid_truncates_favorites() {
        let mut rng = StdRng::seed_from_u64(3);
        let favorites = vec![RgbColor::white(); 30];
        let grid = color_grid(&favorites, GRID_SIZE, &mut rng);
        assert_eq!(grid.len(), GRID_SIZE);
        assert!(grid.iter().all(|e| e.favorite));
    }

    #[test]
    fn rainbow() {
        let flow = rainbow_flow(Duration::from_millis(5000)).unwrap();
        assert_eq!(flow.steps().len(), 5);
        assert_eq!(flow.end_action(), FlowEndAction::Keep);
        assert_eq!(flow.total_duration(), Duration::from_secs(25));
        assert_eq!(flow.steps()[2].color(), RgbColor::new(0, 255, 255));
        assert!(rainbow_flow(Duration::ZERO).is_err());
    }
}
