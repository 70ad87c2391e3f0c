// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reducing cover art to one light color.
//!
//! JPEG and PNG artwork is decoded to RGBA first. The pipeline, controlled
//! by [`SummaryPolicy`]:
//!
//! 1. pixels within the fuzz distance of pure white or pure black are made
//!    transparent, so borders and backgrounds do not wash the result out,
//! 2. the remaining pixels are quantized to a small palette,
//! 3. every palette entry gets a large saturation boost so the lights show
//!    an actual color,
//! 4. the palette is collapsed to one color, weighted by pixel count.

use crate::convert::modulate_saturation;
use crate::error::SummarizeError;
use crate::types::RgbColor;

use super::{Artwork, ImageFormat};

/// Tuning of the artwork-to-color pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryPolicy {
    /// Distance from white or black, as a percentage of the channel range,
    /// under which a pixel is discarded.
    pub fuzz_percent: u8,
    /// Palette size after quantization.
    pub colors: usize,
    /// Saturation multiplier in percent (100 = unchanged).
    pub saturation_boost_percent: u32,
}

impl SummaryPolicy {
    /// Sets the white/black fuzz distance.
    #[must_use]
    pub fn with_fuzz_percent(mut self, fuzz_percent: u8) -> Self {
        self.fuzz_percent = fuzz_percent.min(100);
        self
    }

    /// Sets the palette size.
    #[must_use]
    pub fn with_colors(mut self, colors: usize) -> Self {
        self.colors = colors;
        self
    }

    /// Sets the saturation multiplier.
    #[must_use]
    pub fn with_saturation_boost_percent(mut self, percent: u32) -> Self {
        self.saturation_boost_percent = percent;
        self
    }
}

impl Default for SummaryPolicy {
    fn default() -> Self {
        Self {
            fuzz_percent: 15,
            colors: 5,
            saturation_boost_percent: 1000,
        }
    }
}

/// Turns an image into the single color shown on the lights.
///
/// Implementations must be deterministic: the same image always yields the
/// same color.
pub trait ColorSummarizer: Send + Sync {
    /// Summarizes `artwork` to one color.
    ///
    /// # Errors
    ///
    /// Returns a [`SummarizeError`] if the image cannot be decoded or has no
    /// usable pixels.
    fn summarize(&self, artwork: &Artwork) -> Result<RgbColor, SummarizeError>;
}

/// [`ColorSummarizer`] for JPEG, PNG and raw RGBA artwork.
///
/// [`ImageFormat::Other`] media types are rejected with
/// [`SummarizeError::UnsupportedFormat`].
///
/// # Examples
///
/// ```
/// use lightgrid::music::{Artwork, ColorSummarizer, PixelSummarizer};
/// use lightgrid::types::RgbColor;
///
/// // a dark red square on a white border
/// let pixels = [
///     255, 255, 255, 255,  200, 30, 30, 255,
///     200, 30, 30, 255,    255, 255, 255, 255,
/// ];
/// let artwork = Artwork::rgba(2, 2, pixels.to_vec());
///
/// let color = PixelSummarizer::default().summarize(&artwork).unwrap();
/// assert_eq!(color, RgbColor::new(230, 0, 0));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PixelSummarizer {
    policy: SummaryPolicy,
}

impl PixelSummarizer {
    /// Creates a summarizer with a custom policy.
    #[must_use]
    pub fn new(policy: SummaryPolicy) -> Self {
        Self { policy }
    }

    /// Returns the policy.
    #[must_use]
    pub fn policy(&self) -> &SummaryPolicy {
        &self.policy
    }
}

impl PixelSummarizer {
    fn summarize_encoded(
        &self,
        bytes: &[u8],
        format: image::ImageFormat,
    ) -> Result<RgbColor, SummarizeError> {
        let decoded = image::load_from_memory_with_format(bytes, format)
            .map_err(|e| SummarizeError::Decode(e.to_string()))?
            .into_rgba8();
        self.summarize_pixels(decoded.width(), decoded.height(), decoded.as_raw())
    }

    fn summarize_pixels(
        &self,
        width: u32,
        height: u32,
        bytes: &[u8],
    ) -> Result<RgbColor, SummarizeError> {
        let expected = usize::try_from(u64::from(width) * u64::from(height) * 4).ok();
        if expected != Some(bytes.len()) {
            return Err(SummarizeError::InvalidDimensions {
                width,
                height,
                actual: bytes.len(),
            });
        }

        let pixels = opaque_pixels(bytes, self.policy.fuzz_percent);
        if pixels.is_empty() {
            return Err(SummarizeError::NoOpaquePixels);
        }

        let palette = median_cut(pixels, self.policy.colors.max(1));
        let boost = f64::from(self.policy.saturation_boost_percent);
        let boosted = palette
            .into_iter()
            .map(|(color, weight)| (modulate_saturation(color, boost), weight));

        Ok(weighted_mean(boosted))
    }
}

impl ColorSummarizer for PixelSummarizer {
    fn summarize(&self, artwork: &Artwork) -> Result<RgbColor, SummarizeError> {
        match &artwork.format {
            ImageFormat::Rgba8 { width, height } => {
                self.summarize_pixels(*width, *height, &artwork.bytes)
            }
            ImageFormat::Jpeg => self.summarize_encoded(&artwork.bytes, image::ImageFormat::Jpeg),
            ImageFormat::Png => self.summarize_encoded(&artwork.bytes, image::ImageFormat::Png),
            ImageFormat::Other(media_type) => {
                Err(SummarizeError::UnsupportedFormat(media_type.clone()))
            }
        }
    }
}

/// Returns the RGB values of pixels that are neither transparent nor within
/// the fuzz distance of white or black.
fn opaque_pixels(bytes: &[u8], fuzz_percent: u8) -> Vec<[u8; 3]> {
    let fuzz = f64::from(fuzz_percent) / 100.0 * 255.0;
    let fuzz_sq = fuzz * fuzz;

    bytes
        .chunks_exact(4)
        .filter(|px| px[3] != 0)
        .map(|px| [px[0], px[1], px[2]])
        .filter(|rgb| distance_sq(*rgb, [255; 3]) > fuzz_sq && distance_sq(*rgb, [0; 3]) > fuzz_sq)
        .collect()
}

fn distance_sq(a: [u8; 3], b: [u8; 3]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(&x, y)| {
            let d = f64::from(x) - f64::from(y);
            d * d
        })
        .sum()
}

/// Splits `pixels` into at most `target` boxes along the widest channel and
/// returns each box's mean color with its pixel count.
fn median_cut(pixels: Vec<[u8; 3]>, target: usize) -> Vec<(RgbColor, usize)> {
    let mut boxes = vec![pixels];

    while boxes.len() < target {
        let widest = boxes
            .iter()
            .enumerate()
            .map(|(i, b)| (i, widest_channel(b)))
            .filter(|(_, (_, range))| *range > 0)
            .max_by(|(ia, (_, ra)), (ib, (_, rb))| ra.cmp(rb).then(ib.cmp(ia)));

        let Some((index, (channel, _))) = widest else {
            break;
        };

        let mut pixels = boxes.swap_remove(index);
        pixels.sort_by_key(|px| px[channel]);
        let upper = pixels.split_off(pixels.len() / 2);
        boxes.push(pixels);
        boxes.push(upper);
    }

    boxes.iter().map(|b| (mean_color(b), b.len())).collect()
}

/// Returns the channel index with the largest value range and that range.
fn widest_channel(pixels: &[[u8; 3]]) -> (usize, u8) {
    (0..3)
        .map(|channel| {
            let (min, max) = pixels.iter().fold((u8::MAX, u8::MIN), |(lo, hi), px| {
                (lo.min(px[channel]), hi.max(px[channel]))
            });
            (channel, max.saturating_sub(min))
        })
        .fold((0, 0), |best, candidate| {
            if candidate.1 > best.1 { candidate } else { best }
        })
}

fn mean_color(pixels: &[[u8; 3]]) -> RgbColor {
    weighted_mean(
        pixels
            .iter()
            .map(|&[r, g, b]| (RgbColor::new(r, g, b), 1)),
    )
}

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn weighted_mean(colors: impl IntoIterator<Item = (RgbColor, usize)>) -> RgbColor {
    let mut sums = [0f64; 3];
    let mut total = 0f64;

    for (color, weight) in colors {
        let weight = weight as f64;
        sums[0] += f64::from(color.red()) * weight;
        sums[1] += f64::from(color.green()) * weight;
        sums[2] += f64::from(color.blue()) * weight;
        total += weight;
    }

    if total <= 0.0 {
        return RgbColor::black();
    }

    let channel = |sum: f64| (sum / total).round().clamp(0.0, 255.0) as u8;
    RgbColor::new(channel(sums[0]), channel(sums[1]), channel(sums[2]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(pixels: &[[u8; 4]]) -> Artwork {
        let width = u32::try_from(pixels.len()).unwrap();
        Artwork::rgba(width, 1, pixels.iter().flatten().copied().collect())
    }

    fn encoded(pixels: &[[u8; 4]], format: image::ImageFormat) -> Vec<u8> {
        let width = u32::try_from(pixels.len()).unwrap();
        let buffer =
            image::RgbaImage::from_raw(width, 1, pixels.iter().flatten().copied().collect())
                .unwrap();
        let mut decoded = image::DynamicImage::ImageRgba8(buffer);
        // the JPEG encoder has no alpha channel
        if format == image::ImageFormat::Jpeg {
            decoded = image::DynamicImage::ImageRgb8(decoded.to_rgb8());
        }

        let mut out = std::io::Cursor::new(Vec::new());
        decoded.write_to(&mut out, format).unwrap();
        out.into_inner()
    }

    #[test]
    fn png_artwork_is_decoded() {
        let pixels = [[255, 255, 255, 255], [200, 30, 30, 255], [200, 30, 30, 255]];
        let png = Artwork {
            bytes: encoded(&pixels, image::ImageFormat::Png),
            format: ImageFormat::Png,
        };

        let summarizer = PixelSummarizer::default();
        assert_eq!(summarizer.summarize(&png), summarizer.summarize(&image(&pixels)));
        assert_eq!(summarizer.summarize(&png), Ok(RgbColor::new(230, 0, 0)));
    }

    #[test]
    fn jpeg_artwork_is_decoded() {
        let blue = [[20, 40, 200, 255]; 64];
        let jpeg = Artwork {
            bytes: encoded(&blue, image::ImageFormat::Jpeg),
            format: ImageFormat::Jpeg,
        };

        let color = PixelSummarizer::default().summarize(&jpeg).unwrap();
        assert!(
            color.blue() > color.red() && color.blue() > color.green(),
            "{color:?}"
        );
    }

    #[test]
    fn truncated_and_unknown_images_are_rejected() {
        let jpeg = Artwork {
            bytes: vec![0xFF, 0xD8, 0xFF],
            format: ImageFormat::Jpeg,
        };
        assert!(matches!(
            PixelSummarizer::default().summarize(&jpeg),
            Err(SummarizeError::Decode(_))
        ));

        let webp = Artwork {
            bytes: vec![1, 2, 3],
            format: ImageFormat::Other("image/webp".into()),
        };
        assert_eq!(
            PixelSummarizer::default().summarize(&webp),
            Err(SummarizeError::UnsupportedFormat("image/webp".into()))
        );
    }

    #[test]
    fn buffer_must_match_dimensions() {
        let artwork = Artwork::rgba(2, 2, vec![0; 15]);
        assert!(matches!(
            PixelSummarizer::default().summarize(&artwork),
            Err(SummarizeError::InvalidDimensions { actual: 15, .. })
        ));
    }

    #[test]
    fn near_white_and_black_are_ignored() {
        let artwork = image(&[
            [255, 255, 255, 255],
            [240, 240, 240, 255],
            [10, 10, 10, 255],
            [0, 0, 0, 255],
            [90, 200, 40, 0],
        ]);
        assert_eq!(
            PixelSummarizer::default().summarize(&artwork),
            Err(SummarizeError::NoOpaquePixels)
        );
    }

    #[test]
    fn palette_is_weighted_by_pixel_count() {
        let red = [255, 0, 0, 255];
        let blue = [0, 0, 255, 255];

        let even = image(&[red, red, blue, blue]);
        assert_eq!(
            PixelSummarizer::default().summarize(&even).unwrap(),
            RgbColor::new(128, 0, 128)
        );

        let mostly_red = image(&[red, red, red, blue]);
        assert_eq!(
            PixelSummarizer::default().summarize(&mostly_red).unwrap(),
            RgbColor::new(191, 0, 64)
        );
    }

    #[test]
    fn muted_colors_are_boosted() {
        let artwork = image(&[[150, 110, 110, 255]; 3]);
        let unboosted = PixelSummarizer::new(
            SummaryPolicy::default().with_saturation_boost_percent(100),
        );

        assert_eq!(
            unboosted.summarize(&artwork).unwrap(),
            RgbColor::new(150, 110, 110)
        );
        let boosted = PixelSummarizer::default().summarize(&artwork).unwrap();
        assert!((boosted.to_hsl().precise_saturation() - 100.0).abs() < 0.01);
    }

    #[test]
    fn median_cut_respects_target() {
        let pixels: Vec<[u8; 3]> = (0..64u8).map(|i| [i * 4, 255 - i * 4, i]).collect();
        assert_eq!(median_cut(pixels.clone(), 5).len(), 5);
        assert_eq!(median_cut(pixels, 1).len(), 1);

        // identical pixels cannot be split
        assert_eq!(median_cut(vec![[9, 9, 9]; 10], 5).len(), 1);
    }

    #[test]
    fn summarize_is_deterministic() {
        let pixels: Vec<[u8; 4]> = (0..50u8)
            .map(|i| [i.wrapping_mul(37), i.wrapping_mul(91), i.wrapping_mul(13), 255])
            .collect();
        let artwork = image(&pixels);
        let summarizer = PixelSummarizer::default();

        assert_eq!(summarizer.summarize(&artwork), summarizer.summarize(&artwork));
    }
}
