//! Shannon entropy of an image's color distribution.
//!
//! Entropy is used as a stand-in for how visually busy a frame is: a single
//! flat color scores `0.0`, and every additional equally common color pushes
//! the score up towards `log2(colors)`.

use std::{collections::HashMap, hash::Hash};

use crate::{bitmap::Bitmap, error::Error};

/// Luma weights for 16-bit channels, scaled by `2^24`.
const LUMA_R: u32 = 19595;
const LUMA_G: u32 = 38470;
const LUMA_B: u32 = 7471;

/// Build a histogram of quantized colors.
///
/// Channels are already stored with 8 bits of precision, which is the
/// quantization level used for the key, so each pixel is its own key.
pub fn histogram(image: &Bitmap) -> HashMap<[u8; 4], usize> {
    let mut hist = HashMap::new();
    for pixel in image.pixels() {
        *hist.entry(pixel).or_insert(0) += 1;
    }

    hist
}

/// Compute `-Σ p * log2(p)` over a histogram containing `total` samples.
pub fn histogram_entropy<K: Eq + Hash>(hist: &HashMap<K, usize>, total: usize) -> f64 {
    let total = total as f64;
    hist.values()
        .filter(|&&n| n > 0)
        .map(|&n| {
            let p = n as f64 / total;
            -p * p.log2()
        })
        .sum()
}

/// Shannon entropy of an image's color distribution, in bits.
pub fn measure_entropy(image: &Bitmap) -> Result<f64, Error> {
    if image.pixel_count() == 0 {
        return Err(Error::EmptyImage)
    }

    Ok(histogram_entropy(&histogram(image), image.pixel_count()))
}

/// Luma of a color with 8 bit channels. Alpha is ignored.
pub fn luma(pixel: [u8; 4]) -> u8 {
    // Widen to 16 bits the same way `v * 0x101` does, weight, then take the
    // top 8 bits with rounding.
    let r = pixel[0] as u32 * 0x101;
    let g = pixel[1] as u32 * 0x101;
    let b = pixel[2] as u32 * 0x101;

    ((LUMA_R * r + LUMA_G * g + LUMA_B * b + (1 << 15)) >> 24) as u8
}

/// Convert an image to opaque grayscale.
pub fn to_gray(image: &Bitmap) -> Bitmap {
    let mut gray = image.clone();
    for pixel in gray.as_raw_mut().chunks_exact_mut(Bitmap::CHANNELS) {
        let y = luma([pixel[0], pixel[1], pixel[2], pixel[3]]);
        pixel.copy_from_slice(&[y, y, y, 0xFF]);
    }

    gray
}

/// Shannon entropy of an image after grayscale conversion.
///
/// Never larger than [`measure_entropy`] of the same image, since several
/// colors can share a luma value.
pub fn measure_gray_entropy(image: &Bitmap) -> Result<f64, Error> {
    measure_entropy(&to_gray(image))
}

/// Which entropy measure to score frames with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntropyMode {
    /// Entropy over full RGBA colors.
    #[default]
    Color,

    /// Entropy over luma only.
    Gray,
}

impl EntropyMode {
    pub fn score(self, image: &Bitmap) -> Result<f64, Error> {
        match self {
            EntropyMode::Color => measure_entropy(image),
            EntropyMode::Gray => measure_gray_entropy(image),
        }
    }
}
