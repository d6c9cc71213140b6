//! Perceptual differences between images, measured in CIE L\*a\*b\*.
//!
//! Comparing each composed frame against the averaged centroid of an
//! animation gives a per-frame distinctiveness score: `0.0` for a frame that
//! is perceptually identical to the centroid, approaching `1.0` as more of
//! its pixels differ.

use rayon::prelude::*;

use crate::{bitmap::Bitmap, error::Error};

/// Reference white (D65) in XYZ.
const WHITE_X: f64 = 0.95047;
const WHITE_Y: f64 = 1.00000;
const WHITE_Z: f64 = 1.08883;

/// Below this, the Lab transfer function switches to its linear segment.
const LAB_KNEE: f64 = 0.008856;

/// Distance, in ΔE units, which maps to the largest value of a [`DiffMap`]
/// when using [`diff_images`].
pub const DEFAULT_DIFF_FULL_SCALE: f64 = 1.0;

/// A color in CIE L\*a\*b\*.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lab {
    pub l: f64,
    pub a: f64,
    pub b: f64,
}

impl Lab {
    /// CIE76 color difference: the Euclidean distance in Lab space.
    pub fn delta_e(self, other: Lab) -> f64 {
        ((self.l - other.l).powi(2) + (self.a - other.a).powi(2) + (self.b - other.b).powi(2)).sqrt()
    }
}

/// Decode an sRGB channel in `[0, 1]` to linear light.
pub fn gamma_decode(v: f64) -> f64 {
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

fn lab_transfer(v: f64) -> f64 {
    if v > LAB_KNEE {
        v.cbrt()
    } else {
        (903.3 * v + 16.0) / 116.0
    }
}

/// Convert an 8 bit sRGB color to CIE L\*a\*b\*.
pub fn rgb_to_lab(rgb: [u8; 3]) -> Lab {
    let [r, g, b] = rgb.map(|c| gamma_decode(c as f64 / 255.0));

    let x = r * 0.4124 + g * 0.3576 + b * 0.1805;
    let y = r * 0.2126 + g * 0.7152 + b * 0.0722;
    let z = r * 0.0193 + g * 0.1192 + b * 0.9505;

    let fx = lab_transfer(x / WHITE_X);
    let fy = lab_transfer(y / WHITE_Y);
    let fz = lab_transfer(z / WHITE_Z);

    Lab {
        l: (116.0 * fy - 16.0).max(0.0),
        a: 500.0 * (fx - fy),
        b: 200.0 * (fy - fz),
    }
}

/// Per-pixel perceptual distances between two images, as 16 bit magnitudes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffMap {
    width: u32,
    height: u32,
    data: Vec<u16>,
}

impl DiffMap {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Distances in row-major order.
    pub fn as_raw(&self) -> &[u16] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u16> {
        self.data
    }

    pub fn get(&self, x: u32, y: u32) -> Option<u16> {
        if x >= self.width || y >= self.height {
            return None
        }

        self.data.get(y as usize * self.width as usize + x as usize).copied()
    }
}

/// Scale a ΔE distance into the 16 bit range, clamping at the top.
fn quantize_distance(delta_e: f64, full_scale: f64) -> u16 {
    (delta_e / full_scale * u16::MAX as f64).clamp(0.0, u16::MAX as f64) as u16
}

/// Compare two images pixel by pixel. Alpha is ignored.
///
/// Uses [`DEFAULT_DIFF_FULL_SCALE`], so any pixel at least one ΔE unit away
/// saturates.
pub fn diff_images(a: &Bitmap, b: &Bitmap) -> Result<DiffMap, Error> {
    diff_images_scaled(a, b, DEFAULT_DIFF_FULL_SCALE)
}

/// Compare two images pixel by pixel, mapping a distance of `full_scale` ΔE
/// to [`u16::MAX`].
pub fn diff_images_scaled(a: &Bitmap, b: &Bitmap, full_scale: f64) -> Result<DiffMap, Error> {
    if a.dimensions() != b.dimensions() {
        return Err(Error::DimensionMismatch {
            expected: a.dimensions(),
            found: b.dimensions(),
        })
    }

    let data = a
        .pixels()
        .zip(b.pixels())
        .map(|(pa, pb)| {
            if pa[..3] == pb[..3] {
                return 0
            }

            let la = rgb_to_lab([pa[0], pa[1], pa[2]]);
            let lb = rgb_to_lab([pb[0], pb[1], pb[2]]);
            quantize_distance(la.delta_e(lb), full_scale)
        })
        .collect();

    Ok(DiffMap {
        width: a.width(),
        height: a.height(),
        data,
    })
}

/// Mean normalized distance of a diff map, in `[0, 1]`.
pub fn summarize(map: &DiffMap) -> Result<f64, Error> {
    if map.data.is_empty() {
        return Err(Error::EmptyImage)
    }

    let sum: f64 = map.data.iter().map(|&d| d as f64 / u16::MAX as f64).sum();
    Ok(sum / map.data.len() as f64)
}

/// Distinctiveness of every frame from a centroid image, computed in
/// parallel. The output is in the same order as `frames`.
pub fn distinctiveness(frames: &[Bitmap], centroid: &Bitmap) -> Result<Vec<f64>, Error> {
    distinctiveness_scaled(frames, centroid, DEFAULT_DIFF_FULL_SCALE)
}

/// [`distinctiveness`] with an explicit ΔE full scale.
pub fn distinctiveness_scaled(frames: &[Bitmap], centroid: &Bitmap, full_scale: f64) -> Result<Vec<f64>, Error> {
    frames
        .par_iter()
        .map(|frame| summarize(&diff_images_scaled(frame, centroid, full_scale)?))
        .collect()
}
