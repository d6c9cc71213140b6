//! Delay-weighted averaging of composed frames into a single centroid image.

use rayon::prelude::*;
use tracing::debug;

use crate::{animation::Animation, bitmap::Bitmap, compositor::compose_all, error::Error};

/// Weight of a frame in the average. Frames shown longer count more, and a
/// zero delay still counts as the smallest nonzero weight.
pub fn frame_weight(delay: u16) -> u64 {
    if delay == 0 {
        1
    } else {
        delay as u64
    }
}

/// Average frames channel by channel, weighting each by its delay.
///
/// Sums are accumulated in `u64` and divided by the total weight with
/// flooring integer division, so `(0 * 1 + 255 * 3) / 4` becomes `191`.
pub fn average_frames(frames: &[Bitmap], delays: &[u16]) -> Result<Bitmap, Error> {
    let Some(first) = frames.first() else {
        return Err(Error::invalid("no frames to average"))
    };

    if frames.len() != delays.len() {
        return Err(Error::DimensionMismatch {
            expected: (frames.len() as u32, 1),
            found: (delays.len() as u32, 1),
        })
    }

    if let Some(frame) = frames.iter().find(|f| f.dimensions() != first.dimensions()) {
        return Err(Error::DimensionMismatch {
            expected: first.dimensions(),
            found: frame.dimensions(),
        })
    }

    let (width, height) = first.dimensions();
    if first.pixel_count() == 0 {
        return Ok(Bitmap::new(width, height))
    }

    let weights: Vec<u64> = delays.iter().map(|&d| frame_weight(d)).collect();
    let weight_sum: u64 = weights.iter().sum();
    debug!(frames = frames.len(), weight_sum, "averaging frames");

    let row_len = width as usize * Bitmap::CHANNELS;
    let mut averaged = Bitmap::new(width, height);
    averaged
        .as_raw_mut()
        .par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| {
            let start = y * row_len;
            let mut acc = vec![0u64; row_len];

            for (frame, &weight) in frames.iter().zip(&weights) {
                let src = &frame.as_raw()[start..start + row_len];
                for (a, &v) in acc.iter_mut().zip(src) {
                    *a += v as u64 * weight;
                }
            }

            for (out, a) in row.iter_mut().zip(acc) {
                *out = (a / weight_sum) as u8;
            }
        });

    Ok(averaged)
}

/// Compose an animation and average its frames using each frame's delay.
pub fn average_animation(animation: &Animation) -> Result<Bitmap, Error> {
    let frames = compose_all(animation)?;
    average_frames(&frames, &animation.delays())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::animation::{DisposalMethod, Frame, Palette};

    fn solid(width: u32, height: u32, color: [u8; 4]) -> Bitmap {
        let mut bitmap = Bitmap::new(width, height);
        bitmap.fill_rect(0, 0, width, height, color);
        bitmap
    }

    #[test]
    fn zero_delays_weigh_one() {
        let frame = solid(1, 1, [10, 20, 30, 40]);
        let avg = average_frames(&[frame.clone(), frame.clone()], &[0, 0]).unwrap();
        assert_eq!(avg, frame);
    }

    #[test]
    fn weighted_and_floored() {
        let black = solid(1, 1, [0, 0, 0, 255]);
        let white = solid(1, 1, [255, 255, 255, 255]);
        let avg = average_frames(&[black, white], &[1, 3]).unwrap();
        assert_eq!(avg.pixel(0, 0), [191, 191, 191, 255]);
    }

    #[test]
    fn zero_delay_mixes_with_nonzero() {
        let a = solid(2, 1, [0, 0, 0, 0]);
        let b = solid(2, 1, [100, 100, 100, 100]);
        // weights 1 and 4
        let avg = average_frames(&[a, b], &[0, 4]).unwrap();
        assert!(avg.pixels().all(|p| p == [80, 80, 80, 80]));
    }

    #[test]
    fn multi_row_average_keeps_dimensions() {
        let mut a = Bitmap::new(3, 2);
        a.put_pixel(2, 1, [200, 100, 50, 255]);
        let b = solid(3, 2, [0, 0, 0, 255]);

        let avg = average_frames(&[a, b], &[1, 1]).unwrap();
        assert_eq!(avg.dimensions(), (3, 2));
        assert_eq!(avg.as_raw().len(), 3 * 2 * Bitmap::CHANNELS);
        assert_eq!(avg.pixel(2, 1), [100, 50, 25, 255]);
        assert_eq!(avg.pixel(0, 0), [0, 0, 0, 127]);
    }

    #[test]
    fn channels_are_independent() {
        let a = solid(1, 2, [255, 0, 0, 255]);
        let b = solid(1, 2, [0, 0, 255, 0]);
        let avg = average_frames(&[a, b], &[1, 1]).unwrap();
        assert_eq!(avg.pixel(0, 1), [127, 0, 127, 127]);
    }

    #[test]
    fn mismatches_fail() {
        let a = solid(2, 2, [0; 4]);
        let b = solid(2, 3, [0; 4]);
        assert_eq!(
            average_frames(&[a.clone(), b], &[1, 1]),
            Err(Error::DimensionMismatch { expected: (2, 2), found: (2, 3) })
        );
        assert!(matches!(
            average_frames(&[a.clone(), a], &[1]),
            Err(Error::DimensionMismatch { .. })
        ));
        assert!(matches!(average_frames(&[], &[]), Err(Error::InvalidAnimation(_))));
    }

    #[test]
    fn averages_a_composed_animation() {
        let frame = |index: u8, delay: u16| Frame {
            width: 1,
            height: 1,
            pixels: vec![index],
            disposal: DisposalMethod::DoNotDispose,
            delay,
            ..Default::default()
        };
        let animation = Animation {
            global_palette: Some(Palette::new(vec![[0, 0, 0], [200, 100, 50]])),
            ..Animation::new(1, 1, vec![frame(0, 3), frame(1, 1)])
        };

        let avg = average_animation(&animation).unwrap();
        assert_eq!(avg.pixel(0, 0), [50, 25, 12, 255]);
    }

    proptest! {
        #[test]
        fn average_stays_within_channel_range(
            values in prop::collection::vec((any::<[u8; 4]>(), any::<u16>()), 1..8),
        ) {
            let frames: Vec<_> = values.iter().map(|(c, _)| solid(1, 1, *c)).collect();
            let delays: Vec<_> = values.iter().map(|(_, d)| *d).collect();
            let avg = average_frames(&frames, &delays).unwrap().pixel(0, 0);

            for channel in 0..4 {
                let min = values.iter().map(|(c, _)| c[channel]).min().unwrap();
                let max = values.iter().map(|(c, _)| c[channel]).max().unwrap();
                prop_assert!(min <= avg[channel] && avg[channel] <= max);
            }
        }
    }
}
