//! Picking the single composed frame that best represents an animation.

use rayon::prelude::*;
use tracing::{debug, trace};

use crate::{
    animation::Animation,
    bitmap::Bitmap,
    compositor::{compose_all_with, Compositor, DisposalPolicy},
    entropy::EntropyMode,
    error::Error,
};

/// The frame chosen to represent an animation.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Index of the frame within the animation.
    pub index: usize,

    /// The composed canvas after that frame was drawn.
    pub image: Bitmap,

    /// Score the frame was selected with.
    pub score: f64,
}

/// Select the composed frame with the strictly greatest score.
///
/// Frames are composed and scored one at a time; only the current best image
/// is kept. On ties the earliest frame wins.
pub fn select_representative<F>(animation: &Animation, score_fn: F) -> Result<Selection, Error>
where
    F: Fn(&Bitmap) -> Result<f64, Error>,
{
    select_composed(Compositor::new(animation)?, score_fn)
}

/// Select the best of an already running sequence of composed frames, such
/// as a [`Compositor`] with a non-default [`DisposalPolicy`].
pub fn select_composed<I, F>(composed: I, score_fn: F) -> Result<Selection, Error>
where
    I: IntoIterator<Item = (usize, Bitmap)>,
    F: Fn(&Bitmap) -> Result<f64, Error>,
{
    let mut best: Option<Selection> = None;

    for (index, image) in composed {
        let score = score_fn(&image)?;
        trace!(index, score, "scored frame");

        if beats(score, best.as_ref().map(|b| b.score)) {
            debug!(index, score, "new best frame");
            best = Some(Selection { index, image, score });
        }
    }

    best.ok_or_else(|| Error::invalid("animation has no frames"))
}

/// Score frames in parallel. The output is in the same order as the input.
pub fn score_frames(frames: &[Bitmap], mode: EntropyMode) -> Result<Vec<f64>, Error> {
    frames.par_iter().map(|frame| mode.score(frame)).collect()
}

/// Whether `score` replaces the incumbent best score.
///
/// Nothing to beat means the frame is accepted. Otherwise only a strictly
/// greater score wins, so ties keep the earlier frame, and a `NaN` incumbent
/// is replaced by any comparable score.
fn beats(score: f64, incumbent: Option<f64>) -> bool {
    match incumbent {
        None => true,
        Some(best) if best.is_nan() => !score.is_nan(),
        Some(best) => score > best,
    }
}

/// Reduce scores to the index and value of the first strict maximum, using
/// the same rule as [`select_representative`]. Returns `None` only for an
/// empty slice.
pub fn select_from_scores(scores: &[f64]) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (index, &score) in scores.iter().enumerate() {
        if beats(score, best.map(|(_, s)| s)) {
            best = Some((index, score));
        }
    }

    best
}

/// Like [`select_representative`], but composes every frame first and scores
/// them in parallel.
///
/// Composition itself stays sequential since each frame depends on the
/// canvas left behind by the previous one.
pub fn select_representative_par(animation: &Animation, mode: EntropyMode) -> Result<Selection, Error> {
    select_representative_par_with(animation, DisposalPolicy::default(), mode)
}

/// [`select_representative_par`] with an explicit disposal policy.
pub fn select_representative_par_with(
    animation: &Animation,
    policy: DisposalPolicy,
    mode: EntropyMode,
) -> Result<Selection, Error> {
    let mut frames = compose_all_with(animation, policy)?;
    let scores = score_frames(&frames, mode)?;

    let (index, score) = select_from_scores(&scores)
        .ok_or_else(|| Error::invalid("animation has no frames"))?;
    debug!(index, score, "selected frame");

    Ok(Selection {
        index,
        image: frames.swap_remove(index),
        score,
    })
}
