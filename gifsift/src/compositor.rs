//! Replays frames onto a canvas to reconstruct what is visible after each
//! frame is drawn.

use tracing::debug;

use crate::{
    animation::{Animation, DisposalMethod, Frame, Palette},
    bitmap::Bitmap,
    error::Error,
};

/// Which disposal semantics the [`Compositor`] follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisposalPolicy {
    /// Frames with [`DisposalMethod::Unspecified`] replace their rectangle,
    /// every other frame is drawn over the canvas. Nothing is ever restored:
    /// [`DisposalMethod::RestoreToBackground`] and
    /// [`DisposalMethod::RestoreToPrevious`] both behave like
    /// [`DisposalMethod::DoNotDispose`].
    #[default]
    Legacy,

    /// GIF89a disposal. Every frame is drawn over the canvas, then once it
    /// has been emitted its rectangle is cleared to the background color, or
    /// the whole canvas reverted to its state before the frame was drawn, as
    /// the frame's disposal method requests.
    Gif89a,
}

/// How a frame's pixels are combined with the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DrawOp {
    /// Opaque pixels replace the canvas, transparent ones leave it alone.
    Over,

    /// Every pixel in the frame rectangle overwrites the canvas, including
    /// transparent ones.
    Replace,
}

/// Produces the composed frames of an [`Animation`], in order.
///
/// The canvas is owned by the compositor and never handed out. Every item is
/// a deep copy taken right after the frame was drawn, so callers may hold on
/// to as many of them as they like.
pub struct Compositor<'a> {
    animation: &'a Animation,
    policy: DisposalPolicy,
    canvas: Bitmap,
    next: usize,
}

impl<'a> Compositor<'a> {
    /// Create a compositor using [`DisposalPolicy::Legacy`].
    pub fn new(animation: &'a Animation) -> Result<Self, Error> {
        Self::with_policy(animation, DisposalPolicy::default())
    }

    /// Create a compositor with the given disposal policy. The animation is
    /// validated before anything is drawn.
    pub fn with_policy(animation: &'a Animation, policy: DisposalPolicy) -> Result<Self, Error> {
        animation.validate()?;

        Ok(Self {
            animation,
            policy,
            canvas: Bitmap::new(animation.width, animation.height),
            next: 0,
        })
    }

    pub fn policy(&self) -> DisposalPolicy {
        self.policy
    }

    fn legacy_step(&mut self, frame: &Frame, palette: &Palette) -> Bitmap {
        let op = match frame.disposal {
            DisposalMethod::Unspecified => DrawOp::Replace,
            DisposalMethod::DoNotDispose
            | DisposalMethod::RestoreToBackground
            | DisposalMethod::RestoreToPrevious => DrawOp::Over,
        };

        draw_frame(&mut self.canvas, frame, palette, op);
        self.canvas.clone()
    }

    fn gif89a_step(&mut self, frame: &Frame, palette: &Palette) -> Bitmap {
        let previous = (frame.disposal == DisposalMethod::RestoreToPrevious)
            .then(|| self.canvas.clone());

        draw_frame(&mut self.canvas, frame, palette, DrawOp::Over);
        let composed = self.canvas.clone();

        match frame.disposal {
            DisposalMethod::RestoreToBackground => {
                let background = match self.animation.background_color() {
                    Some(color) if frame.transparent != Some(self.animation.background_index) => color,
                    _ => [0; 4],
                };
                self.canvas.fill_rect(
                    frame.left as u32,
                    frame.top as u32,
                    frame.width as u32,
                    frame.height as u32,
                    background,
                );
            }
            DisposalMethod::RestoreToPrevious => {
                if let Some(previous) = previous {
                    self.canvas = previous;
                }
            }
            DisposalMethod::Unspecified | DisposalMethod::DoNotDispose => (),
        }

        composed
    }
}

impl Iterator for Compositor<'_> {
    type Item = (usize, Bitmap);

    fn next(&mut self) -> Option<Self::Item> {
        let animation = self.animation;
        let index = self.next;
        let frame = animation.frames.get(index)?;
        self.next += 1;

        // Checked by `Animation::validate`
        let palette = animation.palette_for(frame)?;

        let composed = match self.policy {
            DisposalPolicy::Legacy => self.legacy_step(frame, palette),
            DisposalPolicy::Gif89a => self.gif89a_step(frame, palette),
        };

        debug!(index, disposal = ?frame.disposal, policy = ?self.policy, "composed frame");

        Some((index, composed))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.animation.frames.len() - self.next.min(self.animation.frames.len());
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Compositor<'_> {}

/// Draw a frame's rectangle onto the canvas, clipped to the canvas bounds.
fn draw_frame(canvas: &mut Bitmap, frame: &Frame, palette: &Palette, op: DrawOp) {
    let left = frame.left as u32;
    let top = frame.top as u32;
    let right = (left + frame.width as u32).min(canvas.width());
    let bottom = (top + frame.height as u32).min(canvas.height());

    for y in top..bottom {
        let row = (y - top) as usize * frame.width as usize;
        for x in left..right {
            let index = frame.pixels[row + (x - left) as usize];
            let color = frame.color(palette, index);

            match op {
                DrawOp::Replace => canvas.put_pixel(x, y, color),
                DrawOp::Over if color[3] != 0 => canvas.put_pixel(x, y, color),
                DrawOp::Over => (),
            }
        }
    }
}

/// Start composing an animation with the default disposal policy.
///
/// Fails with [`Error::InvalidAnimation`] before any frame is produced if the
/// animation cannot be composed.
pub fn compose_frames(animation: &Animation) -> Result<Compositor<'_>, Error> {
    Compositor::new(animation)
}

/// Compose every frame of an animation up front.
pub fn compose_all(animation: &Animation) -> Result<Vec<Bitmap>, Error> {
    compose_all_with(animation, DisposalPolicy::default())
}

/// Compose every frame of an animation up front with the given policy.
pub fn compose_all_with(animation: &Animation, policy: DisposalPolicy) -> Result<Vec<Bitmap>, Error> {
    Ok(Compositor::with_policy(animation, policy)?
        .map(|(_, bitmap)| bitmap)
        .collect())
}
