//! The decoded, in-memory form of a palette-indexed animation.
//!
//! Decoding is left to the caller. Everything in this crate consumes an
//! [`Animation`] that has already been read from storage.

use crate::{bitmap::Bitmap, error::Error};

/// A color table. Each entry is an opaque RGB triple.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Palette {
    entries: Vec<[u8; 3]>,
}

impl Palette {
    pub fn new(entries: Vec<[u8; 3]>) -> Self {
        Self { entries }
    }

    /// Build a palette from packed `RGBRGB...` bytes. A trailing partial
    /// entry is ignored.
    pub fn from_rgb_bytes(bytes: &[u8]) -> Self {
        Self {
            entries: bytes.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: u8) -> Option<[u8; 3]> {
        self.entries.get(index as usize).copied()
    }
}

/// What happens to the canvas after a frame has been displayed.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisposalMethod {
    /// No disposal specified. Treated as a reset of the frame's region when
    /// it is drawn.
    #[default]
    Unspecified = 0,

    /// Leave the canvas as-is and draw the next frame on top.
    DoNotDispose = 1,

    /// Restore the frame's region to the background color.
    RestoreToBackground = 2,

    /// Restore the canvas to its state before this frame was drawn.
    RestoreToPrevious = 3,
}

impl From<u8> for DisposalMethod {
    /// Values 4-7 are reserved by the format and fall back to
    /// [`DisposalMethod::DoNotDispose`].
    fn from(value: u8) -> Self {
        match value {
            0 => Self::Unspecified,
            2 => Self::RestoreToBackground,
            3 => Self::RestoreToPrevious,
            _ => Self::DoNotDispose,
        }
    }
}

impl From<DisposalMethod> for u8 {
    fn from(value: DisposalMethod) -> u8 {
        value as u8
    }
}

/// Number of times an animation repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopCount {
    #[default]
    Infinite,
    Finite(u16),
}

/// A single frame: a rectangle of palette indices placed on the canvas.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    /// Horizontal offset of the frame rectangle on the canvas.
    pub left: u16,

    /// Vertical offset of the frame rectangle on the canvas.
    pub top: u16,

    /// Width of the frame rectangle in pixels.
    pub width: u16,

    /// Height of the frame rectangle in pixels.
    pub height: u16,

    /// Palette indices, row-major, `width * height` of them.
    pub pixels: Vec<u8>,

    /// Local color table. Overrides the global palette when present.
    pub palette: Option<Palette>,

    /// Index which is drawn as fully transparent.
    pub transparent: Option<u8>,

    /// How the canvas is treated once this frame has been shown.
    pub disposal: DisposalMethod,

    /// Display time in hundredths of a second. Zero means "no delay".
    pub delay: u16,
}

impl Frame {
    /// Resolve a palette index to an RGBA color.
    ///
    /// The transparent index, and indices past the end of the palette,
    /// resolve to `(0, 0, 0, 0)`.
    pub fn color(&self, palette: &Palette, index: u8) -> [u8; 4] {
        if self.transparent == Some(index) {
            return [0; 4]
        }

        match palette.get(index) {
            Some([r, g, b]) => [r, g, b, 0xFF],
            None => [0; 4],
        }
    }

    /// Render just this frame's rectangle, without any canvas, resolving its
    /// indices through `palette`.
    pub fn render(&self, palette: &Palette) -> Bitmap {
        let mut bitmap = Bitmap::new(self.width as u32, self.height as u32);
        let width = self.width.max(1) as usize;
        for (i, &index) in self.pixels.iter().enumerate() {
            let (x, y) = (i % width, i / width);
            if y >= self.height as usize {
                break
            }
            bitmap.put_pixel(x as u32, y as u32, self.color(palette, index));
        }

        bitmap
    }
}

/// A fully decoded animation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Animation {
    /// Canvas width in pixels.
    pub width: u32,

    /// Canvas height in pixels.
    pub height: u32,

    /// Frames in display order.
    pub frames: Vec<Frame>,

    /// Palette used by frames without a local one.
    pub global_palette: Option<Palette>,

    /// Index into the global palette of the background color.
    pub background_index: u8,

    pub loop_count: LoopCount,
}

impl Animation {
    /// Create an animation with no global palette and an infinite loop.
    pub fn new(width: u32, height: u32, frames: Vec<Frame>) -> Self {
        Self {
            width,
            height,
            frames,
            ..Default::default()
        }
    }

    /// The palette a frame draws with: its local palette if it has one,
    /// otherwise the global palette.
    pub fn palette_for<'a>(&'a self, frame: &'a Frame) -> Option<&'a Palette> {
        frame.palette.as_ref().or(self.global_palette.as_ref())
    }

    /// The opaque background color, if the global palette defines one.
    pub fn background_color(&self) -> Option<[u8; 4]> {
        let [r, g, b] = self.global_palette.as_ref()?.get(self.background_index)?;
        Some([r, g, b, 0xFF])
    }

    /// Display delay of every frame, in order.
    pub fn delays(&self) -> Vec<u16> {
        self.frames.iter().map(|f| f.delay).collect()
    }

    /// Check that the animation can be composed.
    pub fn validate(&self) -> Result<(), Error> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::invalid(format!(
                "canvas size must be positive, got {}x{}",
                self.width, self.height
            )))
        }

        if self.frames.is_empty() {
            return Err(Error::invalid("animation has no frames"))
        }

        for (i, frame) in self.frames.iter().enumerate() {
            let expected = frame.width as usize * frame.height as usize;
            if frame.pixels.len() != expected {
                return Err(Error::invalid(format!(
                    "frame {i} has {} pixels, expected {expected}",
                    frame.pixels.len()
                )))
            }

            if self.palette_for(frame).is_none() {
                return Err(Error::invalid(format!("frame {i} has no palette")))
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(width: u16, height: u16) -> Frame {
        Frame {
            width,
            height,
            pixels: vec![0; width as usize * height as usize],
            ..Default::default()
        }
    }

    #[test]
    fn disposal_from_byte() {
        assert_eq!(DisposalMethod::from(0), DisposalMethod::Unspecified);
        assert_eq!(DisposalMethod::from(1), DisposalMethod::DoNotDispose);
        assert_eq!(DisposalMethod::from(2), DisposalMethod::RestoreToBackground);
        assert_eq!(DisposalMethod::from(3), DisposalMethod::RestoreToPrevious);
        assert_eq!(DisposalMethod::from(7), DisposalMethod::DoNotDispose);
        assert_eq!(u8::from(DisposalMethod::RestoreToPrevious), 3);
    }

    #[test]
    fn palette_from_bytes() {
        let palette = Palette::from_rgb_bytes(&[1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(palette.len(), 2);
        assert_eq!(palette.get(1), Some([4, 5, 6]));
        assert_eq!(palette.get(2), None);
    }

    #[test]
    fn frame_color_resolution() {
        let palette = Palette::new(vec![[10, 20, 30], [40, 50, 60]]);
        let frame = Frame {
            transparent: Some(1),
            ..frame(1, 1)
        };
        assert_eq!(frame.color(&palette, 0), [10, 20, 30, 255]);
        assert_eq!(frame.color(&palette, 1), [0, 0, 0, 0]);
        assert_eq!(frame.color(&palette, 9), [0, 0, 0, 0]);
    }

    #[test]
    fn render_frame_rectangle() {
        let palette = Palette::new(vec![[10, 20, 30], [40, 50, 60]]);
        let frame = Frame {
            left: 5,
            top: 7,
            pixels: vec![0, 1, 1, 0, 1, 0],
            transparent: Some(0),
            ..frame(3, 2)
        };

        let bitmap = frame.render(&palette);
        assert_eq!(bitmap.dimensions(), (3, 2));
        assert_eq!(bitmap.pixel(0, 0), [0, 0, 0, 0]);
        assert_eq!(bitmap.pixel(1, 0), [40, 50, 60, 255]);
        assert_eq!(bitmap.pixel(0, 1), [0, 0, 0, 0]);
        assert_eq!(bitmap.pixel(1, 1), [40, 50, 60, 255]);
    }

    #[test]
    fn local_palette_overrides_global() {
        let mut animation = Animation::new(1, 1, vec![]);
        animation.global_palette = Some(Palette::new(vec![[1, 1, 1]]));
        let local = Frame {
            palette: Some(Palette::new(vec![[2, 2, 2]])),
            ..frame(1, 1)
        };
        assert_eq!(animation.palette_for(&local).unwrap().get(0), Some([2, 2, 2]));
        assert_eq!(animation.palette_for(&frame(1, 1)).unwrap().get(0), Some([1, 1, 1]));
    }

    #[test]
    fn validate_rejects_bad_animations() {
        let palette = Some(Palette::new(vec![[0, 0, 0]]));

        let mut animation = Animation::new(0, 4, vec![frame(1, 1)]);
        animation.global_palette = palette.clone();
        assert!(matches!(animation.validate(), Err(Error::InvalidAnimation(_))));

        let mut animation = Animation::new(4, 4, vec![]);
        animation.global_palette = palette.clone();
        assert!(matches!(animation.validate(), Err(Error::InvalidAnimation(_))));

        let mut short = frame(2, 2);
        short.pixels.pop();
        let mut animation = Animation::new(4, 4, vec![short]);
        animation.global_palette = palette.clone();
        assert!(matches!(animation.validate(), Err(Error::InvalidAnimation(_))));

        let animation = Animation::new(4, 4, vec![frame(2, 2)]);
        assert!(matches!(animation.validate(), Err(Error::InvalidAnimation(_))));

        let mut animation = Animation::new(4, 4, vec![frame(2, 2)]);
        animation.global_palette = palette;
        assert_eq!(animation.validate(), Ok(()));
    }

    #[test]
    fn background_color_needs_global_palette() {
        let mut animation = Animation::new(1, 1, vec![]);
        assert_eq!(animation.background_color(), None);

        animation.global_palette = Some(Palette::new(vec![[0, 0, 0], [9, 8, 7]]));
        animation.background_index = 1;
        assert_eq!(animation.background_color(), Some([9, 8, 7, 255]));

        animation.background_index = 5;
        assert_eq!(animation.background_color(), None);
    }
}
