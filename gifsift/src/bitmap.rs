/// An RGBA image with 8 bits per channel, stored row-major with 4 bytes per
/// pixel.
///
/// Composed frames, averaged centroids and grayscale conversions are all
/// handed around as [`Bitmap`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    bitmap: Vec<u8>,
}

impl Bitmap {
    /// Number of bytes making up one pixel.
    pub const CHANNELS: usize = 4;

    /// Create a fully transparent bitmap of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bitmap: vec![0; width as usize * height as usize * Self::CHANNELS],
        }
    }

    /// Wrap an existing RGBA8 buffer. Returns `None` if the buffer length
    /// does not match `width * height * 4`.
    pub fn from_raw(width: u32, height: u32, bitmap: Vec<u8>) -> Option<Self> {
        if bitmap.len() != width as usize * height as usize * Self::CHANNELS {
            return None
        }

        Some(Self {
            width,
            height,
            bitmap,
        })
    }

    /// Width of the bitmap in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height of the bitmap in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)` of the bitmap.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * Self::CHANNELS
    }

    /// Get the pixel at the given position.
    ///
    /// # Panics
    /// Panics if the position lies outside of the bitmap.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");
        let i = self.offset(x, y);
        self.bitmap[i..i + Self::CHANNELS].try_into().unwrap()
    }

    /// Set the pixel at the given position.
    ///
    /// # Panics
    /// Panics if the position lies outside of the bitmap.
    pub fn put_pixel(&mut self, x: u32, y: u32, color: [u8; 4]) {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");
        let i = self.offset(x, y);
        self.bitmap[i..i + Self::CHANNELS].copy_from_slice(&color);
    }

    /// Iterate over every pixel in row-major order.
    pub fn pixels(&self) -> impl ExactSizeIterator<Item = [u8; 4]> + '_ {
        self.bitmap
            .chunks_exact(Self::CHANNELS)
            .map(|p| [p[0], p[1], p[2], p[3]])
    }

    /// Fill a rectangle with a single color. The rectangle is clipped to the
    /// bitmap.
    pub fn fill_rect(&mut self, left: u32, top: u32, width: u32, height: u32, color: [u8; 4]) {
        let right = left.saturating_add(width).min(self.width);
        let bottom = top.saturating_add(height).min(self.height);

        for y in top.min(bottom)..bottom {
            for x in left.min(right)..right {
                self.put_pixel(x, y, color);
            }
        }
    }

    /// Borrow the underlying RGBA8 bytes.
    pub fn as_raw(&self) -> &[u8] {
        &self.bitmap
    }

    pub(crate) fn as_raw_mut(&mut self) -> &mut [u8] {
        &mut self.bitmap
    }

    /// Consume the bitmap, returning the underlying RGBA8 bytes.
    pub fn into_raw(self) -> Vec<u8> {
        self.bitmap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_is_transparent() {
        let bitmap = Bitmap::new(3, 2);
        assert_eq!(bitmap.pixel_count(), 6);
        assert!(bitmap.pixels().all(|p| p == [0, 0, 0, 0]));
    }

    #[test]
    fn from_raw_checks_length() {
        assert!(Bitmap::from_raw(2, 2, vec![0; 15]).is_none());
        assert!(Bitmap::from_raw(2, 2, vec![0; 16]).is_some());
    }

    #[test]
    fn put_and_get() {
        let mut bitmap = Bitmap::new(4, 4);
        bitmap.put_pixel(3, 2, [1, 2, 3, 4]);
        assert_eq!(bitmap.pixel(3, 2), [1, 2, 3, 4]);
        assert_eq!(&bitmap.as_raw()[(2 * 4 + 3) * 4..][..4], &[1, 2, 3, 4]);
    }

    #[test]
    fn fill_rect_is_clipped() {
        let mut bitmap = Bitmap::new(3, 3);
        bitmap.fill_rect(2, 2, 10, 10, [9, 9, 9, 255]);
        assert_eq!(bitmap.pixel(2, 2), [9, 9, 9, 255]);
        assert_eq!(bitmap.pixels().filter(|p| p[3] == 255).count(), 1);
    }
}
