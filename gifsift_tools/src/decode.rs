use std::{fs::File, io::{BufReader, Read}, path::Path};

use anyhow::{Context, Result};
use gif::{ColorOutput, DecodeOptions, Repeat};
use gifsift::{Animation, Bitmap, DisposalMethod, Frame, LoopCount, Palette};
use image::RgbaImage;

/// Open and fully decode a GIF file.
pub fn open_gif<P: AsRef<Path>>(path: P) -> Result<Animation> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("Could not open {:?}", path))?;

    read_gif(BufReader::new(file)).with_context(|| format!("Could not decode {:?}", path))
}

/// Decode a GIF from anything that implements [Read], keeping frames as
/// palette indices.
pub fn read_gif<R: Read>(input: R) -> Result<Animation> {
    let mut options = DecodeOptions::new();
    options.set_color_output(ColorOutput::Indexed);

    let mut decoder = options.read_info(input)?;

    let width = decoder.width() as u32;
    let height = decoder.height() as u32;
    let global_palette = decoder.global_palette().map(Palette::from_rgb_bytes);
    let background_index = decoder.bg_color().unwrap_or(0) as u8;

    let mut frames = Vec::new();
    while let Some(frame) = decoder.read_next_frame()? {
        frames.push(Frame {
            left: frame.left,
            top: frame.top,
            width: frame.width,
            height: frame.height,
            pixels: frame.buffer.to_vec(),
            palette: frame.palette.as_deref().map(Palette::from_rgb_bytes),
            transparent: frame.transparent,
            disposal: DisposalMethod::from(frame.dispose as u8),
            delay: frame.delay,
        });
    }

    // The loop extension sits before the first frame, so it is known by now
    let loop_count = match decoder.repeat() {
        Repeat::Infinite => LoopCount::Infinite,
        Repeat::Finite(n) => LoopCount::Finite(n),
    };

    Ok(Animation {
        width,
        height,
        frames,
        global_palette,
        background_index,
        loop_count,
    })
}

/// Open any still image the `image` crate understands as an alpha
/// premultiplied RGBA bitmap.
pub fn open_still<P: AsRef<Path>>(path: P) -> Result<Bitmap> {
    let path = path.as_ref();
    let image = image::open(path)
        .with_context(|| format!("Failed to load image {:?}", path))?
        .into_rgba8();

    still_from_rgba(image).with_context(|| format!("Image {:?} has an unexpected buffer size", path))
}

/// Premultiply every pixel of a decoded still image and wrap it as a bitmap.
///
/// Fully transparent pixels end up as `[0, 0, 0, 0]` whatever color they
/// were stored with, so they count as a single color when scored.
pub fn still_from_rgba(mut image: RgbaImage) -> Option<Bitmap> {
    for pixel in image.pixels_mut() {
        pixel.0 = premultiply(pixel.0);
    }

    let (width, height) = image.dimensions();
    Bitmap::from_raw(width, height, image.into_raw())
}

/// Scale the color channels by alpha. The math is done on 16 bit channels
/// and truncated back to 8 bits.
pub fn premultiply([r, g, b, a]: [u8; 4]) -> [u8; 4] {
    let a16 = a as u32 * 0x101;
    let scale = |c: u8| ((c as u32 * 0x101 * a16 / 0xFFFF) / 0x101) as u8;

    [scale(r), scale(g), scale(b), a]
}
