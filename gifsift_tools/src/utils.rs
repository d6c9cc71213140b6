use std::{
    ffi::OsString,
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use gifsift::{Bitmap, DiffMap, DisposalPolicy};
use image::{ImageBuffer, Luma, RgbaImage};
use text_io::read;
use tracing::warn;

#[derive(Debug, Clone, Copy)]
pub enum Assume {
    Yes,
    No,
}

pub fn disposal_policy(s: &str) -> Result<DisposalPolicy, String> {
    if !s.is_ascii() {
        return Err(format!("Invalid disposal policy {}", s))
    }

    let s_lower = s.to_lowercase();

    let policy = match s_lower.as_str() {
        "legacy" => DisposalPolicy::Legacy,
        "gif89a" => DisposalPolicy::Gif89a,
        _ => return Err(format!("Invalid disposal policy {}", s)),
    };

    Ok(policy)
}

/// Replace the extension of `path` (if any) with `suffix`.
///
/// Ex. `dir/anim.gif` with `_one.png` becomes `dir/anim_one.png`
pub fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.file_stem().unwrap_or_default().to_owned();
    name.push(suffix);
    path.with_file_name(name)
}

/// The input path with its extension removed, used as a default output
/// directory.
pub fn strip_extension(path: &Path) -> PathBuf {
    path.with_extension("")
}

pub fn exists_decision<P: AsRef<Path>>(place: &str, action: &str, path: &P, assume: Option<Assume>) -> bool {
    let path = path.as_ref();

    match assume {
        Some(Assume::Yes) => return true,
        Some(Assume::No) => return false,
        None => (),
    }

    loop {
        print!("{place} file {path:?} already exists. {action}? [y/N] ");
        let _ = std::io::stdout().flush();

        let opt: String = read!("{}\n");
        let opt = opt.trim().to_lowercase();

        if opt.is_empty() || opt == "n" {
            return false
        } else if opt == "y" {
            return true
        }
    }
}

/// Whether an output file may be written, asking the user if it already
/// exists.
pub fn may_write(path: &Path, assume: Option<Assume>) -> Result<bool> {
    if path.try_exists()? && !exists_decision("Output", "Overwrite", &path, assume) {
        warn!("Skipping existing output {:?}", path);
        return Ok(false)
    }

    Ok(true)
}

/// Save a bitmap as PNG.
pub fn write_png(bitmap: &Bitmap, path: &Path) -> Result<()> {
    let image = RgbaImage::from_raw(bitmap.width(), bitmap.height(), bitmap.as_raw().to_vec())
        .context("Bitmap buffer does not match its dimensions")?;

    image.save(path).with_context(|| format!("Could not write {:?}", path))?;

    Ok(())
}

/// Save a diff map as a 16 bit grayscale PNG.
pub fn write_diff_png(map: &DiffMap, path: &Path) -> Result<()> {
    let image: ImageBuffer<Luma<u16>, Vec<u16>> =
        ImageBuffer::from_raw(map.width(), map.height(), map.as_raw().to_vec())
            .context("Diff map buffer does not match its dimensions")?;

    image.save(path).with_context(|| format!("Could not write {:?}", path))?;

    Ok(())
}
