use std::{io::{self, Write}, path::Path};

use gifsift::{Animation, DisposalMethod, LoopCount};

/// Write a human readable summary of an animation's structure.
pub fn dump<W: Write>(w: &mut W, name: &Path, animation: &Animation) -> io::Result<()> {
    writeln!(w, "file: {}", name.display())?;
    writeln!(w, "frames: {}", animation.frames.len())?;
    for (i, frame) in animation.frames.iter().enumerate() {
        write!(
            w,
            "  #{i:<2} rect=({}, {})-({}, {})",
            frame.left,
            frame.top,
            frame.left as u32 + frame.width as u32,
            frame.top as u32 + frame.height as u32,
        )?;
        match &frame.palette {
            Some(palette) => write!(w, " local_palette={}", palette.len())?,
            None => write!(w, " local_palette=none")?,
        }
        if let Some(index) = frame.transparent {
            write!(w, " transparent={index}")?;
        }
        writeln!(w)?;
    }

    let delays: Vec<String> = animation.frames.iter().map(|f| f.delay.to_string()).collect();
    writeln!(w, "delays: [{}]", delays.join(", "))?;

    let disposals: Vec<&str> = animation.frames.iter().map(|f| disposal_name(f.disposal)).collect();
    writeln!(w, "disposals: [{}]", disposals.join(", "))?;

    writeln!(w, "dimension: ({}, {})", animation.width, animation.height)?;
    match &animation.global_palette {
        Some(palette) => writeln!(w, "global_palette: {}", palette.len())?,
        None => writeln!(w, "global_palette: none")?,
    }

    write!(w, "background_index: {}", animation.background_index)?;
    if let Some([r, g, b, _]) = animation.background_color() {
        write!(w, " (#{r:02x}{g:02x}{b:02x})")?;
    }
    writeln!(w)?;

    match animation.loop_count {
        LoopCount::Infinite => writeln!(w, "loop: infinite")?,
        LoopCount::Finite(n) => writeln!(w, "loop: {n}")?,
    }

    writeln!(w)
}

fn disposal_name(disposal: DisposalMethod) -> &'static str {
    match disposal {
        DisposalMethod::Unspecified => "unspecified",
        DisposalMethod::DoNotDispose => "none",
        DisposalMethod::RestoreToBackground => "background",
        DisposalMethod::RestoreToPrevious => "previous",
    }
}

#[cfg(test)]
mod tests {
    use gifsift::{Frame, Palette};

    use super::*;

    #[test]
    fn dump_lists_frames_and_metadata() {
        let animation = Animation {
            global_palette: Some(Palette::new(vec![[0, 0, 0], [0xAB, 0xCD, 0xEF]])),
            background_index: 1,
            loop_count: LoopCount::Finite(2),
            ..Animation::new(8, 6, vec![
                Frame {
                    width: 8,
                    height: 6,
                    pixels: vec![0; 48],
                    delay: 10,
                    disposal: DisposalMethod::DoNotDispose,
                    ..Default::default()
                },
                Frame {
                    left: 2,
                    top: 1,
                    width: 3,
                    height: 2,
                    pixels: vec![1; 6],
                    palette: Some(Palette::new(vec![[1, 1, 1]; 4])),
                    transparent: Some(0),
                    disposal: DisposalMethod::RestoreToPrevious,
                    ..Default::default()
                },
            ])
        };

        let mut out = Vec::new();
        dump(&mut out, Path::new("anim.gif"), &animation).unwrap();
        let out = String::from_utf8(out).unwrap();

        assert!(out.contains("file: anim.gif\n"));
        assert!(out.contains("frames: 2\n"));
        assert!(out.contains("  #0  rect=(0, 0)-(8, 6) local_palette=none\n"));
        assert!(out.contains("  #1  rect=(2, 1)-(5, 3) local_palette=4 transparent=0\n"));
        assert!(out.contains("delays: [10, 0]\n"));
        assert!(out.contains("disposals: [none, previous]\n"));
        assert!(out.contains("dimension: (8, 6)\n"));
        assert!(out.contains("global_palette: 2\n"));
        assert!(out.contains("background_index: 1 (#abcdef)\n"));
        assert!(out.contains("loop: 2\n"));
    }
}
