mod decode;
mod info;
mod utils;

use std::{fs, path::PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use gifsift::{
    compositor::compose_all_with,
    diff::{diff_images_scaled, distinctiveness_scaled, DEFAULT_DIFF_FULL_SCALE},
    select::select_from_scores,
    Compositor, DisposalPolicy, EntropyMode,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use utils::{disposal_policy, may_write, strip_extension, with_suffix, write_diff_png, write_png, Assume};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Subcommands,

    /// Overwrite output files
    #[arg(short = 'y', long = "overwrite", conflicts_with = "assumeno", global = true)]
    assumeyes: bool,

    /// Do not overwrite output files
    #[arg(short = 'n', long = "preserve", conflicts_with = "assumeyes", global = true)]
    assumeno: bool,

    /// Log debug output. `RUST_LOG` takes precedence when set.
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Debug, Subcommand)]
enum Subcommands {
    /// Show the structure of one or more GIFs
    Info(InfoArgs),

    /// Extract every frame of a GIF as PNG
    Extract(ExtractArgs),

    /// Extract the single most representative frame of a GIF
    One(OneArgs),

    /// Calculate the entropy of still images
    Entropy(EntropyArgs),

    /// Average all frames of a GIF and score each frame against the average
    Average(AverageArgs),
}

#[derive(Debug, Args)]
struct InfoArgs {
    /// GIF files to inspect
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

#[derive(Debug, Args)]
struct ExtractArgs {
    /// Input GIF file
    input: PathBuf,

    /// Output directory (default: input path without extension)
    #[arg(short, long)]
    outdir: Option<PathBuf>,

    /// Write composed canvases instead of the raw frame rectangles
    #[arg(short, long)]
    compose: bool,

    /// Disposal semantics used when composing
    ///
    /// Valid values:
    ///  - legacy
    ///  - gif89a
    #[arg(short, long, default_value = "legacy", value_parser = disposal_policy, verbatim_doc_comment)]
    policy: DisposalPolicy,
}

#[derive(Debug, Args)]
struct OneArgs {
    /// Input GIF file
    input: PathBuf,

    /// Output PNG file (default: `<input>_one.png`)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Score frames by color entropy instead of grayscale entropy
    #[arg(short, long)]
    color: bool,

    /// Compose every frame up front and score them in parallel
    #[arg(long)]
    parallel: bool,

    /// Disposal semantics used when composing
    ///
    /// Valid values:
    ///  - legacy
    ///  - gif89a
    #[arg(short, long, default_value = "legacy", value_parser = disposal_policy, verbatim_doc_comment)]
    policy: DisposalPolicy,
}

impl OneArgs {
    fn mode(&self) -> EntropyMode {
        if self.color {
            EntropyMode::Color
        } else {
            EntropyMode::Gray
        }
    }
}

#[derive(Debug, Args)]
struct EntropyArgs {
    /// Image files of any type supported by `image`
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

#[derive(Debug, Args)]
struct AverageArgs {
    /// Input GIF file
    input: PathBuf,

    /// Output PNG file (default: `<input>_average.png`)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also write each frame's difference from the average as a 16 bit PNG
    /// into this directory
    #[arg(short, long)]
    diff_dir: Option<PathBuf>,

    /// Color distance (CIE76 ΔE) mapped to the maximum difference
    #[arg(short, long, default_value_t = DEFAULT_DIFF_FULL_SCALE)]
    scale: f64,

    /// Disposal semantics used when composing
    ///
    /// Valid values:
    ///  - legacy
    ///  - gif89a
    #[arg(short, long, default_value = "legacy", value_parser = disposal_policy, verbatim_doc_comment)]
    policy: DisposalPolicy,
}

fn main() -> Result<()> {
    let args = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if args.verbose { "debug" } else { "info" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let assume = if args.assumeyes {
        Some(Assume::Yes)
    } else if args.assumeno {
        Some(Assume::No)
    } else {
        None
    };

    match args.command {
        Subcommands::Info(a) => show_info(a),
        Subcommands::Extract(a) => extract(a, assume),
        Subcommands::One(a) => one(a, assume),
        Subcommands::Entropy(a) => entropy(a),
        Subcommands::Average(a) => average(a, assume),
    }
}

fn show_info(args: InfoArgs) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    for file in &args.files {
        let animation = decode::open_gif(file)?;
        info::dump(&mut stdout, file, &animation)?;
    }

    Ok(())
}

fn extract(args: ExtractArgs, assume: Option<Assume>) -> Result<()> {
    if !args.input.try_exists()? {
        bail!("Input file {:?} does not exist", args.input);
    }

    let animation = decode::open_gif(&args.input)?;
    let outdir = args.outdir.unwrap_or_else(|| strip_extension(&args.input));
    fs::create_dir_all(&outdir)
        .with_context(|| format!("Could not create output directory {:?}", outdir))?;

    if args.compose {
        let compositor = Compositor::with_policy(&animation, args.policy)?;
        debug!("Composing with {:?} disposal", compositor.policy());
        for (i, composed) in compositor {
            let output = outdir.join(format!("{i:03}_composed.png"));
            if may_write(&output, assume)? {
                write_png(&composed, &output)?;
            }
        }
    } else {
        animation.validate()?;
        for (i, frame) in animation.frames.iter().enumerate() {
            let output = outdir.join(format!("{i:03}.png"));
            // Checked by `validate`
            let Some(palette) = animation.palette_for(frame) else {
                continue
            };
            if may_write(&output, assume)? {
                write_png(&frame.render(palette), &output)?;
            }
        }
    }

    info!("Extracted {} frames from {:?} into {:?}", animation.frames.len(), args.input, outdir);

    Ok(())
}

fn one(args: OneArgs, assume: Option<Assume>) -> Result<()> {
    if !args.input.try_exists()? {
        bail!("Input file {:?} does not exist", args.input);
    }

    let animation = decode::open_gif(&args.input)?;
    let mode = args.mode();

    let selection = if args.parallel {
        gifsift::select_representative_par_with(&animation, args.policy, mode)?
    } else {
        let compositor = Compositor::with_policy(&animation, args.policy)?;
        gifsift::select_composed(compositor, |frame| mode.score(frame))?
    };

    info!(
        "Extracted #{} from {:?}: entropy={:.6}",
        selection.index, args.input, selection.score
    );

    let output = args.output.unwrap_or_else(|| with_suffix(&args.input, "_one.png"));
    if may_write(&output, assume)? {
        write_png(&selection.image, &output)?;
    }

    Ok(())
}

fn entropy(args: EntropyArgs) -> Result<()> {
    let mut gray_scores = Vec::with_capacity(args.files.len());

    for (i, file) in args.files.iter().enumerate() {
        let image = decode::open_still(file)?;
        let gray = EntropyMode::Gray.score(&image)
            .with_context(|| format!("Could not score {:?}", file))?;
        let color = EntropyMode::Color.score(&image)
            .with_context(|| format!("Could not score {:?}", file))?;

        info!("#{} {:?}: entropy={:.6} color_entropy={:.6}", i, file, gray, color);
        gray_scores.push(gray);
    }

    if let Some((i, score)) = select_from_scores(&gray_scores) {
        info!("Highest entropy: #{} {:?}: entropy={:.6}", i, args.files[i], score);
    }

    Ok(())
}

fn average(args: AverageArgs, assume: Option<Assume>) -> Result<()> {
    if !args.input.try_exists()? {
        bail!("Input file {:?} does not exist", args.input);
    }

    if !(args.scale.is_finite() && args.scale > 0.0) {
        bail!("Scale must be a positive number, got {}", args.scale);
    }

    let animation = decode::open_gif(&args.input)?;
    let frames = compose_all_with(&animation, args.policy)?;
    let centroid = gifsift::average_frames(&frames, &animation.delays())?;

    let output = args.output.unwrap_or_else(|| with_suffix(&args.input, "_average.png"));
    if may_write(&output, assume)? {
        write_png(&centroid, &output)?;
    }

    let scores = distinctiveness_scaled(&frames, &centroid, args.scale)?;
    for (i, score) in scores.iter().enumerate() {
        info!("#{} distinctiveness={:.6}", i, score);
    }

    if let Some(diff_dir) = args.diff_dir {
        fs::create_dir_all(&diff_dir)
            .with_context(|| format!("Could not create diff directory {:?}", diff_dir))?;

        for (i, frame) in frames.iter().enumerate() {
            let output = diff_dir.join(format!("{i:03}_diff.png"));
            if may_write(&output, assume)? {
                write_diff_png(&diff_images_scaled(frame, &centroid, args.scale)?, &output)?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_args(argv: &[&str]) -> OneArgs {
        let cli = Cli::try_parse_from(argv).unwrap();
        match cli.command {
            Subcommands::One(args) => args,
            other => panic!("parsed {other:?}"),
        }
    }

    #[test]
    fn one_ranks_by_gray_entropy_by_default() {
        let args = one_args(&["gifsift_tools", "one", "anim.gif"]);
        assert_eq!(args.mode(), EntropyMode::Gray);
        assert_eq!(args.policy, DisposalPolicy::Legacy);
    }

    #[test]
    fn one_color_is_opt_in() {
        assert_eq!(one_args(&["gifsift_tools", "one", "anim.gif", "--color"]).mode(), EntropyMode::Color);
        assert_eq!(one_args(&["gifsift_tools", "one", "-c", "anim.gif"]).mode(), EntropyMode::Color);
    }

    #[test]
    fn overwrite_flags_conflict() {
        assert!(Cli::try_parse_from(["gifsift_tools", "-y", "-n", "info", "a.gif"]).is_err());
        let cli = Cli::try_parse_from(["gifsift_tools", "info", "a.gif", "-y"]).unwrap();
        assert!(cli.assumeyes && !cli.assumeno);
    }
}
