//! gifsift reconstructs the visible frames of a palette-indexed animation and
//! picks (or synthesizes) a single frame that represents the whole thing.
//!
//! The crate works entirely in memory on an already decoded [`Animation`].
//! Reading files and writing images is left to the caller.
//!
//! # Example
//! ## Selecting the busiest frame
//! ```
//! use gifsift::{Animation, DisposalMethod, EntropyMode, Frame, Palette};
//!
//! let palette = Palette::new(vec![[0, 0, 0], [255, 255, 255]]);
//! let frame = |pixels: Vec<u8>| Frame {
//!     width: 2,
//!     height: 2,
//!     pixels,
//!     disposal: DisposalMethod::DoNotDispose,
//!     delay: 10,
//!     ..Default::default()
//! };
//!
//! let animation = Animation {
//!     global_palette: Some(palette),
//!     ..Animation::new(2, 2, vec![
//!         frame(vec![0, 0, 0, 0]),
//!         frame(vec![0, 1, 1, 0]),
//!     ])
//! };
//!
//! let selection = gifsift::select_representative(&animation, |f| EntropyMode::Color.score(f))
//!     .expect("valid animation");
//! assert_eq!(selection.index, 1);
//! assert_eq!(selection.score, 1.0);
//! ```
//!
//! ## Scoring frames against the average
//! ```
//! # use gifsift::{Animation, Frame, Palette};
//! # let animation = Animation {
//! #     global_palette: Some(Palette::new(vec![[0, 0, 0]])),
//! #     ..Animation::new(1, 1, vec![Frame { width: 1, height: 1, pixels: vec![0], ..Default::default() }])
//! # };
//! let frames = gifsift::compose_all(&animation).unwrap();
//! let centroid = gifsift::average_frames(&frames, &animation.delays()).unwrap();
//! let scores = gifsift::distinctiveness(&frames, &centroid).unwrap();
//! assert_eq!(scores, vec![0.0]);
//! ```

pub mod animation;
pub mod average;
pub mod bitmap;
pub mod compositor;
pub mod diff;
pub mod entropy;
pub mod error;
pub mod select;

// ----------------------- //
// INLINED USEFUL FEATURES //
// ----------------------- //
#[doc(inline)]
pub use animation::{Animation, DisposalMethod, Frame, LoopCount, Palette};

#[doc(inline)]
pub use bitmap::Bitmap;

#[doc(inline)]
pub use compositor::{compose_all, compose_all_with, compose_frames, Compositor, DisposalPolicy};

#[doc(inline)]
pub use entropy::{measure_entropy, measure_gray_entropy, EntropyMode};

#[doc(inline)]
pub use select::{
    select_composed, select_representative, select_representative_par, select_representative_par_with, Selection,
};

#[doc(inline)]
pub use average::{average_animation, average_frames};

#[doc(inline)]
pub use diff::{diff_images, distinctiveness, summarize, DiffMap, Lab};

#[doc(inline)]
pub use error::Error;
