//! Pixelated reconstruction of gravitationally lensed sources.
//!
//! The surface brightness of a lensed source is modelled on a grid of source
//! pixels. Each source pixel is ray-shot into the image plane, giving a sparse
//! footprint; footprints are convolved with the PSF and combined with the
//! data into the normal equations `M x = b` of the chosen likelihood.

pub mod types;
pub mod index;
pub mod error;
pub mod sparse;
pub mod gauss;
pub mod psf;
pub mod lens;
pub mod footprint;
pub mod data;
pub mod likelihood;
pub mod reconstruction;
pub mod config;
pub mod io;
pub mod utils;

pub use error::{ReconstructionError, Result};
pub use reconstruction::PixelatedSourceReconstruction;
