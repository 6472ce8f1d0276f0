//! Failures detected while setting up or running a source reconstruction.
//!
//! Invalid configurations are reported when a `PixelatedSourceReconstruction`
//! (or one of its inputs) is constructed; invalid inputs are reported by the
//! individual call which received them.

use thiserror::Error;

use crate::likelihood::LikelihoodMethod;
use crate::types::Shape2;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReconstructionError {

    // ----- Invalid configuration ------------------------------------------------------------
    #[error("source grid must be axis-aligned with square pixels, got transform {transform:?}")]
    NonSquareSourcePixels { transform: [[f64; 2]; 2] },

    #[error("PSF kernel must have odd, non-zero dimensions, got shape {shape:?}")]
    KernelShape { shape: Shape2 },

    #[error("PSF kernel cannot be normalized: its sum is {total}")]
    KernelNotNormalizable { total: f64 },

    #[error("PSF kernel of shape {kernel:?} cannot be used with `{}` for an image of shape {image:?}: \
             it must be at least {required:?}", LikelihoodMethod::InterferometryNatwt)]
    KernelTooSmallForInterferometry { kernel: Shape2, image: Shape2, required: Shape2 },

    #[error("{what} has shape {got:?}, but the image has shape {expected:?}")]
    ShapeMismatch { what: &'static str, expected: Shape2, got: Shape2 },

    #[error("noise RMS must be positive and finite, got {value}")]
    InvalidNoise { value: f64 },

    #[error("a per-pixel noise map cannot be used with `{method}`")]
    NoiseMapUnsupported { method: LikelihoodMethod },

    #[error("unknown likelihood method `{0}`: expected `diagonal` or `interferometry_natwt`")]
    UnknownLikelihoodMethod(String),

    // ----- Invalid input --------------------------------------------------------------------
    #[error("source array has shape {got:?}, but the source grid has shape {expected:?}")]
    SourceShapeMismatch { expected: Shape2, got: Shape2 },
}

impl ReconstructionError {
    /// The error was caused by an argument passed to a single call, rather than
    /// by the reconstruction set-up.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::SourceShapeMismatch { .. })
    }

    pub fn is_invalid_configuration(&self) -> bool { !self.is_invalid_input() }
}

pub type Result<T> = std::result::Result<T, ReconstructionError>;
