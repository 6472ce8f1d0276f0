//! Observed image, its noise, and how its likelihood should be evaluated.

/// Pixel noise of an observation
#[derive(Clone, Debug, PartialEq)]
pub enum Noise {
    /// Spatially constant background RMS
    Background(f64),
    /// Per-pixel RMS, same shape as the image
    Map(Array2<f64>),
}

impl Noise {
    /// `1 / σ²` at every pixel of an image of shape `shape`
    pub fn inverse_variance(&self, shape: Shape2) -> Array2<f64> {
        match self {
            Self::Background(rms) => Array2::from_elem(shape, 1.0 / (rms * rms)),
            Self::Map(rms)        => rms.mapv(|s| 1.0 / (s * s)),
        }
    }

    pub fn background_rms(&self) -> Option<f64> {
        match self {
            Self::Background(rms) => Some(*rms),
            Self::Map(_)          => None,
        }
    }
}

/// An observed image sampled on `grid`, with everything needed to write down
/// its likelihood.
#[derive(Clone, Debug)]
pub struct ImageDataset {
    grid: PixelGrid,
    image: Array2<f64>,
    noise: Noise,
    method: LikelihoodMethod,
    primary_beam: Option<Array2<f64>>,
}

impl ImageDataset {

    /// Dataset with the `diagonal` likelihood and no primary beam
    pub fn new(grid: PixelGrid, image: Array2<f64>, noise: Noise) -> Result<Self> {
        let expected = grid.shape();
        check_shape("image", expected, image.dim())?;
        match &noise {
            Noise::Background(rms) => check_rms(*rms)?,
            Noise::Map(map) => {
                check_shape("noise map", expected, map.dim())?;
                map.iter().try_for_each(|&rms| check_rms(rms))?;
            }
        }
        Ok(Self { grid, image, noise, method: LikelihoodMethod::default(), primary_beam: None })
    }

    pub fn with_likelihood_method(mut self, method: LikelihoodMethod) -> Self {
        self.method = method;
        self
    }

    /// Antenna primary-beam weights, only used by natural weighting
    pub fn with_primary_beam(mut self, beam: Array2<f64>) -> Result<Self> {
        check_shape("primary beam", self.grid.shape(), beam.dim())?;
        self.primary_beam = Some(beam);
        Ok(self)
    }

    pub fn grid(&self) -> &PixelGrid { &self.grid }
    pub fn image(&self) -> ArrayView2<f64> { self.image.view() }
    pub fn noise(&self) -> &Noise { &self.noise }
    pub fn likelihood_method(&self) -> LikelihoodMethod { self.method }
    pub fn primary_beam(&self) -> Option<ArrayView2<f64>> { self.primary_beam.as_ref().map(|b| b.view()) }
    pub fn shape(&self) -> Shape2 { self.image.dim() }
}

fn check_shape(what: &'static str, expected: Shape2, got: Shape2) -> Result<()> {
    if expected == got { Ok(()) }
    else               { Err(ReconstructionError::ShapeMismatch { what, expected, got }) }
}

fn check_rms(value: f64) -> Result<()> {
    if value > 0.0 && value.is_finite() { Ok(()) }
    else                                { Err(ReconstructionError::InvalidNoise { value }) }
}

// ----- Imports ------------------------------------------------------------------------------------------
use ndarray::{Array2, ArrayView2};

use crate::error::{ReconstructionError, Result};
use crate::likelihood::LikelihoodMethod;
use crate::types::{PixelGrid, Shape2};
