//! Point-spread function, and the convolutions of sparse image-plane vectors
//! with it.

/// A pixelated PSF kernel, sampled on the image grid. Kernels have odd
/// dimensions, so that they have a central pixel.
#[derive(Clone, Debug, PartialEq)]
pub struct PointSpreadFunction {
    kernel: Array2<f64>,
}

impl PointSpreadFunction {

    /// Validate `kernel` and, if `normalize` is set, rescale it to unit sum.
    pub fn new(kernel: Array2<f64>, normalize: bool) -> Result<Self> {
        let shape = kernel.dim();
        if shape.0 % 2 == 0 || shape.1 % 2 == 0 {
            return Err(ReconstructionError::KernelShape { shape })
        }
        let kernel = if normalize {
            let total = kernel.sum();
            if total == 0.0 || !total.is_finite() {
                return Err(ReconstructionError::KernelNotNormalizable { total })
            }
            kernel / total
        } else { kernel };
        Ok(Self { kernel })
    }

    /// Normalized `size × size` Gaussian kernel of width `sigma` pixels
    pub fn gaussian(size: usize, sigma: f64) -> Result<Self> {
        Self::new(gaussian_kernel(size, sigma), false)
    }

    pub fn kernel(&self) -> ArrayView2<f64> { self.kernel.view() }

    pub fn shape(&self) -> Shape2 { self.kernel.dim() }
}

/// Convolutions over a fixed image grid, with a default kernel.
///
/// Every operation accepts an optional kernel which overrides the default for
/// that call only.
#[derive(Clone, Debug)]
pub struct Convolver {
    psf: PointSpreadFunction,
    shape: Shape2,
}

impl Convolver {

    /// Check that `psf` is usable with `method` on an image of shape `shape`.
    ///
    /// Natural weighting treats the kernel as the dirty-beam response between
    /// any two image pixels, so it must reach every pixel offset inside the
    /// image: `2n - 1` pixels along each axis.
    pub fn new(psf: PointSpreadFunction, shape: Shape2, method: LikelihoodMethod) -> Result<Self> {
        if method == LikelihoodMethod::InterferometryNatwt {
            let kernel = psf.shape();
            let required = ((2 * shape.0).saturating_sub(1), (2 * shape.1).saturating_sub(1));
            if kernel.0 < required.0 || kernel.1 < required.1 {
                return Err(ReconstructionError::KernelTooSmallForInterferometry { kernel, image: shape, required })
            }
        }
        Ok(Self { psf, shape })
    }

    pub fn kernel(&self) -> ArrayView2<f64> { self.psf.kernel() }

    pub fn shape(&self) -> Shape2 { self.shape }

    /// `K ⋆ A` on the full image grid
    pub fn sparse_convolution(&self, triplets: &SparseVector, kernel: Option<ArrayView2<f64>>) -> Array2<f64> {
        match kernel {
            Some(k) => sparse::sparse_convolution(triplets, k            , self.shape),
            None    => sparse::sparse_convolution(triplets, self.kernel(), self.shape),
        }
    }

    /// `⟨A, K ⋆ B⟩` without materializing `K ⋆ B`
    pub fn sparse_convolve_and_dot_product(&self, a: &SparseVector, b: &SparseVector, kernel: Option<ArrayView2<f64>>) -> f64 {
        match kernel {
            Some(k) => sparse::sparse_convolve_and_dot_product(a, b, k),
            None    => sparse::sparse_convolve_and_dot_product(a, b, self.kernel()),
        }
    }

    /// `K ⋆ A`, keeping only its non-zero pixels
    pub fn convolved_column(&self, triplets: &SparseVector) -> SparseVector {
        SparseVector::from_dense(self.sparse_convolution(triplets, None).view())
    }
}

// ----- Imports ------------------------------------------------------------------------------------------
use ndarray::{Array2, ArrayView2};

use crate::error::{ReconstructionError, Result};
use crate::gauss::gaussian_kernel;
use crate::likelihood::LikelihoodMethod;
use crate::sparse::{self, SparseVector};
use crate::types::Shape2;
