//! Linear reconstruction of a pixelated source behind a known lens.
//!
//! `PixelatedSourceReconstruction` ties together an observed image, the PSF,
//! a lens model and a source-plane grid, and produces the normal equations
//! `M x = b` whose solution (after whatever regularization the caller adds)
//! is the source surface brightness `x`, one value per source pixel.

pub struct PixelatedSourceReconstruction<L: RayTracer> {
    data: ImageDataset,
    convolver: Convolver,
    lens: L,
    source_grid: PixelGrid,
    source_pixel_width: f64,
    verbose: bool,
}

impl<L: RayTracer> PixelatedSourceReconstruction<L> {

    /// Validate the set-up, failing with an invalid-configuration error if
    /// - source pixels are not axis-aligned squares,
    /// - the PSF kernel cannot serve the dataset's likelihood method,
    /// - natural weighting is asked for with a per-pixel noise map.
    pub fn new(
        data: &ImageDataset,
        psf: PointSpreadFunction,
        lens: L,
        source_grid: PixelGrid,
        verbose: bool,
    ) -> Result<Self> {
        let source_pixel_width = source_pixel_width(&source_grid)?;
        let method = data.likelihood_method();
        let convolver = Convolver::new(psf, data.shape(), method)?;
        if method == LikelihoodMethod::InterferometryNatwt && data.noise().background_rms().is_none() {
            return Err(ReconstructionError::NoiseMapUnsupported { method })
        }
        debug!(
            image = ?data.shape(), source = ?source_grid.shape(),
            kernel = ?convolver.kernel().dim(), %method,
            "configured pixelated source reconstruction"
        );
        Ok(Self { data: data.clone(), convolver, lens, source_grid, source_pixel_width, verbose })
    }

    // ----- Accessors ------------------------------------------------------------------------
    pub fn image(&self) -> ArrayView2<f64> { self.data.image() }
    pub fn image_grid(&self) -> &PixelGrid { self.data.grid() }
    pub fn noise(&self) -> &Noise { self.data.noise() }
    pub fn primary_beam(&self) -> Option<ArrayView2<f64>> { self.data.primary_beam() }
    pub fn likelihood_method(&self) -> LikelihoodMethod { self.data.likelihood_method() }
    pub fn source_grid(&self) -> &PixelGrid { &self.source_grid }
    /// `(ny, nx)` of the source grid
    pub fn source_shape(&self) -> Shape2 { self.source_grid.shape() }
    pub fn num_source_pixels(&self) -> usize { self.source_grid.num_pixels() }
    pub fn source_pixel_width(&self) -> f64 { self.source_pixel_width }
    pub fn kernel(&self) -> ArrayView2<f64> { self.convolver.kernel() }
    pub fn lens(&self) -> &L { &self.lens }
    pub fn verbose(&self) -> bool { self.verbose }

    fn mapper(&self) -> Result<SourceFootprintMapper> {
        SourceFootprintMapper::new(self.data.grid(), &self.source_grid, &self.lens)
    }

    // ----- Normal equations -----------------------------------------------------------------

    /// Normal equations for the dataset's likelihood method
    pub fn generate_m_b(&self) -> Result<NormalEquations> {
        match self.likelihood_method() {
            LikelihoodMethod::Diagonal            => self.generate_m_b_diagonal_likelihood(),
            LikelihoodMethod::InterferometryNatwt => self.generate_m_b_interferometry_natwt_likelihood(),
        }
    }

    /// Normal equations assuming independent pixel noise
    pub fn generate_m_b_diagonal_likelihood(&self) -> Result<NormalEquations> {
        let mut progress = Progress::new(self.verbose);
        let footprints = self.lens_pixel_source_of_a_rectangular_region()?;
        progress.done_with_message("Ray-shot source-pixel footprints");
        let equations = likelihood::diagonal(&footprints, &self.convolver, self.image(), self.noise());
        progress.done_with_message("Assembled diagonal-noise normal equations");
        Ok(equations)
    }

    /// Normal equations for an interferometric dirty image under natural
    /// weighting
    pub fn generate_m_b_interferometry_natwt_likelihood(&self) -> Result<NormalEquations> {
        let method = LikelihoodMethod::InterferometryNatwt;
        let rms = self.noise().background_rms()
            .ok_or(ReconstructionError::NoiseMapUnsupported { method })?;
        let mut progress = Progress::new(self.verbose);
        let footprints = self.lens_pixel_source_of_a_rectangular_region()?;
        progress.done_with_message("Ray-shot source-pixel footprints");
        let equations = likelihood::interferometry_natwt(&footprints, &self.convolver, self.image(), rms, self.primary_beam());
        progress.done_with_message("Assembled natural-weighting normal equations");
        Ok(equations)
    }

    // ----- Lensing --------------------------------------------------------------------------

    /// Image-plane footprint of every source pixel, in row-major source order
    pub fn lens_pixel_source_of_a_rectangular_region(&self) -> Result<Vec<SparseVector>> {
        let footprints = self.mapper()?.footprints();
        debug!(
            source_pixels = footprints.len(),
            entries = %group_digits(footprints.iter().map(SparseVector::len).sum::<usize>()),
            "computed source-pixel footprints"
        );
        Ok(footprints)
    }

    /// Forward-lens a source-plane array of shape `(ny, nx)` into the image
    /// plane, without PSF
    pub fn lens_an_image_by_rayshooting(&self, source: ArrayView2<f64>) -> Result<Array2<f64>> {
        self.mapper()?.lens_source(source)
    }

    // ----- Sparse helpers on the image grid -------------------------------------------------

    pub fn sparse_to_array(&self, triplets: &SparseVector) -> Array2<f64> {
        sparse::sparse_to_array(triplets, self.data.shape())
    }

    pub fn sum_sparse_elementwise_product(&self, triplets: &SparseVector, dense: ArrayView2<f64>) -> f64 {
        sparse::sum_sparse_elementwise_product(triplets, dense)
    }

    /// `⟨a, K ⋆ b⟩`, with the reconstruction's kernel unless `kernel` is given
    pub fn sparse_convolve_and_dot_product(&self, a: &SparseVector, b: &SparseVector, kernel: Option<ArrayView2<f64>>) -> f64 {
        self.convolver.sparse_convolve_and_dot_product(a, b, kernel)
    }

    /// `K ⋆ triplets` on the image grid, with the reconstruction's kernel
    /// unless `kernel` is given
    pub fn sparse_convolution(&self, triplets: &SparseVector, kernel: Option<ArrayView2<f64>>) -> Array2<f64> {
        self.convolver.sparse_convolution(triplets, kernel)
    }
}

// ----- Imports ------------------------------------------------------------------------------------------
use ndarray::{Array2, ArrayView2};
use tracing::debug;

use crate::data::{ImageDataset, Noise};
use crate::error::{ReconstructionError, Result};
use crate::footprint::{source_pixel_width, SourceFootprintMapper};
use crate::lens::RayTracer;
use crate::likelihood::{self, LikelihoodMethod, NormalEquations};
use crate::psf::{Convolver, PointSpreadFunction};
use crate::sparse::{self, SparseVector};
use crate::types::{PixelGrid, Shape2};
use crate::utils::{group_digits, timing::Progress};
