//! Likelihood methods, and assembly of the normal equations `M x = b` which
//! maximize them.
//!
//! Both assemblers take the image-plane footprints `f_i` of the source pixels
//! and never build the dense (image pixels × source pixels) response matrix.
//! Only the upper triangle of `M` is computed; the lower one is mirrored.

/// How the pixel-to-pixel noise covariance of an image is treated
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub enum LikelihoodMethod {
    /// Independent pixel noise: `χ² = Σ (d - K ⋆ Σ x_i f_i)² / σ²`
    #[default]
    #[serde(rename = "diagonal")]
    Diagonal,
    /// Interferometric dirty image under natural weighting: the PSF is the
    /// dirty beam, so it describes the noise covariance as well as the
    /// response, and the data vector is the dirty image itself.
    #[serde(rename = "interferometry_natwt")]
    InterferometryNatwt,
}

impl LikelihoodMethod {
    pub fn name(self) -> &'static str {
        match self {
            Self::Diagonal            => "diagonal",
            Self::InterferometryNatwt => "interferometry_natwt",
        }
    }
}

impl std::fmt::Display for LikelihoodMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(self.name()) }
}

impl std::str::FromStr for LikelihoodMethod {
    type Err = ReconstructionError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "diagonal"             => Ok(Self::Diagonal),
            "interferometry_natwt" => Ok(Self::InterferometryNatwt),
            _ => Err(ReconstructionError::UnknownLikelihoodMethod(s.into())),
        }
    }
}

/// Symmetric `M` (`N × N`) and `b` (`N`), for `N` source pixels
#[derive(Clone, Debug, PartialEq)]
pub struct NormalEquations {
    pub m: Array2<f64>,
    pub b: Array1<f64>,
}

impl NormalEquations {
    pub fn num_source_pixels(&self) -> usize { self.b.len() }

    /// Fill `m` from the rows of its upper triangle: `rows[i]` holds
    /// `M[i, i..]`.
    fn from_upper_rows(rows: Vec<Vec<f64>>, b: Array1<f64>) -> Self {
        let n = rows.len();
        let mut m = Array2::zeros((n, n));
        for (i, row) in rows.into_iter().enumerate() {
            for (offset, value) in row.into_iter().enumerate() {
                let j = i + offset;
                m[[i, j]] = value;
                m[[j, i]] = value;
            }
        }
        Self { m, b }
    }
}

/// Independent pixel noise.
///
/// With `C_i = K ⋆ f_i` (clipped to the image):
///
/// `M[i,j] = Σ_p C_i C_j / σ²` and `b[i] = Σ_p C_i d / σ²`
pub fn diagonal(
    footprints: &[SparseVector],
    convolver : &Convolver,
    image     : ArrayView2<f64>,
    noise     : &Noise,
) -> NormalEquations {
    let shape = convolver.shape();
    let inverse_variance = noise.inverse_variance(shape);
    let weighted_data = &image * &inverse_variance;

    let columns: Vec<SparseVector> = each(footprints)
        .map(|f| convolver.convolved_column(f))
        .collect();
    debug!(
        pixels = %group_digits(columns.iter().map(SparseVector::len).sum::<usize>()),
        "convolved source-pixel footprints"
    );

    let b = each(&columns)
        .map(|c| sum_sparse_elementwise_product(c, weighted_data.view()))
        .collect::<Vec<_>>();

    let rows: Vec<Vec<f64>> = each_indexed(&columns)
        .map(|(i, c_i)| {
            let weighted = sparse_to_array(c_i, shape) * &inverse_variance;
            columns[i..].iter()
                .map(|c_j| sum_sparse_elementwise_product(c_j, weighted.view()))
                .collect::<Vec<_>>()
        })
        .collect();

    NormalEquations::from_upper_rows(rows, Array1::from(b))
}

/// Natural weighting of an interferometric dirty image.
///
/// With `g_i = f_i · PB` (primary beam, all ones when absent):
///
/// `M[i,j] = ⟨g_i, K ⋆ g_j⟩ / σ²` and `b[i] = Σ_p g_i d / σ²`
///
/// The data are not convolved again: the dirty image already carries the
/// dirty beam.
pub fn interferometry_natwt(
    footprints  : &[SparseVector],
    convolver   : &Convolver,
    image       : ArrayView2<f64>,
    rms         : f64,
    primary_beam: Option<ArrayView2<f64>>,
) -> NormalEquations {
    let inverse_variance = 1.0 / (rms * rms);
    let beamed: Vec<SparseVector> = match primary_beam {
        Some(beam) => each(footprints).map(|f| f.weighted_by(beam)).collect(),
        None       => footprints.to_vec(),
    };

    let b = each(&beamed)
        .map(|g| sum_sparse_elementwise_product(g, image) * inverse_variance)
        .collect::<Vec<_>>();

    let rows: Vec<Vec<f64>> = each_indexed(&beamed)
        .map(|(i, g_i)| {
            beamed[i..].iter()
                .map(|g_j| convolver.sparse_convolve_and_dot_product(g_i, g_j, None) * inverse_variance)
                .collect::<Vec<_>>()
        })
        .collect();

    NormalEquations::from_upper_rows(rows, Array1::from(b))
}

// Choose between serial and parallel iteration over per-source-pixel work
#[cfg(not(feature = "serial"))]
fn each<T: Sync>(items: &[T]) -> rayon::slice::Iter<T> { items.par_iter() }
#[cfg(feature = "serial")]
fn each<T>(items: &[T]) -> std::slice::Iter<T> { items.iter() }

#[cfg(not(feature = "serial"))]
fn each_indexed<T: Sync>(items: &[T]) -> rayon::iter::Enumerate<rayon::slice::Iter<T>> { items.par_iter().enumerate() }
#[cfg(feature = "serial")]
fn each_indexed<T>(items: &[T]) -> std::iter::Enumerate<std::slice::Iter<T>> { items.iter().enumerate() }

// ----- Imports ------------------------------------------------------------------------------------------
use ndarray::{Array1, Array2, ArrayView2};
#[cfg(not(feature = "serial"))]
use rayon::prelude::*;
use serde::Deserialize;
use tracing::debug;

use crate::data::Noise;
use crate::error::ReconstructionError;
use crate::psf::Convolver;
use crate::sparse::{sparse_to_array, sum_sparse_elementwise_product, SparseVector};
use crate::utils::group_digits;
