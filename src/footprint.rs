//! Image-plane footprints of source pixels.
//!
//! Every image-pixel centre is ray-shot into the source plane, where it lands
//! at a fractional source-pixel position `(u, v)`. The source is represented
//! by bilinear (tent) basis functions, one per source pixel, so that image
//! pixel lands in the cell anchored at `(floor(u), floor(v))` and picks up
//! the four corner source pixels with weights
//!
//! ```text
//!   (iu  , iv  ): (1-du)(1-dv)      (iu+1, iv  ): du(1-dv)
//!   (iu  , iv+1): (1-du) dv         (iu+1, iv+1): du dv
//! ```
//!
//! Source pixels outside the grid are treated as zero. The footprint of one
//! source pixel collects, in row-major image order, every image pixel whose
//! cell has that source pixel as a corner, including corners that end up
//! with zero weight.
//!
//! Footprints of different source pixels are independent, so they are
//! computed as a pure function of the source-pixel index. Image pixels are
//! bucketed by anchor cell once, so each footprint only visits the four cells
//! which have its source pixel as a corner.

/// Source-plane landing positions of all image pixels, in units of source
/// pixels, relative to the centre of source pixel `(0, 0)`
#[derive(Clone, Debug)]
pub struct SourceFootprintMapper {
    u: Array2<f64>,
    v: Array2<f64>,
    source: [usize; 2],
    /// Flat (row-major) indices of the image pixels anchored in each cell,
    /// ascending. Anchors run from `-1` to `n - 1` along each axis; pixels
    /// anchored elsewhere, or landing on NaN, touch no source pixel.
    cells: Vec<Vec<Index1>>,
}

impl SourceFootprintMapper {

    pub fn new(image: &PixelGrid, source: &PixelGrid, lens: &impl RayTracer) -> Result<Self> {
        let width = source_pixel_width(source)?;
        let (x, y) = image.pixel_coordinates();
        let (beta_x, beta_y) = lens.trace_sources(x.view(), y.view());
        let origin = source.origin;
        let u = beta_x.mapv_into(|b| (b - origin.x) / width);
        let v = beta_y.mapv_into(|b| (b - origin.y) / width);
        let source = [source.nx, source.ny];

        let mut cells = vec![vec![]; (source[0] + 1) * (source[1] + 1)];
        for (pixel, (&u, &v)) in u.iter().zip(v.iter()).enumerate() {
            if let Some(cell) = cell_index(u.floor(), v.floor(), source) {
                cells[cell].push(pixel);
            }
        }
        debug!(
            image = ?image.shape(), source = ?(source[1], source[0]),
            anchored = %group_digits(cells.iter().map(Vec::len).sum::<usize>()),
            "ray-shot image pixels into source plane"
        );
        Ok(Self { u, v, source, cells })
    }

    /// `(ny, nx)` of the source grid
    pub fn source_shape(&self) -> Shape2 { (self.source[1], self.source[0]) }

    pub fn image_shape(&self) -> Shape2 { self.u.dim() }

    pub fn num_source_pixels(&self) -> usize { self.source[0] * self.source[1] }

    /// Footprint of the source pixel with flat (row-major) index `k`
    pub fn footprint(&self, k: Index1) -> SparseVector {
        let [ix, iy] = index1_to_2(k, self.source);
        let mut pixels: Vec<Index1> = iproduct!([iy as f64 - 1.0, iy as f64], [ix as f64 - 1.0, ix as f64])
            .filter_map(|(iv, iu)| cell_index(iu, iv, self.source))
            .flat_map(|cell| self.cells[cell].iter().copied())
            .collect();
        // Cells are disjoint, so this restores row-major image order
        pixels.sort_unstable();

        let (ix, iy) = (ix as f64, iy as f64);
        let cols = self.image_shape().1;
        let mut footprint = SparseVector::new();
        for pixel in pixels {
            let (row, col) = (pixel / cols, pixel % cols);
            let (u, v) = (self.u[[row, col]], self.v[[row, col]]);
            let (iu, iv) = (u.floor(), v.floor());
            let (du, dv) = (u - iu, v - iv);
            let wx = if ix == iu { 1.0 - du } else { du };
            let wy = if iy == iv { 1.0 - dv } else { dv };
            footprint.push(row, col, wx * wy);
        }
        footprint
    }

    /// Footprints of all source pixels, in flat-index order
    pub fn footprints(&self) -> Vec<SparseVector> {
        #[cfg(not(feature = "serial"))] let indices = (0..self.num_source_pixels()).into_par_iter();
        #[cfg(    feature = "serial") ] let indices =  0..self.num_source_pixels();
        indices.map(|k| self.footprint(k)).collect()
    }

    /// Interpolate `source` (shape `(ny, nx)`) at the landing position of
    /// every image pixel.
    ///
    /// Only image pixels landing in a cell anchored inside the source grid are
    /// lit; corners beyond the upper grid edges contribute nothing.
    pub fn lens_source(&self, source: ArrayView2<f64>) -> Result<Array2<f64>> {
        let expected = self.source_shape();
        if source.dim() != expected {
            return Err(ReconstructionError::SourceShapeMismatch { expected, got: source.dim() })
        }
        let (ny, nx) = expected;
        let value = |iu: usize, iv: usize| source.get((iv, iu)).copied().unwrap_or(0.0);
        let mut image = Array2::zeros(self.image_shape());
        let interpolate = |pixel: &mut f64, &u: &f64, &v: &f64| {
            let (iu, iv) = (u.floor(), v.floor());
            // NaN positions fail this test too
            if !(iu >= 0.0 && iv >= 0.0 && iu < nx as f64 && iv < ny as f64) { return }
            let (du, dv) = (u - iu, v - iv);
            let (iu, iv) = (iu as usize, iv as usize);
            *pixel = (1.0 - du) * (1.0 - dv) * value(iu    , iv    )
                   +        du  * (1.0 - dv) * value(iu + 1, iv    )
                   + (1.0 - du) *        dv  * value(iu    , iv + 1)
                   +        du  *        dv  * value(iu + 1, iv + 1);
        };
        let zip = Zip::from(&mut image).and(&self.u).and(&self.v);
        #[cfg(not(feature = "serial"))] zip.par_for_each(interpolate);
        #[cfg(    feature = "serial") ] zip.for_each(interpolate);
        Ok(image)
    }
}

/// Bucket of the cell anchored at `(iu, iv)`, if that cell has at least one
/// corner on a source grid of `[nx, ny]` pixels
fn cell_index(iu: f64, iv: f64, [nx, ny]: [usize; 2]) -> Option<usize> {
    let inside = |i: f64, n: usize| i >= -1.0 && i <= n as f64 - 1.0;
    if !(inside(iu, nx) && inside(iv, ny)) { return None }
    let (cu, cv) = ((iu + 1.0) as usize, (iv + 1.0) as usize);
    Some(cv * (nx + 1) + cu)
}

/// The pixel width of a source grid. Source pixels must be axis-aligned
/// squares.
pub fn source_pixel_width(source: &PixelGrid) -> Result<f64> {
    source.square_pixel_width().ok_or_else(|| {
        let t = &source.transform;
        ReconstructionError::NonSquareSourcePixels {
            transform: [[t[(0, 0)], t[(0, 1)]], [t[(1, 0)], t[(1, 1)]]],
        }
    })
}

// ----- Imports ------------------------------------------------------------------------------------------
use itertools::iproduct;
use ndarray::{Array2, ArrayView2, Zip};
#[cfg(not(feature = "serial"))]
use rayon::prelude::*;
use tracing::debug;

use crate::error::{ReconstructionError, Result};
use crate::index::index1_to_2;
use crate::lens::RayTracer;
use crate::sparse::SparseVector;
use crate::types::{Index1, PixelGrid, Shape2};
use crate::utils::group_digits;
