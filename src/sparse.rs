//! Sparse `(row, col, value)` triplets over a fixed-size 2d pixel grid, and
//! the handful of operations needed to build normal equations from them
//! without materializing the full (source-pixels × image-pixels) operator.
//!
//! Triplets sharing the same `[row, col]` are legitimate (overlapping
//! footprints produce them) and are always accumulated, never overwritten.
//!
//! Kernel convention: a kernel `K` of shape `(kr, kc)` is centred on
//! `[kr / 2, kc / 2]`, and a unit point at `[p, q]` convolved with `K`
//! deposits `K[r - p + kr/2, c - q + kc/2]` at `[r, c]`.

// ---------------------- Implementation -----------------------------------------
pub type SparseElement = Index2Weight;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SparseVector(Vec<SparseElement>);

impl SparseVector {
    pub fn new() -> Self { Self(vec![]) }

    #[inline]
    pub fn push(&mut self, row: usize, col: usize, value: Weight) { self.0.push(([row, col], value)) }

    pub fn iter(&self) -> std::slice::Iter<SparseElement> { self.0.iter() }

    pub fn len(&self) -> usize { self.0.len() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    /// Keep the non-zero elements of a dense array, in row-major order
    pub fn from_dense(dense: ArrayView2<f64>) -> Self {
        dense.indexed_iter()
            .filter(|&(_, &v)| v != 0.0)
            .map(|((r, c), &v)| ([r, c], v))
            .collect()
    }

    /// Multiply every element by the value of `weights` at its position.
    /// Elements lying outside `weights` become zero.
    pub fn weighted_by(&self, weights: ArrayView2<f64>) -> Self {
        self.iter()
            .map(|&([r, c], v)| ([r, c], v * weights.get((r, c)).copied().unwrap_or(0.0)))
            .collect()
    }

    pub fn total_weight(&self) -> Weight { self.iter().map(|(_, w)| w).sum() }
}

impl std::ops::Index<usize> for SparseVector {
    type Output = SparseElement;
    fn index(&self, i: usize) -> &Self::Output { &self.0[i] }
}

impl FromIterator<SparseElement> for SparseVector {
    fn from_iter<I: IntoIterator<Item = SparseElement>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for SparseVector {
    type Item = SparseElement;
    type IntoIter = std::vec::IntoIter<Self::Item>;
    fn into_iter(self) -> Self::IntoIter { self.0.into_iter() }
}

impl<'a> IntoIterator for &'a SparseVector {
    type Item = &'a SparseElement;
    type IntoIter = std::slice::Iter<'a, SparseElement>;
    fn into_iter(self) -> Self::IntoIter { self.0.iter() }
}

/// Materialize the triplets into a zero-initialized array of shape `shape`.
/// Repeated indices are summed. Elements outside `shape` are dropped.
pub fn sparse_to_array(triplets: &SparseVector, shape: Shape2) -> Array2<f64> {
    let mut dense = Array2::zeros(shape);
    for &([r, c], v) in triplets {
        if let Some(d) = dense.get_mut((r, c)) { *d += v }
    }
    dense
}

/// `Σ value_k * dense[row_k, col_k]`. Indices outside `dense` contribute 0.
#[inline]
pub fn sum_sparse_elementwise_product(triplets: &SparseVector, dense: ArrayView2<f64>) -> f64 {
    let mut sum = 0.0;
    for &([r, c], v) in triplets {
        if let Some(d) = dense.get((r, c)) { sum += v * d }
    }
    sum
}

/// `⟨A, K ⋆ B⟩` computed pairwise over the two triplet sets, without forming
/// `K ⋆ B`: `Σ_{a∈A, b∈B} a·b·K[ra - rb + kr/2, ca - cb + kc/2]`, with kernel
/// look-ups outside its support contributing 0.
pub fn sparse_convolve_and_dot_product(a: &SparseVector, b: &SparseVector, kernel: ArrayView2<f64>) -> f64 {
    let (kr, kc) = kernel.dim();
    let (hr, hc) = ((kr / 2) as isize, (kc / 2) as isize);
    let mut sum = 0.0;
    for &([ra, ca], va) in a {
        for &([rb, cb], vb) in b {
            let dr = ra as isize - rb as isize + hr;
            let dc = ca as isize - cb as isize + hc;
            if dr < 0 || dc < 0 { continue }
            if let Some(k) = kernel.get((dr as usize, dc as usize)) {
                sum += va * vb * k;
            }
        }
    }
    sum
}

/// `K ⋆ A` materialized on a grid of shape `shape`. Contributions falling
/// outside the grid are dropped: no padding, no wrap-around.
pub fn sparse_convolution(triplets: &SparseVector, kernel: ArrayView2<f64>, shape: Shape2) -> Array2<f64> {
    let (ny, nx) = shape;
    let (kr, kc) = kernel.dim();
    let (hr, hc) = (kr / 2, kc / 2);
    let mut out = Array2::zeros(shape);
    if kr == 0 || kc == 0 { return out }
    for &([p, q], v) in triplets {
        if v == 0.0 { continue }
        // Output rows `r` for which `r - p + hr` lies inside the kernel
        let r_lo = (p + hr).saturating_sub(kr - 1);
        let r_hi = (p + hr + 1).min(ny);
        let c_lo = (q + hc).saturating_sub(kc - 1);
        let c_hi = (q + hc + 1).min(nx);
        for r in r_lo..r_hi {
            for c in c_lo..c_hi {
                out[[r, c]] += v * kernel[[r + hr - p, c + hc - q]];
            }
        }
    }
    out
}

// ----- Imports ------------------------------------------------------------------------------------------
use ndarray::{Array2, ArrayView2};

use crate::types::{Index2Weight, Shape2, Weight};

// ------------------------------ TESTS ------------------------------
#[cfg(test)]
mod test {
    use super::*;
    #[allow(unused)] use pretty_assertions::{assert_eq, assert_ne};
    use float_eq::assert_float_eq;
    use ndarray::{array, Array2};
    use rstest::rstest;

    fn sv(elements: &[(usize, usize, f64)]) -> SparseVector {
        elements.iter().map(|&(r, c, v)| ([r, c], v)).collect()
    }

    fn gaussian(size: usize, sigma: f64) -> Array2<f64> {
        crate::gauss::gaussian_kernel(size, sigma)
    }

    #[test]
    fn duplicate_indices_are_summed() {
        let dense = sparse_to_array(&sv(&[(0, 0, 0.25), (0, 0, 0.5), (1, 2, 1.0)]), (2, 3));
        assert_eq!(dense, array![[0.75, 0.0, 0.0],
                                 [0.0 , 0.0, 1.0]]);
    }

    #[test]
    fn out_of_range_elements_contribute_nothing() {
        let dense = array![[1.0, 2.0], [3.0, 4.0]];
        let product = sum_sparse_elementwise_product(&sv(&[(1, 1, 2.0), (5, 0, 100.0), (0, 9, 100.0)]), dense.view());
        assert_eq!(product, 8.0);
        assert_eq!(sparse_to_array(&sv(&[(7, 7, 1.0)]), (2, 2)), Array2::zeros((2, 2)));
    }

    #[test]
    fn from_dense_keeps_nonzero_elements_in_row_major_order() {
        let dense = array![[0.0, 2.0], [3.0, 0.0]];
        assert_eq!(SparseVector::from_dense(dense.view()), sv(&[(0, 1, 2.0), (1, 0, 3.0)]));
    }

    // A point convolved with a small kernel reproduces the (clipped) kernel
    #[rstest(/**/ point , rows  , cols  , krows , kcols ,
             case([0, 0], 0..2  , 0..2  , 1..3  , 1..3  ),
             case([0, 1], 0..2  , 0..3  , 1..3  , 0..3  ),
             case([1, 1], 0..3  , 0..3  , 0..3  , 0..3  ),
             case([4, 4], 3..5  , 3..5  , 0..2  , 0..2  ),
    )]
    fn point_convolution_is_clipped_kernel(
        point: [usize; 2],
        rows: std::ops::Range<usize>, cols: std::ops::Range<usize>,
        krows: std::ops::Range<usize>, kcols: std::ops::Range<usize>,
    ) {
        use ndarray::s;
        let kernel = gaussian(19, 3.0).slice(s![8..11, 8..11]).to_owned();
        let mut convolved = sparse_convolution(&sv(&[(point[0], point[1], 0.8)]), kernel.view(), (5, 5));
        let mut patch = convolved.slice_mut(s![rows, cols]);
        patch -= &(kernel.slice(s![krows, kcols]).to_owned() * 0.8);
        for residual in convolved { assert_float_eq!(residual, 0.0, abs <= 1e-12) }
    }

    #[test]
    fn points_beyond_kernel_reach_do_not_interact() {
        let kernel = gaussian(19, 3.0).slice(ndarray::s![8..11, 8..11]).to_owned();
        let a = sv(&[(1, 1, 1.0)]);
        assert_eq!(sparse_convolve_and_dot_product(&a, &sv(&[(3, 3, 1.5)]), kernel.view()), 0.0);
        assert_float_eq!(sparse_convolve_and_dot_product(&a, &sv(&[(2, 2, 1.5)]), kernel.view()),
                         1.5 * kernel[[0, 0]], rmax <= 1e-12);
    }

    // --------------------------------------------------------------------------------
    use proptest::prelude::*;

    fn triplets(n: usize) -> impl Strategy<Value = SparseVector> {
        prop::collection::vec((0..n, 0..n, -2.0..(2.0 as f64)), 0..12)
            .prop_map(|v| v.into_iter().map(|(r, c, w)| ([r, c], w)).collect())
    }

    // The pairwise form must agree with explicitly convolving and then
    // summing against the other vector.
    proptest! {
        #[test]
        fn convolve_and_dot_matches_materialized_convolution(
            a in triplets(7),
            b in triplets(7),
            half in 0..5_usize,
            sigma in 0.5..(4.0 as f64),
        ) {
            let kernel = gaussian(2 * half + 1, sigma);
            let pairwise = sparse_convolve_and_dot_product(&a, &b, kernel.view());
            let explicit = sum_sparse_elementwise_product(&a, sparse_convolution(&b, kernel.view(), (7, 7)).view());
            assert_float_eq!(pairwise, explicit, abs <= 1e-12, rmax <= 1e-9);
        }

        #[test]
        fn duplicates_accumulate(a in triplets(4)) {
            let dense = sparse_to_array(&a, (4, 4));
            assert_float_eq!(dense.sum(), a.total_weight(), abs <= 1e-12);
        }
    }
}
