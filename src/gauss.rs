//! Sampled Gaussians: PSF kernels and antenna primary beams.

use ndarray::Array2;

fn make_gauss(sigma: f64) -> impl Fn(f64, f64) -> f64 {
    let two_sigma_sq = 2.0 * sigma * sigma;
    move |dx, dy| (-(dx * dx + dy * dy) / two_sigma_sq).exp()
}

/// Square `size × size` Gaussian kernel of width `sigma` (in pixels), centred
/// on the central pixel and normalized to unit sum.
pub fn gaussian_kernel(size: usize, sigma: f64) -> Array2<f64> {
    let gauss = make_gauss(sigma);
    let centre = (size / 2) as f64;
    let kernel = Array2::from_shape_fn((size, size), |(r, c)| gauss(centre - r as f64, centre - c as f64));
    let total = kernel.sum();
    kernel / total
}

/// Gaussian beam of width `sigma` (in pixels) centred on pixel `[row, col]` of
/// an image of shape `shape`, normalized to a peak of 1 within the image.
pub fn gaussian_beam(shape: (usize, usize), [row, col]: [f64; 2], sigma: f64) -> Array2<f64> {
    let gauss = make_gauss(sigma);
    let beam = Array2::from_shape_fn(shape, |(r, c)| gauss(row - r as f64, col - c as f64));
    let peak = beam.fold(0.0_f64, |m, &v| m.max(v));
    beam / peak
}
