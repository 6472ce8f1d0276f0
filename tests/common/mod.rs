//! Shared set-up: a 10×10 image of uniform noise behind an SIE, seen through
//! a 19×19 Gaussian PSF, reconstructed on a 2×3 grid of 0.03-wide source
//! pixels.
#![allow(dead_code)]

use ndarray::{array, s, Array2};

use lenspix::data::{ImageDataset, Noise};
use lenspix::gauss::gaussian_kernel;
use lenspix::lens::{LensModel, LensProfile, Sie};
use lenspix::likelihood::LikelihoodMethod;
use lenspix::psf::PointSpreadFunction;
use lenspix::types::{PixelGrid, Point};
use lenspix::PixelatedSourceReconstruction;

pub fn image_data() -> Array2<f64> {
    array![
        [0.37998374, 0.45868146, 0.94466124, 0.49985   , 0.61152472, 0.90291398, 0.93014262, 0.16425493, 0.46615874, 0.37820467],
        [0.20168678, 0.62396235, 0.2321545 , 0.09974247, 0.244949  , 0.18138219, 0.80001545, 0.80389765, 0.98861931, 0.14030475],
        [0.27689752, 0.75104745, 0.65846718, 0.07815372, 0.09323168, 0.86884209, 0.51337759, 0.05514285, 0.21899282, 0.89654578],
        [0.43021229, 0.53728807, 0.62681958, 0.62799635, 0.5783872 , 0.20735348, 0.52720995, 0.71356574, 0.62004311, 0.52865161],
        [0.75981885, 0.25822367, 0.71744285, 0.97587512, 0.20702018, 0.91744571, 0.42387492, 0.36172342, 0.07509998, 0.14109497],
        [0.71996296, 0.43829422, 0.4490221 , 0.4027239 , 0.81514223, 0.53845533, 0.49095991, 0.14225506, 0.37623786, 0.90357779],
        [0.24835311, 0.9566734 , 0.26708036, 0.42091185, 0.08642987, 0.92327661, 0.92215173, 0.79882988, 0.64493301, 0.0992427 ],
        [0.51896031, 0.57795715, 0.64121395, 0.84125236, 0.94663785, 0.08461582, 0.94735046, 0.28469182, 0.06974356, 0.35807553],
        [0.14619233, 0.0142298 , 0.81142352, 0.36906236, 0.14258796, 0.91290133, 0.04122539, 0.50850401, 0.88442304, 0.15904894],
        [0.51761851, 0.39558722, 0.40555487, 0.51119774, 0.70308528, 0.70418488, 0.23706343, 0.94956522, 0.64892141, 0.99079498],
    ]
}

pub const PIXEL_WIDTH: f64 = 0.05;
pub const BACKGROUND_RMS: f64 = 1.0;

pub fn image_grid(n: usize) -> PixelGrid {
    let corner = -(n as f64) * PIXEL_WIDTH / 2.0;
    PixelGrid::square(n, n, PIXEL_WIDTH, Point::new(corner, corner))
}

pub fn kernel() -> Array2<f64> { gaussian_kernel(19, 3.0) }

pub fn psf() -> PointSpreadFunction { PointSpreadFunction::new(kernel(), false).unwrap() }

pub fn small_kernel() -> Array2<f64> { kernel().slice(s![8..11, 8..11]).to_owned() }

pub fn sie(theta_e: f64) -> LensModel {
    LensModel::new(vec![LensProfile::Sie(Sie { theta_e, e1: 0.0, e2: 0.0, center_x: 0.0, center_y: 0.0 })])
}

pub fn source_grid() -> PixelGrid { PixelGrid::square(2, 3, 0.03, Point::new(-0.06, -0.06)) }

/// 3×3 source grid sitting exactly on image pixels `3..6` in both directions
pub fn aligned_source_grid() -> PixelGrid { PixelGrid::square(3, 3, PIXEL_WIDTH, Point::new(-0.1, -0.1)) }

pub fn dataset(method: LikelihoodMethod) -> ImageDataset {
    ImageDataset::new(image_grid(10), image_data(), Noise::Background(BACKGROUND_RMS))
        .unwrap()
        .with_likelihood_method(method)
}

pub fn reconstruction(method: LikelihoodMethod) -> PixelatedSourceReconstruction<LensModel> {
    PixelatedSourceReconstruction::new(&dataset(method), psf(), sie(0.2), source_grid(), false).unwrap()
}

pub fn assert_all_close<'a>(got: impl IntoIterator<Item = &'a f64>, want: impl IntoIterator<Item = &'a f64>, atol: f64) {
    let (got, want): (Vec<_>, Vec<_>) = (got.into_iter().collect(), want.into_iter().collect());
    assert_eq!(got.len(), want.len());
    for (i, (g, w)) in got.iter().zip(want.iter()).enumerate() {
        assert!((*g - *w).abs() <= atol, "element {i}: got {g}, expected {w}");
    }
}
