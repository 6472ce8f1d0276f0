mod common;

use common::*;

use float_eq::assert_float_eq;
use ndarray::{array, s, Array2};
use rstest::rstest;
#[allow(unused)] use pretty_assertions::{assert_eq, assert_ne};

use lenspix::data::{ImageDataset, Noise};
use lenspix::gauss::gaussian_beam;
use lenspix::likelihood::{LikelihoodMethod, NormalEquations};
use lenspix::psf::PointSpreadFunction;
use lenspix::types::{PixelGrid, Point, Transform};
use lenspix::{PixelatedSourceReconstruction, ReconstructionError};

#[test]
fn construction_keeps_configuration() {
    let r = reconstruction(LikelihoodMethod::Diagonal);
    assert_eq!(r.image(), image_data());
    assert_eq!(r.noise().background_rms(), Some(BACKGROUND_RMS));
    assert!(r.primary_beam().is_none());
    assert_eq!(r.likelihood_method(), LikelihoodMethod::Diagonal);
    assert!(!r.verbose());
    assert_eq!(r.source_shape(), (3, 2));
    assert_eq!(r.source_pixel_width(), 0.03);
    assert_eq!(r.kernel(), kernel());

    let verbose = PixelatedSourceReconstruction::new(
        &dataset(LikelihoodMethod::Diagonal), psf(), sie(0.2), source_grid(), true,
    ).unwrap();
    assert!(verbose.verbose());
}

#[rstest(/**/ a  , b  , c  , d  ,
         case(1.0, 0.1, 0.0, 1.0),
         case(1.0, 0.0, 0.1, 1.0),
         case(1.0, 0.0, 0.0, 1.1),
)]
fn source_pixels_must_be_square(a: f64, b: f64, c: f64, d: f64) {
    let grid = PixelGrid::new(3, 3, Transform::new(a, b, c, d), Point::origin());
    let err = PixelatedSourceReconstruction::new(&dataset(LikelihoodMethod::Diagonal), psf(), sie(0.2), grid, false)
        .err().unwrap();
    assert!(matches!(err, ReconstructionError::NonSquareSourcePixels { .. }));
    assert!(err.is_invalid_configuration());
}

#[test]
fn natural_weighting_rejects_kernel_smaller_than_image_offsets() {
    let psf = PointSpreadFunction::new(Array2::ones((17, 17)), false).unwrap();
    let err = PixelatedSourceReconstruction::new(
        &dataset(LikelihoodMethod::InterferometryNatwt), psf, sie(0.2), source_grid(), false,
    ).err().unwrap();
    assert!(matches!(err, ReconstructionError::KernelTooSmallForInterferometry { .. }));
}

#[rstest(/**/ method,
         case(LikelihoodMethod::Diagonal),
         case(LikelihoodMethod::InterferometryNatwt),
)]
fn generate_m_b_routes_on_likelihood_method(method: LikelihoodMethod) {
    let r = reconstruction(method);
    let direct = match method {
        LikelihoodMethod::Diagonal            => r.generate_m_b_diagonal_likelihood(),
        LikelihoodMethod::InterferometryNatwt => r.generate_m_b_interferometry_natwt_likelihood(),
    }.unwrap();
    assert_eq!(r.generate_m_b().unwrap(), direct);
}

#[test]
fn diagonal_likelihood_normal_equations() {
    let NormalEquations { m, b } = reconstruction(LikelihoodMethod::Diagonal)
        .generate_m_b_diagonal_likelihood().unwrap();
    let m_expected = array![
        [0.01129016, 0.01358918, 0.01358918, 0.02152248, 0.01484909, 0.02400253],
        [0.01358918, 0.01815592, 0.01604542, 0.02759236, 0.01819409, 0.03177232],
        [0.01358918, 0.01604542, 0.01815592, 0.02759236, 0.02200811, 0.03442514],
        [0.02152248, 0.02759236, 0.02759236, 0.04546299, 0.03301198, 0.0554495 ],
        [0.01484909, 0.01819409, 0.02200811, 0.03301198, 0.03050647, 0.04755653],
        [0.02400253, 0.03177232, 0.03442514, 0.0554495 , 0.04755653, 0.07859336],
    ];
    let b_expected = array![0.44319784, 0.60691129, 0.60445714, 1.00888506, 0.80968046, 1.37626347];
    assert_all_close(&m, &m_expected, 1e-5);
    assert_all_close(&b, &b_expected, 1e-5);
}

#[test]
fn interferometry_natwt_likelihood_normal_equations() {
    let beam = gaussian_beam((10, 10), [3.0, 3.0], 5.0);
    let data = dataset(LikelihoodMethod::InterferometryNatwt).with_primary_beam(beam).unwrap();
    // A Gaussian rather than a real dirty beam, which is enough to pin the
    // arithmetic
    let r = PixelatedSourceReconstruction::new(&data, psf(), sie(0.2), source_grid(), false).unwrap();
    let NormalEquations { m, b } = r.generate_m_b_interferometry_natwt_likelihood().unwrap();
    let m_expected = array![
        [0.02229289, 0.0221506 , 0.0221506 , 0.03531318, 0.01467593, 0.02430386],
        [0.0221506 , 0.03126001, 0.01790875, 0.03867838, 0.01132409, 0.02526159],
        [0.0221506 , 0.01790875, 0.03126001, 0.03867838, 0.02907649, 0.03816851],
        [0.03531318, 0.03867838, 0.03867838, 0.06318939, 0.03045054, 0.05084672],
        [0.01467593, 0.01132409, 0.02907649, 0.03045054, 0.040716  , 0.04901641],
        [0.02430386, 0.02526159, 0.03816851, 0.05084672, 0.04901641, 0.06995898],
    ];
    let b_expected = array![0.84629238, 0.8555345 , 0.93490381, 1.09044392, 1.06591831, 1.55618881];
    assert_all_close(&m, &m_expected, 1e-5);
    assert_all_close(&b, &b_expected, 1e-5);
}

#[test]
fn natural_weighting_rejects_noise_map() {
    let data = ImageDataset::new(image_grid(10), image_data(), Noise::Map(Array2::ones((10, 10))))
        .unwrap()
        .with_likelihood_method(LikelihoodMethod::InterferometryNatwt);
    let err = PixelatedSourceReconstruction::new(&data, psf(), sie(0.2), source_grid(), false).err().unwrap();
    assert_eq!(err, ReconstructionError::NoiseMapUnsupported { method: LikelihoodMethod::InterferometryNatwt });
}

#[test]
fn source_pixel_footprints() {
    let footprints = reconstruction(LikelihoodMethod::Diagonal)
        .lens_pixel_source_of_a_rectangular_region().unwrap();
    assert_eq!(footprints.len(), 6);
    let ([row, col], weight) = footprints[3][0];
    assert_eq!([row, col], [0, 4]);
    assert_float_eq!(weight, 0.07323579271979347, abs <= 1e-5);
}

#[test]
fn footprints_without_lens_on_aligned_grid() {
    let r = PixelatedSourceReconstruction::new(
        &dataset(LikelihoodMethod::Diagonal), psf(), sie(0.0), aligned_source_grid(), false,
    ).unwrap();
    let footprints = r.lens_pixel_source_of_a_rectangular_region().unwrap();
    assert_eq!(footprints.len(), 9);
    let weights: Vec<f64> = footprints[3].iter().map(|&(_, w)| w).collect();
    assert_all_close(&weights, &[0.0, 0.0, 0.0, 1.0], 1e-5);
}

#[test]
fn lens_an_image_by_rayshooting() {
    let r = reconstruction(LikelihoodMethod::Diagonal);
    let source = image_data().slice(s![1..4, 1..3]).to_owned();
    let lensed = r.lens_an_image_by_rayshooting(source.view()).unwrap();
    let expected = array![
        [0.        , 0.        , 0.        , 0.        , 0.11461723, 0.        , 0.        , 0.        , 0.        , 0.        ],
        [0.        , 0.61209186, 0.51636297, 0.22842217, 0.03150559, 0.        , 0.        , 0.        , 0.        , 0.        ],
        [0.        , 0.68932727, 0.18182989, 0.        , 0.        , 0.        , 0.        , 0.10354675, 0.        , 0.        ],
        [0.        , 0.44900584, 0.        , 0.        , 0.        , 0.        , 0.        , 0.        , 0.21783726, 0.        ],
        [0.61899174, 0.1250819 , 0.        , 0.        , 0.        , 0.        , 0.        , 0.        , 0.33383885, 0.        ],
        [0.56713191, 0.        , 0.        , 0.        , 0.        , 0.        , 0.        , 0.        , 0.5671319 , 1.18399251e-08],
        [0.35597634, 0.11855964, 0.        , 0.        , 0.        , 0.        , 0.        , 0.        , 0.63783075, 0.        ],
        [0.        , 0.28591644, 0.        , 0.        , 0.        , 0.        , 0.        , 0.57478178, 0.34918442, 0.        ],
        [0.        , 2.00583843e-08, 0.12798694, 0.      , 0.        , 0.        , 0.229636  , 0.2348939 , 0.        , 0.        ],
        [0.        , 0.        , 0.        , 0.06533276, 0.02498332, 0.        , 0.        , 0.        , 0.        , 0.        ],
    ];
    assert_all_close(&lensed, &expected, 1e-5);

    let err = r.lens_an_image_by_rayshooting(Array2::zeros((9, 9)).view()).unwrap_err();
    assert!(err.is_invalid_input());
}

#[test]
fn lensing_without_lens_on_aligned_grid_reproduces_source() {
    let r = PixelatedSourceReconstruction::new(
        &dataset(LikelihoodMethod::Diagonal), psf(), sie(0.0), aligned_source_grid(), false,
    ).unwrap();
    let source = image_data().slice(s![3..6, 3..6]).to_owned();
    let lensed = r.lens_an_image_by_rayshooting(source.view()).unwrap();
    assert_all_close(&lensed.slice(s![3..6, 3..6]).to_owned(), &source, 1e-5);
}
