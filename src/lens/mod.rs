//! Ray shooting from the image plane back to the source plane.
//!
//! A `LensModel` is an ordered list of mass profiles, each carrying its own
//! parameters; their deflections add. Nothing here fails: a non-finite
//! deflection shows up as a NaN source position, which callers must be
//! prepared to meet.

mod shear;
mod sie;

pub use shear::Shear;
pub use sie::{Sie, Sis};

/// Maps image-plane angular positions to source-plane positions, through the
/// lens equation `β = θ − α(θ)`.
pub trait RayTracer: Sync {

    /// Deflection angle `α` at image-plane position `theta`
    fn deflection(&self, theta: Point) -> Vector;

    #[inline]
    fn trace_source(&self, theta: Point) -> Point { theta - self.deflection(theta) }

    /// Elementwise `trace_source` over coordinate arrays of equal shape
    fn trace_sources(&self, x: ArrayView2<f64>, y: ArrayView2<f64>) -> (Array2<f64>, Array2<f64>) {
        let mut beta_x = Array2::zeros(x.dim());
        let mut beta_y = Array2::zeros(x.dim());
        let trace = |bx: &mut f64, by: &mut f64, &x: &f64, &y: &f64| {
            let beta = self.trace_source(Point::new(x, y));
            *bx = beta.x;
            *by = beta.y;
        };
        let zip = Zip::from(&mut beta_x).and(&mut beta_y).and(x).and(y);
        #[cfg(not(feature = "serial"))] zip.par_for_each(trace);
        #[cfg(    feature = "serial") ] zip.for_each(trace);
        (beta_x, beta_y)
    }
}

/// One mass component of a lens, with its parameters
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum LensProfile {
    #[serde(rename = "SIE")]   Sie(Sie),
    #[serde(rename = "SIS")]   Sis(Sis),
    #[serde(rename = "SHEAR")] Shear(Shear),
}

impl RayTracer for LensProfile {
    fn deflection(&self, theta: Point) -> Vector {
        match self {
            Self::Sie  (p) => p.deflection(theta),
            Self::Sis  (p) => p.deflection(theta),
            Self::Shear(p) => p.deflection(theta),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct LensModel {
    pub profiles: Vec<LensProfile>,
}

impl LensModel {
    pub fn new(profiles: Vec<LensProfile>) -> Self { Self { profiles } }

    /// A model with no deflection at all
    pub fn no_lens() -> Self { Self::default() }
}

impl RayTracer for LensModel {
    fn deflection(&self, theta: Point) -> Vector {
        self.profiles.iter()
            .map(|p| p.deflection(theta))
            .fold(Vector::zeros(), |total, alpha| total + alpha)
    }
}

// ----- Imports ------------------------------------------------------------------------------------------
use ndarray::{Array2, ArrayView2, Zip};
use serde::Deserialize;

use crate::types::{Point, Vector};
