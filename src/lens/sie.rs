//! Isothermal lenses.
//!
//! The SIE is evaluated as a non-singular isothermal ellipsoid whose core is
//! too small to matter (`S_SCALE`), which keeps the deflection finite at the
//! lens centre. Its axis ratio is capped just below 1, where the elliptical
//! expressions become 0/0.

/// Core size of the SIE, in angular units
const S_SCALE: f64 = 1e-10;

/// Largest axis ratio for which the elliptical deflection is evaluated
const Q_MAX: f64 = 0.999_999_99;

/// Singular isothermal ellipsoid, parametrized by the Einstein radius and the
/// ellipticity components `e1 = (1-q)/(1+q) cos 2φ`, `e2 = (1-q)/(1+q) sin 2φ`
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Sie {
    #[serde(rename = "theta_E")]
    pub theta_e: Angle,
    #[serde(default)] pub e1: f64,
    #[serde(default)] pub e2: f64,
    #[serde(default)] pub center_x: Angle,
    #[serde(default)] pub center_y: Angle,
}

impl Sie {
    pub fn deflection(&self, theta: Point) -> Vector {
        let (phi, q) = ellipticity_to_phi_q(self.e1, self.e2);
        let q2 = q * q;
        // Einstein radius along the major axis, then the NIE normalization
        let theta_e_major = self.theta_e * ((1.0 + q2) / (2.0 * q)).sqrt();
        let b = theta_e_major * ((1.0 + q2) / 2.0).sqrt();
        let s = S_SCALE * ((1.0 + q2) / (2.0 * q2)).sqrt();

        let (x, y) = rotate(theta.x - self.center_x, theta.y - self.center_y, phi);
        let (ax, ay) = major_axis_deflection(x, y, b, s, q);
        let (ax, ay) = rotate(ax, ay, -phi);
        Vector::new(ax, ay)
    }
}

/// Singular isothermal sphere: deflection of constant magnitude `theta_E`,
/// pointing away from the centre.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Sis {
    #[serde(rename = "theta_E")]
    pub theta_e: Angle,
    #[serde(default)] pub center_x: Angle,
    #[serde(default)] pub center_y: Angle,
}

impl Sis {
    pub fn deflection(&self, theta: Point) -> Vector {
        let (x, y) = (theta.x - self.center_x, theta.y - self.center_y);
        let r = (x * x + y * y + S_SCALE * S_SCALE).sqrt();
        Vector::new(self.theta_e * x / r, self.theta_e * y / r)
    }
}

/// Deflection of a non-singular isothermal ellipsoid aligned with the x axis
#[inline]
fn major_axis_deflection(x: f64, y: f64, b: f64, s: f64, q: f64) -> (f64, f64) {
    let q = q.min(Q_MAX);
    let q2 = q * q;
    let psi = (q2 * (s * s + x * x) + y * y).sqrt();
    let e = (1.0 - q2).sqrt();
    (b / e * (e * x / (psi + s)).atan(),
     b / e * (e * y / (psi + q2 * s)).atanh())
}

/// Orientation angle and axis ratio from ellipticity components
pub(crate) fn ellipticity_to_phi_q(e1: f64, e2: f64) -> (f64, f64) {
    let phi = e2.atan2(e1) / 2.0;
    let c = (e1 * e1 + e2 * e2).sqrt().min(0.9999);
    (phi, (1.0 - c) / (1.0 + c))
}

/// Coordinates of `(x, y)` in a frame rotated by `phi`
#[inline]
fn rotate(x: f64, y: f64, phi: f64) -> (f64, f64) {
    let (sin, cos) = phi.sin_cos();
    (cos * x + sin * y, -sin * x + cos * y)
}

// ----- Imports ------------------------------------------------------------------------------------------
use serde::Deserialize;

use crate::types::{Angle, Point, Vector};
