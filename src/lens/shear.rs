/// External shear, `α = (γ1 x + γ2 y, γ2 x − γ1 y)` about `(ra_0, dec_0)`
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Shear {
    #[serde(default)] pub gamma1: f64,
    #[serde(default)] pub gamma2: f64,
    #[serde(default)] pub ra_0: Angle,
    #[serde(default)] pub dec_0: Angle,
}

impl Shear {
    pub fn deflection(&self, theta: Point) -> Vector {
        let (x, y) = (theta.x - self.ra_0, theta.y - self.dec_0);
        Vector::new(self.gamma1 * x + self.gamma2 * y,
                    self.gamma2 * x - self.gamma1 * y)
    }
}

// ----- Imports ------------------------------------------------------------------------------------------
use serde::Deserialize;

use crate::types::{Angle, Point, Vector};
