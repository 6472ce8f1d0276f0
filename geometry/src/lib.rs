//! Angular coordinates on the sky, and the pixel grids which sample them.

mod grid;

pub use grid::PixelGrid;

/// A position in an angular coordinate system (`ra`-like `x`, `dec`-like `y`).
pub type Point  = nalgebra::Point2<f64>;
pub type Vector = nalgebra::Vector2<f64>;

/// Linear map from pixel offsets to angular offsets.
pub type Transform = nalgebra::Matrix2<f64>;
