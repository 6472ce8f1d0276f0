/// A regular grid of pixels, and its placement in angular coordinates.
///
/// Pixel `(col, row)` has its centre at `origin + transform · (col, row)`. In
/// array form the grid has shape `(ny, nx)`: rows run along `y`, columns along
/// `x`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PixelGrid {
    pub nx: usize,
    pub ny: usize,
    pub transform: Transform,
    /// Angular position of the centre of pixel `(0, 0)`
    pub origin: Point,
}

impl PixelGrid {

    pub fn new(nx: usize, ny: usize, transform: Transform, origin: Point) -> Self {
        Self { nx, ny, transform, origin }
    }

    /// Axis-aligned grid of square pixels of width `pixel_width`
    pub fn square(nx: usize, ny: usize, pixel_width: f64, origin: Point) -> Self {
        Self::new(nx, ny, Transform::identity() * pixel_width, origin)
    }

    /// Array shape `(rows, cols)` of images sampled on this grid
    pub fn shape(&self) -> (usize, usize) { (self.ny, self.nx) }

    pub fn num_pixels(&self) -> usize { self.nx * self.ny }

    /// Angular position of the (possibly fractional) pixel position `(col, row)`
    #[inline]
    pub fn pixel_to_angle(&self, col: f64, row: f64) -> Point {
        let t = &self.transform;
        Point::new(self.origin.x + t[(0, 0)] * col + t[(0, 1)] * row,
                   self.origin.y + t[(1, 0)] * col + t[(1, 1)] * row)
    }

    /// Fractional pixel position `(col, row)` of an angular position. `None`
    /// if the transform cannot be inverted.
    pub fn angle_to_pixel(&self, p: Point) -> Option<(f64, f64)> {
        let inverse = self.transform.try_inverse()?;
        let pix = inverse * (p - self.origin);
        Some((pix.x, pix.y))
    }

    /// Angular coordinates of all pixel centres, as `(x, y)` arrays of shape
    /// `(ny, nx)`
    pub fn pixel_coordinates(&self) -> (Array2<f64>, Array2<f64>) {
        let angle = |(row, col): (usize, usize)| self.pixel_to_angle(col as f64, row as f64);
        (Array2::from_shape_fn(self.shape(), |i| angle(i).x),
         Array2::from_shape_fn(self.shape(), |i| angle(i).y))
    }

    /// No shear or rotation: off-diagonal elements are exactly zero
    pub fn is_axis_aligned(&self) -> bool {
        self.transform[(0, 1)] == 0.0 && self.transform[(1, 0)] == 0.0
    }

    /// Width of the pixels, if they are axis-aligned, square and of non-zero
    /// size
    pub fn square_pixel_width(&self) -> Option<f64> {
        let t = &self.transform;
        let square = self.is_axis_aligned() && t[(0, 0)] == t[(1, 1)] && t[(0, 0)] != 0.0;
        square.then(|| t[(0, 0)])
    }
}

// ----- Imports ------------------------------------------------------------------------------------------
use ndarray::Array2;
use crate::{Point, Transform};
