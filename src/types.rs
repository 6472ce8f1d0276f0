pub type Angle     = f64;
pub type Weight    = f64;

pub type Index1 = usize;
/// `[row, col]` position in an image-plane or source-plane array
pub type Index2 = [usize; 2];
pub type Shape2 = (usize, usize);

pub type Index2Weight = (Index2, Weight);

pub use geometry::{Point, Vector, Transform, PixelGrid};
