//! Conversion between 1d (flattened) and 2d (`[x, y]`) pixel indices

use std::ops::{Add, Div, Mul, Rem};

/// Row-major flattening: `x` varies fastest
pub fn index2_to_1<T>([ix, iy]: [T; 2], [nx, _ny]: [T; 2]) -> T
where
    T: Mul<Output = T> + Add<Output = T>
{
    ix + iy * nx
}

pub fn index1_to_2<T>(i: T, [nx, _ny]: [T; 2]) -> [T; 2]
where
    T: Div<Output = T> +
    Rem<Output = T> +
    Copy
{
    [i % nx, i / nx]
}
