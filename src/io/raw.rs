//! Read / write f64 arrays as raw little-endian binary

use std::fs::File;
use std::io::{Write, Read, BufWriter, BufReader};

use ndarray::{Array2, ArrayView2};

pub fn write(data: impl Iterator<Item = f64>, path: &std::path::Path) -> std::io::Result<()> {
    let file = File::create(path)?;
    let mut buf = BufWriter::new(file);
    for datum in data {
        buf.write_all(&datum.to_le_bytes())?;
    }
    buf.flush()
}

type IORes<T> = std::io::Result<T>;
pub fn read<'a>(path: &std::path::Path) -> IORes<impl Iterator<Item = IORes<f64>> + 'a> {
    let file = File::open(path)?;
    let mut buf = BufReader::new(file);
    let mut buffer = [0; 8];

    Ok(std::iter::from_fn(move || {
        use std::io::ErrorKind::UnexpectedEof;
        match buf.read_exact(&mut buffer) {
            Ok(()) => Some(Ok(f64::from_le_bytes(buffer))),
            Err(e) if e.kind() == UnexpectedEof => None,
            Err(e) => Some(Err(e)),
        }
    }))
}

/// Write a 2d array in row-major order
pub fn write_array(array: ArrayView2<f64>, path: &std::path::Path) -> IORes<()> {
    write(array.iter().copied(), path)
}

/// Read a row-major 2d array of shape `shape`. Fails if the file does not
/// hold exactly the right number of values.
pub fn read_array(path: &std::path::Path, shape: (usize, usize)) -> IORes<Array2<f64>> {
    let data = read(path)?.collect::<IORes<Vec<_>>>()?;
    let found = data.len();
    Array2::from_shape_vec(shape, data).map_err(|_| std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        format!("{}: expected {} values for shape {shape:?}, found {found}", path.display(), shape.0 * shape.1),
    ))
}
