//! Configuration file parser for pixelated source reconstructions
//!
//! ```toml
//! [image]
//! file       = "image.raw"
//! grid       = { nx = 10, ny = 10, pixel_width = 0.05, origin = [-0.25, -0.25] }
//! noise      = { background_rms = 0.05 }
//! likelihood = "diagonal"
//!
//! [psf]
//! type  = "gaussian"
//! size  = 19
//! sigma = 3.0
//!
//! [source]
//! nx          = 2
//! ny          = 3
//! pixel_width = 0.03
//! origin      = [-0.06, -0.06]
//!
//! [[lens]]
//! type    = "SIE"
//! theta_E = 0.2
//! ```
//!
//! Relative file paths are interpreted relative to the directory containing
//! the configuration file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::lens::LensModel;
use crate::likelihood::LikelihoodMethod;
use crate::types::{PixelGrid, Point, Transform};

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub image: Image,
    pub psf: Psf,
    pub source: Grid,
    #[serde(default)]
    pub lens: LensModel,
}

/// The observation
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Image {
    /// Raw little-endian f64 pixel values, row-major, shape `(ny, nx)`
    pub file: PathBuf,
    pub grid: Grid,
    pub noise: Noise,
    #[serde(default)]
    pub likelihood: LikelihoodMethod,
    /// Raw antenna primary beam, same shape as the image
    #[serde(default)]
    pub primary_beam: Option<PathBuf>,
}

/// A pixel grid: either axis-aligned square pixels of `pixel_width`, or an
/// explicit `transform`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Grid {
    pub nx: usize,
    pub ny: usize,
    #[serde(default)]
    pub pixel_width: Option<f64>,
    #[serde(default)]
    pub transform: Option<[[f64; 2]; 2]>,
    pub origin: (f64, f64),
}

impl Grid {
    pub fn pixel_grid(&self) -> Result<PixelGrid, ConfigError> {
        let origin = Point::new(self.origin.0, self.origin.1);
        match (self.pixel_width, self.transform) {
            (Some(w), None) => Ok(PixelGrid::square(self.nx, self.ny, w, origin)),
            (None, Some([[a, b], [c, d]])) => Ok(PixelGrid::new(self.nx, self.ny, Transform::new(a, b, c, d), origin)),
            _ => Err(ConfigError::GridGeometry),
        }
    }
}

/// `{ background_rms = 0.05 }` or `{ map = "rms.raw" }`
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum Noise {
    BackgroundRms(f64),
    /// Raw per-pixel RMS map, same shape as the image
    Map(PathBuf),
}

/// Selected by its `type` field, like the lens profiles
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Psf {
    Gaussian {
        size: usize,
        sigma: f64,
    },
    File {
        file: PathBuf,
        shape: (usize, usize),
        #[serde(default = "default_normalize")]
        normalize: bool,
    },
}

fn default_normalize() -> bool { true }

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("couldn't read config file `{path}`: {source}")]
    Read { path: PathBuf, source: std::io::Error },

    #[error(transparent)]
    Parse(#[from] toml::de::Error),

    #[error("a grid needs exactly one of `pixel_width` and `transform`")]
    GridGeometry,
}

pub fn read_config_file(path: &Path) -> Result<Config, ConfigError> {
    let config: String = fs::read_to_string(path)
        .map_err(|source| ConfigError::Read { path: path.into(), source })?;
    Ok(toml::from_str(&config)?)
}

/// Interpret `path` relative to the directory of the config file `config`
pub fn relative_to_config(config: &Path, path: &Path) -> PathBuf {
    match config.parent() {
        Some(dir) if path.is_relative() => dir.join(path),
        _                               => path.into(),
    }
}
