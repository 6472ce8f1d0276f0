// ----------------------------------- CLI -----------------------------------
#[derive(clap::Parser, Debug, Clone)]
#[clap(name = "normal_equations", about = "Build the normal equations of a pixelated source reconstruction")]
pub struct Cli {

    /// Reconstruction configuration file (TOML)
    #[clap(short, long)]
    pub config: PathBuf,

    /// Directory in which to write `M.raw` and `b.raw`
    #[clap(short, long, default_value = "data/out")]
    pub output: PathBuf,

    /// Log progress of each stage
    #[clap(short, long)]
    pub verbose: bool,

    #[cfg(not(feature = "serial"))]
    /// Maximum number of rayon threads
    #[clap(short = 'j', long, default_value = "4")]
    pub num_threads: usize,
}

fn main() -> Result<(), Box<dyn Error>> {

    let args = Cli::parse();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if args.verbose { "info" } else { "warn" }));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    #[cfg(not(feature = "serial"))]
    // Set the maximum number of threads used by rayon for parallel iteration
    match rayon::ThreadPoolBuilder::new().num_threads(args.num_threads).build_global() {
        Err(e) => warn!("{e}"),
        Ok(_)  => info!("Using up to {} threads.", args.num_threads),
    }

    let mut progress = Progress::new(true);

    let config = read_config_file(&args.config)?;
    let path = |p: &PathBuf| relative_to_config(&args.config, p);
    let image_grid = config.image.grid.pixel_grid()?;
    let shape = image_grid.shape();

    let image = raw::read_array(&path(&config.image.file), shape)?;
    let noise = match &config.image.noise {
        cfg::Noise::BackgroundRms(rms) => Noise::Background(*rms),
        cfg::Noise::Map(file)          => Noise::Map(raw::read_array(&path(file), shape)?),
    };
    let mut data = ImageDataset::new(image_grid, image, noise)?
        .with_likelihood_method(config.image.likelihood);
    if let Some(file) = &config.image.primary_beam {
        data = data.with_primary_beam(raw::read_array(&path(file), shape)?)?;
    }

    let psf = match &config.psf {
        cfg::Psf::Gaussian { size, sigma } => PointSpreadFunction::gaussian(*size, *sigma)?,
        cfg::Psf::File { file, shape, normalize } =>
            PointSpreadFunction::new(raw::read_array(&path(file), *shape)?, *normalize)?,
    };
    progress.done_with_message("Loaded configuration and data");

    let reconstruction = PixelatedSourceReconstruction::new(
        &data, psf, config.lens, config.source.pixel_grid()?, args.verbose,
    )?;
    let NormalEquations { m, b } = reconstruction.generate_m_b()?;
    progress.done_with_message(&format!(
        "Generated {}-likelihood normal equations for {} source pixels",
        reconstruction.likelihood_method(),
        group_digits(reconstruction.num_source_pixels()),
    ));

    create_dir_all(&args.output)?;
    raw::write_array(m.view(), &args.output.join("M.raw"))?;
    raw::write(b.iter().copied(), &args.output.join("b.raw"))?;
    progress.done_with_message(&format!("Wrote M.raw and b.raw to {}", args.output.display()));
    Ok(())
}

// --------------------------------------------------------------------------------

use std::error::Error;
use std::fs::create_dir_all;
use std::path::PathBuf;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use lenspix::config::reconstruction::{self as cfg, read_config_file, relative_to_config};
use lenspix::data::{ImageDataset, Noise};
use lenspix::io::raw;
use lenspix::likelihood::NormalEquations;
use lenspix::psf::PointSpreadFunction;
use lenspix::reconstruction::PixelatedSourceReconstruction;
use lenspix::utils::{group_digits, timing::Progress};
