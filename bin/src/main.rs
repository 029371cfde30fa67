//! Demo renderer: an anisotropically filtered checkerboard environment.

#[macro_use]
extern crate log;

use clap::Parser;
use itertools::iproduct;
use lumen_core::camera::{Camera, PerspectiveCamera};
use lumen_core::common::*;
use lumen_core::film::{BoxFilter, Film, ImageFilm};
use lumen_core::geometry::*;
use lumen_core::integrator::{LteIntegrator, ThreadContext};
use lumen_core::mipmap::{ImageWrap, MIPMap};
use lumen_core::sampler::Sample;
use lumen_core::spectrum::Spectrum;
use lumen_renderers::{Renderer, RendererOptions, SamplerBasedRenderer};
use lumen_samplers::LowDiscrepancySampler;
use std::path::PathBuf;
use std::sync::Arc;

/// Command line options.
#[derive(Parser)]
#[command(name = "lumen", about = "Renders a checkerboard environment map.")]
struct Options {
    /// Image width in pixels.
    #[arg(long, default_value_t = 640)]
    width: usize,

    /// Image height in pixels.
    #[arg(long, default_value_t = 360)]
    height: usize,

    /// Samples per pixel (rounded up to a power of two).
    #[arg(long, default_value_t = 4)]
    samples_per_pixel: usize,

    /// Worker threads; 0 selects the available hardware parallelism.
    #[arg(long, default_value_t = 0)]
    threads: usize,

    /// Maximum anisotropy for texture filtering.
    #[arg(long, default_value_t = 8.0)]
    max_anisotropy: Float,

    /// Output image path.
    #[arg(long, default_value = "lumen.png")]
    output: PathBuf,
}

/// Integrator shading every ray with a filtered lookup into an environment
/// texture. The texture-space footprint comes from the ray differentials,
/// so minified regions near the horizon get properly anisotropic filtering.
struct EnvironmentIntegrator {
    texture: MIPMap<Spectrum>,
}

impl EnvironmentIntegrator {
    /// Maps a direction to spherical environment coordinates in [0,1]².
    fn direction_to_st(d: &Vector3f) -> Point2f {
        let d = d.normalize();
        let phi = d.y.atan2(d.x);
        let theta = clamp(d.z, -1.0, 1.0).acos();
        Point2f::new((phi + PI) * INV_TWO_PI, theta * INV_PI)
    }

    /// Difference of two texture points, unwrapped across the azimuthal
    /// seam.
    fn st_offset(from: &Point2f, to: &Point2f) -> Vector2f {
        let mut d = *to - *from;
        if d.x > 0.5 {
            d.x -= 1.0;
        } else if d.x < -0.5 {
            d.x += 1.0;
        }
        d
    }
}

impl LteIntegrator for EnvironmentIntegrator {
    fn radiance(&self, ray: &Ray, _sample: &Sample, _ctx: &mut ThreadContext) -> Spectrum {
        let st = Self::direction_to_st(&ray.d);

        match ray.differentials {
            Some(d) => {
                let st_x = Self::direction_to_st(&d.rx_direction);
                let st_y = Self::direction_to_st(&d.ry_direction);
                self.texture.lookup_ewa(
                    &st,
                    &Self::st_offset(&st, &st_x),
                    &Self::st_offset(&st, &st_y),
                )
            }
            None => self.texture.lookup(&st, 0.0),
        }
    }
}

/// Builds a checkerboard texture.
///
/// * `resolution`     - Texture resolution in texels.
/// * `checks`         - Number of checker cells along each axis.
/// * `max_anisotropy` - Maximum anisotropy for the MIPMap.
fn checkerboard(
    resolution: usize,
    checks: usize,
    max_anisotropy: Float,
) -> Result<MIPMap<Spectrum>, lumen_core::error::Error> {
    let cell = resolution / checks;
    let a = Spectrum::from_rgb([0.9, 0.9, 0.85]);
    let b = Spectrum::from_rgb([0.15, 0.25, 0.5]);

    let image: Vec<Vec<Spectrum>> = (0..resolution)
        .map(|y| {
            (0..resolution)
                .map(|x| if (x / cell + y / cell) % 2 == 0 { a } else { b })
                .collect()
        })
        .collect();

    MIPMap::new(&image, ImageWrap::Repeat, max_anisotropy)
}

/// Develops the film into an 8-bit gamma-corrected PNG.
///
/// * `film` - The film holding the rendered image.
/// * `path` - Output path.
fn write_image(film: &dyn Film, path: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let (width, height) = (film.x_resolution(), film.y_resolution());
    let mut image = image::RgbImage::new(width as u32, height as u32);

    for (y, x) in iproduct!(0..height, 0..width) {
        let spectrum = film
            .get_pixel(&Point2i::new(x as Int, y as Int))
            .unwrap_or_else(|| Spectrum::new(0.0));
        let rgb = spectrum.clamp(0.0, 1.0).to_rgb();
        image.put_pixel(
            x as u32,
            y as u32,
            image::Rgb([
                (gamma_correct(rgb[0]) * 255.0 + 0.5) as u8,
                (gamma_correct(rgb[1]) * 255.0 + 0.5) as u8,
                (gamma_correct(rgb[2]) * 255.0 + 0.5) as u8,
            ]),
        );
    }

    image.save(path)?;
    Ok(())
}

fn run(options: &Options) -> Result<(), Box<dyn std::error::Error>> {
    let texture = checkerboard(512, 16, options.max_anisotropy)?;

    let film: Arc<dyn Film> = Arc::new(ImageFilm::new(
        options.width,
        options.height,
        Box::new(BoxFilter::new(0.5, 0.5)),
    )?);

    let camera = PerspectiveCamera::new(
        Point3f::new(0.0, 0.0, 0.0),
        Point3f::new(1.0, 0.0, 0.2),
        Vector3f::new(0.0, 0.0, 1.0),
        (60.0 as Float).to_radians(),
        0.0,
        1.0,
        Arc::clone(&film),
    )?;

    let sampler = LowDiscrepancySampler::new(film.sampling_extent(), options.samples_per_pixel);
    let integrator = Arc::new(EnvironmentIntegrator { texture });

    let renderer = SamplerBasedRenderer::with_options(
        integrator,
        Box::new(sampler),
        RendererOptions {
            n_threads: options.threads,
            ..Default::default()
        },
    );

    renderer.render(&camera);
    write_image(&*camera.film(), &options.output)?;

    info!("Wrote {}", options.output.display());
    Ok(())
}

fn main() {
    // Initialize `env_logger`.
    env_logger::init();

    let options = Options::parse();
    if let Err(e) = run(&options) {
        error!("{e}");
        std::process::exit(1);
    }
}
