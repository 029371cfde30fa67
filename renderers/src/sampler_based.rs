//! Sampler Based Renderer.

use crate::{DisplayUpdateCallback, Renderer};
use bumpalo::Bump;
use indicatif::ProgressBar;
use lumen_core::camera::Camera;
use lumen_core::common::*;
use lumen_core::film::Film;
use lumen_core::geometry::*;
use lumen_core::integrator::{LteIntegrator, ThreadContext};
use lumen_core::rng::RNG;
use lumen_core::sampler::{Sample, Sampler, SubSampler};
use lumen_core::spectrum::Spectrum;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Default number of pixel chunks in the pool. This bounds the number of
/// in-flight chunks and therefore the pipeline's memory use, independent of
/// the image resolution.
const CHUNKS_NUM: usize = 16;

/// Default number of pixels assigned to each chunk. Larger values increase
/// memory overhead and improve throughput.
const PIXELS_PER_CHUNK: usize = 16;

/// Configuration for the rendering pipeline.
pub struct RendererOptions {
    /// Number of worker threads for radiance integration; 0 selects the
    /// available hardware parallelism.
    pub n_threads: usize,

    /// Number of pixel chunks in the pool.
    pub n_chunks: usize,

    /// Number of pixels assigned to each chunk.
    pub pixels_per_chunk: usize,
}

impl Default for RendererOptions {
    /// Returns the default pipeline configuration.
    fn default() -> Self {
        Self {
            n_threads: 0,
            n_chunks: CHUNKS_NUM,
            pixels_per_chunk: PIXELS_PER_CHUNK,
        }
    }
}

/// A reusable unit of pipeline work: a group of pixels together with the
/// scratch resources their samples need. A chunk is owned by exactly one
/// pipeline stage at a time; ownership moves through the pipeline's
/// channels, so no locking or availability flag is needed.
struct PixelsChunk {
    /// The sample bundle, repopulated by the sub-sampler for every sample.
    sample: Sample,

    /// Scratch arena for the integrator's transient per-sample
    /// allocations; bulk-reset after every sample.
    arena: Bump,

    /// The chunk's private random stream.
    rng: RNG,

    /// Sub-sampler covering the chunk's pixels for this round.
    sub_sampler: Option<Box<dyn SubSampler>>,

    /// Radiance accumulated for the chunk's samples, flushed to the film
    /// by the film-writer stage.
    results: Vec<(Point2f, Spectrum)>,
}

impl PixelsChunk {
    /// Create a new `PixelsChunk`.
    ///
    /// * `sample` - Sample instance sized for the registered sequences.
    /// * `seed`   - Seed selecting the chunk's private random stream.
    fn new(sample: Sample, seed: u64) -> Self {
        Self {
            sample,
            arena: Bump::new(),
            rng: RNG::new(seed),
            sub_sampler: None,
            results: vec![],
        }
    }
}

/// Display callback state guarded by a mutex. The callback itself is only
/// ever invoked from the single-flight film-writer stage and from the end
/// of `render`, never concurrently.
struct DisplayState {
    callback: Option<Box<dyn DisplayUpdateCallback>>,
    period: Duration,
    last_update: Instant,
}

/// Renders the image with a three-stage pipeline driven by a stream of
/// samples from a `Sampler`:
///
/// 1. The serial generator stage takes a free chunk from the pool and
///    attaches the sampler's next sub-sampler to it.
/// 2. The parallel integrator stage computes radiance for every sample the
///    chunk's sub-sampler yields, using the chunk's private arena and
///    random stream.
/// 3. The serial film-writer stage flushes the chunk's accumulated results
///    to the film and recycles the chunk.
///
/// The film is only ever touched by stage 3 and the sampler only by stage
/// 1; chunk ownership moves through bounded channels, so each resource has
/// exactly one user at any moment.
pub struct SamplerBasedRenderer {
    /// Estimates radiance along the camera rays.
    integrator: Arc<dyn LteIntegrator>,

    /// Produces the camera samples. Only the generator stage touches it.
    sampler: Mutex<Box<dyn Sampler>>,

    /// Pipeline configuration.
    options: RendererOptions,

    /// Cooperative stop flag, polled before chunk acquisition and before
    /// each sample.
    stop_requested: AtomicBool,

    /// Set while a render pass is executing.
    rendering_in_progress: AtomicBool,

    /// Display update callback state.
    display: Mutex<DisplayState>,
}

impl SamplerBasedRenderer {
    /// Create a new `SamplerBasedRenderer` with the default pipeline
    /// configuration.
    ///
    /// * `integrator` - Estimates radiance along the camera rays.
    /// * `sampler`    - Produces the camera samples.
    pub fn new(integrator: Arc<dyn LteIntegrator>, sampler: Box<dyn Sampler>) -> Self {
        Self::with_options(integrator, sampler, RendererOptions::default())
    }

    /// Create a new `SamplerBasedRenderer`.
    ///
    /// * `integrator` - Estimates radiance along the camera rays.
    /// * `sampler`    - Produces the camera samples.
    /// * `options`    - Pipeline configuration.
    pub fn with_options(
        integrator: Arc<dyn LteIntegrator>,
        sampler: Box<dyn Sampler>,
        options: RendererOptions,
    ) -> Self {
        Self {
            integrator,
            sampler: Mutex::new(sampler),
            options,
            stop_requested: AtomicBool::new(false),
            rendering_in_progress: AtomicBool::new(false),
            display: Mutex::new(DisplayState {
                callback: None,
                period: Duration::from_secs(1),
                last_update: Instant::now(),
            }),
        }
    }

    /// Sets the callback invoked periodically with the image rendered so
    /// far. Passing `None` disables display updates.
    ///
    /// * `callback` - The callback.
    /// * `period`   - Minimum time between two consecutive invocations.
    pub fn set_display_update_callback(
        &self,
        callback: Option<Box<dyn DisplayUpdateCallback>>,
        period: Duration,
    ) {
        let mut display = self.display.lock().unwrap();
        display.callback = callback;
        display.period = period;
    }

    /// Invokes the display callback if the update period has passed since
    /// the last invocation, or unconditionally when forced.
    ///
    /// * `film`  - The film holding the image rendered so far.
    /// * `force` - Invoke the callback regardless of the elapsed time.
    fn update_display(&self, film: &dyn Film, force: bool) {
        let mut display = self.display.lock().unwrap();
        if display.callback.is_none() {
            return;
        }
        if force || display.last_update.elapsed() >= display.period {
            if let Some(callback) = display.callback.as_mut() {
                callback.update(film);
            }
            display.last_update = Instant::now();
        }
    }

    /// Computes radiance for every sample of the chunk's sub-sampler and
    /// accumulates the results into the chunk.
    ///
    /// * `camera` - The camera to render from.
    /// * `chunk`  - The chunk to process.
    fn integrate_chunk(&self, camera: &dyn Camera, chunk: &mut PixelsChunk) {
        let mut sub_sampler = match chunk.sub_sampler.take() {
            Some(ss) => ss,
            None => return,
        };

        loop {
            // A stop request lets the already-started sample finish but
            // skips the rest; whatever was accumulated still reaches the
            // film.
            if self.stop_requested.load(Ordering::Relaxed) {
                break;
            }
            if !sub_sampler.next_sample(&mut chunk.rng, &mut chunk.sample) {
                break;
            }

            let image_point = chunk.sample.image_point();
            let lens_uv = chunk.sample.lens_uv();
            let (x_width, y_width) = chunk.sample.filter_width();

            // The primary ray plus two rays offset by the filter width in
            // each image axis give the differentials texture filtering
            // derives its footprint from.
            let (mut ray, weight) = camera.generate_ray(&image_point, &lens_uv);
            let (rx, x_weight) =
                camera.generate_ray(&(image_point + Vector2f::new(x_width, 0.0)), &lens_uv);
            let (ry, y_weight) =
                camera.generate_ray(&(image_point + Vector2f::new(0.0, y_width)), &lens_uv);
            if x_weight > 0.0 && y_weight > 0.0 {
                ray.differentials = Some(RayDifferential::new(rx.o, ry.o, rx.d, ry.d));
            }

            let mut radiance = Spectrum::new(0.0);
            if weight > 0.0 {
                let mut ctx = ThreadContext {
                    arena: &chunk.arena,
                    rng: &mut chunk.rng,
                };
                radiance = validate_radiance(
                    self.integrator.radiance(&ray, &chunk.sample, &mut ctx),
                    &image_point,
                );
            }

            chunk.results.push((image_point, radiance * weight));

            // The integrator's transient allocations die here; the arena
            // keeps its blocks for the next sample.
            chunk.arena.reset();
        }
    }
}

impl Renderer for SamplerBasedRenderer {
    fn render(&self, camera: &dyn Camera) -> bool {
        let start_time = Instant::now();
        self.rendering_in_progress.store(true, Ordering::SeqCst);
        self.stop_requested.store(false, Ordering::SeqCst);

        let film = camera.film();
        film.clear();

        // Re-register the integrator's samples sequences for this pass.
        let mut sampler = self.sampler.lock().unwrap();
        sampler.reset();
        sampler.clear_samples_sequences();
        self.integrator.request_samples(sampler.as_mut());

        let n_threads = if self.options.n_threads > 0 {
            self.options.n_threads
        } else {
            std::thread::available_parallelism().map_or(1, |n| n.get())
        };
        let n_chunks = max(1, self.options.n_chunks);
        let pixels_per_chunk = max(1, self.options.pixels_per_chunk);

        let progress = ProgressBar::new(sampler.total_samples() as u64);

        // The chunk pool and the pipeline queues. Every channel can hold
        // the entire pool, so sends never block indefinitely; backpressure
        // comes from the pool running dry.
        let (free_tx, free_rx) = crossbeam_channel::bounded::<PixelsChunk>(n_chunks);
        let (work_tx, work_rx) = crossbeam_channel::bounded::<PixelsChunk>(n_chunks);
        let (done_tx, done_rx) = crossbeam_channel::bounded::<PixelsChunk>(n_chunks);

        for seed in 0..n_chunks {
            let chunk = PixelsChunk::new(sampler.create_sample(), seed as u64);
            free_tx.send(chunk).unwrap();
        }

        crossbeam::scope(|scope| {
            // Integrator stage: data-parallel across chunks.
            for _ in 0..n_threads {
                let work_rx = work_rx.clone();
                let done_tx = done_tx.clone();
                scope.spawn(move |_| {
                    for mut chunk in work_rx.iter() {
                        self.integrate_chunk(camera, &mut chunk);
                        if done_tx.send(chunk).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(work_rx);
            drop(done_tx);

            // Film-writer stage: single-flight by construction; the only
            // stage that touches the film.
            let film = &*film;
            let free_tx_recycle = free_tx.clone();
            let progress_writer = progress.clone();
            scope.spawn(move |_| {
                for mut chunk in done_rx.iter() {
                    let flushed = chunk.results.len();
                    for (image_point, radiance) in chunk.results.drain(..) {
                        film.add_sample(&image_point, &radiance);
                    }
                    progress_writer.inc(flushed as u64);
                    if free_tx_recycle.send(chunk).is_err() {
                        break;
                    }
                    self.update_display(film, false);
                }
            });

            // Generator stage, running serially on this thread: the only
            // stage that touches the sampler.
            loop {
                if self.stop_requested.load(Ordering::Relaxed) {
                    break;
                }
                let mut chunk = match free_rx.recv() {
                    Ok(chunk) => chunk,
                    Err(_) => break,
                };
                chunk.results.clear();

                match sampler.get_next_sub_sampler(pixels_per_chunk) {
                    Some(sub_sampler) => {
                        chunk.sub_sampler = Some(sub_sampler);
                        if work_tx.send(chunk).is_err() {
                            break;
                        }
                    }
                    None => {
                        let _ = free_tx.send(chunk);
                        break;
                    }
                }
            }
            drop(work_tx);
        })
        .unwrap();

        self.rendering_in_progress.store(false, Ordering::SeqCst);
        progress.finish_and_clear();

        // Force a display update even if the period has not passed yet.
        self.update_display(&*film, true);

        let stopped = self.stop_requested.load(Ordering::SeqCst);
        if !stopped {
            info!(
                "Rendering complete in {} ms.",
                start_time.elapsed().as_millis()
            );
        }
        !stopped
    }

    fn stop_rendering(&self) -> bool {
        if !self.rendering_in_progress.load(Ordering::SeqCst) {
            warn!("Rendering is not active. Nothing to stop.");
            return false;
        }
        if self.stop_requested.swap(true, Ordering::SeqCst) {
            warn!("Rendering has already been stopped.");
            return false;
        }

        info!("Rendering has been stopped.");
        true
    }

    fn in_progress(&self) -> bool {
        self.rendering_in_progress.load(Ordering::SeqCst)
    }
}

/// Substitutes black for numerically invalid radiance values, logging a
/// warning. Per-sample numerical problems never abort the render.
///
/// * `radiance`    - The radiance returned by the integrator.
/// * `image_point` - The sample's image point, for diagnostics.
pub(crate) fn validate_radiance(radiance: Spectrum, image_point: &Point2f) -> Spectrum {
    if radiance.has_nans() {
        warn!(
            "Not-a-number radiance value returned for image sample {}. Setting to black.",
            image_point
        );
        Spectrum::new(0.0)
    } else if radiance.y() < -1e-5 {
        warn!(
            "Negative luminance value returned for image sample {}. Setting to black.",
            image_point
        );
        Spectrum::new(0.0)
    } else if radiance.y().is_infinite() {
        warn!(
            "Infinite luminance value returned for image sample {}. Setting to black.",
            image_point
        );
        Spectrum::new(0.0)
    } else {
        radiance
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
