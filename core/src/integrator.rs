//! Light transport integrator contract.

use crate::geometry::*;
use crate::rng::RNG;
use crate::sampler::{Sample, Sampler};
use crate::spectrum::Spectrum;
use bumpalo::Bump;

/// Per-worker scratch state handed to the integrator for every sample. Both
/// members belong exclusively to the pixel chunk being processed: the arena
/// is bulk-reset after each sample and the random stream is never shared
/// between workers.
pub struct ThreadContext<'a> {
    /// Scratch arena for transient per-sample allocations.
    pub arena: &'a Bump,

    /// The chunk's private random number generator.
    pub rng: &'a mut RNG,
}

/// Estimates the radiance arriving along camera rays by solving the light
/// transport equation. The physics is opaque to the rendering pipeline;
/// only the scheduling contract below is relied upon.
pub trait LteIntegrator: Send + Sync {
    /// Called once at the start of every render pass so the integrator can
    /// register the samples sequences it needs. The default implementation
    /// registers nothing.
    ///
    /// * `sampler` - The sampler to register sequences with.
    fn request_samples(&self, sampler: &mut dyn Sampler) {
        let _ = sampler;
    }

    /// Returns the incident radiance at the origin of the given ray.
    ///
    /// * `ray`    - The ray, with differentials when the camera produced
    ///              them.
    /// * `sample` - The sample bundle the ray was generated from.
    /// * `ctx`    - The chunk's scratch state.
    fn radiance(&self, ray: &Ray, sample: &Sample, ctx: &mut ThreadContext) -> Spectrum;
}
