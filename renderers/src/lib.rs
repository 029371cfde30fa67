//! Renderers.

#[macro_use]
extern crate log;

mod sampler_based;

use lumen_core::camera::Camera;
use lumen_core::film::Film;

// Re-export.
pub use sampler_based::*;

/// A scene renderer. Renderers compute the image seen from a camera and
/// accumulate it on the camera's film.
pub trait Renderer: Send + Sync {
    /// Renders the image for the given camera. The film is cleared first,
    /// so any previous image is lost. Returns `true` if the render ran to
    /// completion and `false` if it was stopped.
    ///
    /// * `camera` - The camera to render from.
    fn render(&self, camera: &dyn Camera) -> bool;

    /// Requests a running render to stop. May be called concurrently with
    /// `render`. Returns `true` if a running render was actually asked to
    /// stop.
    fn stop_rendering(&self) -> bool;

    /// Returns `true` while a render pass is executing.
    fn in_progress(&self) -> bool;
}

/// Callback for updating a display with the image rendered so far. The
/// renderer invokes it at most once per configured period while rendering,
/// plus once unconditionally when a render pass completes.
pub trait DisplayUpdateCallback: Send {
    /// Updates the display with the film's current image.
    ///
    /// * `film` - The film holding the image rendered so far.
    fn update(&mut self, film: &dyn Film);
}
