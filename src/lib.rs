//! Two-pass separable Gaussian blur for wgpu post-processing stacks.
//!
//! This crate implements a single post-processing effect: a Gaussian blur
//! decomposed into two 1-D compute passes (horizontal then vertical),
//! applied twice per frame, with two GPU-resident intermediate textures
//! sized to the current render target.
//!
//! # Architecture
//!
//! - [`KernelProgram`] wraps the WGSL compute module: it resolves the two
//!   entry points (`h_blur`, `v_blur`) at creation time, builds one
//!   compute pipeline per axis, and caches each entry point's workgroup
//!   size.
//! - [`BlurRenderer`] is the per-frame controller. Each frame it clamps
//!   the configured radius, recreates the intermediate targets if the
//!   resolution changed, writes the shared parameter vector once, records
//!   the four dispatches in strict order on the host's command encoder,
//!   and copies the final intermediate into the destination texture.
//! - [`BlurSettings`] is the plain configuration value object; its
//!   [`is_enabled_and_supported`](BlurSettings::is_enabled_and_supported)
//!   predicate gates whether the host should invoke the renderer at all.
//!
//! The host owns the device, the queue, and the per-frame encoder; the
//! encoder's program order is the only synchronization between passes.
//!
//! # Example
//!
//! ```no_run
//! # fn frame(
//! #     device: &wgpu::Device,
//! #     queue: &wgpu::Queue,
//! #     encoder: &mut wgpu::CommandEncoder,
//! #     scene: &wgpu::Texture,
//! #     output: &wgpu::Texture,
//! #     caps: &separable_blur::HostCapabilities,
//! # ) -> Result<(), separable_blur::BlurError> {
//! use separable_blur::{BlurRenderer, BlurSettings};
//!
//! let settings = BlurSettings {
//!     half_kernel_size: 4,
//!     ..Default::default()
//! };
//! let mut renderer = BlurRenderer::new(device)?;
//!
//! if settings.is_enabled_and_supported(caps) {
//!     renderer.render(device, queue, encoder, scene, output, &settings);
//! }
//! # Ok(())
//! # }
//! ```

pub mod kernel;
pub mod pipeline;
pub mod renderer;
pub mod settings;
pub mod target;

pub use kernel::KernelAxis;
pub use pipeline::KernelProgram;
pub use renderer::{BlurRenderer, DispatchDescriptor, FramePlan, Slot, plan_frame};
pub use settings::{BlurSettings, HostCapabilities};
pub use target::{PingPong, TargetPool};

/// Errors surfaced by this crate.
///
/// Only startup-time configuration problems are fallible; the per-frame
/// render path has no error branch (invalid parameters are clamped and
/// resolution changes are a normal policy branch, not failures).
#[derive(Debug, thiserror::Error)]
pub enum BlurError {
    /// The compute module does not define the named entry point. The
    /// effect cannot run without both blur kernels, so this is fatal.
    #[error("blur kernel entry point `{0}` not found in compute module")]
    KernelEntryNotFound(String),
}

/// Width and height of the current render target, in pixels.
///
/// Captured from the source texture each frame; both dimensions are
/// expected to be non-zero. The intermediate blur targets are recreated
/// whenever this differs from their recorded size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameDimensions {
    pub width: u32,
    pub height: u32,
}

impl FrameDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Reads the dimensions of a texture's base mip level.
    pub fn of_texture(texture: &wgpu::Texture) -> Self {
        Self {
            width: texture.width(),
            height: texture.height(),
        }
    }

    pub(crate) fn extent(self) -> wgpu::Extent3d {
        wgpu::Extent3d {
            width: self.width,
            height: self.height,
            depth_or_array_layers: 1,
        }
    }
}
