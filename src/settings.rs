//! Effect configuration and the availability gate.
//!
//! [`BlurSettings`] is the plain value object the host serializes and
//! exposes in its parameter UI; [`HostCapabilities`] carries the platform
//! flags the host resolves once per context. Both are consumed, never
//! produced, by this crate.

use crate::kernel;

/// User-facing blur configuration.
///
/// `half_kernel_size` is the number of samples taken on each side of the
/// center sample; the full kernel covers `2 * half + 1` texels. Values
/// below 1 are silently clamped to 1 before use, so a zero or negative
/// setting behaves like the default rather than erroring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlurSettings {
    /// Whether the effect participates in the post-processing stack.
    pub enabled: bool,
    /// Samples on each side of the center texel. No upper bound is
    /// enforced here; cost grows linearly with this value, so hosts
    /// should apply their own sanity limit.
    pub half_kernel_size: i32,
}

impl Default for BlurSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            half_kernel_size: 1,
        }
    }
}

impl BlurSettings {
    /// The half kernel size actually used for rendering, clamped to 1.
    pub fn effective_half_kernel_size(&self) -> u32 {
        kernel::clamp_half_kernel_size(self.half_kernel_size)
    }

    /// Full kernel width derived from the clamped half size.
    pub fn kernel_size(&self) -> u32 {
        kernel::kernel_size(self.effective_half_kernel_size())
    }

    /// Whether the effect should run on this host.
    ///
    /// Pure predicate with no side effects, evaluated by the caller
    /// before each frame; the render path itself never re-checks it.
    /// The effect requires compute shader support, a platform/API
    /// combination that is not known-broken, and the host's exposure
    /// compute resources to be present.
    pub fn is_enabled_and_supported(&self, caps: &HostCapabilities) -> bool {
        self.enabled
            && caps.supports_compute_shaders
            && !caps.is_mobile_gl
            && caps.has_auto_exposure
            && caps.has_exposure_histogram
    }
}

/// Platform capability flags supplied by the host environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostCapabilities {
    /// The active backend can run compute shaders.
    pub supports_compute_shaders: bool,
    /// Mobile GPU driving a GL-family API; compute post-processing is
    /// known broken on that combination.
    pub is_mobile_gl: bool,
    /// The host's auto-exposure compute resource is present.
    pub has_auto_exposure: bool,
    /// The host's exposure-histogram compute resource is present.
    pub has_exposure_histogram: bool,
}

impl HostCapabilities {
    /// Capabilities of a fully featured desktop host, convenient for
    /// tests and headless tools.
    pub const FULL: Self = Self {
        supports_compute_shaders: true,
        is_mobile_gl: false,
        has_auto_exposure: true,
        has_exposure_histogram: true,
    };
}
