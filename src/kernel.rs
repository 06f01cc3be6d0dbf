//! Gaussian kernel definition shared by the GPU program and the CPU
//! reference implementation.
//!
//! The weight scheme lives here in one place so the WGSL kernels, the
//! software reference, and the tests all agree: `sigma = half / 2`,
//! `w(i) = exp(-i^2 / (2 sigma^2))`, normalized so the kernel sums to 1.

use crate::BlurError;

pub mod reference;

/// Lower bound applied to the configured half kernel size before use.
pub const MIN_HALF_KERNEL_SIZE: i32 = 1;

/// Invocations per workgroup along each kernel's major axis. Must match
/// the `@workgroup_size` declaration in `pipeline/blur.wgsl`.
pub const AXIS_WORKGROUP_SIZE: u32 = 64;

/// Clamps a user-supplied half kernel size to the supported minimum.
pub fn clamp_half_kernel_size(half: i32) -> u32 {
    half.max(MIN_HALF_KERNEL_SIZE) as u32
}

/// Full kernel width for a clamped half size: `2 * half + 1`.
pub fn kernel_size(half: u32) -> u32 {
    2 * half + 1
}

/// The two 1-D blur kernels, one per axis.
///
/// The kernels are axis-major: one `h_blur` invocation walks an entire
/// row and one `v_blur` invocation walks an entire column. That layout is
/// why the horizontal pass is dispatched with a group count derived from
/// the frame *height* and the vertical pass from the frame *width*.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KernelAxis {
    Horizontal,
    Vertical,
}

impl KernelAxis {
    /// Entry point name in the compute module.
    pub const fn entry_point(self) -> &'static str {
        match self {
            Self::Horizontal => "h_blur",
            Self::Vertical => "v_blur",
        }
    }

    /// Workgroup size declared by this entry point, as
    /// `[x, y, z]` invocations per group.
    pub const fn workgroup_size(self) -> [u32; 3] {
        [AXIS_WORKGROUP_SIZE, 1, 1]
    }
}

/// Checks that `source` defines a compute entry point named `name`.
///
/// wgpu offers no synchronous reflection over a compiled module, so the
/// lookup runs against the WGSL text itself. A missing entry point is a
/// startup-time configuration error; the effect cannot run without both
/// kernels.
pub fn resolve_entry_point(source: &str, name: &str) -> Result<(), BlurError> {
    let defines_fn = source.match_indices("fn ").any(|(at, _)| {
        let rest = source[at + 3..].trim_start();
        rest.strip_prefix(name)
            .is_some_and(|after| after.trim_start().starts_with('('))
    });
    if defines_fn {
        Ok(())
    } else {
        Err(BlurError::KernelEntryNotFound(name.to_owned()))
    }
}

/// Normalized Gaussian weights for the clamped half kernel size.
///
/// The returned vector has `2 * half + 1` entries, center weight in the
/// middle, and sums to 1 up to floating-point error.
pub fn gaussian_weights(half_kernel_size: i32) -> Vec<f32> {
    let half = clamp_half_kernel_size(half_kernel_size) as i32;
    let sigma = half as f32 / 2.0;
    let denom = 2.0 * sigma * sigma;

    let mut weights: Vec<f32> = (-half..=half)
        .map(|i| (-((i * i) as f32) / denom).exp())
        .collect();
    let total: f32 = weights.iter().sum();
    for w in &mut weights {
        *w /= total;
    }
    weights
}
