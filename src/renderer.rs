//! Per-frame blur orchestration.
//!
//! [`BlurRenderer`] owns the per-effect GPU state (kernel program,
//! uniform buffer, the two intermediate targets) and records one frame of
//! work onto the host's command encoder: four strictly ordered 1-D blur
//! dispatches followed by a copy into the destination texture. The frame
//! is first laid out as a [`FramePlan`] — plain data — and then executed
//! verbatim, so the dispatch wiring is testable without a device.

use tracing::{debug, trace};

use crate::{
    FrameDimensions,
    kernel::KernelAxis,
    pipeline::{KernelProgram, STORAGE_FORMAT},
    settings::BlurSettings,
    target::{PingPong, TargetPool},
};

/// What a compute pass reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// The host's source image for this frame.
    Source,
    /// The first intermediate target.
    Ping,
    /// The second intermediate target.
    Pong,
}

impl From<PingPong> for Slot {
    fn from(t: PingPong) -> Self {
        match t {
            PingPong::Ping => Slot::Ping,
            PingPong::Pong => Slot::Pong,
        }
    }
}

/// One compute dispatch of the frame, reconstructed every frame and never
/// persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchDescriptor {
    pub axis: KernelAxis,
    pub source: Slot,
    /// Passes only ever write the intermediate targets; the destination
    /// image is reached by the final copy, never by a kernel.
    pub dest: PingPong,
    pub group_count: [u32; 3],
}

/// The full frame: four dispatches in submission order, then one copy of
/// `copy_source` into the destination image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramePlan {
    pub passes: [DispatchDescriptor; 4],
    pub copy_source: PingPong,
}

/// Lays out one frame of blur work.
///
/// Group counts are cross-wired on purpose: the kernels are axis-major
/// (one invocation per row or per column), so the horizontal pass covers
/// the frame *height* and the vertical pass the frame *width*.
pub fn plan_frame(
    dims: FrameDimensions,
    group_size_h: [u32; 3],
    group_size_v: [u32; 3],
) -> FramePlan {
    let h_groups = [dims.height.div_ceil(group_size_h[0]), 1, 1];
    let v_groups = [dims.width.div_ceil(group_size_v[0]), 1, 1];

    let pass = |axis: KernelAxis, source: Slot, dest: PingPong| DispatchDescriptor {
        axis,
        source,
        dest,
        group_count: match axis {
            KernelAxis::Horizontal => h_groups,
            KernelAxis::Vertical => v_groups,
        },
    };

    FramePlan {
        passes: [
            pass(KernelAxis::Horizontal, Slot::Source, PingPong::Ping),
            pass(KernelAxis::Vertical, Slot::Ping, PingPong::Pong),
            pass(KernelAxis::Horizontal, Slot::Pong, PingPong::Ping),
            pass(KernelAxis::Vertical, Slot::Ping, PingPong::Pong),
        ],
        copy_source: PingPong::Pong,
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
struct BlurUniforms {
    width: u32,
    height: u32,
    kernel_size: u32,
    half_kernel_size: u32,
}

impl BlurUniforms {
    fn for_frame(dims: FrameDimensions, settings: &BlurSettings) -> Self {
        let half = settings.effective_half_kernel_size();
        Self {
            width: dims.width,
            height: dims.height,
            kernel_size: crate::kernel::kernel_size(half),
            half_kernel_size: half,
        }
    }
}

struct PassTarget {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

fn create_pass_target(device: &wgpu::Device, dims: FrameDimensions, label: &str) -> PassTarget {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: dims.extent(),
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: STORAGE_FORMAT,
        usage: wgpu::TextureUsages::TEXTURE_BINDING
            | wgpu::TextureUsages::STORAGE_BINDING
            | wgpu::TextureUsages::COPY_DST
            | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    PassTarget { texture, view }
}

/// The blur pipeline controller.
///
/// One instance per effect. The host calls [`render`](Self::render) once
/// per frame, only after [`BlurSettings::is_enabled_and_supported`]
/// passed, and [`release`](Self::release) on teardown.
pub struct BlurRenderer {
    program: KernelProgram,
    uniform_buffer: wgpu::Buffer,
    targets: TargetPool<PassTarget>,
}

impl BlurRenderer {
    /// Builds the kernel program and the shared uniform buffer.
    ///
    /// The only failure mode is the fatal configuration error of a blur
    /// entry point missing from the compute module.
    pub fn new(device: &wgpu::Device) -> Result<Self, crate::BlurError> {
        let program = KernelProgram::new(device)?;
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Blur Uniform Buffer"),
            size: size_of::<BlurUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Ok(Self {
            program,
            uniform_buffer,
            targets: TargetPool::new(),
        })
    }

    /// Records one frame of blur work on `encoder`.
    ///
    /// Reads `source`, writes the blurred result into `destination`; both
    /// must have the current frame dimensions. `source` needs
    /// `TEXTURE_BINDING` usage (it is sampled by the first pass) and
    /// `destination` needs `COPY_DST` usage plus [`STORAGE_FORMAT`] so
    /// the final copy is format-compatible. The
    /// four dispatches and the copy are recorded back to back on the one
    /// encoder, so program order alone sequences the passes.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        source: &wgpu::Texture,
        destination: &wgpu::Texture,
        settings: &BlurSettings,
    ) {
        let dims = FrameDimensions::of_texture(source);

        // Shared parameter vector, written once for all four passes.
        let uniforms = BlurUniforms::for_frame(dims, settings);
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        // Realize the intermediate targets for this resolution. Most
        // frames this is a no-op; on a genuine change both targets are
        // dropped and recreated.
        let mut label = ["Blur Target A", "Blur Target B"].into_iter();
        self.targets.ensure(
            dims,
            |d| {
                let label = label.next().unwrap_or("Blur Target");
                debug!(label, width = d.width, height = d.height, "allocating blur target");
                create_pass_target(device, d, label)
            },
            |stale| stale.texture.destroy(),
        );

        let plan = plan_frame(
            dims,
            self.program.group_size(KernelAxis::Horizontal),
            self.program.group_size(KernelAxis::Vertical),
        );
        trace!(?dims, half = uniforms.half_kernel_size, "blur frame planned");

        let source_view = source.create_view(&wgpu::TextureViewDescriptor::default());

        encoder.push_debug_group("gaussian blur");
        for pass in &plan.passes {
            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                layout: self.program.bind_group_layout(),
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: self.uniform_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(
                            self.pass_view(pass.source, &source_view),
                        ),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::TextureView(
                            self.pass_view(pass.dest.into(), &source_view),
                        ),
                    },
                ],
                label: Some("blur_bind_group"),
            });

            let mut cpass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some(pass.axis.entry_point()),
                timestamp_writes: None,
            });
            cpass.set_pipeline(self.program.pipeline(pass.axis));
            cpass.set_bind_group(0, &bind_group, &[]);
            let [x, y, z] = pass.group_count;
            cpass.dispatch_workgroups(x, y, z);
        }
        encoder.pop_debug_group();

        // Final blit of the last pass target into the host's destination.
        encoder.copy_texture_to_texture(
            self.target(plan.copy_source).texture.as_image_copy(),
            destination.as_image_copy(),
            dims.extent(),
        );
    }

    /// Drops both intermediate targets. Idempotent and safe to call when
    /// nothing was ever allocated.
    pub fn release(&mut self) {
        self.targets.release(|target| {
            debug!("releasing blur target");
            target.texture.destroy();
        });
    }

    fn target(&self, which: PingPong) -> &PassTarget {
        // `render` realizes both targets before any pass references them.
        self.targets
            .get(which)
            .expect("blur target realized earlier this frame")
    }

    fn pass_view<'a>(&'a self, slot: Slot, source_view: &'a wgpu::TextureView) -> &'a wgpu::TextureView {
        match slot {
            Slot::Source => source_view,
            Slot::Ping => &self.target(PingPong::Ping).view,
            Slot::Pong => &self.target(PingPong::Pong).view,
        }
    }
}

impl Drop for BlurRenderer {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GROUP: [u32; 3] = [64, 1, 1];

    fn dims(w: u32, h: u32) -> FrameDimensions {
        FrameDimensions::new(w, h)
    }

    #[test]
    fn test_plan_is_four_passes_then_copy_in_order() {
        let plan = plan_frame(dims(256, 128), GROUP, GROUP);

        let axes: Vec<_> = plan.passes.iter().map(|p| p.axis).collect();
        assert_eq!(
            axes,
            [
                KernelAxis::Horizontal,
                KernelAxis::Vertical,
                KernelAxis::Horizontal,
                KernelAxis::Vertical,
            ]
        );

        let wiring: Vec<_> = plan.passes.iter().map(|p| (p.source, p.dest)).collect();
        assert_eq!(
            wiring,
            [
                (Slot::Source, PingPong::Ping),
                (Slot::Ping, PingPong::Pong),
                (Slot::Pong, PingPong::Ping),
                (Slot::Ping, PingPong::Pong),
            ]
        );

        assert_eq!(plan.copy_source, PingPong::Pong);
    }

    #[test]
    fn test_group_counts_are_cross_wired() {
        // 130 wide, 70 high: horizontal passes cover the height,
        // vertical passes the width.
        let plan = plan_frame(dims(130, 70), GROUP, GROUP);
        for pass in &plan.passes {
            match pass.axis {
                KernelAxis::Horizontal => assert_eq!(pass.group_count, [2, 1, 1]),
                KernelAxis::Vertical => assert_eq!(pass.group_count, [3, 1, 1]),
            }
        }
    }

    #[test]
    fn test_group_counts_round_up() {
        let plan = plan_frame(dims(64, 65), GROUP, GROUP);
        assert_eq!(plan.passes[0].group_count, [2, 1, 1]); // ceil(65 / 64)
        assert_eq!(plan.passes[1].group_count, [1, 1, 1]); // ceil(64 / 64)
    }

    #[test]
    fn test_plan_shape_is_parameter_independent() {
        // Kernel parameters never change the pass structure, only the
        // uniforms; any two resolutions produce the same wiring.
        let a = plan_frame(dims(64, 64), GROUP, GROUP);
        let b = plan_frame(dims(1920, 1080), GROUP, GROUP);
        for (pa, pb) in a.passes.iter().zip(b.passes.iter()) {
            assert_eq!(pa.axis, pb.axis);
            assert_eq!(pa.source, pb.source);
            assert_eq!(pa.dest, pb.dest);
        }
        assert_eq!(a.copy_source, b.copy_source);
    }

    #[test]
    fn test_uniforms_derive_clamped_kernel() {
        let settings = BlurSettings {
            half_kernel_size: -4,
            ..Default::default()
        };
        let uniforms = BlurUniforms::for_frame(dims(640, 480), &settings);
        assert_eq!(uniforms.width, 640);
        assert_eq!(uniforms.height, 480);
        assert_eq!(uniforms.half_kernel_size, 1);
        assert_eq!(uniforms.kernel_size, 3);

        let settings = BlurSettings {
            half_kernel_size: 5,
            ..Default::default()
        };
        let uniforms = BlurUniforms::for_frame(dims(640, 480), &settings);
        assert_eq!(uniforms.half_kernel_size, 5);
        assert_eq!(uniforms.kernel_size, 11);
    }
}
