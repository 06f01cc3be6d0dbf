//! The compute program wrapper.
//!
//! [`KernelProgram`] owns everything about the WGSL module that is fixed
//! for the lifetime of the effect: the shader module itself, the bind
//! group layout shared by both kernels, one compute pipeline per axis,
//! and the cached workgroup sizes. Per-frame state (intermediate targets,
//! uniforms) lives in [`crate::renderer::BlurRenderer`].

use crate::{
    BlurError,
    kernel::{KernelAxis, resolve_entry_point},
};

/// Texture format of the intermediate storage targets and the storage
/// destination binding. The destination texture handed to the final copy
/// must share this format.
pub const STORAGE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

const SHADER_SRC: &str = include_str!("pipeline/blur.wgsl");

/// The blur compute module with its two entry points resolved.
pub struct KernelProgram {
    bind_group_layout: wgpu::BindGroupLayout,
    horizontal: wgpu::ComputePipeline,
    vertical: wgpu::ComputePipeline,
    // Queried once at creation, reused every frame.
    group_size_h: [u32; 3],
    group_size_v: [u32; 3],
}

impl KernelProgram {
    /// Builds both kernel pipelines.
    ///
    /// Fails if either entry point cannot be resolved in the compute
    /// module; the effect cannot run in that case, so the caller should
    /// treat the error as fatal rather than retrying per frame.
    pub fn new(device: &wgpu::Device) -> Result<Self, BlurError> {
        for axis in [KernelAxis::Horizontal, KernelAxis::Vertical] {
            resolve_entry_point(SHADER_SRC, axis.entry_point())?;
        }

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Blur Shader"),
            source: wgpu::ShaderSource::Wgsl(SHADER_SRC.into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                // 0: Uniforms
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // 1: Source Texture (Sampled)
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                // 2: Destination Texture (Storage)
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::StorageTexture {
                        access: wgpu::StorageTextureAccess::WriteOnly,
                        format: STORAGE_FORMAT,
                        view_dimension: wgpu::TextureViewDimension::D2,
                    },
                    count: None,
                },
            ],
            label: Some("blur_bind_group_layout"),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Blur Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let build = |axis: KernelAxis| {
            device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some(axis.entry_point()),
                layout: Some(&pipeline_layout),
                module: &shader,
                entry_point: Some(axis.entry_point()),
                compilation_options: Default::default(),
                cache: None,
            })
        };

        Ok(Self {
            horizontal: build(KernelAxis::Horizontal),
            vertical: build(KernelAxis::Vertical),
            group_size_h: KernelAxis::Horizontal.workgroup_size(),
            group_size_v: KernelAxis::Vertical.workgroup_size(),
            bind_group_layout,
        })
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    pub fn pipeline(&self, axis: KernelAxis) -> &wgpu::ComputePipeline {
        match axis {
            KernelAxis::Horizontal => &self.horizontal,
            KernelAxis::Vertical => &self.vertical,
        }
    }

    /// Workgroup size cached at creation for the given entry point.
    pub fn group_size(&self, axis: KernelAxis) -> [u32; 3] {
        match axis {
            KernelAxis::Horizontal => self.group_size_h,
            KernelAxis::Vertical => self.group_size_v,
        }
    }
}
