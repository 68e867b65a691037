//! GPU realization of a built shader program.
//!
//! Owns the wgpu pipeline plus a slotted uniform buffer: each draw gets its
//! own aligned window into one buffer, selected with a dynamic offset, so a
//! single program can carry distinct per-instance uniforms within a frame.

use std::num::NonZeroU64;

/// Everything the surrounding renderer decides about a pipeline: output
/// formats, the vertex layout, any bind group layouts beyond the per-draw
/// uniform block, and how many draw slots the program needs per frame.
pub struct RealizeParams<'a> {
    pub color_format: wgpu::TextureFormat,
    pub depth_format: wgpu::TextureFormat,
    pub vertex_layout: wgpu::VertexBufferLayout<'static>,
    pub extra_bind_group_layouts: &'a [&'a wgpu::BindGroupLayout],
    pub slots: u32,
}

pub struct ProgramGpu {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    aligned_span: u32,
}

impl ProgramGpu {
    #[allow(clippy::too_many_arguments)]
    pub(super) fn new(
        device: &wgpu::Device,
        label: &str,
        vertex_source: &str,
        fragment_source: &str,
        vertex_entry: &str,
        fragment_entry: &str,
        uniform_span: u32,
        params: &RealizeParams,
    ) -> Self {
        let vertex_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("{label} vertex")),
            source: wgpu::ShaderSource::Wgsl(vertex_source.into()),
        });
        let fragment_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("{label} fragment")),
            source: wgpu::ShaderSource::Wgsl(fragment_source.into()),
        });

        // Dynamic offsets must land on the device's alignment boundary.
        let alignment = device.limits().min_uniform_buffer_offset_alignment;
        let aligned_span = uniform_span.max(1).div_ceil(alignment) * alignment;

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{label} uniforms")),
            size: (aligned_span * params.slots.max(1)) as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(&format!("{label} frame layout")),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(uniform_span as u64),
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label} frame bind group")),
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &uniform_buffer,
                    offset: 0,
                    size: NonZeroU64::new(uniform_span as u64),
                }),
            }],
        });

        let mut bind_group_layouts: Vec<&wgpu::BindGroupLayout> = vec![&frame_layout];
        bind_group_layouts.extend_from_slice(params.extra_bind_group_layouts);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("{label} layout")),
            bind_group_layouts: &bind_group_layouts,
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vertex_module,
                entry_point: Some(vertex_entry),
                buffers: &[params.vertex_layout.clone()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &fragment_module,
                entry_point: Some(fragment_entry),
                targets: &[Some(wgpu::ColorTargetState {
                    format: params.color_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: params.depth_format,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            pipeline,
            uniform_buffer,
            bind_group,
            aligned_span,
        }
    }

    pub(super) fn upload_slot(&self, queue: &wgpu::Queue, slot: u32, bytes: &[u8]) {
        queue.write_buffer(
            &self.uniform_buffer,
            (slot * self.aligned_span) as u64,
            bytes,
        );
    }

    pub(super) fn bind(&self, pass: &mut wgpu::RenderPass<'_>, slot: u32) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[slot * self.aligned_span]);
    }
}
