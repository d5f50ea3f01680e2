use lifegrid_render::QuadVertex;

use crate::shaders::{self, FRAGMENT_ENTRY, UPDATE_ENTRY, VERTEX_ENTRY};

/// Compute and render pipelines sharing one pipeline layout, so either
/// binding set can be bound to either pipeline.
pub struct LifePipelines {
    pub update: wgpu::ComputePipeline,
    pub render: wgpu::RenderPipeline,
}

impl LifePipelines {
    pub fn new(
        device: &wgpu::Device,
        bind_group_layout: &wgpu::BindGroupLayout,
        target_format: wgpu::TextureFormat,
    ) -> Self {
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Cell Pipeline Layout"),
            bind_group_layouts: &[bind_group_layout],
            push_constant_ranges: &[],
        });

        let update_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Game of Life simulation shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::update_shader().into()),
        });

        let update = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Simulation pipeline"),
            layout: Some(&pipeline_layout),
            module: &update_module,
            entry_point: Some(UPDATE_ENTRY),
            compilation_options: Default::default(),
            cache: None,
        });

        let cell_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Cell shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::cell_shader().into()),
        });

        let render = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Cell pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &cell_module,
                entry_point: Some(VERTEX_ENTRY),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<QuadVertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x2],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &cell_module,
                entry_point: Some(FRAGMENT_ENTRY),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: target_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        Self { update, render }
    }
}
