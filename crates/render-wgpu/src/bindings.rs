use crate::grid_state::GridState;

const SET_LABELS: [&str; 2] = ["Cell bind group A", "Cell bind group B"];

/// The two fixed binding sets, one per parity.
///
/// Set `p` binds the grid uniform at 0, buffer `p` as read-only input at 1 and
/// buffer `1 - p` as read-write output at 2. Both are built once; switching
/// parity only changes which set is bound.
pub struct ResourceBindings {
    layout: wgpu::BindGroupLayout,
    sets: [wgpu::BindGroup; 2],
}

impl ResourceBindings {
    pub fn new(device: &wgpu::Device, grid: &GridState) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Cell Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX
                        | wgpu::ShaderStages::COMPUTE
                        | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let sets = [0usize, 1].map(|parity| {
            let (input, output) = Self::buffer_roles(parity);
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(SET_LABELS[parity]),
                layout: &layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: grid.uniform().as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: grid.buffer(input).as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: grid.buffer(output).as_entire_binding(),
                    },
                ],
            })
        });

        Self { layout, sets }
    }

    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    /// Binding set for `parity` (taken mod 2).
    pub fn set(&self, parity: usize) -> &wgpu::BindGroup {
        &self.sets[parity % 2]
    }

    /// `(input, output)` buffer indices bound by the set for `parity`.
    pub fn buffer_roles(parity: usize) -> (usize, usize) {
        let p = parity % 2;
        (p, 1 - p)
    }
}
