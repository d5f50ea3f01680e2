use lifegrid_common::{GridSize, workgroup_count};
use lifegrid_kernel::{Generation, StepCounter, TickRoles};
use lifegrid_render::{CLEAR_COLOR, QUAD_VERTICES, square_viewport};
use wgpu::util::DeviceExt;

use crate::bindings::ResourceBindings;
use crate::context::GpuContext;
use crate::error::LifeError;
use crate::grid_state::GridState;
use crate::pipelines::LifePipelines;

/// Where a tick draws: the acquired surface texture (or any render target of
/// the format the simulator was built for) and its pixel size.
pub struct FrameTarget<'a> {
    pub view: &'a wgpu::TextureView,
    pub width: u32,
    pub height: u32,
}

/// Frame scheduler: owns the step counter and sequences the update and render
/// kernels over the fixed buffers and binding sets.
///
/// The host calls [`LifeSimulator::tick`] from its timer and presents the
/// target afterwards.
pub struct LifeSimulator {
    grid: GridState,
    bindings: ResourceBindings,
    pipelines: LifePipelines,
    vertex_buffer: wgpu::Buffer,
    counter: StepCounter,
}

impl LifeSimulator {
    /// Build binding sets, pipelines and the vertex template around `grid`.
    pub fn new(
        gpu: &GpuContext,
        grid: GridState,
        target_format: wgpu::TextureFormat,
    ) -> Result<Self, LifeError> {
        let ((bindings, pipelines, vertex_buffer), error) = gpu.capture(|| {
            let bindings = ResourceBindings::new(&gpu.device, &grid);
            let pipelines = LifePipelines::new(&gpu.device, bindings.layout(), target_format);
            let vertex_buffer = gpu
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Cell vertices"),
                    contents: bytemuck::cast_slice(&QUAD_VERTICES),
                    usage: wgpu::BufferUsages::VERTEX,
                });
            (bindings, pipelines, vertex_buffer)
        });
        if let Some(e) = error {
            vertex_buffer.destroy();
            grid.destroy();
            return Err(LifeError::AllocationError(e.to_string()));
        }

        Ok(Self {
            grid,
            bindings,
            pipelines,
            vertex_buffer,
            counter: StepCounter::new(),
        })
    }

    /// Completed ticks.
    pub fn step(&self) -> u64 {
        self.counter.step()
    }

    pub fn size(&self) -> GridSize {
        self.grid.size()
    }

    pub fn grid(&self) -> &GridState {
        &self.grid
    }

    /// Run one frame: update dispatch into the other buffer, then draw every
    /// cell from that buffer into `target`, in a single submission.
    ///
    /// On failure the step counter is left unchanged and the error is returned
    /// for the host to stop on.
    pub fn tick(
        &mut self,
        gpu: &GpuContext,
        target: &FrameTarget<'_>,
    ) -> Result<TickRoles, LifeError> {
        let roles = self.counter.roles();
        let _span = tracing::info_span!("tick", step = self.counter.step()).entered();
        gpu.check_device()?;

        self.submit(gpu, "tick_encoder", |encoder| {
            self.encode_update(encoder, roles);
            self.encode_render(encoder, roles, target);
        })?;

        self.counter.advance();
        tracing::debug!(
            step = self.counter.step(),
            read = roles.update_read,
            write = roles.update_write,
            render = roles.render_read,
            "tick submitted"
        );
        Ok(roles)
    }

    /// Update dispatch only, without drawing. Used to drive the simulation
    /// headless.
    pub fn advance(&mut self, gpu: &GpuContext) -> Result<TickRoles, LifeError> {
        let roles = self.counter.roles();
        gpu.check_device()?;

        self.submit(gpu, "advance_encoder", |encoder| {
            self.encode_update(encoder, roles);
        })?;

        self.counter.advance();
        tracing::trace!(step = self.counter.step(), "headless tick submitted");
        Ok(roles)
    }

    /// Read the latest completed generation back from the device.
    pub fn current_generation(&self, gpu: &GpuContext) -> Result<Generation, LifeError> {
        self.grid.read_generation(gpu, self.counter.parity())
    }

    /// Release both generation buffers, the uniform, the vertex template and
    /// both binding sets.
    pub fn teardown(self) {
        let Self {
            grid,
            bindings,
            pipelines,
            vertex_buffer,
            counter,
        } = self;
        drop(bindings);
        drop(pipelines);
        vertex_buffer.destroy();
        grid.destroy();
        tracing::info!(steps = counter.step(), "simulator torn down");
    }

    fn encode_update(&self, encoder: &mut wgpu::CommandEncoder, roles: TickRoles) {
        let (groups_x, groups_y) = workgroup_count(self.grid.size());
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("update_pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.pipelines.update);
        pass.set_bind_group(0, self.bindings.set(roles.parity), &[]);
        pass.dispatch_workgroups(groups_x, groups_y, 1);
    }

    fn encode_render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        roles: TickRoles,
        target: &FrameTarget<'_>,
    ) {
        let [r, g, b, a] = CLEAR_COLOR;
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("cell_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            ..Default::default()
        });

        let viewport = square_viewport(target.width, target.height);
        if viewport.side <= 0.0 {
            return;
        }
        pass.set_viewport(viewport.x, viewport.y, viewport.side, viewport.side, 0.0, 1.0);
        pass.set_pipeline(&self.pipelines.render);
        pass.set_bind_group(0, self.bindings.set(roles.render_read), &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.draw(
            0..QUAD_VERTICES.len() as u32,
            0..self.grid.size().cell_count() as u32,
        );
    }

    /// Encode and submit one command buffer. Passes are validated when they
    /// end, so encoding runs inside the same error scopes as the submission.
    fn submit(
        &self,
        gpu: &GpuContext,
        label: &str,
        encode: impl FnOnce(&mut wgpu::CommandEncoder),
    ) -> Result<(), LifeError> {
        let (_, error) = gpu.capture(|| {
            let mut encoder = gpu
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some(label) });
            encode(&mut encoder);
            gpu.queue.submit(std::iter::once(encoder.finish()));
        });
        if let Some(e) = error {
            tracing::error!("tick submission rejected: {e}");
            return Err(match e {
                wgpu::Error::OutOfMemory { .. } => LifeError::AllocationError(e.to_string()),
                _ => LifeError::Dispatch(e.to_string()),
            });
        }
        gpu.check_device()
    }
}
