use lifegrid_common::{CellState, GridSize};
use lifegrid_kernel::Generation;
use wgpu::util::DeviceExt;

use crate::context::GpuContext;
use crate::error::LifeError;

const BUFFER_LABELS: [&str; 2] = ["Cell State A", "Cell State B"];

/// The two generation buffers and the grid uniform.
///
/// After construction the host never writes cell state again; every later
/// change happens in the update kernel.
pub struct GridState {
    size: GridSize,
    uniform: wgpu::Buffer,
    buffers: [wgpu::Buffer; 2],
}

impl GridState {
    /// Validate the request and draw the seeded initial generation. Touches no
    /// device resources, so bad dimensions fail before anything is allocated.
    pub fn prepare(
        width: i64,
        height: i64,
        alive_probability: f64,
        seed: u64,
    ) -> Result<Generation, LifeError> {
        let size = GridSize::new(width, height)?;
        Ok(Generation::random(size, alive_probability, seed)?)
    }

    /// Random initial state uploaded into both buffers.
    pub fn initialize(
        gpu: &GpuContext,
        width: i64,
        height: i64,
        alive_probability: f64,
        seed: u64,
    ) -> Result<Self, LifeError> {
        let initial = Self::prepare(width, height, alive_probability, seed)?;
        Self::upload(gpu, &initial)
    }

    /// Create both buffers holding identical copies of `initial`, so the first
    /// read of either one is well defined.
    pub fn upload(gpu: &GpuContext, initial: &Generation) -> Result<Self, LifeError> {
        let size = initial.size();
        let bytes = buffer_bytes(size);
        let limits = gpu.device.limits();
        if bytes > limits.max_storage_buffer_binding_size as u64 || bytes > limits.max_buffer_size
        {
            return Err(LifeError::AllocationError(format!(
                "{}x{} grid needs {bytes} bytes per buffer, device allows {}",
                size.width(),
                size.height(),
                limits
                    .max_buffer_size
                    .min(limits.max_storage_buffer_binding_size as u64)
            )));
        }

        let ((uniform, buffers), error) = gpu.capture(|| {
            let uniform = gpu
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Grid Uniforms"),
                    contents: bytemuck::bytes_of(&size.uniform()),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                });
            let buffers = BUFFER_LABELS.map(|label| {
                gpu.device
                    .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some(label),
                        contents: bytemuck::cast_slice(initial.cells()),
                        usage: wgpu::BufferUsages::STORAGE
                            | wgpu::BufferUsages::COPY_DST
                            | wgpu::BufferUsages::COPY_SRC,
                    })
            });
            (uniform, buffers)
        });

        let state = Self {
            size,
            uniform,
            buffers,
        };
        if let Some(e) = error {
            state.destroy();
            return Err(LifeError::AllocationError(e.to_string()));
        }

        tracing::info!(
            width = size.width(),
            height = size.height(),
            alive = initial.alive_count(),
            "generation buffers allocated"
        );
        Ok(state)
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    pub fn uniform(&self) -> &wgpu::Buffer {
        &self.uniform
    }

    /// Generation buffer A (0) or B (1).
    pub fn buffer(&self, index: usize) -> &wgpu::Buffer {
        &self.buffers[index]
    }

    /// Copy buffer `index` back to the host. Blocks until the copy lands.
    pub fn read_generation(&self, gpu: &GpuContext, index: usize) -> Result<Generation, LifeError> {
        let bytes = buffer_bytes(self.size);
        let staging = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Cell State Readback"),
            size: bytes,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("readback_encoder"),
            });
        encoder.copy_buffer_to_buffer(&self.buffers[index], 0, &staging, 0, bytes);
        gpu.queue.submit(std::iter::once(encoder.finish()));

        let slice = staging.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        let _ = gpu.device.poll(wgpu::Maintain::Wait);

        rx.recv()
            .map_err(|_| LifeError::Readback("map callback never ran".into()))?
            .map_err(|e| LifeError::Readback(e.to_string()))?;

        let cells: Vec<CellState> = {
            let view = slice.get_mapped_range();
            bytemuck::cast_slice(&view).to_vec()
        };
        staging.unmap();
        staging.destroy();

        Ok(Generation::from_cells(self.size, cells)?)
    }

    /// Release the device memory behind both buffers and the uniform.
    pub fn destroy(self) {
        self.uniform.destroy();
        for buffer in &self.buffers {
            buffer.destroy();
        }
        tracing::debug!("generation buffers released");
    }
}

fn buffer_bytes(size: GridSize) -> u64 {
    (size.cell_count() * std::mem::size_of::<CellState>()) as u64
}
