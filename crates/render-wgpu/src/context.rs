use std::sync::{Arc, Mutex};

use crate::error::LifeError;

/// Process-wide device state: instance, adapter, device and queue.
///
/// Created once at startup and passed by reference into everything that
/// touches the GPU. Dropping it releases the device.
pub struct GpuContext {
    pub instance: wgpu::Instance,
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    lost: Arc<Mutex<Option<String>>>,
    uncaptured: Arc<Mutex<Option<String>>>,
}

impl GpuContext {
    /// Instance over every backend wgpu was built with.
    pub fn create_instance() -> wgpu::Instance {
        wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        })
    }

    /// Acquire an adapter and device, optionally compatible with a surface
    /// created from the same instance.
    pub async fn request(
        instance: wgpu::Instance,
        compatible_surface: Option<&wgpu::Surface<'_>>,
    ) -> Result<Self, LifeError> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface,
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| {
                LifeError::DeviceAcquisitionFailure("no adapter matches the request".into())
            })?;

        let info = adapter.get_info();
        let missing = missing_capabilities(adapter.get_downlevel_capabilities().flags);
        if !missing.is_empty() {
            return Err(LifeError::UnsupportedEnvironment(format!(
                "adapter '{}' lacks {}",
                info.name,
                missing.join(", ")
            )));
        }

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("lifegrid_device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_defaults()
                        .using_resolution(adapter.limits()),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await
            .map_err(|e| LifeError::DeviceAcquisitionFailure(e.to_string()))?;

        let lost = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&lost);
        device.set_device_lost_callback(move |reason, message| {
            tracing::error!(?reason, "GPU device lost: {message}");
            if let Ok(mut slot) = slot.lock() {
                *slot = Some(format!("{reason:?}: {message}"));
            }
        });

        // Errors raised outside any scope are recorded instead of panicking and
        // surface from the next device check.
        let uncaptured = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&uncaptured);
        device.on_uncaptured_error(Box::new(move |error| {
            tracing::error!("uncaptured GPU error: {error}");
            if let Ok(mut slot) = slot.lock() {
                slot.get_or_insert_with(|| error.to_string());
            }
        }));

        tracing::info!(
            adapter = %info.name,
            "GPU initialized with {} backend",
            info.backend.to_str()
        );

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
            lost,
            uncaptured,
        })
    }

    /// Device without a presentation surface, for tooling and tests.
    pub fn headless() -> Result<Self, LifeError> {
        pollster::block_on(Self::request(Self::create_instance(), None))
    }

    /// One-line adapter description for logs and `info` output.
    pub fn adapter_summary(&self) -> String {
        let info = self.adapter.get_info();
        format!(
            "{} ({:?}, {} backend)",
            info.name,
            info.device_type,
            info.backend.to_str()
        )
    }

    /// Fails once the device-lost callback has fired, and reports (once) any
    /// error the device raised outside an error scope.
    pub fn check_device(&self) -> Result<(), LifeError> {
        let lost = self.lost.lock().ok().and_then(|slot| slot.clone());
        if let Some(message) = lost {
            return Err(LifeError::DeviceLost(message));
        }
        let uncaptured = self.uncaptured.lock().ok().and_then(|mut slot| slot.take());
        match uncaptured {
            Some(message) => Err(LifeError::Dispatch(message)),
            None => Ok(()),
        }
    }

    /// Run `f` inside out-of-memory and validation error scopes and return the
    /// first error raised by the device while it ran.
    pub(crate) fn capture<T>(&self, f: impl FnOnce() -> T) -> (T, Option<wgpu::Error>) {
        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let value = f();
        let validation = pollster::block_on(self.device.pop_error_scope());
        let out_of_memory = pollster::block_on(self.device.pop_error_scope());
        (value, out_of_memory.or(validation))
    }
}

/// Capabilities the pipeline needs that the adapter does not report.
pub fn missing_capabilities(flags: wgpu::DownlevelFlags) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if !flags.contains(wgpu::DownlevelFlags::COMPUTE_SHADERS) {
        missing.push("compute shaders");
    }
    // The render kernel reads cell state from a storage buffer in the vertex stage.
    if !flags.contains(wgpu::DownlevelFlags::VERTEX_STORAGE) {
        missing.push("vertex-stage storage buffers");
    }
    missing
}
