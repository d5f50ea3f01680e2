use lifegrid_common::GridError;

/// Failures of the GPU pipeline. All are fatal for the scheduler: the host
/// reports them and stops ticking.
#[derive(Debug, thiserror::Error)]
pub enum LifeError {
    #[error("unsupported environment: {0}")]
    UnsupportedEnvironment(String),
    #[error("no suitable compute device: {0}")]
    DeviceAcquisitionFailure(String),
    #[error("GPU resource allocation rejected: {0}")]
    AllocationError(String),
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error("GPU device lost: {0}")]
    DeviceLost(String),
    #[error("tick dispatch failed: {0}")]
    Dispatch(String),
    #[error("generation readback failed: {0}")]
    Readback(String),
}
