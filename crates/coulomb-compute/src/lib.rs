//! # Coulomb Compute
//!
//! Compute backend abstraction for the Coulomb field engine. This crate
//! provides a [`ComputeBackend`](backend::ComputeBackend) trait that isolates
//! the physics code from how work is scheduled.
//!
//! ## Available backends
//!
//! | Backend | Feature flag | Status |
//! |---------|-------------|--------|
//! | Serial | always | Implemented |
//! | CPU (Rayon) | `cpu` (default) | Implemented |

pub mod backend;

#[cfg(feature = "cpu")]
pub mod cpu;

pub use backend::{BackendType, ChunkFill, ComputeBackend, ComputeError, DeviceInfo, SerialBackend};

#[cfg(feature = "cpu")]
pub use cpu::CpuBackend;

/// The backend used when the caller expresses no preference.
#[cfg(feature = "cpu")]
pub fn default_backend() -> std::sync::Arc<dyn ComputeBackend> {
    std::sync::Arc::new(CpuBackend::new())
}

/// The backend used when the caller expresses no preference.
#[cfg(not(feature = "cpu"))]
pub fn default_backend() -> std::sync::Arc<dyn ComputeBackend> {
    std::sync::Arc::new(SerialBackend::new())
}
