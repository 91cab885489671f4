//! Compute backend trait and device abstraction.
//!
//! The [`ComputeBackend`] trait abstracts over execution strategies (serial,
//! multi-threaded CPU) so that the physics code in `coulomb-core` only
//! describes *what* to compute for each output chunk, never *how* the chunks
//! are scheduled.

use thiserror::Error;

/// Errors originating from compute backends.
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Backend not available: {0}")]
    Unavailable(String),

    #[error("Invalid chunk width {width} for a buffer of {len} chunks")]
    InvalidChunkWidth { len: usize, width: usize },

    #[error("Thread pool error: {0}")]
    ThreadPool(String),
}

/// Describes the capabilities of a compute backend.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub name: String,
    pub backend_type: BackendType,
    pub compute_units: Option<usize>,
}

/// The type of compute backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    Serial,
    Cpu,
}

/// Signature of the per-chunk fill closure: `(chunk_index, chunk)`.
pub type ChunkFill<'a> = dyn Fn(usize, &mut [f64]) + Send + Sync + 'a;

/// Abstraction over compute backends.
///
/// The single hot-path operation is [`fill_chunks`](Self::fill_chunks):
/// the caller owns the arithmetic for one chunk, the backend owns the
/// scheduling. Every chunk is written by exactly one call of the closure, so
/// results do not depend on the backend or the number of threads.
pub trait ComputeBackend: Send + Sync {
    /// Return information about the device.
    fn device_info(&self) -> DeviceInfo;

    /// Allocate a zeroed buffer of `len * width` values and fill it chunk by
    /// chunk. Chunk `i` is the slice `[i * width, (i + 1) * width)`.
    fn fill_chunks(
        &self,
        len: usize,
        width: usize,
        fill_fn: &ChunkFill<'_>,
    ) -> Result<Vec<f64>, ComputeError>;
}

/// Allocate the output buffer shared by all backends.
pub(crate) fn zeroed_buffer(len: usize, width: usize) -> Result<Vec<f64>, ComputeError> {
    if width == 0 {
        return Err(ComputeError::InvalidChunkWidth { len, width });
    }
    let total = len
        .checked_mul(width)
        .ok_or(ComputeError::InvalidChunkWidth { len, width })?;
    Ok(vec![0.0; total])
}

/// Single-threaded backend that fills chunks in order on the caller's thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialBackend;

impl SerialBackend {
    pub fn new() -> Self {
        Self
    }
}

impl ComputeBackend for SerialBackend {
    fn device_info(&self) -> DeviceInfo {
        DeviceInfo {
            name: "Serial (1 thread)".into(),
            backend_type: BackendType::Serial,
            compute_units: Some(1),
        }
    }

    fn fill_chunks(
        &self,
        len: usize,
        width: usize,
        fill_fn: &ChunkFill<'_>,
    ) -> Result<Vec<f64>, ComputeError> {
        let mut data = zeroed_buffer(len, width)?;
        for (i, chunk) in data.chunks_mut(width).enumerate() {
            fill_fn(i, chunk);
        }
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_fill_writes_every_chunk_in_place() {
        let backend = SerialBackend::new();
        let data = backend
            .fill_chunks(4, 2, &|i, chunk| {
                chunk[0] = i as f64;
                chunk[1] = -(i as f64);
            })
            .unwrap();
        assert_eq!(data, vec![0.0, -0.0, 1.0, -1.0, 2.0, -2.0, 3.0, -3.0]);
    }

    #[test]
    fn test_zero_width_is_rejected() {
        let err = SerialBackend.fill_chunks(3, 0, &|_, _| {}).unwrap_err();
        assert!(matches!(err, ComputeError::InvalidChunkWidth { len: 3, width: 0 }));
    }

    #[test]
    fn test_empty_buffer_is_allowed() {
        let data = SerialBackend.fill_chunks(0, 3, &|_, _| unreachable!()).unwrap();
        assert!(data.is_empty());
    }
}
