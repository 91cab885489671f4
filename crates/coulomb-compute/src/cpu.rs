//! CPU compute backend using Rayon for shared-memory parallelism.

use rayon::prelude::*;

use crate::backend::{zeroed_buffer, BackendType, ChunkFill, ComputeBackend, ComputeError, DeviceInfo};

/// CPU backend that parallelises chunk fills across threads via Rayon.
///
/// Without an explicit thread count the global Rayon pool is used. With one,
/// a dedicated pool is built once and reused for every fill.
pub struct CpuBackend {
    num_threads: usize,
    pool: Option<rayon::ThreadPool>,
}

impl CpuBackend {
    /// Create a new CPU backend using all available threads.
    pub fn new() -> Self {
        Self {
            num_threads: rayon::current_num_threads(),
            pool: None,
        }
    }

    /// Create a CPU backend with a specified thread count.
    pub fn with_threads(num_threads: usize) -> Result<Self, ComputeError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build()
            .map_err(|e| ComputeError::ThreadPool(e.to_string()))?;
        log::debug!("Built Rayon pool with {} threads", pool.current_num_threads());
        Ok(Self {
            num_threads: pool.current_num_threads(),
            pool: Some(pool),
        })
    }
}

impl Default for CpuBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ComputeBackend for CpuBackend {
    fn device_info(&self) -> DeviceInfo {
        DeviceInfo {
            name: format!("CPU ({} threads)", self.num_threads),
            backend_type: BackendType::Cpu,
            compute_units: Some(self.num_threads),
        }
    }

    fn fill_chunks(
        &self,
        len: usize,
        width: usize,
        fill_fn: &ChunkFill<'_>,
    ) -> Result<Vec<f64>, ComputeError> {
        let mut data = zeroed_buffer(len, width)?;
        let fill = |data: &mut [f64]| {
            data.par_chunks_mut(width)
                .enumerate()
                .for_each(|(i, chunk)| fill_fn(i, chunk));
        };
        match &self.pool {
            Some(pool) => pool.install(|| fill(data.as_mut_slice())),
            None => fill(data.as_mut_slice()),
        }
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::SerialBackend;

    fn kernel(i: usize, chunk: &mut [f64]) {
        let x = i as f64 * 0.37;
        for (k, v) in chunk.iter_mut().enumerate() {
            *v = (x + k as f64).sin() / (1.0 + x);
        }
    }

    #[test]
    fn test_cpu_matches_serial_bitwise() {
        let serial = SerialBackend.fill_chunks(1000, 3, &kernel).unwrap();
        let cpu = CpuBackend::new().fill_chunks(1000, 3, &kernel).unwrap();
        assert_eq!(serial, cpu);
    }

    #[test]
    fn test_fixed_thread_pool() {
        let backend = CpuBackend::with_threads(2).unwrap();
        assert_eq!(backend.device_info().compute_units, Some(2));
        let data = backend.fill_chunks(10, 1, &|i, c| c[0] = i as f64).unwrap();
        assert_eq!(data, (0..10).map(|i| i as f64).collect::<Vec<_>>());
    }
}
