//! Request-level entry points.
//!
//! [`CoulombSolver`] runs the full pipeline for one validated request:
//! lattice sampling ([`crate::lattice`]), superposition
//! ([`crate::fields`]) and response assembly ([`crate::response`]). It holds
//! no state besides the compute backend, so one solver can serve any number
//! of independent requests.

use std::sync::Arc;

use thiserror::Error;

use coulomb_compute::{ComputeBackend, ComputeError};

use crate::fields::evaluate;
use crate::lattice::Lattice;
use crate::response::{assemble_2d, assemble_3d};
use crate::schema::{Simulation2DResponse, Simulation3DResponse};
use crate::types::{SimulationRequest, SimulationResponse};

/// Errors that can occur while evaluating a request.
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("Compute backend error: {0}")]
    Compute(#[from] ComputeError),

    #[error("Array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Direct-summation field solver.
pub struct CoulombSolver {
    pub backend: Arc<dyn ComputeBackend>,
}

impl Default for CoulombSolver {
    fn default() -> Self {
        Self {
            backend: coulomb_compute::default_backend(),
        }
    }
}

impl CoulombSolver {
    pub fn new(backend: Arc<dyn ComputeBackend>) -> Self {
        Self { backend }
    }

    /// Evaluate a request into the dense (flat-buffer) response.
    pub fn evaluate_request<const D: usize>(
        &self,
        request: &SimulationRequest<D>,
    ) -> Result<SimulationResponse<D>, SolverError> {
        let lattice = Lattice::from_grid(&request.grid);
        log::info!(
            "Solving {}D field: {} charges, grid {:?}, softening {:e}",
            D,
            request.charges.len(),
            request.grid.counts(),
            request.softening
        );

        let field = evaluate(
            &lattice,
            &request.charges,
            request.softening,
            request.include_potential,
            self.backend.as_ref(),
        )?;

        Ok(SimulationResponse {
            grid: request.grid,
            field,
        })
    }

    /// Evaluate a 2D request into nested `[ny][nx]` arrays.
    pub fn solve_2d(
        &self,
        request: &SimulationRequest<2>,
    ) -> Result<Simulation2DResponse, SolverError> {
        let response = self.evaluate_request(request)?;
        assemble_2d(&response.grid, response.field)
    }

    /// Evaluate a 3D request into nested `[nz][ny][nx]` arrays.
    pub fn solve_3d(
        &self,
        request: &SimulationRequest<3>,
    ) -> Result<Simulation3DResponse, SolverError> {
        let response = self.evaluate_request(request)?;
        assemble_3d(&response.grid, response.field)
    }
}
