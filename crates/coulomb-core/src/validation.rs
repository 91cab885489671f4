//! Request validation.
//!
//! The evaluator assumes well-formed input and never checks it. Everything
//! that would make a request meaningless is rejected here, before a lattice
//! is built:
//!
//! - no charges at all, or a charge of exactly zero (in 2D and 3D alike);
//! - non-finite charge positions or magnitudes;
//! - an axis with `max <= min`, non-finite bounds, or a sample count outside
//!   `[MIN_AXIS_POINTS, max_axis_points(D)]`;
//! - a negative or non-finite softening length.

use thiserror::Error;

use crate::types::{
    max_axis_points, GridSpec, PointCharge, SimulationRequest, AXIS_NAMES, MIN_AXIS_POINTS,
};

/// Reasons a request is rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("At least one charge is required")]
    NoCharges,

    #[error("Charge {index} has zero magnitude")]
    ZeroCharge { index: usize },

    #[error("Charge {index} has a non-finite position or magnitude")]
    NonFiniteCharge { index: usize },

    #[error("{axis}max ({max}) must be > {axis}min ({min})")]
    InvertedAxis { axis: &'static str, min: f64, max: f64 },

    #[error("{axis}-axis bounds must be finite")]
    NonFiniteAxis { axis: &'static str },

    #[error("n{axis} = {count} is outside the allowed range [{min}, {max}]")]
    AxisCount {
        axis: &'static str,
        count: usize,
        min: usize,
        max: usize,
    },

    #[error("Softening must be finite and >= 0, got {0}")]
    Softening(f64),
}

/// Check every axis of a grid.
pub fn validate_grid<const D: usize>(grid: &GridSpec<D>) -> Result<(), ValidationError> {
    let max_points = max_axis_points(D);

    for (a, spec) in grid.axes.iter().enumerate() {
        let axis = AXIS_NAMES[a];
        if !spec.min.is_finite() || !spec.max.is_finite() {
            return Err(ValidationError::NonFiniteAxis { axis });
        }
        if spec.max <= spec.min {
            return Err(ValidationError::InvertedAxis {
                axis,
                min: spec.min,
                max: spec.max,
            });
        }
        if spec.count < MIN_AXIS_POINTS || spec.count > max_points {
            return Err(ValidationError::AxisCount {
                axis,
                count: spec.count,
                min: MIN_AXIS_POINTS,
                max: max_points,
            });
        }
    }
    Ok(())
}

/// Check the charge list.
pub fn validate_charges<const D: usize>(charges: &[PointCharge<D>]) -> Result<(), ValidationError> {
    if charges.is_empty() {
        return Err(ValidationError::NoCharges);
    }
    for (index, c) in charges.iter().enumerate() {
        if !c.charge.is_finite() || c.position.iter().any(|x| !x.is_finite()) {
            return Err(ValidationError::NonFiniteCharge { index });
        }
        if c.charge == 0.0 {
            return Err(ValidationError::ZeroCharge { index });
        }
    }
    Ok(())
}

/// Check a whole request.
pub fn validate_request<const D: usize>(
    request: &SimulationRequest<D>,
) -> Result<(), ValidationError> {
    validate_charges(&request.charges)?;
    validate_grid(&request.grid)?;
    if !request.softening.is_finite() || request.softening < 0.0 {
        return Err(ValidationError::Softening(request.softening));
    }
    Ok(())
}
