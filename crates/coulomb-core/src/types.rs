//! Core types shared across the Coulomb engine.
//!
//! This module defines the physical constants and the validated, in-memory
//! data model of one evaluation: point charges, per-axis grid
//! specifications, the request, and the dense field result. Wire-format
//! (serde) counterparts live in [`crate::schema`].

use ndarray::ArrayD;
use serde::{Deserialize, Serialize};

/// Vacuum permittivity $\epsilon_0$ (F/m), CODATA 2018.
pub const VACUUM_PERMITTIVITY: f64 = 8.854_187_812_8e-12;

/// Coulomb constant $K = 1 / (4 \pi \epsilon_0)$ (N·m²/C²), ≈ 8.9875e9.
pub const COULOMB_CONSTANT: f64 = 1.0 / (4.0 * std::f64::consts::PI * VACUUM_PERMITTIVITY);

/// Smallest number of samples allowed along one axis.
pub const MIN_AXIS_POINTS: usize = 2;

/// Largest number of samples allowed along one axis of a 2D grid.
pub const MAX_AXIS_POINTS_2D: usize = 200;

/// Largest number of samples allowed along one axis of a 3D grid.
pub const MAX_AXIS_POINTS_3D: usize = 100;

/// Axis labels in lattice order (axis 0 varies fastest).
pub const AXIS_NAMES: [&str; 3] = ["x", "y", "z"];

/// Largest per-axis sample count for a grid with `dimensions` axes.
pub const fn max_axis_points(dimensions: usize) -> usize {
    if dimensions >= 3 {
        MAX_AXIS_POINTS_3D
    } else {
        MAX_AXIS_POINTS_2D
    }
}

/// An idealised charge with no spatial extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointCharge<const D: usize> {
    /// Position (m).
    pub position: [f64; D],
    /// Charge magnitude (C). Never zero once validated.
    pub charge: f64,
}

impl<const D: usize> PointCharge<D> {
    pub fn new(position: [f64; D], charge: f64) -> Self {
        Self { position, charge }
    }
}

/// Sampling of one axis: `count` points from `min` to `max` inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisSpec {
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

impl AxisSpec {
    pub fn new(min: f64, max: f64, count: usize) -> Self {
        Self { min, max, count }
    }

    /// Uniform spacing between neighbouring samples.
    pub fn spacing(&self) -> f64 {
        (self.max - self.min) / self.count.saturating_sub(1).max(1) as f64
    }
}

/// One [`AxisSpec`] per dimension, axis 0 = x.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec<const D: usize> {
    pub axes: [AxisSpec; D],
}

impl<const D: usize> GridSpec<D> {
    pub fn new(axes: [AxisSpec; D]) -> Self {
        Self { axes }
    }

    /// Per-axis sample counts in lattice order (x first).
    pub fn counts(&self) -> [usize; D] {
        std::array::from_fn(|a| self.axes[a].count)
    }

    /// Shape of the nested output arrays: slowest axis first, x last.
    pub fn nested_shape(&self) -> [usize; D] {
        std::array::from_fn(|a| self.axes[D - 1 - a].count)
    }

    /// Total number of lattice points.
    pub fn num_points(&self) -> usize {
        self.axes.iter().map(|a| a.count).product()
    }
}

/// A validated request for one field evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationRequest<const D: usize> {
    /// Source charges, summed in this order at every lattice point.
    pub charges: Vec<PointCharge<D>>,
    pub grid: GridSpec<D>,
    /// Softening length ε (m), added as ε² to every squared distance.
    pub softening: f64,
    pub include_potential: bool,
}

/// Field and potential at a single observation point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSample<const D: usize> {
    /// Electric field components (N/C).
    pub field: [f64; D],
    /// Electrostatic potential (V).
    pub potential: f64,
}

impl<const D: usize> FieldSample<D> {
    /// Euclidean norm of the field vector.
    pub fn magnitude(&self) -> f64 {
        self.field.iter().map(|e| e * e).sum::<f64>().sqrt()
    }
}

/// Dense field sampled on a lattice.
///
/// Every array has the nested output shape of the grid (slowest axis first,
/// x last) and is stored contiguously in row-major order, so the flat index
/// of sample `(i0, i1, i2)` is `i0 + n0 * (i1 + n1 * i2)`.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldGrid<const D: usize> {
    /// One array per field component, in axis order (Ex, Ey[, Ez]).
    pub components: [ArrayD<f64>; D],
    /// Potential, present only when it was requested.
    pub potential: Option<ArrayD<f64>>,
}

impl<const D: usize> FieldGrid<D> {
    /// Shape shared by all arrays.
    pub fn shape(&self) -> &[usize] {
        self.components[0].shape()
    }
}

/// The evaluated field together with the grid it was sampled on.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResponse<const D: usize> {
    pub grid: GridSpec<D>,
    pub field: FieldGrid<D>,
}
