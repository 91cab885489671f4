//! JSON wire format for requests and responses.
//!
//! These are the flat, serde-facing shapes exchanged with callers
//! (`{ charges: [{x, y, q}], grid: {xmin, .., nx, ..}, .. }`). They carry
//! defaults for omitted fields but no invariants; converting a request into
//! a [`SimulationRequest`] runs [`crate::validation`].

use serde::{Deserialize, Serialize};

use crate::types::{AxisSpec, GridSpec, PointCharge, SimulationRequest};
use crate::validation::{validate_request, ValidationError};

/// Default softening length (m).
pub const DEFAULT_SOFTENING: f64 = 1e-6;

/// Default per-axis resolution of a 2D grid.
pub const DEFAULT_POINTS_2D: usize = 41;

/// Default per-axis resolution of a 3D grid.
pub const DEFAULT_POINTS_3D: usize = 21;

fn default_softening() -> f64 {
    DEFAULT_SOFTENING
}

fn default_true() -> bool {
    true
}

/// A point charge in the plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Charge2D {
    /// x position (m).
    pub x: f64,
    /// y position (m).
    pub y: f64,
    /// Charge (C).
    pub q: f64,
}

/// A point charge in space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Charge3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub q: f64,
}

/// Rectangular 2D sampling domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Grid2D {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
    pub nx: usize,
    pub ny: usize,
}

impl Default for Grid2D {
    fn default() -> Self {
        Self {
            xmin: -1.0,
            xmax: 1.0,
            ymin: -1.0,
            ymax: 1.0,
            nx: DEFAULT_POINTS_2D,
            ny: DEFAULT_POINTS_2D,
        }
    }
}

/// Box-shaped 3D sampling domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Grid3D {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
    pub zmin: f64,
    pub zmax: f64,
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
}

impl Default for Grid3D {
    fn default() -> Self {
        Self {
            xmin: -1.0,
            xmax: 1.0,
            ymin: -1.0,
            ymax: 1.0,
            zmin: -1.0,
            zmax: 1.0,
            nx: DEFAULT_POINTS_3D,
            ny: DEFAULT_POINTS_3D,
            nz: DEFAULT_POINTS_3D,
        }
    }
}

impl From<&Grid2D> for GridSpec<2> {
    fn from(g: &Grid2D) -> Self {
        GridSpec::new([
            AxisSpec::new(g.xmin, g.xmax, g.nx),
            AxisSpec::new(g.ymin, g.ymax, g.ny),
        ])
    }
}

impl From<&GridSpec<2>> for Grid2D {
    fn from(g: &GridSpec<2>) -> Self {
        let [x, y] = g.axes;
        Self {
            xmin: x.min,
            xmax: x.max,
            ymin: y.min,
            ymax: y.max,
            nx: x.count,
            ny: y.count,
        }
    }
}

impl From<&Grid3D> for GridSpec<3> {
    fn from(g: &Grid3D) -> Self {
        GridSpec::new([
            AxisSpec::new(g.xmin, g.xmax, g.nx),
            AxisSpec::new(g.ymin, g.ymax, g.ny),
            AxisSpec::new(g.zmin, g.zmax, g.nz),
        ])
    }
}

impl From<&GridSpec<3>> for Grid3D {
    fn from(g: &GridSpec<3>) -> Self {
        let [x, y, z] = g.axes;
        Self {
            xmin: x.min,
            xmax: x.max,
            ymin: y.min,
            ymax: y.max,
            zmin: z.min,
            zmax: z.max,
            nx: x.count,
            ny: y.count,
            nz: z.count,
        }
    }
}

/// A 2D evaluation request as sent by callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Simulation2DRequest {
    pub charges: Vec<Charge2D>,
    pub grid: Grid2D,
    #[serde(default = "default_softening")]
    pub softening: f64,
    #[serde(default = "default_true")]
    pub include_potential: bool,
}

/// A 3D evaluation request as sent by callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Simulation3DRequest {
    pub charges: Vec<Charge3D>,
    #[serde(default)]
    pub grid: Grid3D,
    #[serde(default = "default_softening")]
    pub softening: f64,
    #[serde(default = "default_true")]
    pub include_potential: bool,
}

impl TryFrom<&Simulation2DRequest> for SimulationRequest<2> {
    type Error = ValidationError;

    fn try_from(req: &Simulation2DRequest) -> Result<Self, Self::Error> {
        let request = SimulationRequest {
            charges: req
                .charges
                .iter()
                .map(|c| PointCharge::new([c.x, c.y], c.q))
                .collect(),
            grid: GridSpec::from(&req.grid),
            softening: req.softening,
            include_potential: req.include_potential,
        };
        validate_request(&request)?;
        Ok(request)
    }
}

impl TryFrom<&Simulation3DRequest> for SimulationRequest<3> {
    type Error = ValidationError;

    fn try_from(req: &Simulation3DRequest) -> Result<Self, Self::Error> {
        let request = SimulationRequest {
            charges: req
                .charges
                .iter()
                .map(|c| PointCharge::new([c.x, c.y, c.z], c.q))
                .collect(),
            grid: GridSpec::from(&req.grid),
            softening: req.softening,
            include_potential: req.include_potential,
        };
        validate_request(&request)?;
        Ok(request)
    }
}

/// Nested 2D field arrays, indexed `[iy][ix]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field2D {
    pub ex: Vec<Vec<f64>>,
    pub ey: Vec<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub potential: Option<Vec<Vec<f64>>>,
}

/// Nested 3D field arrays, indexed `[iz][iy][ix]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field3D {
    pub ex: Vec<Vec<Vec<f64>>>,
    pub ey: Vec<Vec<Vec<f64>>>,
    pub ez: Vec<Vec<Vec<f64>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub potential: Option<Vec<Vec<Vec<f64>>>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Simulation2DResponse {
    pub grid: Grid2D,
    pub field: Field2D,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Simulation3DResponse {
    pub grid: Grid3D,
    pub field: Field3D,
}
