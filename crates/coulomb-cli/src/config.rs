//! Job file deserialisation.
//!
//! Two formats are accepted:
//!
//! - TOML job files (`[simulation]`, `[grid]`, `[[charge]]`, `[output]`).
//! - Raw JSON requests in the service wire format (`.json` extension),
//!   run with the default backend and output settings.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use coulomb_core::schema::{
    Charge2D, Charge3D, Grid2D, Grid3D, Simulation2DRequest, Simulation3DRequest,
    DEFAULT_SOFTENING,
};

/// Top-level TOML job configuration.
#[derive(Debug, Deserialize)]
pub struct JobConfig {
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default, rename = "charge")]
    pub charges: Vec<ChargeConfig>,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Simulation parameters from TOML.
#[derive(Debug, Deserialize)]
pub struct SimulationConfig {
    /// Lattice dimensionality: 2 or 3. Default: 2.
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,
    #[serde(default = "default_softening")]
    pub softening: f64,
    #[serde(default = "default_true")]
    pub include_potential: bool,
    /// Compute backend: "cpu" or "serial". Default: "cpu".
    #[serde(default = "default_backend")]
    pub backend: String,
    /// Fixed Rayon thread count for the CPU backend.
    #[serde(default)]
    pub threads: Option<usize>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            dimensions: default_dimensions(),
            softening: default_softening(),
            include_potential: true,
            backend: default_backend(),
            threads: None,
        }
    }
}

fn default_dimensions() -> usize {
    2
}
fn default_softening() -> f64 {
    DEFAULT_SOFTENING
}
fn default_backend() -> String {
    "cpu".into()
}

/// Grid bounds and resolution. Omitted keys fall back to the wire defaults
/// for the chosen dimensionality.
#[derive(Debug, Default, Deserialize)]
pub struct GridConfig {
    pub xmin: Option<f64>,
    pub xmax: Option<f64>,
    pub ymin: Option<f64>,
    pub ymax: Option<f64>,
    pub zmin: Option<f64>,
    pub zmax: Option<f64>,
    pub nx: Option<usize>,
    pub ny: Option<usize>,
    pub nz: Option<usize>,
}

impl GridConfig {
    fn to_grid_2d(&self) -> Grid2D {
        let d = Grid2D::default();
        Grid2D {
            xmin: self.xmin.unwrap_or(d.xmin),
            xmax: self.xmax.unwrap_or(d.xmax),
            ymin: self.ymin.unwrap_or(d.ymin),
            ymax: self.ymax.unwrap_or(d.ymax),
            nx: self.nx.unwrap_or(d.nx),
            ny: self.ny.unwrap_or(d.ny),
        }
    }

    fn to_grid_3d(&self) -> Grid3D {
        let d = Grid3D::default();
        Grid3D {
            xmin: self.xmin.unwrap_or(d.xmin),
            xmax: self.xmax.unwrap_or(d.xmax),
            ymin: self.ymin.unwrap_or(d.ymin),
            ymax: self.ymax.unwrap_or(d.ymax),
            zmin: self.zmin.unwrap_or(d.zmin),
            zmax: self.zmax.unwrap_or(d.zmax),
            nx: self.nx.unwrap_or(d.nx),
            ny: self.ny.unwrap_or(d.ny),
            nz: self.nz.unwrap_or(d.nz),
        }
    }
}

/// A single point charge.
#[derive(Debug, Deserialize)]
pub struct ChargeConfig {
    /// Position `[x, y]` or `[x, y, z]` in metres.
    pub position: Vec<f64>,
    /// Charge in coulombs.
    pub q: f64,
}

/// Output configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Output directory (default: "./output").
    #[serde(default = "default_output_dir")]
    pub directory: String,
    /// Whether to write the nested field as JSON (default: true).
    #[serde(default = "default_true")]
    pub save_json: bool,
    /// Whether to also write a flat per-point CSV table (default: false).
    #[serde(default)]
    pub save_csv: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            save_json: true,
            save_csv: false,
        }
    }
}

fn default_output_dir() -> String {
    "./output".into()
}
fn default_true() -> bool {
    true
}

/// Backend selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub name: String,
    pub threads: Option<usize>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            name: default_backend(),
            threads: None,
        }
    }
}

/// An unvalidated request in the wire format of its dimensionality.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Plane(Simulation2DRequest),
    Volume(Simulation3DRequest),
}

impl Request {
    pub fn dimensions(&self) -> usize {
        match self {
            Request::Plane(_) => 2,
            Request::Volume(_) => 3,
        }
    }
}

/// A fully loaded job.
#[derive(Debug, Clone)]
pub struct Job {
    pub request: Request,
    pub backend: BackendConfig,
    pub output: OutputConfig,
}

impl JobConfig {
    /// Convert the TOML layout into a wire request.
    pub fn into_job(self) -> Result<Job> {
        let sim = &self.simulation;
        let request = match sim.dimensions {
            2 => {
                let charges = self
                    .charges
                    .iter()
                    .enumerate()
                    .map(|(i, c)| match c.position.as_slice() {
                        &[x, y] => Ok(Charge2D { x, y, q: c.q }),
                        other => bail!("charge {}: expected [x, y], got {} values", i, other.len()),
                    })
                    .collect::<Result<Vec<_>>>()?;
                Request::Plane(Simulation2DRequest {
                    charges,
                    grid: self.grid.to_grid_2d(),
                    softening: sim.softening,
                    include_potential: sim.include_potential,
                })
            }
            3 => {
                let charges = self
                    .charges
                    .iter()
                    .enumerate()
                    .map(|(i, c)| match c.position.as_slice() {
                        &[x, y, z] => Ok(Charge3D { x, y, z, q: c.q }),
                        other => {
                            bail!("charge {}: expected [x, y, z], got {} values", i, other.len())
                        }
                    })
                    .collect::<Result<Vec<_>>>()?;
                Request::Volume(Simulation3DRequest {
                    charges,
                    grid: self.grid.to_grid_3d(),
                    softening: sim.softening,
                    include_potential: sim.include_potential,
                })
            }
            other => bail!("simulation.dimensions must be 2 or 3, got {}", other),
        };

        Ok(Job {
            request,
            backend: BackendConfig {
                name: self.simulation.backend,
                threads: self.simulation.threads,
            },
            output: self.output,
        })
    }
}

/// Parse a JSON wire request, choosing the dimensionality from its keys.
pub fn parse_json_request(content: &str) -> Result<Request> {
    let value: serde_json::Value = serde_json::from_str(content)?;
    let is_volume = value["grid"].get("nz").is_some()
        || value["grid"].get("zmin").is_some()
        || value["charges"]
            .as_array()
            .is_some_and(|cs| cs.iter().any(|c| c.get("z").is_some()));

    Ok(if is_volume {
        Request::Volume(serde_json::from_value(value).context("invalid 3D request")?)
    } else {
        Request::Plane(serde_json::from_value(value).context("invalid 2D request")?)
    })
}

/// Load a job from a TOML job file or a JSON request.
pub fn load_config(path: &Path) -> Result<Job> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        log::debug!("Parsing {} as a JSON request", path.display());
        Ok(Job {
            request: parse_json_request(&content)?,
            backend: BackendConfig::default(),
            output: OutputConfig::default(),
        })
    } else {
        let config: JobConfig = toml::from_str(&content)
            .with_context(|| format!("invalid job file {}", path.display()))?;
        config.into_job()
    }
}
