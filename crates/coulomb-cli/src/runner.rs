//! Simulation runner: ties together validation, backend and solver.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};

use coulomb_compute::{ComputeBackend, CpuBackend, SerialBackend};
use coulomb_core::fields::field_at_point;
use coulomb_core::lattice::Lattice;
use coulomb_core::response::{assemble_2d, assemble_3d};
use coulomb_core::types::{FieldSample, SimulationRequest, SimulationResponse, AXIS_NAMES};
use coulomb_core::CoulombSolver;

use crate::config::{BackendConfig, Job, Request};

/// A request that passed validation.
#[derive(Debug, Clone)]
pub enum ValidatedRequest {
    Plane(SimulationRequest<2>),
    Volume(SimulationRequest<3>),
}

/// Dense result of a run, still in flat-buffer form.
#[derive(Debug, Clone)]
pub enum SimulationOutput {
    Plane(SimulationResponse<2>),
    Volume(SimulationResponse<3>),
}

/// Validate the job's request.
pub fn validate_job(job: &Job) -> Result<ValidatedRequest> {
    Ok(match &job.request {
        Request::Plane(req) => ValidatedRequest::Plane(
            SimulationRequest::try_from(req).context("invalid 2D request")?,
        ),
        Request::Volume(req) => ValidatedRequest::Volume(
            SimulationRequest::try_from(req).context("invalid 3D request")?,
        ),
    })
}

/// Run a full evaluation from a loaded job.
pub fn run_simulation(job: &Job) -> Result<SimulationOutput> {
    let request = validate_job(job)?;
    let backend = create_backend(&job.backend)?;
    println!("Backend: {}", backend.device_info().name);

    let solver = CoulombSolver::new(backend);
    let start = std::time::Instant::now();

    let output = match &request {
        ValidatedRequest::Plane(req) => {
            print_summary(2, req.charges.len(), &req.grid.counts());
            SimulationOutput::Plane(solver.evaluate_request(req)?)
        }
        ValidatedRequest::Volume(req) => {
            print_summary(3, req.charges.len(), &req.grid.counts());
            SimulationOutput::Volume(solver.evaluate_request(req)?)
        }
    };

    log::info!("Field evaluated in {:.3} s", start.elapsed().as_secs_f64());
    Ok(output)
}

fn print_summary(dimensions: usize, charges: usize, counts: &[usize]) {
    let shape: Vec<String> = counts.iter().map(|n| n.to_string()).collect();
    println!(
        "  {}D grid {} ({} points), {} charge{}",
        dimensions,
        shape.join("x"),
        counts.iter().product::<usize>(),
        charges,
        if charges == 1 { "" } else { "s" }
    );
}

/// Evaluate field and potential at a single point.
pub fn probe(job: &Job, at: &[f64]) -> Result<(Vec<f64>, FieldSample<3>)> {
    let request = validate_job(job)?;
    match request {
        ValidatedRequest::Plane(req) => {
            let point: [f64; 2] = at
                .try_into()
                .map_err(|_| anyhow!("--at needs 2 coordinates for a 2D job, got {}", at.len()))?;
            let s = field_at_point(&point, &req.charges, req.softening);
            let padded = FieldSample {
                field: [s.field[0], s.field[1], 0.0],
                potential: s.potential,
            };
            Ok((point.to_vec(), padded))
        }
        ValidatedRequest::Volume(req) => {
            let point: [f64; 3] = at
                .try_into()
                .map_err(|_| anyhow!("--at needs 3 coordinates for a 3D job, got {}", at.len()))?;
            Ok((point.to_vec(), field_at_point(&point, &req.charges, req.softening)))
        }
    }
}

/// Create a compute backend from the job's preference.
///
/// - `"cpu"` (default): Rayon, optionally with a fixed thread count.
/// - `"serial"`: single thread.
pub fn create_backend(config: &BackendConfig) -> Result<Arc<dyn ComputeBackend>> {
    match config.name.as_str() {
        "cpu" => match config.threads {
            Some(0) => bail!("simulation.threads must be at least 1"),
            Some(n) => Ok(Arc::new(CpuBackend::with_threads(n)?)),
            None => Ok(Arc::new(CpuBackend::new())),
        },
        "serial" => Ok(Arc::new(SerialBackend::new())),
        other => {
            log::warn!("Unknown backend '{}', falling back to cpu", other);
            Ok(Arc::new(CpuBackend::new()))
        }
    }
}

/// Write the nested response as JSON.
pub fn write_field_json(output: SimulationOutput, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = match output {
        SimulationOutput::Plane(resp) => {
            serde_json::to_string_pretty(&assemble_2d(&resp.grid, resp.field)?)
        }
        SimulationOutput::Volume(resp) => {
            serde_json::to_string_pretty(&assemble_3d(&resp.grid, resp.field)?)
        }
    }
    .map_err(|e| anyhow!("JSON serialisation error: {}", e))?;
    std::fs::write(path, json)?;

    println!("Field (JSON) written to: {}", path.display());
    Ok(())
}

/// Write the field as a flat table, one row per lattice point in x-fastest order.
pub fn write_field_csv(output: &SimulationOutput, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
    writeln!(file, "# Coulomb field engine: point-charge field map")?;
    writeln!(file, "# Version: {}", env!("CARGO_PKG_VERSION"))?;

    match output {
        SimulationOutput::Plane(resp) => write_csv_rows(&mut file, resp)?,
        SimulationOutput::Volume(resp) => write_csv_rows(&mut file, resp)?,
    }
    file.flush()?;

    println!("Field (CSV) written to: {}", path.display());
    Ok(())
}

fn write_csv_rows<const D: usize, W: Write>(out: &mut W, resp: &SimulationResponse<D>) -> Result<()> {
    let lattice = Lattice::from_grid(&resp.grid);
    writeln!(out, "# Grid: {:?} (x fastest)", lattice.counts())?;
    writeln!(out, "#")?;

    let mut header: Vec<String> = AXIS_NAMES[..D].iter().map(|a| format!("{a}_m")).collect();
    header.extend(AXIS_NAMES[..D].iter().map(|a| format!("e{a}_NC")));

    let mut columns: Vec<&[f64]> = Vec::with_capacity(D + 1);
    for component in &resp.field.components {
        columns.push(component.as_slice().context("field array is not contiguous")?);
    }
    if let Some(potential) = &resp.field.potential {
        header.push("potential_V".into());
        columns.push(potential.as_slice().context("potential array is not contiguous")?);
    }
    writeln!(out, "{}", header.join(","))?;

    for (flat, point) in lattice.points().enumerate() {
        let mut row: Vec<String> = point.iter().map(|x| format!("{:.6}", x)).collect();
        row.extend(columns.iter().map(|c| format!("{:.6e}", c[flat])));
        writeln!(out, "{}", row.join(","))?;
    }
    Ok(())
}
