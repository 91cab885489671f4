//! Coulomb command-line interface.
//!
//! Evaluate point-charge fields from TOML job files or JSON requests:
//! ```sh
//! coulomb-cli run job.toml
//! coulomb-cli validate request.json
//! coulomb-cli probe job.toml --at 0.5,0.0
//! coulomb-cli constants
//! ```

mod config;
mod runner;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use coulomb_core::types::{MAX_AXIS_POINTS_2D, MAX_AXIS_POINTS_3D, MIN_AXIS_POINTS};
use coulomb_core::{COULOMB_CONSTANT, VACUUM_PERMITTIVITY};

#[derive(Parser)]
#[command(name = "coulomb-cli")]
#[command(about = "Coulomb: electrostatic fields of point charges on regular grids")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate the field described by a job file.
    Run {
        /// Path to the TOML job file or JSON request.
        config: PathBuf,
        /// Output directory (overrides config file setting).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a job file without evaluating it.
    Validate {
        /// Path to the TOML job file or JSON request.
        config: PathBuf,
    },
    /// Evaluate field and potential at a single point.
    Probe {
        /// Path to the TOML job file or JSON request.
        config: PathBuf,
        /// Observation point, comma separated (e.g. `0.5,0.0`).
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true, required = true)]
        at: Vec<f64>,
    },
    /// Display the physical constants and grid limits in use.
    Constants,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, output } => {
            println!("Coulomb Field Engine");
            println!("====================");
            let job = config::load_config(&config)?;
            println!("Configuration: {}", config.display());

            let result = runner::run_simulation(&job)?;

            let out_dir = output.unwrap_or_else(|| PathBuf::from(&job.output.directory));

            // CSV table (optional)
            if job.output.save_csv {
                runner::write_field_csv(&result, &out_dir.join("field.csv"))?;
            }

            // Nested JSON (default on)
            if job.output.save_json {
                runner::write_field_json(result, &out_dir.join("field.json"))?;
            }

            println!("Simulation complete.");
            Ok(())
        }
        Commands::Validate { config } => {
            let job = config::load_config(&config)?;
            runner::validate_job(&job)?;
            println!(
                "Configuration is valid ({}D): {}",
                job.request.dimensions(),
                config.display()
            );
            Ok(())
        }
        Commands::Probe { config, at } => {
            let job = config::load_config(&config)?;
            let (point, sample) = runner::probe(&job, &at)?;
            let dims = point.len();

            println!("Point:     {:?} m", point);
            for (name, value) in ["Ex", "Ey", "Ez"].iter().zip(&sample.field[..dims]) {
                println!("{:<10} {:.6e} N/C", format!("{}:", name), value);
            }
            println!("|E|:       {:.6e} N/C", sample.magnitude());
            println!("Potential: {:.6e} V", sample.potential);
            Ok(())
        }
        Commands::Constants => {
            println!("Physical constants:");
            println!("  ε₀ (vacuum permittivity) = {:.10e} F/m", VACUUM_PERMITTIVITY);
            println!("  K = 1/(4πε₀)             = {:.10e} N·m²/C²", COULOMB_CONSTANT);
            println!();
            println!("Grid limits (points per axis):");
            println!("  2D: {}–{}", MIN_AXIS_POINTS, MAX_AXIS_POINTS_2D);
            println!("  3D: {}–{}", MIN_AXIS_POINTS, MAX_AXIS_POINTS_3D);
            Ok(())
        }
    }
}
