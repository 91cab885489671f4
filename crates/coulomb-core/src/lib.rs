//! # Coulomb Core
//!
//! The numerical backbone of the Coulomb engine. This crate evaluates the
//! electrostatic field and potential of a set of point charges on a regular
//! 2D or 3D lattice by direct superposition of softened Coulomb terms.
//!
//! ## Architecture
//!
//! A request flows through three stages, driven by
//! [`solver::CoulombSolver`]:
//!
//! 1. [`lattice`] samples each axis and defines the point ordering
//!    (x fastest).
//! 2. [`fields`] accumulates every charge's contribution at every point into
//!    dense flat buffers, scheduled by a `coulomb_compute` backend.
//! 3. [`response`] nests the buffers into `[ny][nx]` / `[nz][ny][nx]` arrays
//!    and echoes the grid.
//!
//! ## Modules
//!
//! - [`types`]: Physical constants and the validated data model.
//! - [`lattice`]: Axis sampling and point indexing.
//! - [`fields`]: Superposition kernel and grid evaluation.
//! - [`response`]: Nesting of dense arrays for output.
//! - [`schema`]: Serde wire format for requests and responses.
//! - [`validation`]: Request checks applied at the boundary.
//! - [`solver`]: Request-level entry points and errors.

pub mod fields;
pub mod lattice;
pub mod response;
pub mod schema;
pub mod solver;
pub mod types;
pub mod validation;

pub use solver::{CoulombSolver, SolverError};
pub use types::{COULOMB_CONSTANT, VACUUM_PERMITTIVITY};
pub use validation::ValidationError;
