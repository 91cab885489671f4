//! Electrostatic field evaluation by direct Coulomb superposition.
//!
//! For an observation point $\mathbf{p}$ and charges $q_i$ at $\mathbf{x}_i$:
//!
//! $$
//! \mathbf{E}(\mathbf{p}) = \sum_i K q_i \frac{\mathbf{d}_i}{r_i^3}, \qquad
//! V(\mathbf{p}) = \sum_i \frac{K q_i}{r_i}, \qquad
//! \mathbf{d}_i = \mathbf{p} - \mathbf{x}_i, \quad
//! r_i = \sqrt{|\mathbf{d}_i|^2 + \varepsilon^2}
//! $$
//!
//! where $\varepsilon$ is the softening length. A term with $r_i = 0$ (the
//! point coincides with a charge and $\varepsilon = 0$) contributes exactly
//! zero to both sums.
//!
//! Charges are always accumulated in input order, so results are identical
//! for every compute backend.

use ndarray::ArrayD;

use coulomb_compute::ComputeBackend;

use crate::lattice::Lattice;
use crate::solver::SolverError;
use crate::types::{FieldGrid, FieldSample, PointCharge, COULOMB_CONSTANT};

/// Squared softening term, ε² for ε > 0 and 0 otherwise.
#[inline]
fn softening_sq(softening: f64) -> f64 {
    if softening > 0.0 {
        softening * softening
    } else {
        0.0
    }
}

/// Accumulate every charge's contribution at `point` into `out`.
///
/// `out[..D]` receives the field components. If `out` has a slot after
/// them, the potential is accumulated there as well.
#[inline]
fn superpose<const D: usize>(
    point: &[f64; D],
    charges: &[PointCharge<D>],
    softening_sq: f64,
    out: &mut [f64],
) {
    let with_potential = out.len() > D;

    for charge in charges {
        let mut d = [0.0; D];
        let mut r2 = softening_sq;
        for a in 0..D {
            d[a] = point[a] - charge.position[a];
            r2 += d[a] * d[a];
        }
        let r = r2.sqrt();

        // A coincident point with zero softening contributes nothing
        if r > 0.0 {
            let kq = COULOMB_CONSTANT * charge.charge;
            let inv_r3 = 1.0 / (r2 * r);
            for a in 0..D {
                out[a] += kq * d[a] * inv_r3;
            }
            if with_potential {
                out[D] += kq / r;
            }
        }
    }
}

/// Compute the field and potential at a single observation point.
pub fn field_at_point<const D: usize>(
    point: &[f64; D],
    charges: &[PointCharge<D>],
    softening: f64,
) -> FieldSample<D> {
    let mut out = vec![0.0; D + 1];
    superpose(point, charges, softening_sq(softening), &mut out);

    FieldSample {
        field: std::array::from_fn(|a| out[a]),
        potential: out[D],
    }
}

/// Evaluate the field (and optionally the potential) at every lattice point.
///
/// The backend fills one interleaved chunk per lattice point
/// (`[E_0, .., E_{D-1}, V?]`); the chunks are then split into one dense
/// array per quantity, shaped as [`Lattice::shape`].
pub fn evaluate<const D: usize>(
    lattice: &Lattice<D>,
    charges: &[PointCharge<D>],
    softening: f64,
    include_potential: bool,
    backend: &dyn ComputeBackend,
) -> Result<FieldGrid<D>, SolverError> {
    let width = if include_potential { D + 1 } else { D };
    let s2 = softening_sq(softening);

    log::debug!(
        "Evaluating {} charges on {} lattice points (width {}, {})",
        charges.len(),
        lattice.len(),
        width,
        backend.device_info().name
    );

    let data = backend.fill_chunks(lattice.len(), width, &|i: usize, out: &mut [f64]| {
        let point = lattice.point(i);
        superpose(&point, charges, s2, out);
    })?;

    let shape = lattice.shape().to_vec();
    let split = |slot: usize| -> Result<ArrayD<f64>, SolverError> {
        let values: Vec<f64> = data.iter().skip(slot).step_by(width).copied().collect();
        Ok(ArrayD::from_shape_vec(shape.clone(), values)?)
    };

    let mut components = Vec::with_capacity(D);
    for a in 0..D {
        components.push(split(a)?);
    }
    let components: [ArrayD<f64>; D] = components
        .try_into()
        .map_err(|_| SolverError::Internal("field component count mismatch".into()))?;

    let potential = if include_potential {
        Some(split(D)?)
    } else {
        None
    };

    Ok(FieldGrid {
        components,
        potential,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AxisSpec, GridSpec};
    use approx::assert_relative_eq;
    use coulomb_compute::SerialBackend;

    #[test]
    fn test_single_charge_on_axis() {
        let charges = [PointCharge::new([0.0, 0.0], 1e-9)];
        let s = field_at_point(&[1.0, 0.0], &charges, 0.0);
        assert_relative_eq!(s.field[0], COULOMB_CONSTANT * 1e-9, max_relative = 1e-12);
        assert_eq!(s.field[1], 0.0);
        assert_relative_eq!(s.potential, COULOMB_CONSTANT * 1e-9, max_relative = 1e-12);
    }

    #[test]
    fn test_coincident_point_without_softening_is_zero() {
        let charges = [PointCharge::new([0.5, -0.5, 0.25], -3e-9)];
        let s = field_at_point(&[0.5, -0.5, 0.25], &charges, 0.0);
        assert_eq!(s.field, [0.0, 0.0, 0.0]);
        assert_eq!(s.potential, 0.0);
    }

    #[test]
    fn test_coincident_point_with_softening_is_finite() {
        let charges = [PointCharge::new([0.0, 0.0], 1e-9)];
        let s = field_at_point(&[0.0, 0.0], &charges, 0.1);
        // d = 0 so the field vanishes by symmetry, the potential does not
        assert_eq!(s.field, [0.0, 0.0]);
        assert_relative_eq!(s.potential, COULOMB_CONSTANT * 1e-9 / 0.1, max_relative = 1e-12);
    }

    #[test]
    fn test_negative_softening_is_treated_as_zero() {
        let charges = [PointCharge::new([0.0, 0.0], 1e-9)];
        let a = field_at_point(&[0.3, 0.4], &charges, -1.0);
        let b = field_at_point(&[0.3, 0.4], &charges, 0.0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_evaluate_omits_potential_when_not_requested() {
        let grid = GridSpec::new([AxisSpec::new(-1.0, 1.0, 3), AxisSpec::new(-1.0, 1.0, 4)]);
        let lattice = Lattice::from_grid(&grid);
        let charges = [PointCharge::new([0.1, 0.2], 1e-9)];

        let without = evaluate(&lattice, &charges, 0.0, false, &SerialBackend).unwrap();
        assert!(without.potential.is_none());
        assert_eq!(without.shape(), &[4, 3]);

        let with = evaluate(&lattice, &charges, 0.0, true, &SerialBackend).unwrap();
        assert_eq!(with.potential.as_ref().unwrap().shape(), &[4, 3]);
        assert_eq!(with.components, without.components);
    }

    #[test]
    fn test_evaluate_matches_point_probe() {
        let grid = GridSpec::new([
            AxisSpec::new(-1.0, 1.0, 3),
            AxisSpec::new(-2.0, 2.0, 5),
            AxisSpec::new(0.0, 1.0, 2),
        ]);
        let lattice = Lattice::from_grid(&grid);
        let charges = [
            PointCharge::new([0.3, 0.0, 0.5], 2e-9),
            PointCharge::new([-0.7, 1.1, 0.2], -1e-9),
        ];
        let grid_field = evaluate(&lattice, &charges, 1e-3, true, &SerialBackend).unwrap();
        let potential = grid_field.potential.as_ref().unwrap();

        for flat in 0..lattice.len() {
            let [ix, iy, iz] = lattice.unravel(flat);
            let probe = field_at_point(&lattice.point(flat), &charges, 1e-3);
            for a in 0..3 {
                assert_eq!(grid_field.components[a][&[iz, iy, ix][..]], probe.field[a]);
            }
            assert_eq!(potential[&[iz, iy, ix][..]], probe.potential);
        }
    }
}
