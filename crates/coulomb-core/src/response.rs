//! Conversion of dense field buffers into nested response arrays.
//!
//! Nesting follows the lattice convention: the outermost index is the
//! slowest axis, the innermost is x. A 2D field becomes `[ny][nx]` and a 3D
//! field `[nz][ny][nx]`. Values are copied, never rounded.

use ndarray::{ArrayD, Ix2, Ix3};

use crate::schema::{Field2D, Field3D, Grid2D, Grid3D, Simulation2DResponse, Simulation3DResponse};
use crate::solver::SolverError;
use crate::types::{FieldGrid, GridSpec};

/// Nest a 2D array as rows (`[iy][ix]`).
pub fn nest_2d(array: &ArrayD<f64>) -> Result<Vec<Vec<f64>>, SolverError> {
    let view = array.view().into_dimensionality::<Ix2>()?;
    Ok(view.outer_iter().map(|row| row.to_vec()).collect())
}

/// Nest a 3D array as planes of rows (`[iz][iy][ix]`).
pub fn nest_3d(array: &ArrayD<f64>) -> Result<Vec<Vec<Vec<f64>>>, SolverError> {
    let view = array.view().into_dimensionality::<Ix3>()?;
    Ok(view
        .outer_iter()
        .map(|plane| plane.outer_iter().map(|row| row.to_vec()).collect())
        .collect())
}

fn check_shape<const D: usize>(grid: &GridSpec<D>, field: &FieldGrid<D>) -> Result<(), SolverError> {
    let expected = grid.nested_shape();
    let arrays = field.components.iter().chain(field.potential.iter());
    for array in arrays {
        if array.shape() != expected.as_slice() {
            return Err(SolverError::Internal(format!(
                "field array shape {:?} does not match grid shape {:?}",
                array.shape(),
                expected
            )));
        }
    }
    Ok(())
}

/// Package a 2D field with its grid echo.
pub fn assemble_2d(
    grid: &GridSpec<2>,
    field: FieldGrid<2>,
) -> Result<Simulation2DResponse, SolverError> {
    check_shape(grid, &field)?;
    let [ex, ey] = &field.components;

    Ok(Simulation2DResponse {
        grid: Grid2D::from(grid),
        field: Field2D {
            ex: nest_2d(ex)?,
            ey: nest_2d(ey)?,
            potential: field.potential.as_ref().map(nest_2d).transpose()?,
        },
    })
}

/// Package a 3D field with its grid echo.
pub fn assemble_3d(
    grid: &GridSpec<3>,
    field: FieldGrid<3>,
) -> Result<Simulation3DResponse, SolverError> {
    check_shape(grid, &field)?;
    let [ex, ey, ez] = &field.components;

    Ok(Simulation3DResponse {
        grid: Grid3D::from(grid),
        field: Field3D {
            ex: nest_3d(ex)?,
            ey: nest_3d(ey)?,
            ez: nest_3d(ez)?,
            potential: field.potential.as_ref().map(nest_3d).transpose()?,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AxisSpec;
    use ndarray::IxDyn;

    fn ramp(shape: &[usize]) -> ArrayD<f64> {
        let n: usize = shape.iter().product();
        ArrayD::from_shape_vec(IxDyn(shape), (0..n).map(|i| i as f64).collect()).unwrap()
    }

    #[test]
    fn test_nest_2d_rows_are_x_runs() {
        let nested = nest_2d(&ramp(&[2, 3])).unwrap();
        assert_eq!(nested, vec![vec![0.0, 1.0, 2.0], vec![3.0, 4.0, 5.0]]);
    }

    #[test]
    fn test_nest_3d_planes_are_z_slices() {
        let nested = nest_3d(&ramp(&[2, 2, 3])).unwrap();
        assert_eq!(nested.len(), 2);
        assert_eq!(nested[0], vec![vec![0.0, 1.0, 2.0], vec![3.0, 4.0, 5.0]]);
        assert_eq!(nested[1][1], vec![9.0, 10.0, 11.0]);
    }

    #[test]
    fn test_nest_rejects_wrong_rank() {
        assert!(nest_2d(&ramp(&[2, 2, 2])).is_err());
        assert!(nest_3d(&ramp(&[4])).is_err());
    }

    #[test]
    fn test_assemble_2d_echoes_grid_and_omits_potential() {
        let grid = GridSpec::new([AxisSpec::new(-1.0, 1.0, 3), AxisSpec::new(0.0, 1.0, 2)]);
        let field = FieldGrid {
            components: [ramp(&[2, 3]), ramp(&[2, 3])],
            potential: None,
        };
        let resp = assemble_2d(&grid, field).unwrap();
        assert_eq!(resp.grid.nx, 3);
        assert_eq!(resp.grid.ny, 2);
        assert_eq!(resp.grid.ymax, 1.0);
        assert_eq!(resp.field.ex.len(), 2);
        assert_eq!(resp.field.ex[0].len(), 3);
        assert!(resp.field.potential.is_none());
    }

    #[test]
    fn test_assemble_rejects_mismatched_shape() {
        let grid = GridSpec::new([AxisSpec::new(-1.0, 1.0, 3), AxisSpec::new(0.0, 1.0, 2)]);
        let field = FieldGrid {
            components: [ramp(&[3, 2]), ramp(&[3, 2])],
            potential: Some(ramp(&[3, 2])),
        };
        assert!(matches!(assemble_2d(&grid, field), Err(SolverError::Internal(_))));
    }
}
