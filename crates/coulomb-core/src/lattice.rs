//! Regular sampling lattices.
//!
//! Each axis is sampled at `count` evenly spaced coordinates from `min` to
//! `max`, both endpoints included. The full lattice is the Cartesian product
//! of the axes with x (axis 0) varying fastest:
//!
//! $$ \text{flat}(i_0, i_1, i_2) = i_0 + n_0 (i_1 + n_1 i_2) $$
//!
//! The same convention is used by [`crate::fields`] when filling the dense
//! buffers and by [`crate::response`] when nesting them.

use ndarray::Array1;

use crate::types::{AxisSpec, GridSpec};

/// Sample one axis: `count` values linearly interpolated over `[min, max]`.
///
/// The last sample is pinned to `max` so the upper bound is hit exactly
/// regardless of rounding in the step.
pub fn axis_samples(axis: &AxisSpec) -> Array1<f64> {
    let n = axis.count;
    let step = axis.spacing();
    Array1::from_shape_fn(n, |i| {
        if i + 1 == n && n > 1 {
            axis.max
        } else {
            axis.min + i as f64 * step
        }
    })
}

/// A Cartesian lattice of observation points.
#[derive(Debug, Clone)]
pub struct Lattice<const D: usize> {
    axes: [Array1<f64>; D],
}

impl<const D: usize> Lattice<D> {
    /// Build the lattice described by a grid specification.
    pub fn from_grid(grid: &GridSpec<D>) -> Self {
        Self {
            axes: std::array::from_fn(|a| axis_samples(&grid.axes[a])),
        }
    }

    /// Coordinates along one axis.
    pub fn axis(&self, axis: usize) -> &Array1<f64> {
        &self.axes[axis]
    }

    /// Spacing along one axis (0 for a single-sample axis).
    pub fn spacing(&self, axis: usize) -> f64 {
        let a = &self.axes[axis];
        if a.len() < 2 {
            0.0
        } else {
            a[1] - a[0]
        }
    }

    /// Total number of points.
    pub fn len(&self) -> usize {
        self.axes.iter().map(|a| a.len()).product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Per-axis sample counts in lattice order (x first).
    pub fn counts(&self) -> [usize; D] {
        std::array::from_fn(|a| self.axes[a].len())
    }

    /// Nested output shape: slowest axis first, x last.
    pub fn shape(&self) -> [usize; D] {
        std::array::from_fn(|a| self.axes[D - 1 - a].len())
    }

    /// Per-axis indices of the point with the given flat index.
    #[inline]
    pub fn unravel(&self, flat: usize) -> [usize; D] {
        let mut rem = flat;
        std::array::from_fn(|a| {
            let n = self.axes[a].len();
            let i = rem % n;
            rem /= n;
            i
        })
    }

    /// Flat index of the point with the given per-axis indices.
    #[inline]
    pub fn ravel(&self, index: [usize; D]) -> usize {
        let mut flat = 0;
        for a in (0..D).rev() {
            debug_assert!(index[a] < self.axes[a].len());
            flat = flat * self.axes[a].len() + index[a];
        }
        flat
    }

    /// Coordinates of the point with the given flat index.
    #[inline]
    pub fn point(&self, flat: usize) -> [f64; D] {
        let index = self.unravel(flat);
        std::array::from_fn(|a| self.axes[a][index[a]])
    }

    /// All points in flat order.
    pub fn points(&self) -> impl Iterator<Item = [f64; D]> + '_ {
        (0..self.len()).map(move |i| self.point(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_axis_samples_include_both_endpoints() {
        let xs = axis_samples(&AxisSpec::new(-1.0, 1.0, 3));
        assert_eq!(xs.to_vec(), vec![-1.0, 0.0, 1.0]);

        let ys = axis_samples(&AxisSpec::new(0.1, 0.7, 7));
        assert_eq!(ys.len(), 7);
        assert_eq!(ys[0], 0.1);
        assert_eq!(ys[6], 0.7);
        for w in ys.to_vec().windows(2) {
            assert_abs_diff_eq!(w[1] - w[0], 0.1, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_x_varies_fastest() {
        let grid = GridSpec::new([AxisSpec::new(0.0, 2.0, 3), AxisSpec::new(10.0, 11.0, 2)]);
        let lattice = Lattice::from_grid(&grid);
        let pts: Vec<[f64; 2]> = lattice.points().collect();
        assert_eq!(
            pts,
            vec![
                [0.0, 10.0],
                [1.0, 10.0],
                [2.0, 10.0],
                [0.0, 11.0],
                [1.0, 11.0],
                [2.0, 11.0],
            ]
        );
        assert_eq!(lattice.shape(), [2, 3]);
        assert_eq!(lattice.counts(), [3, 2]);
    }

    #[test]
    fn test_ravel_unravel_3d() {
        let grid = GridSpec::new([
            AxisSpec::new(0.0, 1.0, 4),
            AxisSpec::new(0.0, 1.0, 3),
            AxisSpec::new(0.0, 1.0, 2),
        ]);
        let lattice = Lattice::from_grid(&grid);
        assert_eq!(lattice.len(), 24);
        assert_eq!(lattice.ravel([1, 0, 0]), 1);
        assert_eq!(lattice.ravel([0, 1, 0]), 4);
        assert_eq!(lattice.ravel([0, 0, 1]), 12);
        assert_eq!(lattice.ravel([3, 2, 1]), 23);
        for flat in 0..lattice.len() {
            assert_eq!(lattice.ravel(lattice.unravel(flat)), flat);
        }
        assert_eq!(lattice.point(23), [1.0, 1.0, 1.0]);
        assert_eq!(lattice.shape(), [2, 3, 4]);
    }

    #[test]
    fn test_spacing() {
        let grid = GridSpec::new([AxisSpec::new(-2.0, 2.0, 5), AxisSpec::new(0.0, 3.0, 4)]);
        let lattice = Lattice::from_grid(&grid);
        assert_abs_diff_eq!(lattice.spacing(0), 1.0);
        assert_abs_diff_eq!(lattice.spacing(1), 1.0);
    }
}
