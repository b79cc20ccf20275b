//! The sampled boundary curve shared by all pipeline stages.

use ndarray::{Array2, ArrayView1, Axis};

use crate::error::{CcThicknessError, Result};

/// A sampled curve, stored as a `dim x siz` coordinate grid: one row per axis, one column per sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    pub coords: Array2<f64>,
}

impl Curve {
    pub fn new(coords: Array2<f64>) -> Curve {
        Curve { coords }
    }

    /// Build a curve from point rows, e.g. `[[x0, y0, z0], [x1, y1, z1]]`.
    pub fn from_points<const N: usize>(points: &[[f64; N]]) -> Curve {
        let coords = Array2::from_shape_fn((N, points.len()), |(d, i)| points[i][d]);
        Curve { coords }
    }

    /// Build a curve from per-axis rows, as stored in snapshots and matcher messages.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Curve> {
        let siz = rows.first().map(|r| r.len()).unwrap_or(0);
        if rows.iter().any(|r| r.len() != siz) {
            return Err(CcThicknessError::ShapeMismatch(String::from(
                "curve rows have different lengths",
            )));
        }
        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        Array2::from_shape_vec((rows.len(), siz), flat)
            .map(Curve::new)
            .map_err(|e| CcThicknessError::ShapeMismatch(e.to_string()))
    }

    /// The per-axis rows of the coordinate grid.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.coords.outer_iter().map(|row| row.to_vec()).collect()
    }

    /// Number of coordinate axes.
    pub fn dim(&self) -> usize {
        self.coords.nrows()
    }

    /// Number of samples.
    pub fn siz(&self) -> usize {
        self.coords.ncols()
    }

    /// The coordinates of sample `i`.
    pub fn point(&self, i: usize) -> ArrayView1<f64> {
        self.coords.index_axis(Axis(1), i)
    }

    /// The closed loop running over `top` forward and then over `bottom` backwards.
    pub fn joined(top: &Curve, bottom: &Curve) -> Result<Curve> {
        if top.dim() != bottom.dim() {
            return Err(CcThicknessError::ShapeMismatch(format!(
                "cannot join curves of dimension {} and {}",
                top.dim(),
                bottom.dim()
            )));
        }
        let n_top = top.siz();
        let n_bot = bottom.siz();
        let coords = Array2::from_shape_fn((top.dim(), n_top + n_bot), |(d, i)| {
            if i < n_top {
                top.coords[[d, i]]
            } else {
                bottom.coords[[d, n_bot - 1 - (i - n_top)]]
            }
        });
        Ok(Curve { coords })
    }
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn points_become_columns() {
        let c = Curve::from_points(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        assert_eq!(3, c.dim());
        assert_eq!(2, c.siz());
        assert_eq!(vec![4.0, 5.0, 6.0], c.point(1).to_vec());
        assert_eq!(vec![1.0, 4.0], c.to_rows()[0]);
    }

    #[test]
    fn rows_of_unequal_length_are_rejected() {
        let res = Curve::from_rows(&[vec![1.0, 2.0], vec![1.0]]);
        assert!(matches!(res, Err(CcThicknessError::ShapeMismatch(_))));
    }

    #[test]
    fn joined_curve_reverses_the_bottom() {
        let top = Curve::from_points(&[[0.0, 1.0], [1.0, 1.0]]);
        let bot = Curve::from_points(&[[0.0, 0.0], [1.0, 0.0]]);
        let joined = Curve::joined(&top, &bot).unwrap();
        assert_eq!(4, joined.siz());
        assert_eq!(vec![0.0, 1.0, 1.0, 0.0], joined.to_rows()[0]);
        assert_eq!(vec![1.0, 1.0, 0.0, 0.0], joined.to_rows()[1]);
    }

    #[test]
    fn joining_curves_of_different_dimension_fails() {
        let top = Curve::from_points(&[[0.0, 1.0]]);
        let bot = Curve::from_points(&[[0.0, 0.0, 0.0]]);
        assert!(Curve::joined(&top, &bot).is_err());
    }
}
