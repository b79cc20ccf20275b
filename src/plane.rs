//! Reduction of a near-planar 3D curve pair to 2D.
//!
//! Top and bottom callosal boundaries are segmented on the same slice, so one coordinate axis
//! is (nearly) shared by both curves. That axis is stripped before the thickness computation
//! and reinserted when the results are exported.

use ndarray::{Array1, Array2, Axis};
use ndarray_stats::QuantileExt;
use tracing::debug;

use crate::curve::Curve;
use crate::error::{CcThicknessError, Result};

/// Maximal accepted difference of the per-axis coordinate sums on the shared plane axis.
pub const PLANE_TOLERANCE: f64 = 1.0;


/// The removed plane axis and the original values of both curves along it.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneDescriptor {
    pub axis: usize,
    pub top_values: Array1<f64>,
    pub bottom_values: Array1<f64>,
}


/// The 2D curves resulting from a plane reduction.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneReduction {
    pub top: Curve,
    pub bottom: Curve,
    pub descriptor: PlaneDescriptor,
}


/// Per-axis `|sum(top[d]) - sum(bottom[d])|`.
pub fn axis_differences(top: &Curve, bottom: &Curve) -> Array1<f64> {
    (top.coords.sum_axis(Axis(1)) - bottom.coords.sum_axis(Axis(1))).mapv(f64::abs)
}


/// Find the shared plane axis of the curve pair and strip it from both curves.
pub fn reduce_to_plane(top: &Curve, bottom: &Curve) -> Result<PlaneReduction> {
    if top.dim() != bottom.dim() || top.siz() != bottom.siz() {
        return Err(CcThicknessError::ShapeMismatch(format!(
            "top curve is {}x{}, bottom curve is {}x{}",
            top.dim(),
            top.siz(),
            bottom.dim(),
            bottom.siz()
        )));
    }
    let diffs = axis_differences(top, bottom);
    let axis = diffs
        .argmin()
        .map_err(|e| CcThicknessError::ShapeMismatch(format!("no plane axis: {}", e)))?;
    let min_diff = diffs[axis];
    if min_diff > PLANE_TOLERANCE {
        return Err(CcThicknessError::NotCoplanar(min_diff));
    }
    debug!("Plane axis {} selected, axis differences {:?}", axis, diffs.to_vec());

    let kept: Vec<usize> = (0..top.dim()).filter(|&d| d != axis).collect();
    let descriptor = PlaneDescriptor {
        axis,
        top_values: top.coords.row(axis).to_owned(),
        bottom_values: bottom.coords.row(axis).to_owned(),
    };
    Ok(PlaneReduction {
        top: Curve::new(top.coords.select(Axis(0), &kept)),
        bottom: Curve::new(bottom.coords.select(Axis(0), &kept)),
        descriptor,
    })
}


/// Insert `values` as row `axis` into the curve, shifting the following rows down.
pub fn reinsert(curve: &Curve, axis: usize, values: &Array1<f64>) -> Result<Curve> {
    if values.len() != curve.siz() || axis > curve.dim() {
        return Err(CcThicknessError::ShapeMismatch(format!(
            "cannot insert {} values at axis {} into a {}x{} curve",
            values.len(),
            axis,
            curve.dim(),
            curve.siz()
        )));
    }
    let coords = Array2::from_shape_fn((curve.dim() + 1, curve.siz()), |(d, i)| {
        if d < axis {
            curve.coords[[d, i]]
        } else if d == axis {
            values[i]
        } else {
            curve.coords[[d - 1, i]]
        }
    });
    Ok(Curve::new(coords))
}


#[cfg(test)]
mod test {
    use super::*;

    fn slice_pair() -> (Curve, Curve) {
        let top = Curve::from_points(&[[0.0, 3.0, 0.0], [1.0, 4.0, 0.0], [2.0, 4.5, 0.0], [3.0, 3.5, 0.0]]);
        let bottom = Curve::from_points(&[[1.5, 0.0, 0.01], [2.5, 1.0, -0.01], [3.5, 1.5, 0.02], [4.5, 0.5, 0.0]]);
        (top, bottom)
    }

    #[test]
    fn the_near_constant_axis_is_detected() {
        let (top, bottom) = slice_pair();
        let red = reduce_to_plane(&top, &bottom).unwrap();
        assert_eq!(2, red.descriptor.axis);
        assert_eq!(2, red.top.dim());
        assert_eq!(4, red.top.siz());
        assert_eq!(vec![0.01, -0.01, 0.02, 0.0], red.descriptor.bottom_values.to_vec());
        assert_eq!(top.coords.row(1), red.top.coords.row(1));
    }

    #[test]
    fn curves_from_different_planes_are_rejected() {
        let top = Curve::from_points(&[[0.0, 0.0, 0.0], [1.0, 1.0, 0.0]]);
        let bottom = Curve::from_points(&[[2.0, 2.0, 2.0], [3.0, 3.0, 3.0]]);
        let err = reduce_to_plane(&top, &bottom).unwrap_err();
        assert!(matches!(err, CcThicknessError::NotCoplanar(_)));
        assert!(err.is_input_validation());
    }

    #[test]
    fn reinsertion_restores_the_original_curves() {
        let (top, bottom) = slice_pair();
        let red = reduce_to_plane(&top, &bottom).unwrap();
        let d = &red.descriptor;
        assert_eq!(top, reinsert(&red.top, d.axis, &d.top_values).unwrap());
        assert_eq!(bottom, reinsert(&red.bottom, d.axis, &d.bottom_values).unwrap());
    }

    #[test]
    fn reinsertion_at_the_first_axis_shifts_rows() {
        let flat = Curve::from_points(&[[1.0, 2.0]]);
        let full = reinsert(&flat, 0, &Array1::from(vec![9.0])).unwrap();
        assert_eq!(vec![9.0, 1.0, 2.0], full.point(0).to_vec());
    }
}
