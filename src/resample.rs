//! Resampling of curves, along a correspondence (gamma) or uniformly along arc length.

use ndarray::{Array1, Array2};
use std::f64::consts::PI;

use crate::curve::Curve;
use crate::error::{CcThicknessError, Result};


/// The native parameter grid of a curve with `siz` samples: `2*pi*i/siz` for `i in 0..siz`.
pub fn uniform_grid(siz: usize) -> Array1<f64> {
    Array1::from_shape_fn(siz, |i| 2.0 * PI * i as f64 / siz as f64)
}


/// Piecewise linear interpolation of `(xp, fp)` at `x`. `xp` must be increasing.
/// Queries outside `xp` are clamped to the first or last value of `fp`.
pub fn interp(x: f64, xp: &[f64], fp: &[f64]) -> f64 {
    let n = xp.len();
    if n == 0 || x.is_nan() {
        return f64::NAN;
    }
    if x <= xp[0] {
        return fp[0];
    }
    if x >= xp[n - 1] {
        return fp[n - 1];
    }
    // first index with xp[hi] > x; 1 <= hi <= n - 1
    let hi = xp.partition_point(|&v| v <= x);
    let lo = hi - 1;
    let span = xp[hi] - xp[lo];
    if span == 0.0 {
        return fp[hi];
    }
    fp[lo] + (x - xp[lo]) * (fp[hi] - fp[lo]) / span
}


/// Re-express `curve` at the parameter positions given by `gamma`.
pub fn resample_by_gamma(curve: &Curve, gamma: &Array1<f64>) -> Result<Curve> {
    let siz = curve.siz();
    if gamma.len() != siz {
        return Err(CcThicknessError::ShapeMismatch(format!(
            "gamma has {} values for a curve with {} samples",
            gamma.len(),
            siz
        )));
    }
    if let Some(i) = gamma.iter().position(|g| !g.is_finite()) {
        return Err(CcThicknessError::InvalidCorrespondence(format!(
            "gamma value {} at index {} is not finite",
            gamma[i], i
        )));
    }
    let grid = uniform_grid(siz).to_vec();
    let mut coords = Array2::zeros((curve.dim(), siz));
    for (d, row) in curve.coords.outer_iter().enumerate() {
        let fp = row.to_vec();
        for (i, &g) in gamma.iter().enumerate() {
            coords[[d, i]] = interp(g, &grid, &fp);
        }
    }
    Ok(Curve::new(coords))
}


/// Resample `curve` to `siz` points evenly spaced along its arc length.
/// For closed curves the segment from the last point back to the first is part of the curve.
pub fn resample_arclength(curve: &Curve, siz: usize, closed: bool) -> Result<Curve> {
    let n = curve.siz();
    if n == 0 || siz == 0 {
        return Err(CcThicknessError::ShapeMismatch(String::from(
            "cannot resample an empty curve",
        )));
    }
    let num_nodes = if closed { n + 1 } else { n };
    let node = |k: usize| curve.point(k % n);

    let mut cumulative = Vec::with_capacity(num_nodes);
    cumulative.push(0.0);
    for k in 1..num_nodes {
        let a = node(k - 1);
        let b = node(k);
        let seg = a
            .iter()
            .zip(b.iter())
            .map(|(p, q)| (q - p) * (q - p))
            .sum::<f64>()
            .sqrt();
        cumulative.push(cumulative[k - 1] + seg);
    }
    let total = cumulative[num_nodes - 1];
    if !total.is_finite() {
        return Err(CcThicknessError::ShapeMismatch(String::from(
            "curve length is not finite",
        )));
    }

    let step = if closed {
        total / siz as f64
    } else if siz > 1 {
        total / (siz - 1) as f64
    } else {
        0.0
    };

    let mut coords = Array2::zeros((curve.dim(), siz));
    for d in 0..curve.dim() {
        let fp: Vec<f64> = (0..num_nodes).map(|k| curve.coords[[d, k % n]]).collect();
        for i in 0..siz {
            coords[[d, i]] = interp(step * i as f64, &cumulative, &fp);
        }
    }
    Ok(Curve::new(coords))
}


#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn interpolation_clamps_outside_the_grid() {
        let xp = [0.0, 1.0, 2.0];
        let fp = [10.0, 20.0, 40.0];
        assert_eq!(10.0, interp(-1.0, &xp, &fp));
        assert_eq!(40.0, interp(3.0, &xp, &fp));
        assert_abs_diff_eq!(15.0, interp(0.5, &xp, &fp));
        assert_abs_diff_eq!(30.0, interp(1.5, &xp, &fp));
        assert_abs_diff_eq!(20.0, interp(1.0, &xp, &fp));
    }

    #[test]
    fn interpolation_at_nan_yields_nan() {
        assert!(interp(f64::NAN, &[0.0, 1.0], &[0.0, 1.0]).is_nan());
    }

    #[test]
    fn non_finite_gamma_is_rejected() {
        let curve = Curve::from_points(&[[0.0], [2.0], [4.0]]);
        let mut gamma = uniform_grid(3);
        gamma[1] = f64::NAN;
        let res = resample_by_gamma(&curve, &gamma);
        assert!(matches!(res, Err(CcThicknessError::InvalidCorrespondence(_))));
    }

    #[test]
    fn curves_of_infinite_length_cannot_be_resampled() {
        let curve = Curve::from_points(&[[0.0, 0.0], [f64::INFINITY, 0.0]]);
        assert!(resample_arclength(&curve, 4, false).is_err());
    }

    #[test]
    fn the_native_grid_reproduces_the_curve() {
        let curve = Curve::from_points(&[[0.0, 1.0], [2.0, 3.0], [5.0, -1.0], [7.0, 0.5], [8.0, 2.0]]);
        let res = resample_by_gamma(&curve, &uniform_grid(curve.siz())).unwrap();
        assert_abs_diff_eq!(curve.coords, res.coords, epsilon = 1e-12);
    }

    #[test]
    fn half_step_gamma_yields_midpoints() {
        let curve = Curve::from_points(&[[0.0], [2.0], [4.0], [6.0]]);
        let gamma = uniform_grid(4).mapv(|g| g + PI / 4.0);
        let res = resample_by_gamma(&curve, &gamma).unwrap();
        assert_abs_diff_eq!(Array1::from(vec![1.0, 3.0, 5.0, 6.0]), res.coords.row(0).to_owned(), epsilon = 1e-12);
    }

    #[test]
    fn gamma_of_wrong_length_is_rejected() {
        let curve = Curve::from_points(&[[0.0], [2.0]]);
        assert!(resample_by_gamma(&curve, &uniform_grid(3)).is_err());
    }

    #[test]
    fn open_arclength_resampling_keeps_endpoints() {
        let curve = Curve::from_points(&[[0.0, 0.0], [1.0, 0.0], [4.0, 0.0]]);
        let res = resample_arclength(&curve, 5, false).unwrap();
        assert_abs_diff_eq!(Array1::from(vec![0.0, 1.0, 2.0, 3.0, 4.0]), res.coords.row(0).to_owned(), epsilon = 1e-12);
    }

    #[test]
    fn closed_arclength_resampling_walks_the_whole_loop() {
        let square = Curve::from_points(&[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]);
        let res = resample_arclength(&square, 8, true).unwrap();
        assert_eq!(8, res.siz());
        assert_abs_diff_eq!(0.5, res.coords[[0, 1]], epsilon = 1e-12);
        assert_abs_diff_eq!(0.5, res.coords[[1, 3]], epsilon = 1e-12);
        assert_abs_diff_eq!(0.5, res.coords[[1, 7]], epsilon = 1e-12);
    }
}
