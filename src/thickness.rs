//! Naive and correspondence-adjusted thickness of a curve pair.

use ndarray::{Array1, Axis};

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::curve::Curve;
use crate::error::{CcThicknessError, Result};

/// Sums of means at or below this value make the percent difference undefined.
pub const DEGENERACY_EPSILON: f64 = 1e-12;


/// Per-sample thickness values, index-matched (`naive`) and after the correspondence (`adjusted`).
#[derive(Debug, Clone, PartialEq)]
pub struct ThicknessResult {
    pub naive: Array1<f64>,
    pub adjusted: Array1<f64>,
}


/// Per-sample Euclidean distance between two curves of equal shape.
pub fn pointwise_distance(a: &Curve, b: &Curve) -> Result<Array1<f64>> {
    if a.dim() != b.dim() || a.siz() != b.siz() {
        return Err(CcThicknessError::ShapeMismatch(format!(
            "cannot measure distances between a {}x{} and a {}x{} curve",
            a.dim(),
            a.siz(),
            b.dim(),
            b.siz()
        )));
    }
    let diff = &a.coords - &b.coords;
    Ok(diff.mapv(|v| v * v).sum_axis(Axis(0)).mapv(f64::sqrt))
}


/// Compute the naive and the adjusted thickness of the top curve against the bottom curve.
pub fn compute_thickness(top: &Curve, bottom: &Curve, bottom_adjusted: &Curve) -> Result<ThicknessResult> {
    Ok(ThicknessResult {
        naive: pointwise_distance(top, bottom)?,
        adjusted: pointwise_distance(top, bottom_adjusted)?,
    })
}


/// `100 * (a - b) / (0.5 * (a + b))`, or `None` if both values are (near) zero.
pub fn percent_difference(a: f64, b: f64) -> Option<f64> {
    let denominator = 0.5 * (a + b);
    if denominator.abs() <= DEGENERACY_EPSILON {
        None
    } else {
        Some(100.0 * (a - b) / denominator)
    }
}


/// Mean of the values, 0 for an empty sequence.
fn mean(values: &Array1<f64>) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.sum() / values.len() as f64
    }
}


impl ThicknessResult {
    pub fn mean_naive(&self) -> f64 {
        mean(&self.naive)
    }

    pub fn mean_adjusted(&self) -> f64 {
        mean(&self.adjusted)
    }

    /// Relative difference of the naive mean to the adjusted mean, in percent.
    pub fn percent_difference(&self) -> Option<f64> {
        percent_difference(self.mean_naive(), self.mean_adjusted())
    }

    pub fn summary<'a>(&self, subject: &'a str) -> ThicknessSummary<'a> {
        ThicknessSummary {
            subject,
            mean_naive: self.mean_naive(),
            mean_adjusted: self.mean_adjusted(),
            percent_difference: self.percent_difference(),
        }
    }
}


/// Human-readable summary of one subject's thickness results.
#[derive(Debug, Clone, PartialEq)]
pub struct ThicknessSummary<'a> {
    pub subject: &'a str,
    pub mean_naive: f64,
    pub mean_adjusted: f64,
    pub percent_difference: Option<f64>,
}

impl fmt::Display for ThicknessSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.subject)?;
        writeln!(f, "Naive: {}", self.mean_naive)?;
        writeln!(f, "Gamma: {}", self.mean_adjusted)?;
        match self.percent_difference {
            Some(p) => write!(f, "% Difference: {}", p),
            None => write!(f, "% Difference: undefined"),
        }
    }
}


/// Write one value per line.
pub fn write_thickness_values<P: AsRef<Path>>(path: P, values: &Array1<f64>) -> Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    for v in values.iter() {
        writeln!(file, "{:e}", v)?;
    }
    file.flush()?;
    Ok(())
}
