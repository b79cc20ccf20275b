//! Closed-loop, full-dimension thickness boundaries for export.

use ndarray::{Array1, Array2};

use std::path::{Path, PathBuf};

use crate::curve::Curve;
use crate::error::{CcThicknessError, Result};
use crate::plane::{reinsert, PlaneDescriptor};
use crate::ucf::write_ucf;

pub const THICKNESS_ATTRIBUTE: &str = "thickness";


/// Which bottom curve the exported boundary runs along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BottomVariant {
    /// The bottom curve resampled along the correspondence.
    Adjusted,
    /// The bottom curve as returned by the matcher.
    Native,
}

impl BottomVariant {
    pub fn file_suffix(&self) -> &'static str {
        match self {
            BottomVariant::Adjusted => "_adjusted_thickness.ucf",
            BottomVariant::Native => "_native_thickness.ucf",
        }
    }

    pub fn file_name(&self, subject: &str) -> String {
        format!("{}{}", subject, self.file_suffix())
    }
}


/// A closed 3D boundary with one thickness value per vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct ThicknessBoundary {
    pub coords: Array2<f64>,
    pub thickness: Array1<f64>,
}


/// Assemble the closed boundary: top forward, then `bottom` reversed, with the plane axis
/// reinserted from `descriptor`. The thickness is mirrored the same way.
pub fn assemble(top: &Curve, bottom: &Curve, descriptor: &PlaneDescriptor, thickness: &Array1<f64>) -> Result<ThicknessBoundary> {
    if thickness.len() != top.siz() {
        return Err(CcThicknessError::ShapeMismatch(format!(
            "{} thickness values for {} samples",
            thickness.len(),
            top.siz()
        )));
    }
    let top_full = reinsert(top, descriptor.axis, &descriptor.top_values)?;
    let bottom_full = reinsert(bottom, descriptor.axis, &descriptor.bottom_values)?;
    let joined = Curve::joined(&top_full, &bottom_full)?;

    let n = thickness.len();
    let mirrored = Array1::from_shape_fn(2 * n, |i| if i < n { thickness[i] } else { thickness[2 * n - 1 - i] });

    Ok(ThicknessBoundary { coords: joined.coords, thickness: mirrored })
}


/// Write the boundary as `<dir>/<subject><suffix>` and return the path.
pub fn write_boundary<P: AsRef<Path>>(dir: P, subject: &str, variant: BottomVariant, boundary: &ThicknessBoundary) -> Result<PathBuf> {
    let path = dir.as_ref().join(variant.file_name(subject));
    let values = boundary.thickness.to_vec();
    write_ucf(&path, &boundary.coords, Some((THICKNESS_ATTRIBUTE, values.as_slice())))?;
    Ok(path)
}


#[cfg(test)]
mod test {
    use super::*;
    use crate::plane::reduce_to_plane;
    use crate::ucf::read_ucf;

    fn reduced() -> crate::plane::PlaneReduction {
        let top = Curve::from_points(&[[0.0, 5.0, 3.0], [1.0, 5.0, 4.0], [2.0, 5.0, 3.0]]);
        let bottom = Curve::from_points(&[[0.5, 5.1, 0.0], [1.5, 4.9, 1.0], [2.5, 5.0, 0.0]]);
        reduce_to_plane(&top, &bottom).unwrap()
    }

    #[test]
    fn the_boundary_is_closed_and_full_dimensional() {
        let red = reduced();
        assert_eq!(1, red.descriptor.axis);
        let thickness = Array1::from(vec![3.0, 3.0, 3.0]);
        let b = assemble(&red.top, &red.bottom, &red.descriptor, &thickness).unwrap();
        assert_eq!((3, 6), b.coords.dim());
        assert_eq!(vec![0.0, 5.0, 3.0], b.coords.column(0).to_vec());
        assert_eq!(vec![2.5, 5.0, 0.0], b.coords.column(3).to_vec());
        assert_eq!(vec![0.5, 5.1, 0.0], b.coords.column(5).to_vec());
    }

    #[test]
    fn the_thickness_field_is_mirrored() {
        let red = reduced();
        let thickness = Array1::from(vec![1.0, 2.0, 3.0]);
        let b = assemble(&red.top, &red.bottom, &red.descriptor, &thickness).unwrap();
        assert_eq!(vec![1.0, 2.0, 3.0, 3.0, 2.0, 1.0], b.thickness.to_vec());
    }

    #[test]
    fn variants_are_written_under_subject_prefixed_names() {
        let dir = tempfile::tempdir().unwrap();
        let red = reduced();
        let thickness = Array1::from(vec![1.0, 2.0, 3.0]);
        let b = assemble(&red.top, &red.bottom, &red.descriptor, &thickness).unwrap();
        let path = write_boundary(dir.path(), "S7", BottomVariant::Native, &b).unwrap();
        assert!(path.ends_with("S7_native_thickness.ucf"));
        let ucf = read_ucf(&path).unwrap();
        assert_eq!(b.coords, ucf.curve.coords);
        let (name, values) = ucf.attribute.unwrap();
        assert_eq!(THICKNESS_ATTRIBUTE, name);
        assert_eq!(b.thickness.to_vec(), values);
    }

    #[test]
    fn thickness_of_wrong_length_is_rejected() {
        let red = reduced();
        let res = assemble(&red.top, &red.bottom, &red.descriptor, &Array1::from(vec![1.0]));
        assert!(res.is_err());
    }
}
