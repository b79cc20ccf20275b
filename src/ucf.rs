// Functions for reading and writing BrainSuite-style 'ucf' contour files.
// These text files store one or more levels of 3D contour points, optionally with
// one scalar attribute value (like thickness) per point.


use flate2::bufread::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use ndarray::Array2;

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::curve::Curve;
use crate::error::{CcThicknessError, Result};
use crate::util::is_gz_file;

pub const UCF_CONTOUR_DATA_TAG: &str = "<contour_data=>";
pub const UCF_POINT_NUM_TAG: &str = "<point_num=>";
pub const UCF_ATTRIBUTE_TAG: &str = "<attribute=>";


/// A contour read from a UCF file, plus its optional named per-point attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct UcfCurve {
    pub curve: Curve,
    pub attribute: Option<(String, Vec<f64>)>,
}


/// Read a UCF file. Files ending in ".gz" are decoded first.
pub fn read_ucf<P: AsRef<Path>>(path: P) -> Result<UcfCurve> {
    UcfCurve::from_file(path)
}


/// Write a UCF file with a single level. Paths ending in ".gz" are written gzip-compressed.
///
/// `coords` must have 3 rows. If an attribute is given, it needs one value per point.
pub fn write_ucf<P: AsRef<Path>>(path: P, coords: &Array2<f64>, attribute: Option<(&str, &[f64])>) -> Result<()> {
    let gz = is_gz_file(&path);
    let file = BufWriter::new(File::create(path)?);
    if gz {
        let mut enc = GzEncoder::new(file, Compression::default());
        write_ucf_to(&mut enc, coords, attribute)?;
        enc.finish()?.flush()?;
        Ok(())
    } else {
        let mut file = file;
        write_ucf_to(&mut file, coords, attribute)?;
        file.flush()?;
        Ok(())
    }
}


/// Write the UCF representation of the contour to the given output.
pub fn write_ucf_to<W: Write>(out: &mut W, coords: &Array2<f64>, attribute: Option<(&str, &[f64])>) -> Result<()> {
    if coords.nrows() != 3 {
        return Err(CcThicknessError::ShapeMismatch(format!(
            "UCF contours need 3 coordinate rows, got {}",
            coords.nrows()
        )));
    }
    let num_points = coords.ncols();
    if let Some((_, values)) = attribute {
        if values.len() != num_points {
            return Err(CcThicknessError::ShapeMismatch(format!(
                "attribute has {} values for {} points",
                values.len(),
                num_points
            )));
        }
    }

    let range = |d: usize| {
        let row = coords.row(d);
        let lo = row.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = row.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        if num_points == 0 { (0.0, 0.0) } else { (lo, hi) }
    };
    let (x0, x1) = range(0);
    let (y0, y1) = range(1);
    let (z0, z1) = range(2);

    writeln!(out, "<width=>")?;
    writeln!(out, "{} {}", (x1 - x0).ceil(), (y1 - y0).ceil())?;
    writeln!(out, "<xrange=>")?;
    writeln!(out, "{} {}", x0, x1)?;
    writeln!(out, "<yrange=>")?;
    writeln!(out, "{} {}", y0, y1)?;
    writeln!(out, "<zrange=>")?;
    writeln!(out, "{} {}", z0, z1)?;
    if let Some((name, _)) = attribute {
        writeln!(out, "{}", UCF_ATTRIBUTE_TAG)?;
        writeln!(out, "{}", name)?;
    }
    writeln!(out, "<levels>")?;
    writeln!(out, "1")?;
    writeln!(out, "<level number=>")?;
    writeln!(out, "0")?;
    writeln!(out, "{}", UCF_POINT_NUM_TAG)?;
    writeln!(out, "{}", num_points)?;
    writeln!(out, "{}", UCF_CONTOUR_DATA_TAG)?;
    for i in 0..num_points {
        write!(out, "{} {} {}", coords[[0, i]], coords[[1, i]], coords[[2, i]])?;
        if let Some((_, values)) = attribute {
            write!(out, " {}", values[i])?;
        }
        writeln!(out)?;
    }
    Ok(())
}


fn invalid(reason: impl Into<String>) -> CcThicknessError {
    CcThicknessError::InvalidUcfFormat(reason.into())
}


impl UcfCurve {

    /// Read a UCF contour from a file.
    /// If the file's name ends with ".gz", the file is assumed to need GZip decoding.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<UcfCurve> {
        let gz = is_gz_file(&path);
        let file = BufReader::new(File::open(path)?);
        if gz {
            UcfCurve::from_reader(BufReader::new(GzDecoder::new(file)))
        } else {
            UcfCurve::from_reader(file)
        }
    }


    /// Parse a UCF contour from the given text stream. The points of all levels are concatenated.
    pub fn from_reader<S>(input: S) -> Result<UcfCurve>
    where
        S: BufRead,
    {
        let mut lines = Vec::new();
        for line in input.lines() {
            let line = line?;
            let trimmed = line.trim();
            if !trimmed.is_empty() && !trimmed.starts_with('#') {
                lines.push(trimmed.to_string());
            }
        }

        let mut attribute_name: Option<String> = None;
        let mut pending_points: Option<usize> = None;
        let mut points: Vec<[f64; 3]> = Vec::new();
        let mut values: Vec<f64> = Vec::new();
        let mut saw_contour = false;

        let mut idx = 0;
        while idx < lines.len() {
            let line = &lines[idx];
            idx += 1;
            if line == UCF_ATTRIBUTE_TAG {
                let name = lines.get(idx).ok_or_else(|| invalid("attribute tag without a name"))?;
                attribute_name = Some(name.clone());
                idx += 1;
            } else if line == UCF_POINT_NUM_TAG {
                let count = lines.get(idx).ok_or_else(|| invalid("point count missing"))?;
                let count = count
                    .parse::<usize>()
                    .map_err(|_| invalid(format!("invalid point count '{}'", count)))?;
                pending_points = Some(count);
                idx += 1;
            } else if line == UCF_CONTOUR_DATA_TAG {
                saw_contour = true;
                let expected_cols = if attribute_name.is_some() { 4 } else { 3 };
                let mut read = 0;
                while idx < lines.len() && !lines[idx].starts_with('<') {
                    if let Some(count) = pending_points {
                        if read == count {
                            break;
                        }
                    }
                    let fields = lines[idx]
                        .split_whitespace()
                        .map(|f| f.parse::<f64>())
                        .collect::<std::result::Result<Vec<f64>, _>>()
                        .map_err(|_| invalid(format!("invalid number in line '{}'", lines[idx])))?;
                    if fields.iter().any(|v| !v.is_finite()) {
                        return Err(invalid(format!("non-finite number in line '{}'", lines[idx])));
                    }
                    if fields.len() != expected_cols {
                        return Err(invalid(format!(
                            "expected {} columns, got {} in line '{}'",
                            expected_cols,
                            fields.len(),
                            lines[idx]
                        )));
                    }
                    points.push([fields[0], fields[1], fields[2]]);
                    if expected_cols == 4 {
                        values.push(fields[3]);
                    }
                    read += 1;
                    idx += 1;
                }
                if let Some(count) = pending_points.take() {
                    if read != count {
                        return Err(invalid(format!("expected {} points, found {}", count, read)));
                    }
                }
            }
        }

        if !saw_contour {
            return Err(invalid("no contour data block"));
        }

        Ok(UcfCurve {
            curve: Curve::from_points(&points),
            attribute: attribute_name.map(|name| (name, values)),
        })
    }
}
