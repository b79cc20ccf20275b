//! Versioned JSON snapshots of a subject's pipeline state.

use serde::{Deserialize, Serialize};

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{CcThicknessError, Result};
use crate::matching::MatchSettings;
use crate::pipeline::{ArtifactPaths, SubjectRecord};

pub const SNAPSHOT_VERSION: u32 = 1;


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotArtifacts {
    pub thickness_values: PathBuf,
    pub adjusted_ucf: PathBuf,
    pub native_ucf: PathBuf,
    pub plot: Option<PathBuf>,
}


/// Everything needed to inspect a finished subject run. Curves are stored as per-axis rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectSnapshot {
    pub version: u32,
    pub subject_id: String,
    pub top_path: PathBuf,
    pub bottom_path: PathBuf,
    pub settings: MatchSettings,
    pub template_id: Option<String>,
    pub plane_axis: usize,
    pub plane_top_values: Vec<f64>,
    pub plane_bottom_values: Vec<f64>,
    pub gamma: Vec<f64>,
    pub top: Vec<Vec<f64>>,
    pub bottom: Vec<Vec<f64>>,
    pub bottom_adjusted: Vec<Vec<f64>>,
    pub naive_thickness: Vec<f64>,
    pub thickness: Vec<f64>,
    pub mean_naive: f64,
    pub mean_adjusted: f64,
    /// `None` when both means are zero.
    pub percent_difference: Option<f64>,
    pub artifacts: SnapshotArtifacts,
}

impl SubjectSnapshot {
    pub fn from_record(record: &SubjectRecord, paths: &ArtifactPaths) -> SubjectSnapshot {
        let descriptor = &record.plane.descriptor;
        SubjectSnapshot {
            version: SNAPSHOT_VERSION,
            subject_id: record.input.id.clone(),
            top_path: record.input.top_path.clone(),
            bottom_path: record.input.bottom_path.clone(),
            settings: record.settings.clone(),
            template_id: record.template_id.clone(),
            plane_axis: descriptor.axis,
            plane_top_values: descriptor.top_values.to_vec(),
            plane_bottom_values: descriptor.bottom_values.to_vec(),
            gamma: record.gamma.to_vec(),
            top: record.plane.top.to_rows(),
            bottom: record.plane.bottom.to_rows(),
            bottom_adjusted: record.bottom_adjusted.to_rows(),
            naive_thickness: record.thickness.naive.to_vec(),
            thickness: record.thickness.adjusted.to_vec(),
            mean_naive: record.thickness.mean_naive(),
            mean_adjusted: record.thickness.mean_adjusted(),
            percent_difference: record.thickness.percent_difference(),
            artifacts: SnapshotArtifacts {
                thickness_values: paths.thickness_values.clone(),
                adjusted_ucf: paths.adjusted_ucf.clone(),
                native_ucf: paths.native_ucf.clone(),
                plot: paths.plot.clone(),
            },
        }
    }
}


pub fn write_snapshot<P: AsRef<Path>>(path: P, snapshot: &SubjectSnapshot) -> Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut file, snapshot)?;
    file.flush()?;
    Ok(())
}


/// Read a snapshot, rejecting any format version other than [`SNAPSHOT_VERSION`].
pub fn read_snapshot<P: AsRef<Path>>(path: P) -> Result<SubjectSnapshot> {
    let file = BufReader::new(File::open(path)?);
    let value: serde_json::Value = serde_json::from_reader(file)?;
    let version = value.get("version").and_then(|v| v.as_u64()).unwrap_or(0) as u32;
    if version != SNAPSHOT_VERSION {
        return Err(CcThicknessError::UnsupportedSnapshotVersion(version));
    }
    Ok(serde_json::from_value(value)?)
}
