//! The per-subject thickness pipeline.
//!
//! Every stage consumes the value produced by the previous one:
//! load -> match -> plane reduction -> gamma resampling -> thickness -> export assembly.
//! The resulting [`SubjectRecord`] is built once, after the last stage.

use ndarray::Array1;
use tracing::info;

use std::path::{Path, PathBuf};

use crate::curve::Curve;
use crate::error::{CcThicknessError, Result};
use crate::export::{assemble, write_boundary, BottomVariant, ThicknessBoundary};
use crate::matching::{CurveMatcher, MatchSettings, TemplateReference};
use crate::plane::{reduce_to_plane, PlaneReduction};
use crate::plot::plot_thicknesses;
use crate::resample::resample_by_gamma;
use crate::snapshot::{write_snapshot, SubjectSnapshot};
use crate::thickness::{compute_thickness, write_thickness_values, ThicknessResult};
use crate::ucf::read_ucf;


/// A subject id and the paths of its top and bottom boundary curves.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectInput {
    pub id: String,
    pub top_path: PathBuf,
    pub bottom_path: PathBuf,
}

impl SubjectInput {
    pub fn new<S: Into<String>, P: Into<PathBuf>, Q: Into<PathBuf>>(id: S, top_path: P, bottom_path: Q) -> SubjectInput {
        SubjectInput { id: id.into(), top_path: top_path.into(), bottom_path: bottom_path.into() }
    }

    /// Fail if the top or the bottom curve file does not exist.
    pub fn check_files(&self) -> Result<()> {
        for path in &[&self.top_path, &self.bottom_path] {
            if !path.is_file() {
                return Err(CcThicknessError::MissingCurveFile(self.id.clone(), path.to_path_buf()));
            }
        }
        Ok(())
    }
}


/// The complete pipeline state of one subject.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectRecord {
    pub input: SubjectInput,
    pub settings: MatchSettings,
    pub template_id: Option<String>,
    pub gamma: Array1<f64>,
    /// The matched 2D curves and the removed plane axis.
    pub plane: PlaneReduction,
    /// The 2D bottom curve resampled along `gamma`.
    pub bottom_adjusted: Curve,
    pub thickness: ThicknessResult,
    pub adjusted_boundary: ThicknessBoundary,
    pub native_boundary: ThicknessBoundary,
}

impl SubjectRecord {
    pub fn id(&self) -> &str {
        &self.input.id
    }

    /// Closed 2D boundary: top forward, then the adjusted (`elastic`) or native bottom reversed.
    pub fn joined_curve(&self, elastic: bool) -> Result<Curve> {
        let bottom = if elastic { &self.bottom_adjusted } else { &self.plane.bottom };
        Curve::joined(&self.plane.top, bottom)
    }

    /// This subject as the group template for a cohort.
    pub fn template_reference(&self, elastic: bool) -> Result<TemplateReference> {
        Ok(TemplateReference {
            subject_id: self.input.id.clone(),
            joined: self.joined_curve(elastic)?,
            gamma: self.gamma.clone(),
        })
    }

    pub fn boundary(&self, variant: BottomVariant) -> &ThicknessBoundary {
        match variant {
            BottomVariant::Adjusted => &self.adjusted_boundary,
            BottomVariant::Native => &self.native_boundary,
        }
    }
}


/// Run the thickness pipeline for one subject.
pub fn run_subject(
    input: &SubjectInput,
    settings: &MatchSettings,
    matcher: &dyn CurveMatcher,
    reference: Option<&TemplateReference>,
) -> Result<SubjectRecord> {
    info!("Processing subject '{}'.", input.id);
    let top = read_ucf(&input.top_path)?.curve;
    let bottom = read_ucf(&input.bottom_path)?.curve;

    let matched = matcher.match_pair(&top, &bottom, settings, reference)?;
    let plane = reduce_to_plane(&matched.top, &matched.bottom)?;
    let bottom_adjusted = resample_by_gamma(&plane.bottom, &matched.gamma)?;
    let thickness = compute_thickness(&plane.top, &plane.bottom, &bottom_adjusted)?;

    let summary = thickness.summary(&input.id);
    println!("{}\n", summary);
    info!(
        "Subject '{}': naive {:.4}, adjusted {:.4}, difference {:?} %.",
        input.id, summary.mean_naive, summary.mean_adjusted, summary.percent_difference
    );

    let adjusted_boundary = assemble(&plane.top, &bottom_adjusted, &plane.descriptor, &thickness.adjusted)?;
    let native_boundary = assemble(&plane.top, &plane.bottom, &plane.descriptor, &thickness.adjusted)?;

    Ok(SubjectRecord {
        input: input.clone(),
        settings: settings.clone(),
        template_id: reference.map(|t| t.subject_id.clone()),
        gamma: matched.gamma,
        plane,
        bottom_adjusted,
        thickness,
        adjusted_boundary,
        native_boundary,
    })
}


/// Which optional artifacts to write.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArtifactOptions {
    pub plot: bool,
    /// Add the index-matched panel to the plot.
    pub include_naive_plot: bool,
}

impl Default for ArtifactOptions {
    fn default() -> ArtifactOptions {
        ArtifactOptions { plot: true, include_naive_plot: true }
    }
}


/// Paths of all files written for one subject.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactPaths {
    pub thickness_values: PathBuf,
    pub adjusted_ucf: PathBuf,
    pub native_ucf: PathBuf,
    pub plot: Option<PathBuf>,
    pub snapshot: PathBuf,
}


/// Write the thickness values, both boundary variants, the plot and the state snapshot into `out_dir`.
pub fn write_artifacts<P: AsRef<Path>>(record: &SubjectRecord, out_dir: P, options: ArtifactOptions) -> Result<ArtifactPaths> {
    let out_dir = out_dir.as_ref();
    let id = record.id();

    let thickness_values = out_dir.join(format!("{}_thickness_values.txt", id));
    write_thickness_values(&thickness_values, &record.thickness.adjusted)?;

    let adjusted_ucf = write_boundary(out_dir, id, BottomVariant::Adjusted, record.boundary(BottomVariant::Adjusted))?;
    let native_ucf = write_boundary(out_dir, id, BottomVariant::Native, record.boundary(BottomVariant::Native))?;

    let plot = if options.plot {
        let path = out_dir.join(format!("{}.svg", id));
        plot_thicknesses(&path, record, options.include_naive_plot)?;
        Some(path)
    } else {
        None
    };

    let snapshot = out_dir.join(format!("{}_run_data.json", id));
    let paths = ArtifactPaths { thickness_values, adjusted_ucf, native_ucf, plot, snapshot };
    write_snapshot(&paths.snapshot, &SubjectSnapshot::from_record(record, &paths))?;
    info!("Wrote results for subject '{}' to '{}'.", id, out_dir.display());
    Ok(paths)
}


#[cfg(test)]
mod test {
    use super::*;
    use crate::matching::{LinearMatcher, MatchedPair};
    use crate::resample::uniform_grid;
    use crate::ucf::write_ucf;
    use std::f64::consts::PI;

    /// Linear matching, but with a correspondence shifted by half a sample.
    struct HalfStepMatcher;

    impl CurveMatcher for HalfStepMatcher {
        fn match_pair(&self, top: &Curve, bottom: &Curve, settings: &MatchSettings, _: Option<&TemplateReference>) -> Result<MatchedPair> {
            let pair = LinearMatcher.match_pair(top, bottom, settings, None)?;
            let n = pair.gamma.len();
            Ok(MatchedPair { gamma: uniform_grid(n).mapv(|g| g + PI / n as f64), ..pair })
        }
    }

    fn record(dir: &Path) -> SubjectRecord {
        let top = Curve::from_points(&[[0.0, 2.0, 5.0], [1.0, 2.5, 5.0], [2.0, 2.0, 5.0], [3.0, 3.0, 5.0]]);
        let bottom = Curve::new(top.coords.clone() + &ndarray::arr2(&[[0.2], [-2.0], [0.0]]));
        let input = SubjectInput::new("S1", dir.join("S1_top.ucf"), dir.join("S1_bot.ucf"));
        write_ucf(&input.top_path, &top.coords, None).unwrap();
        write_ucf(&input.bottom_path, &bottom.coords, None).unwrap();
        let settings = MatchSettings { closed: false, elastic: true, rotation: false, resample_size: 4, linear_template: false };
        run_subject(&input, &settings, &HalfStepMatcher, None).unwrap()
    }

    #[test]
    fn the_joined_curve_uses_the_bottom_of_the_requested_mode() {
        let dir = tempfile::tempdir().unwrap();
        let record = record(dir.path());
        assert_eq!(2, record.plane.descriptor.axis);
        assert_ne!(record.plane.bottom, record.bottom_adjusted);

        let elastic = record.joined_curve(true).unwrap();
        let linear = record.joined_curve(false).unwrap();
        assert_eq!(Curve::joined(&record.plane.top, &record.bottom_adjusted).unwrap(), elastic);
        assert_eq!(Curve::joined(&record.plane.top, &record.plane.bottom).unwrap(), linear);
        assert_ne!(elastic, linear);
        assert_eq!(8, elastic.siz());
        assert_eq!(record.bottom_adjusted.point(3), elastic.point(4));
        assert_eq!(record.plane.bottom.point(3), linear.point(4));
    }

    #[test]
    fn the_template_reference_carries_gamma_and_joined_curve() {
        let dir = tempfile::tempdir().unwrap();
        let record = record(dir.path());
        assert_ne!(uniform_grid(4), record.gamma);

        let reference = record.template_reference(true).unwrap();
        assert_eq!("S1", reference.subject_id);
        assert_eq!(record.gamma, reference.gamma);
        assert_eq!(record.joined_curve(true).unwrap(), reference.joined);
        assert_eq!(record.joined_curve(false).unwrap(), record.template_reference(false).unwrap().joined);
    }
}
