//! Thickness of the corpus callosum from segmented top and bottom boundary curves.
//!
//! The thickness is measured between corresponding points of the two curves, where the
//! correspondence comes from a (usually elastic) curve matcher. The crate reduces the
//! near-planar curve pair to 2D, resamples the bottom curve along the correspondence,
//! compares index-matched and correspondence-adjusted thickness and exports closed
//! boundaries carrying the thickness as a per-vertex attribute. Cohorts can be processed
//! in batch, optionally anchored to the correspondence of one template subject.

pub mod cohort;
pub mod curve;
pub mod error;
pub mod export;
pub mod matching;
pub mod pipeline;
pub mod plane;
pub mod plot;
pub mod resample;
pub mod snapshot;
pub mod thickness;
pub mod ucf;
pub mod util;

pub use cohort::{resolve_list, run_cohort, CohortConfig, CohortReport};
pub use curve::Curve;
pub use error::{CcThicknessError, Result};
pub use export::{assemble, BottomVariant, ThicknessBoundary};
pub use matching::{CommandMatcher, CurveMatcher, LinearMatcher, MatchSettings, MatchedPair, TemplateReference};
pub use pipeline::{run_subject, write_artifacts, ArtifactOptions, SubjectInput, SubjectRecord};
pub use plane::{reduce_to_plane, PlaneDescriptor, PlaneReduction};
pub use resample::resample_by_gamma;
pub use snapshot::{read_snapshot, SubjectSnapshot};
pub use thickness::{compute_thickness, ThicknessResult};
pub use ucf::{read_ucf, write_ucf, UcfCurve};

/// Install the `tracing` subscriber used by the command line tools. Logs go to stderr,
/// the level is taken from `RUST_LOG` and defaults to `info`.
pub fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
