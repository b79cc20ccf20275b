use quick_error::quick_error;
use std::io::Error as IOError;
use std::path::PathBuf;

quick_error! {
    /// Error type for all error variants originated by this crate.
    #[derive(Debug)]
    pub enum CcThicknessError {
        /// Invalid UCF contour file.
        InvalidUcfFormat(reason: String) {
            display("Invalid UCF file: {}", reason)
        }

        /// The smallest per-axis difference between top and bottom exceeds the tolerance.
        NotCoplanar(min_diff: f64) {
            display("These segmentations don't seem to be from the same plane (minimum axis difference {})", min_diff)
        }

        UnknownTemplate(id: String) {
            display("Invalid template ID '{}': not in the subject list", id)
        }

        MissingCurveFile(subject: String, path: PathBuf) {
            display("{} is missing a curve file: {}", subject, path.display())
        }

        ListLengthMismatch(ids: usize, tops: usize, bottoms: usize) {
            display("Subject, top curve and bottom curve lists differ in length ({}, {}, {})", ids, tops, bottoms)
        }

        ReservedSubjectId(id: String) {
            display("Subject ID '{}' collides with the template output directory", id)
        }

        EmptyCohort {
            display("No subjects given")
        }

        ShapeMismatch(reason: String) {
            display("Shape mismatch: {}", reason)
        }

        InvalidCorrespondence(reason: String) {
            display("Invalid correspondence: {}", reason)
        }

        MatcherUnavailable {
            display("Elastic matching requested but no matcher program configured (use -linear or -matcher)")
        }

        MatcherFailed(reason: String) {
            display("Curve matcher failed: {}", reason)
        }

        Plot(reason: String) {
            display("Plot rendering failed: {}", reason)
        }

        UnsupportedSnapshotVersion(version: u32) {
            display("Unsupported snapshot version {}", version)
        }

        Json(err: serde_json::Error) {
            from()
            source(err)
            display("JSON error: {}", err)
        }

        /// I/O Error
        Io(err: IOError) {
            from()
            source(err)
            display("I/O error: {}", err)
        }
    }
}

impl CcThicknessError {
    /// Whether this error stems from invalid user input rather than a resource or runtime failure.
    pub fn is_input_validation(&self) -> bool {
        matches!(
            self,
            CcThicknessError::NotCoplanar(_)
                | CcThicknessError::UnknownTemplate(_)
                | CcThicknessError::MissingCurveFile(..)
                | CcThicknessError::ListLengthMismatch(..)
                | CcThicknessError::ReservedSubjectId(_)
                | CcThicknessError::EmptyCohort
        )
    }
}

/// Alias type for results originated from this crate.
pub type Result<T> = ::std::result::Result<T, CcThicknessError>;
