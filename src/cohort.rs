//! Batch processing of a cohort, optionally registered to a template subject.

use tracing::{info, warn};

use std::path::{Path, PathBuf};

use crate::error::{CcThicknessError, Result};
use crate::matching::{CurveMatcher, MatchSettings, TemplateReference};
use crate::pipeline::{run_subject, write_artifacts, ArtifactOptions, ArtifactPaths, SubjectInput, SubjectRecord};
use crate::util::{ensure_dir, read_whitespace_list};

/// Name of the output subdirectory of the template subject.
pub const TEMPLATE_DIR: &str = "template";


/// Resolve a subject or curve list argument. With `list_input`, the argument itself is the list,
/// separated by whitespace or commas. Otherwise it names a text file holding the whitespace-separated list.
pub fn resolve_list(arg: &str, list_input: bool) -> Result<Vec<String>> {
    if list_input {
        Ok(arg
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect())
    } else {
        read_whitespace_list(arg)
    }
}


/// Read-only configuration of a cohort run.
#[derive(Debug, Clone, PartialEq)]
pub struct CohortConfig {
    pub subjects: Vec<SubjectInput>,
    pub template_id: Option<String>,
    pub settings: MatchSettings,
    pub output_root: PathBuf,
    pub plots: bool,
}

impl CohortConfig {
    /// Combine parallel lists of subject ids and curve paths.
    pub fn from_lists<P: Into<PathBuf>>(
        ids: Vec<String>,
        tops: Vec<String>,
        bottoms: Vec<String>,
        template_id: Option<String>,
        settings: MatchSettings,
        output_root: P,
        plots: bool,
    ) -> Result<CohortConfig> {
        if ids.len() != tops.len() || ids.len() != bottoms.len() {
            return Err(CcThicknessError::ListLengthMismatch(ids.len(), tops.len(), bottoms.len()));
        }
        if ids.is_empty() {
            return Err(CcThicknessError::EmptyCohort);
        }
        // non-template subjects write to output_root/<id>, the template to output_root/template
        if let Some(template) = &template_id {
            if let Some(id) = ids.iter().find(|id| id.as_str() == TEMPLATE_DIR && id.as_str() != template.as_str()) {
                return Err(CcThicknessError::ReservedSubjectId(id.clone()));
            }
        }
        let subjects = ids
            .into_iter()
            .zip(tops.into_iter().zip(bottoms.into_iter()))
            .map(|(id, (top, bottom))| SubjectInput::new(id, top, bottom))
            .collect();
        Ok(CohortConfig { subjects, template_id, settings, output_root: output_root.into(), plots })
    }

    /// Index of the template subject, if one is configured.
    pub fn template_index(&self) -> Result<Option<usize>> {
        match &self.template_id {
            None => Ok(None),
            Some(id) => self
                .subjects
                .iter()
                .position(|s| &s.id == id)
                .map(Some)
                .ok_or_else(|| CcThicknessError::UnknownTemplate(id.clone())),
        }
    }

    fn artifact_options(&self) -> ArtifactOptions {
        ArtifactOptions {
            plot: self.plots,
            include_naive_plot: self.settings.elastic && !self.settings.linear_template,
        }
    }
}


/// Outcome of one processed subject.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectOutcome {
    pub subject_id: String,
    pub mean_naive: f64,
    pub mean_adjusted: f64,
    pub percent_difference: Option<f64>,
    pub artifacts: ArtifactPaths,
}

impl SubjectOutcome {
    fn new(record: &SubjectRecord, artifacts: ArtifactPaths) -> SubjectOutcome {
        SubjectOutcome {
            subject_id: record.id().to_string(),
            mean_naive: record.thickness.mean_naive(),
            mean_adjusted: record.thickness.mean_adjusted(),
            percent_difference: record.thickness.percent_difference(),
            artifacts,
        }
    }
}


/// Results of a cohort run, in processing order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CohortReport {
    pub template: Option<SubjectOutcome>,
    pub subjects: Vec<SubjectOutcome>,
}


fn process(
    input: &SubjectInput,
    out_dir: &Path,
    config: &CohortConfig,
    matcher: &dyn CurveMatcher,
    reference: Option<&TemplateReference>,
) -> Result<(SubjectRecord, ArtifactPaths)> {
    input.check_files()?;
    ensure_dir(out_dir)?;
    let record = run_subject(input, &config.settings, matcher, reference)?;
    let artifacts = write_artifacts(&record, out_dir, config.artifact_options())?;
    Ok((record, artifacts))
}


/// Run the cohort: the template subject first (if any), then all other subjects in list order.
/// The first failure aborts the run.
pub fn run_cohort(config: &CohortConfig, matcher: &dyn CurveMatcher) -> Result<CohortReport> {
    info!("template_id = {:?}", config.template_id);
    let template_index = config.template_index()?;
    let mut report = CohortReport::default();

    let reference = match template_index {
        Some(idx) => {
            let input = &config.subjects[idx];
            let out_dir = config.output_root.join(TEMPLATE_DIR);
            info!("Processing template subject '{}'.", input.id);
            let (record, artifacts) = process(input, &out_dir, config, matcher, None)?;
            let reference = record.template_reference(config.settings.elastic)?;
            report.template = Some(SubjectOutcome::new(&record, artifacts));
            Some(reference)
        }
        None => None,
    };

    for (idx, input) in config.subjects.iter().enumerate() {
        if Some(idx) == template_index {
            continue;
        }
        let out_dir = config.output_root.join(&input.id);
        let (record, artifacts) = process(input, &out_dir, config, matcher, reference.as_ref())
            .map_err(|e| {
                warn!("Subject '{}' failed, aborting the cohort run.", input.id);
                e
            })?;
        report.subjects.push(SubjectOutcome::new(&record, artifacts));
    }
    info!("Processed {} subjects.", report.subjects.len() + report.template.iter().count());
    Ok(report)
}


#[cfg(test)]
mod test {
    use super::*;
    use crate::matching::LinearMatcher;

    fn lists(n: usize) -> (Vec<String>, Vec<String>, Vec<String>) {
        let ids = (0..n).map(|i| format!("S{}", i)).collect();
        let tops = (0..n).map(|i| format!("S{}_top.ucf", i)).collect();
        let bots = (0..n).map(|i| format!("S{}_bot.ucf", i)).collect();
        (ids, tops, bots)
    }

    #[test]
    fn literal_lists_are_split_on_whitespace_and_commas() {
        assert_eq!(vec!["S1", "S2", "S3"], resolve_list("S1, S2 S3", true).unwrap());
    }

    #[test]
    fn list_files_are_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ids.txt");
        std::fs::write(&path, "S1\nS2\n").unwrap();
        assert_eq!(vec!["S1", "S2"], resolve_list(path.to_str().unwrap(), false).unwrap());
    }

    #[test]
    fn a_missing_list_file_is_an_io_error() {
        let res = resolve_list("/nonexistent/ids.txt", false);
        assert!(matches!(res, Err(CcThicknessError::Io(_))));
    }

    #[test]
    fn lists_of_different_length_are_rejected() {
        let (ids, tops, mut bots) = lists(3);
        bots.pop();
        let res = CohortConfig::from_lists(ids, tops, bots, None, MatchSettings::default(), "out", true);
        let err = res.unwrap_err();
        assert!(matches!(err, CcThicknessError::ListLengthMismatch(3, 3, 2)));
        assert!(err.is_input_validation());
    }

    #[test]
    fn an_unknown_template_fails_before_anything_runs() {
        let dir = tempfile::tempdir().unwrap();
        let (ids, tops, bots) = lists(2);
        let config = CohortConfig::from_lists(ids, tops, bots, Some(String::from("T9")), MatchSettings::default(), dir.path(), false).unwrap();
        let err = run_cohort(&config, &LinearMatcher).unwrap_err();
        assert!(matches!(err, CcThicknessError::UnknownTemplate(_)));
        assert!(err.is_input_validation());
        assert!(!dir.path().join(TEMPLATE_DIR).exists());
    }

    #[test]
    fn a_subject_named_like_the_template_directory_is_rejected() {
        let (mut ids, tops, bots) = lists(3);
        ids[2] = String::from(TEMPLATE_DIR);
        let err = CohortConfig::from_lists(ids, tops, bots, Some(String::from("S0")), MatchSettings::default(), "out", false)
            .unwrap_err();
        assert!(matches!(err, CcThicknessError::ReservedSubjectId(ref id) if id == TEMPLATE_DIR));
        assert!(err.is_input_validation());
    }

    #[test]
    fn the_template_directory_name_is_free_without_a_template() {
        let (mut ids, tops, bots) = lists(2);
        ids[1] = String::from(TEMPLATE_DIR);
        assert!(CohortConfig::from_lists(ids.clone(), tops.clone(), bots.clone(), None, MatchSettings::default(), "out", false).is_ok());
        let own = Some(String::from(TEMPLATE_DIR));
        assert!(CohortConfig::from_lists(ids, tops, bots, own, MatchSettings::default(), "out", false).is_ok());
    }

    #[test]
    fn the_template_index_is_found() {
        let (ids, tops, bots) = lists(3);
        let config = CohortConfig::from_lists(ids, tops, bots, Some(String::from("S1")), MatchSettings::default(), "out", false).unwrap();
        assert_eq!(Some(1), config.template_index().unwrap());
    }
}
