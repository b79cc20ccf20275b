//! Point correspondence between a top and a bottom curve.
//!
//! Elastic shape matching itself lives outside this crate. [`CurveMatcher`] is the seam: the
//! pipeline only needs a correspondence (gamma) plus aligned, equally sampled copies of both curves.
//! [`LinearMatcher`] is the deterministic non-elastic implementation, [`CommandMatcher`] delegates
//! to an external elastic matching program.

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};
use std::thread;

use crate::curve::Curve;
use crate::error::{CcThicknessError, Result};
use crate::resample::{resample_arclength, uniform_grid};


/// Settings for one curve pair match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSettings {
    /// Whether the curves are closed loops.
    pub closed: bool,
    /// Elastic (true) or linear (false) matching.
    pub elastic: bool,
    /// Align rotations before matching.
    pub rotation: bool,
    /// Number of samples both matched curves are resampled to.
    pub resample_size: usize,
    /// Register subjects to the template without elastic matching.
    pub linear_template: bool,
}

impl Default for MatchSettings {
    fn default() -> MatchSettings {
        MatchSettings {
            closed: false,
            elastic: true,
            rotation: true,
            resample_size: 100,
            linear_template: false,
        }
    }
}


/// Correspondence plus the aligned, resampled copies of both curves.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedPair {
    pub gamma: Array1<f64>,
    pub top: Curve,
    pub bottom: Curve,
}


/// The template subject's result, shared read-only by all other subjects of a cohort.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateReference {
    pub subject_id: String,
    /// Closed 2D boundary of the template: top forward, bottom reversed.
    pub joined: Curve,
    pub gamma: Array1<f64>,
}


/// Computes the correspondence of a curve pair.
pub trait CurveMatcher {
    fn match_pair(
        &self,
        top: &Curve,
        bottom: &Curve,
        settings: &MatchSettings,
        reference: Option<&TemplateReference>,
    ) -> Result<MatchedPair>;
}


/// Matching by arc length only: both curves are resampled uniformly and paired by index.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearMatcher;

impl CurveMatcher for LinearMatcher {
    fn match_pair(
        &self,
        top: &Curve,
        bottom: &Curve,
        settings: &MatchSettings,
        reference: Option<&TemplateReference>,
    ) -> Result<MatchedPair> {
        let siz = settings.resample_size;
        if settings.rotation {
            debug!("Rotation alignment is not applied by the linear matcher.");
        }
        let top = resample_arclength(top, siz, settings.closed)?;
        let bottom = resample_arclength(bottom, siz, settings.closed)?;

        let gamma = match reference {
            Some(template) if !settings.linear_template => {
                if template.gamma.len() != siz {
                    return Err(CcThicknessError::ShapeMismatch(format!(
                        "template '{}' has a correspondence of length {}, expected {}",
                        template.subject_id,
                        template.gamma.len(),
                        siz
                    )));
                }
                debug!("Using the correspondence of template '{}'.", template.subject_id);
                template.gamma.clone()
            }
            _ => uniform_grid(siz),
        };
        Ok(MatchedPair { gamma, top, bottom })
    }
}


#[derive(Debug, Serialize)]
struct MatchRequest<'a> {
    top: Vec<Vec<f64>>,
    bottom: Vec<Vec<f64>>,
    settings: &'a MatchSettings,
    template: Option<TemplateMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct TemplateMessage<'a> {
    subject_id: &'a str,
    joined: Vec<Vec<f64>>,
    gamma: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct MatchResponse {
    gamma: Vec<f64>,
    top: Vec<Vec<f64>>,
    bottom: Vec<Vec<f64>>,
}


/// Runs an external elastic matching program.
///
/// The program gets one JSON request on stdin (`top`, `bottom`, `settings`, `template`; curves
/// as lists of per-axis rows) and must answer with one JSON object `{gamma, top, bottom}` on stdout.
/// The program may write its answer before, while or after reading the request. A program that
/// exits without reading the whole request is not an error by itself; only its exit status and
/// answer count. The call blocks until the program exits.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandMatcher {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandMatcher {
    pub fn new<S: Into<String>>(program: S) -> CommandMatcher {
        CommandMatcher { program: program.into(), args: Vec::new() }
    }

    /// Parse a matcher command line like `"match_curves --steps 10"`.
    pub fn from_command_line(cmd: &str) -> Result<CommandMatcher> {
        let mut parts = cmd.split_whitespace().map(String::from);
        let program = parts
            .next()
            .ok_or_else(|| CcThicknessError::MatcherFailed(String::from("empty matcher command")))?;
        Ok(CommandMatcher { program, args: parts.collect() })
    }
}

impl CurveMatcher for CommandMatcher {
    fn match_pair(
        &self,
        top: &Curve,
        bottom: &Curve,
        settings: &MatchSettings,
        reference: Option<&TemplateReference>,
    ) -> Result<MatchedPair> {
        let request = MatchRequest {
            top: top.to_rows(),
            bottom: bottom.to_rows(),
            settings,
            template: reference.map(|t| TemplateMessage {
                subject_id: &t.subject_id,
                joined: t.joined.to_rows(),
                gamma: t.gamma.to_vec(),
            }),
        };
        let payload = serde_json::to_vec(&request)?;

        info!("Running external matcher '{}'.", self.program);
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| CcThicknessError::MatcherFailed(format!("cannot start '{}': {}", self.program, e)))?;
        // stdin is fed from its own thread so a program that answers before it has read
        // the whole request cannot block on a full stdout pipe
        let writer = child.stdin.take().map(|mut stdin| {
            thread::spawn(move || -> std::io::Result<()> {
                match stdin.write_all(&payload) {
                    Err(e) if e.kind() != ErrorKind::BrokenPipe => Err(e),
                    _ => Ok(()),
                }
            })
        });
        let output = child.wait_with_output()?;
        if let Some(writer) = writer {
            writer
                .join()
                .map_err(|_| CcThicknessError::MatcherFailed(String::from("request writer panicked")))??;
        }
        if !output.status.success() {
            return Err(CcThicknessError::MatcherFailed(format!(
                "'{}' exited with {}",
                self.program, output.status
            )));
        }

        let response: MatchResponse = serde_json::from_slice(&output.stdout)
            .map_err(|e| CcThicknessError::MatcherFailed(format!("invalid matcher output: {}", e)))?;
        let pair = MatchedPair {
            gamma: Array1::from(response.gamma),
            top: Curve::from_rows(&response.top)?,
            bottom: Curve::from_rows(&response.bottom)?,
        };
        if pair.top.siz() != pair.gamma.len() || pair.bottom.siz() != pair.gamma.len() {
            return Err(CcThicknessError::MatcherFailed(format!(
                "matcher returned {} gamma values for curves of {} and {} samples",
                pair.gamma.len(),
                pair.top.siz(),
                pair.bottom.siz()
            )));
        }
        Ok(pair)
    }
}
