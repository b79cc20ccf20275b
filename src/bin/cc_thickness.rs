//! cc_thickness -- thickness of one subject's corpus callosum from its top and bottom boundary curves.
//!
//! Writes the thickness values, a comparison plot, the adjusted and native thickness boundaries
//! and a run data snapshot into the output directory.

use clap::Parser;

use std::path::PathBuf;

use ccthickness::matching::{CommandMatcher, CurveMatcher, LinearMatcher, MatchSettings};
use ccthickness::pipeline::{run_subject, write_artifacts, ArtifactOptions, SubjectInput};
use ccthickness::util::ensure_dir;
use ccthickness::{init_logging, CcThicknessError, Result};

#[derive(Parser, Debug)]
#[command(name = "cc_thickness", version, about = "Compute corpus callosum thickness for one subject")]
struct Cli {
    /// Subject identifier, used as output file prefix
    subject_name: String,

    /// Top callosal boundary curve (UCF)
    top_curve: PathBuf,

    /// Bottom callosal boundary curve (UCF)
    bottom_curve: PathBuf,

    /// Output directory
    output_dir: PathBuf,

    /// Use linear instead of elastic matching
    #[arg(long)]
    linear: bool,

    /// External elastic matching command
    #[arg(long, env = "CCTHICKNESS_MATCHER")]
    matcher: Option<String>,

    /// Number of vertices both curves are resampled to
    #[arg(long, default_value_t = 500)]
    resize: usize,

    /// Treat the curves as closed loops
    #[arg(long)]
    closed: bool,

    /// Align rotations before matching
    #[arg(long)]
    rotate: bool,

    /// Do not save the comparison plot
    #[arg(long)]
    no_plot: bool,
}

fn run(cli: Cli) -> Result<()> {
    let settings = MatchSettings {
        closed: cli.closed,
        elastic: !cli.linear,
        rotation: cli.rotate,
        resample_size: cli.resize,
        linear_template: false,
    };
    let matcher: Box<dyn CurveMatcher> = if cli.linear {
        Box::new(LinearMatcher)
    } else {
        match &cli.matcher {
            Some(cmd) => Box::new(CommandMatcher::from_command_line(cmd)?),
            None => return Err(CcThicknessError::MatcherUnavailable),
        }
    };

    let input = SubjectInput::new(cli.subject_name, cli.top_curve, cli.bottom_curve);
    input.check_files()?;
    ensure_dir(&cli.output_dir)?;
    let record = run_subject(&input, &settings, matcher.as_ref(), None)?;
    let options = ArtifactOptions { plot: !cli.no_plot, include_naive_plot: true };
    write_artifacts(&record, &cli.output_dir, options)?;
    Ok(())
}

fn main() {
    init_logging();
    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
