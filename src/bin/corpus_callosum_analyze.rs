//! corpus_callosum_analyze -- compute thickness and register a batch of top and bottom callosal curves.

use clap::Parser;

use std::path::PathBuf;

use ccthickness::cohort::{resolve_list, run_cohort, CohortConfig};
use ccthickness::matching::{CommandMatcher, CurveMatcher, LinearMatcher, MatchSettings};
use ccthickness::{init_logging, CcThicknessError, Result};

/// Long options of the original tool are written with a single dash, e.g. `-odir`.
const SINGLE_DASH_LONG_OPTIONS: [&str; 10] = [
    "templateID", "linearTemplate", "listInput", "open", "linear", "norotate", "noplot", "odir", "resize", "matcher",
];

#[derive(Parser, Debug)]
#[command(
    name = "corpus_callosum_analyze",
    version,
    about = "Compute thickness and register batch of top and bottom callosal curves."
)]
struct Cli {
    /// Ordered list of subject identifiers
    #[arg(value_name = "subjectIDs")]
    subject_ids: String,

    /// Ordered list of paths to top callosal segmentation files
    #[arg(value_name = "topCurves")]
    top_curves: String,

    /// Ordered list of paths to bottom callosal segmentation files
    #[arg(value_name = "botCurves")]
    bot_curves: String,

    /// SubjectID associated with curves to be used as template for group registration
    #[arg(long = "templateID")]
    template_id: Option<String>,

    /// Do not use elastic matching if template id is specified
    #[arg(long = "linearTemplate")]
    linear_template: bool,

    /// Input curves names directly into arguments
    #[arg(long = "listInput")]
    list_input: bool,

    /// Match open curves
    #[arg(long = "open")]
    open_curves: bool,

    /// Use linear matching
    #[arg(long)]
    linear: bool,

    /// Do not align rotations
    #[arg(long)]
    norotate: bool,

    /// Do not save graphical plots
    #[arg(long)]
    noplot: bool,

    /// Output directory
    #[arg(long)]
    odir: PathBuf,

    /// Resize to the specified number of vertices
    #[arg(long, default_value_t = 100)]
    resize: usize,

    /// External elastic matching command
    #[arg(long, env = "CCTHICKNESS_MATCHER")]
    matcher: Option<String>,
}

/// Rewrite `-odir` style options to `--odir`.
fn normalize_args<I: IntoIterator<Item = String>>(args: I) -> Vec<String> {
    args.into_iter()
        .map(|arg| {
            let name = arg.strip_prefix('-').filter(|rest| !rest.starts_with('-'));
            let name = name.map(|n| n.split('=').next().unwrap_or(n));
            match name {
                Some(n) if SINGLE_DASH_LONG_OPTIONS.contains(&n) => format!("-{}", arg),
                _ => arg,
            }
        })
        .collect()
}

/// Matching settings selected by the command line flags. Curves are closed unless `-open` is given.
fn settings(cli: &Cli) -> MatchSettings {
    MatchSettings {
        closed: !cli.open_curves,
        elastic: !cli.linear,
        rotation: !cli.norotate,
        resample_size: cli.resize,
        linear_template: cli.linear_template,
    }
}

fn run(cli: Cli) -> Result<()> {
    let ids = resolve_list(&cli.subject_ids, cli.list_input)?;
    let tops = resolve_list(&cli.top_curves, cli.list_input)?;
    let bottoms = resolve_list(&cli.bot_curves, cli.list_input)?;

    let settings = settings(&cli);
    let matcher: Box<dyn CurveMatcher> = if cli.linear {
        Box::new(LinearMatcher)
    } else {
        match &cli.matcher {
            Some(cmd) => Box::new(CommandMatcher::from_command_line(cmd)?),
            None => return Err(CcThicknessError::MatcherUnavailable),
        }
    };

    let config = CohortConfig::from_lists(ids, tops, bottoms, cli.template_id, settings, cli.odir, !cli.noplot)?;
    run_cohort(&config, matcher.as_ref())?;
    Ok(())
}

fn main() {
    init_logging();
    let cli = Cli::parse_from(normalize_args(std::env::args()));
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn single_dash_long_options_are_accepted() {
        let argv = normalize_args(args(&["prog", "ids.txt", "top.txt", "bot.txt", "-odir", "out", "-templateID=S2", "-linear", "-resize", "50"]));
        let cli = Cli::try_parse_from(argv).unwrap();
        assert_eq!(PathBuf::from("out"), cli.odir);
        assert_eq!(Some(String::from("S2")), cli.template_id);
        assert!(cli.linear);
        assert!(!cli.norotate);
        assert_eq!(50, cli.resize);
    }

    #[test]
    fn flags_map_to_match_settings() {
        let argv = normalize_args(args(&["prog", "ids", "tops", "bots", "-odir", "out", "-open", "-norotate", "-linearTemplate", "-resize", "50"]));
        let s = settings(&Cli::try_parse_from(argv).unwrap());
        assert!(!s.closed);
        assert!(!s.rotation);
        assert!(s.linear_template);
        assert!(s.elastic);
        assert_eq!(50, s.resample_size);
    }

    #[test]
    fn default_settings_match_closed_elastic_curves() {
        let argv = normalize_args(args(&["prog", "ids", "tops", "bots", "-odir", "out"]));
        let s = settings(&Cli::try_parse_from(argv).unwrap());
        assert_eq!(MatchSettings { closed: true, elastic: true, rotation: true, resample_size: 100, linear_template: false }, s);
        let linear = settings(&Cli::try_parse_from(normalize_args(args(&["prog", "i", "t", "b", "-odir", "o", "-linear"]))).unwrap());
        assert!(!linear.elastic);
    }

    #[test]
    fn the_output_directory_is_required() {
        let argv = normalize_args(args(&["prog", "ids.txt", "top.txt", "bot.txt"]));
        assert!(Cli::try_parse_from(argv).is_err());
    }

    #[test]
    fn negative_numbers_and_double_dash_options_are_untouched() {
        assert_eq!(args(&["-5", "--odir", "-x"]), normalize_args(args(&["-5", "--odir", "-x"])));
    }
}
