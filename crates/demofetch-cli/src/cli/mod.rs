//! Argument parsing and dispatch shared by both utilities.

use anyhow::{Context, Result};
use clap::{CommandFactory, FromArgMatches, Parser};
use demofetch_core::config::{self, DemofetchConfig};
use demofetch_core::{run_group, CurlFetcher, DemoSet, FetchOptions, PipelineError, PipelineSettings};
use std::path::PathBuf;

/// Fetch a demo archive set, verify it and extract its MIX files.
#[derive(Debug, Parser)]
#[command(version, long_about = None)]
pub struct Cli {
    /// Directory holding the per-set MIX directories (overrides config `data_root`).
    #[arg(long, value_name = "DIR")]
    pub data_root: Option<PathBuf>,

    /// Where to keep a download that fails verification
    /// (default: `failed_download.zip` next to the set's directory).
    #[arg(long, value_name = "FILE")]
    pub fallback: Option<PathBuf>,
}

/// Binary name for a set.
pub fn bin_name(set: DemoSet) -> &'static str {
    match set {
        DemoSet::TiberianDawn => "fetch-td-demo",
        DemoSet::RedAlert => "fetch-ra-demo",
    }
}

fn about(set: DemoSet) -> &'static str {
    match set {
        DemoSet::TiberianDawn => "Download the Tiberian Dawn demo and extract its MIX files",
        DemoSet::RedAlert => "Download the Red Alert demo and extract its MIX files",
    }
}

impl Cli {
    /// Parses `std::env::args` under the set's binary name; exits on `--help` or bad input.
    pub fn parse_for(set: DemoSet) -> Self {
        let matches = Cli::command()
            .name(bin_name(set))
            .about(about(set))
            .get_matches();
        match Cli::from_arg_matches(&matches) {
            Ok(cli) => cli,
            Err(e) => e.exit(),
        }
    }

    /// Applies flag overrides on top of the loaded config.
    pub fn settings(&self, cfg: &DemofetchConfig) -> PipelineSettings {
        let mut settings = PipelineSettings::from_config(cfg);
        if let Some(root) = &self.data_root {
            settings.data_root = root.clone();
        }
        if let Some(fallback) = &self.fallback {
            settings.fallback_path = Some(fallback.clone());
        }
        settings
    }
}

/// Runs the whole set. Progress and verification lines go to stdout.
pub fn run(set: DemoSet, cli: &Cli) -> Result<()> {
    let cfg = config::load_or_init()?;
    tracing::debug!("loaded config: {:?}", cfg);

    let group = set.group().context("built-in task list is invalid")?;
    let settings = cli.settings(&cfg);
    let fetcher = CurlFetcher::new(FetchOptions::from_config(&cfg));
    let mut stdout = std::io::stdout().lock();

    let outcome = run_group(&group, &settings, &fetcher, &mut stdout);
    let files: usize = outcome.completed().map(|r| r.extracted.len()).sum();
    tracing::info!(
        set = bin_name(set),
        archives = outcome.completed().count(),
        files,
        "group finished"
    );
    outcome.into_result()?;
    Ok(())
}

/// Exit status for a failed run: the pipeline's code when the failure came
/// from the pipeline, 1 for anything else (config, argument plumbing).
pub fn exit_status(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<PipelineError>()
        .map(PipelineError::exit_code)
        .unwrap_or(1)
}

/// Entry point for a binary: parse, run, map the outcome to an exit status.
pub fn main_for(set: DemoSet) -> i32 {
    let cli = Cli::parse_for(set);
    match run(set, &cli) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("{} error: {:#}", bin_name(set), err);
            exit_status(&err)
        }
    }
}
