//! CLI entry point for pore size distribution and REV analysis

use clap::Parser;
use porerev::io::cli::{AnalysisRunner, Cli};
use porerev::io::error::computation_error;

fn main() -> porerev::Result<()> {
    let cli = Cli::parse();

    stderrlog::new()
        .module("porerev")
        .quiet(cli.quiet)
        .verbosity(cli.log_verbosity())
        .init()
        .map_err(|e| computation_error("logger initialisation", &e))?;

    let runner = AnalysisRunner::new(cli);
    runner.run().map(|_| ())
}
