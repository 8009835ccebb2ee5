//! codelang-train CLI binary: train, evaluate and save a model.

use std::process;

use clap::Parser;

use codelang::cli::args::TrainArgs;
use codelang::cli::commands::run_train;
use codelang::cli::init_logging;

fn main() {
    let args = TrainArgs::parse();

    init_logging(args.global.verbosity());

    if let Err(e) = run_train(&args) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
