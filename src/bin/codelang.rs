//! codelang CLI binary: print the language of one source file.

use std::process;

use clap::Parser;

use codelang::cli::args::PredictArgs;
use codelang::cli::commands::run_predict;
use codelang::cli::init_logging;

fn main() {
    // Wrong argument counts exit here with a usage message
    let args = PredictArgs::parse();

    init_logging(args.global.verbosity());

    if let Err(e) = run_predict(&args) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
