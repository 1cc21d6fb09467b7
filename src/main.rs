use std::error::Error as _;
use std::process;

use clap::Parser;
use regex_dna::cli::{self, Args};

fn main() {
    env_logger::init();
    let args = Args::parse();
    if let Err(err) = cli::run(args) {
        eprintln!("regex-dna: {}", err);
        let mut source = err.source();
        while let Some(cause) = source {
            eprintln!("  caused by: {}", cause);
            source = cause.source();
        }
        process::exit(err.exit_code());
    }
}
