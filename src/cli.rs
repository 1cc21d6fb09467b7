use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use clap::Parser;
use log::info;

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::pattern::Engine;
use crate::pipeline::{self, Options, Report};

#[derive(Parser, Debug, Clone)]
#[command(about = "Count DNA motif variants and expand IUPAC codes in FASTA input")]
pub struct Args {
    /// Matching engine: regex or motif
    #[arg(long = "engine", default_value_t = Engine::Regex)]
    pub engine: Engine,
    /// Worker threads; 1 runs every stage on the main thread
    #[arg(short = 't', long = "threads", default_value_t = num_cpus::get())]
    pub threads: usize,
    /// Read FASTA from this file instead of standard input
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,
}

impl Args {
    pub fn options(&self) -> Options {
        Options {
            threads: self.threads.max(1),
        }
    }
}

/// Read the whole input into memory.
pub fn read_input(path: Option<&Path>) -> Result<Vec<u8>> {
    match path {
        Some(path) => {
            let mut file = File::open(path).map_err(Error::InputRead)?;
            let size = file
                .metadata()
                .ok()
                .and_then(|m| usize::try_from(m.len()).ok())
                .unwrap_or(0);
            let mut buf = Vec::with_capacity(size.saturating_add(1));
            file.read_to_end(&mut buf).map_err(Error::InputRead)?;
            Ok(buf)
        }
        None => {
            let mut buf = Vec::with_capacity(51 * (1 << 20));
            io::stdin().read_to_end(&mut buf).map_err(Error::InputRead)?;
            Ok(buf)
        }
    }
}

pub fn write_report<W: Write>(out: W, report: &Report) -> Result<()> {
    let mut out = BufWriter::new(out);
    write!(out, "{}", report).map_err(Error::Output)?;
    out.flush().map_err(Error::Output)
}

pub fn run(args: Args) -> Result<()> {
    // Compile everything before touching the input so a bad pattern fails fast.
    let catalog = Catalog::compile(args.engine)?;
    let input = read_input(args.input.as_deref())?;
    let options = args.options();
    info!(
        "processing {} bytes with the {} engine on {} thread(s)",
        input.len(),
        args.engine,
        options.threads
    );
    let report = pipeline::run(&input, &catalog, &options)?;
    let stdout = io::stdout();
    let out = stdout.lock();
    write_report(out, &report)
}
