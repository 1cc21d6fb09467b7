//! The fixed patterns of the benchmark, compiled once up front.

use log::debug;

use crate::error::Result;
use crate::pattern::{Engine, Pattern};

/// Matches an annotation line with its newline, or a bare newline.
pub const HEADER_STRIP: &str = "(>[^\n]+)?\n";

/// Motifs to count, in report order.
pub const VARIANTS: [&str; 9] = [
    "agggtaaa|tttaccct",
    "[cgt]gggtaaa|tttaccc[acg]",
    "a[act]ggtaaa|tttacc[agt]t",
    "ag[act]gtaaa|tttac[agt]ct",
    "agg[act]taaa|ttta[agt]cct",
    "aggg[acg]aaa|ttt[cgt]ccct",
    "agggt[cgt]aa|tt[acg]accct",
    "agggta[cgt]a|t[acg]taccct",
    "agggtaa[cgt]|[acg]ttaccct",
];

/// IUPAC ambiguity codes and their expansions, applied in this order.
pub const SUBSTITUTIONS: [(&str, &str); 11] = [
    ("B", "(c|g|t)"),
    ("D", "(a|g|t)"),
    ("H", "(a|c|t)"),
    ("K", "(g|t)"),
    ("M", "(a|c)"),
    ("N", "(a|c|g|t)"),
    ("R", "(a|g)"),
    ("S", "(c|g)"),
    ("V", "(a|c|g)"),
    ("W", "(a|t)"),
    ("Y", "(c|t)"),
];

/// Every pattern the pipeline needs, compiled with one engine.
#[derive(Debug)]
pub struct Catalog {
    pub header_strip: Pattern,
    pub variants: Vec<Pattern>,
    pub substitutions: Vec<(Pattern, &'static [u8])>,
}

impl Catalog {
    pub fn compile(engine: Engine) -> Result<Catalog> {
        let header_strip = Pattern::compile(HEADER_STRIP, engine)?;
        let variants = VARIANTS
            .iter()
            .map(|v| Pattern::compile(v, engine))
            .collect::<Result<Vec<_>>>()?;
        let substitutions = SUBSTITUTIONS
            .iter()
            .map(|&(code, expansion)| Ok((Pattern::compile(code, engine)?, expansion.as_bytes())))
            .collect::<Result<Vec<_>>>()?;
        debug!(
            "compiled {} patterns with the {} engine",
            1 + variants.len() + substitutions.len(),
            engine
        );
        Ok(Catalog {
            header_strip,
            variants,
            substitutions,
        })
    }
}
