//! Strip, count, substitute, report.
//!
//! The stripped sequence is read by two independent jobs: counting the nine
//! variants and the chain of eleven substitutions. With more than one thread
//! the counts run on a rayon pool while the substitution chain runs on a
//! scoped thread next to it. The report is the same either way.

use std::borrow::Cow;
use std::fmt;
use std::panic;
use std::time::Instant;

use crossbeam_utils::thread;
use log::{debug, trace};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;

use crate::catalog::Catalog;
use crate::count::count;
use crate::error::{Result, Stage};
use crate::pattern::Pattern;
use crate::replace::replace;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Worker threads. One means everything runs on the calling thread.
    pub threads: usize,
}

impl Default for Options {
    fn default() -> Options {
        Options {
            threads: num_cpus::get(),
        }
    }
}

/// Everything the program prints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Variant pattern text and its count, in listed order.
    pub counts: Vec<(String, usize)>,
    pub input_len: usize,
    pub stripped_len: usize,
    pub final_len: usize,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (variant, n) in &self.counts {
            writeln!(f, "{} {}", variant, n)?;
        }
        write!(f, "\n{}\n{}\n{}\n", self.input_len, self.stripped_len, self.final_len)
    }
}

pub fn run(input: &[u8], catalog: &Catalog, options: &Options) -> Result<Report> {
    debug!("loaded {} bytes", input.len());
    let sequence = strip(catalog, input)?;
    debug!("stripped to {} bytes", sequence.len());

    let (counts, substituted) = if options.threads > 1 {
        let pool = ThreadPoolBuilder::new()
            .num_threads(options.threads)
            .build()?;
        let seq = &sequence[..];
        thread::scope(|s| {
            let substituted = s.spawn(|_| substitute(catalog, seq));
            let counts = pool.install(|| count_variants(catalog, seq, true));
            let substituted = substituted
                .join()
                .unwrap_or_else(|e| panic::resume_unwind(e));
            (counts, substituted)
        })
        .unwrap_or_else(|e| panic::resume_unwind(e))
    } else {
        (
            count_variants(catalog, &sequence, false),
            substitute(catalog, &sequence),
        )
    };
    let counts = counts?;
    let substituted = substituted?;
    debug!("substituted to {} bytes", substituted.len());

    Ok(Report {
        counts,
        input_len: input.len(),
        stripped_len: sequence.len(),
        final_len: substituted.len(),
    })
}

/// Remove annotation lines and every newline.
pub fn strip(catalog: &Catalog, input: &[u8]) -> Result<Vec<u8>> {
    let started = Instant::now();
    let stripped = replace(&catalog.header_strip, b"", input).map_err(|e| e.during(Stage::Strip))?;
    trace!("{} took {:?}", Stage::Strip, started.elapsed());
    Ok(stripped)
}

/// Count every variant against the same sequence, keeping listed order.
pub fn count_variants(
    catalog: &Catalog,
    sequence: &[u8],
    parallel: bool,
) -> Result<Vec<(String, usize)>> {
    let count_one = |(i, variant): (usize, &Pattern)| -> Result<(String, usize)> {
        let started = Instant::now();
        let n = count(variant, sequence).map_err(|e| e.during(Stage::Count(i)))?;
        trace!("{} took {:?}", Stage::Count(i), started.elapsed());
        Ok((variant.as_str().to_string(), n))
    };
    if parallel {
        catalog.variants.par_iter().enumerate().map(count_one).collect()
    } else {
        catalog.variants.iter().enumerate().map(count_one).collect()
    }
}

/// Apply the IUPAC expansions one after another; each pass reads the last one's output.
pub fn substitute(catalog: &Catalog, sequence: &[u8]) -> Result<Vec<u8>> {
    // The first pass borrows the stripped sequence instead of copying it.
    let mut seq = Cow::Borrowed(sequence);
    for (k, (pattern, replacement)) in catalog.substitutions.iter().enumerate() {
        let started = Instant::now();
        let next = replace(pattern, replacement, &seq).map_err(|e| e.during(Stage::Substitute(k)))?;
        trace!("{} took {:?}", Stage::Substitute(k), started.elapsed());
        seq = Cow::Owned(next);
    }
    Ok(seq.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Engine;

    #[test]
    fn strips_annotations() {
        let catalog = Catalog::compile(Engine::Regex).unwrap();
        let stripped = strip(&catalog, b">h1\naaa\n>h2\nbbb\n").unwrap();
        assert_eq!(stripped, b"aaabbb".to_vec());
    }

    #[test]
    fn stripping_clean_sequence_is_identity() {
        let catalog = Catalog::compile(Engine::Motif).unwrap();
        assert_eq!(strip(&catalog, b"acgtNNacgt").unwrap(), b"acgtNNacgt".to_vec());
        assert_eq!(strip(&catalog, b"acgt\n").unwrap(), b"acgt".to_vec());
    }

    #[test]
    fn substitution_without_codes_is_identity() {
        let catalog = Catalog::compile(Engine::Motif).unwrap();
        let seq = b"acgtacgtttaaccgg";
        assert_eq!(substitute(&catalog, seq).unwrap(), seq.to_vec());
    }

    #[test]
    fn substitutions_expand_each_code() {
        let catalog = Catalog::compile(Engine::Regex).unwrap();
        let out = substitute(&catalog, b"aBtY").unwrap();
        assert_eq!(out, b"a(c|g|t)t(c|t)".to_vec());
    }

    #[test]
    fn counts_keep_listed_order() {
        let catalog = Catalog::compile(Engine::Regex).unwrap();
        let seq = b"agggtaaacccgggtaaa";
        let serial = count_variants(&catalog, seq, false).unwrap();
        let parallel = count_variants(&catalog, seq, true).unwrap();
        assert_eq!(serial, parallel);
        assert_eq!(serial[0], ("agggtaaa|tttaccct".to_string(), 1));
        assert_eq!(serial[1], ("[cgt]gggtaaa|tttaccc[acg]".to_string(), 1));
    }

    #[test]
    fn report_format() {
        let report = Report {
            counts: vec![("a|b".to_string(), 5), ("c".to_string(), 0)],
            input_len: 10,
            stripped_len: 8,
            final_len: 12,
        };
        assert_eq!(report.to_string(), "a|b 5\nc 0\n\n10\n8\n12\n");
    }
}
