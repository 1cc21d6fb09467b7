//! Count DNA motif variants and expand IUPAC ambiguity codes in FASTA input.
//!
//! ```
//! use regex_dna::{Catalog, Engine, Options};
//!
//! # fn main() -> regex_dna::Result<()> {
//! let catalog = Catalog::compile(Engine::Regex)?;
//! let report = regex_dna::run(b">one\nagggtaaaB\n", &catalog, &Options { threads: 1 })?;
//! assert_eq!(report.counts[0], ("agggtaaa|tttaccct".to_string(), 1));
//! assert_eq!((report.input_len, report.stripped_len, report.final_len), (15, 9, 15));
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod cli;
pub mod count;
pub mod error;
pub mod motif;
pub mod pattern;
pub mod pipeline;
pub mod replace;

pub use catalog::Catalog;
pub use count::count;
pub use error::{Error, Result, Stage};
pub use pattern::{Engine, Matcher, Pattern};
pub use pipeline::{run, Options, Report};
pub use replace::replace;
