//! Error types for regex-dna

use std::fmt;
use std::io;

use thiserror::Error;

/// Result type alias for regex-dna operations
pub type Result<T> = std::result::Result<T, Error>;

/// Where in the pipeline a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Removing annotation lines and newlines.
    Strip,
    /// Counting the variant with this index (0-based, listed order).
    Count(usize),
    /// Applying the substitution with this index (0-based, table order).
    Substitute(usize),
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Stage::Strip => write!(f, "header strip"),
            Stage::Count(i) => write!(f, "variant count #{}", i + 1),
            Stage::Substitute(k) => write!(f, "substitution #{}", k + 1),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    /// The input stream could not be read to the end.
    #[error("can't read input")]
    InputRead(#[source] io::Error),

    /// Writing the report failed.
    #[error("can't write output")]
    Output(#[source] io::Error),

    /// The in-crate motif engine rejected a pattern.
    #[error("could not compile pattern {pattern:?} at offset {offset}: {reason}")]
    PatternCompile {
        pattern: String,
        offset: usize,
        reason: &'static str,
    },

    /// The regex backend rejected a pattern.
    #[error("could not compile pattern {pattern:?}")]
    Regex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A pattern matched the empty string, which would stall a left to right scan.
    #[error("pattern {pattern:?} produced an empty match at offset {offset}")]
    EmptyMatch { pattern: String, offset: usize },

    /// Wraps a matching failure with the pipeline stage it happened in.
    #[error("{stage} failed")]
    Stage {
        stage: Stage,
        #[source]
        source: Box<Error>,
    },

    #[error("can't build worker pool")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl Error {
    /// Attach pipeline context to an engine error.
    pub fn during(self, stage: Stage) -> Error {
        Error::Stage {
            stage,
            source: Box::new(self),
        }
    }

    /// Process exit code for this failure. Input failures get their own code.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InputRead(_) => 2,
            _ => 1,
        }
    }
}
