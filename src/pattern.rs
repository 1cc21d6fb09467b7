//! Compiled patterns and the engines behind them.

use std::fmt;
use std::str::FromStr;

use regex::bytes::{Regex, RegexBuilder};

use crate::error::{Error, Result};
use crate::motif::Motif;

/// Something that can find the leftmost match of a fixed pattern in bytes.
pub trait Matcher: Send + Sync {
    /// Leftmost match starting at or after `start`, as `(start, end)`.
    fn find_at(&self, haystack: &[u8], start: usize) -> Option<(usize, usize)>;
}

impl Matcher for Regex {
    fn find_at(&self, haystack: &[u8], start: usize) -> Option<(usize, usize)> {
        if start > haystack.len() {
            return None;
        }
        Regex::find_at(self, haystack, start).map(|m| (m.start(), m.end()))
    }
}

impl Matcher for Motif {
    fn find_at(&self, haystack: &[u8], start: usize) -> Option<(usize, usize)> {
        Motif::find_at(self, haystack, start)
    }
}

/// Which matcher backs a [`Pattern`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engine {
    /// `regex::bytes::Regex`, ASCII case-insensitive with Unicode off.
    Regex,
    /// The in-crate backtracking matcher from [`crate::motif`].
    Motif,
}

impl Default for Engine {
    fn default() -> Engine {
        Engine::Regex
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Engine::Regex => f.write_str("regex"),
            Engine::Motif => f.write_str("motif"),
        }
    }
}

impl FromStr for Engine {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Engine, String> {
        match s {
            "regex" => Ok(Engine::Regex),
            "motif" => Ok(Engine::Motif),
            _ => Err(format!("unknown engine {:?} (expected regex or motif)", s)),
        }
    }
}

/// A compiled, immutable pattern. Cheap to share between threads.
pub struct Pattern {
    text: String,
    matcher: Box<dyn Matcher>,
}

impl Pattern {
    pub fn compile(text: &str, engine: Engine) -> Result<Pattern> {
        let matcher: Box<dyn Matcher> = match engine {
            Engine::Regex => Box::new(
                RegexBuilder::new(text)
                    .case_insensitive(true)
                    .unicode(false)
                    .build()
                    .map_err(|source| Error::Regex {
                        pattern: text.to_string(),
                        source,
                    })?,
            ),
            Engine::Motif => Box::new(Motif::compile(text)?),
        };
        Ok(Pattern {
            text: text.to_string(),
            matcher,
        })
    }

    /// The source text, exactly as given to [`Pattern::compile`].
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn find_at(&self, haystack: &[u8], start: usize) -> Option<(usize, usize)> {
        self.matcher.find_at(haystack, start)
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.text).finish()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENGINES: [Engine; 2] = [Engine::Regex, Engine::Motif];

    #[test]
    fn engines_agree_on_fixed_shapes() {
        let cases: &[(&str, &[u8])] = &[
            ("agggtaaa|tttaccct", b"cagggtaaatttaccct"),
            ("[cgt]gggtaaa|tttaccc[acg]", b"aaGGGTAAAtttacccg"),
            ("(>[^\n]+)?\n", b"aaa\n>seq two\nccc\n"),
            ("B", b"acgtBnb"),
        ];
        for &(text, hay) in cases {
            let regex = Pattern::compile(text, Engine::Regex).unwrap();
            let motif = Pattern::compile(text, Engine::Motif).unwrap();
            for start in 0..=hay.len() {
                assert_eq!(
                    regex.find_at(hay, start),
                    motif.find_at(hay, start),
                    "{:?} from {}",
                    text,
                    start
                );
            }
        }
    }

    #[test]
    fn start_past_end_finds_nothing() {
        for &engine in &ENGINES {
            let p = Pattern::compile("a", engine).unwrap();
            assert_eq!(p.find_at(b"aaa", 3), None);
            assert_eq!(p.find_at(b"aaa", 7), None);
        }
    }

    #[test]
    fn header_strip_matches_any_byte_in_annotation() {
        for &engine in &ENGINES {
            let p = Pattern::compile("(>[^\n]+)?\n", engine).unwrap();
            assert_eq!(p.find_at(b">\xff\xfe\nacgt", 0), Some((0, 4)));
        }
    }

    #[test]
    fn keeps_source_text() {
        let p = Pattern::compile("agggtaa[cgt]|[acg]ttaccct", Engine::Motif).unwrap();
        assert_eq!(p.as_str(), "agggtaa[cgt]|[acg]ttaccct");
        assert_eq!(p.to_string(), "agggtaa[cgt]|[acg]ttaccct");
    }

    #[test]
    fn compile_errors_name_the_pattern() {
        for &engine in &ENGINES {
            let err = Pattern::compile("[acg", engine).unwrap_err();
            assert!(err.to_string().contains("[acg"), "{}", err);
        }
    }

    #[test]
    fn engine_from_str() {
        assert_eq!("regex".parse::<Engine>(), Ok(Engine::Regex));
        assert_eq!("motif".parse::<Engine>(), Ok(Engine::Motif));
        assert!("pcre".parse::<Engine>().is_err());
    }
}
