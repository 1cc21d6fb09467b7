use crate::error::{Error, Result};
use crate::pattern::Pattern;

/// Replace every non-overlapping match of `pattern` with `replacement`.
///
/// The replacement is inserted verbatim. Bytes outside matches are copied
/// unchanged and the input is left untouched; a fresh buffer is returned.
pub fn replace(pattern: &Pattern, replacement: &[u8], haystack: &[u8]) -> Result<Vec<u8>> {
    let mut dst = Vec::with_capacity(haystack.len());
    replace_into(pattern, replacement, haystack, &mut dst)?;
    Ok(dst)
}

/// Like [`replace`], but writes into `dst`, clearing it first.
pub fn replace_into(
    pattern: &Pattern,
    replacement: &[u8],
    haystack: &[u8],
    dst: &mut Vec<u8>,
) -> Result<()> {
    dst.clear();
    let mut last_match = 0;
    while let Some((start, end)) = pattern.find_at(haystack, last_match) {
        if end == start {
            return Err(Error::EmptyMatch {
                pattern: pattern.as_str().to_string(),
                offset: start,
            });
        }
        dst.extend_from_slice(&haystack[last_match..start]);
        dst.extend_from_slice(replacement);
        last_match = end;
    }
    dst.extend_from_slice(&haystack[last_match..]);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Engine;
    use std::time::{Duration, Instant};

    const ENGINES: [Engine; 2] = [Engine::Regex, Engine::Motif];

    fn replace_with(engine: Engine, pattern: &str, replacement: &str, hay: &[u8]) -> Vec<u8> {
        let p = Pattern::compile(pattern, engine).unwrap();
        replace(&p, replacement.as_bytes(), hay).unwrap()
    }

    #[test]
    fn replaces_each_occurrence() {
        for &engine in &ENGINES {
            assert_eq!(
                replace_with(engine, "B", "(c|g|t)", b"aBcB"),
                b"a(c|g|t)c(c|g|t)".to_vec()
            );
        }
    }

    #[test]
    fn strips_headers_and_newlines() {
        for &engine in &ENGINES {
            assert_eq!(
                replace_with(engine, "(>[^\n]+)?\n", "", b">h1\naaa\n>h2\nbbb\n"),
                b"aaabbb".to_vec()
            );
            assert_eq!(replace_with(engine, "(>[^\n]+)?\n", "", b"acgt\n\n"), b"acgt".to_vec());
            assert_eq!(replace_with(engine, "(>[^\n]+)?\n", "", b"acgt"), b"acgt".to_vec());
        }
    }

    #[test]
    fn unterminated_markers_are_kept() {
        let hay = vec![b'>'; 40_000];
        for &engine in &ENGINES {
            let started = Instant::now();
            assert_eq!(replace_with(engine, "(>[^\n]+)?\n", "", &hay), hay);
            assert!(started.elapsed() < Duration::from_secs(5), "{} took {:?}", engine, started.elapsed());
        }
    }

    #[test]
    fn replacement_is_literal() {
        for &engine in &ENGINES {
            assert_eq!(replace_with(engine, "a", "$0\\1", b"cat"), b"c$0\\1t".to_vec());
        }
    }

    #[test]
    fn no_match_copies_input() {
        let p = Pattern::compile("N", Engine::Motif).unwrap();
        let hay = b"acgtacgt".to_vec();
        let out = replace(&p, b"(a|c|g|t)", &hay).unwrap();
        assert_eq!(out, hay);
        assert_eq!(replace(&p, b"(a|c|g|t)", &hay).unwrap(), out);
    }

    #[test]
    fn replace_into_reuses_buffer() {
        let p = Pattern::compile("Y", Engine::Regex).unwrap();
        let mut dst = b"stale contents".to_vec();
        replace_into(&p, b"(c|t)", b"aYa", &mut dst).unwrap();
        assert_eq!(dst, b"a(c|t)a".to_vec());
    }
}
