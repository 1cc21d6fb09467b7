use crate::error::{Error, Result};
use crate::pattern::Pattern;

/// Count non-overlapping matches of `pattern`, scanning left to right.
///
/// Each search resumes exactly at the previous match's end, so matches may
/// touch but never overlap.
pub fn count(pattern: &Pattern, haystack: &[u8]) -> Result<usize> {
    let mut n = 0;
    let mut at = 0;
    while let Some((start, end)) = pattern.find_at(haystack, at) {
        if end == start {
            return Err(Error::EmptyMatch {
                pattern: pattern.as_str().to_string(),
                offset: start,
            });
        }
        n += 1;
        at = end;
    }
    Ok(n)
}
