//! A small backtracking matcher for the fixed motif patterns.
//!
//! Patterns are alternations of byte classes, repeated with greedy `?`, `*`
//! and `+`, and groups, which may only be made optional with `?`. Matching
//! is ASCII case-insensitive and leftmost-first, so on the patterns this
//! crate uses it finds exactly the spans `regex::bytes::Regex` finds.

use std::cell::Cell;

use crate::error::{Error, Result};

const MAX_NESTING: usize = 32;

/// A set of bytes, one bit per value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteSet([u64; 4]);

impl ByteSet {
    pub const EMPTY: ByteSet = ByteSet([0; 4]);

    pub fn insert(&mut self, b: u8) {
        self.0[(b >> 6) as usize] |= 1u64 << (b & 63);
    }

    #[inline]
    pub fn contains(&self, b: u8) -> bool {
        self.0[(b >> 6) as usize] & (1u64 << (b & 63)) != 0
    }

    fn insert_range(&mut self, lo: u8, hi: u8) {
        for b in lo..=hi {
            self.insert(b);
        }
    }

    fn fold_case(&mut self) {
        for lower in b'a'..=b'z' {
            let upper = lower.to_ascii_uppercase();
            if self.contains(lower) || self.contains(upper) {
                self.insert(lower);
                self.insert(upper);
            }
        }
    }

    fn negate(&mut self) {
        for word in self.0.iter_mut() {
            *word = !*word;
        }
    }

    fn union(&mut self, other: &ByteSet) {
        for (word, o) in self.0.iter_mut().zip(other.0.iter()) {
            *word |= *o;
        }
    }

    fn intersect(&mut self, other: &ByteSet) {
        for (word, o) in self.0.iter_mut().zip(other.0.iter()) {
            *word &= *o;
        }
    }

    fn is_empty(&self) -> bool {
        self.0.iter().all(|&w| w == 0)
    }
}

#[derive(Debug)]
enum Node {
    Class(ByteSet),
    Group(Vec<Vec<Piece>>),
}

#[derive(Debug)]
struct Piece {
    node: Node,
    min: usize,
    max: Option<usize>,
    // Index into the run cache; set for unbounded class repeats.
    slot: Option<usize>,
    // Nothing that can follow this class starts with a byte in it, so
    // giving back part of a greedy run can never lead to a match.
    possessive: bool,
}

/// A compiled motif pattern.
#[derive(Debug)]
pub struct Motif {
    alternatives: Vec<Vec<Piece>>,
    // Bytes a match can start with; unused when the pattern can match empty.
    first: ByteSet,
    nullable: bool,
    slots: usize,
}

impl Motif {
    pub fn compile(pattern: &str) -> Result<Motif> {
        let mut parser = Parser {
            pattern,
            bytes: pattern.as_bytes(),
            pos: 0,
            depth: 0,
            slots: 0,
        };
        let mut alternatives = parser.alternation()?;
        if parser.pos < parser.bytes.len() {
            return Err(parser.error("unmatched closing parenthesis"));
        }
        for alt in alternatives.iter_mut() {
            mark_possessive(alt, ByteSet::EMPTY, true);
        }
        let (first, nullable) = first_of_alternation(&alternatives);
        Ok(Motif {
            alternatives,
            first,
            nullable,
            slots: parser.slots,
        })
    }

    /// Leftmost match starting at or after `start`.
    pub fn find_at(&self, haystack: &[u8], start: usize) -> Option<(usize, usize)> {
        let runs = vec![Cell::new(NO_RUN); self.slots];
        let m = Matching {
            hay: haystack,
            runs: &runs,
        };
        for pos in start..=haystack.len() {
            if !self.nullable {
                match haystack.get(pos) {
                    Some(&b) if self.first.contains(b) => {}
                    _ => continue,
                }
            }
            if let Some(end) = m.alternatives(&self.alternatives, pos, &mut |end| Some(end)) {
                return Some((pos, end));
            }
        }
        None
    }
}

const NO_RUN: (usize, usize) = (usize::MAX, 0);

/// State of one `find_at` call.
struct Matching<'h> {
    hay: &'h [u8],
    // Last `(start, end)` run measured per slot. Every position inside a run
    // shares its end, so each byte is scanned once per slot.
    runs: &'h [Cell<(usize, usize)>],
}

impl<'h> Matching<'h> {
    fn alternatives(
        &self,
        alts: &[Vec<Piece>],
        pos: usize,
        k: &mut dyn FnMut(usize) -> Option<usize>,
    ) -> Option<usize> {
        for alt in alts {
            if let Some(end) = self.seq(alt, pos, k) {
                return Some(end);
            }
        }
        None
    }

    fn seq(
        &self,
        pieces: &[Piece],
        pos: usize,
        k: &mut dyn FnMut(usize) -> Option<usize>,
    ) -> Option<usize> {
        let (piece, rest) = match pieces.split_first() {
            Some(split) => split,
            None => return k(pos),
        };
        match piece.node {
            Node::Class(ref set) => {
                // Single-byte repeats are expanded greedily without recursing per byte.
                let run = self.run(piece, set, pos);
                if run < piece.min {
                    return None;
                }
                if piece.possessive {
                    return self.seq(rest, pos + run, k);
                }
                for n in (piece.min..=run).rev() {
                    if let Some(end) = self.seq(rest, pos + n, k) {
                        return Some(end);
                    }
                }
                None
            }
            Node::Group(ref alts) => {
                let found = self.alternatives(alts, pos, &mut |next| self.seq(rest, next, k));
                if found.is_some() || piece.min > 0 {
                    return found;
                }
                self.seq(rest, pos, k)
            }
        }
    }

    fn run(&self, piece: &Piece, set: &ByteSet, pos: usize) -> usize {
        let slot = match piece.slot {
            Some(slot) => &self.runs[slot],
            None => {
                let limit = piece.max.unwrap_or(usize::MAX);
                return self.hay[pos..]
                    .iter()
                    .take(limit)
                    .take_while(|&&b| set.contains(b))
                    .count();
            }
        };
        let (start, end) = slot.get();
        if start <= pos && pos <= end {
            return end - pos;
        }
        let end = pos
            + self.hay[pos..]
                .iter()
                .take_while(|&&b| set.contains(b))
                .count();
        slot.set((pos, end));
        end - pos
    }
}

// Walks right to left carrying what may follow each piece: the bytes the
// follower can start with, and whether it can match nothing at all.
fn mark_possessive(pieces: &mut [Piece], mut follow: ByteSet, mut can_end: bool) {
    for piece in pieces.iter_mut().rev() {
        let (first, nullable) = match piece.node {
            Node::Class(set) => {
                let mut overlap = set;
                overlap.intersect(&follow);
                piece.possessive = can_end || overlap.is_empty();
                (set, false)
            }
            Node::Group(ref mut alts) => {
                for alt in alts.iter_mut() {
                    mark_possessive(alt, follow, can_end);
                }
                first_of_alternation(alts)
            }
        };
        if nullable || piece.min == 0 {
            follow.union(&first);
        } else {
            follow = first;
            can_end = false;
        }
    }
}

fn first_of_alternation(alts: &[Vec<Piece>]) -> (ByteSet, bool) {
    let mut set = ByteSet::EMPTY;
    let mut nullable = false;
    for alt in alts {
        let (s, n) = first_of_seq(alt);
        set.union(&s);
        nullable |= n;
    }
    (set, nullable)
}

fn first_of_seq(pieces: &[Piece]) -> (ByteSet, bool) {
    let mut set = ByteSet::EMPTY;
    for piece in pieces {
        let (s, nullable) = match piece.node {
            Node::Class(ref class) => (*class, false),
            Node::Group(ref alts) => first_of_alternation(alts),
        };
        set.union(&s);
        if !nullable && piece.min > 0 {
            return (set, false);
        }
    }
    (set, true)
}

fn literal(b: u8) -> ByteSet {
    let mut set = ByteSet::EMPTY;
    set.insert(b);
    set.fold_case();
    set
}

struct Parser<'p> {
    pattern: &'p str,
    bytes: &'p [u8],
    pos: usize,
    depth: usize,
    slots: usize,
}

impl<'p> Parser<'p> {
    fn error(&self, reason: &'static str) -> Error {
        Error::PatternCompile {
            pattern: self.pattern.to_string(),
            offset: self.pos,
            reason,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    fn alternation(&mut self) -> Result<Vec<Vec<Piece>>> {
        let mut alts = vec![self.sequence()?];
        while self.peek() == Some(b'|') {
            self.pos += 1;
            alts.push(self.sequence()?);
        }
        Ok(alts)
    }

    fn sequence(&mut self) -> Result<Vec<Piece>> {
        let mut pieces = Vec::new();
        while let Some(b) = self.peek() {
            let node = match b {
                b'|' | b')' => break,
                b'(' => self.group()?,
                b'[' => Node::Class(self.class()?),
                b'\\' => {
                    self.pos += 1;
                    Node::Class(literal(self.escape()?))
                }
                b'.' => {
                    self.pos += 1;
                    let mut set = literal(b'\n');
                    set.negate();
                    Node::Class(set)
                }
                b'?' | b'*' | b'+' => return Err(self.error("quantifier has nothing to repeat")),
                b'^' | b'$' => return Err(self.error("anchors are not supported")),
                b'{' => return Err(self.error("counted repetition is not supported")),
                _ => {
                    self.pos += 1;
                    Node::Class(literal(b))
                }
            };
            let (min, max) = match self.peek() {
                Some(b'?') => (0, Some(1)),
                Some(b'*') => (0, None),
                Some(b'+') => (1, None),
                _ => (1, Some(1)),
            };
            if (min, max) != (1, Some(1)) {
                if max.is_none() {
                    if let Node::Group(_) = node {
                        return Err(self.error("groups can only be made optional"));
                    }
                }
                self.pos += 1;
                if let Some(b'?') | Some(b'*') | Some(b'+') = self.peek() {
                    return Err(self.error("repeated quantifier"));
                }
            }
            let slot = match (&node, max) {
                (Node::Class(_), None) => {
                    self.slots += 1;
                    Some(self.slots - 1)
                }
                _ => None,
            };
            pieces.push(Piece {
                node,
                min,
                max,
                slot,
                possessive: false,
            });
        }
        Ok(pieces)
    }

    fn group(&mut self) -> Result<Node> {
        let open = self.pos;
        self.pos += 1;
        if self.bytes[self.pos..].starts_with(b"?:") {
            self.pos += 2;
        }
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(self.error("groups nested too deeply"));
        }
        let alts = self.alternation()?;
        self.depth -= 1;
        if self.bump() != Some(b')') {
            self.pos = open;
            return Err(self.error("unclosed group"));
        }
        Ok(Node::Group(alts))
    }

    fn class(&mut self) -> Result<ByteSet> {
        let open = self.pos;
        self.pos += 1;
        let negated = self.peek() == Some(b'^');
        if negated {
            self.pos += 1;
        }
        let mut set = ByteSet::EMPTY;
        loop {
            let lo = match self.bump() {
                None => {
                    self.pos = open;
                    return Err(self.error("unclosed character class"));
                }
                Some(b']') => break,
                Some(b'\\') => self.escape()?,
                Some(b) => b,
            };
            let is_range = self.peek() == Some(b'-')
                && self.bytes.get(self.pos + 1).map_or(false, |&b| b != b']');
            if !is_range {
                set.insert(lo);
                continue;
            }
            self.pos += 1;
            let hi = match self.bump() {
                Some(b'\\') => self.escape()?,
                Some(b) => b,
                None => return Err(self.error("unclosed character class")),
            };
            if hi < lo {
                return Err(self.error("invalid class range"));
            }
            set.insert_range(lo, hi);
        }
        if set.is_empty() {
            return Err(self.error("empty character class"));
        }
        set.fold_case();
        if negated {
            set.negate();
        }
        Ok(set)
    }

    // Called with the backslash already consumed.
    fn escape(&mut self) -> Result<u8> {
        match self.bump() {
            None => Err(self.error("trailing backslash")),
            Some(b'n') => Ok(b'\n'),
            Some(b't') => Ok(b'\t'),
            Some(b'r') => Ok(b'\r'),
            Some(b) if b.is_ascii_punctuation() => Ok(b),
            Some(_) => {
                self.pos -= 1;
                Err(self.error("unsupported escape"))
            }
        }
    }
}
