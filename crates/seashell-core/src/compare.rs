//! Ordering of dictionary positions.
//!
//! Positions are byte offsets into one shared, immutable buffer. Each
//! comparison walks two local cursors over that buffer, decoding and folding
//! one character at a time, so a comparator can be shared freely between
//! threads.

use std::cmp::Ordering;

use crate::codec::CharacterCodec;

/// Bytes that end a term inside an entry line.
pub const TERM_DELIMITERS: [u8; 4] = [b' ', b'-', b']', b'/'];

/// Malformed bytes compare as pseudo-characters above every real code point
/// (EUC-JP values stay below `0x0090_0000`, Unicode below `0x0011_0000`).
const MALFORMED_BASE: u32 = 0x8000_0000;

/// A read position into a byte buffer.
#[derive(Debug, Clone, Copy)]
struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8], pos: usize) -> Self {
        Self { bytes, pos }
    }

    /// The byte under the cursor, or `None` once the term stream has ended
    /// (end of buffer or end of line).
    fn peek(&self) -> Option<u8> {
        match self.bytes.get(self.pos) {
            Some(b'\n' | b'\r') | None => None,
            Some(&b) => Some(b),
        }
    }

    fn at_delimiter(&self) -> bool {
        self.peek().is_some_and(|b| TERM_DELIMITERS.contains(&b))
    }

    /// Decode, fold and step over the next character.
    fn next_folded(&mut self, codec: &dyn CharacterCodec) -> Option<u32> {
        let b = self.peek()?;
        match codec.read_character(self.bytes, self.pos) {
            Ok((cp, len)) => {
                self.pos += len;
                Some(codec.fold_case(cp))
            }
            Err(_) => {
                self.pos += 1;
                Some(MALFORMED_BASE | b as u32)
            }
        }
    }
}

/// Compares positions within one dictionary buffer.
#[derive(Clone, Copy)]
pub struct DictionaryComparator<'a> {
    bytes: &'a [u8],
    codec: &'a dyn CharacterCodec,
}

impl<'a> DictionaryComparator<'a> {
    pub fn new(bytes: &'a [u8], codec: &'a dyn CharacterCodec) -> Self {
        Self { bytes, codec }
    }

    /// Full comparison of the term streams at `a` and `b`. The shorter
    /// stream sorts first when one is a prefix of the other.
    pub fn compare(&self, a: usize, b: usize) -> Ordering {
        let mut ca = Cursor::new(self.bytes, a);
        let mut cb = Cursor::new(self.bytes, b);
        loop {
            match (ca.next_folded(self.codec), cb.next_folded(self.codec)) {
                (None, None) => return Ordering::Equal,
                (None, Some(_)) => return Ordering::Less,
                (Some(_), None) => return Ordering::Greater,
                (Some(x), Some(y)) if x != y => return x.cmp(&y),
                _ => {}
            }
        }
    }

    /// Compare an encoded query against position `b`. Running out of query
    /// is an exact match even if the dictionary term continues.
    pub fn compare_left(&self, query: &[u8], b: usize) -> Ordering {
        let cq = Cursor::new(query, 0);
        let cb = Cursor::new(self.bytes, b);
        self.compare_prefix(cq, cb, false)
    }

    /// Compare position `a` against `b`, where `a`'s term ends at the first
    /// word delimiter. Equal means the term at `a` is a prefix of `b`.
    pub fn compare_left_term(&self, a: usize, b: usize) -> Ordering {
        let ca = Cursor::new(self.bytes, a);
        let cb = Cursor::new(self.bytes, b);
        self.compare_prefix(ca, cb, true)
    }

    fn compare_prefix(
        &self,
        mut left: Cursor<'_>,
        mut right: Cursor<'_>,
        stop_at_delimiter: bool,
    ) -> Ordering {
        loop {
            if stop_at_delimiter && left.at_delimiter() {
                return Ordering::Equal;
            }
            let Some(x) = left.next_folded(self.codec) else {
                return Ordering::Equal;
            };
            match right.next_folded(self.codec) {
                None => return Ordering::Greater,
                Some(y) if x != y => return x.cmp(&y),
                Some(_) => {}
            }
        }
    }
}
