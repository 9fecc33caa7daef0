//! EDICT entry line grammar.
//!
//! ```text
//! HEAD(,HEAD)* [READING] /TRANSLATION(/TRANSLATION)*/
//! ```
//!
//! The parser walks one line in the dictionary's own encoding and reports
//! the byte offset of every term character that may anchor a search.

use crate::codec::{CharacterCodec, MalformedEncoding};

/// Translation words must be longer than this many bytes to be indexed.
///
/// Byte length, not character length: a two-character kanji translation in
/// UTF-8 (6 bytes) passes while a three-letter English word does not.
pub const MIN_TRANSLATION_WORD_BYTES: usize = 3;

/// Why a line was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EntryError {
    #[error(transparent)]
    Encoding(#[from] MalformedEncoding),

    #[error("{reason} at byte {offset}")]
    Grammar { offset: usize, reason: &'static str },
}

fn grammar(offset: usize, reason: &'static str) -> EntryError {
    EntryError::Grammar { offset, reason }
}

/// Candidate anchors of one entry, grouped by term section.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EntryTerms {
    /// Every headword character except the `,` between alternates.
    pub headwords: Vec<usize>,
    /// Every reading character, empty when the entry has no reading.
    pub reading: Vec<usize>,
    /// Start of each translation word longer than
    /// [`MIN_TRANSLATION_WORD_BYTES`].
    pub translations: Vec<usize>,
}

impl EntryTerms {
    pub fn sections(&self) -> [&[usize]; 3] {
        [&self.headwords, &self.reading, &self.translations]
    }
}

/// A line `start..end` of the buffer; `end` excludes `\n` and a preceding
/// `\r`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line {
    pub start: usize,
    pub end: usize,
}

impl Line {
    pub fn is_blank(&self) -> bool {
        self.start == self.end
    }
}

/// Iterate over the lines of `bytes`. A trailing newline does not produce
/// an extra empty line.
pub fn lines(bytes: &[u8]) -> impl Iterator<Item = Line> + '_ {
    let mut pos = 0;
    std::iter::from_fn(move || {
        if pos >= bytes.len() {
            return None;
        }
        let start = pos;
        let newline = bytes[start..]
            .iter()
            .position(|&b| b == b'\n')
            .map(|i| start + i);
        let mut end = newline.unwrap_or(bytes.len());
        pos = newline.map_or(bytes.len(), |n| n + 1);
        if end > start && bytes[end - 1] == b'\r' {
            end -= 1;
        }
        Some(Line { start, end })
    })
}

/// EDICT files open with a banner line such as `　？？？ /EDICT, EDRDG, .../`.
pub fn is_header_line(bytes: &[u8], line: Line, codec: &dyn CharacterCodec) -> bool {
    let Ok((_, len)) = codec.read_character(&bytes[..line.end], line.start) else {
        return false;
    };
    let first = codec.decode(&bytes[line.start..line.start + len]);
    matches!(first.chars().next(), Some('\u{3000}' | '\u{FF1F}'))
}

/// Parse one entry line and collect its candidate anchors.
pub fn parse_entry(
    bytes: &[u8],
    line: Line,
    codec: &dyn CharacterCodec,
) -> Result<EntryTerms, EntryError> {
    let mut parser = EntryParser {
        bytes: &bytes[..line.end],
        codec,
        pos: line.start,
    };
    let mut terms = EntryTerms::default();

    parser.term_chars(b' ', "line ends inside headword", &mut terms.headwords)?;
    if terms.headwords.is_empty() {
        return Err(grammar(line.start, "empty headword"));
    }
    parser.pos += 1;

    if parser.peek() == Some(b'[') {
        parser.pos += 1;
        parser.term_chars(b']', "unterminated reading", &mut terms.reading)?;
        if terms.reading.is_empty() {
            return Err(grammar(parser.pos, "empty reading"));
        }
        parser.pos += 1;
        parser.expect(b' ', "expected space after reading")?;
    }

    parser.expect(b'/', "expected translation block")?;
    parser.translations(&mut terms.translations)?;
    Ok(terms)
}

struct EntryParser<'a> {
    /// Buffer cut at the end of the line being parsed.
    bytes: &'a [u8],
    codec: &'a dyn CharacterCodec,
    pos: usize,
}

impl EntryParser<'_> {
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn expect(&mut self, byte: u8, reason: &'static str) -> Result<(), EntryError> {
        if self.peek() != Some(byte) {
            return Err(grammar(self.pos, reason));
        }
        self.pos += 1;
        Ok(())
    }

    /// Step over one character, validating its encoding.
    fn advance(&mut self) -> Result<(), EntryError> {
        let (_, len) = self.codec.read_character(self.bytes, self.pos)?;
        self.pos += len;
        Ok(())
    }

    /// Collect character offsets up to (not including) `terminator`.
    fn term_chars(
        &mut self,
        terminator: u8,
        unterminated: &'static str,
        out: &mut Vec<usize>,
    ) -> Result<(), EntryError> {
        loop {
            match self.peek() {
                None => return Err(grammar(self.pos, unterminated)),
                Some(b) if b == terminator => return Ok(()),
                Some(b',') => self.pos += 1,
                Some(_) => {
                    out.push(self.pos);
                    self.advance()?;
                }
            }
        }
    }

    /// Parse `TRANSLATION/TRANSLATION/.../` after the opening slash.
    fn translations(&mut self, out: &mut Vec<usize>) -> Result<(), EntryError> {
        let mut word = PendingWord::default();
        let mut depth = 0usize;

        while let Some(b) = self.peek() {
            match b {
                b'/' => {
                    word.flush(out);
                    depth = 0;
                    self.pos += 1;
                    if self.pos == self.bytes.len() {
                        return Ok(());
                    }
                }
                b'(' => {
                    depth += 1;
                    self.pos += 1;
                }
                b')' if depth > 0 => {
                    depth -= 1;
                    self.pos += 1;
                }
                _ if depth > 0 => self.advance()?,
                b' ' | b'-' => {
                    word.flush(out);
                    self.pos += 1;
                }
                _ => {
                    let start = self.pos;
                    self.advance()?;
                    word.push(start, self.pos - start);
                }
            }
        }
        Err(grammar(self.pos, "translation block not closed by '/'"))
    }
}

/// A translation word being scanned. Parenthesised text inside it is not
/// counted.
#[derive(Default)]
struct PendingWord {
    start: Option<usize>,
    len: usize,
}

impl PendingWord {
    fn push(&mut self, offset: usize, len: usize) {
        self.start.get_or_insert(offset);
        self.len += len;
    }

    fn flush(&mut self, out: &mut Vec<usize>) {
        if let Some(start) = self.start.take() {
            if self.len > MIN_TRANSLATION_WORD_BYTES {
                out.push(start);
            }
        }
        self.len = 0;
    }
}
