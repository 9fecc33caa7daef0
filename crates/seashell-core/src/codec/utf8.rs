use super::{CharacterCodec, Encoding, MalformedEncoding};
use crate::unicode;

/// UTF-8 with the well-formedness rules of RFC 3629: no overlong forms,
/// no surrogates, nothing above U+10FFFF.
#[derive(Debug, Clone, Copy, Default)]
pub struct Utf8Codec;

impl Utf8Codec {
    fn malformed(pos: usize) -> MalformedEncoding {
        MalformedEncoding {
            encoding: Encoding::Utf8,
            offset: pos,
        }
    }
}

fn is_continuation(b: u8) -> bool {
    b & 0xC0 == 0x80
}

impl CharacterCodec for Utf8Codec {
    fn encoding(&self) -> Encoding {
        Encoding::Utf8
    }

    fn read_character(
        &self,
        bytes: &[u8],
        pos: usize,
    ) -> Result<(u32, usize), MalformedEncoding> {
        let lead = *bytes.get(pos).ok_or(Self::malformed(pos))?;
        // Valid range of the second byte narrows for E0, ED, F0 and F4.
        let (len, second) = match lead {
            0x00..=0x7F => return Ok((lead as u32, 1)),
            0xC2..=0xDF => (2, 0x80..=0xBF),
            0xE0 => (3, 0xA0..=0xBF),
            0xE1..=0xEC | 0xEE..=0xEF => (3, 0x80..=0xBF),
            0xED => (3, 0x80..=0x9F),
            0xF0 => (4, 0x90..=0xBF),
            0xF1..=0xF3 => (4, 0x80..=0xBF),
            0xF4 => (4, 0x80..=0x8F),
            _ => return Err(Self::malformed(pos)),
        };
        let seq = bytes
            .get(pos..pos + len)
            .ok_or(Self::malformed(pos))?;
        if !second.contains(&seq[1]) || !seq[2..].iter().all(|&b| is_continuation(b)) {
            return Err(Self::malformed(pos));
        }

        let mut cp = (lead as u32) & (0x7F >> len);
        for &b in &seq[1..] {
            cp = (cp << 6) | (b as u32 & 0x3F);
        }
        Ok((cp, len))
    }

    fn fold_case(&self, cp: u32) -> u32 {
        unicode::fold_code_point(cp)
    }

    fn encode(&self, text: &str) -> Option<Vec<u8>> {
        Some(text.as_bytes().to_vec())
    }

    fn decode(&self, bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes).into_owned()
    }
}
