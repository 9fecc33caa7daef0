//! Byte-level character codecs for dictionary text.
//!
//! A dictionary is searched in its own byte encoding, never transcoded.
//! `CharacterCodec` reads one logical character at a time from a byte
//! buffer and folds it for case- and kana-insensitive comparison. The
//! numeric "code point" a codec returns is only meaningful to that codec:
//! UTF-8 yields Unicode scalar values, EUC-JP yields the raw multi-byte
//! value (e.g. `0xA4A2` for あ).

mod euc_jp;
mod utf8;

pub use euc_jp::EucJpCodec;
pub use utf8::Utf8Codec;

use std::fmt;

use tracing::debug;

/// An invalid byte sequence at `offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("malformed {encoding} sequence at byte {offset}")]
pub struct MalformedEncoding {
    pub encoding: Encoding,
    pub offset: usize,
}

/// Reads and folds characters of one byte encoding.
pub trait CharacterCodec: Send + Sync {
    fn encoding(&self) -> Encoding;

    /// Decode the character starting at `pos`, returning its code point and
    /// its length in bytes. Sequences cut short by the end of `bytes` are
    /// malformed.
    fn read_character(
        &self,
        bytes: &[u8],
        pos: usize,
    ) -> Result<(u32, usize), MalformedEncoding>;

    /// Map a code point to its comparison form: ASCII lowercase, and
    /// hiragana for katakana.
    fn fold_case(&self, cp: u32) -> u32;

    /// Encode a query string. `None` if any character is unrepresentable.
    fn encode(&self, text: &str) -> Option<Vec<u8>>;

    /// Decode dictionary bytes, replacing invalid sequences with U+FFFD.
    fn decode(&self, bytes: &[u8]) -> String;
}

/// The encodings a dictionary file may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    Utf8,
    EucJp,
}

static UTF8: Utf8Codec = Utf8Codec;
static EUC_JP: EucJpCodec = EucJpCodec;

impl Encoding {
    /// Stable identifier stored in index file headers.
    pub fn id(self) -> u8 {
        match self {
            Encoding::Utf8 => 1,
            Encoding::EucJp => 2,
        }
    }

    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Encoding::Utf8),
            2 => Some(Encoding::EucJp),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Encoding::Utf8 => "UTF-8",
            Encoding::EucJp => "EUC-JP",
        }
    }

    pub fn codec(self) -> &'static dyn CharacterCodec {
        match self {
            Encoding::Utf8 => &UTF8,
            Encoding::EucJp => &EUC_JP,
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Detection order: UTF-8 first, then EUC-JP.
const CANDIDATES: [Encoding; 2] = [Encoding::Utf8, Encoding::EucJp];

/// Pick the first encoding that decodes the leading `sample_chars`
/// characters of `bytes` without error.
pub fn detect_encoding(bytes: &[u8], sample_chars: usize) -> Option<Encoding> {
    CANDIDATES.into_iter().find(|&encoding| {
        let ok = decodes_cleanly(encoding.codec(), bytes, sample_chars);
        debug!(encoding = encoding.name(), ok, "encoding sample checked");
        ok
    })
}

fn decodes_cleanly(codec: &dyn CharacterCodec, bytes: &[u8], sample_chars: usize) -> bool {
    let mut pos = 0;
    for _ in 0..sample_chars {
        if pos >= bytes.len() {
            break;
        }
        match codec.read_character(bytes, pos) {
            Ok((_, len)) => pos += len,
            Err(_) => return false,
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_utf8() {
        let text = "食べる [たべる] /to eat/\n".as_bytes();
        assert_eq!(detect_encoding(text, 1000), Some(Encoding::Utf8));
    }

    #[test]
    fn detect_ascii_as_utf8() {
        assert_eq!(detect_encoding(b"abc /x/\n", 1000), Some(Encoding::Utf8));
    }

    #[test]
    fn detect_euc_jp() {
        let (bytes, _, errors) = encoding_rs::EUC_JP.encode("食べる [たべる] /to eat/\n");
        assert!(!errors);
        assert_eq!(detect_encoding(&bytes, 1000), Some(Encoding::EucJp));
    }

    #[test]
    fn detect_neither() {
        // 0xFF is never valid in UTF-8 and not a lead byte pair in EUC-JP
        // when followed by an ASCII byte.
        assert_eq!(detect_encoding(&[0xFF, b'a', b'b'], 1000), None);
    }

    #[test]
    fn detect_only_samples_prefix() {
        let mut bytes = b"ab".to_vec();
        bytes.push(0xFF);
        assert_eq!(detect_encoding(&bytes, 2), Some(Encoding::Utf8));
        assert_eq!(detect_encoding(&bytes, 3), None);
    }

    #[test]
    fn encoding_ids_round_trip() {
        for e in CANDIDATES {
            assert_eq!(Encoding::from_id(e.id()), Some(e));
            assert_eq!(e.codec().encoding(), e);
        }
        assert_eq!(Encoding::from_id(0), None);
    }
}
