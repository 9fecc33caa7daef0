use std::collections::HashMap;
use std::sync::OnceLock;

use super::{CharacterCodec, Encoding, MalformedEncoding};

/// Single-shift 2: the next byte is a half-width katakana (JIS X 0201).
const SS2: u8 = 0x8E;
/// Single-shift 3: the next two bytes are a JIS X 0212 character.
const SS3: u8 = 0x8F;

/// JIS X 0208 row 4 (hiragana) and row 5 (katakana) share cell numbers,
/// so folding is a change of the lead byte.
const HIRAGANA_ROW: u32 = 0xA4;
const KATAKANA_ROW: u32 = 0xA5;
/// Last katakana cell with a hiragana twin (ン, 0xA5F3). ヴヵヶ have none in
/// JIS X 0208.
const LAST_TWIN_CELL: u32 = 0xF3;

/// EUC-JP: ASCII, two-byte JIS X 0208, `0x8E` half-width katakana and
/// `0x8F` three-byte JIS X 0212. Code points are the raw big-endian byte
/// values.
#[derive(Debug, Clone, Copy, Default)]
pub struct EucJpCodec;

impl EucJpCodec {
    fn malformed(pos: usize) -> MalformedEncoding {
        MalformedEncoding {
            encoding: Encoding::EucJp,
            offset: pos,
        }
    }
}

fn is_graphic(b: u8) -> bool {
    (0xA1..=0xFE).contains(&b)
}

/// Reverse map for JIS X 0212. `encoding_rs` decodes the `0x8F` form but
/// its encoder never produces it, so the table is built from the decoder.
fn jis0212() -> &'static HashMap<char, [u8; 3]> {
    static TABLE: OnceLock<HashMap<char, [u8; 3]>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = HashMap::new();
        for b1 in 0xA1..=0xFE {
            for b2 in 0xA1..=0xFE {
                let seq = [SS3, b1, b2];
                let Some(text) = encoding_rs::EUC_JP
                    .decode_without_bom_handling_and_without_replacement(&seq)
                else {
                    continue;
                };
                let mut chars = text.chars();
                if let (Some(c), None) = (chars.next(), chars.next()) {
                    table.entry(c).or_insert(seq);
                }
            }
        }
        table
    })
}

/// Encode one character, trying JIS X 0212 when JIS X 0208 has no form.
fn encode_char(c: char, out: &mut Vec<u8>) -> Option<()> {
    let mut buf = [0u8; 4];
    let (bytes, _, unmappable) = encoding_rs::EUC_JP.encode(c.encode_utf8(&mut buf));
    if !unmappable {
        out.extend_from_slice(&bytes);
        return Some(());
    }
    out.extend_from_slice(jis0212().get(&c)?);
    Some(())
}

impl CharacterCodec for EucJpCodec {
    fn encoding(&self) -> Encoding {
        Encoding::EucJp
    }

    fn read_character(
        &self,
        bytes: &[u8],
        pos: usize,
    ) -> Result<(u32, usize), MalformedEncoding> {
        let lead = *bytes.get(pos).ok_or(Self::malformed(pos))?;
        let byte = |i: usize| bytes.get(pos + i).copied().ok_or(Self::malformed(pos));
        match lead {
            0x00..=0x7F => Ok((lead as u32, 1)),
            SS2 => {
                let b1 = byte(1)?;
                if !(0xA1..=0xDF).contains(&b1) {
                    return Err(Self::malformed(pos));
                }
                Ok((((lead as u32) << 8) | b1 as u32, 2))
            }
            SS3 => {
                let (b1, b2) = (byte(1)?, byte(2)?);
                if !is_graphic(b1) || !is_graphic(b2) {
                    return Err(Self::malformed(pos));
                }
                Ok((((lead as u32) << 16) | ((b1 as u32) << 8) | b2 as u32, 3))
            }
            _ if is_graphic(lead) => {
                let b1 = byte(1)?;
                if !is_graphic(b1) {
                    return Err(Self::malformed(pos));
                }
                Ok((((lead as u32) << 8) | b1 as u32, 2))
            }
            _ => Err(Self::malformed(pos)),
        }
    }

    fn fold_case(&self, cp: u32) -> u32 {
        match cp {
            0x41..=0x5A => cp + 0x20,
            // Full-width Latin capitals (row 3, Ａ 0xA3C1 .. Ｚ 0xA3DA).
            0xA3C1..=0xA3DA => cp + 0x20,
            _ if cp >> 8 == KATAKANA_ROW && (0xA1..=LAST_TWIN_CELL).contains(&(cp & 0xFF)) => {
                (HIRAGANA_ROW << 8) | (cp & 0xFF)
            }
            _ => cp,
        }
    }

    fn encode(&self, text: &str) -> Option<Vec<u8>> {
        let (bytes, _, unmappable) = encoding_rs::EUC_JP.encode(text);
        if !unmappable {
            return Some(bytes.into_owned());
        }
        let mut out = Vec::with_capacity(text.len());
        for c in text.chars() {
            encode_char(c, &mut out)?;
        }
        Some(out)
    }

    fn decode(&self, bytes: &[u8]) -> String {
        encoding_rs::EUC_JP
            .decode_without_bom_handling(bytes)
            .0
            .into_owned()
    }
}
