//! Unicode case and kana folding for dictionary text.

/// Distance between a katakana code point and its hiragana counterpart.
const KANA_SHIFT: u32 = 0x60;

/// Katakana that have a hiragana twin: ァ (U+30A1) through ヶ (U+30F6).
/// The prolonged sound mark ー and the middle dot have none.
fn has_hiragana_twin(cp: u32) -> bool {
    (0x30A1..=0x30F6).contains(&cp)
}

/// Fold a Unicode scalar value for order-insensitive comparison.
///
/// ASCII and full-width Latin uppercase map to lowercase, katakana maps to
/// hiragana. Everything else is returned unchanged.
pub fn fold_code_point(cp: u32) -> u32 {
    match cp {
        0x41..=0x5A | 0xFF21..=0xFF3A => cp + 0x20,
        _ if has_hiragana_twin(cp) => cp - KANA_SHIFT,
        _ => cp,
    }
}
