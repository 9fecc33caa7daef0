use std::cmp::Ordering;

use tracing::{debug, debug_span, info};

use super::entry::{is_header_line, lines, parse_entry};
use crate::codec::CharacterCodec;
use crate::compare::DictionaryComparator;

/// Counters reported by an index build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Non-blank lines seen, header included.
    pub lines: usize,
    /// Lines rejected by the entry grammar or the codec.
    pub skipped_lines: usize,
    pub anchors: usize,
}

/// Build the sorted anchor array for a dictionary buffer.
pub fn build_index(bytes: &[u8], codec: &dyn CharacterCodec) -> Vec<u32> {
    build_index_with_stats(bytes, codec).0
}

/// Like [`build_index`], also returning line and anchor counters.
///
/// Offsets are `u32`; callers must reject buffers longer than `u32::MAX`.
pub fn build_index_with_stats(
    bytes: &[u8],
    codec: &dyn CharacterCodec,
) -> (Vec<u32>, BuildStats) {
    let _span = debug_span!("build_index", bytes = bytes.len()).entered();
    let cmp = DictionaryComparator::new(bytes, codec);
    let mut stats = BuildStats::default();
    let mut anchors: Vec<u32> = Vec::new();

    for (n, line) in lines(bytes).enumerate() {
        if line.is_blank() {
            continue;
        }
        stats.lines += 1;
        if n == 0 && is_header_line(bytes, line, codec) {
            debug!("skipping header line");
            continue;
        }
        match parse_entry(bytes, line, codec) {
            Ok(terms) => {
                for section in terms.sections() {
                    admit_section(&cmp, section, &mut anchors);
                }
            }
            Err(e) => {
                stats.skipped_lines += 1;
                debug!(line_start = line.start, "skipping entry: {e}");
            }
        }
    }

    anchors.sort_unstable_by(|&a, &b| cmp.compare(a as usize, b as usize).then(a.cmp(&b)));
    stats.anchors = anchors.len();
    info!(
        lines = stats.lines,
        skipped_lines = stats.skipped_lines,
        anchors = stats.anchors,
        "index built"
    );
    (anchors, stats)
}

/// Queue the candidates of one term section, dropping any candidate whose
/// term was already queued from the same section.
///
/// A term that only prefixes a queued one is kept: `/book/bookstore/` needs
/// both anchors so that `book` still matches as a whole word.
fn admit_section(cmp: &DictionaryComparator<'_>, candidates: &[usize], anchors: &mut Vec<u32>) {
    let base = anchors.len();
    for &candidate in candidates {
        let duplicate = anchors[base..]
            .iter()
            .any(|&queued| same_term(cmp, queued as usize, candidate));
        if !duplicate {
            anchors.push(candidate as u32);
        }
    }
}

/// Each term is a prefix of the other's text, so they read the same up to
/// their delimiters.
fn same_term(cmp: &DictionaryComparator<'_>, a: usize, b: usize) -> bool {
    cmp.compare_left_term(a, b) == Ordering::Equal
        && cmp.compare_left_term(b, a) == Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Encoding;

    fn terms_at(text: &str, index: &[u32]) -> Vec<String> {
        index
            .iter()
            .map(|&o| {
                let rest = &text[o as usize..];
                rest[..rest.find(['\n', '/', ' ', ']']).unwrap_or(rest.len())].to_string()
            })
            .collect()
    }

    #[test]
    fn admits_scenario_anchors() {
        let text = "食べる [たべる] /to eat (v1)/to devour/\n";
        let index = build_index(text.as_bytes(), Encoding::Utf8.codec());
        let mut offsets: Vec<u32> = index.clone();
        offsets.sort_unstable();
        // 食 べ る, た べ る, devour
        let devour = text.find("devour").unwrap() as u32;
        assert_eq!(offsets, vec![0, 3, 6, 11, 14, 17, devour]);
        let terms = terms_at(text, &index);
        assert!(!terms.iter().any(|t| t.starts_with("eat")));
        assert!(!terms.iter().any(|t| t.starts_with("(v1")));
    }

    #[test]
    fn index_is_sorted_by_folded_text() {
        let text = "ホン [ほん] /book/\nあい [あい] /love/\nBook /Book/\n";
        let codec = Encoding::Utf8.codec();
        let index = build_index(text.as_bytes(), codec);
        let cmp = DictionaryComparator::new(text.as_bytes(), codec);
        for w in index.windows(2) {
            assert_ne!(cmp.compare(w[0] as usize, w[1] as usize), Ordering::Greater);
        }
    }

    #[test]
    fn duplicate_translation_words_collapse() {
        let text = "家 [いえ] /house/house (building)/\n";
        let index = build_index(text.as_bytes(), Encoding::Utf8.codec());
        let terms = terms_at(text, &index);
        assert_eq!(terms.iter().filter(|t| t.as_str() == "house").count(), 1);
    }

    #[test]
    fn prefix_translation_words_are_kept() {
        for text in ["本 [ほん] /book/bookstore/\n", "本 [ほん] /bookstore/book/\n"] {
            let index = build_index(text.as_bytes(), Encoding::Utf8.codec());
            let terms = terms_at(text, &index);
            assert!(terms.contains(&"book".to_string()), "{text}");
            assert!(terms.contains(&"bookstore".to_string()), "{text}");
        }
    }

    #[test]
    fn malformed_line_is_skipped() {
        let text = "本 [ほん] /book/\nthis line is broken\n犬 [いぬ] /doggy/\n";
        let (index, stats) = build_index_with_stats(text.as_bytes(), Encoding::Utf8.codec());
        assert_eq!(stats.lines, 3);
        assert_eq!(stats.skipped_lines, 1);
        let terms = terms_at(text, &index);
        assert!(terms.contains(&"本".to_string()));
        assert!(terms.contains(&"犬".to_string()));
        assert!(!terms.iter().any(|t| t.starts_with("this")));
    }

    #[test]
    fn invalid_encoding_line_is_skipped() {
        let mut bytes = "本 /book/\n".as_bytes().to_vec();
        bytes.extend_from_slice(&[0xE3, 0x81, b' ', b'/', b'x', b'/', b'\n']);
        bytes.extend_from_slice("犬 /doggy/\n".as_bytes());
        let (_, stats) = build_index_with_stats(&bytes, Encoding::Utf8.codec());
        assert_eq!(stats.skipped_lines, 1);
    }

    #[test]
    fn header_line_is_not_indexed() {
        let text = "\u{3000}？？？ /EDICT, EDRDG/\n本 [ほん] /book/\n";
        let index = build_index(text.as_bytes(), Encoding::Utf8.codec());
        let body = text.find('本').unwrap() as u32;
        assert!(index.iter().all(|&o| o >= body));
    }

    #[test]
    fn builds_euc_jp() {
        let codec = Encoding::EucJp.codec();
        let bytes = codec.encode("本 [ほん] /book/\n犬 [いぬ] /doggy/\n").unwrap();
        let (index, stats) = build_index_with_stats(&bytes, codec);
        assert_eq!(stats.skipped_lines, 0);
        // 本, ほ, ん, book, 犬, い, ぬ, doggy
        assert_eq!(index.len(), 8);
    }
}
