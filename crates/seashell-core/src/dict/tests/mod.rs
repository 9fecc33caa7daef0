mod properties;

use std::fs;
use std::path::{Path, PathBuf};

use super::Dictionary;

pub(super) const SAMPLE: &str = "\
食べる [たべる] /to eat (v1)/to devour/
本 [ほん] /book/main/
本屋 [ほんや] /bookstore/bookshop/
ホテル /hotel/
犬 [いぬ] /dog/
";

pub(super) fn euc_jp(text: &str) -> Vec<u8> {
    let (bytes, _, unmappable) = encoding_rs::EUC_JP.encode(text);
    assert!(!unmappable, "test text must be representable in EUC-JP");
    bytes.into_owned()
}

/// In-memory dictionary with a freshly built index.
pub(super) fn indexed(bytes: Vec<u8>) -> Dictionary {
    let dict = Dictionary::from_bytes(bytes).unwrap();
    dict.build_index().unwrap();
    dict
}

pub(super) fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, bytes).unwrap();
    path
}

/// Decoded entry lines for a query, in iteration order.
pub(super) fn lookup(dict: &Dictionary, query: &str, mode: crate::SearchMode) -> Vec<String> {
    let searcher = dict.searcher().unwrap();
    searcher
        .search(query)
        .iter(mode)
        .map(|offset| dict.read_entry(offset))
        .collect()
}
