//! Property tests over randomly generated dictionaries.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use proptest::prelude::*;

use super::indexed;
use crate::dict::Dictionary;
use crate::index::MIN_TRANSLATION_WORD_BYTES;
use crate::search::SearchMode;

const HEAD_CHARS: &[char] = &['本', '屋', '食', '犬', '猫', 'ホ', 'テ', 'ル', 'ア', 'a', 'B'];
const KANA: &[char] = &['あ', 'い', 'か', 'ほ', 'ん', 'た', 'べ', 'る', 'ア', 'ン'];
const GLOSSES: &[&str] = &[
    "book",
    "bookstore",
    "to eat",
    "devour",
    "house (bldg)",
    "dog",
    "main",
    "Hotel",
    "run-away",
    "test testing",
    "household/house",
];

#[derive(Debug, Clone)]
struct Entry {
    headwords: Vec<String>,
    reading: Option<String>,
    glosses: Vec<&'static str>,
}

impl Entry {
    fn line(&self) -> String {
        let mut line = self.headwords.join(",");
        if let Some(reading) = &self.reading {
            line.push_str(&format!(" [{reading}]"));
        }
        line.push_str(&format!(" /{}/", self.glosses.join("/")));
        line
    }

    /// Translation words long enough to be indexed, outside parentheses.
    fn translation_words(&self) -> Vec<&'static str> {
        self.glosses
            .iter()
            .copied()
            .flat_map(|g| g.split(['/', ' ', '-']))
            .filter(|w| !w.starts_with('(') && w.len() > MIN_TRANSLATION_WORD_BYTES)
            .collect()
    }
}

fn arb_term(chars: &'static [char]) -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(chars), 1..4)
        .prop_map(|chars| chars.into_iter().collect())
}

fn arb_entry() -> impl Strategy<Value = Entry> {
    (
        prop::collection::vec(arb_term(HEAD_CHARS), 1..3),
        prop::option::of(arb_term(KANA)),
        prop::collection::vec(prop::sample::select(GLOSSES), 1..4),
    )
        .prop_map(|(headwords, reading, glosses)| Entry {
            headwords,
            reading,
            glosses,
        })
}

fn arb_entries() -> impl Strategy<Value = Vec<Entry>> {
    prop::collection::vec(arb_entry(), 1..20)
}

fn build(entries: &[Entry]) -> Dictionary {
    let text: String = entries.iter().map(|e| e.line() + "\n").collect();
    indexed(text.into_bytes())
}

fn entry_set(dict: &Dictionary, query: &str, mode: SearchMode) -> BTreeSet<usize> {
    dict.searcher().unwrap().search(query).iter(mode).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn index_is_sorted(entries in arb_entries()) {
        let dict = build(&entries);
        let index = dict.index().unwrap();
        let cmp = dict.comparator();
        let offsets: Vec<usize> = index.iter().map(|o| o as usize).collect();
        for pair in offsets.windows(2) {
            prop_assert_ne!(cmp.compare(pair[0], pair[1]), Ordering::Greater);
        }
    }

    #[test]
    fn anchors_lead_back_to_entries(entries in arb_entries()) {
        let dict = build(&entries);
        let lines: BTreeSet<String> = entries.iter().map(Entry::line).collect();
        for offset in dict.index().unwrap().iter() {
            let start = dict.find_start_of_entry(offset as usize);
            prop_assert!(lines.contains(&dict.read_entry(start)));
        }
    }

    #[test]
    fn terms_find_their_entry(
        entries in arb_entries(),
        pick in any::<prop::sample::Index>(),
        head in any::<prop::sample::Index>(),
        cut in any::<prop::sample::Index>(),
        word in any::<prop::sample::Index>(),
    ) {
        let dict = build(&entries);
        let n = pick.index(entries.len());
        let headword = head.get(&entries[n].headwords);
        let chars: Vec<char> = headword.chars().collect();
        let query: String = chars[..=cut.index(chars.len())].iter().collect();

        let start: usize = entries[..n].iter().map(|e| e.line().len() + 1).sum();
        prop_assert!(entry_set(&dict, &query, SearchMode::Any).contains(&start));
        if let Some(reading) = &entries[n].reading {
            prop_assert!(entry_set(&dict, reading, SearchMode::Any).contains(&start));
        }
        let words = entries[n].translation_words();
        if !words.is_empty() {
            let word = word.get(&words);
            prop_assert!(entry_set(&dict, word, SearchMode::Any).contains(&start));
            prop_assert!(entry_set(&dict, word, SearchMode::Exact).contains(&start));
        }
    }

    #[test]
    fn modes_partition_matches(entries in arb_entries(), query in arb_term(KANA)) {
        let dict = build(&entries);
        let searcher = dict.searcher().unwrap();
        let results = searcher.search(&query);

        // Each matched anchor falls in exactly one positional mode.
        if let (Some(first), Some(last)) = (results.first_match(), results.last_match()) {
            let index = searcher.index();
            let len = results.encoded_query().len();
            for i in first..=last {
                let term = index.get(i).unwrap() as usize;
                let at_start = dict.is_word_start(term);
                let at_end = dict.is_word_end(term + len - 1);
                let hits = SearchMode::ALL[1..]
                    .iter()
                    .filter(|m| m.matches(at_start, at_end))
                    .count();
                prop_assert_eq!(hits, 1);
            }
        }

        // Per-mode entry sets cover exactly the entries found in any mode.
        let any = entry_set(&dict, &query, SearchMode::Any);
        let mut union = BTreeSet::new();
        for mode in &SearchMode::ALL[1..] {
            union.extend(entry_set(&dict, &query, *mode));
        }
        prop_assert_eq!(union, any);
    }

    #[test]
    fn entries_are_never_repeated(entries in arb_entries(), query in arb_term(HEAD_CHARS)) {
        let dict = build(&entries);
        let searcher = dict.searcher().unwrap();
        let results = searcher.search(&query);
        for mode in SearchMode::ALL {
            let yielded = results.entries(mode);
            let unique: BTreeSet<usize> = yielded.iter().copied().collect();
            prop_assert_eq!(unique.len(), yielded.len());
        }
    }
}
