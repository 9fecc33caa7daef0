use std::collections::HashSet;
use std::iter::FusedIterator;

use super::SearchMode;
use crate::dict::Dictionary;
use crate::index::SortedIndex;

enum State {
    Scanning { cursor: usize },
    Exhausted,
}

/// Forward-only walk over a match run, yielding entry start offsets.
///
/// Each entry is yielded at most once even when several of its anchors
/// match. Searching again needs a fresh `SearchResults`.
pub struct ResultIterator<'r> {
    dict: &'r Dictionary,
    index: &'r SortedIndex,
    last: usize,
    query_len: usize,
    mode: SearchMode,
    state: State,
    seen: HashSet<usize>,
}

impl<'r> ResultIterator<'r> {
    pub(super) fn new(
        dict: &'r Dictionary,
        index: &'r SortedIndex,
        range: Option<(usize, usize)>,
        query_len: usize,
        mode: SearchMode,
    ) -> Self {
        let (state, last) = match range {
            Some((first, last)) if query_len > 0 => (State::Scanning { cursor: first }, last),
            _ => (State::Exhausted, 0),
        };
        Self {
            dict,
            index,
            last,
            query_len,
            mode,
            state,
            seen: HashSet::new(),
        }
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    fn classify(&self, term: usize) -> bool {
        let at_start = self.dict.is_word_start(term);
        let at_end = self.dict.is_word_end(term + self.query_len - 1);
        self.mode.matches(at_start, at_end)
    }
}

impl Iterator for ResultIterator<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        loop {
            let State::Scanning { cursor } = self.state else {
                return None;
            };
            self.state = if cursor < self.last {
                State::Scanning { cursor: cursor + 1 }
            } else {
                State::Exhausted
            };

            let Some(term) = self.index.get(cursor) else {
                self.state = State::Exhausted;
                return None;
            };
            let term = term as usize;
            if !self.classify(term) {
                continue;
            }
            let entry = self.dict.find_start_of_entry(term);
            if self.seen.insert(entry) {
                return Some(entry);
            }
        }
    }
}

impl FusedIterator for ResultIterator<'_> {}
