//! Query lookup over a dictionary's sorted index.
//!
//! `Searcher::search` finds the contiguous run of anchors that the query is
//! a prefix of. `SearchResults::iter` then walks that run, keeps the anchors
//! whose word position fits a `SearchMode`, and yields each entry once.

mod iter;
mod mode;

pub use iter::ResultIterator;
pub use mode::{ParseSearchModeError, SearchMode};

use std::cmp::Ordering;
use std::sync::Arc;

use tracing::{debug, debug_span};

use crate::compare::DictionaryComparator;
use crate::dict::Dictionary;
use crate::index::SortedIndex;

/// Searches one dictionary against the index that was current when the
/// searcher was created.
pub struct Searcher<'d> {
    dict: &'d Dictionary,
    index: Arc<SortedIndex>,
}

impl<'d> Searcher<'d> {
    pub(crate) fn new(dict: &'d Dictionary, index: Arc<SortedIndex>) -> Self {
        Self { dict, index }
    }

    pub fn dictionary(&self) -> &'d Dictionary {
        self.dict
    }

    pub fn index(&self) -> &SortedIndex {
        &self.index
    }

    /// Find every anchor that starts with `query`.
    ///
    /// A query that cannot be written in the dictionary's encoding, an empty
    /// one, or one containing a line break matches nothing. Anchors never
    /// span lines.
    pub fn search(&self, query: &str) -> SearchResults<'d> {
        let _span = debug_span!("search", query).entered();

        if query.is_empty() {
            return self.results(None, Vec::new());
        }
        if query.contains(['\n', '\r']) {
            debug!("query contains a line break");
            return self.results(None, Vec::new());
        }
        let Some(encoded) = self.dict.codec().encode(query) else {
            debug!(encoding = self.dict.encoding().name(), "query not representable");
            return self.results(None, Vec::new());
        };

        let range = find_match_run(&self.dict.comparator(), &self.index, &encoded);
        match range {
            Some((first, last)) => debug!(first, last, "matched"),
            None => debug!("no match"),
        }
        self.results(range, encoded)
    }

    fn results(&self, range: Option<(usize, usize)>, encoded_query: Vec<u8>) -> SearchResults<'d> {
        SearchResults {
            dict: self.dict,
            index: Arc::clone(&self.index),
            range,
            encoded_query,
        }
    }
}

/// Binary search for any anchor the query is a prefix of, then widen to the
/// whole run. Prefix matches are contiguous because the full ordering
/// refines the prefix ordering.
fn find_match_run(
    cmp: &DictionaryComparator<'_>,
    index: &SortedIndex,
    query: &[u8],
) -> Option<(usize, usize)> {
    let order_at = |i: usize| index.get(i).map(|o| cmp.compare_left(query, o as usize));

    let (mut lo, mut hi) = (0, index.len());
    let mut hit = None;
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        match order_at(mid)? {
            Ordering::Less => hi = mid,
            Ordering::Greater => lo = mid + 1,
            Ordering::Equal => {
                hit = Some(mid);
                break;
            }
        }
    }

    let hit = hit?;
    let (mut first, mut last) = (hit, hit);
    while first > 0 && order_at(first - 1) == Some(Ordering::Equal) {
        first -= 1;
    }
    while order_at(last + 1) == Some(Ordering::Equal) {
        last += 1;
    }
    Some((first, last))
}

/// The run of index positions matched by one query.
pub struct SearchResults<'d> {
    dict: &'d Dictionary,
    index: Arc<SortedIndex>,
    range: Option<(usize, usize)>,
    encoded_query: Vec<u8>,
}

impl<'d> SearchResults<'d> {
    /// First matching index position.
    pub fn first_match(&self) -> Option<usize> {
        self.range.map(|(first, _)| first)
    }

    /// Last matching index position (inclusive).
    pub fn last_match(&self) -> Option<usize> {
        self.range.map(|(_, last)| last)
    }

    /// The query in the dictionary's encoding.
    pub fn encoded_query(&self) -> &[u8] {
        &self.encoded_query
    }

    /// Number of matching anchors, before mode filtering and dedup.
    pub fn len(&self) -> usize {
        self.range.map_or(0, |(first, last)| last - first + 1)
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_none()
    }

    /// Lazily yield the start offset of each matching entry, once per entry.
    pub fn iter(&self, mode: SearchMode) -> ResultIterator<'_> {
        ResultIterator::new(self.dict, &self.index, self.range, self.encoded_query.len(), mode)
    }

    pub fn entries(&self, mode: SearchMode) -> Vec<usize> {
        self.iter(mode).collect()
    }
}
