//! Building and storing the sorted anchor index.
//!
//! `build_index` scans a dictionary buffer once, collects every search
//! anchor admitted by the EDICT entry grammar and sorts them with
//! `DictionaryComparator::compare`. `SortedIndex` holds the result, either
//! in memory or mapped from a `.iidx` file.

mod builder;
pub mod entry;
mod sorted;
mod sorted_io;

pub use builder::{build_index, build_index_with_stats, BuildStats};
pub use entry::{EntryError, EntryTerms, MIN_TRANSLATION_WORD_BYTES};
pub use sorted::SortedIndex;
pub use sorted_io::{index_path_for, IndexHeader};
