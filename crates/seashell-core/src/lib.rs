pub mod codec;
pub mod compare;
pub mod dict;
pub mod index;
pub mod search;
pub mod settings;
pub mod unicode;

pub use dict::{DictError, Dictionary};
pub use search::{ResultIterator, SearchMode, SearchResults, Searcher};
