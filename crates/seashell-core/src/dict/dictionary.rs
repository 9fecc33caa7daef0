use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};

use memmap2::Mmap;
use tracing::{debug, info, warn};

use super::format::validate_format;
use super::DictError;
use crate::codec::{detect_encoding, CharacterCodec, Encoding};
use crate::compare::DictionaryComparator;
use crate::index::{build_index_with_stats, index_path_for, BuildStats, IndexHeader, SortedIndex};
use crate::search::Searcher;
use crate::settings::{settings, Settings};

/// A byte preceded by one of these starts a word.
pub const WORD_START_DELIMITERS: [u8; 5] = [b'\n', b' ', b'-', b'[', b'/'];
/// A byte followed by one of these ends a word.
pub const WORD_END_DELIMITERS: [u8; 4] = [b' ', b'-', b']', b'/'];

/// Backing storage for dictionary text: either owned or memory-mapped.
enum DictStorage {
    Owned(Vec<u8>),
    Mapped(Mmap),
}

impl DictStorage {
    fn as_bytes(&self) -> &[u8] {
        match self {
            DictStorage::Owned(v) => v.as_slice(),
            DictStorage::Mapped(m) => &m[..],
        }
    }
}

/// An EDICT-style dictionary and its search index.
///
/// The text is immutable once loaded. The index slot holds an `Arc` so that
/// searchers keep the index they started with while `build_index` or
/// `reload_index` swap in a new one.
pub struct Dictionary {
    path: Option<PathBuf>,
    index_path: Option<PathBuf>,
    encoding: Encoding,
    data: DictStorage,
    index: RwLock<Option<Arc<SortedIndex>>>,
    verify_checksum: bool,
}

impl Dictionary {
    /// Open a dictionary file with the global settings.
    pub fn load(path: &Path) -> Result<Self, DictError> {
        Self::load_with(path, settings())
    }

    /// Open a dictionary file: map it, detect its encoding, check the entry
    /// grammar on a sample of lines, and load `<path>.<extension>` if it is a
    /// current index for this file.
    pub fn load_with(path: &Path, settings: &Settings) -> Result<Self, DictError> {
        let file = File::open(path)?;
        check_size(file.metadata()?.len())?;
        // SAFETY: The file is opened read-only and the mapping is immutable.
        // Dictionary files are not modified while loaded.
        let mmap = unsafe { Mmap::map(&file)? };

        let mut dict = Self::from_storage(DictStorage::Mapped(mmap), settings)?;
        dict.path = Some(path.to_path_buf());
        dict.index_path = Some(index_path_for(path, &settings.index.extension));
        let has_index = dict.reload_index()?;
        info!(
            path = %path.display(),
            encoding = dict.encoding.name(),
            bytes = dict.len(),
            has_index,
            "dictionary loaded"
        );
        Ok(dict)
    }

    /// Wrap in-memory dictionary text. Indexes built for it are kept in
    /// memory only.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, DictError> {
        Self::from_bytes_with(bytes, settings())
    }

    pub fn from_bytes_with(bytes: Vec<u8>, settings: &Settings) -> Result<Self, DictError> {
        check_size(bytes.len() as u64)?;
        Self::from_storage(DictStorage::Owned(bytes), settings)
    }

    fn from_storage(data: DictStorage, settings: &Settings) -> Result<Self, DictError> {
        let bytes = data.as_bytes();
        let encoding = detect_encoding(bytes, settings.detect.sample_chars)
            .ok_or(DictError::UnsupportedEncoding)?;
        validate_format(bytes, encoding.codec(), settings.format.sample_lines)?;
        Ok(Self {
            path: None,
            index_path: None,
            encoding,
            data,
            index: RwLock::new(None),
            verify_checksum: settings.index.verify_checksum,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Where this dictionary's index lives, `None` for in-memory text.
    pub fn index_path(&self) -> Option<&Path> {
        self.index_path.as_deref()
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn codec(&self) -> &'static dyn CharacterCodec {
        self.encoding.codec()
    }

    pub fn bytes(&self) -> &[u8] {
        self.data.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes().is_empty()
    }

    pub fn comparator(&self) -> DictionaryComparator<'_> {
        DictionaryComparator::new(self.bytes(), self.codec())
    }

    pub fn has_index(&self) -> bool {
        self.index().is_some()
    }

    /// The currently loaded index.
    pub fn index(&self) -> Option<Arc<SortedIndex>> {
        self.index
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn index_slot(&self) -> RwLockWriteGuard<'_, Option<Arc<SortedIndex>>> {
        self.index.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// A searcher over the current index.
    pub fn searcher(&self) -> Result<Searcher<'_>, DictError> {
        let index = self.index().ok_or(DictError::MissingIndex)?;
        Ok(Searcher::new(self, index))
    }

    /// Re-read the index file from disk. Returns whether an index is loaded
    /// afterwards.
    ///
    /// A missing index is not an error. An index that does not belong to
    /// this dictionary (foreign format, other encoding or byte order,
    /// changed dictionary) is logged and dropped so callers rebuild it.
    pub fn reload_index(&self) -> Result<bool, DictError> {
        let Some(path) = &self.index_path else {
            return Ok(self.has_index());
        };
        let expected = self.expected_header();
        let loaded = match SortedIndex::open(path, &expected, self.verify_checksum) {
            Ok(index) => {
                debug!(path = %path.display(), anchors = index.len(), "index loaded");
                Some(Arc::new(index))
            }
            Err(DictError::Io(e)) if e.kind() == io::ErrorKind::NotFound => None,
            Err(DictError::Io(e)) => return Err(DictError::Io(e)),
            Err(e) => {
                warn!(path = %path.display(), "ignoring index: {e}");
                None
            }
        };
        let found = loaded.is_some();
        *self.index_slot() = loaded;
        Ok(found)
    }

    /// Header an index must carry to be used with this dictionary. The
    /// checksum is only computed when it will be compared.
    fn expected_header(&self) -> IndexHeader {
        if self.verify_checksum {
            IndexHeader::for_dictionary(self.bytes(), self.encoding)
        } else {
            IndexHeader {
                encoding: self.encoding,
                dict_len: self.len() as u64,
                dict_crc: 0,
            }
        }
    }

    /// Build the index from scratch, persist it next to the dictionary (via
    /// a temporary file and rename) and make it current.
    ///
    /// Searchers created before the call keep the previous index.
    pub fn build_index(&self) -> Result<BuildStats, DictError> {
        let bytes = self.bytes();
        let (offsets, stats) = build_index_with_stats(bytes, self.codec());
        let index = SortedIndex::from_sorted(offsets);

        let index = match &self.index_path {
            Some(path) => {
                let header = IndexHeader::for_dictionary(bytes, self.encoding);
                index.save(path, &header)?;
                debug!(path = %path.display(), "index written");
                SortedIndex::open(path, &header, false)?
            }
            None => index,
        };
        *self.index_slot() = Some(Arc::new(index));
        Ok(stats)
    }

    /// Byte range of the entry line containing `offset`, without the line
    /// terminator.
    pub fn entry_range(&self, offset: usize) -> std::ops::Range<usize> {
        let bytes = self.bytes();
        let start = self.find_start_of_entry(offset);
        let mut end = bytes[start..]
            .iter()
            .position(|&b| b == b'\n')
            .map_or(bytes.len(), |i| start + i);
        if end > start && bytes[end - 1] == b'\r' {
            end -= 1;
        }
        start..end
    }

    /// Decode the text from `offset` to the end of its line.
    pub fn read_entry(&self, offset: usize) -> String {
        let bytes = self.bytes();
        let offset = offset.min(bytes.len());
        let end = self.entry_range(offset).end.max(offset);
        self.codec().decode(&bytes[offset..end])
    }

    /// Start of the line containing `offset`.
    pub fn find_start_of_entry(&self, offset: usize) -> usize {
        let bytes = self.bytes();
        let offset = offset.min(bytes.len());
        bytes[..offset]
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |i| i + 1)
    }

    /// Whether a term starting at `offset` starts a word.
    pub fn is_word_start(&self, offset: usize) -> bool {
        let bytes = self.bytes();
        if offset == 0 || offset >= bytes.len() {
            return true;
        }
        WORD_START_DELIMITERS.contains(&bytes[offset - 1])
    }

    /// Whether a term whose last byte is at `offset` ends a word.
    pub fn is_word_end(&self, offset: usize) -> bool {
        let bytes = self.bytes();
        match bytes.get(offset + 1) {
            None => true,
            Some(b) => WORD_END_DELIMITERS.contains(b),
        }
    }
}

fn check_size(len: u64) -> Result<(), DictError> {
    if len == 0 {
        return Err(DictError::InvalidFormat("empty dictionary".to_string()));
    }
    if len > u32::MAX as u64 {
        return Err(DictError::TooLarge(len));
    }
    Ok(())
}
