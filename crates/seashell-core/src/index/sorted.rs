use std::fmt;

use memmap2::Mmap;

pub(super) const MAGIC: &[u8; 4] = b"SSIX";
pub(super) const VERSION: u8 = 1;
/// magic(4) + version(1) + encoding(1) + byte order(1) + reserved(1)
/// + dict_len(8) + dict_crc(4) + count(4).
pub(super) const HEADER_SIZE: usize = 4 + 1 + 1 + 1 + 1 + 8 + 4 + 4;
pub(super) const SLOT_SIZE: usize = 4;

/// Backing storage for the anchor array: either owned or memory-mapped.
pub(super) enum IndexStorage {
    Owned(Vec<u32>),
    Mapped(Mmap),
}

/// Anchor offsets sorted by dictionary order.
pub struct SortedIndex {
    pub(super) len: usize,
    pub(super) storage: IndexStorage,
}

impl SortedIndex {
    /// Wrap an already sorted offset array.
    pub fn from_sorted(offsets: Vec<u32>) -> Self {
        Self {
            len: offsets.len(),
            storage: IndexStorage::Owned(offsets),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Anchor offset at sorted position `i`.
    pub fn get(&self, i: usize) -> Option<u32> {
        if i >= self.len {
            return None;
        }
        match &self.storage {
            IndexStorage::Owned(offsets) => offsets.get(i).copied(),
            IndexStorage::Mapped(mmap) => {
                let at = HEADER_SIZE + i * SLOT_SIZE;
                mmap.get(at..at + SLOT_SIZE)
                    .map(|b| u32::from_ne_bytes([b[0], b[1], b[2], b[3]]))
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.len).filter_map(move |i| self.get(i))
    }

    /// Whether the offsets are read from a mapped file.
    pub fn is_mapped(&self) -> bool {
        matches!(self.storage, IndexStorage::Mapped(_))
    }
}

impl fmt::Debug for SortedIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortedIndex")
            .field("len", &self.len)
            .field("mapped", &self.is_mapped())
            .finish()
    }
}
