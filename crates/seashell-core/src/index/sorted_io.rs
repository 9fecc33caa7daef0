use std::ffi::OsString;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use tracing::warn;

use super::sorted::{IndexStorage, SortedIndex, HEADER_SIZE, MAGIC, SLOT_SIZE, VERSION};
use crate::codec::Encoding;
use crate::dict::DictError;

/// Byte order of the stored offsets: 1 little-endian, 2 big-endian.
const NATIVE_ORDER: u8 = if cfg!(target_endian = "little") { 1 } else { 2 };

/// Identity of the dictionary an index was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexHeader {
    pub encoding: Encoding,
    pub dict_len: u64,
    pub dict_crc: u32,
}

impl IndexHeader {
    pub fn for_dictionary(bytes: &[u8], encoding: Encoding) -> Self {
        Self {
            encoding,
            dict_len: bytes.len() as u64,
            dict_crc: crc32fast::hash(bytes),
        }
    }

    /// Check that an index stamped with `self` belongs to the dictionary
    /// described by `expected`.
    fn check(&self, expected: &IndexHeader, verify_checksum: bool) -> Result<(), DictError> {
        if self.encoding != expected.encoding {
            return Err(DictError::StaleIndex(format!(
                "index built for {}, dictionary is {}",
                self.encoding, expected.encoding
            )));
        }
        if self.dict_len != expected.dict_len {
            return Err(DictError::StaleIndex(format!(
                "index built for {} dictionary bytes, dictionary has {}",
                self.dict_len, expected.dict_len
            )));
        }
        if verify_checksum && self.dict_crc != expected.dict_crc {
            return Err(DictError::StaleIndex(
                "dictionary checksum changed since the index was built".to_string(),
            ));
        }
        Ok(())
    }
}

/// `<path>.<extension>`, keeping any extension `path` already has.
pub fn index_path_for(dict_path: &Path, extension: &str) -> PathBuf {
    let mut s = OsString::from(dict_path.as_os_str());
    s.push(".");
    s.push(extension);
    PathBuf::from(s)
}

fn read_u32(data: &[u8], at: usize) -> u32 {
    let mut b = [0u8; 4];
    b.copy_from_slice(&data[at..at + 4]);
    u32::from_ne_bytes(b)
}

fn read_u64(data: &[u8], at: usize) -> u64 {
    let mut b = [0u8; 8];
    b.copy_from_slice(&data[at..at + 8]);
    u64::from_ne_bytes(b)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut s = OsString::from(path.as_os_str());
    s.push(".tmp");
    PathBuf::from(s)
}

impl SortedIndex {
    /// Validate a binary header and return it with the offset count.
    pub(super) fn validate_header(data: &[u8]) -> Result<(IndexHeader, usize), DictError> {
        if data.len() < HEADER_SIZE {
            return Err(DictError::InvalidHeader);
        }
        if &data[..4] != MAGIC {
            return Err(DictError::InvalidMagic);
        }
        if data[4] != VERSION {
            return Err(DictError::UnsupportedVersion(data[4]));
        }
        let encoding = Encoding::from_id(data[5])
            .ok_or_else(|| DictError::StaleIndex(format!("unknown encoding id {}", data[5])))?;
        if data[6] != NATIVE_ORDER {
            return Err(DictError::StaleIndex(
                "index was written with a different byte order".to_string(),
            ));
        }
        let dict_len = read_u64(data, 8);
        let dict_crc = read_u32(data, 16);
        let count = read_u32(data, 20) as usize;

        let expected = HEADER_SIZE + count * SLOT_SIZE;
        if data.len() != expected {
            return Err(DictError::Parse(format!(
                "expected {expected} index bytes, got {}",
                data.len()
            )));
        }
        let header = IndexHeader {
            encoding,
            dict_len,
            dict_crc,
        };
        Ok((header, count))
    }

    /// Map an index file, checking it against the dictionary it will serve.
    pub fn open(
        path: &Path,
        expected: &IndexHeader,
        verify_checksum: bool,
    ) -> Result<Self, DictError> {
        let file = File::open(path)?;
        if file.metadata()?.len() < HEADER_SIZE as u64 {
            return Err(DictError::InvalidHeader);
        }
        // SAFETY: The file is opened read-only and the mapping is immutable.
        // Index files are only ever replaced by rename, never written in
        // place, so the mapped pages stay valid.
        let mmap = unsafe { Mmap::map(&file)? };
        let (header, count) = Self::validate_header(&mmap)?;
        header.check(expected, verify_checksum)?;
        Ok(Self {
            len: count,
            storage: IndexStorage::Mapped(mmap),
        })
    }

    /// Parse an index image into an owned representation.
    pub fn from_bytes(
        data: &[u8],
        expected: &IndexHeader,
        verify_checksum: bool,
    ) -> Result<Self, DictError> {
        let (header, count) = Self::validate_header(data)?;
        header.check(expected, verify_checksum)?;
        let offsets = data[HEADER_SIZE..]
            .chunks_exact(SLOT_SIZE)
            .map(|c| u32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
            .collect::<Vec<_>>();
        debug_assert_eq!(offsets.len(), count);
        Ok(Self::from_sorted(offsets))
    }

    /// Serialize with `header` to the on-disk format.
    pub fn to_bytes(&self, header: &IndexHeader) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_SIZE + self.len * SLOT_SIZE);
        buf.extend_from_slice(MAGIC);
        buf.push(VERSION);
        buf.push(header.encoding.id());
        buf.push(NATIVE_ORDER);
        buf.push(0); // reserved
        buf.extend_from_slice(&header.dict_len.to_ne_bytes());
        buf.extend_from_slice(&header.dict_crc.to_ne_bytes());
        buf.extend_from_slice(&(self.len as u32).to_ne_bytes());
        match &self.storage {
            IndexStorage::Owned(offsets) => {
                for &o in offsets {
                    buf.extend_from_slice(&o.to_ne_bytes());
                }
            }
            IndexStorage::Mapped(mmap) => buf.extend_from_slice(&mmap[HEADER_SIZE..]),
        }
        buf
    }

    /// Atomic write: write to `<path>.tmp`, then move it over `path`.
    pub fn save(&self, path: &Path, header: &IndexHeader) -> Result<(), DictError> {
        let tmp = tmp_path(path);
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&tmp, self.to_bytes(header))?;
        replace_file(&tmp, path)?;
        Ok(())
    }
}

/// Move `tmp` over `path`. Readers that mapped the old file keep their
/// pages. Where rename cannot replace (existing target on some platforms,
/// or a cross-device move), the target is removed first and, failing that,
/// copied.
fn replace_file(tmp: &Path, path: &Path) -> io::Result<()> {
    if fs::rename(tmp, path).is_ok() {
        return Ok(());
    }
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    if let Err(e) = fs::rename(tmp, path) {
        warn!(
            tmp = %tmp.display(),
            path = %path.display(),
            "rename failed, falling back to copy: {e}"
        );
        fs::copy(tmp, path)?;
        fs::remove_file(tmp)?;
    }
    Ok(())
}
