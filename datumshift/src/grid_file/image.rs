//! Storage backends for an opened grid file
//!
//! A grid file is read through one of three images: a read-only memory map,
//! a heap copy of the whole file, or a buffered stream that seeks to each
//! record. Only the stream holds a file position, so it alone is not
//! reentrant.

use datumshift_core::format::constants::grid_flags;
use datumshift_core::validation::validate_region;
use datumshift_core::{GeodeticError, Result};
#[cfg(feature = "mmap")]
use memmap2::{Mmap, MmapOptions};
use std::{
    fmt,
    fs::File,
    io::{BufReader, Read, Seek, SeekFrom},
    path::Path,
};

use super::GridFileOptions;

/// How the file contents are accessed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Read-only memory map
    Mapped,
    /// Whole file copied into a heap buffer
    Heap,
    /// Buffered reads through a file handle
    Stream,
}

impl Backend {
    /// Choose a backend from the open options and the file length
    pub fn select(options: &GridFileOptions, file_len: u64) -> Backend {
        let hint = options.buffer_hint as u64;
        if options.flags & grid_flags::STREAM != 0 || (hint > 0 && hint < file_len) {
            Backend::Stream
        } else if options.flags & grid_flags::HEAP != 0 || cfg!(not(feature = "mmap")) {
            Backend::Heap
        } else {
            Backend::Mapped
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Mapped => f.write_str("mmap"),
            Backend::Heap => f.write_str("heap"),
            Backend::Stream => f.write_str("stream"),
        }
    }
}

pub(crate) enum GridImage {
    #[cfg(feature = "mmap")]
    Mapped(Mmap),
    Heap(Vec<u8>),
    Stream { reader: BufReader<File>, len: u64 },
}

impl GridImage {
    pub(crate) fn open(path: &Path, backend: Backend, buffer_hint: usize) -> Result<Self> {
        let mut file = File::open(path)?;
        match backend {
            #[cfg(feature = "mmap")]
            Backend::Mapped => {
                // SAFETY: read-only mapping; every access is bounds checked
                // against the mapped length
                let mmap = unsafe { MmapOptions::new().map(&file)? };
                Ok(GridImage::Mapped(mmap))
            }
            #[cfg(not(feature = "mmap"))]
            Backend::Mapped => Self::read_heap(&mut file),
            Backend::Heap => Self::read_heap(&mut file),
            Backend::Stream => {
                let len = file.metadata()?.len();
                let reader = if buffer_hint > 0 {
                    BufReader::with_capacity(buffer_hint, file)
                } else {
                    BufReader::new(file)
                };
                Ok(GridImage::Stream { reader, len })
            }
        }
    }

    fn read_heap(file: &mut File) -> Result<Self> {
        let len = usize::try_from(file.metadata()?.len())
            .map_err(|_| GeodeticError::Memory("grid file larger than address space".into()))?;
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|e| GeodeticError::Memory(format!("cannot reserve {len} bytes: {e}")))?;
        file.read_to_end(&mut data)?;
        Ok(GridImage::Heap(data))
    }

    pub(crate) fn len(&self) -> usize {
        match self {
            #[cfg(feature = "mmap")]
            GridImage::Mapped(mmap) => mmap.len(),
            GridImage::Heap(data) => data.len(),
            GridImage::Stream { len, .. } => usize::try_from(*len).unwrap_or(usize::MAX),
        }
    }

    /// Check that a region exists before it is read
    ///
    /// Every backend reports a short file as an unexpected end of file.
    pub(crate) fn check_region(&self, offset: usize, len: usize) -> Result<()> {
        validate_region(offset, len, self.len())
    }

    /// Fill `buf` with the bytes starting at `offset`
    pub(crate) fn read_at(&mut self, offset: usize, buf: &mut [u8]) -> Result<()> {
        match self {
            #[cfg(feature = "mmap")]
            GridImage::Mapped(mmap) => copy_region(mmap, offset, buf),
            GridImage::Heap(data) => copy_region(data, offset, buf),
            GridImage::Stream { reader, .. } => {
                let current = reader.stream_position()?;
                let target = offset as u64;
                if target.abs_diff(current) <= reader.capacity() as u64 {
                    // stays inside the buffer when possible
                    reader.seek_relative(target as i64 - current as i64)?;
                } else {
                    reader.seek(SeekFrom::Start(target))?;
                }
                reader.read_exact(buf)?;
                Ok(())
            }
        }
    }
}

fn copy_region(data: &[u8], offset: usize, buf: &mut [u8]) -> Result<()> {
    validate_region(offset, buf.len(), data.len())?;
    buf.copy_from_slice(&data[offset..offset + buf.len()]);
    Ok(())
}

impl fmt::Debug for GridImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            #[cfg(feature = "mmap")]
            GridImage::Mapped(_) => Backend::Mapped,
            GridImage::Heap(_) => Backend::Heap,
            GridImage::Stream { .. } => Backend::Stream,
        };
        f.debug_struct("GridImage")
            .field("backend", &kind)
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Write};

    fn sample_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&(0u8..64).collect::<Vec<_>>()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_backend_selection() {
        let options = GridFileOptions::default();
        let expected = if cfg!(feature = "mmap") {
            Backend::Mapped
        } else {
            Backend::Heap
        };
        assert_eq!(Backend::select(&options, 1000), expected);
        assert_eq!(
            Backend::select(&options.clone().with_buffer_hint(100), 1000),
            Backend::Stream
        );
        assert_eq!(
            Backend::select(&options.clone().with_buffer_hint(4096), 1000),
            expected
        );
        assert_eq!(
            Backend::select(&options.clone().with_flags(grid_flags::HEAP), 1000),
            Backend::Heap
        );
    }

    #[test]
    fn test_every_backend_reads_same_bytes() {
        let file = sample_file();
        for backend in [Backend::Mapped, Backend::Heap, Backend::Stream] {
            let mut image = GridImage::open(file.path(), backend, 8).unwrap();
            assert_eq!(image.len(), 64);
            let mut buf = [0u8; 4];
            image.read_at(40, &mut buf).unwrap();
            assert_eq!(buf, [40, 41, 42, 43]);
            image.read_at(2, &mut buf).unwrap();
            assert_eq!(buf, [2, 3, 4, 5]);
        }
    }

    #[test]
    fn test_short_region_is_eof_on_every_backend() {
        let file = sample_file();
        for backend in [Backend::Mapped, Backend::Heap, Backend::Stream] {
            let mut image = GridImage::open(file.path(), backend, 16).unwrap();
            assert!(matches!(
                image.check_region(60, 8),
                Err(GeodeticError::Io(ref e)) if e.kind() == io::ErrorKind::UnexpectedEof
            ));
            let mut buf = [0u8; 8];
            assert!(matches!(image.read_at(60, &mut buf), Err(GeodeticError::Io(_))));
        }
    }
}
