//! Payload input abstraction for the orchestrator.
//!
//! A source may know its size (in-memory buffers, regular files) or not
//! (pipes, network readers); it may support rewinding or not. Both facts
//! drive processing-path selection and whether fallback is possible.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};

/// A payload to be embedded, read in chunks.
pub trait PayloadSource {
    /// Total size in bytes, when known up front.
    fn len_hint(&self) -> Option<u64>;

    /// Whether the source can be rewound for a second pass or a retry.
    fn supports_rewind(&self) -> bool;

    /// Read up to `buf.len()` bytes; 0 means end of input.
    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Seek back to the start. Fails on sources without random access.
    fn rewind(&mut self) -> io::Result<()>;
}

/// In-memory payload.
pub struct MemorySource {
    data: Vec<u8>,
    position: usize,
}

impl MemorySource {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data, position: 0 }
    }
}

impl PayloadSource for MemorySource {
    fn len_hint(&self) -> Option<u64> {
        Some(self.data.len() as u64)
    }

    fn supports_rewind(&self) -> bool {
        true
    }

    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = &self.data[self.position..];
        let n = remaining.len().min(buf.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        self.position += n;
        Ok(n)
    }

    fn rewind(&mut self) -> io::Result<()> {
        self.position = 0;
        Ok(())
    }
}

/// File-backed payload with a known length.
pub struct FileSource {
    file: File,
    len: u64,
}

impl FileSource {
    pub fn open(path: &std::path::Path) -> io::Result<Self> {
        let file = File::open(path)?;
        let len = file.metadata()?.len();
        Ok(Self { file, len })
    }
}

impl PayloadSource for FileSource {
    fn len_hint(&self) -> Option<u64> {
        Some(self.len)
    }

    fn supports_rewind(&self) -> bool {
        true
    }

    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }

    fn rewind(&mut self) -> io::Result<()> {
        self.file.seek(SeekFrom::Start(0))?;
        Ok(())
    }
}

/// Unseekable reader of unknown length (stdin, pipes, sockets).
pub struct ReaderSource<R: Read> {
    reader: R,
}

impl<R: Read> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: Read> PayloadSource for ReaderSource<R> {
    fn len_hint(&self) -> Option<u64> {
        None
    }

    fn supports_rewind(&self) -> bool {
        false
    }

    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }

    fn rewind(&mut self) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "source does not support rewinding",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_memory_source_chunked_read() {
        let mut source = MemorySource::new((0..100u8).collect());
        assert_eq!(source.len_hint(), Some(100));

        let mut buf = [0u8; 64];
        assert_eq!(source.read_chunk(&mut buf).unwrap(), 64);
        assert_eq!(source.read_chunk(&mut buf).unwrap(), 36);
        assert_eq!(source.read_chunk(&mut buf).unwrap(), 0);

        source.rewind().unwrap();
        assert_eq!(source.read_chunk(&mut buf).unwrap(), 64);
        assert_eq!(buf[0], 0);
    }

    #[test]
    fn test_reader_source_has_no_hint_or_rewind() {
        let mut source = ReaderSource::new(Cursor::new(vec![1u8, 2, 3]));
        assert_eq!(source.len_hint(), None);
        assert!(!source.supports_rewind());
        assert!(source.rewind().is_err());

        let mut buf = [0u8; 8];
        assert_eq!(source.read_chunk(&mut buf).unwrap(), 3);
    }

    #[test]
    fn test_file_source() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut tmp, b"file payload").unwrap();

        let mut source = FileSource::open(tmp.path()).unwrap();
        assert_eq!(source.len_hint(), Some(12));
        assert!(source.supports_rewind());

        let mut buf = [0u8; 32];
        let n = source.read_chunk(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"file payload");

        source.rewind().unwrap();
        let n = source.read_chunk(&mut buf).unwrap();
        assert_eq!(n, 12);
    }
}
