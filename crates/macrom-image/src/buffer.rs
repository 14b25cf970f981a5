use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use crate::range::{runs_of_written, ByteRange};
use crate::{Result, RomError};

/// A fixed-size ROM image under construction.
///
/// Holds the image bytes and a write-tracking mask of the same length. Each byte moves from
/// unwritten to written exactly once; nothing ever clears the mask. Every write is validated
/// against both the image size and the mask before either array is touched, so a failing write
/// has no effect.
#[derive(Debug, Clone)]
pub struct RomBuffer {
    data: Vec<u8>,
    written: Vec<bool>,
}

impl RomBuffer {
    /// Create a zero-filled image of `size` bytes with every byte unwritten.
    pub fn new(size: usize) -> Result<Self> {
        if size == 0 {
            return Err(RomError::InvalidSize);
        }

        let mut data: Vec<u8> = Vec::new();
        data.try_reserve_exact(size)
            .map_err(|_| RomError::AllocationFailed { size })?;
        data.resize(size, 0);

        let mut written: Vec<bool> = Vec::new();
        written
            .try_reserve_exact(size)
            .map_err(|_| RomError::AllocationFailed { size })?;
        written.resize(size, false);

        Ok(Self { data, written })
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn written_mask(&self) -> &[bool] {
        &self.written
    }

    /// Returns `false` for indices past the end of the image.
    pub fn is_written(&self, index: usize) -> bool {
        self.written.get(index).copied().unwrap_or(false)
    }

    /// Number of bytes written so far.
    pub fn written_len(&self) -> usize {
        self.written.iter().filter(|&&w| w).count()
    }

    /// Maximal runs of written bytes, in ascending order.
    pub fn written_ranges(&self) -> Vec<ByteRange> {
        runs_of_written(&self.written)
    }

    /// Check that a `len`-byte write at `offset` is in bounds and touches no written byte.
    ///
    /// On overlap the lowest already-written index in the target range is reported.
    pub fn check_write(&self, offset: usize, len: usize) -> Result<()> {
        let size = self.size();
        let end = match offset.checked_add(len) {
            Some(end) if end <= size => end,
            _ => return Err(RomError::OutOfBoundsWrite { size, offset, len }),
        };

        if let Some(pos) = self.written[offset..end].iter().position(|&w| w) {
            return Err(RomError::OverlappingWrite {
                at: offset + pos,
                offset,
                len,
            });
        }

        Ok(())
    }

    /// Place `bytes` at `offset`.
    pub fn write_bytes(&mut self, offset: usize, bytes: &[u8]) -> Result<()> {
        self.check_write(offset, bytes.len())?;
        tracing::debug!(offset, len = bytes.len(), "writing bytes");
        self.commit(offset, bytes);
        Ok(())
    }

    /// Place the entire contents of the file at `path` at `offset`, returning the number of
    /// bytes written.
    ///
    /// The length comes from the file's metadata and is validated before anything is read, so
    /// a file that cannot fit is rejected without being loaded. The file is closed again before
    /// this returns, whether or not the write succeeds.
    pub fn write_file(&mut self, offset: usize, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let file_access = |source: io::Error| RomError::FileAccess {
            path: path.to_path_buf(),
            source,
        };

        let mut file = File::open(path).map_err(file_access)?;
        let file_len = file.metadata().map_err(file_access)?.len();
        let len = usize::try_from(file_len).map_err(|_| RomError::OutOfBoundsWrite {
            size: self.size(),
            offset,
            len: usize::MAX,
        })?;

        self.check_write(offset, len)?;

        let mut contents: Vec<u8> = Vec::new();
        contents
            .try_reserve_exact(len)
            .map_err(|_| RomError::AllocationFailed { size: len })?;
        contents.resize(len, 0);
        file.read_exact(&mut contents).map_err(file_access)?;

        tracing::info!(
            offset,
            len,
            path = %path.display(),
            "writing file contents"
        );
        self.commit(offset, &contents);
        Ok(len)
    }

    /// Stream the full image (exactly [`RomBuffer::size`] bytes) to `writer`.
    pub fn write_to<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        writer.write_all(&self.data)?;
        writer.flush()
    }

    /// Consume the buffer, returning the image bytes. The mask is dropped.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    // Callers must have run `check_write` for this range.
    fn commit(&mut self, offset: usize, bytes: &[u8]) {
        let end = offset + bytes.len();
        self.data[offset..end].copy_from_slice(bytes);
        self.written[offset..end].fill(true);
    }
}
