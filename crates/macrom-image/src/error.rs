use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RomError>;

/// Errors produced while assembling a ROM image.
///
/// Write failures carry enough context (offset, length and, for double-writes, the first
/// conflicting byte) to diagnose the conflict without inspecting the buffer. Offsets are
/// rendered in hex since they usually correspond to documented ROM addresses.
#[derive(Debug, Error)]
pub enum RomError {
    /// `offset + len` exceeds the image size (or overflows `usize`).
    #[error("write past end of ROM at {size:#x}, via {len:#x} byte write starting at {offset:#x}")]
    OutOfBoundsWrite {
        size: usize,
        offset: usize,
        len: usize,
    },

    /// The write targets at least one byte that was already written. `at` is the lowest such
    /// index.
    #[error("double-write at {at:#x}, via {len:#x} byte write starting at {offset:#x}")]
    OverlappingWrite { at: usize, offset: usize, len: usize },

    /// The source file of a file-backed write could not be opened or read.
    #[error("unable to read {}: {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("ROM size must be non-zero")]
    InvalidSize,

    #[error("unable to allocate a {size}-byte ROM image")]
    AllocationFailed { size: usize },
}
