//! Fixed-size ROM image assembly with write-once bookkeeping.
//!
//! A [`RomBuffer`] is a zero-filled byte image of a fixed size. Chunks of data (literal byte
//! sequences or whole files) are placed at explicit offsets. Every byte may be written at most
//! once and no write may extend past the end of the image; a rejected write leaves the image
//! untouched.
//!
//! - [`RomBuffer`]: the image plus its write-tracking mask
//! - [`RomError`]: out-of-bounds, double-write and file access failures
//! - [`ByteRange`]: half-open ranges used to summarise which bytes were written
//!
//! The crate never interprets the bytes it stores.

mod buffer;
mod error;
mod range;

pub use buffer::RomBuffer;
pub use error::{Result, RomError};
pub use range::ByteRange;

#[cfg(test)]
mod proptests;
