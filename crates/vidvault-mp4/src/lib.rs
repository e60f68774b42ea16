//! MP4 container introspection and faststart rewriting.
//!
//! Everything in this crate operates on the ISO BMFF box structure only:
//! headers are parsed and payloads are seeked over, so traversal cost scales
//! with the number of boxes rather than file size. The one exception is the
//! `moov` index box, which is loaded into memory for offset rewriting; sample
//! data (`mdat`) is never buffered.
//!
//! All I/O here is blocking `std::io`; callers on an async runtime run these
//! functions inside `spawn_blocking`.

pub mod boxes;
pub mod faststart;
pub mod inspect;

pub use boxes::{BoxHeader, FourCc, Mp4Error};
pub use faststart::write_faststart;
pub use inspect::inspect_geometry;

use vidvault_core::AppError;

impl From<Mp4Error> for AppError {
    fn from(err: Mp4Error) -> Self {
        match err {
            Mp4Error::Malformed(msg) => AppError::MalformedContainer(msg),
            Mp4Error::Io(e) => AppError::Io(e),
        }
    }
}
