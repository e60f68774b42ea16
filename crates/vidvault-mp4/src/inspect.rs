//! Container inspection: geometry extraction from track headers.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use vidvault_core::ContainerGeometry;

use crate::boxes::{self, BoxHeader, Mp4Error, MOOV, TKHD};

// tkhd payload sizes up to and including width/height, by version.
const TKHD_V0_LEN: usize = 84;
const TKHD_V1_LEN: usize = 96;

/// Extract the visual track geometry from the container at `path`.
///
/// Walks the `moov` box tree and reads width/height from the first `tkhd`
/// with non-zero dimensions (audio tracks carry zeros). Returns a zero
/// geometry when every track header is dimensionless, which classifies as
/// unclassified downstream.
pub fn inspect_geometry(path: &Path) -> Result<ContainerGeometry, Mp4Error> {
    let mut file = File::open(path)?;
    let top_level = boxes::read_top_level_boxes(&mut file)?;

    let moov = top_level
        .iter()
        .find(|b| b.kind == MOOV)
        .ok_or_else(|| Mp4Error::Malformed("no moov box".to_string()))?;

    let nested = boxes::collect_nested(&mut file, moov.payload_offset(), moov.end())?;
    let track_headers: Vec<&BoxHeader> = nested.iter().filter(|b| b.kind == TKHD).collect();
    if track_headers.is_empty() {
        return Err(Mp4Error::Malformed("no tkhd box in moov".to_string()));
    }

    for header in track_headers {
        let geometry = read_tkhd_geometry(&mut file, header)?;
        if geometry.width > 0 && geometry.height > 0 {
            tracing::debug!(
                width = geometry.width,
                height = geometry.height,
                "extracted container geometry"
            );
            return Ok(geometry);
        }
    }

    Ok(ContainerGeometry::new(0, 0))
}

/// Read width/height from a tkhd payload.
///
/// Width and height are 16.16 fixed-point values at the end of the box; the
/// fields before them are wider in version 1 (64-bit times/duration).
fn read_tkhd_geometry(file: &mut File, header: &BoxHeader) -> Result<ContainerGeometry, Mp4Error> {
    let payload_len = header.payload_size().min(TKHD_V1_LEN as u64) as usize;
    if payload_len == 0 {
        return Err(Mp4Error::Malformed("empty tkhd box".to_string()));
    }

    let mut buf = vec![0u8; payload_len];
    file.seek(SeekFrom::Start(header.payload_offset()))?;
    file.read_exact(&mut buf)?;

    let version = buf[0];
    let required = match version {
        0 => TKHD_V0_LEN,
        1 => TKHD_V1_LEN,
        v => {
            return Err(Mp4Error::Malformed(format!(
                "unsupported tkhd version {}",
                v
            )))
        }
    };
    if buf.len() < required {
        return Err(Mp4Error::Malformed("truncated tkhd box".to_string()));
    }

    let fixed = |at: usize| u32::from_be_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]]);
    // 16.16 fixed point; the integer part is the pixel dimension
    let width = fixed(required - 8) >> 16;
    let height = fixed(required - 4) >> 16;

    Ok(ContainerGeometry::new(width, height))
}
