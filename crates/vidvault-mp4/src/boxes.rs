//! ISO BMFF box header parsing and structural traversal.
//!
//! A box header is a 4-byte big-endian size plus a 4-byte type (fourcc).
//! `size == 1` switches to a 64-bit `largesize` field after the type;
//! `size == 0` means the box runs to end of file and is accepted only for
//! the last top-level box, never inside a nested region.

use std::fmt;
use std::io::{self, Read, Seek, SeekFrom};
use thiserror::Error;

/// MP4 structure errors.
#[derive(Debug, Error)]
pub enum Mp4Error {
    #[error("malformed container: {0}")]
    Malformed(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Four-character box type code.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FourCc(pub [u8; 4]);

pub const FTYP: FourCc = FourCc(*b"ftyp");
pub const MOOV: FourCc = FourCc(*b"moov");
pub const MDAT: FourCc = FourCc(*b"mdat");
pub const FREE: FourCc = FourCc(*b"free");
pub const TRAK: FourCc = FourCc(*b"trak");
pub const MDIA: FourCc = FourCc(*b"mdia");
pub const MINF: FourCc = FourCc(*b"minf");
pub const STBL: FourCc = FourCc(*b"stbl");
pub const TKHD: FourCc = FourCc(*b"tkhd");
pub const STCO: FourCc = FourCc(*b"stco");
pub const CO64: FourCc = FourCc(*b"co64");

impl fmt::Display for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
            // Safe: all bytes verified ASCII above
            write!(f, "{}", std::str::from_utf8(&self.0).unwrap_or("????"))
        } else {
            write!(f, "0x{:08x}", u32::from_be_bytes(self.0))
        }
    }
}

impl fmt::Debug for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FourCc({})", self)
    }
}

/// Parsed box header. Offsets and sizes are absolute within the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxHeader {
    pub kind: FourCc,
    /// Absolute offset of the box (start of its header).
    pub offset: u64,
    /// Total box size including the header.
    pub size: u64,
    /// Header length: 8, or 16 for the largesize form.
    pub header_len: u64,
}

impl BoxHeader {
    pub fn payload_offset(&self) -> u64 {
        self.offset + self.header_len
    }

    pub fn payload_size(&self) -> u64 {
        self.size - self.header_len
    }

    /// Offset one past the last byte of the box.
    pub fn end(&self) -> u64 {
        self.offset + self.size
    }
}

/// Container boxes whose payload is itself a sequence of boxes.
///
/// Traversal recurses only into these; every other payload is seeked over.
pub fn is_container(kind: FourCc) -> bool {
    matches!(kind, MOOV | TRAK | MDIA | MINF | STBL)
}

/// Read the box header at `offset`. `limit` is the end of the enclosing
/// region (file length at top level); a box claiming to extend past it is
/// malformed.
///
/// `allow_open_ended` permits the `size == 0` form, which runs to the end
/// of the region. That form is only meaningful for the last top-level box,
/// so nested walks pass `false` and treat it as malformed.
pub fn read_box_header<R: Read + Seek>(
    reader: &mut R,
    offset: u64,
    limit: u64,
    allow_open_ended: bool,
) -> Result<BoxHeader, Mp4Error> {
    if limit.saturating_sub(offset) < 8 {
        return Err(Mp4Error::Malformed(format!(
            "truncated box header at offset {}",
            offset
        )));
    }

    reader.seek(SeekFrom::Start(offset))?;
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;

    let size32 = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]);
    let kind = FourCc([buf[4], buf[5], buf[6], buf[7]]);

    let (size, header_len) = match size32 {
        1 => {
            // 64-bit largesize follows the type field
            if limit - offset < 16 {
                return Err(Mp4Error::Malformed(format!(
                    "truncated largesize header for {} at offset {}",
                    kind, offset
                )));
            }
            let mut buf64 = [0u8; 8];
            reader.read_exact(&mut buf64)?;
            let size = u64::from_be_bytes(buf64);
            if size < 16 {
                return Err(Mp4Error::Malformed(format!(
                    "largesize {} smaller than its header for {}",
                    size, kind
                )));
            }
            (size, 16)
        }
        0 => {
            if !allow_open_ended {
                return Err(Mp4Error::Malformed(format!(
                    "size-zero {} box at offset {} inside a nested region",
                    kind, offset
                )));
            }
            // Runs to the end of the region, so this is necessarily the
            // last box in it.
            (limit - offset, 8)
        }
        _ => {
            let size = u64::from(size32);
            if size < 8 {
                return Err(Mp4Error::Malformed(format!(
                    "box size {} smaller than its header for {}",
                    size, kind
                )));
            }
            (size, 8)
        }
    };

    // Checked: size >= header_len >= 8, so every box makes forward progress.
    // offset <= limit was established up front, so the subtraction cannot
    // wrap; comparing this way round also keeps a near-u64::MAX largesize
    // from overflowing the sum.
    if size > limit - offset {
        return Err(Mp4Error::Malformed(format!(
            "{} box of size {} at offset {} extends past end of region ({})",
            kind, size, offset, limit
        )));
    }

    Ok(BoxHeader {
        kind,
        offset,
        size,
        header_len,
    })
}

/// Read all top-level box headers of a file, seeking over payloads.
pub fn read_top_level_boxes<R: Read + Seek>(reader: &mut R) -> Result<Vec<BoxHeader>, Mp4Error> {
    let file_len = reader.seek(SeekFrom::End(0))?;
    let mut boxes = Vec::new();
    let mut offset = 0u64;
    while offset < file_len {
        let header = read_box_header(reader, offset, file_len, true)?;
        offset = header.end();
        boxes.push(header);
    }
    Ok(boxes)
}

/// Collect every box header nested within `[payload_offset, payload_end)`,
/// recursing only into container boxes.
///
/// Uses an explicit region stack instead of recursion; the headers are read
/// once, linearly, and no payload is loaded.
pub fn collect_nested<R: Read + Seek>(
    reader: &mut R,
    payload_offset: u64,
    payload_end: u64,
) -> Result<Vec<BoxHeader>, Mp4Error> {
    let mut headers = Vec::new();
    let mut stack: Vec<(u64, u64)> = vec![(payload_offset, payload_end)];

    while let Some((mut cursor, end)) = stack.pop() {
        while cursor < end {
            let header = read_box_header(reader, cursor, end, false)?;
            cursor = header.end();
            let descend = is_container(header.kind) && header.payload_size() > 0;
            let child = (header.payload_offset(), header.end());
            headers.push(header);
            if descend {
                // Resume remaining siblings after the child region.
                stack.push((cursor, end));
                stack.push(child);
                break;
            }
        }
    }

    Ok(headers)
}
