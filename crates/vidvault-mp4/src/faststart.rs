//! Faststart rewrite: move the `moov` index box ahead of `mdat`.
//!
//! Progressive playback needs the index before the sample data. This module
//! reorders the top-level boxes so `moov` sits immediately after `ftyp`, and
//! rewrites every chunk-offset entry (`stco`/`co64`) inside `moov` to account
//! for how far `mdat` shifts. The output is byte-identical to the input
//! except for box order and the adjusted offsets; sample data is copied
//! verbatim with a bounded buffer.

use std::fs::File;
use std::io::{self, BufWriter, Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::boxes::{self, BoxHeader, Mp4Error, CO64, FTYP, MDAT, MOOV, STCO};

/// Chunk-offset table variants share one rewrite; only the entry width
/// differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OffsetTableKind {
    /// 32-bit entries (`stco`)
    Stco,
    /// 64-bit entries (`co64`)
    Co64,
}

impl OffsetTableKind {
    fn entry_width(self) -> usize {
        match self {
            OffsetTableKind::Stco => 4,
            OffsetTableKind::Co64 => 8,
        }
    }
}

/// One chunk-offset table located inside the in-memory `moov` buffer.
#[derive(Debug)]
struct OffsetTable {
    kind: OffsetTableKind,
    /// Buffer index of the first entry.
    entries_pos: usize,
    entry_count: usize,
}

/// Rewrite the container at `input` into `output` with a faststart layout.
///
/// When `moov` already precedes `mdat` the shift is zero and the rewrite
/// degenerates to a plain copy, so applying the transform twice is a no-op.
/// On failure the partially written output must be discarded by the caller;
/// nothing here treats it as valid.
pub fn write_faststart(input: &Path, output: &Path) -> Result<(), Mp4Error> {
    let mut reader = File::open(input)?;
    let top_level = boxes::read_top_level_boxes(&mut reader)?;

    let ftyp_idx = top_level
        .iter()
        .position(|b| b.kind == FTYP)
        .ok_or_else(|| Mp4Error::Malformed("no ftyp box".to_string()))?;
    let moov_idx = top_level
        .iter()
        .position(|b| b.kind == MOOV)
        .ok_or_else(|| Mp4Error::Malformed("no moov box".to_string()))?;
    let mdat_idx = top_level
        .iter()
        .position(|b| b.kind == MDAT)
        .ok_or_else(|| Mp4Error::Malformed("no mdat box".to_string()))?;

    // The moov box is the index, not sample data; its size is bounded by the
    // header validation against file length, so buffering it is safe.
    let moov = top_level[moov_idx];
    let mut moov_buf = vec![0u8; moov.size as usize];
    reader.seek(SeekFrom::Start(moov.offset))?;
    reader.read_exact(&mut moov_buf)?;

    // New top-level order: original order with moov re-inserted right after
    // ftyp. Everything else, including free boxes, keeps its relative order.
    let mut order: Vec<usize> = Vec::with_capacity(top_level.len());
    for (i, _) in top_level.iter().enumerate() {
        if i == moov_idx {
            continue;
        }
        order.push(i);
        if i == ftyp_idx {
            order.push(moov_idx);
        }
    }

    // How far mdat moves under the new layout.
    let mut cursor = 0u64;
    let mut new_mdat_offset = 0u64;
    for &i in &order {
        if i == mdat_idx {
            new_mdat_offset = cursor;
        }
        cursor += top_level[i].size;
    }
    let delta = new_mdat_offset as i64 - top_level[mdat_idx].offset as i64;

    if delta != 0 {
        let tables = find_offset_tables(&moov_buf, moov.header_len as usize)?;
        tracing::debug!(
            delta,
            tables = tables.len(),
            moov_size = moov.size,
            "rewriting chunk offsets for faststart layout"
        );
        for table in &tables {
            shift_entries(&mut moov_buf, table, delta)?;
        }
    }

    let mut writer = BufWriter::new(File::create(output)?);
    for &i in &order {
        let header = &top_level[i];
        if i == moov_idx {
            writer.write_all(&moov_buf)?;
            continue;
        }
        reader.seek(SeekFrom::Start(header.offset))?;
        let copied = io::copy(&mut (&mut reader).take(header.size), &mut writer)?;
        if copied != header.size {
            return Err(Mp4Error::Malformed(format!(
                "short read copying {} box: {} of {} bytes",
                header.kind, copied, header.size
            )));
        }
    }
    writer.flush()?;

    Ok(())
}

/// Locate every chunk-offset table nested inside the moov buffer.
fn find_offset_tables(moov_buf: &[u8], header_len: usize) -> Result<Vec<OffsetTable>, Mp4Error> {
    let mut cursor = Cursor::new(moov_buf);
    let nested = boxes::collect_nested(&mut cursor, header_len as u64, moov_buf.len() as u64)?;

    let mut tables = Vec::new();
    for header in &nested {
        let kind = match header.kind {
            STCO => OffsetTableKind::Stco,
            CO64 => OffsetTableKind::Co64,
            _ => continue,
        };
        tables.push(parse_offset_table(moov_buf, header, kind)?);
    }
    Ok(tables)
}

/// Parse a full-box chunk-offset table header: version/flags then a 32-bit
/// entry count, entries following.
fn parse_offset_table(
    moov_buf: &[u8],
    header: &BoxHeader,
    kind: OffsetTableKind,
) -> Result<OffsetTable, Mp4Error> {
    let payload_pos = header.payload_offset() as usize;
    let payload_len = header.payload_size() as usize;
    if payload_len < 8 {
        return Err(Mp4Error::Malformed(format!(
            "truncated {} box",
            header.kind
        )));
    }

    let count_pos = payload_pos + 4;
    let entry_count = u32::from_be_bytes([
        moov_buf[count_pos],
        moov_buf[count_pos + 1],
        moov_buf[count_pos + 2],
        moov_buf[count_pos + 3],
    ]) as usize;

    let entries_len = entry_count
        .checked_mul(kind.entry_width())
        .ok_or_else(|| Mp4Error::Malformed("chunk offset count overflow".to_string()))?;
    if payload_len - 8 < entries_len {
        return Err(Mp4Error::Malformed(format!(
            "{} entry table overruns its box: {} entries in {} payload bytes",
            header.kind,
            entry_count,
            payload_len - 8
        )));
    }

    Ok(OffsetTable {
        kind,
        entries_pos: payload_pos + 8,
        entry_count,
    })
}

/// Add `delta` to every entry of an offset table, in place.
fn shift_entries(moov_buf: &mut [u8], table: &OffsetTable, delta: i64) -> Result<(), Mp4Error> {
    let width = table.kind.entry_width();
    for i in 0..table.entry_count {
        let at = table.entries_pos + i * width;
        match table.kind {
            OffsetTableKind::Stco => {
                let old = u32::from_be_bytes([
                    moov_buf[at],
                    moov_buf[at + 1],
                    moov_buf[at + 2],
                    moov_buf[at + 3],
                ]);
                let new = i64::from(old) + delta;
                let new = u32::try_from(new).map_err(|_| {
                    Mp4Error::Malformed(format!(
                        "rewritten chunk offset {} out of 32-bit range",
                        new
                    ))
                })?;
                moov_buf[at..at + 4].copy_from_slice(&new.to_be_bytes());
            }
            OffsetTableKind::Co64 => {
                let mut raw = [0u8; 8];
                raw.copy_from_slice(&moov_buf[at..at + 8]);
                let old = u64::from_be_bytes(raw);
                let new = (old as i128) + i128::from(delta);
                let new = u64::try_from(new).map_err(|_| {
                    Mp4Error::Malformed(format!(
                        "rewritten chunk offset {} out of 64-bit range",
                        new
                    ))
                })?;
                moov_buf[at..at + 8].copy_from_slice(&new.to_be_bytes());
            }
        }
    }
    Ok(())
}
