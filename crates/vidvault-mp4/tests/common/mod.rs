//! Synthetic MP4 builders for container tests.
//!
//! These build minimal but structurally valid box trees: a real ftyp, an
//! mdat with recognizable payload bytes, and a moov carrying tkhd geometry
//! and chunk-offset tables pointing into the mdat payload.

#![allow(dead_code)]

use std::io::Write;
use std::path::PathBuf;

use tempfile::NamedTempFile;

pub fn boxed(kind: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + 8);
    out.extend_from_slice(&((payload.len() as u32 + 8).to_be_bytes()));
    out.extend_from_slice(kind);
    out.extend_from_slice(payload);
    out
}

fn concat(children: &[Vec<u8>]) -> Vec<u8> {
    children.iter().flatten().copied().collect()
}

/// 24-byte ftyp: major brand isom, minor version 0, brands isom + mp41.
pub fn ftyp() -> Vec<u8> {
    let mut payload = Vec::new();
    payload.extend_from_slice(b"isom");
    payload.extend_from_slice(&0u32.to_be_bytes());
    payload.extend_from_slice(b"isom");
    payload.extend_from_slice(b"mp41");
    boxed(b"ftyp", &payload)
}

pub fn mdat(payload: &[u8]) -> Vec<u8> {
    boxed(b"mdat", payload)
}

pub fn free(len: usize) -> Vec<u8> {
    boxed(b"free", &vec![0u8; len])
}

/// Version 0 tkhd with 16.16 fixed-point width/height in the trailing bytes.
pub fn tkhd_v0(width: u32, height: u32) -> Vec<u8> {
    let mut payload = vec![0u8; 84];
    payload[76..80].copy_from_slice(&(width << 16).to_be_bytes());
    payload[80..84].copy_from_slice(&(height << 16).to_be_bytes());
    boxed(b"tkhd", &payload)
}

/// Version 1 tkhd (64-bit times, so width/height sit 12 bytes later).
pub fn tkhd_v1(width: u32, height: u32) -> Vec<u8> {
    let mut payload = vec![0u8; 96];
    payload[0] = 1;
    payload[88..92].copy_from_slice(&(width << 16).to_be_bytes());
    payload[92..96].copy_from_slice(&(height << 16).to_be_bytes());
    boxed(b"tkhd", &payload)
}

pub fn stco(offsets: &[u32]) -> Vec<u8> {
    let mut payload = Vec::new();
    payload.extend_from_slice(&0u32.to_be_bytes()); // version + flags
    payload.extend_from_slice(&(offsets.len() as u32).to_be_bytes());
    for offset in offsets {
        payload.extend_from_slice(&offset.to_be_bytes());
    }
    boxed(b"stco", &payload)
}

pub fn co64(offsets: &[u64]) -> Vec<u8> {
    let mut payload = Vec::new();
    payload.extend_from_slice(&0u32.to_be_bytes());
    payload.extend_from_slice(&(offsets.len() as u32).to_be_bytes());
    for offset in offsets {
        payload.extend_from_slice(&offset.to_be_bytes());
    }
    boxed(b"co64", &payload)
}

pub fn trak(children: &[Vec<u8>]) -> Vec<u8> {
    boxed(b"trak", &concat(children))
}

pub fn moov(children: &[Vec<u8>]) -> Vec<u8> {
    boxed(b"moov", &concat(children))
}

/// Track with geometry plus a chunk-offset table nested at the usual depth:
/// trak/mdia/minf/stbl.
pub fn track_with_offsets(tkhd: Vec<u8>, offset_table: Vec<u8>) -> Vec<u8> {
    let stbl = boxed(b"stbl", &offset_table);
    let minf = boxed(b"minf", &stbl);
    let mdia = boxed(b"mdia", &minf);
    trak(&[tkhd, mdia])
}

/// A container in the common non-streaming layout: ftyp, mdat, trailing
/// moov. `chunk_offsets` should point into the mdat payload (which begins at
/// byte 32: 24-byte ftyp plus the 8-byte mdat header).
pub fn trailing_moov_file(
    width: u32,
    height: u32,
    mdat_payload: &[u8],
    chunk_offsets: &[u32],
) -> Vec<u8> {
    let track = track_with_offsets(tkhd_v0(width, height), stco(chunk_offsets));
    let mut file = ftyp();
    file.extend_from_slice(&mdat(mdat_payload));
    file.extend_from_slice(&moov(&[track]));
    file
}

/// Patterned sample bytes so payload corruption is visible in assertions.
pub fn sample_payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

/// Write bytes to a temp file, returning the handle (deletes on drop) and
/// its path.
pub fn write_temp(bytes: &[u8]) -> (NamedTempFile, PathBuf) {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(bytes).expect("write temp file");
    file.flush().expect("flush temp file");
    let path = file.path().to_path_buf();
    (file, path)
}
