mod common;

use std::fs;
use std::io::Cursor;

use common::*;
use vidvault_mp4::boxes::{self, CO64, MDAT, MOOV, STCO};
use vidvault_mp4::{write_faststart, Mp4Error};

/// Parse all chunk-offset entries (widened to u64) from a serialized file.
fn read_chunk_offsets(bytes: &[u8]) -> Vec<u64> {
    let mut cursor = Cursor::new(bytes);
    let top = boxes::read_top_level_boxes(&mut cursor).expect("parse top-level boxes");
    let moov = top.iter().find(|b| b.kind == MOOV).expect("moov present");
    let nested = boxes::collect_nested(&mut cursor, moov.payload_offset(), moov.end())
        .expect("walk moov");

    let mut offsets = Vec::new();
    for header in nested {
        let payload = &bytes[header.payload_offset() as usize..header.end() as usize];
        match header.kind {
            STCO => {
                let count = u32::from_be_bytes(payload[4..8].try_into().unwrap()) as usize;
                for i in 0..count {
                    let at = 8 + i * 4;
                    offsets.push(
                        u32::from_be_bytes(payload[at..at + 4].try_into().unwrap()) as u64,
                    );
                }
            }
            CO64 => {
                let count = u32::from_be_bytes(payload[4..8].try_into().unwrap()) as usize;
                for i in 0..count {
                    let at = 8 + i * 8;
                    offsets.push(u64::from_be_bytes(payload[at..at + 8].try_into().unwrap()));
                }
            }
            _ => {}
        }
    }
    offsets
}

fn top_level_kinds(bytes: &[u8]) -> Vec<String> {
    let mut cursor = Cursor::new(bytes);
    boxes::read_top_level_boxes(&mut cursor)
        .expect("parse top-level boxes")
        .iter()
        .map(|b| b.kind.to_string())
        .collect()
}

fn mdat_payload_of(bytes: &[u8]) -> Vec<u8> {
    let mut cursor = Cursor::new(bytes);
    let top = boxes::read_top_level_boxes(&mut cursor).expect("parse top-level boxes");
    let mdat = top.iter().find(|b| b.kind == MDAT).expect("mdat present");
    bytes[mdat.payload_offset() as usize..mdat.end() as usize].to_vec()
}

fn run_faststart(input_bytes: &[u8]) -> Vec<u8> {
    let (_input, input_path) = write_temp(input_bytes);
    let output = tempfile::NamedTempFile::new().expect("create output temp");
    write_faststart(&input_path, output.path()).expect("faststart rewrite");
    fs::read(output.path()).expect("read output")
}

#[test]
fn test_trailing_moov_is_moved_after_ftyp() {
    let payload = sample_payload(100);
    let input = trailing_moov_file(1920, 1080, &payload, &[32, 60, 95]);
    let output = run_faststart(&input);

    assert_eq!(top_level_kinds(&output), vec!["ftyp", "moov", "mdat"]);
}

#[test]
fn test_output_length_and_payload_are_preserved() {
    let payload = sample_payload(50 * 1024);
    let input = trailing_moov_file(1920, 1080, &payload, &[32, 4096, 32_000]);
    let output = run_faststart(&input);

    assert_eq!(output.len(), input.len());
    assert_eq!(mdat_payload_of(&output), payload);
}

#[test]
fn test_offsets_shift_by_exactly_moov_size() {
    let payload = sample_payload(100);
    let original_offsets = [32u32, 60, 95];
    let input = trailing_moov_file(1920, 1080, &payload, &original_offsets);

    let mut cursor = Cursor::new(&input);
    let top = boxes::read_top_level_boxes(&mut cursor).unwrap();
    let moov_size = top.iter().find(|b| b.kind == MOOV).unwrap().size;

    let output = run_faststart(&input);
    let rewritten = read_chunk_offsets(&output);
    let expected: Vec<u64> = original_offsets
        .iter()
        .map(|&o| u64::from(o) + moov_size)
        .collect();
    assert_eq!(rewritten, expected);
}

#[test]
fn test_everything_but_order_and_offsets_is_unchanged() {
    let payload = sample_payload(256);
    let input = trailing_moov_file(640, 480, &payload, &[32]);
    let output = run_faststart(&input);

    // ftyp block identical
    assert_eq!(&output[..24], &input[..24]);

    let mut cursor = Cursor::new(&output);
    let top = boxes::read_top_level_boxes(&mut cursor).unwrap();
    let moov = top.iter().find(|b| b.kind == MOOV).unwrap();
    let moov_out = &output[moov.offset as usize..moov.end() as usize];

    let mut cursor = Cursor::new(&input);
    let top_in = boxes::read_top_level_boxes(&mut cursor).unwrap();
    let moov_in_header = top_in.iter().find(|b| b.kind == MOOV).unwrap();
    let moov_in = &input[moov_in_header.offset as usize..moov_in_header.end() as usize];

    // Same length, and any differing bytes must sit inside the stco entries
    assert_eq!(moov_out.len(), moov_in.len());
    let differing: Vec<usize> = (0..moov_in.len())
        .filter(|&i| moov_in[i] != moov_out[i])
        .collect();
    // One 4-byte entry rewritten
    assert!(!differing.is_empty());
    assert!(differing.len() <= 4);
}

#[test]
fn test_faststart_is_idempotent() {
    let payload = sample_payload(512);
    let input = trailing_moov_file(1080, 1920, &payload, &[32, 300]);
    let first = run_faststart(&input);
    let second = run_faststart(&first);

    assert_eq!(first, second);
}

#[test]
fn test_already_faststart_layout_is_copied_verbatim() {
    let track = track_with_offsets(tkhd_v0(720, 720), stco(&[100]));
    let mut input = ftyp();
    input.extend_from_slice(&moov(&[track]));
    input.extend_from_slice(&mdat(&sample_payload(64)));

    let output = run_faststart(&input);
    assert_eq!(output, input);
}

#[test]
fn test_co64_tables_are_rewritten_too() {
    let payload = sample_payload(128);
    let track = track_with_offsets(tkhd_v0(1920, 1080), co64(&[32, 90]));
    let mut input = ftyp();
    input.extend_from_slice(&mdat(&payload));
    input.extend_from_slice(&moov(&[track]));

    let mut cursor = Cursor::new(&input);
    let top = boxes::read_top_level_boxes(&mut cursor).unwrap();
    let moov_size = top.iter().find(|b| b.kind == MOOV).unwrap().size;

    let output = run_faststart(&input);
    assert_eq!(read_chunk_offsets(&output), vec![32 + moov_size, 90 + moov_size]);
}

#[test]
fn test_mixed_stco_and_co64_tracks() {
    let payload = sample_payload(128);
    let video = track_with_offsets(tkhd_v0(1920, 1080), stco(&[32]));
    let audio = track_with_offsets(tkhd_v0(0, 0), co64(&[80]));
    let mut input = ftyp();
    input.extend_from_slice(&mdat(&payload));
    input.extend_from_slice(&moov(&[video, audio]));

    let mut cursor = Cursor::new(&input);
    let top = boxes::read_top_level_boxes(&mut cursor).unwrap();
    let moov_size = top.iter().find(|b| b.kind == MOOV).unwrap().size;

    let output = run_faststart(&input);
    assert_eq!(read_chunk_offsets(&output), vec![32 + moov_size, 80 + moov_size]);
}

#[test]
fn test_free_box_between_mdat_and_moov_keeps_relative_order() {
    let payload = sample_payload(64);
    let track = track_with_offsets(tkhd_v0(640, 480), stco(&[32]));
    let mut input = ftyp();
    input.extend_from_slice(&mdat(&payload));
    input.extend_from_slice(&free(40));
    input.extend_from_slice(&moov(&[track]));

    let output = run_faststart(&input);
    assert_eq!(
        top_level_kinds(&output),
        vec!["ftyp", "moov", "mdat", "free"]
    );
    assert_eq!(output.len(), input.len());
}

#[test]
fn test_missing_moov_is_malformed() {
    let mut input = ftyp();
    input.extend_from_slice(&mdat(&sample_payload(16)));
    let (_input, path) = write_temp(&input);
    let output = tempfile::NamedTempFile::new().unwrap();

    let err = write_faststart(&path, output.path()).unwrap_err();
    assert!(matches!(err, Mp4Error::Malformed(_)));
}

#[test]
fn test_missing_mdat_is_malformed() {
    let track = track_with_offsets(tkhd_v0(640, 480), stco(&[]));
    let mut input = ftyp();
    input.extend_from_slice(&moov(&[track]));
    let (_input, path) = write_temp(&input);
    let output = tempfile::NamedTempFile::new().unwrap();

    let err = write_faststart(&path, output.path()).unwrap_err();
    assert!(matches!(err, Mp4Error::Malformed(_)));
}

#[test]
fn test_truncated_container_is_malformed_not_panic() {
    let payload = sample_payload(100);
    let input = trailing_moov_file(1920, 1080, &payload, &[32]);
    // Drop the tail of the moov box so its declared size overruns the file
    let truncated = &input[..input.len() - 10];
    let (_input, path) = write_temp(truncated);
    let output = tempfile::NamedTempFile::new().unwrap();

    let err = write_faststart(&path, output.path()).unwrap_err();
    assert!(matches!(err, Mp4Error::Malformed(_)));
}

#[test]
fn test_offset_table_overrunning_box_is_malformed() {
    // stco that declares more entries than its payload holds
    let mut bad_stco_payload = Vec::new();
    bad_stco_payload.extend_from_slice(&0u32.to_be_bytes());
    bad_stco_payload.extend_from_slice(&100u32.to_be_bytes()); // claims 100 entries
    bad_stco_payload.extend_from_slice(&32u32.to_be_bytes()); // holds 1
    let track = track_with_offsets(tkhd_v0(640, 480), boxed(b"stco", &bad_stco_payload));

    let mut input = ftyp();
    input.extend_from_slice(&mdat(&sample_payload(64)));
    input.extend_from_slice(&moov(&[track]));
    let (_input, path) = write_temp(&input);
    let output = tempfile::NamedTempFile::new().unwrap();

    let err = write_faststart(&path, output.path()).unwrap_err();
    assert!(matches!(err, Mp4Error::Malformed(_)));
}

#[test]
fn test_size_zero_box_inside_moov_is_malformed() {
    // A size-zero box nested in moov would swallow the stco behind it, so
    // the rewrite could not shift those offsets. It must fail rather than
    // emit a container still pointing at the old mdat position.
    let mut moov_payload = Vec::new();
    moov_payload.extend_from_slice(&0u32.to_be_bytes());
    moov_payload.extend_from_slice(b"free");
    moov_payload.extend_from_slice(&stco(&[32]));
    let mut input = ftyp();
    input.extend_from_slice(&mdat(&sample_payload(64)));
    input.extend_from_slice(&boxed(b"moov", &moov_payload));
    let (_input, path) = write_temp(&input);
    let output = tempfile::NamedTempFile::new().unwrap();

    let err = write_faststart(&path, output.path()).unwrap_err();
    assert!(matches!(err, Mp4Error::Malformed(_)));
}

#[test]
fn test_stco_overflow_after_shift_is_malformed() {
    let track = track_with_offsets(tkhd_v0(640, 480), stco(&[u32::MAX - 4]));
    let mut input = ftyp();
    input.extend_from_slice(&mdat(&sample_payload(16)));
    input.extend_from_slice(&moov(&[track]));
    let (_input, path) = write_temp(&input);
    let output = tempfile::NamedTempFile::new().unwrap();

    let err = write_faststart(&path, output.path()).unwrap_err();
    assert!(matches!(err, Mp4Error::Malformed(_)));
}
