//! Encode-then-reassemble across codecs and file shapes.

use crate::*;
use lumen_core::codec::BrotliCodec;

#[test]
fn identity_round_trip() {
    let lines = encode_lines(b"HELLOWORLD", "a.txt", 4, &IdentityCodec);
    let finished = complete(&lines);
    assert_eq!(&finished.data[..], b"HELLOWORLD");
    assert_eq!(finished.file_name, "a.txt");
}

#[test]
fn brotli_round_trip_binary() {
    let data = test_bytes(10_000, 7);
    let lines = encode_lines(&data, "blob.bin", 100, &BrotliCodec);

    let mut rx = Reassembler::new(Box::new(BrotliCodec), ForeignNoncePolicy::Ignore);
    feed(&mut rx, &lines);
    assert!(rx.is_finished());
    assert_eq!(&rx.into_finished().unwrap().data[..], &data[..]);
}

#[test]
fn brotli_round_trip_compressible_text() {
    let data = "all work and no play makes a dull transfer. ".repeat(500);
    let lines = encode_lines(data.as_bytes(), "text.txt", 100, &BrotliCodec);

    // highly repetitive input should need far fewer fragments than raw size implies
    assert!(lines.len() < data.len() / 100);

    let mut rx = Reassembler::new(Box::new(BrotliCodec), ForeignNoncePolicy::Ignore);
    feed(&mut rx, &lines);
    assert_eq!(&rx.into_finished().unwrap().data[..], data.as_bytes());
}

#[test]
fn empty_file_round_trip() {
    let lines = encode_lines(b"", "empty", 100, &BrotliCodec);
    assert!(!lines.is_empty());

    let mut rx = Reassembler::new(Box::new(BrotliCodec), ForeignNoncePolicy::Ignore);
    feed(&mut rx, &lines);
    let finished = rx.into_finished().unwrap();
    assert!(finished.data.is_empty());
    assert_eq!(finished.file_name, "empty");
}

#[test]
fn single_byte_round_trip() {
    let lines = encode_lines(b"x", "one.bin", 100, &BrotliCodec);
    let mut rx = Reassembler::new(Box::new(BrotliCodec), ForeignNoncePolicy::Ignore);
    feed(&mut rx, &lines);
    assert_eq!(&rx.into_finished().unwrap().data[..], b"x");
}

#[test]
fn non_ascii_file_name_round_trip() {
    let lines = encode_lines(b"payload", "r\u{e9}sum\u{e9} 2026.pdf", 4, &IdentityCodec);
    let finished = complete(&lines);
    assert_eq!(finished.file_name, "r\u{e9}sum\u{e9} 2026.pdf");
}

#[test]
fn chunk_boundary_exact_multiple() {
    let data = test_bytes(400, 11);
    let lines = encode_lines(&data, "exact.bin", 100, &IdentityCodec);
    assert_eq!(lines.len(), 4);
    assert_eq!(&complete(&lines).data[..], &data[..]);
}
