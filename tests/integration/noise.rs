//! Behavior under a dirty channel: junk symbols, damaged payloads, and
//! fragments from unrelated transfers.

use crate::*;

fn junk_lines() -> Vec<String> {
    vec![
        "https://example.com/table-7".into(),
        "WIFI:T:WPA;S:cafe;P:pw;;".into(),
        String::new(),
        "LUMEN1:short".into(),
        "LUMEN1:0011223344556677:9:3:YQ==:deadbeef:YQ==".into(),
    ]
}

#[test]
fn junk_interleaved_everywhere_is_harmless() {
    let data = test_bytes(400, 31);
    let lines = encode_lines(&data, "dirty.bin", 64, &IdentityCodec);
    let reference = complete(&lines);

    let mut channel = Vec::new();
    for line in &lines {
        channel.extend(junk_lines());
        channel.push(line.clone());
    }
    channel.extend(junk_lines());

    let finished = complete(&channel);
    assert_eq!(finished, reference);
}

#[test]
fn damaged_fragment_never_lands() {
    let lines = encode_lines(b"HELLOWORLD", "a.txt", 4, &IdentityCodec);

    // corrupt the payload field of every line while keeping its checksum
    let damaged: Vec<String> = lines
        .iter()
        .map(|line| {
            let (head, _payload) = line.rsplit_once(':').unwrap();
            format!("{head}:QkFEIQ==")
        })
        .collect();

    let mut rx = identity_receiver();
    for line in &damaged {
        assert!(!rx.process_frame(line).unwrap());
    }
    assert_eq!(rx.progress(), (0, 0));

    // the intact lines still complete normally afterwards
    feed(&mut rx, &lines);
    assert!(rx.is_finished());
}

#[test]
fn forged_header_on_the_active_transfer_cannot_complete_it() {
    let encoded = encode(b"HELLOWORLD", "a.txt", &config(4), &IdentityCodec);
    let lines: Vec<String> = encoded.fragments.iter().map(Fragment::to_line).collect();

    let mut rx = identity_receiver();
    rx.process_frame(&lines[0]).unwrap();
    rx.process_frame(&lines[1]).unwrap();

    // the transfer id is on screen for anyone in camera view; a forged
    // line reusing it must not count toward completion
    let forged = Fragment {
        index: 5,
        total: 9,
        payload: bytes::Bytes::from_static(b"XXXX"),
        ..encoded.fragments[0].clone()
    };
    assert!(!rx.process_frame(&forged.to_line()).unwrap());
    assert!(!rx.is_finished());
    assert_eq!(rx.missing_indices(), vec![2]);

    rx.process_frame(&lines[2]).unwrap();
    let finished = rx.into_finished().unwrap();
    assert_eq!(&finished.data[..], b"HELLOWORLD");
    assert_eq!(finished.file_name, "a.txt");
}

#[test]
fn concurrent_foreign_broadcast_does_not_abort() {
    let ours = encode_lines(b"the file we want", "want.txt", 4, &IdentityCodec);
    let theirs = encode_lines(b"a neighboring sender", "other.txt", 4, &IdentityCodec);

    // interleave the two broadcasts; ours arrives first
    let mut rx = identity_receiver();
    let mut ours_iter = ours.iter();
    rx.process_frame(ours_iter.next().unwrap()).unwrap();

    for (our, their) in ours_iter.zip(theirs.iter().cycle()) {
        assert!(!rx.process_frame(their).unwrap(), "foreign fragment accepted");
        rx.process_frame(our).unwrap();
    }

    let finished = rx.into_finished().unwrap();
    assert_eq!(&finished.data[..], b"the file we want");
    assert_eq!(finished.file_name, "want.txt");
}

#[test]
fn reset_policy_follows_the_newest_transfer() {
    let first = encode_lines(b"first transfer", "first.txt", 4, &IdentityCodec);
    let second = encode_lines(b"second transfer", "second.txt", 4, &IdentityCodec);

    let mut rx = Reassembler::new(
        Box::new(IdentityCodec),
        ForeignNoncePolicy::Reset,
    );
    rx.process_frame(&first[0]).unwrap();
    rx.process_frame(&first[1]).unwrap();

    // sender restarted with a fresh id; old progress is discarded
    feed(&mut rx, &second);
    let finished = rx.into_finished().unwrap();
    assert_eq!(finished.file_name, "second.txt");
    assert_eq!(&finished.data[..], b"second transfer");
}
