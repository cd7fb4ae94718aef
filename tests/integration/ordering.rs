//! Order independence and progress accounting.

use crate::*;

#[test]
fn any_permutation_yields_the_same_payload() {
    let data = test_bytes(1_000, 3);
    let lines = encode_lines(&data, "perm.bin", 64, &IdentityCodec);
    let reference = complete(&lines);

    for seed in 0..20 {
        let permuted = shuffled(&lines, seed);
        let finished = complete(&permuted);
        assert_eq!(finished, reference, "seed {seed} diverged");
    }
}

#[test]
fn duplicates_interleaved_at_arbitrary_positions() {
    let data = test_bytes(500, 5);
    let lines = encode_lines(&data, "dup.bin", 50, &IdentityCodec);
    let reference = complete(&lines);

    // triple every fragment, then shuffle the whole pile
    let mut pile: Vec<String> = lines
        .iter()
        .flat_map(|l| std::iter::repeat(l.clone()).take(3))
        .collect();
    pile = shuffled(&pile, 99);

    let finished = complete(&pile);
    assert_eq!(finished, reference);
}

#[test]
fn reverse_order_completes() {
    let lines = encode_lines(b"HELLOWORLD", "a.txt", 4, &IdentityCodec);
    let reversed: Vec<String> = lines.iter().rev().cloned().collect();
    assert_eq!(&complete(&reversed).data[..], b"HELLOWORLD");
}

#[test]
fn progress_is_monotone_and_steps_by_one() {
    let data = test_bytes(800, 13);
    let lines = encode_lines(&data, "mono.bin", 64, &IdentityCodec);
    let pile = {
        // duplicates mixed in to verify they do not move progress
        let mut pile = lines.clone();
        pile.extend(lines.iter().take(5).cloned());
        shuffled(&pile, 21)
    };

    let mut rx = identity_receiver();
    let mut last = 0usize;
    let mut finished_at: Option<usize> = None;

    for line in &pile {
        let accepted = rx.process_frame(line).unwrap();
        let (received, total) = rx.progress();

        if accepted {
            assert_eq!(received, last + 1, "accepted frame must advance by one");
        } else {
            assert_eq!(received, last, "rejected frame must not move progress");
        }
        last = received;

        if rx.is_finished() && finished_at.is_none() {
            finished_at = Some(received);
            assert_eq!(received, total, "completion exactly when received == total");
        }
    }

    assert!(finished_at.is_some(), "pile contains every fragment");
}

#[test]
fn withholding_any_single_fragment_blocks_completion() {
    let data = test_bytes(300, 17);
    let lines = encode_lines(&data, "hold.bin", 50, &IdentityCodec);

    for withheld in 0..lines.len() {
        let mut rx = identity_receiver();
        for (i, line) in lines.iter().enumerate() {
            if i != withheld {
                rx.process_frame(line).unwrap();
            }
        }
        assert!(!rx.is_finished(), "finished while index {withheld} missing");
        assert_eq!(rx.missing_indices(), vec![withheld as u32]);

        // supplying exactly the missing one completes the transfer
        assert!(rx.process_frame(&lines[withheld]).unwrap());
        assert!(rx.is_finished());
    }
}
