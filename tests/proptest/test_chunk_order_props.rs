//! Property-based tests for chunk reassembly

use proptest::prelude::*;
use shellcall::execution::drain::ChunkLog;

/// Chunks plus a permutation of their indices to insert them in
fn chunks_and_order() -> impl Strategy<Value = (Vec<Vec<u8>>, Vec<usize>)> {
    prop::collection::vec(prop::collection::vec(any::<u8>(), 1..64), 0..40).prop_flat_map(
        |chunks| {
            let order: Vec<usize> = (0..chunks.len()).collect();
            (Just(chunks), Just(order).prop_shuffle())
        },
    )
}

proptest! {
    #[test]
    fn test_reassembly_ignores_insertion_order((chunks, order) in chunks_and_order()) {
        let mut log = ChunkLog::new();
        let sequences: Vec<u64> = chunks.iter().map(|_| log.next_sequence()).collect();

        for &i in &order {
            log.insert(sequences[i], chunks[i].clone());
        }

        prop_assert_eq!(log.assemble(), chunks.concat());
        prop_assert_eq!(log.len(), chunks.len());
    }

    #[test]
    fn test_split_text_survives_reassembly(text in "\\PC{0,200}", cut in 0usize..400) {
        let bytes = text.as_bytes();
        let cut = cut.min(bytes.len());
        let (head, tail) = bytes.split_at(cut);

        // Cutting may land inside a multi-byte character
        let mut log = ChunkLog::new();
        let first = log.next_sequence();
        let second = log.next_sequence();
        log.insert(second, tail.to_vec());
        log.insert(first, head.to_vec());

        prop_assert_eq!(log.into_text(), text);
    }

    #[test]
    fn test_empty_chunks_do_not_count(sizes in prop::collection::vec(0usize..8, 0..20)) {
        let mut log = ChunkLog::new();
        for size in &sizes {
            log.push(vec![b'x'; *size]);
        }

        let non_empty = sizes.iter().filter(|s| **s > 0).count();
        prop_assert_eq!(log.len(), non_empty);
        prop_assert_eq!(log.total_bytes(), sizes.iter().sum::<usize>());
    }
}
