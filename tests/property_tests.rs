use ahed::{decode_bytes, encode_bytes, Decoder, Encoder, EncoderConfig, Padding, Symbol, Tree};
use proptest::prelude::*;

fn check_tree(tree: &Tree) -> Result<(), TestCaseError> {
    prop_assert!(tree.validate().is_ok(), "{:?}", tree.validate());

    let mut orders: Vec<usize> = (0..tree.node_count())
        .map(|order| tree.node(tree.node_at(order).unwrap()).order())
        .collect();
    orders.sort_unstable();
    prop_assert!(orders.iter().copied().eq(0..tree.node_count()));

    let nyt_leaves = (0..tree.node_count())
        .filter_map(|order| tree.node_at(order))
        .filter(|&id| tree.node(id).symbol() == Symbol::Nyt && tree.node(id).is_leaf())
        .count();
    prop_assert_eq!(nyt_leaves, 1);
    Ok(())
}

proptest! {
    #[test]
    fn test_roundtrip_any_bytes(input in prop::collection::vec(any::<u8>(), 0..2000)) {
        let coded = encode_bytes(&input).unwrap();
        prop_assert_eq!(decode_bytes(&coded).unwrap(), input);
    }

    #[test]
    fn test_roundtrip_small_alphabet(input in prop::collection::vec(0u8..6, 0..500)) {
        let coded = encode_bytes(&input).unwrap();
        prop_assert_eq!(decode_bytes(&coded).unwrap(), input);
    }

    #[test]
    fn test_encoding_is_deterministic(input in prop::collection::vec(any::<u8>(), 0..300)) {
        prop_assert_eq!(encode_bytes(&input).unwrap(), encode_bytes(&input).unwrap());
    }

    #[test]
    fn test_paddings_differ_only_in_last_byte(input in prop::collection::vec(0u8..8, 1..200)) {
        let nyt = encode_bytes(&input).unwrap();
        let mut encoder = Encoder::with_config(
            Vec::new(),
            EncoderConfig::new().with_padding(Padding::Zero),
        );
        encoder.encode_all(&input).unwrap();
        let (zero, _) = encoder.finish().unwrap();

        prop_assert_eq!(nyt.len(), zero.len());
        let last = nyt.len() - 1;
        prop_assert_eq!(&nyt[..last], &zero[..last]);
    }

    #[test]
    fn test_trees_stay_congruent(input in prop::collection::vec(0u8..10, 1..120)) {
        let mut encoder = Encoder::new(Vec::new());
        let mut trees = Vec::with_capacity(input.len());
        for &byte in &input {
            encoder.encode_byte(byte).unwrap();
            check_tree(encoder.tree())?;
            trees.push(encoder.tree().clone());
        }
        let (coded, summary) = encoder.finish().unwrap();
        prop_assert_eq!(summary.uncoded_size, input.len() as u64);
        prop_assert_eq!(summary.coded_size, coded.len() as u64);

        let mut decoder = Decoder::new(&coded[..]);
        for (expected_byte, expected_tree) in input.iter().zip(&trees) {
            prop_assert_eq!(decoder.decode_byte().unwrap(), Some(*expected_byte));
            prop_assert_eq!(decoder.tree(), expected_tree);
        }
        prop_assert_eq!(decoder.decode_byte().unwrap(), None);
    }

    #[test]
    fn test_frequency_never_rises_with_order(input in prop::collection::vec(any::<u8>(), 0..400)) {
        let mut encoder = Encoder::new(std::io::sink());
        encoder.encode_all(&input).unwrap();
        let tree = encoder.tree();
        let freqs: Vec<u64> = (0..tree.node_count())
            .map(|order| tree.node(tree.node_at(order).unwrap()).freq())
            .collect();
        prop_assert!(freqs.windows(2).all(|w| w[0] >= w[1]));
        prop_assert_eq!(freqs[0], input.len() as u64);
    }
}

#[test]
fn test_every_byte_value_twice() {
    let input: Vec<u8> = (0..=255u8).chain((0..=255u8).rev()).collect();
    let coded = encode_bytes(&input).unwrap();
    assert_eq!(decode_bytes(&coded).unwrap(), input);
}

#[test]
fn test_skewed_input_compresses() {
    let input: Vec<u8> = b"the quick brown fox jumps over the lazy dog. "
        .iter()
        .copied()
        .cycle()
        .take(20_000)
        .collect();
    let coded = encode_bytes(&input).unwrap();
    assert!(coded.len() < input.len() * 3 / 4, "{} bytes", coded.len());
    assert_eq!(decode_bytes(&coded).unwrap(), input);
}
