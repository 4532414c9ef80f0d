use hbsh_nh::{nh, Generic, NhHash, NhKey, Simd, KEY_BYTES, MESSAGE_UNIT, NUM_STRIDES};
use proptest::collection::vec;
use proptest::prelude::*;

fn key() -> impl Strategy<Value = NhKey> {
    vec(any::<u8>(), KEY_BYTES).prop_map(|raw| {
        let mut bytes = [0u8; KEY_BYTES];
        bytes.copy_from_slice(&raw);
        NhKey::new(&bytes)
    })
}

fn message() -> impl Strategy<Value = Vec<u8>> {
    (0..=NUM_STRIDES).prop_flat_map(|units| vec(any::<u8>(), units * MESSAGE_UNIT))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn simd_matches_generic(key in key(), msg in message(), offset in 0usize..16) {
        // misalign the message
        let mut buf = vec![0u8; offset + msg.len()];
        buf[offset..].copy_from_slice(&msg);
        let g = nh(Generic, key.words(), &msg);
        let s = nh(Simd, key.words(), &buf[offset..]);
        prop_assert_eq!(g, s);
    }

    #[test]
    fn shifted_key_matches(key in key(), units in 1usize..8, skip in 0usize..16) {
        // hashing a suffix of the key is how a zero-padded final unit is
        // placed after the full units
        let msg = vec![0x5a; units * MESSAGE_UNIT];
        let words = &key.words()[skip * 4..];
        prop_assert_eq!(nh(Generic, words, &msg), nh(Simd, words, &msg));
    }

    #[test]
    fn combine_is_commutative(a in any::<[u64; 4]>(), b in any::<[u64; 4]>()) {
        let (a, b) = (NhHash { sums: a }, NhHash { sums: b });
        prop_assert_eq!(a.combine(&b), b.combine(&a));
        prop_assert_eq!(NhHash::from_bytes(&a.to_bytes()), a);
    }
}
