use hbsh_chacha::{
    block_generic, hchacha, invpermute, permute, Generic, Rounds, Simd, StreamKey, STATE_WORDS,
};
use proptest::prelude::*;

fn rounds() -> impl Strategy<Value = Rounds> {
    prop_oneof![Just(Rounds::R8), Just(Rounds::R12), Just(Rounds::R20)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn chacha_simd_matches_generic(
        key in any::<[u8; 32]>(),
        iv in any::<[u8; 16]>(),
        rounds in rounds(),
        len in 0usize..1100,
        offset in 0usize..16,
        seed in any::<u8>(),
    ) {
        let key = StreamKey::new(&key, rounds);
        // keep the counter far from wrapping
        let mut iv = iv;
        iv[2..4].copy_from_slice(&[0, 0]);
        let src: Vec<u8> = (0..len).map(|i| (i as u8).wrapping_mul(31) ^ seed).collect();

        let mut g = vec![0u8; len + offset];
        let mut s = vec![0u8; len + offset];
        key.chacha(Generic, &mut g[offset..], &src, &iv);
        key.chacha(Simd, &mut s[offset..], &src, &iv);
        prop_assert_eq!(&g[offset..], &s[offset..]);
    }

    #[test]
    fn xchacha_simd_matches_generic(
        key in any::<[u8; 32]>(),
        iv in any::<[u8; 32]>(),
        rounds in rounds(),
        len in 0usize..600,
    ) {
        let key = StreamKey::new(&key, rounds);
        let mut iv = iv;
        iv[26..28].copy_from_slice(&[0, 0]);
        let mut g = vec![0u8; len];
        let mut s = vec![0u8; len];
        key.xchacha_in_place(Generic, &mut g, &iv);
        key.xchacha_in_place(Simd, &mut s, &iv);
        prop_assert_eq!(g, s);
    }

    #[test]
    fn hchacha_simd_matches_generic(words in any::<[u32; STATE_WORDS]>(), rounds in rounds()) {
        prop_assert_eq!(hchacha(Generic, &words, rounds), hchacha(Simd, &words, rounds));
    }

    #[test]
    fn invpermute_undoes_permute(words in any::<[u32; STATE_WORDS]>(), rounds in rounds()) {
        let mut x = words;
        permute(&mut x, rounds);
        prop_assert_ne!(x, words);
        invpermute(&mut x, rounds);
        prop_assert_eq!(x, words);
    }

    #[test]
    fn xor_twice_is_identity(
        key in any::<[u8; 32]>(),
        iv in any::<[u8; 32]>(),
        msg in proptest::collection::vec(any::<u8>(), 0..300),
    ) {
        let key = StreamKey::new(&key, Rounds::R12);
        let mut iv = iv;
        iv[26..28].copy_from_slice(&[0, 0]);
        let mut buf = msg.clone();
        key.xchacha_in_place(Simd, &mut buf, &iv);
        key.xchacha_in_place(Generic, &mut buf, &iv);
        prop_assert_eq!(buf, msg);
    }
}

#[test]
fn block_generic_advances_only_counter() {
    let key = StreamKey::new(&[7; 32], Rounds::R20);
    let mut state = key.init_state(&[0x11; 16]);
    let before = state;
    let a = block_generic(&mut state, Rounds::R20);
    assert_eq!(state[12], before[12].wrapping_add(1));
    assert_eq!(state[13..], before[13..]);
    assert_eq!(state[..12], before[..12]);
    let b = block_generic(&mut state, Rounds::R20);
    assert_ne!(a, b);
}
