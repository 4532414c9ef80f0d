use hbsh_poly1305::{hash, Generic, Poly1305Key, Poly1305State, FourWay, BLOCK_SIZE};
use proptest::collection::vec;
use proptest::prelude::*;

const LIMB: u32 = 1 << 26;

fn check_bounds(state: &Poly1305State) -> Result<(), TestCaseError> {
    let h = state.limbs();
    prop_assert!(h[0] < LIMB);
    prop_assert!(h[1] <= LIMB + 63);
    prop_assert!(h[2] < LIMB);
    prop_assert!(h[3] < LIMB);
    prop_assert!(h[4] < LIMB);
    Ok(())
}

fn blocks() -> impl Strategy<Value = Vec<u8>> {
    (0usize..24).prop_flat_map(|n| vec(any::<u8>(), n * BLOCK_SIZE))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn four_way_matches_generic(key in any::<[u8; 16]>(), msg in vec(any::<u8>(), 0..700)) {
        let key = Poly1305Key::new(&key);
        prop_assert_eq!(hash(Generic, &key, &msg), hash(FourWay, &key, &msg));
    }

    #[test]
    fn limbs_stay_bounded(
        key in any::<[u8; 16]>(),
        chunks in vec((blocks(), any::<bool>(), any::<bool>()), 1..8),
    ) {
        let key = Poly1305Key::new(&key);
        let mut state = Poly1305State::new();
        for (data, hibit, four_way) in &chunks {
            if *four_way {
                state.blocks(FourWay, &key, data, *hibit);
            } else {
                state.blocks(Generic, &key, data, *hibit);
            }
            check_bounds(&state)?;
        }
    }

    #[test]
    fn all_ones_input_stays_bounded(key in any::<[u8; 16]>(), n in 1usize..40) {
        let key = Poly1305Key::new(&key);
        let data = vec![0xff; n * BLOCK_SIZE];
        let mut g = Poly1305State::new();
        let mut s = Poly1305State::new();
        g.blocks(Generic, &key, &data, true);
        s.blocks(FourWay, &key, &data, true);
        check_bounds(&g)?;
        check_bounds(&s)?;
        prop_assert_eq!(g.emit(), s.emit());
    }

    #[test]
    fn split_blocks_match_one_call(
        key in any::<[u8; 16]>(),
        msg in blocks(),
        cut in any::<prop::sample::Index>(),
    ) {
        let key = Poly1305Key::new(&key);
        let nblocks = msg.len() / BLOCK_SIZE;
        let at = cut.index(nblocks + 1) * BLOCK_SIZE;
        let mut split = Poly1305State::new();
        split.blocks(FourWay, &key, &msg[..at], true);
        split.blocks(Generic, &key, &msg[at..], true);
        prop_assert_eq!(split.emit(), hash(Generic, &key, &msg));
    }
}
