// copyright 2019 Kaz Wesley

//! ChaCha over `ppv-lite86` vectors: four blocks per permutation when the
//! input is long enough, one 128-bit row per state word group otherwise.

use crate::{Rounds, BLOCK_SIZE, STATE_WORDS};
use ppv_lite86::{ArithOps, BitOps32, LaneWords4, Machine, MultiLane, StoreBytes, Vec4};

const LOG2_BUFBLOCKS: usize = 2;
const BUFBLOCKS: usize = 1 << LOG2_BUFBLOCKS;
const BUFSZ: usize = BLOCK_SIZE * BUFBLOCKS;

#[derive(Clone)]
pub(crate) struct State<V> {
    pub(crate) a: V,
    pub(crate) b: V,
    pub(crate) c: V,
    pub(crate) d: V,
}

#[inline(always)]
pub(crate) fn round<V: ArithOps + BitOps32>(mut x: State<V>) -> State<V> {
    x.a += x.b;
    x.d ^= x.a;
    x.d = x.d.rotate_each_word_right16();
    x.c += x.d;
    x.b ^= x.c;
    x.b = x.b.rotate_each_word_right20();
    x.a += x.b;
    x.d ^= x.a;
    x.d = x.d.rotate_each_word_right24();
    x.c += x.d;
    x.b ^= x.c;
    x.b = x.b.rotate_each_word_right25();
    x
}

#[inline(always)]
pub(crate) fn diagonalize<V: LaneWords4>(mut x: State<V>) -> State<V> {
    x.b = x.b.shuffle_lane_words3012();
    x.c = x.c.shuffle_lane_words2301();
    x.d = x.d.shuffle_lane_words1230();
    x
}

#[inline(always)]
pub(crate) fn undiagonalize<V: LaneWords4>(mut x: State<V>) -> State<V> {
    x.b = x.b.shuffle_lane_words1230();
    x.c = x.c.shuffle_lane_words2301();
    x.d = x.d.shuffle_lane_words3012();
    x
}

#[inline(always)]
fn row<M: Machine>(m: M, state: &[u32; STATE_WORDS], i: usize) -> M::u32x4 {
    m.vec([state[i], state[i + 1], state[i + 2], state[i + 3]])
}

#[inline(always)]
fn row_words<V: Vec4<u32> + Copy>(v: V) -> [u32; 4] {
    [v.extract(0), v.extract(1), v.extract(2), v.extract(3)]
}

#[inline(always)]
fn rounds_narrow<M: Machine>(m: M, state: &[u32; STATE_WORDS], drounds: u32) -> State<M::u32x4> {
    let mut x = State {
        a: row(m, state, 0),
        b: row(m, state, 4),
        c: row(m, state, 8),
        d: row(m, state, 12),
    };
    for _ in 0..drounds {
        x = round(x);
        x = undiagonalize(round(diagonalize(x)));
    }
    x
}

/// Four consecutive blocks. Only the low counter word is incremented, and it
/// wraps at 2^32 exactly as the scalar path does.
#[inline(always)]
fn refill_wide<M: Machine>(
    m: M,
    state: &mut [u32; STATE_WORDS],
    drounds: u32,
    out: &mut [u8; BUFSZ],
) {
    let k = row(m, state, 0);
    let b = row(m, state, 4);
    let c = row(m, state, 8);
    let inc: M::u32x4 = m.vec([1, 0, 0, 0]);
    let d0 = row(m, state, 12);
    let d1 = d0 + inc;
    let d2 = d1 + inc;
    let d3 = d2 + inc;
    let mut x = State {
        a: M::u32x4x4::from_lanes([k, k, k, k]),
        b: M::u32x4x4::from_lanes([b, b, b, b]),
        c: M::u32x4x4::from_lanes([c, c, c, c]),
        d: M::u32x4x4::from_lanes([d0, d1, d2, d3]),
    };
    for _ in 0..drounds {
        x = round(x);
        x = undiagonalize(round(diagonalize(x)));
    }
    let (xa, xb, xc, xd) = (
        x.a.to_lanes(),
        x.b.to_lanes(),
        x.c.to_lanes(),
        x.d.to_lanes(),
    );
    let sd = [d0, d1, d2, d3];
    for (i, block) in out.chunks_exact_mut(BLOCK_SIZE).enumerate() {
        (xa[i] + k).write_le(&mut block[0..16]);
        (xb[i] + b).write_le(&mut block[16..32]);
        (xc[i] + c).write_le(&mut block[32..48]);
        (xd[i] + sd[i]).write_le(&mut block[48..64]);
    }
    state[12] = (d3 + inc).extract(0);
}

#[inline(always)]
fn refill_narrow<M: Machine>(
    m: M,
    state: &mut [u32; STATE_WORDS],
    drounds: u32,
    out: &mut [u8; BLOCK_SIZE],
) {
    let x = rounds_narrow(m, state, drounds);
    (x.a + row(m, state, 0)).write_le(&mut out[0..16]);
    (x.b + row(m, state, 4)).write_le(&mut out[16..32]);
    (x.c + row(m, state, 8)).write_le(&mut out[32..48]);
    (x.d + row(m, state, 12)).write_le(&mut out[48..64]);
    state[12] = state[12].wrapping_add(1);
}

#[inline(always)]
fn xor_in(data: &mut [u8], stream: &[u8]) {
    for (d, k) in data.iter_mut().zip(stream) {
        *d ^= *k;
    }
}

dispatch!(m, Mach, {
    fn apply_keystream(state: &mut [u32; STATE_WORDS], drounds: u32, data: &mut [u8]) {
        let mut wide = data.chunks_exact_mut(BUFSZ);
        for chunk in &mut wide {
            let mut buf = [0u8; BUFSZ];
            refill_wide(m, state, drounds, &mut buf);
            xor_in(chunk, &buf);
        }
        for chunk in wide.into_remainder().chunks_mut(BLOCK_SIZE) {
            let mut buf = [0u8; BLOCK_SIZE];
            refill_narrow(m, state, drounds, &mut buf);
            xor_in(chunk, &buf);
        }
    }
});

dispatch_light128!(m, Mach, {
    fn hchacha_rows(state: &[u32; STATE_WORDS], drounds: u32) -> [u32; 8] {
        let x = rounds_narrow(m, state, drounds);
        let a = row_words(x.a);
        let d = row_words(x.d);
        [a[0], a[1], a[2], a[3], d[0], d[1], d[2], d[3]]
    }
});

pub(crate) fn xor_keystream(state: &mut [u32; STATE_WORDS], rounds: Rounds, data: &mut [u8]) {
    apply_keystream(state, rounds.double_rounds(), data);
}

pub(crate) fn hchacha(state: &[u32; STATE_WORDS], rounds: Rounds) -> [u32; 8] {
    hchacha_rows(state, rounds.double_rounds())
}
