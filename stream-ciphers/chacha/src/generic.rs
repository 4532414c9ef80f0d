//! Portable one-block-at-a-time ChaCha; the reference the vector backend is
//! checked against.

use crate::{Rounds, BLOCK_SIZE, STATE_WORDS};

#[inline(always)]
fn quarter_round(x: &mut [u32; STATE_WORDS], a: usize, b: usize, c: usize, d: usize) {
    x[a] = x[a].wrapping_add(x[b]);
    x[d] = (x[d] ^ x[a]).rotate_left(16);
    x[c] = x[c].wrapping_add(x[d]);
    x[b] = (x[b] ^ x[c]).rotate_left(12);
    x[a] = x[a].wrapping_add(x[b]);
    x[d] = (x[d] ^ x[a]).rotate_left(8);
    x[c] = x[c].wrapping_add(x[d]);
    x[b] = (x[b] ^ x[c]).rotate_left(7);
}

#[inline(always)]
fn inv_quarter_round(x: &mut [u32; STATE_WORDS], a: usize, b: usize, c: usize, d: usize) {
    x[b] = x[b].rotate_right(7) ^ x[c];
    x[c] = x[c].wrapping_sub(x[d]);
    x[d] = x[d].rotate_right(8) ^ x[a];
    x[a] = x[a].wrapping_sub(x[b]);
    x[b] = x[b].rotate_right(12) ^ x[c];
    x[c] = x[c].wrapping_sub(x[d]);
    x[d] = x[d].rotate_right(16) ^ x[a];
    x[a] = x[a].wrapping_sub(x[b]);
}

/// Apply `rounds / 2` double rounds to `x` in place.
pub fn permute(x: &mut [u32; STATE_WORDS], rounds: Rounds) {
    for _ in 0..rounds.double_rounds() {
        // columns
        quarter_round(x, 0, 4, 8, 12);
        quarter_round(x, 1, 5, 9, 13);
        quarter_round(x, 2, 6, 10, 14);
        quarter_round(x, 3, 7, 11, 15);
        // diagonals
        quarter_round(x, 0, 5, 10, 15);
        quarter_round(x, 1, 6, 11, 12);
        quarter_round(x, 2, 7, 8, 13);
        quarter_round(x, 3, 4, 9, 14);
    }
}

/// Exact inverse of [`permute`].
pub fn invpermute(x: &mut [u32; STATE_WORDS], rounds: Rounds) {
    for _ in 0..rounds.double_rounds() {
        inv_quarter_round(x, 3, 4, 9, 14);
        inv_quarter_round(x, 2, 7, 8, 13);
        inv_quarter_round(x, 1, 6, 11, 12);
        inv_quarter_round(x, 0, 5, 10, 15);
        inv_quarter_round(x, 3, 7, 11, 15);
        inv_quarter_round(x, 2, 6, 10, 14);
        inv_quarter_round(x, 1, 5, 9, 13);
        inv_quarter_round(x, 0, 4, 8, 12);
    }
}

/// One block of keystream words. The 32-bit block counter (word 12) of
/// `state` is advanced; callers bound the message length so it never wraps.
pub fn block_generic(state: &mut [u32; STATE_WORDS], rounds: Rounds) -> [u32; STATE_WORDS] {
    let mut x = *state;
    permute(&mut x, rounds);
    for (w, &s) in x.iter_mut().zip(state.iter()) {
        *w = w.wrapping_add(s);
    }
    state[12] = state[12].wrapping_add(1);
    x
}

pub(crate) fn xor_keystream(state: &mut [u32; STATE_WORDS], rounds: Rounds, data: &mut [u8]) {
    for chunk in data.chunks_mut(BLOCK_SIZE) {
        let words = block_generic(state, rounds);
        let mut stream = [0u8; BLOCK_SIZE];
        for (o, w) in stream.chunks_exact_mut(4).zip(words.iter()) {
            o.copy_from_slice(&w.to_le_bytes());
        }
        for (d, k) in chunk.iter_mut().zip(stream.iter()) {
            *d ^= *k;
        }
    }
}

pub(crate) fn hchacha(state: &[u32; STATE_WORDS], rounds: Rounds) -> [u32; 8] {
    let mut x = *state;
    permute(&mut x, rounds);
    let mut out = [0u32; 8];
    out[..4].copy_from_slice(&x[..4]);
    out[4..].copy_from_slice(&x[12..]);
    out
}
