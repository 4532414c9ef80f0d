// copyright 2019 Kaz Wesley

//! Poly1305 used as an ε-almost-∆-universal hash.
//!
//! This is not the Poly1305 MAC: the final addition of `s` is skipped, and
//! the digest is only meaningful inside a larger hash-then-encrypt
//! construction. [`mac`] adds it back, for checking against published MAC
//! vectors.
//!
//! Arithmetic is modulo 2^130 - 5 on five 26-bit limbs.

#![no_std]

#[cfg(test)]
#[macro_use]
extern crate hex_literal;

use core::fmt;

mod four_way;
mod generic;

pub const BLOCK_SIZE: usize = 16;
pub const KEY_SIZE: usize = 16;
pub const DIGEST_SIZE: usize = 16;

const MASK26: u64 = 0x3ff_ffff;
const HIBIT: u32 = 1 << 24;

#[inline(always)]
fn le32(b: &[u8], i: usize) -> u32 {
    u32::from_le_bytes([b[i], b[i + 1], b[i + 2], b[i + 3]])
}

/// Split a 16-byte block into five 26-bit limbs; `hibit` lands at bit 128.
#[inline(always)]
fn load_limbs(block: &[u8], hibit: u32) -> [u32; 5] {
    [
        le32(block, 0) & 0x3ff_ffff,
        (le32(block, 3) >> 2) & 0x3ff_ffff,
        (le32(block, 6) >> 4) & 0x3ff_ffff,
        (le32(block, 9) >> 6) & 0x3ff_ffff,
        (le32(block, 12) >> 8) | hibit,
    ]
}

/// Clamped `r` and its powers `r^1..r^4`.
#[derive(Clone, PartialEq, Eq)]
pub struct Poly1305Key {
    r: [u32; 5],
    /// `r0, r1, 5*r1, r2, 5*r2, r3, 5*r3, r4, 5*r4` for each power.
    powers: [[u32; 9]; 4],
}

impl fmt::Debug for Poly1305Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Poly1305Key").finish_non_exhaustive()
    }
}

impl Poly1305Key {
    pub fn new(raw_key: &[u8; KEY_SIZE]) -> Self {
        let r = [
            le32(raw_key, 0) & 0x3ff_ffff,
            (le32(raw_key, 3) >> 2) & 0x3ff_ff03,
            (le32(raw_key, 6) >> 4) & 0x3ff_c0ff,
            (le32(raw_key, 9) >> 6) & 0x3f0_3fff,
            (le32(raw_key, 12) >> 8) & 0x00f_ffff,
        ];
        let mut key = Poly1305Key {
            r,
            powers: [[0; 9]; 4],
        };
        key.compute_powers();
        key
    }

    fn compute_powers(&mut self) {
        let [r0, r1, r2, r3, r4] = self.r.map(u64::from);
        let (s1, s2, s3, s4) = (r1 * 5, r2 * 5, r3 * 5, r4 * 5);
        let [mut h0, mut h1, mut h2, mut h3, mut h4] = self.r.map(u64::from);
        for i in 0..self.powers.len() {
            self.powers[i] = [h0, h1, h1 * 5, h2, h2 * 5, h3, h3 * 5, h4, h4 * 5].map(|x| x as u32);
            let d0 = h0 * r0 + h1 * s4 + h2 * s3 + h3 * s2 + h4 * s1;
            let d1 = h0 * r1 + h1 * r0 + h2 * s4 + h3 * s3 + h4 * s2;
            let d2 = h0 * r2 + h1 * r1 + h2 * r0 + h3 * s4 + h4 * s3;
            let d3 = h0 * r3 + h1 * r2 + h2 * r1 + h3 * r0 + h4 * s4;
            let d4 = h0 * r4 + h1 * r3 + h2 * r2 + h3 * r1 + h4 * r0;
            let d1 = d1 + (d0 >> 26);
            h0 = d0 & MASK26;
            let d2 = d2 + (d1 >> 26);
            h1 = d1 & MASK26;
            let d3 = d3 + (d2 >> 26);
            h2 = d2 & MASK26;
            let d4 = d4 + (d3 >> 26);
            h3 = d3 & MASK26;
            h0 += (d4 >> 26) * 5;
            h4 = d4 & MASK26;
            h1 += h0 >> 26;
            h0 &= MASK26;
        }
    }

    /// `r^(n+1)` as `[r0, r1, 5*r1, r2, 5*r2, r3, 5*r3, r4, 5*r4]`.
    pub fn power(&self, n: usize) -> &[u32; 9] {
        &self.powers[n]
    }
}

/// A block-processing strategy. All backends compute the same polynomial, so
/// [`Poly1305State::emit`] yields the same digest whichever one fed the state.
pub trait Poly1305Backend: Copy + Default + fmt::Debug + Send + Sync + 'static {
    const NAME: &'static str;

    /// `data` is a whole number of blocks; `hibit` is `1 << 24` for full
    /// blocks and 0 for a padded final block.
    fn blocks(self, key: &Poly1305Key, h: &mut [u32; 5], data: &[u8], hibit: u32);
}

/// One block per multiplication.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Generic;

impl Poly1305Backend for Generic {
    const NAME: &'static str = "generic";
    fn blocks(self, key: &Poly1305Key, h: &mut [u32; 5], data: &[u8], hibit: u32) {
        generic::blocks(key, h, data, hibit)
    }
}

/// Scalar, four blocks per reduction using `r^1..r^4`. Same digest as
/// [`Generic`], fewer carry passes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FourWay;

impl Poly1305Backend for FourWay {
    const NAME: &'static str = "four-way";
    fn blocks(self, key: &Poly1305Key, h: &mut [u32; 5], data: &[u8], hibit: u32) {
        four_way::blocks(key, h, data, hibit)
    }
}

/// Unreduced accumulator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Poly1305State {
    h: [u32; 5],
}

impl Poly1305State {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current limbs. Between calls h1 <= 2^26 + 63 and the others are
    /// <= 2^26 - 1.
    pub fn limbs(&self) -> [u32; 5] {
        self.h
    }

    /// Absorb whole 16-byte blocks. Panics if `data` is not a multiple of
    /// the block size.
    pub fn blocks<B: Poly1305Backend>(
        &mut self,
        backend: B,
        key: &Poly1305Key,
        data: &[u8],
        hibit: bool,
    ) {
        assert!(
            data.len() % BLOCK_SIZE == 0,
            "Poly1305 blocks input of {} bytes is not a multiple of {}",
            data.len(),
            BLOCK_SIZE
        );
        let hibit = if hibit { HIBIT } else { 0 };
        backend.blocks(key, &mut self.h, data, hibit);
    }

    /// Absorb arbitrary-length input; a partial final block gets a single
    /// `1` byte, then zeros.
    pub fn tail<B: Poly1305Backend>(&mut self, backend: B, key: &Poly1305Key, src: &[u8]) {
        let full = src.len() - src.len() % BLOCK_SIZE;
        self.blocks(backend, key, &src[..full], true);
        let rest = &src[full..];
        if !rest.is_empty() {
            let mut block = [0u8; BLOCK_SIZE];
            block[..rest.len()].copy_from_slice(rest);
            block[rest.len()] = 1;
            self.blocks(backend, key, &block, false);
        }
    }

    /// Reduce modulo 2^130 - 5 and return the low 128 bits, little endian.
    pub fn emit(&self) -> [u8; DIGEST_SIZE] {
        let [mut h0, mut h1, mut h2, mut h3, mut h4] = self.h;

        h2 = h2.wrapping_add(h1 >> 26);
        h1 &= 0x3ff_ffff;
        h3 = h3.wrapping_add(h2 >> 26);
        h2 &= 0x3ff_ffff;
        h4 = h4.wrapping_add(h3 >> 26);
        h3 &= 0x3ff_ffff;
        h0 = h0.wrapping_add((h4 >> 26) * 5);
        h4 &= 0x3ff_ffff;
        h1 = h1.wrapping_add(h0 >> 26);
        h0 &= 0x3ff_ffff;

        // h + -p
        let mut g0 = h0.wrapping_add(5);
        let mut g1 = h1.wrapping_add(g0 >> 26);
        g0 &= 0x3ff_ffff;
        let mut g2 = h2.wrapping_add(g1 >> 26);
        g1 &= 0x3ff_ffff;
        let mut g3 = h3.wrapping_add(g2 >> 26);
        g2 &= 0x3ff_ffff;
        let mut g4 = h4.wrapping_add(g3 >> 26).wrapping_sub(1 << 26);
        g3 &= 0x3ff_ffff;

        // h if h < p, else h - p
        let mut mask = (g4 >> 31).wrapping_sub(1);
        g0 &= mask;
        g1 &= mask;
        g2 &= mask;
        g3 &= mask;
        g4 &= mask;
        mask = !mask;
        h0 = (h0 & mask) | g0;
        h1 = (h1 & mask) | g1;
        h2 = (h2 & mask) | g2;
        h3 = (h3 & mask) | g3;
        h4 = (h4 & mask) | g4;

        let words = [
            h0 | (h1 << 26),
            (h1 >> 6) | (h2 << 20),
            (h2 >> 12) | (h3 << 14),
            (h3 >> 18) | (h4 << 8),
        ];
        let mut out = [0u8; DIGEST_SIZE];
        for (o, w) in out.chunks_exact_mut(4).zip(words.iter()) {
            o.copy_from_slice(&w.to_le_bytes());
        }
        out
    }
}

/// The εA∆U digest of `msg`.
pub fn hash<B: Poly1305Backend>(backend: B, key: &Poly1305Key, msg: &[u8]) -> [u8; DIGEST_SIZE] {
    let mut state = Poly1305State::new();
    state.tail(backend, key, msg);
    state.emit()
}

/// The full Poly1305 MAC: the digest under `key[..16]` plus `key[16..]`
/// modulo 2^128.
pub fn mac<B: Poly1305Backend>(backend: B, key: &[u8; 32], msg: &[u8]) -> [u8; DIGEST_SIZE] {
    let mut r = [0u8; KEY_SIZE];
    r.copy_from_slice(&key[..16]);
    let mut s = [0u8; 16];
    s.copy_from_slice(&key[16..]);
    let digest = hash(backend, &Poly1305Key::new(&r), msg);
    u128::from_le_bytes(digest)
        .wrapping_add(u128::from_le_bytes(s))
        .to_le_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RFC_KEY: [u8; 32] =
        hex!("85d6be7857556d337f4452fe42d506a80103808afb0db2fd4abff6af4149f51b");
    const RFC_MSG: &[u8] = b"Cryptographic Forum Research Group";

    fn pattern(n: usize, seed: usize) -> [u8; 256] {
        let mut out = [0u8; 256];
        for (i, b) in out.iter_mut().enumerate().take(n) {
            *b = ((i * 31 + seed * 17 + 7) & 0xff) as u8;
        }
        out
    }

    #[test]
    fn rfc_7539_mac() {
        let expected = hex!("a8061dc1305136c6c22b8baf0c0127a9");
        assert_eq!(mac(Generic, &RFC_KEY, RFC_MSG), expected);
        assert_eq!(mac(FourWay, &RFC_KEY, RFC_MSG), expected);
    }

    #[test]
    fn rfc_7539_hash() {
        let mut r = [0u8; 16];
        r.copy_from_slice(&RFC_KEY[..16]);
        let key = Poly1305Key::new(&r);
        let expected = hex!("a7039d36354384c8776c94ffcab7318d");
        assert_eq!(hash(Generic, &key, RFC_MSG), expected);
        assert_eq!(hash(FourWay, &key, RFC_MSG), expected);
    }

    #[test]
    fn pattern_vectors() {
        let mut raw = [0u8; 16];
        raw.copy_from_slice(&pattern(16, 1)[..16]);
        let key = Poly1305Key::new(&raw);
        let msg = pattern(200, 2);
        let expected = hex!("f4d1478342f97f8c52c12d1c57ff71ca");
        assert_eq!(hash(Generic, &key, &msg[..200]), expected);
        assert_eq!(hash(FourWay, &key, &msg[..200]), expected);

        let msg = pattern(64, 3);
        let expected = hex!("69c030209dc1db4008210f41b2dd47c0");
        assert_eq!(hash(Generic, &key, &msg[..64]), expected);
        assert_eq!(hash(FourWay, &key, &msg[..64]), expected);
    }

    #[test]
    fn empty_message_hashes_to_zero() {
        let key = Poly1305Key::new(&[0xff; 16]);
        assert_eq!(hash(Generic, &key, &[]), [0u8; 16]);
    }

    #[test]
    fn first_power_is_r() {
        let key = Poly1305Key::new(&RFC_KEY[..16].try_into().unwrap());
        let p = key.power(0);
        assert_eq!([p[0], p[1], p[3], p[5], p[7]], key.r);
        assert_eq!(p[2], 5 * p[1]);
    }

    #[test]
    #[should_panic(expected = "not a multiple of 16")]
    fn blocks_rejects_partial_block() {
        let key = Poly1305Key::new(&[1; 16]);
        Poly1305State::new().blocks(Generic, &key, &[0u8; 17], true);
    }
}
