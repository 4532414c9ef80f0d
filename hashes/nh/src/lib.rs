// copyright 2019 Kaz Wesley

//! NH, the Adiantum variant: four passes over 16-byte message units, each
//! pass keyed by the same key shifted by one stride.
//!
//! NH alone is only almost-universal over messages of one fixed size; it is
//! meant to be compressed further by Poly1305.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(test)]
#[macro_use]
extern crate hex_literal;
#[cfg(feature = "std")]
#[macro_use]
extern crate lazy_static;

use core::fmt;

mod generic;
#[cfg(target_arch = "x86_64")]
mod x86_64;

pub const PAIR_STRIDE: usize = 2;
pub const NUM_STRIDES: usize = 64;
pub const NUM_PASSES: usize = 4;

pub const MESSAGE_DWORDS: usize = PAIR_STRIDE * 2 * NUM_STRIDES;
pub const KEY_DWORDS: usize = MESSAGE_DWORDS + PAIR_STRIDE * 2 * (NUM_PASSES - 1);
pub const MESSAGE_UNIT: usize = PAIR_STRIDE * 8;
pub const MESSAGE_BYTES: usize = MESSAGE_DWORDS * 4;
pub const KEY_BYTES: usize = KEY_DWORDS * 4;
pub const HASH_BYTES: usize = NUM_PASSES * 8;

/// Key words covering the longest message chunk in every pass.
#[derive(Clone, PartialEq, Eq)]
pub struct NhKey {
    words: [u32; KEY_DWORDS],
}

impl fmt::Debug for NhKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NhKey").finish_non_exhaustive()
    }
}

impl NhKey {
    pub fn new(raw_key: &[u8; KEY_BYTES]) -> Self {
        let mut words = [0u32; KEY_DWORDS];
        for (w, b) in words.iter_mut().zip(raw_key.chunks_exact(4)) {
            *w = u32::from_le_bytes([b[0], b[1], b[2], b[3]]);
        }
        NhKey { words }
    }

    #[inline]
    pub fn words(&self) -> &[u32; KEY_DWORDS] {
        &self.words
    }
}

/// One 64-bit sum per pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct NhHash {
    pub sums: [u64; NUM_PASSES],
}

impl NhHash {
    pub fn to_bytes(&self) -> [u8; HASH_BYTES] {
        let mut out = [0u8; HASH_BYTES];
        for (o, s) in out.chunks_exact_mut(8).zip(self.sums.iter()) {
            o.copy_from_slice(&s.to_le_bytes());
        }
        out
    }

    pub fn from_bytes(bytes: &[u8; HASH_BYTES]) -> Self {
        let mut sums = [0u64; NUM_PASSES];
        for (s, b) in sums.iter_mut().zip(bytes.chunks_exact(8)) {
            let mut le = [0u8; 8];
            le.copy_from_slice(b);
            *s = u64::from_le_bytes(le);
        }
        NhHash { sums }
    }

    /// Pointwise sum modulo 2^64.
    #[must_use]
    pub fn combine(&self, other: &NhHash) -> NhHash {
        let mut sums = self.sums;
        for (s, o) in sums.iter_mut().zip(other.sums.iter()) {
            *s = s.wrapping_add(*o);
        }
        NhHash { sums }
    }
}

/// An NH implementation. Inputs have already been checked by [`nh`]: the
/// message is whole units, and `key` covers it in every pass.
pub trait NhBackend: Copy + Default + fmt::Debug + Send + Sync + 'static {
    const NAME: &'static str;
    fn nh(self, key: &[u32], message: &[u8]) -> NhHash;
}

/// Portable scalar NH.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Generic;

impl NhBackend for Generic {
    const NAME: &'static str = "generic";
    fn nh(self, key: &[u32], message: &[u8]) -> NhHash {
        generic::nh(key, message)
    }
}

/// AVX2 or SSE2 on x86_64, whichever the CPU supports; scalar elsewhere.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Simd;

impl NhBackend for Simd {
    const NAME: &'static str = "simd";
    #[cfg(target_arch = "x86_64")]
    fn nh(self, key: &[u32], message: &[u8]) -> NhHash {
        x86_64::nh(key, message)
    }
    #[cfg(not(target_arch = "x86_64"))]
    fn nh(self, key: &[u32], message: &[u8]) -> NhHash {
        generic::nh(key, message)
    }
}

/// NH of `message` under `key`, where `key` starts at the words for the
/// first unit. Panics unless `message` is a whole number of 16-byte units,
/// at most [`MESSAGE_BYTES`] long, and `key` extends three strides past its
/// last unit.
pub fn nh<B: NhBackend>(backend: B, key: &[u32], message: &[u8]) -> NhHash {
    assert!(
        message.len() % MESSAGE_UNIT == 0,
        "NH message length {} is not a multiple of {}",
        message.len(),
        MESSAGE_UNIT
    );
    assert!(
        message.len() <= MESSAGE_BYTES,
        "NH message length {} exceeds {}",
        message.len(),
        MESSAGE_BYTES
    );
    let needed = message.len() / 4 + PAIR_STRIDE * 2 * (NUM_PASSES - 1);
    assert!(
        key.len() >= needed,
        "NH key of {} words is too short for {} message bytes",
        key.len(),
        message.len()
    );
    backend.nh(key, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern<const N: usize>(seed: usize) -> [u8; N] {
        let mut out = [0u8; N];
        for (i, b) in out.iter_mut().enumerate() {
            *b = ((i * 31 + seed * 17 + 7) & 0xff) as u8;
        }
        out
    }

    fn check(len: usize, expected: [u8; HASH_BYTES]) {
        let key = NhKey::new(&pattern::<KEY_BYTES>(4));
        let msg = pattern::<MESSAGE_BYTES>(5);
        let g = nh(Generic, key.words(), &msg[..len]);
        let s = nh(Simd, key.words(), &msg[..len]);
        assert_eq!(g.to_bytes(), expected);
        assert_eq!(s, g);
    }

    #[test]
    fn one_unit() {
        check(
            16,
            hex!("52b55db2b6e73d39927004645448f025d22fb39233a8601612f369cd2214d90a"),
        );
    }

    #[test]
    fn six_units() {
        check(
            96,
            hex!("6cab302dfbd9d1a2ec84845b2efbade16c76c67e8a6a5118ec7f38ea26020546"),
        );
    }

    #[test]
    fn full_chunk() {
        check(
            MESSAGE_BYTES,
            hex!("8070fd6bcacf66e88030372b87d0e1e980f071e046cc5eec80b0ad9705c3ddeb"),
        );
    }

    #[test]
    fn empty_message_is_zero() {
        let key = NhKey::new(&[0xa5; KEY_BYTES]);
        assert_eq!(nh(Simd, key.words(), &[]), NhHash::default());
    }

    #[test]
    fn bytes_round_trip_and_combine() {
        let a = NhHash {
            sums: [u64::MAX, 1, 2, 0x0123_4567_89ab_cdef],
        };
        let b = NhHash {
            sums: [2, u64::MAX, 3, 0x1111_1111_1111_1111],
        };
        assert_eq!(NhHash::from_bytes(&a.to_bytes()), a);
        assert_eq!(a.combine(&b).sums, [1, 0, 5, 0x1234_5678_9abc_df00]);
        assert_eq!(a.combine(&b), b.combine(&a));
    }

    #[test]
    #[should_panic(expected = "not a multiple of 16")]
    fn rejects_partial_unit() {
        let key = NhKey::new(&[0; KEY_BYTES]);
        nh(Generic, key.words(), &[0u8; 20]);
    }

    #[test]
    #[should_panic(expected = "exceeds 1024")]
    fn rejects_oversized_message() {
        let key = NhKey::new(&[0; KEY_BYTES]);
        nh(Generic, key.words(), &[0u8; MESSAGE_BYTES + 16]);
    }
}
