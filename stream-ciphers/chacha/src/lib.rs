// copyright 2019 Kaz Wesley

//! ChaCha, HChaCha and XChaCha with a portable backend and a SIMD backend that
//! produce identical output.
//!
//! Usage:
//! ```
//! use hbsh_chacha::{Rounds, Simd, StreamKey};
//!
//! let key = StreamKey::new(b"very secret key-the most secret.", Rounds::R20);
//! // 192-bit nonce, then 64-bit stream position
//! let mut iv = [0u8; 32];
//! iv[..8].copy_from_slice(b"my nonce");
//! let plaintext = b"The quick brown fox jumps over the lazy dog.";
//!
//! let mut buffer = plaintext.to_vec();
//! key.xchacha_in_place(Simd, &mut buffer, &iv);
//! assert_ne!(&buffer[..], &plaintext[..]);
//! key.xchacha_in_place(Simd, &mut buffer, &iv);
//! assert_eq!(&buffer[..], &plaintext[..]);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(test)]
#[macro_use]
extern crate hex_literal;
#[macro_use]
extern crate ppv_lite86;

use core::fmt;

mod generic;
mod simd;

pub use crate::generic::{block_generic, invpermute, permute};

pub const KEY_SIZE: usize = 32;
/// 32-bit stream position, then 96-bit nonce.
pub const CHACHA_IV_SIZE: usize = 16;
/// 192-bit nonce, then 64-bit stream position.
pub const XCHACHA_IV_SIZE: usize = 32;
pub const BLOCK_SIZE: usize = 64;
pub const STATE_WORDS: usize = 16;

const CONSTANTS: [u32; 4] = [0x6170_7865, 0x3320_646e, 0x7962_2d32, 0x6b20_6574];

/// Number of ChaCha rounds. Only the three standard variants are supported.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Rounds {
    R8,
    R12,
    R20,
}

impl Rounds {
    pub const fn count(self) -> u32 {
        match self {
            Rounds::R8 => 8,
            Rounds::R12 => 12,
            Rounds::R20 => 20,
        }
    }

    #[inline(always)]
    pub const fn double_rounds(self) -> u32 {
        self.count() / 2
    }
}

impl TryFrom<u32> for Rounds {
    type Error = InvalidRounds;
    fn try_from(n: u32) -> Result<Self, InvalidRounds> {
        match n {
            8 => Ok(Rounds::R8),
            12 => Ok(Rounds::R12),
            20 => Ok(Rounds::R20),
            n => Err(InvalidRounds(n)),
        }
    }
}

impl fmt::Display for Rounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.count())
    }
}

/// A round count other than 8, 12 or 20 was requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InvalidRounds(pub u32);

impl fmt::Display for InvalidRounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported ChaCha round count {} (expected 8, 12 or 20)", self.0)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for InvalidRounds {}

/// A keystream implementation. Every backend must produce the same bytes as
/// [`Generic`] for every state and input length.
pub trait StreamCipherBackend: Copy + Default + fmt::Debug + Send + Sync + 'static {
    const NAME: &'static str;

    /// XOR `data` with keystream starting at `state`, advancing the block
    /// counter by one per (possibly partial) 64-byte block.
    fn xor_keystream(self, state: &mut [u32; STATE_WORDS], rounds: Rounds, data: &mut [u8]);

    /// Words 0..4 and 12..16 of the permuted state, without the feed-forward.
    fn hchacha(self, state: &[u32; STATE_WORDS], rounds: Rounds) -> [u32; 8];
}

/// Scalar reference implementation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Generic;

impl StreamCipherBackend for Generic {
    const NAME: &'static str = "generic";
    fn xor_keystream(self, state: &mut [u32; STATE_WORDS], rounds: Rounds, data: &mut [u8]) {
        generic::xor_keystream(state, rounds, data)
    }
    fn hchacha(self, state: &[u32; STATE_WORDS], rounds: Rounds) -> [u32; 8] {
        generic::hchacha(state, rounds)
    }
}

/// Vectorized implementation; picks the best instruction set available.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Simd;

impl StreamCipherBackend for Simd {
    const NAME: &'static str = "simd";
    fn xor_keystream(self, state: &mut [u32; STATE_WORDS], rounds: Rounds, data: &mut [u8]) {
        simd::xor_keystream(state, rounds, data)
    }
    fn hchacha(self, state: &[u32; STATE_WORDS], rounds: Rounds) -> [u32; 8] {
        simd::hchacha(state, rounds)
    }
}

/// HChaCha: derive a 256-bit subkey (as words) from a full initial state.
#[inline]
pub fn hchacha<B: StreamCipherBackend>(
    backend: B,
    state: &[u32; STATE_WORDS],
    rounds: Rounds,
) -> [u32; 8] {
    backend.hchacha(state, rounds)
}

/// Build a ChaCha state from key words and a 16-byte IV.
pub fn init_state(key: &[u32; 8], iv: &[u8; CHACHA_IV_SIZE]) -> [u32; STATE_WORDS] {
    let mut state = [0u32; STATE_WORDS];
    state[..4].copy_from_slice(&CONSTANTS);
    state[4..12].copy_from_slice(key);
    for (w, b) in state[12..].iter_mut().zip(iv.chunks_exact(4)) {
        *w = u32::from_le_bytes([b[0], b[1], b[2], b[3]]);
    }
    state
}

/// A 256-bit ChaCha key together with its round count.
#[derive(Clone, PartialEq, Eq)]
pub struct StreamKey {
    key: [u32; 8],
    rounds: Rounds,
}

impl fmt::Debug for StreamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamKey")
            .field("rounds", &self.rounds)
            .finish_non_exhaustive()
    }
}

impl StreamKey {
    pub fn new(key: &[u8; KEY_SIZE], rounds: Rounds) -> Self {
        let mut words = [0u32; 8];
        for (w, b) in words.iter_mut().zip(key.chunks_exact(4)) {
            *w = u32::from_le_bytes([b[0], b[1], b[2], b[3]]);
        }
        StreamKey { key: words, rounds }
    }

    #[inline]
    pub fn rounds(&self) -> Rounds {
        self.rounds
    }

    #[inline]
    pub fn init_state(&self, iv: &[u8; CHACHA_IV_SIZE]) -> [u32; STATE_WORDS] {
        init_state(&self.key, iv)
    }

    /// ChaCha with a 32-bit block counter. Panics if the message would wrap
    /// the counter.
    pub fn chacha_in_place<B: StreamCipherBackend>(
        &self,
        backend: B,
        data: &mut [u8],
        iv: &[u8; CHACHA_IV_SIZE],
    ) {
        let mut state = self.init_state(iv);
        let blocks = (data.len() as u64 + BLOCK_SIZE as u64 - 1) / BLOCK_SIZE as u64;
        assert!(
            u64::from(state[12]) + blocks <= 1 << 32,
            "ChaCha message of {} bytes would wrap the 32-bit block counter",
            data.len()
        );
        backend.xor_keystream(&mut state, self.rounds, data);
    }

    /// Out-of-place ChaCha; `dst` and `src` must have the same length.
    pub fn chacha<B: StreamCipherBackend>(
        &self,
        backend: B,
        dst: &mut [u8],
        src: &[u8],
        iv: &[u8; CHACHA_IV_SIZE],
    ) {
        assert_eq!(dst.len(), src.len(), "ChaCha dst and src lengths differ");
        dst.copy_from_slice(src);
        self.chacha_in_place(backend, dst, iv);
    }

    /// Subkey from the first 128 nonce bits, and the ChaCha IV made of the
    /// stream position followed by the remaining 64 nonce bits.
    fn xchacha_subkey<B: StreamCipherBackend>(
        &self,
        backend: B,
        iv: &[u8; XCHACHA_IV_SIZE],
    ) -> (StreamKey, [u8; CHACHA_IV_SIZE]) {
        let mut nonce = [0u8; CHACHA_IV_SIZE];
        nonce.copy_from_slice(&iv[..16]);
        let key = hchacha(backend, &self.init_state(&nonce), self.rounds);
        let mut real_iv = [0u8; CHACHA_IV_SIZE];
        real_iv[..8].copy_from_slice(&iv[24..]);
        real_iv[8..].copy_from_slice(&iv[16..24]);
        (
            StreamKey {
                key,
                rounds: self.rounds,
            },
            real_iv,
        )
    }

    pub fn xchacha_in_place<B: StreamCipherBackend>(
        &self,
        backend: B,
        data: &mut [u8],
        iv: &[u8; XCHACHA_IV_SIZE],
    ) {
        let (subkey, real_iv) = self.xchacha_subkey(backend, iv);
        subkey.chacha_in_place(backend, data, &real_iv);
    }

    pub fn xchacha<B: StreamCipherBackend>(
        &self,
        backend: B,
        dst: &mut [u8],
        src: &[u8],
        iv: &[u8; XCHACHA_IV_SIZE],
    ) {
        assert_eq!(dst.len(), src.len(), "XChaCha dst and src lengths differ");
        dst.copy_from_slice(src);
        self.xchacha_in_place(backend, dst, iv);
    }
}
