// copyright 2019 Kaz Wesley

//! HBSH (hash, block cipher, stream cipher, hash): a length-preserving
//! tweakable wide-block cipher for messages of at least 16 bytes.
//!
//! Two instances are provided, differing only in the hash:
//! - **Adiantum**: NH + Poly1305 over the message, Poly1305 over the tweak.
//! - **HPolyC**: a single Poly1305 over the tweak and message.
//!
//! Both use XChaCha as the stream cipher and, by default, AES-256 as the block
//! cipher. HBSH is unauthenticated: decrypting modified ciphertext yields
//! unrelated plaintext rather than an error.
//!
//! ```
//! use hbsh::{Hbsh, Rounds};
//!
//! let key = [0x42u8; 32];
//! let cipher: Hbsh = Hbsh::adiantum(&key, Rounds::R12);
//!
//! let tweak = [0u8; 32];
//! let mut sector = *b"a sector's worth of data, at least sixteen bytes";
//! cipher.encrypt_in_place(&mut sector, &tweak);
//! cipher.decrypt_in_place(&mut sector, &tweak);
//! assert_eq!(&sector, b"a sector's worth of data, at least sixteen bytes");
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(test)]
#[macro_use]
extern crate hex_literal;
#[cfg(feature = "std")]
#[macro_use]
extern crate lazy_static;

use core::fmt;

pub use aes::{Aes128, Aes256};
pub use hbsh_chacha::{Rounds, StreamKey};

pub mod backend;
mod blockcipher;
mod error;
mod hash;
mod le128;
pub mod nhpoly1305;

pub use crate::backend::{Backend, Backends};
pub use crate::blockcipher::{BlockCipher, BLOCK_SIZE};
pub use crate::error::Error;
pub use crate::hash::HPOLYC_MAX_TWEAK_LEN;
pub use crate::le128::Le128;
pub use crate::nhpoly1305::NhPoly1305Key;

use crate::blockcipher::MAX_KEY_SIZE;
use crate::hash::HashKey;
use hbsh_chacha::{BLOCK_SIZE as STREAM_BLOCK, XCHACHA_IV_SIZE};

/// Master key size; the stream cipher key.
pub const KEY_SIZE: usize = hbsh_chacha::KEY_SIZE;

const ADIANTUM_HASH_KEY_SIZE: usize = hbsh_poly1305::KEY_SIZE + nhpoly1305::KEY_SIZE;

/// Which hash HBSH is instantiated with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    HPolyC,
    Adiantum,
}

impl HashAlgorithm {
    /// Conventional tweak length in bytes.
    pub const fn default_tweak_len(self) -> usize {
        match self {
            HashAlgorithm::HPolyC => 12,
            HashAlgorithm::Adiantum => 32,
        }
    }

    /// Bytes of derived key material the hash needs.
    pub const fn hash_key_size(self) -> usize {
        match self {
            HashAlgorithm::HPolyC => hbsh_poly1305::KEY_SIZE,
            HashAlgorithm::Adiantum => ADIANTUM_HASH_KEY_SIZE,
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HashAlgorithm::HPolyC => "HPolyC",
            HashAlgorithm::Adiantum => "Adiantum",
        })
    }
}

#[derive(Clone, Copy)]
enum Direction {
    Encrypt,
    Decrypt,
}

/// An HBSH key schedule: the stream key, the derived block-cipher key and the
/// derived hash key. Immutable once built, so one instance can serve any
/// number of concurrent calls.
#[derive(Clone)]
pub struct Hbsh<C: BlockCipher = Aes256> {
    stream: StreamKey,
    cipher: C,
    hash: HashKey,
    alg: HashAlgorithm,
}

impl<C: BlockCipher> fmt::Debug for Hbsh<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hbsh")
            .field("hash_algorithm", &self.alg)
            .field("rounds", &self.stream.rounds())
            .field("block_cipher", &C::NAME)
            .finish_non_exhaustive()
    }
}

impl<C: BlockCipher> Hbsh<C> {
    /// Derive the block-cipher and hash keys from the XChaCha keystream under
    /// the nonce `1 || 0^191`.
    pub fn new(key: &[u8; KEY_SIZE], rounds: Rounds, alg: HashAlgorithm) -> Self {
        assert!(C::KEY_SIZE <= MAX_KEY_SIZE);
        let stream = StreamKey::new(key, rounds);

        let mut derived = [0u8; MAX_KEY_SIZE + ADIANTUM_HASH_KEY_SIZE];
        let derived = &mut derived[..C::KEY_SIZE + alg.hash_key_size()];
        let mut iv = [0u8; XCHACHA_IV_SIZE];
        iv[0] = 1;
        match Backend::detect() {
            Backend::Generic => stream.xchacha_in_place(hbsh_chacha::Generic, derived, &iv),
            Backend::Simd => stream.xchacha_in_place(hbsh_chacha::Simd, derived, &iv),
        }

        let (cipher_key, hash_key) = derived.split_at(C::KEY_SIZE);
        let hbsh = Hbsh {
            stream,
            cipher: C::setkey(cipher_key),
            hash: HashKey::from_derived(alg, hash_key),
            alg,
        };
        log::debug!(
            "HBSH key schedule: {} with XChaCha{} and {}",
            alg,
            rounds,
            C::NAME
        );
        hbsh
    }

    /// Like [`Hbsh::new`], for keys and round counts not yet validated.
    pub fn new_from_slice(key: &[u8], rounds: u32, alg: HashAlgorithm) -> Result<Self, Error> {
        if key.len() != KEY_SIZE {
            return Err(Error::InvalidKeyLength {
                expected: KEY_SIZE,
                actual: key.len(),
            });
        }
        let rounds = Rounds::try_from(rounds)?;
        let mut k = [0u8; KEY_SIZE];
        k.copy_from_slice(key);
        Ok(Self::new(&k, rounds, alg))
    }

    pub fn adiantum(key: &[u8; KEY_SIZE], rounds: Rounds) -> Self {
        Self::new(key, rounds, HashAlgorithm::Adiantum)
    }

    pub fn hpolyc(key: &[u8; KEY_SIZE], rounds: Rounds) -> Self {
        Self::new(key, rounds, HashAlgorithm::HPolyC)
    }

    pub fn hash_algorithm(&self) -> HashAlgorithm {
        self.alg
    }

    pub fn rounds(&self) -> Rounds {
        self.stream.rounds()
    }

    pub fn default_tweak_len(&self) -> usize {
        self.alg.default_tweak_len()
    }

    /// Encrypt `src` into `dst`. Panics if the lengths differ or are below
    /// 16 bytes.
    pub fn encrypt(&self, dst: &mut [u8], src: &[u8], tweak: &[u8]) {
        assert_eq!(dst.len(), src.len(), "HBSH dst and src lengths differ");
        dst.copy_from_slice(src);
        self.encrypt_in_place(dst, tweak);
    }

    /// Decrypt `src` into `dst`. Panics if the lengths differ or are below
    /// 16 bytes.
    pub fn decrypt(&self, dst: &mut [u8], src: &[u8], tweak: &[u8]) {
        assert_eq!(dst.len(), src.len(), "HBSH dst and src lengths differ");
        dst.copy_from_slice(src);
        self.decrypt_in_place(dst, tweak);
    }

    pub fn encrypt_in_place(&self, data: &mut [u8], tweak: &[u8]) {
        match Backend::detect() {
            Backend::Generic => self.encrypt_in_place_with::<backend::Generic>(data, tweak),
            Backend::Simd => self.encrypt_in_place_with::<backend::Simd>(data, tweak),
        }
    }

    pub fn decrypt_in_place(&self, data: &mut [u8], tweak: &[u8]) {
        match Backend::detect() {
            Backend::Generic => self.decrypt_in_place_with::<backend::Generic>(data, tweak),
            Backend::Simd => self.decrypt_in_place_with::<backend::Simd>(data, tweak),
        }
    }

    /// Encrypt on an explicitly chosen backend bundle.
    pub fn encrypt_in_place_with<B: Backends>(&self, data: &mut [u8], tweak: &[u8]) {
        self.crypt::<B>(data, tweak, Direction::Encrypt)
    }

    /// Decrypt on an explicitly chosen backend bundle.
    pub fn decrypt_in_place_with<B: Backends>(&self, data: &mut [u8], tweak: &[u8]) {
        self.crypt::<B>(data, tweak, Direction::Decrypt)
    }

    fn crypt<B: Backends>(&self, data: &mut [u8], tweak: &[u8], direction: Direction) {
        let nbytes = data.len();
        assert!(
            nbytes >= BLOCK_SIZE,
            "HBSH message of {} bytes is shorter than one {}-byte block",
            nbytes,
            BLOCK_SIZE
        );
        let bulk_len = nbytes - BLOCK_SIZE;
        let header = self.hash.header::<B>(bulk_len, tweak);

        let mut right = [0u8; BLOCK_SIZE];
        right.copy_from_slice(&data[bulk_len..]);
        let rbuf = Le128::from_bytes(&right) + self.hash.message::<B>(&header, &data[..bulk_len]);
        let rbuf = rbuf.to_bytes();

        let mut iv = [0u8; XCHACHA_IV_SIZE];
        let mut mid = [0u8; BLOCK_SIZE];
        match direction {
            Direction::Encrypt => {
                self.cipher.encrypt(&mut mid, &rbuf);
                iv[..BLOCK_SIZE].copy_from_slice(&mid);
            }
            Direction::Decrypt => {
                iv[..BLOCK_SIZE].copy_from_slice(&rbuf);
                self.cipher.decrypt(&mut mid, &rbuf);
            }
        }
        iv[BLOCK_SIZE..BLOCK_SIZE + 4].copy_from_slice(&1u32.to_le_bytes());

        // Whole keystream blocks where the buffer allows; the right-hand
        // block is overwritten below.
        let rounded = (bulk_len + STREAM_BLOCK - 1) / STREAM_BLOCK * STREAM_BLOCK;
        let stream_len = if rounded <= nbytes { rounded } else { bulk_len };
        self.stream
            .xchacha_in_place(B::Stream::default(), &mut data[..stream_len], &iv);

        let out = Le128::from_bytes(&mid) - self.hash.message::<B>(&header, &data[..bulk_len]);
        data[bulk_len..].copy_from_slice(&out.to_bytes());
    }
}
