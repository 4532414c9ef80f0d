//! The inner block cipher, seen only as a keyed 16-byte permutation.

use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use aes::{Aes128, Aes256};

pub const BLOCK_SIZE: usize = 16;

/// Longest key any [`BlockCipher`] may ask for.
pub const MAX_KEY_SIZE: usize = 32;

pub trait BlockCipher: Clone {
    const NAME: &'static str;
    /// At most [`MAX_KEY_SIZE`].
    const KEY_SIZE: usize;

    /// Panics unless `key` is exactly [`Self::KEY_SIZE`] bytes.
    fn setkey(key: &[u8]) -> Self;
    fn encrypt(&self, dst: &mut [u8; BLOCK_SIZE], src: &[u8; BLOCK_SIZE]);
    fn decrypt(&self, dst: &mut [u8; BLOCK_SIZE], src: &[u8; BLOCK_SIZE]);
}

macro_rules! impl_aes {
    ($cipher:ty, $name:expr, $key_size:expr) => {
        impl BlockCipher for $cipher {
            const NAME: &'static str = $name;
            const KEY_SIZE: usize = $key_size;

            fn setkey(key: &[u8]) -> Self {
                <$cipher>::new(GenericArray::from_slice(key))
            }

            #[inline]
            fn encrypt(&self, dst: &mut [u8; BLOCK_SIZE], src: &[u8; BLOCK_SIZE]) {
                self.encrypt_block_b2b(
                    GenericArray::from_slice(src),
                    GenericArray::from_mut_slice(dst),
                );
            }

            #[inline]
            fn decrypt(&self, dst: &mut [u8; BLOCK_SIZE], src: &[u8; BLOCK_SIZE]) {
                self.decrypt_block_b2b(
                    GenericArray::from_slice(src),
                    GenericArray::from_mut_slice(dst),
                );
            }
        }
    };
}

impl_aes!(Aes128, "AES-128", 16);
impl_aes!(Aes256, "AES-256", 32);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fips_197_aes128() {
        let key = hex!("000102030405060708090a0b0c0d0e0f");
        let pt = hex!("00112233445566778899aabbccddeeff");
        let ct = hex!("69c4e0d86a7b0430d8cdb78070b4c55a");
        let cipher = Aes128::setkey(&key);
        let mut out = [0u8; 16];
        cipher.encrypt(&mut out, &pt);
        assert_eq!(out, ct);
        let mut back = [0u8; 16];
        cipher.decrypt(&mut back, &out);
        assert_eq!(back, pt);
    }

    #[test]
    fn fips_197_aes256() {
        let key = hex!("000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f");
        let pt = hex!("00112233445566778899aabbccddeeff");
        let ct = hex!("8ea2b7ca516745bfeafc49904b496089");
        let cipher = Aes256::setkey(&key);
        let mut out = [0u8; 16];
        cipher.encrypt(&mut out, &pt);
        assert_eq!(out, ct);
        let mut back = [0u8; 16];
        cipher.decrypt(&mut back, &out);
        assert_eq!(back, pt);
    }
}
