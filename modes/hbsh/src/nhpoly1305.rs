//! NHPoly1305: NH over 1 KiB chunks, then Poly1305 over the NH outputs.

use core::fmt;

use hbsh_nh::{nh, NhBackend, NhKey, HASH_BYTES, MESSAGE_BYTES, MESSAGE_UNIT};
use hbsh_poly1305::{Poly1305Backend, Poly1305Key, Poly1305State, DIGEST_SIZE};

pub const KEY_SIZE: usize = hbsh_poly1305::KEY_SIZE + hbsh_nh::KEY_BYTES;

/// NH outputs buffered per call into Poly1305.
const POLY_BATCH: usize = 16;

#[derive(Clone)]
pub struct NhPoly1305Key {
    poly: Poly1305Key,
    nh: NhKey,
}

impl fmt::Debug for NhPoly1305Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NhPoly1305Key").finish_non_exhaustive()
    }
}

impl NhPoly1305Key {
    /// The Poly1305 key, then the NH key.
    pub fn new(raw_key: &[u8; KEY_SIZE]) -> Self {
        let mut poly = [0u8; hbsh_poly1305::KEY_SIZE];
        poly.copy_from_slice(&raw_key[..hbsh_poly1305::KEY_SIZE]);
        let mut nh = [0u8; hbsh_nh::KEY_BYTES];
        nh.copy_from_slice(&raw_key[hbsh_poly1305::KEY_SIZE..]);
        NhPoly1305Key {
            poly: Poly1305Key::new(&poly),
            nh: NhKey::new(&nh),
        }
    }

    /// Hash a message of any length; a partial final unit is zero-padded.
    pub fn hash<P: Poly1305Backend, N: NhBackend>(
        &self,
        poly: P,
        nh_backend: N,
        message: &[u8],
    ) -> [u8; DIGEST_SIZE] {
        let key = self.nh.words();
        let mut state = Poly1305State::new();
        let mut hashes = [0u8; POLY_BATCH * HASH_BYTES];
        let mut n = 0;

        for chunk in message.chunks(MESSAGE_BYTES) {
            let full = chunk.len() - chunk.len() % MESSAGE_UNIT;
            let mut h = nh(nh_backend, key, &chunk[..full]);
            if full < chunk.len() {
                let mut unit = [0u8; MESSAGE_UNIT];
                unit[..chunk.len() - full].copy_from_slice(&chunk[full..]);
                h = h.combine(&nh(nh_backend, &key[full / 4..], &unit));
            }
            hashes[n * HASH_BYTES..(n + 1) * HASH_BYTES].copy_from_slice(&h.to_bytes());
            n += 1;
            if n == POLY_BATCH {
                state.blocks(poly, &self.poly, &hashes, true);
                n = 0;
            }
        }
        state.blocks(poly, &self.poly, &hashes[..n * HASH_BYTES], true);
        state.emit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> NhPoly1305Key {
        let mut raw = [0u8; KEY_SIZE];
        for (i, b) in raw.iter_mut().enumerate() {
            *b = ((i * 31 + 6 * 17 + 7) & 0xff) as u8;
        }
        NhPoly1305Key::new(&raw)
    }

    fn message(len: usize) -> [u8; 2048] {
        let mut msg = [0u8; 2048];
        for (i, b) in msg.iter_mut().enumerate().take(len) {
            *b = ((i * 31 + 7 * 17 + 7) & 0xff) as u8;
        }
        msg
    }

    fn check(len: usize, expected: [u8; 16]) {
        let key = key();
        let msg = message(len);
        assert_eq!(
            key.hash(hbsh_poly1305::Generic, hbsh_nh::Generic, &msg[..len]),
            expected
        );
        assert_eq!(
            key.hash(hbsh_poly1305::FourWay, hbsh_nh::Simd, &msg[..len]),
            expected
        );
    }

    #[test]
    fn empty() {
        check(0, [0; 16]);
    }

    #[test]
    fn one_unit() {
        check(16, hex!("efc3747e5a9bc371508da148b1d12e97"));
    }

    #[test]
    fn partial_unit() {
        check(19, hex!("4d9a73a2e96e79c30d97402118b0b88b"));
    }

    #[test]
    fn one_chunk() {
        check(1024, hex!("16b45583059451a505b8136b7890f20b"));
    }

    #[test]
    fn chunk_and_partial_unit() {
        check(1100, hex!("b65f891d4e9b08396fcdcbf264f8bd5d"));
    }

    #[test]
    fn two_chunks() {
        check(2048, hex!("146324b2d5b485b7ac66ec8d57776e6c"));
    }
}
