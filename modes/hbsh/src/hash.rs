//! The two HBSH hash variants, split into a tweak-dependent header and the
//! message bulk so the header work is shared by both hashes of one call.

use hbsh_poly1305::{Poly1305Key, Poly1305State, BLOCK_SIZE as POLY_BLOCK};

use crate::backend::Backends;
use crate::le128::Le128;
use crate::nhpoly1305::{self, NhPoly1305Key};
use crate::HashAlgorithm;

/// Longest tweak whose bit length fits the 32-bit HPolyC length field.
pub const HPOLYC_MAX_TWEAK_LEN: usize = (u32::MAX / 8) as usize;

#[derive(Clone, Debug)]
pub(crate) enum HashKey {
    HPolyC {
        poly: Poly1305Key,
    },
    Adiantum {
        header: Poly1305Key,
        message: NhPoly1305Key,
    },
}

/// State after hashing the tweak, reused for both message hashes.
#[derive(Clone, Copy, Debug)]
pub(crate) enum HeaderHash {
    /// HPolyC keeps accumulating into the same polynomial.
    Unreduced(Poly1305State),
    /// Adiantum adds an independent digest of the message.
    Reduced(Le128),
}

fn poly_key(bytes: &[u8]) -> Poly1305Key {
    let mut raw = [0u8; hbsh_poly1305::KEY_SIZE];
    raw.copy_from_slice(&bytes[..hbsh_poly1305::KEY_SIZE]);
    Poly1305Key::new(&raw)
}

impl HashKey {
    /// `bytes` is exactly `alg.hash_key_size()` bytes of derived key.
    pub(crate) fn from_derived(alg: HashAlgorithm, bytes: &[u8]) -> Self {
        debug_assert_eq!(bytes.len(), alg.hash_key_size());
        match alg {
            HashAlgorithm::HPolyC => HashKey::HPolyC {
                poly: poly_key(bytes),
            },
            HashAlgorithm::Adiantum => {
                let mut raw = [0u8; nhpoly1305::KEY_SIZE];
                raw.copy_from_slice(&bytes[hbsh_poly1305::KEY_SIZE..]);
                HashKey::Adiantum {
                    header: poly_key(bytes),
                    message: NhPoly1305Key::new(&raw),
                }
            }
        }
    }

    pub(crate) fn header<B: Backends>(&self, bulk_len: usize, tweak: &[u8]) -> HeaderHash {
        let backend = B::Poly1305::default();
        let mut state = Poly1305State::new();
        match self {
            HashKey::HPolyC { poly } => {
                assert!(
                    tweak.len() <= HPOLYC_MAX_TWEAK_LEN,
                    "HPolyC tweak of {} bytes is too long to encode its bit length in 32 bits",
                    tweak.len()
                );
                // le32(tweak bits) || tweak, zero-padded to whole blocks
                let mut block = [0u8; POLY_BLOCK];
                block[..4].copy_from_slice(&((tweak.len() * 8) as u32).to_le_bytes());
                let head = tweak.len().min(POLY_BLOCK - 4);
                block[4..4 + head].copy_from_slice(&tweak[..head]);
                state.blocks(backend, poly, &block, true);

                let rest = &tweak[head..];
                let full = rest.len() - rest.len() % POLY_BLOCK;
                state.blocks(backend, poly, &rest[..full], true);
                if full < rest.len() {
                    let mut block = [0u8; POLY_BLOCK];
                    block[..rest.len() - full].copy_from_slice(&rest[full..]);
                    state.blocks(backend, poly, &block, true);
                }
                HeaderHash::Unreduced(state)
            }
            HashKey::Adiantum { header, .. } => {
                // le64(message bits) || le64(0), then the tweak
                let mut block = [0u8; POLY_BLOCK];
                block[..8].copy_from_slice(&(bulk_len as u64).wrapping_mul(8).to_le_bytes());
                state.blocks(backend, header, &block, true);
                state.tail(backend, header, tweak);
                HeaderHash::Reduced(Le128::from_bytes(&state.emit()))
            }
        }
    }

    pub(crate) fn message<B: Backends>(&self, header: &HeaderHash, bulk: &[u8]) -> Le128 {
        match (self, header) {
            (HashKey::HPolyC { poly }, HeaderHash::Unreduced(state)) => {
                let mut state = *state;
                state.tail(B::Poly1305::default(), poly, bulk);
                Le128::from_bytes(&state.emit())
            }
            (HashKey::Adiantum { message, .. }, HeaderHash::Reduced(digest)) => {
                let h = message.hash(B::Poly1305::default(), B::Nh::default(), bulk);
                *digest + Le128::from_bytes(&h)
            }
            _ => unreachable!("header hash computed under a different hash algorithm"),
        }
    }
}
