use core::arch::x86_64::*;

use crate::{NhHash, MESSAGE_UNIT};

#[inline(always)]
unsafe fn load128(bytes: &[u8]) -> __m128i {
    debug_assert!(bytes.len() >= 16);
    _mm_loadu_si128(bytes.as_ptr() as *const __m128i)
}

#[inline(always)]
unsafe fn lanes64(v: __m128i) -> [u64; 2] {
    let mut out = [0u64; 2];
    _mm_storeu_si128(out.as_mut_ptr() as *mut __m128i, v);
    out
}

/// One 128-bit accumulator per pass; each holds the two products of a
/// stride, folded together at the end.
#[target_feature(enable = "sse2")]
pub unsafe fn nh_sse2(key: &[u32], message: &[u8]) -> NhHash {
    let mut acc = [_mm_setzero_si128(); 4];
    for (i, unit) in message.chunks_exact(MESSAGE_UNIT).enumerate() {
        let m = load128(unit);
        for (p, acc) in acc.iter_mut().enumerate() {
            let k = &key[4 * (i + p)..4 * (i + p) + 4];
            let t = _mm_add_epi32(m, _mm_loadu_si128(k.as_ptr() as *const __m128i));
            // (t0, t1) * (t2, t3)
            let lo = _mm_shuffle_epi32::<0x50>(t);
            let hi = _mm_shuffle_epi32::<0xfa>(t);
            *acc = _mm_add_epi64(*acc, _mm_mul_epu32(lo, hi));
        }
    }
    let mut sums = [0u64; 4];
    for (s, acc) in sums.iter_mut().zip(acc.iter()) {
        let [a, b] = lanes64(*acc);
        *s = a.wrapping_add(b);
    }
    NhHash { sums }
}

/// Passes 0 and 1 share one 256-bit register, passes 2 and 3 another: the
/// key for pass `p + 1` is the key for pass `p` shifted by one stride, so a
/// single unaligned load fetches both.
#[target_feature(enable = "avx2")]
pub unsafe fn nh_avx2(key: &[u32], message: &[u8]) -> NhHash {
    let mut acc01 = _mm256_setzero_si256();
    let mut acc23 = _mm256_setzero_si256();
    for (i, unit) in message.chunks_exact(MESSAGE_UNIT).enumerate() {
        let m = _mm256_broadcastsi128_si256(load128(unit));
        let k01 = &key[4 * i..4 * i + 8];
        let k23 = &key[4 * i + 8..4 * i + 16];
        let t01 = _mm256_add_epi32(m, _mm256_loadu_si256(k01.as_ptr() as *const __m256i));
        let t23 = _mm256_add_epi32(m, _mm256_loadu_si256(k23.as_ptr() as *const __m256i));
        acc01 = _mm256_add_epi64(
            acc01,
            _mm256_mul_epu32(
                _mm256_shuffle_epi32::<0x50>(t01),
                _mm256_shuffle_epi32::<0xfa>(t01),
            ),
        );
        acc23 = _mm256_add_epi64(
            acc23,
            _mm256_mul_epu32(
                _mm256_shuffle_epi32::<0x50>(t23),
                _mm256_shuffle_epi32::<0xfa>(t23),
            ),
        );
    }
    let mut s01 = [0u64; 4];
    let mut s23 = [0u64; 4];
    _mm256_storeu_si256(s01.as_mut_ptr() as *mut __m256i, acc01);
    _mm256_storeu_si256(s23.as_mut_ptr() as *mut __m256i, acc23);
    NhHash {
        sums: [
            s01[0].wrapping_add(s01[1]),
            s01[2].wrapping_add(s01[3]),
            s23[0].wrapping_add(s23[1]),
            s23[2].wrapping_add(s23[3]),
        ],
    }
}

#[cfg(feature = "std")]
mod autodetect {
    use super::*;
    type Nh = unsafe fn(key: &[u32], message: &[u8]) -> NhHash;

    fn dispatch_init() -> Nh {
        if is_x86_feature_detected!("avx2") {
            log::debug!("NH: using avx2");
            nh_avx2
        } else {
            log::debug!("NH: using sse2");
            nh_sse2
        }
    }

    lazy_static! {
        static ref IMPL: Nh = dispatch_init();
    }

    #[inline]
    pub fn nh(key: &[u32], message: &[u8]) -> NhHash {
        unsafe { IMPL(key, message) }
    }
}
#[cfg(feature = "std")]
pub use self::autodetect::nh;

#[cfg(not(feature = "std"))]
#[inline]
pub fn nh(key: &[u32], message: &[u8]) -> NhHash {
    if cfg!(target_feature = "avx2") {
        unsafe { nh_avx2(key, message) }
    } else {
        // sse2 is part of the x86_64 baseline
        unsafe { nh_sse2(key, message) }
    }
}
