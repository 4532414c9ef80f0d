//! One block per multiplication by `r`.

use crate::{load_limbs, Poly1305Key, BLOCK_SIZE, MASK26};

/// Invariants on entry and exit: h0, h2, h3, h4 <= 2^26 - 1; h1 <= 2^26 + 63.
pub(crate) fn blocks(key: &Poly1305Key, h: &mut [u32; 5], data: &[u8], hibit: u32) {
    let [r0, r1, r2, r3, r4] = key.r.map(u64::from);
    let (s1, s2, s3, s4) = (r1 * 5, r2 * 5, r3 * 5, r4 * 5);
    let [mut h0, mut h1, mut h2, mut h3, mut h4] = h.map(u64::from);

    for block in data.chunks_exact(BLOCK_SIZE) {
        let m = load_limbs(block, hibit);
        h0 += u64::from(m[0]);
        h1 += u64::from(m[1]);
        h2 += u64::from(m[2]);
        h3 += u64::from(m[3]);
        h4 += u64::from(m[4]);

        //     r4       r3       r2       r1       r0
        //  X  h4       h3       h2       h1       h0
        //     h0*r4    h0*r3    h0*r2    h0*r1    h0*r0
        //     h1*r3    h1*r2    h1*r1    h1*r0    h1*5*r4
        //     h2*r2    h2*r1    h2*r0    h2*5*r4  h2*5*r3
        //     h3*r1    h3*r0    h3*5*r4  h3*5*r3  h3*5*r2
        //     h4*r0    h4*5*r4  h4*5*r3  h4*5*r2  h4*5*r1
        let d0 = h0 * r0 + h1 * s4 + h2 * s3 + h3 * s2 + h4 * s1;
        let d1 = h0 * r1 + h1 * r0 + h2 * s4 + h3 * s3 + h4 * s2;
        let d2 = h0 * r2 + h1 * r1 + h2 * r0 + h3 * s4 + h4 * s3;
        let d3 = h0 * r3 + h1 * r2 + h2 * r1 + h3 * r0 + h4 * s4;
        let d4 = h0 * r4 + h1 * r3 + h2 * r2 + h3 * r1 + h4 * r0;

        // h0 => h1 => h2 => h3 => h4 => h0 => h1; every sum is < 2^58 - 2^32
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

    *h = [h0 as u32, h1 as u32, h2 as u32, h3 as u32, h4 as u32];
}
