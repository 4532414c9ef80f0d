//! Four blocks per reduction, using the precomputed key powers:
//!
//! `h' = (h + m0)·r^4 + m1·r^3 + m2·r^2 + m3·r`
//!
//! The four products are independent lanes, summed before a single carry
//! pass. Leftover blocks go through the one-block path.

use crate::{generic, load_limbs, Poly1305Key, BLOCK_SIZE, MASK26};

const LANES: usize = 4;

/// Accumulate `h * r^k` into `d`, where `p` holds `[r0, r1, 5r1, r2, 5r2, r3, 5r3, r4, 5r4]`
/// of that power.
#[inline(always)]
fn mul_acc(d: &mut [u64; 5], h: &[u64; 5], p: &[u32; 9]) {
    let [r0, r1, s1, r2, s2, r3, s3, r4, s4] = p.map(u64::from);
    let [h0, h1, h2, h3, h4] = *h;
    d[0] += h0 * r0 + h1 * s4 + h2 * s3 + h3 * s2 + h4 * s1;
    d[1] += h0 * r1 + h1 * r0 + h2 * s4 + h3 * s3 + h4 * s2;
    d[2] += h0 * r2 + h1 * r1 + h2 * r0 + h3 * s4 + h4 * s3;
    d[3] += h0 * r3 + h1 * r2 + h2 * r1 + h3 * r0 + h4 * s4;
    d[4] += h0 * r4 + h1 * r3 + h2 * r2 + h3 * r1 + h4 * r0;
}

pub(crate) fn blocks(key: &Poly1305Key, h: &mut [u32; 5], data: &[u8], hibit: u32) {
    let mut wide = data.chunks_exact(BLOCK_SIZE * LANES);
    let mut acc = h.map(u64::from);

    for chunk in &mut wide {
        let mut d = [0u64; 5];
        for (i, block) in chunk.chunks_exact(BLOCK_SIZE).enumerate() {
            let m = load_limbs(block, hibit).map(u64::from);
            let mut x = m;
            if i == 0 {
                for (x, a) in x.iter_mut().zip(acc.iter()) {
                    *x += *a;
                }
            }
            mul_acc(&mut d, &x, &key.powers[LANES - 1 - i]);
        }

        // Sums stay below 2^60, so carries exceed 32 bits; go around twice
        // to restore the one-block limb bounds.
        d[1] += d[0] >> 26;
        d[0] &= MASK26;
        d[2] += d[1] >> 26;
        d[1] &= MASK26;
        d[3] += d[2] >> 26;
        d[2] &= MASK26;
        d[4] += d[3] >> 26;
        d[3] &= MASK26;
        d[0] += (d[4] >> 26) * 5;
        d[4] &= MASK26;
        d[1] += d[0] >> 26;
        d[0] &= MASK26;

        d[2] += d[1] >> 26;
        d[1] &= MASK26;
        d[3] += d[2] >> 26;
        d[2] &= MASK26;
        d[4] += d[3] >> 26;
        d[3] &= MASK26;
        d[0] += (d[4] >> 26) * 5;
        d[4] &= MASK26;
        d[1] += d[0] >> 26;
        d[0] &= MASK26;

        acc = d;
    }

    *h = acc.map(|x| x as u32);
    generic::blocks(key, h, wide.remainder(), hibit);
}
