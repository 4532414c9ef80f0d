use crate::{NhHash, MESSAGE_UNIT, NUM_PASSES};

#[inline(always)]
fn le32(b: &[u8], i: usize) -> u32 {
    u32::from_le_bytes([b[i], b[i + 1], b[i + 2], b[i + 3]])
}

pub(crate) fn nh(key: &[u32], message: &[u8]) -> NhHash {
    let mut sums = [0u64; NUM_PASSES];
    for (i, unit) in message.chunks_exact(MESSAGE_UNIT).enumerate() {
        let m = [le32(unit, 0), le32(unit, 4), le32(unit, 8), le32(unit, 12)];
        for (p, sum) in sums.iter_mut().enumerate() {
            let k = &key[4 * (i + p)..4 * (i + p) + 4];
            let a = u64::from(m[0].wrapping_add(k[0])) * u64::from(m[2].wrapping_add(k[2]));
            let b = u64::from(m[1].wrapping_add(k[1])) * u64::from(m[3].wrapping_add(k[3]));
            *sum = sum.wrapping_add(a).wrapping_add(b);
        }
    }
    NhHash { sums }
}
