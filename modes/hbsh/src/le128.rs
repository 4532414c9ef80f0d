use core::ops::{Add, AddAssign, Sub, SubAssign};

/// An element of Z/2^128 as two little-endian 64-bit limbs. Addition and
/// subtraction wrap.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Le128 {
    pub lo: u64,
    pub hi: u64,
}

impl Le128 {
    pub fn from_bytes(bytes: &[u8; 16]) -> Self {
        let mut lo = [0u8; 8];
        let mut hi = [0u8; 8];
        lo.copy_from_slice(&bytes[..8]);
        hi.copy_from_slice(&bytes[8..]);
        Le128 {
            lo: u64::from_le_bytes(lo),
            hi: u64::from_le_bytes(hi),
        }
    }

    pub fn to_bytes(self) -> [u8; 16] {
        let mut out = [0u8; 16];
        out[..8].copy_from_slice(&self.lo.to_le_bytes());
        out[8..].copy_from_slice(&self.hi.to_le_bytes());
        out
    }
}

impl Add for Le128 {
    type Output = Le128;
    #[inline]
    fn add(self, rhs: Le128) -> Le128 {
        let (lo, carry) = self.lo.overflowing_add(rhs.lo);
        Le128 {
            lo,
            hi: self.hi.wrapping_add(rhs.hi).wrapping_add(u64::from(carry)),
        }
    }
}

impl Sub for Le128 {
    type Output = Le128;
    #[inline]
    fn sub(self, rhs: Le128) -> Le128 {
        let (lo, borrow) = self.lo.overflowing_sub(rhs.lo);
        Le128 {
            lo,
            hi: self.hi.wrapping_sub(rhs.hi).wrapping_sub(u64::from(borrow)),
        }
    }
}

impl AddAssign for Le128 {
    #[inline]
    fn add_assign(&mut self, rhs: Le128) {
        *self = *self + rhs;
    }
}

impl SubAssign for Le128 {
    #[inline]
    fn sub_assign(&mut self, rhs: Le128) {
        *self = *self - rhs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: Le128 = Le128 {
        lo: u64::MAX,
        hi: u64::MAX,
    };
    const ONE: Le128 = Le128 { lo: 1, hi: 0 };

    #[test]
    fn carry_crosses_limbs() {
        let x = Le128 {
            lo: u64::MAX,
            hi: 7,
        };
        assert_eq!(x + ONE, Le128 { lo: 0, hi: 8 });
        assert_eq!(Le128 { lo: 0, hi: 8 } - ONE, x);
    }

    #[test]
    fn wraps_modulo_2_128() {
        assert_eq!(MAX + ONE, Le128::default());
        assert_eq!(Le128::default() - ONE, MAX);
        let mut x = MAX;
        x += MAX;
        assert_eq!(x, Le128 {
            lo: u64::MAX - 1,
            hi: u64::MAX,
        });
        x -= MAX;
        assert_eq!(x, MAX);
    }

    #[test]
    fn matches_u128() {
        let a = 0x0123_4567_89ab_cdef_fedc_ba98_7654_3210u128;
        let b = 0xffff_0000_ffff_0000_8000_0000_0000_0001u128;
        let la = Le128::from_bytes(&a.to_le_bytes());
        let lb = Le128::from_bytes(&b.to_le_bytes());
        assert_eq!((la + lb).to_bytes(), a.wrapping_add(b).to_le_bytes());
        assert_eq!((la - lb).to_bytes(), a.wrapping_sub(b).to_le_bytes());
        assert_eq!((lb - la).to_bytes(), b.wrapping_sub(a).to_le_bytes());
    }
}
