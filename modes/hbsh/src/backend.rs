//! Backend bundles: which stream cipher, Poly1305 and NH implementations an
//! HBSH call runs on.

use core::fmt;

use hbsh_chacha::StreamCipherBackend;
use hbsh_nh::NhBackend;
use hbsh_poly1305::Poly1305Backend;

pub trait Backends {
    const NAME: &'static str;
    type Stream: StreamCipherBackend;
    type Poly1305: Poly1305Backend;
    type Nh: NhBackend;
}

/// Portable scalar code for every primitive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Generic;

impl Backends for Generic {
    const NAME: &'static str = "generic";
    type Stream = hbsh_chacha::Generic;
    type Poly1305 = hbsh_poly1305::Generic;
    type Nh = hbsh_nh::Generic;
}

/// Vectorized ChaCha and NH, four-way Poly1305.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Simd;

impl Backends for Simd {
    const NAME: &'static str = "simd";
    type Stream = hbsh_chacha::Simd;
    type Poly1305 = hbsh_poly1305::FourWay;
    type Nh = hbsh_nh::Simd;
}

/// Runtime choice between the two bundles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Backend {
    Generic,
    Simd,
}

impl Backend {
    /// The bundle to use on this machine. Decided on first use and cached
    /// when `std` is available.
    pub fn detect() -> Backend {
        #[cfg(feature = "std")]
        {
            lazy_static! {
                static ref DETECTED: Backend = Backend::probe();
            }
            *DETECTED
        }
        #[cfg(not(feature = "std"))]
        {
            Backend::probe()
        }
    }

    /// Chooses between the bundles only. Instruction-set selection within
    /// `Simd` happens in ppv-lite86 for ChaCha and in hbsh-nh for NH.
    fn probe() -> Backend {
        let backend = if cfg!(feature = "no_simd") {
            Backend::Generic
        } else if cfg!(any(target_arch = "x86_64", target_arch = "aarch64")) {
            Backend::Simd
        } else {
            Backend::Generic
        };
        log::debug!("HBSH backend: {}", backend);
        backend
    }

    pub fn name(self) -> &'static str {
        match self {
            Backend::Generic => Generic::NAME,
            Backend::Simd => Simd::NAME,
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_is_stable() {
        assert_eq!(Backend::detect(), Backend::detect());
        assert_eq!(Backend::detect(), Backend::probe());
    }

    #[test]
    fn probe_follows_build_configuration() {
        let expected = if cfg!(feature = "no_simd") {
            Backend::Generic
        } else if cfg!(any(target_arch = "x86_64", target_arch = "aarch64")) {
            Backend::Simd
        } else {
            Backend::Generic
        };
        assert_eq!(Backend::probe(), expected);
        assert_eq!(Backend::Simd.name(), "simd");
        assert_eq!(Backend::Generic.name(), "generic");
    }
}
