use core::fmt;

use hbsh_chacha::InvalidRounds;

/// Recoverable construction errors. Misuse at encryption time (messages
/// shorter than one block, mismatched buffers) panics instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The master key was not 32 bytes.
    InvalidKeyLength { expected: usize, actual: usize },
    /// ChaCha round count other than 8, 12 or 20.
    InvalidRounds(u32),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidKeyLength { expected, actual } => {
                write!(f, "invalid key length {} (expected {})", actual, expected)
            }
            Error::InvalidRounds(n) => {
                write!(f, "unsupported round count {} (expected 8, 12 or 20)", n)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

impl From<InvalidRounds> for Error {
    fn from(e: InvalidRounds) -> Self {
        Error::InvalidRounds(e.0)
    }
}
