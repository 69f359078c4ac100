//! Error types.
use core::fmt;

/// Broad class of an [`Error`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Session parameters were rejected at construction; no state exists.
    Configuration,
    /// The byte counts of a call cannot be processed; nothing was emitted.
    LengthRange,
    /// The received GCM/GMAC tag did not match.
    Authentication,
    /// A bulk entry point is not offered by the block cipher.
    Capability,
}

/// Errors returned by mode constructors, `process` and `finish`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Error {
    /// Tag length is not one of 32, 64, 96, 104, 112, 120 or 128 bits.
    InvalidTagLength,
    /// IV or initial counter block has an unusable length.
    InvalidIvLength,
    /// Counter sub-field width is outside of `1..=128` bits.
    InvalidCounterBits,
    /// Additional authenticated data is too long for its bit length to be
    /// encoded.
    InvalidAadLength,
    /// The block cipher does not operate on 128-bit blocks.
    BlockSizeMismatch,
    /// Decryption was requested from a cipher without `decrypt_block`.
    DecryptUnsupported,
    /// Message length does not fit the mode (partial ECB/CBC block or GCM
    /// input shorter than the tag or too long to authenticate).
    MessageLength,
    /// Processing would exhaust the counter sub-field.
    CounterOverflow,
    /// The sink has fewer free bytes than the call would emit.
    OutputTooSmall,
    /// Computed and received authentication tags differ.
    AuthenticationFailed,
    /// The requested bulk entry point is not implemented.
    BulkUnsupported,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidTagLength
            | Error::InvalidIvLength
            | Error::InvalidCounterBits
            | Error::InvalidAadLength
            | Error::BlockSizeMismatch
            | Error::DecryptUnsupported => ErrorKind::Configuration,
            Error::MessageLength | Error::CounterOverflow | Error::OutputTooSmall => {
                ErrorKind::LengthRange
            }
            Error::AuthenticationFailed => ErrorKind::Authentication,
            Error::BulkUnsupported => ErrorKind::Capability,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Error::InvalidTagLength => "invalid authentication tag length",
            Error::InvalidIvLength => "invalid length of IV or counter block",
            Error::InvalidCounterBits => "counter width must be between 1 and 128 bits",
            Error::InvalidAadLength => "associated data too long",
            Error::BlockSizeMismatch => "block cipher does not use 128-bit blocks",
            Error::DecryptUnsupported => "block cipher does not support decryption",
            Error::MessageLength => "message length is not valid for this mode",
            Error::CounterOverflow => "counter would wrap during this operation",
            Error::OutputTooSmall => "output buffer too small",
            Error::AuthenticationFailed => "authentication tag mismatch",
            Error::BulkUnsupported => "bulk operation not supported by block cipher",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
