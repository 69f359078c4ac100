//! Streaming [block cipher modes of operation][1]: ECB, CBC, CTR, GCM and
//! GMAC over 128-bit block ciphers.
//!
//! Input may be supplied in chunks of any size; output does not depend on
//! how the message is split. Output is written through a [`Sink`], either
//! one contiguous buffer or a list of segments. Whenever nothing is
//! buffered, the call is block aligned and the destination is contiguous,
//! whole runs of blocks are handed to the cipher's bulk entry points
//! announced in [`Capabilities`].
//!
//! # Example
//! ```
//! use aes::Aes128;
//! use hex_literal::hex;
//! use stream_modes::{cipher::KeyInit, Bulk, Contiguous, Direction, Gcm, GcmParams, Sink};
//!
//! let key = hex!("feffe9928665731c6d6a8f9467308308");
//! let iv = hex!("cafebabefacedbaddecaf888");
//! let cipher = Bulk::<Aes128>::new(&key.into());
//! let params = GcmParams::new(&iv, b"header");
//! let plaintext = *b"hello world! streaming block modes";
//!
//! let mut enc = Gcm::new(&cipher, Direction::Encrypt, &params)?;
//! let mut buf = [0u8; 34 + 16];
//! let mut sink = Contiguous::new(&mut buf);
//! enc.process(&plaintext[..5], &mut sink)?;
//! enc.process(&plaintext[5..], &mut sink)?;
//! enc.finish(&mut sink)?;
//! assert_eq!(sink.position(), 34 + 16);
//!
//! let dec = Gcm::new(&cipher, Direction::Decrypt, &params)?;
//! let mut out = [0u8; 34];
//! let n = dec.process_final(&buf, &mut Contiguous::new(&mut out))?;
//! assert_eq!(n, 34);
//! assert_eq!(out, plaintext);
//! # Ok::<(), stream_modes::Error>(())
//! ```
//!
//! [1]: https://en.wikipedia.org/wiki/Block_cipher_mode_of_operation

#![no_std]
#![doc(
    html_logo_url = "https://raw.githubusercontent.com/RustCrypto/media/master/logo.svg",
    html_favicon_url = "https://raw.githubusercontent.com/RustCrypto/media/master/logo.svg"
)]
#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

#[cfg(feature = "std")]
extern crate std;

pub use cipher;

mod cbc;
mod context;
mod counter;
mod ctr;
mod ecb;
mod errors;
mod gcm;
mod ghash;
mod ops;
mod sink;
mod wrapper;

pub use crate::{
    cbc::{Cbc, CbcCore},
    context::{Mode, ModeContext, Params},
    counter::Counter,
    ctr::{Ctr, CtrCore},
    ecb::{Ecb, EcbCore},
    errors::{Error, ErrorKind},
    gcm::{Gcm, GcmCore, GcmParams, NONCE_LEN, TAG_BITS},
    ops::{Blockwise, Bulk, Capabilities, CipherOps},
    sink::{Contiguous, Segments, Sink, Spans},
    wrapper::{ModeCore, StreamWrapper},
};

/// Low-level primitives. Misuse can break the security of the modes.
#[cfg(feature = "hazmat")]
pub mod hazmat {
    pub use crate::ghash::Ghash;
}

use cipher::{consts::U16, generic_array::GenericArray};

/// Block size of every supported cipher, in bytes.
pub const BLOCK_SIZE: usize = 16;

/// Largest GCM tag, in bytes.
pub const MAX_TAG_LEN: usize = 16;

/// One cipher block.
pub type Block = GenericArray<u8, U16>;

/// Whether a session encrypts or decrypts.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Encrypt plaintext.
    Encrypt,
    /// Decrypt ciphertext.
    Decrypt,
}
