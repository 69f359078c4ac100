//! [Electronic Codebook][1] (ECB) mode.
//!
//! [1]: https://en.wikipedia.org/wiki/Block_cipher_mode_of_operation#ECB

use crate::{
    ops::{check_cipher, CipherOps},
    sink::Sink,
    wrapper::{ModeCore, StreamWrapper},
    Block, Direction, Error,
};
use cipher::inout::InOutBuf;

/// Streaming ECB encryptor or decryptor.
pub type Ecb<C> = StreamWrapper<EcbCore<C>>;

/// Block-level ECB state.
#[derive(Clone)]
pub struct EcbCore<C> {
    cipher: C,
    direction: Direction,
}

impl<C: CipherOps> EcbCore<C> {
    /// Create an ECB core. Decryption requires `decrypt_block`.
    pub fn new(cipher: C, direction: Direction) -> Result<Self, Error> {
        check_cipher(&cipher, direction)?;
        Ok(Self { cipher, direction })
    }
}

impl<C: CipherOps> ModeCore for EcbCore<C> {
    fn check_blocks(&self, _blocks: usize) -> Result<(), Error> {
        Ok(())
    }

    fn check_final(&self, _blocks: usize, tail: usize) -> Result<(), Error> {
        match tail {
            0 => Ok(()),
            _ => Err(Error::MessageLength),
        }
    }

    fn final_len(&self, _tail: usize) -> usize {
        0
    }

    fn bulk_ready(&self, _blocks: usize) -> bool {
        self.cipher.capabilities().ecb
    }

    #[inline]
    fn process_block(&mut self, block: &mut Block) -> Result<(), Error> {
        match self.direction {
            Direction::Encrypt => {
                self.cipher.encrypt_block(block);
                Ok(())
            }
            Direction::Decrypt => self.cipher.decrypt_block(block),
        }
    }

    fn process_blocks(&mut self, blocks: InOutBuf<'_, '_, Block>) -> Result<(), Error> {
        self.cipher.cipher_ecb(self.direction, blocks)
    }

    fn finalize<S: Sink + ?Sized>(&mut self, tail: &[u8], _sink: &mut S) -> Result<usize, Error> {
        self.check_final(0, tail.len())?;
        Ok(0)
    }
}

impl<C: CipherOps> StreamWrapper<EcbCore<C>> {
    /// Open an ECB session.
    pub fn new(cipher: C, direction: Direction) -> Result<Self, Error> {
        EcbCore::new(cipher, direction).map(Self::from_core)
    }
}
