//! [Cipher Block Chaining][1] (CBC) mode.
//!
//! [1]: https://en.wikipedia.org/wiki/Block_cipher_mode_of_operation#CBC

use crate::{
    ops::{check_cipher, CipherOps},
    sink::Sink,
    wrapper::{ModeCore, StreamWrapper},
    Block, Direction, Error, BLOCK_SIZE,
};
use cipher::inout::InOutBuf;

/// Streaming CBC encryptor or decryptor.
pub type Cbc<C> = StreamWrapper<CbcCore<C>>;

/// Block-level CBC state: the cipher and the running chaining value.
#[derive(Clone)]
pub struct CbcCore<C> {
    cipher: C,
    direction: Direction,
    iv: Block,
}

impl<C: CipherOps> CbcCore<C> {
    /// Create a CBC core chaining from `iv`, which must be one block long.
    pub fn new(cipher: C, direction: Direction, iv: &[u8]) -> Result<Self, Error> {
        check_cipher(&cipher, direction)?;
        if iv.len() != BLOCK_SIZE {
            return Err(Error::InvalidIvLength);
        }
        Ok(Self {
            cipher,
            direction,
            iv: Block::clone_from_slice(iv),
        })
    }

    /// Current chaining value: the last ciphertext block, or the IV.
    #[inline]
    pub fn iv_state(&self) -> Block {
        self.iv
    }
}

impl<C: CipherOps> ModeCore for CbcCore<C> {
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
        let caps = self.cipher.capabilities();
        match self.direction {
            Direction::Encrypt => caps.cbc_encrypt,
            Direction::Decrypt => caps.cbc_decrypt,
        }
    }

    fn process_block(&mut self, block: &mut Block) -> Result<(), Error> {
        match self.direction {
            Direction::Encrypt => {
                self.cipher.xor_block(&self.iv, block);
                self.cipher.encrypt_block(block);
                self.cipher.copy_block(block, &mut self.iv);
            }
            Direction::Decrypt => {
                let mut enc_block = Block::default();
                self.cipher.copy_block(block, &mut enc_block);
                self.cipher.decrypt_block(block)?;
                self.cipher.xor_block(&self.iv, block);
                self.iv = enc_block;
            }
        }
        Ok(())
    }

    fn process_blocks(&mut self, blocks: InOutBuf<'_, '_, Block>) -> Result<(), Error> {
        let saved = self.iv;
        self.cipher
            .cipher_cbc(self.direction, blocks, &mut self.iv)
            .map_err(|err| {
                self.iv = saved;
                err
            })
    }

    fn finalize<S: Sink + ?Sized>(&mut self, tail: &[u8], _sink: &mut S) -> Result<usize, Error> {
        self.check_final(0, tail.len())?;
        Ok(0)
    }
}

impl<C: CipherOps> StreamWrapper<CbcCore<C>> {
    /// Open a CBC session chaining from `iv`.
    pub fn new(cipher: C, direction: Direction, iv: &[u8]) -> Result<Self, Error> {
        CbcCore::new(cipher, direction, iv).map(Self::from_core)
    }

    /// Current chaining value.
    pub fn iv_state(&self) -> Block {
        self.get_core().iv_state()
    }
}
