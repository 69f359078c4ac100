//! Block cipher capability consumed by the mode engines.
//!
//! A [`CipherOps`] implementor is the key schedule: every operation takes
//! `&self` and must not mutate it. Single-block encryption is the only
//! required entry point. Decryption and the bulk routes are optional and
//! announced through [`Capabilities`]; the engines never call a bulk route
//! that is not announced and fall back to their per-block loop instead.
//!
//! A bulk route that returns [`Error::BulkUnsupported`] must not have
//! touched its blocks, IV or counter. The engines then rerun the same
//! blocks through the per-block loop, so an announced route that turns out
//! to be missing is never fatal.

use crate::{counter::Counter, Block, Direction, Error, BLOCK_SIZE};
use cipher::{
    consts::U16, inout::InOutBuf, BlockDecrypt, BlockEncrypt, BlockSizeUser, Key, KeyInit,
    KeySizeUser,
};
use core::fmt;

/// Number of blocks handed to the wrapped cipher at once by [`Bulk`].
const PAR_BLOCKS: usize = 8;

/// Optional entry points offered by a [`CipherOps`] implementor.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// `decrypt_block` is implemented.
    pub decrypt: bool,
    /// `cipher_ecb` is implemented.
    pub ecb: bool,
    /// `cipher_cbc` is implemented for encryption.
    pub cbc_encrypt: bool,
    /// `cipher_cbc` is implemented for decryption.
    pub cbc_decrypt: bool,
    /// `cipher_ctr` is implemented.
    pub ctr: bool,
}

impl Capabilities {
    /// Single-block encryption only.
    pub const NONE: Self = Self {
        decrypt: false,
        ecb: false,
        cbc_encrypt: false,
        cbc_decrypt: false,
        ctr: false,
    };

    /// Every optional entry point.
    pub const ALL: Self = Self {
        decrypt: true,
        ecb: true,
        cbc_encrypt: true,
        cbc_decrypt: true,
        ctr: true,
    };
}

/// Fixed-block cipher primitive driven by the mode engines.
pub trait CipherOps {
    /// Block size in bytes. Only 16 is accepted by the engines.
    fn block_size(&self) -> usize {
        BLOCK_SIZE
    }

    /// Optional entry points implemented by this primitive.
    fn capabilities(&self) -> Capabilities {
        Capabilities::NONE
    }

    /// Encrypt one block in place.
    fn encrypt_block(&self, block: &mut Block);

    /// Decrypt one block in place.
    fn decrypt_block(&self, block: &mut Block) -> Result<(), Error> {
        let _ = block;
        Err(Error::DecryptUnsupported)
    }

    /// Copy `src` into `dst`.
    #[inline]
    fn copy_block(&self, src: &Block, dst: &mut Block) {
        dst.copy_from_slice(src);
    }

    /// XOR `src` into `dst`.
    #[inline]
    fn xor_block(&self, src: &Block, dst: &mut Block) {
        xor(dst, src);
    }

    /// Encrypt or decrypt every block of `blocks` independently.
    fn cipher_ecb(&self, direction: Direction, blocks: InOutBuf<'_, '_, Block>) -> Result<(), Error> {
        let _ = (direction, blocks);
        Err(Error::BulkUnsupported)
    }

    /// CBC over `blocks`, chaining from and updating `iv`.
    fn cipher_cbc(
        &self,
        direction: Direction,
        blocks: InOutBuf<'_, '_, Block>,
        iv: &mut Block,
    ) -> Result<(), Error> {
        let _ = (direction, blocks, iv);
        Err(Error::BulkUnsupported)
    }

    /// XOR `blocks` with the keystream generated from `counter`, one
    /// counter value per block starting with the current one.
    fn cipher_ctr(&self, blocks: InOutBuf<'_, '_, Block>, counter: &mut Counter) -> Result<(), Error> {
        let _ = (blocks, counter);
        Err(Error::BulkUnsupported)
    }
}

impl<T: CipherOps + ?Sized> CipherOps for &T {
    fn block_size(&self) -> usize {
        (**self).block_size()
    }

    fn capabilities(&self) -> Capabilities {
        (**self).capabilities()
    }

    #[inline]
    fn encrypt_block(&self, block: &mut Block) {
        (**self).encrypt_block(block)
    }

    #[inline]
    fn decrypt_block(&self, block: &mut Block) -> Result<(), Error> {
        (**self).decrypt_block(block)
    }

    #[inline]
    fn copy_block(&self, src: &Block, dst: &mut Block) {
        (**self).copy_block(src, dst)
    }

    #[inline]
    fn xor_block(&self, src: &Block, dst: &mut Block) {
        (**self).xor_block(src, dst)
    }

    fn cipher_ecb(&self, direction: Direction, blocks: InOutBuf<'_, '_, Block>) -> Result<(), Error> {
        (**self).cipher_ecb(direction, blocks)
    }

    fn cipher_cbc(
        &self,
        direction: Direction,
        blocks: InOutBuf<'_, '_, Block>,
        iv: &mut Block,
    ) -> Result<(), Error> {
        (**self).cipher_cbc(direction, blocks, iv)
    }

    fn cipher_ctr(&self, blocks: InOutBuf<'_, '_, Block>, counter: &mut Counter) -> Result<(), Error> {
        (**self).cipher_ctr(blocks, counter)
    }
}

macro_rules! define_adapter {
    ($name:ident, $doc:expr) => {
        #[doc=$doc]
        #[derive(Clone)]
        pub struct $name<C>(pub C);

        impl<C: KeySizeUser> KeySizeUser for $name<C> {
            type KeySize = C::KeySize;
        }

        impl<C: KeyInit> KeyInit for $name<C> {
            #[inline]
            fn new(key: &Key<Self>) -> Self {
                Self(C::new(key))
            }
        }

        impl<C> fmt::Debug for $name<C> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
                f.write_str(concat!(stringify!($name), " { .. }"))
            }
        }
    };
}

define_adapter!(
    Blockwise,
    "RustCrypto block cipher exposed through its single-block entry points only."
);
define_adapter!(
    Bulk,
    "RustCrypto block cipher exposed with bulk ECB, CBC and CTR entry points."
);

impl<C> CipherOps for Blockwise<C>
where
    C: BlockEncrypt + BlockDecrypt + BlockSizeUser<BlockSize = U16>,
{
    fn capabilities(&self) -> Capabilities {
        Capabilities {
            decrypt: true,
            ..Capabilities::NONE
        }
    }

    #[inline]
    fn encrypt_block(&self, block: &mut Block) {
        self.0.encrypt_block(block);
    }

    #[inline]
    fn decrypt_block(&self, block: &mut Block) -> Result<(), Error> {
        self.0.decrypt_block(block);
        Ok(())
    }
}

impl<C> CipherOps for Bulk<C>
where
    C: BlockEncrypt + BlockDecrypt + BlockSizeUser<BlockSize = U16>,
{
    fn capabilities(&self) -> Capabilities {
        Capabilities::ALL
    }

    #[inline]
    fn encrypt_block(&self, block: &mut Block) {
        self.0.encrypt_block(block);
    }

    #[inline]
    fn decrypt_block(&self, block: &mut Block) -> Result<(), Error> {
        self.0.decrypt_block(block);
        Ok(())
    }

    fn cipher_ecb(&self, direction: Direction, blocks: InOutBuf<'_, '_, Block>) -> Result<(), Error> {
        match direction {
            Direction::Encrypt => self.0.encrypt_blocks_inout(blocks),
            Direction::Decrypt => self.0.decrypt_blocks_inout(blocks),
        }
        Ok(())
    }

    fn cipher_cbc(
        &self,
        direction: Direction,
        mut blocks: InOutBuf<'_, '_, Block>,
        iv: &mut Block,
    ) -> Result<(), Error> {
        match direction {
            Direction::Encrypt => {
                for i in 0..blocks.len() {
                    let mut block = blocks.get(i);
                    let mut t = *block.get_in();
                    xor(&mut t, iv);
                    self.0.encrypt_block(&mut t);
                    *block.get_out() = t;
                    *iv = t;
                }
            }
            Direction::Decrypt => {
                while !blocks.is_empty() {
                    let n = blocks.len().min(PAR_BLOCKS);
                    let (mut chunk, rest) = blocks.split_at(n);
                    let mut saved = [Block::default(); PAR_BLOCKS];
                    saved[..n].copy_from_slice(chunk.get_in());
                    self.0.decrypt_blocks_inout(chunk.reborrow());
                    let out = chunk.get_out();
                    xor(&mut out[0], iv);
                    for j in 1..n {
                        xor(&mut out[j], &saved[j - 1]);
                    }
                    *iv = saved[n - 1];
                    blocks = rest;
                }
            }
        }
        Ok(())
    }

    fn cipher_ctr(&self, mut blocks: InOutBuf<'_, '_, Block>, counter: &mut Counter) -> Result<(), Error> {
        while !blocks.is_empty() {
            let n = blocks.len().min(PAR_BLOCKS);
            let (mut chunk, rest) = blocks.split_at(n);
            let mut keystream = [Block::default(); PAR_BLOCKS];
            for block in keystream[..n].iter_mut() {
                *block = counter.next_block();
            }
            self.0.encrypt_blocks(&mut keystream[..n]);
            for (i, ks) in keystream[..n].iter().enumerate() {
                chunk.get(i).xor_in2out(ks);
            }
            blocks = rest;
        }
        Ok(())
    }
}

/// Validate a primitive for a session in `direction`.
pub(crate) fn check_cipher<C: CipherOps>(cipher: &C, direction: Direction) -> Result<(), Error> {
    if cipher.block_size() != BLOCK_SIZE {
        return Err(Error::BlockSizeMismatch);
    }
    if direction == Direction::Decrypt && !cipher.capabilities().decrypt {
        return Err(Error::DecryptUnsupported);
    }
    Ok(())
}

#[inline(always)]
pub(crate) fn xor(out: &mut Block, buf: &Block) {
    for (a, b) in out.iter_mut().zip(buf) {
        *a ^= *b;
    }
}
