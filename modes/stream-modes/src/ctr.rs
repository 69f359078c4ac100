//! Generic implementation of the [Counter (CTR)][1] mode.
//!
//! Encryption and decryption are the same operation. The final partial
//! block uses the leading bytes of one more keystream block.
//!
//! [1]: https://en.wikipedia.org/wiki/Block_cipher_mode_of_operation#Counter_(CTR)

use crate::{
    counter::Counter,
    ops::{check_cipher, CipherOps},
    sink::Sink,
    wrapper::{ModeCore, StreamWrapper},
    Block, Direction, Error, BLOCK_SIZE,
};
use cipher::inout::InOutBuf;

/// Streaming CTR keystream mode.
pub type Ctr<C> = StreamWrapper<CtrCore<C>>;

/// Block-level CTR state.
#[derive(Clone)]
pub struct CtrCore<C> {
    cipher: C,
    counter: Counter,
}

impl<C: CipherOps> CtrCore<C> {
    /// Create a CTR core starting at `counter_block`, incrementing its low
    /// `counter_bits` bits.
    ///
    /// Processing is refused once the low field would overflow.
    pub fn new(cipher: C, counter_block: &[u8], counter_bits: u32) -> Result<Self, Error> {
        check_cipher(&cipher, Direction::Encrypt)?;
        if counter_block.len() != BLOCK_SIZE {
            return Err(Error::InvalidIvLength);
        }
        let counter = Counter::new(&Block::clone_from_slice(counter_block), counter_bits)?;
        Ok(Self { cipher, counter })
    }

    /// Counter block used for the next keystream block.
    pub fn counter_block(&self) -> Block {
        self.counter.block()
    }

    #[inline]
    fn keystream(&mut self) -> Block {
        let mut block = self.counter.next_block();
        self.cipher.encrypt_block(&mut block);
        block
    }
}

impl<C: CipherOps> ModeCore for CtrCore<C> {
    fn check_blocks(&self, blocks: usize) -> Result<(), Error> {
        self.counter.check(blocks)
    }

    fn check_final(&self, blocks: usize, tail: usize) -> Result<(), Error> {
        self.counter.check(blocks + usize::from(tail != 0))
    }

    fn final_len(&self, tail: usize) -> usize {
        tail
    }

    fn bulk_ready(&self, _blocks: usize) -> bool {
        self.cipher.capabilities().ctr
    }

    #[inline]
    fn process_block(&mut self, block: &mut Block) -> Result<(), Error> {
        let ks = self.keystream();
        self.cipher.xor_block(&ks, block);
        Ok(())
    }

    fn process_blocks(&mut self, blocks: InOutBuf<'_, '_, Block>) -> Result<(), Error> {
        let saved = self.counter.clone();
        self.cipher.cipher_ctr(blocks, &mut self.counter).map_err(|err| {
            self.counter = saved;
            err
        })
    }

    fn finalize<S: Sink + ?Sized>(&mut self, tail: &[u8], sink: &mut S) -> Result<usize, Error> {
        if tail.is_empty() {
            return Ok(0);
        }
        self.counter.check(1)?;
        let n = tail.len();
        let mut block = Block::default();
        block[..n].copy_from_slice(tail);
        let ks = self.keystream();
        self.cipher.xor_block(&ks, &mut block);
        sink.put(&block[..n])?;
        Ok(n)
    }
}

impl<C: CipherOps> StreamWrapper<CtrCore<C>> {
    /// Open a CTR session.
    pub fn new(cipher: C, counter_block: &[u8], counter_bits: u32) -> Result<Self, Error> {
        CtrCore::new(cipher, counter_block, counter_bits).map(Self::from_core)
    }

    /// Counter block used for the next keystream block.
    ///
    /// Bytes buffered by an earlier call have not consumed a counter value
    /// yet.
    pub fn counter_block(&self) -> Block {
        self.get_core().counter_block()
    }
}
