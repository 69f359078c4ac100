//! [Galois/Counter Mode][1] (GCM) and GMAC.
//!
//! The encryptor emits `ciphertext || tag`. The decryptor expects the same
//! layout and holds back the last `tag_len` bytes of input, since it cannot
//! tell where the ciphertext ends until `finish`.
//!
//! Ciphertext blocks are released as soon as they are known not to belong
//! to the tag, before the tag is checked. Callers must not act on decrypted
//! bytes until `finish` returns `Ok`. Only the last partial block is
//! withheld until the tag has been verified.
//!
//! GMAC is GCM over an empty message: the whole input is authenticated data
//! and the output is the tag alone. The authenticated data is `params.aad`
//! followed by every byte passed to `process`.
//!
//! [1]: https://nvlpubs.nist.gov/nistpubs/Legacy/SP/nistspecialpublication800-38d.pdf

use crate::{
    counter::Counter,
    ghash::Ghash,
    ops::{check_cipher, CipherOps},
    sink::Sink,
    wrapper::{ModeCore, StreamWrapper},
    Block, Direction, Error, BLOCK_SIZE, MAX_TAG_LEN,
};
use cipher::inout::InOutBuf;
use subtle::ConstantTimeEq;

/// Length of the IV that is used as counter block directly.
pub const NONCE_LEN: usize = 12;

/// Accepted tag lengths in bits.
pub const TAG_BITS: [u32; 7] = [32, 64, 96, 104, 112, 120, 128];

/// Width of the incremented counter field (`inc32`).
const COUNTER_BITS: u32 = 32;

/// Streaming GCM or GMAC session.
pub type Gcm<C> = StreamWrapper<GcmCore<C>>;

/// GCM session parameters.
#[derive(Copy, Clone, Debug)]
pub struct GcmParams<'a> {
    /// Initialization vector of any non-zero length.
    pub iv: &'a [u8],
    /// Additional authenticated data.
    pub aad: &'a [u8],
    /// Tag length in bits, one of [`TAG_BITS`].
    pub tag_bits: u32,
}

impl<'a> GcmParams<'a> {
    /// Parameters with a full 128-bit tag.
    pub fn new(iv: &'a [u8], aad: &'a [u8]) -> Self {
        Self {
            iv,
            aad,
            tag_bits: 128,
        }
    }

    /// Use a truncated tag of `tag_bits` bits.
    pub fn with_tag_bits(self, tag_bits: u32) -> Self {
        Self { tag_bits, ..self }
    }
}

/// Block-level GCM state.
#[derive(Clone)]
pub struct GcmCore<C> {
    cipher: C,
    direction: Direction,
    ghash: Ghash,
    counter: Counter,
    j0: Block,
    aad_len: u64,
    processed: u64,
    tag_len: usize,
    gmac: bool,
}

impl<C: CipherOps> GcmCore<C> {
    /// Derive the hash subkey, format the pre-counter block and fold the
    /// AAD.
    pub fn new(cipher: C, direction: Direction, params: &GcmParams<'_>) -> Result<Self, Error> {
        Self::init(cipher, direction, params, false)
    }

    /// GMAC core. Whole blocks of `params.aad` are folded; the trailing
    /// partial block is returned and must be fed before any other input.
    pub(crate) fn gmac<'a>(
        cipher: C,
        direction: Direction,
        params: &GcmParams<'a>,
    ) -> Result<(Self, &'a [u8]), Error> {
        let core = Self::init(cipher, direction, params, true)?;
        let folded = core.aad_len as usize;
        Ok((core, &params.aad[folded..]))
    }

    fn init(
        cipher: C,
        direction: Direction,
        params: &GcmParams<'_>,
        gmac: bool,
    ) -> Result<Self, Error> {
        check_cipher(&cipher, Direction::Encrypt)?;
        let tag_len = tag_len(params.tag_bits)?;
        if params.iv.is_empty() {
            return Err(Error::InvalidIvLength);
        }
        let iv_bits = bit_len(params.iv.len()).ok_or(Error::InvalidIvLength)?;
        bit_len(params.aad.len()).ok_or(Error::InvalidAadLength)?;
        let aad = if gmac {
            &params.aad[..params.aad.len() / BLOCK_SIZE * BLOCK_SIZE]
        } else {
            params.aad
        };

        let mut h = Block::default();
        cipher.encrypt_block(&mut h);
        let mut ghash = Ghash::new(&h);

        let j0 = if params.iv.len() == NONCE_LEN {
            let mut j0 = Block::default();
            j0[..NONCE_LEN].copy_from_slice(params.iv);
            j0[BLOCK_SIZE - 1] = 1;
            j0
        } else {
            ghash.update_padded(params.iv);
            ghash.update_lengths(0, iv_bits);
            let j0 = ghash.sum();
            ghash.reset();
            j0
        };
        ghash.update_padded(aad);

        // The first keystream block uses inc32(J0); J0 itself is kept for
        // the tag mask.
        let mut counter = Counter::cyclic(&j0, COUNTER_BITS)?;
        counter.increment();

        Ok(Self {
            cipher,
            direction,
            ghash,
            counter,
            j0,
            aad_len: aad.len() as u64,
            processed: 0,
            tag_len,
            gmac,
        })
    }

    /// Authenticated data folded so far in bytes.
    pub fn aad_len(&self) -> u64 {
        self.aad_len
    }

    /// Message bytes encrypted or decrypted so far.
    pub fn processed_len(&self) -> u64 {
        self.processed
    }

    /// Tag length in bytes.
    pub fn tag_len(&self) -> usize {
        self.tag_len
    }

    /// Whether this session computes a GMAC.
    pub fn is_gmac(&self) -> bool {
        self.gmac
    }

    #[inline]
    fn keystream(&mut self) -> Block {
        let mut block = self.counter.next_block();
        self.cipher.encrypt_block(&mut block);
        block
    }

    /// Message bytes among `tail` buffered bytes.
    fn data_len(&self, tail: usize) -> Result<usize, Error> {
        tail.checked_sub(self.holdback()).ok_or(Error::MessageLength)
    }

    /// Check that `len` more bytes of GMAC input keep the authenticated
    /// data length expressible in bits.
    fn check_aad(&self, len: usize) -> Result<(), Error> {
        self.aad_len
            .checked_add(len as u64)
            .and_then(|n| n.checked_mul(8))
            .map(|_| ())
            .ok_or(Error::MessageLength)
    }

    fn compute_tag(&mut self) -> Block {
        self.ghash.update_lengths(self.aad_len * 8, self.processed * 8);
        let mut tag = self.ghash.sum();
        let mut mask = self.j0;
        self.cipher.encrypt_block(&mut mask);
        self.cipher.xor_block(&mask, &mut tag);
        tag
    }
}

impl<C: CipherOps> ModeCore for GcmCore<C> {
    fn holdback(&self) -> usize {
        match self.direction {
            Direction::Encrypt => 0,
            Direction::Decrypt => self.tag_len,
        }
    }

    fn check_blocks(&self, blocks: usize) -> Result<(), Error> {
        if self.gmac {
            return self.check_aad(blocks * BLOCK_SIZE);
        }
        self.counter.check(blocks)
    }

    fn check_final(&self, blocks: usize, tail: usize) -> Result<(), Error> {
        let data = self.data_len(tail)?;
        if self.gmac {
            return self.check_aad(blocks * BLOCK_SIZE + data);
        }
        self.counter.check(blocks + usize::from(data != 0))
    }

    fn final_len(&self, tail: usize) -> usize {
        match (self.direction, self.gmac) {
            (Direction::Encrypt, true) => self.tag_len,
            (Direction::Encrypt, false) => tail + self.tag_len,
            (Direction::Decrypt, true) => 0,
            (Direction::Decrypt, false) => tail.saturating_sub(self.tag_len),
        }
    }

    fn emits_blocks(&self) -> bool {
        !self.gmac
    }

    fn bulk_ready(&self, blocks: usize) -> bool {
        self.cipher.capabilities().ctr && !self.counter.wraps_within(blocks)
    }

    fn process_block(&mut self, block: &mut Block) -> Result<(), Error> {
        if self.gmac {
            self.ghash.update_block(block);
            self.aad_len += BLOCK_SIZE as u64;
            return Ok(());
        }
        let ks = self.keystream();
        match self.direction {
            Direction::Encrypt => {
                self.cipher.xor_block(&ks, block);
                self.ghash.update_block(block);
            }
            Direction::Decrypt => {
                self.ghash.update_block(block);
                self.cipher.xor_block(&ks, block);
            }
        }
        self.processed += BLOCK_SIZE as u64;
        Ok(())
    }

    fn process_blocks(&mut self, mut blocks: InOutBuf<'_, '_, Block>) -> Result<(), Error> {
        let len = (blocks.len() * BLOCK_SIZE) as u64;
        match self.direction {
            Direction::Encrypt => {
                let saved = self.counter.clone();
                if let Err(err) = self.cipher.cipher_ctr(blocks.reborrow(), &mut self.counter) {
                    self.counter = saved;
                    return Err(err);
                }
                self.ghash.update_blocks(blocks.get_out());
            }
            Direction::Decrypt => {
                let saved = self.ghash.clone();
                self.ghash.update_blocks(blocks.get_in());
                if let Err(err) = self.cipher.cipher_ctr(blocks, &mut self.counter) {
                    self.ghash = saved;
                    return Err(err);
                }
            }
        }
        self.processed += len;
        Ok(())
    }

    fn finalize<S: Sink + ?Sized>(&mut self, tail: &[u8], sink: &mut S) -> Result<usize, Error> {
        let n = self.data_len(tail.len())?;
        let (data, received) = tail.split_at(n);

        if self.gmac {
            self.ghash.update_padded(data);
            self.aad_len += n as u64;
            return self.finalize_tag(&[], received, sink);
        }

        let mut block = Block::default();
        if n != 0 {
            block[..n].copy_from_slice(data);
            if self.direction == Direction::Decrypt {
                self.ghash.update_padded(&block[..n]);
            }
            let ks = self.keystream();
            self.cipher.xor_block(&ks, &mut block);
            if self.direction == Direction::Encrypt {
                self.ghash.update_padded(&block[..n]);
            }
            self.processed += n as u64;
        }
        self.finalize_tag(&block[..n], received, sink)
    }
}

impl<C: CipherOps> GcmCore<C> {
    /// Emit `last || tag`, or verify `received` and emit `last` on a match.
    fn finalize_tag<S: Sink + ?Sized>(
        &mut self,
        last: &[u8],
        received: &[u8],
        sink: &mut S,
    ) -> Result<usize, Error> {
        let tag = self.compute_tag();
        match self.direction {
            Direction::Encrypt => {
                sink.put(last)?;
                sink.put(&tag[..self.tag_len])?;
                Ok(last.len() + self.tag_len)
            }
            Direction::Decrypt => {
                if tag[..self.tag_len].ct_eq(received).into() {
                    sink.put(last)?;
                    Ok(last.len())
                } else {
                    Err(Error::AuthenticationFailed)
                }
            }
        }
    }
}

impl<C: CipherOps> StreamWrapper<GcmCore<C>> {
    /// Open a GCM session.
    pub fn new(cipher: C, direction: Direction, params: &GcmParams<'_>) -> Result<Self, Error> {
        GcmCore::new(cipher, direction, params).map(Self::from_core)
    }

    /// Open a GMAC session over `params.aad` followed by the processed
    /// input.
    pub fn gmac(cipher: C, direction: Direction, params: &GcmParams<'_>) -> Result<Self, Error> {
        let (core, rest) = GcmCore::gmac(cipher, direction, params)?;
        Ok(Self::with_buffered(core, rest))
    }

    /// Authenticated data folded so far in bytes, excluding buffered
    /// bytes.
    pub fn aad_len(&self) -> u64 {
        self.get_core().aad_len()
    }

    /// Message bytes encrypted or decrypted so far, excluding buffered
    /// bytes.
    pub fn processed_len(&self) -> u64 {
        self.get_core().processed_len()
    }
}

fn tag_len(tag_bits: u32) -> Result<usize, Error> {
    if TAG_BITS.contains(&tag_bits) {
        let len = (tag_bits / 8) as usize;
        debug_assert!(len <= MAX_TAG_LEN);
        Ok(len)
    } else {
        Err(Error::InvalidTagLength)
    }
}

fn bit_len(len: usize) -> Option<u64> {
    (len as u64).checked_mul(8)
}
