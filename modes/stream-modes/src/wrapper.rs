//! Streaming driver shared by every mode.
//!
//! [`StreamWrapper`] accepts input in arbitrarily sized chunks, carries the
//! bytes that do not complete a block between calls and feeds whole blocks
//! to a [`ModeCore`], either one at a time through a [`Sink`] or as a
//! single run through the core's bulk route when the fast-path conditions
//! hold.

use crate::{
    sink::{Contiguous, Sink},
    Block, Error, BLOCK_SIZE, MAX_TAG_LEN,
};
use cipher::{consts::U16, inout::InOutBuf};
use core::mem;

#[cfg(feature = "zeroize")]
use zeroize::Zeroize;

/// Capacity of the carried-over buffer: one block plus the largest tag a
/// decrypting GCM context holds back.
const MAX_PENDING: usize = BLOCK_SIZE + MAX_TAG_LEN;

const FAST_PATH: bool = !cfg!(feature = "force-soft");

/// Block-level state machine of one mode of operation.
///
/// A core only ever sees whole blocks through `process_block` and
/// `process_blocks`; everything else is passed to `finalize` once.
pub trait ModeCore {
    /// Number of trailing bytes that must stay buffered after every call
    /// because they may belong to a trailer (the tag of a GCM ciphertext).
    fn holdback(&self) -> usize {
        0
    }

    /// Check that `blocks` more blocks can be processed.
    fn check_blocks(&self, blocks: usize) -> Result<(), Error>;

    /// Check that `blocks` more blocks followed by finalization over
    /// `tail` buffered bytes can succeed.
    fn check_final(&self, blocks: usize, tail: usize) -> Result<(), Error>;

    /// Number of bytes `finalize` writes for `tail` buffered bytes.
    fn final_len(&self, tail: usize) -> usize;

    /// Whether processed blocks are written out. A GMAC core absorbs its
    /// input and only emits the tag.
    fn emits_blocks(&self) -> bool {
        true
    }

    /// Whether `process_blocks` may be used for a run of `blocks` blocks.
    fn bulk_ready(&self, blocks: usize) -> bool {
        let _ = blocks;
        false
    }

    /// Transform one block in place.
    fn process_block(&mut self, block: &mut Block) -> Result<(), Error>;

    /// Transform a run of blocks with the cipher's bulk entry points.
    ///
    /// On error the core state must be left as it was before the call.
    fn process_blocks(&mut self, blocks: InOutBuf<'_, '_, Block>) -> Result<(), Error> {
        let _ = blocks;
        Err(Error::BulkUnsupported)
    }

    /// Consume the buffered `tail` and write the closing output.
    fn finalize<S: Sink + ?Sized>(&mut self, tail: &[u8], sink: &mut S) -> Result<usize, Error>;
}

/// Bytes carried over between calls, consumed front first.
#[derive(Clone, Default)]
pub(crate) struct Pending {
    buf: [u8; MAX_PENDING],
    len: usize,
}

impl Pending {
    pub(crate) fn as_slice(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn extend(&mut self, data: &[u8]) {
        let end = self.len + data.len();
        debug_assert!(end <= MAX_PENDING);
        self.buf[self.len..end].copy_from_slice(data);
        self.len = end;
    }

    /// Move up to `out.len()` bytes from the front into `out`.
    pub(crate) fn pop_front(&mut self, out: &mut [u8]) -> usize {
        let n = out.len().min(self.len);
        out[..n].copy_from_slice(&self.buf[..n]);
        self.buf.copy_within(n..self.len, 0);
        self.len -= n;
        n
    }
}

impl Drop for Pending {
    fn drop(&mut self) {
        #[cfg(feature = "zeroize")]
        self.buf.zeroize();
    }
}

/// Streaming front-end over a [`ModeCore`].
#[derive(Clone)]
pub struct StreamWrapper<M> {
    core: M,
    pending: Pending,
}

impl<M: ModeCore> StreamWrapper<M> {
    /// Wrap an initialized core.
    pub fn from_core(core: M) -> Self {
        Self {
            core,
            pending: Pending::default(),
        }
    }

    /// Access the underlying core.
    pub fn get_core(&self) -> &M {
        &self.core
    }

    /// Number of input bytes carried over to the next call.
    pub fn buffered_len(&self) -> usize {
        self.pending.len()
    }

    /// Number of bytes `finish` will write in the current state.
    pub fn final_output_len(&self) -> usize {
        self.core.final_len(self.pending.len())
    }

    /// Pre-seed the carried-over buffer with input that precedes the first
    /// call.
    pub(crate) fn with_buffered(core: M, data: &[u8]) -> Self {
        debug_assert!(data.len() < BLOCK_SIZE);
        let mut wrapper = Self::from_core(core);
        wrapper.pending.extend(data);
        wrapper
    }

    /// Bytes consumed as whole blocks and bytes left buffered when `len`
    /// more input bytes arrive.
    fn split(&self, len: usize) -> (usize, usize) {
        let total = self.pending.len() + len;
        let out = total.saturating_sub(self.core.holdback()) / BLOCK_SIZE * BLOCK_SIZE;
        (out, total - out)
    }

    /// Bytes written for `consumed` bytes of whole blocks.
    fn emitted(&self, consumed: usize) -> usize {
        if self.core.emits_blocks() {
            consumed
        } else {
            0
        }
    }

    /// Process `data`, writing every completed block to `sink`.
    ///
    /// Returns the number of bytes written. Either the whole call succeeds
    /// or nothing is written and no state changes.
    pub fn process<S: Sink + ?Sized>(&mut self, data: &[u8], sink: &mut S) -> Result<usize, Error> {
        let (in_len, tail) = self.split(data.len());
        let blocks = in_len / BLOCK_SIZE;
        self.core.check_blocks(blocks)?;
        let out_len = self.emitted(in_len);
        if sink.remaining() < out_len {
            return Err(Error::OutputTooSmall);
        }

        if self.fast_path_eligible(blocks, tail) {
            if let Some(out) = sink.contiguous(out_len) {
                let (head, rest) = data.split_at(in_len);
                let buf = InOutBuf::new(head, out).map_err(|_| Error::OutputTooSmall)?;
                let (run, _) = buf.into_chunks::<U16>();
                match self.core.process_blocks(run) {
                    Ok(()) => {
                        sink.advance(out_len);
                        self.pending.extend(rest);
                        return Ok(out_len);
                    }
                    // Announced but not implemented: use the per-block loop.
                    Err(Error::BulkUnsupported) => {}
                    Err(err) => return Err(err),
                }
            }
        }

        let emits = self.core.emits_blocks();
        let mut pending = mem::take(&mut self.pending);
        let mut data = data;
        for _ in 0..blocks {
            let mut block = Block::default();
            let n = pending.pop_front(&mut block);
            let (head, rest) = data.split_at(BLOCK_SIZE - n);
            block[n..].copy_from_slice(head);
            data = rest;
            self.core.process_block(&mut block)?;
            if emits {
                sink.put(&block)?;
            }
        }
        pending.extend(data);
        self.pending = pending;
        Ok(out_len)
    }

    /// Process `buf` in place.
    ///
    /// The output of this call is written to `buf[..n]` and `n` is
    /// returned. Bytes of `buf` past `n` are consumed into the carried-over
    /// buffer. Fails with [`Error::OutputTooSmall`] without consuming
    /// anything when the call would emit more than `buf.len()` bytes, which
    /// can happen when an earlier call left bytes buffered.
    pub fn process_in_place(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        if !self.core.emits_blocks() {
            let mut none = [0u8; 0];
            return self.process(buf, &mut Contiguous::new(&mut none));
        }
        let (out_len, tail) = self.split(buf.len());
        if out_len > buf.len() {
            return Err(Error::OutputTooSmall);
        }
        let blocks = out_len / BLOCK_SIZE;
        self.core.check_blocks(blocks)?;

        if self.fast_path_eligible(blocks, tail) {
            let (head, rest) = buf.split_at_mut(out_len);
            let (run, _) = InOutBuf::from(head).into_chunks::<U16>();
            match self.core.process_blocks(run) {
                Ok(()) => {
                    self.pending.extend(rest);
                    return Ok(out_len);
                }
                Err(Error::BulkUnsupported) => {}
                Err(err) => return Err(err),
            }
        }

        // Output block `k` lands on `buf[16k..16k + 16]`, which may still
        // hold unread input while bytes are buffered; such bytes are moved
        // into `fifo` before being overwritten.
        let mut fifo = mem::take(&mut self.pending);
        let mut read = 0;
        for k in 0..blocks {
            let write = k * BLOCK_SIZE;
            let mut block = Block::default();
            let n = fifo.pop_front(&mut block);
            let take = BLOCK_SIZE - n;
            block[n..].copy_from_slice(&buf[read..read + take]);
            read += take;
            self.core.process_block(&mut block)?;
            if read < write + BLOCK_SIZE {
                fifo.extend(&buf[read..write + BLOCK_SIZE]);
                read = write + BLOCK_SIZE;
            }
            buf[write..write + BLOCK_SIZE].copy_from_slice(&block);
        }
        fifo.extend(&buf[read..]);
        self.pending = fifo;
        Ok(out_len)
    }

    /// Flush buffered bytes and close the session.
    ///
    /// Use [`final_output_len`][Self::final_output_len] to size `sink`.
    pub fn finish<S: Sink + ?Sized>(mut self, sink: &mut S) -> Result<usize, Error> {
        let Self { core, pending } = &mut self;
        core.check_final(0, pending.len())?;
        if sink.remaining() < core.final_len(pending.len()) {
            return Err(Error::OutputTooSmall);
        }
        core.finalize(pending.as_slice(), sink)
    }

    /// Process the last `data` of a message and finish in one call.
    ///
    /// Every length, counter and capacity check for the rest of the message
    /// runs before the first byte is written.
    pub fn process_final<S: Sink + ?Sized>(mut self, data: &[u8], sink: &mut S) -> Result<usize, Error> {
        let (in_len, tail) = self.split(data.len());
        self.core.check_final(in_len / BLOCK_SIZE, tail)?;
        if sink.remaining() < self.emitted(in_len) + self.core.final_len(tail) {
            return Err(Error::OutputTooSmall);
        }
        let n = self.process(data, sink)?;
        Ok(n + self.finish(sink)?)
    }

    /// Fast path conditions: nothing buffered, the call ends exactly on a
    /// block boundary (before any held-back trailer), and the core's cipher
    /// offers a bulk route for this run.
    fn fast_path_eligible(&self, blocks: usize, tail: usize) -> bool {
        FAST_PATH
            && blocks > 0
            && self.core.emits_blocks()
            && self.pending.is_empty()
            && tail == self.core.holdback()
            && self.core.bulk_ready(blocks)
    }
}
