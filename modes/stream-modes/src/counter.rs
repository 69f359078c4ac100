//! Counter block with an incrementing low sub-field.

use crate::{Block, Error};

/// Counter block used by CTR and GCM.
///
/// Only the low `bits` bits of the 128-bit big endian block are
/// incremented; the bits above them stay fixed for the whole session.
#[derive(Clone, Debug)]
pub struct Counter {
    value: u128,
    mask: u128,
    /// Blocks left before a counter value would repeat or overflow.
    /// `None` stands for 2^128.
    left: Option<u128>,
}

impl Counter {
    /// Counter whose low field may count up until it overflows.
    ///
    /// Starting from `low = block & mask`, `mask - low + 1` blocks can be
    /// generated before the field would wrap back to zero.
    pub fn new(block: &Block, bits: u32) -> Result<Self, Error> {
        let (value, mask) = load(block, bits)?;
        let left = (mask - (value & mask)).checked_add(1);
        Ok(Self { value, mask, left })
    }

    /// Counter whose low field wraps modulo `2^bits`, as GCM's `inc32`.
    ///
    /// `2^bits` blocks can be generated before the starting value would be
    /// reused.
    pub fn cyclic(block: &Block, bits: u32) -> Result<Self, Error> {
        let (value, mask) = load(block, bits)?;
        Ok(Self {
            value,
            mask,
            left: mask.checked_add(1),
        })
    }

    /// Current counter block.
    #[inline]
    pub fn block(&self) -> Block {
        Block::clone_from_slice(&self.value.to_be_bytes())
    }

    /// Return the current counter block and advance the counter.
    #[inline]
    pub fn next_block(&mut self) -> Block {
        let block = self.block();
        self.increment();
        block
    }

    /// Advance the low field by one, wrapping inside the field.
    #[inline]
    pub fn increment(&mut self) {
        let low = self.value.wrapping_add(1) & self.mask;
        self.value = (self.value & !self.mask) | low;
        if let Some(left) = self.left.as_mut() {
            *left = left.saturating_sub(1);
        }
    }

    /// Ensure that `blocks` more blocks can be generated.
    pub fn check(&self, blocks: usize) -> Result<(), Error> {
        match self.left {
            Some(left) if (blocks as u128) > left => Err(Error::CounterOverflow),
            _ => Ok(()),
        }
    }

    /// Number of blocks left, if it fits into `u128`.
    pub fn remaining(&self) -> Option<u128> {
        self.left
    }

    /// Whether the low field passes through zero within the next `blocks`
    /// increments.
    pub fn wraps_within(&self, blocks: usize) -> bool {
        if blocks == 0 {
            return false;
        }
        match (self.value & self.mask).checked_add(blocks as u128 - 1) {
            Some(last) => last > self.mask,
            None => true,
        }
    }
}

fn load(block: &Block, bits: u32) -> Result<(u128, u128), Error> {
    let mask = match bits {
        128 => u128::MAX,
        1..=127 => (1u128 << bits) - 1,
        _ => return Err(Error::InvalidCounterBits),
    };
    Ok((to_u128(block), mask))
}

#[inline]
pub(crate) fn to_u128(block: &[u8]) -> u128 {
    let mut buf = [0u8; 16];
    buf.copy_from_slice(block);
    u128::from_be_bytes(buf)
}
