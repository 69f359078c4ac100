//! GHASH accumulator over GF(2^128) with the GCM reduction polynomial
//! `x^128 + x^7 + x^2 + x + 1`.
//!
//! Field elements use the bit order of NIST SP 800-38D: the first bit of
//! the big endian block is the coefficient of `x^0`.

use crate::{counter::to_u128, Block, BLOCK_SIZE};

#[cfg(feature = "zeroize")]
use zeroize::Zeroize;

/// `R = 11100001 || 0^120`
const R: u128 = 0xe1 << 120;

/// Reduction of the four bits shifted out by one nibble step.
const LAST4: [u16; 16] = [
    0x0000, 0x1c20, 0x3840, 0x2460, 0x7080, 0x6ca0, 0x48c0, 0x54e0, 0xe100, 0xfd20, 0xd940,
    0xc560, 0x9180, 0x8da0, 0xa9c0, 0xb5e0,
];

/// GHASH state keyed by the hash subkey `H`.
///
/// Two multipliers are kept: a constant-time shift-and-add multiplier used
/// by the per-block loop, and a 4-bit table of multiples of `H` built once
/// at construction and used for runs of blocks. Both give identical
/// results.
#[derive(Clone)]
pub struct Ghash {
    h: u128,
    table: [u128; 16],
    acc: u128,
}

impl Ghash {
    /// Initialize GHASH with the hash subkey `H`.
    pub fn new(h: &Block) -> Self {
        let h = to_u128(h);
        Self {
            h,
            table: build_table(h),
            acc: 0,
        }
    }

    /// Fold a single block: `acc = (acc ^ block) * H`.
    #[inline]
    pub fn update_block(&mut self, block: &Block) {
        self.acc = mul(self.acc ^ to_u128(block), self.h);
    }

    /// Fold a run of blocks using the precomputed table.
    pub fn update_blocks(&mut self, blocks: &[Block]) {
        for block in blocks {
            self.acc = self.mul_table(self.acc ^ to_u128(block));
        }
    }

    /// Fold `data`, zero padding its final partial block.
    pub fn update_padded(&mut self, data: &[u8]) {
        let mut chunks = data.chunks_exact(BLOCK_SIZE);
        for chunk in &mut chunks {
            self.acc = self.mul_table(self.acc ^ to_u128(chunk));
        }
        let rem = chunks.remainder();
        if !rem.is_empty() {
            let mut last = [0u8; BLOCK_SIZE];
            last[..rem.len()].copy_from_slice(rem);
            self.acc = self.mul_table(self.acc ^ u128::from_be_bytes(last));
        }
    }

    /// Fold the closing `len(A) || len(C)` block, both lengths in bits.
    pub fn update_lengths(&mut self, aad_bits: u64, data_bits: u64) {
        let block = (u128::from(aad_bits) << 64) | u128::from(data_bits);
        self.acc = mul(self.acc ^ block, self.h);
    }

    /// Current accumulator value.
    pub fn sum(&self) -> Block {
        Block::clone_from_slice(&self.acc.to_be_bytes())
    }

    /// Clear the accumulator, keeping `H` and its table.
    pub fn reset(&mut self) {
        self.acc = 0;
    }

    fn mul_table(&self, x: u128) -> u128 {
        let x = x.to_be_bytes();
        let mut z = self.table[usize::from(x[15] & 0xf)];
        for i in (0..BLOCK_SIZE).rev() {
            if i != BLOCK_SIZE - 1 {
                z = shift4(z) ^ self.table[usize::from(x[i] & 0xf)];
            }
            z = shift4(z) ^ self.table[usize::from(x[i] >> 4)];
        }
        z
    }
}

impl Drop for Ghash {
    fn drop(&mut self) {
        #[cfg(feature = "zeroize")]
        {
            self.h.zeroize();
            self.table.zeroize();
            self.acc.zeroize();
        }
    }
}

/// Shift-and-add multiplication, branch free in the operand bits.
fn mul(x: u128, h: u128) -> u128 {
    let mut z = 0u128;
    let mut v = h;
    for i in 0..128 {
        let bit = (x >> (127 - i)) & 1;
        z ^= v & 0u128.wrapping_sub(bit);
        v = (v >> 1) ^ (R & 0u128.wrapping_sub(v & 1));
    }
    z
}

#[inline(always)]
fn shift4(z: u128) -> u128 {
    let rem = usize::from((z & 0xf) as u8);
    (z >> 4) ^ (u128::from(LAST4[rem]) << 112)
}

/// `table[i] = i * H` for every 4-bit `i` in reflected bit order.
fn build_table(h: u128) -> [u128; 16] {
    let mut table = [0u128; 16];
    let mut v = h;
    table[8] = v;
    let mut i = 4;
    while i > 0 {
        v = (v >> 1) ^ (R & 0u128.wrapping_sub(v & 1));
        table[i] = v;
        i >>= 1;
    }
    let mut i = 2;
    while i <= 8 {
        for j in 1..i {
            table[i + j] = table[i] ^ table[j];
        }
        i *= 2;
    }
    table
}
