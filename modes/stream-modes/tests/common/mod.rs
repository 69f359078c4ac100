#![allow(dead_code)]

use aes::Aes128;
use rand::{rngs::StdRng, Rng, SeedableRng};
use stream_modes::{
    cipher::{BlockDecrypt, BlockEncrypt, KeyInit},
    Block, Blockwise, Bulk, Capabilities, CipherOps, Contiguous, Error, ModeCore, Sink,
    StreamWrapper,
};

pub fn bulk(key: &[u8; 16]) -> Bulk<Aes128> {
    Bulk::new(&(*key).into())
}

pub fn blockwise(key: &[u8; 16]) -> Blockwise<Aes128> {
    Blockwise::new(&(*key).into())
}

/// AES exposing nothing but single-block encryption.
pub struct EncryptOnly(pub Aes128);

impl EncryptOnly {
    pub fn new(key: &[u8; 16]) -> Self {
        Self(Aes128::new(&(*key).into()))
    }
}

impl CipherOps for EncryptOnly {
    fn encrypt_block(&self, block: &mut Block) {
        self.0.encrypt_block(block);
    }
}

/// AES announcing every bulk route while implementing none of them.
pub struct ClaimsBulk(pub Aes128);

impl ClaimsBulk {
    pub fn new(key: &[u8; 16]) -> Self {
        Self(Aes128::new(&(*key).into()))
    }
}

impl CipherOps for ClaimsBulk {
    fn capabilities(&self) -> Capabilities {
        Capabilities::ALL
    }

    fn encrypt_block(&self, block: &mut Block) {
        self.0.encrypt_block(block);
    }

    fn decrypt_block(&self, block: &mut Block) -> Result<(), Error> {
        self.0.decrypt_block(block);
        Ok(())
    }
}

/// Feed `data` split at `chunks` (the rest goes into one last call), then
/// finish and return everything written.
pub fn run<M: ModeCore>(
    mut mode: StreamWrapper<M>,
    data: &[u8],
    chunks: &[usize],
) -> Result<Vec<u8>, Error> {
    let mut out = vec![0u8; data.len() + 16];
    let mut sink = Contiguous::new(&mut out);
    let mut pos = 0;
    for &chunk in chunks {
        let end = (pos + chunk).min(data.len());
        mode.process(&data[pos..end], &mut sink)?;
        pos = end;
    }
    mode.process(&data[pos..], &mut sink)?;
    mode.finish(&mut sink)?;
    let n = sink.position();
    out.truncate(n);
    Ok(out)
}

/// Same as [`run`] with one call per byte.
pub fn run_bytewise<M: ModeCore>(mode: StreamWrapper<M>, data: &[u8]) -> Result<Vec<u8>, Error> {
    run(mode, data, &vec![1; data.len()])
}

pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

pub fn random_bytes(rng: &mut StdRng, len: usize) -> Vec<u8> {
    (0..len).map(|_| rng.gen()).collect()
}

/// Random split of `len` bytes into chunks of 0 to 40 bytes.
pub fn random_chunks(rng: &mut StdRng, len: usize) -> Vec<usize> {
    let mut chunks = Vec::new();
    let mut total = 0;
    while total < len {
        let chunk = rng.gen_range(0..=40);
        chunks.push(chunk);
        total += chunk;
    }
    chunks
}
