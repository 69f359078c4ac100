mod common;

use common::*;
use hex_literal::hex;
use stream_modes::{Contiguous, Counter, Ctr, Direction, Error, ModeContext, Params, Sink};

const KEY: [u8; 16] = hex!("2b7e151628aed2a6abf7158809cf4f3c");
const COUNTER: [u8; 16] = hex!("f0f1f2f3f4f5f6f7f8f9fafbfcfdfeff");
const PLAINTEXT: [u8; 64] = hex!(
    "6bc1bee22e409f96e93d7e117393172a"
    "ae2d8a571e03ac9c9eb76fac45af8e51"
    "30c81c46a35ce411e5fbc1191a0a52ef"
    "f69f2445df4f9b17ad2b417be66c3710"
);
const CIPHERTEXT: [u8; 64] = hex!(
    "874d6191b620e3261bef6864990db6ce"
    "9806f66b7970fdff8617187bb9fffdff"
    "5ae4df3edbd5d35e5b4f09020db03eab"
    "1e031dda2fbe03d1792170a0f3009cee"
);

/// NIST SP 800-38A, F.5.1 and F.5.2
#[test]
fn ctr_aes128() {
    let cipher = bulk(&KEY);
    for bits in [32, 64, 128] {
        let ctr = Ctr::new(&cipher, &COUNTER, bits).unwrap();
        assert_eq!(run(ctr, &PLAINTEXT, &[]).unwrap()[..], CIPHERTEXT[..]);
        let ctr = Ctr::new(&cipher, &COUNTER, bits).unwrap();
        assert_eq!(run_bytewise(ctr, &CIPHERTEXT).unwrap()[..], PLAINTEXT[..]);
    }

    let cipher = EncryptOnly::new(&KEY);
    let ctr = Ctr::new(&cipher, &COUNTER, 32).unwrap();
    assert_eq!(run(ctr, &PLAINTEXT, &[5, 17]).unwrap()[..], CIPHERTEXT[..]);
}

#[test]
fn partial_final_block() {
    let cipher = bulk(&KEY);
    let ctr = Ctr::new(&cipher, &COUNTER, 32).unwrap();
    assert_eq!(run(ctr, &PLAINTEXT[..60], &[]).unwrap()[..], CIPHERTEXT[..60]);

    let mut ctr = Ctr::new(&cipher, &COUNTER, 32).unwrap();
    let mut out = [0u8; 64];
    let mut sink = Contiguous::new(&mut out);
    assert_eq!(ctr.process(&PLAINTEXT[..60], &mut sink), Ok(48));
    assert_eq!(ctr.counter_block()[..], hex!("f0f1f2f3f4f5f6f7f8f9fafbfcfdff02"));
    assert_eq!(ctr.final_output_len(), 12);
    assert_eq!(ctr.finish(&mut sink), Ok(12));
    assert_eq!(sink.written(), &CIPHERTEXT[..60]);
}

#[test]
fn counter_overflow_rejected_before_output() {
    let cipher = bulk(&KEY);
    // Two counter values are left in the low byte.
    let start = hex!("000102030405060708090a0b0c0d0efe");
    let mut out = [0u8; 64];
    let mut sink = Contiguous::new(&mut out);

    let mut ctr = Ctr::new(&cipher, &start, 8).unwrap();
    assert_eq!(ctr.process(&PLAINTEXT[..48], &mut sink), Err(Error::CounterOverflow));
    assert_eq!(sink.position(), 0);
    assert_eq!(ctr.process(&PLAINTEXT[..32], &mut sink), Ok(32));
    assert_eq!(ctr.process(&PLAINTEXT[32..33], &mut sink), Ok(0));
    assert_eq!(ctr.finish(&mut sink), Err(Error::CounterOverflow));
    assert_eq!(sink.position(), 32);

    let ctr = Ctr::new(&cipher, &start, 8).unwrap();
    let err = ctr.process_final(&PLAINTEXT[..33], &mut Contiguous::new(&mut out));
    assert_eq!(err, Err(Error::CounterOverflow));
    assert_eq!(out[32..], [0u8; 32]);
}

#[test]
fn keystream_counter_values() {
    // Output of CTR over zeros is the encryption of successive counters.
    let cipher = bulk(&KEY);
    let mut counter = Counter::new(&COUNTER.into(), 32).unwrap();
    let mut expected = Vec::new();
    for _ in 0..3 {
        let mut block = counter.next_block();
        stream_modes::CipherOps::encrypt_block(&cipher, &mut block);
        expected.extend_from_slice(&block);
    }
    let ctr = Ctr::new(&cipher, &COUNTER, 32).unwrap();
    assert_eq!(run(ctr, &[0u8; 48], &[]).unwrap(), expected);
}

#[test]
fn fast_and_generic_paths_agree() {
    let mut rng = rng(3);
    let fast = bulk(&KEY);
    let slow = blockwise(&KEY);
    for len in [0, 1, 15, 16, 17, 128, 129, 333] {
        let data = random_bytes(&mut rng, len);
        let expected = run(Ctr::new(&slow, &COUNTER, 32).unwrap(), &data, &[]).unwrap();
        for _ in 0..10 {
            let chunks = random_chunks(&mut rng, len);
            let ct = run(Ctr::new(&fast, &COUNTER, 32).unwrap(), &data, &chunks).unwrap();
            assert_eq!(ct, expected);
        }
    }
}

#[test]
fn in_place_with_carry() {
    let cipher = bulk(&KEY);
    let mut rng = rng(4);
    let data = random_bytes(&mut rng, 190);
    let expected = run(Ctr::new(&cipher, &COUNTER, 32).unwrap(), &data, &[]).unwrap();

    // Every call leaves at least as many bytes buffered as the previous one,
    // so each output fits into its own input.
    let mut buf = data.clone();
    let mut ctr = Ctr::new(&cipher, &COUNTER, 32).unwrap();
    let mut out = Vec::new();
    let mut pos = 0;
    for (chunk, emitted) in [(5, 0), (40, 32), (64, 64), (81, 80)] {
        let n = ctr.process_in_place(&mut buf[pos..pos + chunk]).unwrap();
        assert_eq!(n, emitted);
        out.extend_from_slice(&buf[pos..pos + n]);
        pos += chunk;
    }
    assert_eq!(ctr.buffered_len(), 14);
    let mut tail = [0u8; 14];
    assert_eq!(ctr.finish(&mut Contiguous::new(&mut tail)), Ok(14));
    out.extend_from_slice(&tail);
    assert_eq!(out, expected);
}

#[test]
fn decryption_with_encrypt_only_cipher() {
    let cipher = EncryptOnly::new(&KEY);
    let params = Params::Ctr {
        counter: &COUNTER,
        counter_bits: 32,
    };
    let ctx = ModeContext::new(&cipher, Direction::Decrypt, params).unwrap();
    let mut out = [0u8; 64];
    assert_eq!(ctx.process_final(&CIPHERTEXT, &mut Contiguous::new(&mut out)), Ok(64));
    assert_eq!(out, PLAINTEXT);
}

#[test]
fn rejects_bad_parameters() {
    let cipher = bulk(&KEY);
    assert_eq!(Ctr::new(&cipher, &COUNTER[..12], 32).err(), Some(Error::InvalidIvLength));
    assert_eq!(Ctr::new(&cipher, &COUNTER, 0).err(), Some(Error::InvalidCounterBits));
    assert_eq!(Ctr::new(&cipher, &COUNTER, 129).err(), Some(Error::InvalidCounterBits));
}
