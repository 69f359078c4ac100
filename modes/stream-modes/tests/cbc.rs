mod common;

use common::*;
use hex_literal::hex;
use stream_modes::{Cbc, Contiguous, Direction, Error, Sink};

const KEY: [u8; 16] = hex!("2b7e151628aed2a6abf7158809cf4f3c");
const IV: [u8; 16] = hex!("000102030405060708090a0b0c0d0e0f");
const PLAINTEXT: [u8; 64] = hex!(
    "6bc1bee22e409f96e93d7e117393172a"
    "ae2d8a571e03ac9c9eb76fac45af8e51"
    "30c81c46a35ce411e5fbc1191a0a52ef"
    "f69f2445df4f9b17ad2b417be66c3710"
);
const CIPHERTEXT: [u8; 64] = hex!(
    "7649abac8119b246cee98e9b12e9197d"
    "5086cb9b507219ee95db113a917678b2"
    "73bed6b8e3c1743b7116e69e22229516"
    "3ff1caa1681fac09120eca307586e1a7"
);

/// NIST SP 800-38A, F.2.1 and F.2.2
#[test]
fn cbc_aes128() {
    let cipher = bulk(&KEY);
    let enc = Cbc::new(&cipher, Direction::Encrypt, &IV).unwrap();
    assert_eq!(run(enc, &PLAINTEXT, &[]).unwrap()[..], CIPHERTEXT[..]);
    let dec = Cbc::new(&cipher, Direction::Decrypt, &IV).unwrap();
    assert_eq!(run(dec, &CIPHERTEXT, &[]).unwrap()[..], PLAINTEXT[..]);

    let cipher = blockwise(&KEY);
    let enc = Cbc::new(&cipher, Direction::Encrypt, &IV).unwrap();
    assert_eq!(run_bytewise(enc, &PLAINTEXT).unwrap()[..], CIPHERTEXT[..]);
    let dec = Cbc::new(&cipher, Direction::Decrypt, &IV).unwrap();
    assert_eq!(run_bytewise(dec, &CIPHERTEXT).unwrap()[..], PLAINTEXT[..]);
}

#[test]
fn split_three_twenty_nine_zero() {
    let cipher = bulk(&KEY);
    let mut out = [0u8; 32];
    let mut sink = Contiguous::new(&mut out);
    let mut enc = Cbc::new(&cipher, Direction::Encrypt, &IV).unwrap();
    assert_eq!(enc.process(&PLAINTEXT[..3], &mut sink), Ok(0));
    assert_eq!(enc.buffered_len(), 3);
    assert_eq!(enc.process(&PLAINTEXT[3..32], &mut sink), Ok(32));
    assert_eq!(enc.process(&[], &mut sink), Ok(0));
    assert_eq!(enc.iv_state()[..], CIPHERTEXT[16..32]);
    assert_eq!(enc.finish(&mut sink), Ok(0));
    assert_eq!(out[..], CIPHERTEXT[..32]);
}

#[test]
fn chaining_value_tracks_last_ciphertext() {
    let cipher = bulk(&KEY);
    let mut dec = Cbc::new(&cipher, Direction::Decrypt, &IV).unwrap();
    assert_eq!(dec.iv_state()[..], IV);
    let mut out = [0u8; 64];
    let mut sink = Contiguous::new(&mut out);
    dec.process(&CIPHERTEXT[..40], &mut sink).unwrap();
    assert_eq!(dec.iv_state()[..], CIPHERTEXT[16..32]);
    dec.process(&CIPHERTEXT[40..], &mut sink).unwrap();
    assert_eq!(dec.iv_state()[..], CIPHERTEXT[48..]);
}

#[test]
fn bulk_decrypt_matches_blockwise() {
    // Long enough to span several parallel batches of the bulk path.
    let mut rng = rng(2);
    let data = random_bytes(&mut rng, 16 * 21);
    let fast = bulk(&KEY);
    let slow = blockwise(&KEY);

    let ct = run(Cbc::new(&fast, Direction::Encrypt, &IV).unwrap(), &data, &[]).unwrap();
    let ct_slow = run(Cbc::new(&slow, Direction::Encrypt, &IV).unwrap(), &data, &[]).unwrap();
    assert_eq!(ct, ct_slow);

    for _ in 0..20 {
        let chunks = random_chunks(&mut rng, ct.len());
        let pt = run(Cbc::new(&fast, Direction::Decrypt, &IV).unwrap(), &ct, &chunks).unwrap();
        assert_eq!(pt, data);
        let pt = run(Cbc::new(&slow, Direction::Decrypt, &IV).unwrap(), &ct, &chunks).unwrap();
        assert_eq!(pt, data);
    }
}

#[test]
fn in_place() {
    let cipher = bulk(&KEY);
    let mut buf = PLAINTEXT;
    let mut enc = Cbc::new(&cipher, Direction::Encrypt, &IV).unwrap();
    assert_eq!(enc.process_in_place(&mut buf), Ok(64));
    assert_eq!(buf, CIPHERTEXT);

    let mut dec = Cbc::new(&cipher, Direction::Decrypt, &IV).unwrap();
    let (head, tail) = buf.split_at_mut(20);
    assert_eq!(dec.process_in_place(head), Ok(16));
    assert_eq!(head[..16], PLAINTEXT[..16]);
    assert_eq!(dec.buffered_len(), 4);

    // The four buffered bytes make this call emit 48 bytes, more than the
    // 44 bytes of `tail` can hold.
    assert_eq!(dec.process_in_place(tail), Err(Error::OutputTooSmall));
    assert_eq!(dec.buffered_len(), 4);
    assert_eq!(tail[..], CIPHERTEXT[20..]);

    let mut out = [0u8; 48];
    let mut sink = Contiguous::new(&mut out);
    assert_eq!(dec.process(tail, &mut sink), Ok(48));
    assert_eq!(dec.finish(&mut sink), Ok(0));
    assert_eq!(out[..], PLAINTEXT[16..]);
}

#[test]
fn rejects_bad_iv() {
    let cipher = bulk(&KEY);
    let err = Cbc::new(&cipher, Direction::Encrypt, &IV[..15]).err();
    assert_eq!(err, Some(Error::InvalidIvLength));
}
