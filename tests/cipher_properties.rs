use steglock::crypto::{BLOCK_LEN, IV_LEN};
use steglock::{CipherBox, SteglockError, SymmetricKey};

fn cipher(len: usize, fill: u8) -> CipherBox {
    CipherBox::new(SymmetricKey::from_bytes(&vec![fill; len]).unwrap())
}

#[test]
fn test_round_trip_every_key_length() {
    for key_len in [16, 24, 32] {
        let cipher = cipher(key_len, 0x42);
        for msg_len in [0usize, 1, 5, 15, 16, 17, 255, 4096] {
            let message: Vec<u8> = (0..msg_len).map(|i| (i * 31 % 256) as u8).collect();
            let blob = cipher.encrypt(&message).unwrap();
            assert_eq!(
                cipher.decrypt(&blob).unwrap(),
                message,
                "key_len={} msg_len={}",
                key_len,
                msg_len
            );
        }
    }
}

#[test]
fn test_invalid_key_lengths() {
    for len in [0, 15, 17, 33] {
        assert!(
            matches!(
                CipherBox::from_slice(&vec![0u8; len]),
                Err(SteglockError::InvalidKeyLength(got)) if got == len
            ),
            "key of {} bytes accepted",
            len
        );
    }
}

#[test]
fn test_hello_under_all_zero_key() {
    let cipher = CipherBox::from_slice(&[0u8; 32]).unwrap();
    let blob = cipher.encrypt(b"HELLO").unwrap();
    assert_eq!(blob.len(), IV_LEN + BLOCK_LEN);
    assert_eq!(cipher.decrypt(&blob).unwrap(), b"HELLO");
}

#[test]
fn test_same_message_encrypts_differently() {
    let cipher = cipher(32, 7);
    let a = cipher.encrypt(b"same message").unwrap();
    let b = cipher.encrypt(b"same message").unwrap();
    assert_ne!(a, b);
    assert_ne!(a[..IV_LEN], b[..IV_LEN]);
}

#[test]
fn test_ten_byte_blob_is_malformed() {
    let cipher = cipher(16, 1);
    assert!(matches!(
        cipher.decrypt(&[0u8; 10]),
        Err(SteglockError::MalformedCiphertext)
    ));
}

#[test]
fn test_bit_flip_never_yields_original() {
    // Flips in the IV or an earlier block can land on message bytes and pass
    // the padding check with altered output; they must never reproduce the
    // original plaintext.
    let cipher = cipher(32, 9);
    let message = b"attack at dawn, bring snacks".to_vec();
    let blob = cipher.encrypt(&message).unwrap();

    for bit in 0..blob.len() * 8 {
        let mut tampered = blob.clone();
        tampered[bit / 8] ^= 1 << (bit % 8);
        match cipher.decrypt(&tampered) {
            Ok(plaintext) => assert_ne!(plaintext, message, "bit {} went unnoticed", bit),
            Err(SteglockError::PaddingValidationFailure) => {}
            Err(other) => panic!("bit {} gave {:?}", bit, other),
        }
    }
}

#[test]
fn test_bit_flip_in_final_block_is_detected() {
    // Corrupting the last ciphertext block scrambles the padding block. A
    // scrambled block looks like valid padding roughly once in 256, so allow
    // a small number of false accepts out of 128 flips.
    let cipher = cipher(16, 3);
    let blob = cipher.encrypt(b"short note").unwrap();
    let last_block = blob.len() - BLOCK_LEN;

    let mut rejected = 0;
    for bit in 0..BLOCK_LEN * 8 {
        let mut tampered = blob.clone();
        tampered[last_block + bit / 8] ^= 1 << (bit % 8);
        if matches!(
            cipher.decrypt(&tampered),
            Err(SteglockError::PaddingValidationFailure)
        ) {
            rejected += 1;
        }
    }
    assert!(rejected >= 120, "only {} of 128 flips rejected", rejected);
}

#[test]
fn test_wrong_key_is_rejected_by_padding() {
    let right = cipher(32, 1);
    let wrong = cipher(32, 2);

    let mut rejected = 0;
    for _ in 0..64 {
        let blob = right.encrypt(b"for your eyes only").unwrap();
        match wrong.decrypt(&blob) {
            Err(SteglockError::PaddingValidationFailure) => rejected += 1,
            Ok(garbage) => assert_ne!(garbage, b"for your eyes only"),
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }
    assert!(rejected >= 56, "only {} of 64 wrong-key attempts rejected", rejected);
}
