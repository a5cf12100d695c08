//! Integration tests for the CredVault encryption engine.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use credvault::crypto::EncryptionEngine;
use credvault::errors::CredVaultError;

// ---------------------------------------------------------------------------
// Round-trip
// ---------------------------------------------------------------------------

#[test]
fn encrypt_decrypt_roundtrip() {
    let engine = EncryptionEngine::new("operator passphrase");
    let plaintext = "correct horse battery staple";

    let blob = engine.encrypt(plaintext).expect("encrypt should succeed");
    assert_ne!(blob, plaintext);

    let recovered = engine.decrypt(&blob).expect("decrypt should succeed");
    assert_eq!(recovered, plaintext);
}

#[test]
fn roundtrip_handles_unicode_and_empty_strings() {
    let engine = EncryptionEngine::new("k");
    for plaintext in ["", "päßwörd ✓", "line\nbreaks\tand tabs"] {
        let blob = engine.encrypt(plaintext).unwrap();
        assert_eq!(engine.decrypt(&blob).unwrap(), plaintext);
    }
}

#[test]
fn encrypt_produces_different_ciphertext_each_time() {
    let engine = EncryptionEngine::new("k");
    let a = engine.encrypt("SECRET=hello").unwrap();
    let b = engine.encrypt("SECRET=hello").unwrap();

    // Fresh nonce per call, so the blobs must differ.
    assert_ne!(a, b, "two encryptions of the same plaintext must differ");
    assert_eq!(engine.decrypt(&a).unwrap(), "SECRET=hello");
    assert_eq!(engine.decrypt(&b).unwrap(), "SECRET=hello");
}

// ---------------------------------------------------------------------------
// Tamper detection
// ---------------------------------------------------------------------------

#[test]
fn flipping_any_byte_fails_decryption() {
    let engine = EncryptionEngine::new("k");
    let blob = engine.encrypt("s3cr3t").unwrap();
    let raw = BASE64.decode(&blob).unwrap();

    for i in 0..raw.len() {
        let mut tampered = raw.clone();
        tampered[i] ^= 0xFF;
        let reencoded = BASE64.encode(&tampered);

        let result = engine.decrypt(&reencoded);
        assert!(
            matches!(result, Err(CredVaultError::CryptoOperationFailed)),
            "byte {i} flipped but decrypt did not fail"
        );
    }
}

#[test]
fn decrypt_with_wrong_key_fails() {
    let engine = EncryptionEngine::new("right");
    let wrong = EncryptionEngine::new("wrong");

    let blob = engine.encrypt("TOP_SECRET=42").unwrap();
    assert!(wrong.decrypt(&blob).is_err());
}

// ---------------------------------------------------------------------------
// Merged failure mode
// ---------------------------------------------------------------------------

#[test]
fn all_decrypt_faults_report_the_same_error() {
    let engine = EncryptionEngine::new("k");
    let tampered = {
        let blob = engine.encrypt("x").unwrap();
        let mut raw = BASE64.decode(blob).unwrap();
        raw[13] ^= 0x01;
        BASE64.encode(raw)
    };

    let cases = [
        "%%% not base64 %%%".to_string(), // malformed encoding
        BASE64.encode([0u8; 5]),          // truncated (shorter than a nonce)
        tampered,                         // auth tag mismatch
    ];

    for blob in cases {
        assert!(
            matches!(
                engine.decrypt(&blob),
                Err(CredVaultError::CryptoOperationFailed)
            ),
            "fault for {blob:?} must be CryptoOperationFailed"
        );
    }
}
