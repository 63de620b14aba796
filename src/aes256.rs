//! Encryption/decryption using OpenSSL-compatible AES-256-CBC
//!
//! This module implements the passphrase-based format of `openssl enc
//! -aes-256-cbc -md md5 -a`:
//! - `EVP_BytesToKey` (MD5, one iteration) derives key and IV from the
//!   passphrase and a random 8-byte salt
//! - AES-256 in CBC mode with PKCS#7 padding encrypts the plaintext
//! - the result is armored as base64 of `"Salted__" || salt || ciphertext`
//!   (see [`crate::armor`])

use crate::armor;
use crate::cipher::Cipher;
use crate::error::{CipherError, CipherResult, ErrorCategory, ErrorKind};
use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use aes::{Aes256Dec, Aes256Enc, Block};
use md5::{Digest, Md5};
use rand::RngCore;
use rand::rngs::OsRng;
use zeroize::Zeroizing;

/// Length of salt in bytes
pub const SALT_LEN: usize = armor::SALT_LEN;

/// Length of derived AES key in bytes
pub const KEY_LEN: usize = 32;

/// Length of derived IV in bytes
pub const IV_LEN: usize = 16;

/// AES block size in bytes
pub const BLOCK_LEN: usize = 16;

/// Default [`Cipher`] implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Aes256;

impl Aes256 {
    pub fn new() -> Self {
        Self
    }

    /// Encrypt with a caller-provided salt. See [`encrypt_with_salt`].
    pub fn encrypt_with_salt(
        &self,
        plaintext: &str,
        key: &str,
        salt: &[u8; SALT_LEN],
    ) -> CipherResult<String> {
        encrypt_with_salt(plaintext, key, salt)
    }
}

impl Cipher for Aes256 {
    fn encrypt(&self, plaintext: &str, key: &str) -> CipherResult<String> {
        encrypt(plaintext, key)
    }

    fn decrypt(&self, ciphertext: &str, key: &str) -> CipherResult<String> {
        decrypt(ciphertext, key)
    }

    fn algorithm(&self) -> &'static str {
        "aes-256-cbc"
    }
}

/// Derive key and IV from a passphrase and salt (`EVP_BytesToKey`, MD5, count 1)
///
/// Returns `key(32) || iv(16)`.
fn derive_key(passphrase: &[u8], salt: &[u8; SALT_LEN]) -> Zeroizing<[u8; KEY_LEN + IV_LEN]> {
    let mut material = Zeroizing::new([0u8; KEY_LEN + IV_LEN]);
    let mut digest = Zeroizing::new(Vec::with_capacity(16));

    // D_i = MD5(D_{i-1} || passphrase || salt), concatenated until 48 bytes.
    for chunk in material.chunks_mut(16) {
        let mut hasher = Md5::new();
        hasher.update(digest.as_slice());
        hasher.update(passphrase);
        hasher.update(salt);
        digest.clear();
        digest.extend_from_slice(&hasher.finalize());
        chunk.copy_from_slice(&digest[..chunk.len()]);
    }

    material
}

/// Encrypt plaintext with a passphrase using a random salt
///
/// Returns the armored ciphertext.
pub fn encrypt(plaintext: &str, key: &str) -> CipherResult<String> {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);

    encrypt_with_salt(plaintext, key, &salt)
}

/// Encrypt plaintext with a passphrase using the provided salt
///
/// This function is ONLY for generating deterministic output in tests.
/// NEVER use this in production - always use `encrypt()` which generates a random salt.
pub fn encrypt_with_salt(plaintext: &str, key: &str, salt: &[u8; SALT_LEN]) -> CipherResult<String> {
    let body = seal(key.as_bytes(), plaintext.as_bytes(), salt)?;
    Ok(armor::wrap(salt, &body))
}

/// Decrypt armored ciphertext with a passphrase
pub fn decrypt(ciphertext: &str, key: &str) -> CipherResult<String> {
    let armored = armor::unwrap(ciphertext).map_err(|e| e.with_context("failed to unarmor"))?;
    let plaintext = open(key.as_bytes(), &armored.body, &armored.salt)?;

    String::from_utf8(plaintext).map_err(|e| {
        CipherError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::InvalidUtf8,
            "decrypted data is not valid UTF-8",
            e,
        )
    })
}

fn seal(passphrase: &[u8], plaintext: &[u8], salt: &[u8; SALT_LEN]) -> CipherResult<Vec<u8>> {
    let material = derive_key(passphrase, salt);
    let (key, iv) = material.split_at(KEY_LEN);
    let cipher = Aes256Enc::new_from_slice(key).map_err(|e| {
        CipherError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::InternalInvariant,
            "derived key has wrong length",
            e,
        )
    })?;

    // PKCS#7: always pad, a full block when already aligned.
    let pad = BLOCK_LEN - plaintext.len() % BLOCK_LEN;
    let mut output = Vec::with_capacity(plaintext.len() + pad);
    output.extend_from_slice(plaintext);
    output.resize(plaintext.len() + pad, pad as u8);

    let mut prev = [0u8; BLOCK_LEN];
    prev.copy_from_slice(iv);
    for chunk in output.chunks_exact_mut(BLOCK_LEN) {
        xor_in_place(chunk, &prev);
        cipher.encrypt_block(Block::from_mut_slice(chunk));
        prev.copy_from_slice(chunk);
    }

    Ok(output)
}

fn open(passphrase: &[u8], body: &[u8], salt: &[u8; SALT_LEN]) -> CipherResult<Vec<u8>> {
    if body.is_empty() {
        return Err(CipherError::with_kind(
            ErrorCategory::User,
            ErrorKind::TruncatedInput,
            "input likely truncated; no cipher blocks after salt",
        ));
    }
    if body.len() % BLOCK_LEN != 0 {
        return Err(CipherError::with_kind(
            ErrorCategory::User,
            ErrorKind::BinaryFormat,
            format!(
                "cipher body length {} is not a multiple of {}",
                body.len(),
                BLOCK_LEN
            ),
        ));
    }

    let material = derive_key(passphrase, salt);
    let (key, iv) = material.split_at(KEY_LEN);
    let cipher = Aes256Dec::new_from_slice(key).map_err(|e| {
        CipherError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::InternalInvariant,
            "derived key has wrong length",
            e,
        )
    })?;

    let mut output = body.to_vec();
    let mut prev = [0u8; BLOCK_LEN];
    prev.copy_from_slice(iv);
    for chunk in output.chunks_exact_mut(BLOCK_LEN) {
        let mut current = [0u8; BLOCK_LEN];
        current.copy_from_slice(chunk);
        cipher.decrypt_block(Block::from_mut_slice(chunk));
        xor_in_place(chunk, &prev);
        prev = current;
    }

    let unpadded_len = padded_len(&output)?;
    output.truncate(unpadded_len);
    Ok(output)
}

/// Validates PKCS#7 padding and returns the length of the data before it.
fn padded_len(data: &[u8]) -> CipherResult<usize> {
    let bad_padding = || {
        CipherError::with_kind(
            ErrorCategory::User,
            ErrorKind::BadPadding,
            "invalid padding; wrong key or corrupt ciphertext",
        )
    };

    let pad = *data.last().ok_or_else(bad_padding)? as usize;
    if pad == 0 || pad > BLOCK_LEN || pad > data.len() {
        return Err(bad_padding());
    }
    let (content, padding) = data.split_at(data.len() - pad);
    if padding.iter().any(|&b| b as usize != pad) {
        return Err(bad_padding());
    }
    Ok(content.len())
}

fn xor_in_place(block: &mut [u8], other: &[u8; BLOCK_LEN]) {
    for (b, o) in block.iter_mut().zip(other) {
        *b ^= o;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = "U2FsdGVkX1920feeCwXEREEB8CQvZnqvkIR9ePjLtyY=";

    #[test]
    fn test_decrypt_fixture() {
        assert_eq!(decrypt(FIXTURE, "myKey").unwrap(), "Some data");
    }

    #[test]
    fn test_decrypt_fixture_wrong_key() {
        let err = decrypt(FIXTURE, "wrongKey").expect_err("expected padding failure");
        assert_eq!(err.kind, Some(ErrorKind::BadPadding));
        assert_eq!(err.category, ErrorCategory::User);
    }

    #[test]
    fn test_derive_key_matches_openssl() {
        // openssl enc -aes-256-cbc -md md5 -k myKey -S 0102030405060708 -P
        let material = derive_key(b"myKey", &[1, 2, 3, 4, 5, 6, 7, 8]);
        #[rustfmt::skip]
        let expected: [u8; KEY_LEN + IV_LEN] = [
            0x3b, 0x9b, 0x8e, 0xd7, 0x76, 0x1a, 0x7a, 0xe2,
            0xf3, 0x08, 0xa6, 0xab, 0x0e, 0x99, 0xb6, 0x65,
            0x40, 0x70, 0x9b, 0xdc, 0x67, 0xac, 0x6d, 0xb0,
            0xd9, 0xa8, 0xba, 0x7f, 0x4f, 0x26, 0xa5, 0x1d,
            0x99, 0x86, 0x6d, 0x30, 0x8d, 0x2b, 0x1d, 0x52,
            0xa5, 0x82, 0x3f, 0x7b, 0xdc, 0xf8, 0x86, 0xf6,
        ];
        assert_eq!(*material, expected);
    }

    #[test]
    fn test_cross_implementation_compatibility() {
        let salt = [1, 2, 3, 4, 5, 6, 7, 8];
        let ciphertext = encrypt_with_salt("Some data", "myKey", &salt).unwrap();

        // printf 'Some data' | openssl enc -aes-256-cbc -md md5 -a -k myKey -S 0102030405060708
        // with the "Salted__" header restored.
        assert_eq!(ciphertext, "U2FsdGVkX18BAgMEBQYHCGP+1kNKQf5AgyGQypTjk+A=");
        assert_eq!(decrypt(&ciphertext, "myKey").unwrap(), "Some data");
    }

    #[test]
    fn test_decrypt_line_wrapped_openssl_output() {
        // printf 'x%.0s' {1..100} | openssl enc -aes-256-cbc -md md5 -a -k myKey
        //     -S 0f0e0d0c0b0a0908, with the "Salted__" header restored and
        // wrapped at 64 columns as openssl writes it.
        let ciphertext = "U2FsdGVkX18PDg0MCwoJCEz4XKU//uBHuytCbKvo0QbTtr1oqaSO2Xl5hRm9TD6X\n\
                          GonAhXhcRYuOp5yxsCGPu7+ft+sTiCKYPS8ZyuDO7aWZeBNU9uwdrEoKbKEMm1u2\n\
                          AdQjjiUIJEu1aMUtLSxfzWI3WSmPDuSMAT9saQslXUk=\n";
        assert_eq!(decrypt(ciphertext, "myKey").unwrap(), "x".repeat(100));
    }

    #[test]
    fn test_roundtrip_line_wrapped() {
        let plaintext = "x".repeat(100);
        let ciphertext = encrypt(&plaintext, "myKey").unwrap();
        let wrapped = ciphertext
            .as_bytes()
            .chunks(64)
            .map(|line| std::str::from_utf8(line).unwrap())
            .collect::<Vec<_>>()
            .join("\n");
        assert!(wrapped.lines().count() > 1);
        assert_eq!(decrypt(&wrapped, "myKey").unwrap(), plaintext);
    }

    #[test]
    fn test_roundtrip() {
        let ciphertext = encrypt("hello, world", "test").unwrap();
        assert_eq!(decrypt(&ciphertext, "test").unwrap(), "hello, world");
    }

    #[test]
    fn test_empty_plaintext() {
        let ciphertext = encrypt("", "test").unwrap();
        let armored = armor::unwrap(&ciphertext).unwrap();
        assert_eq!(armored.body.len(), BLOCK_LEN);
        assert_eq!(decrypt(&ciphertext, "test").unwrap(), "");
    }

    #[test]
    fn test_block_aligned_plaintext_gets_full_padding_block() {
        let ciphertext = encrypt("exactly 16 bytes", "test").unwrap();
        let armored = armor::unwrap(&ciphertext).unwrap();
        assert_eq!(armored.body.len(), 2 * BLOCK_LEN);
    }

    #[test]
    fn test_random_salt() {
        let first = encrypt("same", "key").unwrap();
        let second = encrypt("same", "key").unwrap();
        assert_ne!(first, second);
        assert_eq!(decrypt(&first, "key").unwrap(), "same");
        assert_eq!(decrypt(&second, "key").unwrap(), "same");
    }

    #[test]
    fn test_large_plaintext() {
        let plaintext = "x".repeat(128 * 1024);
        let ciphertext = encrypt(&plaintext, "test").unwrap();
        assert_eq!(decrypt(&ciphertext, "test").unwrap(), plaintext);
    }

    #[test]
    fn test_truncated_body() {
        let ciphertext = armor::wrap(&[0u8; SALT_LEN], b"");
        let err = decrypt(&ciphertext, "test").expect_err("expected truncation error");
        assert_eq!(err.kind, Some(ErrorKind::TruncatedInput));
    }

    #[test]
    fn test_body_not_block_multiple() {
        let ciphertext = armor::wrap(&[0u8; SALT_LEN], &[0u8; BLOCK_LEN + 3]);
        let err = decrypt(&ciphertext, "test").expect_err("expected format error");
        assert_eq!(err.kind, Some(ErrorKind::BinaryFormat));
    }

    #[test]
    fn test_not_ciphertext() {
        let err = decrypt("plain old text!", "test").expect_err("expected armor error");
        assert_eq!(err.kind, Some(ErrorKind::ArmoringDecode));
        assert_eq!(err.message(), "failed to unarmor");
    }

    #[test]
    fn test_invalid_utf8_plaintext() {
        let salt = [9u8; SALT_LEN];
        let body = seal(b"test", &[0xff, 0xfe, 0xfd], &salt).unwrap();
        let err = decrypt(&armor::wrap(&salt, &body), "test").expect_err("expected utf-8 error");
        assert_eq!(err.kind, Some(ErrorKind::InvalidUtf8));
    }

    #[test]
    fn test_padded_len() {
        let mut block = [b'a'; BLOCK_LEN];
        block[13..].fill(3);
        assert_eq!(padded_len(&block).unwrap(), 13);

        block[13] = 2;
        assert!(padded_len(&block).is_err());

        assert!(padded_len(&[0u8; BLOCK_LEN]).is_err());
        assert!(padded_len(&[17u8; BLOCK_LEN]).is_err());
    }
}
