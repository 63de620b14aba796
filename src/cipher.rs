//! The cipher primitive wrapped by [`crate::Crypter`]

use crate::error::CipherResult;

/// Symmetric string-to-string cipher keyed by a passphrase.
///
/// Ciphertext must be text safe (the default implementation emits base64).
/// Implementations report every failure as a [`crate::CipherError`]; it is the
/// caller's decision whether to keep the cause or collapse it.
pub trait Cipher: Send + Sync {
    /// Encrypt `plaintext` under `key`.
    fn encrypt(&self, plaintext: &str, key: &str) -> CipherResult<String>;

    /// Decrypt `ciphertext` under `key`.
    ///
    /// Fails on malformed input as well as on a wrong key.
    fn decrypt(&self, ciphertext: &str, key: &str) -> CipherResult<String>;

    /// Algorithm name, used in log events.
    fn algorithm(&self) -> &'static str;
}
