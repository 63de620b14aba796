//! String and file encryption/decryption operations
//!
//! This module provides the high-level operations of the crate. Cipher
//! failures are returned as `None`: the caller learns that it did not work,
//! not why (the cause is emitted as a `debug` tracing event). File system
//! failures are never folded into `None`; they are returned as
//! [`FileSystemError`](crate::FileSystemError).

use crate::aes256::Aes256;
use crate::cipher::Cipher;
use crate::effect::WriteEffect;
use crate::error::FsResult;
use crate::fs::{FileSystem, StdFileSystem};
use crate::path::OutputTarget;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Direction of a file operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Encrypt,
    Decrypt,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Encrypt => f.write_str("encrypted"),
            Mode::Decrypt => f.write_str("decrypted"),
        }
    }
}

/// Receives the "Wrote ... file to: ..." line after an effect is performed.
pub type NotificationSink = Arc<dyn Fn(&str) + Send + Sync>;

/// Entry point for all operations, holding the cipher and file system to use.
///
/// Holds no mutable state; a single `Crypter` can be shared between threads.
#[derive(Clone)]
pub struct Crypter {
    cipher: Arc<dyn Cipher>,
    fs: Arc<dyn FileSystem>,
    sink: NotificationSink,
}

impl Crypter {
    /// AES-256 on the real file system.
    pub fn new() -> Self {
        Self::with_ports(Arc::new(Aes256), Arc::new(StdFileSystem))
    }

    /// Notifications go to a `tracing` info event.
    pub fn with_ports(cipher: Arc<dyn Cipher>, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            cipher,
            fs,
            sink: Arc::new(|message: &str| tracing::info!("{}", message)),
        }
    }

    /// Send post-write notifications of the effects built from now on to `sink`.
    pub fn with_notification_sink(mut self, sink: NotificationSink) -> Self {
        self.sink = sink;
        self
    }

    /// Encrypt `plaintext`, or `None` if the cipher fails.
    pub fn encrypt_to_text(&self, plaintext: &str, key: &str) -> Option<String> {
        self.cipher
            .encrypt(plaintext, key)
            .inspect_err(|e| {
                tracing::debug!(algorithm = self.cipher.algorithm(), error = %e, "encryption failed");
            })
            .ok()
    }

    /// Decrypt `ciphertext`, or `None` if it is malformed or the key is wrong.
    pub fn decrypt_to_text(&self, ciphertext: &str, key: &str) -> Option<String> {
        self.cipher
            .decrypt(ciphertext, key)
            .inspect_err(|e| {
                tracing::debug!(algorithm = self.cipher.algorithm(), error = %e, "decryption failed");
            })
            .ok()
    }

    /// Encrypt `plaintext` into an unperformed write to exactly `output_path`.
    pub fn encrypt_to_effect(
        &self,
        plaintext: &str,
        key: &str,
        output_path: impl Into<PathBuf>,
    ) -> Option<WriteEffect> {
        self.build_effect(Mode::Encrypt, plaintext, key, output_path.into())
    }

    /// Decrypt `ciphertext` into an unperformed write to exactly `output_path`.
    pub fn decrypt_to_effect(
        &self,
        ciphertext: &str,
        key: &str,
        output_path: impl Into<PathBuf>,
    ) -> Option<WriteEffect> {
        self.build_effect(Mode::Decrypt, ciphertext, key, output_path.into())
    }

    /// Read `source` and encrypt or decrypt it into an unperformed write.
    ///
    /// `target` is either a file path or, when the file system's
    /// [`is_directory_path`](FileSystem::is_directory_path) says so, a
    /// directory that receives a file named like `source`. The outer `Result` reports a failure to read
    /// `source`; the inner `Option` is `None` when the cipher fails.
    pub fn process_file(
        &self,
        key: &str,
        mode: Mode,
        source: impl AsRef<Path>,
        target: &str,
    ) -> FsResult<Option<WriteEffect>> {
        let source = source.as_ref();
        let output = if self.fs.is_directory_path(target) {
            OutputTarget::Directory(target)
        } else {
            OutputTarget::File(target)
        };
        let output_path = output.resolve(source);
        let text = self.fs.read_all_text(source)?;

        Ok(self.build_effect(mode, &text, key, output_path))
    }

    fn build_effect(
        &self,
        mode: Mode,
        text: &str,
        key: &str,
        output_path: PathBuf,
    ) -> Option<WriteEffect> {
        let data = match mode {
            Mode::Encrypt => self.encrypt_to_text(text, key)?,
            Mode::Decrypt => self.decrypt_to_text(text, key)?,
        };

        let message = format!("Wrote {} file to: {}", mode, output_path.display());
        let sink = self.sink.clone();
        let effect = WriteEffect::new(data, output_path)
            .with_file_system(self.fs.clone())
            .notify(Arc::new(move || sink(&message)));
        Some(effect)
    }
}

impl Default for Crypter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Crypter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Crypter")
            .field("algorithm", &self.cipher.algorithm())
            .finish_non_exhaustive()
    }
}

/// [`Crypter::encrypt_to_text`] with the default cipher.
pub fn encrypt_to_text(plaintext: &str, key: &str) -> Option<String> {
    Crypter::new().encrypt_to_text(plaintext, key)
}

/// [`Crypter::decrypt_to_text`] with the default cipher.
pub fn decrypt_to_text(ciphertext: &str, key: &str) -> Option<String> {
    Crypter::new().decrypt_to_text(ciphertext, key)
}

/// [`Crypter::encrypt_to_effect`] with the default cipher and file system.
pub fn encrypt_to_effect(
    plaintext: &str,
    key: &str,
    output_path: impl Into<PathBuf>,
) -> Option<WriteEffect> {
    Crypter::new().encrypt_to_effect(plaintext, key, output_path)
}

/// [`Crypter::decrypt_to_effect`] with the default cipher and file system.
pub fn decrypt_to_effect(
    ciphertext: &str,
    key: &str,
    output_path: impl Into<PathBuf>,
) -> Option<WriteEffect> {
    Crypter::new().decrypt_to_effect(ciphertext, key, output_path)
}

/// [`Crypter::process_file`] with the default cipher and file system.
pub fn process_file(
    key: &str,
    mode: Mode,
    source: impl AsRef<Path>,
    target: &str,
) -> FsResult<Option<WriteEffect>> {
    Crypter::new().process_file(key, mode, source, target)
}
