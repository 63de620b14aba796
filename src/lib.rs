//! aeslib - string and file AES-256 encryption with deferred writes
//!
//! Encryption and decryption results are returned as `Option`s: a cipher
//! failure (wrong key, corrupt ciphertext) is `None`. File output is never
//! written eagerly; the caller receives a [`WriteEffect`] and decides when to
//! [`perform`](WriteEffect::perform) it. File system failures are reported
//! separately as [`FileSystemError`].

#![forbid(unsafe_code)]

pub mod aes256;
pub mod armor;
pub mod cipher;
pub mod effect;
pub mod error;
pub mod file_ops;
pub mod fs;
pub mod path;

pub use aes256::Aes256;
pub use cipher::Cipher;
pub use effect::{Notification, WriteEffect};
pub use error::{CipherError, FileSystemError};
pub use file_ops::{
    Crypter, Mode, NotificationSink, decrypt_to_effect, decrypt_to_text, encrypt_to_effect, encrypt_to_text,
    process_file,
};
pub use fs::{FileSystem, StdFileSystem};
pub use path::OutputTarget;
