//! OpenSSL `enc` style armoring
//!
//! The armored format is standard base64 (with padding) of
//! `"Salted__" || salt(8) || ciphertext`. It is what `openssl enc -a -salt`
//! produces and what the ciphertext fixtures in the tests are written in.

use crate::error::{CipherError, CipherResult, ErrorCategory, ErrorKind};
use base64::{Engine, engine::general_purpose::STANDARD};

/// Magic prefix of every armored payload
pub const MAGIC: &[u8; 8] = b"Salted__";

/// Length of the salt following the magic prefix
pub const SALT_LEN: usize = 8;

/// Decoded armor: the salt and the raw cipher body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Armored {
    pub salt: [u8; SALT_LEN],
    pub body: Vec<u8>,
}

/// Wrap a salt and cipher body, returning the armored string
pub fn wrap(salt: &[u8; SALT_LEN], body: &[u8]) -> String {
    let mut raw = Vec::with_capacity(MAGIC.len() + SALT_LEN + body.len());
    raw.extend_from_slice(MAGIC);
    raw.extend_from_slice(salt);
    raw.extend_from_slice(body);
    STANDARD.encode(raw)
}

/// Unwrap an armored string into salt and cipher body.
///
/// Whitespace anywhere in the input is ignored, so ciphertext with a final
/// newline or wrapped at 64 columns (as `openssl enc -a` writes it) still
/// unwraps.
pub fn unwrap(armored: &str) -> CipherResult<Armored> {
    let compact: String = armored
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let raw = STANDARD.decode(compact).map_err(|e| {
        CipherError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::ArmoringDecode,
            format!("base64 decoding failed: {}", e),
            e,
        )
    })?;

    let Some(rest) = raw.strip_prefix(MAGIC.as_slice()) else {
        return Err(CipherError::with_kind(
            ErrorCategory::User,
            ErrorKind::ArmoringInvalid,
            "input unrecognized as salted ciphertext",
        ));
    };

    if rest.len() < SALT_LEN {
        return Err(CipherError::with_kind(
            ErrorCategory::User,
            ErrorKind::TruncatedInput,
            "input likely truncated while reading salt",
        ));
    }
    let (salt, body) = rest.split_at(SALT_LEN);
    let salt: [u8; SALT_LEN] = salt.try_into().map_err(|_| {
        CipherError::with_kind(
            ErrorCategory::Internal,
            ErrorKind::InternalInvariant,
            "salt slice has unexpected length",
        )
    })?;

    Ok(Armored {
        salt,
        body: body.to_vec(),
    })
}
