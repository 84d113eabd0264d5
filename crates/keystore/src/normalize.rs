//! Key identifier generation and metadata normalization.
//!
//! Every key entering the store passes through [`normalize`], which assigns
//! the `kid` and `alg` members the store's invariants require.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand_core::{OsRng, RngCore};

use crate::{
    error::{KeyStoreError, KeyStoreResult},
    jwk::{Jwk, RawJwk},
};

/// Minimum number of random bytes in a generated `kid` (160 bits).
pub const MIN_KID_LENGTH: usize = 20;

/// Generates a random key identifier from `len` bytes of OS randomness.
///
/// The bytes are encoded as base64url without padding, so the identifier
/// only contains `[A-Za-z0-9_-]`. Lengths below [`MIN_KID_LENGTH`] are
/// raised to it.
///
/// # Examples
///
/// ```
/// use inferadb_common_keystore::normalize::generate_kid;
///
/// let kid = generate_kid(32);
/// assert_eq!(kid.len(), 43);
/// assert!(kid.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
/// ```
#[must_use]
pub fn generate_kid(len: usize) -> String {
    let mut bytes = vec![0u8; len.max(MIN_KID_LENGTH)];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Normalizes a key for insertion into the store.
///
/// - `kid`: `kid_override` if given, else the key's own `kid`, else a fresh [`generate_kid`]
///   identifier. Empty strings count as absent.
/// - `alg`: the key's own `alg`, else `alg_hint`.
///
/// The input is consumed; callers that must not observe changes pass a
/// clone.
///
/// # Errors
///
/// Returns [`KeyStoreError::MissingAlgorithm`] if the key has no `alg` and
/// no hint is available.
pub fn normalize(
    raw: RawJwk,
    kid_override: Option<&str>,
    alg_hint: Option<&str>,
    kid_length: usize,
) -> KeyStoreResult<Jwk> {
    let RawJwk { kid, params, alg, key_use } = raw;

    let kid = kid_override
        .filter(|kid| !kid.is_empty())
        .map(str::to_owned)
        .or_else(|| kid.filter(|kid| !kid.is_empty()));

    let alg = alg
        .filter(|alg| !alg.is_empty())
        .or_else(|| alg_hint.filter(|alg| !alg.is_empty()).map(str::to_owned))
        .ok_or_else(|| KeyStoreError::missing_algorithm(kid.as_deref()))?;

    let kid = kid.unwrap_or_else(|| generate_kid(kid_length));

    Ok(Jwk::from_parts(kid, alg, key_use, params))
}
