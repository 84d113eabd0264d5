//! Signing algorithm and curve validation.
//!
//! This module maps JOSE algorithm names (RFC 7518) onto the key families the
//! store can generate, and validates the curve requested for EdDSA keys
//! (RFC 8037).
//!
//! # Security
//!
//! Only asymmetric algorithms are accepted. Symmetric algorithms and `none`
//! are rejected with a dedicated reason, before the supported list is
//! consulted.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{KeyStoreError, KeyStoreResult};

/// Algorithm names that are never accepted for key generation.
///
/// - `none`: unsigned tokens
/// - `HS256`, `HS384`, `HS512`: symmetric algorithms with no key pair
pub const FORBIDDEN_ALGORITHMS: &[&str] = &["none", "HS256", "HS384", "HS512"];

/// Algorithm names accepted by [`KeyStore::generate`](crate::KeyStore::generate).
pub const SUPPORTED_ALGORITHMS: &[&str] = &[
    "RS256", "RS384", "RS512", "PS256", "PS384", "PS512", "ES256", "ES384", "ES512", "EdDSA",
];

/// Curve names accepted for `EdDSA` keys.
pub const SUPPORTED_CURVES: &[&str] = &["Ed25519", "Ed448"];

/// JWK key type family (`kty`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyType {
    /// RSA keys (`RS*`, `PS*`).
    #[serde(rename = "RSA")]
    Rsa,
    /// Elliptic curve keys over NIST curves (`ES*`).
    #[serde(rename = "EC")]
    Ec,
    /// Octet key pairs (`EdDSA`).
    #[serde(rename = "OKP")]
    Okp,
}

impl KeyType {
    /// Returns the `kty` string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rsa => "RSA",
            Self::Ec => "EC",
            Self::Okp => "OKP",
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Asymmetric signing algorithms the store can generate keys for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SigningAlgorithm {
    /// RSASSA-PKCS1-v1_5 using SHA-256.
    Rs256,
    /// RSASSA-PKCS1-v1_5 using SHA-384.
    Rs384,
    /// RSASSA-PKCS1-v1_5 using SHA-512.
    Rs512,
    /// RSASSA-PSS using SHA-256.
    Ps256,
    /// RSASSA-PSS using SHA-384.
    Ps384,
    /// RSASSA-PSS using SHA-512.
    Ps512,
    /// ECDSA using P-256 and SHA-256.
    Es256,
    /// ECDSA using P-384 and SHA-384.
    Es384,
    /// ECDSA using P-521 and SHA-512.
    Es512,
    /// Edwards-curve signatures (Ed25519 or Ed448).
    EdDsa,
}

impl SigningAlgorithm {
    /// Returns the JOSE algorithm name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rs256 => "RS256",
            Self::Rs384 => "RS384",
            Self::Rs512 => "RS512",
            Self::Ps256 => "PS256",
            Self::Ps384 => "PS384",
            Self::Ps512 => "PS512",
            Self::Es256 => "ES256",
            Self::Es384 => "ES384",
            Self::Es512 => "ES512",
            Self::EdDsa => "EdDSA",
        }
    }

    /// Returns the key type family this algorithm signs with.
    #[must_use]
    pub fn key_type(self) -> KeyType {
        match self {
            Self::Rs256 | Self::Rs384 | Self::Rs512 | Self::Ps256 | Self::Ps384 | Self::Ps512 => {
                KeyType::Rsa
            },
            Self::Es256 | Self::Es384 | Self::Es512 => KeyType::Ec,
            Self::EdDsa => KeyType::Okp,
        }
    }
}

impl fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SigningAlgorithm {
    type Err = KeyStoreError;

    fn from_str(alg: &str) -> KeyStoreResult<Self> {
        validate_algorithm(alg)
    }
}

/// Edwards curves supported for `EdDSA` keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OkpCurve {
    /// Ed25519 (RFC 8032 §5.1).
    #[default]
    Ed25519,
    /// Ed448 (RFC 8032 §5.2).
    Ed448,
}

impl OkpCurve {
    /// Returns the JWK `crv` name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ed25519 => "Ed25519",
            Self::Ed448 => "Ed448",
        }
    }
}

impl fmt::Display for OkpCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OkpCurve {
    type Err = KeyStoreError;

    fn from_str(crv: &str) -> KeyStoreResult<Self> {
        validate_curve(crv)
    }
}

/// Validates a JOSE algorithm name for key generation.
///
/// Matching is case-sensitive, as JOSE algorithm names are.
///
/// # Errors
///
/// Returns [`KeyStoreError::UnsupportedAlgorithm`] if:
/// - the algorithm is symmetric or `none` (see [`FORBIDDEN_ALGORITHMS`])
/// - the algorithm is not in [`SUPPORTED_ALGORITHMS`]
///
/// # Examples
///
/// ```
/// use inferadb_common_keystore::{SigningAlgorithm, validate_algorithm};
///
/// assert_eq!(validate_algorithm("ES256").unwrap(), SigningAlgorithm::Es256);
/// assert!(validate_algorithm("HS256").is_err());
/// assert!(validate_algorithm("dunno").is_err());
/// ```
pub fn validate_algorithm(alg: &str) -> KeyStoreResult<SigningAlgorithm> {
    if FORBIDDEN_ALGORITHMS.contains(&alg) {
        return Err(KeyStoreError::unsupported_algorithm(
            alg,
            "not allowed for security reasons",
        ));
    }

    let parsed = match alg {
        "RS256" => SigningAlgorithm::Rs256,
        "RS384" => SigningAlgorithm::Rs384,
        "RS512" => SigningAlgorithm::Rs512,
        "PS256" => SigningAlgorithm::Ps256,
        "PS384" => SigningAlgorithm::Ps384,
        "PS512" => SigningAlgorithm::Ps512,
        "ES256" => SigningAlgorithm::Es256,
        "ES384" => SigningAlgorithm::Es384,
        "ES512" => SigningAlgorithm::Es512,
        "EdDSA" => SigningAlgorithm::EdDsa,
        _ => {
            return Err(KeyStoreError::unsupported_algorithm(
                alg,
                "not a supported asymmetric signing algorithm",
            ));
        },
    };

    Ok(parsed)
}

/// Validates a curve name for an `EdDSA` key.
///
/// Curve names that are valid JWK `crv` values but not signing curves
/// (`X25519`, `X448`) are rejected like any other unknown name.
///
/// # Errors
///
/// Returns [`KeyStoreError::UnsupportedCurve`] if `crv` is not in
/// [`SUPPORTED_CURVES`].
pub fn validate_curve(crv: &str) -> KeyStoreResult<OkpCurve> {
    match crv {
        "Ed25519" => Ok(OkpCurve::Ed25519),
        "Ed448" => Ok(OkpCurve::Ed448),
        _ => Err(KeyStoreError::unsupported_curve(crv)),
    }
}
