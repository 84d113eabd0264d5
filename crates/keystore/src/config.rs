//! Key store configuration.
//!
//! [`KeyStoreConfig`] controls key generation parameters. It can be built
//! in code through its validating builder or deserialized from a host
//! service's configuration file.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    algorithm::OkpCurve,
    error::{KeyStoreError, KeyStoreResult},
    normalize::MIN_KID_LENGTH,
};

/// Default RSA modulus size in bits.
pub const DEFAULT_RSA_MODULUS_BITS: usize = 2048;

/// Smallest accepted RSA modulus size in bits.
pub const MIN_RSA_MODULUS_BITS: usize = 2048;

/// Largest accepted RSA modulus size in bits.
pub const MAX_RSA_MODULUS_BITS: usize = 8192;

/// Default number of random bytes in a generated `kid`.
pub const DEFAULT_KID_LENGTH: usize = 32;

/// Largest accepted `kid` length in bytes.
pub const MAX_KID_LENGTH: usize = 256;

/// Default limit for one asynchronous key generation (30 seconds).
pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for [`KeyStore`](crate::KeyStore) and
/// [`SharedKeyStore`](crate::SharedKeyStore).
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use inferadb_common_keystore::{KeyStoreConfig, OkpCurve};
///
/// let config = KeyStoreConfig::builder()
///     .rsa_modulus_bits(3072)
///     .default_curve(OkpCurve::Ed448)
///     .generation_timeout(Duration::from_secs(10))
///     .build()?;
///
/// assert_eq!(config.rsa_modulus_bits(), 3072);
/// # Ok::<(), inferadb_common_keystore::KeyStoreError>(())
/// ```
///
/// Deserialized configurations are checked when handed to
/// [`KeyStore::with_config`](crate::KeyStore::with_config):
///
/// ```
/// use inferadb_common_keystore::KeyStoreConfig;
///
/// let config: KeyStoreConfig =
///     serde_json::from_str(r#"{ "kid_length": 24, "generation_timeout": "5s" }"#)?;
/// assert!(config.validate().is_ok());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeyStoreConfig {
    /// RSA modulus size for `RS*` and `PS*` keys.
    #[serde(default = "default_rsa_modulus_bits")]
    pub(crate) rsa_modulus_bits: usize,

    /// Random bytes drawn for a generated `kid`.
    #[serde(default = "default_kid_length")]
    pub(crate) kid_length: usize,

    /// Curve used for `EdDSA` when the caller names none.
    #[serde(default)]
    pub(crate) default_curve: OkpCurve,

    /// Limit for one asynchronous key generation.
    #[serde(with = "humantime_serde", default = "default_generation_timeout")]
    pub(crate) generation_timeout: Duration,
}

fn default_rsa_modulus_bits() -> usize {
    DEFAULT_RSA_MODULUS_BITS
}

fn default_kid_length() -> usize {
    DEFAULT_KID_LENGTH
}

fn default_generation_timeout() -> Duration {
    DEFAULT_GENERATION_TIMEOUT
}

impl Default for KeyStoreConfig {
    fn default() -> Self {
        Self {
            rsa_modulus_bits: DEFAULT_RSA_MODULUS_BITS,
            kid_length: DEFAULT_KID_LENGTH,
            default_curve: OkpCurve::default(),
            generation_timeout: DEFAULT_GENERATION_TIMEOUT,
        }
    }
}

#[bon::bon]
impl KeyStoreConfig {
    /// Creates a new configuration, validating every field.
    ///
    /// # Optional Fields
    ///
    /// * `rsa_modulus_bits` - RSA modulus size (default: 2048).
    /// * `kid_length` - Random bytes per generated `kid` (default: 32).
    /// * `default_curve` - EdDSA curve when none is requested (default: Ed25519).
    /// * `generation_timeout` - Limit for asynchronous generation (default: 30 seconds).
    ///
    /// # Errors
    ///
    /// Returns [`KeyStoreError::Config`] if any field fails
    /// [`validate`](Self::validate).
    #[builder]
    pub fn new(
        #[builder(default = DEFAULT_RSA_MODULUS_BITS)] rsa_modulus_bits: usize,
        #[builder(default = DEFAULT_KID_LENGTH)] kid_length: usize,
        #[builder(default)] default_curve: OkpCurve,
        #[builder(default = DEFAULT_GENERATION_TIMEOUT)] generation_timeout: Duration,
    ) -> KeyStoreResult<Self> {
        let config = Self { rsa_modulus_bits, kid_length, default_curve, generation_timeout };
        config.validate()?;
        Ok(config)
    }

    /// Checks every field against its accepted range.
    ///
    /// # Errors
    ///
    /// Returns [`KeyStoreError::Config`] if:
    /// - `rsa_modulus_bits` is outside 2048..=8192 or not a multiple of 8
    /// - `kid_length` is below 20 bytes (160 bits) or above 256 bytes
    /// - `generation_timeout` is zero
    pub fn validate(&self) -> KeyStoreResult<()> {
        if !(MIN_RSA_MODULUS_BITS..=MAX_RSA_MODULUS_BITS).contains(&self.rsa_modulus_bits) {
            return Err(KeyStoreError::config(format!(
                "rsa_modulus_bits must be between {MIN_RSA_MODULUS_BITS} and {MAX_RSA_MODULUS_BITS}, got {}",
                self.rsa_modulus_bits
            )));
        }

        if self.rsa_modulus_bits % 8 != 0 {
            return Err(KeyStoreError::config(format!(
                "rsa_modulus_bits must be a multiple of 8, got {}",
                self.rsa_modulus_bits
            )));
        }

        if !(MIN_KID_LENGTH..=MAX_KID_LENGTH).contains(&self.kid_length) {
            return Err(KeyStoreError::config(format!(
                "kid_length must be between {MIN_KID_LENGTH} and {MAX_KID_LENGTH} bytes, got {}",
                self.kid_length
            )));
        }

        if self.generation_timeout.is_zero() {
            return Err(KeyStoreError::config("generation_timeout must be greater than zero"));
        }

        Ok(())
    }

    /// Returns the RSA modulus size in bits.
    #[must_use]
    pub fn rsa_modulus_bits(&self) -> usize {
        self.rsa_modulus_bits
    }

    /// Returns the number of random bytes in a generated `kid`.
    #[must_use]
    pub fn kid_length(&self) -> usize {
        self.kid_length
    }

    /// Returns the default `EdDSA` curve.
    #[must_use]
    pub fn default_curve(&self) -> OkpCurve {
        self.default_curve
    }

    /// Returns the asynchronous generation limit.
    #[must_use]
    pub fn generation_timeout(&self) -> Duration {
        self.generation_timeout
    }
}
