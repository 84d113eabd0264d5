//! Key store error types and result alias.
//!
//! All fallible key store operations return [`KeyStoreResult<T>`]. Lookups
//! never fail: an empty store or an unknown `kid` is reported as `None`, not
//! as an error.
//!
//! # Error Types
//!
//! - [`KeyStoreError::UnsupportedAlgorithm`] - `alg` is not a supported signing algorithm
//! - [`KeyStoreError::UnsupportedCurve`] - `crv` is not a supported EdDSA curve
//! - [`KeyStoreError::MissingAlgorithm`] - an ingested key has no `alg`
//! - [`KeyStoreError::InvalidKey`] - an ingested key cannot be parsed
//! - [`KeyStoreError::KeyGeneration`] - the key pair generator failed
//! - [`KeyStoreError::GenerationTimeout`] - generation exceeded its time limit
//! - [`KeyStoreError::Config`] - invalid store configuration
//!
//! # Example
//!
//! ```
//! use inferadb_common_keystore::{KeyStoreError, KeyStoreResult};
//!
//! fn check(alg: &str) -> KeyStoreResult<()> {
//!     Err(KeyStoreError::unsupported_algorithm(alg, "unrecognized signing algorithm"))
//! }
//!
//! assert!(check("RS123").is_err());
//! ```

use std::{sync::Arc, time::Duration};

use thiserror::Error;

/// A boxed error type for source chain tracking.
pub type BoxError = Arc<dyn std::error::Error + Send + Sync>;

/// Result type alias for key store operations.
pub type KeyStoreResult<T> = Result<T, KeyStoreError>;

/// Errors that can occur while generating or ingesting keys.
///
/// Every variant is a synchronous failure reported to the caller of the
/// operation. Nothing is retried internally, and a failed operation leaves
/// the store unchanged.
///
/// # Non-exhaustive
///
/// This enum is marked `#[non_exhaustive]`: new variants may be added in
/// future minor releases without a semver-breaking change. Downstream match
/// expressions must include a wildcard arm (`_ =>`).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum KeyStoreError {
    /// The requested algorithm is not a supported asymmetric signing algorithm.
    #[error("Unsupported algorithm '{alg}': {reason}")]
    UnsupportedAlgorithm {
        /// The algorithm name as supplied.
        alg: String,
        /// Why the algorithm was rejected.
        reason: &'static str,
    },

    /// The requested curve is not supported for EdDSA.
    #[error("Unsupported curve: {crv}")]
    UnsupportedCurve {
        /// The curve name as supplied.
        crv: String,
    },

    /// An ingested key carries no `alg` and none can be inferred.
    #[error("Key {} has no algorithm (alg) and none can be inferred", kid.as_deref().unwrap_or("<no kid>"))]
    MissingAlgorithm {
        /// The key's `kid`, if the caller supplied one.
        kid: Option<String>,
    },

    /// An ingested key could not be parsed as a JSON Web Key.
    #[error("Invalid key: {message}")]
    InvalidKey {
        /// Description of the parse failure.
        message: String,
        /// The underlying error that caused the failure.
        #[source]
        source: Option<BoxError>,
    },

    /// The key pair generator failed to produce or export a key.
    #[error("Key generation failed: {message}")]
    KeyGeneration {
        /// Description of the generation failure.
        message: String,
        /// The underlying error that caused the failure.
        #[source]
        source: Option<BoxError>,
    },

    /// Key generation did not complete within the configured time limit.
    #[error("Key generation for {alg} timed out after {timeout:?}")]
    GenerationTimeout {
        /// The algorithm being generated.
        alg: String,
        /// The limit that was exceeded.
        timeout: Duration,
    },

    /// The store configuration is invalid.
    #[error("Invalid configuration: {message}")]
    Config {
        /// Description of the configuration problem.
        message: String,
    },
}

impl KeyStoreError {
    /// Creates a new `UnsupportedAlgorithm` error.
    #[must_use]
    pub fn unsupported_algorithm(alg: impl Into<String>, reason: &'static str) -> Self {
        Self::UnsupportedAlgorithm { alg: alg.into(), reason }
    }

    /// Creates a new `UnsupportedCurve` error.
    #[must_use]
    pub fn unsupported_curve(crv: impl Into<String>) -> Self {
        Self::UnsupportedCurve { crv: crv.into() }
    }

    /// Creates a new `MissingAlgorithm` error.
    #[must_use]
    pub fn missing_algorithm(kid: Option<&str>) -> Self {
        Self::MissingAlgorithm { kid: kid.map(str::to_owned) }
    }

    /// Creates a new `InvalidKey` error with the given message.
    #[must_use]
    pub fn invalid_key(message: impl Into<String>) -> Self {
        Self::InvalidKey { message: message.into(), source: None }
    }

    /// Creates a new `InvalidKey` error with a message and source error.
    #[must_use]
    pub fn invalid_key_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::InvalidKey { message: message.into(), source: Some(Arc::new(source)) }
    }

    /// Creates a new `KeyGeneration` error with the given message.
    #[must_use]
    pub fn key_generation(message: impl Into<String>) -> Self {
        Self::KeyGeneration { message: message.into(), source: None }
    }

    /// Creates a new `KeyGeneration` error with a message and source error.
    #[must_use]
    pub fn key_generation_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::KeyGeneration { message: message.into(), source: Some(Arc::new(source)) }
    }

    /// Creates a new `GenerationTimeout` error.
    #[must_use]
    pub fn generation_timeout(alg: impl Into<String>, timeout: Duration) -> Self {
        Self::GenerationTimeout { alg: alg.into(), timeout }
    }

    /// Creates a new `Config` error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }
}
