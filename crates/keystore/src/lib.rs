//! Rotating JSON Web Key store for InferaDB services.
//!
//! This crate holds the asymmetric signing keys a service issues tokens
//! with. Keys are generated or ingested as JSON Web Keys, served round robin
//! for signing and published as a JWK Set for verifiers.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │        Token issuance, /jwks handlers (host service)      │
//! ├───────────────────────────────────────────────────────────┤
//! │   SharedKeyStore (Mutex + spawn_blocking generation)      │
//! ├───────────────────────────────────────────────────────────┤
//! │   KeyStore: generate │ add │ get │ to_jwk_set             │
//! ├───────────────────┬───────────────────┬───────────────────┤
//! │  KeyPairGenerator │    normalize      │    KeyRotator     │
//! │  (RustCrypto)     │  (kid, alg)       │  (round robin)    │
//! └───────────────────┴───────────────────┴───────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```
//! use inferadb_common_keystore::{GenerateOptions, KeyStore};
//!
//! let mut store = KeyStore::new();
//! let key = store.generate("EdDSA", GenerateOptions::default())?;
//!
//! // The signer takes the next key in rotation.
//! let signing_key = store.get(None).expect("store is not empty");
//! assert_eq!(signing_key.kid(), key.kid());
//!
//! // Verifiers get the public set.
//! let jwks = serde_json::to_string(&store.to_jwk_set(false))?;
//! assert!(!jwks.contains("\"d\""));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Supported Algorithms
//!
//! | `alg` | `kty` | Key |
//! |-------|-------|-----|
//! | `RS256`, `RS384`, `RS512` | `RSA` | RSA (PKCS#1 v1.5) |
//! | `PS256`, `PS384`, `PS512` | `RSA` | RSA (PSS) |
//! | `ES256`, `ES384`, `ES512` | `EC` | P-256, P-384, P-521 |
//! | `EdDSA` | `OKP` | Ed25519 (default) or Ed448 |
//!
//! Symmetric algorithms and `none` are rejected.
//!
//! # Feature Flags
//!
//! - **`testutil`**: Enables the `testutil` module with fixture keys and the
//!   `assert_keystore_error!` macro.
//! - **`failpoints`**: Enables fault injection at the `keystore-before-insert` fail point.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod algorithm;
pub mod config;
pub mod error;
pub mod generator;
pub mod jwk;
pub mod normalize;
pub mod rotator;
pub mod shared;
pub mod store;
#[cfg(any(test, feature = "testutil"))]
#[allow(clippy::expect_used)]
pub mod testutil;

// Re-export primary types at crate root for convenience
pub use algorithm::{
    FORBIDDEN_ALGORITHMS, KeyType, OkpCurve, SUPPORTED_ALGORITHMS, SUPPORTED_CURVES,
    SigningAlgorithm, validate_algorithm, validate_curve,
};
pub use config::{
    DEFAULT_GENERATION_TIMEOUT, DEFAULT_KID_LENGTH, DEFAULT_RSA_MODULUS_BITS, KeyStoreConfig,
};
pub use error::{BoxError, KeyStoreError, KeyStoreResult};
pub use generator::{GeneratedKey, KeyGenParams, KeyPairGenerator, RustCryptoGenerator};
pub use jwk::{EcParams, Jwk, JwkSet, KeyParams, OkpParams, RawJwk, RsaParams, SecretField};
pub use normalize::{MIN_KID_LENGTH, generate_kid};
pub use rotator::KeyRotator;
pub use shared::SharedKeyStore;
pub use store::{GenerateOptions, KeyStore};
pub use zeroize::Zeroizing;
