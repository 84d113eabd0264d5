//! Key pair generation.
//!
//! [`KeyPairGenerator`] is the seam between the store and the cryptographic
//! backend: it produces a private key for an algorithm and exports it as an
//! unnormalized JWK with every private member populated. The store assigns
//! the `kid` and `alg` afterwards.
//!
//! [`RustCryptoGenerator`] is the default backend:
//!
//! | Algorithm | Key | Crate |
//! |-----------|-----|-------|
//! | `RS*`, `PS*` | RSA, configured modulus | `rsa` |
//! | `ES256` | P-256 | `p256` |
//! | `ES384` | P-384 | `p384` |
//! | `ES512` | P-521 | `p521` |
//! | `EdDSA` + `Ed25519` | Ed25519 | `ed25519-dalek` |
//! | `EdDSA` + `Ed448` | Ed448 | `ed448-goldilocks-plus` |

use std::fmt;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use ed25519_dalek::SigningKey;
use ed448_goldilocks_plus::SigningKey as Ed448SigningKey;
use p256::elliptic_curve::sec1::ToEncodedPoint;
use rand_core::OsRng;
use rsa::{
    RsaPrivateKey,
    traits::{PrivateKeyParts, PublicKeyParts},
};
use zeroize::Zeroizing;

use crate::{
    algorithm::{OkpCurve, SigningAlgorithm},
    error::{KeyStoreError, KeyStoreResult},
    jwk::{EcParams, KeyParams, OkpParams, RawJwk, RsaParams, SecretField},
};

/// Parameters for one key pair generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyGenParams {
    /// The signing algorithm the key is for.
    pub alg: SigningAlgorithm,
    /// Edwards curve, consulted only for [`SigningAlgorithm::EdDsa`].
    pub curve: OkpCurve,
    /// RSA modulus size, consulted only for `RS*` and `PS*`.
    pub rsa_modulus_bits: usize,
}

/// Produces private keys and exports them as JWKs.
///
/// Implementations must be usable from blocking worker threads, hence the
/// `Send + Sync` bound: [`SharedKeyStore`](crate::SharedKeyStore) runs
/// [`generate_key_pair`](Self::generate_key_pair) on
/// `tokio::task::spawn_blocking`.
pub trait KeyPairGenerator: Send + Sync {
    /// The backend's private key representation.
    type PrivateKey: Send + 'static;

    /// Generates a fresh private key.
    ///
    /// # Errors
    ///
    /// Returns [`KeyStoreError::KeyGeneration`] if the backend fails.
    fn generate_key_pair(&self, params: &KeyGenParams) -> KeyStoreResult<Self::PrivateKey>;

    /// Exports a private key as a JWK with every private member populated.
    ///
    /// The returned key carries no `kid` or `alg`; both are assigned by the
    /// store.
    ///
    /// # Errors
    ///
    /// Returns [`KeyStoreError::KeyGeneration`] if the key cannot be
    /// encoded.
    fn export_private_jwk(&self, key: &Self::PrivateKey) -> KeyStoreResult<RawJwk>;
}

/// A private key produced by [`RustCryptoGenerator`].
///
/// The `Debug` output names the key type only.
pub enum GeneratedKey {
    /// RSA key for `RS*` and `PS*`.
    Rsa(Box<RsaPrivateKey>),
    /// P-256 key for `ES256`.
    P256(p256::SecretKey),
    /// P-384 key for `ES384`.
    P384(p384::SecretKey),
    /// P-521 key for `ES512`.
    P521(p521::SecretKey),
    /// Ed25519 key for `EdDSA`.
    Ed25519(SigningKey),
    /// Ed448 key for `EdDSA`.
    Ed448(Ed448SigningKey),
}

impl fmt::Debug for GeneratedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Rsa(_) => "Rsa",
            Self::P256(_) => "P256",
            Self::P384(_) => "P384",
            Self::P521(_) => "P521",
            Self::Ed25519(_) => "Ed25519",
            Self::Ed448(_) => "Ed448",
        };
        write!(f, "GeneratedKey::{name}([REDACTED])")
    }
}

/// Key pair generator backed by the RustCrypto crates.
#[derive(Debug, Default, Clone, Copy)]
pub struct RustCryptoGenerator;

impl RustCryptoGenerator {
    /// Creates the generator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl KeyPairGenerator for RustCryptoGenerator {
    type PrivateKey = GeneratedKey;

    #[tracing::instrument(skip(self), fields(alg = %params.alg))]
    fn generate_key_pair(&self, params: &KeyGenParams) -> KeyStoreResult<GeneratedKey> {
        let key = match params.alg {
            SigningAlgorithm::Rs256
            | SigningAlgorithm::Rs384
            | SigningAlgorithm::Rs512
            | SigningAlgorithm::Ps256
            | SigningAlgorithm::Ps384
            | SigningAlgorithm::Ps512 => {
                tracing::debug!(bits = params.rsa_modulus_bits, "generating RSA key");
                let key = RsaPrivateKey::new(&mut OsRng, params.rsa_modulus_bits).map_err(|e| {
                    KeyStoreError::key_generation_with_source("RSA key generation failed", e)
                })?;
                GeneratedKey::Rsa(Box::new(key))
            },
            SigningAlgorithm::Es256 => GeneratedKey::P256(p256::SecretKey::random(&mut OsRng)),
            SigningAlgorithm::Es384 => GeneratedKey::P384(p384::SecretKey::random(&mut OsRng)),
            SigningAlgorithm::Es512 => GeneratedKey::P521(p521::SecretKey::random(&mut OsRng)),
            SigningAlgorithm::EdDsa => match params.curve {
                OkpCurve::Ed25519 => GeneratedKey::Ed25519(SigningKey::generate(&mut OsRng)),
                OkpCurve::Ed448 => GeneratedKey::Ed448(Ed448SigningKey::generate(&mut OsRng)),
            },
        };
        Ok(key)
    }

    fn export_private_jwk(&self, key: &GeneratedKey) -> KeyStoreResult<RawJwk> {
        let params = match key {
            GeneratedKey::Rsa(key) => KeyParams::Rsa(rsa_params(key)?),
            GeneratedKey::P256(secret) => {
                let point = secret.public_key().to_encoded_point(false);
                ec_params(
                    "P-256",
                    point.x().map(|x| &x[..]),
                    point.y().map(|y| &y[..]),
                    &secret.to_bytes(),
                )?
            },
            GeneratedKey::P384(secret) => {
                let point = secret.public_key().to_encoded_point(false);
                ec_params(
                    "P-384",
                    point.x().map(|x| &x[..]),
                    point.y().map(|y| &y[..]),
                    &secret.to_bytes(),
                )?
            },
            GeneratedKey::P521(secret) => {
                let point = secret.public_key().to_encoded_point(false);
                ec_params(
                    "P-521",
                    point.x().map(|x| &x[..]),
                    point.y().map(|y| &y[..]),
                    &secret.to_bytes(),
                )?
            },
            GeneratedKey::Ed25519(signing) => {
                let seed = Zeroizing::new(signing.to_bytes());
                KeyParams::Okp(OkpParams {
                    crv: OkpCurve::Ed25519.as_str().to_owned(),
                    x: encode(signing.verifying_key().as_bytes()),
                    d: Some(encode_secret(seed.as_slice())),
                })
            },
            GeneratedKey::Ed448(signing) => KeyParams::Okp(OkpParams {
                crv: OkpCurve::Ed448.as_str().to_owned(),
                x: encode(&signing.verifying_key().to_bytes()[..]),
                d: Some(encode_secret(&signing.as_bytes()[..])),
            }),
        };
        Ok(RawJwk::new(params))
    }
}

fn encode(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

fn encode_secret(bytes: &[u8]) -> SecretField {
    Zeroizing::new(URL_SAFE_NO_PAD.encode(bytes))
}

fn rsa_params(key: &RsaPrivateKey) -> KeyStoreResult<RsaParams> {
    let missing = |member: &str| {
        KeyStoreError::key_generation(format!("RSA key is missing CRT member '{member}'"))
    };

    let [p, q] = key.primes() else {
        return Err(KeyStoreError::key_generation("RSA key must have exactly two primes"));
    };
    let dp = key.dp().ok_or_else(|| missing("dp"))?;
    let dq = key.dq().ok_or_else(|| missing("dq"))?;
    let (_, qi) = key.qinv().ok_or_else(|| missing("qi"))?.to_bytes_be();

    Ok(RsaParams {
        n: encode(&key.n().to_bytes_be()),
        e: encode(&key.e().to_bytes_be()),
        d: Some(encode_secret(&Zeroizing::new(key.d().to_bytes_be()))),
        p: Some(encode_secret(&Zeroizing::new(p.to_bytes_be()))),
        q: Some(encode_secret(&Zeroizing::new(q.to_bytes_be()))),
        dp: Some(encode_secret(&Zeroizing::new(dp.to_bytes_be()))),
        dq: Some(encode_secret(&Zeroizing::new(dq.to_bytes_be()))),
        qi: Some(encode_secret(&Zeroizing::new(qi))),
    })
}

fn ec_params(crv: &str, x: Option<&[u8]>, y: Option<&[u8]>, d: &[u8]) -> KeyStoreResult<KeyParams> {
    let (Some(x), Some(y)) = (x, y) else {
        return Err(KeyStoreError::key_generation(format!(
            "{crv} public key has no affine coordinates"
        )));
    };
    Ok(KeyParams::Ec(EcParams {
        crv: crv.to_owned(),
        x: encode(x),
        y: encode(y),
        d: Some(encode_secret(d)),
    }))
}
