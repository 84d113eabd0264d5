//! JSON Web Key types (RFC 7517, RFC 7518 §6, RFC 8037).
//!
//! A key is a set of common members (`kid`, `kty`, `alg`, `use`) plus a
//! payload that depends on the key type. The payload is modeled as
//! [`KeyParams`], tagged on `kty`, so redaction is "copy the common members
//! and the payload's public subset".
//!
//! Two shapes exist:
//!
//! - [`RawJwk`]: a key as supplied by a caller or exported by the key pair generator. `kid` and
//!   `alg` may be missing.
//! - [`Jwk`]: a normalized key as held by the store. `kid` and `alg` are always present and
//!   non-empty.
//!
//! Private members are held in [`Zeroizing`] buffers so the key material is
//! scrubbed from memory when the last copy is dropped.
//!
//! Unknown JSON members are ignored when parsing. Unknown `kty` values are
//! rejected.

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::{
    algorithm::KeyType,
    error::{KeyStoreError, KeyStoreResult},
};

/// A private key member: a base64url string scrubbed on drop.
pub type SecretField = Zeroizing<String>;

/// RSA key members (RFC 7518 §6.3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RsaParams {
    /// Modulus.
    pub n: String,
    /// Public exponent.
    pub e: String,
    /// Private exponent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d: Option<SecretField>,
    /// First prime factor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p: Option<SecretField>,
    /// Second prime factor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q: Option<SecretField>,
    /// First factor CRT exponent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dp: Option<SecretField>,
    /// Second factor CRT exponent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dq: Option<SecretField>,
    /// First CRT coefficient.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qi: Option<SecretField>,
}

impl RsaParams {
    /// Creates public-only RSA members.
    #[must_use]
    pub fn public(n: impl Into<String>, e: impl Into<String>) -> Self {
        Self { n: n.into(), e: e.into(), d: None, p: None, q: None, dp: None, dq: None, qi: None }
    }
}

/// Elliptic curve key members (RFC 7518 §6.2).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcParams {
    /// Curve name (`P-256`, `P-384`, `P-521`).
    pub crv: String,
    /// X coordinate.
    pub x: String,
    /// Y coordinate.
    pub y: String,
    /// Private scalar.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d: Option<SecretField>,
}

/// Octet key pair members (RFC 8037 §2).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OkpParams {
    /// Curve name (`Ed25519`, `Ed448`).
    pub crv: String,
    /// Public key.
    pub x: String,
    /// Private key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d: Option<SecretField>,
}

/// Type-specific key members, tagged on `kty`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kty")]
pub enum KeyParams {
    /// `kty: "RSA"`.
    #[serde(rename = "RSA")]
    Rsa(RsaParams),
    /// `kty: "EC"`.
    #[serde(rename = "EC")]
    Ec(EcParams),
    /// `kty: "OKP"`.
    #[serde(rename = "OKP")]
    Okp(OkpParams),
}

impl KeyParams {
    /// Returns the key type family.
    #[must_use]
    pub fn key_type(&self) -> KeyType {
        match self {
            Self::Rsa(_) => KeyType::Rsa,
            Self::Ec(_) => KeyType::Ec,
            Self::Okp(_) => KeyType::Okp,
        }
    }

    /// Returns a copy holding only the public members.
    #[must_use]
    pub fn to_public(&self) -> Self {
        match self {
            Self::Rsa(rsa) => Self::Rsa(RsaParams::public(rsa.n.clone(), rsa.e.clone())),
            Self::Ec(ec) => Self::Ec(EcParams {
                crv: ec.crv.clone(),
                x: ec.x.clone(),
                y: ec.y.clone(),
                d: None,
            }),
            Self::Okp(okp) => {
                Self::Okp(OkpParams { crv: okp.crv.clone(), x: okp.x.clone(), d: None })
            },
        }
    }

    /// Returns `true` if any private member is present.
    #[must_use]
    pub fn has_private_material(&self) -> bool {
        match self {
            Self::Rsa(rsa) => {
                rsa.d.is_some()
                    || rsa.p.is_some()
                    || rsa.q.is_some()
                    || rsa.dp.is_some()
                    || rsa.dq.is_some()
                    || rsa.qi.is_some()
            },
            Self::Ec(ec) => ec.d.is_some(),
            Self::Okp(okp) => okp.d.is_some(),
        }
    }
}

/// A key before normalization.
///
/// This is the ingestion shape accepted by
/// [`KeyStore::add`](crate::KeyStore::add) and the export shape produced by a
/// [`KeyPairGenerator`](crate::KeyPairGenerator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawJwk {
    /// Key identifier. Empty strings are treated as absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,

    /// Type-specific members, including `kty`.
    #[serde(flatten)]
    pub params: KeyParams,

    /// Signing algorithm. Empty strings are treated as absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,

    /// Intended use (`sig`, `enc`).
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub key_use: Option<String>,
}

impl RawJwk {
    /// Creates a key with no `kid`, `alg` or `use`.
    #[must_use]
    pub fn new(params: KeyParams) -> Self {
        Self { kid: None, params, alg: None, key_use: None }
    }

    /// Parses a key from a JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`KeyStoreError::InvalidKey`] if the input is not a JSON
    /// object with a known `kty` and that type's public members.
    pub fn from_json(json: &str) -> KeyStoreResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| KeyStoreError::invalid_key_with_source("failed to parse JWK", e))
    }
}

/// A normalized key as held by the store.
///
/// `kid` and `alg` are guaranteed present and non-empty. Instances are
/// produced by normalization inside the store, or by deserializing JSON that
/// carries both members.
///
/// Serializes to the JWK JSON layout, private members included. Use
/// [`to_public`](Self::to_public) for the publishable form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawJwk")]
pub struct Jwk {
    kid: String,

    #[serde(flatten)]
    params: KeyParams,

    alg: String,

    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    key_use: Option<String>,
}

impl Jwk {
    /// Builds a key from already-validated parts.
    pub(crate) fn from_parts(
        kid: String,
        alg: String,
        key_use: Option<String>,
        params: KeyParams,
    ) -> Self {
        debug_assert!(!kid.is_empty() && !alg.is_empty());
        Self { kid, params, alg, key_use }
    }

    /// Returns the key identifier.
    #[must_use]
    pub fn kid(&self) -> &str {
        &self.kid
    }

    /// Returns the signing algorithm name.
    #[must_use]
    pub fn alg(&self) -> &str {
        &self.alg
    }

    /// Returns the intended use, if set.
    #[must_use]
    pub fn key_use(&self) -> Option<&str> {
        self.key_use.as_deref()
    }

    /// Returns the key type family.
    #[must_use]
    pub fn key_type(&self) -> KeyType {
        self.params.key_type()
    }

    /// Returns the type-specific members.
    #[must_use]
    pub fn params(&self) -> &KeyParams {
        &self.params
    }

    /// Returns `true` if the key carries private material.
    #[must_use]
    pub fn is_private(&self) -> bool {
        self.params.has_private_material()
    }

    /// Returns a copy with every private member removed.
    #[must_use]
    pub fn to_public(&self) -> Self {
        Self {
            kid: self.kid.clone(),
            params: self.params.to_public(),
            alg: self.alg.clone(),
            key_use: self.key_use.clone(),
        }
    }

    /// Converts back into the unnormalized shape.
    #[must_use]
    pub fn into_raw(self) -> RawJwk {
        RawJwk { kid: Some(self.kid), params: self.params, alg: Some(self.alg), key_use: self.key_use }
    }
}

impl TryFrom<RawJwk> for Jwk {
    type Error = KeyStoreError;

    fn try_from(raw: RawJwk) -> KeyStoreResult<Self> {
        let kid = raw.kid.filter(|kid| !kid.is_empty());
        let Some(alg) = raw.alg.filter(|alg| !alg.is_empty()) else {
            return Err(KeyStoreError::missing_algorithm(kid.as_deref()));
        };
        let Some(kid) = kid else {
            return Err(KeyStoreError::invalid_key("kid is required"));
        };
        Ok(Self::from_parts(kid, alg, raw.key_use, raw.params))
    }
}

/// A JWK Set document (RFC 7517 §5): `{ "keys": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwkSet {
    /// The keys, in the store's current rotation order.
    pub keys: Vec<Jwk>,
}

impl JwkSet {
    /// Returns the key with the given `kid`, if present.
    #[must_use]
    pub fn find(&self, kid: &str) -> Option<&Jwk> {
        self.keys.iter().find(|key| key.kid == kid)
    }

    /// Returns the number of keys in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns `true` if the set holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Ingestion shape of a JWK Set whose keys may lack `kid` or `alg`.
#[derive(Debug, Deserialize)]
pub(crate) struct RawJwkSet {
    pub(crate) keys: Vec<RawJwk>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use serde_json::{Value, json};

    use super::*;

    const RSA_PRIVATE_MEMBERS: &[&str] = &["d", "p", "q", "dp", "dq", "qi"];

    fn rsa_private_json() -> Value {
        json!({
            "kty": "RSA",
            "kid": "rsa-1",
            "alg": "RS256",
            "use": "sig",
            "n": "sXchfQ",
            "e": "AQAB",
            "d": "VFCWOq",
            "p": "9lWti3",
            "q": "uA7K2w",
            "dp": "Bq2ft8",
            "dq": "DnE2pZ",
            "qi": "b5ZRjQ",
        })
    }

    #[test]
    fn test_parse_rsa_private_key() {
        let raw = RawJwk::from_json(&rsa_private_json().to_string()).unwrap();
        assert_eq!(raw.kid.as_deref(), Some("rsa-1"));
        assert_eq!(raw.alg.as_deref(), Some("RS256"));
        assert_eq!(raw.key_use.as_deref(), Some("sig"));
        let KeyParams::Rsa(rsa) = &raw.params else { panic!("expected RSA params") };
        assert_eq!(rsa.n, "sXchfQ");
        assert_eq!(rsa.qi.as_deref().map(String::as_str), Some("b5ZRjQ"));
        assert!(raw.params.has_private_material());
    }

    #[test]
    fn test_parse_ec_and_okp_keys() {
        let ec = RawJwk::from_json(r#"{"kty":"EC","crv":"P-256","x":"f83O","y":"x_FE","d":"jpsQ"}"#)
            .unwrap();
        assert_eq!(ec.params.key_type(), KeyType::Ec);
        assert!(ec.kid.is_none());

        let okp = RawJwk::from_json(r#"{"kty":"OKP","crv":"Ed25519","x":"11qY"}"#).unwrap();
        assert_eq!(okp.params.key_type(), KeyType::Okp);
        assert!(!okp.params.has_private_material());
    }

    #[test]
    fn test_unknown_kty_rejected() {
        let result = RawJwk::from_json(r#"{"kty":"oct","k":"GawgguFyGrWKav7AX4VKUg"}"#);
        assert!(matches!(result, Err(KeyStoreError::InvalidKey { .. })));
    }

    #[test]
    fn test_missing_public_member_rejected() {
        let result = RawJwk::from_json(r#"{"kty":"RSA","e":"AQAB"}"#);
        assert!(matches!(result, Err(KeyStoreError::InvalidKey { .. })));
    }

    #[test]
    fn test_unknown_members_ignored() {
        let raw =
            RawJwk::from_json(r#"{"kty":"OKP","crv":"Ed25519","x":"11qY","key_ops":["sign"]}"#)
                .unwrap();
        assert_eq!(raw.params.key_type(), KeyType::Okp);
    }

    #[test]
    fn test_public_projection_strips_rsa_private_members() {
        let key: Jwk = serde_json::from_value(rsa_private_json()).unwrap();
        assert!(key.is_private());

        let public = serde_json::to_value(key.to_public()).unwrap();
        for member in RSA_PRIVATE_MEMBERS {
            assert!(public.get(member).is_none(), "public key must not contain '{member}'");
        }
        assert_eq!(public["kid"], "rsa-1");
        assert_eq!(public["kty"], "RSA");
        assert_eq!(public["alg"], "RS256");
        assert_eq!(public["use"], "sig");
        assert_eq!(public["n"], "sXchfQ");
        assert_eq!(public["e"], "AQAB");
    }

    #[test]
    fn test_private_serialization_keeps_every_member() {
        let key: Jwk = serde_json::from_value(rsa_private_json()).unwrap();
        let value = serde_json::to_value(&key).unwrap();
        assert_eq!(value, rsa_private_json());
    }

    #[test]
    fn test_public_projection_ec_keeps_coordinates() {
        let key: Jwk = serde_json::from_value(json!({
            "kty": "EC", "kid": "ec-1", "alg": "ES256",
            "crv": "P-256", "x": "f83O", "y": "x_FE", "d": "jpsQ",
        }))
        .unwrap();
        let public = serde_json::to_value(key.to_public()).unwrap();
        assert_eq!(
            public,
            json!({"kty": "EC", "kid": "ec-1", "alg": "ES256", "crv": "P-256", "x": "f83O", "y": "x_FE"})
        );
    }

    #[test]
    fn test_use_member_omitted_when_absent() {
        let key: Jwk = serde_json::from_value(json!({
            "kty": "OKP", "kid": "ed-1", "alg": "EdDSA", "crv": "Ed25519", "x": "11qY",
        }))
        .unwrap();
        let value = serde_json::to_value(&key).unwrap();
        assert!(value.get("use").is_none());
        assert!(key.key_use().is_none());
    }

    #[test]
    fn test_jwk_deserialization_requires_alg() {
        let result = serde_json::from_value::<Jwk>(json!({
            "kty": "OKP", "kid": "ed-1", "crv": "Ed25519", "x": "11qY",
        }));
        let err = result.unwrap_err().to_string();
        assert!(err.contains("no algorithm"), "unexpected error: {err}");
    }

    #[test]
    fn test_jwk_deserialization_requires_non_empty_kid() {
        let result = serde_json::from_value::<Jwk>(json!({
            "kty": "OKP", "kid": "", "alg": "EdDSA", "crv": "Ed25519", "x": "11qY",
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_into_raw_round_trip() {
        let key: Jwk = serde_json::from_value(rsa_private_json()).unwrap();
        let raw = key.clone().into_raw();
        assert_eq!(Jwk::try_from(raw).unwrap(), key);
    }

    #[test]
    fn test_jwk_set_find() {
        let key: Jwk = serde_json::from_value(rsa_private_json()).unwrap();
        let set = JwkSet { keys: vec![key] };
        assert_eq!(set.len(), 1);
        assert!(set.find("rsa-1").is_some());
        assert!(set.find("missing").is_none());
        assert_eq!(serde_json::to_value(&set).unwrap()["keys"][0]["kid"], "rsa-1");
    }
}
