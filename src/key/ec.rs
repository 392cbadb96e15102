//! Elliptic curve private keys in SEC1 and PKCS#8 form

use std::fmt;

use const_oid::{AssociatedOid, ObjectIdentifier};
use der::Decode;
use pkcs8::{EncodePrivateKey, SecretDocument};

use crate::errors::DecodeError;

/// Named elliptic curves supported by pkiutil
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum EcCurve {
    /// The NIST P-224 (a.k.a. secp224r1) elliptic curve.
    #[cfg(feature = "p224")]
    P224,

    /// The NIST P-256 (a.k.a. secp256r1, prime256v1) elliptic curve.
    P256,

    /// The NIST P-384 (a.k.a. secp384r1) elliptic curve.
    #[cfg(feature = "p384")]
    P384,

    /// The NIST P-521 (a.k.a. secp521r1) elliptic curve.
    #[cfg(feature = "p521")]
    P521,
}

impl EcCurve {
    /// The object identifier naming this curve.
    pub fn oid(&self) -> ObjectIdentifier {
        match self {
            #[cfg(feature = "p224")]
            EcCurve::P224 => p224::NistP224::OID,
            EcCurve::P256 => p256::NistP256::OID,
            #[cfg(feature = "p384")]
            EcCurve::P384 => p384::NistP384::OID,
            #[cfg(feature = "p521")]
            EcCurve::P521 => p521::NistP521::OID,
        }
    }

    /// The curve named by `oid`, if it is supported.
    pub fn from_oid(oid: ObjectIdentifier) -> Option<Self> {
        match oid {
            #[cfg(feature = "p224")]
            oid if oid == p224::NistP224::OID => Some(EcCurve::P224),
            oid if oid == p256::NistP256::OID => Some(EcCurve::P256),
            #[cfg(feature = "p384")]
            oid if oid == p384::NistP384::OID => Some(EcCurve::P384),
            #[cfg(feature = "p521")]
            oid if oid == p521::NistP521::OID => Some(EcCurve::P521),
            _ => None,
        }
    }
}

impl fmt::Display for EcCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            #[cfg(feature = "p224")]
            EcCurve::P224 => f.write_str("P-224"),
            EcCurve::P256 => f.write_str("P-256"),
            #[cfg(feature = "p384")]
            EcCurve::P384 => f.write_str("P-384"),
            #[cfg(feature = "p521")]
            EcCurve::P521 => f.write_str("P-521"),
        }
    }
}

/// An elliptic curve private key on one of the supported curves.
#[derive(Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EcPrivateKey {
    /// A key on the NIST P-224 curve.
    #[cfg(feature = "p224")]
    P224(p224::SecretKey),

    /// A key on the NIST P-256 curve.
    P256(p256::SecretKey),

    /// A key on the NIST P-384 curve.
    #[cfg(feature = "p384")]
    P384(p384::SecretKey),

    /// A key on the NIST P-521 curve.
    #[cfg(feature = "p521")]
    P521(p521::SecretKey),
}

impl EcPrivateKey {
    /// The curve this key is on.
    pub fn curve(&self) -> EcCurve {
        match self {
            #[cfg(feature = "p224")]
            EcPrivateKey::P224(_) => EcCurve::P224,
            EcPrivateKey::P256(_) => EcCurve::P256,
            #[cfg(feature = "p384")]
            EcPrivateKey::P384(_) => EcCurve::P384,
            #[cfg(feature = "p521")]
            EcPrivateKey::P521(_) => EcCurve::P521,
        }
    }

    /// Decode a SEC1 `ECPrivateKey`, using the named curve in its parameters.
    pub(crate) fn from_sec1_der(der: &[u8]) -> Result<Self, DecodeError> {
        let key = sec1::EcPrivateKey::from_der(der)?;
        let curve = key.parameters.and_then(|params| params.named_curve());

        match curve.and_then(EcCurve::from_oid) {
            #[cfg(feature = "p224")]
            Some(EcCurve::P224) => Ok(EcPrivateKey::P224(p224::SecretKey::from_sec1_der(der)?)),
            Some(EcCurve::P256) => Ok(EcPrivateKey::P256(p256::SecretKey::from_sec1_der(der)?)),
            #[cfg(feature = "p384")]
            Some(EcCurve::P384) => Ok(EcPrivateKey::P384(p384::SecretKey::from_sec1_der(der)?)),
            #[cfg(feature = "p521")]
            Some(EcCurve::P521) => Ok(EcPrivateKey::P521(p521::SecretKey::from_sec1_der(der)?)),
            None => Err(DecodeError::UnsupportedCurve(curve)),
        }
    }

    /// Decode the key from a PKCS#8 structure whose algorithm is `id-ecPublicKey`.
    pub(crate) fn from_pkcs8(info: pkcs8::PrivateKeyInfo<'_>) -> Result<Self, DecodeError> {
        let curve = info.algorithm.parameters_oid().ok();

        match curve.and_then(EcCurve::from_oid) {
            #[cfg(feature = "p224")]
            Some(EcCurve::P224) => Ok(EcPrivateKey::P224(p224::SecretKey::try_from(info)?)),
            Some(EcCurve::P256) => Ok(EcPrivateKey::P256(p256::SecretKey::try_from(info)?)),
            #[cfg(feature = "p384")]
            Some(EcCurve::P384) => Ok(EcPrivateKey::P384(p384::SecretKey::try_from(info)?)),
            #[cfg(feature = "p521")]
            Some(EcCurve::P521) => Ok(EcPrivateKey::P521(p521::SecretKey::try_from(info)?)),
            None => Err(DecodeError::UnsupportedCurve(curve)),
        }
    }
}

impl EncodePrivateKey for EcPrivateKey {
    fn to_pkcs8_der(&self) -> pkcs8::Result<SecretDocument> {
        match self {
            #[cfg(feature = "p224")]
            EcPrivateKey::P224(key) => key.to_pkcs8_der(),
            EcPrivateKey::P256(key) => key.to_pkcs8_der(),
            #[cfg(feature = "p384")]
            EcPrivateKey::P384(key) => key.to_pkcs8_der(),
            #[cfg(feature = "p521")]
            EcPrivateKey::P521(key) => key.to_pkcs8_der(),
        }
    }
}

impl From<p256::SecretKey> for EcPrivateKey {
    fn from(value: p256::SecretKey) -> Self {
        EcPrivateKey::P256(value)
    }
}

#[cfg(feature = "p224")]
impl From<p224::SecretKey> for EcPrivateKey {
    fn from(value: p224::SecretKey) -> Self {
        EcPrivateKey::P224(value)
    }
}

#[cfg(feature = "p384")]
impl From<p384::SecretKey> for EcPrivateKey {
    fn from(value: p384::SecretKey) -> Self {
        EcPrivateKey::P384(value)
    }
}

#[cfg(feature = "p521")]
impl From<p521::SecretKey> for EcPrivateKey {
    fn from(value: p521::SecretKey) -> Self {
        EcPrivateKey::P521(value)
    }
}

impl fmt::Debug for EcPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EcPrivateKey").field(&self.curve()).finish()
    }
}
