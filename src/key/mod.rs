//! # PEM encoded private keys
//!
//! Private keys are read from any of the three common PEM encodings:
//! PKCS#8 (`PRIVATE KEY`), PKCS#1 (`RSA PRIVATE KEY`) and SEC1
//! (`EC PRIVATE KEY`). Whatever the encoding they were read from, keys are
//! always written back out as PKCS#8.
//!
//! The key types here wrap RustCrypto primitives, so that callers can work
//! with a key without knowing its algorithm up front. RSA keys, elliptic
//! curve keys on the NIST curves and Ed25519 keys are supported.
//!
//! ```
//! # use pkiutil::key::{parse_private_key, marshal_private_key, EcCurve, KeyAlgorithm};
//! let sec1 = include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/ec256.key"));
//! let pkcs8 = include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/ec256-pkcs8.key"));
//!
//! let key = parse_private_key(sec1).unwrap();
//! assert_eq!(key.algorithm(), KeyAlgorithm::Ec(EcCurve::P256));
//! assert_eq!(marshal_private_key(&key).unwrap(), pkcs8);
//! ```

use std::any::Any;
use std::fmt;
use std::io::Write;

use const_oid::db::rfc5912::{ID_EC_PUBLIC_KEY, RSA_ENCRYPTION};
#[cfg(feature = "ed25519")]
use const_oid::db::rfc8410::ID_ED_25519;
use der::Decode;
use pkcs8::{EncodePrivateKey, SecretDocument};
use rsa::pkcs1::DecodeRsaPrivateKey;

use crate::errors::{DecodeError, PkiError};
use crate::pem;

mod ec;

pub use self::ec::{EcCurve, EcPrivateKey};

const PEM_TAG_PKCS8: &str = "PRIVATE KEY";
const PEM_TAG_PKCS1: &str = "RSA PRIVATE KEY";
const PEM_TAG_SEC1: &str = "EC PRIVATE KEY";

/// Encodings a private key can be read from, keyed by their PEM label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyFormat {
    /// PKCS#8 `PrivateKeyInfo`, for any algorithm.
    Pkcs8,

    /// PKCS#1 `RSAPrivateKey`.
    Pkcs1,

    /// SEC1 `ECPrivateKey`.
    Sec1,
}

impl KeyFormat {
    /// The PEM label used for keys in this format.
    pub const fn label(&self) -> &'static str {
        match self {
            KeyFormat::Pkcs8 => PEM_TAG_PKCS8,
            KeyFormat::Pkcs1 => PEM_TAG_PKCS1,
            KeyFormat::Sec1 => PEM_TAG_SEC1,
        }
    }

    /// The format of keys in a PEM block with `label`, if it is a private key.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            PEM_TAG_PKCS8 => Some(KeyFormat::Pkcs8),
            PEM_TAG_PKCS1 => Some(KeyFormat::Pkcs1),
            PEM_TAG_SEC1 => Some(KeyFormat::Sec1),
            _ => None,
        }
    }

    fn decode(&self, der: &[u8]) -> Result<PrivateKey, DecodeError> {
        match self {
            KeyFormat::Pkcs8 => decode_pkcs8(der),
            KeyFormat::Pkcs1 => Ok(rsa::RsaPrivateKey::from_pkcs1_der(der)?.into()),
            KeyFormat::Sec1 => Ok(EcPrivateKey::from_sec1_der(der)?.into()),
        }
    }
}

impl fmt::Display for KeyFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Algorithms of the private keys pkiutil can read.
///
/// ```
/// # use pkiutil::key::{EcCurve, KeyAlgorithm};
/// let algorithm = KeyAlgorithm::Ec(EcCurve::P256);
/// assert_eq!(algorithm.to_string(), "EC P-256");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum KeyAlgorithm {
    /// RSA, of any modulus size
    Rsa,

    /// Elliptic curve keys on a named curve
    Ec(EcCurve),

    /// Ed25519 (EdDSA over Curve25519)
    #[cfg(feature = "ed25519")]
    Ed25519,
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyAlgorithm::Rsa => f.write_str("RSA"),
            KeyAlgorithm::Ec(curve) => write!(f, "EC {curve}"),
            #[cfg(feature = "ed25519")]
            KeyAlgorithm::Ed25519 => f.write_str("Ed25519"),
        }
    }
}

/// A private key, read from any supported PEM encoding.
///
/// Two keys are equal when they hold the same key material, regardless of
/// the encoding each was read from.
#[derive(Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PrivateKey {
    /// An RSA private key
    Rsa(Box<rsa::RsaPrivateKey>),

    /// An elliptic curve private key
    Ec(EcPrivateKey),

    /// An Ed25519 private key
    #[cfg(feature = "ed25519")]
    Ed25519(ed25519_dalek::SigningKey),
}

impl PrivateKey {
    /// The algorithm of this key.
    pub fn algorithm(&self) -> KeyAlgorithm {
        match self {
            PrivateKey::Rsa(_) => KeyAlgorithm::Rsa,
            PrivateKey::Ec(key) => KeyAlgorithm::Ec(key.curve()),
            #[cfg(feature = "ed25519")]
            PrivateKey::Ed25519(_) => KeyAlgorithm::Ed25519,
        }
    }
}

impl From<rsa::RsaPrivateKey> for PrivateKey {
    fn from(value: rsa::RsaPrivateKey) -> Self {
        PrivateKey::Rsa(Box::new(value))
    }
}

impl From<EcPrivateKey> for PrivateKey {
    fn from(value: EcPrivateKey) -> Self {
        PrivateKey::Ec(value)
    }
}

impl From<p256::SecretKey> for PrivateKey {
    fn from(value: p256::SecretKey) -> Self {
        PrivateKey::Ec(value.into())
    }
}

#[cfg(feature = "p224")]
impl From<p224::SecretKey> for PrivateKey {
    fn from(value: p224::SecretKey) -> Self {
        PrivateKey::Ec(value.into())
    }
}

#[cfg(feature = "p384")]
impl From<p384::SecretKey> for PrivateKey {
    fn from(value: p384::SecretKey) -> Self {
        PrivateKey::Ec(value.into())
    }
}

#[cfg(feature = "p521")]
impl From<p521::SecretKey> for PrivateKey {
    fn from(value: p521::SecretKey) -> Self {
        PrivateKey::Ec(value.into())
    }
}

#[cfg(feature = "ed25519")]
impl From<ed25519_dalek::SigningKey> for PrivateKey {
    fn from(value: ed25519_dalek::SigningKey) -> Self {
        PrivateKey::Ed25519(value)
    }
}

impl EncodePrivateKey for PrivateKey {
    fn to_pkcs8_der(&self) -> pkcs8::Result<SecretDocument> {
        match self {
            PrivateKey::Rsa(key) => key.to_pkcs8_der(),
            PrivateKey::Ec(key) => key.to_pkcs8_der(),
            #[cfg(feature = "ed25519")]
            PrivateKey::Ed25519(key) => ed25519_to_pkcs8_der(key),
        }
    }
}

/// Ed25519 keys are written as a version 1 `PrivateKeyInfo`, without the
/// optional public key.
#[cfg(feature = "ed25519")]
fn ed25519_to_pkcs8_der(key: &ed25519_dalek::SigningKey) -> pkcs8::Result<SecretDocument> {
    ed25519_dalek::pkcs8::KeypairBytes {
        secret_key: key.to_bytes(),
        public_key: None,
    }
    .to_pkcs8_der()
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrivateKey::Rsa(_) => f.write_str("RSA-Key"),
            PrivateKey::Ec(key) => write!(f, "EC-Key({})", key.curve()),
            #[cfg(feature = "ed25519")]
            PrivateKey::Ed25519(_) => f.write_str("Ed25519-Key"),
        }
    }
}

fn decode_pkcs8(der: &[u8]) -> Result<PrivateKey, DecodeError> {
    let info = pkcs8::PrivateKeyInfo::from_der(der)?;
    let oid = info.algorithm.oid;

    match oid {
        RSA_ENCRYPTION => Ok(rsa::RsaPrivateKey::try_from(info)?.into()),
        ID_EC_PUBLIC_KEY => Ok(EcPrivateKey::from_pkcs8(info)?.into()),
        #[cfg(feature = "ed25519")]
        ID_ED_25519 => Ok(ed25519_dalek::SigningKey::try_from(info)?.into()),
        _ => Err(DecodeError::UnknownAlgorithm(oid)),
    }
}

/// Parse the first PEM block in `data` as a private key.
///
/// The block label selects the encoding, see [`KeyFormat`].
pub fn parse_private_key(data: &[u8]) -> Result<PrivateKey, PkiError> {
    let (block, _) = pem::decode(data).ok_or(PkiError::NoPemData)?;
    let Some(format) = KeyFormat::from_label(block.label()) else {
        return Err(PkiError::UnexpectedBlockType(block.into_parts().0));
    };
    let (_, der) = block.into_parts();

    format.decode(&der).map_err(|error| {
        tracing::debug!(%format, %error, "private key failed to decode");
        error.into()
    })
}

/// Encode a private key as a PKCS#8 PEM document, and write it to `out`.
pub fn marshal_private_key_to<W, K>(out: &mut W, key: &K) -> Result<(), PkiError>
where
    W: Write + ?Sized,
    K: EncodePrivateKey + ?Sized,
{
    let der = key.to_pkcs8_der().map_err(PkiError::KeyEncode)?;
    pem::encode(out, PEM_TAG_PKCS8, der.as_bytes())
}

/// Encode a private key as a PKCS#8 PEM document.
pub fn marshal_private_key<K>(key: &K) -> Result<Vec<u8>, PkiError>
where
    K: EncodePrivateKey + ?Sized,
{
    let mut buf = Vec::new();
    marshal_private_key_to(&mut buf, key)?;
    Ok(buf)
}

/// Encode a dynamically typed private key as a PKCS#8 PEM document, and
/// write it to `out`.
///
/// The key must be a [`PrivateKey`], an [`EcPrivateKey`], an
/// [`rsa::RsaPrivateKey`], a `SecretKey` for a supported curve or an Ed25519
/// `SigningKey`, otherwise
/// [`PkiError::UnsupportedKeyType`] is returned and nothing is written.
pub fn marshal_any_private_key_to<W>(out: &mut W, key: &dyn Any) -> Result<(), PkiError>
where
    W: Write + ?Sized,
{
    let der = encode_any(key)
        .ok_or(PkiError::UnsupportedKeyType)?
        .map_err(PkiError::KeyEncode)?;
    pem::encode(out, PEM_TAG_PKCS8, der.as_bytes())
}

/// Encode a dynamically typed private key as a PKCS#8 PEM document.
///
/// See [`marshal_any_private_key_to`] for the accepted key types.
pub fn marshal_any_private_key(key: &dyn Any) -> Result<Vec<u8>, PkiError> {
    let mut buf = Vec::new();
    marshal_any_private_key_to(&mut buf, key)?;
    Ok(buf)
}

fn encode_any(key: &dyn Any) -> Option<pkcs8::Result<SecretDocument>> {
    if let Some(key) = key.downcast_ref::<PrivateKey>() {
        return Some(key.to_pkcs8_der());
    }
    if let Some(key) = key.downcast_ref::<rsa::RsaPrivateKey>() {
        return Some(key.to_pkcs8_der());
    }
    if let Some(key) = key.downcast_ref::<EcPrivateKey>() {
        return Some(key.to_pkcs8_der());
    }
    if let Some(key) = key.downcast_ref::<p256::SecretKey>() {
        return Some(key.to_pkcs8_der());
    }
    #[cfg(feature = "p224")]
    {
        if let Some(key) = key.downcast_ref::<p224::SecretKey>() {
            return Some(key.to_pkcs8_der());
        }
    }
    #[cfg(feature = "p384")]
    {
        if let Some(key) = key.downcast_ref::<p384::SecretKey>() {
            return Some(key.to_pkcs8_der());
        }
    }
    #[cfg(feature = "p521")]
    {
        if let Some(key) = key.downcast_ref::<p521::SecretKey>() {
            return Some(key.to_pkcs8_der());
        }
    }
    #[cfg(feature = "ed25519")]
    {
        if let Some(key) = key.downcast_ref::<ed25519_dalek::SigningKey>() {
            return Some(ed25519_to_pkcs8_der(key));
        }
    }

    tracing::debug!("value is not a supported private key type");
    None
}
