//! Errors which occur when parsing or serializing PEM documents

use const_oid::ObjectIdentifier;
use thiserror::Error;

/// Unified error type for the certificate, request and private key codecs.
#[derive(Debug, Error)]
pub enum PkiError {
    /// The input did not contain a PEM block that could be located and decoded.
    #[error("No PEM data found")]
    NoPemData,

    /// A PEM block was found, but its label is not one the operation accepts.
    #[error("Unexpected PEM block type: {0}")]
    UnexpectedBlockType(String),

    /// The PEM block had the right label, but its contents could not be decoded.
    #[error("An error occured while decoding the PEM block contents: {0}")]
    Decode(#[from] DecodeError),

    /// A block within a sequence of certificates could not be decoded.
    #[error("An error occured while decoding certificate {index}: {source}")]
    DecodeAt {
        /// Zero-based position of the failing block in the input.
        index: usize,

        /// The underlying decoding error.
        #[source]
        source: DecodeError,
    },

    /// No certificates were decoded from the input.
    #[error("No certificates found")]
    NoCertificatesFound,

    /// The value given to marshal is not a private key type this crate can encode.
    #[error("Unsupported private key type")]
    UnsupportedKeyType,

    /// The private key could not be encoded as PKCS#8.
    #[error("An error occured while encoding the private key as PKCS#8: {0}")]
    KeyEncode(#[source] pkcs8::Error),

    /// The PEM document could not be encoded.
    #[error("An error occured while encoding a PEM document: {0}")]
    PemEncode(#[from] pem_rfc7468::Error),

    /// Writing to the output failed.
    #[error("An error occured writing PEM output: {0}")]
    Io(#[from] std::io::Error),
}

impl PkiError {
    /// Constructor for a decoding error at a position in a certificate sequence.
    pub fn at(index: usize, error: DecodeError) -> Self {
        PkiError::DecodeAt {
            index,
            source: error,
        }
    }

    /// Whether this error came from decoding the contents of a PEM block.
    pub fn is_decode(&self) -> bool {
        matches!(self, PkiError::Decode(_) | PkiError::DecodeAt { .. })
    }

    /// Position of the failing block, for errors from [`crate::cert::parse_certificates`].
    pub fn decode_index(&self) -> Option<usize> {
        match self {
            PkiError::DecodeAt { index, .. } => Some(*index),
            _ => None,
        }
    }
}

/// The reason the contents of a PEM block could not be decoded.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DecodeError {
    /// The block does not contain a valid DER structure of the expected type.
    #[error("invalid DER: {0}")]
    Der(#[from] der::Error),

    /// The block does not contain a valid PKCS#1 RSA private key.
    #[error("invalid PKCS#1 key: {0}")]
    Pkcs1(#[from] rsa::pkcs1::Error),

    /// The block does not contain a valid PKCS#8 private key.
    #[error("invalid PKCS#8 key: {0}")]
    Pkcs8(#[from] pkcs8::Error),

    /// The block does not contain a valid elliptic curve private key.
    #[error("invalid elliptic curve key: {0}")]
    EllipticCurve(#[from] p256::elliptic_curve::Error),

    /// The PKCS#8 key uses an algorithm this crate can't decode.
    #[error("unknown private key algorithm: {0}")]
    UnknownAlgorithm(ObjectIdentifier),

    /// The elliptic curve key is on a curve this crate can't decode,
    /// or does not name its curve.
    #[error("unsupported elliptic curve: {}", fmt_curve(.0))]
    UnsupportedCurve(Option<ObjectIdentifier>),
}

fn fmt_curve(curve: &Option<ObjectIdentifier>) -> String {
    match curve {
        Some(oid) => oid.to_string(),
        None => "no named curve".to_owned(),
    }
}
