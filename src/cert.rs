//! PEM encoded X.509 certificates
//!
//! Certificates are decoded with [`x509_cert`], and keep the DER they were
//! decoded from so that marshaling reproduces the original document exactly.
//!
//! ```
//! # fn main() -> pkiutil::Result<()> {
//! let pem = include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/isrg-root-x2.pem"));
//! let cert = pkiutil::cert::parse_certificate(pem)?;
//! assert_eq!(pkiutil::cert::marshal_certificate(&cert)?, pem);
//! # Ok(())
//! # }
//! ```

use std::io::Write;
use std::ops::Deref;

use der::{Decode, Encode};
use pem_rfc7468::PemLabel;

use crate::errors::{DecodeError, PkiError};
use crate::pem;

const PEM_TAG_CERTIFICATE: &str = x509_cert::Certificate::PEM_LABEL;

/// An X.509 certificate, along with the DER encoding it was decoded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    inner: x509_cert::Certificate,
    der: Box<[u8]>,
}

impl Certificate {
    /// Decode a certificate from ASN.1 DER.
    pub fn from_der(der: &[u8]) -> Result<Self, der::Error> {
        Ok(Certificate {
            inner: x509_cert::Certificate::from_der(der)?,
            der: der.into(),
        })
    }

    /// The DER encoding of this certificate.
    pub fn as_der(&self) -> &[u8] {
        &self.der
    }

    /// The distinguished name of the certificate subject.
    pub fn subject(&self) -> &x509_cert::name::Name {
        &self.inner.tbs_certificate.subject
    }

    /// The distinguished name of the certificate issuer.
    pub fn issuer(&self) -> &x509_cert::name::Name {
        &self.inner.tbs_certificate.issuer
    }

    /// Discard the retained DER and return the decoded certificate.
    pub fn into_inner(self) -> x509_cert::Certificate {
        self.inner
    }
}

impl Deref for Certificate {
    type Target = x509_cert::Certificate;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl AsRef<[u8]> for Certificate {
    fn as_ref(&self) -> &[u8] {
        &self.der
    }
}

impl TryFrom<x509_cert::Certificate> for Certificate {
    type Error = der::Error;

    fn try_from(value: x509_cert::Certificate) -> Result<Self, Self::Error> {
        let der = value.to_der()?;
        Ok(Certificate {
            inner: value,
            der: der.into_boxed_slice(),
        })
    }
}

impl From<Certificate> for x509_cert::Certificate {
    fn from(value: Certificate) -> Self {
        value.inner
    }
}

/// Parse the first PEM block in `data` as a certificate.
///
/// Anything after the first block is ignored.
pub fn parse_certificate(data: &[u8]) -> Result<Certificate, PkiError> {
    let (block, _) = pem::decode(data).ok_or(PkiError::NoPemData)?;
    let der = block.into_contents(PEM_TAG_CERTIFICATE)?;

    Certificate::from_der(&der).map_err(|error| {
        tracing::debug!(%error, "certificate failed to decode");
        DecodeError::from(error).into()
    })
}

/// Parse concatenated PEM certificates, reading at most `limit` blocks.
///
/// Every block read must be a certificate, and the first failure aborts the
/// whole parse. Reading stops early when no further PEM block is found. It is
/// an error if no certificates were read, which is always the case when
/// `limit` is zero.
pub fn parse_certificates(data: &[u8], limit: usize) -> Result<Vec<Certificate>, PkiError> {
    let mut rest = data;
    let mut chain = Vec::new();

    for index in 0..limit {
        let Some((block, remaining)) = pem::decode(rest) else {
            break;
        };
        rest = remaining;

        let der = block.into_contents(PEM_TAG_CERTIFICATE)?;
        let cert = Certificate::from_der(&der).map_err(|error| {
            tracing::debug!(%index, %error, "certificate in chain failed to decode");
            PkiError::at(index, error.into())
        })?;
        chain.push(cert);
    }

    if chain.is_empty() {
        return Err(PkiError::NoCertificatesFound);
    }

    Ok(chain)
}

/// Encode a certificate as a PEM document and write it to `out`.
pub fn marshal_certificate_to<W>(out: &mut W, cert: &Certificate) -> Result<(), PkiError>
where
    W: Write + ?Sized,
{
    pem::encode(out, PEM_TAG_CERTIFICATE, cert.as_der())
}

/// Encode a certificate as a PEM document.
pub fn marshal_certificate(cert: &Certificate) -> Result<Vec<u8>, PkiError> {
    let mut buf = Vec::new();
    marshal_certificate_to(&mut buf, cert)?;
    Ok(buf)
}
