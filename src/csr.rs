//! PEM encoded PKCS#10 certificate signing requests

use std::io::Write;

use der::Decode;
use x509_cert::request::CertReq;

use crate::errors::{DecodeError, PkiError};
use crate::pem;

const PEM_TAG_CSR: &str = "CERTIFICATE REQUEST";

/// Parse the first PEM block in `data` as a certificate signing request.
pub fn parse_certificate_request(data: &[u8]) -> Result<CertReq, PkiError> {
    let (block, _) = pem::decode(data).ok_or(PkiError::NoPemData)?;
    let der = block.into_contents(PEM_TAG_CSR)?;

    CertReq::from_der(&der).map_err(|error| {
        tracing::debug!(%error, "certificate request failed to decode");
        DecodeError::from(error).into()
    })
}

/// Wrap an ASN.1 DER encoded certificate request in a PEM document, and
/// write it to `out`.
///
/// The request is not validated, callers which signed the request already
/// hold well formed DER.
pub fn marshal_certificate_request_to<W>(out: &mut W, der: &[u8]) -> Result<(), PkiError>
where
    W: Write + ?Sized,
{
    pem::encode(out, PEM_TAG_CSR, der)
}

/// Wrap an ASN.1 DER encoded certificate request in a PEM document.
pub fn marshal_certificate_request(der: &[u8]) -> Result<Vec<u8>, PkiError> {
    let mut buf = Vec::new();
    marshal_certificate_request_to(&mut buf, der)?;
    Ok(buf)
}

#[cfg(test)]
mod test {
    use der::Encode;

    use super::*;
    use crate::fixture;
    use crate::test::common_name;

    #[test]
    fn parse_certificate_request_subject() {
        let csr = parse_certificate_request(fixture!("rsa2048-test-csr.csr")).unwrap();

        assert_eq!(common_name(&csr.info.subject).as_deref(), Some("test"));
        assert_eq!(
            csr.info.public_key.algorithm.oid,
            const_oid::db::rfc5912::RSA_ENCRYPTION
        );
    }

    #[test]
    fn roundtrip_certificate_request() {
        let pem = fixture!("rsa2048-test-csr.csr");
        let csr = parse_certificate_request(pem).unwrap();
        let der = csr.to_der().unwrap();

        assert_eq!(marshal_certificate_request(&der).unwrap(), pem);

        let mut buf = Vec::new();
        marshal_certificate_request_to(&mut buf, &der).unwrap();
        assert_eq!(buf, pem);
    }

    #[test]
    fn marshal_does_not_validate() {
        let pem = marshal_certificate_request(b"not a request").unwrap();
        let text = String::from_utf8(pem).unwrap();

        assert!(text.starts_with("-----BEGIN CERTIFICATE REQUEST-----\n"));
        assert!(text.ends_with("-----END CERTIFICATE REQUEST-----\n"));

        let err = parse_certificate_request(text.as_bytes()).unwrap_err();
        assert!(err.is_decode(), "{err:?}");
    }

    #[test]
    fn parse_certificate_request_errors() {
        let err = parse_certificate_request(fixture!("empty")).unwrap_err();
        assert!(matches!(err, PkiError::NoPemData), "{err:?}");

        let err = parse_certificate_request(fixture!("isrg-root-x2.pem")).unwrap_err();
        assert!(
            matches!(&err, PkiError::UnexpectedBlockType(label) if label == "CERTIFICATE"),
            "{err:?}"
        );

        let err = parse_certificate_request(fixture!("rsa2048-test-csr-corrupted.csr")).unwrap_err();
        assert!(matches!(err, PkiError::Decode(DecodeError::Der(_))), "{err:?}");
    }
}
