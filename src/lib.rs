#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![deny(missing_docs)]

pub mod cert;
pub mod csr;
pub mod errors;
pub mod key;
mod pem;

pub use errors::{DecodeError, PkiError};

#[cfg(feature = "ed25519")]
pub use ed25519_dalek;
#[cfg(feature = "p224")]
pub use p224;
pub use p256;
#[cfg(feature = "p384")]
pub use p384;
#[cfg(feature = "p521")]
pub use p521;
pub use pkcs8;
pub use rsa;
pub use x509_cert;

/// A result type which uses [`PkiError`] as the error type.
pub type Result<T> = ::std::result::Result<T, PkiError>;
