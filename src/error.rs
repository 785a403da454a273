//! Error handling for x509sign.
//!
//! Every fallible operation in the crate returns [`SignError`]. The request
//! dispatcher turns these into the `error` string of a failed outcome, so the
//! `Display` text of each variant is what callers end up seeing.
//!
//! ```
//! use x509sign::error::SignError;
//!
//! let err = SignError::UnknownOperation("bogus".to_string());
//! assert_eq!(err.to_string(), "No handler for bogus request.");
//! ```

use thiserror::Error;

/// Represents errors that can occur while loading keys, issuing certificates
/// or dispatching requests.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignError {
    /// Key material could not be parsed, decrypted, or belongs to another family.
    #[error("Unable to load key: {0}")]
    KeyLoad(String),

    /// The requested key serialization is unknown or invalid for the key.
    #[error("Unsupported key format: {0}")]
    UnsupportedFormat(String),

    /// An extension definition has an empty identifier or a malformed OID.
    #[error("Invalid extension definition: {0}")]
    InvalidExtensionDefinition(String),

    /// Building or signing a certificate failed.
    #[error("{0}")]
    CertificateSigning(String),

    /// A batch entry names an operation with no registered handler.
    #[error("No handler for {0} request.")]
    UnknownOperation(String),

    /// Request data is structurally wrong.
    #[error("{0}")]
    InvalidInput(String),

    /// A signature did not verify.
    #[error("Signature verification failed: {0}")]
    Verification(String),

    /// Error during data encoding.
    #[error("Failed to encode data: {0}")]
    EncodingError(String),

    /// Error during data decoding.
    #[error("Failed to decode data: {0}")]
    DecodingError(String),

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem or stream failure.
    #[error("I/O error: {0}")]
    Io(String),
}

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, SignError>;

impl From<der::Error> for SignError {
    /// Converts a `der::Error` into a `SignError`.
    fn from(err: der::Error) -> Self {
        SignError::DecodingError(err.to_string())
    }
}

impl From<pkcs8::Error> for SignError {
    fn from(err: pkcs8::Error) -> Self {
        SignError::KeyLoad(err.to_string())
    }
}

impl From<pkcs8::spki::Error> for SignError {
    fn from(err: pkcs8::spki::Error) -> Self {
        SignError::KeyLoad(err.to_string())
    }
}

impl From<rsa::Error> for SignError {
    fn from(err: rsa::Error) -> Self {
        SignError::KeyLoad(format!("RSA: {err}"))
    }
}

impl From<pem::PemError> for SignError {
    fn from(err: pem::PemError) -> Self {
        SignError::DecodingError(err.to_string())
    }
}

impl From<serde_json::Error> for SignError {
    fn from(err: serde_json::Error) -> Self {
        SignError::InvalidInput(err.to_string())
    }
}

impl From<std::io::Error> for SignError {
    fn from(err: std::io::Error) -> Self {
        SignError::Io(err.to_string())
    }
}
