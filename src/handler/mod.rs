//! Request handlers, one per batch operation.

mod certificate_authority;
mod public_key;
mod public_key_mode;
mod signed_certificate;

pub use certificate_authority::CertificateAuthorityHandler;
pub use public_key::PublicKeyHandler;
pub use public_key_mode::PublicKeyModeHandler;
pub use signed_certificate::{
    CertificateData, SerialInput, SignedCertificateHandler, SignedCertificateRequest,
};

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::config::ServerConfig;
use crate::error::{Result, SignError};
use crate::key::KeyPair;

/// Trait for request handlers.
///
/// Each handler serves one operation name of a batch request. Handlers are
/// stateless; the server key and configuration are passed in on every call.
pub trait RequestHandler: Send + Sync {
    /// The operation name this handler answers to, e.g. `publicKey`.
    fn operation(&self) -> &'static str;

    /// Runs the operation for one batch entry.
    ///
    /// # Arguments
    /// * `private_key` - The server key.
    /// * `config` - Server configuration.
    /// * `input` - The entry's input object.
    fn handle(
        &self,
        private_key: &KeyPair,
        config: &ServerConfig,
        input: &Map<String, Value>,
    ) -> Result<Value>;
}

/// All handlers the server dispatches to by default.
pub fn default_handlers() -> Vec<Box<dyn RequestHandler>> {
    vec![
        Box::new(CertificateAuthorityHandler),
        Box::new(PublicKeyHandler),
        Box::new(PublicKeyModeHandler),
        Box::new(SignedCertificateHandler),
    ]
}

/// Deserializes an input object into a typed request.
fn parse_input<T: DeserializeOwned>(input: &Map<String, Value>) -> Result<T> {
    serde_json::from_value(Value::Object(input.clone()))
        .map_err(|e| SignError::InvalidInput(e.to_string()))
}
