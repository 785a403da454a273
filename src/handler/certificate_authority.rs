use serde_json::{Map, Value};

use super::RequestHandler;
use crate::config::ServerConfig;
use crate::error::{Result, SignError};
use crate::key::KeyPair;

/// Returns the contents of the configured CA bundle file.
pub struct CertificateAuthorityHandler;

impl RequestHandler for CertificateAuthorityHandler {
    fn operation(&self) -> &'static str {
        "certificateAuthority"
    }

    fn handle(
        &self,
        _private_key: &KeyPair,
        config: &ServerConfig,
        _input: &Map<String, Value>,
    ) -> Result<Value> {
        let bundle = std::fs::read_to_string(&config.ca_file).map_err(|e| {
            SignError::Io(format!("cannot read {}: {e}", config.ca_file.display()))
        })?;
        Ok(Value::String(bundle))
    }
}
