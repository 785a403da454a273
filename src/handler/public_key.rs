use serde::Deserialize;
use serde_json::{Map, Value};

use super::{RequestHandler, parse_input};
use crate::config::ServerConfig;
use crate::error::Result;
use crate::key::{KeyFormat, KeyPair};

/// Returns the server public key, PKCS#8 PEM unless `format` says otherwise.
pub struct PublicKeyHandler;

#[derive(Debug, Default, Deserialize)]
struct PublicKeyRequest {
    format: Option<String>,
}

impl RequestHandler for PublicKeyHandler {
    fn operation(&self) -> &'static str {
        "publicKey"
    }

    fn handle(
        &self,
        private_key: &KeyPair,
        _config: &ServerConfig,
        input: &Map<String, Value>,
    ) -> Result<Value> {
        let request: PublicKeyRequest = parse_input(input)?;
        let format = match request.format.as_deref() {
            Some(name) => name.parse()?,
            None => KeyFormat::default(),
        };
        Ok(Value::String(private_key.public_key().export(format)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SignError;
    use serde_json::json;

    fn run(key: &KeyPair, input: Value) -> Result<Value> {
        PublicKeyHandler.handle(
            key,
            &ServerConfig::default(),
            input.as_object().unwrap(),
        )
    }

    #[test]
    fn test_default_format_is_pkcs8() {
        let key = KeyPair::generate_ecdsa_p256();
        let pem = run(&key, json!({})).unwrap();
        assert!(
            pem.as_str()
                .unwrap()
                .starts_with("-----BEGIN PUBLIC KEY-----\n")
        );
    }

    #[test]
    fn test_openssh_format() {
        let key = KeyPair::generate_ed25519();
        let line = run(&key, json!({"format": "OpenSSH"})).unwrap();
        assert!(line.as_str().unwrap().starts_with("ssh-ed25519 "));
    }

    #[test]
    fn test_unknown_format() {
        let key = KeyPair::generate_ecdsa_p256();
        assert!(matches!(
            run(&key, json!({"format": "PuTTY"})),
            Err(SignError::UnsupportedFormat(_))
        ));
    }
}
