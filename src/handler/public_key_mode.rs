use serde_json::{Map, Value};

use super::RequestHandler;
use crate::config::ServerConfig;
use crate::error::Result;
use crate::key::KeyPair;

/// Reports the server key family: `RSA`, `EC` or `DSA`.
pub struct PublicKeyModeHandler;

impl RequestHandler for PublicKeyModeHandler {
    fn operation(&self) -> &'static str {
        "publicKeyMode"
    }

    fn handle(
        &self,
        private_key: &KeyPair,
        _config: &ServerConfig,
        _input: &Map<String, Value>,
    ) -> Result<Value> {
        let mode = private_key
            .public_key()
            .to_spki()
            .ok()
            .and_then(|spki| crate::key::KeyFamily::detect(&spki))
            .map_or("unknown", |family| family.as_str());
        Ok(Value::from(mode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reports_family() {
        let config = ServerConfig::default();
        let input = Map::new();
        let ec = KeyPair::generate_ed25519();
        assert_eq!(
            PublicKeyModeHandler.handle(&ec, &config, &input).unwrap(),
            Value::from("EC")
        );
        let dsa = KeyPair::decode(include_bytes!("../../tests/fixtures/dsa.pem"), None).unwrap();
        assert_eq!(
            PublicKeyModeHandler.handle(&dsa, &config, &input).unwrap(),
            Value::from("DSA")
        );
    }
}
