//! Batch request dispatch.
//!
//! A request body is a JSON object mapping operation names to input objects.
//! Every entry is handled on its own: a failure is reported in that entry's
//! outcome and never affects the others. The response is streamed as the
//! entries complete.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use serde_json::{Map, Value, json};

use crate::config::{ServerConfig, Settings};
use crate::error::{Result, SignError};
use crate::handler::{RequestHandler, default_handlers};
use crate::key::{DEFAULT_RSA_BITS, KeyPair};

/// The result of one batch entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(Value),
    Failure(String),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// `{"success": true, "result": …}` or `{"success": false, "error": "…"}`.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Success(result) => json!({"success": true, "result": result}),
            Self::Failure(error) => json!({"success": false, "error": error}),
        }
    }
}

impl From<Result<Value>> for Outcome {
    fn from(result: Result<Value>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(e) => Self::Failure(e.to_string()),
        }
    }
}

/// Dispatches batch entries to request handlers with the server key.
pub struct Server {
    private_key: KeyPair,
    config: ServerConfig,
    handlers: BTreeMap<&'static str, Box<dyn RequestHandler>>,
}

impl Server {
    /// Creates a server with the default handlers. Without a key, a fresh
    /// RSA key is generated.
    pub fn new(private_key: Option<KeyPair>, config: ServerConfig) -> Result<Self> {
        let private_key = match private_key {
            Some(key) => key,
            None => {
                log::warn!("no signature key configured, generating an ephemeral RSA key");
                KeyPair::generate_rsa(DEFAULT_RSA_BITS)?
            }
        };
        let mut server = Self {
            private_key,
            config,
            handlers: BTreeMap::new(),
        };
        for handler in default_handlers() {
            server.register_boxed(handler);
        }
        Ok(server)
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(settings.private_key()?, settings.server_config()?)
    }

    /// Reads settings from the environment and the cache in `storage`.
    pub fn from_env(storage: &Path) -> Result<Self> {
        Self::from_settings(&Settings::from_env(storage)?)
    }

    /// Registers a handler, replacing any handler for the same operation.
    pub fn register_handler<H: RequestHandler + 'static>(&mut self, handler: H) {
        self.register_boxed(Box::new(handler));
    }

    fn register_boxed(&mut self, handler: Box<dyn RequestHandler>) {
        log::debug!("registered handler for {}", handler.operation());
        self.handlers.insert(handler.operation(), handler);
    }

    pub fn private_key(&self) -> &KeyPair {
        &self.private_key
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn operations(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.handlers.keys().copied()
    }

    /// Runs one batch entry.
    pub fn request_response(&self, operation: &str, input: &Value) -> Outcome {
        let outcome = Outcome::from(self.execute(operation, input));
        if let Outcome::Failure(error) = &outcome {
            log::warn!("{operation} request failed: {error}");
        }
        outcome
    }

    fn execute(&self, operation: &str, input: &Value) -> Result<Value> {
        let handler = self
            .handlers
            .get(operation)
            .ok_or_else(|| SignError::UnknownOperation(operation.to_string()))?;

        let empty = Map::new();
        let input = match input {
            Value::Object(map) => map,
            Value::Array(items) if items.is_empty() => &empty,
            _ => {
                return Err(SignError::InvalidInput(
                    "Request data must be an object.".to_string(),
                ));
            }
        };

        log::debug!("handling {operation} request");
        handler.handle(&self.private_key, &self.config, input)
    }

    /// Response fragments in request order: the key of each entry followed
    /// by its outcome, comma separated. Wrapping them in `{` and `}` gives
    /// the complete response object.
    pub fn grouped_response<'a>(
        &'a self,
        requests: &'a Map<String, Value>,
    ) -> impl Iterator<Item = String> + 'a {
        requests
            .iter()
            .enumerate()
            .flat_map(move |(index, (operation, input))| {
                let separator = if index == 0 { "" } else { "," };
                let key = format!("{separator}{}:", Value::from(operation.as_str()));
                let outcome = self.request_response(operation, input).to_json().to_string();
                [key, outcome]
            })
    }

    /// Streams the response for `requests` to `out`.
    pub fn handle_requests(&self, requests: &Map<String, Value>, out: &mut impl Write) -> Result<()> {
        out.write_all(b"{")?;
        for fragment in self.grouped_response(requests) {
            out.write_all(fragment.as_bytes())?;
        }
        out.write_all(b"}")?;
        out.flush()?;
        Ok(())
    }

    /// Handles a raw request body. A body that is not a JSON object is an
    /// empty batch.
    pub fn handle_body(&self, body: &str, out: &mut impl Write) -> Result<()> {
        let requests = match serde_json::from_str(body) {
            Ok(Value::Object(requests)) => requests,
            _ => {
                log::debug!("request body is not a JSON object, treating it as empty");
                Map::new()
            }
        };
        self.handle_requests(&requests, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server() -> Server {
        Server::new(Some(KeyPair::generate_ecdsa_p256()), ServerConfig::default()).unwrap()
    }

    #[test]
    fn test_outcome_json() {
        assert_eq!(
            Outcome::Success(json!("EC")).to_json(),
            json!({"success": true, "result": "EC"})
        );
        assert_eq!(
            Outcome::from(Err(SignError::UnknownOperation("x".to_string()))).to_json(),
            json!({"success": false, "error": "No handler for x request."})
        );
    }

    #[test]
    fn test_input_must_be_an_object() {
        let server = server();
        assert_eq!(
            server.request_response("publicKeyMode", &json!("EC")),
            Outcome::Failure("Request data must be an object.".to_string())
        );
        assert_eq!(
            server.request_response("publicKeyMode", &json!([])),
            Outcome::Success(json!("EC"))
        );
    }

    #[test]
    fn test_grouped_response_fragments() {
        let server = server();
        let requests = json!({"publicKeyMode": {}, "bogus": {}});
        let fragments: Vec<String> = server
            .grouped_response(requests.as_object().unwrap())
            .collect();
        assert_eq!(
            fragments,
            vec![
                r#""publicKeyMode":"#.to_string(),
                r#"{"success":true,"result":"EC"}"#.to_string(),
                r#","bogus":"#.to_string(),
                r#"{"success":false,"error":"No handler for bogus request."}"#.to_string(),
            ]
        );
    }

    #[test]
    fn test_unparsable_body_is_empty_batch() {
        let mut out = Vec::new();
        server().handle_body("not json", &mut out).unwrap();
        assert_eq!(out, b"{}");
    }

    #[test]
    fn test_handlers_registered() {
        let operations: Vec<&str> = server().operations().collect();
        assert_eq!(
            operations,
            vec![
                "certificateAuthority",
                "publicKey",
                "publicKeyMode",
                "signedCertificate"
            ]
        );
    }
}
