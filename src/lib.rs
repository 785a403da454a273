//! # x509sign - A Certificate Re-signing Service
//!
//! x509sign re-issues X.509 certificates for a client-supplied public key,
//! signed by a server-held RSA, EC or DSA key. Requests arrive in batches: a
//! JSON object mapping operation names to inputs, answered by a JSON object
//! with one `{"success": …}` outcome per operation.
//!
//! ## Supported Key Types
//!
//! - **RSA**: PKCS#1 v1.5 signatures with SHA-256
//! - **EC**: NIST P-256, NIST P-384 and Ed25519
//! - **DSA**: FIPS 186 DSA with SHA-256
//!
//! Keys are read from PKCS#8 (plain or encrypted), PKCS#1, SEC1, SPKI and
//! OpenSSH encodings, as PEM or bare DER.
//!
//! ## Operations
//!
//! - `publicKey`: the server public key, in PKCS8 (default), PKCS1, OpenSSH or XML
//! - `publicKeyMode`: the server key family, `RSA`, `EC` or `DSA`
//! - `certificateAuthority`: the configured CA bundle
//! - `signedCertificate`: a certificate for the client key, either re-signed
//!   from an existing certificate or issued from explicit fields
//!
//! ## Quick Start
//!
//! ### Handling a Batch
//!
//! ```rust,no_run
//! use x509sign::{config::ServerConfig, key::KeyPair, server::Server};
//!
//! # fn main() -> Result<(), x509sign::error::SignError> {
//! let server = Server::new(Some(KeyPair::generate_ecdsa_p256()), ServerConfig::default())?;
//!
//! let mut response = Vec::new();
//! server.handle_body(r#"{"publicKeyMode": {}, "bogus": {}}"#, &mut response)?;
//! // {"publicKeyMode":{"success":true,"result":"EC"},
//! //  "bogus":{"success":false,"error":"No handler for bogus request."}}
//! # Ok(())
//! # }
//! ```
//!
//! ### Issuing a Certificate
//!
//! ```rust,no_run
//! use x509sign::{
//!     cert::params::{CertificateParams, DistinguishedName, ExtensionRequest},
//!     issuer::Issuer,
//!     key::KeyPair,
//! };
//! use serde_json::json;
//!
//! # fn main() -> Result<(), x509sign::error::SignError> {
//! let ca_key = KeyPair::generate_ecdsa_p256();
//! let client_key = KeyPair::generate_ed25519().public_key();
//!
//! let mut issuer = Issuer::default();
//! issuer.load_extensions_json(r#"[["custom-ext-1", "2.16.840.1.101.3.4.2.45", {"type": 4}]]"#)?;
//!
//! let params = CertificateParams::builder()
//!     .issuer(DistinguishedName::from_attributes([("CN", "Example CA")])?)
//!     .subject(DistinguishedName::from_attributes([("CN", "Bob")])?)
//!     .serial_number("9256")
//!     .not_before("-1 day".parse()?)
//!     .not_after("+5 days".parse()?)
//!     .extensions(vec![ExtensionRequest::json("custom-ext-1", json!("Yub yub!"))])
//!     .build();
//!
//! let certificate = issuer.issue(&ca_key, &client_key, &params)?;
//! println!("{}", certificate.to_pem()?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Every operation returns [`error::SignError`]. The dispatcher reports its
//! `Display` text as the `error` of a failed outcome:
//!
//! ```rust
//! use x509sign::{error::SignError, key::{KeyFamily, KeyPair}};
//!
//! match KeyPair::load(KeyFamily::Ec, b"invalid pem data", None) {
//!     Ok(_) => println!("Key loaded"),
//!     Err(SignError::KeyLoad(msg)) => println!("Failed to load key: {}", msg),
//!     Err(e) => println!("Other error: {}", e),
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`key`]: Key loading, generation, export, signing and verification
//! - [`registry`]: Custom extension definitions and their ASN.1 schemas
//! - [`issuer`]: Certificate issuing and re-signing
//! - [`cert`]: Certificate model, distinguished names, validity and extensions
//! - [`handler`]: The four batch operations
//! - [`server`]: Batch dispatch and response streaming
//! - [`config`]: Environment settings and server configuration
//! - [`error`]: Error types
//! - [`tbs_certificate`]: Low-level certificate structure manipulation

pub mod cert;
pub mod config;
pub mod error;
pub mod handler;
pub mod issuer;
pub mod key;
pub mod pem_utils;
pub mod registry;
pub mod server;
pub mod tbs_certificate;
