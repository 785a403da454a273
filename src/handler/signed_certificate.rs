use serde::Deserialize;
use serde_json::{Map, Value};

use super::{RequestHandler, parse_input};
use crate::cert::Certificate;
use crate::cert::params::{CertificateParams, DistinguishedName, ExtensionRequest, ValidityBound};
use crate::config::ServerConfig;
use crate::error::{Result, SignError};
use crate::issuer::Issuer;
use crate::key::{KeyFamily, KeyPair, PublicKey};

const SIGNING_FAILED: &str = "Unable to sign the CSR.";

/// Issues a certificate for a client public key, signed by the server key.
///
/// The certificate content comes either from an existing certificate
/// (`certificate`, re-signed with its names, serial and validity intact) or
/// from explicit fields (`certificateData`).
pub struct SignedCertificateHandler;

/// Input of the `signedCertificate` operation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedCertificateRequest {
    /// Family of `client_public_key`; `EC` when absent.
    #[serde(default)]
    pub mode: Option<String>,
    pub client_public_key: String,
    #[serde(default)]
    pub certificate: Option<String>,
    #[serde(default)]
    pub certificate_data: Option<CertificateData>,
    /// Extension values applied on top of the certificate's own.
    #[serde(default)]
    pub extensions: Map<String, Value>,
}

/// Explicit certificate fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateData {
    #[serde(default)]
    pub serial_number: Option<SerialInput>,
    #[serde(rename = "issuerDN")]
    pub issuer_dn: DistinguishedName,
    #[serde(rename = "subjectDN")]
    pub subject_dn: DistinguishedName,
    #[serde(default)]
    pub not_before: Option<ValidityBound>,
    #[serde(default)]
    pub not_after: Option<ValidityBound>,
    #[serde(default)]
    pub extensions: Map<String, Value>,
}

/// Serial numbers may be sent as decimal strings or JSON numbers.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SerialInput {
    Decimal(String),
    Number(u64),
}

impl SerialInput {
    fn into_decimal(self) -> String {
        match self {
            Self::Decimal(decimal) => decimal,
            Self::Number(number) => number.to_string(),
        }
    }
}

impl SignedCertificateHandler {
    /// Issues the certificate described by `request` and returns its PEM.
    pub fn sign(
        &self,
        private_key: &KeyPair,
        config: &ServerConfig,
        request: SignedCertificateRequest,
    ) -> Result<String> {
        let family = match request.mode.as_deref() {
            Some(mode) => mode.parse()?,
            None => KeyFamily::default(),
        };
        let client_key = PublicKey::load(family, request.client_public_key.as_bytes())?;

        let mut issuer = Issuer::new(config.ca_policy);
        if let Some(definitions) = config.extensions.as_deref() {
            issuer.load_extensions_json(definitions)?;
        }
        let overrides = ExtensionRequest::from_json_map(&request.extensions);

        let issued = match (request.certificate, request.certificate_data) {
            (Some(certificate), None) => Certificate::from_encoded(&certificate)
                .and_then(|original| issuer.reissue(private_key, &client_key, &original, &overrides)),
            (None, Some(data)) => {
                let mut extensions = ExtensionRequest::from_json_map(&data.extensions);
                extensions.extend(overrides);
                let params = CertificateParams::builder()
                    .issuer(data.issuer_dn)
                    .subject(data.subject_dn)
                    .maybe_serial_number(data.serial_number.map(SerialInput::into_decimal))
                    .maybe_not_before(data.not_before)
                    .maybe_not_after(data.not_after)
                    .extensions(extensions)
                    .build();
                issuer.issue(private_key, &client_key, &params)
            }
            (Some(_), Some(_)) | (None, None) => {
                return Err(SignError::InvalidInput(
                    "Exactly one of certificate and certificateData is required.".to_string(),
                ));
            }
        };

        let certificate = issued.map_err(|e| {
            log::warn!("certificate signing failed: {e}");
            SignError::CertificateSigning(SIGNING_FAILED.to_string())
        })?;
        certificate.to_pem()
    }
}

impl RequestHandler for SignedCertificateHandler {
    fn operation(&self) -> &'static str {
        "signedCertificate"
    }

    fn handle(
        &self,
        private_key: &KeyPair,
        config: &ServerConfig,
        input: &Map<String, Value>,
    ) -> Result<Value> {
        let request = parse_input(input)?;
        self.sign(private_key, config, request).map(Value::String)
    }
}
