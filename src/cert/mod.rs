pub mod extensions;
pub mod params;

use der::{Decode, Encode, EncodePem};
use extensions::{BasicConstraints, ToAndFromX509Extension};
use params::{CertificateParams, DistinguishedName, ExtensionParam, Validity};
use serde_json::Value;
use time::OffsetDateTime;
use x509_cert::certificate::CertificateInner;

use crate::error::{Result, SignError};
use crate::issuer::Issuer;
use crate::key::{KeyPair, PublicKey};
use crate::pem_utils;
use crate::registry::ExtensionRegistry;

/// Represents the supported signature algorithms for certificates.
///
/// This enum provides a mapping to the corresponding OIDs for each algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    /// SHA-256 with RSA encryption.
    Sha256WithRSA,
    /// SHA-256 with ECDSA (P-256).
    Sha256WithECDSA,
    /// SHA-384 with ECDSA (P-384).
    Sha384WithECDSA,
    /// Pure Ed25519.
    Ed25519,
    /// DSA with SHA-256.
    Sha256WithDSA,
}

impl From<SignatureAlgorithm> for x509_cert::spki::AlgorithmIdentifierOwned {
    /// Converts a `SignatureAlgorithm` into an `AlgorithmIdentifierOwned`.
    ///
    /// RSA carries an explicit NULL parameter; the others omit parameters.
    fn from(value: SignatureAlgorithm) -> Self {
        let (oid, parameters) = match value {
            SignatureAlgorithm::Sha256WithRSA => (
                const_oid::db::rfc5912::SHA_256_WITH_RSA_ENCRYPTION,
                Some(der::Any::null()),
            ),
            SignatureAlgorithm::Sha256WithECDSA => (const_oid::db::rfc5912::ECDSA_WITH_SHA_256, None),
            SignatureAlgorithm::Sha384WithECDSA => (const_oid::db::rfc5912::ECDSA_WITH_SHA_384, None),
            SignatureAlgorithm::Ed25519 => (const_oid::db::rfc8410::ID_ED_25519, None),
            SignatureAlgorithm::Sha256WithDSA => (const_oid::db::rfc5912::DSA_WITH_SHA_256, None),
        };
        x509_cert::spki::AlgorithmIdentifierOwned { oid, parameters }
    }
}

/// Represents an X.509 certificate.
///
/// This struct provides methods to parse the certificate from and encode it
/// into DER or PEM, and read back the fields the issuer writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    /// The inner representation of the certificate.
    pub inner: CertificateInner,
}

impl Certificate {
    pub fn from_der(der: &[u8]) -> Result<Self> {
        Ok(Self {
            inner: CertificateInner::from_der(der)?,
        })
    }

    pub fn from_pem(pem: &str) -> Result<Self> {
        Self::from_encoded(pem)
    }

    /// Parses a `CERTIFICATE` PEM block or bare base64 DER.
    pub fn from_encoded(input: &str) -> Result<Self> {
        let der = pem_utils::decode_armored(input, "CERTIFICATE")?;
        Self::from_der(&der)
    }

    /// Encodes the certificate into DER format.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        self.inner
            .to_der()
            .map_err(|e| SignError::EncodingError(e.to_string()))
    }

    /// Encodes the certificate into PEM format.
    pub fn to_pem(&self) -> Result<String> {
        self.inner
            .to_pem(pkcs8::LineEnding::LF)
            .map_err(|e| SignError::EncodingError(e.to_string()))
    }

    /// Serial number in decimal.
    pub fn serial_number(&self) -> String {
        params::serial_to_decimal(&self.inner.tbs_certificate.serial_number)
    }

    pub fn issuer(&self) -> DistinguishedName {
        DistinguishedName::from_name(self.inner.tbs_certificate.issuer.clone())
    }

    pub fn subject(&self) -> DistinguishedName {
        DistinguishedName::from_name(self.inner.tbs_certificate.subject.clone())
    }

    pub fn not_before(&self) -> Result<OffsetDateTime> {
        params::from_x509_time(&self.inner.tbs_certificate.validity.not_before)
    }

    pub fn not_after(&self) -> Result<OffsetDateTime> {
        params::from_x509_time(&self.inner.tbs_certificate.validity.not_after)
    }

    pub fn public_key(&self) -> Result<PublicKey> {
        PublicKey::from_x509spki(&self.inner.tbs_certificate.subject_public_key_info)
    }

    /// Extensions in certificate order.
    pub fn extensions(&self) -> Vec<ExtensionParam> {
        self.inner
            .tbs_certificate
            .extensions
            .iter()
            .flatten()
            .map(ExtensionParam::from_x509)
            .collect()
    }

    pub fn extension(&self, oid: &const_oid::ObjectIdentifier) -> Option<ExtensionParam> {
        self.extensions().into_iter().find(|ext| ext.oid == *oid)
    }

    /// Decodes the extension registered as `identifier` through its schema.
    ///
    /// Returns `Ok(None)` when the identifier is unknown to `registry` or the
    /// certificate does not carry the extension.
    pub fn extension_value(
        &self,
        registry: &ExtensionRegistry,
        identifier: &str,
    ) -> Result<Option<Value>> {
        let Some(oid) = registry.oid(identifier) else {
            return Ok(None);
        };
        match self.extension(&oid) {
            Some(ext) => registry.decode(identifier, &ext.value).map(Some),
            None => Ok(None),
        }
    }

    /// Whether basicConstraints marks the certificate as a CA.
    pub fn is_ca(&self) -> bool {
        self.extension(&BasicConstraints::OID)
            .and_then(|ext| ext.to_extension::<BasicConstraints>().ok())
            .is_some_and(|bc| bc.is_ca)
    }

    /// Checks the certificate signature against `issuer_key`.
    pub fn verify(&self, issuer_key: &PublicKey) -> Result<()> {
        let tbs = self.inner.tbs_certificate.to_der()?;
        let signature = self.inner.signature.as_bytes().ok_or_else(|| {
            SignError::Verification("signature has unused bits".to_string())
        })?;
        issuer_key.verify(&tbs, signature)
    }

    /// Creates a self-signed CA certificate for `subject`.
    ///
    /// # Arguments
    /// * `key` - The key pair that both certifies and signs.
    /// * `subject` - Used as issuer and subject.
    /// * `validity` - The validity period of the certificate.
    pub fn new_self_signed(
        key: &KeyPair,
        subject: &DistinguishedName,
        validity: &Validity,
    ) -> Result<Self> {
        let params = CertificateParams::builder()
            .issuer(subject.clone())
            .subject(subject.clone())
            .not_before(validity.not_before.into())
            .not_after(validity.not_after.into())
            .build();
        Issuer::default().issue(key, &key.public_key(), &params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cert::extensions::SubjectKeyIdentifier;

    #[test]
    fn test_self_signed_round_trip() {
        let key = KeyPair::generate_ecdsa_p256();
        let dn = DistinguishedName::from_attributes([("CN", "Root"), ("O", "Example")]).unwrap();
        let cert = Certificate::new_self_signed(&key, &dn, &Validity::for_days(30)).unwrap();

        let parsed = Certificate::from_pem(&cert.to_pem().unwrap()).unwrap();
        assert_eq!(parsed, cert);
        assert_eq!(parsed.issuer(), dn);
        assert_eq!(parsed.subject(), dn);
        assert!(parsed.is_ca());
        assert_eq!(parsed.public_key().unwrap(), key.public_key());
        parsed.verify(&key.public_key()).unwrap();

        let ski = parsed
            .extension(&SubjectKeyIdentifier::OID)
            .unwrap()
            .to_extension::<SubjectKeyIdentifier>()
            .unwrap();
        assert_eq!(ski.0, key.public_key().key_identifier().unwrap());
    }

    #[test]
    fn test_from_encoded_accepts_bare_base64() {
        let key = KeyPair::generate_ed25519();
        let dn = DistinguishedName::from_attributes([("CN", "Bare")]).unwrap();
        let cert = Certificate::new_self_signed(&key, &dn, &Validity::for_days(1)).unwrap();

        let pem = cert.to_pem().unwrap();
        let body: String = pem.lines().filter(|line| !line.starts_with("-----")).collect();
        let parsed = Certificate::from_encoded(&body).unwrap();
        assert_eq!(parsed.serial_number(), cert.serial_number());
        assert!(Certificate::from_encoded("foobar").is_err());
    }

    #[test]
    fn test_verify_rejects_other_key() {
        let key = KeyPair::generate_ecdsa_p256();
        let dn = DistinguishedName::from_attributes([("CN", "Root")]).unwrap();
        let cert = Certificate::new_self_signed(&key, &dn, &Validity::for_days(1)).unwrap();
        let other = KeyPair::generate_ecdsa_p256().public_key();
        assert!(matches!(cert.verify(&other), Err(SignError::Verification(_))));
    }
}
