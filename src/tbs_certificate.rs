use der::Encode;
use der::asn1::BitString;
use x509_cert::Version;
use x509_cert::certificate::{CertificateInner, TbsCertificateInner};
use x509_cert::serial_number::SerialNumber;
use x509_cert::time::Validity;

use crate::cert::params::{DistinguishedName, ExtensionParam};
use crate::cert::{Certificate, SignatureAlgorithm};
use crate::error::{Result, SignError};
use crate::key::{KeyPair, PublicKey};

/// Represents the "To Be Signed" (TBS) portion of an X.509 certificate.
/// This struct contains all the fields required to generate a valid X.509 certificate.
///
/// # Fields
/// * `serial_number` - The unique identifier for the certificate.
/// * `signature_algorithm` - The algorithm used to sign the certificate.
/// * `issuer` - The distinguished name of the certificate issuer.
/// * `validity` - The validity period, kept in its encoded time form.
/// * `subject` - The distinguished name of the certificate subject.
/// * `subject_public_key` - The public key of the certificate subject.
/// * `extensions` - Additional X.509 extensions for the certificate.
#[derive(Debug, Clone)]
pub struct TbsCertificate {
    pub serial_number: SerialNumber,
    pub signature_algorithm: SignatureAlgorithm,
    pub issuer: DistinguishedName,
    pub validity: Validity,
    pub subject: DistinguishedName,
    pub subject_public_key: PublicKey,
    pub extensions: Vec<ExtensionParam>,
}

impl TbsCertificate {
    /// Converts the `TbsCertificate` into a `TbsCertificateInner` for DER encoding.
    pub fn to_tbs_certificate_inner(&self) -> Result<TbsCertificateInner> {
        let extensions = self
            .extensions
            .iter()
            .map(ExtensionParam::to_x509)
            .collect::<Result<Vec<_>>>()?;

        Ok(TbsCertificateInner {
            version: Version::V3,
            serial_number: self.serial_number.clone(),
            signature: self.signature_algorithm.into(),
            issuer: self.issuer.to_name(),
            validity: self.validity,
            subject: self.subject.to_name(),
            subject_public_key_info: self.subject_public_key.to_spki()?,
            issuer_unique_id: None,
            subject_unique_id: None,
            extensions: (!extensions.is_empty()).then_some(extensions),
        })
    }

    /// Encodes the `TbsCertificate` into DER format.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        self.to_tbs_certificate_inner()?
            .to_der()
            .map_err(|e| SignError::EncodingError(e.to_string()))
    }

    /// Signs the TBS structure with `key`, whose algorithm must match
    /// `signature_algorithm`.
    pub fn sign(&self, key: &KeyPair) -> Result<Certificate> {
        if key.signature_algorithm() != self.signature_algorithm {
            return Err(SignError::CertificateSigning(format!(
                "a {} key cannot produce {:?} signatures",
                key.algorithm_name(),
                self.signature_algorithm
            )));
        }

        let tbs_certificate = self.to_tbs_certificate_inner()?;
        let tbs_der = tbs_certificate
            .to_der()
            .map_err(|e| SignError::EncodingError(e.to_string()))?;
        let signature = key.sign(&tbs_der)?;

        Ok(Certificate {
            inner: CertificateInner {
                signature_algorithm: tbs_certificate.signature.clone(),
                tbs_certificate,
                signature: BitString::from_bytes(&signature)?,
            },
        })
    }
}
