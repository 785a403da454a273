use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use const_oid::ObjectIdentifier;
use der::Decode;
use der::asn1::AnyRef;
use der::flagset::FlagSet;
use serde_json::Value;
use time::OffsetDateTime;

use crate::cert::Certificate;
use crate::cert::extensions::{
    AuthorityKeyIdentifier, BasicConstraints, KeyUsage, KeyUsages, SubjectKeyIdentifier,
    ToAndFromX509Extension, is_standard_extension, standard_extension_oid, standard_from_json,
};
use crate::cert::params::{
    CertificateParams, DistinguishedName, ExtensionParam, ExtensionRequest, ExtensionValue,
    Validity, parse_serial, random_serial, serial_to_decimal,
};
use crate::error::{Result, SignError};
use crate::key::{KeyPair, PublicKey};
use crate::registry::{ExtensionDefinition, ExtensionRegistry, is_dotted_oid};
use crate::tbs_certificate::TbsCertificate;

/// Whether issued certificates are marked as certificate authorities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CaPolicy {
    /// basicConstraints `cA=TRUE`, keyUsage gains keyCertSign and cRLSign.
    #[default]
    Authority,
    /// basicConstraints `cA=FALSE`, keyCertSign and cRLSign are removed.
    EndEntity,
}

impl FromStr for CaPolicy {
    type Err = SignError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "1" | "true" | "yes" | "on" | "ca" | "authority" => Ok(Self::Authority),
            "0" | "false" | "no" | "off" | "leaf" | "end-entity" | "endentity" => {
                Ok(Self::EndEntity)
            }
            other => Err(SignError::Config(format!("unknown CA policy {other:?}"))),
        }
    }
}

impl fmt::Display for CaPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Authority => "authority",
            Self::EndEntity => "end-entity",
        })
    }
}

/// Builds and signs certificates with a registry of known extensions.
///
/// Certificates are either issued from explicit fields ([`Issuer::issue`]) or
/// re-signed from an existing certificate for a new subject key
/// ([`Issuer::reissue`]). Either way the issuer key signs, an
/// authorityKeyIdentifier is written for it, a subjectKeyIdentifier is
/// added when absent and the [`CaPolicy`] is enforced.
#[derive(Debug, Clone, Default)]
pub struct Issuer {
    registry: ExtensionRegistry,
    ca_policy: CaPolicy,
}

impl Issuer {
    pub fn new(ca_policy: CaPolicy) -> Self {
        Self {
            registry: ExtensionRegistry::new(),
            ca_policy,
        }
    }

    pub fn registry(&self) -> &ExtensionRegistry {
        &self.registry
    }

    pub fn ca_policy(&self) -> CaPolicy {
        self.ca_policy
    }

    pub fn load_extensions(&mut self, definitions: impl IntoIterator<Item = ExtensionDefinition>) {
        self.registry.register(definitions);
    }

    /// Registers definitions in the `[[identifier, oid, schema], ...]` format.
    pub fn load_extensions_json(&mut self, json: &str) -> Result<()> {
        self.registry.register_json(json)
    }

    /// Issues a certificate for `subject_key` from explicit fields.
    pub fn issue(
        &self,
        issuer_key: &KeyPair,
        subject_key: &PublicKey,
        params: &CertificateParams,
    ) -> Result<Certificate> {
        if params.issuer.is_empty() {
            return Err(SignError::CertificateSigning(
                "the issuer distinguished name is empty".to_string(),
            ));
        }
        if params.subject.is_empty() {
            return Err(SignError::CertificateSigning(
                "the subject distinguished name is empty".to_string(),
            ));
        }

        let serial_number = match params.serial_number.as_deref() {
            Some(decimal) => parse_serial(decimal)?,
            None => random_serial()?,
        };
        let validity = Validity::from_bounds(
            params.not_before.as_ref(),
            params.not_after.as_ref(),
            OffsetDateTime::now_utc(),
        )?;

        let mut extensions = Vec::new();
        for request in &params.extensions {
            if let Some(extension) = self.resolve(request)? {
                upsert(&mut extensions, extension);
            }
        }

        self.sign(
            issuer_key,
            subject_key,
            TbsCertificate {
                serial_number,
                signature_algorithm: issuer_key.signature_algorithm(),
                issuer: params.issuer.clone(),
                validity: validity.to_x509()?,
                subject: params.subject.clone(),
                subject_public_key: subject_key.clone(),
                extensions,
            },
        )
    }

    /// Re-signs `original` for `subject_key` under `issuer_key`.
    ///
    /// Issuer, subject, serial number and validity are copied verbatim.
    /// Extensions survive when registered or defined by PKIX; the key
    /// identifiers are recomputed. `overrides` are applied on top.
    pub fn reissue(
        &self,
        issuer_key: &KeyPair,
        subject_key: &PublicKey,
        original: &Certificate,
        overrides: &[ExtensionRequest],
    ) -> Result<Certificate> {
        let tbs = &original.inner.tbs_certificate;

        let mut extensions: Vec<ExtensionParam> = original
            .extensions()
            .into_iter()
            .filter(|ext| {
                ext.oid != AuthorityKeyIdentifier::OID && ext.oid != SubjectKeyIdentifier::OID
            })
            .filter(|ext| {
                let keep = self.registry.identify(&ext.oid).is_some()
                    || is_standard_extension(&ext.oid);
                if !keep {
                    log::debug!("dropping unrecognized extension {}", ext.oid);
                }
                keep
            })
            .collect();
        for request in overrides {
            if let Some(extension) = self.resolve(request)? {
                upsert(&mut extensions, extension);
            }
        }

        self.sign(
            issuer_key,
            subject_key,
            TbsCertificate {
                serial_number: tbs.serial_number.clone(),
                signature_algorithm: issuer_key.signature_algorithm(),
                issuer: original.issuer(),
                validity: tbs.validity,
                subject: original.subject(),
                subject_public_key: subject_key.clone(),
                extensions,
            },
        )
    }

    fn sign(
        &self,
        issuer_key: &KeyPair,
        subject_key: &PublicKey,
        mut tbs: TbsCertificate,
    ) -> Result<Certificate> {
        self.apply_ca_policy(&mut tbs.extensions)?;

        let authority_key_id = AuthorityKeyIdentifier {
            key_identifier: issuer_key.public_key().key_identifier()?,
            authority_cert_issuer: None,
            authority_cert_serial_number: None,
        };
        upsert(
            &mut tbs.extensions,
            ExtensionParam::from_extension(&authority_key_id, false)?,
        );
        if !tbs
            .extensions
            .iter()
            .any(|ext| ext.oid == SubjectKeyIdentifier::OID)
        {
            let subject_key_id = SubjectKeyIdentifier(subject_key.key_identifier()?);
            tbs.extensions
                .push(ExtensionParam::from_extension(&subject_key_id, false)?);
        }

        let certificate = tbs.sign(issuer_key)?;
        log::info!(
            "issued certificate serial {} for {} signed by {}",
            serial_to_decimal(&tbs.serial_number),
            display_dn(&tbs.subject),
            display_dn(&tbs.issuer),
        );
        Ok(certificate)
    }

    fn apply_ca_policy(&self, extensions: &mut Vec<ExtensionParam>) -> Result<()> {
        let existing_bc = find::<BasicConstraints>(extensions)?;
        let existing_ku = find::<KeyUsage>(extensions)?;
        let authority_bits: FlagSet<KeyUsages> = KeyUsages::KeyCertSign | KeyUsages::CRLSign;

        match self.ca_policy {
            CaPolicy::Authority => {
                let basic_constraints = BasicConstraints {
                    is_ca: true,
                    max_path_length: existing_bc.and_then(|(bc, _)| bc.max_path_length),
                };
                upsert(
                    extensions,
                    ExtensionParam::from_extension(&basic_constraints, true)?,
                );

                let (KeyUsage(flags), critical) =
                    existing_ku.unwrap_or((KeyUsage(FlagSet::empty()), true));
                upsert(
                    extensions,
                    ExtensionParam::from_extension(&KeyUsage(flags | authority_bits), critical)?,
                );
            }
            CaPolicy::EndEntity => {
                let critical = existing_bc.is_some_and(|(_, critical)| critical);
                upsert(
                    extensions,
                    ExtensionParam::from_extension(&BasicConstraints::default(), critical)?,
                );

                if let Some((KeyUsage(flags), critical)) = existing_ku {
                    let remaining = flags - authority_bits;
                    if remaining.is_empty() {
                        extensions.retain(|ext| ext.oid != KeyUsage::OID);
                    } else {
                        upsert(
                            extensions,
                            ExtensionParam::from_extension(&KeyUsage(remaining), critical)?,
                        );
                    }
                }
            }
        }
        Ok(())
    }

    /// Turns a requested extension into an encoded one, or `None` when the
    /// identifier is neither registered, a dotted OID, nor a PKIX name.
    fn resolve(&self, request: &ExtensionRequest) -> Result<Option<ExtensionParam>> {
        let id = request.id.as_str();
        let (oid, value) = if let Some(oid) = self.registry.oid(id) {
            let value = match &request.value {
                ExtensionValue::Der(der) => der.clone(),
                ExtensionValue::Json(json) => self.registry.encode(id, json)?,
            };
            (oid, value)
        } else if is_dotted_oid(id) {
            let oid = ObjectIdentifier::new(id)
                .map_err(|e| SignError::InvalidInput(format!("Invalid OID {id}: {e}")))?;
            (oid, raw_value(id, &request.value)?)
        } else if let Some(oid) = standard_extension_oid(id) {
            let value = match &request.value {
                ExtensionValue::Json(json) if !json.is_string() => standard_from_json(oid, json)?
                    .ok_or_else(|| {
                        SignError::InvalidInput(format!("{id} values must be base64 DER strings"))
                    })?,
                value => raw_value(id, value)?,
            };
            (oid, value)
        } else {
            log::debug!("dropping unregistered extension {id}");
            return Ok(None);
        };

        Ok(Some(ExtensionParam {
            oid,
            critical: request.critical,
            value,
        }))
    }
}

fn raw_value(id: &str, value: &ExtensionValue) -> Result<Vec<u8>> {
    let der = match value {
        ExtensionValue::Der(der) => der.clone(),
        ExtensionValue::Json(Value::String(encoded)) => STANDARD
            .decode(encoded.trim())
            .map_err(|e| SignError::InvalidInput(format!("{id}: {e}")))?,
        ExtensionValue::Json(other) => {
            return Err(SignError::InvalidInput(format!(
                "{id} is not registered, its value must be base64 DER, found {other}"
            )));
        }
    };
    AnyRef::from_der(&der)?;
    Ok(der)
}

fn find<E: ToAndFromX509Extension>(extensions: &[ExtensionParam]) -> Result<Option<(E, bool)>> {
    extensions
        .iter()
        .find(|ext| ext.oid == E::OID)
        .map(|ext| Ok((ext.to_extension::<E>()?, ext.critical)))
        .transpose()
}

/// Replaces the extension with the same OID in place, or appends.
fn upsert(extensions: &mut Vec<ExtensionParam>, extension: ExtensionParam) {
    match extensions.iter_mut().find(|ext| ext.oid == extension.oid) {
        Some(slot) => *slot = extension,
        None => extensions.push(extension),
    }
}

fn display_dn(dn: &DistinguishedName) -> String {
    let rendered = dn.to_string();
    if rendered.is_empty() {
        "<empty>".to_string()
    } else {
        rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dn(cn: &str) -> DistinguishedName {
        DistinguishedName::from_attributes([("CN", cn)]).unwrap()
    }

    fn params(extensions: Vec<ExtensionRequest>) -> CertificateParams {
        CertificateParams::builder()
            .issuer(dn("Issuer"))
            .subject(dn("Subject"))
            .serial_number("9256")
            .extensions(extensions)
            .build()
    }

    #[test]
    fn test_ca_policy_parsing() {
        assert_eq!("true".parse::<CaPolicy>().unwrap(), CaPolicy::Authority);
        assert_eq!("0".parse::<CaPolicy>().unwrap(), CaPolicy::EndEntity);
        assert_eq!("End-Entity".parse::<CaPolicy>().unwrap(), CaPolicy::EndEntity);
        assert!("maybe".parse::<CaPolicy>().is_err());
    }

    #[test]
    fn test_empty_dn_is_a_signing_error() {
        let key = KeyPair::generate_ecdsa_p256();
        let params = CertificateParams::builder()
            .issuer(DistinguishedName::default())
            .subject(dn("Subject"))
            .build();
        assert!(matches!(
            Issuer::default().issue(&key, &key.public_key(), &params),
            Err(SignError::CertificateSigning(_))
        ));
    }

    #[test]
    fn test_end_entity_policy_strips_authority_bits() {
        let key = KeyPair::generate_ecdsa_p256();
        let requested = vec![ExtensionRequest::json(
            "id-ce-keyUsage",
            json!(["digitalSignature", "keyCertSign"]),
        )];
        let cert = Issuer::new(CaPolicy::EndEntity)
            .issue(&key, &key.public_key(), &params(requested))
            .unwrap();
        assert!(!cert.is_ca());
        let usage = cert
            .extension(&KeyUsage::OID)
            .unwrap()
            .to_extension::<KeyUsage>()
            .unwrap();
        assert_eq!(usage.names(), vec!["digitalSignature"]);
    }

    #[test]
    fn test_authority_policy_keeps_path_length() {
        let key = KeyPair::generate_ed25519();
        let requested = vec![ExtensionRequest::json(
            "id-ce-basicConstraints",
            json!({"cA": false, "pathLenConstraint": 0}),
        )];
        let cert = Issuer::default()
            .issue(&key, &key.public_key(), &params(requested))
            .unwrap();
        let bc = cert.extension(&BasicConstraints::OID).unwrap();
        assert!(bc.critical);
        assert_eq!(
            bc.to_extension::<BasicConstraints>().unwrap(),
            BasicConstraints {
                is_ca: true,
                max_path_length: Some(0)
            }
        );
        let usage = cert
            .extension(&KeyUsage::OID)
            .unwrap()
            .to_extension::<KeyUsage>()
            .unwrap();
        assert_eq!(usage.names(), vec!["keyCertSign", "cRLSign"]);
    }

    #[test]
    fn test_unknown_identifiers_are_dropped() {
        let key = KeyPair::generate_ecdsa_p256();
        let requested = vec![ExtensionRequest::json("custom-ext-2", json!("ignored"))];
        let cert = Issuer::default()
            .issue(&key, &key.public_key(), &params(requested))
            .unwrap();
        let oids: Vec<ObjectIdentifier> = cert.extensions().iter().map(|ext| ext.oid).collect();
        assert_eq!(
            oids,
            vec![
                BasicConstraints::OID,
                KeyUsage::OID,
                AuthorityKeyIdentifier::OID,
                SubjectKeyIdentifier::OID
            ]
        );
    }

    #[test]
    fn test_numeric_oid_requires_der() {
        let key = KeyPair::generate_ecdsa_p256();
        let requested = vec![ExtensionRequest::json("1.2.3.4.5", json!({"not": "der"}))];
        assert!(matches!(
            Issuer::default().issue(&key, &key.public_key(), &params(requested)),
            Err(SignError::InvalidInput(_))
        ));

        let requested = vec![ExtensionRequest::json("1.2.3.4.5", json!("BQA="))];
        let cert = Issuer::default()
            .issue(&key, &key.public_key(), &params(requested))
            .unwrap();
        let ext = cert
            .extension(&ObjectIdentifier::new_unwrap("1.2.3.4.5"))
            .unwrap();
        assert_eq!(ext.value, vec![0x05, 0x00]);
    }
}
