use const_oid::AssociatedOid;
use const_oid::db::DB;
use der::{Decode, Encode, asn1::OctetString, oid::ObjectIdentifier};
use serde_json::Value;

pub use der::flagset::FlagSet;
use x509_cert::ext::pkix::KeyUsage as X509KeyUsage;
pub use x509_cert::ext::pkix::KeyUsages;

use super::params::DistinguishedName;
use crate::error::SignError;

/// Trait for converting to and from X.509 extensions.
///
/// This trait provides methods to encode and decode X.509 extension values.
///
/// # Example
/// ```
/// use x509sign::cert::extensions::{BasicConstraints, ToAndFromX509Extension};
/// let bc = BasicConstraints { is_ca: true, max_path_length: Some(1) };
/// let encoded = bc.to_x509_extension_value().unwrap();
/// let decoded = BasicConstraints::from_x509_extension_value(&encoded).unwrap();
/// assert_eq!(decoded.max_path_length, Some(1));
/// ```
pub trait ToAndFromX509Extension {
    /// The Object Identifier (OID) for the extension.
    const OID: ObjectIdentifier;

    /// Encodes the extension into a DER-encoded byte vector.
    fn to_x509_extension_value(&self) -> Result<Vec<u8>, SignError>;

    /// Decodes the extension from a DER-encoded byte slice.
    fn from_x509_extension_value(extension: &[u8]) -> Result<Self, SignError>
    where
        Self: Sized;
}

/// Represents the Basic Constraints extension.
///
/// # Fields
/// * `is_ca` - Indicates if the certificate is a CA.
/// * `max_path_length` - The maximum number of intermediate CAs allowed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BasicConstraints {
    pub is_ca: bool,
    pub max_path_length: Option<u8>,
}

impl ToAndFromX509Extension for BasicConstraints {
    const OID: ObjectIdentifier = x509_cert::ext::pkix::BasicConstraints::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>, SignError> {
        let bc = x509_cert::ext::pkix::BasicConstraints {
            ca: self.is_ca,
            path_len_constraint: self.max_path_length,
        };

        Ok(bc.to_der()?)
    }

    fn from_x509_extension_value(der_bytes: &[u8]) -> Result<Self, SignError> {
        let bc = x509_cert::ext::pkix::BasicConstraints::from_der(der_bytes)?;
        Ok(Self {
            is_ca: bc.ca,
            max_path_length: bc.path_len_constraint,
        })
    }
}

/// Represents the Key Usage extension.
///
/// This extension defines the purpose of the key contained in the certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyUsage(pub FlagSet<KeyUsages>);

const KEY_USAGE_NAMES: [(&str, KeyUsages); 9] = [
    ("digitalSignature", KeyUsages::DigitalSignature),
    ("nonRepudiation", KeyUsages::NonRepudiation),
    ("keyEncipherment", KeyUsages::KeyEncipherment),
    ("dataEncipherment", KeyUsages::DataEncipherment),
    ("keyAgreement", KeyUsages::KeyAgreement),
    ("keyCertSign", KeyUsages::KeyCertSign),
    ("cRLSign", KeyUsages::CRLSign),
    ("encipherOnly", KeyUsages::EncipherOnly),
    ("decipherOnly", KeyUsages::DecipherOnly),
];

impl KeyUsage {
    /// Builds a key usage from RFC 5280 bit names such as `digitalSignature`.
    pub fn from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Result<Self, SignError> {
        let mut flags = FlagSet::empty();
        for name in names {
            let (_, flag) = KEY_USAGE_NAMES
                .iter()
                .find(|(known, _)| known.eq_ignore_ascii_case(name))
                .ok_or_else(|| SignError::InvalidInput(format!("Unknown key usage {name}")))?;
            flags |= *flag;
        }
        Ok(Self(flags))
    }

    /// The RFC 5280 names of the bits that are set.
    pub fn names(&self) -> Vec<&'static str> {
        KEY_USAGE_NAMES
            .iter()
            .filter(|(_, flag)| self.0.contains(*flag))
            .map(|(name, _)| *name)
            .collect()
    }
}

impl ToAndFromX509Extension for KeyUsage {
    const OID: ObjectIdentifier = <X509KeyUsage as AssociatedOid>::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>, SignError> {
        let ku = X509KeyUsage::from(self.0);
        Ok(ku.to_der()?)
    }

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self, SignError> {
        let ku = X509KeyUsage::from_der(extension)?;
        Ok(Self(ku.0))
    }
}

/// Represents the Extended Key Usage extension as a list of purpose OIDs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtendedKeyUsage {
    pub usage: Vec<ObjectIdentifier>,
}

impl ToAndFromX509Extension for ExtendedKeyUsage {
    const OID: ObjectIdentifier = x509_cert::ext::pkix::ExtendedKeyUsage::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>, SignError> {
        let eku = x509_cert::ext::pkix::ExtendedKeyUsage(self.usage.clone());
        Ok(eku.to_der()?)
    }

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self, SignError> {
        let eku = x509_cert::ext::pkix::ExtendedKeyUsage::from_der(extension)?;
        Ok(Self { usage: eku.0 })
    }
}

/// Represents the Authority Key Identifier (AKI) extension.
///
/// This extension identifies the public key corresponding to the private key used to sign the certificate.
///
/// # Fields
/// * `key_identifier` - The key identifier.
/// * `authority_cert_issuer` - The issuer's distinguished name, if known.
/// * `authority_cert_serial_number` - The issuer's certificate serial number, if known.
#[derive(Debug, Clone, Default)]
pub struct AuthorityKeyIdentifier {
    pub key_identifier: Vec<u8>,
    pub authority_cert_issuer: Option<DistinguishedName>,
    pub authority_cert_serial_number: Option<Vec<u8>>,
}

impl ToAndFromX509Extension for AuthorityKeyIdentifier {
    const OID: ObjectIdentifier = x509_cert::ext::pkix::AuthorityKeyIdentifier::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>, SignError> {
        use x509_cert::ext::pkix::name::GeneralName;

        let aki = x509_cert::ext::pkix::AuthorityKeyIdentifier {
            key_identifier: Some(OctetString::new(self.key_identifier.as_slice())?),
            authority_cert_issuer: self
                .authority_cert_issuer
                .as_ref()
                .map(|dn| vec![GeneralName::DirectoryName(dn.to_name())]),
            authority_cert_serial_number: self
                .authority_cert_serial_number
                .as_deref()
                .map(x509_cert::serial_number::SerialNumber::new)
                .transpose()?,
        };

        Ok(aki.to_der()?)
    }

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self, SignError> {
        use x509_cert::ext::pkix::name::GeneralName;

        let aki = x509_cert::ext::pkix::AuthorityKeyIdentifier::from_der(extension)?;

        let authority_cert_issuer = aki.authority_cert_issuer.as_ref().and_then(|names| {
            names.iter().find_map(|name| match name {
                GeneralName::DirectoryName(dn) => Some(DistinguishedName::from_name(dn.clone())),
                _ => None,
            })
        });

        Ok(Self {
            key_identifier: aki
                .key_identifier
                .map(|id| id.as_bytes().to_vec())
                .unwrap_or_default(),
            authority_cert_issuer,
            authority_cert_serial_number: aki
                .authority_cert_serial_number
                .map(|sn| sn.as_bytes().to_vec()),
        })
    }
}

/// Represents the Subject Key Identifier (SKI) extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectKeyIdentifier(pub Vec<u8>);

impl ToAndFromX509Extension for SubjectKeyIdentifier {
    const OID: ObjectIdentifier = x509_cert::ext::pkix::SubjectKeyIdentifier::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>, SignError> {
        let ski = x509_cert::ext::pkix::SubjectKeyIdentifier(OctetString::new(self.0.as_slice())?);
        Ok(ski.to_der()?)
    }

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self, SignError> {
        let ski = x509_cert::ext::pkix::SubjectKeyIdentifier::from_der(extension)?;
        Ok(Self(ski.0.as_bytes().to_vec()))
    }
}

/// Whether `oid` is a certificate extension defined by PKIX (`id-ce` or `id-pe`)
/// and known to the OID database.
pub fn is_standard_extension(oid: &ObjectIdentifier) -> bool {
    let dotted = oid.to_string();
    (dotted.starts_with("2.5.29.") || dotted.starts_with("1.3.6.1.5.5.7.1."))
        && DB.by_oid(oid).is_some()
}

/// Resolves a PKIX extension name such as `id-ce-basicConstraints`. The
/// `id-ce-` / `id-pe-` prefix may be left out.
pub fn standard_extension_oid(name: &str) -> Option<ObjectIdentifier> {
    [name.to_string(), format!("id-ce-{name}"), format!("id-pe-{name}")]
        .iter()
        .find_map(|candidate| DB.by_name(candidate).copied())
        .filter(is_standard_extension)
}

/// Encodes a JSON value for the standard extensions that have a natural JSON shape.
///
/// * basic constraints: `{"cA": true, "pathLenConstraint": 0}`
/// * key usage: `["digitalSignature", "keyCertSign"]`
/// * extended key usage: `["id-kp-serverAuth", "1.3.6.1.5.5.7.3.2"]`
///
/// Returns `Ok(None)` for any other extension.
pub fn standard_from_json(oid: ObjectIdentifier, value: &Value) -> Result<Option<Vec<u8>>, SignError> {
    let invalid = |what: &str| SignError::InvalidInput(format!("Invalid {what} value: {value}"));

    if oid == BasicConstraints::OID {
        let object = value.as_object().ok_or_else(|| invalid("basicConstraints"))?;
        let is_ca = object.get("cA").and_then(Value::as_bool).unwrap_or(false);
        let max_path_length = match object.get("pathLenConstraint") {
            None | Some(Value::Null) => None,
            Some(len) => Some(
                len.as_u64()
                    .and_then(|len| u8::try_from(len).ok())
                    .ok_or_else(|| invalid("pathLenConstraint"))?,
            ),
        };
        let bc = BasicConstraints {
            is_ca,
            max_path_length,
        };
        return bc.to_x509_extension_value().map(Some);
    }

    if oid == KeyUsage::OID {
        let names = string_list(value).ok_or_else(|| invalid("keyUsage"))?;
        return KeyUsage::from_names(names)?.to_x509_extension_value().map(Some);
    }

    if oid == ExtendedKeyUsage::OID {
        let names = string_list(value).ok_or_else(|| invalid("extKeyUsage"))?;
        let usage = names
            .into_iter()
            .map(|name| {
                DB.by_name(name)
                    .copied()
                    .or_else(|| ObjectIdentifier::new(name).ok())
                    .ok_or_else(|| invalid("extKeyUsage"))
            })
            .collect::<Result<Vec<_>, _>>()?;
        return ExtendedKeyUsage { usage }.to_x509_extension_value().map(Some);
    }

    Ok(None)
}

fn string_list(value: &Value) -> Option<Vec<&str>> {
    value.as_array()?.iter().map(Value::as_str).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_basic_constraints_encoding_decoding() {
        let original = BasicConstraints {
            is_ca: true,
            max_path_length: Some(3),
        };
        let encoded = original.to_x509_extension_value().unwrap();
        let decoded = BasicConstraints::from_x509_extension_value(&encoded).unwrap();
        assert_eq!(original, decoded);
    }

    #[test]
    fn test_authority_key_identifier_encoding_decoding() {
        let issuer = DistinguishedName::from_attributes([("commonName", "Test CA")]).unwrap();
        let original = AuthorityKeyIdentifier {
            key_identifier: vec![1, 2, 3, 4, 5],
            authority_cert_issuer: Some(issuer.clone()),
            authority_cert_serial_number: Some(vec![6, 7, 8, 9, 10]),
        };
        let encoded = original.to_x509_extension_value().unwrap();
        let decoded = AuthorityKeyIdentifier::from_x509_extension_value(&encoded).unwrap();
        assert_eq!(original.key_identifier, decoded.key_identifier);
        assert_eq!(Some(issuer), decoded.authority_cert_issuer);
        assert_eq!(
            original.authority_cert_serial_number,
            decoded.authority_cert_serial_number
        );
    }

    #[test]
    fn test_key_usage_names() {
        let usage = KeyUsage::from_names(["digitalSignature", "keyCertSign"]).unwrap();
        assert_eq!(
            usage,
            KeyUsage(KeyUsages::DigitalSignature | KeyUsages::KeyCertSign)
        );
        assert_eq!(usage.names(), vec!["digitalSignature", "keyCertSign"]);
        assert!(KeyUsage::from_names(["teleport"]).is_err());
    }

    #[test]
    fn test_standard_extension_lookup() {
        assert_eq!(
            standard_extension_oid("id-ce-basicConstraints"),
            Some(BasicConstraints::OID)
        );
        assert_eq!(standard_extension_oid("keyUsage"), Some(KeyUsage::OID));
        assert_eq!(standard_extension_oid("commonName"), None);
        assert_eq!(standard_extension_oid("custom-ext-1"), None);
        assert!(is_standard_extension(&KeyUsage::OID));
        assert!(!is_standard_extension(&ObjectIdentifier::new_unwrap(
            "2.16.840.1.101.3.4.2.99"
        )));
    }

    #[test]
    fn test_standard_from_json() {
        let encoded = standard_from_json(BasicConstraints::OID, &json!({"cA": true, "pathLenConstraint": 2}))
            .unwrap()
            .unwrap();
        let decoded = BasicConstraints::from_x509_extension_value(&encoded).unwrap();
        assert_eq!(decoded.max_path_length, Some(2));

        let encoded = standard_from_json(ExtendedKeyUsage::OID, &json!(["id-kp-serverAuth"]))
            .unwrap()
            .unwrap();
        let decoded = ExtendedKeyUsage::from_x509_extension_value(&encoded).unwrap();
        assert_eq!(decoded.usage, vec![const_oid::db::rfc5280::ID_KP_SERVER_AUTH]);

        assert!(
            standard_from_json(SubjectKeyIdentifier::OID, &json!("AQID"))
                .unwrap()
                .is_none()
        );
    }
}
