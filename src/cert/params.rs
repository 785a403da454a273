use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use bon::Builder;
use const_oid::ObjectIdentifier;
use const_oid::db::DB;
use der::asn1::{
    Any, GeneralizedTime, Ia5StringRef, PrintableStringRef, SetOfVec, UtcTime, Utf8StringRef,
};
use der::{Tag, Tagged};
use rand_core::{OsRng, RngCore};
use regex::Regex;
use rsa::BigUint;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use time::format_description::well_known::{Rfc2822, Rfc3339};
use time::{Duration, OffsetDateTime, PrimitiveDateTime};
use x509_cert::attr::AttributeTypeAndValue;
use x509_cert::name::{Name, RelativeDistinguishedName};
use x509_cert::serial_number::SerialNumber;
use x509_cert::time::Time;

use super::extensions::ToAndFromX509Extension;
use crate::error::{Result, SignError};

/// Parameters for issuing a certificate from explicit fields.
///
/// # Fields
/// * `issuer` - The distinguished name written as the certificate issuer.
/// * `subject` - The distinguished name of the certificate subject.
/// * `serial_number` - Decimal serial; random when absent.
/// * `not_before` - Start of validity; the issuance instant when absent.
/// * `not_after` - End of validity; 9999-12-31T23:59:59Z when absent.
/// * `extensions` - Extension values, filtered through the issuer's registry.
#[derive(Clone, Debug, Builder)]
pub struct CertificateParams {
    pub issuer: DistinguishedName,
    pub subject: DistinguishedName,
    #[builder(into)]
    pub serial_number: Option<String>,
    pub not_before: Option<ValidityBound>,
    pub not_after: Option<ValidityBound>,
    #[builder(default)]
    pub extensions: Vec<ExtensionRequest>,
}

#[derive(Clone, Copy, Debug)]
enum StringKind {
    Utf8,
    Printable,
    Ia5,
}

struct AttributeType {
    name: &'static str,
    aliases: &'static [&'static str],
    oid: ObjectIdentifier,
    kind: StringKind,
}

const fn attribute(
    name: &'static str,
    aliases: &'static [&'static str],
    oid: &str,
    kind: StringKind,
) -> AttributeType {
    AttributeType {
        name,
        aliases,
        oid: ObjectIdentifier::new_unwrap(oid),
        kind,
    }
}

const ATTRIBUTES: [AttributeType; 14] = [
    attribute("commonName", &["CN"], "2.5.4.3", StringKind::Utf8),
    attribute("surname", &["SN"], "2.5.4.4", StringKind::Utf8),
    attribute("serialNumber", &[], "2.5.4.5", StringKind::Printable),
    attribute("countryName", &["C"], "2.5.4.6", StringKind::Printable),
    attribute("localityName", &["L"], "2.5.4.7", StringKind::Utf8),
    attribute("stateOrProvinceName", &["ST", "S"], "2.5.4.8", StringKind::Utf8),
    attribute("streetAddress", &["street"], "2.5.4.9", StringKind::Utf8),
    attribute("organizationName", &["O"], "2.5.4.10", StringKind::Utf8),
    attribute("organizationalUnitName", &["OU"], "2.5.4.11", StringKind::Utf8),
    attribute("title", &[], "2.5.4.12", StringKind::Utf8),
    attribute("givenName", &["GN"], "2.5.4.42", StringKind::Utf8),
    attribute(
        "emailAddress",
        &["E", "email"],
        "1.2.840.113549.1.9.1",
        StringKind::Ia5,
    ),
    attribute(
        "domainComponent",
        &["DC"],
        "0.9.2342.19200300.100.1.25",
        StringKind::Ia5,
    ),
    attribute("userId", &["UID"], "0.9.2342.19200300.100.1.1", StringKind::Utf8),
];

fn lookup_attribute(name: &str) -> Option<&'static AttributeType> {
    let name = name.trim();
    let name = name
        .get(..6)
        .filter(|prefix| prefix.eq_ignore_ascii_case("id-at-"))
        .map_or(name, |_| &name[6..]);
    ATTRIBUTES.iter().find(|known| {
        known.name.eq_ignore_ascii_case(name)
            || known.aliases.iter().any(|alias| alias.eq_ignore_ascii_case(name))
    })
}

/// A distinguished name (issuer or subject).
///
/// Names built from attributes put each attribute in its own RDN, in the
/// order given. Names read from an existing certificate are kept verbatim,
/// string types and multi-valued RDNs included, so re-encoding them is
/// byte-identical.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DistinguishedName(Name);

impl DistinguishedName {
    /// Builds a name from ordered `(attribute, value)` pairs.
    ///
    /// Attribute types accept the long form (`commonName`), the short form
    /// (`CN`) and the `id-at-` prefixed form. Unknown types are rejected.
    pub fn from_attributes<K, V>(attributes: impl IntoIterator<Item = (K, V)>) -> Result<Self>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut rdns = Vec::new();
        for (key, value) in attributes {
            let (key, value) = (key.as_ref(), value.as_ref());
            let known = lookup_attribute(key).ok_or_else(|| {
                SignError::InvalidInput(format!("Unknown distinguished name attribute {key}"))
            })?;
            let invalid = |e: der::Error| {
                SignError::InvalidInput(format!("Invalid value for {}: {e}", known.name))
            };
            let value = match known.kind {
                StringKind::Utf8 => Any::encode_from(&Utf8StringRef::new(value).map_err(invalid)?),
                StringKind::Printable => {
                    Any::encode_from(&PrintableStringRef::new(value).map_err(invalid)?)
                }
                StringKind::Ia5 => Any::encode_from(&Ia5StringRef::new(value).map_err(invalid)?),
            }
            .map_err(invalid)?;
            let atv = AttributeTypeAndValue {
                oid: known.oid,
                value,
            };
            rdns.push(RelativeDistinguishedName(SetOfVec::try_from(vec![atv])?));
        }
        Ok(Self(Name::from(rdns)))
    }

    /// Wraps an X.509 name without altering it.
    pub fn from_name(name: Name) -> Self {
        Self(name)
    }

    pub fn as_name(&self) -> &Name {
        &self.0
    }

    pub fn to_name(&self) -> Name {
        self.0.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.0.0.iter().all(|rdn| rdn.0.is_empty())
    }

    /// Reads the name back as ordered `(attribute, value)` pairs using long
    /// attribute names. Unknown attribute types are reported by their OID.
    pub fn attributes(&self) -> Vec<(String, String)> {
        self.0
            .0
            .iter()
            .flat_map(|rdn| rdn.0.iter())
            .map(|atv| (attribute_name(&atv.oid), attribute_value(&atv.value)))
            .collect()
    }

    /// First value of `attribute`, which may be given in any accepted form.
    pub fn get(&self, attribute: &str) -> Option<String> {
        let oid = lookup_attribute(attribute)?.oid;
        self.0
            .0
            .iter()
            .flat_map(|rdn| rdn.0.iter())
            .find(|atv| atv.oid == oid)
            .map(|atv| attribute_value(&atv.value))
    }
}

impl From<Name> for DistinguishedName {
    fn from(name: Name) -> Self {
        Self(name)
    }
}

impl fmt::Display for DistinguishedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<'de> Deserialize<'de> for DistinguishedName {
    /// Accepts a JSON object of attribute to string (or list of strings).
    /// `null` and the empty array stand for the empty name.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let attributes = match Value::deserialize(deserializer)? {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            Value::Array(items) if items.is_empty() => Map::new(),
            other => {
                return Err(D::Error::custom(format!(
                    "a distinguished name must be an object, found {other}"
                )));
            }
        };

        let mut pairs = Vec::with_capacity(attributes.len());
        for (key, value) in &attributes {
            match value {
                Value::String(text) => pairs.push((key.as_str(), text.as_str())),
                Value::Array(items) => {
                    for item in items {
                        let text = item.as_str().ok_or_else(|| {
                            D::Error::custom(format!("values of {key} must be strings"))
                        })?;
                        pairs.push((key.as_str(), text));
                    }
                }
                _ => return Err(D::Error::custom(format!("{key} must be a string"))),
            }
        }
        Self::from_attributes(pairs).map_err(D::Error::custom)
    }
}

fn attribute_name(oid: &ObjectIdentifier) -> String {
    ATTRIBUTES
        .iter()
        .find(|known| known.oid == *oid)
        .map(|known| known.name.to_string())
        .or_else(|| DB.by_oid(oid).map(str::to_string))
        .unwrap_or_else(|| oid.to_string())
}

fn attribute_value(value: &Any) -> String {
    match value.tag() {
        Tag::BmpString => {
            let units: Vec<u16> = value
                .value()
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        _ => String::from_utf8_lossy(value.value()).into_owned(),
    }
}

static RELATIVE_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([+-]?)\s*(\d+)\s*(second|sec|minute|min|hour|day|week)s?$")
        .expect("relative time pattern is valid")
});

/// One end of a validity window.
///
/// Parses RFC 3339 (`2030-01-01T00:00:00Z`), RFC 2822,
/// `YYYY-MM-DD HH:MM:SS` (UTC), `now`, or a relative offset such as
/// `+5 days`, `-1 day`, `1 hour` or `-30 minutes`. Relative offsets are
/// resolved against the issuance instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawBound")]
pub enum ValidityBound {
    Absolute(OffsetDateTime),
    Relative(Duration),
}

impl ValidityBound {
    /// Fails when a relative offset lands outside the representable range.
    pub fn resolve(&self, now: OffsetDateTime) -> Result<OffsetDateTime> {
        match self {
            Self::Absolute(at) => Ok(*at),
            Self::Relative(offset) => now.checked_add(*offset).ok_or_else(|| {
                SignError::InvalidInput(format!("Time offset {offset} is out of range"))
            }),
        }
    }
}

impl From<OffsetDateTime> for ValidityBound {
    fn from(at: OffsetDateTime) -> Self {
        Self::Absolute(at)
    }
}

impl From<Duration> for ValidityBound {
    fn from(offset: Duration) -> Self {
        Self::Relative(offset)
    }
}

impl FromStr for ValidityBound {
    type Err = SignError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("now") {
            return Ok(Self::Relative(Duration::ZERO));
        }

        if let Some(captures) = RELATIVE_TIME.captures(s) {
            let amount: i64 = captures[2]
                .parse()
                .map_err(|_| SignError::InvalidInput(format!("Invalid time offset {s}")))?;
            let amount = if &captures[1] == "-" { -amount } else { amount };
            let unit: i64 = match captures[3].to_ascii_lowercase().as_str() {
                "second" | "sec" => 1,
                "minute" | "min" => 60,
                "hour" => 3_600,
                "day" => 86_400,
                _ => 604_800,
            };
            let seconds = amount
                .checked_mul(unit)
                .ok_or_else(|| SignError::InvalidInput(format!("Time offset {s} is out of range")))?;
            return Ok(Self::Relative(Duration::seconds(seconds)));
        }

        if let Ok(at) = OffsetDateTime::parse(s, &Rfc3339) {
            return Ok(Self::Absolute(at));
        }
        if let Ok(at) = OffsetDateTime::parse(s, &Rfc2822) {
            return Ok(Self::Absolute(at));
        }
        let plain = time::format_description::parse("[year]-[month]-[day] [hour]:[minute]:[second]")
            .map_err(|e| SignError::InvalidInput(e.to_string()))?;
        if let Ok(at) = PrimitiveDateTime::parse(s, &plain) {
            return Ok(Self::Absolute(at.assume_utc()));
        }

        Err(SignError::InvalidInput(format!("Unrecognized date {s}")))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawBound {
    Text(String),
    Timestamp(i64),
}

impl TryFrom<RawBound> for ValidityBound {
    type Error = SignError;

    fn try_from(raw: RawBound) -> Result<Self> {
        match raw {
            RawBound::Text(text) => text.parse(),
            RawBound::Timestamp(seconds) => OffsetDateTime::from_unix_timestamp(seconds)
                .map(Self::Absolute)
                .map_err(|e| SignError::InvalidInput(e.to_string())),
        }
    }
}

/// Certificate validity period.
///
/// # Fields
/// * `not_before` - The start of the validity period.
/// * `not_after` - The end of the validity period.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Validity {
    pub not_before: OffsetDateTime,
    pub not_after: OffsetDateTime,
}

impl Validity {
    /// Creates a validity period starting now for the given number of days.
    pub fn for_days(days: i64) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            not_before: now,
            not_after: now + Duration::days(days),
        }
    }

    /// Resolves optional bounds against `now`. A missing start is `now`, a
    /// missing end is the RFC 5280 "no well-defined expiration" instant.
    pub fn from_bounds(
        not_before: Option<&ValidityBound>,
        not_after: Option<&ValidityBound>,
        now: OffsetDateTime,
    ) -> Result<Self> {
        let not_before = match not_before {
            Some(bound) => bound.resolve(now)?,
            None => now,
        };
        let not_after = match not_after {
            Some(bound) => bound.resolve(now)?,
            None => from_x509_time(&Time::INFINITY)?,
        };
        Ok(Self {
            not_before,
            not_after,
        })
    }

    pub fn to_x509(&self) -> Result<x509_cert::time::Validity> {
        Ok(x509_cert::time::Validity {
            not_before: to_x509_time(self.not_before)?,
            not_after: to_x509_time(self.not_after)?,
        })
    }
}

/// Encodes an instant as UTCTime before 2050 and GeneralizedTime from 2050 on,
/// truncated to whole seconds.
pub fn to_x509_time(at: OffsetDateTime) -> Result<Time> {
    let seconds = u64::try_from(at.unix_timestamp()).map_err(|_| {
        SignError::InvalidInput(format!("Certificate dates must not precede 1970: {at}"))
    })?;
    let since_epoch = std::time::Duration::from_secs(seconds);
    if at.year() < 2050 {
        Ok(Time::UtcTime(UtcTime::from_unix_duration(since_epoch)?))
    } else {
        Ok(Time::GeneralTime(GeneralizedTime::from_unix_duration(
            since_epoch,
        )?))
    }
}

pub fn from_x509_time(time: &Time) -> Result<OffsetDateTime> {
    let seconds = i64::try_from(time.to_unix_duration().as_secs())
        .map_err(|e| SignError::DecodingError(e.to_string()))?;
    OffsetDateTime::from_unix_timestamp(seconds).map_err(|e| SignError::DecodingError(e.to_string()))
}

/// Parses a decimal serial number string.
pub fn parse_serial(decimal: &str) -> Result<SerialNumber> {
    let decimal = decimal.trim();
    let invalid = || SignError::InvalidInput(format!("Invalid serial number {decimal}"));
    if decimal.is_empty() || !decimal.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let value = BigUint::parse_bytes(decimal.as_bytes(), 10).ok_or_else(invalid)?;
    SerialNumber::new(&value.to_bytes_be()).map_err(|_| invalid())
}

/// Renders a serial number in decimal.
pub fn serial_to_decimal(serial: &SerialNumber) -> String {
    BigUint::from_bytes_be(serial.as_bytes()).to_str_radix(10)
}

/// A random positive serial of at most 159 bits.
pub fn random_serial() -> Result<SerialNumber> {
    let mut bytes = [0u8; 20];
    OsRng.fill_bytes(&mut bytes);
    bytes[0] &= 0x7f;
    Ok(SerialNumber::new(&bytes)?)
}

/// The payload of a requested extension.
#[derive(Clone, Debug, PartialEq)]
pub enum ExtensionValue {
    /// Already DER-encoded `extnValue` contents, copied verbatim.
    Der(Vec<u8>),
    /// A JSON value to be encoded through the registered schema.
    Json(Value),
}

/// An extension as requested by a caller, before filtering and encoding.
#[derive(Clone, Debug, PartialEq)]
pub struct ExtensionRequest {
    pub id: String,
    pub critical: bool,
    pub value: ExtensionValue,
}

impl ExtensionRequest {
    pub fn json(id: impl Into<String>, value: Value) -> Self {
        Self {
            id: id.into(),
            critical: false,
            value: ExtensionValue::Json(value),
        }
    }

    pub fn der(id: impl Into<String>, value: Vec<u8>) -> Self {
        Self {
            id: id.into(),
            critical: false,
            value: ExtensionValue::Der(value),
        }
    }

    pub fn with_critical(mut self, critical: bool) -> Self {
        self.critical = critical;
        self
    }

    /// Reads a JSON object of identifier to value.
    ///
    /// A value that is an object holding a `value` key is read as
    /// `{"value": ..., "critical": bool}`; anything else is the bare value.
    pub fn from_json_map(map: &Map<String, Value>) -> Vec<Self> {
        map.iter()
            .map(|(id, value)| match value.as_object() {
                Some(wrapped) if wrapped.contains_key("value") => {
                    let critical = wrapped
                        .get("critical")
                        .and_then(Value::as_bool)
                        .unwrap_or(false);
                    let inner = wrapped.get("value").cloned().unwrap_or(Value::Null);
                    Self::json(id.clone(), inner).with_critical(critical)
                }
                _ => Self::json(id.clone(), value.clone()),
            })
            .collect()
    }
}

/// Represents an encoded X.509 extension.
///
/// # Fields
/// * `oid` - The object identifier of the extension.
/// * `critical` - Indicates if the extension is critical.
/// * `value` - The DER-encoded value of the extension.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtensionParam {
    pub oid: ObjectIdentifier,
    pub critical: bool,
    /// DER-encoded extension value
    pub value: Vec<u8>,
}

impl ExtensionParam {
    /// Creates an `ExtensionParam` from a specific extension.
    pub fn from_extension<E: ToAndFromX509Extension>(extension: &E, critical: bool) -> Result<Self> {
        Ok(Self {
            oid: E::OID,
            critical,
            value: extension.to_x509_extension_value()?,
        })
    }

    /// Decodes an `ExtensionParam` into a specific extension.
    pub fn to_extension<E: ToAndFromX509Extension>(&self) -> Result<E> {
        E::from_x509_extension_value(&self.value)
    }

    pub fn from_x509(extension: &x509_cert::ext::Extension) -> Self {
        Self {
            oid: extension.extn_id,
            critical: extension.critical,
            value: extension.extn_value.as_bytes().to_vec(),
        }
    }

    pub fn to_x509(&self) -> Result<x509_cert::ext::Extension> {
        Ok(x509_cert::ext::Extension {
            extn_id: self.oid,
            critical: self.critical,
            extn_value: der::asn1::OctetString::new(self.value.clone())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distinguished_name_round_trip() {
        let dn = DistinguishedName::from_attributes([
            ("countryName", "US"),
            ("stateOrProvinceName", "NY"),
            ("commonName", "Dream Team"),
            ("emailAddress", "dreamteam@any.org"),
        ])
        .unwrap();

        assert_eq!(
            dn.attributes(),
            vec![
                ("countryName".to_string(), "US".to_string()),
                ("stateOrProvinceName".to_string(), "NY".to_string()),
                ("commonName".to_string(), "Dream Team".to_string()),
                ("emailAddress".to_string(), "dreamteam@any.org".to_string()),
            ]
        );
        assert_eq!(dn.get("CN").as_deref(), Some("Dream Team"));
        assert_eq!(dn.get("id-at-countryName").as_deref(), Some("US"));
    }

    #[test]
    fn test_distinguished_name_string_types() {
        let dn = DistinguishedName::from_attributes([("C", "CH"), ("E", "a@b.c"), ("O", "Zürich")])
            .unwrap();
        let tags: Vec<Tag> = dn
            .as_name()
            .0
            .iter()
            .map(|rdn| rdn.0.iter().next().unwrap().value.tag())
            .collect();
        assert_eq!(tags, vec![Tag::PrintableString, Tag::Ia5String, Tag::Utf8String]);
    }

    #[test]
    fn test_distinguished_name_rejects_unknown_attribute() {
        let err = DistinguishedName::from_attributes([("favouriteColour", "blue")]).unwrap_err();
        assert!(matches!(err, SignError::InvalidInput(_)));
        assert!(DistinguishedName::from_attributes([("countryName", "not*printable")]).is_err());
    }

    #[test]
    fn test_distinguished_name_from_json_keeps_order() {
        let dn: DistinguishedName =
            serde_json::from_str(r#"{"O": "Proton", "CN": "Alan", "OU": ["A", "B"]}"#).unwrap();
        let keys: Vec<String> = dn.attributes().into_iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            vec![
                "organizationName",
                "commonName",
                "organizationalUnitName",
                "organizationalUnitName"
            ]
        );

        let empty: DistinguishedName = serde_json::from_str("[]").unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_relative_bounds() {
        let now = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        let start: ValidityBound = "-1 day".parse().unwrap();
        let end: ValidityBound = "+5 days".parse().unwrap();
        assert_eq!(
            end.resolve(now).unwrap() - start.resolve(now).unwrap(),
            Duration::hours(144)
        );
        assert_eq!(
            "30 minutes".parse::<ValidityBound>().unwrap(),
            ValidityBound::Relative(Duration::minutes(30))
        );
        assert_eq!(
            "now".parse::<ValidityBound>().unwrap().resolve(now).unwrap(),
            now
        );
        assert!("next tuesday".parse::<ValidityBound>().is_err());
    }

    #[test]
    fn test_oversized_offsets_are_rejected() {
        let now = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        assert!(matches!(
            "+9223372036854775807 weeks".parse::<ValidityBound>(),
            Err(SignError::InvalidInput(_))
        ));
        let far: ValidityBound = "+100000000 days".parse().unwrap();
        assert!(matches!(far.resolve(now), Err(SignError::InvalidInput(_))));
        assert!(Validity::from_bounds(None, Some(&far), now).is_err());
        assert!(Validity::from_bounds(Some(&far), None, now).is_err());
    }

    #[test]
    fn test_absolute_bounds() {
        let bound: ValidityBound = "2030-01-02T03:04:05Z".parse().unwrap();
        assert_eq!(
            bound,
            ValidityBound::Absolute(OffsetDateTime::from_unix_timestamp(1_893_553_445).unwrap())
        );
        let bound: ValidityBound = "2030-01-02 03:04:05".parse().unwrap();
        assert_eq!(bound.resolve(OffsetDateTime::now_utc()).unwrap().unix_timestamp(), 1_893_553_445);
        let bound: ValidityBound = serde_json::from_str("1893553445").unwrap();
        assert_eq!(bound.resolve(OffsetDateTime::now_utc()).unwrap().unix_timestamp(), 1_893_553_445);
    }

    #[test]
    fn test_time_encoding_switches_at_2050() {
        let before = OffsetDateTime::from_unix_timestamp(2_524_607_999).unwrap();
        assert!(matches!(to_x509_time(before).unwrap(), Time::UtcTime(_)));
        let after = OffsetDateTime::from_unix_timestamp(2_524_608_000).unwrap();
        assert!(matches!(to_x509_time(after).unwrap(), Time::GeneralTime(_)));
    }

    #[test]
    fn test_default_validity_never_expires() {
        let now = OffsetDateTime::now_utc();
        let validity = Validity::from_bounds(None, None, now).unwrap();
        assert_eq!(validity.not_before, now);
        assert_eq!(validity.to_x509().unwrap().not_after, Time::INFINITY);
    }

    #[test]
    fn test_serial_numbers() {
        let serial = parse_serial("9256").unwrap();
        assert_eq!(serial.as_bytes(), &[0x24, 0x28]);
        assert_eq!(serial_to_decimal(&serial), "9256");

        let big = "730750818665451459101842416358141509827966271487";
        assert_eq!(serial_to_decimal(&parse_serial(big).unwrap()), big);

        assert!(parse_serial("-4").is_err());
        assert!(parse_serial("0x10").is_err());
        assert!(serial_to_decimal(&random_serial().unwrap()).len() > 1);
    }

    #[test]
    fn test_extension_requests_from_json() {
        let map = serde_json::json!({
            "custom-ext-1": "Yub yub!",
            "id-ce-keyUsage": {"value": ["digitalSignature"], "critical": true}
        });
        let requests = ExtensionRequest::from_json_map(map.as_object().unwrap());
        assert_eq!(
            requests,
            vec![
                ExtensionRequest::json("custom-ext-1", Value::from("Yub yub!")),
                ExtensionRequest::json("id-ce-keyUsage", serde_json::json!(["digitalSignature"]))
                    .with_critical(true),
            ]
        );
    }
}
