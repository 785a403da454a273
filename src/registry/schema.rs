//! A small ASN.1 schema language for custom certificate extensions.
//!
//! Schemas are written in JSON, for example a SEQUENCE of a BOOLEAN, an
//! INTEGER and an optional OCTET STRING:
//!
//! ```
//! use x509sign::registry::schema::Schema;
//! use serde_json::json;
//!
//! let schema = Schema::from_json(&json!({
//!     "type": 16,
//!     "children": {
//!         "cool": {"type": 1},
//!         "level": {"type": "integer"},
//!         "name": {"type": 4, "optional": true}
//!     }
//! }))
//! .unwrap();
//!
//! let der = schema.encode(&json!({"cool": true, "level": 73})).unwrap();
//! assert_eq!(schema.decode(&der).unwrap(), json!({"cool": true, "level": 73}));
//! ```

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use const_oid::ObjectIdentifier;
use const_oid::db::DB;
use der::asn1::{AnyRef, Ia5StringRef, Null, OctetStringRef, PrintableStringRef, Uint, UintRef, Utf8StringRef};
use der::{Decode, Encode, Reader, SliceReader, Tag, Tagged};
use rsa::BigUint;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{Result, SignError};

/// The ASN.1 types a schema node can describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsnType {
    Boolean,
    Integer,
    OctetString,
    Null,
    ObjectIdentifier,
    Enumerated,
    Utf8String,
    Sequence,
    PrintableString,
    Ia5String,
    /// Any DER element, carried as base64 in JSON.
    Any,
}

impl AsnType {
    /// Resolves a universal tag number or a type name. `-2` stands for ANY.
    pub fn from_json(value: &Value) -> Result<Self> {
        if let Some(number) = value.as_i64() {
            return match number {
                1 => Ok(Self::Boolean),
                2 => Ok(Self::Integer),
                4 => Ok(Self::OctetString),
                5 => Ok(Self::Null),
                6 => Ok(Self::ObjectIdentifier),
                10 => Ok(Self::Enumerated),
                12 => Ok(Self::Utf8String),
                16 => Ok(Self::Sequence),
                19 => Ok(Self::PrintableString),
                22 => Ok(Self::Ia5String),
                -2 => Ok(Self::Any),
                _ => Err(invalid_schema(format!("unsupported type {number}"))),
            };
        }

        let name = value
            .as_str()
            .ok_or_else(|| invalid_schema(format!("type must be a number or a name, found {value}")))?;
        match name.to_ascii_lowercase().as_str() {
            "boolean" => Ok(Self::Boolean),
            "integer" => Ok(Self::Integer),
            "octetstring" => Ok(Self::OctetString),
            "null" => Ok(Self::Null),
            "objectidentifier" | "oid" => Ok(Self::ObjectIdentifier),
            "enumerated" => Ok(Self::Enumerated),
            "utf8string" => Ok(Self::Utf8String),
            "sequence" => Ok(Self::Sequence),
            "printablestring" => Ok(Self::PrintableString),
            "ia5string" => Ok(Self::Ia5String),
            "any" => Ok(Self::Any),
            _ => Err(invalid_schema(format!("unsupported type {name}"))),
        }
    }

    /// The universal tag this type is encoded with; `None` for ANY.
    pub fn tag(&self) -> Option<Tag> {
        match self {
            Self::Boolean => Some(Tag::Boolean),
            Self::Integer => Some(Tag::Integer),
            Self::OctetString => Some(Tag::OctetString),
            Self::Null => Some(Tag::Null),
            Self::ObjectIdentifier => Some(Tag::ObjectIdentifier),
            Self::Enumerated => Some(Tag::Enumerated),
            Self::Utf8String => Some(Tag::Utf8String),
            Self::Sequence => Some(Tag::Sequence),
            Self::PrintableString => Some(Tag::PrintableString),
            Self::Ia5String => Some(Tag::Ia5String),
            Self::Any => None,
        }
    }
}

impl fmt::Display for AsnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tag() {
            Some(tag) => write!(f, "{tag}"),
            None => f.write_str("ANY"),
        }
    }
}

/// One node of an extension schema.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Value")]
pub struct Schema {
    pub kind: AsnType,
    /// Ordered named children, only meaningful for SEQUENCE.
    pub children: Vec<(String, Schema)>,
    pub optional: bool,
}

impl TryFrom<Value> for Schema {
    type Error = SignError;

    fn try_from(value: Value) -> Result<Self> {
        Self::from_json(&value)
    }
}

impl Schema {
    pub fn new(kind: AsnType) -> Self {
        Self {
            kind,
            children: Vec::new(),
            optional: false,
        }
    }

    /// Reads `{"type": T, "children": {...}, "optional": bool}`.
    pub fn from_json(value: &Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| invalid_schema(format!("a schema must be an object, found {value}")))?;
        let kind = AsnType::from_json(
            object
                .get("type")
                .ok_or_else(|| invalid_schema("missing type".to_string()))?,
        )?;

        let children = match object.get("children") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Object(children)) => children
                .iter()
                .map(|(name, child)| Ok((name.clone(), Self::from_json(child)?)))
                .collect::<Result<Vec<_>>>()?,
            Some(other) => {
                return Err(invalid_schema(format!("children must be an object, found {other}")));
            }
        };
        if kind != AsnType::Sequence && !children.is_empty() {
            return Err(invalid_schema(format!("{kind} cannot have children")));
        }

        Ok(Self {
            kind,
            children,
            optional: object.get("optional").and_then(Value::as_bool).unwrap_or(false),
        })
    }

    /// DER-encodes `value` according to this schema.
    pub fn encode(&self, value: &Value) -> Result<Vec<u8>> {
        let mismatch = || {
            SignError::InvalidInput(format!("Cannot encode {value} as {}", self.kind))
        };

        let der = match self.kind {
            AsnType::Boolean => value.as_bool().ok_or_else(mismatch)?.to_der()?,
            AsnType::Integer => encode_integer(value).ok_or_else(mismatch)??,
            AsnType::Enumerated => {
                let integer = encode_integer(value).ok_or_else(mismatch)??;
                let content = AnyRef::from_der(&integer)?.value().to_vec();
                der::Any::new(Tag::Enumerated, content)?.to_der()?
            }
            AsnType::OctetString => {
                let text = value.as_str().ok_or_else(mismatch)?;
                OctetStringRef::new(text.as_bytes())?.to_der()?
            }
            AsnType::Null => Null.to_der()?,
            AsnType::ObjectIdentifier => {
                let name = value.as_str().ok_or_else(mismatch)?;
                DB.by_name(name)
                    .copied()
                    .or_else(|| ObjectIdentifier::new(name).ok())
                    .ok_or_else(mismatch)?
                    .to_der()?
            }
            AsnType::Utf8String => Utf8StringRef::new(value.as_str().ok_or_else(mismatch)?)?.to_der()?,
            AsnType::PrintableString => {
                PrintableStringRef::new(value.as_str().ok_or_else(mismatch)?)?.to_der()?
            }
            AsnType::Ia5String => Ia5StringRef::new(value.as_str().ok_or_else(mismatch)?)?.to_der()?,
            AsnType::Sequence => {
                let fields = value.as_object().ok_or_else(mismatch)?;
                let mut content = Vec::new();
                for (name, child) in &self.children {
                    match fields.get(name) {
                        None | Some(Value::Null) if child.optional => {}
                        None | Some(Value::Null) => {
                            return Err(SignError::InvalidInput(format!(
                                "Missing required field {name}"
                            )));
                        }
                        Some(field) => content.extend(child.encode(field)?),
                    }
                }
                der::Any::new(Tag::Sequence, content)?.to_der()?
            }
            AsnType::Any => {
                let encoded = value.as_str().ok_or_else(mismatch)?;
                let der = STANDARD
                    .decode(encoded)
                    .map_err(|e| SignError::InvalidInput(e.to_string()))?;
                AnyRef::from_der(&der)?;
                der
            }
        };
        Ok(der)
    }

    /// Decodes DER produced for this schema back into JSON.
    pub fn decode(&self, der: &[u8]) -> Result<Value> {
        self.decode_element(AnyRef::from_der(der)?)
    }

    fn accepts(&self, tag: Tag) -> bool {
        self.kind.tag().is_none_or(|expected| expected == tag)
    }

    fn decode_element(&self, element: AnyRef<'_>) -> Result<Value> {
        if !self.accepts(element.tag()) {
            return Err(SignError::DecodingError(format!(
                "expected {}, found {}",
                self.kind,
                element.tag()
            )));
        }

        let value = match self.kind {
            AsnType::Boolean => Value::Bool(element.decode_as::<bool>()?),
            AsnType::Integer => decode_integer(element)?,
            AsnType::Enumerated => decode_integer(AnyRef::new(Tag::Integer, element.value())?)?,
            AsnType::OctetString => {
                let bytes = element.value();
                match std::str::from_utf8(bytes) {
                    Ok(text) => Value::String(text.to_string()),
                    Err(_) => Value::String(STANDARD.encode(bytes)),
                }
            }
            AsnType::Null => Value::Null,
            AsnType::ObjectIdentifier => {
                Value::String(element.decode_as::<ObjectIdentifier>()?.to_string())
            }
            AsnType::Utf8String | AsnType::PrintableString | AsnType::Ia5String => {
                Value::String(String::from_utf8_lossy(element.value()).into_owned())
            }
            AsnType::Sequence => {
                let mut reader = SliceReader::new(element.value())?;
                let mut fields = Map::new();
                let mut next: Option<AnyRef<'_>> = None;
                for (name, child) in &self.children {
                    if next.is_none() && !reader.is_finished() {
                        next = Some(reader.decode()?);
                    }
                    match next {
                        Some(item) if child.accepts(item.tag()) => {
                            fields.insert(name.clone(), child.decode_element(item)?);
                            next = None;
                        }
                        _ if child.optional => {}
                        _ => {
                            return Err(SignError::DecodingError(format!(
                                "missing required field {name}"
                            )));
                        }
                    }
                }
                if next.is_some() || !reader.is_finished() {
                    return Err(SignError::DecodingError(
                        "unexpected trailing sequence elements".to_string(),
                    ));
                }
                Value::Object(fields)
            }
            AsnType::Any => Value::String(STANDARD.encode(element.to_der()?)),
        };
        Ok(value)
    }
}

/// `None` when `value` is not an integer-like JSON value.
fn encode_integer(value: &Value) -> Option<Result<Vec<u8>>> {
    if let Some(small) = value.as_i64() {
        return Some(small.to_der().map_err(SignError::from));
    }
    let digits = match value {
        Value::Number(number) => number.to_string(),
        Value::String(text) => text.trim().to_string(),
        _ => return None,
    };
    if let Ok(small) = digits.parse::<i64>() {
        return Some(small.to_der().map_err(SignError::from));
    }
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let big = BigUint::parse_bytes(digits.as_bytes(), 10)?;
    Some(
        Uint::new(&big.to_bytes_be())
            .and_then(|uint| uint.to_der())
            .map_err(SignError::from),
    )
}

fn decode_integer(element: AnyRef<'_>) -> Result<Value> {
    if let Ok(small) = element.decode_as::<i64>() {
        return Ok(Value::from(small));
    }
    let big = element.decode_as::<UintRef<'_>>()?;
    Ok(Value::String(
        BigUint::from_bytes_be(big.as_bytes()).to_str_radix(10),
    ))
}

fn invalid_schema(reason: String) -> SignError {
    SignError::InvalidExtensionDefinition(format!("schema: {reason}"))
}
