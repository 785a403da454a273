//! Custom extension definitions: identifier, OID and ASN.1 schema.

pub mod schema;

use std::collections::BTreeMap;
use std::sync::LazyLock;

use const_oid::ObjectIdentifier;
use regex::Regex;
use serde_json::Value;

use crate::error::{Result, SignError};
use schema::Schema;

static DOTTED_OID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(\.\d+)+$").expect("OID pattern is valid"));

/// Whether `candidate` is written as a dotted-numeric OID.
pub fn is_dotted_oid(candidate: &str) -> bool {
    DOTTED_OID.is_match(candidate)
}

/// A named extension and how its value is encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionDefinition {
    id: String,
    oid: ObjectIdentifier,
    schema: Schema,
}

impl ExtensionDefinition {
    pub fn new(id: impl Into<String>, oid: &str, schema: Schema) -> Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(SignError::InvalidExtensionDefinition(
                "identifier must not be empty".to_string(),
            ));
        }
        if !is_dotted_oid(oid) {
            return Err(SignError::InvalidExtensionDefinition(format!(
                "{id}: {oid:?} is not a dotted-numeric OID"
            )));
        }
        let oid = ObjectIdentifier::new(oid)
            .map_err(|e| SignError::InvalidExtensionDefinition(format!("{id}: {e}")))?;
        Ok(Self { id, oid, schema })
    }

    /// Reads one `[identifier, oid, schema]` triple.
    pub fn from_json(value: &Value) -> Result<Self> {
        let invalid = || {
            SignError::InvalidExtensionDefinition(format!(
                "expected [identifier, oid, schema], found {value}"
            ))
        };
        let [id, oid, schema] = value.as_array().map(Vec::as_slice).ok_or_else(invalid)? else {
            return Err(invalid());
        };
        Self::new(
            id.as_str().ok_or_else(invalid)?,
            oid.as_str().ok_or_else(invalid)?,
            Schema::from_json(schema)?,
        )
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn oid(&self) -> ObjectIdentifier {
        self.oid
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }
}

/// Parses the `[[identifier, oid, schema], ...]` configuration format.
pub fn definitions_from_json(json: &str) -> Result<Vec<ExtensionDefinition>> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| SignError::InvalidExtensionDefinition(e.to_string()))?;
    match value {
        Value::Array(entries) => entries.iter().map(ExtensionDefinition::from_json).collect(),
        Value::Null => Ok(Vec::new()),
        other => Err(SignError::InvalidExtensionDefinition(format!(
            "expected a list of definitions, found {other}"
        ))),
    }
}

/// Identifier to OID and schema mappings used when issuing certificates.
///
/// Registering an identifier again replaces its previous definition.
#[derive(Debug, Clone, Default)]
pub struct ExtensionRegistry {
    definitions: BTreeMap<String, ExtensionDefinition>,
    identifiers: BTreeMap<ObjectIdentifier, String>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, definitions: impl IntoIterator<Item = ExtensionDefinition>) {
        for definition in definitions {
            self.unregister(definition.id());
            if let Some(previous) = self.identifiers.insert(definition.oid, definition.id.clone()) {
                self.definitions.remove(&previous);
            }
            log::debug!("registered extension {} as {}", definition.id, definition.oid);
            self.definitions.insert(definition.id.clone(), definition);
        }
    }

    pub fn register_json(&mut self, json: &str) -> Result<()> {
        self.register(definitions_from_json(json)?);
        Ok(())
    }

    pub fn unregister(&mut self, id: &str) -> Option<ExtensionDefinition> {
        let definition = self.definitions.remove(id)?;
        self.identifiers.remove(&definition.oid);
        Some(definition)
    }

    pub fn is_registered(&self, id: &str) -> bool {
        self.definitions.contains_key(id)
    }

    pub fn oid(&self, id: &str) -> Option<ObjectIdentifier> {
        self.definitions.get(id).map(ExtensionDefinition::oid)
    }

    /// Reverse lookup: the identifier registered for `oid`.
    pub fn identify(&self, oid: &ObjectIdentifier) -> Option<&str> {
        self.identifiers.get(oid).map(String::as_str)
    }

    pub fn get(&self, id: &str) -> Option<&ExtensionDefinition> {
        self.definitions.get(id)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn encode(&self, id: &str, value: &Value) -> Result<Vec<u8>> {
        self.definition(id)?.schema.encode(value)
    }

    pub fn decode(&self, id: &str, der: &[u8]) -> Result<Value> {
        self.definition(id)?.schema.decode(der)
    }

    fn definition(&self, id: &str) -> Result<&ExtensionDefinition> {
        self.definitions
            .get(id)
            .ok_or_else(|| SignError::InvalidInput(format!("Unknown extension {id}")))
    }
}
