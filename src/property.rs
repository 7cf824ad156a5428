//! Property snapshots: one field's schema definition at one version

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::value::RawValue;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::error::Result;

/// A literal JSON value kept as the exact bytes it was written with.
///
/// Equality and ordering are byte-wise, so `1` and `1.0` are different
/// literals even though they denote the same number.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JsonLiteral(Vec<u8>);

impl JsonLiteral {
    /// Wrap raw serialized bytes
    pub fn new(raw: impl Into<Vec<u8>>) -> Self {
        Self(raw.into())
    }

    /// Serialize a JSON value into its compact form
    pub fn from_value(value: &serde_json::Value) -> Result<Self> {
        Ok(Self(serde_json::to_vec(value)?))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for JsonLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

impl From<&str> for JsonLiteral {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl Serialize for JsonLiteral {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::Error;

        let text = std::str::from_utf8(&self.0).map_err(S::Error::custom)?;
        let raw = RawValue::from_string(text.to_string()).map_err(S::Error::custom)?;
        raw.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for JsonLiteral {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = Box::<RawValue>::deserialize(deserializer)?;
        Ok(Self(raw.get().as_bytes().to_vec()))
    }
}

/// The allowed values of an `enum` facet.
///
/// Listed in schema order, but compared as a set: reordering or
/// repeating a value is not a change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnumValues(Vec<JsonLiteral>);

impl EnumValues {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &JsonLiteral> {
        self.0.iter()
    }

    /// Distinct values in byte order
    pub fn to_set(&self) -> BTreeSet<&JsonLiteral> {
        self.0.iter().collect()
    }
}

impl PartialEq for EnumValues {
    fn eq(&self, other: &Self) -> bool {
        self.to_set() == other.to_set()
    }
}

impl From<Vec<JsonLiteral>> for EnumValues {
    fn from(values: Vec<JsonLiteral>) -> Self {
        Self(values)
    }
}

impl<L: Into<JsonLiteral>> FromIterator<L> for EnumValues {
    fn from_iter<I: IntoIterator<Item = L>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// `additionalProperties` / `additionalItems`: a schema, or a plain allow/deny flag
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SchemaOrBool {
    Bool(bool),
    Schema(Box<Property>),
}

/// `items`: one schema for every element, or a tuple of per-position schemas
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SchemaOrArray {
    Schema(Box<Property>),
    Array(Vec<Property>),
}

/// A `dependencies` entry: a schema, or the names of properties it requires
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SchemaOrStringArray {
    Schema(Box<Property>),
    Names(Vec<String>),
}

// The alternatives are told apart by the first JSON token, so the raw text is
// parsed directly instead of going through an untagged (buffering) derive.
impl<'de> Deserialize<'de> for SchemaOrBool {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = Box::<RawValue>::deserialize(deserializer)?;
        match raw.get().trim() {
            "true" => Ok(SchemaOrBool::Bool(true)),
            "false" => Ok(SchemaOrBool::Bool(false)),
            text => parse(text).map(SchemaOrBool::Schema),
        }
    }
}

impl<'de> Deserialize<'de> for SchemaOrArray {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = Box::<RawValue>::deserialize(deserializer)?;
        let text = raw.get().trim();
        if text.starts_with('[') {
            parse(text).map(SchemaOrArray::Array)
        } else {
            parse(text).map(SchemaOrArray::Schema)
        }
    }
}

impl<'de> Deserialize<'de> for SchemaOrStringArray {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = Box::<RawValue>::deserialize(deserializer)?;
        let text = raw.get().trim();
        if text.starts_with('[') {
            parse(text).map(SchemaOrStringArray::Names)
        } else {
            parse(text).map(SchemaOrStringArray::Schema)
        }
    }
}

/// Link to documentation outside the schema
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalDocumentation {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub url: String,
}

/// A CEL validation rule attached through `x-kubernetes-validations`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidationRule {
    pub rule: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub message: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub message_expression: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub field_path: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub optional_old_self: Option<bool>,
}

/// Schema definition for a single field.
///
/// Plain data: rules only read it, and handled-detection works on clones.
/// Two properties are equal when every facet is equal, including keys kept
/// verbatim in `extra` because no facet models them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,

    #[serde(rename = "$schema", skip_serializing_if = "String::is_empty")]
    pub schema: String,

    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,

    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub kind: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub format: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<JsonLiteral>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,

    #[serde(skip_serializing_if = "is_false")]
    pub exclusive_maximum: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,

    #[serde(skip_serializing_if = "is_false")]
    pub exclusive_minimum: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<i64>,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub pattern: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<i64>,

    #[serde(skip_serializing_if = "is_false")]
    pub unique_items: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<f64>,

    #[serde(rename = "enum", skip_serializing_if = "EnumValues::is_empty")]
    pub enum_values: EnumValues,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_properties: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_properties: Option<i64>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<SchemaOrArray>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<Property>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<Property>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<Property>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub not: Option<Box<Property>>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Property>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<SchemaOrBool>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub pattern_properties: BTreeMap<String, Property>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub dependencies: BTreeMap<String, SchemaOrStringArray>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_items: Option<SchemaOrBool>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub definitions: BTreeMap<String, Property>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocumentation>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<JsonLiteral>,

    #[serde(skip_serializing_if = "is_false")]
    pub nullable: bool,

    #[serde(
        rename = "x-kubernetes-preserve-unknown-fields",
        skip_serializing_if = "Option::is_none"
    )]
    pub preserve_unknown_fields: Option<bool>,

    #[serde(rename = "x-kubernetes-embedded-resource", skip_serializing_if = "is_false")]
    pub embedded_resource: bool,

    #[serde(rename = "x-kubernetes-int-or-string", skip_serializing_if = "is_false")]
    pub int_or_string: bool,

    #[serde(rename = "x-kubernetes-list-map-keys", skip_serializing_if = "Vec::is_empty")]
    pub list_map_keys: Vec<String>,

    #[serde(rename = "x-kubernetes-list-type", skip_serializing_if = "Option::is_none")]
    pub list_type: Option<String>,

    #[serde(rename = "x-kubernetes-map-type", skip_serializing_if = "Option::is_none")]
    pub map_type: Option<String>,

    #[serde(rename = "x-kubernetes-validations", skip_serializing_if = "Vec::is_empty")]
    pub validations: Vec<ValidationRule>,

    /// Keys no facet above models, kept as written
    #[serde(flatten)]
    pub extra: BTreeMap<String, JsonLiteral>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Parse raw JSON text taken from an enclosing document
fn parse<T, E>(text: &str) -> std::result::Result<T, E>
where
    T: serde::de::DeserializeOwned,
    E: serde::de::Error,
{
    serde_json::from_str(text).map_err(E::custom)
}

// Keys are matched by hand rather than through a derive with `flatten`: a
// flattened catch-all buffers values, which loses the raw bytes literals need.
impl<'de> Deserialize<'de> for Property {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        use serde::de::Error;

        let fields = BTreeMap::<String, Box<RawValue>>::deserialize(deserializer)?;
        let mut property = Property::default();
        for (key, raw) in fields {
            property.set(key, &raw).map_err(D::Error::custom)?;
        }
        Ok(property)
    }
}

impl Property {
    /// Parse a property from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a property from JSON bytes
    pub fn from_slice(json: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(json)?)
    }

    fn set(&mut self, key: String, raw: &RawValue) -> serde_json::Result<()> {
        use serde_json::from_str;

        let text = raw.get();
        match key.as_str() {
            "id" => self.id = from_str(text)?,
            "$schema" => self.schema = from_str(text)?,
            "$ref" => self.reference = from_str(text)?,
            "description" => self.description = from_str(text)?,
            "type" => self.kind = from_str(text)?,
            "format" => self.format = from_str(text)?,
            "title" => self.title = from_str(text)?,
            "default" => self.default = from_str(text)?,
            "maximum" => self.maximum = from_str(text)?,
            "exclusiveMaximum" => self.exclusive_maximum = from_str(text)?,
            "minimum" => self.minimum = from_str(text)?,
            "exclusiveMinimum" => self.exclusive_minimum = from_str(text)?,
            "maxLength" => self.max_length = from_str(text)?,
            "minLength" => self.min_length = from_str(text)?,
            "pattern" => self.pattern = from_str(text)?,
            "maxItems" => self.max_items = from_str(text)?,
            "minItems" => self.min_items = from_str(text)?,
            "uniqueItems" => self.unique_items = from_str(text)?,
            "multipleOf" => self.multiple_of = from_str(text)?,
            "enum" => self.enum_values = from_str(text)?,
            "maxProperties" => self.max_properties = from_str(text)?,
            "minProperties" => self.min_properties = from_str(text)?,
            "required" => self.required = from_str(text)?,
            "items" => self.items = from_str(text)?,
            "allOf" => self.all_of = from_str(text)?,
            "oneOf" => self.one_of = from_str(text)?,
            "anyOf" => self.any_of = from_str(text)?,
            "not" => self.not = from_str(text)?,
            "properties" => self.properties = from_str(text)?,
            "additionalProperties" => self.additional_properties = from_str(text)?,
            "patternProperties" => self.pattern_properties = from_str(text)?,
            "dependencies" => self.dependencies = from_str(text)?,
            "additionalItems" => self.additional_items = from_str(text)?,
            "definitions" => self.definitions = from_str(text)?,
            "externalDocs" => self.external_docs = from_str(text)?,
            "example" => self.example = from_str(text)?,
            "nullable" => self.nullable = from_str(text)?,
            "x-kubernetes-preserve-unknown-fields" => {
                self.preserve_unknown_fields = from_str(text)?
            }
            "x-kubernetes-embedded-resource" => self.embedded_resource = from_str(text)?,
            "x-kubernetes-int-or-string" => self.int_or_string = from_str(text)?,
            "x-kubernetes-list-map-keys" => self.list_map_keys = from_str(text)?,
            "x-kubernetes-list-type" => self.list_type = from_str(text)?,
            "x-kubernetes-map-type" => self.map_type = from_str(text)?,
            "x-kubernetes-validations" => self.validations = from_str(text)?,
            _ => {
                self.extra.insert(key, JsonLiteral::new(text));
            }
        }
        Ok(())
    }
}
