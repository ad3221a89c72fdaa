//! Commented plist records
//!
//! The textual project format annotates identifiers with human-readable
//! comments (`13B07F96 /* App */`). Records keep their keys in insertion
//! order, which is the order the writer emits them in.

use indexmap::IndexMap;
use serde_json::Value;

use crate::config::CodecConfig;
use crate::decode::RawObject;
use crate::error::Result;
use crate::objects::ObjectStore;
use crate::reference::ObjectReference;

/// A string plus an optional `/* comment */` annotation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommentedString {
    pub string: String,
    pub comment: Option<String>,
}

impl CommentedString {
    pub fn new(string: impl Into<String>) -> Self {
        Self {
            string: string.into(),
            comment: None,
        }
    }

    pub fn with_comment(string: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            string: string.into(),
            comment: Some(comment.into()),
        }
    }

    /// Reference identifier annotated with an optional comment
    pub fn reference(reference: &ObjectReference, comment: Option<String>) -> Self {
        Self {
            string: reference.value().to_string(),
            comment,
        }
    }
}

impl From<&str> for CommentedString {
    fn from(value: &str) -> Self {
        CommentedString::new(value)
    }
}

impl From<String> for CommentedString {
    fn from(value: String) -> Self {
        CommentedString::new(value)
    }
}

/// Ordered record of commented keys
pub type PlistDictionary = IndexMap<CommentedString, PlistValue>;

/// A value in a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlistValue {
    String(CommentedString),
    Array(Vec<PlistValue>),
    Dictionary(PlistDictionary),
}

impl PlistValue {
    pub fn string(value: impl Into<String>) -> Self {
        PlistValue::String(CommentedString::new(value))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PlistValue::String(s) => Some(&s.string),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[PlistValue]> {
        match self {
            PlistValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dictionary(&self) -> Option<&PlistDictionary> {
        match self {
            PlistValue::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }

    /// Look up `key` in a dictionary value, ignoring key comments
    pub fn get(&self, key: &str) -> Option<&PlistValue> {
        self.as_dictionary().and_then(|dict| lookup(dict, key))
    }

    /// Strip comments and convert back into raw JSON form
    pub fn to_raw(&self) -> Value {
        match self {
            PlistValue::String(s) => Value::String(s.string.clone()),
            PlistValue::Array(items) => Value::Array(items.iter().map(PlistValue::to_raw).collect()),
            PlistValue::Dictionary(dict) => Value::Object(
                dict.iter()
                    .map(|(k, v)| (k.string.clone(), v.to_raw()))
                    .collect(),
            ),
        }
    }
}

/// Look up a key by its string, whatever its comment
pub fn lookup<'a>(dict: &'a PlistDictionary, key: &str) -> Option<&'a PlistValue> {
    dict.iter().find(|(k, _)| k.string == key).map(|(_, v)| v)
}

/// Convert a raw JSON value into an uncommented plist value.
///
/// Scalars other than strings are written in their JSON textual form.
pub fn raw_value(value: &Value) -> PlistValue {
    match value {
        Value::String(s) => PlistValue::string(s.as_str()),
        Value::Array(items) => PlistValue::Array(items.iter().map(raw_value).collect()),
        Value::Object(map) => PlistValue::Dictionary(
            map.iter()
                .map(|(k, v)| (CommentedString::new(k.as_str()), raw_value(v)))
                .collect(),
        ),
        Value::Null => PlistValue::string(""),
        Value::Bool(b) => PlistValue::string(if *b { "1" } else { "0" }),
        Value::Number(n) => PlistValue::string(n.to_string()),
    }
}

/// Passthrough record: `isa` first, remaining fields in key order
pub fn raw_record(isa: &str, fields: &RawObject) -> PlistDictionary {
    let mut dictionary = PlistDictionary::new();
    dictionary.insert("isa".into(), PlistValue::string(isa));
    let mut keys: Vec<&String> = fields.keys().filter(|k| k.as_str() != "isa").collect();
    keys.sort();
    for key in keys {
        dictionary.insert(key.as_str().into(), raw_value(&fields[key.as_str()]));
    }
    dictionary
}

/// Entities that encode themselves into a commented record.
///
/// Encoders resolve their own references through `objects` to compute
/// comment text; an unresolvable reference is a hard error.
pub trait PlistSerializable {
    fn plist_element(
        &self,
        reference: &ObjectReference,
        objects: &ObjectStore,
        config: &CodecConfig,
    ) -> Result<(CommentedString, PlistValue)>;
}
