//! Decoding raw object dictionaries
//!
//! The tokenizer hands us a map of identifier to raw field dictionary. Each
//! dictionary is decoded by the entity its `isa` names, with a
//! [`DecodeContext`] threaded through so reference fields are interned
//! through one [`ReferenceRepository`] without a second pass.

use std::str::FromStr;

use serde_json::{Map, Value};

use crate::error::{CodecError, Result};
use crate::objects::{Object, ObjectStore};
use crate::reference::{ObjectReference, ReferenceRepository};

/// One object's raw fields, as produced by the tokenizer
pub type RawObject = Map<String, Value>;

/// Repository and store for one decode pass
#[derive(Debug, Default)]
pub struct DecodeContext {
    pub references: ReferenceRepository,
    pub objects: ObjectStore,
}

impl DecodeContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `identifier` through the repository
    pub fn reference(&mut self, identifier: &str) -> ObjectReference {
        self.references.get_or_create(identifier)
    }

    /// Decode an optional reference-valued field
    pub fn optional_reference(
        &mut self,
        fields: &FieldReader<'_>,
        key: &str,
    ) -> Result<Option<ObjectReference>> {
        Ok(fields.optional_str(key)?.map(|id| self.reference(id)))
    }

    /// Decode a reference-list field, absent meaning empty
    pub fn reference_list(
        &mut self,
        fields: &FieldReader<'_>,
        key: &str,
    ) -> Result<Vec<ObjectReference>> {
        Ok(fields
            .string_list(key)?
            .into_iter()
            .map(|id| self.reference(id))
            .collect())
    }

    /// Decode every raw object into the store.
    ///
    /// All-or-nothing: the first failing object aborts the pass and the
    /// store is left as it was.
    pub fn decode_objects(&mut self, raw: &RawObject) -> Result<()> {
        let mut decoded = Vec::with_capacity(raw.len());
        for (identifier, value) in raw {
            let fields = value
                .as_object()
                .ok_or_else(|| CodecError::mismatch(identifier, "objects", "a dictionary"))?;
            let reference = self.reference(identifier);
            let object = Object::decode(&reference, &FieldReader::new(identifier, fields), self)?;
            decoded.push((reference, object));
        }
        for (reference, object) in decoded {
            self.objects.insert(reference, object);
        }
        tracing::debug!(
            "Decoded {} objects ({} references interned)",
            self.objects.len(),
            self.references.len()
        );
        Ok(())
    }

    pub fn into_parts(self) -> (ReferenceRepository, ObjectStore) {
        (self.references, self.objects)
    }
}

/// Entities that decode from a raw field dictionary
pub trait PlistDecodable: Sized {
    fn decode(
        reference: &ObjectReference,
        fields: &FieldReader<'_>,
        context: &mut DecodeContext,
    ) -> Result<Self>;
}

/// Typed accessors over one object's raw fields.
///
/// Errors name the object and field they came from.
#[derive(Debug, Clone, Copy)]
pub struct FieldReader<'a> {
    object: &'a str,
    fields: &'a RawObject,
}

impl<'a> FieldReader<'a> {
    pub fn new(object: &'a str, fields: &'a RawObject) -> Self {
        Self { object, fields }
    }

    /// Identifier of the object being read
    pub fn object(&self) -> &'a str {
        self.object
    }

    pub fn raw(&self) -> &'a RawObject {
        self.fields
    }

    pub fn optional_str(&self, key: &str) -> Result<Option<&'a str>> {
        match self.fields.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(_) => Err(CodecError::mismatch(self.object, key, "a string")),
        }
    }

    pub fn required_str(&self, key: &str) -> Result<&'a str> {
        self.optional_str(key)?
            .ok_or_else(|| CodecError::missing(self.object, key))
    }

    /// Required string that must also be non-empty
    pub fn required_name(&self, key: &str) -> Result<&'a str> {
        match self.required_str(key)? {
            "" => Err(CodecError::missing(self.object, key)),
            name => Ok(name),
        }
    }

    pub fn string_list(&self, key: &str) -> Result<Vec<&'a str>> {
        match self.fields.get(key) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .ok_or_else(|| CodecError::mismatch(self.object, key, "a list of strings"))
                })
                .collect(),
            Some(_) => Err(CodecError::mismatch(self.object, key, "a list of strings")),
        }
    }

    pub fn optional_dictionary(&self, key: &str) -> Result<Option<&'a RawObject>> {
        match self.fields.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Object(map)) => Ok(Some(map)),
            Some(_) => Err(CodecError::mismatch(self.object, key, "a dictionary")),
        }
    }

    /// Optional enumerated field; unknown strings are an error
    pub fn optional_enum<T: FromStr>(&self, key: &str) -> Result<Option<T>> {
        match self.optional_str(key)? {
            None => Ok(None),
            Some(raw) => raw.parse().map(Some).map_err(|_| CodecError::InvalidEnumValue {
                object: self.object.to_string(),
                field: key.to_string(),
                value: raw.to_string(),
            }),
        }
    }
}
