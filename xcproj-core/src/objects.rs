//! The object store
//!
//! Maps each identifier to exactly one typed object. Resolution is always an
//! explicit lookup returning `Result`; a reference with no backing object
//! fails with [`CodecError::DanglingReference`].

use std::collections::BTreeMap;

use crate::config::CodecConfig;
use crate::decode::{DecodeContext, FieldReader, PlistDecodable};
use crate::error::{CodecError, Result};
use crate::plist::{CommentedString, PlistSerializable, PlistValue};
use crate::reference::ObjectReference;
use crate::types::{
    passthrough, BuildConfiguration, BuildPhase, BuildPhaseKind, BuildRule, ConfigurationList,
    FileElement, OpaqueObject, Target, TargetDependency, TargetKind, BUILD_CONFIGURATION_ISA,
    BUILD_RULE_ISA, CONFIGURATION_LIST_ISA, FILE_ELEMENT_ISAS, TARGET_DEPENDENCY_ISA,
};

pub const PROJECT_ISA: &str = "PBXProject";
pub const PROJECT_OBJECT_COMMENT: &str = "Project object";

/// A typed node of the project graph
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    Target(Target),
    BuildConfiguration(BuildConfiguration),
    ConfigurationList(ConfigurationList),
    BuildPhase(BuildPhase),
    BuildRule(BuildRule),
    TargetDependency(TargetDependency),
    FileElement(FileElement),
    Other(OpaqueObject),
}

impl Object {
    pub fn isa(&self) -> &str {
        match self {
            Object::Target(target) => target.isa(),
            Object::BuildConfiguration(_) => BUILD_CONFIGURATION_ISA,
            Object::ConfigurationList(_) => CONFIGURATION_LIST_ISA,
            Object::BuildPhase(phase) => phase.kind.isa(),
            Object::BuildRule(_) => BUILD_RULE_ISA,
            Object::TargetDependency(_) => TARGET_DEPENDENCY_ISA,
            Object::FileElement(file) => &file.isa,
            Object::Other(other) => &other.isa,
        }
    }

    /// Decode a raw dictionary, dispatching on its `isa`
    pub fn decode(
        reference: &ObjectReference,
        fields: &FieldReader<'_>,
        context: &mut DecodeContext,
    ) -> Result<Self> {
        let isa = fields.required_str("isa")?;
        tracing::trace!("Decoding {} {}", isa, reference);

        let object = if TargetKind::from_isa(isa).is_some() {
            Object::Target(Target::decode(reference, fields, context)?)
        } else if BuildPhaseKind::from_isa(isa).is_some() {
            Object::BuildPhase(BuildPhase::decode(reference, fields, context)?)
        } else if FILE_ELEMENT_ISAS.contains(&isa) {
            Object::FileElement(FileElement::decode(reference, fields, context)?)
        } else {
            match isa {
                BUILD_CONFIGURATION_ISA => {
                    Object::BuildConfiguration(BuildConfiguration::decode(reference, fields, context)?)
                }
                CONFIGURATION_LIST_ISA => {
                    Object::ConfigurationList(ConfigurationList::decode(reference, fields, context)?)
                }
                BUILD_RULE_ISA => Object::BuildRule(BuildRule::decode(reference, fields, context)?),
                TARGET_DEPENDENCY_ISA => {
                    Object::TargetDependency(TargetDependency::decode(reference, fields, context)?)
                }
                _ => {
                    tracing::debug!("Keeping {} {} as an opaque object", isa, reference);
                    Object::Other(OpaqueObject {
                        isa: isa.to_string(),
                        fields: fields.raw().clone(),
                    })
                }
            }
        };
        Ok(object)
    }
}

impl PlistSerializable for Object {
    fn plist_element(
        &self,
        reference: &ObjectReference,
        objects: &ObjectStore,
        config: &CodecConfig,
    ) -> Result<(CommentedString, PlistValue)> {
        match self {
            Object::Target(target) => target.plist_element(reference, objects, config),
            Object::BuildConfiguration(configuration) => {
                configuration.plist_element(reference, objects, config)
            }
            Object::ConfigurationList(list) => list.plist_element(reference, objects, config),
            Object::BuildPhase(phase) => Ok(passthrough(
                reference,
                phase.kind.isa(),
                &phase.fields,
                Some(phase.name().to_string()),
            )),
            Object::BuildRule(rule) => Ok(passthrough(
                reference,
                BUILD_RULE_ISA,
                &rule.fields,
                Some(BUILD_RULE_ISA.to_string()),
            )),
            Object::TargetDependency(dependency) => Ok(passthrough(
                reference,
                TARGET_DEPENDENCY_ISA,
                &dependency.fields,
                Some(TARGET_DEPENDENCY_ISA.to_string()),
            )),
            Object::FileElement(file) => {
                Ok(passthrough(reference, &file.isa, &file.fields, file.file_name()))
            }
            Object::Other(other) => {
                let comment = (other.isa == PROJECT_ISA).then(|| PROJECT_OBJECT_COMMENT.to_string());
                Ok(passthrough(reference, &other.isa, &other.fields, comment))
            }
        }
    }
}

macro_rules! typed_lookup {
    ($get:ident, $get_mut:ident, $variant:ident, $ty:ty, $expected:literal) => {
        pub fn $get(&self, reference: &ObjectReference) -> Result<&$ty> {
            match self.object(reference)? {
                Object::$variant(inner) => Ok(inner),
                other => Err(CodecError::UnexpectedObjectKind {
                    reference: reference.to_string(),
                    expected: $expected,
                    found: other.isa().to_string(),
                }),
            }
        }

        pub fn $get_mut(&mut self, reference: &ObjectReference) -> Result<&mut $ty> {
            match self.object_mut(reference)? {
                Object::$variant(inner) => Ok(inner),
                other => Err(CodecError::UnexpectedObjectKind {
                    reference: reference.to_string(),
                    expected: $expected,
                    found: other.isa().to_string(),
                }),
            }
        }
    };
}

/// Identifier-ordered map of every object in one graph
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectStore {
    objects: BTreeMap<ObjectReference, Object>,
}

impl ObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `object`, returning whatever was previously stored under `reference`
    pub fn insert(&mut self, reference: ObjectReference, object: Object) -> Option<Object> {
        self.objects.insert(reference, object)
    }

    pub fn remove(&mut self, reference: &ObjectReference) -> Option<Object> {
        self.objects.remove(reference)
    }

    pub fn get(&self, reference: &ObjectReference) -> Option<&Object> {
        self.objects.get(reference)
    }

    pub fn contains(&self, reference: &ObjectReference) -> bool {
        self.objects.contains_key(reference)
    }

    /// Resolve `reference`, failing if nothing is registered under it
    pub fn object(&self, reference: &ObjectReference) -> Result<&Object> {
        self.objects
            .get(reference)
            .ok_or_else(|| CodecError::dangling(reference.value()))
    }

    pub fn object_mut(&mut self, reference: &ObjectReference) -> Result<&mut Object> {
        self.objects
            .get_mut(reference)
            .ok_or_else(|| CodecError::dangling(reference.value()))
    }

    /// The stored reference for a raw identifier
    pub fn reference(&self, identifier: &str) -> Option<ObjectReference> {
        self.objects
            .get_key_value(identifier)
            .map(|(reference, _)| reference.clone())
    }

    typed_lookup!(target, target_mut, Target, Target, "a target");
    typed_lookup!(
        build_configuration,
        build_configuration_mut,
        BuildConfiguration,
        BuildConfiguration,
        "a build configuration"
    );
    typed_lookup!(
        configuration_list,
        configuration_list_mut,
        ConfigurationList,
        ConfigurationList,
        "a configuration list"
    );
    typed_lookup!(build_phase, build_phase_mut, BuildPhase, BuildPhase, "a build phase");
    typed_lookup!(file_element, file_element_mut, FileElement, FileElement, "a file element");

    pub fn iter(&self) -> impl Iterator<Item = (&ObjectReference, &Object)> {
        self.objects.iter()
    }

    pub fn targets(&self) -> impl Iterator<Item = (&ObjectReference, &Target)> {
        self.objects.iter().filter_map(|(reference, object)| match object {
            Object::Target(target) => Some((reference, target)),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decoded(objects: serde_json::Value) -> DecodeContext {
        let mut context = DecodeContext::new();
        context.decode_objects(objects.as_object().unwrap()).unwrap();
        context
    }

    #[test]
    fn test_dispatch_on_isa() {
        let context = decoded(json!({
            "T1": { "isa": "PBXLegacyTarget", "name": "Make" },
            "C1": { "isa": "XCBuildConfiguration", "name": "Debug" },
            "P1": { "isa": "PBXFrameworksBuildPhase" },
            "F1": { "isa": "PBXVariantGroup", "name": "Main.storyboard" },
            "X1": { "isa": "PBXProject", "targets": ["T1"] },
        }));
        let objects = &context.objects;
        let kind = |id: &str| objects.get(&objects.reference(id).unwrap()).cloned().unwrap();

        assert!(matches!(kind("T1"), Object::Target(_)));
        assert!(matches!(kind("C1"), Object::BuildConfiguration(_)));
        assert!(matches!(kind("P1"), Object::BuildPhase(_)));
        assert!(matches!(kind("F1"), Object::FileElement(_)));
        assert!(matches!(kind("X1"), Object::Other(ref o) if o.isa == "PBXProject"));
    }

    #[test]
    fn test_missing_isa() {
        let mut context = DecodeContext::new();
        let err = context
            .decode_objects(json!({ "A": { "name": "x" } }).as_object().unwrap())
            .unwrap_err();
        assert!(matches!(err, CodecError::MissingRequiredField { ref field, .. } if field == "isa"));
    }

    #[test]
    fn test_dangling_until_registered() {
        let mut context = decoded(json!({
            "T1": { "isa": "PBXNativeTarget", "name": "App", "dependencies": ["D1"] },
        }));
        let dependency = context.reference("D1");
        assert!(matches!(
            context.objects.object(&dependency),
            Err(CodecError::DanglingReference { .. })
        ));

        let raw = json!({ "isa": "PBXTargetDependency", "target": "T1" });
        let fields = raw.as_object().unwrap();
        let object = Object::decode(&dependency, &FieldReader::new("D1", fields), &mut context).unwrap();
        context.objects.insert(dependency.clone(), object);
        assert!(context.objects.object(&dependency).is_ok());
    }

    #[test]
    fn test_typed_lookup_wrong_kind() {
        let context = decoded(json!({ "C1": { "isa": "XCBuildConfiguration", "name": "Debug" } }));
        let reference = context.objects.reference("C1").unwrap();
        let err = context.objects.target(&reference).unwrap_err();
        assert!(matches!(
            err,
            CodecError::UnexpectedObjectKind { ref found, .. } if found == "XCBuildConfiguration"
        ));
    }

    #[test]
    fn test_decode_is_all_or_nothing() {
        let mut context = DecodeContext::new();
        let result = context.decode_objects(
            json!({
                "A": { "isa": "PBXNativeTarget", "name": "Good" },
                "B": { "isa": "PBXNativeTarget" },
            })
            .as_object()
            .unwrap(),
        );
        assert!(result.is_err());
        assert!(context.objects.is_empty());
    }

    #[test]
    fn test_failed_decode_keeps_earlier_objects() {
        let mut context = decoded(json!({ "T1": { "isa": "PBXNativeTarget", "name": "App" } }));
        let result = context.decode_objects(
            json!({
                "T2": { "isa": "PBXAggregateTarget", "name": "All" },
                "T3": { "isa": "PBXLegacyTarget", "name": "" },
            })
            .as_object()
            .unwrap(),
        );
        assert!(result.is_err());
        assert_eq!(context.objects.len(), 1);
        assert!(context.objects.reference("T1").is_some());
        assert!(context.objects.reference("T2").is_none());
    }

    #[test]
    fn test_reference_from_store_is_interned_instance() {
        let mut context = decoded(json!({ "T1": { "isa": "PBXNativeTarget", "name": "App" } }));
        let stored = context.objects.reference("T1").unwrap();
        assert!(ObjectReference::ptr_eq(&stored, &context.reference("T1")));
    }

    #[test]
    fn test_opaque_passthrough_encoding() {
        let context = decoded(json!({
            "X1": { "isa": "PBXProject", "targets": ["T1"], "compatibilityVersion": "Xcode 14.0" },
        }));
        let reference = context.objects.reference("X1").unwrap();
        let (key, value) = context
            .objects
            .object(&reference)
            .unwrap()
            .plist_element(&reference, &context.objects, &CodecConfig::default())
            .unwrap();
        assert_eq!(key.comment.as_deref(), Some("Project object"));
        assert_eq!(value.get("isa").and_then(PlistValue::as_str), Some("PBXProject"));
        assert_eq!(value.get("compatibilityVersion").and_then(PlistValue::as_str), Some("Xcode 14.0"));
    }

    #[test]
    fn test_build_rule_keeps_raw_fields() {
        let context = decoded(json!({
            "R1": { "isa": "PBXBuildRule", "name": "Protobuf", "fileType": "pattern.proxy" },
        }));
        let reference = context.objects.reference("R1").unwrap();
        let (key, value) = context
            .objects
            .object(&reference)
            .unwrap()
            .plist_element(&reference, &context.objects, &CodecConfig::default())
            .unwrap();
        assert_eq!(key.comment.as_deref(), Some("PBXBuildRule"));
        assert_eq!(value.get("name").and_then(PlistValue::as_str), Some("Protobuf"));
        assert_eq!(value.get("fileType").and_then(PlistValue::as_str), Some("pattern.proxy"));
    }

    #[test]
    fn test_targets_iterator() {
        let context = decoded(json!({
            "T1": { "isa": "PBXNativeTarget", "name": "App" },
            "T2": { "isa": "PBXAggregateTarget", "name": "All" },
            "C1": { "isa": "XCBuildConfiguration", "name": "Debug" },
        }));
        let names: Vec<&str> = context.objects.targets().map(|(_, t)| t.name.as_str()).collect();
        assert_eq!(names, vec!["App", "All"]);
    }
}
