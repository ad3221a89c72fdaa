//! Project file envelope
//!
//! A project file is a top-level dictionary holding format versions, the
//! `objects` table and the `rootObject` identifier.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use serde_json::Value;

use crate::config::CodecConfig;
use crate::decode::{DecodeContext, FieldReader, RawObject};
use crate::error::{CodecError, Result};
use crate::objects::{Object, ObjectStore, PROJECT_OBJECT_COMMENT};
use crate::plist::{raw_value, CommentedString, PlistDictionary, PlistSerializable, PlistValue};
use crate::reference::{ObjectReference, ReferenceRepository};
use crate::writer;

/// Identifier used in errors about the envelope itself
const ENVELOPE: &str = "<project>";

pub const DEFAULT_ARCHIVE_VERSION: &str = "1";
pub const DEFAULT_OBJECT_VERSION: &str = "46";

/// A fully linked project graph
#[derive(Debug, Clone)]
pub struct PbxProj {
    pub archive_version: String,
    pub object_version: String,
    pub classes: RawObject,
    pub root_object: Option<ObjectReference>,
    pub references: ReferenceRepository,
    pub objects: ObjectStore,
}

impl Default for PbxProj {
    fn default() -> Self {
        Self {
            archive_version: DEFAULT_ARCHIVE_VERSION.to_string(),
            object_version: DEFAULT_OBJECT_VERSION.to_string(),
            classes: RawObject::new(),
            root_object: None,
            references: ReferenceRepository::new(),
            objects: ObjectStore::new(),
        }
    }
}

impl PbxProj {
    /// Parse the JSON form of a project file (`plutil -convert json`)
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        let envelope = value
            .as_object()
            .ok_or_else(|| CodecError::mismatch(ENVELOPE, "<root>", "a dictionary"))?;
        Self::decode(&FieldReader::new(ENVELOPE, envelope))
    }

    /// Decode the envelope and every object in one all-or-nothing pass
    pub fn decode(fields: &FieldReader<'_>) -> Result<Self> {
        let raw_objects = fields
            .optional_dictionary("objects")?
            .ok_or_else(|| CodecError::missing(ENVELOPE, "objects"))?;

        let mut context = DecodeContext::new();
        context.decode_objects(raw_objects)?;
        let root_object = context.optional_reference(fields, "rootObject")?;
        let (references, objects) = context.into_parts();

        Ok(PbxProj {
            archive_version: fields
                .optional_str("archiveVersion")?
                .unwrap_or(DEFAULT_ARCHIVE_VERSION)
                .to_string(),
            object_version: fields
                .optional_str("objectVersion")?
                .unwrap_or(DEFAULT_OBJECT_VERSION)
                .to_string(),
            classes: fields.optional_dictionary("classes")?.cloned().unwrap_or_default(),
            root_object,
            references,
            objects,
        })
    }

    /// Register `object` under a freshly generated identifier
    pub fn add_object(&mut self, object: Object) -> ObjectReference {
        let reference = self.references.generate();
        tracing::debug!("Adding {} {}", object.isa(), reference);
        self.objects.insert(reference.clone(), object);
        reference
    }

    /// Intern an identifier through this project's repository
    pub fn reference(&mut self, identifier: &str) -> ObjectReference {
        self.references.get_or_create(identifier)
    }

    /// Encode one object as a commented record
    pub fn encode_object(
        &self,
        reference: &ObjectReference,
        config: &CodecConfig,
    ) -> Result<(CommentedString, PlistValue)> {
        self.objects
            .object(reference)?
            .plist_element(reference, &self.objects, config)
    }

    /// Encode the whole project. Objects are ordered by `isa`, then identifier.
    pub fn plist(&self, config: &CodecConfig) -> Result<PlistDictionary> {
        let mut ordered: Vec<(&ObjectReference, &Object)> = self.objects.iter().collect();
        ordered.sort_by(|(ra, a), (rb, b)| a.isa().cmp(b.isa()).then_with(|| ra.cmp(rb)));

        let mut objects = PlistDictionary::new();
        for (reference, object) in ordered {
            let (key, value) = object.plist_element(reference, &self.objects, config)?;
            objects.insert(key, value);
        }

        let mut dictionary = PlistDictionary::new();
        dictionary.insert("archiveVersion".into(), PlistValue::string(self.archive_version.as_str()));
        dictionary.insert(
            "classes".into(),
            raw_value(&Value::Object(self.classes.clone())),
        );
        dictionary.insert("objectVersion".into(), PlistValue::string(self.object_version.as_str()));
        dictionary.insert("objects".into(), PlistValue::Dictionary(objects));
        if let Some(root) = &self.root_object {
            self.objects.object(root)?;
            dictionary.insert(
                "rootObject".into(),
                PlistValue::String(CommentedString::reference(
                    root,
                    Some(PROJECT_OBJECT_COMMENT.to_string()),
                )),
            );
        }
        Ok(dictionary)
    }

    /// Encode and render the project in its textual form
    pub fn to_text(&self, config: &CodecConfig) -> Result<String> {
        Ok(writer::write_project(&self.plist(config)?, config))
    }

    pub fn into_shared(self) -> SharedProject {
        SharedProject(Arc::new(RwLock::new(self)))
    }
}

/// A project behind one exclusive-access lock, for concurrent editors.
///
/// Readers share the lock; any mutation of the store or repository takes
/// it exclusively.
#[derive(Debug, Clone)]
pub struct SharedProject(Arc<RwLock<PbxProj>>);

impl SharedProject {
    pub fn read(&self) -> RwLockReadGuard<'_, PbxProj> {
        self.0.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, PbxProj> {
        self.0.write()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BuildConfiguration, Target, TargetKind};
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "archiveVersion": "1",
            "classes": {},
            "objectVersion": "56",
            "rootObject": "R1",
            "objects": {
                "R1": { "isa": "PBXProject", "targets": ["T1", "T2"], "buildConfigurationList": "L0" },
                "T1": {
                    "isa": "PBXNativeTarget",
                    "name": "App",
                    "buildConfigurationList": "L1",
                    "buildPhases": ["P1"],
                    "buildRules": [],
                    "dependencies": ["D1"],
                    "productName": "App",
                    "productReference": "F1",
                    "productType": "com.apple.product-type.application",
                },
                "T2": { "isa": "PBXAggregateTarget", "name": "All", "buildRules": ["R9"] },
                "R9": { "isa": "PBXBuildRule", "compilerSpec": "com.apple.compilers.proxy.script" },
                "D1": { "isa": "PBXTargetDependency", "target": "T2" },
                "P1": { "isa": "PBXSourcesBuildPhase", "files": [] },
                "F1": { "isa": "PBXFileReference", "path": "App.app", "sourceTree": "BUILT_PRODUCTS_DIR" },
                "L0": { "isa": "XCConfigurationList", "buildConfigurations": [] },
                "L1": { "isa": "XCConfigurationList", "buildConfigurations": ["C1"], "defaultConfigurationName": "Debug" },
                "C1": { "isa": "XCBuildConfiguration", "name": "Debug", "buildSettings": { "SWIFT_VERSION": "5" } },
            },
        })
    }

    #[test]
    fn test_decode_envelope() {
        let project = PbxProj::from_value(&sample()).unwrap();
        assert_eq!(project.object_version, "56");
        assert_eq!(project.root_object.as_ref().map(ObjectReference::value), Some("R1"));
        assert_eq!(project.objects.len(), 10);
        assert_eq!(project.objects.targets().count(), 2);
    }

    #[test]
    fn test_missing_objects_table() {
        let err = PbxProj::from_value(&json!({ "archiveVersion": "1" })).unwrap_err();
        assert!(matches!(err, CodecError::MissingRequiredField { ref field, .. } if field == "objects"));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(PbxProj::from_json_str("{"), Err(CodecError::Json(_))));
    }

    #[test]
    fn test_objects_ordered_by_isa_then_identifier() {
        let project = PbxProj::from_value(&sample()).unwrap();
        let plist = project.plist(&CodecConfig::default()).unwrap();
        let objects = plist.get(&CommentedString::new("objects")).unwrap().as_dictionary().unwrap();
        let isas: Vec<&str> = objects
            .values()
            .map(|record| record.get("isa").and_then(PlistValue::as_str).unwrap())
            .collect();
        let mut sorted = isas.clone();
        sorted.sort();
        assert_eq!(isas, sorted);

        let root = plist.get(&CommentedString::with_comment("R1", "Project object"));
        assert!(root.is_none(), "rootObject is a value, not a key");
        assert_eq!(
            plist.get(&CommentedString::new("rootObject")),
            Some(&PlistValue::String(CommentedString::with_comment("R1", "Project object")))
        );
    }

    #[test]
    fn test_round_trip_through_raw_form() {
        let project = PbxProj::from_value(&sample()).unwrap();
        let config = CodecConfig::default();
        let first = PlistValue::Dictionary(project.plist(&config).unwrap());

        let reparsed = PbxProj::from_value(&first.to_raw()).unwrap();
        let second = PlistValue::Dictionary(reparsed.plist(&config).unwrap());
        assert_eq!(first, second);
    }

    #[test]
    fn test_aggregate_scenario_has_no_build_rules() {
        let project = PbxProj::from_value(&sample()).unwrap();
        let reference = project.objects.reference("T2").unwrap();
        let (_, record) = project.encode_object(&reference, &CodecConfig::default()).unwrap();
        assert!(record.get("buildRules").is_none());
    }

    #[test]
    fn test_add_object_generates_reference() {
        let mut project = PbxProj::from_value(&sample()).unwrap();
        let before = project.objects.len();
        let target = project.add_object(Object::Target(Target::new(TargetKind::Native, "Tests")));
        assert_eq!(project.objects.len(), before + 1);
        assert_eq!(project.objects.target(&target).unwrap().name, "Tests");
        assert!(project.references.contains(target.value()));
    }

    #[test]
    fn test_removed_object_makes_encode_fail() {
        let mut project = PbxProj::from_value(&sample()).unwrap();
        let dependency = project.reference("D1");
        project.objects.remove(&dependency);
        let err = project.plist(&CodecConfig::default()).unwrap_err();
        assert!(matches!(err, CodecError::DanglingReference { ref reference } if reference == "D1"));

        let app = project.reference("T1");
        assert!(project.objects.target_mut(&app).unwrap().remove_dependency(&dependency));
        assert!(project.plist(&CodecConfig::default()).is_ok());
    }

    #[test]
    fn test_shared_project_edits_visible_to_readers() {
        let shared = PbxProj::from_value(&sample()).unwrap().into_shared();
        let config_ref = shared.write().reference("C1");

        let writer = shared.clone();
        let handle = std::thread::spawn(move || {
            let mut project = writer.write();
            let updated = project
                .objects
                .build_configuration(&config_ref)
                .unwrap()
                .adding_build("OTHER_FLAG", "-O0");
            *project.objects.build_configuration_mut(&config_ref).unwrap() = updated;
        });
        handle.join().unwrap();

        let project = shared.read();
        let reference = project.objects.reference("C1").unwrap();
        let configuration: &BuildConfiguration = project.objects.build_configuration(&reference).unwrap();
        assert!(configuration.setting("OTHER_FLAG").is_some());
        assert!(configuration.setting("SWIFT_VERSION").is_some());
    }
}
