//! Objects the codec only needs a name or comment from.
//!
//! Each keeps its full raw field set and is written back as a passthrough
//! record.

use crate::decode::{DecodeContext, FieldReader, PlistDecodable, RawObject};
use crate::error::{CodecError, Result};
use crate::plist::{raw_record, CommentedString, PlistValue};
use crate::reference::ObjectReference;

pub const BUILD_RULE_ISA: &str = "PBXBuildRule";
pub const TARGET_DEPENDENCY_ISA: &str = "PBXTargetDependency";

/// Build phase kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildPhaseKind {
    Sources,
    Frameworks,
    Resources,
    Headers,
    CopyFiles,
    ShellScript,
    CarbonResources,
}

impl BuildPhaseKind {
    pub const ALL: [BuildPhaseKind; 7] = [
        BuildPhaseKind::Sources,
        BuildPhaseKind::Frameworks,
        BuildPhaseKind::Resources,
        BuildPhaseKind::Headers,
        BuildPhaseKind::CopyFiles,
        BuildPhaseKind::ShellScript,
        BuildPhaseKind::CarbonResources,
    ];

    pub fn isa(self) -> &'static str {
        match self {
            BuildPhaseKind::Sources => "PBXSourcesBuildPhase",
            BuildPhaseKind::Frameworks => "PBXFrameworksBuildPhase",
            BuildPhaseKind::Resources => "PBXResourcesBuildPhase",
            BuildPhaseKind::Headers => "PBXHeadersBuildPhase",
            BuildPhaseKind::CopyFiles => "PBXCopyFilesBuildPhase",
            BuildPhaseKind::ShellScript => "PBXShellScriptBuildPhase",
            BuildPhaseKind::CarbonResources => "PBXRezBuildPhase",
        }
    }

    pub fn from_isa(isa: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.isa() == isa)
    }

    /// Display name when the phase has no name of its own
    fn default_name(self) -> &'static str {
        match self {
            BuildPhaseKind::Sources => "Sources",
            BuildPhaseKind::Frameworks => "Frameworks",
            BuildPhaseKind::Resources => "Resources",
            BuildPhaseKind::Headers => "Headers",
            BuildPhaseKind::CopyFiles => "CopyFiles",
            BuildPhaseKind::ShellScript => "ShellScript",
            BuildPhaseKind::CarbonResources => "Rez",
        }
    }

    /// Only copy-files and script phases honor a user-given name
    fn is_nameable(self) -> bool {
        matches!(self, BuildPhaseKind::CopyFiles | BuildPhaseKind::ShellScript)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuildPhase {
    pub kind: BuildPhaseKind,
    pub name: Option<String>,
    pub fields: RawObject,
}

impl BuildPhase {
    /// Name used in comments wherever the phase is cited
    pub fn name(&self) -> &str {
        match &self.name {
            Some(name) if self.kind.is_nameable() => name,
            _ => self.kind.default_name(),
        }
    }
}

impl PlistDecodable for BuildPhase {
    fn decode(
        _reference: &ObjectReference,
        fields: &FieldReader<'_>,
        _context: &mut DecodeContext,
    ) -> Result<Self> {
        let isa = fields.required_str("isa")?;
        let kind = BuildPhaseKind::from_isa(isa).ok_or_else(|| CodecError::InvalidEnumValue {
            object: fields.object().to_string(),
            field: "isa".to_string(),
            value: isa.to_string(),
        })?;
        Ok(BuildPhase {
            kind,
            name: fields.optional_str("name")?.map(str::to_string),
            fields: fields.raw().clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuildRule {
    pub fields: RawObject,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TargetDependency {
    pub target: Option<ObjectReference>,
    pub fields: RawObject,
}

impl PlistDecodable for BuildRule {
    fn decode(
        _reference: &ObjectReference,
        fields: &FieldReader<'_>,
        _context: &mut DecodeContext,
    ) -> Result<Self> {
        Ok(BuildRule {
            fields: fields.raw().clone(),
        })
    }
}

impl PlistDecodable for TargetDependency {
    fn decode(
        _reference: &ObjectReference,
        fields: &FieldReader<'_>,
        context: &mut DecodeContext,
    ) -> Result<Self> {
        Ok(TargetDependency {
            target: context.optional_reference(fields, "target")?,
            fields: fields.raw().clone(),
        })
    }
}

pub const FILE_ELEMENT_ISAS: [&str; 5] = [
    "PBXFileReference",
    "PBXGroup",
    "PBXVariantGroup",
    "XCVersionGroup",
    "PBXReferenceProxy",
];

/// A file reference or group
#[derive(Debug, Clone, PartialEq)]
pub struct FileElement {
    pub isa: String,
    pub name: Option<String>,
    pub path: Option<String>,
    pub fields: RawObject,
}

impl FileElement {
    /// `name` if set, otherwise the last component of `path`
    pub fn file_name(&self) -> Option<String> {
        if let Some(name) = &self.name {
            return Some(name.clone());
        }
        self.path
            .as_deref()
            .and_then(|path| path.trim_end_matches('/').rsplit('/').next())
            .filter(|last| !last.is_empty())
            .map(str::to_string)
    }
}

impl PlistDecodable for FileElement {
    fn decode(
        _reference: &ObjectReference,
        fields: &FieldReader<'_>,
        _context: &mut DecodeContext,
    ) -> Result<Self> {
        Ok(FileElement {
            isa: fields.required_str("isa")?.to_string(),
            name: fields.optional_str("name")?.map(str::to_string),
            path: fields.optional_str("path")?.map(str::to_string),
            fields: fields.raw().clone(),
        })
    }
}

/// Any object kind the codec does not model
#[derive(Debug, Clone, PartialEq)]
pub struct OpaqueObject {
    pub isa: String,
    pub fields: RawObject,
}

/// Passthrough record keyed by `reference` with an optional comment
pub(crate) fn passthrough(
    reference: &ObjectReference,
    isa: &str,
    fields: &RawObject,
    comment: Option<String>,
) -> (CommentedString, PlistValue) {
    (
        CommentedString::reference(reference, comment),
        PlistValue::Dictionary(raw_record(isa, fields)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode<T: PlistDecodable>(value: serde_json::Value) -> Result<T> {
        let fields: RawObject = value.as_object().cloned().unwrap();
        let mut context = DecodeContext::new();
        let reference = context.reference("X1");
        T::decode(&reference, &FieldReader::new("X1", &fields), &mut context)
    }

    #[test]
    fn test_fixed_phase_names_ignore_name_field() {
        let phase: BuildPhase = decode(json!({ "isa": "PBXSourcesBuildPhase", "name": "Custom" })).unwrap();
        assert_eq!(phase.name(), "Sources");

        let phase: BuildPhase = decode(json!({ "isa": "PBXRezBuildPhase" })).unwrap();
        assert_eq!(phase.name(), "Rez");
    }

    #[test]
    fn test_nameable_phases() {
        let phase: BuildPhase = decode(json!({ "isa": "PBXShellScriptBuildPhase", "name": "SwiftLint" })).unwrap();
        assert_eq!(phase.name(), "SwiftLint");

        let phase: BuildPhase = decode(json!({ "isa": "PBXShellScriptBuildPhase" })).unwrap();
        assert_eq!(phase.name(), "ShellScript");

        let phase: BuildPhase = decode(json!({ "isa": "PBXCopyFilesBuildPhase" })).unwrap();
        assert_eq!(phase.name(), "CopyFiles");
    }

    #[test]
    fn test_file_name_prefers_name() {
        let file: FileElement =
            decode(json!({ "isa": "PBXFileReference", "name": "Shown.swift", "path": "a/b/Real.swift" })).unwrap();
        assert_eq!(file.file_name().as_deref(), Some("Shown.swift"));
    }

    #[test]
    fn test_file_name_from_path() {
        let file: FileElement = decode(json!({ "isa": "PBXFileReference", "path": "a/b/Real.swift" })).unwrap();
        assert_eq!(file.file_name().as_deref(), Some("Real.swift"));

        let group: FileElement = decode(json!({ "isa": "PBXGroup", "path": "Sources/" })).unwrap();
        assert_eq!(group.file_name().as_deref(), Some("Sources"));

        let anonymous: FileElement = decode(json!({ "isa": "PBXGroup" })).unwrap();
        assert_eq!(anonymous.file_name(), None);
    }

    #[test]
    fn test_dependency_target_is_interned() {
        let dependency: TargetDependency = decode(json!({ "isa": "PBXTargetDependency", "target": "T9" })).unwrap();
        assert_eq!(dependency.target.unwrap().value(), "T9");
    }
}
