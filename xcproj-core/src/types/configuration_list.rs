//! `XCConfigurationList`: the set of configurations a target or project builds with

use crate::config::CodecConfig;
use crate::decode::{DecodeContext, FieldReader, PlistDecodable};
use crate::error::Result;
use crate::objects::{Object, ObjectStore, PROJECT_ISA};
use crate::plist::{CommentedString, PlistDictionary, PlistSerializable, PlistValue};
use crate::reference::ObjectReference;

pub const CONFIGURATION_LIST_ISA: &str = "XCConfigurationList";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationList {
    pub build_configurations: Vec<ObjectReference>,
    pub default_configuration_is_visible: Option<String>,
    pub default_configuration_name: Option<String>,
}

impl ConfigurationList {
    pub fn new(build_configurations: Vec<ObjectReference>) -> Self {
        Self {
            build_configurations,
            default_configuration_is_visible: Some("0".to_string()),
            default_configuration_name: None,
        }
    }
}

impl PlistDecodable for ConfigurationList {
    fn decode(
        _reference: &ObjectReference,
        fields: &FieldReader<'_>,
        context: &mut DecodeContext,
    ) -> Result<Self> {
        Ok(ConfigurationList {
            build_configurations: context.reference_list(fields, "buildConfigurations")?,
            default_configuration_is_visible: fields
                .optional_str("defaultConfigurationIsVisible")?
                .map(str::to_string),
            default_configuration_name: fields
                .optional_str("defaultConfigurationName")?
                .map(str::to_string),
        })
    }
}

impl PlistSerializable for ConfigurationList {
    fn plist_element(
        &self,
        reference: &ObjectReference,
        objects: &ObjectStore,
        config: &CodecConfig,
    ) -> Result<(CommentedString, PlistValue)> {
        let mut dictionary = PlistDictionary::new();
        dictionary.insert("isa".into(), PlistValue::string(CONFIGURATION_LIST_ISA));

        let configurations = self
            .build_configurations
            .iter()
            .map(|configuration| {
                let name = objects.build_configuration(configuration)?.name.clone();
                Ok(PlistValue::String(CommentedString::reference(configuration, Some(name))))
            })
            .collect::<Result<Vec<_>>>()?;
        dictionary.insert("buildConfigurations".into(), PlistValue::Array(configurations));

        if let Some(visible) = &self.default_configuration_is_visible {
            dictionary.insert("defaultConfigurationIsVisible".into(), PlistValue::string(visible.as_str()));
        }
        if let Some(name) = &self.default_configuration_name {
            dictionary.insert("defaultConfigurationName".into(), PlistValue::string(name.as_str()));
        }

        let owner = objects
            .targets()
            .find(|(_, target)| target.build_configuration_list.as_ref() == Some(reference))
            .map(|(_, target)| target.configuration_list_comment())
            .or_else(|| project_owner_comment(reference, objects, config));

        Ok((CommentedString::reference(reference, owner), PlistValue::Dictionary(dictionary)))
    }
}

/// Comment for the project's own list. Needs a project name, taken from
/// the config or a `name` field on the project object.
fn project_owner_comment(
    reference: &ObjectReference,
    objects: &ObjectStore,
    config: &CodecConfig,
) -> Option<String> {
    let project = objects.iter().find_map(|(_, object)| match object {
        Object::Other(other)
            if other.isa == PROJECT_ISA
                && other.fields.get("buildConfigurationList").and_then(|v| v.as_str())
                    == Some(reference.value()) =>
        {
            Some(other)
        }
        _ => None,
    })?;
    let name = config
        .project_name
        .as_deref()
        .or_else(|| project.fields.get("name").and_then(|v| v.as_str()))?;
    Some(format!("Build configuration list for {} \"{}\"", PROJECT_ISA, name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encode_comments_configurations_and_owner() {
        let mut context = DecodeContext::new();
        context
            .decode_objects(
                json!({
                    "L1": {
                        "isa": "XCConfigurationList",
                        "buildConfigurations": ["C1", "C2"],
                        "defaultConfigurationIsVisible": "0",
                        "defaultConfigurationName": "Release",
                    },
                    "C1": { "isa": "XCBuildConfiguration", "name": "Debug" },
                    "C2": { "isa": "XCBuildConfiguration", "name": "Release" },
                    "T1": { "isa": "PBXAggregateTarget", "name": "All", "buildConfigurationList": "L1" },
                })
                .as_object()
                .unwrap(),
            )
            .unwrap();
        let reference = context.reference("L1");
        let list = context.objects.configuration_list(&reference).unwrap();
        let (key, value) = list
            .plist_element(&reference, &context.objects, &CodecConfig::default())
            .unwrap();

        assert_eq!(
            key.comment.as_deref(),
            Some("Build configuration list for PBXAggregateTarget \"All\"")
        );
        let configurations = value.get("buildConfigurations").unwrap().as_array().unwrap();
        assert_eq!(
            configurations[1],
            PlistValue::String(CommentedString::with_comment("C2", "Release"))
        );
        assert_eq!(
            value.get("defaultConfigurationName").and_then(PlistValue::as_str),
            Some("Release")
        );
    }

    fn project_list(config: &CodecConfig) -> CommentedString {
        let mut context = DecodeContext::new();
        context
            .decode_objects(
                json!({
                    "R1": { "isa": "PBXProject", "buildConfigurationList": "L0", "targets": [] },
                    "L0": { "isa": "XCConfigurationList", "buildConfigurations": [] },
                })
                .as_object()
                .unwrap(),
            )
            .unwrap();
        let reference = context.reference("L0");
        let (key, _) = context
            .objects
            .configuration_list(&reference)
            .unwrap()
            .plist_element(&reference, &context.objects, config)
            .unwrap();
        key
    }

    #[test]
    fn test_project_list_comment_uses_project_name() {
        let config = CodecConfig {
            project_name: Some("Demo".to_string()),
            ..CodecConfig::default()
        };
        assert_eq!(
            project_list(&config).comment.as_deref(),
            Some("Build configuration list for PBXProject \"Demo\"")
        );
    }

    #[test]
    fn test_project_list_without_name_has_no_comment() {
        assert!(project_list(&CodecConfig::default()).comment.is_none());
    }

    #[test]
    fn test_unowned_list_has_no_comment() {
        let mut context = DecodeContext::new();
        context
            .decode_objects(json!({ "L1": { "isa": "XCConfigurationList" } }).as_object().unwrap())
            .unwrap();
        let reference = context.reference("L1");
        let (key, _) = context
            .objects
            .configuration_list(&reference)
            .unwrap()
            .plist_element(&reference, &context.objects, &CodecConfig::default())
            .unwrap();
        assert!(key.comment.is_none());
    }
}
