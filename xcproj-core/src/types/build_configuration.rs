//! Build configurations
//!
//! `XCBuildConfiguration` is a value type: [`BuildConfiguration::adding_build`]
//! and [`BuildConfiguration::removing_build`] return new instances and leave
//! the receiver untouched.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::CodecConfig;
use crate::decode::{DecodeContext, FieldReader, PlistDecodable};
use crate::error::{CodecError, Result};
use crate::objects::ObjectStore;
use crate::plist::{CommentedString, PlistDictionary, PlistSerializable, PlistValue};
use crate::reference::ObjectReference;

pub const BUILD_CONFIGURATION_ISA: &str = "XCBuildConfiguration";

/// A single build setting value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BuildSetting {
    String(String),
    Array(Vec<String>),
}

impl BuildSetting {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            BuildSetting::String(s) => Some(s),
            BuildSetting::Array(_) => None,
        }
    }

    fn to_plist(&self) -> PlistValue {
        match self {
            BuildSetting::String(s) => PlistValue::string(s.as_str()),
            BuildSetting::Array(items) => {
                PlistValue::Array(items.iter().map(|item| PlistValue::string(item.as_str())).collect())
            }
        }
    }
}

impl From<&str> for BuildSetting {
    fn from(value: &str) -> Self {
        BuildSetting::String(value.to_string())
    }
}

impl From<String> for BuildSetting {
    fn from(value: String) -> Self {
        BuildSetting::String(value)
    }
}

impl From<Vec<String>> for BuildSetting {
    fn from(value: Vec<String>) -> Self {
        BuildSetting::Array(value)
    }
}

/// Setting name to value. Comparison ignores insertion order.
pub type BuildSettings = BTreeMap<String, BuildSetting>;

/// A named set of build settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfiguration {
    pub reference: ObjectReference,
    pub name: String,
    pub base_configuration_reference: Option<ObjectReference>,
    pub build_settings: BuildSettings,
}

impl BuildConfiguration {
    pub fn new(reference: ObjectReference, name: impl Into<String>) -> Self {
        Self {
            reference,
            name: name.into(),
            base_configuration_reference: None,
            build_settings: BuildSettings::new(),
        }
    }

    pub fn with_base_configuration(mut self, base: Option<ObjectReference>) -> Self {
        self.base_configuration_reference = base;
        self
    }

    pub fn with_build_settings(mut self, build_settings: BuildSettings) -> Self {
        self.build_settings = build_settings;
        self
    }

    /// New configuration with `setting` set to `value`, inserting or overwriting
    #[must_use]
    pub fn adding_build(&self, setting: &str, value: impl Into<BuildSetting>) -> Self {
        let mut build_settings = self.build_settings.clone();
        build_settings.insert(setting.to_string(), value.into());
        Self {
            build_settings,
            ..self.clone()
        }
    }

    /// New configuration without `setting`; absent settings are a no-op
    #[must_use]
    pub fn removing_build(&self, setting: &str) -> Self {
        let mut build_settings = self.build_settings.clone();
        build_settings.remove(setting);
        Self {
            build_settings,
            ..self.clone()
        }
    }

    pub fn setting(&self, setting: &str) -> Option<&BuildSetting> {
        self.build_settings.get(setting)
    }
}

fn decode_build_settings(fields: &FieldReader<'_>) -> Result<BuildSettings> {
    let Some(raw) = fields.optional_dictionary("buildSettings")? else {
        return Ok(BuildSettings::new());
    };
    raw.iter()
        .map(|(key, value)| {
            let setting = match value {
                Value::String(s) => BuildSetting::String(s.clone()),
                Value::Array(items) => BuildSetting::Array(
                    items
                        .iter()
                        .map(|item| item.as_str().map(str::to_string))
                        .collect::<Option<Vec<_>>>()
                        .ok_or_else(|| setting_mismatch(fields, key))?,
                ),
                _ => return Err(setting_mismatch(fields, key)),
            };
            Ok((key.clone(), setting))
        })
        .collect()
}

fn setting_mismatch(fields: &FieldReader<'_>, key: &str) -> CodecError {
    CodecError::mismatch(
        fields.object(),
        &format!("buildSettings.{}", key),
        "a string or list of strings",
    )
}

impl PlistDecodable for BuildConfiguration {
    fn decode(
        reference: &ObjectReference,
        fields: &FieldReader<'_>,
        context: &mut DecodeContext,
    ) -> Result<Self> {
        Ok(BuildConfiguration {
            reference: reference.clone(),
            base_configuration_reference: context
                .optional_reference(fields, "baseConfigurationReference")?,
            build_settings: decode_build_settings(fields)?,
            name: fields.required_name("name")?.to_string(),
        })
    }
}

impl PlistSerializable for BuildConfiguration {
    fn plist_element(
        &self,
        reference: &ObjectReference,
        objects: &ObjectStore,
        config: &CodecConfig,
    ) -> Result<(CommentedString, PlistValue)> {
        let mut dictionary = PlistDictionary::new();
        dictionary.insert("isa".into(), PlistValue::string(BUILD_CONFIGURATION_ISA));

        if config.emit_base_configuration_reference {
            if let Some(base) = &self.base_configuration_reference {
                let file_name = objects.file_element(base)?.file_name();
                dictionary.insert(
                    "baseConfigurationReference".into(),
                    PlistValue::String(CommentedString::reference(base, file_name)),
                );
            }
        }

        dictionary.insert("name".into(), PlistValue::string(self.name.as_str()));
        let settings: PlistDictionary = self
            .build_settings
            .iter()
            .map(|(key, value)| (CommentedString::new(key.as_str()), value.to_plist()))
            .collect();
        dictionary.insert("buildSettings".into(), PlistValue::Dictionary(settings));

        Ok((
            CommentedString::reference(reference, Some(self.name.clone())),
            PlistValue::Dictionary(dictionary),
        ))
    }
}
