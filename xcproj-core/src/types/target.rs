//! Buildable targets
//!
//! Native, aggregate and legacy targets share one field set. They differ
//! only in their `isa` and in whether `buildRules` is written out, which is
//! decided by [`TargetKind::writes_build_rules`].

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::config::CodecConfig;
use crate::decode::{DecodeContext, FieldReader, PlistDecodable};
use crate::error::Result;
use crate::objects::ObjectStore;
use crate::plist::{CommentedString, PlistDictionary, PlistSerializable, PlistValue};
use crate::reference::ObjectReference;
use crate::types::{BUILD_RULE_ISA, TARGET_DEPENDENCY_ISA};

/// Concrete target variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TargetKind {
    Native,
    Aggregate,
    Legacy,
}

impl TargetKind {
    pub const ALL: [TargetKind; 3] = [TargetKind::Native, TargetKind::Aggregate, TargetKind::Legacy];

    pub fn isa(self) -> &'static str {
        match self {
            TargetKind::Native => "PBXNativeTarget",
            TargetKind::Aggregate => "PBXAggregateTarget",
            TargetKind::Legacy => "PBXLegacyTarget",
        }
    }

    pub fn from_isa(isa: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.isa() == isa)
    }

    /// Whether a target of this kind with `rules` writes a `buildRules` key.
    ///
    /// Aggregate targets never do; legacy targets only when they have rules.
    pub fn writes_build_rules(self, rules: &[ObjectReference]) -> bool {
        match self {
            TargetKind::Native => true,
            TargetKind::Aggregate => false,
            TargetKind::Legacy => !rules.is_empty(),
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.isa())
    }
}

macro_rules! product_types {
    ($($variant:ident => $raw:literal,)*) => {
        /// Target product type
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum ProductType {
            $($variant,)*
        }

        impl ProductType {
            pub const ALL: &'static [ProductType] = &[$(ProductType::$variant,)*];

            /// Raw string as written in project files
            pub fn as_str(self) -> &'static str {
                match self {
                    $(ProductType::$variant => $raw,)*
                }
            }
        }
    };
}

product_types! {
    Application => "com.apple.product-type.application",
    Framework => "com.apple.product-type.framework",
    StaticFramework => "com.apple.product-type.framework.static",
    XcFramework => "wrapper.xcframework",
    DynamicLibrary => "com.apple.product-type.library.dynamic",
    StaticLibrary => "com.apple.product-type.library.static",
    Bundle => "com.apple.product-type.bundle",
    UnitTestBundle => "com.apple.product-type.bundle.unit-test",
    UiTestBundle => "com.apple.product-type.bundle.ui-testing",
    AppExtension => "com.apple.product-type.app-extension",
    ExtensionKitExtension => "com.apple.product-type.extensionkit-extension",
    CommandLineTool => "com.apple.product-type.tool",
    WatchApp => "com.apple.product-type.application.watchapp",
    Watch2App => "com.apple.product-type.application.watchapp2",
    Watch2AppContainer => "com.apple.product-type.application.watchapp2-container",
    WatchExtension => "com.apple.product-type.watchkit-extension",
    Watch2Extension => "com.apple.product-type.watchkit2-extension",
    TvExtension => "com.apple.product-type.tv-app-extension",
    MessagesApplication => "com.apple.product-type.application.messages",
    MessagesExtension => "com.apple.product-type.app-extension.messages",
    StickerPack => "com.apple.product-type.app-extension.messages-sticker-pack",
    XpcService => "com.apple.product-type.xpc-service",
    OcUnitTestBundle => "com.apple.product-type.bundle.ocunit-test",
    XcodeExtension => "com.apple.product-type.xcode-extension",
    InstrumentsPackage => "com.apple.product-type.instruments-package",
    IntentsServiceExtension => "com.apple.product-type.app-extension.intents-service",
    OnDemandInstallCapableApplication => "com.apple.product-type.application.on-demand-install-capable",
    MetalLibrary => "com.apple.product-type.metal-library",
    DriverExtension => "com.apple.product-type.driver-extension",
    SystemExtension => "com.apple.product-type.system-extension",
}

/// Unrecognized product type string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown product type: {0}")]
pub struct UnknownProductType(pub String);

impl FromStr for ProductType {
    type Err = UnknownProductType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProductType::ALL
            .iter()
            .copied()
            .find(|product_type| product_type.as_str() == s)
            .ok_or_else(|| UnknownProductType(s.to_string()))
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ProductType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A buildable target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub kind: TargetKind,
    pub name: String,
    pub build_configuration_list: Option<ObjectReference>,
    pub build_phases: Vec<ObjectReference>,
    pub build_rules: Vec<ObjectReference>,
    pub dependencies: Vec<ObjectReference>,
    pub product_name: Option<String>,
    pub product_reference: Option<ObjectReference>,
    pub product_type: Option<ProductType>,
}

impl Target {
    pub fn new(kind: TargetKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            build_configuration_list: None,
            build_phases: Vec::new(),
            build_rules: Vec::new(),
            dependencies: Vec::new(),
            product_name: None,
            product_reference: None,
            product_type: None,
        }
    }

    pub fn isa(&self) -> &'static str {
        self.kind.isa()
    }

    pub fn add_dependency(&mut self, dependency: ObjectReference) {
        self.dependencies.push(dependency);
    }

    /// Remove every occurrence of `dependency`, returning whether any was present
    pub fn remove_dependency(&mut self, dependency: &ObjectReference) -> bool {
        remove_all(&mut self.dependencies, dependency)
    }

    pub fn add_build_phase(&mut self, phase: ObjectReference) {
        self.build_phases.push(phase);
    }

    pub fn remove_build_phase(&mut self, phase: &ObjectReference) -> bool {
        remove_all(&mut self.build_phases, phase)
    }

    pub fn add_build_rule(&mut self, rule: ObjectReference) {
        self.build_rules.push(rule);
    }

    /// Comment used wherever this target's configuration list is cited
    pub fn configuration_list_comment(&self) -> String {
        format!("Build configuration list for {} \"{}\"", self.isa(), self.name)
    }
}

fn remove_all(references: &mut Vec<ObjectReference>, reference: &ObjectReference) -> bool {
    let before = references.len();
    references.retain(|r| r != reference);
    references.len() != before
}

impl PlistDecodable for Target {
    fn decode(
        _reference: &ObjectReference,
        fields: &FieldReader<'_>,
        context: &mut DecodeContext,
    ) -> Result<Self> {
        let isa = fields.required_str("isa")?;
        let kind = TargetKind::from_isa(isa).ok_or_else(|| crate::CodecError::InvalidEnumValue {
            object: fields.object().to_string(),
            field: "isa".to_string(),
            value: isa.to_string(),
        })?;

        Ok(Target {
            kind,
            name: fields.required_name("name")?.to_string(),
            build_configuration_list: context.optional_reference(fields, "buildConfigurationList")?,
            build_phases: context.reference_list(fields, "buildPhases")?,
            build_rules: context.reference_list(fields, "buildRules")?,
            dependencies: context.reference_list(fields, "dependencies")?,
            product_name: fields.optional_str("productName")?.map(str::to_string),
            product_reference: context.optional_reference(fields, "productReference")?,
            product_type: fields.optional_enum("productType")?,
        })
    }
}

impl PlistSerializable for Target {
    fn plist_element(
        &self,
        reference: &ObjectReference,
        objects: &ObjectStore,
        _config: &CodecConfig,
    ) -> Result<(CommentedString, PlistValue)> {
        let mut dictionary = PlistDictionary::new();
        dictionary.insert("isa".into(), PlistValue::string(self.isa()));

        if let Some(list) = &self.build_configuration_list {
            objects.configuration_list(list)?;
            dictionary.insert(
                "buildConfigurationList".into(),
                PlistValue::String(CommentedString::reference(
                    list,
                    Some(self.configuration_list_comment()),
                )),
            );
        }

        let phases = self
            .build_phases
            .iter()
            .map(|phase| {
                let name = objects.build_phase(phase)?.name().to_string();
                Ok(PlistValue::String(CommentedString::reference(phase, Some(name))))
            })
            .collect::<Result<Vec<_>>>()?;
        dictionary.insert("buildPhases".into(), PlistValue::Array(phases));

        if self.kind.writes_build_rules(&self.build_rules) {
            dictionary.insert(
                "buildRules".into(),
                labelled_references(&self.build_rules, BUILD_RULE_ISA, objects)?,
            );
        }

        dictionary.insert(
            "dependencies".into(),
            labelled_references(&self.dependencies, TARGET_DEPENDENCY_ISA, objects)?,
        );
        dictionary.insert("name".into(), PlistValue::string(self.name.as_str()));

        if let Some(product_name) = &self.product_name {
            dictionary.insert("productName".into(), PlistValue::string(product_name.as_str()));
        }
        if let Some(product_type) = self.product_type {
            dictionary.insert("productType".into(), PlistValue::string(product_type.as_str()));
        }
        if let Some(product) = &self.product_reference {
            let file_name = objects.file_element(product)?.file_name();
            dictionary.insert(
                "productReference".into(),
                PlistValue::String(CommentedString::reference(product, file_name)),
            );
        }

        Ok((
            CommentedString::reference(reference, Some(self.name.clone())),
            PlistValue::Dictionary(dictionary),
        ))
    }
}

/// References annotated with a fixed label; each must still resolve
fn labelled_references(
    references: &[ObjectReference],
    label: &str,
    objects: &ObjectStore,
) -> Result<PlistValue> {
    references
        .iter()
        .map(|reference| {
            objects.object(reference)?;
            Ok(PlistValue::String(CommentedString::reference(
                reference,
                Some(label.to_string()),
            )))
        })
        .collect::<Result<Vec<_>>>()
        .map(PlistValue::Array)
}
