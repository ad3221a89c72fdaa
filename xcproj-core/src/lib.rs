//! xcproj Core Library
//!
//! This crate provides the object graph and codec for Xcode project files:
//! - Object references and the memoizing reference repository
//! - The object store and typed resolution
//! - Target, build configuration and configuration list entities
//! - Decoding raw object dictionaries and encoding commented records
//! - Rendering the textual project format

pub mod config;
pub mod decode;
pub mod error;
pub mod objects;
pub mod plist;
pub mod project;
pub mod reference;
pub mod types;
pub mod writer;

// Re-export commonly used types
pub use config::{CodecConfig, ConfigError, CONFIG_FILE_NAME};
pub use decode::{DecodeContext, FieldReader, PlistDecodable, RawObject};
pub use error::{CodecError, Result};
pub use objects::{Object, ObjectStore};
pub use plist::{CommentedString, PlistDictionary, PlistSerializable, PlistValue};
pub use project::{PbxProj, SharedProject};
pub use reference::{ObjectReference, ReferenceRepository};
pub use types::{
    BuildConfiguration, BuildPhase, BuildPhaseKind, BuildRule, BuildSetting, BuildSettings,
    ConfigurationList, FileElement, OpaqueObject, ProductType, Target, TargetDependency, TargetKind,
};
