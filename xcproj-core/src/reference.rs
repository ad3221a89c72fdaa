//! Object references
//!
//! A reference is an identifier handle into an [`ObjectStore`](crate::ObjectStore).
//! References never point at objects directly: resolving one is an explicit
//! lookup that can fail with [`CodecError::DanglingReference`](crate::CodecError).

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Serialize, Serializer};
use uuid::Uuid;

/// Number of hex digits in an identifier minted by [`ReferenceRepository::generate`]
const GENERATED_ID_LEN: usize = 24;

/// Identifier handle for an object in the project graph.
///
/// Equality, ordering and hashing are by identifier. References handed out by
/// the same [`ReferenceRepository`] for the same identifier also share their
/// allocation, which [`ObjectReference::ptr_eq`] observes.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectReference(Arc<str>);

impl ObjectReference {
    /// The raw identifier string
    pub fn value(&self) -> &str {
        &self.0
    }

    /// True when both handles are the same interned instance
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }
}

impl fmt::Debug for ObjectReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectReference({})", self.0)
    }
}

impl fmt::Display for ObjectReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ObjectReference {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ObjectReference {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl Serialize for ObjectReference {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Memoizing factory for [`ObjectReference`]s.
///
/// Holds at most one reference per identifier. Creating a reference never
/// fails, even when no object with that identifier has been registered yet.
#[derive(Debug, Default, Clone)]
pub struct ReferenceRepository {
    references: HashMap<Arc<str>, ObjectReference>,
}

impl ReferenceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the reference for `identifier`, creating it on first sight
    pub fn get_or_create(&mut self, identifier: &str) -> ObjectReference {
        if let Some(existing) = self.references.get(identifier) {
            return existing.clone();
        }
        let key: Arc<str> = Arc::from(identifier);
        let reference = ObjectReference(key.clone());
        self.references.insert(key, reference.clone());
        reference
    }

    /// Look up a reference without creating one
    pub fn get(&self, identifier: &str) -> Option<&ObjectReference> {
        self.references.get(identifier)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.references.contains_key(identifier)
    }

    pub fn len(&self) -> usize {
        self.references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    /// Mint a reference for an identifier this repository has never seen.
    ///
    /// Identifiers are 24 uppercase hex digits, the shape project files use.
    pub fn generate(&mut self) -> ObjectReference {
        loop {
            let candidate = Uuid::new_v4().simple().to_string()[..GENERATED_ID_LEN].to_uppercase();
            if !self.contains(&candidate) {
                tracing::trace!("Generated object identifier {}", candidate);
                return self.get_or_create(&candidate);
            }
        }
    }
}
