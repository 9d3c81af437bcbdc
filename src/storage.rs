//! Object storage collaborator.
//!
//! The batch pipeline only sees the narrow [`ObjectStore`] interface: flat
//! namespaces holding immutable named byte payloads. Retries and timeouts
//! belong to implementations, never to callers.
//!
//! Two implementations ship with the crate:
//!
//! - [`FsStore`]: a namespace is a directory under a root, an object is a file
//! - [`MemoryStore`]: process-local maps, used by tests and dry runs

pub mod fs;
pub mod memory;

pub use fs::FsStore;
pub use memory::MemoryStore;

use crate::error::{PlatformError, Result};

/// Content type used for published JSON documents.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Reference to one stored object.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectRef {
    pub namespace: String,
    pub name: String,
    pub size: u64,
}

pub trait ObjectStore {
    /// # Errors
    ///
    /// Returns an error if the backend cannot be queried.
    fn bucket_exists(&self, namespace: &str) -> Result<bool>;

    /// Creates `namespace`. Creating an existing namespace is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the namespace cannot be created.
    fn make_bucket(&self, namespace: &str) -> Result<()>;

    /// # Errors
    ///
    /// Returns an error if the namespace does not exist or cannot be read.
    fn list_objects(&self, namespace: &str) -> Result<Vec<ObjectRef>>;

    /// # Errors
    ///
    /// Returns [`PlatformError::ObjectNotFound`] for a missing object.
    fn get_object(&self, namespace: &str, name: &str) -> Result<Vec<u8>>;

    /// Writes `bytes` under `name`, fully replacing any previous object.
    ///
    /// # Errors
    ///
    /// Returns an error if the namespace does not exist or the write fails.
    fn put_object(&self, namespace: &str, name: &str, bytes: &[u8], content_type: &str)
    -> Result<()>;

    /// Creates `namespace` unless it already exists.
    ///
    /// # Errors
    ///
    /// Propagates backend errors.
    fn ensure_bucket(&self, namespace: &str) -> Result<()> {
        if !self.bucket_exists(namespace)? {
            tracing::info!(namespace, "Creating namespace");
            self.make_bucket(namespace)?;
        }
        Ok(())
    }
}

/// Namespace and object names must be single, non-empty path segments.
///
/// # Errors
///
/// Returns [`PlatformError::Storage`] for names that would escape a flat
/// namespace.
pub fn validate_name(kind: &str, name: &str) -> Result<()> {
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0')
    {
        return Err(PlatformError::Storage(format!("invalid {kind} name '{name}'")));
    }
    Ok(())
}
