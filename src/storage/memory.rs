use super::{ObjectRef, ObjectStore, validate_name};
use crate::error::{PlatformError, Result};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

type Buckets = BTreeMap<String, BTreeMap<String, StoredObject>>;

/// In-process object store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    buckets: Mutex<Buckets>,
    puts: Mutex<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with the given namespaces already created.
    pub fn with_buckets(namespaces: &[&str]) -> Self {
        let store = Self::new();
        if let Ok(mut buckets) = store.buckets.lock() {
            for ns in namespaces {
                buckets.entry((*ns).to_owned()).or_default();
            }
        }
        store
    }

    fn lock(&self) -> Result<MutexGuard<'_, Buckets>> {
        self.buckets
            .lock()
            .map_err(|e| PlatformError::Storage(format!("store lock poisoned: {e}")))
    }

    /// Number of successful `put_object` calls so far.
    pub fn put_count(&self) -> usize {
        self.puts.lock().map(|n| *n).unwrap_or_default()
    }

    /// Stored object with its metadata, if present.
    pub fn object(&self, namespace: &str, name: &str) -> Option<StoredObject> {
        self.lock()
            .ok()?
            .get(namespace)
            .and_then(|b| b.get(name))
            .cloned()
    }
}

impl ObjectStore for MemoryStore {
    fn bucket_exists(&self, namespace: &str) -> Result<bool> {
        Ok(self.lock()?.contains_key(namespace))
    }

    fn make_bucket(&self, namespace: &str) -> Result<()> {
        validate_name("namespace", namespace)?;
        self.lock()?.entry(namespace.to_owned()).or_default();
        Ok(())
    }

    fn list_objects(&self, namespace: &str) -> Result<Vec<ObjectRef>> {
        let buckets = self.lock()?;
        let bucket = buckets
            .get(namespace)
            .ok_or_else(|| PlatformError::Storage(format!("namespace '{namespace}' does not exist")))?;
        Ok(bucket
            .iter()
            .map(|(name, obj)| ObjectRef {
                namespace: namespace.to_owned(),
                name: name.clone(),
                size: obj.bytes.len() as u64,
            })
            .collect())
    }

    fn get_object(&self, namespace: &str, name: &str) -> Result<Vec<u8>> {
        self.lock()?
            .get(namespace)
            .and_then(|b| b.get(name))
            .map(|obj| obj.bytes.clone())
            .ok_or_else(|| PlatformError::ObjectNotFound {
                namespace: namespace.to_owned(),
                name: name.to_owned(),
            })
    }

    fn put_object(
        &self,
        namespace: &str,
        name: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<()> {
        validate_name("object", name)?;
        let mut buckets = self.lock()?;
        let bucket = buckets
            .get_mut(namespace)
            .ok_or_else(|| PlatformError::Storage(format!("namespace '{namespace}' does not exist")))?;
        bucket.insert(name.to_owned(), StoredObject {
            bytes: bytes.to_vec(),
            content_type: content_type.to_owned(),
        });
        drop(buckets);

        if let Ok(mut puts) = self.puts.lock() {
            *puts += 1;
        }
        Ok(())
    }
}
