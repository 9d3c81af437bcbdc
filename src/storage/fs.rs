//! Filesystem-backed object store.
//!
//! Layout: `<root>/<namespace>/<object>`. Puts write a hidden temporary file
//! next to the target and rename it over the target, so readers never see a
//! partially written object.

use super::{ObjectRef, ObjectStore, validate_name};
use crate::error::{PlatformError, Result, ResultExt as _};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn bucket_path(&self, namespace: &str) -> Result<PathBuf> {
        validate_name("namespace", namespace)?;
        Ok(self.root.join(namespace))
    }

    fn object_path(&self, namespace: &str, name: &str) -> Result<PathBuf> {
        validate_name("object", name)?;
        Ok(self.bucket_path(namespace)?.join(name))
    }
}

impl ObjectStore for FsStore {
    fn bucket_exists(&self, namespace: &str) -> Result<bool> {
        Ok(self.bucket_path(namespace)?.is_dir())
    }

    fn make_bucket(&self, namespace: &str) -> Result<()> {
        let path = self.bucket_path(namespace)?;
        fs::create_dir_all(&path)
            .with_context(|| format!("Failed to create namespace directory {}", path.display()))
    }

    fn list_objects(&self, namespace: &str) -> Result<Vec<ObjectRef>> {
        let dir = self.bucket_path(namespace)?;
        let entries = fs::read_dir(&dir).map_err(|e| {
            PlatformError::Storage(format!("cannot list namespace '{namespace}': {e}"))
        })?;

        let mut objects = Vec::new();
        for entry in entries {
            let entry = entry?;
            let metadata = entry.metadata()?;
            if !metadata.is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                tracing::warn!(path = %entry.path().display(), "Skipping non UTF-8 object name");
                continue;
            };
            // Hidden files are in-flight temporaries.
            if name.starts_with('.') {
                continue;
            }
            objects.push(ObjectRef {
                namespace: namespace.to_owned(),
                name,
                size: metadata.len(),
            });
        }
        objects.sort();
        Ok(objects)
    }

    fn get_object(&self, namespace: &str, name: &str) -> Result<Vec<u8>> {
        let path = self.object_path(namespace, name)?;
        fs::read(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => PlatformError::ObjectNotFound {
                namespace: namespace.to_owned(),
                name: name.to_owned(),
            },
            _ => PlatformError::Io(e),
        })
    }

    fn put_object(
        &self,
        namespace: &str,
        name: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<()> {
        let target = self.object_path(namespace, name)?;
        if !self.bucket_exists(namespace)? {
            return Err(PlatformError::Storage(format!(
                "namespace '{namespace}' does not exist"
            )));
        }

        let tmp = self.bucket_path(namespace)?.join(format!(".{name}.tmp"));
        fs::write(&tmp, bytes)
            .with_context(|| format!("Failed to write temporary object {}", tmp.display()))?;
        if let Err(e) = fs::rename(&tmp, &target) {
            let _ = fs::remove_file(&tmp);
            return Err(PlatformError::Io(e));
        }

        tracing::debug!(namespace, name, content_type, size = bytes.len(), "Stored object");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fs_store_roundtrip() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = FsStore::new(dir.path());

        assert!(!store.bucket_exists("input-data")?);
        store.make_bucket("input-data")?;
        assert!(store.bucket_exists("input-data")?);

        store.put_object("input-data", "b.csv", b"x,y\n1,2\n", "text/csv")?;
        store.put_object("input-data", "a.csv", b"x,y\n3,4\n", "text/csv")?;

        let names: Vec<String> = store
            .list_objects("input-data")?
            .into_iter()
            .map(|o| o.name)
            .collect();
        assert_eq!(names, vec!["a.csv", "b.csv"]);
        assert_eq!(store.get_object("input-data", "a.csv")?, b"x,y\n3,4\n");
        Ok(())
    }

    #[test]
    fn test_put_replaces_and_leaves_no_temporaries() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = FsStore::new(dir.path());
        store.make_bucket("batch-data")?;

        store.put_object("batch-data", "report.json", b"{}", "application/json")?;
        store.put_object("batch-data", "report.json", b"{\"v\":2}", "application/json")?;

        assert_eq!(store.get_object("batch-data", "report.json")?, b"{\"v\":2}");
        let entries = std::fs::read_dir(dir.path().join("batch-data"))?.count();
        assert_eq!(entries, 1);
        Ok(())
    }

    #[test]
    fn test_missing_object_and_namespace() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = FsStore::new(dir.path());
        assert!(matches!(
            store.get_object("input-data", "a.csv"),
            Err(PlatformError::ObjectNotFound { .. })
        ));
        assert!(store.list_objects("input-data").is_err());
        assert!(store.put_object("input-data", "a.csv", b"", "text/csv").is_err());
        Ok(())
    }

    #[test]
    fn test_rejects_path_traversal() {
        let store = FsStore::new("/tmp/unused");
        assert!(store.get_object("..", "etc").is_err());
        assert!(store.get_object("ns", "../escape").is_err());
    }
}
