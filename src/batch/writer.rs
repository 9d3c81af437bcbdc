use super::report::Report;
use crate::error::Result;
use crate::storage::{JSON_CONTENT_TYPE, ObjectRef, ObjectStore};

/// Renders `report` as indented JSON with a trailing newline.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render(report: &Report) -> Result<Vec<u8>> {
    let mut bytes = serde_json::to_vec_pretty(report)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Writes the rendered report to `namespace/object`, replacing any previous
/// report. The namespace is created if missing.
///
/// # Errors
///
/// Returns an error if rendering or any storage call fails.
pub fn publish(
    store: &dyn ObjectStore,
    report: &Report,
    namespace: &str,
    object: &str,
) -> Result<ObjectRef> {
    let bytes = render(report)?;
    store.ensure_bucket(namespace)?;
    store.put_object(namespace, object, &bytes, JSON_CONTENT_TYPE)?;
    tracing::info!(namespace, object, size = bytes.len(), "Published report");

    Ok(ObjectRef {
        namespace: namespace.to_owned(),
        name: object.to_owned(),
        size: bytes.len() as u64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{CellValue, Column, Dataset};
    use crate::storage::MemoryStore;

    fn sample_report() -> anyhow::Result<Report> {
        let ds = Dataset::new(vec![
            Column::new("Identifier", vec![CellValue::Integer(2), CellValue::Integer(4)]),
            Column::new("name", vec![CellValue::Text("a".to_owned()), CellValue::Null]),
        ])?;
        Ok(Report::summarize(&ds, "Identifier"))
    }

    #[test]
    fn test_publish_twice_is_byte_identical() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let report = sample_report()?;

        publish(&store, &report, "batch-data", "analytics_report.json")?;
        let first = store.get_object("batch-data", "analytics_report.json")?;
        publish(&store, &report, "batch-data", "analytics_report.json")?;
        let second = store.get_object("batch-data", "analytics_report.json")?;

        assert_eq!(first, second);
        assert_eq!(store.list_objects("batch-data")?.len(), 1);
        Ok(())
    }

    #[test]
    fn test_published_with_json_content_type() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        publish(&store, &sample_report()?, "batch-data", "analytics_report.json")?;
        let stored = store
            .object("batch-data", "analytics_report.json")
            .expect("report stored");
        assert_eq!(stored.content_type, JSON_CONTENT_TYPE);
        Ok(())
    }

    #[test]
    fn test_render_is_indented_and_newline_terminated() -> anyhow::Result<()> {
        let text = String::from_utf8(render(&sample_report()?)?)?;
        assert!(text.starts_with("{\n  \"total_rows\": 2,"));
        assert!(text.ends_with("}\n"));
        assert!(text.contains("\"missing_values\": {\n    \"Identifier\": 0,\n    \"name\": 1\n  }"));
        Ok(())
    }
}
