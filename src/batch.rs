//! Batch aggregation.
//!
//! One run lists every object in the input namespace, loads each through
//! [`crate::loader`], tags its rows with the object name, stacks everything
//! into one dataset and publishes a [`Report`] over it.
//!
//! ```text
//! list_objects ─> get_object ─> loader::load ─> tag rows ─┐
//!                                                          v
//!          writer::publish <─ Report::summarize <─ Dataset::concat
//! ```
//!
//! Objects are processed in lexical name order. The report is assembled in
//! memory before anything is written, so a failed run leaves the previous
//! report in place. Runs are not safe against each other; schedule at most
//! one at a time.

pub mod report;
pub mod writer;

pub use report::{ColumnGroups, Report, SkippedFile};

use crate::config::{FailurePolicy, PlatformConfig};
use crate::dataset::{CellValue, Dataset};
use crate::error::{PlatformError, Result};
use crate::loader;
use crate::storage::{ObjectRef, ObjectStore};
use std::time::Instant;

pub struct BatchAggregator<'a> {
    store: &'a dyn ObjectStore,
    config: &'a PlatformConfig,
}

impl<'a> BatchAggregator<'a> {
    pub fn new(store: &'a dyn ObjectStore, config: &'a PlatformConfig) -> Self {
        Self { store, config }
    }

    /// Builds the report and publishes it to the output namespace.
    ///
    /// # Errors
    ///
    /// - [`PlatformError::NoInputData`] if the input namespace is empty
    /// - loader errors for an unreadable object under
    ///   [`FailurePolicy::FailFast`]
    /// - storage errors from listing, reading or publishing
    pub fn run_batch(&self) -> Result<Report> {
        let started = Instant::now();
        let report = self.build_report()?;
        writer::publish(
            self.store,
            &report,
            &self.config.output_namespace,
            &self.config.report_object,
        )?;
        tracing::info!(
            rows = report.total_rows,
            columns = report.total_columns,
            skipped = report.skipped_files.len(),
            elapsed_ms = started.elapsed().as_millis(),
            "Batch run complete"
        );
        Ok(report)
    }

    /// Builds the report without publishing it.
    ///
    /// # Errors
    ///
    /// Same as [`Self::run_batch`], minus publishing.
    pub fn build_report(&self) -> Result<Report> {
        self.config.validate()?;
        let objects = self.discover()?;
        tracing::info!(
            namespace = %self.config.input_namespace,
            objects = objects.len(),
            "Starting batch run"
        );

        let (datasets, skipped) = self.load_all(&objects)?;
        let unified = Dataset::concat(datasets);

        let mut report = Report::summarize(&unified, &self.config.identifier_column);
        report.skipped_files = skipped;
        Ok(report)
    }

    /// Input objects in lexical name order. A missing input namespace counts
    /// as empty.
    fn discover(&self) -> Result<Vec<ObjectRef>> {
        let namespace = &self.config.input_namespace;
        let mut objects = if self.store.bucket_exists(namespace)? {
            self.store.list_objects(namespace)?
        } else {
            tracing::warn!(namespace = %namespace, "Input namespace does not exist");
            Vec::new()
        };

        if objects.is_empty() {
            return Err(PlatformError::NoInputData {
                namespace: namespace.clone(),
            });
        }
        objects.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(objects)
    }

    fn load_all(&self, objects: &[ObjectRef]) -> Result<(Vec<Dataset>, Vec<SkippedFile>)> {
        let mut datasets = Vec::with_capacity(objects.len());
        let mut skipped = Vec::new();

        for object in objects {
            match self.load_object(object) {
                Ok(ds) => datasets.push(ds),
                Err(err)
                    if err.is_per_file() && self.config.on_file_error == FailurePolicy::Skip =>
                {
                    tracing::warn!(object = %object.name, error = %err, "Skipping object");
                    skipped.push(SkippedFile {
                        name: object.name.clone(),
                        reason: err.to_string(),
                    });
                }
                Err(err) => {
                    tracing::error!(object = %object.name, error = %err, "Batch run aborted");
                    return Err(err);
                }
            }
        }
        Ok((datasets, skipped))
    }

    fn load_object(&self, object: &ObjectRef) -> Result<Dataset> {
        let raw = self.store.get_object(&object.namespace, &object.name)?;
        let dataset = loader::load(&object.name, &raw)?;
        tracing::info!(
            object = %object.name,
            rows = dataset.row_count(),
            columns = dataset.column_count(),
            "Loaded object"
        );
        Ok(dataset.with_constant_column(
            &self.config.provenance_column,
            &CellValue::Text(object.name.clone()),
        ))
    }
}

/// Runs one batch with `config` against `store`.
///
/// # Errors
///
/// See [`BatchAggregator::run_batch`].
pub fn run_batch(store: &dyn ObjectStore, config: &PlatformConfig) -> Result<Report> {
    BatchAggregator::new(store, config).run_batch()
}
