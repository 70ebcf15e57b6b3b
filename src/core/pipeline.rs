use crate::core::{ConfigProvider, Pipeline, Record, Storage, TransformResult};
use crate::domain::services::{
    derived_output_path, eliminate, flatten_record, format_dates, serialize, tabular_path,
};
use crate::utils::error::{EtlError, Result};
use serde_json::Value;

/// Reads a JSON array of records, snapshots it, flattens and de-duplicates the
/// keys, then writes the JSON and tabular renditions next to the input.
pub struct NormalizePipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> NormalizePipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    /// Writes `json` to `json_path` and `table` to its tabular sibling concurrently.
    /// Failures are logged and returned, never propagated.
    async fn write_pair(&self, json_path: &str, json: &str, table: &str) -> Vec<EtlError> {
        let table_path = tabular_path(json_path, self.config.delimiter());

        let (json_written, table_written) = tokio::join!(
            self.storage.write_file(json_path, json.as_bytes()),
            self.storage.write_file(&table_path, table.as_bytes()),
        );

        let mut failures = Vec::new();
        for (path, outcome) in [(json_path, json_written), (table_path.as_str(), table_written)] {
            match outcome {
                Ok(()) => tracing::debug!("💾 Wrote {}", path),
                Err(e) => {
                    let err = EtlError::FileWriteError {
                        path: path.to_string(),
                        reason: e.to_string(),
                    };
                    tracing::error!("❌ {}", err);
                    failures.push(err);
                }
            }
        }
        failures
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for NormalizePipeline<S, C> {
    async fn extract(&self) -> Result<Vec<Record>> {
        let path = self.config.input_path();
        let read_error = |reason: String| EtlError::FileReadError {
            path: path.to_string(),
            reason,
        };

        tracing::debug!("Reading records from: {}", path);
        let bytes = self
            .storage
            .read_file(path)
            .await
            .map_err(|e| read_error(e.to_string()))?;
        let json: Value = serde_json::from_slice(&bytes).map_err(|e| read_error(e.to_string()))?;
        let Value::Array(items) = json else {
            return Err(read_error("expected a JSON array of records".to_string()));
        };

        let snapshot_json = serde_json::to_string_pretty(&items)?;
        let records = items
            .into_iter()
            .enumerate()
            .map(|(index, item)| Record::from_value(index, item))
            .collect::<Result<Vec<_>>>()?;
        let snapshot_table = serialize(&records, self.config.delimiter())?;

        let failures = self.write_pair(path, &snapshot_json, &snapshot_table).await;
        if !failures.is_empty() {
            tracing::warn!(
                "⚠️ Snapshot incomplete: {} of 2 files could not be written",
                failures.len()
            );
        }

        Ok(records)
    }

    async fn transform(&self, data: Vec<Record>) -> Result<TransformResult> {
        let separator = self.config.key_separator();
        let date_keys = self.config.date_keys();
        let date_format = self.config.date_format();

        let normalized: Vec<Record> = data
            .iter()
            .enumerate()
            .map(|(index, record)| {
                let flat = flatten_record(record, separator);
                let (formatted, skipped) = format_dates(&flat, date_keys, date_format);
                for key in skipped {
                    tracing::warn!(
                        "⚠️ Record {}: '{}' is not a recognizable date, left unchanged",
                        index,
                        key
                    );
                }
                formatted
            })
            .collect();

        let elimination = eliminate(
            &normalized,
            self.config.kept_keys(),
            self.config.ignored_keys(),
        );
        if !elimination.removed_keys.is_empty() {
            tracing::info!("🧹 Removed keys: {}", elimination.removed_keys.join(", "));
        }

        let json_output = serde_json::to_string_pretty(&elimination.records)?;
        let tabular_output = serialize(&elimination.records, self.config.delimiter())?;

        Ok(TransformResult {
            processed_records: elimination.records,
            removed_keys: elimination.removed_keys,
            json_output,
            tabular_output,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let input_path = self.config.input_path();
        let output_path = derived_output_path(input_path);
        if output_path == input_path {
            tracing::warn!(
                "⚠️ '{}' has no raw/ segment, the output replaces the snapshot",
                input_path
            );
        }

        let failures = self
            .write_pair(&output_path, &result.json_output, &result.tabular_output)
            .await;
        if !failures.is_empty() {
            tracing::warn!(
                "⚠️ Output incomplete: {} of 2 files could not be written",
                failures.len()
            );
        }

        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::etl::EtlEngine;
    use crate::domain::services::DEFAULT_DATE_FORMAT;
    use std::collections::{HashMap, HashSet};
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
        read_only: Arc<HashSet<String>>,
    }

    impl MockStorage {
        fn with_file(path: &str, content: &str) -> Self {
            let mut files = HashMap::new();
            files.insert(path.to_string(), content.as_bytes().to_vec());
            Self {
                files: Arc::new(Mutex::new(files)),
                read_only: Arc::new(HashSet::new()),
            }
        }

        fn with_read_only(mut self, paths: &[&str]) -> Self {
            self.read_only = Arc::new(paths.iter().map(|p| p.to_string()).collect());
            self
        }

        async fn get_json(&self, path: &str) -> Option<Value> {
            let files = self.files.lock().await;
            files
                .get(path)
                .map(|bytes| serde_json::from_slice(bytes).unwrap())
        }

        async fn get_text(&self, path: &str) -> Option<String> {
            let files = self.files.lock().await;
            files
                .get(path)
                .map(|bytes| String::from_utf8(bytes.clone()).unwrap())
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                EtlError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            if self.read_only.contains(path) {
                return Err(EtlError::IoError(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    format!("Read-only: {}", path),
                )));
            }
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        input_path: String,
        ignored_keys: Vec<String>,
        kept_keys: Vec<String>,
        date_keys: Vec<String>,
    }

    impl MockConfig {
        fn new(input_path: &str) -> Self {
            Self {
                input_path: input_path.to_string(),
                ignored_keys: vec!["plan.id".to_string(), "plan.name".to_string()],
                kept_keys: vec![],
                date_keys: vec!["created_on".to_string()],
            }
        }

        fn keep(mut self, keys: &[&str]) -> Self {
            self.kept_keys = keys.iter().map(|k| k.to_string()).collect();
            self
        }
    }

    impl ConfigProvider for MockConfig {
        fn input_path(&self) -> &str {
            &self.input_path
        }

        fn ignored_keys(&self) -> &[String] {
            &self.ignored_keys
        }

        fn kept_keys(&self) -> &[String] {
            &self.kept_keys
        }

        fn date_keys(&self) -> &[String] {
            &self.date_keys
        }

        fn date_format(&self) -> &str {
            DEFAULT_DATE_FORMAT
        }

        fn delimiter(&self) -> char {
            '\t'
        }

        fn key_separator(&self) -> &str {
            "."
        }
    }

    const PLAN_DATA: &str =
        r#"[{"plan":{"id":1,"name":"x"},"val":7},{"plan":{"id":2,"name":"y"},"val":7}]"#;

    #[tokio::test]
    async fn test_extract_writes_snapshot() {
        let storage = MockStorage::with_file("raw/data.json", PLAN_DATA);
        let pipeline = NormalizePipeline::new(storage.clone(), MockConfig::new("raw/data.json"));

        let records = pipeline.extract().await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].data.get("plan"), Some(&serde_json::json!({"id": 1, "name": "x"})));

        let expected: Value = serde_json::from_str(PLAN_DATA).unwrap();
        assert_eq!(storage.get_json("raw/data.json").await, Some(expected));
        let snapshot_text = storage.get_text("raw/data.json").await.unwrap();
        assert!(snapshot_text.starts_with("[\n  {\n    \"plan\""));

        let table = storage.get_text("raw/data.tsv").await.unwrap();
        assert_eq!(table.lines().next(), Some("plan\tval"));
        assert_eq!(table.lines().count(), 3);
    }

    #[tokio::test]
    async fn test_extract_missing_file() {
        let pipeline = NormalizePipeline::new(MockStorage::default(), MockConfig::new("raw/none.json"));

        let err = pipeline.extract().await.unwrap_err();
        assert!(matches!(err, EtlError::FileReadError { ref path, .. } if path == "raw/none.json"));
    }

    #[tokio::test]
    async fn test_extract_rejects_malformed_and_non_array_json() {
        for content in [r#"[{"a": 1},"#, r#"{"a": 1}"#] {
            let storage = MockStorage::with_file("raw/data.json", content);
            let pipeline = NormalizePipeline::new(storage, MockConfig::new("raw/data.json"));

            let err = pipeline.extract().await.unwrap_err();
            assert!(matches!(err, EtlError::FileReadError { .. }), "{content}: {err}");
        }
    }

    #[tokio::test]
    async fn test_extract_empty_array_fails_before_writing() {
        let storage = MockStorage::with_file("raw/data.json", "[]");
        let pipeline = NormalizePipeline::new(storage.clone(), MockConfig::new("raw/data.json"));

        let err = pipeline.extract().await.unwrap_err();
        assert!(matches!(err, EtlError::EmptyBatchError));
        assert_eq!(storage.get_text("raw/data.json").await.as_deref(), Some("[]"));
        assert!(storage.get_text("raw/data.tsv").await.is_none());
    }

    #[tokio::test]
    async fn test_extract_rejects_non_object_elements() {
        let storage = MockStorage::with_file("raw/data.json", r#"[{"a": 1}, 2]"#);
        let pipeline = NormalizePipeline::new(storage, MockConfig::new("raw/data.json"));

        let err = pipeline.extract().await.unwrap_err();
        assert!(matches!(err, EtlError::ValidationError { .. }));
    }

    #[tokio::test]
    async fn test_transform_removes_ignored_and_identical_keys() {
        let storage = MockStorage::with_file("raw/data.json", PLAN_DATA);
        let pipeline = NormalizePipeline::new(storage, MockConfig::new("raw/data.json"));

        let records = pipeline.extract().await.unwrap();
        let result = pipeline.transform(records).await.unwrap();

        assert!(result.processed_records.iter().all(|r| r.data.is_empty()));
        assert_eq!(result.removed_keys, vec!["plan.id", "plan.name", "val"]);
        assert_eq!(result.json_output, "[\n  {},\n  {}\n]");
        assert_eq!(result.tabular_output, "\n\n");
    }

    #[tokio::test]
    async fn test_transform_keeps_listed_keys() {
        let storage = MockStorage::with_file("raw/data.json", PLAN_DATA);
        let pipeline = NormalizePipeline::new(storage, MockConfig::new("raw/data.json").keep(&["val"]));

        let records = pipeline.extract().await.unwrap();
        let result = pipeline.transform(records).await.unwrap();

        let output: Value = serde_json::from_str(&result.json_output).unwrap();
        assert_eq!(output, serde_json::json!([{"val": 7}, {"val": 7}]));
        assert_eq!(result.tabular_output, "val\n7\n7");
    }

    #[tokio::test]
    async fn test_transform_flattens_and_formats_dates() {
        let storage = MockStorage::with_file(
            "raw/users.json",
            r#"[
                {"id": 1, "created_on": "2024-01-15T10:30:00Z", "owner": {"name": "a", "team": "core"}},
                {"id": 2, "created_on": "2024-02-01T08:00:00Z", "owner": {"name": "b", "team": "core"}}
            ]"#,
        );
        let pipeline = NormalizePipeline::new(storage, MockConfig::new("raw/users.json"));

        let records = pipeline.extract().await.unwrap();
        let result = pipeline.transform(records).await.unwrap();

        assert_eq!(result.removed_keys, vec!["owner.team"]);
        assert_eq!(
            result.tabular_output,
            "id\tcreated_on\towner.name\n1\t15.1.2024, 10.30\ta\n2\t1.2.2024, 08.00\tb"
        );
    }

    #[tokio::test]
    async fn test_load_writes_derived_pair() {
        let storage = MockStorage::with_file("raw/data.json", PLAN_DATA);
        let pipeline =
            NormalizePipeline::new(storage.clone(), MockConfig::new("raw/data.json").keep(&["val"]));

        let records = pipeline.extract().await.unwrap();
        let result = pipeline.transform(records).await.unwrap();
        let output_path = pipeline.load(result).await.unwrap();

        assert_eq!(output_path, "data.json");
        assert_eq!(
            storage.get_json("data.json").await,
            Some(serde_json::json!([{"val": 7}, {"val": 7}]))
        );
        assert_eq!(storage.get_text("data.tsv").await.as_deref(), Some("val\n7\n7"));
    }

    #[tokio::test]
    async fn test_write_failure_does_not_abort_the_run() {
        let storage = MockStorage::with_file("raw/data.json", PLAN_DATA)
            .with_read_only(&["raw/data.tsv", "data.json"]);
        let engine = EtlEngine::new(NormalizePipeline::new(
            storage.clone(),
            MockConfig::new("raw/data.json").keep(&["val"]),
        ));

        let output_path = engine.run().await.unwrap();

        assert_eq!(output_path, "data.json");
        assert!(storage.get_text("raw/data.tsv").await.is_none());
        assert!(storage.get_text("data.json").await.is_none());
        assert_eq!(storage.get_text("data.tsv").await.as_deref(), Some("val\n7\n7"));
    }
}
