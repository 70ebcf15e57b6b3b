use crate::core::Pipeline;
use crate::utils::error::Result;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    /// Runs extract, transform and load in order and returns the output path.
    pub async fn run(&self) -> Result<String> {
        tracing::info!("🚀 Starting ETL process");

        // Extract
        tracing::info!("📥 Extracting data...");
        let raw_data = self.pipeline.extract().await?;
        tracing::info!("📥 Extracted {} records", raw_data.len());

        // Transform
        tracing::info!("🔄 Transforming data...");
        let transformed_result = self.pipeline.transform(raw_data).await?;
        tracing::info!(
            "🔄 Transformed {} records, removed {} keys",
            transformed_result.processed_records.len(),
            transformed_result.removed_keys.len()
        );

        // Load
        tracing::info!("💾 Loading data...");
        let output_path = self.pipeline.load(transformed_result).await?;
        tracing::info!("💾 Output saved to: {}", output_path);

        Ok(output_path)
    }
}
