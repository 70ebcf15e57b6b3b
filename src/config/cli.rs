use crate::core::ConfigProvider;
use crate::domain::services::{DEFAULT_DATE_FORMAT, DEFAULT_KEY_SEPARATOR};
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_date_format, validate_delimiter, validate_non_empty_string, validate_path, Validate,
};
use clap::Parser;
use serde::{Deserialize, Serialize};

fn parse_delimiter(raw: &str) -> std::result::Result<char, String> {
    match raw {
        "tab" | "\\t" => Ok('\t'),
        _ => {
            let mut chars = raw.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(c),
                _ => Err(format!(
                    "expected a single character or 'tab', got '{}'",
                    raw
                )),
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "flat-etl")]
#[command(about = "Flatten a JSON array of records, drop redundant keys and write JSON plus TSV")]
pub struct CliConfig {
    /// Source JSON file, e.g. raw/data.json
    pub input: String,

    /// Keys removed from every record regardless of their values
    #[arg(
        long,
        value_delimiter = ',',
        default_values = ["plan.id", "plan.name", "development_mode"]
    )]
    pub ignore: Vec<String>,

    /// Keys never removed, even when identical across all records
    #[arg(long, value_delimiter = ',')]
    pub keep: Vec<String>,

    #[arg(
        long,
        value_delimiter = ',',
        default_values = ["created_on", "updated_on", "activated_on", "modified_on"]
    )]
    pub date_keys: Vec<String>,

    /// strftime format applied to date keys (UTC)
    #[arg(long, default_value = DEFAULT_DATE_FORMAT)]
    pub date_format: String,

    /// Column delimiter of the tabular files ('tab' or a single character)
    #[arg(long, default_value = "tab", value_parser = parse_delimiter)]
    pub delimiter: char,

    /// Joins nested key paths
    #[arg(long, default_value = DEFAULT_KEY_SEPARATOR)]
    pub key_separator: String,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

impl ConfigProvider for CliConfig {
    fn input_path(&self) -> &str {
        &self.input
    }

    fn ignored_keys(&self) -> &[String] {
        &self.ignore
    }

    fn kept_keys(&self) -> &[String] {
        &self.keep
    }

    fn date_keys(&self) -> &[String] {
        &self.date_keys
    }

    fn date_format(&self) -> &str {
        &self.date_format
    }

    fn delimiter(&self) -> char {
        self.delimiter
    }

    fn key_separator(&self) -> &str {
        &self.key_separator
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("input", &self.input)?;
        validate_delimiter("delimiter", self.delimiter)?;
        validate_non_empty_string("key_separator", &self.key_separator)?;
        validate_date_format("date_format", &self.date_format)?;

        for key in self.keep.iter().filter(|key| self.ignore.contains(key)) {
            tracing::warn!("⚠️ '{}' is both kept and ignored; keeping it", key);
        }
        Ok(())
    }
}
