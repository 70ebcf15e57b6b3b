pub mod adapters;
#[cfg(feature = "cli")]
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::storage::LocalStorage;
#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use crate::core::{etl::EtlEngine, pipeline::NormalizePipeline};
pub use domain::model::{Record, TransformResult};
pub use utils::error::{EtlError, Result};
