pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::{cli::LocalStorage, Settings};

#[cfg(feature = "lambda")]
pub use config::lambda::{LambdaConfig, S3Storage};

pub use core::{etl::MenuEngine, pipeline::MenuPipeline};
pub use utils::error::{BuchaError, Result};
