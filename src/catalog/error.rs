use std::path::PathBuf;

use thiserror::Error;

/// Request-level failures: the catalog could not be read, parsed, or trusted.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("failed to read recipe catalog {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("recipe catalog {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("recipe {recipe:?} has invalid serves={serves} (must be a positive number)")]
    InvalidServes { recipe: String, serves: f64 },
}
