use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Environment variable error: {0}")]
    Env(#[from] std::env::VarError),

    #[error("feed returned no records")]
    EmptyFetch,

    #[error("flattening {records} records produced no rows")]
    EmptyResult { records: usize },

    #[error("destination schema error: {0}")]
    Schema(String),

    #[error("bulk insert failed: {message}")]
    Insertion { message: String, sample: String },
}

pub type Result<T> = std::result::Result<T, IngestError>;
