use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("search query must not be empty")]
    EmptyQuery,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
