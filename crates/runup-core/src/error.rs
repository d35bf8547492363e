use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("dependency at {host}:{port} not reachable after {waited:?}")]
    WaitTimeout {
        host: String,
        port: u16,
        waited: Duration,
    },

    #[error("schema synchronization failed: {0}")]
    Migrate(String),

    #[error("asset publication failed: {0}")]
    Collect(String),

    #[error("account provisioning failed: {0}")]
    Provision(String),

    #[error("launch failed: {0}")]
    Launch(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, BootstrapError>;
