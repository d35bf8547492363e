use std::time::Duration;

/// Canonical flag value that selects the development launch path. A strict
/// equality test, deliberately not a truthy coercion: "true", "TRUE", "1"
/// and friends all fall through to production.
pub const DEVELOPMENT_TOKEN: &str = "True";

/// The dependency to probe before anything else runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Development,
    Production,
}

impl RunMode {
    /// Derive the run mode from the raw mode flag. Only the exact canonical
    /// token selects development; absent, empty, or differently-cased values
    /// all select production.
    pub fn from_flag(flag: Option<&str>) -> Self {
        match flag {
            Some(DEVELOPMENT_TOKEN) => RunMode::Development,
            _ => RunMode::Production,
        }
    }
}

impl std::fmt::Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunMode::Development => write!(f, "development"),
            RunMode::Production => write!(f, "production"),
        }
    }
}

/// Fixed default credentials for the privileged account. Only used when the
/// account subsystem reports zero existing privileged accounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminDefaults {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

impl Default for AdminDefaults {
    fn default() -> Self {
        Self {
            username: "admin".into(),
            email: "admin@example.com".into(),
            password: "admin".into(),
            first_name: "Site".into(),
            last_name: "Admin".into(),
        }
    }
}

/// The single explicit configuration struct, built once at startup and passed
/// into every step. Steps never read the environment behind its back.
#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    /// Database endpoint the readiness prober blocks on.
    pub database: Endpoint,
    /// Fixed delay between connection attempts.
    pub poll_interval: Duration,
    /// Optional upper bound on the total probe wait. `None` (the default)
    /// means retry forever.
    pub max_wait: Option<Duration>,
    /// Raw mode flag as configured; `RunMode::from_flag` interprets it.
    pub mode_flag: Option<String>,
    /// Interface and port the launched server binds to.
    pub bind: String,
    /// Worker count for the production process manager.
    pub workers: u16,
    /// Path of the management script the external subsystems live behind.
    pub manage_script: String,
    /// WSGI application path handed to the production process manager.
    pub wsgi_app: String,
    pub admin: AdminDefaults,
}

impl BootstrapConfig {
    pub fn run_mode(&self) -> RunMode {
        RunMode::from_flag(self.mode_flag.as_deref())
    }
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            database: Endpoint {
                host: "localhost".into(),
                port: 5432,
            },
            poll_interval: Duration::from_secs(1),
            max_wait: None,
            mode_flag: None,
            bind: "0.0.0.0:8000".into(),
            workers: 3,
            manage_script: "manage.py".into(),
            wsgi_app: "core.wsgi:application".into(),
            admin: AdminDefaults::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_canonical_token_selects_development() {
        assert_eq!(RunMode::from_flag(Some("True")), RunMode::Development);
        for other in ["true", "TRUE", "", "1", "yes", "False"] {
            assert_eq!(
                RunMode::from_flag(Some(other)),
                RunMode::Production,
                "flag {other:?} must select production"
            );
        }
        assert_eq!(RunMode::from_flag(None), RunMode::Production);
    }

    #[test]
    fn default_config_retries_forever() {
        let config = BootstrapConfig::default();
        assert!(config.max_wait.is_none());
        assert_eq!(config.poll_interval, Duration::from_secs(1));
        assert_eq!(config.run_mode(), RunMode::Production);
    }

    #[test]
    fn endpoint_address_formats_host_and_port() {
        let endpoint = Endpoint {
            host: "db".into(),
            port: 5432,
        };
        assert_eq!(endpoint.address(), "db:5432");
    }
}
