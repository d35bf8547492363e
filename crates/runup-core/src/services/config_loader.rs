use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{BootstrapError, Result};
use crate::models::BootstrapConfig;

pub const CONFIG_FILENAME: &str = "runup.yaml";

/// Optional on-disk overrides; every field falls back to the built-in
/// defaults, and environment variables take precedence over all of it.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    database: Option<FileEndpoint>,
    #[serde(default)]
    poll_interval_secs: Option<u64>,
    #[serde(default)]
    max_wait_secs: Option<u64>,
    #[serde(default)]
    debug: Option<String>,
    #[serde(default)]
    bind: Option<String>,
    #[serde(default)]
    workers: Option<u16>,
    #[serde(default)]
    manage_script: Option<String>,
    #[serde(default)]
    wsgi_app: Option<String>,
    #[serde(default)]
    superuser: Option<FileSuperuser>,
}

#[derive(Debug, Deserialize)]
struct FileEndpoint {
    #[serde(default)]
    host: Option<String>,
    #[serde(default)]
    port: Option<u16>,
}

#[derive(Debug, Deserialize)]
struct FileSuperuser {
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    password: Option<String>,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
}

/// Build the one configuration struct for this run: defaults, then the
/// optional `runup.yaml` in `dir`, then environment variables.
pub fn resolve(dir: &Path, env: &HashMap<String, String>) -> Result<BootstrapConfig> {
    let mut config = BootstrapConfig::default();

    let config_path = dir.join(CONFIG_FILENAME);
    if config_path.exists() {
        let contents = std::fs::read_to_string(&config_path)?;
        let file: FileConfig = serde_yaml::from_str(&contents)?;
        apply_file(&mut config, file);
    }

    apply_env(&mut config, env)?;
    validate(&config)?;
    Ok(config)
}

/// Resolve from the process environment and working directory.
pub fn from_env() -> Result<BootstrapConfig> {
    let vars: HashMap<String, String> = std::env::vars().collect();
    let cwd = std::env::current_dir()?;
    resolve(&cwd, &vars)
}

fn apply_file(config: &mut BootstrapConfig, file: FileConfig) {
    if let Some(endpoint) = file.database {
        if let Some(host) = endpoint.host {
            config.database.host = host;
        }
        if let Some(port) = endpoint.port {
            config.database.port = port;
        }
    }
    if let Some(secs) = file.poll_interval_secs {
        config.poll_interval = Duration::from_secs(secs);
    }
    if let Some(secs) = file.max_wait_secs {
        config.max_wait = Some(Duration::from_secs(secs));
    }
    if file.debug.is_some() {
        config.mode_flag = file.debug;
    }
    if let Some(bind) = file.bind {
        config.bind = bind;
    }
    if let Some(workers) = file.workers {
        config.workers = workers;
    }
    if let Some(script) = file.manage_script {
        config.manage_script = script;
    }
    if let Some(app) = file.wsgi_app {
        config.wsgi_app = app;
    }
    if let Some(superuser) = file.superuser {
        let admin = &mut config.admin;
        if let Some(username) = superuser.username {
            admin.username = username;
        }
        if let Some(email) = superuser.email {
            admin.email = email;
        }
        if let Some(password) = superuser.password {
            admin.password = password;
        }
        if let Some(first_name) = superuser.first_name {
            admin.first_name = first_name;
        }
        if let Some(last_name) = superuser.last_name {
            admin.last_name = last_name;
        }
    }
}

fn apply_env(config: &mut BootstrapConfig, env: &HashMap<String, String>) -> Result<()> {
    if let Some(host) = env.get("DATABASE_HOST") {
        config.database.host = host.clone();
    }
    if let Some(port) = parsed::<u16>(env, "DATABASE_PORT")? {
        config.database.port = port;
    }
    if let Some(flag) = env.get("DEBUG") {
        config.mode_flag = Some(flag.clone());
    }
    if let Some(secs) = parsed::<u64>(env, "RUNUP_POLL_INTERVAL_SECS")? {
        config.poll_interval = Duration::from_secs(secs);
    }
    if let Some(secs) = parsed::<u64>(env, "RUNUP_MAX_WAIT_SECS")? {
        config.max_wait = Some(Duration::from_secs(secs));
    }
    if let Some(bind) = env.get("RUNUP_BIND") {
        config.bind = bind.clone();
    }
    if let Some(workers) = parsed::<u16>(env, "RUNUP_WORKERS")? {
        config.workers = workers;
    }
    if let Some(script) = env.get("RUNUP_MANAGE_SCRIPT") {
        config.manage_script = script.clone();
    }
    if let Some(app) = env.get("RUNUP_WSGI_APP") {
        config.wsgi_app = app.clone();
    }
    if let Some(username) = env.get("SUPERUSER_USERNAME") {
        config.admin.username = username.clone();
    }
    if let Some(email) = env.get("SUPERUSER_EMAIL") {
        config.admin.email = email.clone();
    }
    if let Some(password) = env.get("SUPERUSER_PASSWORD") {
        config.admin.password = password.clone();
    }
    Ok(())
}

fn parsed<T: FromStr>(env: &HashMap<String, String>, key: &str) -> Result<Option<T>> {
    match env.get(key) {
        None => Ok(None),
        Some(raw) => raw.parse::<T>().map(Some).map_err(|_| {
            BootstrapError::InvalidConfig(format!("{key} has unparseable value {raw:?}"))
        }),
    }
}

fn validate(config: &BootstrapConfig) -> Result<()> {
    if config.database.host.is_empty() {
        return Err(BootstrapError::InvalidConfig(
            "database host must not be empty".into(),
        ));
    }
    if config.poll_interval.is_zero() {
        return Err(BootstrapError::InvalidConfig(
            "poll interval must be greater than zero".into(),
        ));
    }
    if config.workers == 0 {
        return Err(BootstrapError::InvalidConfig(
            "worker count must be greater than zero".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RunMode;
    use std::fs;

    fn no_env() -> HashMap<String, String> {
        HashMap::new()
    }

    #[test]
    fn defaults_without_file_or_env() {
        let dir = tempfile::tempdir().unwrap();
        let config = resolve(dir.path(), &no_env()).unwrap();
        assert_eq!(config.database.host, "localhost");
        assert_eq!(config.database.port, 5432);
        assert_eq!(config.workers, 3);
        assert!(config.max_wait.is_none());
        assert_eq!(config.run_mode(), RunMode::Production);
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = r#"
database:
  host: db
  port: 15432
poll_interval_secs: 2
debug: "True"
workers: 5
superuser:
  username: root
  password: hunter2
"#;
        fs::write(dir.path().join(CONFIG_FILENAME), yaml).unwrap();
        let config = resolve(dir.path(), &no_env()).unwrap();
        assert_eq!(config.database.host, "db");
        assert_eq!(config.database.port, 15432);
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.workers, 5);
        assert_eq!(config.run_mode(), RunMode::Development);
        assert_eq!(config.admin.username, "root");
        assert_eq!(config.admin.password, "hunter2");
        // Untouched fields keep their defaults.
        assert_eq!(config.admin.email, "admin@example.com");
    }

    #[test]
    fn env_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILENAME),
            "database:\n  host: db\ndebug: \"True\"\n",
        )
        .unwrap();
        let env: HashMap<String, String> = [
            ("DATABASE_HOST".to_string(), "postgres".to_string()),
            ("DATABASE_PORT".to_string(), "6543".to_string()),
            ("DEBUG".to_string(), "False".to_string()),
            ("SUPERUSER_EMAIL".to_string(), "ops@example.org".to_string()),
        ]
        .into();
        let config = resolve(dir.path(), &env).unwrap();
        assert_eq!(config.database.host, "postgres");
        assert_eq!(config.database.port, 6543);
        assert_eq!(config.run_mode(), RunMode::Production);
        assert_eq!(config.admin.email, "ops@example.org");
    }

    #[test]
    fn unparseable_port_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let env: HashMap<String, String> =
            [("DATABASE_PORT".to_string(), "psql".to_string())].into();
        assert!(matches!(
            resolve(dir.path(), &env),
            Err(BootstrapError::InvalidConfig(_))
        ));
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let env: HashMap<String, String> =
            [("RUNUP_POLL_INTERVAL_SECS".to_string(), "0".to_string())].into();
        assert!(matches!(
            resolve(dir.path(), &env),
            Err(BootstrapError::InvalidConfig(_))
        ));
    }

    #[test]
    fn max_wait_env_enables_bounded_probing() {
        let dir = tempfile::tempdir().unwrap();
        let env: HashMap<String, String> =
            [("RUNUP_MAX_WAIT_SECS".to_string(), "30".to_string())].into();
        let config = resolve(dir.path(), &env).unwrap();
        assert_eq!(config.max_wait, Some(Duration::from_secs(30)));
    }
}
