use std::sync::LazyLock;

use regex::Regex;
use tokio::process::Command;

use crate::error::{BootstrapError, Result};
use crate::models::{AdminDefaults, BootstrapConfig};
use crate::services::bootstrap::{AssetPublisher, SchemaSync};
use crate::services::provision::AccountDirectory;

static TRAILING_COUNT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)\s*$").unwrap());

const COUNT_PRIVILEGED_SNIPPET: &str = "from django.contrib.auth import get_user_model; \
     print(get_user_model().objects.filter(is_superuser=True).count())";

// The defaults travel as environment variables, never as snippet text:
// interpolating credentials into Python source would break on quotes.
const CREATE_PRIVILEGED_SNIPPET: &str = "import os; \
     from django.contrib.auth import get_user_model; \
     User = get_user_model(); \
     u = User.objects.create_superuser(\
         username=os.environ['SUPERUSER_USERNAME'], \
         email=os.environ['SUPERUSER_EMAIL'], \
         password=os.environ['SUPERUSER_PASSWORD']); \
     u.first_name = os.environ['SUPERUSER_FIRST_NAME']; \
     u.last_name = os.environ['SUPERUSER_LAST_NAME']; \
     u.save()";

/// Real adapter for every external subsystem that lives behind the
/// application's management script: schema discovery/application, asset
/// collection, and the privileged-account directory.
#[derive(Debug, Clone)]
pub struct DjangoManage {
    python: String,
    script: String,
}

impl DjangoManage {
    pub fn new(script: impl Into<String>) -> Self {
        Self {
            python: "python".into(),
            script: script.into(),
        }
    }

    pub fn from_config(config: &BootstrapConfig) -> Self {
        Self::new(config.manage_script.clone())
    }

    async fn run(
        &self,
        args: &[&str],
        envs: &[(&str, String)],
        wrap: fn(String) -> BootstrapError,
    ) -> Result<String> {
        let mut cmd = Command::new(&self.python);
        cmd.arg(&self.script).args(args);
        for (key, value) in envs {
            cmd.env(key, value);
        }
        let output = cmd
            .output()
            .await
            .map_err(|e| wrap(format!("failed to run {} {}: {e}", self.python, self.script)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(wrap(format!(
                "{} {} failed (exit {}): {stderr}",
                self.script,
                args.first().unwrap_or(&""),
                output.status.code().unwrap_or(-1)
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl SchemaSync for DjangoManage {
    async fn discover_changes(&self) -> Result<()> {
        self.run(&["makemigrations", "--noinput"], &[], BootstrapError::Migrate)
            .await?;
        Ok(())
    }

    async fn apply_changes(&self) -> Result<()> {
        self.run(&["migrate", "--noinput"], &[], BootstrapError::Migrate)
            .await?;
        Ok(())
    }
}

impl AssetPublisher for DjangoManage {
    async fn publish(&self, overwrite: bool, interactive: bool) -> Result<()> {
        let args = collectstatic_args(overwrite, interactive);
        self.run(&args, &[], BootstrapError::Collect).await?;
        Ok(())
    }
}

impl AccountDirectory for DjangoManage {
    async fn count_privileged(&self) -> Result<u64> {
        let output = self
            .run(
                &["shell", "-c", COUNT_PRIVILEGED_SNIPPET],
                &[],
                BootstrapError::Provision,
            )
            .await?;
        parse_count(&output)
    }

    async fn create_privileged(&self, defaults: &AdminDefaults) -> Result<()> {
        let envs = superuser_env(defaults);
        self.run(
            &["shell", "-c", CREATE_PRIVILEGED_SNIPPET],
            &envs,
            BootstrapError::Provision,
        )
        .await?;
        Ok(())
    }
}

fn collectstatic_args(overwrite: bool, interactive: bool) -> Vec<&'static str> {
    let mut args = vec!["collectstatic"];
    if !interactive {
        args.push("--noinput");
    }
    if overwrite {
        args.push("--clear");
    }
    args
}

/// The shell command echoes framework chatter before the count; take the
/// trailing integer on the output.
fn parse_count(output: &str) -> Result<u64> {
    TRAILING_COUNT_RE
        .captures(output)
        .and_then(|caps| caps[1].parse().ok())
        .ok_or_else(|| {
            BootstrapError::Provision(format!("unexpected account count output: {output:?}"))
        })
}

fn superuser_env(defaults: &AdminDefaults) -> Vec<(&'static str, String)> {
    vec![
        ("SUPERUSER_USERNAME", defaults.username.clone()),
        ("SUPERUSER_EMAIL", defaults.email.clone()),
        ("SUPERUSER_PASSWORD", defaults.password.clone()),
        ("SUPERUSER_FIRST_NAME", defaults.first_name.clone()),
        ("SUPERUSER_LAST_NAME", defaults.last_name.clone()),
    ]
}
