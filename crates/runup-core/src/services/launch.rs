use std::process::Stdio;

use tokio::process::Command;

use crate::error::{BootstrapError, Result};
use crate::models::{BootstrapConfig, RunMode};

/// The two terminal run modes. Each returns the exit code of the launched
/// process: true exec-style replacement is not portable, so the launcher
/// spawns the child with inherited stdio, waits, and forwards its status.
pub trait Launcher {
    fn launch_development(
        &self,
        config: &BootstrapConfig,
    ) -> impl std::future::Future<Output = Result<i32>> + Send;
    fn launch_production(
        &self,
        config: &BootstrapConfig,
    ) -> impl std::future::Future<Output = Result<i32>> + Send;
}

/// Hand control to exactly one launch branch for the derived mode.
pub async fn launch<L: Launcher>(
    launcher: &L,
    mode: RunMode,
    config: &BootstrapConfig,
) -> Result<i32> {
    tracing::info!(%mode, bind = %config.bind, "launching application");
    match mode {
        RunMode::Development => launcher.launch_development(config).await,
        RunMode::Production => launcher.launch_production(config).await,
    }
}

/// Real launcher: dev server through the management script, production
/// through the WSGI process manager.
#[derive(Debug, Clone, Default)]
pub struct CommandLauncher;

impl CommandLauncher {
    pub fn new() -> Self {
        Self
    }

    async fn run(&self, program: &str, args: &[String]) -> Result<i32> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| BootstrapError::Launch(format!("failed to start {program}: {e}")))?;

        let status = child
            .wait()
            .await
            .map_err(|e| BootstrapError::Launch(format!("failed waiting on {program}: {e}")))?;
        Ok(status.code().unwrap_or(1))
    }
}

impl Launcher for CommandLauncher {
    async fn launch_development(&self, config: &BootstrapConfig) -> Result<i32> {
        let (program, args) = development_command(config);
        self.run(&program, &args).await
    }

    async fn launch_production(&self, config: &BootstrapConfig) -> Result<i32> {
        let (program, args) = production_command(config);
        self.run(&program, &args).await
    }
}

fn development_command(config: &BootstrapConfig) -> (String, Vec<String>) {
    (
        "python".into(),
        vec![
            config.manage_script.clone(),
            "runserver".into(),
            config.bind.clone(),
        ],
    )
}

fn production_command(config: &BootstrapConfig) -> (String, Vec<String>) {
    (
        "gunicorn".into(),
        vec![
            config.wsgi_app.clone(),
            "--bind".into(),
            config.bind.clone(),
            "--workers".into(),
            config.workers.to_string(),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[test]
    fn development_command_uses_manage_script() {
        let config = BootstrapConfig::default();
        let (program, args) = development_command(&config);
        assert_eq!(program, "python");
        assert_eq!(args, vec!["manage.py", "runserver", "0.0.0.0:8000"]);
    }

    #[test]
    fn production_command_uses_process_manager() {
        let mut config = BootstrapConfig::default();
        config.workers = 4;
        let (program, args) = production_command(&config);
        assert_eq!(program, "gunicorn");
        assert_eq!(
            args,
            vec![
                "core.wsgi:application",
                "--bind",
                "0.0.0.0:8000",
                "--workers",
                "4"
            ]
        );
    }

    #[derive(Default)]
    struct FakeLauncher {
        development: AtomicU64,
        production: AtomicU64,
    }

    impl Launcher for FakeLauncher {
        async fn launch_development(&self, _config: &BootstrapConfig) -> Result<i32> {
            self.development.fetch_add(1, Ordering::SeqCst);
            Ok(0)
        }

        async fn launch_production(&self, _config: &BootstrapConfig) -> Result<i32> {
            self.production.fetch_add(1, Ordering::SeqCst);
            Ok(0)
        }
    }

    #[tokio::test]
    async fn exactly_one_branch_per_mode() {
        let config = BootstrapConfig::default();

        let fake = FakeLauncher::default();
        launch(&fake, RunMode::Development, &config).await.unwrap();
        assert_eq!(fake.development.load(Ordering::SeqCst), 1);
        assert_eq!(fake.production.load(Ordering::SeqCst), 0);

        let fake = FakeLauncher::default();
        launch(&fake, RunMode::Production, &config).await.unwrap();
        assert_eq!(fake.development.load(Ordering::SeqCst), 0);
        assert_eq!(fake.production.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn run_forwards_child_exit_code() {
        let launcher = CommandLauncher::new();
        let code = launcher.run("true", &[]).await.unwrap();
        assert_eq!(code, 0);
        let code = launcher.run("false", &[]).await.unwrap();
        assert_ne!(code, 0);
    }

    #[tokio::test]
    async fn missing_executable_is_a_launch_error() {
        let launcher = CommandLauncher::new();
        let result = launcher.run("definitely-not-a-real-binary", &[]).await;
        assert!(matches!(result, Err(BootstrapError::Launch(_))));
    }
}
