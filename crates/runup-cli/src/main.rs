use runup_core::services::bootstrap::Bootstrap;
use runup_core::services::config_loader;
use runup_core::services::launch::CommandLauncher;
use runup_core::services::manage::DjangoManage;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args: Vec<String> = std::env::args().collect();
    let debug = args.iter().any(|a| a == "--debug");
    let guard = setup_logging(debug);

    let config = config_loader::from_env()?;
    tracing::info!(
        database = %config.database,
        mode = %config.run_mode(),
        "starting bootstrap"
    );

    let manage = DjangoManage::from_config(&config);
    let bootstrap = Bootstrap::new(
        config,
        manage.clone(),
        manage.clone(),
        manage,
        CommandLauncher::new(),
    );

    // The launched application stands in for this process; its exit code
    // becomes ours.
    let code = bootstrap.run().await;

    // process::exit runs no destructors; release the appender guard first so
    // buffered log lines reach the file.
    drop(guard);
    std::process::exit(code?);
}

/// Console logging on stdout; `--debug` lowers the default level and mirrors
/// everything to `.runup-debug.log` in the working directory. Returns the
/// appender guard that must stay alive for the duration of the program.
fn setup_logging(debug: bool) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(if debug { "debug" } else { "info" }));

    if debug {
        let file_appender = tracing_appender::rolling::never(".", ".runup-debug.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(non_blocking)
                    .with_ansi(false),
            )
            .init();
        Some(guard)
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
        None
    }
}
