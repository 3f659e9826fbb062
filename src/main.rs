mod error;
mod launcher;
mod model;

use std::process::ExitCode;

use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use launcher::console::Terminal;
use launcher::process::SystemRunner;
use launcher::{Launcher, base_dir};
use model::config::LauncherConfig;
use model::step::Step;

fn main() -> Result<ExitCode> {
    // Log to file only; the console belongs to the server.
    let _guard = match init_logging() {
        Ok(guard) => Some(guard),
        Err(err) => {
            eprintln!("finaura: logging disabled: {err:#}");
            None
        }
    };

    tracing::info!("finaura launcher starting");

    tracing::info!("step: {}", Step::ResolveBaseDir.label());
    let base_dir = base_dir::enter();

    let config = LauncherConfig::load(&base_dir)?;

    let launcher = Launcher::new(&config, base_dir);
    tracing::info!("base dir: {}", launcher.base_dir().display());

    let outcome = launcher.run(&mut SystemRunner, &mut Terminal);
    tracing::info!("launcher finished: {outcome:?}");

    Ok(ExitCode::from(outcome.exit_status()))
}

fn init_logging() -> Result<WorkerGuard> {
    let log_dir = directories::ProjectDirs::from("", "", "finaura")
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(std::env::temp_dir);
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "finaura.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let filter =
        EnvFilter::try_from_env("FINAURA_LOG").unwrap_or_else(|_| EnvFilter::new("finaura=info"));
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_env_filter(filter)
        .try_init()
        .map_err(|err| anyhow::anyhow!(err))?;

    Ok(guard)
}
