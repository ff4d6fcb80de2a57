use dotenv::dotenv;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;
use tracing::{error, event, Level};
use tracing_subscriber::EnvFilter;

use tasktracker::config::{Config, ProcessEnv};
use tasktracker::controller::TaskController;
use tasktracker::{datastore, log};

fn main() {
    dotenv().ok();

    let config = Config::load(&ProcessEnv);
    let env_filter = EnvFilter::try_from_env(log::ENV_VAR);
    let log_config = config.as_ref().ok().and_then(|c| c.log.as_ref());
    if let Err(err) = log::setup(env_filter, log_config) {
        eprintln!("Unable to set up logging: {}", err);
    }

    event!(Level::INFO, "Starting TaskTracker: {}", env!("FULL_VERSION"));

    if let Err(err) = run(config) {
        error!(reason = %err, "TaskTracker failed to start.");
        std::process::exit(1);
    }
}

fn run(config: Result<Config, tasktracker::config::ConfigError>) -> anyhow::Result<()> {
    let config = config?;
    let storage = datastore::open(&config.storage.url)?;
    let controller = TaskController::start(storage, (&config.listen).into())?;
    event!(Level::INFO, addr = %controller.addr(), "TaskTracker is up.");

    let term = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGTERM, Arc::clone(&term))?;
    signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&term))?;

    while !term.load(Ordering::Acquire) {
        std::thread::sleep(Duration::from_millis(100));
    }
    event!(Level::INFO, "Shutdown requested.");
    controller.stop()?;
    Ok(())
}
