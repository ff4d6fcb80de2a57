use serde_derive::Deserialize;
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

pub const ENV_VAR: &str = "TASKTRACKER_LOG";
const DEFAULT_LEVEL: &str = "info";

#[derive(Debug, Deserialize)]
pub struct Log {
    pub level: String,
    #[serde(default)]
    pub structured: bool,
}

/// Installs the global subscriber.
///
/// If the environment filter is present, the config level is not used.
pub fn setup(
    env_filter: Result<EnvFilter, tracing_subscriber::filter::FromEnvError>,
    config: Option<&Log>,
) -> anyhow::Result<()> {
    let level = config.map(|c| c.level.as_str()).unwrap_or(DEFAULT_LEVEL);
    let structured = config.map(|c| c.structured).unwrap_or(false);
    let env_filter = match env_filter {
        Ok(env_filter) => env_filter,
        Err(_) => EnvFilter::try_new(level)?,
    };

    let sbuilder = Subscriber::builder()
        .with_timer(tracing_subscriber::fmt::time::ChronoUtc::rfc3339())
        .with_level(true)
        .with_env_filter(env_filter);
    if structured {
        tracing::subscriber::set_global_default(sbuilder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(sbuilder.with_ansi(true).finish())?;
    }
    Ok(())
}
