use std::{env, fmt::Display, path::PathBuf, str::FromStr, time::Duration};

use tracing::{info, warn};

pub struct Config {
    pub port: u16,
    /// Base URL of the remote record store project.
    pub store_url: String,
    /// Access credential for the remote record store.
    pub store_key: String,
    pub draft_dir: PathBuf,
    pub draft_key: String,
    pub submit_timeout: Duration,
}

impl Config {
    /// Load configuration from the environment. The store URL and credential
    /// are required: without them the process refuses to start rather than
    /// serve partially configured.
    pub fn load() -> Self {
        Self {
            port: try_load("RUST_PORT", "1111"),
            store_url: require("SUPABASE_URL"),
            store_key: require("SUPABASE_KEY"),
            draft_dir: PathBuf::from(try_load::<String>("AFROLUMI_DRAFT_DIR", "drafts")),
            draft_key: try_load("AFROLUMI_DRAFT_KEY", "afrolumi_app_data"),
            submit_timeout: Duration::from_secs(try_load("AFROLUMI_SUBMIT_TIMEOUT_SECS", "30")),
        }
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        warn!("Environment variable {key} not found");
    })
}

fn require(key: &str) -> String {
    var(key).expect("Environment misconfigured!")
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}
