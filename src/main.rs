#![allow(non_snake_case)]

mod cli;

use std::env;
use std::process::ExitCode;

use dayPlanner::config::{AppConfig, PlannerSettings};
use dayPlanner::logging::init_logging;
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    let config_file = env::var("CONFIG_FILE").ok();
    let config = match AppConfig::load(config_file.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            init_logging(env::var("LOG").ok().as_deref());
            error!("invalid configuration file: {e}");
            eprintln!("Invalid configuration file: {e}");
            return ExitCode::FAILURE;
        }
    };

    let get_prop = |key: &str| -> Option<String> {
        config.get(key).or_else(|| env::var(key).ok())
    };

    init_logging(get_prop("LOG").as_deref());

    let settings = match PlannerSettings::resolve(get_prop) {
        Ok(settings) => settings,
        Err(e) => {
            error!("invalid configuration: {e}");
            eprintln!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    cli::cli(settings).await
}
