use std::env;
use std::process;

use log::{error, info};

mod config;
mod dispatcher;
mod error;
mod pool;
mod proxy;
mod req;
mod target;

use crate::config::{Configs, DEFAULT_CONFIG_PATH};
use crate::dispatcher::Dispatcher;
use crate::error::ConfigError;

fn load(path: &str) -> Result<(Configs, Dispatcher), ConfigError> {
    let configs = Configs::from_file(path)?;
    let pool = configs.build_pool()?;
    Ok((configs, Dispatcher::new(pool)))
}

#[actix_rt::main]
pub async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let path = env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let (configs, dispatcher) = match load(&path) {
        Ok(loaded) => loaded,
        Err(err) => {
            error!("{}", err);
            process::exit(1);
        }
    };

    info!("{} backends configured", dispatcher.pool().len());
    for target in dispatcher.pool().targets() {
        info!(
            "backend {} ({})",
            target.address(),
            if target.is_alive() { "alive" } else { "down" }
        );
    }

    proxy::proxy(configs, dispatcher).await
}
