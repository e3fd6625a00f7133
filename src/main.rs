use std::{env, sync::Arc};

use colored::Colorize;
use log::{error, info, warn};
use singalong_collab::{Config, YouTubeLookup};
use singalong_server::{run_server, ServerContext, DEFAULT_PORT};
use thiserror::Error;
use tokio::runtime::{self, Runtime};

use crate::logging::LogColor;

mod logging;

const PORT_VARIABLE: &str = "SINGALONG_SERVER_PORT";
const API_KEY_VARIABLE: &str = "YOUTUBE_API_KEY";

struct Singalong {
    context: ServerContext,
    port: u16,
    runtime: Runtime,
}

#[derive(Debug, Error)]
enum StartupError {
    #[error("SINGALONG_SERVER_PORT is set to \"{0}\", which is not a valid port")]
    InvalidPort(String),

    #[error("Could not build async runtime: {0}")]
    Runtime(std::io::Error),

    #[error("Server stopped unexpectedly: {0}")]
    Server(std::io::Error),
}

impl Singalong {
    fn new() -> Result<Self, StartupError> {
        let port = port_from_env()?;

        info!("Building async runtime...");
        let runtime = runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("singalong-async")
            .build()
            .map_err(StartupError::Runtime)?;

        let api_key = env::var(API_KEY_VARIABLE).ok();

        if api_key.is_none() {
            warn!(
                "{} is not set, search will only offer a manual search link",
                API_KEY_VARIABLE
            );
        }

        let lookup = YouTubeLookup::new(api_key);
        let context = ServerContext::new(Config::default(), Arc::new(lookup));

        Ok(Self {
            context,
            port,
            runtime,
        })
    }

    fn run(&self) -> Result<(), StartupError> {
        self.runtime.block_on(async move {
            let collab = self.context.collab.clone();
            tokio::spawn(async move { collab.rooms.run_idle_sweep().await });

            run_server(self.context.clone(), self.port)
                .await
                .map_err(StartupError::Server)
        })
    }
}

impl StartupError {
    fn hint(&self) -> String {
        match self {
            StartupError::InvalidPort(_) => format!(
                "Set {} to a number between 1 and 65535, or unset it to use port {}.",
                PORT_VARIABLE, DEFAULT_PORT
            ),
            StartupError::Runtime(_) => {
                "This error is fatal, and should not happen.".to_string()
            }
            StartupError::Server(_) => {
                "Make sure the port is not already in use by another process, then try again."
                    .to_string()
            }
        }
    }
}

fn port_from_env() -> Result<u16, StartupError> {
    match env::var(PORT_VARIABLE) {
        Ok(value) => parse_port(&value),
        Err(_) => Ok(DEFAULT_PORT),
    }
}

fn parse_port(value: &str) -> Result<u16, StartupError> {
    value
        .trim()
        .parse::<u16>()
        .ok()
        .filter(|port| *port != 0)
        .ok_or_else(|| StartupError::InvalidPort(value.to_string()))
}

fn main() {
    if let Err(error) = logging::init_logger() {
        eprintln!("Could not initialize logging: {}", error);
        return;
    }

    let result = Singalong::new().and_then(|singalong| {
        info!("Initialized successfully.");
        singalong.run()
    });

    if let Err(error) = result {
        error!("{} Read the error below to troubleshoot the issue. If you think this might be a bug, please report it by making a GitHub issue.", "Singalong failed to start!".bold().color(LogColor::RED));
        error!("{}", error);
        error!(
            "{}",
            format!("Hint: {}", error.hint())
                .color(LogColor::DIMMED)
                .italic()
        );
    }
}

#[cfg(test)]
mod test {
    use super::{parse_port, StartupError};

    #[test]
    fn parses_ports() {
        assert!(matches!(parse_port("8080"), Ok(8080)));
        assert!(matches!(parse_port(" 3000 "), Ok(3000)));
        assert!(matches!(parse_port("0"), Err(StartupError::InvalidPort(_))));
        assert!(matches!(parse_port("http"), Err(StartupError::InvalidPort(_))));
    }
}
