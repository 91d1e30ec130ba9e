use crate::error::AppError;
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 8081;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub addr: SocketAddr,
    pub data_dir: PathBuf,
    pub production: bool,
    /// Move the demo prayer times onto the current week at startup.
    pub demo_dates: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            data_dir: PathBuf::from("data"),
            production: false,
            demo_dates: true,
        }
    }
}

fn flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "" | "0" | "false" | "no" | "off"
    )
}

impl Config {
    /// Reads `HOST`, `PORT`, `DATA_DIR`, `PRODUCTION` and `DEMO_DATES`.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_vars(std::env::vars().collect())
    }

    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, AppError> {
        let defaults = Self::default();

        let host: IpAddr = match vars.get("HOST") {
            Some(host) => host
                .parse()
                .map_err(|_| AppError::Config(format!("HOST {host:?} is not an IP address")))?,
            None => defaults.addr.ip(),
        };
        let port: u16 = match vars.get("PORT") {
            Some(port) => port
                .parse()
                .map_err(|_| AppError::Config(format!("PORT {port:?} is not a port number")))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            addr: SocketAddr::new(host, port),
            data_dir: vars
                .get("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            production: vars.get("PRODUCTION").map_or(defaults.production, |v| flag(v)),
            demo_dates: vars.get("DEMO_DATES").map_or(defaults.demo_dates, |v| flag(v)),
        })
    }

    /// Default tracing filter for this deployment mode.
    pub fn log_level(&self) -> tracing::Level {
        if self.production {
            tracing::Level::INFO
        } else {
            tracing::Level::DEBUG
        }
    }
}
