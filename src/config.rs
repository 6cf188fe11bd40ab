use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

pub const DEFAULT_DATA_FILE: &str = "data/tasks.json";
pub const DEFAULT_PORT: u16 = 4000;
pub const DEFAULT_UI_DIR: &str = "ui";

/// Everything the HTTP server needs to start.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub data_file: PathBuf,
    pub host: IpAddr,
    pub port: u16,
    pub ui_dir: PathBuf,
}

impl Config {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            host: IpAddr::from([0, 0, 0, 0]),
            port: DEFAULT_PORT,
            ui_dir: PathBuf::from(DEFAULT_UI_DIR),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_listens_on_all_interfaces() {
        let config = Config::default();
        assert_eq!(config.addr().to_string(), "0.0.0.0:4000");
        assert_eq!(config.data_file, PathBuf::from("data/tasks.json"));
    }
}
