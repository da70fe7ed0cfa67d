//! Command server configuration

use remote_control_core::{DEFAULT_PORT, RemoteControlError, Result};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Environment variable overriding the bind address
pub const ENV_BIND: &str = "REMOTE_CONTROL_BIND";
/// Environment variable overriding the port
pub const ENV_PORT: &str = "REMOTE_CONTROL_PORT";
/// Environment variable enabling a per-connection read timeout (milliseconds)
pub const ENV_READ_TIMEOUT_MS: &str = "REMOTE_CONTROL_READ_TIMEOUT_MS";

/// Configuration for the command server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to listen on (default: all interfaces)
    pub bind_address: IpAddr,
    /// Port to listen on (default: 8080, 0 picks an ephemeral port)
    pub port: u16,
    /// Size of the single read that must hold a whole command (default: 4096)
    pub read_buffer_size: usize,
    /// Read timeout per connection. `None` lets a silent client hold its task forever.
    pub read_timeout: Option<Duration>,
    /// How long `stop` waits for the accept loop (default: 5s)
    pub shutdown_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            read_buffer_size: 4096,
            read_timeout: None,
            shutdown_timeout: Duration::from_secs(5),
        }
    }
}

impl ServerConfig {
    /// Listen on the loopback interface only
    pub fn localhost(port: u16) -> Self {
        Self {
            bind_address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port,
            ..Default::default()
        }
    }

    /// Defaults overridden by `REMOTE_CONTROL_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(bind) = lookup(ENV_BIND) {
            config.bind_address = bind
                .parse()
                .map_err(|_| invalid(ENV_BIND, &bind))?;
        }
        if let Some(port) = lookup(ENV_PORT) {
            config.port = port.parse().map_err(|_| invalid(ENV_PORT, &port))?;
        }
        if let Some(ms) = lookup(ENV_READ_TIMEOUT_MS) {
            let ms: u64 = ms.parse().map_err(|_| invalid(ENV_READ_TIMEOUT_MS, &ms))?;
            config.read_timeout = (ms > 0).then(|| Duration::from_millis(ms));
        }

        Ok(config)
    }

    /// Address the listener binds to
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }
}

fn invalid(name: &str, value: &str) -> RemoteControlError {
    RemoteControlError::ConfigError(format!("{} has invalid value '{}'", name, value))
}
