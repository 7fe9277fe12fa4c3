use anyhow::{Context, Result};
use parley_core::IceServerConfig;
use parley_core::utils::default_ice_servers;
use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Advertised to every client in `ice_config`.
    pub ice_servers: Vec<IceServerConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
            ice_servers: default_ice_servers(),
        }
    }
}

impl ServerConfig {
    /// Reads `PORT`, `BIND_HOST` and the optional `TURN_URL`, `TURN_USERNAME`,
    /// `TURN_CREDENTIAL` variables on top of the defaults.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(port) = env::var("PORT") {
            let port: u16 = port
                .parse()
                .with_context(|| format!("PORT is not a valid port: {port}"))?;
            config.bind_addr.set_port(port);
        }

        if let Ok(host) = env::var("BIND_HOST") {
            let ip: IpAddr = host
                .parse()
                .with_context(|| format!("BIND_HOST is not an IP address: {host}"))?;
            config.bind_addr.set_ip(ip);
        }

        if let Ok(turn_url) = env::var("TURN_URL") {
            config.ice_servers.push(IceServerConfig {
                urls: vec![turn_url],
                username: env::var("TURN_USERNAME").ok(),
                credential: env::var("TURN_CREDENTIAL").ok(),
            });
        }

        Ok(config)
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.bind_addr.set_port(port);
        self
    }

    pub fn with_host(mut self, host: IpAddr) -> Self {
        self.bind_addr.set_ip(host);
        self
    }
}
