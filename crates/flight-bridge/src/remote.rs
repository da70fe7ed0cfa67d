//! Remote control lifecycle for a flight host
//!
//! `start` is the load hook: build the registry, then start serving.
//! `unload` stops the server.

use crate::properties::register_vehicle_properties;
use crate::vehicle::VehicleHost;
use remote_control_core::Result;
use remote_control_server::{CommandServer, HandlerRegistry, ServerConfig};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};

/// Running remote control for one host
pub struct FlightRemote {
    server: CommandServer,
}

impl FlightRemote {
    /// Register the vehicle properties and start the command server
    pub async fn start<H: VehicleHost>(host: Arc<H>, config: ServerConfig) -> Result<Self> {
        let mut registry = HandlerRegistry::new();
        register_vehicle_properties(&mut registry, host);

        info!("Readable: {}", registry.readable_paths().join(", "));
        info!("Writable: {}", registry.writable_paths().join(", "));

        let mut server = CommandServer::new(config, registry);
        if let Err(e) = server.start().await {
            error!("Failed to start remote control server: {}", e);
            return Err(e);
        }

        Ok(Self { server })
    }

    /// Address the server is listening on
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.local_addr()
    }

    /// Stop serving
    pub async fn unload(mut self) {
        self.server.stop().await;
        info!("Remote control unloaded");
    }
}
