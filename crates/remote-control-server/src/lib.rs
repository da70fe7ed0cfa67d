//! # remote-control-server
//!
//! TCP command server for the remote-control protocol.
//!
//! This crate provides:
//! - `HandlerRegistry` mapping property paths to host read/write functions
//! - Command dispatch with contained handler failures
//! - One-command-per-connection handling
//! - `CommandServer` owning the listener and its start/stop lifecycle
//!
//! Connection tasks are spawned and never joined: `stop` bounds its wait on
//! the accept loop only, so a request that is still in flight may complete
//! after `stop` returns.

pub mod config;
pub mod connection;
pub mod dispatch;
pub mod registry;

pub use config::ServerConfig;
pub use dispatch::dispatch;
pub use registry::HandlerRegistry;

use remote_control_core::{RemoteControlError, Result};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Lifecycle state of a `CommandServer`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Stopped,
    Starting,
    Running,
    Stopping,
}

/// Remote-control command server
pub struct CommandServer {
    /// Listener and connection settings
    config: ServerConfig,
    /// Handlers, read-only once the server is constructed
    registry: Arc<HandlerRegistry>,
    /// Current lifecycle state
    state: ServerState,
    /// Address actually bound while running
    local_addr: Option<SocketAddr>,
    /// Signals the accept loop to exit
    shutdown_tx: Option<watch::Sender<bool>>,
    /// Accept loop task handle
    accept_task: Option<JoinHandle<()>>,
}

impl CommandServer {
    /// Create a stopped server over a fully built registry
    pub fn new(config: ServerConfig, registry: HandlerRegistry) -> Self {
        Self {
            config,
            registry: Arc::new(registry),
            state: ServerState::Stopped,
            local_addr: None,
            shutdown_tx: None,
            accept_task: None,
        }
    }

    /// Bind the listener and spawn the accept loop.
    ///
    /// Calling this while the accept loop is active does nothing. A bind
    /// failure is the only error surfaced to the owner.
    pub async fn start(&mut self) -> Result<()> {
        if self.accept_task.is_some() {
            return Ok(());
        }

        self.state = ServerState::Starting;
        if self.registry.is_empty() {
            warn!("Starting with no registered handlers; every command will be rejected");
        }
        let addr = self.config.socket_addr();
        let listener = match TcpListener::bind(addr).await {
            Ok(listener) => listener,
            Err(source) => {
                self.state = ServerState::Stopped;
                return Err(RemoteControlError::BindFailed { addr, source });
            }
        };
        let local_addr = listener.local_addr().map_err(|source| {
            self.state = ServerState::Stopped;
            RemoteControlError::BindFailed { addr, source }
        })?;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        self.accept_task = Some(tokio::spawn(accept_loop(
            listener,
            Arc::clone(&self.registry),
            ConnectionSettings::from(&self.config),
            shutdown_rx,
        )));
        self.shutdown_tx = Some(shutdown_tx);
        self.local_addr = Some(local_addr);
        self.state = ServerState::Running;

        info!("Command server started on {}", local_addr);
        info!("Commands: GET /path | SET /path value");
        Ok(())
    }

    /// Stop accepting connections.
    ///
    /// Waits up to `shutdown_timeout` for the accept loop to exit, then
    /// returns whether or not in-flight connections have finished.
    pub async fn stop(&mut self) {
        let Some(accept_task) = self.accept_task.take() else {
            return;
        };

        self.state = ServerState::Stopping;
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(true);
        }

        let abort = accept_task.abort_handle();
        match tokio::time::timeout(self.config.shutdown_timeout, accept_task).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Accept loop ended abnormally: {}", e),
            Err(_) => {
                warn!(
                    "Accept loop did not exit within {:?}, aborting",
                    self.config.shutdown_timeout
                );
                abort.abort();
            }
        }

        self.local_addr = None;
        self.state = ServerState::Stopped;
        info!("Command server stopped");
    }

    /// Current lifecycle state
    pub fn state(&self) -> ServerState {
        self.state
    }

    /// Whether the accept loop is active
    pub fn is_running(&self) -> bool {
        self.state == ServerState::Running
    }

    /// Bound address while running
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

}

impl Drop for CommandServer {
    fn drop(&mut self) {
        // The accept loop sees the signal and drops the listener.
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(true);
        }
    }
}

/// Per-connection settings copied out of the server config
#[derive(Debug, Clone, Copy)]
struct ConnectionSettings {
    buffer_size: usize,
    read_timeout: Option<Duration>,
}

impl From<&ServerConfig> for ConnectionSettings {
    fn from(config: &ServerConfig) -> Self {
        Self {
            buffer_size: config.read_buffer_size,
            read_timeout: config.read_timeout,
        }
    }
}

/// Pause after a failed accept before retrying
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

async fn accept_loop(
    listener: TcpListener,
    registry: Arc<HandlerRegistry>,
    settings: ConnectionSettings,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            biased;

            changed = shutdown_rx.changed() => {
                // A dropped sender also means shut down
                if changed.is_err() || *shutdown_rx.borrow() {
                    debug!("Accept loop exiting");
                    break;
                }
            }

            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, peer)) => {
                        tokio::spawn(handle_client(stream, peer, Arc::clone(&registry), settings));
                    }
                    Err(e) => accept_failed(&e).await,
                }
            }
        }
    }
}

async fn accept_failed(e: &io::Error) {
    error!("Error accepting client: {}", e);
    tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
}

async fn handle_client(
    mut stream: TcpStream,
    peer: SocketAddr,
    registry: Arc<HandlerRegistry>,
    settings: ConnectionSettings,
) {
    debug!("Connection from {}", peer);
    if let Err(e) = connection::serve(
        &mut stream,
        &registry,
        settings.buffer_size,
        settings.read_timeout,
    )
    .await
    {
        warn!("Error handling client {}: {}", peer, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use std::sync::Mutex;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    async fn request(addr: SocketAddr, line: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(line.as_bytes()).await.unwrap();
        let mut reply = String::new();
        stream.read_to_string(&mut reply).await.unwrap();
        reply
    }

    fn sample_registry() -> HandlerRegistry {
        let throttle = Arc::new(Mutex::new(0.0f32));
        let reader = Arc::clone(&throttle);

        let mut registry = HandlerRegistry::new();
        registry.register_read("/x", || Ok::<_, Infallible>("3.5".to_string()));
        registry.register_read("/control/throttle", move || {
            Ok::<_, Infallible>(reader.lock().unwrap().to_string())
        });
        registry.register_write("/control/throttle", move |value: &str| -> std::result::Result<(), String> {
            let v: f32 = value
                .parse()
                .map_err(|_| format!("Invalid throttle value: '{}'", value))?;
            if !(0.0..=1.0).contains(&v) {
                return Err(format!("Throttle must be between 0.0 and 1.0, got {}", v));
            }
            *throttle.lock().unwrap() = v;
            Ok(())
        });
        registry
    }

    async fn running_server(registry: HandlerRegistry) -> (CommandServer, SocketAddr) {
        let mut server = CommandServer::new(ServerConfig::localhost(0), registry);
        server.start().await.unwrap();
        let addr = server.local_addr().unwrap();
        (server, addr)
    }

    #[tokio::test]
    async fn test_lifecycle_states() {
        let mut server = CommandServer::new(ServerConfig::localhost(0), sample_registry());
        assert_eq!(server.state(), ServerState::Stopped);
        assert!(server.local_addr().is_none());

        server.start().await.unwrap();
        assert_eq!(server.state(), ServerState::Running);
        assert!(server.is_running());

        server.stop().await;
        assert_eq!(server.state(), ServerState::Stopped);
        assert!(server.local_addr().is_none());
    }

    #[tokio::test]
    async fn test_start_is_idempotent() {
        let (mut server, addr) = running_server(sample_registry()).await;

        server.start().await.unwrap();
        assert_eq!(server.local_addr(), Some(addr));
        assert_eq!(request(addr, "GET /x\n").await, "OK 3.5\n");

        server.stop().await;
    }

    #[tokio::test]
    async fn test_stop_without_start_is_noop() {
        let mut server = CommandServer::new(ServerConfig::localhost(0), HandlerRegistry::new());
        server.stop().await;
        assert_eq!(server.state(), ServerState::Stopped);
    }

    #[tokio::test]
    async fn test_bind_failure_surfaces() {
        let (mut first, addr) = running_server(HandlerRegistry::new()).await;

        let mut second =
            CommandServer::new(ServerConfig::localhost(addr.port()), HandlerRegistry::new());
        let err = second.start().await.unwrap_err();
        assert!(matches!(err, RemoteControlError::BindFailed { .. }));
        assert_eq!(second.state(), ServerState::Stopped);

        first.stop().await;
    }

    #[tokio::test]
    async fn test_example_scenarios() {
        let (mut server, addr) = running_server(sample_registry()).await;

        assert_eq!(request(addr, "GET /x\n").await, "OK 3.5\n");
        assert_eq!(
            request(addr, "SET /control/throttle 2.0\n").await,
            "ERROR: Throttle must be between 0.0 and 1.0, got 2\n"
        );
        assert_eq!(request(addr, "SET /control/throttle 0.5\n").await, "OK\n");
        assert_eq!(request(addr, "GET /CONTROL/Throttle\n").await, "OK 0.5\n");
        assert_eq!(request(addr, "GET /z\n").await, "ERROR: Unknown path '/z'\n");
        assert_eq!(request(addr, "\n").await, "ERROR: Empty command\n");
        assert_eq!(
            request(addr, "SET /control/throttle\n").await,
            "ERROR: Invalid command format. Use: GET /path or SET /path value\n"
        );

        server.stop().await;
    }

    #[tokio::test]
    async fn test_closed_without_data_gets_no_reply() {
        let (mut server, addr) = running_server(sample_registry()).await;

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.shutdown().await.unwrap();
        let mut reply = String::new();
        stream.read_to_string(&mut reply).await.unwrap();
        assert_eq!(reply, "");

        server.stop().await;
    }

    #[tokio::test]
    async fn test_failing_handler_keeps_server_alive() {
        let mut registry = HandlerRegistry::new();
        registry.register_read("/broken", || -> std::result::Result<String, Infallible> {
            panic!("host state missing")
        });
        registry.register_read("/ok", || Ok::<_, Infallible>("1".to_string()));
        let (mut server, addr) = running_server(registry).await;

        assert_eq!(
            request(addr, "GET /broken\n").await,
            "ERROR: host state missing\n"
        );
        assert_eq!(request(addr, "GET /ok\n").await, "OK 1\n");

        server.stop().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_clients_on_disjoint_paths() {
        const CLIENTS: usize = 32;

        let mut registry = HandlerRegistry::new();
        let values: Vec<Arc<Mutex<String>>> =
            (0..CLIENTS).map(|_| Arc::new(Mutex::new(String::new()))).collect();
        for (i, value) in values.iter().enumerate() {
            let reader = Arc::clone(value);
            let writer = Arc::clone(value);
            registry.register_read(format!("/p/{}", i), move || {
                Ok::<_, Infallible>(reader.lock().unwrap().clone())
            });
            registry.register_write(format!("/p/{}", i), move |v: &str| {
                *writer.lock().unwrap() = v.to_string();
                Ok::<_, Infallible>(())
            });
        }
        let (mut server, addr) = running_server(registry).await;

        let clients: Vec<_> = (0..CLIENTS)
            .map(|i| {
                tokio::spawn(async move {
                    let set = request(addr, &format!("SET /p/{} value-{}\n", i, i)).await;
                    let get = request(addr, &format!("GET /p/{}\n", i)).await;
                    (i, set, get)
                })
            })
            .collect();

        for client in clients {
            let (i, set, get) = client.await.unwrap();
            assert_eq!(set, "OK\n");
            assert_eq!(get, format!("OK value-{}\n", i));
        }

        server.stop().await;
    }

    #[tokio::test]
    async fn test_slow_client_does_not_block_others() {
        let (mut server, addr) = running_server(sample_registry()).await;

        // Connected but silent: holds its task, not the accept loop
        let _idle = TcpStream::connect(addr).await.unwrap();
        assert_eq!(request(addr, "GET /x\n").await, "OK 3.5\n");

        let stopped = tokio::time::timeout(Duration::from_secs(2), server.stop()).await;
        assert!(stopped.is_ok(), "stop must not wait for idle connections");
    }

    #[tokio::test]
    async fn test_stop_closes_listener() {
        let (mut server, addr) = running_server(sample_registry()).await;
        server.stop().await;

        assert!(TcpStream::connect(addr).await.is_err());
    }

    #[tokio::test]
    async fn test_drop_stops_accepting() {
        let (server, addr) = running_server(sample_registry()).await;
        drop(server);

        // Give the accept loop a moment to observe the signal
        let mut refused = false;
        for _ in 0..50 {
            if TcpStream::connect(addr).await.is_err() {
                refused = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(refused);
    }

    #[tokio::test]
    async fn test_accept_failure_pauses_before_retry() {
        let started = tokio::time::Instant::now();
        accept_failed(&io::Error::other("Too many open files")).await;
        assert!(started.elapsed() >= ACCEPT_ERROR_BACKOFF);
    }

    #[tokio::test]
    async fn test_empty_registry_still_serves() {
        let registry = HandlerRegistry::new();
        assert!(registry.is_empty());

        let (mut server, addr) = running_server(registry).await;
        assert_eq!(request(addr, "GET /x\n").await, "ERROR: Unknown path '/x'\n");

        server.stop().await;
    }
}
