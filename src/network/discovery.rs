use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn, Instrument, Span};

use super::dispatcher::Dispatcher;
use super::pairing::Pairing;
use super::transport::Transport;
use crate::core::{Config, DeviceSession, Error, Result};
use crate::protocol::{
    discovery_probe, is_discovery_probe, parse_server_name, DiscoveryState, MAX_DATAGRAM_SIZE,
};
use crate::util;

/// Whether the TV agreed to show its pairing PIN
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairingStatus {
    /// The PIN is on screen
    Shown,
    /// The request failed; the device is still usable once paired manually
    Failed(String),
}

/// A TV that answered the probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredDevice {
    pub ip: IpAddr,
    pub name: String,
    pub pairing: PairingStatus,
}

/// How a discovery run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryOutcome {
    Found(DiscoveredDevice),
    NotFound { attempts: u32 },
    Cancelled,
}

/// Finds one LG TV on the local network and starts pairing with it
pub struct DiscoveryEngine<T> {
    config: Config,
    transport: Arc<T>,
    socket: Option<UdpSocket>,
    local_ip: IpAddr,
    local_addrs: Vec<IpAddr>,
    session: DeviceSession,
    state: DiscoveryState,
    pairing_status: Option<PairingStatus>,
    span: Span,
}

impl<T: Transport> DiscoveryEngine<T> {
    /// Creates an engine and binds its discovery socket.
    ///
    /// Fails with a resource error if the socket cannot be bound or no local
    /// IPv4 address can be determined. A configured `local_addr` replaces
    /// interface detection entirely.
    pub async fn new(config: Config, transport: Arc<T>) -> Result<Self> {
        config.validate()?;

        let (local_ip, local_addrs) = match config.local_addr {
            Some(ip) => (ip, vec![ip]),
            None => {
                let ip = IpAddr::V4(util::local_ipv4()?);
                let mut addrs = util::local_addrs()?;
                if !addrs.contains(&ip) {
                    addrs.push(ip);
                }
                (ip, addrs)
            }
        };
        let socket = bind_socket(config.bind_addr)?;
        debug!(
            %local_ip,
            interfaces = local_addrs.len(),
            bind = %config.bind_addr,
            "discovery socket ready"
        );

        Ok(DiscoveryEngine {
            session: DeviceSession::new(config.poll_interval),
            config,
            transport,
            socket: Some(socket),
            local_ip,
            local_addrs,
            state: DiscoveryState::Idle,
            pairing_status: None,
            span: Span::none(),
        })
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn session(&self) -> &DeviceSession {
        &self.session
    }

    pub fn state(&self) -> DiscoveryState {
        self.state
    }

    pub fn local_ip(&self) -> IpAddr {
        self.local_ip
    }

    /// Addresses whose datagrams are treated as our own
    pub fn local_addrs(&self) -> &[IpAddr] {
        &self.local_addrs
    }

    /// Whether the discovery socket is currently held
    pub fn is_listening(&self) -> bool {
        self.socket.is_some()
    }

    /// Address the discovery socket is bound to, while it is held
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.socket
            .as_ref()
            .ok_or_else(|| Error::invalid_state("discovery socket is closed"))?
            .local_addr()
            .map_err(|e| Error::resource(format!("Failed to get local address: {}", e)))
    }

    /// Stores the PIN the TV displayed.
    ///
    /// Pairing handles and dispatchers created earlier pick it up too.
    pub fn set_pin(&self, pin: impl Into<String>) {
        self.session.pin().set(pin);
    }

    /// Handshake handle for the discovered TV
    pub fn pairing(&self) -> Result<Pairing<T>> {
        if !self.session.found() {
            return Err(Error::invalid_state("no TV discovered yet"));
        }
        Ok(Pairing::new(
            Arc::clone(&self.transport),
            self.session.name(),
            self.session.pin().clone(),
            self.config.client_port,
        )
        .with_span(self.span.clone()))
    }

    /// Completes pairing with the PIN set by [`set_pin`](Self::set_pin)
    pub async fn pair(&self) -> Result<()> {
        self.pairing()?.pair().await
    }

    /// Key-code dispatcher for the discovered TV
    pub fn dispatcher(&self) -> Result<Dispatcher<T>> {
        Ok(Dispatcher::new(Arc::clone(&self.transport), self.pairing()?)
            .with_span(self.span.clone()))
    }

    /// Broadcasts the probe and polls for a reply.
    ///
    /// Cancellation is checked before every attempt and during the pause
    /// between attempts. The socket is released however the run ends.
    pub async fn discover(&mut self, cancel: &CancellationToken) -> Result<DiscoveryOutcome> {
        let span = self.span.clone();
        async move {
            if self.session.found() {
                return Ok(self.found_outcome());
            }

            let result = self.run(cancel).await;
            self.socket = None;
            match &result {
                Ok(DiscoveryOutcome::Found(_)) | Ok(DiscoveryOutcome::NotFound { .. }) => {}
                Ok(DiscoveryOutcome::Cancelled) | Err(_) => self.state = DiscoveryState::Idle,
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn run(&mut self, cancel: &CancellationToken) -> Result<DiscoveryOutcome> {
        if cancel.is_cancelled() {
            info!("discovery cancelled before it started");
            return Ok(DiscoveryOutcome::Cancelled);
        }

        self.transition(DiscoveryState::Broadcasting)?;
        if self.socket.is_none() {
            self.socket = Some(bind_socket(self.config.bind_addr)?);
        }
        self.broadcast().await?;

        let max_attempts = self.config.max_attempts;
        for attempt in 1..=max_attempts {
            if cancel.is_cancelled() {
                info!(attempt, "discovery cancelled");
                return Ok(DiscoveryOutcome::Cancelled);
            }
            self.transition(DiscoveryState::AwaitingReply { attempt })?;

            if let Some((payload, from)) = self.receive().await {
                self.handle_datagram(&payload, from).await?;
            }

            if self.session.found() {
                self.transition(DiscoveryState::Found)?;
                return Ok(self.found_outcome());
            }

            if attempt < max_attempts {
                warn!(attempt, max_attempts, "no LG TV detected yet");
                tokio::select! {
                    _ = cancel.cancelled() => {
                        info!(attempt, "discovery cancelled");
                        return Ok(DiscoveryOutcome::Cancelled);
                    }
                    _ = sleep(self.session.timeout) => {}
                }
            }
        }

        error!(attempts = max_attempts, "no LG TV detected, giving up");
        self.transition(DiscoveryState::GivingUp)?;
        Ok(DiscoveryOutcome::NotFound {
            attempts: max_attempts,
        })
    }

    fn transition(&mut self, next: DiscoveryState) -> Result<()> {
        self.state = self.state.advance(next)?;
        trace!(state = %self.state, "discovery state");
        Ok(())
    }

    fn socket(&self) -> Result<&UdpSocket> {
        self.socket
            .as_ref()
            .ok_or_else(|| Error::invalid_state("discovery socket is closed"))
    }

    async fn broadcast(&self) -> Result<()> {
        let target = self.config.broadcast_addr;
        let probe = discovery_probe(&self.config.user_agent);
        info!(%target, "broadcasting discovery probe");

        timeout(
            self.config.broadcast_timeout,
            self.socket()?.send_to(probe.as_bytes(), target),
        )
        .await
        .map_err(|_| Error::transport(format!("Broadcast to {} timed out", target)))?
        .map_err(|e| Error::transport(format!("Broadcast to {} failed: {}", target, e)))?;
        Ok(())
    }

    async fn receive(&self) -> Option<(Vec<u8>, SocketAddr)> {
        let socket = self.socket().ok()?;
        let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];

        match timeout(self.config.receive_timeout, socket.recv_from(&mut buf)).await {
            Ok(Ok((len, from))) => {
                buf.truncate(len);
                Some((buf, from))
            }
            Ok(Err(e)) => {
                warn!(error = %e, "discovery receive failed");
                None
            }
            Err(_) => None,
        }
    }

    async fn handle_datagram(&mut self, payload: &[u8], from: SocketAddr) -> Result<()> {
        if payload.is_empty() {
            debug!(%from, "ignoring empty datagram");
            return Ok(());
        }
        if self.local_addrs.contains(&from.ip()) || is_discovery_probe(payload) {
            trace!(%from, "ignoring a probe, not a reply");
            return Ok(());
        }

        let text = String::from_utf8_lossy(payload);
        if self.session.found() {
            if self.session.ip() == Some(from.ip()) {
                info!(name = self.session.name(), says = %text.trim_end(), "TV sent another message");
            }
            return Ok(());
        }
        if from.port() != self.config.discovery_port {
            debug!(%from, "ignoring datagram from unexpected port");
            return Ok(());
        }

        let name = parse_server_name(&text)?;
        self.session.record(from.ip(), name.as_str());
        self.transport.bind_device(from.ip());
        info!(%name, ip = %from.ip(), "LG TV responded");

        let status = match self.pairing()?.show_key().await {
            Ok(()) => PairingStatus::Shown,
            Err(e) => {
                warn!(error = %e, "TV did not show its pairing key");
                PairingStatus::Failed(e.to_string())
            }
        };
        self.pairing_status = Some(status);
        Ok(())
    }

    fn found_outcome(&self) -> DiscoveryOutcome {
        match self.session.ip() {
            Some(ip) => DiscoveryOutcome::Found(DiscoveredDevice {
                ip,
                name: self.session.name().to_string(),
                pairing: self
                    .pairing_status
                    .clone()
                    .unwrap_or_else(|| PairingStatus::Failed("not attempted".to_string())),
            }),
            None => DiscoveryOutcome::NotFound { attempts: 0 },
        }
    }
}

fn bind_socket(addr: SocketAddr) -> Result<UdpSocket> {
    let socket = Socket::new(Domain::for_address(addr), Type::DGRAM, Some(Protocol::UDP))
        .map_err(|e| Error::resource(format!("Failed to create discovery socket: {}", e)))?;
    socket
        .set_reuse_address(true)
        .map_err(|e| Error::resource(format!("Failed to set SO_REUSEADDR: {}", e)))?;
    socket
        .set_broadcast(true)
        .map_err(|e| Error::resource(format!("Failed to enable broadcast: {}", e)))?;
    socket
        .set_nonblocking(true)
        .map_err(|e| Error::resource(format!("Failed to set non-blocking mode: {}", e)))?;
    socket
        .bind(&addr.into())
        .map_err(|e| Error::resource(format!("Failed to bind {}: {}", addr, e)))?;

    UdpSocket::from_std(socket.into())
        .map_err(|e| Error::resource(format!("Failed to register discovery socket: {}", e)))
}
