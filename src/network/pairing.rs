use std::sync::Arc;

use tracing::{debug, info, Instrument, Span};

use super::transport::Transport;
use crate::core::{Error, Result, SharedPin};
use crate::protocol::Envelope;

/// Pairing handshake with one TV
///
/// `show_key` makes the TV display a PIN; `pair` completes the handshake
/// with the PIN the operator typed in. Pairing again with the same PIN is
/// harmless, which is what the dispatcher relies on after a TV power cycle.
/// The PIN is read when the hello is sent, so clones see later updates.
pub struct Pairing<T> {
    transport: Arc<T>,
    device: String,
    pin: SharedPin,
    client_port: u16,
    span: Span,
}

impl<T> Clone for Pairing<T> {
    fn clone(&self) -> Self {
        Pairing {
            transport: Arc::clone(&self.transport),
            device: self.device.clone(),
            pin: self.pin.clone(),
            client_port: self.client_port,
            span: self.span.clone(),
        }
    }
}

impl<T: Transport> Pairing<T> {
    pub fn new(
        transport: Arc<T>,
        device: impl Into<String>,
        pin: impl Into<SharedPin>,
        client_port: u16,
    ) -> Self {
        Pairing {
            transport,
            device: device.into(),
            pin: pin.into(),
            client_port,
            span: Span::none(),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    /// The PIN the next hello will carry
    pub fn pin(&self) -> String {
        self.pin.get()
    }

    /// Asks the TV to show its pairing PIN
    pub async fn show_key(&self) -> Result<()> {
        self.request(Envelope::ShowKey)
            .instrument(self.span.clone())
            .await?;
        info!(parent: &self.span, device = %self.device, "TV is showing its pairing key");
        Ok(())
    }

    /// Completes pairing with the stored PIN
    pub async fn pair(&self) -> Result<()> {
        self.hello().instrument(self.span.clone()).await
    }

    async fn hello(&self) -> Result<()> {
        info!(device = %self.device, "pairing with TV");
        self.request(Envelope::Hello {
            pin: self.pin.get(),
            port: self.client_port,
        })
        .await?;
        info!(device = %self.device, "pairing successful");
        Ok(())
    }

    async fn request(&self, envelope: Envelope) -> Result<()> {
        debug!(request = envelope.name(), "sending pairing request");
        let reply = self
            .transport
            .send(envelope.path(), envelope.to_xml().as_bytes())
            .await?;

        if reply.is_success() {
            Ok(())
        } else {
            Err(Error::pairing(format!(
                "{} rejected {} with status {}",
                self.device,
                envelope.name(),
                reply.status
            )))
        }
    }
}
