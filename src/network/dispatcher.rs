use std::sync::Arc;

use tracing::{debug, info, warn, Instrument, Span};

use super::pairing::Pairing;
use super::transport::Transport;
use crate::catalog::CommandCatalog;
use crate::core::{DeviceSlot, Error, Result};
use crate::protocol::{
    ack_marker, Envelope, Marker, ResponseTable, SerialCommand, SerialCommandIndex, COMMAND_PATH,
};

/// Sends key codes to a paired TV over UDAP
pub struct Dispatcher<T> {
    transport: Arc<T>,
    pairing: Pairing<T>,
    span: Span,
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(transport: Arc<T>, pairing: Pairing<T>) -> Self {
        Dispatcher {
            transport,
            pairing,
            span: Span::none(),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Sends one key code.
    ///
    /// A TV that was power cycled forgets its pairing and refuses commands,
    /// so a failed send is followed by exactly one re-pair and one retry.
    /// Returns whether either attempt was accepted; errors are logged.
    pub async fn send(&self, code: u16) -> bool {
        async {
            let envelope = Envelope::KeyInput { code };
            let body = envelope.to_xml();

            if self.attempt(code, &body).await {
                return true;
            }

            info!(code, device = self.pairing.device(), "command refused, pairing again");
            if let Err(e) = self.pairing.pair().await {
                warn!(error = %e, "re-pairing failed");
            }
            self.attempt(code, &body).await
        }
        .instrument(self.span.clone())
        .await
    }

    /// Sends the key code of a named catalog command
    pub async fn press(&self, catalog: &CommandCatalog, name: &str) -> bool {
        match catalog.get(name).and_then(|d| d.alt_numeric_code) {
            Some(code) => self.send(code).await,
            None => {
                warn!(parent: &self.span, command = name, "no key code for command");
                false
            }
        }
    }

    async fn attempt(&self, code: u16, body: &str) -> bool {
        match self.transport.send(COMMAND_PATH, body.as_bytes()).await {
            Ok(reply) if reply.is_success() => {
                debug!(code, "command accepted");
                true
            }
            Ok(reply) => {
                warn!(code, status = reply.status, "command not accepted");
                false
            }
            Err(e) => {
                warn!(code, error = %e, "command send failed");
                false
            }
        }
    }
}

/// A decoded serial acknowledgement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acknowledgement {
    /// Command the TV says it received
    pub command: String,
    /// `OK` as opposed to `NG`
    pub accepted: bool,
}

/// Sends named commands over RS-232C and decodes what comes back
pub struct SerialDispatcher<T> {
    transport: Arc<T>,
    index: SerialCommandIndex,
    table: ResponseTable,
    span: Span,
}

impl<T: Transport> SerialDispatcher<T> {
    /// Builds the command index and response table from `catalog`
    pub fn new(transport: Arc<T>, catalog: &CommandCatalog) -> Self {
        SerialDispatcher {
            transport,
            index: SerialCommandIndex::build(catalog),
            table: ResponseTable::build(catalog),
            span: Span::none(),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn table(&self) -> &ResponseTable {
        &self.table
    }

    pub fn index(&self) -> &SerialCommandIndex {
        &self.index
    }

    /// Names the command behind a raw acknowledgement
    pub fn interpret(&self, slot: DeviceSlot, frame: &str) -> Option<Acknowledgement> {
        let command = self.table.lookup(slot, frame)?;
        Some(Acknowledgement {
            command: command.to_string(),
            accepted: ack_marker(frame) == Some(Marker::Ok),
        })
    }

    /// Sends `name` with data token `data` to the unit at `slot`
    pub async fn execute(&self, slot: DeviceSlot, name: &str, data: &str) -> Result<Acknowledgement> {
        let command = self.index.command(slot, name, data).ok_or_else(|| {
            Error::config(format!("no serial command {}{} for slot {}", name, data, slot))
        })?;

        self.transmit(slot, name, data, command)
            .instrument(self.span.clone())
            .await
    }

    async fn transmit(
        &self,
        slot: DeviceSlot,
        name: &str,
        data: &str,
        command: &SerialCommand,
    ) -> Result<Acknowledgement> {
        info!(command = name, %slot, data, "sending serial command");
        let reply = self.transport.send(COMMAND_PATH, command.xmit_bytes()).await?;
        let frame = reply.text();

        let ack = self
            .interpret(slot, &frame)
            .ok_or_else(|| Error::protocol(format!("unexpected acknowledgement {:?}", frame)))?;
        if ack.command != name {
            warn!(sent = name, echoed = %ack.command, "acknowledgement names another command");
        }
        Ok(ack)
    }

    /// Sends a ranged command with `value` as its data token
    pub async fn set(&self, slot: DeviceSlot, name: &str, value: u16) -> Result<Acknowledgement> {
        self.execute(slot, name, &format!("{:02}", value)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CommandDescriptor;
    use crate::network::transport::mock::{MockTransport, Step};
    use crate::network::transport::{Reply, STATUS_OK};
    use crate::protocol::PAIRING_PATH;
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn dispatcher(transport: &Arc<MockTransport>) -> Dispatcher<MockTransport> {
        let pairing = Pairing::new(Arc::clone(transport), "TV", "1234", 8080);
        Dispatcher::new(Arc::clone(transport), pairing)
    }

    #[tokio::test]
    async fn test_send_first_try() {
        let transport = Arc::new(MockTransport::new(200));

        assert!(dispatcher(&transport).send(24).await);
        assert_eq!(transport.calls_to(COMMAND_PATH), 1);
        assert_eq!(transport.calls_to(PAIRING_PATH), 0);
        assert!(transport.calls()[0].1.contains("<value>24</value>"));
    }

    #[tokio::test]
    async fn test_send_repairs_once_then_succeeds() {
        let transport = Arc::new(MockTransport::scripted(
            vec![Step::Status(401), Step::Status(200)],
            Step::Status(200),
        ));

        assert!(dispatcher(&transport).send(24).await);

        let paths: Vec<_> = transport.calls().into_iter().map(|(p, _)| p).collect();
        assert_eq!(paths, vec![COMMAND_PATH, PAIRING_PATH, COMMAND_PATH]);
    }

    #[tokio::test]
    async fn test_send_gives_up_after_one_retry() {
        let transport = Arc::new(MockTransport::new(401));

        assert!(!dispatcher(&transport).send(24).await);
        assert_eq!(transport.calls_to(COMMAND_PATH), 2);
        assert_eq!(transport.calls_to(PAIRING_PATH), 1);
    }

    #[tokio::test]
    async fn test_send_swallows_transport_errors() {
        let transport = Arc::new(MockTransport::scripted(vec![], Step::Fail));

        assert!(!dispatcher(&transport).send(1).await);
        assert_eq!(transport.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_press_resolves_key_code() {
        let transport = Arc::new(MockTransport::new(200));
        let catalog = CommandCatalog::builtin();
        let dispatcher = dispatcher(&transport);

        assert!(dispatcher.press(&catalog, "Home").await);
        assert!(transport.calls()[0].1.contains("<value>21</value>"));

        assert!(!dispatcher.press(&catalog, "NoSuchKey").await);
        assert!(!dispatcher.press(&catalog, "PowerStatus").await);
        assert_eq!(transport.calls().len(), 1);
    }

    /// Serial stand-in that echoes the transmit frame back as an ack
    struct EchoTv {
        marker: &'static str,
        frames: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Transport for EchoTv {
        async fn send(&self, _path: &str, body: &[u8]) -> Result<Reply> {
            let frame = String::from_utf8_lossy(body).trim_end().to_string();
            self.frames.lock().unwrap().push(frame.clone());
            let fields: Vec<&str> = frame.split(' ').collect();
            let ack = format!(
                "{} {} {} {} {} x",
                fields[0], fields[1], self.marker, fields[2], fields[3]
            );
            Ok(Reply::new(STATUS_OK, ack))
        }
    }

    fn echo_tv(marker: &'static str) -> Arc<EchoTv> {
        Arc::new(EchoTv {
            marker,
            frames: Mutex::new(Vec::new()),
        })
    }

    fn slot(id: u8) -> DeviceSlot {
        DeviceSlot::new(id).unwrap()
    }

    #[tokio::test]
    async fn test_execute_accepted() {
        let tv = echo_tv("OK");
        let dispatcher = SerialDispatcher::new(Arc::clone(&tv), &CommandCatalog::builtin());

        let ack = dispatcher.execute(slot(1), "PowerOn", "01").await.unwrap();
        assert_eq!(
            ack,
            Acknowledgement {
                command: "PowerOn".to_string(),
                accepted: true
            }
        );
        assert_eq!(tv.frames.lock().unwrap()[0], "k a 01 01");
    }

    #[tokio::test]
    async fn test_set_ranged_value_rejected() {
        let tv = echo_tv("NG");
        let dispatcher = SerialDispatcher::new(Arc::clone(&tv), &CommandCatalog::builtin());

        let ack = dispatcher.set(slot(0), "VolSet", 7).await.unwrap();
        assert_eq!(ack.command, "VolSet");
        assert!(!ack.accepted);
        assert_eq!(tv.frames.lock().unwrap()[0], "k f 00 07");
    }

    #[tokio::test]
    async fn test_execute_unknown_command() {
        let dispatcher = SerialDispatcher::new(echo_tv("OK"), &CommandCatalog::builtin());

        let err = dispatcher.execute(slot(0), "PowerOn", "07").await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(dispatcher.execute(slot(0), "Home", "").await.is_err());
    }

    #[tokio::test]
    async fn test_unknown_acknowledgement_is_protocol_error() {
        let tv = Arc::new(MockTransport::new(200));
        let catalog = CommandCatalog::new()
            .with("PowerOn", CommandDescriptor::serial("k", "a", "01"))
            .unwrap();
        let dispatcher = SerialDispatcher::new(tv, &catalog);

        let err = dispatcher.execute(slot(0), "PowerOn", "01").await.unwrap_err();
        assert!(err.is_protocol());
    }

    #[test]
    fn test_interpret() {
        let dispatcher = SerialDispatcher::new(echo_tv("OK"), &CommandCatalog::builtin());

        let ack = dispatcher.interpret(slot(2), "k e OK 02 00 x").unwrap();
        assert_eq!(ack.command, "MuteOn");
        assert!(ack.accepted);

        assert!(dispatcher.interpret(slot(3), "k e OK 02 00 x").is_none());
        assert!(dispatcher.interpret(slot(0), "k a OK 00 FF x").is_none());
    }
}
