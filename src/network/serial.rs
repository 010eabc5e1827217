use std::io::{self, ErrorKind, Read, Write};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use serialport::{ClearBuffer, DataBits, Parity, SerialPort, StopBits};
use tokio_util::codec::{Decoder, Encoder};
use tracing::{debug, Instrument, Span};

use super::transport::{Reply, Transport, STATUS_NOT_ACCEPTABLE, STATUS_OK};
use crate::core::{Error, Result, SerialConfig};
use crate::protocol::{ack_marker, Marker, SerialCodec};

/// A byte stream that can drop whatever is waiting to be read
pub trait SerialLine: Read + Write + Send {
    /// Discards unread input, such as a late acknowledgement of an earlier
    /// command that timed out
    fn discard_input(&mut self) -> io::Result<()>;
}

impl SerialLine for Box<dyn SerialPort> {
    fn discard_input(&mut self) -> io::Result<()> {
        self.clear(ClearBuffer::Input).map_err(io::Error::from)
    }
}

/// RS-232C control line
///
/// The path given to [`Transport::send`] is ignored; the body is the transmit
/// frame. The reply carries the raw acknowledgement with status 200 for `OK`
/// and 406 for `NG`.
pub struct SerialTransport<P> {
    port: Arc<Mutex<P>>,
    read_timeout: Duration,
    span: Span,
}

impl SerialTransport<Box<dyn SerialPort>> {
    /// Opens the configured port at 8N1
    pub fn open(config: &SerialConfig) -> Result<Self> {
        let port = serialport::new(config.path.as_str(), config.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .timeout(config.read_timeout)
            .open()
            .map_err(|e| {
                Error::resource(format!("Failed to open serial port {}: {}", config.path, e))
            })?;

        Ok(Self::new(port, config.read_timeout))
    }
}

impl<P: SerialLine + 'static> SerialTransport<P> {
    pub fn new(port: P, read_timeout: Duration) -> Self {
        SerialTransport {
            port: Arc::new(Mutex::new(port)),
            read_timeout,
            span: Span::none(),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    async fn exchange(&self, body: &[u8]) -> Result<Reply> {
        let port = Arc::clone(&self.port);
        let frame = body.to_vec();
        let read_timeout = self.read_timeout;

        debug!(frame = %String::from_utf8_lossy(&frame).trim_end(), "writing serial frame");
        let ack = tokio::task::spawn_blocking(move || {
            let mut port = port
                .lock()
                .map_err(|_| Error::invalid_state("serial port lock poisoned"))?;
            write_and_read(&mut *port, &frame, read_timeout)
        })
        .await
        .map_err(|e| Error::transport(format!("Serial exchange task failed: {}", e)))??;

        let status = match ack_marker(&ack) {
            Some(Marker::Ok) => STATUS_OK,
            Some(Marker::Ng) => STATUS_NOT_ACCEPTABLE,
            None => {
                return Err(Error::protocol(format!(
                    "acknowledgement {:?} has no OK/NG marker",
                    ack
                )))
            }
        };
        debug!(%ack, status, "serial acknowledgement");

        Ok(Reply::new(status, Bytes::from(ack)))
    }
}

fn write_and_read<P: SerialLine + ?Sized>(
    port: &mut P,
    frame: &[u8],
    read_timeout: Duration,
) -> Result<String> {
    let mut codec = SerialCodec::new();
    let mut out = BytesMut::new();
    codec.encode(frame, &mut out)?;
    port.discard_input()?;
    port.write_all(&out)?;
    port.flush()?;

    let deadline = Instant::now() + read_timeout;
    let mut buf = BytesMut::with_capacity(64);
    let mut chunk = [0u8; 64];
    loop {
        if let Some(ack) = codec.decode(&mut buf)? {
            return Ok(ack);
        }
        if Instant::now() >= deadline {
            return Err(Error::transport(format!(
                "no acknowledgement within {:?}",
                read_timeout
            )));
        }
        match port.read(&mut chunk) {
            Ok(0) => return Err(Error::transport("serial port closed")),
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
            Err(e)
                if matches!(
                    e.kind(),
                    ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
                ) => {}
            Err(e) => return Err(e.into()),
        }
    }
}

#[async_trait]
impl<P: SerialLine + 'static> Transport for SerialTransport<P> {
    async fn send(&self, _path: &str, body: &[u8]) -> Result<Reply> {
        self.exchange(body).instrument(self.span.clone()).await
    }
}
