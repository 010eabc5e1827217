use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::core::{Error, Result};

/// Endpoint for `showKey` and `hello`
pub const PAIRING_PATH: &str = "/udap/api/pairing";

/// Endpoint for key presses
pub const COMMAND_PATH: &str = "/udap/api/command";

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="utf-8"?>"#;

static SERVER_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)SERVER:[ \t]*\S+[ \t]+\S+[ \t]+([\w-]+)").expect("valid SERVER pattern")
});

/// UDAP request bodies
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Envelope {
    /// Ask the TV to display its pairing PIN
    ShowKey,
    /// Complete pairing with the PIN the operator read off the screen
    Hello { pin: String, port: u16 },
    /// Simulate a remote key press
    KeyInput { code: u16 },
}

impl Envelope {
    /// Path the envelope is posted to
    pub fn path(&self) -> &'static str {
        match self {
            Envelope::ShowKey | Envelope::Hello { .. } => PAIRING_PATH,
            Envelope::KeyInput { .. } => COMMAND_PATH,
        }
    }

    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Envelope::ShowKey => "showKey",
            Envelope::Hello { .. } => "hello",
            Envelope::KeyInput { .. } => "HandleKeyInput",
        }
    }

    pub fn to_xml(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(XML_DECLARATION)?;
        match self {
            Envelope::ShowKey => write!(
                f,
                r#"<envelope><api type="pairing"><name>showKey</name></api></envelope>"#
            ),
            Envelope::Hello { pin, port } => write!(
                f,
                r#"<envelope><api type="pairing"><name>hello</name><value>{}</value><port>{}</port></api></envelope>"#,
                escape(pin),
                port
            ),
            Envelope::KeyInput { code } => write!(
                f,
                r#"<envelope><api type="command"><name>HandleKeyInput</name><value>{}</value></api></envelope>"#,
                code
            ),
        }
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

const PROBE_REQUEST_LINE: &str = "B-SEARCH * HTTP/1.1\r\n";

/// The UDAP discovery probe
pub fn discovery_probe(user_agent: &str) -> String {
    format!(
        "{}\
         HOST: 239.255.255.250:1990\r\n\
         MAN: \"ssdp:discover\"\r\n\
         MX: 3\r\n\
         ST: urn:schemas-udap:service:smartText:1\r\n\
         USER-AGENT:{}\r\n\r\n",
        PROBE_REQUEST_LINE, user_agent
    )
}

/// True for a discovery probe, ours or another client's; TVs never send one
pub fn is_discovery_probe(payload: &[u8]) -> bool {
    payload.starts_with(PROBE_REQUEST_LINE.as_bytes())
}

/// Extracts the device name from a discovery reply.
///
/// The name is the third token of the `SERVER:` header.
pub fn parse_server_name(reply: &str) -> Result<String> {
    SERVER_NAME
        .captures(reply)
        .and_then(|caps| caps.get(1))
        .map(|name| name.as_str().to_string())
        .ok_or_else(|| Error::protocol("discovery reply has no usable SERVER header"))
}
