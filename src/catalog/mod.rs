//! Command catalog
//!
//! Maps human readable command names to the opcodes and payloads the TV
//! understands. A descriptor carries both encodings: the RS-232C opcode pair
//! with its data token, and the single key code used by the UDAP/WebOS IP
//! protocol. The catalog is ordered by name so everything derived from it is
//! deterministic.

mod builtin;

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result, STATUS_QUERY};

/// One catalog entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandDescriptor {
    /// First RS-232C opcode character
    #[serde(rename = "1st cmd", default, skip_serializing_if = "String::is_empty")]
    pub opcode1: String,
    /// Second RS-232C opcode character
    #[serde(rename = "2nd cmd", default, skip_serializing_if = "String::is_empty")]
    pub opcode2: String,
    /// Data token sent when the command has no range
    #[serde(rename = "data", default, skip_serializing_if = "String::is_empty")]
    pub fixed_payload: String,
    /// Largest value a ranged command accepts; zero behaves like absent
    #[serde(rename = "max", default, skip_serializing_if = "Option::is_none")]
    pub max_range: Option<u16>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub note: String,
    /// Key code for the IP protocol
    #[serde(rename = "WebOS", default, skip_serializing_if = "Option::is_none")]
    pub alt_numeric_code: Option<u16>,
}

impl CommandDescriptor {
    /// A serial command with a fixed data token
    pub fn serial(opcode1: &str, opcode2: &str, payload: &str) -> Self {
        CommandDescriptor {
            opcode1: opcode1.to_string(),
            opcode2: opcode2.to_string(),
            fixed_payload: payload.to_string(),
            ..Default::default()
        }
    }

    /// A serial command taking any value in `0..=max`
    pub fn ranged(opcode1: &str, opcode2: &str, max: u16) -> Self {
        CommandDescriptor {
            opcode1: opcode1.to_string(),
            opcode2: opcode2.to_string(),
            max_range: Some(max),
            ..Default::default()
        }
    }

    /// A command only reachable over the IP protocol
    pub fn webos(code: u16) -> Self {
        CommandDescriptor {
            alt_numeric_code: Some(code),
            ..Default::default()
        }
    }

    pub fn with_webos(mut self, code: u16) -> Self {
        self.alt_numeric_code = Some(code);
        self
    }

    pub fn with_note(mut self, note: &str) -> Self {
        self.note = note.to_string();
        self
    }

    /// True when neither opcode is set
    pub fn is_webos_only(&self) -> bool {
        self.opcode1.is_empty() && self.opcode2.is_empty()
    }

    /// True when the payload asks the TV for live telemetry
    pub fn is_status_query(&self) -> bool {
        self.fixed_payload == STATUS_QUERY
    }

    /// Whether the TV answers this command with a predictable echo.
    ///
    /// Status queries are answered with telemetry and WebOS-only commands
    /// never travel over the serial line, so neither can be looked up.
    pub fn is_echoed(&self) -> bool {
        !self.is_status_query() && !self.is_webos_only()
    }

    /// The range bound if the command is ranged
    pub fn range(&self) -> Option<u16> {
        self.max_range.filter(|max| *max > 0)
    }

    fn validate(&self, name: &str) -> Result<()> {
        for (field, opcode) in [("1st cmd", &self.opcode1), ("2nd cmd", &self.opcode2)] {
            if opcode.chars().count() > 1 {
                return Err(Error::config(format!(
                    "command {}: {} must be at most one character, got {:?}",
                    name, field, opcode
                )));
            }
        }
        Ok(())
    }
}

/// Read-only mapping from command name to descriptor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandCatalog(BTreeMap<String, CommandDescriptor>);

impl CommandCatalog {
    /// Creates an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// The LG RS-232C and WebOS command set
    pub fn builtin() -> Self {
        let commands = builtin::commands()
            .into_iter()
            .map(|(name, descriptor)| (name.to_string(), descriptor))
            .collect();
        CommandCatalog(commands)
    }

    /// Parses a catalog from its JSON form, validating every entry
    pub fn from_json(json: &str) -> Result<Self> {
        let catalog: CommandCatalog = serde_json::from_str(json)?;
        for (name, descriptor) in catalog.iter() {
            descriptor.validate(name)?;
        }
        Ok(catalog)
    }

    /// Adds a command, returning the descriptor it replaced
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        descriptor: CommandDescriptor,
    ) -> Result<Option<CommandDescriptor>> {
        let name = name.into();
        descriptor.validate(&name)?;
        Ok(self.0.insert(name, descriptor))
    }

    /// Builder form of [`insert`](Self::insert)
    pub fn with(mut self, name: impl Into<String>, descriptor: CommandDescriptor) -> Result<Self> {
        self.insert(name, descriptor)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&CommandDescriptor> {
        self.0.get(name)
    }

    /// Entries in name order
    pub fn iter(&self) -> btree_map::Iter<'_, String, CommandDescriptor> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Pretty JSON rendering, stable for a given catalog
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl<'a> IntoIterator for &'a CommandCatalog {
    type Item = (&'a String, &'a CommandDescriptor);
    type IntoIter = btree_map::Iter<'a, String, CommandDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for CommandCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = self.to_json().map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eligibility() {
        assert!(CommandDescriptor::serial("k", "a", "01").is_echoed());
        assert!(!CommandDescriptor::serial("k", "a", "FF").is_echoed());
        assert!(!CommandDescriptor::webos(21).is_echoed());
        assert!(CommandDescriptor::serial("", "z", "00").is_echoed());
    }

    #[test]
    fn test_zero_range_is_fixed() {
        let mut descriptor = CommandDescriptor::ranged("k", "f", 0);
        assert_eq!(descriptor.range(), None);
        descriptor.max_range = Some(64);
        assert_eq!(descriptor.range(), Some(64));
    }

    #[test]
    fn test_insert_rejects_long_opcode() {
        let mut catalog = CommandCatalog::new();
        let err = catalog
            .insert("Bad", CommandDescriptor::serial("ka", "", "01"))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_builtin_catalog() {
        let catalog = CommandCatalog::builtin();
        assert_eq!(catalog.len(), 145);
        for (name, descriptor) in &catalog {
            assert!(descriptor.validate(name).is_ok(), "{} is invalid", name);
        }

        let power_off = catalog.get("PowerOff").unwrap();
        assert_eq!(power_off.opcode1, "k");
        assert_eq!(power_off.opcode2, "a");
        assert_eq!(power_off.fixed_payload, "00");
        assert_eq!(power_off.alt_numeric_code, Some(0));

        assert!(catalog.get("Home").unwrap().is_webos_only());
        assert_eq!(catalog.get("VolSet").unwrap().range(), Some(64));
    }

    #[test]
    fn test_json_uses_wire_field_names() {
        let catalog = CommandCatalog::new()
            .with("MuteOn", CommandDescriptor::serial("k", "e", "00").with_webos(26))
            .unwrap();

        let json = serde_json::to_string(&catalog).unwrap();
        assert_eq!(
            json,
            r#"{"MuteOn":{"1st cmd":"k","2nd cmd":"e","data":"00","WebOS":26}}"#
        );
        assert_eq!(CommandCatalog::from_json(&json).unwrap(), catalog);
    }

    #[test]
    fn test_empty_catalog_renders_as_empty_object() {
        assert_eq!(CommandCatalog::new().to_string(), "{}");
    }

    #[test]
    fn test_from_json_validates() {
        let err = CommandCatalog::from_json(r#"{"X":{"1st cmd":"kk"}}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
