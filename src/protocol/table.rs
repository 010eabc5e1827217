//! Response tables
//!
//! The TV echoes every RS-232C command it receives as
//! `"<opcode1> <opcode2> <OK|NG> <slot> <data> x"`. Everything here is derived
//! from one fan-out over (slot, command, data token): the [`ResponseTable`]
//! maps each possible echo back to its command name, and the
//! [`SerialCommandIndex`] pairs each transmit frame with the echoes it can
//! produce.
//!
//! Both are pure functions of the catalog and serialize deterministically.
//! When two catalog names expand to the same echo, the name that sorts last
//! wins: entries are inserted in catalog order and later inserts overwrite.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::{CommandCatalog, CommandDescriptor};
use crate::core::{DeviceSlot, Result};

/// Outcome token of an acknowledgement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    /// Negative acknowledgement
    Ng,
    /// Acknowledgement
    Ok,
}

impl Marker {
    /// Both markers, in the order keys are generated
    pub const ALL: [Marker; 2] = [Marker::Ng, Marker::Ok];

    pub fn as_str(&self) -> &'static str {
        match self {
            Marker::Ng => "NG",
            Marker::Ok => "OK",
        }
    }

    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "NG" => Some(Marker::Ng),
            "OK" => Some(Marker::Ok),
            _ => None,
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reads the marker out of a raw acknowledgement.
///
/// The marker is located by position (third space-separated field), so an
/// empty first opcode does not shift it.
pub fn ack_marker(frame: &str) -> Option<Marker> {
    frame.split(' ').nth(2).and_then(Marker::parse)
}

/// One (slot, command, data token) combination of the fan-out
#[derive(Debug, Clone)]
pub struct Expansion<'a> {
    pub slot: DeviceSlot,
    pub name: &'a str,
    pub descriptor: &'a CommandDescriptor,
    pub data: Cow<'a, str>,
}

impl Expansion<'_> {
    /// The echo the TV sends for this combination
    pub fn ack(&self, marker: Marker) -> String {
        format!(
            "{} {} {} {} {} x",
            self.descriptor.opcode1, self.descriptor.opcode2, marker, self.slot, self.data
        )
    }

    /// The frame that asks the TV to run this combination
    pub fn xmit(&self) -> String {
        format!(
            "{} {} {} {}\n",
            self.descriptor.opcode1, self.descriptor.opcode2, self.slot, self.data
        )
    }

    /// Command name followed by the data token, e.g. `VolSet07`
    pub fn index_key(&self) -> String {
        format!("{}{}", self.name, self.data)
    }
}

/// Expands the catalog into every echoed (slot, command, data) combination.
///
/// Status queries and WebOS-only commands are skipped. A ranged command with
/// bound `M` yields the `M + 1` values `0..=M`, zero padded to two digits;
/// any other command yields its fixed payload once.
pub fn expand(catalog: &CommandCatalog) -> impl Iterator<Item = Expansion<'_>> {
    DeviceSlot::all().flat_map(move |slot| {
        catalog
            .iter()
            .filter(|(_, descriptor)| descriptor.is_echoed())
            .flat_map(move |(name, descriptor)| {
                data_tokens(descriptor).map(move |data| Expansion {
                    slot,
                    name: name.as_str(),
                    descriptor,
                    data,
                })
            })
    })
}

fn data_tokens(descriptor: &CommandDescriptor) -> Box<dyn Iterator<Item = Cow<'_, str>> + '_> {
    match descriptor.range() {
        Some(max) => Box::new((0..=max).map(|value| Cow::Owned(format!("{:02}", value)))),
        None => Box::new(std::iter::once(Cow::Borrowed(
            descriptor.fixed_payload.as_str(),
        ))),
    }
}

fn empty_slots<V>() -> BTreeMap<DeviceSlot, BTreeMap<String, V>> {
    DeviceSlot::all().map(|slot| (slot, BTreeMap::new())).collect()
}

/// Echo string → command name, per slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseTable(BTreeMap<DeviceSlot, BTreeMap<String, String>>);

impl ResponseTable {
    /// Builds the table for every slot
    pub fn build(catalog: &CommandCatalog) -> Self {
        let mut slots = empty_slots();
        for expansion in expand(catalog) {
            let entries = slots.entry(expansion.slot).or_default();
            for marker in Marker::ALL {
                entries.insert(expansion.ack(marker), expansion.name.to_string());
            }
        }
        ResponseTable(slots)
    }

    /// Names the command a raw acknowledgement refers to
    pub fn lookup(&self, slot: DeviceSlot, frame: &str) -> Option<&str> {
        self.0.get(&slot)?.get(frame).map(String::as_str)
    }

    /// Entries of one slot
    pub fn slot(&self, slot: DeviceSlot) -> Option<&BTreeMap<String, String>> {
        self.0.get(&slot)
    }

    /// Number of entries for one slot
    pub fn slot_len(&self, slot: DeviceSlot) -> usize {
        self.0.get(&slot).map_or(0, BTreeMap::len)
    }

    /// Number of slots covered (always [`MAX_SLOTS`](crate::core::MAX_SLOTS))
    pub fn slot_count(&self) -> usize {
        self.0.len()
    }

    /// Total number of entries across all slots
    pub fn len(&self) -> usize {
        self.0.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pretty JSON rendering; byte-stable for a given catalog
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for ResponseTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = self.to_json().map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

/// A transmit frame and the two echoes it can produce
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerialCommand {
    pub xmit: String,
    pub ack_ok: String,
    pub ack_ng: String,
}

impl SerialCommand {
    fn from_expansion(expansion: &Expansion<'_>) -> Self {
        SerialCommand {
            xmit: expansion.xmit(),
            ack_ok: expansion.ack(Marker::Ok),
            ack_ng: expansion.ack(Marker::Ng),
        }
    }

    pub fn xmit_bytes(&self) -> &[u8] {
        self.xmit.as_bytes()
    }

    /// Which of the expected echoes `frame` is, if either
    pub fn matches(&self, frame: &str) -> Option<Marker> {
        if frame == self.ack_ok {
            Some(Marker::Ok)
        } else if frame == self.ack_ng {
            Some(Marker::Ng)
        } else {
            None
        }
    }
}

/// `name + data token` → [`SerialCommand`], per slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SerialCommandIndex(BTreeMap<DeviceSlot, BTreeMap<String, SerialCommand>>);

impl SerialCommandIndex {
    /// Builds the index from the same fan-out as [`ResponseTable::build`]
    pub fn build(catalog: &CommandCatalog) -> Self {
        let mut slots = empty_slots();
        for expansion in expand(catalog) {
            slots
                .entry(expansion.slot)
                .or_default()
                .insert(expansion.index_key(), SerialCommand::from_expansion(&expansion));
        }
        SerialCommandIndex(slots)
    }

    /// Looks up a command by name and data token (`"07"`, `"01"`, ...)
    pub fn command(&self, slot: DeviceSlot, name: &str, data: &str) -> Option<&SerialCommand> {
        self.0.get(&slot)?.get(&format!("{}{}", name, data))
    }

    pub fn slot(&self, slot: DeviceSlot) -> Option<&BTreeMap<String, SerialCommand>> {
        self.0.get(&slot)
    }

    pub fn len(&self) -> usize {
        self.0.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for SerialCommandIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = self.to_json().map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MAX_SLOTS;

    fn catalog(entries: Vec<(&str, CommandDescriptor)>) -> CommandCatalog {
        entries
            .into_iter()
            .fold(CommandCatalog::new(), |catalog, (name, descriptor)| {
                catalog.with(name, descriptor).unwrap()
            })
    }

    fn slot(id: u8) -> DeviceSlot {
        DeviceSlot::new(id).unwrap()
    }

    fn assert_slot_sizes(table: &ResponseTable, expected: usize) {
        assert_eq!(table.slot_count(), MAX_SLOTS);
        for id in DeviceSlot::all() {
            assert_eq!(table.slot_len(id), expected, "slot {}", id);
        }
    }

    #[test]
    fn test_fixed_payload_emits_two_keys_per_slot() {
        let table = ResponseTable::build(&catalog(vec![(
            "PowerOn",
            CommandDescriptor::serial("k", "a", "01"),
        )]));

        assert_slot_sizes(&table, 2);
        assert_eq!(table.len(), 2 * MAX_SLOTS);
        assert_eq!(table.lookup(slot(0), "k a OK 00 01 x"), Some("PowerOn"));
        assert_eq!(table.lookup(slot(4), "k a NG 04 01 x"), Some("PowerOn"));
        assert_eq!(table.lookup(slot(4), "k a OK 00 01 x"), None);
    }

    #[test]
    fn test_single_record_without_payload() {
        let table = ResponseTable::build(&catalog(vec![(
            "Single-Step",
            CommandDescriptor::serial("k", "z", ""),
        )]));

        assert_slot_sizes(&table, 2);
        assert_eq!(table.lookup(slot(2), "k z OK 02  x"), Some("Single-Step"));
    }

    #[test]
    fn test_range_is_inclusive() {
        let table = ResponseTable::build(&catalog(vec![(
            "Multi-Step",
            CommandDescriptor::ranged("k", "q", 64),
        )]));

        assert_slot_sizes(&table, 130);
        assert_eq!(table.len(), 650);
        assert_eq!(table.lookup(slot(1), "k q OK 01 00 x"), Some("Multi-Step"));
        assert_eq!(table.lookup(slot(1), "k q NG 01 64 x"), Some("Multi-Step"));
        assert_eq!(table.lookup(slot(1), "k q OK 01 65 x"), None);
    }

    #[test]
    fn test_status_query_contributes_nothing() {
        let table = ResponseTable::build(&catalog(vec![(
            "Single-Step",
            CommandDescriptor::serial("k", "z", "FF"),
        )]));

        assert_slot_sizes(&table, 0);
        assert!(table.is_empty());
    }

    #[test]
    fn test_webos_only_contributes_nothing() {
        let table = ResponseTable::build(&catalog(vec![
            ("WebOs", CommandDescriptor::default()),
            ("Home", CommandDescriptor::webos(21)),
        ]));

        assert_slot_sizes(&table, 0);
    }

    #[test]
    fn test_single_opcode_keeps_field_positions() {
        let table = ResponseTable::build(&catalog(vec![(
            "Abnormal0",
            CommandDescriptor::serial("", "z", "00"),
        )]));

        let frame = " z OK 03 00 x";
        assert_eq!(table.lookup(slot(3), frame), Some("Abnormal0"));
        assert_eq!(ack_marker(frame), Some(Marker::Ok));
    }

    #[test]
    fn test_collisions_keep_last_name() {
        let table = ResponseTable::build(&catalog(vec![
            ("Alpha", CommandDescriptor::serial("k", "a", "01")),
            ("Beta", CommandDescriptor::serial("k", "a", "01")),
        ]));

        assert_slot_sizes(&table, 2);
        assert_eq!(table.lookup(slot(0), "k a OK 00 01 x"), Some("Beta"));
    }

    #[test]
    fn test_serialization_is_deterministic() {
        let builtin = CommandCatalog::builtin();
        let first = ResponseTable::build(&builtin).to_json().unwrap();
        let second = ResponseTable::build(&builtin.clone()).to_json().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_golden_json() {
        let table = ResponseTable::build(&catalog(vec![(
            "PowerOn",
            CommandDescriptor::serial("k", "a", "01").with_webos(1),
        )]));

        let mut expected = String::from("{\n");
        for id in 0..MAX_SLOTS {
            expected.push_str(&format!(
                "  \"{id}\": {{\n    \"k a NG {id:02} 01 x\": \"PowerOn\",\n    \"k a OK {id:02} 01 x\": \"PowerOn\"\n  }}"
            ));
            expected.push_str(if id + 1 < MAX_SLOTS { ",\n" } else { "\n" });
        }
        expected.push('}');

        assert_eq!(table.to_string(), expected);
    }

    #[test]
    fn test_deserialize_rejects_out_of_range_slot() {
        let table = ResponseTable::build(&catalog(vec![(
            "PowerOn",
            CommandDescriptor::serial("k", "a", "01"),
        )]));
        let parsed: ResponseTable = serde_json::from_str(&table.to_json().unwrap()).unwrap();
        assert_eq!(parsed, table);

        let err = serde_json::from_str::<ResponseTable>(r#"{"7": {"k a OK 07 01 x": "PowerOn"}}"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_empty_catalog_still_covers_every_slot() {
        let table = ResponseTable::build(&CommandCatalog::new());
        assert_eq!(
            table.to_json().unwrap(),
            "{\n  \"0\": {},\n  \"1\": {},\n  \"2\": {},\n  \"3\": {},\n  \"4\": {}\n}"
        );
    }

    #[test]
    fn test_builtin_table_size() {
        let builtin = CommandCatalog::builtin();
        let per_slot: usize = builtin
            .iter()
            .filter(|(_, d)| d.is_echoed())
            .map(|(_, d)| 2 * d.range().map_or(1, |max| usize::from(max) + 1))
            .sum();

        let table = ResponseTable::build(&builtin);
        assert!(table.len() <= per_slot * MAX_SLOTS);
        assert_eq!(table.lookup(slot(0), "k a OK 00 00 x"), Some("PowerOff"));
        assert!(table.lookup(slot(0), "k a OK 00 FF x").is_none());
    }

    #[test]
    fn test_serial_index_reuses_fan_out() {
        let catalog = catalog(vec![
            ("First", CommandDescriptor::serial("k", "z", "01")),
            ("Second", CommandDescriptor::ranged("m", "d", 10)),
        ]);
        let index = SerialCommandIndex::build(&catalog);
        let table = ResponseTable::build(&catalog);

        assert_eq!(index.slot(slot(0)).unwrap().len(), 12);
        assert_eq!(index.len(), 12 * MAX_SLOTS);

        let first = index.command(slot(3), "First", "01").unwrap();
        assert_eq!(first.xmit, "k z 03 01\n");
        assert_eq!(first.ack_ok, "k z OK 03 01 x");
        assert_eq!(first.ack_ng, "k z NG 03 01 x");

        let second = index.command(slot(0), "Second", "10").unwrap();
        assert_eq!(second.xmit_bytes(), b"m d 00 10\n");
        assert!(index.command(slot(0), "Second", "11").is_none());

        // every echo the index expects is one the table recognises
        for id in DeviceSlot::all() {
            for command in index.slot(id).unwrap().values() {
                assert!(table.lookup(id, &command.ack_ok).is_some());
                assert!(table.lookup(id, &command.ack_ng).is_some());
            }
        }
    }

    #[test]
    fn test_serial_command_matches() {
        let index = SerialCommandIndex::build(&catalog(vec![(
            "ScreenOff",
            CommandDescriptor::serial("k", "d", "00"),
        )]));
        let command = index.command(slot(1), "ScreenOff", "00").unwrap();

        assert_eq!(command.matches("k d OK 01 00 x"), Some(Marker::Ok));
        assert_eq!(command.matches("k d NG 01 00 x"), Some(Marker::Ng));
        assert_eq!(command.matches("k d OK 02 00 x"), None);
    }

    #[test]
    fn test_ack_marker_rejects_garbage() {
        assert_eq!(ack_marker("k a NG 00 01 x"), Some(Marker::Ng));
        assert_eq!(ack_marker("hello x"), None);
        assert_eq!(ack_marker(""), None);
    }
}
