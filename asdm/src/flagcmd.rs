// Copyright 2024-2026 the asdmkit collaborators
// Licensed under the MIT License.

/*!

The FlagCmd table: flagging commands issued against the dataset.

Keyed by time interval alone; the whole table forms a single time
context, so the rows are queryable in ascending start order however
they were added.

 */

use crate::table::{self, SdmTable, TableRow};
use crate::types::{ArrayTime, ArrayTimeInterval};
use crate::SdmError;
use asdm_core::io::{BinaryReader, BinaryWriter};
use std::io::{Read, Write};

/// One flagging command.
///
/// The `kind` field carries the schema attribute named "type".
#[derive(Clone, Debug, Default)]
pub struct FlagCmdRow {
    added: bool,
    time_interval: ArrayTimeInterval,
    kind: String,
    reason: String,
    level: i32,
    severity: i32,
    applied: bool,
    command: String,
}

pub type FlagCmdTable = SdmTable<FlagCmdRow>;

impl FlagCmdRow {
    pub fn new(
        time_interval: ArrayTimeInterval,
        kind: &str,
        reason: &str,
        level: i32,
        severity: i32,
        applied: bool,
        command: &str,
    ) -> Self {
        FlagCmdRow {
            added: false,
            time_interval,
            kind: kind.to_owned(),
            reason: reason.to_owned(),
            level,
            severity,
            applied,
            command: command.to_owned(),
        }
    }

    pub fn time_interval(&self) -> ArrayTimeInterval {
        self.time_interval
    }

    /// Change the key interval. Fails once the row has been added to a
    /// table.
    pub fn set_time_interval(&mut self, value: ArrayTimeInterval) -> Result<(), SdmError> {
        if self.added {
            return Err(SdmError::frozen_key(Self::TABLE_NAME, "timeInterval"));
        }

        self.time_interval = value;
        Ok(())
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn set_kind(&mut self, value: &str) {
        self.kind = value.to_owned();
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn set_reason(&mut self, value: &str) {
        self.reason = value.to_owned();
    }

    pub fn level(&self) -> i32 {
        self.level
    }

    pub fn set_level(&mut self, value: i32) {
        self.level = value;
    }

    pub fn severity(&self) -> i32 {
        self.severity
    }

    pub fn set_severity(&mut self, value: i32) {
        self.severity = value;
    }

    pub fn applied(&self) -> bool {
        self.applied
    }

    pub fn set_applied(&mut self, value: bool) {
        self.applied = value;
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn set_command(&mut self, value: &str) {
        self.command = value.to_owned();
    }
}

impl TableRow for FlagCmdRow {
    const TABLE_NAME: &'static str = "FlagCmd";
    const ATTRIBUTES: &'static [&'static str] = &[
        "timeInterval",
        "type",
        "reason",
        "level",
        "severity",
        "applied",
        "command",
    ];

    fn key(&self) -> String {
        self.time_interval.to_string()
    }

    fn context(&self) -> Option<(String, ArrayTime)> {
        Some((String::new(), self.time_interval.start()))
    }

    fn equal_by_required_value(&self, other: &Self) -> bool {
        self.time_interval == other.time_interval
            && self.kind == other.kind
            && self.reason == other.reason
            && self.level == other.level
            && self.severity == other.severity
            && self.applied == other.applied
            && self.command == other.command
    }

    fn mark_added(&mut self) {
        self.added = true;
    }

    fn write_attribute<W: Write>(
        &self,
        name: &str,
        stream: &mut BinaryWriter<W>,
    ) -> Result<(), SdmError> {
        match name {
            "timeInterval" => {
                stream.write_i64(self.time_interval.start().get())?;
                stream.write_i64(self.time_interval.duration().get())?;
            }
            "type" => stream.write_string(&self.kind)?,
            "reason" => stream.write_string(&self.reason)?,
            "level" => stream.write_i32(self.level)?,
            "severity" => stream.write_i32(self.severity)?,
            "applied" => stream.write_bool(self.applied)?,
            "command" => stream.write_string(&self.command)?,
            _ => return Err(SdmError::unknown_attribute(Self::TABLE_NAME, name)),
        }

        Ok(())
    }

    fn read_attribute<S: Read>(
        &mut self,
        name: &str,
        stream: &mut BinaryReader<S>,
    ) -> Result<(), SdmError> {
        match name {
            "timeInterval" => {
                let start = ArrayTime::new(stream.read_i64()?);
                let duration = crate::types::Interval::new(stream.read_i64()?);
                self.time_interval = ArrayTimeInterval::new(start, duration);
            }
            "type" => self.kind = stream.read_string()?,
            "reason" => self.reason = stream.read_string()?,
            "level" => self.level = stream.read_i32()?,
            "severity" => self.severity = stream.read_i32()?,
            "applied" => self.applied = stream.read_bool()?,
            "command" => self.command = stream.read_string()?,
            _ => return Err(SdmError::unknown_attribute(Self::TABLE_NAME, name)),
        }

        Ok(())
    }

    fn xml_attribute(&self, name: &str) -> Result<Option<String>, SdmError> {
        Ok(Some(match name {
            "timeInterval" => self.time_interval.to_string(),
            "type" => self.kind.clone(),
            "reason" => self.reason.clone(),
            "level" => self.level.to_string(),
            "severity" => self.severity.to_string(),
            "applied" => self.applied.to_string(),
            "command" => self.command.clone(),
            _ => return Err(SdmError::unknown_attribute(Self::TABLE_NAME, name)),
        }))
    }

    fn set_xml_attribute(&mut self, name: &str, text: &str) -> Result<(), SdmError> {
        match name {
            "timeInterval" => self.time_interval = text.parse()?,
            "type" => self.kind = text.to_owned(),
            "reason" => self.reason = text.to_owned(),
            "level" => self.level = table::parse_scalar(Self::TABLE_NAME, name, text)?,
            "severity" => self.severity = table::parse_scalar(Self::TABLE_NAME, name, text)?,
            "applied" => self.applied = table::parse_bool(Self::TABLE_NAME, name, text)?,
            "command" => self.command = text.to_owned(),
            _ => return Err(SdmError::unknown_attribute(Self::TABLE_NAME, name)),
        }

        Ok(())
    }
}

impl SdmTable<FlagCmdRow> {
    /// All flagging commands in ascending start order.
    pub fn time_ordered(&self) -> Vec<&FlagCmdRow> {
        self.by_context("").unwrap_or_default()
    }
}

#[cfg(test)]
use crate::types::Interval;

#[cfg(test)]
fn minute_interval(start: i64) -> ArrayTimeInterval {
    ArrayTimeInterval::new(ArrayTime::new(start), Interval::new(60_000_000_000))
}

#[cfg(test)]
#[test]
fn single_command_round_trip_through_table() {
    let mut table = FlagCmdTable::new();
    let row = FlagCmdRow::new(minute_interval(1000), "FLAG", "", 1, 5, false, "cmd");
    table.add(row).unwrap();

    let rows = table.get();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].command(), "cmd");
    assert_eq!(rows[0].applied(), false);
    assert_eq!(rows[0].kind(), "FLAG");
}

#[cfg(test)]
#[test]
fn addition_is_idempotent_on_exact_duplicates() {
    let mut table = FlagCmdTable::new();
    let first = table
        .add(FlagCmdRow::new(minute_interval(1000), "FLAG", "", 1, 5, false, "cmd"))
        .unwrap();
    let second = table
        .add(FlagCmdRow::new(minute_interval(1000), "FLAG", "", 1, 5, false, "cmd"))
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(table.len(), 1);
}

#[cfg(test)]
#[test]
fn same_key_different_value_is_a_duplicate_key() {
    let mut table = FlagCmdTable::new();
    table
        .add(FlagCmdRow::new(minute_interval(1000), "FLAG", "", 1, 5, false, "cmd"))
        .unwrap();

    let err = table
        .add(FlagCmdRow::new(minute_interval(1000), "FLAG", "", 1, 5, true, "cmd"))
        .unwrap_err();

    assert!(matches!(err, SdmError::DuplicateKey { .. }));
    assert_eq!(table.len(), 1);
}

#[cfg(test)]
#[test]
fn key_attributes_freeze_on_addition() {
    let mut row = FlagCmdRow::new(minute_interval(1000), "FLAG", "", 1, 5, false, "cmd");
    row.set_time_interval(minute_interval(2000)).unwrap();

    let mut table = FlagCmdTable::new();
    let index = table.add(row).unwrap();

    let row = table.row_mut(index);
    let err = row.set_time_interval(minute_interval(3000)).unwrap_err();
    assert!(matches!(err, SdmError::IllegalAccess(_)));

    // Non-key attributes stay mutable.
    row.set_applied(true);
    assert!(table.get()[index].applied());
}

#[cfg(test)]
#[test]
fn commands_come_back_time_ordered() {
    let mut table = FlagCmdTable::new();

    for start in &[5000i64, 1000, 3000, 2000, 4000] {
        table
            .add(FlagCmdRow::new(minute_interval(*start), "FLAG", "", 1, 5, false, "cmd"))
            .unwrap();
    }

    let starts: Vec<i64> = table
        .time_ordered()
        .iter()
        .map(|r| r.time_interval().start().get())
        .collect();
    assert_eq!(starts, vec![1000, 2000, 3000, 4000, 5000]);

    // Insertion order is what get() preserves.
    assert_eq!(table.get()[0].time_interval().start().get(), 5000);
}

#[cfg(test)]
#[test]
fn lookup_matches_the_full_value_set() {
    let mut table = FlagCmdTable::new();
    table
        .add(FlagCmdRow::new(minute_interval(1000), "FLAG", "", 1, 5, false, "cmd"))
        .unwrap();

    let probe = FlagCmdRow::new(minute_interval(1000), "FLAG", "", 1, 5, false, "cmd");
    assert!(table.lookup(&probe).is_some());

    // The interval participates in value equality like every other
    // caller-supplied attribute.
    let probe = FlagCmdRow::new(minute_interval(9999), "FLAG", "", 1, 5, false, "cmd");
    assert!(table.lookup(&probe).is_none());

    let probe = FlagCmdRow::new(minute_interval(1000), "FLAG", "", 2, 5, false, "cmd");
    assert!(table.lookup(&probe).is_none());
}
