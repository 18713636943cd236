// Copyright 2024-2026 the asdmkit collaborators
// Licensed under the MIT License.

//! The Station table: the fixed pads and platforms antennas sit on.

use crate::enums::StationType;
use crate::table::{self, SdmTable, TableRow};
use crate::types::{Tag, TagKind};
use crate::SdmError;
use asdm_core::io::{BinaryReader, BinaryWriter};
use std::io::{Read, Write};

/// One station position.
///
/// The key tag is generated by the owning table on addition.
#[derive(Clone, Debug)]
pub struct StationRow {
    added: bool,
    station_id: Tag,
    name: String,
    position: Vec<f64>,
    station_type: StationType,
}

pub type StationTable = SdmTable<StationRow>;

impl Default for StationRow {
    fn default() -> Self {
        StationRow {
            added: false,
            station_id: Tag::default(),
            name: String::new(),
            position: Vec::new(),
            station_type: StationType::ANTENNA_PAD,
        }
    }
}

impl StationRow {
    pub fn new(name: &str, position: Vec<f64>, station_type: StationType) -> Self {
        StationRow {
            added: false,
            station_id: Tag::default(),
            name: name.to_owned(),
            position,
            station_type,
        }
    }

    pub fn station_id(&self) -> Tag {
        self.station_id
    }

    /// Install a specific key tag. Fails once the row has been added;
    /// rows added through [`SdmTable::add`] get a generated tag
    /// instead.
    pub fn set_station_id(&mut self, value: Tag) -> Result<(), SdmError> {
        if self.added {
            return Err(SdmError::frozen_key(Self::TABLE_NAME, "stationId"));
        }

        self.station_id = value;
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, value: &str) {
        self.name = value.to_owned();
    }

    pub fn position(&self) -> &[f64] {
        &self.position
    }

    pub fn set_position(&mut self, value: Vec<f64>) {
        self.position = value;
    }

    pub fn station_type(&self) -> StationType {
        self.station_type
    }

    pub fn set_station_type(&mut self, value: StationType) {
        self.station_type = value;
    }
}

impl TableRow for StationRow {
    const TABLE_NAME: &'static str = "Station";
    const ATTRIBUTES: &'static [&'static str] = &["stationId", "name", "position", "type"];
    const AUTO_INCREMENTING: bool = true;

    fn key(&self) -> String {
        self.station_id.to_string()
    }

    fn equal_by_required_value(&self, other: &Self) -> bool {
        self.name == other.name
            && self.position == other.position
            && self.station_type == other.station_type
    }

    fn assign_auto_key(&mut self, ordinal: u32) {
        self.station_id = Tag::new(TagKind::Station, ordinal);
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
            "stationId" => stream.write_string(&self.station_id.to_string())?,
            "name" => stream.write_string(&self.name)?,
            "position" => stream.write_f64_array(&self.position)?,
            "type" => stream.write_string(self.station_type.name())?,
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
            "stationId" => self.station_id = stream.read_string()?.parse()?,
            "name" => self.name = stream.read_string()?,
            "position" => self.position = stream.read_f64_array()?,
            "type" => self.station_type = StationType::literal(&stream.read_string()?)?,
            _ => return Err(SdmError::unknown_attribute(Self::TABLE_NAME, name)),
        }

        Ok(())
    }

    fn xml_attribute(&self, name: &str) -> Result<Option<String>, SdmError> {
        Ok(Some(match name {
            "stationId" => self.station_id.to_string(),
            "name" => self.name.clone(),
            "position" => table::format_f64_array(&self.position),
            "type" => self.station_type.name().to_owned(),
            _ => return Err(SdmError::unknown_attribute(Self::TABLE_NAME, name)),
        }))
    }

    fn set_xml_attribute(&mut self, name: &str, text: &str) -> Result<(), SdmError> {
        match name {
            "stationId" => self.station_id = text.parse()?,
            "name" => self.name = text.to_owned(),
            "position" => self.position = table::parse_f64_array(Self::TABLE_NAME, name, text)?,
            "type" => self.station_type = StationType::literal(text)?,
            _ => return Err(SdmError::unknown_attribute(Self::TABLE_NAME, name)),
        }

        Ok(())
    }
}

#[cfg(test)]
#[test]
fn added_rows_get_sequential_tags() {
    let mut table = StationTable::new();

    let a = table
        .add(StationRow::new(
            "A001",
            vec![2225061.0, -5440061.0, -2481681.0],
            StationType::ANTENNA_PAD,
        ))
        .unwrap();
    let b = table
        .add(StationRow::new(
            "WSTB",
            vec![2224430.0, -5440330.0, -2481700.0],
            StationType::WEATHER_STATION,
        ))
        .unwrap();

    assert_eq!(table.get()[a].station_id().to_string(), "Station_0");
    assert_eq!(table.get()[b].station_id().to_string(), "Station_1");
}

#[cfg(test)]
#[test]
fn auto_increment_add_is_idempotent_on_values() {
    let mut table = StationTable::new();
    let first = table
        .add(StationRow::new("A001", vec![1.0, 2.0, 3.0], StationType::ANTENNA_PAD))
        .unwrap();
    let again = table
        .add(StationRow::new("A001", vec![1.0, 2.0, 3.0], StationType::ANTENNA_PAD))
        .unwrap();

    assert_eq!(first, again);
    assert_eq!(table.len(), 1);

    // A different value section becomes a fresh row, not an error.
    table
        .add(StationRow::new("A002", vec![1.0, 2.0, 3.0], StationType::ANTENNA_PAD))
        .unwrap();
    assert_eq!(table.len(), 2);
}

#[cfg(test)]
#[test]
fn key_tag_freezes_on_addition() {
    let mut table = StationTable::new();
    let index = table
        .add(StationRow::new("A001", vec![1.0, 2.0, 3.0], StationType::ANTENNA_PAD))
        .unwrap();

    let err = table
        .row_mut(index)
        .set_station_id(Tag::new(TagKind::Station, 99))
        .unwrap_err();
    assert!(matches!(err, SdmError::IllegalAccess(_)));
}
