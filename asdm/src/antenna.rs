// Copyright 2024-2026 the asdmkit collaborators
// Licensed under the MIT License.

/*!

The Antenna table.

Each row links to the Station row for the pad the antenna sits on, and
optionally to an associated antenna in this same table. Links are
traversed through the target table's key lookup, so a dangling
reference surfaces as a `NoSuchRow` error.

 */

use crate::enums::{AntennaMake, AntennaType};
use crate::station::{StationRow, StationTable};
use crate::table::{self, SdmTable, TableRow};
use crate::types::{ArrayTime, Tag, TagKind};
use crate::SdmError;
use asdm_core::io::{BinaryReader, BinaryWriter};
use std::io::{Read, Write};

#[derive(Clone, Debug)]
pub struct AntennaRow {
    added: bool,
    antenna_id: Tag,
    name: String,
    antenna_make: AntennaMake,
    antenna_type: AntennaType,
    dish_diameter: f64,
    position: Vec<f64>,
    offset: Vec<f64>,
    time: ArrayTime,
    station_id: Tag,
    assoc_antenna_id: Option<Tag>,
}

pub type AntennaTable = SdmTable<AntennaRow>;

impl Default for AntennaRow {
    fn default() -> Self {
        AntennaRow {
            added: false,
            antenna_id: Tag::default(),
            name: String::new(),
            antenna_make: AntennaMake::UNDEFINED,
            antenna_type: AntennaType::GROUND_BASED,
            dish_diameter: 0.,
            position: Vec::new(),
            offset: Vec::new(),
            time: ArrayTime::default(),
            station_id: Tag::default(),
            assoc_antenna_id: None,
        }
    }
}

impl AntennaRow {
    pub fn new(
        name: &str,
        antenna_make: AntennaMake,
        antenna_type: AntennaType,
        dish_diameter: f64,
        position: Vec<f64>,
        offset: Vec<f64>,
        time: ArrayTime,
        station_id: Tag,
    ) -> Self {
        AntennaRow {
            added: false,
            antenna_id: Tag::default(),
            name: name.to_owned(),
            antenna_make,
            antenna_type,
            dish_diameter,
            position,
            offset,
            time,
            station_id,
            assoc_antenna_id: None,
        }
    }

    pub fn antenna_id(&self) -> Tag {
        self.antenna_id
    }

    /// Install a specific key tag. Fails once the row has been added.
    pub fn set_antenna_id(&mut self, value: Tag) -> Result<(), SdmError> {
        if self.added {
            return Err(SdmError::frozen_key(Self::TABLE_NAME, "antennaId"));
        }

        self.antenna_id = value;
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, value: &str) {
        self.name = value.to_owned();
    }

    pub fn antenna_make(&self) -> AntennaMake {
        self.antenna_make
    }

    pub fn set_antenna_make(&mut self, value: AntennaMake) {
        self.antenna_make = value;
    }

    pub fn antenna_type(&self) -> AntennaType {
        self.antenna_type
    }

    pub fn set_antenna_type(&mut self, value: AntennaType) {
        self.antenna_type = value;
    }

    pub fn dish_diameter(&self) -> f64 {
        self.dish_diameter
    }

    pub fn set_dish_diameter(&mut self, value: f64) {
        self.dish_diameter = value;
    }

    pub fn position(&self) -> &[f64] {
        &self.position
    }

    pub fn set_position(&mut self, value: Vec<f64>) {
        self.position = value;
    }

    pub fn offset(&self) -> &[f64] {
        &self.offset
    }

    pub fn set_offset(&mut self, value: Vec<f64>) {
        self.offset = value;
    }

    pub fn time(&self) -> ArrayTime {
        self.time
    }

    pub fn set_time(&mut self, value: ArrayTime) {
        self.time = value;
    }

    pub fn station_id(&self) -> Tag {
        self.station_id
    }

    pub fn set_station_id(&mut self, value: Tag) {
        self.station_id = value;
    }

    /// Follow the station link.
    pub fn station<'a>(&self, stations: &'a StationTable) -> Result<&'a StationRow, SdmError> {
        stations.row_by_key_required(&self.station_id.to_string())
    }

    pub fn assoc_antenna_id(&self) -> Option<Tag> {
        self.assoc_antenna_id
    }

    pub fn set_assoc_antenna_id(&mut self, value: Tag) {
        self.assoc_antenna_id = Some(value);
    }

    pub fn clear_assoc_antenna_id(&mut self) {
        self.assoc_antenna_id = None;
    }

    /// Follow the optional associated-antenna link. Ok(None) when the
    /// link is absent; `NoSuchRow` when it is present but dangling.
    pub fn assoc_antenna<'a>(
        &self,
        antennas: &'a AntennaTable,
    ) -> Result<Option<&'a AntennaRow>, SdmError> {
        match self.assoc_antenna_id {
            None => Ok(None),
            Some(tag) => antennas.row_by_key_required(&tag.to_string()).map(Some),
        }
    }
}

impl TableRow for AntennaRow {
    const TABLE_NAME: &'static str = "Antenna";
    const ATTRIBUTES: &'static [&'static str] = &[
        "antennaId",
        "name",
        "antennaMake",
        "antennaType",
        "dishDiameter",
        "position",
        "offset",
        "time",
        "stationId",
        "assocAntennaId",
    ];
    const AUTO_INCREMENTING: bool = true;

    fn key(&self) -> String {
        self.antenna_id.to_string()
    }

    fn equal_by_required_value(&self, other: &Self) -> bool {
        self.name == other.name
            && self.antenna_make == other.antenna_make
            && self.antenna_type == other.antenna_type
            && self.dish_diameter == other.dish_diameter
            && self.position == other.position
            && self.offset == other.offset
            && self.time == other.time
            && self.station_id == other.station_id
    }

    fn assign_auto_key(&mut self, ordinal: u32) {
        self.antenna_id = Tag::new(TagKind::Antenna, ordinal);
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
            "antennaId" => stream.write_string(&self.antenna_id.to_string())?,
            "name" => stream.write_string(&self.name)?,
            "antennaMake" => stream.write_string(self.antenna_make.name())?,
            "antennaType" => stream.write_string(self.antenna_type.name())?,
            "dishDiameter" => stream.write_f64(self.dish_diameter)?,
            "position" => stream.write_f64_array(&self.position)?,
            "offset" => stream.write_f64_array(&self.offset)?,
            "time" => stream.write_i64(self.time.get())?,
            "stationId" => stream.write_string(&self.station_id.to_string())?,
            "assocAntennaId" => {
                stream.write_bool(self.assoc_antenna_id.is_some())?;

                if let Some(tag) = self.assoc_antenna_id {
                    stream.write_string(&tag.to_string())?;
                }
            }
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
            "antennaId" => self.antenna_id = stream.read_string()?.parse()?,
            "name" => self.name = stream.read_string()?,
            "antennaMake" => self.antenna_make = AntennaMake::literal(&stream.read_string()?)?,
            "antennaType" => self.antenna_type = AntennaType::literal(&stream.read_string()?)?,
            "dishDiameter" => self.dish_diameter = stream.read_f64()?,
            "position" => self.position = stream.read_f64_array()?,
            "offset" => self.offset = stream.read_f64_array()?,
            "time" => self.time = ArrayTime::new(stream.read_i64()?),
            "stationId" => self.station_id = stream.read_string()?.parse()?,
            "assocAntennaId" => {
                self.assoc_antenna_id = if stream.read_bool()? {
                    Some(stream.read_string()?.parse()?)
                } else {
                    None
                };
            }
            _ => return Err(SdmError::unknown_attribute(Self::TABLE_NAME, name)),
        }

        Ok(())
    }

    fn xml_attribute(&self, name: &str) -> Result<Option<String>, SdmError> {
        Ok(Some(match name {
            "antennaId" => self.antenna_id.to_string(),
            "name" => self.name.clone(),
            "antennaMake" => self.antenna_make.name().to_owned(),
            "antennaType" => self.antenna_type.name().to_owned(),
            "dishDiameter" => self.dish_diameter.to_string(),
            "position" => table::format_f64_array(&self.position),
            "offset" => table::format_f64_array(&self.offset),
            "time" => self.time.get().to_string(),
            "stationId" => self.station_id.to_string(),
            "assocAntennaId" => return Ok(self.assoc_antenna_id.map(|t| t.to_string())),
            _ => return Err(SdmError::unknown_attribute(Self::TABLE_NAME, name)),
        }))
    }

    fn set_xml_attribute(&mut self, name: &str, text: &str) -> Result<(), SdmError> {
        match name {
            "antennaId" => self.antenna_id = text.parse()?,
            "name" => self.name = text.to_owned(),
            "antennaMake" => self.antenna_make = AntennaMake::literal(text)?,
            "antennaType" => self.antenna_type = AntennaType::literal(text)?,
            "dishDiameter" => {
                self.dish_diameter = table::parse_scalar(Self::TABLE_NAME, name, text)?
            }
            "position" => self.position = table::parse_f64_array(Self::TABLE_NAME, name, text)?,
            "offset" => self.offset = table::parse_f64_array(Self::TABLE_NAME, name, text)?,
            "time" => {
                self.time = ArrayTime::new(table::parse_scalar(Self::TABLE_NAME, name, text)?)
            }
            "stationId" => self.station_id = text.parse()?,
            "assocAntennaId" => self.assoc_antenna_id = Some(text.parse()?),
            _ => return Err(SdmError::unknown_attribute(Self::TABLE_NAME, name)),
        }

        Ok(())
    }
}

#[cfg(test)]
fn test_antenna(name: &str, station: Tag) -> AntennaRow {
    AntennaRow::new(
        name,
        AntennaMake::VERTEX_12,
        AntennaType::GROUND_BASED,
        12.0,
        vec![2225061.0, -5440061.0, -2481681.0],
        vec![0.0, 0.0, 0.0],
        ArrayTime::from_mjd(58849.0),
        station,
    )
}

#[cfg(test)]
#[test]
fn station_link_traversal() {
    let mut stations = StationTable::new();
    let pad = stations
        .add(StationRow::new(
            "A001",
            vec![1.0, 2.0, 3.0],
            crate::enums::StationType::ANTENNA_PAD,
        ))
        .unwrap();
    let pad_tag = stations.get()[pad].station_id();

    let mut antennas = AntennaTable::new();
    let index = antennas.add(test_antenna("DA41", pad_tag)).unwrap();

    let station = antennas.get()[index].station(&stations).unwrap();
    assert_eq!(station.name(), "A001");
}

#[cfg(test)]
#[test]
fn dangling_links_surface_as_no_such_row() {
    let stations = StationTable::new();
    let mut antennas = AntennaTable::new();
    let index = antennas
        .add(test_antenna("DA41", Tag::new(TagKind::Station, 7)))
        .unwrap();

    let err = antennas.get()[index].station(&stations).unwrap_err();
    assert!(matches!(err, SdmError::NoSuchRow { table: "Station", .. }));
}

#[cfg(test)]
#[test]
fn optional_link_presence_tracking() {
    let mut antennas = AntennaTable::new();
    let a = antennas
        .add(test_antenna("DA41", Tag::new(TagKind::Station, 0)))
        .unwrap();
    let b = antennas
        .add(test_antenna("DA42", Tag::new(TagKind::Station, 1)))
        .unwrap();

    assert!(antennas.get()[a].assoc_antenna_id().is_none());
    assert!(antennas.get()[a].assoc_antenna(&antennas).unwrap().is_none());

    let b_tag = antennas.get()[b].antenna_id();
    antennas.row_mut(a).set_assoc_antenna_id(b_tag);
    let assoc = antennas.get()[a].assoc_antenna(&antennas).unwrap().unwrap();
    assert_eq!(assoc.name(), "DA42");

    antennas.row_mut(a).clear_assoc_antenna_id();
    assert!(antennas.get()[a].assoc_antenna_id().is_none());
}
