// Copyright 2024-2026 the asdmkit collaborators
// Licensed under the MIT License.

/*!

The Weather table: environmental measurements per station over time.

Keyed by (station, time interval); the station tag is the context
sub-key, so the measurements for one station are queryable in ascending
start order. Every measurement attribute is optional — a row may record
pressure but no wind, and presence is tracked per attribute.

 */

use crate::station::{StationRow, StationTable};
use crate::table::{self, SdmTable, TableRow};
use crate::types::{ArrayTime, ArrayTimeInterval, Interval, Tag};
use crate::SdmError;
use asdm_core::io::{BinaryReader, BinaryWriter};
use std::io::{Read, Write};

#[derive(Clone, Debug, Default)]
pub struct WeatherRow {
    added: bool,
    station_id: Tag,
    time_interval: ArrayTimeInterval,
    pressure: Option<f64>,
    rel_humidity: Option<f64>,
    temperature: Option<f64>,
    wind_direction: Option<f64>,
    wind_speed: Option<f64>,
}

pub type WeatherTable = SdmTable<WeatherRow>;

impl WeatherRow {
    pub fn new(station_id: Tag, time_interval: ArrayTimeInterval) -> Self {
        WeatherRow {
            added: false,
            station_id,
            time_interval,
            pressure: None,
            rel_humidity: None,
            temperature: None,
            wind_direction: None,
            wind_speed: None,
        }
    }

    pub fn station_id(&self) -> Tag {
        self.station_id
    }

    /// Change the key station. Fails once the row has been added.
    pub fn set_station_id(&mut self, value: Tag) -> Result<(), SdmError> {
        if self.added {
            return Err(SdmError::frozen_key(Self::TABLE_NAME, "stationId"));
        }

        self.station_id = value;
        Ok(())
    }

    pub fn time_interval(&self) -> ArrayTimeInterval {
        self.time_interval
    }

    /// Change the key interval. Fails once the row has been added.
    pub fn set_time_interval(&mut self, value: ArrayTimeInterval) -> Result<(), SdmError> {
        if self.added {
            return Err(SdmError::frozen_key(Self::TABLE_NAME, "timeInterval"));
        }

        self.time_interval = value;
        Ok(())
    }

    /// Follow the station link.
    pub fn station<'a>(&self, stations: &'a StationTable) -> Result<&'a StationRow, SdmError> {
        stations.row_by_key_required(&self.station_id.to_string())
    }

    pub fn pressure(&self) -> Option<f64> {
        self.pressure
    }

    pub fn set_pressure(&mut self, value: f64) {
        self.pressure = Some(value);
    }

    pub fn clear_pressure(&mut self) {
        self.pressure = None;
    }

    pub fn rel_humidity(&self) -> Option<f64> {
        self.rel_humidity
    }

    pub fn set_rel_humidity(&mut self, value: f64) {
        self.rel_humidity = Some(value);
    }

    pub fn clear_rel_humidity(&mut self) {
        self.rel_humidity = None;
    }

    pub fn temperature(&self) -> Option<f64> {
        self.temperature
    }

    pub fn set_temperature(&mut self, value: f64) {
        self.temperature = Some(value);
    }

    pub fn clear_temperature(&mut self) {
        self.temperature = None;
    }

    pub fn wind_direction(&self) -> Option<f64> {
        self.wind_direction
    }

    pub fn set_wind_direction(&mut self, value: f64) {
        self.wind_direction = Some(value);
    }

    pub fn clear_wind_direction(&mut self) {
        self.wind_direction = None;
    }

    pub fn wind_speed(&self) -> Option<f64> {
        self.wind_speed
    }

    pub fn set_wind_speed(&mut self, value: f64) {
        self.wind_speed = Some(value);
    }

    pub fn clear_wind_speed(&mut self) {
        self.wind_speed = None;
    }

    fn write_optional_f64<W: Write>(
        value: Option<f64>,
        stream: &mut BinaryWriter<W>,
    ) -> Result<(), SdmError> {
        stream.write_bool(value.is_some())?;

        if let Some(v) = value {
            stream.write_f64(v)?;
        }

        Ok(())
    }

    fn read_optional_f64<S: Read>(stream: &mut BinaryReader<S>) -> Result<Option<f64>, SdmError> {
        if stream.read_bool()? {
            Ok(Some(stream.read_f64()?))
        } else {
            Ok(None)
        }
    }
}

impl TableRow for WeatherRow {
    const TABLE_NAME: &'static str = "Weather";
    const ATTRIBUTES: &'static [&'static str] = &[
        "stationId",
        "timeInterval",
        "pressure",
        "relHumidity",
        "temperature",
        "windDirection",
        "windSpeed",
    ];

    fn key(&self) -> String {
        format!("{} {}", self.station_id, self.time_interval)
    }

    fn context(&self) -> Option<(String, ArrayTime)> {
        Some((self.station_id.to_string(), self.time_interval.start()))
    }

    /// The only mandatory attributes are the key itself, so two rows
    /// with the same key always compare equal here: re-adding a
    /// measurement interval with different optional values is a no-op,
    /// not a duplicate-key failure.
    fn equal_by_required_value(&self, other: &Self) -> bool {
        self.station_id == other.station_id && self.time_interval == other.time_interval
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
            "timeInterval" => {
                stream.write_i64(self.time_interval.start().get())?;
                stream.write_i64(self.time_interval.duration().get())?;
            }
            "pressure" => Self::write_optional_f64(self.pressure, stream)?,
            "relHumidity" => Self::write_optional_f64(self.rel_humidity, stream)?,
            "temperature" => Self::write_optional_f64(self.temperature, stream)?,
            "windDirection" => Self::write_optional_f64(self.wind_direction, stream)?,
            "windSpeed" => Self::write_optional_f64(self.wind_speed, stream)?,
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
            "timeInterval" => {
                let start = ArrayTime::new(stream.read_i64()?);
                let duration = Interval::new(stream.read_i64()?);
                self.time_interval = ArrayTimeInterval::new(start, duration);
            }
            "pressure" => self.pressure = Self::read_optional_f64(stream)?,
            "relHumidity" => self.rel_humidity = Self::read_optional_f64(stream)?,
            "temperature" => self.temperature = Self::read_optional_f64(stream)?,
            "windDirection" => self.wind_direction = Self::read_optional_f64(stream)?,
            "windSpeed" => self.wind_speed = Self::read_optional_f64(stream)?,
            _ => return Err(SdmError::unknown_attribute(Self::TABLE_NAME, name)),
        }

        Ok(())
    }

    fn xml_attribute(&self, name: &str) -> Result<Option<String>, SdmError> {
        Ok(match name {
            "stationId" => Some(self.station_id.to_string()),
            "timeInterval" => Some(self.time_interval.to_string()),
            "pressure" => self.pressure.map(|v| v.to_string()),
            "relHumidity" => self.rel_humidity.map(|v| v.to_string()),
            "temperature" => self.temperature.map(|v| v.to_string()),
            "windDirection" => self.wind_direction.map(|v| v.to_string()),
            "windSpeed" => self.wind_speed.map(|v| v.to_string()),
            _ => return Err(SdmError::unknown_attribute(Self::TABLE_NAME, name)),
        })
    }

    fn set_xml_attribute(&mut self, name: &str, text: &str) -> Result<(), SdmError> {
        match name {
            "stationId" => self.station_id = text.parse()?,
            "timeInterval" => self.time_interval = text.parse()?,
            "pressure" => self.pressure = Some(table::parse_scalar(Self::TABLE_NAME, name, text)?),
            "relHumidity" => {
                self.rel_humidity = Some(table::parse_scalar(Self::TABLE_NAME, name, text)?)
            }
            "temperature" => {
                self.temperature = Some(table::parse_scalar(Self::TABLE_NAME, name, text)?)
            }
            "windDirection" => {
                self.wind_direction = Some(table::parse_scalar(Self::TABLE_NAME, name, text)?)
            }
            "windSpeed" => {
                self.wind_speed = Some(table::parse_scalar(Self::TABLE_NAME, name, text)?)
            }
            _ => return Err(SdmError::unknown_attribute(Self::TABLE_NAME, name)),
        }

        Ok(())
    }
}

#[cfg(test)]
use crate::types::TagKind;

#[cfg(test)]
fn sample(station: u32, start: i64) -> WeatherRow {
    WeatherRow::new(
        Tag::new(TagKind::Station, station),
        ArrayTimeInterval::new(ArrayTime::new(start), Interval::new(600_000_000_000)),
    )
}

#[cfg(test)]
#[test]
fn per_station_context_sorts_by_start_time() {
    let mut table = WeatherTable::new();

    // Interleave two stations, each with shuffled start times.
    for &(station, start) in &[(0u32, 3000i64), (1, 500), (0, 1000), (1, 2500), (0, 2000)] {
        table.add(sample(station, start)).unwrap();
    }

    let starts = |ctx: &str| -> Vec<i64> {
        table
            .by_context(ctx)
            .unwrap()
            .iter()
            .map(|r| r.time_interval().start().get())
            .collect()
    };

    assert_eq!(starts("Station_0"), vec![1000, 2000, 3000]);
    assert_eq!(starts("Station_1"), vec![500, 2500]);
    assert!(table.by_context("Station_9").is_none());
}

#[cfg(test)]
#[test]
fn optional_measurements_track_presence() {
    let mut row = sample(0, 1000);
    assert!(row.pressure().is_none());

    row.set_pressure(563.0);
    row.set_temperature(270.5);
    assert_eq!(row.pressure(), Some(563.0));

    row.clear_pressure();
    assert!(row.pressure().is_none());
    assert_eq!(row.temperature(), Some(270.5));
}

#[cfg(test)]
#[test]
fn re_adding_a_measurement_interval_is_a_no_op() {
    let mut table = WeatherTable::new();
    let mut first = sample(0, 1000);
    first.set_pressure(563.0);
    let index = table.add(first).unwrap();

    let mut again = sample(0, 1000);
    again.set_pressure(999.0);
    assert_eq!(table.add(again).unwrap(), index);
    assert_eq!(table.len(), 1);
    assert_eq!(table.get()[index].pressure(), Some(563.0));
}

#[cfg(test)]
#[test]
fn key_attributes_freeze_on_addition() {
    let mut table = WeatherTable::new();
    let index = table.add(sample(0, 1000)).unwrap();

    let row = table.row_mut(index);
    assert!(matches!(
        row.set_station_id(Tag::new(TagKind::Station, 1)),
        Err(SdmError::IllegalAccess(_))
    ));
    assert!(matches!(
        row.set_time_interval(ArrayTimeInterval::new(
            ArrayTime::new(9),
            Interval::new(9)
        )),
        Err(SdmError::IllegalAccess(_))
    ));

    // Measurements stay settable.
    row.set_wind_speed(4.2);
    assert_eq!(table.get()[index].wind_speed(), Some(4.2));
}
