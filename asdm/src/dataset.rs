// Copyright 2024-2026 the asdmkit collaborators
// Licensed under the MIT License.

/*!

A dataset: one table of each kind, stored together in a directory.

On disk a dataset is a directory holding an `ASDM.xml` table of
contents, which lists every table and its row count, plus one file per
non-empty table: `{Name}.xml` for the XML representation or `{Name}.bin`
for the MIME-wrapped binary one. Loading verifies each table's row count
against the table of contents.

 */

use crate::antenna::AntennaTable;
use crate::flagcmd::FlagCmdTable;
use crate::spwindow::SpectralWindowTable;
use crate::station::StationTable;
use crate::table::{SdmTable, TableRow};
use crate::weather::WeatherTable;
use crate::SdmError;
use asdm_core::io::ByteOrdering;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Error context for table-of-contents problems.
const TOC: &str = "ASDM";

fn toc_err(message: impl std::fmt::Display) -> SdmError {
    SdmError::conversion(TOC, message.to_string())
}

/// How a dataset's tables are stored on disk.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FileFormat {
    /// Per-table XML documents.
    Xml,
    /// MIME-wrapped binary payloads in the given byte order.
    Binary(ByteOrdering),
}

/// An in-memory ASDM dataset.
///
/// Populate the tables through the `_mut` accessors, or load a whole
/// dataset from a directory. After construction a dataset can be shared
/// read-only across threads.
#[derive(Debug, Default)]
pub struct Dataset {
    station: StationTable,
    antenna: AntennaTable,
    weather: WeatherTable,
    flag_cmd: FlagCmdTable,
    spectral_window: SpectralWindowTable,
}

impl Dataset {
    pub fn new() -> Self {
        Dataset::default()
    }

    pub fn station(&self) -> &StationTable {
        &self.station
    }

    pub fn station_mut(&mut self) -> &mut StationTable {
        &mut self.station
    }

    pub fn antenna(&self) -> &AntennaTable {
        &self.antenna
    }

    pub fn antenna_mut(&mut self) -> &mut AntennaTable {
        &mut self.antenna
    }

    pub fn weather(&self) -> &WeatherTable {
        &self.weather
    }

    pub fn weather_mut(&mut self) -> &mut WeatherTable {
        &mut self.weather
    }

    pub fn flag_cmd(&self) -> &FlagCmdTable {
        &self.flag_cmd
    }

    pub fn flag_cmd_mut(&mut self) -> &mut FlagCmdTable {
        &mut self.flag_cmd
    }

    pub fn spectral_window(&self) -> &SpectralWindowTable {
        &self.spectral_window
    }

    pub fn spectral_window_mut(&mut self) -> &mut SpectralWindowTable {
        &mut self.spectral_window
    }

    /// Every table's name and row count, in schema order.
    pub fn table_counts(&self) -> Vec<(&'static str, usize)> {
        vec![
            (self.station.name(), self.station.len()),
            (self.antenna.name(), self.antenna.len()),
            (self.weather.name(), self.weather.len()),
            (self.flag_cmd.name(), self.flag_cmd.len()),
            (self.spectral_window.name(), self.spectral_window.len()),
        ]
    }

    fn toc_document(&self) -> Result<String, SdmError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(toc_err)?;
        writer
            .write_event(Event::Start(BytesStart::new("ASDM")))
            .map_err(toc_err)?;

        for (name, count) in self.table_counts() {
            writer
                .write_event(Event::Start(BytesStart::new("table")))
                .map_err(toc_err)?;

            writer
                .write_event(Event::Start(BytesStart::new("name")))
                .map_err(toc_err)?;
            writer
                .write_event(Event::Text(BytesText::new(name)))
                .map_err(toc_err)?;
            writer
                .write_event(Event::End(BytesEnd::new("name")))
                .map_err(toc_err)?;

            writer
                .write_event(Event::Start(BytesStart::new("numberRows")))
                .map_err(toc_err)?;
            writer
                .write_event(Event::Text(BytesText::new(&count.to_string())))
                .map_err(toc_err)?;
            writer
                .write_event(Event::End(BytesEnd::new("numberRows")))
                .map_err(toc_err)?;

            writer
                .write_event(Event::End(BytesEnd::new("table")))
                .map_err(toc_err)?;
        }

        writer
            .write_event(Event::End(BytesEnd::new("ASDM")))
            .map_err(toc_err)?;

        String::from_utf8(writer.into_inner())
            .map_err(|e| SdmError::conversion(TOC, e.to_string()))
    }

    /// Write this dataset into *directory*, which is created if needed.
    pub fn save(&self, directory: &Path, format: FileFormat) -> Result<(), SdmError> {
        fs::create_dir_all(directory)?;
        fs::write(directory.join("ASDM.xml"), self.toc_document()?)?;

        save_table(&self.station, directory, format)?;
        save_table(&self.antenna, directory, format)?;
        save_table(&self.weather, directory, format)?;
        save_table(&self.flag_cmd, directory, format)?;
        save_table(&self.spectral_window, directory, format)?;
        Ok(())
    }

    /// Load a dataset from *directory*.
    ///
    /// Each table listed in the table of contents is loaded from its
    /// XML or binary file, whichever is present; a listed table with
    /// rows but no file, or a loaded row count that disagrees with the
    /// table of contents, fails the load.
    pub fn load(directory: &Path) -> Result<Self, SdmError> {
        let document = fs::read_to_string(directory.join("ASDM.xml"))?;
        let mut dataset = Dataset::new();
        let mut seen = BTreeSet::new();

        for (name, count) in parse_toc(&document)? {
            if !seen.insert(name.clone()) {
                return Err(toc_err(format!(
                    "table \"{name}\" is listed twice in the table of contents"
                )));
            }

            match name.as_str() {
                "Station" => dataset.station = load_table(directory, count)?,
                "Antenna" => dataset.antenna = load_table(directory, count)?,
                "Weather" => dataset.weather = load_table(directory, count)?,
                "FlagCmd" => dataset.flag_cmd = load_table(directory, count)?,
                "SpectralWindow" => dataset.spectral_window = load_table(directory, count)?,
                other => {
                    return Err(SdmError::conversion(
                        TOC,
                        format!("unknown table \"{other}\" in the table of contents"),
                    ))
                }
            }
        }

        Ok(dataset)
    }
}

fn save_table<R: TableRow>(
    table: &SdmTable<R>,
    directory: &Path,
    format: FileFormat,
) -> Result<(), SdmError> {
    if table.is_empty() {
        return Ok(());
    }

    match format {
        FileFormat::Xml => fs::write(
            directory.join(format!("{}.xml", R::TABLE_NAME)),
            table.to_xml()?,
        )?,
        FileFormat::Binary(order) => fs::write(
            directory.join(format!("{}.bin", R::TABLE_NAME)),
            table.to_mime(order)?,
        )?,
    }

    Ok(())
}

fn load_table<R: TableRow>(directory: &Path, expected: usize) -> Result<SdmTable<R>, SdmError> {
    let xml_path = directory.join(format!("{}.xml", R::TABLE_NAME));
    let bin_path = directory.join(format!("{}.bin", R::TABLE_NAME));

    let table = if xml_path.exists() {
        SdmTable::from_xml(&fs::read_to_string(xml_path)?)?
    } else if bin_path.exists() {
        SdmTable::from_mime(&fs::read(bin_path)?)?
    } else if expected == 0 {
        SdmTable::new()
    } else {
        return Err(SdmError::conversion(
            TOC,
            format!("no file found for the {} table", R::TABLE_NAME),
        ));
    };

    if table.len() != expected {
        return Err(SdmError::conversion(
            TOC,
            format!(
                "the {} table has {} rows but the table of contents promises {}",
                R::TABLE_NAME,
                table.len(),
                expected
            ),
        ));
    }

    Ok(table)
}

fn parse_toc(document: &str) -> Result<Vec<(String, usize)>, SdmError> {
    let err = |message: String| SdmError::conversion(TOC, message);
    let mut reader = Reader::from_str(document);

    let mut entries = Vec::new();
    let mut name: Option<String> = None;
    let mut count: Option<usize> = None;
    let mut capture: Option<String> = None;

    loop {
        match reader.read_event().map_err(|e| err(e.to_string()))? {
            Event::Start(e) => match e.name().as_ref() {
                b"name" | b"numberRows" => capture = Some(String::new()),
                _ => {}
            },

            Event::Text(t) => {
                if let Some(ref mut buffer) = capture {
                    buffer.push_str(&t.unescape().map_err(|e| err(e.to_string()))?);
                }
            }

            Event::End(e) => match e.name().as_ref() {
                b"name" => name = capture.take(),
                b"numberRows" => {
                    let text = capture.take().unwrap_or_default();
                    count = Some(
                        text.trim()
                            .parse()
                            .map_err(|e| err(format!("bad numberRows \"{text}\": {e}")))?,
                    );
                }
                b"table" => match (name.take(), count.take()) {
                    (Some(n), Some(c)) => entries.push((n, c)),
                    _ => return Err(err("incomplete <table> entry".to_owned())),
                },
                _ => {}
            },

            Event::Eof => break,

            _ => {}
        }
    }

    Ok(entries)
}

#[cfg(test)]
use crate::enums::StationType;
#[cfg(test)]
use crate::flagcmd::FlagCmdRow;
#[cfg(test)]
use crate::station::StationRow;
#[cfg(test)]
use crate::types::{ArrayTime, ArrayTimeInterval, Interval};
#[cfg(test)]
use crate::weather::WeatherRow;

#[cfg(test)]
fn sample_dataset() -> Dataset {
    let mut dataset = Dataset::new();

    let pad = dataset
        .station_mut()
        .add(StationRow::new(
            "A001",
            vec![2225061.0, -5440061.0, -2481681.0],
            StationType::ANTENNA_PAD,
        ))
        .unwrap();
    let pad_tag = dataset.station().get()[pad].station_id();

    let mut weather = WeatherRow::new(
        pad_tag,
        ArrayTimeInterval::new(ArrayTime::new(1000), Interval::new(600_000_000_000)),
    );
    weather.set_temperature(270.5);
    dataset.weather_mut().add(weather).unwrap();

    dataset
        .flag_cmd_mut()
        .add(FlagCmdRow::new(
            ArrayTimeInterval::new(ArrayTime::new(1000), Interval::new(60_000_000_000)),
            "FLAG",
            "shadowing",
            1,
            5,
            false,
            "cmd",
        ))
        .unwrap();

    dataset
}

#[cfg(test)]
#[test]
fn datasets_round_trip_through_directories() {
    for format in &[FileFormat::Xml, FileFormat::Binary(ByteOrdering::Big)] {
        let dir = tempfile::tempdir().unwrap();
        let dataset = sample_dataset();
        dataset.save(dir.path(), *format).unwrap();

        assert!(dir.path().join("ASDM.xml").exists());
        // Empty tables get no file of their own.
        assert!(!dir.path().join("Antenna.xml").exists());
        assert!(!dir.path().join("Antenna.bin").exists());

        let reloaded = Dataset::load(dir.path()).unwrap();
        assert_eq!(reloaded.station().len(), 1);
        assert_eq!(reloaded.weather().len(), 1);
        assert_eq!(reloaded.flag_cmd().len(), 1);
        assert!(reloaded.antenna().is_empty());
        assert_eq!(reloaded.weather().get()[0].temperature(), Some(270.5));

        // Cross-table links survive.
        let weather = &reloaded.weather().get()[0];
        assert_eq!(weather.station(reloaded.station()).unwrap().name(), "A001");
    }
}

#[cfg(test)]
#[test]
fn row_count_mismatches_fail_the_load() {
    let dir = tempfile::tempdir().unwrap();
    sample_dataset().save(dir.path(), FileFormat::Xml).unwrap();

    let toc_path = dir.path().join("ASDM.xml");
    let tampered = fs::read_to_string(&toc_path)
        .unwrap()
        .replacen("<numberRows>1</numberRows>", "<numberRows>7</numberRows>", 1);
    fs::write(&toc_path, tampered).unwrap();

    assert!(matches!(
        Dataset::load(dir.path()),
        Err(SdmError::Conversion { .. })
    ));
}

#[cfg(test)]
#[test]
fn a_listed_table_without_a_file_fails_the_load() {
    let dir = tempfile::tempdir().unwrap();
    sample_dataset().save(dir.path(), FileFormat::Xml).unwrap();
    fs::remove_file(dir.path().join("Weather.xml")).unwrap();

    assert!(matches!(
        Dataset::load(dir.path()),
        Err(SdmError::Conversion { .. })
    ));
}

#[cfg(test)]
#[test]
fn a_table_listed_twice_fails_the_load() {
    let dir = tempfile::tempdir().unwrap();
    sample_dataset().save(dir.path(), FileFormat::Xml).unwrap();

    let toc_path = dir.path().join("ASDM.xml");
    let tampered = fs::read_to_string(&toc_path).unwrap().replacen(
        "</ASDM>",
        "<table><name>Station</name><numberRows>1</numberRows></table></ASDM>",
        1,
    );
    fs::write(&toc_path, tampered).unwrap();

    assert!(matches!(
        Dataset::load(dir.path()),
        Err(SdmError::Conversion { .. })
    ));
}

#[cfg(test)]
#[test]
fn a_missing_table_of_contents_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();

    assert!(matches!(Dataset::load(dir.path()), Err(SdmError::Io(_))));
}
