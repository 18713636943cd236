// Copyright 2024-2026 the asdmkit collaborators
// Licensed under the MIT License.

//! The SpectralWindow table: the frequency setups data were taken with.

use crate::enums::{BasebandName, NetSideband};
use crate::table::{self, SdmTable, TableRow};
use crate::types::{Tag, TagKind};
use crate::SdmError;
use asdm_core::io::{BinaryReader, BinaryWriter};
use std::io::{Read, Write};

/// One spectral window. Frequencies are in Hz.
#[derive(Clone, Debug)]
pub struct SpectralWindowRow {
    added: bool,
    spectral_window_id: Tag,
    baseband_name: BasebandName,
    net_sideband: NetSideband,
    num_chan: i32,
    ref_freq: f64,
    tot_bandwidth: f64,
    name: Option<String>,
    chan_freq_array: Option<Vec<f64>>,
}

pub type SpectralWindowTable = SdmTable<SpectralWindowRow>;

impl Default for SpectralWindowRow {
    fn default() -> Self {
        SpectralWindowRow {
            added: false,
            spectral_window_id: Tag::default(),
            baseband_name: BasebandName::NOBB,
            net_sideband: NetSideband::NOSB,
            num_chan: 0,
            ref_freq: 0.,
            tot_bandwidth: 0.,
            name: None,
            chan_freq_array: None,
        }
    }
}

impl SpectralWindowRow {
    pub fn new(
        baseband_name: BasebandName,
        net_sideband: NetSideband,
        num_chan: i32,
        ref_freq: f64,
        tot_bandwidth: f64,
    ) -> Self {
        SpectralWindowRow {
            added: false,
            spectral_window_id: Tag::default(),
            baseband_name,
            net_sideband,
            num_chan,
            ref_freq,
            tot_bandwidth,
            name: None,
            chan_freq_array: None,
        }
    }

    pub fn spectral_window_id(&self) -> Tag {
        self.spectral_window_id
    }

    /// Install a specific key tag. Fails once the row has been added.
    pub fn set_spectral_window_id(&mut self, value: Tag) -> Result<(), SdmError> {
        if self.added {
            return Err(SdmError::frozen_key(Self::TABLE_NAME, "spectralWindowId"));
        }

        self.spectral_window_id = value;
        Ok(())
    }

    pub fn baseband_name(&self) -> BasebandName {
        self.baseband_name
    }

    pub fn set_baseband_name(&mut self, value: BasebandName) {
        self.baseband_name = value;
    }

    pub fn net_sideband(&self) -> NetSideband {
        self.net_sideband
    }

    pub fn set_net_sideband(&mut self, value: NetSideband) {
        self.net_sideband = value;
    }

    pub fn num_chan(&self) -> i32 {
        self.num_chan
    }

    pub fn set_num_chan(&mut self, value: i32) {
        self.num_chan = value;
    }

    pub fn ref_freq(&self) -> f64 {
        self.ref_freq
    }

    pub fn set_ref_freq(&mut self, value: f64) {
        self.ref_freq = value;
    }

    pub fn tot_bandwidth(&self) -> f64 {
        self.tot_bandwidth
    }

    pub fn set_tot_bandwidth(&mut self, value: f64) {
        self.tot_bandwidth = value;
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, value: &str) {
        self.name = Some(value.to_owned());
    }

    pub fn clear_name(&mut self) {
        self.name = None;
    }

    pub fn chan_freq_array(&self) -> Option<&[f64]> {
        self.chan_freq_array.as_deref()
    }

    pub fn set_chan_freq_array(&mut self, value: Vec<f64>) {
        self.chan_freq_array = Some(value);
    }

    pub fn clear_chan_freq_array(&mut self) {
        self.chan_freq_array = None;
    }
}

impl TableRow for SpectralWindowRow {
    const TABLE_NAME: &'static str = "SpectralWindow";
    const ATTRIBUTES: &'static [&'static str] = &[
        "spectralWindowId",
        "basebandName",
        "netSideband",
        "numChan",
        "refFreq",
        "totBandwidth",
        "name",
        "chanFreqArray",
    ];
    const AUTO_INCREMENTING: bool = true;

    fn key(&self) -> String {
        self.spectral_window_id.to_string()
    }

    fn equal_by_required_value(&self, other: &Self) -> bool {
        self.baseband_name == other.baseband_name
            && self.net_sideband == other.net_sideband
            && self.num_chan == other.num_chan
            && self.ref_freq == other.ref_freq
            && self.tot_bandwidth == other.tot_bandwidth
    }

    fn assign_auto_key(&mut self, ordinal: u32) {
        self.spectral_window_id = Tag::new(TagKind::SpectralWindow, ordinal);
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
            "spectralWindowId" => stream.write_string(&self.spectral_window_id.to_string())?,
            "basebandName" => stream.write_string(self.baseband_name.name())?,
            "netSideband" => stream.write_string(self.net_sideband.name())?,
            "numChan" => stream.write_i32(self.num_chan)?,
            "refFreq" => stream.write_f64(self.ref_freq)?,
            "totBandwidth" => stream.write_f64(self.tot_bandwidth)?,
            "name" => {
                stream.write_bool(self.name.is_some())?;

                if let Some(ref n) = self.name {
                    stream.write_string(n)?;
                }
            }
            "chanFreqArray" => {
                stream.write_bool(self.chan_freq_array.is_some())?;

                if let Some(ref freqs) = self.chan_freq_array {
                    stream.write_f64_array(freqs)?;
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
            "spectralWindowId" => self.spectral_window_id = stream.read_string()?.parse()?,
            "basebandName" => self.baseband_name = BasebandName::literal(&stream.read_string()?)?,
            "netSideband" => self.net_sideband = NetSideband::literal(&stream.read_string()?)?,
            "numChan" => self.num_chan = stream.read_i32()?,
            "refFreq" => self.ref_freq = stream.read_f64()?,
            "totBandwidth" => self.tot_bandwidth = stream.read_f64()?,
            "name" => {
                self.name = if stream.read_bool()? {
                    Some(stream.read_string()?)
                } else {
                    None
                };
            }
            "chanFreqArray" => {
                self.chan_freq_array = if stream.read_bool()? {
                    Some(stream.read_f64_array()?)
                } else {
                    None
                };
            }
            _ => return Err(SdmError::unknown_attribute(Self::TABLE_NAME, name)),
        }

        Ok(())
    }

    fn xml_attribute(&self, name: &str) -> Result<Option<String>, SdmError> {
        Ok(match name {
            "spectralWindowId" => Some(self.spectral_window_id.to_string()),
            "basebandName" => Some(self.baseband_name.name().to_owned()),
            "netSideband" => Some(self.net_sideband.name().to_owned()),
            "numChan" => Some(self.num_chan.to_string()),
            "refFreq" => Some(self.ref_freq.to_string()),
            "totBandwidth" => Some(self.tot_bandwidth.to_string()),
            "name" => self.name.clone(),
            "chanFreqArray" => self.chan_freq_array.as_deref().map(table::format_f64_array),
            _ => return Err(SdmError::unknown_attribute(Self::TABLE_NAME, name)),
        })
    }

    fn set_xml_attribute(&mut self, name: &str, text: &str) -> Result<(), SdmError> {
        match name {
            "spectralWindowId" => self.spectral_window_id = text.parse()?,
            "basebandName" => self.baseband_name = BasebandName::literal(text)?,
            "netSideband" => self.net_sideband = NetSideband::literal(text)?,
            "numChan" => self.num_chan = table::parse_scalar(Self::TABLE_NAME, name, text)?,
            "refFreq" => self.ref_freq = table::parse_scalar(Self::TABLE_NAME, name, text)?,
            "totBandwidth" => {
                self.tot_bandwidth = table::parse_scalar(Self::TABLE_NAME, name, text)?
            }
            "name" => self.name = Some(text.to_owned()),
            "chanFreqArray" => {
                self.chan_freq_array =
                    Some(table::parse_f64_array(Self::TABLE_NAME, name, text)?)
            }
            _ => return Err(SdmError::unknown_attribute(Self::TABLE_NAME, name)),
        }

        Ok(())
    }
}

#[cfg(test)]
#[test]
fn auto_keys_and_value_idempotence() {
    let mut table = SpectralWindowTable::new();

    let spw = SpectralWindowRow::new(BasebandName::BB_1, NetSideband::USB, 128, 100.0e9, 2.0e9);
    let first = table.add(spw.clone()).unwrap();
    assert_eq!(
        table.get()[first].spectral_window_id().to_string(),
        "SpectralWindow_0"
    );

    assert_eq!(table.add(spw).unwrap(), first);
    assert_eq!(table.len(), 1);
}

#[cfg(test)]
fn two_window_table() -> SpectralWindowTable {
    let mut table = SpectralWindowTable::new();

    let mut full = SpectralWindowRow::new(BasebandName::BB_1, NetSideband::USB, 4, 100.0e9, 2.0e9);
    full.set_name("spw_0");
    full.set_chan_freq_array(vec![99.25e9, 99.75e9, 100.25e9, 100.75e9]);
    table.add(full).unwrap();

    table
        .add(SpectralWindowRow::new(
            BasebandName::BB_2,
            NetSideband::LSB,
            128,
            90.0e9,
            1.0e9,
        ))
        .unwrap();

    table
}

#[cfg(test)]
#[test]
fn windows_round_trip_through_xml() {
    let table = two_window_table();
    let document = table.to_xml().unwrap();
    assert_eq!(document.matches("<chanFreqArray>").count(), 1);

    let reloaded = SpectralWindowTable::from_xml(&document).unwrap();
    assert_eq!(reloaded.len(), 2);
    assert_eq!(reloaded.get()[0].name(), Some("spw_0"));
    assert_eq!(
        reloaded.get()[0].chan_freq_array().unwrap(),
        &[99.25e9, 99.75e9, 100.25e9, 100.75e9]
    );
    assert!(reloaded.get()[1].name().is_none());
    assert!(reloaded.get()[1].chan_freq_array().is_none());
    assert_eq!(reloaded.get()[1].net_sideband(), NetSideband::LSB);
}

#[cfg(test)]
#[test]
fn windows_round_trip_through_mime() {
    use asdm_core::io::ByteOrdering;

    let table = two_window_table();

    for order in &[ByteOrdering::Big, ByteOrdering::Little] {
        let message = table.to_mime(*order).unwrap();
        let reloaded = SpectralWindowTable::from_mime(&message).unwrap();

        assert_eq!(reloaded.len(), 2);
        assert_eq!(
            reloaded.get()[0].spectral_window_id().to_string(),
            "SpectralWindow_0"
        );
        assert_eq!(
            reloaded.get()[0].chan_freq_array().unwrap(),
            &[99.25e9, 99.75e9, 100.25e9, 100.75e9]
        );
        assert_eq!(reloaded.get()[1].num_chan(), 128);
        assert!(reloaded.get()[1].chan_freq_array().is_none());
        assert_eq!(reloaded.get()[1].baseband_name(), BasebandName::BB_2);
    }
}

#[cfg(test)]
#[test]
fn optional_channel_frequencies() {
    let mut row = SpectralWindowRow::new(BasebandName::BB_2, NetSideband::LSB, 4, 90.0e9, 1.0e9);
    assert!(row.chan_freq_array().is_none());

    row.set_chan_freq_array(vec![89.5e9, 89.75e9, 90.0e9, 90.25e9]);
    assert_eq!(row.chan_freq_array().unwrap().len(), 4);

    row.clear_chan_freq_array();
    assert!(row.chan_freq_array().is_none());
}
