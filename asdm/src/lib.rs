// Copyright 2024-2026 the asdmkit collaborators
// Licensed under the MIT License.

//! In-memory access to ALMA Science Data Model (ASDM) metadata tables.
//!
//! An ASDM dataset is a fixed relational schema describing
//! radio-astronomy observation metadata: antennas, stations, weather
//! measurements, flagging commands, spectral windows, and so on. This
//! crate provides the generic row/table machinery shared by every table
//! in the schema — key uniqueness, idempotent addition, time-context
//! ordering, and attribute-order-driven binary and XML serialization —
//! together with concrete implementations of a representative set of
//! tables and the closed enumerations their attributes draw from.
//!
//! The intended usage model is batch load-then-query: populate a
//! [`Dataset`] once (from per-table XML documents or MIME-wrapped binary
//! payloads), query it freely afterward, and optionally serialize it
//! back out. Nothing here locks; after construction a dataset can be
//! shared read-only across threads.

use thiserror::Error;

pub mod antenna;
pub mod dataset;
pub mod enums;
pub mod flagcmd;
pub mod mime;
pub mod spwindow;
pub mod station;
pub mod table;
pub mod types;
pub mod weather;
mod xml;

pub use antenna::{AntennaRow, AntennaTable};
pub use dataset::{Dataset, FileFormat};
pub use flagcmd::{FlagCmdRow, FlagCmdTable};
pub use spwindow::{SpectralWindowRow, SpectralWindowTable};
pub use station::{StationRow, StationTable};
pub use table::{SdmTable, TableRow};
pub use types::{ArrayTime, ArrayTimeInterval, Interval, Tag, TagKind};
pub use weather::{WeatherRow, WeatherTable};

pub use asdm_core::io::ByteOrdering;

/// The error type for every fallible operation in this crate.
///
/// None of these are retried internally; a failed addition or a failed
/// load aborts the operation it belongs to.
#[derive(Error, Debug)]
pub enum SdmError {
    /// A key attribute was modified after its row had been added to a
    /// table, or some other operation violated a row's lifecycle rules.
    #[error("{0}")]
    IllegalAccess(String),

    /// Malformed binary, XML or MIME input encountered while
    /// reconstituting a table.
    #[error("conversion error in {context}: {message}")]
    Conversion {
        context: &'static str,
        message: String,
    },

    /// A row was inserted whose key matches an existing row but whose
    /// value section differs.
    #[error("duplicate key {key} in the {table} table")]
    DuplicateKey { table: &'static str, key: String },

    /// A declared link points at a row that does not exist in the
    /// target table.
    #[error("no row with key {key} in the {table} table")]
    NoSuchRow { table: &'static str, key: String },

    /// A name or ordinal did not identify any declared enumerator of a
    /// closed enumeration.
    #[error("\"{value}\" does not identify a {enumeration} enumerator; the legal values are {legal}")]
    InvalidEnumerator {
        enumeration: &'static str,
        value: String,
        legal: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SdmError {
    pub(crate) fn conversion(context: &'static str, message: impl Into<String>) -> Self {
        SdmError::Conversion {
            context,
            message: message.into(),
        }
    }

    pub(crate) fn frozen_key(table: &'static str, attribute: &'static str) -> Self {
        SdmError::IllegalAccess(format!(
            "attribute \"{attribute}\" is part of the key of the {table} table \
             and cannot change once its row has been added"
        ))
    }

    pub(crate) fn unknown_attribute(table: &'static str, attribute: &str) -> Self {
        SdmError::conversion(table, format!("unknown attribute \"{attribute}\""))
    }
}
