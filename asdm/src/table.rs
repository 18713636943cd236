// Copyright 2024-2026 the asdmkit collaborators
// Licensed under the MIT License.

/*!

The generic row/table machinery shared by every ASDM table.

The schema defines on the order of 150 tables that all follow one
protocol: rows with composite keys, duplicate-key detection with
idempotent addition, optional time-context ordering, and serialization
driven by a declared attribute sequence rather than a hard-coded field
order. The [`TableRow`] trait captures what varies per table; the
[`SdmTable`] container implements the protocol once.

 */

use crate::types::ArrayTime;
use crate::SdmError;
use asdm_core::io::{BinaryReader, BinaryWriter};
use std::collections::{BTreeMap, HashMap};
use std::io::{Read, Write};

/// One schema table's worth of behavior: key and context rendering,
/// value comparison, and per-attribute serialization dispatch.
///
/// The serialization methods dispatch on *attribute name*. Writers emit
/// attributes in the canonical [`ATTRIBUTES`](Self::ATTRIBUTES) order
/// and record that sequence alongside the payload; readers iterate the
/// *recorded* sequence. An attribute appended to the end of a table's
/// declaration therefore never breaks a reader that predates it.
pub trait TableRow: Default {
    /// The table's schema name, e.g. "FlagCmd".
    const TABLE_NAME: &'static str;

    /// The canonical attribute order: mandatory attributes first, then
    /// optional ones. This is the sequence written at serialization
    /// time.
    const ATTRIBUTES: &'static [&'static str];

    /// Whether the table's key is a single generated tag rather than
    /// caller-supplied values.
    const AUTO_INCREMENTING: bool = false;

    /// Render this row's composite key.
    fn key(&self) -> String;

    /// For time-context tables: the context sub-key (the key minus
    /// time) and the instant to sort by within that context.
    fn context(&self) -> Option<(String, ArrayTime)> {
        None
    }

    /// Structural equality over every non-generated attribute. Drives
    /// idempotent addition and [`SdmTable::lookup`]; optional
    /// attributes do not participate.
    fn equal_by_required_value(&self, other: &Self) -> bool;

    /// For auto-incrementing tables: install the generated key.
    fn assign_auto_key(&mut self, _ordinal: u32) {}

    /// Freeze this row's key attributes. Called by the owning table on
    /// addition; key setters must fail afterwards.
    fn mark_added(&mut self);

    /// Write the named attribute's binary encoding.
    fn write_attribute<W: Write>(
        &self,
        name: &str,
        stream: &mut BinaryWriter<W>,
    ) -> Result<(), SdmError>;

    /// Read the named attribute's binary encoding into this row.
    fn read_attribute<S: Read>(
        &mut self,
        name: &str,
        stream: &mut BinaryReader<S>,
    ) -> Result<(), SdmError>;

    /// The named attribute's textual rendering, or Ok(None) for an
    /// absent optional attribute.
    fn xml_attribute(&self, name: &str) -> Result<Option<String>, SdmError>;

    /// Install the named attribute from its textual rendering.
    fn set_xml_attribute(&mut self, name: &str, text: &str) -> Result<(), SdmError>;
}

/// An ordered collection of rows of one table type.
///
/// The table exclusively owns its rows; callers address rows by index
/// or borrow them through the accessors. Insertion order is preserved
/// and exposed by [`get`](Self::get). No two rows ever share a key.
#[derive(Debug)]
pub struct SdmTable<R: TableRow> {
    rows: Vec<R>,
    key_index: HashMap<String, usize>,
    contexts: BTreeMap<String, Vec<usize>>,
}

impl<R: TableRow> Default for SdmTable<R> {
    fn default() -> Self {
        SdmTable::new()
    }
}

impl<R: TableRow> SdmTable<R> {
    pub fn new() -> Self {
        SdmTable {
            rows: Vec::new(),
            key_index: HashMap::new(),
            contexts: BTreeMap::new(),
        }
    }

    /// The table's schema name.
    pub fn name(&self) -> &'static str {
        R::TABLE_NAME
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All rows, in insertion order.
    pub fn get(&self) -> &[R] {
        &self.rows
    }

    /// Mutable access to one row. Key attributes stay frozen — their
    /// setters fail once a row belongs to a table — but non-key
    /// attributes remain mutable through this.
    pub fn row_mut(&mut self, index: usize) -> &mut R {
        &mut self.rows[index]
    }

    /// Look a row up by its rendered key.
    pub fn row_by_key(&self, key: &str) -> Option<&R> {
        self.key_index.get(key).map(|&i| &self.rows[i])
    }

    /// Like [`row_by_key`](Self::row_by_key), but a missing row is an
    /// error. This is the mechanism used to traverse declared links
    /// between tables, so a dangling link surfaces as `NoSuchRow`.
    pub fn row_by_key_required(&self, key: &str) -> Result<&R, SdmError> {
        self.row_by_key(key).ok_or_else(|| SdmError::NoSuchRow {
            table: R::TABLE_NAME,
            key: key.to_owned(),
        })
    }

    /// The rows sharing a context sub-key, sorted ascending by their
    /// interval start — regardless of the order they were added in.
    /// Returns None if the context is unknown.
    pub fn by_context(&self, context: &str) -> Option<Vec<&R>> {
        self.contexts
            .get(context)
            .map(|indices| indices.iter().map(|&i| &self.rows[i]).collect())
    }

    /// Find an existing row whose full required-value section matches
    /// *probe*.
    pub fn lookup(&self, probe: &R) -> Option<&R> {
        self.rows.iter().find(|r| r.equal_by_required_value(probe))
    }

    /// Add a row, enforcing key uniqueness.
    ///
    /// Addition is idempotent on exact duplicates: re-adding a row
    /// whose key and required values both match an existing row
    /// returns the existing row's index and leaves the table
    /// unchanged. A key match with differing values is a
    /// `DuplicateKey` error. For auto-incrementing tables the
    /// value-match check runs first and a fresh key is generated
    /// otherwise.
    pub fn add(&mut self, mut row: R) -> Result<usize, SdmError> {
        if R::AUTO_INCREMENTING {
            if let Some(i) = self.rows.iter().position(|r| r.equal_by_required_value(&row)) {
                return Ok(i);
            }

            let mut ordinal = self.rows.len() as u32;
            row.assign_auto_key(ordinal);

            // Deserialized rows may already occupy some ordinals.
            while self.key_index.contains_key(&row.key()) {
                ordinal += 1;
                row.assign_auto_key(ordinal);
            }

            return Ok(self.attach(row));
        }

        if let Some(&i) = self.key_index.get(&row.key()) {
            return if self.rows[i].equal_by_required_value(&row) {
                Ok(i)
            } else {
                Err(SdmError::DuplicateKey {
                    table: R::TABLE_NAME,
                    key: row.key(),
                })
            };
        }

        Ok(self.attach(row))
    }

    /// Append a row whose key is already set, as when reconstituting a
    /// table from a serialized form. Any key clash — even an exact
    /// duplicate, which a well-formed serialization never contains —
    /// is a `DuplicateKey` error.
    pub fn insert(&mut self, row: R) -> Result<usize, SdmError> {
        if self.key_index.contains_key(&row.key()) {
            return Err(SdmError::DuplicateKey {
                table: R::TABLE_NAME,
                key: row.key(),
            });
        }

        Ok(self.attach(row))
    }

    fn attach(&mut self, mut row: R) -> usize {
        let index = self.rows.len();
        row.mark_added();
        self.key_index.insert(row.key(), index);

        if let Some((context, start)) = row.context() {
            let rows = &self.rows;
            let indices = self.contexts.entry(context).or_insert_with(Vec::new);
            let position = indices.partition_point(|&i| {
                rows[i].context().map(|(_, s)| s).unwrap_or_default() <= start
            });
            indices.insert(position, index);
        }

        self.rows.push(row);
        index
    }
}

pub(crate) fn parse_scalar<T>(
    table: &'static str,
    attribute: &str,
    text: &str,
) -> Result<T, SdmError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    text.trim().parse().map_err(|e| {
        SdmError::conversion(
            table,
            format!("bad value \"{text}\" for attribute \"{attribute}\": {e}"),
        )
    })
}

pub(crate) fn parse_bool(
    table: &'static str,
    attribute: &str,
    text: &str,
) -> Result<bool, SdmError> {
    match text.trim() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(SdmError::conversion(
            table,
            format!("bad boolean \"{other}\" for attribute \"{attribute}\""),
        )),
    }
}

pub(crate) fn parse_f64_array(
    table: &'static str,
    attribute: &str,
    text: &str,
) -> Result<Vec<f64>, SdmError> {
    text.split_whitespace()
        .map(|piece| parse_scalar(table, attribute, piece))
        .collect()
}

pub(crate) fn format_f64_array(values: &[f64]) -> String {
    let pieces: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    pieces.join(" ")
}
