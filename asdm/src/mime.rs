// Copyright 2024-2026 the asdmkit collaborators
// Licensed under the MIT License.

/*!

The MIME-wrapped binary representation of a table.

A binary table travels as a two-part `multipart/related` message. The
first part is a small XML header recording the table name, the byte
order of the payload, the row count, and the exact attribute sequence
the rows were written with. The second part is the row data itself:
every row's attributes, back to back, in the recorded sequence.

Readers iterate the *recorded* attribute sequence rather than their own
canonical one, so a payload written by software with extra trailing
attributes, or with the optional attributes in a different order, still
decodes correctly as long as each attribute name is recognized.

 */

use crate::table::{SdmTable, TableRow};
use crate::xml::bad;
use crate::SdmError;
use asdm_core::io::{BinaryReader, BinaryWriter, ByteOrdering};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};

const BOUNDARY: &str = "MIME_boundary";

/// The decoded contents of a binary table's XML header part.
struct BinaryHeader {
    order: ByteOrdering,
    num_rows: usize,
    attributes: Vec<String>,
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if needle.is_empty() || haystack.len() < from + needle.len() {
        return None;
    }

    haystack[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|i| i + from)
}

fn required_attribute<R: TableRow>(element: &BytesStart, name: &str) -> Result<String, SdmError> {
    let attribute = element
        .try_get_attribute(name)
        .map_err(|e| bad::<R>(e))?
        .ok_or_else(|| bad::<R>(format!("missing \"{name}\" attribute in the binary header")))?;

    Ok(attribute
        .unescape_value()
        .map_err(|e| bad::<R>(e))?
        .into_owned())
}

fn parse_header<R: TableRow>(document: &str) -> Result<BinaryHeader, SdmError> {
    let mut reader = Reader::from_str(document);
    let mut header: Option<BinaryHeader> = None;

    loop {
        match reader.read_event().map_err(|e| bad::<R>(e))? {
            Event::Start(e) if e.name().as_ref() == b"BinaryTable" => {
                let name = required_attribute::<R>(&e, "name")?;

                if name != R::TABLE_NAME {
                    return Err(bad::<R>(format!(
                        "binary header names the {name} table"
                    )));
                }

                let token = required_attribute::<R>(&e, "byteOrder")?;
                let order = ByteOrdering::from_token(&token)
                    .ok_or_else(|| bad::<R>(format!("unknown byte order \"{token}\"")))?;

                let num_rows = required_attribute::<R>(&e, "numRows")?
                    .parse()
                    .map_err(|e| bad::<R>(format!("bad numRows: {e}")))?;

                header = Some(BinaryHeader {
                    order,
                    num_rows,
                    attributes: Vec::new(),
                });
            }

            Event::Empty(e) if e.name().as_ref() == b"attribute" => match header {
                Some(ref mut h) => h.attributes.push(required_attribute::<R>(&e, "name")?),
                None => return Err(bad::<R>("<attribute> outside <BinaryTable>")),
            },

            Event::Eof => break,

            _ => {}
        }
    }

    header.ok_or_else(|| bad::<R>("no <BinaryTable> header found"))
}

impl<R: TableRow> SdmTable<R> {
    fn binary_header(&self, order: ByteOrdering) -> Result<String, SdmError> {
        let mut writer = Writer::new(Vec::new());

        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(|e| bad::<R>(e))?;

        let mut root = BytesStart::new("BinaryTable");
        root.push_attribute(("name", R::TABLE_NAME));
        root.push_attribute(("schemaVersion", "1"));
        root.push_attribute(("byteOrder", order.token()));
        root.push_attribute(("numRows", self.len().to_string().as_str()));
        writer
            .write_event(Event::Start(root))
            .map_err(|e| bad::<R>(e))?;

        for &name in R::ATTRIBUTES {
            let mut element = BytesStart::new("attribute");
            element.push_attribute(("name", name));
            writer
                .write_event(Event::Empty(element))
                .map_err(|e| bad::<R>(e))?;
        }

        writer
            .write_event(Event::End(BytesEnd::new("BinaryTable")))
            .map_err(|e| bad::<R>(e))?;

        String::from_utf8(writer.into_inner()).map_err(|e| bad::<R>(e))
    }

    /// Render this table as a MIME-wrapped binary message in the given
    /// byte order.
    pub fn to_mime(&self, order: ByteOrdering) -> Result<Vec<u8>, SdmError> {
        let header = self.binary_header(order)?;

        let mut payload = BinaryWriter::new(Vec::new(), order);

        for row in self.get() {
            for &name in R::ATTRIBUTES {
                row.write_attribute(name, &mut payload)?;
            }
        }

        let payload = payload.into_inner();

        let mut message = Vec::new();
        message.extend_from_slice(b"MIME-Version: 1.0\r\n");
        message.extend_from_slice(
            format!(
                "Content-Type: multipart/related; boundary=\"{BOUNDARY}\"; type=\"text/xml\"\r\n\r\n"
            )
            .as_bytes(),
        );

        message.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        message.extend_from_slice(b"Content-Type: text/xml; charset=\"UTF-8\"\r\n");
        message.extend_from_slice(b"Content-Location: header.xml\r\n\r\n");
        message.extend_from_slice(header.as_bytes());

        message.extend_from_slice(format!("\r\n--{BOUNDARY}\r\n").as_bytes());
        message.extend_from_slice(b"Content-Type: binary/octet-stream\r\n");
        message.extend_from_slice(b"Content-Location: rows.bin\r\n\r\n");
        message.extend_from_slice(&payload);

        message.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        Ok(message)
    }

    /// Reconstitute a table from a MIME-wrapped binary message.
    pub fn from_mime(message: &[u8]) -> Result<Self, SdmError> {
        // The top-level headers, which carry the part boundary.
        let head_end =
            find(message, b"\r\n\r\n", 0).ok_or_else(|| bad::<R>("no MIME headers found"))?;
        let head = std::str::from_utf8(&message[..head_end]).map_err(|e| bad::<R>(e))?;

        let boundary = head
            .find("boundary=\"")
            .map(|i| &head[i + 10..])
            .and_then(|rest| rest.find('"').map(|end| &rest[..end]))
            .ok_or_else(|| bad::<R>("no part boundary declared"))?;
        let marker = format!("--{boundary}");

        // Part 1: the XML header.
        let part1 = find(message, marker.as_bytes(), head_end)
            .ok_or_else(|| bad::<R>("missing header part"))?;
        let body1 = find(message, b"\r\n\r\n", part1)
            .ok_or_else(|| bad::<R>("malformed header part"))?
            + 4;
        let end1 = find(message, marker.as_bytes(), body1)
            .ok_or_else(|| bad::<R>("missing payload part"))?;

        let document = std::str::from_utf8(&message[body1..end1]).map_err(|e| bad::<R>(e))?;
        let header = parse_header::<R>(document.trim())?;

        // Part 2: the binary rows.
        let body2 = find(message, b"\r\n\r\n", end1)
            .ok_or_else(|| bad::<R>("malformed payload part"))?
            + 4;
        let closing = format!("\r\n--{boundary}--");
        let end2 = find(message, closing.as_bytes(), body2)
            .ok_or_else(|| bad::<R>("missing closing boundary"))?;

        let mut stream = BinaryReader::new(&message[body2..end2], header.order);
        let mut table = SdmTable::new();

        for _ in 0..header.num_rows {
            let mut row = R::default();

            for name in &header.attributes {
                row.read_attribute(name, &mut stream)?;
            }

            table.insert(row)?;
        }

        if !stream.into_inner().is_empty() {
            return Err(bad::<R>("trailing bytes after the final row"));
        }

        Ok(table)
    }
}

#[cfg(test)]
use crate::flagcmd::{FlagCmdRow, FlagCmdTable};
#[cfg(test)]
use crate::types::{ArrayTime, ArrayTimeInterval, Interval};
#[cfg(test)]
use crate::weather::{WeatherRow, WeatherTable};

#[cfg(test)]
fn sample_table() -> FlagCmdTable {
    let mut table = FlagCmdTable::new();

    for start in &[1000i64, 2000] {
        table
            .add(FlagCmdRow::new(
                ArrayTimeInterval::new(ArrayTime::new(*start), Interval::new(60_000_000_000)),
                "FLAG",
                "shadowing",
                1,
                5,
                false,
                "mode='shadow'",
            ))
            .unwrap();
    }

    table
}

#[cfg(test)]
#[test]
fn messages_round_trip_in_both_byte_orders() {
    let table = sample_table();

    for order in &[ByteOrdering::Big, ByteOrdering::Little] {
        let message = table.to_mime(*order).unwrap();

        let head = std::str::from_utf8(&message[..200]).unwrap();
        assert!(head.starts_with("MIME-Version: 1.0\r\n"));
        assert!(head.contains("multipart/related"));

        let reloaded = FlagCmdTable::from_mime(&message).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.get()[0].time_interval().start().get(), 1000);
        assert_eq!(reloaded.get()[1].command(), "mode='shadow'");
    }
}

#[cfg(test)]
#[test]
fn optional_attributes_survive_the_binary_form() {
    let mut table = WeatherTable::new();
    let mut row = WeatherRow::new(
        crate::types::Tag::new(crate::types::TagKind::Station, 0),
        ArrayTimeInterval::new(ArrayTime::new(1000), Interval::new(600)),
    );
    row.set_pressure(563.0);
    table.add(row).unwrap();

    let message = table.to_mime(ByteOrdering::Little).unwrap();
    let reloaded = WeatherTable::from_mime(&message).unwrap();

    assert_eq!(reloaded.get()[0].pressure(), Some(563.0));
    assert!(reloaded.get()[0].temperature().is_none());
}

#[cfg(test)]
#[test]
fn decoding_follows_the_recorded_attribute_sequence() {
    // Write the value attributes in a scrambled order and record that
    // order in the header, as a producer with a different attribute
    // declaration might.
    let sequence = ["command", "timeInterval", "applied", "type", "reason", "severity", "level"];
    let row = FlagCmdRow::new(
        ArrayTimeInterval::new(ArrayTime::new(1000), Interval::new(60)),
        "FLAG",
        "shadowing",
        1,
        5,
        true,
        "cmd",
    );

    let mut payload = BinaryWriter::new(Vec::new(), ByteOrdering::Big);
    for name in &sequence {
        crate::table::TableRow::write_attribute(&row, name, &mut payload).unwrap();
    }
    let payload = payload.into_inner();

    let attributes: String = sequence
        .iter()
        .map(|name| format!("<attribute name=\"{name}\"/>"))
        .collect();
    let header = format!(
        "<BinaryTable name=\"FlagCmd\" byteOrder=\"Big_Endian\" numRows=\"1\">{attributes}</BinaryTable>"
    );

    let mut message = Vec::new();
    message.extend_from_slice(
        b"MIME-Version: 1.0\r\n\
          Content-Type: multipart/related; boundary=\"MIME_boundary\"; type=\"text/xml\"\r\n\r\n",
    );
    message.extend_from_slice(b"--MIME_boundary\r\nContent-Type: text/xml\r\n\r\n");
    message.extend_from_slice(header.as_bytes());
    message.extend_from_slice(b"\r\n--MIME_boundary\r\nContent-Type: binary/octet-stream\r\n\r\n");
    message.extend_from_slice(&payload);
    message.extend_from_slice(b"\r\n--MIME_boundary--\r\n");

    let reloaded = FlagCmdTable::from_mime(&message).unwrap();
    assert_eq!(reloaded.len(), 1);
    assert_eq!(reloaded.get()[0].command(), "cmd");
    assert_eq!(reloaded.get()[0].severity(), 5);
    assert!(reloaded.get()[0].applied());
}

#[cfg(test)]
#[test]
fn corrupt_messages_are_rejected() {
    let table = sample_table();
    let message = table.to_mime(ByteOrdering::Big).unwrap();

    // Truncated payload.
    let truncated = &message[..message.len() - 40];
    assert!(FlagCmdTable::from_mime(truncated).is_err());

    // Wrong table name in the header.
    assert!(matches!(
        WeatherTable::from_mime(&message),
        Err(SdmError::Conversion { .. })
    ));

    // Not a MIME message at all.
    assert!(matches!(
        FlagCmdTable::from_mime(b"once upon a time"),
        Err(SdmError::Conversion { .. })
    ));
}
