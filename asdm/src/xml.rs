// Copyright 2024-2026 the asdmkit collaborators
// Licensed under the MIT License.

/*!

The per-table XML representation.

Each table serializes to its own document: a `{Name}Table` root element
holding one `<row>` element per row, which in turn holds one child
element per attribute, in the canonical attribute order. Absent optional
attributes are omitted entirely rather than written as empty elements.

 */

use crate::table::{SdmTable, TableRow};
use crate::SdmError;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

pub(crate) fn bad<R: TableRow>(message: impl std::fmt::Display) -> SdmError {
    SdmError::conversion(R::TABLE_NAME, message.to_string())
}

impl<R: TableRow> SdmTable<R> {
    /// Render this table as an XML document.
    pub fn to_xml(&self) -> Result<String, SdmError> {
        let root = format!("{}Table", R::TABLE_NAME);
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(|e| bad::<R>(e))?;
        writer
            .write_event(Event::Start(BytesStart::new(root.as_str())))
            .map_err(|e| bad::<R>(e))?;

        for row in self.get() {
            writer
                .write_event(Event::Start(BytesStart::new("row")))
                .map_err(|e| bad::<R>(e))?;

            for &name in R::ATTRIBUTES {
                if let Some(text) = row.xml_attribute(name)? {
                    writer
                        .write_event(Event::Start(BytesStart::new(name)))
                        .map_err(|e| bad::<R>(e))?;
                    writer
                        .write_event(Event::Text(BytesText::new(&text)))
                        .map_err(|e| bad::<R>(e))?;
                    writer
                        .write_event(Event::End(BytesEnd::new(name)))
                        .map_err(|e| bad::<R>(e))?;
                }
            }

            writer
                .write_event(Event::End(BytesEnd::new("row")))
                .map_err(|e| bad::<R>(e))?;
        }

        writer
            .write_event(Event::End(BytesEnd::new(root.as_str())))
            .map_err(|e| bad::<R>(e))?;

        String::from_utf8(writer.into_inner()).map_err(|e| bad::<R>(e))
    }

    /// Reconstitute a table from its XML document.
    ///
    /// Unknown attribute elements, stray non-whitespace text, a wrong
    /// root element, and duplicate row keys all fail the load.
    pub fn from_xml(document: &str) -> Result<Self, SdmError> {
        let root = format!("{}Table", R::TABLE_NAME);
        let mut reader = Reader::from_str(document);
        let mut table = SdmTable::new();

        let mut seen_root = false;
        let mut row: Option<R> = None;
        let mut attribute: Option<(String, String)> = None;

        loop {
            match reader.read_event().map_err(|e| bad::<R>(e))? {
                Event::Decl(_) | Event::DocType(_) | Event::Comment(_) | Event::PI(_) => {}

                Event::Start(e) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();

                    if !seen_root {
                        if name != root {
                            return Err(bad::<R>(format!(
                                "expected a <{root}> document, found <{name}>"
                            )));
                        }

                        seen_root = true;
                    } else if row.is_none() {
                        if name != "row" {
                            return Err(bad::<R>(format!("unexpected element <{name}>")));
                        }

                        row = Some(R::default());
                    } else if attribute.is_none() {
                        attribute = Some((name, String::new()));
                    } else {
                        return Err(bad::<R>(format!(
                            "unexpected element <{name}> inside an attribute"
                        )));
                    }
                }

                // An empty element inside a row is an attribute with
                // empty text.
                Event::Empty(e) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();

                    match row {
                        Some(ref mut r) if attribute.is_none() => r.set_xml_attribute(&name, "")?,
                        _ => return Err(bad::<R>(format!("unexpected element <{name}/>"))),
                    }
                }

                Event::Text(t) => {
                    let text = t.unescape().map_err(|e| bad::<R>(e))?;

                    if let Some((_, ref mut buffer)) = attribute {
                        buffer.push_str(&text);
                    } else if !text.trim().is_empty() {
                        return Err(bad::<R>(format!("stray text \"{}\"", text.trim())));
                    }
                }

                Event::CData(t) => {
                    let text = String::from_utf8_lossy(&t.into_inner()).into_owned();

                    if let Some((_, ref mut buffer)) = attribute {
                        buffer.push_str(&text);
                    } else {
                        return Err(bad::<R>("unexpected CDATA section"));
                    }
                }

                Event::End(_) => {
                    if let Some((name, text)) = attribute.take() {
                        if let Some(ref mut r) = row {
                            r.set_xml_attribute(&name, &text)?;
                        }
                    } else if let Some(r) = row.take() {
                        table.insert(r)?;
                    }
                }

                Event::Eof => break,
            }
        }

        if !seen_root {
            return Err(bad::<R>(format!("no <{root}> element found")));
        }

        Ok(table)
    }
}

#[cfg(test)]
use crate::antenna::{AntennaRow, AntennaTable};
#[cfg(test)]
use crate::enums::{AntennaMake, AntennaType};
#[cfg(test)]
use crate::flagcmd::{FlagCmdRow, FlagCmdTable};
#[cfg(test)]
use crate::types::{ArrayTime, ArrayTimeInterval, Interval, Tag, TagKind};

#[cfg(test)]
#[test]
fn flag_cmd_documents_round_trip() {
    let mut table = FlagCmdTable::new();

    for start in &[2000i64, 1000] {
        table
            .add(FlagCmdRow::new(
                ArrayTimeInterval::new(ArrayTime::new(*start), Interval::new(60_000_000_000)),
                "FLAG",
                "shadowed <by> DA42 & friends",
                1,
                5,
                false,
                "mode='shadow'",
            ))
            .unwrap();
    }

    let document = table.to_xml().unwrap();
    assert!(document.starts_with("<?xml"));
    assert!(document.contains("<FlagCmdTable>"));
    assert!(document.contains("&amp;"));

    let reloaded = FlagCmdTable::from_xml(&document).unwrap();
    assert_eq!(reloaded.len(), 2);
    assert_eq!(reloaded.get()[0].time_interval().start().get(), 2000);
    assert_eq!(reloaded.get()[0].reason(), "shadowed <by> DA42 & friends");
    assert_eq!(reloaded.get()[1].command(), "mode='shadow'");

    // Context ordering is rebuilt on load.
    assert_eq!(
        reloaded.time_ordered()[0].time_interval().start().get(),
        1000
    );
}

#[cfg(test)]
#[test]
fn absent_optional_attributes_are_omitted() {
    let mut table = AntennaTable::new();
    let a = table
        .add(AntennaRow::new(
            "DA41",
            AntennaMake::VERTEX_12,
            AntennaType::GROUND_BASED,
            12.0,
            vec![1.0, 2.0, 3.0],
            vec![0.0, 0.0, 0.0],
            ArrayTime::new(1000),
            Tag::new(TagKind::Station, 0),
        ))
        .unwrap();
    let b = table
        .add(AntennaRow::new(
            "DA42",
            AntennaMake::VERTEX_12,
            AntennaType::GROUND_BASED,
            12.0,
            vec![4.0, 5.0, 6.0],
            vec![0.0, 0.0, 0.0],
            ArrayTime::new(1000),
            Tag::new(TagKind::Station, 1),
        ))
        .unwrap();

    let b_tag = table.get()[b].antenna_id();
    table.row_mut(a).set_assoc_antenna_id(b_tag);

    let document = table.to_xml().unwrap();
    assert_eq!(document.matches("<assocAntennaId>").count(), 1);

    let reloaded = AntennaTable::from_xml(&document).unwrap();
    assert_eq!(reloaded.get()[a].assoc_antenna_id(), Some(b_tag));
    assert!(reloaded.get()[b].assoc_antenna_id().is_none());
}

#[cfg(test)]
#[test]
fn malformed_documents_are_rejected() {
    assert!(matches!(
        FlagCmdTable::from_xml("<WeatherTable></WeatherTable>"),
        Err(SdmError::Conversion { .. })
    ));

    assert!(matches!(
        FlagCmdTable::from_xml("<FlagCmdTable><row><bogus>1</bogus></row></FlagCmdTable>"),
        Err(SdmError::Conversion { .. })
    ));

    assert!(matches!(
        FlagCmdTable::from_xml("just some text"),
        Err(SdmError::Conversion { .. })
    ));

    assert!(matches!(
        FlagCmdTable::from_xml(""),
        Err(SdmError::Conversion { .. })
    ));
}

#[cfg(test)]
#[test]
fn duplicate_keys_in_a_document_fail_the_load() {
    let row = "<row><timeInterval>1000 60</timeInterval><type>FLAG</type>\
               <reason></reason><level>1</level><severity>5</severity>\
               <applied>false</applied><command>cmd</command></row>";
    let document = format!("<FlagCmdTable>{row}{row}</FlagCmdTable>");

    assert!(matches!(
        FlagCmdTable::from_xml(&document),
        Err(SdmError::DuplicateKey { .. })
    ));
}
