// Copyright 2024-2026 the asdmkit collaborators
// Licensed under the MIT License.

/*!

Binary streams whose byte order is chosen at run time.

ASDM binary tables record the byte order they were written with in their
header document, so a reader cannot commit to an endianness at compile
time. The types here wrap `Read` and `Write` implementors with typed
accessors that consult a [`ByteOrdering`] selected when the stream is
constructed.

 */

use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Result, Write};

/// The two byte orderings an ASDM binary payload may use.
///
/// The `token` form is the string that appears in serialized table
/// headers.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ByteOrdering {
    Big,
    Little,
}

impl ByteOrdering {
    /// Return the header token for this ordering.
    pub fn token(&self) -> &'static str {
        match *self {
            ByteOrdering::Big => "Big_Endian",
            ByteOrdering::Little => "Little_Endian",
        }
    }

    /// Parse a header token. Returns None for anything other than the
    /// two legal spellings.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "Big_Endian" => Some(ByteOrdering::Big),
            "Little_Endian" => Some(ByteOrdering::Little),
            _ => None,
        }
    }
}

impl std::fmt::Display for ByteOrdering {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.pad(self.token())
    }
}

/// A writer of fixed-layout binary values in a run-time-selected byte
/// order.
///
/// Strings are written as an i32 byte count followed by UTF-8 bytes;
/// arrays as an i32 element count followed by the elements. There is no
/// padding or alignment between values.
#[derive(Debug)]
pub struct BinaryWriter<W: Write> {
    inner: W,
    order: ByteOrdering,
}

impl<W: Write> BinaryWriter<W> {
    /// Create a new BinaryWriter wrapping *inner*.
    pub fn new(inner: W, order: ByteOrdering) -> Self {
        BinaryWriter { inner, order }
    }

    /// Return the byte ordering this stream writes with.
    pub fn order(&self) -> ByteOrdering {
        self.order
    }

    /// Consume this struct, returning the underlying inner writer.
    pub fn into_inner(self) -> W {
        self.inner
    }

    pub fn write_bool(&mut self, v: bool) -> Result<()> {
        self.inner.write_u8(v as u8)
    }

    pub fn write_i32(&mut self, v: i32) -> Result<()> {
        match self.order {
            ByteOrdering::Big => self.inner.write_i32::<BigEndian>(v),
            ByteOrdering::Little => self.inner.write_i32::<LittleEndian>(v),
        }
    }

    pub fn write_i64(&mut self, v: i64) -> Result<()> {
        match self.order {
            ByteOrdering::Big => self.inner.write_i64::<BigEndian>(v),
            ByteOrdering::Little => self.inner.write_i64::<LittleEndian>(v),
        }
    }

    pub fn write_f32(&mut self, v: f32) -> Result<()> {
        match self.order {
            ByteOrdering::Big => self.inner.write_f32::<BigEndian>(v),
            ByteOrdering::Little => self.inner.write_f32::<LittleEndian>(v),
        }
    }

    pub fn write_f64(&mut self, v: f64) -> Result<()> {
        match self.order {
            ByteOrdering::Big => self.inner.write_f64::<BigEndian>(v),
            ByteOrdering::Little => self.inner.write_f64::<LittleEndian>(v),
        }
    }

    /// Write a string as an i32 byte count followed by its UTF-8 bytes.
    pub fn write_string(&mut self, v: &str) -> Result<()> {
        let bytes = v.as_bytes();

        if bytes.len() > i32::MAX as usize {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "string too long for binary encoding",
            ));
        }

        self.write_i32(bytes.len() as i32)?;
        self.inner.write_all(bytes)
    }

    /// Write an f64 array as an i32 element count followed by the
    /// elements.
    pub fn write_f64_array(&mut self, v: &[f64]) -> Result<()> {
        if v.len() > i32::MAX as usize {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "array too long for binary encoding",
            ));
        }

        self.write_i32(v.len() as i32)?;

        for x in v {
            self.write_f64(*x)?;
        }

        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()
    }
}

/// The reading counterpart of [`BinaryWriter`].
///
/// Structurally invalid primitives (a boolean byte other than 0 or 1, a
/// negative length prefix, non-UTF-8 string bytes) surface as
/// `InvalidData` I/O errors; truncation surfaces as `UnexpectedEof`.
#[derive(Debug)]
pub struct BinaryReader<R: Read> {
    inner: R,
    order: ByteOrdering,
}

impl<R: Read> BinaryReader<R> {
    /// Create a new BinaryReader wrapping *inner*.
    pub fn new(inner: R, order: ByteOrdering) -> Self {
        BinaryReader { inner, order }
    }

    /// Return the byte ordering this stream reads with.
    pub fn order(&self) -> ByteOrdering {
        self.order
    }

    /// Consume this struct, returning the underlying inner reader.
    pub fn into_inner(self) -> R {
        self.inner
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        match self.inner.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("illegal boolean byte {other}"),
            )),
        }
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        match self.order {
            ByteOrdering::Big => self.inner.read_i32::<BigEndian>(),
            ByteOrdering::Little => self.inner.read_i32::<LittleEndian>(),
        }
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        match self.order {
            ByteOrdering::Big => self.inner.read_i64::<BigEndian>(),
            ByteOrdering::Little => self.inner.read_i64::<LittleEndian>(),
        }
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        match self.order {
            ByteOrdering::Big => self.inner.read_f32::<BigEndian>(),
            ByteOrdering::Little => self.inner.read_f32::<LittleEndian>(),
        }
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        match self.order {
            ByteOrdering::Big => self.inner.read_f64::<BigEndian>(),
            ByteOrdering::Little => self.inner.read_f64::<LittleEndian>(),
        }
    }

    fn read_count(&mut self) -> Result<usize> {
        let n = self.read_i32()?;

        if n < 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("illegal negative length prefix {n}"),
            ));
        }

        Ok(n as usize)
    }

    /// Read a string written by [`BinaryWriter::write_string`].
    pub fn read_string(&mut self) -> Result<String> {
        let n = self.read_count()?;
        let mut buf = vec![0; n];
        self.inner.read_exact(&mut buf[..])?;

        String::from_utf8(buf)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("non-UTF-8 string: {e}")))
    }

    /// Read an array written by [`BinaryWriter::write_f64_array`].
    pub fn read_f64_array(&mut self) -> Result<Vec<f64>> {
        let n = self.read_count()?;
        let mut out = Vec::with_capacity(n);

        for _ in 0..n {
            out.push(self.read_f64()?);
        }

        Ok(out)
    }
}

#[cfg(test)]
#[test]
fn primitive_round_trip() {
    for order in &[ByteOrdering::Big, ByteOrdering::Little] {
        let mut w = BinaryWriter::new(Vec::new(), *order);
        w.write_bool(true).unwrap();
        w.write_bool(false).unwrap();
        w.write_i32(-123456).unwrap();
        w.write_i64(0x0123_4567_89ab_cdef).unwrap();
        w.write_f32(1.5).unwrap();
        w.write_f64(-2.25).unwrap();
        w.write_string("GROUND_BASED").unwrap();
        w.write_f64_array(&[1.0, 2.0, 3.0]).unwrap();
        let buf = w.into_inner();

        let mut r = BinaryReader::new(&buf[..], *order);
        assert_eq!(r.read_bool().unwrap(), true);
        assert_eq!(r.read_bool().unwrap(), false);
        assert_eq!(r.read_i32().unwrap(), -123456);
        assert_eq!(r.read_i64().unwrap(), 0x0123_4567_89ab_cdef);
        assert_eq!(r.read_f32().unwrap(), 1.5);
        assert_eq!(r.read_f64().unwrap(), -2.25);
        assert_eq!(r.read_string().unwrap(), "GROUND_BASED");
        assert_eq!(r.read_f64_array().unwrap(), vec![1.0, 2.0, 3.0]);
    }
}

#[cfg(test)]
#[test]
fn invalid_primitives_are_rejected() {
    let mut r = BinaryReader::new(&[7u8][..], ByteOrdering::Big);
    assert_eq!(r.read_bool().unwrap_err().kind(), io::ErrorKind::InvalidData);

    // A negative string length prefix.
    let mut w = BinaryWriter::new(Vec::new(), ByteOrdering::Big);
    w.write_i32(-4).unwrap();
    let buf = w.into_inner();
    let mut r = BinaryReader::new(&buf[..], ByteOrdering::Big);
    assert_eq!(
        r.read_string().unwrap_err().kind(),
        io::ErrorKind::InvalidData
    );

    // A truncated payload.
    let mut w = BinaryWriter::new(Vec::new(), ByteOrdering::Little);
    w.write_i32(12).unwrap();
    let buf = w.into_inner();
    let mut r = BinaryReader::new(&buf[..], ByteOrdering::Little);
    assert_eq!(
        r.read_string().unwrap_err().kind(),
        io::ErrorKind::UnexpectedEof
    );
}

#[cfg(test)]
#[test]
fn byte_ordering_tokens() {
    assert_eq!(ByteOrdering::Big.token(), "Big_Endian");
    assert_eq!(
        ByteOrdering::from_token("Little_Endian"),
        Some(ByteOrdering::Little)
    );
    assert_eq!(ByteOrdering::from_token("Middle_Endian"), None);
}
