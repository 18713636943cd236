// Copyright 2024-2026 the asdmkit collaborators
// Licensed under the MIT License.

/*!

The basic value types that ASDM table attributes are built from.

 */

use crate::SdmError;
use std::fmt;
use std::str::FromStr;

/// Nanoseconds per day, the conversion factor between raw
/// [`ArrayTime`] values and MJD days.
const NANOSECONDS_PER_DAY: f64 = 86_400e9;

/// The table a [`Tag`] identifies a row of.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum TagKind {
    /// The null tag kind; only the default "null" tag carries it.
    None,
    Station,
    Antenna,
    SpectralWindow,
}

impl TagKind {
    pub fn name(&self) -> &'static str {
        match *self {
            TagKind::None => "None",
            TagKind::Station => "Station",
            TagKind::Antenna => "Antenna",
            TagKind::SpectralWindow => "SpectralWindow",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "Station" => Some(TagKind::Station),
            "Antenna" => Some(TagKind::Antenna),
            "SpectralWindow" => Some(TagKind::SpectralWindow),
            _ => None,
        }
    }
}

impl Default for TagKind {
    fn default() -> Self {
        TagKind::None
    }
}

/// A typed row identifier, used as (part of) several tables' primary
/// keys.
///
/// A tag renders as `{Kind}_{ordinal}`, e.g. `Antenna_3`. The default
/// tag is the distinguished "null" tag, which identifies nothing.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Tag {
    kind: TagKind,
    ordinal: u32,
}

impl Tag {
    pub fn new(kind: TagKind, ordinal: u32) -> Self {
        Tag { kind, ordinal }
    }

    pub fn kind(&self) -> TagKind {
        self.kind
    }

    pub fn ordinal(&self) -> u32 {
        self.ordinal
    }

    /// Whether this is the null tag.
    pub fn is_null(&self) -> bool {
        self.kind == TagKind::None
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_null() {
            f.pad("null")
        } else {
            f.pad(&format!("{}_{}", self.kind.name(), self.ordinal))
        }
    }
}

impl FromStr for Tag {
    type Err = SdmError;

    fn from_str(text: &str) -> Result<Self, SdmError> {
        if text == "null" {
            return Ok(Tag::default());
        }

        let bad = || SdmError::conversion("Tag", format!("illegal tag \"{text}\""));

        let mut pieces = text.rsplitn(2, '_');
        let ordinal = pieces.next().ok_or_else(bad)?;
        let kind = pieces.next().ok_or_else(bad)?;

        Ok(Tag {
            kind: TagKind::from_name(kind).ok_or_else(bad)?,
            ordinal: ordinal.parse().map_err(|_| bad())?,
        })
    }
}

/// A duration, counted in nanoseconds.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Interval(i64);

impl Interval {
    pub fn new(nanoseconds: i64) -> Self {
        Interval(nanoseconds)
    }

    pub fn get(&self) -> i64 {
        self.0
    }
}

/// An instant, counted in nanoseconds since the MJD epoch.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ArrayTime(i64);

impl ArrayTime {
    pub fn new(nanoseconds: i64) -> Self {
        ArrayTime(nanoseconds)
    }

    pub fn get(&self) -> i64 {
        self.0
    }

    /// Convert from a time expressed in (fractional) MJD days.
    pub fn from_mjd(mjd: f64) -> Self {
        ArrayTime((mjd * NANOSECONDS_PER_DAY) as i64)
    }

    /// This time expressed in (fractional) MJD days.
    pub fn mjd(&self) -> f64 {
        self.0 as f64 / NANOSECONDS_PER_DAY
    }
}

/// A time range: a start instant plus a duration.
///
/// The textual form is two integers, "start duration", both in
/// nanoseconds; the binary form is the same two i64 values.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct ArrayTimeInterval {
    start: ArrayTime,
    duration: Interval,
}

impl ArrayTimeInterval {
    pub fn new(start: ArrayTime, duration: Interval) -> Self {
        ArrayTimeInterval { start, duration }
    }

    pub fn start(&self) -> ArrayTime {
        self.start
    }

    pub fn duration(&self) -> Interval {
        self.duration
    }

    fn end(&self) -> i64 {
        // Saturate so that an end past the representable range still
        // compares sanely instead of overflowing.
        self.start.get().saturating_add(self.duration.get())
    }

    /// Whether *time* falls within this interval. The start is
    /// inclusive, the end exclusive.
    pub fn contains(&self, time: ArrayTime) -> bool {
        time.get() >= self.start.get() && time.get() < self.end()
    }

    /// Whether this interval and *other* share any instant.
    pub fn overlaps(&self, other: &ArrayTimeInterval) -> bool {
        self.start.get() < other.end() && other.start.get() < self.end()
    }
}

impl fmt::Display for ArrayTimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.start.get(), self.duration.get())
    }
}

impl FromStr for ArrayTimeInterval {
    type Err = SdmError;

    fn from_str(text: &str) -> Result<Self, SdmError> {
        let bad = || {
            SdmError::conversion(
                "ArrayTimeInterval",
                format!("expected \"start duration\", found \"{text}\""),
            )
        };

        let mut pieces = text.split_whitespace();
        let start = pieces.next().ok_or_else(bad)?;
        let duration = pieces.next().ok_or_else(bad)?;

        if pieces.next().is_some() {
            return Err(bad());
        }

        Ok(ArrayTimeInterval {
            start: ArrayTime(start.parse().map_err(|_| bad())?),
            duration: Interval(duration.parse().map_err(|_| bad())?),
        })
    }
}

#[cfg(test)]
#[test]
fn tag_text_round_trip() {
    let t = Tag::new(TagKind::Antenna, 3);
    assert_eq!(t.to_string(), "Antenna_3");
    assert_eq!("Antenna_3".parse::<Tag>().unwrap(), t);

    assert_eq!(Tag::default().to_string(), "null");
    assert_eq!("null".parse::<Tag>().unwrap(), Tag::default());
    assert!(Tag::default().is_null());

    assert!("Antenna".parse::<Tag>().is_err());
    assert!("Antenna_x".parse::<Tag>().is_err());
    assert!("Quasar_1".parse::<Tag>().is_err());
}

#[cfg(test)]
#[test]
fn tag_ordering() {
    let a0 = Tag::new(TagKind::Antenna, 0);
    let a1 = Tag::new(TagKind::Antenna, 1);
    let s5 = Tag::new(TagKind::Station, 5);
    assert!(a0 < a1);
    assert!(s5 < a0); // Station declares before Antenna
}

#[cfg(test)]
#[test]
fn array_time_mjd_round_trip() {
    let t = ArrayTime::from_mjd(58849.5);
    assert!((t.mjd() - 58849.5).abs() < 1e-9);
}

#[cfg(test)]
#[test]
fn interval_containment_and_overlap() {
    let ti = ArrayTimeInterval::new(ArrayTime::new(100), Interval::new(50));

    assert!(ti.contains(ArrayTime::new(100)));
    assert!(ti.contains(ArrayTime::new(149)));
    assert!(!ti.contains(ArrayTime::new(150)));
    assert!(!ti.contains(ArrayTime::new(99)));

    let other = ArrayTimeInterval::new(ArrayTime::new(140), Interval::new(50));
    assert!(ti.overlaps(&other));
    assert!(other.overlaps(&ti));

    let disjoint = ArrayTimeInterval::new(ArrayTime::new(150), Interval::new(10));
    assert!(!ti.overlaps(&disjoint));
}

#[cfg(test)]
#[test]
fn extreme_intervals_do_not_overflow() {
    let huge = ArrayTimeInterval::new(ArrayTime::new(i64::MAX - 10), Interval::new(i64::MAX));
    assert!(huge.contains(ArrayTime::new(i64::MAX - 1)));
    assert!(!huge.contains(ArrayTime::new(0)));

    let early = ArrayTimeInterval::new(ArrayTime::new(0), Interval::new(100));
    assert!(!huge.overlaps(&early));
    assert!(!early.overlaps(&huge));

    let everything = ArrayTimeInterval::new(ArrayTime::new(0), Interval::new(i64::MAX));
    assert!(huge.overlaps(&everything));
}

#[cfg(test)]
#[test]
fn interval_text_round_trip() {
    let ti = ArrayTimeInterval::new(ArrayTime::new(4753555200000000000), Interval::new(60000000000));
    assert_eq!(ti.to_string(), "4753555200000000000 60000000000");
    assert_eq!(ti.to_string().parse::<ArrayTimeInterval>().unwrap(), ti);

    assert!("4753555200000000000".parse::<ArrayTimeInterval>().is_err());
    assert!("1 2 3".parse::<ArrayTimeInterval>().is_err());
}
