// Copyright 2024-2026 the asdmkit collaborators
// Licensed under the MIT License.

/*!

The closed enumerations that ASDM attributes draw their values from.

Each enumeration is a fixed, versioned set of named constants with a
total ordering given by declaration order. The schema defines on the
order of a hundred of these; they differ only in their name lists, so
one declarative macro generates the whole conversion surface for each:
declared names, name and ordinal lookup (with errors that spell out the
legal values), and `Display` as the declared name — which is also how
enumerators render in XML and binary serializations.

 */

use crate::SdmError;

macro_rules! asdm_enum {
    ($(#[$attr:meta])* $name:ident, $revision:literal, [$($variant:ident),+ $(,)?]) => {
        $(#[$attr])*
        #[allow(non_camel_case_types)]
        #[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// The revision date of this enumeration's definition.
            pub const REVISION: &'static str = $revision;

            /// Every enumerator, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The declared names, in declaration order.
            pub fn names() -> &'static [&'static str] {
                &[$(stringify!($variant)),+]
            }

            /// The number of declared enumerators.
            pub fn size() -> usize {
                $name::ALL.len()
            }

            /// The declared name of this enumerator.
            pub fn name(self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant)),+
                }
            }

            /// Look an enumerator up by its declared name.
            pub fn literal(name: &str) -> Result<Self, SdmError> {
                match name {
                    $(stringify!($variant) => Ok($name::$variant),)+
                    _ => Err(SdmError::InvalidEnumerator {
                        enumeration: stringify!($name),
                        value: name.to_owned(),
                        legal: $name::names().join(", "),
                    }),
                }
            }

            /// Look an enumerator up by its declaration-order ordinal.
            pub fn from_int(ordinal: i32) -> Result<Self, SdmError> {
                if ordinal < 0 || ordinal as usize >= $name::ALL.len() {
                    return Err(SdmError::InvalidEnumerator {
                        enumeration: stringify!($name),
                        value: ordinal.to_string(),
                        legal: format!("ordinals 0 through {}", $name::ALL.len() - 1),
                    });
                }

                Ok($name::ALL[ordinal as usize])
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.pad(self.name())
            }
        }
    };
}

asdm_enum!(
    /// The physical class of an antenna.
    AntennaType,
    "2011-02-18",
    [GROUND_BASED, SPACE_BASED, TRACKING_STN]
);

asdm_enum!(
    /// The manufacturer/model family of an antenna.
    AntennaMake,
    "2011-02-18",
    [
        AEM_12,
        CINGHAI_12,
        VERTEX_12_ATF,
        AEM_12_ATF,
        VERTEX_12,
        IRAM_15,
        MITSUBISHI_7,
        MITSUBISHI_12_A,
        MITSUBISHI_12_B,
        UNDEFINED,
    ]
);

asdm_enum!(
    /// What a station position is used for.
    StationType,
    "2011-02-18",
    [ANTENNA_PAD, MAINTENANCE_PAD, WEATHER_STATION]
);

asdm_enum!(
    /// The correlator baseband a spectral window is attached to.
    BasebandName,
    "2011-02-18",
    [NOBB, BB_1, BB_2, BB_3, BB_4, BB_5, BB_6, BB_7, BB_8, BB_ALL]
);

asdm_enum!(
    /// The sideband conversion state of a spectral window.
    NetSideband,
    "2011-02-18",
    [NOSB, LSB, USB, DSB]
);

asdm_enum!(
    /// The polarization component sampled by a receptor.
    PolarizationType,
    "2011-02-18",
    [R, L, X, Y, BOTH]
);

#[cfg(test)]
fn check_enum_laws<E: Copy + Eq + std::fmt::Debug>(
    all: &[E],
    names: &[&str],
    size: usize,
    literal: impl Fn(&str) -> Result<E, SdmError>,
    from_int: impl Fn(i32) -> Result<E, SdmError>,
    name: impl Fn(E) -> &'static str,
) {
    assert_eq!(all.len(), size);
    assert_eq!(names.len(), size);

    for (i, e) in all.iter().enumerate() {
        assert_eq!(name(*e), names[i]);
        assert_eq!(literal(names[i]).unwrap(), *e);
        assert_eq!(from_int(i as i32).unwrap(), *e);
    }

    assert!(literal("NOT_A_LITERAL").is_err());
    assert!(from_int(size as i32).is_err());
    assert!(from_int(-1).is_err());
}

#[cfg(test)]
#[test]
fn every_enumeration_obeys_the_laws() {
    check_enum_laws(
        AntennaType::ALL,
        AntennaType::names(),
        AntennaType::size(),
        AntennaType::literal,
        AntennaType::from_int,
        AntennaType::name,
    );
    check_enum_laws(
        AntennaMake::ALL,
        AntennaMake::names(),
        AntennaMake::size(),
        AntennaMake::literal,
        AntennaMake::from_int,
        AntennaMake::name,
    );
    check_enum_laws(
        StationType::ALL,
        StationType::names(),
        StationType::size(),
        StationType::literal,
        StationType::from_int,
        StationType::name,
    );
    check_enum_laws(
        BasebandName::ALL,
        BasebandName::names(),
        BasebandName::size(),
        BasebandName::literal,
        BasebandName::from_int,
        BasebandName::name,
    );
    check_enum_laws(
        NetSideband::ALL,
        NetSideband::names(),
        NetSideband::size(),
        NetSideband::literal,
        NetSideband::from_int,
        NetSideband::name,
    );
    check_enum_laws(
        PolarizationType::ALL,
        PolarizationType::names(),
        PolarizationType::size(),
        PolarizationType::literal,
        PolarizationType::from_int,
        PolarizationType::name,
    );
}

#[cfg(test)]
#[test]
fn antenna_type_literal_scenario() {
    assert_eq!(
        AntennaType::literal("GROUND_BASED").unwrap(),
        AntennaType::GROUND_BASED
    );

    let msg = AntennaType::literal("NOT_A_TYPE").unwrap_err().to_string();
    assert!(msg.contains("NOT_A_TYPE"));
    assert!(msg.contains("GROUND_BASED"));
    assert!(msg.contains("SPACE_BASED"));
    assert!(msg.contains("TRACKING_STN"));
}

#[cfg(test)]
#[test]
fn enumerators_order_by_declaration() {
    assert!(AntennaType::GROUND_BASED < AntennaType::SPACE_BASED);
    assert!(BasebandName::BB_1 < BasebandName::BB_8);
}
