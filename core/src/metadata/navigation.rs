use std::fmt;
use std::io::Write;
use std::str::FromStr;

use serde::Serialize;

use crate::prelude::{ParseResult, ValueError, WriteResult, XmlEntity};
use crate::telemetry::Site;
use crate::xml::scalar::{format_float, parse_float};
use crate::xml::{Attr, ElementStart, MetadataWriter, Namespace, Parsed, Tag, XmlCursor};

const NAVIGATION_READ: Site = Site::new("NavigationalData", "read");

/// MAJOR.MINOR version tag of the navigational block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavigationalVersion {
    pub major: u16,
    pub minor: u16,
}

impl Default for NavigationalVersion {
    fn default() -> Self {
        Self { major: 1, minor: 0 }
    }
}

impl FromStr for NavigationalVersion {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValueError::InvalidVersion(s.to_string());
        let (major, minor) = s.trim().split_once('.').ok_or_else(invalid)?;
        Ok(Self {
            major: major.parse().map_err(|_| invalid())?,
            minor: minor.parse().map_err(|_| invalid())?,
        })
    }
}

impl fmt::Display for NavigationalVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Camera position and motion carried in the stream's extension.
///
/// Bounded fields are only reachable through setters, which reject
/// out-of-range values and leave the previous value untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NavigationalData {
    version: NavigationalVersion,
    altitude: Option<f64>,
    azimuth: Option<f64>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    horizontal_accuracy: Option<f64>,
    vertical_accuracy: Option<f64>,
    speed: Option<f64>,
    geodetic_system: Option<String>,
}

fn checked(
    field: &'static str,
    expected: &'static str,
    value: Option<f64>,
    accept: impl Fn(f64) -> bool,
) -> Result<Option<f64>, ValueError> {
    match value {
        Some(value) if !accept(value) => Err(ValueError::OutOfRange {
            field,
            expected,
            value,
        }),
        other => Ok(other),
    }
}

impl NavigationalData {
    pub fn version(&self) -> NavigationalVersion {
        self.version
    }

    pub fn altitude(&self) -> Option<f64> {
        self.altitude
    }

    pub fn azimuth(&self) -> Option<f64> {
        self.azimuth
    }

    pub fn latitude(&self) -> Option<f64> {
        self.latitude
    }

    pub fn longitude(&self) -> Option<f64> {
        self.longitude
    }

    pub fn horizontal_accuracy(&self) -> Option<f64> {
        self.horizontal_accuracy
    }

    pub fn vertical_accuracy(&self) -> Option<f64> {
        self.vertical_accuracy
    }

    pub fn speed(&self) -> Option<f64> {
        self.speed
    }

    pub fn geodetic_system(&self) -> Option<&str> {
        self.geodetic_system.as_deref()
    }

    pub fn set_version(&mut self, version: NavigationalVersion) {
        self.version = version;
    }

    pub fn set_altitude(&mut self, value: Option<f64>) {
        self.altitude = value;
    }

    pub fn set_azimuth(&mut self, value: Option<f64>) -> Result<(), ValueError> {
        self.azimuth = checked("Azimuth", "within [-180, 180]", value, |v| {
            (-180.0..=180.0).contains(&v)
        })?;
        Ok(())
    }

    pub fn set_latitude(&mut self, value: Option<f64>) -> Result<(), ValueError> {
        self.latitude = checked("Latitude", "within [-90, 90]", value, |v| {
            (-90.0..=90.0).contains(&v)
        })?;
        Ok(())
    }

    pub fn set_longitude(&mut self, value: Option<f64>) -> Result<(), ValueError> {
        self.longitude = checked("Longitude", "within [-180, 180]", value, |v| {
            (-180.0..=180.0).contains(&v)
        })?;
        Ok(())
    }

    pub fn set_horizontal_accuracy(&mut self, value: Option<f64>) -> Result<(), ValueError> {
        self.horizontal_accuracy =
            checked("HorizontalAccuracy", "greater than 0", value, |v| v > 0.0)?;
        Ok(())
    }

    pub fn set_vertical_accuracy(&mut self, value: Option<f64>) -> Result<(), ValueError> {
        self.vertical_accuracy = checked("VerticalAccuracy", "greater than 0", value, |v| v > 0.0)?;
        Ok(())
    }

    pub fn set_speed(&mut self, value: Option<f64>) -> Result<(), ValueError> {
        self.speed = checked("Speed", "at least 0", value, |v| v >= 0.0)?;
        Ok(())
    }

    pub fn set_geodetic_system(&mut self, value: Option<String>) {
        self.geodetic_system = value.filter(|system| !system.trim().is_empty());
    }

    fn assign(&mut self, tag: Tag, value: f64) -> Result<(), ValueError> {
        let value = Some(value);
        match tag {
            Tag::Altitude => {
                self.set_altitude(value);
                Ok(())
            }
            Tag::Azimuth => self.set_azimuth(value),
            Tag::Latitude => self.set_latitude(value),
            Tag::Longitude => self.set_longitude(value),
            Tag::HorizontalAccuracy => self.set_horizontal_accuracy(value),
            Tag::VerticalAccuracy => self.set_vertical_accuracy(value),
            Tag::Speed => self.set_speed(value),
            _ => Ok(()),
        }
    }

    fn numeric_fields(&self) -> [(Tag, Option<f64>); 7] {
        [
            (Tag::Altitude, self.altitude),
            (Tag::Azimuth, self.azimuth),
            (Tag::Latitude, self.latitude),
            (Tag::Longitude, self.longitude),
            (Tag::HorizontalAccuracy, self.horizontal_accuracy),
            (Tag::VerticalAccuracy, self.vertical_accuracy),
            (Tag::Speed, self.speed),
        ]
    }
}

impl XmlEntity for NavigationalData {
    fn read(cursor: &mut XmlCursor<'_>) -> ParseResult<Self> {
        let mut navigation = NavigationalData::default();
        if let Some(raw) = cursor.attribute(Attr::Version)? {
            match raw.parse() {
                Ok(version) => navigation.version = version,
                Err(err) => cursor.diagnostics().report(
                    NAVIGATION_READ,
                    false,
                    || "keeping default version 1.0".to_string(),
                    Some(&err),
                ),
            }
        }

        cursor.for_each_child(Namespace::None, |cursor, tag| {
            if tag == Tag::GeodeticSystem {
                navigation.set_geodetic_system(Some(cursor.read_text()?));
                return Ok(());
            }
            if !navigation.numeric_fields().iter().any(|(field, _)| *field == tag) {
                return Ok(());
            }
            let value = match cursor.parsed_text(parse_float)? {
                Parsed::Value(value) => value,
                failed => {
                    cursor.diagnostics().warn(NAVIGATION_READ, || {
                        format!("ignoring {}: {}", tag.local_name(), failed.describe())
                    });
                    return Ok(());
                }
            };
            if let Err(err) = navigation.assign(tag, value) {
                cursor.diagnostics().report(
                    NAVIGATION_READ,
                    false,
                    || format!("ignoring {}", tag.local_name()),
                    Some(&err),
                );
            }
            Ok(())
        })?;
        Ok(navigation)
    }

    fn write<W: Write>(&self, writer: &mut MetadataWriter<W>, tag: Tag) -> WriteResult<()> {
        writer.open(ElementStart::new(tag).attr(Attr::Version, self.version.to_string()))?;
        for (field, value) in self.numeric_fields() {
            if let Some(value) = value {
                writer.text(field, &format_float(value))?;
            }
        }
        if let Some(system) = &self.geodetic_system {
            writer.text(Tag::GeodeticSystem, system)?;
        }
        writer.close(tag)
    }
}
