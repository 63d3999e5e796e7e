//! Coordinate Reference System handling

mod utm;

use crate::error::{Error, Result};
use crate::vector::BoundingBox;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use utm::{utm_to_wgs84, wgs84_to_utm};

/// Coordinate Reference System representation.
///
/// Layers only need CRS *identity* to be checked for congruence. The few
/// transformations terrawalk performs (hydrography query extents, barrier
/// polygons) are limited to geographic WGS84/NAD83 and UTM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CRS {
    /// WKT representation
    wkt: Option<String>,
    /// EPSG code if known
    epsg: Option<u32>,
}

/// Projection families we can transform between.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Family {
    Geographic,
    Utm { zone: u32, north: bool },
}

impl CRS {
    /// Create a CRS from an EPSG code
    pub fn from_epsg(code: u32) -> Self {
        Self {
            wkt: None,
            epsg: Some(code),
        }
    }

    /// Create a CRS from a WKT string
    pub fn from_wkt(wkt: impl Into<String>) -> Self {
        Self {
            wkt: Some(wkt.into()),
            epsg: None,
        }
    }

    /// WGS84 geographic CRS (EPSG:4326)
    pub fn wgs84() -> Self {
        Self::from_epsg(4326)
    }

    /// UTM zone CRS on WGS84 (EPSG:326xx / 327xx)
    pub fn utm(zone: u32, north: bool) -> Self {
        Self::from_epsg(if north { 32600 + zone } else { 32700 + zone })
    }

    /// Get EPSG code if known
    pub fn epsg(&self) -> Option<u32> {
        self.epsg
    }

    /// Get WKT representation
    pub fn wkt(&self) -> Option<&str> {
        self.wkt.as_deref()
    }

    /// Check if two CRS are equivalent
    pub fn is_equivalent(&self, other: &CRS) -> bool {
        if let (Some(a), Some(b)) = (self.epsg, other.epsg) {
            return a == b;
        }
        if let (Some(a), Some(b)) = (&self.wkt, &other.wkt) {
            return a == b;
        }
        false
    }

    /// UTM zone and hemisphere, if this is a WGS84 UTM CRS
    pub fn utm_zone(&self) -> Option<(u32, bool)> {
        match self.epsg? {
            code @ 32601..=32660 => Some((code - 32600, true)),
            code @ 32701..=32760 => Some((code - 32700, false)),
            _ => None,
        }
    }

    /// Whether coordinates are longitude/latitude degrees
    pub fn is_geographic(&self) -> bool {
        // NAD83 differs from WGS84 by well under a metre.
        matches!(self.epsg, Some(4326) | Some(4269))
    }

    fn family(&self) -> Option<Family> {
        if self.is_geographic() {
            return Some(Family::Geographic);
        }
        self.utm_zone().map(|(zone, north)| Family::Utm { zone, north })
    }

    /// Get a string identifier for this CRS
    pub fn identifier(&self) -> String {
        if let Some(code) = self.epsg {
            return format!("EPSG:{}", code);
        }
        if let Some(wkt) = &self.wkt {
            return format!("WKT:{}", wkt.chars().take(50).collect::<String>());
        }
        "Unknown".to_string()
    }
}

impl fmt::Display for CRS {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier())
    }
}

/// Transform a point between two CRS.
///
/// Identical CRS are a no-op. Otherwise both sides must be geographic
/// (EPSG:4326/4269) or WGS84 UTM; any other pair is a [`Error::CrsMismatch`].
pub fn transform_point(x: f64, y: f64, from: &CRS, to: &CRS) -> Result<(f64, f64)> {
    if from.is_equivalent(to) {
        return Ok((x, y));
    }

    let unsupported = || Error::CrsMismatch(from.identifier(), to.identifier());
    let src = from.family().ok_or_else(unsupported)?;
    let dst = to.family().ok_or_else(unsupported)?;

    let (lon, lat) = match src {
        Family::Geographic => (x, y),
        Family::Utm { zone, north } => utm_to_wgs84(x, y, zone, north),
    };

    Ok(match dst {
        Family::Geographic => (lon, lat),
        Family::Utm { zone, north } => wgs84_to_utm(lon, lat, zone, north),
    })
}

/// Reproject a bounding box by transforming its four corners and taking
/// the envelope.
pub fn reproject_bbox(bbox: &BoundingBox, from: &CRS, to: &CRS) -> Result<BoundingBox> {
    if from.is_equivalent(to) {
        return Ok(*bbox);
    }

    let mut out = BoundingBox::empty();
    for (x, y) in bbox.corners() {
        let (tx, ty) = transform_point(x, y, from, to)?;
        out.expand_to(tx, ty);
    }
    Ok(out)
}
