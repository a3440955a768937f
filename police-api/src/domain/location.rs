//! Anonymised locations crimes and stops are snapped to.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::Result;
use crate::hydrate::{self, RawRecord};

/// Location type of British Transport Police records.
const BTP: &str = "BTP";

/// The street a snapped location sits on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Street {
    /// Internal id; this is also the location id
    pub id: i64,
    /// Description such as "On or near Park Road"
    pub name: String,
}

/// An anonymised map point.
///
/// Identity is the street id. Coordinates arrive as text and are parsed
/// when read.
#[derive(Debug, Clone)]
pub struct Location {
    pub street: Street,
    latitude: String,
    longitude: String,
    /// "Force" or "BTP"
    pub kind: Option<String>,
    /// Sub-type given to BTP locations (e.g. a station)
    pub subtype: Option<String>,
}

impl Location {
    /// Build a location from its JSON object.
    ///
    /// `type` and `subtype` are usually absent here; crime records carry
    /// them alongside the location and merge them in first.
    pub fn from_raw(raw: &RawRecord) -> Result<Self> {
        let street = hydrate::object(raw, "street").ok_or_else(|| hydrate::missing("street"))?;

        Ok(Self {
            street: Street {
                id: hydrate::integer(street, "id")?.ok_or_else(|| hydrate::missing("street.id"))?,
                name: hydrate::string(street, "name").unwrap_or_default(),
            },
            latitude: hydrate::string(raw, "latitude").unwrap_or_default(),
            longitude: hydrate::string(raw, "longitude").unwrap_or_default(),
            kind: hydrate::string(raw, "type"),
            subtype: hydrate::string(raw, "subtype"),
        })
    }

    /// Location id, used by the `*-at-location` queries.
    pub fn id(&self) -> i64 {
        self.street.id
    }

    /// Street description.
    pub fn name(&self) -> &str {
        &self.street.name
    }

    /// Latitude in degrees.
    pub fn latitude(&self) -> Result<f64> {
        hydrate::parse_float(&self.latitude, "latitude")
    }

    /// Longitude in degrees.
    pub fn longitude(&self) -> Result<f64> {
        hydrate::parse_float(&self.longitude, "longitude")
    }

    /// Whether this is a British Transport Police location.
    pub fn is_btp(&self) -> bool {
        self.kind.as_deref() == Some(BTP)
    }
}

impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Location {}

impl Hash for Location {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.street.name, self.street.id)
    }
}
